//! Invocation of vendor driver binaries (Adafruit_DHT, vcgencmd).

use crate::{Deadline, Error, Result};
use std::io::Read;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::time::Duration;
use tracing::{debug, warn};

/// How often a running driver is polled for completion.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Captured result of a driver run.
#[derive(Debug)]
pub struct DriverOutput {
    pub status: ExitStatus,
    pub stdout: String,
}

/// An external program used to read a sensor.
#[derive(Debug, Clone)]
pub struct Driver {
    program: String,
    sudo: bool,
}

impl Driver {
    /// Creates a driver for `program`, optionally run through `sudo`.
    pub fn new(program: impl Into<String>, sudo: bool) -> Self {
        Self {
            program: program.into(),
            sudo,
        }
    }

    /// Returns the program path.
    pub fn program(&self) -> &str {
        &self.program
    }

    fn command(&self, args: &[&str]) -> Command {
        let mut command = if self.sudo {
            let mut c = Command::new("sudo");
            c.arg(&self.program);
            c
        } else {
            Command::new(&self.program)
        };
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null());
        command
    }

    /// Runs the driver to completion, killing it if the deadline passes.
    pub fn run(&self, args: &[&str], deadline: &Deadline) -> Result<DriverOutput> {
        deadline.check()?;
        debug!("Running {} {:?} (sudo: {})", self.program, args, self.sudo);

        let mut child = self.command(args).spawn()?;
        let status = loop {
            if let Some(status) = child.try_wait()? {
                break status;
            }
            if let Err(e) = deadline.check() {
                warn!("{} did not finish in time, killing it", self.program);
                kill(&mut child);
                return Err(e);
            }
            deadline.sleep(POLL_INTERVAL);
        };

        let mut stdout = String::new();
        if let Some(mut pipe) = child.stdout.take() {
            pipe.read_to_string(&mut stdout)?;
        }
        Ok(DriverOutput { status, stdout })
    }

    /// Runs the driver and fails unless it exits successfully.
    pub fn run_checked(&self, args: &[&str], deadline: &Deadline) -> Result<String> {
        let output = self.run(args, deadline)?;
        if output.status.success() {
            Ok(output.stdout)
        } else {
            Err(Error::DriverFailed {
                command: self.program.clone(),
                status: output.status.to_string(),
            })
        }
    }
}

fn kill(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}
