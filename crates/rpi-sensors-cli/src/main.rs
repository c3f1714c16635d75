//! Raspberry Pi sensor reader and Nagios plugin.

use clap::error::ErrorKind;
use clap::Parser;
use rpi_sensors::cli::one_line_error;
use rpi_sensors::{Args, Status};
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            print!("{}", e);
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            // Nagios reads only the first line.
            println!("{}", one_line_error(&e.to_string()));
            return ExitCode::from(Status::Unknown.code());
        }
    };

    // Setup logging
    let filter = if args.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match rpi_sensors::run(&args) {
        Ok(report) => {
            println!("{}", report.text);
            debug!("Exiting with {}", report.status);
            ExitCode::from(report.status.code())
        }
        Err(e) => {
            println!("{}", e);
            ExitCode::from(Status::Unknown.code())
        }
    }
}
