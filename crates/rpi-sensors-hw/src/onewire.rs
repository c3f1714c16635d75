//! DS18B20 probes on the 1-wire bus.
//!
//! Two mounts are supported: the kernel `w1-gpio`/`w1-therm` driver under
//! `/sys/bus/w1/devices/28-*/w1_slave`, and an OWFS (Wiregate) mount under
//! `/media/1-wire/28.*/temperature`.

use crate::{Deadline, Error, Result, RetryPolicy};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Power-on reset value of the DS18B20 scratchpad, in millidegrees.
const POWER_ON_RESET_MILLI: i64 = 85_000;

/// Where the 1-wire devices are exposed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mount {
    /// Kernel driver, `28-xxxxxxxxxxxx/w1_slave`.
    Kernel,
    /// OWFS, `28.XXXXXXXXXXXX/temperature`.
    Owfs,
}

impl Mount {
    fn family_prefix(&self) -> &'static str {
        match self {
            Mount::Kernel => "28",
            Mount::Owfs => "28.",
        }
    }

    fn file_name(&self) -> &'static str {
        match self {
            Mount::Kernel => "w1_slave",
            Mount::Owfs => "temperature",
        }
    }
}

/// A single DS18B20 temperature probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Probe {
    pub path: PathBuf,
    pub mount: Mount,
}

impl Probe {
    /// Reads the probe in degrees Celsius, retrying unstable payloads.
    pub fn read_celsius(&self, policy: &RetryPolicy, deadline: &Deadline) -> Result<f64> {
        let what = self.path.display().to_string();
        policy.run(deadline, &what, || {
            let content = fs::read_to_string(&self.path).map_err(|source| Error::Read {
                path: self.path.clone(),
                source,
            })?;
            Ok(parse_payload(&content, self.mount))
        })
    }
}

/// Lists the DS18B20 probes under `base_dir`, sorted by path.
///
/// A missing base directory yields an empty list.
pub fn enumerate(base_dir: &Path, mount: Mount) -> Result<Vec<Probe>> {
    let entries = match fs::read_dir(base_dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!("1-wire directory {} does not exist", base_dir.display());
            return Ok(Vec::new());
        }
        Err(source) => {
            return Err(Error::Read {
                path: base_dir.to_path_buf(),
                source,
            })
        }
    };

    let mut probes: Vec<Probe> = entries
        .flatten()
        .filter(|entry| {
            entry
                .file_name()
                .to_string_lossy()
                .starts_with(mount.family_prefix())
        })
        .map(|entry| Probe {
            path: entry.path().join(mount.file_name()),
            mount,
        })
        .collect();
    probes.sort_by(|a, b| a.path.cmp(&b.path));

    debug!("Found {} 1-wire probes in {}", probes.len(), base_dir.display());
    Ok(probes)
}

/// Parses a probe payload into degrees Celsius.
///
/// Returns `None` for payloads that should be re-read: a failed CRC, the
/// 85 °C power-on value, or a truncated file.
pub fn parse_payload(content: &str, mount: Mount) -> Option<f64> {
    match mount {
        Mount::Kernel => parse_w1_slave(content),
        Mount::Owfs => {
            let celsius: f64 = content.trim().parse().ok()?;
            if celsius == (POWER_ON_RESET_MILLI / 1000) as f64 {
                return None;
            }
            Some(celsius)
        }
    }
}

fn parse_w1_slave(content: &str) -> Option<f64> {
    let mut lines = content.lines();
    let crc_line = lines.next()?;
    let data_line = lines.next()?;

    if !crc_line.trim().ends_with("YES") {
        return None;
    }

    let (_, raw) = data_line.split_once("t=")?;
    let milli: i64 = raw.trim().parse().ok()?;
    if milli == POWER_ON_RESET_MILLI {
        return None;
    }
    Some(milli as f64 / 1000.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    const GOOD: &str = concat!(
        "72 01 4b 46 7f ff 0e 10 57 : crc=57 YES\n",
        "72 01 4b 46 7f ff 0e 10 57 t=23125\n"
    );
    const BAD_CRC: &str = concat!(
        "72 01 4b 46 7f ff 0e 10 57 : crc=57 NO\n",
        "72 01 4b 46 7f ff 0e 10 57 t=23125\n"
    );
    const RESET: &str = concat!(
        "50 05 4b 46 7f ff 0c 10 1c : crc=1c YES\n",
        "50 05 4b 46 7f ff 0c 10 1c t=85000\n"
    );

    #[test]
    fn test_parse_w1_slave() {
        assert_eq!(parse_payload(GOOD, Mount::Kernel), Some(23.125));
        assert_eq!(parse_payload(BAD_CRC, Mount::Kernel), None);
        assert_eq!(parse_payload(RESET, Mount::Kernel), None);
        assert_eq!(parse_payload("", Mount::Kernel), None);
    }

    #[test]
    fn test_parse_negative_and_near_sentinel() {
        let cold = "ff ff : crc=aa YES\nff ff t=-1250\n";
        assert_eq!(parse_payload(cold, Mount::Kernel), Some(-1.25));
        let warm = "ff ff : crc=aa YES\nff ff t=8500\n";
        assert_eq!(parse_payload(warm, Mount::Kernel), Some(8.5));
    }

    #[test]
    fn test_parse_owfs() {
        assert_eq!(parse_payload("     21.5625", Mount::Owfs), Some(21.5625));
        assert_eq!(parse_payload("85", Mount::Owfs), None);
        assert_eq!(parse_payload("garbage", Mount::Owfs), None);
    }

    #[test]
    fn test_enumerate_kernel_mount() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["28-0000055f2b01", "28-000005e2fdc3", "w1_bus_master1", "10-000802b5d0e0"] {
            fs::create_dir(dir.path().join(name)).unwrap();
        }

        let probes = enumerate(dir.path(), Mount::Kernel).unwrap();
        assert_eq!(probes.len(), 2);
        assert!(probes[0].path.ends_with("28-0000055f2b01/w1_slave"));
        assert!(probes[1].path.ends_with("28-000005e2fdc3/w1_slave"));
    }

    #[test]
    fn test_enumerate_owfs_mount() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["28.5F2B01000000", "28-not-owfs", "81.000000000000"] {
            fs::create_dir(dir.path().join(name)).unwrap();
        }

        let probes = enumerate(dir.path(), Mount::Owfs).unwrap();
        assert_eq!(probes.len(), 1);
        assert!(probes[0].path.ends_with("28.5F2B01000000/temperature"));
    }

    #[test]
    fn test_enumerate_missing_dir() {
        let probes = enumerate(Path::new("/nonexistent/w1/devices"), Mount::Kernel).unwrap();
        assert!(probes.is_empty());
    }

    #[test]
    fn test_read_celsius() {
        let dir = tempfile::tempdir().unwrap();
        let probe_dir = dir.path().join("28-0000055f2b01");
        fs::create_dir(&probe_dir).unwrap();
        fs::write(probe_dir.join("w1_slave"), GOOD).unwrap();

        let probe = &enumerate(dir.path(), Mount::Kernel).unwrap()[0];
        let policy = RetryPolicy::new(Duration::ZERO);
        assert_eq!(probe.read_celsius(&policy, &Deadline::none()).unwrap(), 23.125);
    }

    #[test]
    fn test_read_celsius_gives_up() {
        let dir = tempfile::tempdir().unwrap();
        let probe_dir = dir.path().join("28-0000055f2b01");
        fs::create_dir(&probe_dir).unwrap();
        fs::write(probe_dir.join("w1_slave"), RESET).unwrap();

        let probe = &enumerate(dir.path(), Mount::Kernel).unwrap()[0];
        let policy = RetryPolicy::new(Duration::ZERO).with_max_attempts(Some(2));
        assert!(matches!(
            probe.read_celsius(&policy, &Deadline::none()),
            Err(Error::RetriesExhausted(2))
        ));
    }
}
