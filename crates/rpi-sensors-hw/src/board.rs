//! Board revision detection.
//!
//! The valid GPIO pin set depends on the board. Early boards are identified
//! by a 16-bit revision code from a fixed catalog; boards from the B+ onwards
//! use the new-style bitfield encoding and all share the 40-pin header.
//!
//! See <http://elinux.org/RPi_HardwareHistory> and
//! <https://www.raspberrypi.com/documentation/computers/raspberry-pi.html#new-style-revision-codes>

use std::fmt;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// GPIO pins exposed on PCB revision 1.0 boards.
pub const PCB_R1_GPIO_PORTS: &[u8] = &[
    0, 1, 4, 7, 8, 9, 10, 11, 14, 15, 17, 18, 21, 22, 23, 24, 25,
];

/// GPIO pins exposed on PCB revision 2.0 boards (P1 plus the P5 header).
pub const PCB_R2_GPIO_PORTS: &[u8] = &[
    2, 3, 4, 7, 8, 9, 10, 11, 14, 15, 17, 18, 22, 23, 24, 25, 27, 28, 29, 30, 31,
];

/// GPIO pins exposed on the 40-pin header.
pub const HEADER_40_GPIO_PORTS: &[u8] = &[
    2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16, 17, 18, 19, 20, 21, 22, 23, 24, 25, 26,
    27,
];

/// Overvoltage indicator bit in the revision code.
const OVERVOLTAGE_BIT: u32 = 0x0100_0000;

/// New-style revision code flag.
const NEW_STYLE_BIT: u32 = 0x0080_0000;

/// PCB revision of an early board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PcbRevision {
    Unknown,
    Rev1,
    Rev2,
}

/// Catalog entry for a known early board revision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardRevision {
    /// Revision code, `None` for the beta board.
    pub code: Option<u16>,
    pub release_date: &'static str,
    pub model: &'static str,
    pub pcb_revision: PcbRevision,
    /// Memory in bytes.
    pub memory: u64,
    pub notes: &'static str,
}

const fn rev(
    code: Option<u16>,
    release_date: &'static str,
    model: &'static str,
    pcb_revision: PcbRevision,
    memory: u64,
    notes: &'static str,
) -> BoardRevision {
    BoardRevision {
        code,
        release_date,
        model,
        pcb_revision,
        memory,
        notes,
    }
}

const MB_256: u64 = 256_000_000;
const MB_512: u64 = 512_000_000;

/// Known early board revisions.
pub static BOARD_REVISIONS: &[BoardRevision] = &[
    rev(None, "Q1 2012", "B (Beta)", PcbRevision::Unknown, MB_256, "Beta Board"),
    rev(Some(0x0002), "Q1 2012", "B", PcbRevision::Rev1, MB_256, ""),
    rev(
        Some(0x0003),
        "Q3 2012",
        "B (ECN0001)",
        PcbRevision::Rev1,
        MB_256,
        "Fuses mod and D14 removed",
    ),
    rev(Some(0x0004), "Q3 2012", "B", PcbRevision::Rev2, MB_256, "(Mfg by Sony)"),
    rev(Some(0x0005), "Q4 2012", "B", PcbRevision::Rev2, MB_256, "(Mfg by Qisda)"),
    rev(Some(0x0006), "Q4 2012", "B", PcbRevision::Rev2, MB_256, "(Mfg by Egoman)"),
    rev(Some(0x0007), "Q1 2013", "A", PcbRevision::Rev2, MB_256, "(Mfg by Egoman)"),
    rev(Some(0x0008), "Q1 2013", "A", PcbRevision::Rev2, MB_256, "(Mfg by Sony)"),
    rev(Some(0x0009), "Q1 2013", "A", PcbRevision::Rev2, MB_256, "(Mfg by Qisda)"),
    rev(Some(0x000d), "Q4 2012", "B", PcbRevision::Rev2, MB_512, "(Mfg by Egoman)"),
    rev(Some(0x000e), "Q4 2012", "B", PcbRevision::Rev2, MB_512, "(Mfg by Sony)"),
    rev(Some(0x000f), "Q4 2012", "B", PcbRevision::Rev2, MB_512, "(Mfg by Qisda)"),
];

impl BoardRevision {
    /// Looks up an early board by its 16-bit revision code.
    pub fn lookup(code: u16) -> Option<&'static BoardRevision> {
        BOARD_REVISIONS.iter().find(|b| b.code == Some(code))
    }
}

/// The board we are running on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Board {
    /// An early board from the catalog.
    Known {
        revision: &'static BoardRevision,
        overvolted: bool,
    },
    /// A board using new-style revision codes.
    NewStyle {
        code: u32,
        model: &'static str,
        memory_mb: u32,
    },
    /// Revision missing or not recognised.
    Unknown(String),
}

impl Board {
    /// Detects the board from a cpuinfo file (normally `/proc/cpuinfo`).
    pub fn detect(cpuinfo: &Path) -> Self {
        match fs::read_to_string(cpuinfo) {
            Ok(content) => match parse_revision(&content) {
                Some(revision) => Self::from_revision(&revision),
                None => Self::Unknown("no Revision line".to_string()),
            },
            Err(e) => {
                warn!("Could not read {}: {}", cpuinfo.display(), e);
                Self::Unknown(e.to_string())
            }
        }
    }

    /// Resolves a hex revision string such as `000e` or `a02082`.
    pub fn from_revision(revision: &str) -> Self {
        let trimmed = revision.trim().trim_start_matches("0x");
        let Ok(code) = u32::from_str_radix(trimmed, 16) else {
            return Self::Unknown(revision.to_string());
        };

        if code & NEW_STYLE_BIT != 0 {
            let board_type = (code >> 4) & 0xFF;
            let memory_mb = 256u32 << ((code >> 20) & 0x7);
            let board = Self::NewStyle {
                code,
                model: new_style_model(board_type),
                memory_mb,
            };
            debug!("Detected board {}", board);
            return board;
        }

        // Only the last 2 bytes identify the board; the rest holds warranty bits.
        let overvolted = code & OVERVOLTAGE_BIT != 0;
        match BoardRevision::lookup((code & 0xFFFF) as u16) {
            Some(revision) => {
                let board = Self::Known {
                    revision,
                    overvolted,
                };
                debug!("Detected board {}", board);
                board
            }
            None => Self::Unknown(revision.to_string()),
        }
    }

    /// Returns the GPIO pins usable on this board.
    pub fn gpio_ports(&self) -> &'static [u8] {
        match self {
            Self::Known { revision, .. } => match revision.pcb_revision {
                PcbRevision::Rev1 => PCB_R1_GPIO_PORTS,
                PcbRevision::Rev2 => PCB_R2_GPIO_PORTS,
                PcbRevision::Unknown => &[],
            },
            // Models A and B kept the 26-pin rev 2 header after the switch.
            Self::NewStyle { code, .. } if (code >> 4) & 0xFF <= 1 => PCB_R2_GPIO_PORTS,
            Self::NewStyle { .. } => HEADER_40_GPIO_PORTS,
            Self::Unknown(_) => &[],
        }
    }

    /// Returns whether the overvoltage warranty bit is set.
    ///
    /// `None` when it could not be determined.
    pub fn has_been_overvolted(&self) -> Option<bool> {
        match self {
            Self::Known { overvolted, .. } => Some(*overvolted),
            Self::NewStyle { code, .. } => Some(code & 0x0200_0000 != 0),
            Self::Unknown(_) => None,
        }
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Known { revision, .. } => write!(
                f,
                "Raspberry Pi {} ({}, {} MB)",
                revision.model,
                revision.release_date,
                revision.memory / 1_000_000
            ),
            Self::NewStyle {
                code,
                model,
                memory_mb,
            } => write!(f, "Raspberry Pi {} (rev {:06x}, {} MB)", model, code, memory_mb),
            Self::Unknown(revision) => write!(f, "unknown board revision ({})", revision),
        }
    }
}

/// Extracts the `Revision` value from cpuinfo content.
pub fn parse_revision(cpuinfo: &str) -> Option<String> {
    cpuinfo
        .lines()
        .filter(|line| line.starts_with("Revision"))
        .filter_map(|line| line.split_once(':'))
        .map(|(_, value)| value.trim().to_string())
        .last()
}

fn new_style_model(board_type: u32) -> &'static str {
    match board_type {
        0x00 => "A",
        0x01 => "B",
        0x02 => "A+",
        0x03 => "B+",
        0x04 => "2B",
        0x06 => "CM1",
        0x08 => "3B",
        0x09 => "Zero",
        0x0a => "CM3",
        0x0c => "Zero W",
        0x0d => "3B+",
        0x0e => "3A+",
        0x10 => "CM3+",
        0x11 => "4B",
        0x12 => "Zero 2 W",
        0x13 => "400",
        0x14 => "CM4",
        0x15 => "CM4S",
        0x17 => "5",
        0x18 => "CM5",
        0x19 => "500",
        0x1a => "CM5 Lite",
        _ => "unknown model",
    }
}
