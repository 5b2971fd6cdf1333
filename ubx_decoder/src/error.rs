use std::{fmt, io};

use gnss::prelude::{Constellation, SV};

/// Failure classes reported by the decoder.
///
/// None of these are fatal: the synchronizer is back in its seeking state
/// when one is returned, and the next call can be made right away.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DecodeError {
    /// Declared frame length exceeds [crate::MAX_FRAME_LEN]
    FrameTooLong {
        len: usize,
    },
    InvalidChecksum {
        expect: u16,
        got: u16,
    },
    InvalidPacketLen {
        packet: &'static str,
        expect: usize,
        got: usize,
    },
    UnknownGnss {
        packet: &'static str,
        gnss_id: u8,
    },
    InvalidSatellite {
        constellation: Constellation,
        prn: u16,
    },
    InvalidSubframeId {
        sv: SV,
        id: u8,
    },
    InvalidPageNumber {
        sv: SV,
        page: u8,
    },
    InvalidStringNumber {
        sv: SV,
        string: u8,
    },
    /// Galileo I/NAV half pages not in even/odd order
    GalileoEvenOdd {
        sv: SV,
    },
    GalileoCrc {
        sv: SV,
    },
    GlonassHamming {
        sv: SV,
    },
    /// Decoded navigation data names another satellite than the one it was received from
    SatelliteMismatch {
        expect: SV,
        got: SV,
    },
    EndOfStream,
    Io(io::ErrorKind),
}

impl DecodeError {
    /// True for errors raised by the frame synchronizer itself.
    pub fn is_framing(&self) -> bool {
        matches!(
            self,
            Self::FrameTooLong { .. } | Self::EndOfStream | Self::Io(_)
        )
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::FrameTooLong { len } => {
                write!(f, "Frame length {} exceeds {}", len, crate::MAX_FRAME_LEN)
            },
            DecodeError::InvalidChecksum { expect, got } => write!(
                f,
                "Not valid packet's checksum, expect {:x}, got {:x}",
                expect, got
            ),
            DecodeError::InvalidPacketLen {
                packet,
                expect,
                got,
            } => write!(
                f,
                "Invalid packet({}) length, expect {}, got {}",
                packet, expect, got
            ),
            DecodeError::UnknownGnss { packet, gnss_id } => {
                write!(f, "Unknown gnssId {} in packet {}", gnss_id, packet)
            },
            DecodeError::InvalidSatellite { constellation, prn } => {
                write!(f, "Invalid satellite number {} for {}", prn, constellation)
            },
            DecodeError::InvalidSubframeId { sv, id } => {
                write!(f, "{}: invalid subframe id {}", sv, id)
            },
            DecodeError::InvalidPageNumber { sv, page } => {
                write!(f, "{}: invalid page number {}", sv, page)
            },
            DecodeError::InvalidStringNumber { sv, string } => {
                write!(f, "{}: invalid string number {}", sv, string)
            },
            DecodeError::GalileoEvenOdd { sv } => write!(f, "{}: page even/odd error", sv),
            DecodeError::GalileoCrc { sv } => write!(f, "{}: page crc error", sv),
            DecodeError::GlonassHamming { sv } => write!(f, "{}: string hamming error", sv),
            DecodeError::SatelliteMismatch { expect, got } => {
                write!(f, "Navigation data from {} decoded as {}", expect, got)
            },
            DecodeError::EndOfStream => f.write_str("End of stream"),
            DecodeError::Io(kind) => write!(f, "I/O error: {}", kind),
        }
    }
}

impl std::error::Error for DecodeError {}

impl From<io::Error> for DecodeError {
    fn from(e: io::Error) -> Self {
        match e.kind() {
            io::ErrorKind::UnexpectedEof => Self::EndOfStream,
            kind => Self::Io(kind),
        }
    }
}

/// Error raised while parsing a receiver option string
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    InvalidValue {
        option: &'static str,
        value: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidValue { option, value } => {
                write!(f, "Invalid value {:?} for option {}", value, option)
            },
        }
    }
}

impl std::error::Error for ConfigError {}
