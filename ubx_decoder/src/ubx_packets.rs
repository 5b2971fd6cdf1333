pub mod cfg;
pub mod packets;

use gnss::prelude::{Constellation, SV};

use crate::constants::{UBX_CLASS_RXM, QZSS_PRN_OFFSET};

pub use cfg::{gen_ubx, CfgCommand, FieldKind};
pub use packets::*;

/// Messages this crate decodes, keyed by class and id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageId {
    /// UBX-RXM-RAW, legacy single frequency raw measurements
    RxmRaw,
    /// UBX-RXM-SFRB, legacy subframe buffer
    RxmSfrb,
    /// UBX-RXM-SFRBX, broadcast navigation data subframe
    RxmSfrbx,
    /// UBX-RXM-RAWX, multi-GNSS raw measurements
    RxmRawx,
    Other { class: u8, id: u8 },
}

impl MessageId {
    pub fn new(class: u8, id: u8) -> Self {
        match (class, id) {
            (UBX_CLASS_RXM, RxmRawRef::ID) => Self::RxmRaw,
            (UBX_CLASS_RXM, RxmSfrbRef::ID) => Self::RxmSfrb,
            (UBX_CLASS_RXM, RxmSfrbxRef::ID) => Self::RxmSfrbx,
            (UBX_CLASS_RXM, RxmRawxRef::ID) => Self::RxmRawx,
            (class, id) => Self::Other { class, id },
        }
    }

    /// Class in the high byte, id in the low byte
    pub fn type_id(&self) -> u16 {
        let (class, id) = match *self {
            Self::RxmRaw => (UBX_CLASS_RXM, RxmRawRef::ID),
            Self::RxmSfrb => (UBX_CLASS_RXM, RxmSfrbRef::ID),
            Self::RxmSfrbx => (UBX_CLASS_RXM, RxmSfrbxRef::ID),
            Self::RxmRawx => (UBX_CLASS_RXM, RxmRawxRef::ID),
            Self::Other { class, id } => (class, id),
        };
        u16::from_be_bytes([class, id])
    }
}

/// Constellation of a UBX `gnssId`
pub fn ubx_gnss(gnss_id: u8) -> Option<Constellation> {
    match gnss_id {
        0 => Some(Constellation::GPS),
        1 => Some(Constellation::SBAS),
        2 => Some(Constellation::Galileo),
        3 => Some(Constellation::BeiDou),
        5 => Some(Constellation::QZSS),
        6 => Some(Constellation::Glonass),
        _ => None,
    }
}

/// PRN of a UBX `svId` for the given constellation
pub fn ubx_prn(constellation: Constellation, sv_id: u8) -> u16 {
    match constellation {
        Constellation::QZSS => u16::from(sv_id) + QZSS_PRN_OFFSET,
        _ => u16::from(sv_id),
    }
}

/// Satellite for a PRN (GLONASS: slot), `None` when out of range.
///
/// Numbering follows RINEX: QZSS PRN 193 is J01 and SBAS PRN 120 is S20.
pub fn satellite(constellation: Constellation, prn: u16) -> Option<SV> {
    let (range, offset) = match constellation {
        Constellation::GPS => (1..=32, 0),
        Constellation::Glonass => (1..=24, 0),
        Constellation::Galileo => (1..=36, 0),
        Constellation::QZSS => (193..=202, 192),
        Constellation::BeiDou => (1..=63, 0),
        Constellation::SBAS => (120..=158, 100),
        _ => return None,
    };
    if !range.contains(&prn) {
        return None;
    }
    Some(SV::new(constellation, (prn - offset) as u8))
}

/// PRN of a satellite, inverse of [satellite]
pub fn prn_of(sv: SV) -> u16 {
    let prn = u16::from(sv.prn);
    match sv.constellation {
        Constellation::QZSS => prn + 192,
        c if c.is_sbas() => prn + 100,
        _ => prn,
    }
}
