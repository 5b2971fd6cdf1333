//! Broadcast navigation records and the bit-level decoder seam.
//!
//! Turning an assembled subframe buffer into orbital parameters is the job
//! of a [NavDecoder]. This crate only collects the fragments, checks their
//! integrity and decides whether a decoded record is new.

mod store;

use gnss::prelude::{Constellation, SV};
use hifitime::Epoch;

pub use store::{EphemerisStore, SbasSet};

/// GPS/QZSS LNAV subframes 1 to 5, 30 bytes each
pub const LNAV_FRAME_LEN: usize = 150;
pub const LNAV_SUBFRAME_LEN: usize = 30;
/// Galileo I/NAV word types 0 to 6, 16 bytes each
pub const GALILEO_FRAME_LEN: usize = 112;
pub const GALILEO_WORD_LEN: usize = 16;
/// BeiDou D1 subframes 1 to 5, 38 bytes each
pub const BDS_D1_FRAME_LEN: usize = 190;
/// BeiDou D2 subframe 1 pages 1 to 10, 38 bytes each
pub const BDS_D2_FRAME_LEN: usize = 380;
pub const BDS_SUBFRAME_LEN: usize = 38;
/// GLONASS strings 1 to 4, 10 bytes each
pub const GLONASS_FRAME_LEN: usize = 40;
pub const GLONASS_STRING_LEN: usize = 10;
/// SBAS message: 226 bits, padded
pub const SBAS_MSG_LEN: usize = 29;

/// GPS, Galileo, QZSS and BeiDou broadcast ephemeris
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Ephemeris {
    pub sv: SV,
    /// Issue of data, ephemeris
    pub iode: i32,
    /// Issue of data, clock
    pub iodc: i32,
    /// SV accuracy (URA index)
    pub sva: i32,
    /// SV health
    pub svh: i32,
    pub week: u32,
    /// Data source or code on L2, constellation specific
    pub code: i32,
    /// L2 P data flag or BeiDou orbit type
    pub flag: i32,
    /// Reference epoch of ephemeris
    pub toe: Epoch,
    /// Reference epoch of clock
    pub toc: Epoch,
    /// Transmission time
    pub ttr: Epoch,
    /// Semi-major axis (m)
    pub a: f64,
    pub e: f64,
    pub i0: f64,
    pub omg0: f64,
    pub omg: f64,
    pub m0: f64,
    pub deln: f64,
    pub omgd: f64,
    pub idot: f64,
    pub crc: f64,
    pub crs: f64,
    pub cuc: f64,
    pub cus: f64,
    pub cic: f64,
    pub cis: f64,
    /// Toe in seconds of week
    pub toes: f64,
    /// Fit interval (h)
    pub fit: f64,
    /// Clock bias (s), drift (s/s) and drift rate (s/s²)
    pub af0: f64,
    pub af1: f64,
    pub af2: f64,
    /// Group delays, constellation specific
    pub tgd: [f64; 4],
}

impl Ephemeris {
    pub fn new(sv: SV, toe: Epoch, toc: Epoch) -> Self {
        Self {
            sv,
            iode: 0,
            iodc: 0,
            sva: 0,
            svh: 0,
            week: 0,
            code: 0,
            flag: 0,
            toe,
            toc,
            ttr: toe,
            a: 0.0,
            e: 0.0,
            i0: 0.0,
            omg0: 0.0,
            omg: 0.0,
            m0: 0.0,
            deln: 0.0,
            omgd: 0.0,
            idot: 0.0,
            crc: 0.0,
            crs: 0.0,
            cuc: 0.0,
            cus: 0.0,
            cic: 0.0,
            cis: 0.0,
            toes: 0.0,
            fit: 0.0,
            af0: 0.0,
            af1: 0.0,
            af2: 0.0,
            tgd: [0.0; 4],
        }
    }

    /// Whether `self` carries the same broadcast as `other`.
    ///
    /// Only the identity fields of each constellation are compared: IODE for
    /// GPS and QZSS, IODE with toe and toc for Galileo, toe with IODE and
    /// IODC for BeiDou.
    pub fn same_broadcast(&self, other: &Self) -> bool {
        match self.sv.constellation {
            Constellation::Galileo => {
                self.iode == other.iode && self.toe == other.toe && self.toc == other.toc
            },
            Constellation::BeiDou => {
                self.toe == other.toe && self.iode == other.iode && self.iodc == other.iodc
            },
            _ => self.iode == other.iode,
        }
    }
}

/// GLONASS broadcast ephemeris, assembled from strings 1 to 4
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct GlonassEphemeris {
    pub sv: SV,
    /// Issue of data (tb, 7 bits)
    pub iode: i32,
    /// Frequency channel number
    pub frq: i32,
    pub svh: i32,
    pub sva: i32,
    /// Age of operation
    pub age: i32,
    pub toe: Epoch,
    /// Receiver time when string 4 arrived
    pub tof: Option<Epoch>,
    /// Position, velocity and acceleration (m, m/s, m/s²), PZ-90
    pub pos: [f64; 3],
    pub vel: [f64; 3],
    pub acc: [f64; 3],
    /// Clock bias (s) and relative frequency bias
    pub taun: f64,
    pub gamn: f64,
    /// L1/L2 delay difference (s)
    pub dtaun: f64,
}

impl GlonassEphemeris {
    pub fn new(sv: SV, toe: Epoch) -> Self {
        Self {
            sv,
            iode: 0,
            frq: 0,
            svh: 0,
            sva: 0,
            age: 0,
            toe,
            tof: None,
            pos: [0.0; 3],
            vel: [0.0; 3],
            acc: [0.0; 3],
            taun: 0.0,
            gamn: 0.0,
            dtaun: 0.0,
        }
    }
}

/// Almanac entry, as broadcast in LNAV subframes 4 and 5
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Almanac {
    pub sv: SV,
    pub svh: i32,
    /// AS and SV configuration
    pub svconf: i32,
    pub week: u32,
    pub toa: Epoch,
    pub a: f64,
    pub e: f64,
    pub i0: f64,
    pub omg0: f64,
    pub omg: f64,
    pub m0: f64,
    pub omgd: f64,
    /// Toa in seconds of week
    pub toas: f64,
    pub f0: f64,
    pub f1: f64,
}

/// Klobuchar ionosphere and UTC parameters
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct IonoUtc {
    /// alpha0..3, beta0..3
    pub ion: [f64; 8],
    /// A0, A1, tot, WNt
    pub utc: [f64; 4],
    pub leap_seconds: Option<i32>,
}

/// What a subframe 4 or 5 decode produced
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LnavAlmanac {
    pub almanac: Vec<Almanac>,
    pub iono_utc: Option<IonoUtc>,
}

/// One SBAS broadcast message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SbasMessage {
    pub week: u32,
    /// Reception time of week (s)
    pub tow: u32,
    pub prn: u8,
    /// 226 message bits, MSB first, last 6 bits zero
    pub msg: [u8; SBAS_MSG_LEN],
}

impl SbasMessage {
    /// Message type, bits 8..14
    pub fn message_type(&self) -> u8 {
        crate::field::getbitu(&self.msg, 8, 6) as u8
    }
}

/// SBAS geostationary ephemeris (message type 9)
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SbasEphemeris {
    pub sv: SV,
    /// Reference epoch
    pub t0: Epoch,
    /// Time of message frame
    pub tof: Epoch,
    pub sva: i32,
    pub svh: i32,
    /// Position, velocity and acceleration (m, m/s, m/s²), ECEF
    pub pos: [f64; 3],
    pub vel: [f64; 3],
    pub acc: [f64; 3],
    pub af0: f64,
    pub af1: f64,
}

/// Bit-level navigation message decoders.
///
/// Implementations are pure: given an assembled frame buffer they either
/// return the decoded record or `None` when the buffer does not hold a
/// consistent message. Frame layouts are described on each method.
pub trait NavDecoder {
    /// `frame` holds LNAV subframes 1 to 5 in 30-byte slots, 24 data bits
    /// per word without parity. Called when subframe 3 arrives.
    fn decode_lnav_ephemeris(&self, sv: SV, frame: &[u8; LNAV_FRAME_LEN]) -> Option<Ephemeris>;

    /// `subframe` is the 30-byte slot of subframe 4 or 5.
    fn decode_lnav_almanac(&self, sv: SV, subframe: &[u8]) -> Option<LnavAlmanac>;

    /// `frame` holds I/NAV word types 0 to 6 in 16-byte slots. The decoded
    /// satellite is taken from word type 4.
    fn decode_galileo_inav(&self, frame: &[u8; GALILEO_FRAME_LEN]) -> Option<Ephemeris>;

    /// `frame` holds D1 subframes 1 to 5 in 38-byte slots, 30 bits per word.
    fn decode_beidou_d1(&self, sv: SV, frame: &[u8; BDS_D1_FRAME_LEN]) -> Option<Ephemeris>;

    /// `frame` holds D2 subframe 1 pages 1 to 10 in 38-byte slots.
    fn decode_beidou_d2(&self, sv: SV, frame: &[u8; BDS_D2_FRAME_LEN]) -> Option<Ephemeris>;

    /// Hamming check of one GLONASS string (at least 11 bytes, MSB first).
    fn test_glonass_string(&self, string: &[u8]) -> bool;

    /// `frame` holds strings 1 to 4 in 10-byte slots.
    fn decode_glonass_strings(&self, frame: &[u8; GLONASS_FRAME_LEN]) -> Option<GlonassEphemeris>;
}

/// Decodes nothing and accepts every GLONASS string.
///
/// Enough to extract observations and SBAS messages.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoNavDecoder;

impl NavDecoder for NoNavDecoder {
    fn decode_lnav_ephemeris(&self, _sv: SV, _frame: &[u8; LNAV_FRAME_LEN]) -> Option<Ephemeris> {
        None
    }

    fn decode_lnav_almanac(&self, _sv: SV, _subframe: &[u8]) -> Option<LnavAlmanac> {
        None
    }

    fn decode_galileo_inav(&self, _frame: &[u8; GALILEO_FRAME_LEN]) -> Option<Ephemeris> {
        None
    }

    fn decode_beidou_d1(&self, _sv: SV, _frame: &[u8; BDS_D1_FRAME_LEN]) -> Option<Ephemeris> {
        None
    }

    fn decode_beidou_d2(&self, _sv: SV, _frame: &[u8; BDS_D2_FRAME_LEN]) -> Option<Ephemeris> {
        None
    }

    fn test_glonass_string(&self, _string: &[u8]) -> bool {
        true
    }

    fn decode_glonass_strings(&self, _frame: &[u8; GLONASS_FRAME_LEN]) -> Option<GlonassEphemeris> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::gpst;

    fn eph(constellation: Constellation, iode: i32, iodc: i32, toe: f64, toc: f64) -> Ephemeris {
        let mut eph = Ephemeris::new(SV::new(constellation, 11), gpst(2200, toe), gpst(2200, toc));
        eph.iode = iode;
        eph.iodc = iodc;
        eph
    }

    #[test]
    fn test_gps_identity_is_iode_only() {
        let a = eph(Constellation::GPS, 7, 1, 0.0, 0.0);
        let mut b = eph(Constellation::GPS, 7, 2, 7200.0, 3600.0);
        b.a = 26_560_000.0;
        assert!(b.same_broadcast(&a));
        b.iode = 8;
        assert!(!b.same_broadcast(&a));
    }

    #[test]
    fn test_galileo_identity_includes_epochs() {
        let a = eph(Constellation::Galileo, 100, 0, 600.0, 600.0);
        assert!(eph(Constellation::Galileo, 100, 5, 600.0, 600.0).same_broadcast(&a));
        assert!(!eph(Constellation::Galileo, 100, 0, 1200.0, 600.0).same_broadcast(&a));
        assert!(!eph(Constellation::Galileo, 100, 0, 600.0, 1200.0).same_broadcast(&a));
    }

    #[test]
    fn test_beidou_identity_includes_iodc() {
        let a = eph(Constellation::BeiDou, 1, 1, 600.0, 0.0);
        assert!(eph(Constellation::BeiDou, 1, 1, 600.0, 900.0).same_broadcast(&a));
        assert!(!eph(Constellation::BeiDou, 1, 2, 600.0, 0.0).same_broadcast(&a));
        assert!(!eph(Constellation::BeiDou, 1, 1, 1200.0, 0.0).same_broadcast(&a));
    }

    #[test]
    fn test_sbas_message_type() {
        let mut msg = SbasMessage {
            week: 0,
            tow: 0,
            prn: 129,
            msg: [0; SBAS_MSG_LEN],
        };
        crate::field::setbitu(&mut msg.msg, 8, 6, 26);
        assert_eq!(msg.message_type(), 26);
    }
}
