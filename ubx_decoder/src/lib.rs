//! # ubx_decoder
//!
//! Decoder for the raw measurement and navigation subframe output of u-blox
//! GNSS receivers (UBX-RXM-RAW, UBX-RXM-RAWX, UBX-RXM-SFRB, UBX-RXM-SFRBX).
//!
//! Decoding a stream
//! =================
//!
//! Bytes are fed one at a time into a [UbxDecoder]. Each call returns a
//! [DecodeEvent] telling which product, if any, was refreshed:
//! ```
//! use ubx_decoder::{DecodeEvent, DecoderConfig, UbxDecoder};
//!
//! let config: DecoderConfig = "-TADJ=1.0".parse().unwrap();
//! let mut decoder = UbxDecoder::new().with_config(config);
//! let data = vec![0xb5, 0x62, 0x05, 0x01, 0x02, 0x00, 0x06, 0x01, 0x0f, 0x38];
//! for byte in data {
//!     match decoder.feed(byte) {
//!         Ok(DecodeEvent::ObservationsReady { .. }) => {
//!             let _epoch = decoder.observations();
//!         },
//!         Ok(_) => {},
//!         Err(_) => {
//!             // Malformed frame, decoding resumes with the next byte
//!         },
//!     }
//! }
//! ```
//!
//! Files are read a frame at a time with [UbxDecoder::feed_frame] until it
//! returns [DecodeError::EndOfStream].
//!
//! Navigation data
//! ===============
//!
//! Subframes are reassembled per satellite and integrity checked here. The
//! bit-level interpretation of the assembled buffers is supplied through the
//! [NavDecoder] trait; with the default [NoNavDecoder] no ephemerides are
//! produced but observations and SBAS messages are.
//!
//! Configuring a receiver
//! ======================
//!
//! [gen_ubx] turns a textual `CFG-*` command into a framed UBX message:
//! ```
//! let frame = ubx_decoder::gen_ubx("CFG-RATE 1000 1");
//! assert_eq!(frame.len(), 14);
//! ```

mod config;
mod constants;
mod decoder;
mod error;
pub mod field;
mod navigation;
mod observation;
mod parser;
mod scratch;
pub mod time;
mod ubx_packets;

pub use crate::{
    config::DecoderConfig,
    constants::*,
    decoder::{DecodeEvent, DecodeResult, UbxDecoder},
    error::{ConfigError, DecodeError},
    navigation::{
        Almanac, Ephemeris, EphemerisStore, GlonassEphemeris, IonoUtc, LnavAlmanac, NavDecoder,
        NoNavDecoder, SbasEphemeris, SbasMessage, SbasSet, BDS_D1_FRAME_LEN, BDS_D2_FRAME_LEN,
        BDS_SUBFRAME_LEN, GALILEO_FRAME_LEN, GALILEO_WORD_LEN, GLONASS_FRAME_LEN,
        GLONASS_STRING_LEN, LNAV_FRAME_LEN, LNAV_SUBFRAME_LEN, SBAS_MSG_LEN,
    },
    observation::{LliFlags, ObservationEpoch, ObservationRecord, SignalCode},
    parser::{encode_frame, Frame, Parser},
    ubx_packets::*,
};

pub use gnss::prelude::{Constellation, SV};
pub use hifitime::{Duration, Epoch, TimeScale};
