//! Stateful receiver decoder: byte stream in, decode events out.

mod measurements;
mod subframes;

use std::{collections::HashMap, io::Read};

use gnss::prelude::SV;
use hifitime::Epoch;
use log::debug;

use crate::{
    config::DecoderConfig,
    constants::NFREQ,
    error::DecodeError,
    navigation::{EphemerisStore, NavDecoder, NoNavDecoder, SbasMessage},
    observation::ObservationEpoch,
    parser::{Frame, Parser},
    scratch::ScratchTable,
    ubx_packets::MessageId,
};

/// What a completed frame produced
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum DecodeEvent {
    /// Frame incomplete, ignored, or without a new product
    NoMessage,
    /// The observation epoch was replaced
    ObservationsReady { time: Epoch, count: usize },
    /// A changed ephemeris was stored for this satellite
    EphemerisUpdated(SV),
    /// Same as [DecodeEvent::EphemerisUpdated], for the GLONASS slot table
    GlonassEphemerisUpdated(SV),
    /// Almanac or ionosphere/UTC parameters were merged
    AlmanacUpdated,
    /// A raw SBAS message was extracted
    SbasMessageReady(SbasMessage),
}

pub type DecodeResult = Result<DecodeEvent, DecodeError>;

/// Everything a decoder remembers between frames, apart from the synchronizer.
#[derive(Debug)]
pub(crate) struct DecoderState<D = NoNavDecoder> {
    config: DecoderConfig,
    nav_decoder: D,
    /// Time tag of the last accepted raw measurement frame
    time: Option<Epoch>,
    scratch: ScratchTable,
    lock_time: HashMap<SV, [f64; NFREQ]>,
    half_cycle: HashMap<SV, [bool; NFREQ]>,
    observations: ObservationEpoch,
    navigation: EphemerisStore,
    sbas_message: Option<SbasMessage>,
    last_updated: Option<SV>,
}

impl<D: NavDecoder> DecoderState<D> {
    fn new(nav_decoder: D) -> Self {
        Self {
            config: DecoderConfig::default(),
            nav_decoder,
            time: None,
            scratch: ScratchTable::default(),
            lock_time: HashMap::new(),
            half_cycle: HashMap::new(),
            observations: ObservationEpoch::default(),
            navigation: EphemerisStore::new(),
            sbas_message: None,
            last_updated: None,
        }
    }

    fn dispatch(&mut self, frame: Frame<'_>) -> DecodeResult {
        let id = MessageId::new(frame.class(), frame.msg_id());
        let payload = frame.payload();
        let result = match id {
            MessageId::RxmRaw => self.decode_rxm_raw(payload),
            MessageId::RxmRawx => self.decode_rxm_rawx(payload),
            MessageId::RxmSfrb => self.decode_rxm_sfrb(payload),
            MessageId::RxmSfrbx => self.decode_rxm_sfrbx(payload),
            MessageId::Other { class, id } => {
                debug!("ignored frame class={:#04x} id={:#04x}", class, id);
                Ok(DecodeEvent::NoMessage)
            },
        };
        if let Err(err) = &result {
            debug!("{:#06x}: {}", id.type_id(), err);
        }
        result
    }
}

/// u-blox raw measurement and subframe decoder.
///
/// Bytes go in through [UbxDecoder::feed] (live streams) or
/// [UbxDecoder::feed_frame] (files), products are read back through the
/// accessors after the matching [DecodeEvent]. Decoding ephemerides out of
/// assembled subframes is delegated to `D`; the default [NoNavDecoder]
/// still yields observations and SBAS messages.
///
/// ```
/// use ubx_decoder::{DecodeEvent, UbxDecoder};
///
/// let mut decoder = UbxDecoder::new();
/// for byte in [0xb5, 0x62, 0x05, 0x01, 0x02, 0x00, 0x06, 0x01, 0x0f, 0x38] {
///     assert_eq!(decoder.feed(byte), Ok(DecodeEvent::NoMessage));
/// }
/// ```
#[derive(Debug)]
pub struct UbxDecoder<D = NoNavDecoder> {
    parser: Parser,
    state: DecoderState<D>,
}

impl Default for UbxDecoder<NoNavDecoder> {
    fn default() -> Self {
        Self::new()
    }
}

impl UbxDecoder<NoNavDecoder> {
    pub fn new() -> Self {
        Self::with_nav_decoder(NoNavDecoder)
    }
}

impl<D: NavDecoder> UbxDecoder<D> {
    pub fn with_nav_decoder(nav_decoder: D) -> Self {
        Self {
            parser: Parser::new(),
            state: DecoderState::new(nav_decoder),
        }
    }

    pub fn with_config(mut self, config: DecoderConfig) -> Self {
        self.state.config = config;
        self
    }

    pub fn set_config(&mut self, config: DecoderConfig) {
        self.state.config = config;
    }

    /// Consumes one byte of a live stream
    pub fn feed(&mut self, byte: u8) -> DecodeResult {
        match self.parser.push(byte) {
            None => Ok(DecodeEvent::NoMessage),
            Some(Ok(frame)) => self.state.dispatch(frame),
            Some(Err(err)) => {
                debug!("{}", err);
                Err(err)
            },
        }
    }

    /// Reads and decodes exactly one frame from `reader`.
    ///
    /// Returns [DecodeEvent::NoMessage] when no sync pattern shows up within
    /// the scan limit, and [DecodeError::EndOfStream] once the input is exhausted.
    pub fn feed_frame<R: Read>(&mut self, reader: &mut R) -> DecodeResult {
        match self.parser.read_frame(reader) {
            Ok(Some(frame)) => self.state.dispatch(frame),
            Ok(None) => {
                debug!("no sync pattern found");
                Ok(DecodeEvent::NoMessage)
            },
            Err(err) => {
                if err != DecodeError::EndOfStream {
                    debug!("{}", err);
                }
                Err(err)
            },
        }
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.state.config
    }

    pub fn nav_decoder(&self) -> &D {
        &self.state.nav_decoder
    }

    /// Latest observation epoch, replaced by every raw measurement frame
    pub fn observations(&self) -> &ObservationEpoch {
        &self.state.observations
    }

    pub fn navigation(&self) -> &EphemerisStore {
        &self.state.navigation
    }

    /// Latest extracted SBAS message
    pub fn sbas_message(&self) -> Option<&SbasMessage> {
        self.state.sbas_message.as_ref()
    }

    /// Satellite whose ephemeris was stored last
    pub fn last_updated(&self) -> Option<SV> {
        self.state.last_updated
    }

    /// Receiver time of the last accepted raw measurement frame
    pub fn time(&self) -> Option<Epoch> {
        self.state.time
    }

    /// Carrier lock time of `sv` on the first frequency: accumulated seconds
    /// for RXM-RAW, last reported `lockTime` (ms) for RXM-RAWX
    pub fn lock_time(&self, sv: SV) -> Option<f64> {
        self.state.lock_time.get(&sv).map(|lock| lock[0])
    }

    /// Last RXM-RAWX half cycle subtracted flag of `sv` on the first frequency
    pub fn half_cycle_subtracted(&self, sv: SV) -> Option<bool> {
        self.state.half_cycle.get(&sv).map(|half| half[0])
    }

    pub fn parser(&self) -> &Parser {
        &self.parser
    }
}
