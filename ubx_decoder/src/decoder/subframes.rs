//! RXM-SFRB and RXM-SFRBX: subframe reassembly and ephemeris change detection.

use gnss::prelude::{Constellation, SV};
use hifitime::Duration;
use log::trace;

use super::{DecodeEvent, DecodeResult, DecoderState};
use crate::{
    error::DecodeError,
    field::{crc24q, getbitu, setbitu},
    navigation::{
        Ephemeris, NavDecoder, SbasMessage, BDS_SUBFRAME_LEN, GALILEO_WORD_LEN,
        GLONASS_STRING_LEN, LNAV_SUBFRAME_LEN, SBAS_MSG_LEN,
    },
    time::to_gpst,
    ubx_packets::{prn_of, satellite, ubx_gnss, ubx_prn, RxmSfrbRef, RxmSfrbxRef},
};

/// Minimum RXM-SFRBX frame length per constellation
const LNAV_MIN_FRAME_LEN: usize = 56;
const GALILEO_MIN_FRAME_LEN: usize = 52;
const BEIDOU_MIN_FRAME_LEN: usize = 56;
const GLONASS_MIN_FRAME_LEN: usize = 32;
const SBAS_MIN_FRAME_LEN: usize = 48;

/// Legacy receivers report SBAS from this PRN on
const MIN_PRN_SBAS: u16 = 120;
/// Highest BeiDou PRN on a geostationary orbit (D2 message)
const MAX_PRN_BDS_GEO: u8 = 5;
/// Word types forming a complete Galileo I/NAV ephemeris
const GALILEO_COMPLETE: u8 = 0x7f;
/// Added to the time of week before truncating to whole seconds
const TOW_ROUNDING: f64 = 0.005;

fn check_len(sfrbx: &RxmSfrbxRef<'_>, expect: usize) -> Result<(), DecodeError> {
    let got = sfrbx.frame_len();
    if got < expect {
        return Err(DecodeError::InvalidPacketLen {
            packet: RxmSfrbxRef::NAME,
            expect,
            got,
        });
    }
    Ok(())
}

/// Writes the low `bits` of each word MSB first, starting at byte `offset` of `buf`.
fn store_words(buf: &mut [u8], offset: usize, bits: usize, words: &[u32]) {
    for (i, &word) in words.iter().enumerate() {
        setbitu(buf, offset * 8 + i * bits, bits, word);
    }
}

impl<D: NavDecoder> DecoderState<D> {
    /// Stores `eph` if it differs from what the slot holds, or always with `-EPHALL`.
    fn store_ephemeris(&mut self, eph: Ephemeris) -> DecodeEvent {
        let sv = eph.sv;
        if !self
            .navigation
            .update_ephemeris(eph, self.config.keep_all_ephemerides)
        {
            return DecodeEvent::NoMessage;
        }
        trace!("{}: ephemeris stored", sv);
        self.last_updated = Some(sv);
        DecodeEvent::EphemerisUpdated(sv)
    }

    pub(super) fn decode_rxm_sfrbx(&mut self, payload: &[u8]) -> DecodeResult {
        let sfrbx = RxmSfrbxRef::new(payload)?;
        let constellation =
            ubx_gnss(sfrbx.gnss_id()).ok_or(DecodeError::UnknownGnss {
                packet: RxmSfrbxRef::NAME,
                gnss_id: sfrbx.gnss_id(),
            })?;
        let prn = ubx_prn(constellation, sfrbx.sv_id());
        let sv = satellite(constellation, prn).ok_or(DecodeError::InvalidSatellite {
            constellation,
            prn,
        })?;
        match constellation {
            Constellation::GPS | Constellation::QZSS => self.decode_lnav(sv, &sfrbx),
            Constellation::Galileo => self.decode_galileo(sv, &sfrbx),
            Constellation::BeiDou => self.decode_beidou(sv, &sfrbx),
            Constellation::Glonass => self.decode_glonass(sv, &sfrbx),
            Constellation::SBAS => self.decode_sbas(sv, &sfrbx),
            _ => Ok(DecodeEvent::NoMessage),
        }
    }

    pub(super) fn decode_rxm_sfrb(&mut self, payload: &[u8]) -> DecodeResult {
        let sfrb = RxmSfrbRef::new(payload)?;
        let prn = u16::from(sfrb.svid());
        let constellation = if prn >= MIN_PRN_SBAS {
            Constellation::SBAS
        } else {
            Constellation::GPS
        };
        let sv = satellite(constellation, prn).ok_or(DecodeError::InvalidSatellite {
            constellation,
            prn,
        })?;
        if constellation == Constellation::SBAS {
            return self.decode_sbas_words(sv, &sfrb.words());
        }

        let id = ((sfrb.dwrd(1) >> 2) & 7) as u8;
        if !(1..=5).contains(&id) {
            return Err(DecodeError::InvalidSubframeId { sv, id });
        }
        let frame = self.scratch.lnav(sv);
        store_words(
            frame,
            usize::from(id - 1) * LNAV_SUBFRAME_LEN,
            24,
            &sfrb.words(),
        );
        self.lnav_subframe_stored(sv, id)
    }

    /// GPS/QZSS LNAV: ten 30-bit words with parity in the low 6 bits
    fn decode_lnav(&mut self, sv: SV, sfrbx: &RxmSfrbxRef<'_>) -> DecodeResult {
        check_len(sfrbx, LNAV_MIN_FRAME_LEN)?;
        let words: [u32; 10] = core::array::from_fn(|i| sfrbx.dwrd(i) >> 6);
        let id = ((words[1] >> 2) & 7) as u8;
        if !(1..=5).contains(&id) {
            return Err(DecodeError::InvalidSubframeId { sv, id });
        }
        let frame = self.scratch.lnav(sv);
        store_words(frame, usize::from(id - 1) * LNAV_SUBFRAME_LEN, 24, &words);
        self.lnav_subframe_stored(sv, id)
    }

    fn lnav_subframe_stored(&mut self, sv: SV, id: u8) -> DecodeResult {
        trace!("{}: subframe {}", sv, id);
        match id {
            3 => {
                let frame = self.scratch.lnav(sv);
                let Some(mut eph) = self.nav_decoder.decode_lnav_ephemeris(sv, frame) else {
                    return Ok(DecodeEvent::NoMessage);
                };
                eph.sv = sv;
                Ok(self.store_ephemeris(eph))
            },
            4 | 5 => {
                let start = usize::from(id - 1) * LNAV_SUBFRAME_LEN;
                let frame = self.scratch.lnav(sv);
                let subframe = &frame[start..start + LNAV_SUBFRAME_LEN];
                match self.nav_decoder.decode_lnav_almanac(sv, subframe) {
                    Some(update) => {
                        self.navigation.merge_almanac(sv.constellation, update);
                        Ok(DecodeEvent::AlmanacUpdated)
                    },
                    None => Ok(DecodeEvent::NoMessage),
                }
            },
            _ => Ok(DecodeEvent::NoMessage),
        }
    }

    /// Galileo I/NAV: an even and an odd half page per frame
    fn decode_galileo(&mut self, sv: SV, sfrbx: &RxmSfrbxRef<'_>) -> DecodeResult {
        check_len(sfrbx, GALILEO_MIN_FRAME_LEN)?;
        let mut buff = [0u8; 32];
        sfrbx.be_bytes(&mut buff);
        let (even, odd) = buff.split_at(16);

        let (part1, page1) = (getbitu(even, 0, 1), getbitu(even, 1, 1));
        let (part2, page2) = (getbitu(odd, 0, 1), getbitu(odd, 1, 1));
        if page1 == 1 || page2 == 1 {
            trace!("{}: alert page", sv);
            return Ok(DecodeEvent::NoMessage);
        }
        if part1 != 0 || part2 != 1 {
            return Err(DecodeError::GalileoEvenOdd { sv });
        }

        let mut crc_buff = [0u8; 26];
        for i in 0..15 {
            setbitu(&mut crc_buff, 4 + i * 8, 8, getbitu(even, i * 8, 8));
        }
        for i in 0..11 {
            setbitu(&mut crc_buff, 118 + i * 8, 8, getbitu(odd, i * 8, 8));
        }
        if crc24q(&crc_buff[..25]) != getbitu(odd, 82, 24) {
            return Err(DecodeError::GalileoCrc { sv });
        }

        let word_type = getbitu(even, 2, 6) as usize;
        if word_type > 6 {
            trace!("{}: word type {} ignored", sv, word_type);
            return Ok(DecodeEvent::NoMessage);
        }
        let gal = self.scratch.galileo(sv);
        if word_type == 2 {
            *gal.seen = 0;
        }
        let start = word_type * GALILEO_WORD_LEN;
        let slot = &mut gal.words[start..start + GALILEO_WORD_LEN];
        let (head, tail) = slot.split_at_mut(14);
        for (i, byte) in head.iter_mut().enumerate() {
            *byte = getbitu(even, 2 + i * 8, 8) as u8;
        }
        for (i, byte) in tail.iter_mut().enumerate() {
            *byte = getbitu(odd, 2 + i * 8, 8) as u8;
        }
        *gal.seen |= 1 << word_type;
        if *gal.seen != GALILEO_COMPLETE {
            return Ok(DecodeEvent::NoMessage);
        }

        let Some(eph) = self.nav_decoder.decode_galileo_inav(gal.words) else {
            return Ok(DecodeEvent::NoMessage);
        };
        if eph.sv != sv {
            return Err(DecodeError::SatelliteMismatch {
                expect: sv,
                got: eph.sv,
            });
        }
        Ok(self.store_ephemeris(eph))
    }

    /// BeiDou D1 (MEO/IGSO) or D2 (GEO): ten 30-bit words with parity
    fn decode_beidou(&mut self, sv: SV, sfrbx: &RxmSfrbxRef<'_>) -> DecodeResult {
        check_len(sfrbx, BEIDOU_MIN_FRAME_LEN)?;
        let words: [u32; 10] = core::array::from_fn(|i| sfrbx.dwrd(i) & 0x3fff_ffff);
        let id = ((words[0] >> 12) & 7) as u8;
        if !(1..=5).contains(&id) {
            return Err(DecodeError::InvalidSubframeId { sv, id });
        }

        let eph = if sv.prn > MAX_PRN_BDS_GEO {
            let frame = self.scratch.beidou_d1(sv);
            store_words(frame, usize::from(id - 1) * BDS_SUBFRAME_LEN, 30, &words);
            if id != 3 {
                return Ok(DecodeEvent::NoMessage);
            }
            self.nav_decoder.decode_beidou_d1(sv, frame)
        } else {
            if id != 1 {
                return Ok(DecodeEvent::NoMessage);
            }
            let page = ((words[1] >> 14) & 0xf) as u8;
            if !(1..=10).contains(&page) {
                return Err(DecodeError::InvalidPageNumber { sv, page });
            }
            let frame = self.scratch.beidou_d2(sv);
            store_words(frame, usize::from(page - 1) * BDS_SUBFRAME_LEN, 30, &words);
            if page != 10 {
                return Ok(DecodeEvent::NoMessage);
            }
            self.nav_decoder.decode_beidou_d2(sv, frame)
        };
        let Some(mut eph) = eph else {
            return Ok(DecodeEvent::NoMessage);
        };
        eph.sv = sv;
        Ok(self.store_ephemeris(eph))
    }

    /// GLONASS: one Hamming protected string per frame
    fn decode_glonass(&mut self, sv: SV, sfrbx: &RxmSfrbxRef<'_>) -> DecodeResult {
        check_len(sfrbx, GLONASS_MIN_FRAME_LEN)?;
        let mut string = [0u8; 16];
        sfrbx.be_bytes(&mut string);
        if !self.nav_decoder.test_glonass_string(&string) {
            return Err(DecodeError::GlonassHamming { sv });
        }
        let m = getbitu(&string, 1, 4) as u8;
        if !(1..=15).contains(&m) {
            return Err(DecodeError::InvalidStringNumber { sv, string: m });
        }

        let glo = self.scratch.glonass(sv);
        if glo.frame_id[..] != string[12..14] {
            trace!("{}: new frame", sv);
            glo.strings.fill(0);
            glo.frame_id.copy_from_slice(&string[12..14]);
        }
        if m <= 4 {
            let start = usize::from(m - 1) * GLONASS_STRING_LEN;
            glo.strings[start..start + GLONASS_STRING_LEN]
                .copy_from_slice(&string[..GLONASS_STRING_LEN]);
        }
        if m != 4 {
            return Ok(DecodeEvent::NoMessage);
        }

        let Some(mut geph) = self.nav_decoder.decode_glonass_strings(glo.strings) else {
            return Ok(DecodeEvent::NoMessage);
        };
        if geph.sv != sv {
            trace!("{}: strings decoded for {}", sv, geph.sv);
            return Ok(DecodeEvent::NoMessage);
        }
        geph.tof = self.time;
        geph.frq = i32::from(sfrbx.freq_id()) - 7;
        if !self
            .navigation
            .update_glonass_ephemeris(geph, self.config.keep_all_ephemerides)
        {
            return Ok(DecodeEvent::NoMessage);
        }
        trace!("{}: ephemeris stored", sv);
        self.last_updated = Some(sv);
        Ok(DecodeEvent::GlonassEphemerisUpdated(sv))
    }

    /// SBAS from RXM-SFRBX: 250 bit message, time tagged one second before reception
    fn decode_sbas(&mut self, sv: SV, sfrbx: &RxmSfrbxRef<'_>) -> DecodeResult {
        check_len(sfrbx, SBAS_MIN_FRAME_LEN)?;
        let Some(time) = self.time else {
            trace!("{}: SBAS message before receiver time", sv);
            return Ok(DecodeEvent::NoMessage);
        };
        let (week, tow) = to_gpst(time - Duration::from_seconds(1.0));
        let mut buff = [0u8; 32];
        sfrbx.be_bytes(&mut buff);
        let mut msg = [0u8; SBAS_MSG_LEN];
        msg.copy_from_slice(&buff[..SBAS_MSG_LEN]);
        msg[SBAS_MSG_LEN - 1] &= 0xc0;
        self.sbas_ready(SbasMessage {
            week,
            tow: tow as u32,
            prn: prn_of(sv) as u8,
            msg,
        })
    }

    /// SBAS from RXM-SFRB: the message is accepted only if its CRC-24Q matches
    fn decode_sbas_words(&mut self, sv: SV, words: &[u32]) -> DecodeResult {
        let Some(time) = self.time else {
            trace!("{}: SBAS message before receiver time", sv);
            return Ok(DecodeEvent::NoMessage);
        };
        let (week, tow) = to_gpst(time);
        let mut msg = [0u8; SBAS_MSG_LEN];
        for (i, word) in words.iter().take(7).enumerate() {
            msg[i * 4..i * 4 + 4].copy_from_slice(&word.to_be_bytes());
        }
        msg[28] = ((words[7] >> 18) & 0xc0) as u8;

        let mut f = [0u8; SBAS_MSG_LEN];
        for i in (1..SBAS_MSG_LEN).rev() {
            f[i] = (msg[i] >> 6).wrapping_add(msg[i - 1] << 2);
        }
        f[0] = msg[0] >> 6;
        if crc24q(&f) != words[7] & 0x00ff_ffff {
            trace!("{}: SBAS crc error", sv);
            return Ok(DecodeEvent::NoMessage);
        }
        self.sbas_ready(SbasMessage {
            week,
            tow: (tow + TOW_ROUNDING) as u32,
            prn: prn_of(sv) as u8,
            msg,
        })
    }

    fn sbas_ready(&mut self, message: SbasMessage) -> DecodeResult {
        trace!("S{}: SBAS message type {}", message.prn, message.message_type());
        self.sbas_message = Some(message);
        Ok(DecodeEvent::SbasMessageReady(message))
    }
}
