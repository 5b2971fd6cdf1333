//! Frame forging helpers shared by the integration tests.
//!
//! Frames are assembled by hand with `byteorder` so that the decoder is
//! checked against an independent encoder, not against its own.

#![allow(dead_code)]

use byteorder::{LittleEndian, WriteBytesExt};
use ubx_decoder::{
    field::{crc24q, getbitu, setbitu},
    time::gpst,
    Constellation, DecodeEvent, Ephemeris, GlonassEphemeris, IonoUtc, LnavAlmanac, NavDecoder,
    UbxDecoder, BDS_D1_FRAME_LEN, BDS_D2_FRAME_LEN, GALILEO_FRAME_LEN, GLONASS_FRAME_LEN,
    LNAV_FRAME_LEN, SV,
};

/// Calculates the 8-bit Fletcher-16 checksum used by u-blox.
pub fn calculate_checksum(data: &[u8]) -> (u8, u8) {
    let mut ck_a: u8 = 0;
    let mut ck_b: u8 = 0;
    for byte in data {
        ck_a = ck_a.wrapping_add(*byte);
        ck_b = ck_b.wrapping_add(ck_a);
    }
    (ck_a, ck_b)
}

/// Complete UBX frame around `payload`
pub fn ubx_frame(class: u8, msg_id: u8, payload: &[u8]) -> Vec<u8> {
    let mut frame_core = Vec::with_capacity(4 + payload.len());
    frame_core.push(class);
    frame_core.push(msg_id);
    frame_core
        .write_u16::<LittleEndian>(payload.len() as u16)
        .unwrap();
    frame_core.extend_from_slice(payload);

    let (ck_a, ck_b) = calculate_checksum(&frame_core);

    let mut frame = Vec::with_capacity(8 + payload.len());
    frame.push(0xb5);
    frame.push(0x62);
    frame.extend_from_slice(&frame_core);
    frame.push(ck_a);
    frame.push(ck_b);
    frame
}

/// Feeds `bytes` one at a time, returning every event other than `NoMessage`
pub fn feed_all<D: NavDecoder>(
    decoder: &mut UbxDecoder<D>,
    bytes: &[u8],
) -> Vec<Result<DecodeEvent, ubx_decoder::DecodeError>> {
    bytes
        .iter()
        .map(|b| decoder.feed(*b))
        .filter(|res| res != &Ok(DecodeEvent::NoMessage))
        .collect()
}

/// Feeds one frame, expecting exactly one call to complete it
pub fn feed_frame<D: NavDecoder>(
    decoder: &mut UbxDecoder<D>,
    frame: &[u8],
) -> Result<DecodeEvent, ubx_decoder::DecodeError> {
    let (last, head) = frame.split_last().unwrap();
    for b in head {
        assert_eq!(decoder.feed(*b), Ok(DecodeEvent::NoMessage));
    }
    decoder.feed(*last)
}

/// One satellite block of UBX-RXM-RAW
#[derive(Debug, Clone, Copy, Default)]
pub struct RawMeas {
    pub cp: f64,
    pub pr: f64,
    pub doppler: f32,
    pub sv: u8,
    pub mes_qi: i8,
    pub cno: i8,
    pub lli: u8,
}

pub fn rxm_raw(week: u16, itow_ms: u32, meas: &[RawMeas]) -> Vec<u8> {
    let mut wtr = Vec::with_capacity(8 + 24 * meas.len());
    wtr.write_u32::<LittleEndian>(itow_ms).unwrap();
    wtr.write_u16::<LittleEndian>(week).unwrap();
    wtr.write_u8(meas.len() as u8).unwrap();
    wtr.write_u8(0).unwrap();
    for m in meas {
        wtr.write_f64::<LittleEndian>(m.cp).unwrap();
        wtr.write_f64::<LittleEndian>(m.pr).unwrap();
        wtr.write_f32::<LittleEndian>(m.doppler).unwrap();
        wtr.write_u8(m.sv).unwrap();
        wtr.write_i8(m.mes_qi).unwrap();
        wtr.write_i8(m.cno).unwrap();
        wtr.write_u8(m.lli).unwrap();
    }
    ubx_frame(0x02, 0x10, &wtr)
}

/// One measurement block of UBX-RXM-RAWX
#[derive(Debug, Clone, Copy, Default)]
pub struct RawxMeas {
    pub pr: f64,
    pub cp: f64,
    pub doppler: f32,
    pub gnss_id: u8,
    pub sv_id: u8,
    pub sig_id: u8,
    pub freq_id: u8,
    pub lock_time: u16,
    pub cno: u8,
    pub pr_stdev: u8,
    pub cp_stdev: u8,
    pub do_stdev: u8,
    pub trk_stat: u8,
}

impl RawxMeas {
    /// Tracked GPS satellite with valid code and phase
    pub fn gps(sv_id: u8) -> Self {
        Self {
            pr: 21_000_000.0 + f64::from(sv_id),
            cp: 110_000_000.0 + f64::from(sv_id),
            doppler: -1200.5,
            sv_id,
            lock_time: 5000,
            cno: 42,
            cp_stdev: 1,
            trk_stat: 0x07,
            ..Default::default()
        }
    }
}

pub fn rxm_rawx(week: u16, rcv_tow: f64, meas: &[RawxMeas]) -> Vec<u8> {
    let mut wtr = Vec::with_capacity(16 + 32 * meas.len());
    wtr.write_f64::<LittleEndian>(rcv_tow).unwrap();
    wtr.write_u16::<LittleEndian>(week).unwrap();
    wtr.write_i8(18).unwrap();
    wtr.write_u8(meas.len() as u8).unwrap();
    wtr.write_u8(0x01).unwrap();
    wtr.write_u8(0x01).unwrap();
    wtr.write_u16::<LittleEndian>(0).unwrap();
    for m in meas {
        wtr.write_f64::<LittleEndian>(m.pr).unwrap();
        wtr.write_f64::<LittleEndian>(m.cp).unwrap();
        wtr.write_f32::<LittleEndian>(m.doppler).unwrap();
        wtr.write_u8(m.gnss_id).unwrap();
        wtr.write_u8(m.sv_id).unwrap();
        wtr.write_u8(m.sig_id).unwrap();
        wtr.write_u8(m.freq_id).unwrap();
        wtr.write_u16::<LittleEndian>(m.lock_time).unwrap();
        wtr.write_u8(m.cno).unwrap();
        wtr.write_u8(m.pr_stdev).unwrap();
        wtr.write_u8(m.cp_stdev).unwrap();
        wtr.write_u8(m.do_stdev).unwrap();
        wtr.write_u8(m.trk_stat).unwrap();
        wtr.write_u8(0).unwrap();
    }
    ubx_frame(0x02, 0x15, &wtr)
}

pub fn rxm_sfrbx(gnss_id: u8, sv_id: u8, freq_id: u8, words: &[u32]) -> Vec<u8> {
    let mut wtr = Vec::with_capacity(8 + 4 * words.len());
    wtr.write_u8(gnss_id).unwrap();
    wtr.write_u8(sv_id).unwrap();
    wtr.write_u8(0).unwrap();
    wtr.write_u8(freq_id).unwrap();
    wtr.write_u8(words.len() as u8).unwrap();
    wtr.write_u8(0).unwrap();
    wtr.write_u8(0x02).unwrap();
    wtr.write_u8(0).unwrap();
    for w in words {
        wtr.write_u32::<LittleEndian>(*w).unwrap();
    }
    ubx_frame(0x02, 0x13, &wtr)
}

pub fn rxm_sfrb(chn: u8, svid: u8, words: &[u32; 10]) -> Vec<u8> {
    let mut wtr = Vec::with_capacity(42);
    wtr.write_u8(chn).unwrap();
    wtr.write_u8(svid).unwrap();
    for w in words {
        wtr.write_u32::<LittleEndian>(*w).unwrap();
    }
    ubx_frame(0x02, 0x11, &wtr)
}

/// 24-bit LNAV data words of subframe `id`.
///
/// Word 2 of subframe 3 carries `iode` in its top byte and `m0` in the rest,
/// which is where [MockNavDecoder] reads them back.
pub fn lnav_data_words(id: u8, iode: u8, m0: u16) -> [u32; 10] {
    let mut words = [0u32; 10];
    words[0] = 0x8b_0000;
    words[1] = u32::from(id) << 2;
    words[2] = (u32::from(iode) << 16) | u32::from(m0);
    words
}

/// RXM-SFRBX words for LNAV: data in bits 29..6, parity zeroed
pub fn lnav_sfrbx_words(id: u8, iode: u8, m0: u16) -> [u32; 10] {
    lnav_data_words(id, iode, m0).map(|w| w << 6)
}

/// One Galileo I/NAV even/odd page pair carrying `word`, CRC included.
///
/// `word` is the 128-bit word, first byte holding the word type in its top 6 bits.
pub fn galileo_page_words(word: &[u8; 16]) -> [u32; 8] {
    let mut buff = [0u8; 32];
    {
        let (even, odd) = buff.split_at_mut(16);
        setbitu(odd, 0, 1, 1);
        for (i, byte) in word.iter().enumerate().take(14) {
            setbitu(even, 2 + i * 8, 8, u32::from(*byte));
        }
        for (i, byte) in word.iter().enumerate().skip(14) {
            setbitu(odd, 2 + (i - 14) * 8, 8, u32::from(*byte));
        }
        let mut crc_buff = [0u8; 26];
        for i in 0..15 {
            setbitu(&mut crc_buff, 4 + i * 8, 8, getbitu(even, i * 8, 8));
        }
        for i in 0..11 {
            setbitu(&mut crc_buff, 118 + i * 8, 8, getbitu(odd, i * 8, 8));
        }
        setbitu(odd, 82, 24, crc24q(&crc_buff[..25]));
    }
    core::array::from_fn(|i| u32::from_be_bytes(buff[i * 4..i * 4 + 4].try_into().unwrap()))
}

/// Galileo word of `word_type`; word type 4 names the satellite and issue of data
pub fn galileo_word(word_type: u8, svid: u8, iod: u16) -> [u8; 16] {
    let mut word = [0u8; 16];
    setbitu(&mut word, 0, 6, u32::from(word_type));
    if word_type == 4 {
        setbitu(&mut word, 6, 10, u32::from(iod));
        setbitu(&mut word, 16, 6, u32::from(svid));
    }
    word
}

/// 30-bit BeiDou words of D1 subframe `id`; word 2 carries `iode` in its top byte
pub fn beidou_d1_words(id: u8, iode: u8) -> [u32; 10] {
    let mut words = [0u32; 10];
    words[0] = 0x3890_0000 | (u32::from(id) << 12);
    words[2] = u32::from(iode) << 22;
    words
}

/// 30-bit BeiDou words of D2 subframe 1 page `page`
pub fn beidou_d2_words(page: u8, iode: u8) -> [u32; 10] {
    let mut words = beidou_d1_words(1, iode);
    words[1] = u32::from(page) << 14;
    words
}

/// GLONASS string `m` of the frame tagged `frame_id`, as four big-endian words.
///
/// String 2 carries `iode` at bits 9..16, string 4 the slot at bits 10..15.
pub fn glonass_string(m: u8, frame_id: [u8; 2], iode: u8, slot: u8) -> [u32; 4] {
    let mut string = [0u8; 16];
    setbitu(&mut string, 1, 4, u32::from(m));
    if m == 2 {
        setbitu(&mut string, 9, 7, u32::from(iode));
    }
    if m == 4 {
        setbitu(&mut string, 10, 5, u32::from(slot));
    }
    string[12..14].copy_from_slice(&frame_id);
    core::array::from_fn(|i| u32::from_be_bytes(string[i * 4..i * 4 + 4].try_into().unwrap()))
}

/// SBAS RXM-SFRB words carrying the 226 bits of `msg`, CRC-24Q in the last word
pub fn sbas_sfrb_words(msg: &[u8; 29]) -> [u32; 10] {
    let mut msg = *msg;
    msg[28] &= 0xc0;
    let mut f = [0u8; 29];
    for i in (1..29).rev() {
        f[i] = (msg[i] >> 6).wrapping_add(msg[i - 1] << 2);
    }
    f[0] = msg[0] >> 6;
    let crc = crc24q(&f);

    let mut words = [0u32; 10];
    for (i, word) in words.iter_mut().enumerate().take(7) {
        *word = u32::from_be_bytes(msg[i * 4..i * 4 + 4].try_into().unwrap());
    }
    words[7] = (u32::from(msg[28]) << 18) | crc;
    words
}

/// Bit-level decoder stand-in.
///
/// Identity fields are read from fixed places of the assembled buffers (see
/// the word builders above), everything else is left at its default.
#[derive(Debug, Default)]
pub struct MockNavDecoder;

fn mock_eph(sv: SV, iode: u32) -> Ephemeris {
    let t = gpst(2200, 345_600.0);
    let mut eph = Ephemeris::new(sv, t, t);
    eph.iode = iode as i32;
    eph
}

impl NavDecoder for MockNavDecoder {
    fn decode_lnav_ephemeris(&self, sv: SV, frame: &[u8; LNAV_FRAME_LEN]) -> Option<Ephemeris> {
        // subframes 1 and 2 must have been stored
        for id in 1..=2u32 {
            if getbitu(frame, (id as usize - 1) * 240 + 24 + 19, 3) != id {
                return None;
            }
        }
        let mut eph = mock_eph(sv, getbitu(frame, 2 * 240 + 48, 8));
        eph.m0 = f64::from(getbitu(frame, 2 * 240 + 56, 16));
        Some(eph)
    }

    fn decode_lnav_almanac(&self, _sv: SV, subframe: &[u8]) -> Option<LnavAlmanac> {
        if getbitu(subframe, 24 + 19, 3) != 4 {
            return None;
        }
        Some(LnavAlmanac {
            almanac: vec![],
            iono_utc: Some(IonoUtc {
                ion: [f64::from(getbitu(subframe, 48, 8)); 8],
                ..Default::default()
            }),
        })
    }

    fn decode_galileo_inav(&self, frame: &[u8; GALILEO_FRAME_LEN]) -> Option<Ephemeris> {
        let svid = getbitu(frame, 4 * 128 + 16, 6) as u8;
        let sv = SV::new(Constellation::Galileo, svid);
        Some(mock_eph(sv, getbitu(frame, 4 * 128 + 6, 10)))
    }

    fn decode_beidou_d1(&self, sv: SV, frame: &[u8; BDS_D1_FRAME_LEN]) -> Option<Ephemeris> {
        Some(mock_eph(sv, getbitu(frame, 2 * 304 + 60, 8)))
    }

    fn decode_beidou_d2(&self, sv: SV, frame: &[u8; BDS_D2_FRAME_LEN]) -> Option<Ephemeris> {
        Some(mock_eph(sv, getbitu(frame, 9 * 304 + 60, 8)))
    }

    fn test_glonass_string(&self, string: &[u8]) -> bool {
        string[10] != 0xee
    }

    fn decode_glonass_strings(&self, frame: &[u8; GLONASS_FRAME_LEN]) -> Option<GlonassEphemeris> {
        // strings 1 to 3 must be present
        for m in 1..=3u32 {
            if getbitu(frame, (m as usize - 1) * 80 + 1, 4) != m {
                return None;
            }
        }
        let slot = getbitu(frame, 3 * 80 + 10, 5) as u8;
        let mut geph =
            GlonassEphemeris::new(SV::new(Constellation::Glonass, slot), gpst(2200, 0.0));
        geph.iode = getbitu(frame, 80 + 9, 7) as i32;
        Some(geph)
    }
}
