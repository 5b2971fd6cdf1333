use bitflags::bitflags;

use crate::DecodeError;

use super::frame_len;

/// Multi-GNSS raw measurement data (UBX-RXM-RAWX)
#[derive(Debug, Clone, Copy)]
pub struct RxmRawxRef<'a>(&'a [u8]);

impl<'a> RxmRawxRef<'a> {
    pub const ID: u8 = 0x15;
    pub(crate) const NAME: &'static str = "RXM-RAWX";
    const HEADER_LEN: usize = 16;
    const BLOCK_LEN: usize = 32;

    pub fn new(payload: &'a [u8]) -> Result<Self, DecodeError> {
        let got = frame_len(payload.len());
        if payload.len() < Self::HEADER_LEN {
            return Err(DecodeError::InvalidPacketLen {
                packet: Self::NAME,
                expect: frame_len(Self::HEADER_LEN),
                got,
            });
        }
        let pack = Self(payload);
        let expect = frame_len(Self::HEADER_LEN + Self::BLOCK_LEN * usize::from(pack.num_meas()));
        if got < expect {
            return Err(DecodeError::InvalidPacketLen {
                packet: Self::NAME,
                expect,
                got,
            });
        }
        Ok(pack)
    }

    pub fn measurements(&self) -> impl Iterator<Item = RxmRawxMeasRef<'a>> {
        let payload: &'a [u8] = self.0;
        payload[Self::HEADER_LEN..]
            .chunks_exact(Self::BLOCK_LEN)
            .take(usize::from(self.num_meas()))
            .map(RxmRawxMeasRef)
    }
}

ubx_fields!(RxmRawxRef {
    /// Measurement time of week in receiver local time approximately aligned to the GPS time system.
    rcv_tow: f64 = r8 @ 0,
    /// GPS week number in receiver local time.
    week: u16 = u2 @ 8,
    /// GPS leap seconds (GPS-UTC)
    leap_s: i8 = i1 @ 10,
    /// Number of measurements to follow
    num_meas: u8 = u1 @ 11,
    /// Receiver tracking status bitfield
    rec_stat: u8 = u1 @ 12,
    /// Message version
    version: u8 = u1 @ 13,
});

/// One signal block of [RxmRawxRef]
#[derive(Debug, Clone, Copy)]
pub struct RxmRawxMeasRef<'a>(&'a [u8]);

impl RxmRawxMeasRef<'_> {
    pub fn trk_stat(&self) -> TrkStatFlags {
        TrkStatFlags::from_bits_retain(self.trk_stat_raw())
    }
}

ubx_fields!(RxmRawxMeasRef {
    /// Pseudorange (m)
    pr_mes: f64 = r8 @ 0,
    /// Carrier phase (cycles)
    cp_mes: f64 = r8 @ 8,
    /// Doppler (Hz)
    do_mes: f32 = r4 @ 16,
    gnss_id: u8 = u1 @ 20,
    sv_id: u8 = u1 @ 21,
    sig_id: u8 = u1 @ 22,
    /// Only used for GLONASS: this is the frequency slot +7
    freq_id: u8 = u1 @ 23,
    /// Carrier phase locktime counter (ms, saturates at 64500)
    lock_time: u16 = u2 @ 24,
    /// Carrier-to-noise density ratio (dBHz)
    cno: u8 = u1 @ 26,
    pr_stdev: u8 = u1 @ 27,
    /// Carrier phase std-dev index, low nibble (0.004 cycles * 2^n)
    cp_stdev: u8 = u1 @ 28,
    do_stdev: u8 = u1 @ 29,
    trk_stat_raw: u8 = u1 @ 30,
});

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct TrkStatFlags: u8 {
        const PR_VALID = 0x01;
        const CP_VALID = 0x02;
        const HALF_CYCLE = 0x04;
        const SUB_HALF_CYCLE = 0x08;
    }
}
