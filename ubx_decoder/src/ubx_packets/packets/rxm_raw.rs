use crate::DecodeError;

use super::frame_len;

/// Raw measurement data, single frequency (UBX-RXM-RAW)
#[derive(Debug, Clone, Copy)]
pub struct RxmRawRef<'a>(&'a [u8]);

impl<'a> RxmRawRef<'a> {
    pub const ID: u8 = 0x10;
    pub(crate) const NAME: &'static str = "RXM-RAW";
    const HEADER_LEN: usize = 8;
    const BLOCK_LEN: usize = 24;

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
        let expect = 12 + Self::BLOCK_LEN * usize::from(pack.num_sv());
        if got < expect {
            return Err(DecodeError::InvalidPacketLen {
                packet: Self::NAME,
                expect,
                got,
            });
        }
        Ok(pack)
    }

    /// Complete measurement blocks, at most [RxmRawRef::num_sv] of them
    pub fn measurements(&self) -> impl Iterator<Item = RxmRawMeasRef<'a>> {
        let payload: &'a [u8] = self.0;
        payload[Self::HEADER_LEN..]
            .chunks_exact(Self::BLOCK_LEN)
            .take(usize::from(self.num_sv()))
            .map(RxmRawMeasRef)
    }
}

ubx_fields!(RxmRawRef {
    /// Measurement time of week in receiver local time (ms)
    itow: u32 = u4 @ 0,
    /// Measurement GPS week number
    week: u16 = u2 @ 4,
    /// Number of satellites following
    num_sv: u8 = u1 @ 6,
});

/// One satellite block of [RxmRawRef]
#[derive(Debug, Clone, Copy)]
pub struct RxmRawMeasRef<'a>(&'a [u8]);

ubx_fields!(RxmRawMeasRef {
    /// Carrier phase (cycles)
    cp_mes: f64 = r8 @ 0,
    /// Pseudorange (m)
    pr_mes: f64 = r8 @ 8,
    /// Doppler (Hz)
    do_mes: f32 = r4 @ 16,
    /// Space vehicle number
    sv: u8 = u1 @ 20,
    /// Nav measurement quality indicator
    mes_qi: i8 = i1 @ 21,
    /// Signal strength C/No (dBHz)
    cno: i8 = i1 @ 22,
    /// Loss of lock indicator (RINEX definition)
    lli: u8 = u1 @ 23,
});
