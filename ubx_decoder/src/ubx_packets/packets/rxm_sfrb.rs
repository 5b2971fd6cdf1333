use crate::DecodeError;

use super::frame_len;

/// Subframe buffer of legacy receivers (UBX-RXM-SFRB)
///
/// Ten 24-bit words (parity stripped) in the low bits of each `u32`.
#[derive(Debug, Clone, Copy)]
pub struct RxmSfrbRef<'a>(&'a [u8]);

impl<'a> RxmSfrbRef<'a> {
    pub const ID: u8 = 0x11;
    pub(crate) const NAME: &'static str = "RXM-SFRB";
    pub const NUM_WORDS: usize = 10;
    const PAYLOAD_LEN: usize = 2 + 4 * Self::NUM_WORDS;

    pub fn new(payload: &'a [u8]) -> Result<Self, DecodeError> {
        if payload.len() < Self::PAYLOAD_LEN {
            return Err(DecodeError::InvalidPacketLen {
                packet: Self::NAME,
                expect: frame_len(Self::PAYLOAD_LEN),
                got: frame_len(payload.len()),
            });
        }
        Ok(Self(payload))
    }

    pub fn dwrd(&self, i: usize) -> u32 {
        crate::field::u4(self.0, 2 + 4 * i)
    }

    pub fn words(&self) -> [u32; RxmSfrbRef::NUM_WORDS] {
        core::array::from_fn(|i| self.dwrd(i))
    }
}

ubx_fields!(RxmSfrbRef {
    /// Channel number
    chn: u8 = u1 @ 0,
    /// Satellite PRN
    svid: u8 = u1 @ 1,
});
