use crate::DecodeError;

use super::frame_len;

/// Broadcast navigation data subframe (UBX-RXM-SFRBX)
#[derive(Debug, Clone, Copy)]
pub struct RxmSfrbxRef<'a>(&'a [u8]);

impl<'a> RxmSfrbxRef<'a> {
    pub const ID: u8 = 0x13;
    pub(crate) const NAME: &'static str = "RXM-SFRBX";
    const HEADER_LEN: usize = 8;

    pub fn new(payload: &'a [u8]) -> Result<Self, DecodeError> {
        if payload.len() < Self::HEADER_LEN {
            return Err(DecodeError::InvalidPacketLen {
                packet: Self::NAME,
                expect: frame_len(Self::HEADER_LEN),
                got: frame_len(payload.len()),
            });
        }
        Ok(Self(payload))
    }

    /// Length of the frame this payload came in
    pub fn frame_len(&self) -> usize {
        frame_len(self.0.len())
    }

    /// Data words actually present
    pub fn available_words(&self) -> usize {
        (self.0.len() - Self::HEADER_LEN) / 4
    }

    /// Data word `i`, as transmitted little-endian
    pub fn dwrd(&self, i: usize) -> u32 {
        crate::field::u4(self.0, Self::HEADER_LEN + 4 * i)
    }

    pub fn words(&self) -> impl Iterator<Item = u32> + 'a {
        let payload: &'a [u8] = self.0;
        payload[Self::HEADER_LEN..]
            .chunks_exact(4)
            .map(|w| crate::field::u4(w, 0))
    }

    /// First `out.len() / 4` words, each laid out most significant byte first
    pub fn be_bytes(&self, out: &mut [u8]) {
        for (i, chunk) in out.chunks_exact_mut(4).enumerate() {
            chunk.copy_from_slice(&self.dwrd(i).to_be_bytes());
        }
    }
}

ubx_fields!(RxmSfrbxRef {
    /// GNSS identifier
    gnss_id: u8 = u1 @ 0,
    /// Satellite identifier
    sv_id: u8 = u1 @ 1,
    /// Only used for GLONASS: this is the frequency slot +7
    freq_id: u8 = u1 @ 3,
    /// Number of data words
    num_words: u8 = u1 @ 4,
    chn: u8 = u1 @ 5,
    /// Message version
    version: u8 = u1 @ 6,
});
