//! Zero-copy views over the RXM payloads this crate decodes.
//!
//! Constructors check the payload length against the counts announced in
//! the header, so accessors never read past the payload.

/// Generates little-endian field accessors for a payload view
macro_rules! ubx_fields {
    ($name:ident { $( $(#[$meta:meta])* $field:ident: $ret:ty = $get:ident @ $offset:expr ),* $(,)? }) => {
        impl $name<'_> {
            $(
                $(#[$meta])*
                pub fn $field(&self) -> $ret {
                    crate::field::$get(self.0, $offset)
                }
            )*
        }
    };
}

mod rxm_raw;
mod rxm_rawx;
mod rxm_sfrb;
mod rxm_sfrbx;

pub use rxm_raw::{RxmRawMeasRef, RxmRawRef};
pub use rxm_rawx::{RxmRawxMeasRef, RxmRawxRef, TrkStatFlags};
pub use rxm_sfrb::RxmSfrbRef;
pub use rxm_sfrbx::RxmSfrbxRef;

/// Frame length of a payload of `payload_len` bytes
pub(crate) const fn frame_len(payload_len: usize) -> usize {
    payload_len + crate::constants::UBX_HEADER_LEN + crate::constants::UBX_CHECKSUM_LEN
}
