//! Little-endian field codec and MSB-first bit accessors.
//!
//! Callers guarantee every requested span lies inside the buffer: offsets
//! come from fixed packet layouts whose lengths are checked before any
//! field is touched. Reaching outside the buffer panics.

use bitvec::prelude::*;
use byteorder::{ByteOrder, LittleEndian};

pub fn u1(buf: &[u8], offset: usize) -> u8 {
    buf[offset]
}

pub fn i1(buf: &[u8], offset: usize) -> i8 {
    buf[offset] as i8
}

pub fn u2(buf: &[u8], offset: usize) -> u16 {
    LittleEndian::read_u16(&buf[offset..])
}

pub fn i2(buf: &[u8], offset: usize) -> i16 {
    LittleEndian::read_i16(&buf[offset..])
}

pub fn u4(buf: &[u8], offset: usize) -> u32 {
    LittleEndian::read_u32(&buf[offset..])
}

pub fn i4(buf: &[u8], offset: usize) -> i32 {
    LittleEndian::read_i32(&buf[offset..])
}

pub fn r4(buf: &[u8], offset: usize) -> f32 {
    LittleEndian::read_f32(&buf[offset..])
}

pub fn r8(buf: &[u8], offset: usize) -> f64 {
    LittleEndian::read_f64(&buf[offset..])
}

pub fn set_u1(buf: &mut [u8], offset: usize, value: u8) {
    buf[offset] = value;
}

pub fn set_i1(buf: &mut [u8], offset: usize, value: i8) {
    buf[offset] = value as u8;
}

pub fn set_u2(buf: &mut [u8], offset: usize, value: u16) {
    LittleEndian::write_u16(&mut buf[offset..], value);
}

pub fn set_i2(buf: &mut [u8], offset: usize, value: i16) {
    LittleEndian::write_i16(&mut buf[offset..], value);
}

pub fn set_u4(buf: &mut [u8], offset: usize, value: u32) {
    LittleEndian::write_u32(&mut buf[offset..], value);
}

pub fn set_i4(buf: &mut [u8], offset: usize, value: i32) {
    LittleEndian::write_i32(&mut buf[offset..], value);
}

pub fn set_r4(buf: &mut [u8], offset: usize, value: f32) {
    LittleEndian::write_f32(&mut buf[offset..], value);
}

pub fn set_r8(buf: &mut [u8], offset: usize, value: f64) {
    LittleEndian::write_f64(&mut buf[offset..], value);
}

/// Reads `len` (at most 32) bits starting at bit `pos`, MSB first.
pub fn getbitu(buf: &[u8], pos: usize, len: usize) -> u32 {
    debug_assert!(len <= 32);
    if len == 0 {
        return 0;
    }
    buf.view_bits::<Msb0>()[pos..pos + len].load_be::<u32>()
}

/// Signed variant of [getbitu], sign-extended from bit `len - 1`.
pub fn getbits(buf: &[u8], pos: usize, len: usize) -> i32 {
    let bits = getbitu(buf, pos, len);
    if len == 0 || len >= 32 || bits & (1 << (len - 1)) == 0 {
        return bits as i32;
    }
    (bits | (!0u32 << len)) as i32
}

/// Writes the low `len` (at most 32) bits of `data` at bit `pos`, MSB first.
pub fn setbitu(buf: &mut [u8], pos: usize, len: usize, data: u32) {
    debug_assert!(len <= 32);
    if len == 0 {
        return;
    }
    buf.view_bits_mut::<Msb0>()[pos..pos + len].store_be(data);
}

pub fn setbits(buf: &mut [u8], pos: usize, len: usize, data: i32) {
    setbitu(buf, pos, len, data as u32);
}

const CRC24Q_POLY: u32 = 0x0186_4cfb;

/// CRC-24Q (Qualcomm) over `buf`, as used by Galileo I/NAV and SBAS.
pub fn crc24q(buf: &[u8]) -> u32 {
    let mut crc = 0u32;
    for &byte in buf {
        crc ^= u32::from(byte) << 16;
        for _ in 0..8 {
            crc <<= 1;
            if crc & 0x0100_0000 != 0 {
                crc ^= CRC24Q_POLY;
            }
        }
    }
    crc & 0x00ff_ffff
}
