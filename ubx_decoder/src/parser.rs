//! UBX frame synchronizer.
//!
//! Two entry points share one state machine: [Parser::push] consumes a
//! single byte from a live stream and [Parser::read_frame] pulls one frame
//! out of a buffered source. Fed the same bytes, both hand out the same
//! sequence of frames.

mod checksum;

use std::io::Read;

use byteorder::ReadBytesExt;
use log::trace;

use crate::{
    constants::{
        MAX_FRAME_LEN, MAX_SYNC_SCAN, UBX_CHECKSUM_LEN, UBX_CLASS_OFFSET, UBX_HEADER_LEN,
        UBX_LENGTH_OFFSET, UBX_SYNC_CHAR_1, UBX_SYNC_CHAR_2,
    },
    field, DecodeError,
};

use checksum::FrameChecksum;

/// One complete, checksum-verified UBX frame borrowed from the parser buffer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame<'a> {
    bytes: &'a [u8],
}

impl<'a> Frame<'a> {
    pub fn class(&self) -> u8 {
        self.bytes[UBX_CLASS_OFFSET]
    }

    pub fn msg_id(&self) -> u8 {
        self.bytes[UBX_CLASS_OFFSET + 1]
    }

    /// Payload without header and checksum
    pub fn payload(&self) -> &'a [u8] {
        &self.bytes[UBX_HEADER_LEN..self.bytes.len() - UBX_CHECKSUM_LEN]
    }

    /// Total frame length: header, payload and checksum
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SyncState {
    Seeking,
    Accumulating,
}

/// Streaming UBX frame synchronizer
#[derive(Debug)]
pub struct Parser {
    buf: Vec<u8>,
    state: SyncState,
    expected_len: usize,
    sync: [u8; 2],
    checksum: FrameChecksum,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser {
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(MAX_FRAME_LEN),
            state: SyncState::Seeking,
            expected_len: 0,
            sync: [0; 2],
            checksum: FrameChecksum::default(),
        }
    }

    /// Number of bytes of the frame currently being assembled
    pub fn buffer_len(&self) -> usize {
        match self.state {
            SyncState::Seeking => 0,
            SyncState::Accumulating => self.buf.len(),
        }
    }

    pub fn is_buffer_empty(&self) -> bool {
        self.buffer_len() == 0
    }

    /// Total length announced by the frame being assembled, once its header is in
    pub fn expected_len(&self) -> Option<usize> {
        match self.state {
            SyncState::Accumulating if self.buf.len() >= UBX_HEADER_LEN => Some(self.expected_len),
            _ => None,
        }
    }

    fn shift_sync(&mut self, byte: u8) -> bool {
        self.sync = [self.sync[1], byte];
        self.sync == [UBX_SYNC_CHAR_1, UBX_SYNC_CHAR_2]
    }

    fn start_frame(&mut self) {
        self.buf.clear();
        self.buf.extend_from_slice(&[UBX_SYNC_CHAR_1, UBX_SYNC_CHAR_2]);
        self.state = SyncState::Accumulating;
        self.expected_len = 0;
        self.checksum = FrameChecksum::default();
    }

    fn announced_len(&self) -> usize {
        usize::from(field::u2(&self.buf, UBX_LENGTH_OFFSET)) + UBX_HEADER_LEN + UBX_CHECKSUM_LEN
    }

    fn finish_frame(&mut self, checksum: FrameChecksum) -> Result<Frame<'_>, DecodeError> {
        self.state = SyncState::Seeking;
        let n = self.buf.len();
        checksum.check([self.buf[n - 2], self.buf[n - 1]])?;
        trace!(
            "frame class={:#04x} id={:#04x} len={}",
            self.buf[UBX_CLASS_OFFSET],
            self.buf[UBX_CLASS_OFFSET + 1],
            self.buf.len()
        );
        Ok(Frame { bytes: &self.buf })
    }

    /// Consumes one byte of a live stream.
    ///
    /// Returns `None` while no frame is complete. A completed frame is
    /// returned only once its checksum has been verified.
    pub fn push(&mut self, byte: u8) -> Option<Result<Frame<'_>, DecodeError>> {
        if self.state == SyncState::Seeking {
            if self.shift_sync(byte) {
                self.sync = [0; 2];
                self.start_frame();
            }
            return None;
        }
        self.buf.push(byte);
        if self.buf.len() <= UBX_HEADER_LEN
            || self.buf.len() + UBX_CHECKSUM_LEN <= self.expected_len
        {
            self.checksum.push(byte);
        }

        if self.buf.len() == UBX_HEADER_LEN {
            let len = self.announced_len();
            if len > MAX_FRAME_LEN {
                self.state = SyncState::Seeking;
                return Some(Err(DecodeError::FrameTooLong { len }));
            }
            self.expected_len = len;
        }
        if self.buf.len() < UBX_HEADER_LEN || self.buf.len() < self.expected_len {
            return None;
        }
        let checksum = self.checksum;
        Some(self.finish_frame(checksum))
    }

    /// Reads exactly one frame from a buffered source.
    ///
    /// Scans at most [MAX_SYNC_SCAN] bytes for the sync pattern and returns
    /// `Ok(None)` if none shows up. Running out of input is
    /// [DecodeError::EndOfStream]. Any partially assembled frame left by
    /// [Parser::push] is discarded.
    pub fn read_frame<R: Read>(&mut self, reader: &mut R) -> Result<Option<Frame<'_>>, DecodeError> {
        self.state = SyncState::Seeking;
        let mut scanned = 0;
        loop {
            let byte = reader.read_u8()?;
            if self.shift_sync(byte) {
                break;
            }
            if scanned >= MAX_SYNC_SCAN {
                return Ok(None);
            }
            scanned += 1;
        }
        self.sync = [0; 2];
        self.start_frame();

        self.buf.resize(UBX_HEADER_LEN, 0);
        reader.read_exact(&mut self.buf[UBX_CLASS_OFFSET..])?;
        let len = self.announced_len();
        if len > MAX_FRAME_LEN {
            self.state = SyncState::Seeking;
            return Err(DecodeError::FrameTooLong { len });
        }
        self.expected_len = len;
        self.buf.resize(len, 0);
        reader.read_exact(&mut self.buf[UBX_HEADER_LEN..])?;
        let checksum = FrameChecksum::of(&self.buf[UBX_CLASS_OFFSET..len - UBX_CHECKSUM_LEN]);
        self.finish_frame(checksum).map(Some)
    }
}

/// Wraps `payload` into a complete UBX frame with length and checksum filled in.
///
/// Payloads longer than `u16::MAX` cannot be framed; their length field is truncated.
pub fn encode_frame(class: u8, msg_id: u8, payload: &[u8]) -> Vec<u8> {
    let mut frame = Vec::with_capacity(payload.len() + UBX_HEADER_LEN + UBX_CHECKSUM_LEN);
    frame.extend_from_slice(&[UBX_SYNC_CHAR_1, UBX_SYNC_CHAR_2, class, msg_id]);
    frame.extend_from_slice(&(payload.len() as u16).to_le_bytes());
    frame.extend_from_slice(payload);

    let checksum = FrameChecksum::of(&frame[UBX_CLASS_OFFSET..]);
    frame.extend_from_slice(&checksum.to_bytes());
    frame
}
