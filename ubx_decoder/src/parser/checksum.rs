use crate::DecodeError;

/// Running 8-bit Fletcher checksum over class, id, length and payload
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct FrameChecksum {
    ck_a: u8,
    ck_b: u8,
}

impl FrameChecksum {
    pub(crate) fn of(bytes: &[u8]) -> Self {
        let mut ck = Self::default();
        for byte in bytes {
            ck.push(*byte);
        }
        ck
    }

    pub(crate) fn push(&mut self, byte: u8) {
        self.ck_a = self.ck_a.wrapping_add(byte);
        self.ck_b = self.ck_b.wrapping_add(self.ck_a);
    }

    /// `CK_A`, `CK_B` in transmission order
    pub(crate) fn to_bytes(self) -> [u8; 2] {
        [self.ck_a, self.ck_b]
    }

    /// Compares against the checksum bytes carried by the frame
    pub(crate) fn check(self, received: [u8; 2]) -> Result<(), DecodeError> {
        if self.to_bytes() == received {
            return Ok(());
        }
        Err(DecodeError::InvalidChecksum {
            expect: u16::from_le_bytes(received),
            got: u16::from_le_bytes(self.to_bytes()),
        })
    }
}
