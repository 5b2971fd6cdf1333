pub const UBX_SYNC_CHAR_1: u8 = 0xb5;
pub const UBX_SYNC_CHAR_2: u8 = 0x62;
pub(crate) const UBX_SYNC_SIZE: usize = 2;
pub(crate) const UBX_PAYLOAD_SIZE_LEN: usize = 2;
pub(crate) const UBX_CLASS_LEN: usize = 1;
pub(crate) const UBX_ID_LEN: usize = 1;
pub(crate) const UBX_HEADER_LEN: usize =
    UBX_SYNC_SIZE + UBX_PAYLOAD_SIZE_LEN + UBX_CLASS_LEN + UBX_ID_LEN;
pub(crate) const UBX_CHECKSUM_LEN: usize = 2;

pub(crate) const UBX_CLASS_OFFSET: usize = 2; // After SYNC_CHAR_1, SYNC_CHAR_2
pub(crate) const UBX_LENGTH_OFFSET: usize = 4; // After MSG_ID

/// Largest frame (header, payload and checksum) the synchronizer accepts
pub const MAX_FRAME_LEN: usize = 4096;

/// Bytes scanned for a sync pattern by one buffered read before giving up
pub(crate) const MAX_SYNC_SCAN: usize = 4096;

pub const UBX_CLASS_RXM: u8 = 0x02;
pub const UBX_CLASS_CFG: u8 = 0x06;

/// Speed of light (m/s)
pub const CLIGHT: f64 = 299_792_458.0;
/// GPS/QZSS/SBAS/Galileo L1 carrier (Hz)
pub const FREQ1: f64 = 1.575_42e9;
/// GLONASS G1 base carrier (Hz)
pub const FREQ1_GLO: f64 = 1.602e9;
/// GLONASS G1 channel spacing (Hz)
pub const DFRQ1_GLO: f64 = 0.5625e6;
/// BeiDou B1 carrier (Hz)
pub const FREQ1_CMP: f64 = 1.561_098e9;

/// Maximum number of records in one observation epoch
pub const MAX_OBS: usize = 64;
/// Frequency slots carried by each observation record
pub const NFREQ: usize = 3;

/// Carrier phase std-dev index above which the phase is discarded
pub(crate) const CPSTD_VALID: u8 = 5;

/// Offset added to the UBX QZSS svId to form the PRN
pub(crate) const QZSS_PRN_OFFSET: u16 = 192;
