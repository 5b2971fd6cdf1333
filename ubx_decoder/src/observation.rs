use bitflags::bitflags;
use gnss::prelude::SV;
use hifitime::Epoch;

use crate::constants::{MAX_OBS, NFREQ};

bitflags! {
    /// Loss of lock indicator
    #[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize))]
    pub struct LliFlags: u8 {
        /// Cycle slip
        const SLIP = 0x01;
        /// Half cycle ambiguity not resolved
        const HALF_CYCLE = 0x02;
        /// Half cycle added to the phase
        const HALF_ADDED = 0x40;
        /// Half cycle subtracted from the phase
        const HALF_SUBTRACTED = 0x80;
    }
}

/// Tracked signal
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum SignalCode {
    #[default]
    None,
    /// L1 C/A (GPS, QZSS, SBAS) or G1 C/A (GLONASS)
    L1C,
    /// E1 B+C (Galileo)
    L1X,
    /// B1I (BeiDou)
    L1I,
}

/// Measurements of one satellite at one epoch, one slot per frequency
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ObservationRecord {
    pub time: Epoch,
    pub sv: SV,
    /// Pseudorange (m)
    pub pseudorange: [f64; NFREQ],
    /// Carrier phase (cycles)
    pub carrier_phase: [f64; NFREQ],
    /// Doppler (Hz)
    pub doppler: [f64; NFREQ],
    /// Signal strength (0.25 dBHz)
    pub snr: [u8; NFREQ],
    pub lli: [LliFlags; NFREQ],
    pub code: [SignalCode; NFREQ],
}

impl ObservationRecord {
    /// Record with every frequency slot cleared
    pub fn new(time: Epoch, sv: SV) -> Self {
        Self {
            time,
            sv,
            pseudorange: [0.0; NFREQ],
            carrier_phase: [0.0; NFREQ],
            doppler: [0.0; NFREQ],
            snr: [0; NFREQ],
            lli: [LliFlags::empty(); NFREQ],
            code: [SignalCode::None; NFREQ],
        }
    }
}

/// All observations sharing one receiver time tag.
///
/// Replaced as a whole by every raw measurement frame, never merged.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ObservationEpoch {
    records: Vec<ObservationRecord>,
}

impl ObservationEpoch {
    pub(crate) fn with_capacity(n: usize) -> Self {
        Self {
            records: Vec::with_capacity(n.min(MAX_OBS)),
        }
    }

    /// Appends in arrival order. Records beyond [MAX_OBS] are dropped.
    pub(crate) fn push(&mut self, record: ObservationRecord) -> bool {
        if self.records.len() >= MAX_OBS {
            return false;
        }
        self.records.push(record);
        true
    }

    /// Common time tag, `None` for an empty epoch
    pub fn time(&self) -> Option<Epoch> {
        self.records.first().map(|r| r.time)
    }

    pub fn records(&self) -> &[ObservationRecord] {
        &self.records
    }

    pub fn get(&self, sv: SV) -> Option<&ObservationRecord> {
        self.records.iter().find(|r| r.sv == sv)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ObservationRecord> {
        self.records.iter()
    }
}
