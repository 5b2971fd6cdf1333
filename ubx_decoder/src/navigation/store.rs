use std::collections::BTreeMap;

use gnss::prelude::{Constellation, SV};
use log::trace;

use super::{Almanac, Ephemeris, GlonassEphemeris, IonoUtc, LnavAlmanac, SbasEphemeris};

/// Which of the two concurrent SBAS ephemeris sets a record belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SbasSet {
    Current,
    Previous,
}

impl SbasSet {
    fn index(self) -> usize {
        match self {
            Self::Current => 0,
            Self::Previous => 1,
        }
    }
}

/// Latest navigation data per satellite.
///
/// GLONASS records are keyed by slot number, everything else by satellite.
/// A slot only changes when a decoded record differs from the stored one in
/// its identity fields (see [Ephemeris::same_broadcast]).
#[derive(Debug, Default, Clone)]
pub struct EphemerisStore {
    ephemerides: BTreeMap<SV, Ephemeris>,
    glonass: BTreeMap<u8, GlonassEphemeris>,
    almanac: BTreeMap<SV, Almanac>,
    iono_utc_gps: Option<IonoUtc>,
    iono_utc_qzss: Option<IonoUtc>,
    sbas: BTreeMap<SV, [Option<SbasEphemeris>; 2]>,
}

impl EphemerisStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ephemeris(&self, sv: SV) -> Option<&Ephemeris> {
        self.ephemerides.get(&sv)
    }

    pub fn ephemerides(&self) -> impl Iterator<Item = &Ephemeris> {
        self.ephemerides.values()
    }

    pub fn glonass_ephemeris(&self, slot: u8) -> Option<&GlonassEphemeris> {
        self.glonass.get(&slot)
    }

    pub fn glonass_ephemerides(&self) -> impl Iterator<Item = &GlonassEphemeris> {
        self.glonass.values()
    }

    pub fn almanac(&self, sv: SV) -> Option<&Almanac> {
        self.almanac.get(&sv)
    }

    /// Ionosphere/UTC parameters broadcast by GPS or QZSS
    pub fn iono_utc(&self, constellation: Constellation) -> Option<&IonoUtc> {
        match constellation {
            Constellation::GPS => self.iono_utc_gps.as_ref(),
            Constellation::QZSS => self.iono_utc_qzss.as_ref(),
            _ => None,
        }
    }

    pub fn sbas_ephemeris(&self, sv: SV, set: SbasSet) -> Option<&SbasEphemeris> {
        self.sbas.get(&sv).and_then(|sets| sets[set.index()].as_ref())
    }

    pub fn len(&self) -> usize {
        self.ephemerides.len() + self.glonass.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Stores `eph` unless the slot already holds the same broadcast.
    ///
    /// `force` skips the comparison. Returns whether the slot was written.
    pub fn update_ephemeris(&mut self, eph: Ephemeris, force: bool) -> bool {
        if !force {
            if let Some(stored) = self.ephemerides.get(&eph.sv) {
                if eph.same_broadcast(stored) {
                    trace!("{}: ephemeris unchanged, iode={}", eph.sv, eph.iode);
                    return false;
                }
            }
        }
        self.ephemerides.insert(eph.sv, eph);
        true
    }

    /// GLONASS counterpart of [EphemerisStore::update_ephemeris], compared by IODE only.
    pub fn update_glonass_ephemeris(&mut self, geph: GlonassEphemeris, force: bool) -> bool {
        let slot = geph.sv.prn;
        if !force {
            if let Some(stored) = self.glonass.get(&slot) {
                if stored.iode == geph.iode {
                    trace!("{}: ephemeris unchanged, iode={}", geph.sv, geph.iode);
                    return false;
                }
            }
        }
        self.glonass.insert(slot, geph);
        true
    }

    /// Merges almanac pages and ionosphere/UTC parameters broadcast by `constellation`.
    pub fn merge_almanac(&mut self, constellation: Constellation, update: LnavAlmanac) {
        for alm in update.almanac {
            self.almanac.insert(alm.sv, alm);
        }
        if let Some(iono_utc) = update.iono_utc {
            let slot = match constellation {
                Constellation::QZSS => &mut self.iono_utc_qzss,
                _ => &mut self.iono_utc_gps,
            };
            let leap_seconds = iono_utc
                .leap_seconds
                .or_else(|| slot.as_ref().and_then(|prev| prev.leap_seconds));
            *slot = Some(IonoUtc {
                leap_seconds,
                ..iono_utc
            });
        }
    }

    pub fn update_sbas_ephemeris(&mut self, set: SbasSet, eph: SbasEphemeris) {
        let sets = self.sbas.entry(eph.sv).or_default();
        sets[set.index()] = Some(eph);
    }
}
