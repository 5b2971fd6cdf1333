//! Per-satellite subframe collection buffers.
//!
//! Every navigation format addresses its own layout, so each satellite owns
//! exactly one of these variants. Asking for a different layout than the
//! one stored starts over from a zeroed buffer.

use std::collections::HashMap;

use gnss::prelude::SV;

use crate::navigation::{
    BDS_D1_FRAME_LEN, BDS_D2_FRAME_LEN, GALILEO_FRAME_LEN, GLONASS_FRAME_LEN, LNAV_FRAME_LEN,
};

#[derive(Debug, Clone)]
pub(crate) enum SubframeScratch {
    Lnav([u8; LNAV_FRAME_LEN]),
    Galileo {
        words: [u8; GALILEO_FRAME_LEN],
        /// Bit n set once word type n has been stored
        seen: u8,
    },
    BeidouD1([u8; BDS_D1_FRAME_LEN]),
    BeidouD2([u8; BDS_D2_FRAME_LEN]),
    Glonass {
        strings: [u8; GLONASS_FRAME_LEN],
        frame_id: [u8; 2],
    },
}

pub(crate) struct GalileoScratch<'a> {
    pub words: &'a mut [u8; GALILEO_FRAME_LEN],
    pub seen: &'a mut u8,
}

pub(crate) struct GlonassScratch<'a> {
    pub strings: &'a mut [u8; GLONASS_FRAME_LEN],
    pub frame_id: &'a mut [u8; 2],
}

#[derive(Debug, Default)]
pub(crate) struct ScratchTable {
    buffers: HashMap<SV, SubframeScratch>,
}

macro_rules! scratch_accessor {
    ($name:ident, $variant:ident, $len:expr) => {
        pub(crate) fn $name(&mut self, sv: SV) -> &mut [u8; $len] {
            let entry = self
                .buffers
                .entry(sv)
                .or_insert(SubframeScratch::$variant([0; $len]));
            if !matches!(entry, SubframeScratch::$variant(_)) {
                *entry = SubframeScratch::$variant([0; $len]);
            }
            match entry {
                SubframeScratch::$variant(buf) => buf,
                _ => unreachable!(),
            }
        }
    };
}

impl ScratchTable {
    scratch_accessor!(lnav, Lnav, LNAV_FRAME_LEN);
    scratch_accessor!(beidou_d1, BeidouD1, BDS_D1_FRAME_LEN);
    scratch_accessor!(beidou_d2, BeidouD2, BDS_D2_FRAME_LEN);

    pub(crate) fn galileo(&mut self, sv: SV) -> GalileoScratch<'_> {
        let entry = self.buffers.entry(sv).or_insert(SubframeScratch::Galileo {
            words: [0; GALILEO_FRAME_LEN],
            seen: 0,
        });
        if !matches!(entry, SubframeScratch::Galileo { .. }) {
            *entry = SubframeScratch::Galileo {
                words: [0; GALILEO_FRAME_LEN],
                seen: 0,
            };
        }
        match entry {
            SubframeScratch::Galileo { words, seen } => GalileoScratch { words, seen },
            _ => unreachable!(),
        }
    }

    pub(crate) fn glonass(&mut self, sv: SV) -> GlonassScratch<'_> {
        let entry = self.buffers.entry(sv).or_insert(SubframeScratch::Glonass {
            strings: [0; GLONASS_FRAME_LEN],
            frame_id: [0; 2],
        });
        if !matches!(entry, SubframeScratch::Glonass { .. }) {
            *entry = SubframeScratch::Glonass {
                strings: [0; GLONASS_FRAME_LEN],
                frame_id: [0; 2],
            };
        }
        match entry {
            SubframeScratch::Glonass { strings, frame_id } => GlonassScratch { strings, frame_id },
            _ => unreachable!(),
        }
    }

    #[cfg(test)]
    pub(crate) fn get(&self, sv: SV) -> Option<&SubframeScratch> {
        self.buffers.get(&sv)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gnss::prelude::Constellation;

    #[test]
    fn test_buffers_persist_per_satellite() {
        let mut table = ScratchTable::default();
        let g01 = SV::new(Constellation::GPS, 1);
        let g02 = SV::new(Constellation::GPS, 2);
        table.lnav(g01)[0] = 0xaa;
        assert_eq!(table.lnav(g01)[0], 0xaa);
        assert_eq!(table.lnav(g02)[0], 0x00);
    }

    #[test]
    fn test_layout_switch_starts_over() {
        let mut table = ScratchTable::default();
        let c05 = SV::new(Constellation::BeiDou, 5);
        table.beidou_d2(c05)[10] = 1;
        table.beidou_d1(c05)[10] = 2;
        assert!(matches!(table.get(c05), Some(SubframeScratch::BeidouD1(_))));
        assert_eq!(table.beidou_d2(c05)[10], 0);
    }

    #[test]
    fn test_galileo_mask_lives_with_words() {
        let mut table = ScratchTable::default();
        let e11 = SV::new(Constellation::Galileo, 11);
        *table.galileo(e11).seen |= 0x04;
        table.galileo(e11).words[32] = 0x55;
        let gal = table.galileo(e11);
        assert_eq!(*gal.seen, 0x04);
        assert_eq!(gal.words[32], 0x55);
    }
}
