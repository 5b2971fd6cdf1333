//! RXM-RAW and RXM-RAWX: raw measurement frames to observation epochs.

use gnss::prelude::Constellation;
use hifitime::{Duration, Epoch};
use log::{debug, trace};

use super::{DecodeEvent, DecodeResult, DecoderState};
use crate::{
    constants::{CLIGHT, CPSTD_VALID, DFRQ1_GLO, FREQ1, FREQ1_CMP, FREQ1_GLO, MAX_OBS},
    navigation::NavDecoder,
    observation::{LliFlags, ObservationEpoch, ObservationRecord, SignalCode},
    time::{gpst, time_tag_offset, timediff},
    ubx_packets::{satellite, ubx_gnss, ubx_prn, RxmRawRef, RxmRawxRef, TrkStatFlags},
};

/// Lowest PRN reported for SBAS by legacy receivers
const MIN_PRN_SBAS: u16 = 120;
/// Largest epoch gap (s) over which legacy lock time keeps accumulating
const MAX_LOCK_GAP: f64 = 10.0;
/// Time tags this close (s) belong to the same epoch
const DUPLICATE_EPOCH_TOL: f64 = 1e-3;

/// Signal strength in 0.25 dBHz, saturated to the `u8` range
fn snr_units(cno: f64) -> u8 {
    (cno * 4.0 + 0.5).clamp(0.0, f64::from(u8::MAX)) as u8
}

impl<D: NavDecoder> DecoderState<D> {
    /// Applies `-TADJ` rounding to `time`, returning the adjusted time and the offset removed.
    fn adjust_time_tag(&self, time: Epoch) -> (Epoch, f64) {
        match self.config.time_tag_interval {
            Some(interval) => {
                let toff = time_tag_offset(time, interval);
                (time - Duration::from_seconds(toff), toff)
            },
            None => (time, 0.0),
        }
    }

    fn replace_epoch(&mut self, time: Epoch, epoch: ObservationEpoch) -> DecodeResult {
        let count = epoch.len();
        trace!("observations: time={} n={}", time, count);
        self.time = Some(time);
        self.observations = epoch;
        Ok(DecodeEvent::ObservationsReady { time, count })
    }

    pub(super) fn decode_rxm_raw(&mut self, payload: &[u8]) -> DecodeResult {
        let raw = RxmRawRef::new(payload)?;
        let time = gpst(u32::from(raw.week()), f64::from(raw.itow()) * 1e-3);
        let (time, toff) = self.adjust_time_tag(time);

        let gap = self.time.map(|last| timediff(time, last));
        if gap.is_some_and(|tt| tt.abs() <= DUPLICATE_EPOCH_TOL) {
            trace!("RXM-RAW: duplicated epoch {}", time);
            return Ok(DecodeEvent::NoMessage);
        }

        let mut epoch = ObservationEpoch::with_capacity(usize::from(raw.num_sv()));
        for meas in raw.measurements().take(MAX_OBS) {
            let prn = u16::from(meas.sv());
            let constellation = if prn >= MIN_PRN_SBAS {
                Constellation::SBAS
            } else {
                Constellation::GPS
            };
            let Some(sv) = satellite(constellation, prn) else {
                debug!("RXM-RAW: satellite number error, prn={}", prn);
                continue;
            };

            let mut rec = ObservationRecord::new(time, sv);
            rec.carrier_phase[0] = meas.cp_mes() - toff * FREQ1;
            if self.config.invert_carrier_phase {
                rec.carrier_phase[0] = -rec.carrier_phase[0];
            }
            rec.pseudorange[0] = meas.pr_mes() - toff * CLIGHT;
            rec.doppler[0] = f64::from(meas.do_mes());
            rec.snr[0] = snr_units(f64::from(meas.cno()));
            rec.lli[0] = LliFlags::from_bits_retain(meas.lli());
            rec.code[0] = SignalCode::L1C;

            let lock = &mut self.lock_time.entry(sv).or_default()[0];
            match gap {
                Some(tt) if meas.lli() & 1 == 0 && (0.0..=MAX_LOCK_GAP).contains(&tt) => {
                    *lock += tt;
                },
                _ => *lock = 0.0,
            }
            epoch.push(rec);
        }
        self.replace_epoch(time, epoch)
    }

    pub(super) fn decode_rxm_rawx(&mut self, payload: &[u8]) -> DecodeResult {
        let rawx = RxmRawxRef::new(payload)?;
        if rawx.week() == 0 {
            trace!("RXM-RAWX: week number unknown");
            return Ok(DecodeEvent::NoMessage);
        }
        let time = gpst(u32::from(rawx.week()), rawx.rcv_tow());
        let (time, toff) = self.adjust_time_tag(time);
        let std_slip = self.config.std_slip.is_some();

        let mut epoch = ObservationEpoch::with_capacity(usize::from(rawx.num_meas()));
        for meas in rawx.measurements().take(MAX_OBS) {
            let Some(constellation) = ubx_gnss(meas.gnss_id()) else {
                debug!("RXM-RAWX: system error, gnss_id={}", meas.gnss_id());
                continue;
            };
            let prn = ubx_prn(constellation, meas.sv_id());
            let Some(sv) = satellite(constellation, prn) else {
                debug!("RXM-RAWX: satellite number error, {} prn={}", constellation, prn);
                continue;
            };

            let trk = meas.trk_stat();
            let cpstd = meas.cp_stdev() & 0x0f;
            let pr = if trk.contains(TrkStatFlags::PR_VALID) {
                meas.pr_mes()
            } else {
                0.0
            };
            let mut cp = if trk.contains(TrkStatFlags::CP_VALID) {
                meas.cp_mes()
            } else {
                0.0
            };
            if cp == -0.5 || cpstd > CPSTD_VALID {
                cp = 0.0;
            }

            let mut rec = ObservationRecord::new(time, sv);
            rec.pseudorange[0] = pr;
            rec.carrier_phase[0] = cp;
            if toff != 0.0 {
                let fcn = i32::from(meas.freq_id()) - 7;
                let freq = match constellation {
                    Constellation::BeiDou => FREQ1_CMP,
                    Constellation::Glonass => FREQ1_GLO + DFRQ1_GLO * f64::from(fcn),
                    _ => FREQ1,
                };
                rec.pseudorange[0] -= toff * CLIGHT;
                rec.carrier_phase[0] -= toff * freq;
            }
            rec.doppler[0] = f64::from(meas.do_mes());
            rec.snr[0] = (u16::from(meas.cno()) * 4).min(u16::from(u8::MAX)) as u8;
            rec.code[0] = match constellation {
                Constellation::BeiDou => SignalCode::L1I,
                Constellation::Galileo => SignalCode::L1X,
                _ => SignalCode::L1C,
            };

            let lock_time = f64::from(meas.lock_time());
            let lock = self.lock_time.entry(sv).or_default();
            let slip = lock_time == 0.0 || lock_time < lock[0];
            if std_slip {
                cp = 0.0;
            }
            let half_valid = trk.contains(TrkStatFlags::HALF_CYCLE);
            let half_sub = trk.contains(TrkStatFlags::SUB_HALF_CYCLE);
            if cp != 0.0 {
                if slip {
                    rec.lli[0] |= LliFlags::SLIP;
                }
                if half_sub {
                    rec.lli[0] |= LliFlags::HALF_ADDED;
                }
                if !half_valid {
                    rec.lli[0] |= LliFlags::HALF_CYCLE;
                }
                lock[0] = lock_time;
                self.half_cycle.entry(sv).or_default()[0] = half_sub;
            }
            epoch.push(rec);
        }
        self.replace_epoch(time, epoch)
    }
}
