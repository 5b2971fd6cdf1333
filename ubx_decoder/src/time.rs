//! GPS week/time-of-week conversions on top of [hifitime].

use hifitime::{Duration, Epoch, TimeScale};

/// GPST epoch for `week` and `tow` seconds into that week.
///
/// `tow` may exceed one week or be negative; the result is normalized.
pub fn gpst(week: u32, tow: f64) -> Epoch {
    let week_start = Epoch::from_time_of_week(week, 0, TimeScale::GPST);
    week_start + Duration::from_seconds(tow)
}

/// GPS week and seconds into the week for `epoch`.
pub fn to_gpst(epoch: Epoch) -> (u32, f64) {
    let (week, nanos) = epoch.to_time_scale(TimeScale::GPST).to_time_of_week();
    (week, nanos as f64 / 1e9)
}

/// `a - b` in seconds
pub fn timediff(a: Epoch, b: Epoch) -> f64 {
    (a - b).to_seconds()
}

/// Residual between `time` and the nearest multiple of `interval` seconds of GPS time-of-week.
pub(crate) fn time_tag_offset(time: Epoch, interval: f64) -> f64 {
    let (_, tow) = to_gpst(time);
    let tn = tow / interval;
    (tn - (tn + 0.5).floor()) * interval
}
