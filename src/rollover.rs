//! Day-boundary handling for the "energy today" counter.
//!
//! The plug computes its daily counter against its own clock, which is not
//! aligned with the scrape instant. Around local midnight a scrape may
//! still see the previous day's accumulated value, which would then be
//! attributed to the new day. The two window predicates below carry the
//! reconciliation: one forces the gauge to zero across the rollover, the
//! other gates the once-per-day "final reading of the day" emission.

use chrono::{NaiveDate, NaiveDateTime, Timelike};
use log::debug;
use std::collections::HashMap;

/// True between 23:59:00 and 00:00:59 inclusive, judged on wall-clock
/// hour and minute only.
pub fn in_midnight_window(now: NaiveDateTime) -> bool {
    let hour = now.hour();
    let minute = now.minute();
    (hour == 23 && minute == 59) || (hour == 0 && minute == 0)
}

/// Value for the "energy today" gauge at the given instant.
///
/// Inside the midnight window the device-reported value is discarded and
/// the gauge reads exactly zero, so that each day's maximum consumption
/// stays attributed to its own day.
pub fn resolve_today(raw_today: f64, now: NaiveDateTime) -> f64 {
    if in_midnight_window(now) {
        debug!("midnight transition at {}, forcing today to 0", now);
        return 0.0;
    }
    raw_today
}

/// True between 23:58:00 and 23:59:59 inclusive. Narrower than the
/// midnight window and evaluated independently of it.
pub fn in_latch_window(now: NaiveDateTime) -> bool {
    now.hour() == 23 && (now.minute() == 58 || now.minute() == 59)
}

/// Per-target record of the last calendar day on which the daily-last
/// value was emitted.
///
/// Entries are never removed; the target set of a deployment is small and
/// static, so unbounded growth is accepted.
#[derive(Debug, Default)]
pub struct DailyLatch {
    sent_on: HashMap<String, NaiveDate>,
}

impl DailyLatch {
    pub fn new() -> DailyLatch {
        DailyLatch::default()
    }

    /// Whether the daily-last value should go out for `target` now.
    ///
    /// True only inside the latch window, and at most once per calendar
    /// day per target. A true result must be confirmed with
    /// [`DailyLatch::record`], otherwise the next call will fire again.
    pub fn should_send(&self, target: &str, now: NaiveDateTime) -> bool {
        if !in_latch_window(now) {
            return false;
        }

        match self.sent_on.get(target) {
            None => true,
            Some(sent) if *sent != now.date() => true,
            Some(sent) => {
                debug!("[{}] daily-last already sent on {}, skipping", target, sent);
                false
            }
        }
    }

    /// Remember that the daily-last value went out for `target` today.
    pub fn record(&mut self, target: &str, now: NaiveDateTime) {
        self.sent_on.insert(target.to_string(), now.date());
    }
}
