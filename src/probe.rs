use crate::metrics::Metrics;
use crate::reading::Reading;
use crate::rollover::{self, DailyLatch};
use chrono::NaiveDateTime;
use log::debug;
use std::time::Duration;

/// The probe could not produce a reading.
#[derive(Debug)]
pub enum ProbeError {
    /// The device responded with a non-2xx HTTP status.
    Status(u16),
    /// The device could not be reached within the timeout.
    Transport(String),
    /// The response body could not be read as text.
    UnreadableBody(String),
}

impl std::fmt::Display for ProbeError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            ProbeError::Status(status) => {
                write!(f, "device responded with HTTP status {}", status)
            }
            ProbeError::Transport(msg) => write!(f, "device not reachable: {}", msg),
            ProbeError::UnreadableBody(msg) => write!(f, "unreadable response body: {}", msg),
        }
    }
}

/// Prober fetches one status page from a plug via a HTTP request.
///
/// A probe is a single bounded attempt; no retries. The scrape caller
/// re-invokes on its own schedule.
pub struct Prober {
    timeout: Duration,
}

impl Prober {
    pub fn new(network_timeout: Duration) -> Prober {
        Prober {
            timeout: network_timeout,
        }
    }

    /// URL of the status page; the `m` query selects the bare metrics
    /// fragment instead of the full web UI.
    fn status_url(target: &str) -> String {
        format!("http://{}?m", target)
    }

    fn fetch(&self, target: &str) -> Result<String, ProbeError> {
        let url = Self::status_url(target);
        match ureq::get(&url).timeout(self.timeout).call() {
            Ok(response) => response
                .into_string()
                .map_err(|err| ProbeError::UnreadableBody(err.to_string())),

            Err(ureq::Error::Status(status, _)) => Err(ProbeError::Status(status)),

            Err(ureq::Error::Transport(err)) => Err(ProbeError::Transport(err.to_string())),
        }
    }

    /// Poll `target` once and publish the decoded reading.
    ///
    /// On a fetch failure the reading gauges keep their previous values;
    /// only the caller's success/duration signals change.
    pub fn probe(
        &self,
        target: &str,
        metrics: &Metrics,
        latch: &mut DailyLatch,
        now: NaiveDateTime,
    ) -> Result<(), ProbeError> {
        let body = self.fetch(target)?;
        let reading = Reading::from_markup(&body);

        debug!(
            "{} on={} power={:.1}W today={:.3}kWh total={:.3}kWh",
            target, reading.on, reading.power, reading.today, reading.total
        );

        publish(&reading, target, metrics, latch, now);
        Ok(())
    }
}

/// Copy a reading into the gauges.
///
/// The "today" value goes through the midnight-window policy and the
/// daily-last slot through the once-per-day latch.
pub fn publish(
    reading: &Reading,
    target: &str,
    metrics: &Metrics,
    latch: &mut DailyLatch,
    now: NaiveDateTime,
) {
    metrics.on.set(if reading.on { 1.0 } else { 0.0 });
    metrics.voltage.set(reading.voltage);
    metrics.current.set(reading.current);
    metrics.power.set(reading.power);
    metrics.apparent_power.set(reading.apparent_power);
    metrics.reactive_power.set(reading.reactive_power);
    metrics.factor.set(reading.factor);

    metrics.today.set(rollover::resolve_today(reading.today, now));
    metrics.yesterday.set(reading.yesterday);
    metrics.total.set(reading.total);

    if latch.should_send(target, now) {
        metrics.daily_last.set(reading.today);
        latch.record(target, now);
    } else {
        // The daily-last gauge is one slot shared by every target this
        // exporter probes. Without an explicit NaN it would still expose
        // the value last written for some other target, and all targets
        // would report the same "last daily" reading.
        metrics.daily_last.set(f64::NAN);
    }
}
