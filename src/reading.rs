use crate::markup;
use log::warn;

/// One decoded snapshot of a plug's energy meter.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Reading {
    /// Whether the relay is switched on.
    pub on: bool,

    /// Mains voltage in volt (V).
    pub voltage: f64,

    /// Current in ampere (A).
    pub current: f64,

    /// Active power in watt (W).
    pub power: f64,

    /// Apparent power in volt-ampere (VA).
    pub apparent_power: f64,

    /// Reactive power in volt-ampere reactive (VAr).
    pub reactive_power: f64,

    /// Power factor, dimensionless.
    pub factor: f64,

    /// Energy used today in kilowatt-hours (kWh), as counted against the
    /// internal clock of the plug.
    pub today: f64,

    /// Energy used yesterday in kilowatt-hours (kWh).
    pub yesterday: f64,

    /// Energy used since the last factory reset in kilowatt-hours (kWh).
    pub total: f64,
}

impl Reading {
    /// Decode a reading from the raw status page.
    pub fn from_markup(raw: &str) -> Reading {
        let mut reading = normalize(markup::extract(raw));
        reading.on = markup::is_power_on(raw);
        reading
    }
}

/// Turn extracted (label, value-with-unit) pairs into a typed reading.
///
/// The first whitespace token of each value is the numeric candidate; the
/// remainder (the unit suffix) is discarded. Rows whose candidate does not
/// parse are skipped, unknown labels are reported and ignored, and fields
/// with no matching row stay at zero. Partial data beats no data.
pub fn normalize(pairs: Vec<(String, String)>) -> Reading {
    let mut reading = Reading::default();

    for (label, value_with_unit) in pairs {
        let Some(token) = value_with_unit.split_whitespace().next() else {
            continue;
        };
        let Ok(value) = token.parse::<f64>() else {
            continue;
        };

        match label.as_str() {
            "Voltage" => reading.voltage = value,
            "Current" => reading.current = value,
            "Active Power" => reading.power = value,
            "Apparent Power" => reading.apparent_power = value,
            "Reactive Power" => reading.reactive_power = value,
            "Power Factor" => reading.factor = value,
            "Energy Today" => reading.today = value,
            "Energy Yesterday" => reading.yesterday = value,
            "Energy Total" => reading.total = value,
            other => warn!("unable to match label, got: {}, value: {}", other, value),
        }
    }

    reading
}
