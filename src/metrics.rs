use prometheus::{Encoder, Gauge, Registry, TextEncoder};

/// The gauges this exporter serves, all registered with one registry.
///
/// Every gauge is a single slot: each scrape of `/probe` overwrites it
/// with the values of the target being probed.
pub struct Metrics {
    registry: Registry,

    pub on: Gauge,
    pub voltage: Gauge,
    pub current: Gauge,
    pub power: Gauge,
    pub apparent_power: Gauge,
    pub reactive_power: Gauge,
    pub factor: Gauge,
    pub today: Gauge,
    pub yesterday: Gauge,
    pub total: Gauge,
    pub daily_last: Gauge,
    pub probe_success: Gauge,
    pub probe_duration_seconds: Gauge,
}

impl Metrics {
    pub fn new() -> Result<Metrics, prometheus::Error> {
        let on = Gauge::new("tasmota_on", "Indicates if the tasmota plug is on/off")?;
        let voltage = Gauge::new(
            "tasmota_voltage_volts",
            "voltage of tasmota plug in volt (V)",
        )?;
        let current = Gauge::new(
            "tasmota_current_amperes",
            "current of tasmota plug in ampere (A)",
        )?;
        let power = Gauge::new(
            "tasmota_power_watts",
            "current power of tasmota plug in watts (W)",
        )?;
        let apparent_power = Gauge::new(
            "tasmota_apparent_power_voltamperes",
            "apparent power of tasmota plug in volt-amperes (VA)",
        )?;
        let reactive_power = Gauge::new(
            "tasmota_reactive_power_voltamperesreactive",
            "reactive power of tasmota plug in volt-amperes reactive (VAr)",
        )?;
        let factor = Gauge::new(
            "tasmota_power_factor",
            "current power factor of tasmota plug",
        )?;
        let today = Gauge::new(
            "tasmota_today_kwh_total",
            "todays energy usage total in kilowatts hours (kWh) \
             [manually overriden to 0 between 23:59:00 and 00:00:59]",
        )?;
        let yesterday = Gauge::new(
            "tasmota_yesterday_kwh_total",
            "yesterdays energy usage total in kilowatts hours (kWh)",
        )?;
        let total = Gauge::new(
            "tasmota_kwh_total",
            "total energy usage in kilowatts hours (kWh)",
        )?;
        let daily_last = Gauge::new(
            "tasmota_daily_last_kwh_total",
            "The last kWh reading of the day, sent once per day between 23:58:00 and 23:59:59",
        )?;
        let probe_success = Gauge::new(
            "probe_success",
            "Displays whether or not the probe was a success",
        )?;
        let probe_duration_seconds = Gauge::new(
            "probe_duration_seconds",
            "Returns how long the probe took to complete in seconds",
        )?;

        let registry = Registry::new();
        registry.register(Box::new(on.clone()))?;
        registry.register(Box::new(voltage.clone()))?;
        registry.register(Box::new(current.clone()))?;
        registry.register(Box::new(power.clone()))?;
        registry.register(Box::new(apparent_power.clone()))?;
        registry.register(Box::new(reactive_power.clone()))?;
        registry.register(Box::new(factor.clone()))?;
        registry.register(Box::new(today.clone()))?;
        registry.register(Box::new(yesterday.clone()))?;
        registry.register(Box::new(total.clone()))?;
        registry.register(Box::new(daily_last.clone()))?;
        registry.register(Box::new(probe_success.clone()))?;
        registry.register(Box::new(probe_duration_seconds.clone()))?;

        Ok(Metrics {
            registry,
            on,
            voltage,
            current,
            power,
            apparent_power,
            reactive_power,
            factor,
            today,
            yesterday,
            total,
            daily_last,
            probe_success,
            probe_duration_seconds,
        })
    }

    /// Render the registry in the Prometheus text exposition format.
    pub fn render(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|err| prometheus::Error::Msg(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registers_all_gauges() {
        let metrics = Metrics::new().unwrap();
        metrics.voltage.set(237.0);
        metrics.probe_success.set(1.0);

        let rendered = metrics.render().unwrap();
        assert!(rendered.contains("tasmota_voltage_volts 237"));
        assert!(rendered.contains("probe_success 1"));
        assert!(rendered.contains("# TYPE tasmota_on gauge"));
        assert!(rendered.contains("tasmota_daily_last_kwh_total"));
    }

    #[test]
    fn nan_renders_as_nan() {
        let metrics = Metrics::new().unwrap();
        metrics.daily_last.set(f64::NAN);
        let rendered = metrics.render().unwrap();
        assert!(rendered.contains("tasmota_daily_last_kwh_total NaN"));
    }
}
