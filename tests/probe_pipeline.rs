use chrono::{NaiveDate, NaiveDateTime};
use tasmota_exporter::metrics::Metrics;
use tasmota_exporter::probe::publish;
use tasmota_exporter::reading::Reading;
use tasmota_exporter::rollover::DailyLatch;

fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, mo, d)
        .unwrap()
        .and_hms_opt(h, mi, s)
        .unwrap()
}

const STATUS_PAGE: &str = "{t}</table><hr/>{t}\
    {s}</th><th></th><th style='text-align:center'><th></th><td>{e}\
    {s}Voltage{m}</td><td style='text-align:left'>237</td><td>&nbsp;</td><td> V{e}\
    {s}Current{m}</td><td style='text-align:left'>0.053</td><td>&nbsp;</td><td> A{e}\
    {s}Active Power{m}</td><td style='text-align:left'>7</td><td>&nbsp;</td><td> W{e}\
    {s}Apparent Power{m}</td><td style='text-align:left'>13</td><td>&nbsp;</td><td> VA{e}\
    {s}Reactive Power{m}</td><td style='text-align:left'>10</td><td>&nbsp;</td><td> VAr{e}\
    {s}Power Factor{m}</td><td style='text-align:left'>0.59</td><td>&nbsp;</td><td>   {e}\
    {s}Energy Today{m}</td><td style='text-align:left'>42.42</td><td>&nbsp;</td><td> kWh{e}\
    {s}Energy Yesterday{m}</td><td style='text-align:left'>0.016</td><td>&nbsp;</td><td> kWh{e}\
    {s}Energy Total{m}</td><td style='text-align:left'>3.334</td><td>&nbsp;</td><td> kWh{e}\
    </table><hr/>{t}</table>{t}\
    <tr><td style='width:100%;text-align:center;font-weight:bold;font-size:62px'>ON</td></tr></table>";

#[test]
fn page_to_rendered_metrics() {
    let reading = Reading::from_markup(STATUS_PAGE);
    assert!(reading.on);

    let metrics = Metrics::new().unwrap();
    let mut latch = DailyLatch::new();
    publish(&reading, "plug.local:80", &metrics, &mut latch, at(2024, 7, 26, 10, 0, 0));

    let rendered = metrics.render().unwrap();
    assert!(rendered.contains("tasmota_on 1"));
    assert!(rendered.contains("tasmota_voltage_volts 237"));
    assert!(rendered.contains("tasmota_current_amperes 0.053"));
    assert!(rendered.contains("tasmota_power_watts 7"));
    assert!(rendered.contains("tasmota_today_kwh_total 42.42"));
    assert!(rendered.contains("tasmota_yesterday_kwh_total 0.016"));
    assert!(rendered.contains("tasmota_kwh_total 3.334"));
    assert!(rendered.contains("tasmota_daily_last_kwh_total NaN"));
}

#[test]
fn today_is_blanked_across_midnight_and_restored_after() {
    let reading = Reading::from_markup(STATUS_PAGE);
    assert_eq!(reading.today, 42.42);

    let metrics = Metrics::new().unwrap();
    let mut latch = DailyLatch::new();

    publish(&reading, "plug.local:80", &metrics, &mut latch, at(2024, 7, 26, 23, 59, 15));
    assert_eq!(metrics.today.get(), 0.0);

    publish(&reading, "plug.local:80", &metrics, &mut latch, at(2024, 7, 27, 0, 1, 0));
    assert_eq!(metrics.today.get(), 42.42);
}

#[test]
fn daily_last_emits_exactly_once_per_day_per_target() {
    let reading = Reading::from_markup(STATUS_PAGE);
    let metrics = Metrics::new().unwrap();
    let mut latch = DailyLatch::new();
    let target = "plug.local:80";

    // First probe inside the latch window carries the day's value.
    publish(&reading, target, &metrics, &mut latch, at(2024, 7, 26, 23, 58, 0));
    assert_eq!(metrics.daily_last.get(), 42.42);

    // Second probe the same day is explicitly blanked.
    publish(&reading, target, &metrics, &mut latch, at(2024, 7, 26, 23, 59, 0));
    assert!(metrics.daily_last.get().is_nan());

    // Another target is unaffected by the first one's latch.
    publish(&reading, "other.plug:80", &metrics, &mut latch, at(2024, 7, 26, 23, 59, 0));
    assert_eq!(metrics.daily_last.get(), 42.42);
}

#[test]
fn relay_off_page_reports_zero_on_gauge() {
    let page = STATUS_PAGE.replace(
        "font-weight:bold;font-size:62px'>ON",
        "font-weight:normal;font-size:62px'>OFF",
    );
    let reading = Reading::from_markup(&page);
    assert!(!reading.on);

    let metrics = Metrics::new().unwrap();
    let mut latch = DailyLatch::new();
    publish(&reading, "plug.local:80", &metrics, &mut latch, at(2024, 7, 26, 10, 0, 0));
    assert!(metrics.render().unwrap().contains("tasmota_on 0"));
}
