//! Tokenizer for the Tasmota status page.
//!
//! The page behind `http://<device>?m` is not HTML with a schema; it is a
//! stream of table fragments glued together with the firmware's templating
//! tokens. `{s}` starts a row, `{m}` separates a label from its value and
//! `{e}` terminates the value. Everything outside that grammar is visual
//! decoration and gets thrown away.

/// Row separator token.
const ROW_SEPARATOR: &str = "{s}";

/// Label/value separator token within a row.
const LABEL_VALUE_SEPARATOR: &str = "{m}";

/// Terminator token; anything after it belongs to the next fragment.
const VALUE_TERMINATOR: &str = "{e}";

/// Cell markup the firmware embeds inside value fields. Only these two
/// literal fragments occur, so no general markup parsing is needed.
const NOISE_FRAGMENTS: [&str; 2] = [
    "</td><td style='text-align:left'>",
    "</td><td>&nbsp;</td><td>",
];

/// Text the firmware renders in the power-state banner when the relay is
/// switched on. The banner is not a labelled row, so the state is detected
/// independently of row extraction.
const POWER_ON_MARKER: &str = "ON";

/// Split the raw status page into (label, value-with-unit) pairs.
///
/// Rows without a label/value separator are boundary noise and are
/// skipped. The value keeps its unit suffix; pulling a number out of it is
/// the caller's concern. Extraction is best-effort by construction: a
/// degenerate page simply yields fewer pairs, never an error.
pub fn extract(raw: &str) -> Vec<(String, String)> {
    let mut pairs = Vec::new();

    for row in raw.split(ROW_SEPARATOR) {
        let Some((label, rest)) = row.split_once(LABEL_VALUE_SEPARATOR) else {
            continue;
        };

        let value = match rest.find(VALUE_TERMINATOR) {
            Some(end) => &rest[..end],
            None => rest,
        };

        let mut value = value.to_string();
        if value.contains("<td") {
            for fragment in NOISE_FRAGMENTS {
                value = value.replace(fragment, "");
            }
        }

        pairs.push((label.to_string(), value));
    }

    pairs
}

/// Whether the page reports the relay as switched on.
pub fn is_power_on(raw: &str) -> bool {
    raw.contains(POWER_ON_MARKER)
}
