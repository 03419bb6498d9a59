//! Human-readable byte sizes.
//!
//! Units step at `1024`, then by factors of 1000 (`Ko`, `Mb`, `Gb`, `Tb`).
//! The mixed base and the labels are what the dashboard has always shown.

const ONE_KO: f64 = 1024.0;
const ONE_MO: f64 = ONE_KO * 1000.0;
const ONE_GO: f64 = ONE_MO * 1000.0;
const ONE_TO: f64 = ONE_GO * 1000.0;

const UNITS: [(f64, &str); 4] = [(ONE_TO, "Tb"), (ONE_GO, "Gb"), (ONE_MO, "Mb"), (ONE_KO, "Ko")];

/// Formats a byte count, e.g. `4096` as `"4 Ko"`.
///
/// Thresholds are strict: exactly `1024` stays in bytes (`"1,024 b"`).
/// Missing or non-finite values render as an empty string.
pub fn format_size(value: Option<f64>) -> String {
    let value = match value {
        Some(v) if v.is_finite() => v,
        _ => return String::new(),
    };

    for (threshold, unit) in UNITS {
        if value > threshold {
            return format!("{} {}", format_decimal(value / threshold), unit);
        }
    }

    format!("{} b", format_decimal(value))
}

/// Formats a number with at most three fraction digits, trailing zeros
/// dropped and the integer part grouped by thousands.
pub fn format_decimal(value: f64) -> String {
    let fixed = format!("{:.3}", value);
    let fixed = fixed.trim_end_matches('0').trim_end_matches('.');

    let (sign, unsigned) = match fixed.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", fixed),
    };
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (unsigned, None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    // "-0" after rounding a tiny negative number
    let sign = if grouped == "0" && frac_part.is_none() { "" } else { sign };

    match frac_part {
        Some(f) => format!("{}{}.{}", sign, grouped, f),
        None => format!("{}{}", sign, grouped),
    }
}
