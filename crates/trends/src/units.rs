//! GB conversion and change formatting.
//!
//! Byte counts stay integers until they reach a snapshot or a report; only
//! there are they converted to decimal gigabytes rounded to two places.

/// Bytes in one (decimal) gigabyte.
pub const BYTES_PER_GB: f64 = 1e9;

/// Round to two decimal places, normalizing `-0.0` to `0.0`.
///
/// Rounding works on the exact binary value, so exact halves such as
/// `0.125` go to the even neighbour (`0.12`) while `0.135`, which is
/// slightly above the half in binary, goes up.
#[must_use]
pub fn round2(value: f64) -> f64 {
    let rounded = format!("{:.2}", value).parse().unwrap_or(value);
    if rounded == 0.0 { 0.0 } else { rounded }
}

/// Convert a byte count to GB with two-decimal rounding.
#[must_use]
pub fn bytes_to_gb(bytes: u64) -> f64 {
    round2(bytes as f64 / BYTES_PER_GB)
}

/// Format a signed GB change: `+2.0 GB`, `-1.23 GB`, `0.0 GB`.
///
/// Only strictly positive values get a leading `+`.
#[must_use]
pub fn format_gb_change(delta: f64) -> String {
    let delta = round2(delta);
    let number = if delta.fract() == 0.0 {
        format!("{:.1}", delta)
    } else {
        format!("{}", delta)
    };

    if delta > 0.0 {
        format!("+{} GB", number)
    } else {
        format!("{} GB", number)
    }
}
