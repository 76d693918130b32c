//! Unit conversion and number formatting for the report
//!
//! All conversions use decimal units (1 MB = 1,000,000 bytes, 1 Mbps =
//! 1,000,000 bits per second) and round to a fixed number of decimals before
//! display.

/// Rounds a value to the given number of decimal places
///
/// # Examples
///
/// ```
/// use network_hub::report::formatting::round_to;
///
/// assert_eq!(round_to(55.1234, 2), 55.12);
/// assert_eq!(round_to(0.0456, 3), 0.046);
/// ```
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// Converts a byte count to megabytes rounded to 2 decimals
pub fn bytes_to_mb(bytes: u64) -> f64 {
    round_to(bytes as f64 / 1_000_000.0, 2)
}

/// Converts bits per second to megabits per second rounded to 2 decimals
pub fn bps_to_mbps(bits_per_second: f64) -> f64 {
    round_to(bits_per_second / 1_000_000.0, 2)
}

/// Converts a duration in seconds to milliseconds rounded to 2 decimals
pub fn seconds_to_millis(seconds: f64) -> f64 {
    round_to(seconds * 1000.0, 2)
}

/// Formats a number in its shortest round-trip form, keeping at least one
/// fractional digit
///
/// # Examples
///
/// ```
/// use network_hub::report::formatting::format_decimal;
///
/// assert_eq!(format_decimal(55.12), "55.12");
/// assert_eq!(format_decimal(55.0), "55.0");
/// assert_eq!(format_decimal(0.5), "0.5");
/// ```
pub fn format_decimal(value: f64) -> String {
    format!("{:?}", value)
}

/// Formats an optional text field, printing `None` when the field was absent
pub fn format_field(value: Option<&str>) -> &str {
    value.unwrap_or("None")
}
