//! Shared utility functions.

/// Rounds a value to `decimals` places, half away from zero.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// Rounds to two decimal places, the precision used throughout reports.
pub fn round2(value: f64) -> f64 {
    round_to(value, 2)
}

/// Formats an hour count for display, e.g. `12.50 h`.
pub fn format_hours(hours: f64) -> String {
    format!("{hours:.2} h")
}

/// Truncates a string to at most `max_chars` characters, adding an ellipsis.
///
/// Counts characters rather than bytes so multi-byte titles are never split.
pub fn truncate_string(input: &str, max_chars: usize) -> String {
    if input.chars().count() <= max_chars {
        return input.to_string();
    }
    let keep = max_chars.saturating_sub(3);
    let mut truncated: String = input.chars().take(keep).collect();
    truncated.push_str("...");
    truncated
}

/// Zero-padded 24-hour label for an hour bucket, e.g. `07:00`.
pub fn format_hour(hour: u32) -> String {
    format!("{hour:02}:00")
}
