//! Point bookkeeping shared by every question input.

/// Points granted per slider step. Fixed for every slider question.
pub const SLIDER_POINTS_PER_STEP: i64 = 2;

/// Lenient point parsing for option point values.
///
/// Leading whitespace and an optional sign are accepted, then the longest
/// run of ASCII digits is read, so `"5"`, `" 5 pts"` and `"2.5"` give 5, 5
/// and 2. Missing, empty or non-numeric input, and values overflowing
/// `i64`, give 0 instead of an error.
pub fn parse_points(raw: Option<&str>) -> i64 {
    let Some(raw) = raw else {
        return 0;
    };
    let trimmed = raw.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let end = digits
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(digits.len());
    match digits[..end].parse::<i64>() {
        Ok(value) if negative => -value,
        Ok(value) => value,
        Err(_) => 0,
    }
}

pub fn slider_points(raw_value: i64) -> i64 {
    raw_value.saturating_mul(SLIDER_POINTS_PER_STEP)
}
