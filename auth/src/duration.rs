//! Parsing of human duration strings such as `"24h"`, `"1h30m"` or `"7d"`.

use std::time::Duration;

use thiserror::Error;

/// Error for duration string parsing failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DurationError {
    #[error("Empty duration")]
    Empty,

    #[error("Invalid number in duration: {0}")]
    InvalidNumber(String),

    #[error("Missing unit in duration: {0}")]
    MissingUnit(String),

    #[error("Unknown unit '{unit}' in duration: {input}")]
    UnknownUnit { unit: String, input: String },

    #[error("Duration out of range: {0}")]
    OutOfRange(String),
}

/// Parse a duration made of `<number><unit>` terms.
///
/// Units: `ns`, `us`/`µs`, `ms`, `s`, `m`, `h`, `d`. Numbers may carry a
/// fractional part (`"1.5h"`). A bare `"0"` is accepted.
///
/// # Errors
/// * `Empty` - Input is empty
/// * `InvalidNumber` - A term does not start with a number
/// * `MissingUnit` - A number is not followed by a unit
/// * `UnknownUnit` - The unit is not one listed above
/// * `OutOfRange` - The total does not fit in a `Duration`
pub fn parse_duration(input: &str) -> Result<Duration, DurationError> {
    let s = input.trim();
    if s.is_empty() {
        return Err(DurationError::Empty);
    }
    if s == "0" {
        return Ok(Duration::ZERO);
    }

    let mut total = 0f64;
    let mut rest = s;
    while !rest.is_empty() {
        let number_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        let (number, tail) = rest.split_at(number_len);
        if number.is_empty() {
            return Err(DurationError::InvalidNumber(input.to_string()));
        }
        let value: f64 = number
            .parse()
            .map_err(|_| DurationError::InvalidNumber(input.to_string()))?;

        let unit_len = tail
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(tail.len());
        let (unit, tail) = tail.split_at(unit_len);
        if unit.is_empty() {
            return Err(DurationError::MissingUnit(input.to_string()));
        }

        total += value * unit_seconds(unit).ok_or_else(|| DurationError::UnknownUnit {
            unit: unit.to_string(),
            input: input.to_string(),
        })?;
        rest = tail;
    }

    Duration::try_from_secs_f64(total).map_err(|_| DurationError::OutOfRange(input.to_string()))
}

/// Shortest duration `duration_or` accepts. Token timestamps have whole-second
/// resolution, so anything shorter would expire at issue time.
pub const MIN_DURATION: Duration = Duration::from_secs(1);

/// Parse a duration, substituting `fallback` for unparsable input or anything
/// shorter than one second.
///
/// Logs a warning naming the rejected value when the fallback is used.
pub fn duration_or(input: &str, fallback: Duration) -> Duration {
    match parse_duration(input) {
        Ok(duration) if duration >= MIN_DURATION => duration,
        Ok(_) => {
            tracing::warn!(value = %input, fallback_secs = fallback.as_secs(), "Sub-second duration, using fallback");
            fallback
        }
        Err(e) => {
            tracing::warn!(value = %input, fallback_secs = fallback.as_secs(), error = %e, "Unparsable duration, using fallback");
            fallback
        }
    }
}

fn unit_seconds(unit: &str) -> Option<f64> {
    match unit {
        "ns" => Some(1e-9),
        "us" | "µs" => Some(1e-6),
        "ms" => Some(1e-3),
        "s" => Some(1.0),
        "m" => Some(60.0),
        "h" => Some(3_600.0),
        "d" => Some(86_400.0),
        _ => None,
    }
}
