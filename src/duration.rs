//! Human-readable track duration formatting.

use std::fmt::Write;

const MILLIS_PER_SECOND: u64 = 1_000;
const MILLIS_PER_MINUTE: u64 = 60 * MILLIS_PER_SECOND;
const MILLIS_PER_HOUR: u64 = 60 * MILLIS_PER_MINUTE;
const MILLIS_PER_DAY: u64 = 24 * MILLIS_PER_HOUR;

/// Sub-second precision appended to a formatted time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Precision {
    #[default]
    Seconds,
    Centiseconds,
    Milliseconds,
}

/// Formats a duration given in seconds as `m:ss`, `h:mm:ss` or `Nd, hh:mm:ss`.
///
/// Fractions below the requested precision are truncated, never rounded, so a
/// 61.5 second track shows as `1:01`. Negative and non-finite inputs render as `?`.
pub fn format_time(seconds: f64, precision: Precision) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return "?".to_string();
    }

    let total_millis = (seconds * MILLIS_PER_SECOND as f64) as u64;
    let days = total_millis / MILLIS_PER_DAY;
    let day_millis = total_millis % MILLIS_PER_DAY;
    let hours = day_millis / MILLIS_PER_HOUR;
    let minutes = (day_millis / MILLIS_PER_MINUTE) % 60;
    let secs = (day_millis / MILLIS_PER_SECOND) % 60;
    let millis = day_millis % MILLIS_PER_SECOND;

    let mut formatted = String::new();
    if days > 0 {
        let _ = write!(formatted, "{days}d, ");
    }
    if days > 0 || hours > 0 {
        let _ = write!(formatted, "{hours:02}:{minutes:02}:{secs:02}");
    } else {
        let _ = write!(formatted, "{minutes:02}:{secs:02}");
    }
    match precision {
        Precision::Seconds => {}
        Precision::Centiseconds => {
            let _ = write!(formatted, ".{:02}", millis / 10);
        }
        Precision::Milliseconds => {
            let _ = write!(formatted, ".{millis:03}");
        }
    }

    // Two-digit fields give one leading zero too many for the first unit.
    let mut chars = formatted.chars();
    if chars.next() == Some('0') && chars.next() != Some(':') {
        formatted.remove(0);
    }
    formatted
}
