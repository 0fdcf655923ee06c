//! Textual timestamps used by marker files, summaries and encoder arguments.
//!
//! Marker anchors are written as `M:SS`, `M:SS.ff`, `H:MM:SS` or `H:MM:SS.fff`.

use crate::foundation::error::{TalkcutError, TalkcutResult};

/// Parse `M:SS[.frac]` or `H:MM:SS[.frac]` into seconds.
pub fn parse(text: &str) -> TalkcutResult<f64> {
    let malformed = || TalkcutError::MalformedTimestamp(text.to_string());
    let parts: Vec<&str> = text.trim().split(':').collect();

    let (hours, minutes, seconds) = match parts.as_slice() {
        [m, s] => (0, parse_whole(m).ok_or_else(malformed)?, *s),
        [h, m, s] => (
            parse_whole(h).ok_or_else(malformed)?,
            parse_whole(m).ok_or_else(malformed)?,
            *s,
        ),
        _ => return Err(malformed()),
    };
    let seconds = parse_seconds(seconds).ok_or_else(malformed)?;

    Ok((hours * 3600 + minutes * 60) as f64 + seconds)
}

fn parse_whole(s: &str) -> Option<u64> {
    let s = s.trim();
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

fn parse_seconds(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit() || b == b'.') {
        return None;
    }
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Format seconds as `M:SS`, or `M:SS.ff` when the value is not integral at two-decimal precision.
pub fn format(seconds: f64) -> String {
    if seconds < 0.0 {
        return format!("-{}", format(-seconds));
    }
    let hundredths = (seconds * 100.0).round() as u64;
    let minutes = hundredths / 6000;
    let rem = hundredths % 6000;
    if rem.is_multiple_of(100) {
        format!("{minutes}:{:02}", rem / 100)
    } else {
        format!("{minutes}:{:02}.{:02}", rem / 100, rem % 100)
    }
}

/// Format seconds as whole-second `M:SS` (truncating at millisecond precision), used in stage
/// summaries.
pub fn format_clock(seconds: f64) -> String {
    let total = (seconds.max(0.0) * 1000.0).round() as u64 / 1000;
    format!("{}:{:02}", total / 60, total % 60)
}

/// Format seconds as `HH:MM:SS.mmm` for encoder seek arguments.
pub fn format_ffmpeg(seconds: f64) -> String {
    let millis = (seconds.max(0.0) * 1000.0).round() as u64;
    let h = millis / 3_600_000;
    let m = (millis / 60_000) % 60;
    let s = (millis / 1000) % 60;
    let ms = millis % 1000;
    format!("{h:02}:{m:02}:{s:02}.{ms:03}")
}

/// Parse a marker duration field such as `5s`, `2.5s` or `5`.
pub fn parse_duration(text: &str) -> Option<f64> {
    let t = text.trim().to_ascii_lowercase();
    let t = t.strip_suffix('s').unwrap_or(&t).trim();
    t.parse::<f64>().ok().filter(|v| v.is_finite() && *v >= 0.0)
}

#[cfg(test)]
#[path = "../tests/unit/timecode/timecode.rs"]
mod tests;
