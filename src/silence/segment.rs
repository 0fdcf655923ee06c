use crate::foundation::core::TimeInterval;

/// Minimum growth (seconds) a kept segment needs over the previous kept end to be emitted.
pub const MIN_SEGMENT_SEC: f64 = 0.1;

/// One silence interval as reported by the detector.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Silence {
    /// Silence start in seconds.
    pub start: f64,
    /// Silence end in seconds.
    pub end: f64,
    /// Reported duration in seconds.
    pub duration: f64,
}

/// Parameters for [`segment_voice`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SegmentParams {
    /// Only silences strictly longer than this are removed.
    pub min_silence_sec: f64,
    /// Air kept on both sides of each cut.
    pub padding_sec: f64,
    /// Duration of the source media.
    pub total_duration_sec: f64,
}

/// Convert detected silences into the ordered list of voice segments to keep.
///
/// Silences at or under `min_silence_sec` are left inside the surrounding segments. A silence
/// shorter than twice the padding is not cut at all: the next segment starts where the previous
/// one ended instead of before it.
pub fn segment_voice(silences: &[Silence], params: SegmentParams) -> Vec<TimeInterval> {
    let total = params.total_duration_sec.max(0.0);
    let padding = params.padding_sec.max(0.0);

    let mut long: Vec<&Silence> = silences
        .iter()
        .filter(|s| s.duration > params.min_silence_sec)
        .collect();
    long.sort_by(|a, b| a.start.total_cmp(&b.start));

    let mut out = Vec::new();
    let mut prev_kept_end = 0.0f64;
    for silence in long {
        let seg_end = (silence.start + padding).min(total);
        let mut floor = prev_kept_end;
        if seg_end > prev_kept_end + MIN_SEGMENT_SEC {
            out.push(TimeInterval::clamped(prev_kept_end, seg_end));
            floor = seg_end;
        }
        prev_kept_end = (silence.end - padding).max(floor);
    }

    if prev_kept_end < total {
        out.push(TimeInterval::clamped(prev_kept_end, total));
    }
    out
}

/// Summary numbers printed by the jump-cut stage.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SilenceStats {
    /// Silences long enough to be cut.
    pub long_count: usize,
    /// Silences kept inside segments.
    pub short_count: usize,
    /// Number of voice segments produced.
    pub segment_count: usize,
    /// Seconds removed from the timeline.
    pub removed_sec: f64,
    /// Estimated output duration.
    pub output_sec: f64,
}

impl SilenceStats {
    /// Compute stats from the detector output and the resulting segments.
    pub fn compute(silences: &[Silence], segments: &[TimeInterval], params: SegmentParams) -> Self {
        let long_count = silences
            .iter()
            .filter(|s| s.duration > params.min_silence_sec)
            .count();
        let kept: f64 = segments.iter().map(|s| s.duration()).sum();
        Self {
            long_count,
            short_count: silences.len() - long_count,
            segment_count: segments.len(),
            removed_sec: (params.total_duration_sec - kept).max(0.0),
            output_sec: kept,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/silence/segment.rs"]
mod tests;
