//! Sentence regrouping and the clean anchor-line document that marker files start from.

use std::fmt::Write as _;

use crate::timecode;
use crate::transcript::model::{Segment, Transcript};

/// Segments shorter than this are treated as the tail of the previous sentence.
const SHORT_TAIL_SEC: f64 = 3.0;

fn ends_sentence(text: &str) -> bool {
    text.ends_with(['.', '?', '!', ':', '。', '？', '！'])
}

/// Regroup recognizer segments into whole sentences.
///
/// Consecutive segments are joined until one ends in sentence punctuation, unless the next segment
/// is a short tail. A group is also closed before it would exceed `max_sec`, except when the
/// incoming segment is itself a short tail.
pub fn merge_segments(segments: &[Segment], max_sec: f64) -> Vec<Segment> {
    let Some(first) = segments.first() else {
        return Vec::new();
    };

    let mut merged = Vec::new();
    let mut current_start = first.start;
    let mut current_end = first.end;
    let mut texts: Vec<&str> = Vec::new();

    for (i, seg) in segments.iter().enumerate() {
        let text = seg.text.trim();
        let next_is_short = segments
            .get(i + 1)
            .is_some_and(|n| n.end - n.start < SHORT_TAIL_SEC);
        let seg_duration = if seg.start > 0.0 {
            seg.end - seg.start
        } else {
            seg.end
        };
        let is_short_tail = seg_duration < SHORT_TAIL_SEC && !texts.is_empty();

        if !texts.is_empty() && seg.end - current_start > max_sec && !is_short_tail {
            merged.push(Segment {
                start: current_start,
                end: current_end,
                text: texts.join(" "),
            });
            current_start = seg.start;
            texts.clear();
        }

        texts.push(text);
        current_end = seg.end;

        if ends_sentence(text) && !next_is_short {
            merged.push(Segment {
                start: current_start,
                end: current_end,
                text: texts.join(" "),
            });
            current_start = seg.end;
            texts.clear();
        }
    }

    if !texts.is_empty() {
        merged.push(Segment {
            start: current_start,
            end: current_end,
            text: texts.join(" "),
        });
    }
    merged
}

/// Render one anchor line: `[M:SS - M:SS] (N.Ns) text`.
pub fn anchor_line(seg: &Segment) -> String {
    format!(
        "[{} - {}] ({:.1}s) {}",
        timecode::format(seg.start),
        timecode::format(seg.end),
        seg.end - seg.start,
        seg.text
    )
}

/// Render the clean transcript document: a `#` header followed by one anchor line per sentence.
pub fn render_clean_markdown(transcript: &Transcript, title: &str, max_sec: f64) -> String {
    let merged = merge_segments(&transcript.segments, max_sec);
    let mut out = String::new();
    let _ = writeln!(out, "# Clean transcript: {title}");
    let _ = writeln!(out, "#");
    let _ = writeln!(
        out,
        "# Duration: {} ({}s)",
        timecode::format(transcript.duration),
        transcript.duration as u64
    );
    let _ = writeln!(
        out,
        "# Words: {} | Source segments: {} | Sentences: {}",
        transcript.words.len(),
        transcript.segments.len(),
        merged.len()
    );
    let _ = writeln!(out, "#");
    let _ = writeln!(
        out,
        "# Generated by `talkcut transcribe`. Regenerate with `talkcut transcribe --clean-only`."
    );
    out.push('\n');
    for seg in &merged {
        out.push_str(&anchor_line(seg));
        out.push_str("\n\n");
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/transcript/clean.rs"]
mod tests;
