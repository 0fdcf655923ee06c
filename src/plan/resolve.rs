use crate::annotate::record::{AnnotationKind, AnnotationRecord};
use crate::foundation::core::TimeInterval;
use crate::foundation::warning::{Warning, Warnings};
use crate::plan::stack::{assign_stack_levels, normalize_blocks};
use crate::transcript::index::TranscriptIndex;

/// Earliest start a text card may get.
const TEXT_MIN_START_SEC: f64 = 0.01;

/// How an event's timing was obtained.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResolutionSource {
    /// Matched against the word-level transcript.
    WordLevel,
    /// Taken from the anchor line's own boundary.
    SegmentFallback,
}

impl ResolutionSource {
    /// Short label for summaries.
    pub fn label(self) -> &'static str {
        match self {
            Self::WordLevel => "word-level",
            Self::SegmentFallback => "segment fallback",
        }
    }
}

/// A record placed on the timeline. Derived, never persisted.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedEvent {
    /// Stage the event belongs to.
    pub kind: AnnotationKind,
    /// Marker line the event came from.
    pub line: usize,
    /// Placement on the source timeline. For inserts, `start` is the cut point.
    pub window: TimeInterval,
    /// Payload file name or display text.
    pub payload: String,
    /// Rendering order among overlapping overlays.
    pub stack_level: u32,
    /// Where the timing came from.
    pub source: ResolutionSource,
    /// Block the record was parsed in.
    pub block_id: Option<u32>,
}

/// Timing policy for overlay durations.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct TimingPolicy {
    /// Lead-in before a text card's phrase.
    pub text_pad_before_sec: f64,
    /// Hold after a text card's phrase.
    pub text_pad_after_sec: f64,
    /// Shortest text card.
    pub text_min_duration_sec: f64,
    /// Shortest image, logo or media overlay when no duration is given.
    pub image_min_duration_sec: f64,
}

impl Default for TimingPolicy {
    fn default() -> Self {
        Self {
            text_pad_before_sec: 0.3,
            text_pad_after_sec: 0.0,
            text_min_duration_sec: 0.0,
            image_min_duration_sec: 0.0,
        }
    }
}

/// Resolves annotation records against a transcript index.
pub struct Resolver<'a> {
    index: &'a TranscriptIndex,
    policy: TimingPolicy,
}

impl<'a> Resolver<'a> {
    /// Create a resolver.
    pub fn new(index: &'a TranscriptIndex, policy: TimingPolicy) -> Self {
        Self { index, policy }
    }

    /// Resolve one record. `payload_duration` is the probed length of a video payload, if any.
    ///
    /// Lookups are restricted to the record's anchor window. A miss falls back to the anchor's
    /// start for kinds shown when their token is said and to its end for inserts, and is
    /// reported as [`Warning::UnresolvedToken`].
    pub fn resolve(
        &self,
        record: &AnnotationRecord,
        payload_duration: Option<f64>,
        warnings: &mut Warnings,
    ) -> ResolvedEvent {
        let (window, source) = match record.kind {
            AnnotationKind::Text => self.text_window(record, warnings),
            _ => self.token_window(record, payload_duration, warnings),
        };
        ResolvedEvent {
            kind: record.kind,
            line: record.line,
            window,
            payload: record.payload.clone(),
            stack_level: 0,
            source,
            block_id: record.block_id,
        }
    }

    /// Resolve every record in parse order, then normalize blocks and assign stack levels.
    pub fn resolve_all<F>(
        &self,
        records: &[AnnotationRecord],
        mut payload_duration: F,
        warnings: &mut Warnings,
    ) -> Vec<ResolvedEvent>
    where
        F: FnMut(&AnnotationRecord) -> Option<f64>,
    {
        let mut events: Vec<ResolvedEvent> = records
            .iter()
            .map(|r| self.resolve(r, payload_duration(r), warnings))
            .collect();
        normalize_blocks(&mut events);
        if events.iter().any(|e| e.kind != AnnotationKind::Insert) {
            assign_stack_levels(&mut events);
        }
        events
    }

    fn token_window(
        &self,
        record: &AnnotationRecord,
        payload_duration: Option<f64>,
        warnings: &mut Warnings,
    ) -> (TimeInterval, ResolutionSource) {
        let anchor = record.anchor;
        let at_token = record.kind.appears_when_said();

        let (start, source) = match record.target.as_deref() {
            // Approval-form logos are bound to the whole anchor window.
            None => (anchor.start, ResolutionSource::SegmentFallback),
            Some(target) => match self.index.find_target(target, Some(anchor)) {
                Some(m) => (
                    if at_token { m.start } else { m.end },
                    ResolutionSource::WordLevel,
                ),
                None => {
                    let fallback = if at_token { anchor.start } else { anchor.end };
                    warnings.push(Warning::UnresolvedToken {
                        line: record.line,
                        token: target.to_string(),
                        fallback_sec: fallback,
                    });
                    (fallback, ResolutionSource::SegmentFallback)
                }
            },
        };

        let duration = match (record.explicit_duration, payload_duration) {
            (Some(d), _) => d,
            (None, Some(d)) if d > 0.0 => d,
            _ if record.kind == AnnotationKind::Insert => 0.0,
            _ => (anchor.end - start).max(self.policy.image_min_duration_sec),
        };
        (TimeInterval::clamped(start, start + duration), source)
    }

    fn text_window(
        &self,
        record: &AnnotationRecord,
        warnings: &mut Warnings,
    ) -> (TimeInterval, ResolutionSource) {
        let range = Some(record.anchor);
        let found = self
            .index
            .find_phrase_text(&record.payload, range)
            .or_else(|| self.index.find_phrase_text(&record.anchor_text, range));

        let (speech, source) = match found {
            Some(m) => (m.interval(), ResolutionSource::WordLevel),
            None => {
                warnings.push(Warning::UnresolvedToken {
                    line: record.line,
                    token: record.payload.replace('\n', " / "),
                    fallback_sec: record.anchor.start,
                });
                (record.anchor, ResolutionSource::SegmentFallback)
            }
        };

        let p = self.policy;
        let start = (speech.start - p.text_pad_before_sec).max(TEXT_MIN_START_SEC);
        let length = (speech.duration() + p.text_pad_before_sec + p.text_pad_after_sec)
            .max(p.text_min_duration_sec);
        (TimeInterval::clamped(start, start + length), source)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/plan/resolve.rs"]
mod tests;
