//! Line-oriented marker language.
//!
//! ```text
//! [0:12.50 - 0:18] (5.5s) the anchor line, copied from the clean transcript
//! >>> clip.mp4 | @"word or phrase" | 5s
//! ===
//! >>> first text card
//! > > > second line of the same card
//! ===
//! # comment
//! ```
//!
//! The parser is an explicit state machine: [`ParseState::step`] consumes one line and returns the
//! next state together with the accumulated output.

use std::sync::LazyLock;

use regex::Regex;

use crate::annotate::record::{AnnotationKind, AnnotationRecord};
use crate::foundation::core::TimeInterval;
use crate::foundation::warning::{Warning, Warnings};
use crate::timecode;

const TS: &str = r"\d+:\d+(?::\d+)?(?:\.\d+)?";

static ANCHOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"^\[({TS})\s*-\s*({TS})\]\s*(?:\(\d+\.?\d*s\)\s*)?(.*)$"
    ))
    .expect("anchor pattern is valid")
});

static ANCHOR_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[\d+:\d+").expect("anchor prefix pattern is valid"));

static TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^@["“](.+?)["”]"#).expect("token pattern is valid"));

static LOGO_APPROVAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^→\s*(\S+)\.png\s*\|\s*(✅|❌)").expect("logo approval pattern is valid")
});

const MARKER: &str = ">>>";
const MARKER_ESCAPED: &str = "> > >";

fn is_delimiter(trimmed: &str) -> bool {
    trimmed == "===" || trimmed == "= = ="
}

fn marker_body(trimmed: &str) -> Option<&str> {
    trimmed
        .strip_prefix(MARKER_ESCAPED)
        .or_else(|| trimmed.strip_prefix(MARKER))
        .map(str::trim)
}

/// Machine phase, derived from the state fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// No anchor line seen yet; markers are ignored.
    OutsideSegment,
    /// An anchor is current; markers attach to it.
    HaveSegment,
    /// Between a pair of `===` delimiters.
    InsideBlock,
}

#[derive(Clone, Debug, PartialEq)]
struct Anchor {
    window: TimeInterval,
    text: String,
}

/// Records and warnings accumulated while parsing.
#[derive(Clone, Debug, Default)]
pub struct ParseOutcome {
    /// Parsed records in file order.
    pub records: Vec<AnnotationRecord>,
    /// Skipped lines and other non-fatal conditions.
    pub warnings: Warnings,
}

/// Parser state threaded through [`ParseState::step`].
#[derive(Clone, Debug)]
pub struct ParseState {
    kind: AnnotationKind,
    anchor: Option<Anchor>,
    last_block_id: u32,
    open_block_line: Option<usize>,
    pending_card: Option<AnnotationRecord>,
}

impl ParseState {
    /// Initial state for a marker file of `kind`.
    pub fn new(kind: AnnotationKind) -> Self {
        Self {
            kind,
            anchor: None,
            last_block_id: 0,
            open_block_line: None,
            pending_card: None,
        }
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        if self.open_block_line.is_some() {
            Phase::InsideBlock
        } else if self.anchor.is_some() {
            Phase::HaveSegment
        } else {
            Phase::OutsideSegment
        }
    }

    fn current_block(&self) -> Option<u32> {
        self.open_block_line.map(|_| self.last_block_id)
    }

    /// Consume one line (1-based `line_no`).
    pub fn step(mut self, mut out: ParseOutcome, line_no: usize, line: &str) -> (Self, ParseOutcome) {
        let trimmed = line.trim();

        if let Some(mut card) = self.pending_card.take() {
            if let Some(rest) = trimmed.strip_prefix(MARKER_ESCAPED) {
                card.payload.push('\n');
                card.payload.push_str(rest.trim());
                self.pending_card = Some(card);
                return (self, out);
            }
            let ends_card = trimmed.is_empty()
                || trimmed.starts_with('#')
                || trimmed.starts_with(MARKER)
                || is_delimiter(trimmed)
                || ANCHOR_PREFIX.is_match(line.trim_start());
            if !ends_card {
                card.payload.push('\n');
                card.payload.push_str(trimmed);
                self.pending_card = Some(card);
                return (self, out);
            }
            out.records.push(card);
        }

        if is_delimiter(trimmed) {
            self.open_block_line = match self.open_block_line {
                Some(_) => None,
                None => {
                    self.last_block_id += 1;
                    Some(line_no)
                }
            };
            return (self, out);
        }

        if let Some(caps) = ANCHOR.captures(line.trim_start()) {
            self.anchor = self.parse_anchor(&caps, line_no, &mut out.warnings);
            return (self, out);
        }

        if trimmed.starts_with('#') {
            return (self, out);
        }

        if let Some(body) = marker_body(trimmed) {
            let Some(anchor) = self.anchor.as_ref() else {
                return (self, out);
            };
            if self.kind.has_fields() {
                if let Some(rec) = self.field_marker(anchor, body, line_no, &mut out.warnings) {
                    out.records.push(rec);
                }
            } else if body.is_empty() {
                out.warnings.push(Warning::MalformedAnnotationLine {
                    line: line_no,
                    reason: "empty text card".to_string(),
                });
            } else {
                self.pending_card = Some(self.record(anchor, line_no, None, body.to_string(), None));
            }
            return (self, out);
        }

        if self.kind == AnnotationKind::Logo
            && let Some(caps) = LOGO_APPROVAL.captures(trimmed)
            && let Some(anchor) = self.anchor.as_ref()
            && &caps[2] == "✅"
        {
            let payload = format!("{}.png", &caps[1]);
            let rec = self.record(anchor, line_no, None, payload, None);
            out.records.push(rec);
        }

        (self, out)
    }

    /// Flush a pending text card and close an unterminated block.
    pub fn finish(self, mut out: ParseOutcome) -> ParseOutcome {
        if let Some(card) = self.pending_card {
            out.records.push(card);
        }
        if let Some(opened_at) = self.open_block_line {
            out.warnings.push(Warning::UnterminatedBlock { opened_at });
        }
        out
    }

    fn parse_anchor(
        &self,
        caps: &regex::Captures<'_>,
        line_no: usize,
        warnings: &mut Warnings,
    ) -> Option<Anchor> {
        let bounds = timecode::parse(&caps[1])
            .and_then(|start| timecode::parse(&caps[2]).map(|end| (start, end)))
            .and_then(|(start, end)| TimeInterval::new(start, end));
        match bounds {
            Ok(window) => Some(Anchor {
                window,
                text: caps[3].trim().to_string(),
            }),
            Err(e) => {
                warnings.push(Warning::MalformedAnnotationLine {
                    line: line_no,
                    reason: format!("bad anchor: {e}"),
                });
                None
            }
        }
    }

    fn field_marker(
        &self,
        anchor: &Anchor,
        body: &str,
        line_no: usize,
        warnings: &mut Warnings,
    ) -> Option<AnnotationRecord> {
        let malformed = |reason: &str| Warning::MalformedAnnotationLine {
            line: line_no,
            reason: reason.to_string(),
        };
        let fields: Vec<&str> = body.split('|').map(str::trim).collect();
        if fields.len() < 2 {
            warnings.push(malformed("expected 'file | @\"token\"'"));
            return None;
        }
        if fields[0].is_empty() {
            warnings.push(malformed("missing payload file name"));
            return None;
        }
        let Some(token) = TOKEN.captures(fields[1]) else {
            warnings.push(malformed("missing @\"token\" field"));
            return None;
        };

        let explicit_duration = match fields.get(2).filter(|f| !f.is_empty()) {
            Some(raw) => {
                let parsed = timecode::parse_duration(raw);
                if parsed.is_none() {
                    warnings.push(Warning::InvalidDuration {
                        line: line_no,
                        raw: raw.to_string(),
                    });
                }
                parsed
            }
            None => None,
        };

        Some(self.record(
            anchor,
            line_no,
            Some(token[1].to_string()),
            fields[0].to_string(),
            explicit_duration,
        ))
    }

    fn record(
        &self,
        anchor: &Anchor,
        line: usize,
        target: Option<String>,
        payload: String,
        explicit_duration: Option<f64>,
    ) -> AnnotationRecord {
        AnnotationRecord {
            kind: self.kind,
            line,
            anchor: anchor.window,
            anchor_text: anchor.text.clone(),
            target,
            payload,
            explicit_duration,
            block_id: self.current_block(),
        }
    }
}

/// Parse a whole marker file of `kind`.
pub fn parse_markers(kind: AnnotationKind, text: &str) -> ParseOutcome {
    let (state, out) = text.lines().enumerate().fold(
        (ParseState::new(kind), ParseOutcome::default()),
        |(state, out), (idx, line)| state.step(out, idx + 1, line),
    );
    let out = state.finish(out);
    tracing::debug!(
        kind = ?kind,
        records = out.records.len(),
        warnings = out.warnings.len(),
        "marker file parsed"
    );
    out
}

#[cfg(test)]
#[path = "../../tests/unit/annotate/parser.rs"]
mod tests;
