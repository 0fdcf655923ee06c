use std::fmt;

/// Non-fatal conditions surfaced to the operator. Warnings are collected and never abort a stage.
#[derive(Clone, Debug, PartialEq)]
pub enum Warning {
    /// A marker line could not be parsed and was skipped.
    MalformedAnnotationLine {
        /// 1-based line number in the marker file.
        line: usize,
        /// Human-readable reason.
        reason: String,
    },
    /// A target token scored under the fuzzy threshold; segment timing was used instead.
    UnresolvedToken {
        /// 1-based line number of the marker.
        line: usize,
        /// The token or phrase that was searched.
        token: String,
        /// Time (seconds) used as fallback.
        fallback_sec: f64,
    },
    /// Cross-correlation peak was not sharply defined.
    LowConfidenceOffset {
        /// Peak / mean-abs ratio.
        confidence: f64,
        /// Configured threshold.
        threshold: f64,
    },
    /// A `===` block was opened and never closed; it was closed at end of file.
    UnterminatedBlock {
        /// 1-based line that opened the block.
        opened_at: usize,
    },
    /// An optional duration field could not be parsed and was ignored.
    InvalidDuration {
        /// 1-based line number.
        line: usize,
        /// Raw field text.
        raw: String,
    },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedAnnotationLine { line, reason } => {
                write!(f, "line {line}: malformed marker ({reason}), skipped")
            }
            Self::UnresolvedToken {
                line,
                token,
                fallback_sec,
            } => write!(
                f,
                "line {line}: \"{token}\" not found in word-level transcript, using segment time {fallback_sec:.2}s"
            ),
            Self::LowConfidenceOffset {
                confidence,
                threshold,
            } => write!(
                f,
                "low offset confidence ({confidence:.1}x < {threshold:.1}x), verify manually"
            ),
            Self::UnterminatedBlock { opened_at } => write!(
                f,
                "line {opened_at}: block opened with === is never closed, closing at end of file"
            ),
            Self::InvalidDuration { line, raw } => {
                write!(f, "line {line}: invalid duration '{raw}', ignoring")
            }
        }
    }
}

/// Ordered accumulator of [`Warning`]s.
///
/// Each pushed warning is also logged through `tracing::warn!`.
#[derive(Clone, Debug, Default)]
pub struct Warnings {
    items: Vec<Warning>,
}

impl Warnings {
    /// Create an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a warning.
    pub fn push(&mut self, warning: Warning) {
        tracing::warn!("{warning}");
        self.items.push(warning);
    }

    /// Move all warnings of `other` into `self`, preserving order.
    pub fn extend(&mut self, other: Warnings) {
        self.items.extend(other.items);
    }

    /// Number of recorded warnings.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Return `true` when nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterate over recorded warnings.
    pub fn iter(&self) -> impl Iterator<Item = &Warning> {
        self.items.iter()
    }

    /// Count malformed marker lines (reported in stage summaries).
    pub fn malformed_lines(&self) -> usize {
        self.items
            .iter()
            .filter(|w| matches!(w, Warning::MalformedAnnotationLine { .. }))
            .count()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/warning.rs"]
mod tests;
