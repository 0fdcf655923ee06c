use std::sync::LazyLock;

use regex::Regex;

use crate::foundation::core::TimeInterval;
use crate::transcript::model::{Transcript, Word};

static WORD_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\w+").expect("word token pattern is valid"));

/// Characters stripped from both ends of a word before comparison.
const STRIP_CHARS: &[char] = &[
    ' ', '.', ',', '!', '?', '¿', '¡', '"', '\'', '“', '”', ';', ':',
];

/// Fuzzy-match policy.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Minimum similarity for a single-word match.
    pub word_threshold: f64,
    /// Minimum average similarity for a multi-word match.
    pub phrase_threshold: f64,
    /// Slack (seconds) added on both sides of a search range.
    pub range_slack_sec: f64,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            word_threshold: 0.6,
            phrase_threshold: 0.5,
            range_slack_sec: 1.0,
        }
    }
}

/// A successful lookup: first matched word start, last matched word end, and the score.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WordMatch {
    /// Start of the first matched word.
    pub start: f64,
    /// End of the last matched word.
    pub end: f64,
    /// Similarity in `[0, 1]`.
    pub score: f64,
}

impl WordMatch {
    /// The matched span as an interval.
    pub fn interval(&self) -> TimeInterval {
        TimeInterval::clamped(self.start, self.end)
    }
}

/// Lowercase and strip surrounding punctuation and quotes.
pub fn normalize_word(text: &str) -> String {
    text.to_lowercase().trim_matches(STRIP_CHARS).to_string()
}

/// Split free text into lowercase word tokens.
pub fn tokenize(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    WORD_TOKEN
        .find_iter(&lower)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Similarity ratio `2 * matches / total_len` over characters.
pub fn similarity(a: &str, b: &str) -> f64 {
    f64::from(similar::TextDiff::from_chars(a, b).ratio())
}

struct IndexedWord {
    norm: String,
    start: f64,
    end: f64,
}

/// Read-only, time-ordered word index supporting range-restricted fuzzy lookup.
pub struct TranscriptIndex {
    words: Vec<IndexedWord>,
    config: MatchConfig,
}

impl TranscriptIndex {
    /// Index the words of `transcript`.
    pub fn new(transcript: &Transcript, config: MatchConfig) -> Self {
        Self::from_words(&transcript.words, config)
    }

    /// Index an ordered word list.
    pub fn from_words(words: &[Word], config: MatchConfig) -> Self {
        Self {
            words: words
                .iter()
                .map(|w| IndexedWord {
                    norm: normalize_word(&w.text),
                    start: w.start,
                    end: w.end,
                })
                .collect(),
            config,
        }
    }

    /// Number of indexed words.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Return `true` when the transcript has no word-level timing.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    fn candidates(&self, range: Option<TimeInterval>) -> Vec<&IndexedWord> {
        let window = range.map(|r| r.widen(self.config.range_slack_sec));
        self.words
            .iter()
            .filter(|w| window.is_none_or(|r| r.contains(w.start) && r.contains(w.end)))
            .collect()
    }

    /// Best fuzzy match for a single word, or `None` under the word threshold.
    ///
    /// The first candidate wins when several share the best score.
    pub fn find_word(&self, target: &str, range: Option<TimeInterval>) -> Option<WordMatch> {
        let target = normalize_word(target);
        if target.is_empty() {
            return None;
        }
        let mut best: Option<WordMatch> = None;
        for w in self.candidates(range) {
            let score = similarity(&target, &w.norm);
            if best.is_none_or(|b| score > b.score) {
                best = Some(WordMatch {
                    start: w.start,
                    end: w.end,
                    score,
                });
            }
        }
        best.filter(|b| b.score >= self.config.word_threshold)
    }

    /// Best sliding-window match for a token sequence, scored by average per-position similarity.
    ///
    /// A single token degenerates to [`Self::find_word`].
    pub fn find_phrase<S: AsRef<str>>(
        &self,
        tokens: &[S],
        range: Option<TimeInterval>,
    ) -> Option<WordMatch> {
        let tokens: Vec<String> = tokens
            .iter()
            .map(|t| normalize_word(t.as_ref()))
            .filter(|t| !t.is_empty())
            .collect();
        match tokens.len() {
            0 => return None,
            1 => return self.find_word(&tokens[0], range),
            _ => {}
        }

        let candidates = self.candidates(range);
        let n = tokens.len();
        let mut best: Option<WordMatch> = None;
        for window in candidates.windows(n) {
            let total: f64 = tokens
                .iter()
                .zip(window)
                .map(|(t, w)| similarity(t, &w.norm))
                .sum();
            let score = total / n as f64;
            if best.is_none_or(|b| score > b.score) {
                best = Some(WordMatch {
                    start: window[0].start,
                    end: window[n - 1].end,
                    score,
                });
            }
        }
        best.filter(|b| b.score >= self.config.phrase_threshold)
    }

    /// Tokenize a marker target and look it up as a word or phrase.
    pub fn find_target(&self, target: &str, range: Option<TimeInterval>) -> Option<WordMatch> {
        self.find_phrase(&tokenize(target), range)
    }

    /// Look up free display text by comparing it with equally long word windows as whole strings.
    ///
    /// Used for text cards, whose display text is a paraphrase more often than a verbatim quote.
    pub fn find_phrase_text(&self, text: &str, range: Option<TimeInterval>) -> Option<WordMatch> {
        let tokens = tokenize(text);
        if tokens.is_empty() {
            return None;
        }
        let phrase = tokens.join(" ");
        let candidates = self.candidates(range);
        let n = tokens.len();
        let mut best: Option<WordMatch> = None;
        for window in candidates.windows(n) {
            let joined = window
                .iter()
                .map(|w| w.norm.as_str())
                .collect::<Vec<_>>()
                .join(" ");
            let score = similarity(&phrase, &joined);
            if best.is_none_or(|b| score > b.score) {
                best = Some(WordMatch {
                    start: window[0].start,
                    end: window[n - 1].end,
                    score,
                });
            }
        }
        best.filter(|b| b.score >= self.config.phrase_threshold)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/transcript/index.rs"]
mod tests;
