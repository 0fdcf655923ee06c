use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::foundation::error::{TalkcutError, TalkcutResult, require_file};

/// One recognized word with its own timing.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Word {
    /// Word text as recognized, possibly carrying punctuation.
    #[serde(rename = "word")]
    pub text: String,
    /// Start in seconds.
    pub start: f64,
    /// End in seconds.
    pub end: f64,
}

/// Sentence-level span produced by the recognizer.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Segment {
    /// Start in seconds.
    pub start: f64,
    /// End in seconds.
    pub end: f64,
    /// Segment text.
    #[serde(default)]
    pub text: String,
}

/// Transcript document: `{ "duration", "words": [...], "segments": [...] }`.
///
/// Unknown fields returned by the recognizer are ignored.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Transcript {
    /// Media duration in seconds.
    #[serde(default)]
    pub duration: f64,
    /// Word-level timing, ordered by start.
    #[serde(default)]
    pub words: Vec<Word>,
    /// Segment-level timing.
    #[serde(default)]
    pub segments: Vec<Segment>,
}

impl Transcript {
    /// Parse a transcript from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> TalkcutResult<Self> {
        let mut t: Transcript = serde_json::from_reader(r)
            .map_err(|e| TalkcutError::serde(format!("parse transcript JSON: {e}")))?;
        t.words.sort_by(|a, b| a.start.total_cmp(&b.start));
        Ok(t)
    }

    /// Parse a transcript from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> TalkcutResult<Self> {
        let path = path.as_ref();
        require_file(path)?;
        let f = File::open(path).map_err(|e| {
            TalkcutError::serde(format!("open transcript JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Write the document as pretty-printed JSON.
    pub fn write_to(&self, path: impl AsRef<Path>) -> TalkcutResult<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| TalkcutError::serde(format!("encode transcript JSON: {e}")))?;
        std::fs::write(path, json).map_err(|e| {
            anyhow::anyhow!("write transcript '{}': {e}", path.display()).into()
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/transcript/model.rs"]
mod tests;
