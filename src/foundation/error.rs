use std::path::{Path, PathBuf};

/// Result alias used throughout the crate.
pub type TalkcutResult<T> = Result<T, TalkcutError>;

/// How many trailing characters of an external tool's diagnostic output are kept.
pub const DIAGNOSTIC_TAIL_CHARS: usize = 800;

/// Fatal errors. Every variant terminates the current stage with a non-zero exit status.
#[derive(thiserror::Error, Debug)]
pub enum TalkcutError {
    /// A required input (source media, transcript, marker file) is absent.
    #[error("input file not found: {}", path.display())]
    MissingInputFile {
        /// Path that was expected to exist.
        path: PathBuf,
    },

    /// A textual timestamp could not be parsed.
    #[error("malformed timestamp: '{0}'")]
    MalformedTimestamp(String),

    /// A clip/image/logo referenced by a marker line is absent on disk.
    #[error("line {line}: payload not found: {}", path.display())]
    MissingPayloadAsset {
        /// 1-based marker line that referenced the payload.
        line: usize,
        /// Resolved payload path.
        path: PathBuf,
    },

    /// The encoder (or prober) exited with a non-zero status.
    #[error("{tool} failed ({status}): {diagnostic_tail}")]
    ExternalToolFailure {
        /// Program name, e.g. `ffmpeg`.
        tool: String,
        /// Exit status description.
        status: String,
        /// Last [`DIAGNOSTIC_TAIL_CHARS`] characters of standard error.
        diagnostic_tail: String,
    },

    /// The remote transcription call failed.
    #[error("transcription error: {0}")]
    Transcription(String),

    /// Invalid configuration or inconsistent derived data.
    #[error("validation error: {0}")]
    Validation(String),

    /// JSON decode/encode failure.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Anything else (I/O with context, etc.).
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TalkcutError {
    /// Build a [`TalkcutError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`TalkcutError::Serde`].
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Build a [`TalkcutError::Transcription`].
    pub fn transcription(msg: impl Into<String>) -> Self {
        Self::Transcription(msg.into())
    }

    /// Build a [`TalkcutError::MissingInputFile`].
    pub fn missing_input(path: impl AsRef<Path>) -> Self {
        Self::MissingInputFile {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Build a [`TalkcutError::ExternalToolFailure`] keeping only the tail of `stderr`.
    pub fn external(tool: impl Into<String>, status: impl Into<String>, stderr: &str) -> Self {
        Self::ExternalToolFailure {
            tool: tool.into(),
            status: status.into(),
            diagnostic_tail: diagnostic_tail(stderr, DIAGNOSTIC_TAIL_CHARS).to_string(),
        }
    }
}

/// Return at most the last `max_chars` characters of `text`, trimmed.
pub fn diagnostic_tail(text: &str, max_chars: usize) -> &str {
    let text = text.trim();
    let count = text.chars().count();
    if count <= max_chars {
        return text;
    }
    let skip = count - max_chars;
    match text.char_indices().nth(skip) {
        Some((idx, _)) => &text[idx..],
        None => text,
    }
}

/// Fail with [`TalkcutError::MissingInputFile`] unless `path` is an existing file.
pub fn require_file(path: &Path) -> TalkcutResult<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(TalkcutError::missing_input(path))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
