//! On-disk project layout and marker file seeding.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::annotate::record::AnnotationKind;
use crate::foundation::error::{TalkcutError, TalkcutResult};

/// Word-level transcript document name.
pub const TRANSCRIPT_JSON: &str = "transcription.json";
/// Clean transcript (anchor lines) name.
pub const CLEAN_TRANSCRIPT: &str = "transcription_clean.md";

/// Paths of one video project.
///
/// ```text
/// <root>/source/{video,audio,transcription,inserts,overlays,logos}
/// <root>/tmp/<stage>/
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProjectLayout {
    root: PathBuf,
}

impl ProjectLayout {
    /// Layout rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Project root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn source(&self, sub: &str) -> PathBuf {
        self.root.join("source").join(sub)
    }

    /// `source/video`.
    pub fn video_dir(&self) -> PathBuf {
        self.source("video")
    }

    /// `source/audio`.
    pub fn audio_dir(&self) -> PathBuf {
        self.source("audio")
    }

    /// `source/transcription`.
    pub fn transcription_dir(&self) -> PathBuf {
        self.source("transcription")
    }

    /// `tmp/`.
    pub fn tmp_dir(&self) -> PathBuf {
        self.root.join("tmp")
    }

    /// Scratch directory of one stage.
    pub fn scratch_dir(&self, stage: &str) -> PathBuf {
        self.tmp_dir().join(stage)
    }

    /// A file in `source/video`.
    pub fn video(&self, name: &str) -> PathBuf {
        self.video_dir().join(name)
    }

    /// Word-level transcript document.
    pub fn transcript_json(&self) -> PathBuf {
        self.transcription_dir().join(TRANSCRIPT_JSON)
    }

    /// Clean transcript the marker files are seeded from.
    pub fn clean_transcript(&self) -> PathBuf {
        self.transcription_dir().join(CLEAN_TRANSCRIPT)
    }

    /// Marker file for `kind`.
    pub fn marker_file(&self, kind: AnnotationKind) -> PathBuf {
        self.transcription_dir().join(kind.marker_file_name())
    }

    /// Directory payload file names of `kind` are resolved against.
    pub fn payload_dir(&self, kind: AnnotationKind) -> PathBuf {
        match kind {
            AnnotationKind::Insert => self.source("inserts"),
            AnnotationKind::Media => self.source("overlays"),
            AnnotationKind::Logo => self.source("logos"),
            AnnotationKind::Text => self.transcription_dir(),
        }
    }
}

/// What [`seed_marker_file`] found.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SeedOutcome {
    /// The marker file already exists and can be parsed.
    Existing(PathBuf),
    /// The marker file was just created from the clean transcript; the operator must edit it.
    Seeded(PathBuf),
}

/// Instructions written at the top of a freshly seeded marker file.
pub fn marker_header(kind: AnnotationKind) -> &'static str {
    match kind {
        AnnotationKind::Insert => {
            "# Inserts
#
# Copied from transcription_clean.md. Mark insertion points with >>>.
#
# Add a marker line under the segment:
#   >>> clip.mp4 | @\"word\"
#
# - clip.mp4 is a file in source/inserts/ and is spliced in whole, with its audio
# - the clip starts right AFTER the word is said
#
# Example:
# [0:32.96 - 0:34.72] (1.8s) Because I was becoming obsolete.
# >>> interview.mp4 | @\"obsolete\"

"
        }
        AnnotationKind::Media => {
            "# Media overlay
#
# Copied from transcription_clean.md. Mark full-screen images or clips with >>>.
#
# Add a marker line under the segment:
#   >>> file.ext | @\"word\" | duration (optional)
#
# - file.ext is an image or video in source/overlays/
# - it appears when the word is said; the voice keeps playing
# - duration such as 5s; default is the rest of the segment, or the clip length
#
# Example:
# [4:37.35 - 4:57.15] (19.8s) in 2022 AI could not even multiply...
# >>> ai-timeline.png | @\"multiply\" | 19s

"
        }
        AnnotationKind::Text => {
            "# Text cards
#
# Copied from transcription_clean.md. Mark black text cards with >>>.
#
# Add a marker line under the segment with the text to show:
#   >>> The text on the card
#   > > > a second line
#
# - the card is shown while the phrase is said
# - wrap consecutive cards in === lines so each one lasts until the next

"
        }
        AnnotationKind::Logo => {
            "# Logos
#
# Copied from transcription_clean.md. Mark corner logos with >>>.
#
# Add a marker line under the segment:
#   >>> brand.png | @\"brand\" | duration (optional)
#
# - brand.png is a file in source/logos/
# - it fades in at the bottom-right corner when the word is said
#
# Approval form, bound to the whole segment:
#   → brand.png | ✅

"
        }
    }
}

/// Strip the leading `#` comment and blank lines of a clean transcript.
pub fn strip_header(text: &str) -> String {
    text.lines()
        .skip_while(|l| l.starts_with('#') || l.trim().is_empty())
        .map(|l| format!("{l}\n"))
        .collect()
}

/// Make sure the marker file for `kind` exists.
///
/// When it is missing but the clean transcript exists, the marker file is created from the
/// transcript body under an instructions header and [`SeedOutcome::Seeded`] is returned; the
/// caller stops there so the operator can add markers. When neither exists the stage cannot run.
pub fn seed_marker_file(
    layout: &ProjectLayout,
    kind: AnnotationKind,
) -> TalkcutResult<SeedOutcome> {
    let marker = layout.marker_file(kind);
    if marker.is_file() {
        return Ok(SeedOutcome::Existing(marker));
    }
    let clean = layout.clean_transcript();
    if !clean.is_file() {
        return Err(TalkcutError::missing_input(&marker));
    }
    let body = fs::read_to_string(&clean)
        .with_context(|| format!("read clean transcript '{}'", clean.display()))?;
    let seeded = format!("{}{}", marker_header(kind), strip_header(&body));
    fs::write(&marker, seeded)
        .with_context(|| format!("write marker file '{}'", marker.display()))?;
    tracing::info!(path = %marker.display(), "marker file created from clean transcript");
    Ok(SeedOutcome::Seeded(marker))
}

#[cfg(test)]
#[path = "../tests/unit/project.rs"]
mod tests;
