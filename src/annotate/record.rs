use crate::foundation::core::TimeInterval;

/// Which overlay stage a marker file feeds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AnnotationKind {
    /// Clip spliced into the timeline after the target word ("cut after said").
    Insert,
    /// Full-screen image or video shown from the target word on.
    Media,
    /// Black card with centered text.
    Text,
    /// Corner logo.
    Logo,
}

impl AnnotationKind {
    /// Marker file name inside the transcription directory.
    pub fn marker_file_name(self) -> &'static str {
        match self {
            Self::Insert => "overlay-inserts.md",
            Self::Media => "overlay-media.md",
            Self::Text => "overlay-text.md",
            Self::Logo => "overlay-logos.md",
        }
    }

    /// Return `true` for kinds whose marker lines carry `payload | @"token" | duration` fields.
    pub fn has_fields(self) -> bool {
        !matches!(self, Self::Text)
    }

    /// Return `true` for kinds placed where their token is said, `false` for kinds cut after it.
    pub fn appears_when_said(self) -> bool {
        !matches!(self, Self::Insert)
    }
}

/// One parsed marker. Read-only downstream.
#[derive(Clone, Debug, PartialEq)]
pub struct AnnotationRecord {
    /// Stage this record belongs to.
    pub kind: AnnotationKind,
    /// 1-based line of the marker.
    pub line: usize,
    /// Window of the anchor line the marker sits under.
    pub anchor: TimeInterval,
    /// Free text of the anchor line.
    pub anchor_text: String,
    /// Word or phrase to resolve. `None` for text cards and approval-form logos.
    pub target: Option<String>,
    /// Payload file name, or the display text of a text card.
    pub payload: String,
    /// Duration override in seconds.
    pub explicit_duration: Option<f64>,
    /// Block the record was parsed in, if any.
    pub block_id: Option<u32>,
}
