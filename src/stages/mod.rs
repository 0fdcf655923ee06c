//! Pipeline stages. Each stage reads one project file, writes one, and prints a summary.

use std::fmt;
use std::path::PathBuf;

use crate::annotate::record::AnnotationKind;
use crate::config::PipelineConfig;
use crate::foundation::error::TalkcutResult;
use crate::foundation::warning::Warnings;
use crate::media::tool::ToolRunner;
use crate::project::ProjectLayout;
use crate::transcript::remote::Transcriber;

pub(crate) mod annotated;
pub(crate) mod jump_cut;
pub(crate) mod sync;
pub(crate) mod transcribe;

/// A pipeline stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Align the external microphone recording with the camera video.
    Sync,
    /// Remove long silences.
    JumpCut,
    /// Produce the word-level transcript and the clean transcript.
    Transcribe,
    /// Splice clips in after spoken words.
    Inserts,
    /// Full-screen image and video overlays.
    Media,
    /// Black text cards.
    Text,
    /// Corner logos.
    Logos,
}

impl Stage {
    /// Every stage, in pipeline order.
    pub const ALL: [Stage; 7] = [
        Stage::Sync,
        Stage::JumpCut,
        Stage::Transcribe,
        Stage::Logos,
        Stage::Media,
        Stage::Text,
        Stage::Inserts,
    ];

    /// Name used for scratch directories and logs.
    pub fn name(self) -> &'static str {
        match self {
            Self::Sync => "sync",
            Self::JumpCut => "jump_cut",
            Self::Transcribe => "transcribe",
            Self::Inserts => "inserts",
            Self::Media => "media",
            Self::Text => "text",
            Self::Logos => "logos",
        }
    }

    /// Default input file in `source/video`.
    pub fn default_input(self) -> &'static str {
        match self {
            Self::Sync => "0_video_original.mp4",
            Self::JumpCut => "1_video_synced.mp4",
            Self::Transcribe | Self::Logos => "2_video_jumpcut.mp4",
            Self::Media => "3_video_logos.mp4",
            Self::Text => "4_video_media.mp4",
            Self::Inserts => "5_video_text.mp4",
        }
    }

    /// Default output file in `source/video`. The transcribe stage writes into
    /// `source/transcription` instead.
    pub fn default_output(self) -> Option<&'static str> {
        match self {
            Self::Sync => Some("1_video_synced.mp4"),
            Self::JumpCut => Some("2_video_jumpcut.mp4"),
            Self::Transcribe => None,
            Self::Logos => Some("3_video_logos.mp4"),
            Self::Media => Some("4_video_media.mp4"),
            Self::Text => Some("5_video_text.mp4"),
            Self::Inserts => Some("6_video_inserts.mp4"),
        }
    }

    /// Marker file kind driving this stage, if any.
    pub fn annotation_kind(self) -> Option<AnnotationKind> {
        match self {
            Self::Inserts => Some(AnnotationKind::Insert),
            Self::Media => Some(AnnotationKind::Media),
            Self::Text => Some(AnnotationKind::Text),
            Self::Logos => Some(AnnotationKind::Logo),
            Self::Sync | Self::JumpCut | Self::Transcribe => None,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Per-invocation options.
#[derive(Clone, Debug, Default)]
pub struct StageOptions {
    /// Input file name (or path) overriding [`Stage::default_input`].
    pub input: Option<String>,
    /// Output file name (or path) overriding [`Stage::default_output`].
    pub output: Option<String>,
    /// External audio file in `source/audio` for the sync stage.
    pub audio: Option<String>,
    /// Transcribe stage: only regenerate the clean transcript from the existing document.
    pub clean_only: bool,
    /// Transcribe stage: extract the recognizer audio into the transcription folder and stop.
    pub audio_only: bool,
}

impl StageOptions {
    fn input_name(&self, stage: Stage) -> &str {
        self.input.as_deref().unwrap_or(stage.default_input())
    }

    fn output_name(&self, stage: Stage) -> &str {
        self.output
            .as_deref()
            .or(stage.default_output())
            .unwrap_or_default()
    }
}

/// Everything a stage needs from its environment.
pub struct StageContext<'r> {
    /// Project paths.
    pub layout: ProjectLayout,
    /// Effective configuration.
    pub config: PipelineConfig,
    /// External tool executor.
    pub runner: &'r mut dyn ToolRunner,
    /// Speech-to-text backend for the transcribe stage.
    pub transcriber: Option<&'r dyn Transcriber>,
    /// Detect and resolve only; write no media.
    pub dry_run: bool,
}

/// What a stage did, printed by the CLI.
#[derive(Debug)]
pub struct StageReport {
    /// Stage that produced the report.
    pub stage: Stage,
    /// Summary lines.
    pub lines: Vec<String>,
    /// Non-fatal conditions.
    pub warnings: Warnings,
    /// File written, if any.
    pub output: Option<PathBuf>,
    /// Marker file created from the clean transcript; the stage stopped after seeding it.
    pub seeded: Option<PathBuf>,
}

impl StageReport {
    fn new(stage: Stage) -> Self {
        Self {
            stage,
            lines: Vec::new(),
            warnings: Warnings::new(),
            output: None,
            seeded: None,
        }
    }

    fn line(&mut self, line: impl Into<String>) {
        let line = line.into();
        tracing::info!(stage = %self.stage, "{line}");
        self.lines.push(line);
    }
}

impl fmt::Display for StageReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[{}]", self.stage)?;
        for line in &self.lines {
            writeln!(f, "  {line}")?;
        }
        if !self.warnings.is_empty() {
            writeln!(f, "  {} warning(s):", self.warnings.len())?;
            for w in self.warnings.iter() {
                writeln!(f, "    - {w}")?;
            }
        }
        if let Some(seeded) = &self.seeded {
            writeln!(
                f,
                "  created {}; add markers and run the stage again",
                seeded.display()
            )?;
        } else if let Some(out) = &self.output {
            writeln!(f, "  wrote {}", out.display())?;
        }
        Ok(())
    }
}

/// Run one stage.
pub fn run_stage(
    stage: Stage,
    ctx: &mut StageContext<'_>,
    opts: &StageOptions,
) -> TalkcutResult<StageReport> {
    match stage {
        Stage::Sync => sync::run(ctx, opts),
        Stage::JumpCut => jump_cut::run(ctx, opts),
        Stage::Transcribe => transcribe::run(ctx, opts),
        Stage::Inserts | Stage::Media | Stage::Text | Stage::Logos => {
            annotated::run(stage, ctx, opts)
        }
    }
}
