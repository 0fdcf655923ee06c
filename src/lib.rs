//! talkcut is transcript-driven post-production for talking-head video.
//!
//! A project directory moves through a fixed sequence of stages, each reading one file and
//! writing the next:
//!
//! 1. **sync**: align an external microphone recording with the camera audio by envelope
//!    cross-correlation and mux it in.
//! 2. **jump-cut**: detect long silences and keep only the voice segments.
//! 3. **transcribe**: word-level transcript plus the clean anchor-line transcript.
//! 4. **logos**, **media**, **text**, **inserts**: parse the operator's marker files, resolve each
//!    marker against the word-level transcript, build a [`SegmentPlan`] and execute it through
//!    `ffmpeg`.
//!
//! All media work is delegated to `ffmpeg`/`ffprobe` through the [`ToolRunner`] seam, so planning
//! and command construction are testable without either binary.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

pub(crate) mod annotate;
/// Pipeline configuration (`talkcut.json`).
pub mod config;
pub(crate) mod media;
pub(crate) mod plan;
/// Project directory layout and marker file seeding.
pub mod project;
pub(crate) mod silence;
/// Pipeline stages and their reports.
pub mod stages;
pub(crate) mod sync;
/// Marker timestamps (`M:SS.ff`) and encoder time arguments.
pub mod timecode;
pub(crate) mod transcript;

pub use crate::foundation::core::TimeInterval;
pub use crate::foundation::error::{TalkcutError, TalkcutResult};
pub use crate::foundation::warning::{Warning, Warnings};

pub use crate::annotate::parser::{ParseOutcome, ParseState, Phase, parse_markers};
pub use crate::annotate::record::{AnnotationKind, AnnotationRecord};
pub use crate::config::PipelineConfig;
pub use crate::media::assembler::{AssemblyIo, MediaAssembler, PartContainer, concat_list};
pub use crate::media::overlay::{OverlayGraph, OverlayInput, TextCardFile};
pub use crate::media::probe::{MediaInfo, is_video_file, parse_probe_json, probe_media};
pub use crate::media::tool::{
    Invocation, RecordingRunner, SystemRunner, ToolOutput, ToolRunner, is_on_path,
};
pub use crate::plan::resolve::{ResolutionSource, ResolvedEvent, Resolver, TimingPolicy};
pub use crate::plan::segment_plan::{PlanStep, SegmentPlan, StepKind};
pub use crate::plan::stack::{assign_stack_levels, normalize_blocks, stack_levels};
pub use crate::project::{ProjectLayout, SeedOutcome};
pub use crate::silence::detect::{DetectParams, detect_silences, parse_silencedetect};
pub use crate::silence::segment::{SegmentParams, Silence, SilenceStats, segment_voice};
pub use crate::stages::{Stage, StageContext, StageOptions, StageReport, run_stage};
pub use crate::sync::correlate::{
    LagEstimate, cross_correlate, envelope, estimate_lag, resolve_offset, samples_from_s16le,
};
pub use crate::transcript::clean::{merge_segments, render_clean_markdown};
pub use crate::transcript::index::{MatchConfig, TranscriptIndex, WordMatch};
pub use crate::transcript::model::{Segment, Transcript, Word};
#[cfg(feature = "remote-transcribe")]
pub use crate::transcript::remote::RemoteTranscriber;
pub use crate::transcript::remote::{TranscribeConfig, Transcriber};
