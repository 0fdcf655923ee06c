//! Executes a [`SegmentPlan`] through `ffmpeg`.
//!
//! Splicing extracts every sequential step into a scratch directory with uniform encoder
//! settings, writes a concat list and joins the parts with stream copy. Overlay plans run as a
//! single `filter_complex` pass over the base video. The scratch directory is removed only after
//! the final command succeeds so a failed run can be inspected.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::annotate::record::AnnotationKind;
use crate::config::{EncodeConfig, OverlayConfig};
use crate::foundation::error::{TalkcutError, TalkcutResult};
use crate::media::overlay::OverlayGraph;
use crate::media::probe::{MediaInfo, probe_media};
use crate::media::tool::{Invocation, ToolRunner};
use crate::plan::segment_plan::{PlanStep, SegmentPlan, StepKind};
use crate::timecode;

/// Container used for intermediate parts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PartContainer {
    /// MP4 with a fixed track timescale, matched to the base audio layout.
    Mp4,
    /// MPEG transport stream; concatenates cleanly without timescale alignment.
    MpegTs,
}

impl PartContainer {
    fn extension(self) -> &'static str {
        match self {
            Self::Mp4 => "mp4",
            Self::MpegTs => "ts",
        }
    }
}

/// Where a plan reads from and writes to.
#[derive(Clone, Copy, Debug)]
pub struct AssemblyIo<'a> {
    /// Base video.
    pub base: &'a Path,
    /// Probed parameters of the base video.
    pub base_info: &'a MediaInfo,
    /// Directory payload file names are resolved against.
    pub payload_dir: &'a Path,
    /// Final output file.
    pub output: &'a Path,
}

/// Drives `ffmpeg` for one stage.
pub struct MediaAssembler<'r> {
    runner: &'r mut dyn ToolRunner,
    encode: EncodeConfig,
    scratch: PathBuf,
}

impl<'r> MediaAssembler<'r> {
    /// Create an assembler using `scratch` for intermediate files.
    pub fn new(runner: &'r mut dyn ToolRunner, encode: EncodeConfig, scratch: PathBuf) -> Self {
        Self {
            runner,
            encode,
            scratch,
        }
    }

    /// Scratch directory for this stage.
    pub fn scratch_dir(&self) -> &Path {
        &self.scratch
    }

    /// Fail with [`TalkcutError::MissingPayloadAsset`] for the first payload file that is absent.
    ///
    /// Text cards carry their payload inline and are not checked.
    pub fn check_payloads(plan: &SegmentPlan, payload_dir: &Path) -> TalkcutResult<()> {
        for step in plan.steps() {
            let is_file = match step.kind {
                StepKind::Insert => true,
                StepKind::Overlay => step.overlay_kind != Some(AnnotationKind::Text),
                StepKind::BaseCut => false,
            };
            let Some(payload) = step.payload.as_deref().filter(|_| is_file) else {
                continue;
            };
            let path = payload_dir.join(payload);
            if !path.is_file() {
                return Err(TalkcutError::MissingPayloadAsset {
                    line: step.line.unwrap_or(0),
                    path,
                });
            }
        }
        Ok(())
    }

    fn prepare_scratch(&self) -> TalkcutResult<()> {
        if self.scratch.exists() {
            fs::remove_dir_all(&self.scratch).with_context(|| {
                format!("clear scratch dir '{}'", self.scratch.display())
            })?;
        }
        fs::create_dir_all(&self.scratch)
            .with_context(|| format!("create scratch dir '{}'", self.scratch.display()))?;
        Ok(())
    }

    fn cleanup_scratch(&self) {
        if let Err(e) = fs::remove_dir_all(&self.scratch) {
            tracing::warn!(dir = %self.scratch.display(), error = %e, "could not remove scratch dir");
        }
    }

    /// Assemble the sequential steps of `plan` into `io.output`.
    #[tracing::instrument(skip_all, fields(output = %io.output.display()))]
    pub fn splice(
        &mut self,
        plan: &SegmentPlan,
        io: AssemblyIo<'_>,
        container: PartContainer,
    ) -> TalkcutResult<()> {
        plan.validate()?;
        Self::check_payloads(plan, io.payload_dir)?;
        let steps: Vec<&PlanStep> = plan.sequential().collect();
        if steps.is_empty() {
            return Err(TalkcutError::validation("plan has no segments to assemble"));
        }
        self.prepare_scratch()?;

        let mut parts = Vec::with_capacity(steps.len());
        for (i, step) in steps.iter().enumerate() {
            let part = self
                .scratch
                .join(format!("part_{i:03}.{}", container.extension()));
            let inv = match step.kind {
                StepKind::Insert => {
                    let payload = step.payload.as_deref().unwrap_or_default();
                    let clip = io.payload_dir.join(payload);
                    let clip_info = probe_media(&mut *self.runner, &clip)?;
                    self.normalize_clip(step, &clip, &clip_info, io.base_info, container, &part)
                }
                _ => self.extract_cut(step, io.base, io.base_info, container, &part),
            };
            tracing::debug!(part = i, cmd = %inv, "encoding part");
            self.runner.run_checked(&inv)?;
            parts.push(part);
        }

        let list = self.scratch.join("concat.txt");
        fs::write(&list, concat_list(&parts))
            .with_context(|| format!("write concat list '{}'", list.display()))?;
        let concat = Invocation::ffmpeg()
            .args(["-f", "concat", "-safe", "0"])
            .input(&list)
            .args(["-c", "copy"])
            .arg(io.output);
        self.runner.run_checked(&concat)?;
        tracing::info!(parts = parts.len(), "assembled output");

        self.cleanup_scratch();
        Ok(())
    }

    /// Render every overlay step of `plan` onto `io.base` in one encode.
    #[tracing::instrument(skip_all, fields(output = %io.output.display()))]
    pub fn overlay(
        &mut self,
        plan: &SegmentPlan,
        io: AssemblyIo<'_>,
        style: &OverlayConfig,
    ) -> TalkcutResult<()> {
        Self::check_payloads(plan, io.payload_dir)?;
        self.prepare_scratch()?;

        let graph = OverlayGraph::build(
            plan.overlays(),
            style,
            io.base_info,
            io.payload_dir,
            &self.scratch,
        );
        if graph.is_empty() {
            return Err(TalkcutError::validation("plan has no overlays to render"));
        }
        for card in graph.text_files() {
            fs::write(&card.path, &card.contents)
                .with_context(|| format!("write text card '{}'", card.path.display()))?;
        }

        let mut inv = Invocation::ffmpeg().input(io.base);
        for input in graph.inputs() {
            if input.looped {
                inv = inv.args(["-loop", "1"]);
            }
            inv = inv.input(&input.path);
        }
        inv = inv
            .arg("-filter_complex")
            .arg(graph.filter_complex())
            .arg("-map")
            .arg(format!("[{}]", graph.output_label()))
            .args(["-map", "0:a?"]);
        inv = self
            .video_codec(inv)
            .args(["-c:a", "copy"])
            .arg(io.output);

        tracing::debug!(cmd = %inv, "rendering overlays");
        self.runner.run_checked(&inv)?;
        tracing::info!(overlays = plan.overlays().count(), "overlays rendered");

        self.cleanup_scratch();
        Ok(())
    }

    fn video_codec(&self, inv: Invocation) -> Invocation {
        inv.args(["-c:v", "libx264", "-crf"])
            .arg(self.encode.crf.to_string())
            .arg("-preset")
            .arg(&self.encode.preset)
    }

    fn audio_codec(&self, inv: Invocation, base: &MediaInfo, container: PartContainer) -> Invocation {
        let inv = inv
            .args(["-c:a", "aac", "-b:a"])
            .arg(&self.encode.audio_bitrate)
            .arg("-ar")
            .arg(base.sample_rate.to_string())
            .arg("-ac")
            .arg(base.channels.to_string());
        match container {
            PartContainer::Mp4 => inv
                .arg("-video_track_timescale")
                .arg(self.encode.timescale.to_string()),
            PartContainer::MpegTs => inv.args(["-f", "mpegts"]),
        }
    }

    fn extract_cut(
        &self,
        step: &PlanStep,
        base: &Path,
        base_info: &MediaInfo,
        container: PartContainer,
        part: &Path,
    ) -> Invocation {
        let inv = Invocation::ffmpeg()
            .arg("-ss")
            .arg(timecode::format_ffmpeg(step.source.start))
            .input(base)
            .arg("-t")
            .arg(format!("{:.3}", step.source.duration()));
        let inv = self.video_codec(inv);
        self.audio_codec(inv, base_info, container).arg(part)
    }

    fn normalize_clip(
        &self,
        step: &PlanStep,
        clip: &Path,
        clip_info: &MediaInfo,
        base_info: &MediaInfo,
        container: PartContainer,
        part: &Path,
    ) -> Invocation {
        let (w, h) = (base_info.width, base_info.height);
        let mut inv = Invocation::ffmpeg().input(clip);
        if !clip_info.has_audio {
            let layout = if base_info.channels == 1 { "mono" } else { "stereo" };
            inv = inv
                .args(["-f", "lavfi"])
                .arg("-i")
                .arg(format!("anullsrc=r={}:cl={layout}", base_info.sample_rate))
                .args(["-map", "0:v", "-map", "1:a", "-shortest"]);
        }
        if step.source.duration() > 0.0 {
            inv = inv.arg("-t").arg(format!("{:.3}", step.source.duration()));
        }
        inv = inv
            .arg("-vf")
            .arg(format!(
                "scale={w}:{h}:force_original_aspect_ratio=decrease,pad={w}:{h}:(ow-iw)/2:(oh-ih)/2,setsar=1"
            ))
            .arg("-r")
            .arg(format!("{}", base_info.fps));
        let inv = self.video_codec(inv);
        self.audio_codec(inv, base_info, container).arg(part)
    }
}

/// Render an `ffmpeg` concat demuxer list.
pub fn concat_list(parts: &[PathBuf]) -> String {
    parts
        .iter()
        .map(|p| format!("file '{}'\n", p.display().to_string().replace('\'', r"'\''")))
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/media/assembler.rs"]
mod tests;
