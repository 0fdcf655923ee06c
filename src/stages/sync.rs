use std::path::Path;

use crate::foundation::error::{TalkcutError, TalkcutResult, require_file};
use crate::foundation::warning::Warning;
use crate::media::probe::probe_media;
use crate::media::tool::{Invocation, ToolRunner};
use crate::stages::{Stage, StageContext, StageOptions, StageReport};
use crate::sync::correlate::{estimate_lag, resolve_offset, samples_from_s16le};

/// Default external recording in `source/audio`.
pub const DEFAULT_AUDIO: &str = "0_audio_original.mkv";

/// Decode a mono PCM chunk of `path` through `ffmpeg`.
fn read_pcm(
    runner: &mut dyn ToolRunner,
    path: &Path,
    start_sec: Option<f64>,
    duration_sec: f64,
    sample_rate: u32,
) -> TalkcutResult<Vec<f64>> {
    let mut inv = Invocation::ffmpeg();
    if let Some(start) = start_sec {
        inv = inv.arg("-ss").arg(format!("{start}"));
    }
    let inv = inv
        .arg("-t")
        .arg(format!("{duration_sec}"))
        .input(path)
        .args(["-vn", "-ac", "1", "-ar"])
        .arg(sample_rate.to_string())
        .args(["-f", "s16le", "-acodec", "pcm_s16le", "-"]);
    let out = runner.run_checked(&inv)?;
    let samples = samples_from_s16le(&out.stdout);
    if samples.is_empty() {
        return Err(TalkcutError::validation(format!(
            "no audio decoded from '{}'",
            path.display()
        )));
    }
    Ok(samples)
}

/// Audio filter that shifts the external recording by `offset_sec` and maps it to `[a]`.
///
/// A positive offset delays the recording; a negative one trims its head. Mono sources are
/// duplicated to both stereo channels first.
pub fn offset_filter(offset_sec: f64, mono: bool) -> String {
    let pan = if mono { "pan=stereo|c0=c0|c1=c0," } else { "" };
    let shift = if offset_sec > 0.0 {
        let ms = (offset_sec * 1000.0) as u64;
        format!("adelay={ms}|{ms}")
    } else {
        format!("atrim=start={:.3},asetpts=PTS-STARTPTS", -offset_sec)
    };
    format!("[1:a]{pan}{shift}[a]")
}

#[tracing::instrument(skip_all)]
pub(crate) fn run(ctx: &mut StageContext<'_>, opts: &StageOptions) -> TalkcutResult<StageReport> {
    let stage = Stage::Sync;
    let mut report = StageReport::new(stage);
    let video = ctx.layout.video(opts.input_name(stage));
    let audio = ctx
        .layout
        .audio_dir()
        .join(opts.audio.as_deref().unwrap_or(DEFAULT_AUDIO));
    require_file(&video)?;
    require_file(&audio)?;

    let cfg = ctx.config.sync;
    let reference = read_pcm(
        &mut *ctx.runner,
        &video,
        Some(cfg.reference_start_sec),
        cfg.reference_duration_sec,
        cfg.sample_rate,
    )?;
    let probe = read_pcm(
        &mut *ctx.runner,
        &audio,
        None,
        cfg.probe_duration_sec,
        cfg.sample_rate,
    )?;
    let est = estimate_lag(&reference, &probe, cfg.sample_rate, cfg.envelope_window_sec)?;
    let offset = resolve_offset(cfg.reference_start_sec, 0.0, est.lag_sec);

    report.line(format!(
        "offset {offset:+.3}s (confidence {:.1}x)",
        est.confidence
    ));
    if offset > 0.0 {
        report.line(format!(
            "external audio started {offset:.3}s after the camera; delaying it"
        ));
    } else {
        report.line(format!(
            "external audio started {:.3}s before the camera; trimming its head",
            -offset
        ));
    }
    if est.confidence < cfg.confidence_threshold {
        report.warnings.push(Warning::LowConfidenceOffset {
            confidence: est.confidence,
            threshold: cfg.confidence_threshold,
        });
    }
    if ctx.dry_run {
        report.line("dry run: no media written");
        return Ok(report);
    }

    let audio_info = probe_media(&mut *ctx.runner, &audio)?;
    let output = ctx.layout.video(opts.output_name(stage));
    let inv = Invocation::ffmpeg()
        .input(&video)
        .input(&audio)
        .arg("-filter_complex")
        .arg(offset_filter(offset, audio_info.channels == 1))
        .args(["-map", "0:v", "-map", "[a]", "-c:v", "copy", "-c:a", "aac", "-b:a"])
        .arg(&ctx.config.encode.audio_bitrate)
        .arg("-shortest")
        .arg(&output);
    tracing::debug!(cmd = %inv, "muxing synced audio");
    ctx.runner.run_checked(&inv)?;

    report.output = Some(output);
    Ok(report)
}

#[cfg(test)]
#[path = "../../tests/unit/stages/sync.rs"]
mod tests;
