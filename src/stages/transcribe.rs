use std::fs;
use std::path::Path;

use anyhow::Context;

use crate::foundation::error::{TalkcutError, TalkcutResult, require_file};
use crate::media::tool::Invocation;
use crate::stages::{Stage, StageContext, StageOptions, StageReport};
use crate::timecode;
use crate::transcript::clean::render_clean_markdown;
use crate::transcript::model::Transcript;

const AUDIO_FILE: &str = "audio_for_transcription.ogg";

/// Mono 16 kHz Opus audio for the recognizer.
fn extract_audio_invocation(input: &Path, audio: &Path) -> Invocation {
    Invocation::ffmpeg()
        .input(input)
        .args([
            "-vn", "-ac", "1", "-ar", "16000", "-c:a", "libopus", "-b:a", "48k",
        ])
        .arg(audio)
}

fn write_clean(
    ctx: &StageContext<'_>,
    transcript: &Transcript,
    title: &str,
    report: &mut StageReport,
) -> TalkcutResult<()> {
    let path = ctx.layout.clean_transcript();
    let md = render_clean_markdown(transcript, title, ctx.config.transcribe.merge_max_sec);
    fs::write(&path, md).with_context(|| format!("write clean transcript '{}'", path.display()))?;
    report.line(format!("clean transcript: {}", path.display()));
    Ok(())
}

#[tracing::instrument(skip_all)]
pub(crate) fn run(ctx: &mut StageContext<'_>, opts: &StageOptions) -> TalkcutResult<StageReport> {
    let stage = Stage::Transcribe;
    let mut report = StageReport::new(stage);
    let input_name = opts.input_name(stage);
    let input = ctx.layout.video(input_name);
    let json_path = match opts.output.as_deref() {
        Some(name) => ctx.layout.transcription_dir().join(name),
        None => ctx.layout.transcript_json(),
    };

    if opts.clean_only {
        let transcript = Transcript::from_path(&json_path)?;
        write_clean(ctx, &transcript, input_name, &mut report)?;
        report.output = Some(ctx.layout.clean_transcript());
        return Ok(report);
    }

    require_file(&input)?;
    let scratch = ctx.layout.scratch_dir(stage.name());
    let audio = if opts.audio_only {
        ctx.layout.transcription_dir().join(AUDIO_FILE)
    } else {
        scratch.join(AUDIO_FILE)
    };
    let extract = extract_audio_invocation(&input, &audio);
    if ctx.dry_run {
        report.line(format!("would run: {extract}"));
        report.line("dry run: nothing uploaded");
        return Ok(report);
    }
    if opts.audio_only {
        fs::create_dir_all(ctx.layout.transcription_dir()).with_context(|| {
            format!(
                "create transcription dir '{}'",
                ctx.layout.transcription_dir().display()
            )
        })?;
        ctx.runner.run_checked(&extract)?;
        report.line(format!("audio extracted: {}", audio.display()));
        report.output = Some(audio);
        return Ok(report);
    }
    let Some(transcriber) = ctx.transcriber else {
        return Err(TalkcutError::transcription(
            "no transcription backend available (build with the `remote-transcribe` feature)",
        ));
    };

    fs::create_dir_all(&scratch)
        .with_context(|| format!("create scratch dir '{}'", scratch.display()))?;
    ctx.runner.run_checked(&extract)?;
    let transcript = transcriber.transcribe(&audio)?;
    report.line(format!(
        "{} words, {} segments, {}",
        transcript.words.len(),
        transcript.segments.len(),
        timecode::format_clock(transcript.duration)
    ));

    fs::create_dir_all(ctx.layout.transcription_dir()).with_context(|| {
        format!(
            "create transcription dir '{}'",
            ctx.layout.transcription_dir().display()
        )
    })?;
    transcript.write_to(&json_path)?;
    write_clean(ctx, &transcript, input_name, &mut report)?;
    if let Err(e) = fs::remove_dir_all(&scratch) {
        tracing::warn!(dir = %scratch.display(), error = %e, "could not remove scratch dir");
    }

    report.output = Some(json_path);
    Ok(report)
}

#[cfg(test)]
#[path = "../../tests/unit/stages/transcribe.rs"]
mod tests;
