//! Shared driver for the marker-driven stages: inserts, media, text cards and logos.

use std::collections::HashMap;
use std::fs;

use anyhow::Context;

use crate::annotate::parser::parse_markers;
use crate::annotate::record::{AnnotationKind, AnnotationRecord};
use crate::foundation::error::{TalkcutError, TalkcutResult, require_file};
use crate::media::assembler::{AssemblyIo, MediaAssembler, PartContainer};
use crate::media::probe::{is_video_file, probe_media};
use crate::media::tool::ToolRunner;
use crate::plan::resolve::{ResolvedEvent, Resolver};
use crate::plan::segment_plan::SegmentPlan;
use crate::project::{SeedOutcome, seed_marker_file};
use crate::stages::{Stage, StageContext, StageOptions, StageReport};
use crate::timecode;
use crate::transcript::index::TranscriptIndex;
use crate::transcript::model::Transcript;

/// Check that file payloads exist and probe the length of video payloads.
fn payload_durations(
    runner: &mut dyn ToolRunner,
    records: &[AnnotationRecord],
    payload_dir: &std::path::Path,
) -> TalkcutResult<HashMap<String, f64>> {
    let mut durations = HashMap::new();
    for rec in records.iter().filter(|r| r.kind != AnnotationKind::Text) {
        let path = payload_dir.join(&rec.payload);
        if !path.is_file() {
            return Err(TalkcutError::MissingPayloadAsset {
                line: rec.line,
                path,
            });
        }
        if is_video_file(&path) && !durations.contains_key(&rec.payload) {
            let info = probe_media(runner, &path)?;
            durations.insert(rec.payload.clone(), info.duration);
        }
    }
    Ok(durations)
}

fn describe(ev: &ResolvedEvent) -> String {
    let what = ev.payload.replace('\n', " / ");
    let mut line = match ev.kind {
        AnnotationKind::Insert => format!(
            "line {}: {what} cut at {} (+{:.1}s)",
            ev.line,
            timecode::format(ev.window.start),
            ev.window.duration()
        ),
        _ => format!(
            "line {}: {what} {} - {}",
            ev.line,
            timecode::format(ev.window.start),
            timecode::format(ev.window.end)
        ),
    };
    line.push_str(&format!(" [{}]", ev.source.label()));
    if ev.stack_level > 0 {
        line.push_str(&format!(" stack {}", ev.stack_level));
    }
    line
}

#[tracing::instrument(skip_all, fields(stage = %stage))]
pub(crate) fn run(
    stage: Stage,
    ctx: &mut StageContext<'_>,
    opts: &StageOptions,
) -> TalkcutResult<StageReport> {
    let kind = stage.annotation_kind().ok_or_else(|| {
        TalkcutError::validation(format!("stage '{stage}' has no marker file"))
    })?;
    let mut report = StageReport::new(stage);
    let input = ctx.layout.video(opts.input_name(stage));
    require_file(&input)?;

    let marker = match seed_marker_file(&ctx.layout, kind)? {
        SeedOutcome::Existing(path) => path,
        SeedOutcome::Seeded(path) => {
            report.seeded = Some(path);
            return Ok(report);
        }
    };
    let transcript = Transcript::from_path(ctx.layout.transcript_json())?;
    let text = fs::read_to_string(&marker)
        .with_context(|| format!("read marker file '{}'", marker.display()))?;
    let parsed = parse_markers(kind, &text);
    report.warnings.extend(parsed.warnings);
    let records = parsed.records;
    report.line(format!(
        "{} marker(s) in {}, {} malformed line(s) skipped",
        records.len(),
        kind.marker_file_name(),
        report.warnings.malformed_lines()
    ));
    if records.is_empty() {
        if ctx.dry_run {
            report.line("nothing to do");
            return Ok(report);
        }
        let output = ctx.layout.video(opts.output_name(stage));
        if output != input {
            fs::copy(&input, &output).with_context(|| {
                format!("copy '{}' to '{}'", input.display(), output.display())
            })?;
        }
        report.line("nothing to do: input copied unchanged");
        report.output = Some(output);
        return Ok(report);
    }

    let base_info = probe_media(&mut *ctx.runner, &input)?;
    let payload_dir = ctx.layout.payload_dir(kind);
    let durations = payload_durations(&mut *ctx.runner, &records, &payload_dir)?;

    let index = TranscriptIndex::new(&transcript, ctx.config.matching);
    let resolver = Resolver::new(&index, ctx.config.overlay.timing);
    let events = resolver.resolve_all(
        &records,
        |r| durations.get(&r.payload).copied(),
        &mut report.warnings,
    );
    for ev in &events {
        report.line(describe(ev));
    }

    let plan = if kind == AnnotationKind::Insert {
        SegmentPlan::build(base_info.duration, &events, &[])
    } else {
        SegmentPlan::build(base_info.duration, &[], &events)
    };
    plan.validate()?;
    report.line(format!(
        "output duration {}",
        timecode::format_clock(plan.output_duration())
    ));
    if ctx.dry_run {
        report.line("dry run: no media written");
        return Ok(report);
    }

    let output = ctx.layout.video(opts.output_name(stage));
    let io = AssemblyIo {
        base: &input,
        base_info: &base_info,
        payload_dir: &payload_dir,
        output: &output,
    };
    let mut assembler = MediaAssembler::new(
        &mut *ctx.runner,
        ctx.config.encode.clone(),
        ctx.layout.scratch_dir(stage.name()),
    );
    if kind == AnnotationKind::Insert {
        assembler.splice(&plan, io, PartContainer::Mp4)?;
    } else {
        assembler.overlay(&plan, io, &ctx.config.overlay)?;
    }

    report.output = Some(output);
    Ok(report)
}

#[cfg(test)]
#[path = "../../tests/unit/stages/annotated.rs"]
mod tests;
