use crate::foundation::error::{TalkcutResult, require_file};
use crate::media::assembler::{AssemblyIo, MediaAssembler, PartContainer};
use crate::media::probe::probe_media;
use crate::plan::segment_plan::SegmentPlan;
use crate::silence::detect::{DetectParams, detect_silences};
use crate::silence::segment::{SegmentParams, SilenceStats, segment_voice};
use crate::stages::{Stage, StageContext, StageOptions, StageReport};
use crate::timecode;

#[tracing::instrument(skip_all)]
pub(crate) fn run(ctx: &mut StageContext<'_>, opts: &StageOptions) -> TalkcutResult<StageReport> {
    let stage = Stage::JumpCut;
    let mut report = StageReport::new(stage);
    let input = ctx.layout.video(opts.input_name(stage));
    require_file(&input)?;

    let info = probe_media(&mut *ctx.runner, &input)?;
    let s = ctx.config.silence;
    let silences = detect_silences(
        &mut *ctx.runner,
        &input,
        DetectParams {
            noise_db: s.noise_db,
            min_detect_sec: s.min_detect_sec,
        },
    )?;
    let params = SegmentParams {
        min_silence_sec: s.min_silence_sec,
        padding_sec: s.padding_sec,
        total_duration_sec: info.duration,
    };
    let segments = segment_voice(&silences, params);
    let stats = SilenceStats::compute(&silences, &segments, params);

    report.line(format!(
        "{} silences > {}s cut, {} shorter kept",
        stats.long_count, s.min_silence_sec, stats.short_count
    ));
    report.line(format!(
        "{} segments, {} removed, {} -> {}",
        stats.segment_count,
        timecode::format_clock(stats.removed_sec),
        timecode::format_clock(info.duration),
        timecode::format_clock(stats.output_sec),
    ));
    if ctx.dry_run {
        for (i, seg) in segments.iter().enumerate() {
            report.line(format!(
                "segment {:>3}: {} - {}",
                i + 1,
                timecode::format(seg.start),
                timecode::format(seg.end)
            ));
        }
        report.line("dry run: no media written");
        return Ok(report);
    }

    let plan = SegmentPlan::from_voice_segments(&segments);
    let output = ctx.layout.video(opts.output_name(stage));
    let video_dir = ctx.layout.video_dir();
    let io = AssemblyIo {
        base: &input,
        base_info: &info,
        payload_dir: &video_dir,
        output: &output,
    };
    MediaAssembler::new(
        &mut *ctx.runner,
        ctx.config.encode.clone(),
        ctx.layout.scratch_dir(stage.name()),
    )
    .splice(&plan, io, PartContainer::MpegTs)?;

    report.output = Some(output);
    Ok(report)
}

#[cfg(test)]
#[path = "../../tests/unit/stages/jump_cut.rs"]
mod tests;
