use super::*;
use crate::foundation::core::TimeInterval;
use crate::media::tool::{RecordingRunner, ToolOutput};
use crate::plan::resolve::{ResolutionSource, ResolvedEvent};

const SILENT_CLIP: &str = r#"{
  "streams": [{"codec_type": "video", "width": 640, "height": 480, "r_frame_rate": "24/1"}],
  "format": {"duration": "3.0"}
}"#;

fn base_info() -> MediaInfo {
    MediaInfo {
        width: 1920,
        height: 1080,
        fps: 30.0,
        sample_rate: 48_000,
        channels: 2,
        duration: 20.0,
        has_video: true,
        has_audio: true,
    }
}

fn event(kind: AnnotationKind, start: f64, end: f64, payload: &str, line: usize) -> ResolvedEvent {
    ResolvedEvent {
        kind,
        line,
        window: TimeInterval::clamped(start, end),
        payload: payload.to_string(),
        stack_level: 0,
        source: ResolutionSource::WordLevel,
        block_id: None,
    }
}

#[test]
fn missing_insert_payload_fails_before_any_encode() {
    let dir = tempfile::tempdir().unwrap();
    let plan = SegmentPlan::build(
        20.0,
        &[event(AnnotationKind::Insert, 5.0, 8.0, "nope.mp4", 7)],
        &[],
    );
    let mut runner = RecordingRunner::new();
    let info = base_info();
    let io = AssemblyIo {
        base: Path::new("/v/base.mp4"),
        base_info: &info,
        payload_dir: dir.path(),
        output: &dir.path().join("out.mp4"),
    };
    let err = MediaAssembler::new(&mut runner, EncodeConfig::default(), dir.path().join("tmp"))
        .splice(&plan, io, PartContainer::Mp4)
        .unwrap_err();
    match err {
        TalkcutError::MissingPayloadAsset { line, path } => {
            assert_eq!(line, 7);
            assert!(path.ends_with("nope.mp4"));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(runner.calls().is_empty());
}

#[test]
fn text_payloads_are_not_checked_on_disk() {
    let plan = SegmentPlan::build(
        10.0,
        &[],
        &[event(AnnotationKind::Text, 1.0, 2.0, "hello", 3)],
    );
    MediaAssembler::check_payloads(&plan, Path::new("/definitely/missing")).unwrap();
}

#[test]
fn splice_extracts_normalizes_and_concats() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("clip.mp4"), b"x").unwrap();
    let plan = SegmentPlan::build(
        20.0,
        &[event(AnnotationKind::Insert, 5.0, 8.0, "clip.mp4", 2)],
        &[],
    );

    let mut runner = RecordingRunner::new();
    runner.push_output(ToolOutput::ok(Vec::new()));
    runner.push_output(ToolOutput::ok(SILENT_CLIP));
    let info = base_info();
    let scratch = dir.path().join("tmp").join("inserts");
    let output = dir.path().join("out.mp4");
    let io = AssemblyIo {
        base: Path::new("/v/base.mp4"),
        base_info: &info,
        payload_dir: dir.path(),
        output: &output,
    };
    MediaAssembler::new(&mut runner, EncodeConfig::default(), scratch.clone())
        .splice(&plan, io, PartContainer::Mp4)
        .unwrap();

    let calls = runner.calls();
    assert_eq!(calls.len(), 5);

    let first = &calls[0];
    assert_eq!(first.arg_after("-ss").as_deref(), Some("00:00:00.000"));
    assert_eq!(first.arg_after("-t").as_deref(), Some("5.000"));
    assert_eq!(first.arg_after("-c:v").as_deref(), Some("libx264"));
    assert_eq!(first.arg_after("-crf").as_deref(), Some("18"));
    assert_eq!(first.arg_after("-ar").as_deref(), Some("48000"));
    assert_eq!(first.arg_after("-video_track_timescale").as_deref(), Some("15360"));

    assert_eq!(calls[1].program, "ffprobe");

    let clip = &calls[2];
    assert_eq!(clip.arg_after("-f").as_deref(), Some("lavfi"));
    assert!(clip.has_arg("anullsrc=r=48000:cl=stereo"));
    assert!(clip.has_arg("-shortest"));
    assert_eq!(clip.arg_after("-t").as_deref(), Some("3.000"));
    assert!(clip.arg_after("-vf").unwrap().starts_with("scale=1920:1080:force_original_aspect_ratio=decrease,pad=1920:1080"));
    assert_eq!(clip.arg_after("-r").as_deref(), Some("30"));

    assert_eq!(calls[3].arg_after("-ss").as_deref(), Some("00:00:05.000"));
    assert_eq!(calls[3].arg_after("-t").as_deref(), Some("15.000"));

    let concat = &calls[4];
    assert_eq!(concat.arg_after("-f").as_deref(), Some("concat"));
    assert_eq!(concat.arg_after("-c").as_deref(), Some("copy"));
    assert_eq!(
        concat.args.last().map(|a| a.to_string_lossy().into_owned()),
        Some(output.display().to_string())
    );

    assert!(!scratch.exists());
}

#[test]
fn failed_encode_keeps_scratch_dir() {
    let dir = tempfile::tempdir().unwrap();
    let plan = SegmentPlan::from_voice_segments(&[
        TimeInterval::clamped(0.0, 2.0),
        TimeInterval::clamped(4.0, 6.0),
    ]);
    let mut runner = RecordingRunner::new();
    runner.push_output(ToolOutput::ok(Vec::new()));
    runner.push_output(ToolOutput {
        code: Some(1),
        stdout: Vec::new(),
        stderr: "Conversion failed!".to_string(),
    });
    let info = base_info();
    let scratch = dir.path().join("tmp").join("jump_cut");
    let output = dir.path().join("out.mp4");
    let io = AssemblyIo {
        base: Path::new("/v/base.mp4"),
        base_info: &info,
        payload_dir: dir.path(),
        output: &output,
    };
    let err = MediaAssembler::new(&mut runner, EncodeConfig::default(), scratch.clone())
        .splice(&plan, io, PartContainer::MpegTs)
        .unwrap_err();
    assert!(matches!(err, TalkcutError::ExternalToolFailure { .. }));
    assert_eq!(runner.calls().len(), 2);
    assert_eq!(runner.calls()[0].arg_after("-f").as_deref(), Some("mpegts"));
    assert!(scratch.exists());
}

#[test]
fn overlay_runs_one_filter_complex_pass() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("acme.png"), b"x").unwrap();
    let overlays = [
        event(AnnotationKind::Logo, 1.0, 3.0, "acme.png", 2),
        event(AnnotationKind::Logo, 5.0, 6.0, "acme.png", 4),
    ];
    let plan = SegmentPlan::build(20.0, &[], &overlays);

    let mut runner = RecordingRunner::new();
    let info = base_info();
    let output = dir.path().join("out.mp4");
    let io = AssemblyIo {
        base: Path::new("/v/base.mp4"),
        base_info: &info,
        payload_dir: dir.path(),
        output: &output,
    };
    MediaAssembler::new(&mut runner, EncodeConfig::default(), dir.path().join("tmp"))
        .overlay(&plan, io, &OverlayConfig::default())
        .unwrap();

    let calls = runner.calls();
    assert_eq!(calls.len(), 1);
    let inv = &calls[0];
    assert_eq!(inv.arg_after("-loop").as_deref(), Some("1"));
    assert_eq!(inv.args.iter().filter(|a| *a == "-i").count(), 2);
    assert_eq!(inv.arg_after("-map").as_deref(), Some("[v1]"));
    assert_eq!(inv.arg_after("-c:a").as_deref(), Some("copy"));
    assert!(inv.arg_after("-filter_complex").unwrap().contains("overlay=W-120-40"));
}

#[test]
fn text_cards_are_written_before_encoding() {
    let dir = tempfile::tempdir().unwrap();
    let plan = SegmentPlan::build(
        20.0,
        &[],
        &[event(AnnotationKind::Text, 1.0, 3.0, "50% off", 2)],
    );
    let mut runner = RecordingRunner::new();
    runner.push_output(ToolOutput {
        code: Some(1),
        stdout: Vec::new(),
        stderr: "font missing".to_string(),
    });
    let info = base_info();
    let scratch = dir.path().join("tmp").join("text_cards");
    let output = dir.path().join("out.mp4");
    let io = AssemblyIo {
        base: Path::new("/v/base.mp4"),
        base_info: &info,
        payload_dir: dir.path(),
        output: &output,
    };
    let result = MediaAssembler::new(&mut runner, EncodeConfig::default(), scratch.clone())
        .overlay(&plan, io, &OverlayConfig::default());
    assert!(result.is_err());
    let card = std::fs::read_to_string(scratch.join("card_000.txt")).unwrap();
    assert_eq!(card, "50\\% off");
}

#[test]
fn concat_list_quotes_paths() {
    let list = concat_list(&[PathBuf::from("/tmp/a.mp4"), PathBuf::from("/tmp/it's.mp4")]);
    assert_eq!(list, "file '/tmp/a.mp4'\nfile '/tmp/it'\\''s.mp4'\n");
}
