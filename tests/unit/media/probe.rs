use super::*;
use crate::media::tool::{RecordingRunner, ToolOutput};

const CAMERA: &str = r#"{
  "streams": [
    {"index": 0, "codec_type": "video", "width": 3840, "height": 2160, "r_frame_rate": "30000/1001"},
    {"index": 1, "codec_type": "audio", "sample_rate": "48000", "channels": 1}
  ],
  "format": {"duration": "612.345000"}
}"#;

#[test]
fn parses_streams_and_duration() {
    let info = parse_probe_json(CAMERA.as_bytes()).unwrap();
    assert_eq!((info.width, info.height), (3840, 2160));
    assert!((info.fps - 29.97).abs() < 0.01);
    assert_eq!(info.sample_rate, 48_000);
    assert_eq!(info.channels, 1);
    assert_eq!(info.duration, 612.345);
    assert!(info.has_video && info.has_audio);
}

#[test]
fn silent_clip_uses_audio_defaults() {
    let info = parse_probe_json(
        br#"{"streams": [{"codec_type": "video", "width": 1280, "height": 720, "r_frame_rate": "25/1"}]}"#,
    )
    .unwrap();
    assert!(!info.has_audio);
    assert_eq!(info.sample_rate, 44_100);
    assert_eq!(info.channels, 2);
    assert_eq!(info.fps, 25.0);
    assert_eq!(info.duration, 0.0);
}

#[test]
fn zero_denominator_rate_falls_back() {
    let info = parse_probe_json(
        br#"{"streams": [{"codec_type": "video", "r_frame_rate": "0/0"}]}"#,
    )
    .unwrap();
    assert_eq!(info.fps, 30.0);
    assert_eq!(info.width, 1920);
}

#[test]
fn invalid_json_is_an_error() {
    assert!(parse_probe_json(b"nope").is_err());
}

#[test]
fn probe_invokes_ffprobe_with_json_output() {
    let mut runner = RecordingRunner::new();
    runner.push_output(ToolOutput::ok(CAMERA.as_bytes().to_vec()));
    let info = probe_media(&mut runner, Path::new("cam.mp4")).unwrap();
    assert_eq!(info.width, 3840);
    let call = &runner.calls()[0];
    assert_eq!(call.program, "ffprobe");
    assert_eq!(call.arg_after("-print_format").as_deref(), Some("json"));
    assert!(call.has_arg("cam.mp4"));
}

#[test]
fn video_extension_check_is_case_insensitive() {
    assert!(is_video_file(Path::new("a/clip.MP4")));
    assert!(is_video_file(Path::new("clip.webm")));
    assert!(!is_video_file(Path::new("chart.png")));
    assert!(!is_video_file(Path::new("noext")));
}
