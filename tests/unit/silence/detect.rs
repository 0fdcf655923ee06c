use super::*;
use crate::media::tool::{RecordingRunner, ToolOutput};

const SAMPLE: &str = "\
[silencedetect @ 0x600] silence_start: -0.0126
[silencedetect @ 0x600] silence_end: 2.412 | silence_duration: 2.4246
size=N/A time=00:00:10.00 bitrate=N/A speed=512x
[silencedetect @ 0x600] silence_start: 5.5
[silencedetect @ 0x600] silence_end: 6.4 | silence_duration: 0.9
[silencedetect @ 0x600] silence_start: 9.1
";

#[test]
fn parses_paired_lines_and_drops_dangling_start() {
    let silences = parse_silencedetect(SAMPLE);
    assert_eq!(silences.len(), 2);
    assert_eq!(silences[0].start, 0.0);
    assert_eq!(silences[0].end, 2.412);
    assert_eq!(silences[0].duration, 2.4246);
    assert_eq!(silences[1].start, 5.5);
    assert_eq!(silences[1].duration, 0.9);
}

#[test]
fn empty_output_yields_no_silences() {
    assert!(parse_silencedetect("").is_empty());
    assert!(parse_silencedetect("frame=  100 fps=0.0").is_empty());
}

#[test]
fn detect_runs_encoder_with_filter() {
    let mut runner = RecordingRunner::new();
    runner.push_output(ToolOutput {
        code: Some(0),
        stdout: Vec::new(),
        stderr: SAMPLE.to_string(),
    });
    let silences = detect_silences(
        &mut runner,
        Path::new("in.mp4"),
        DetectParams {
            noise_db: -30.0,
            min_detect_sec: 0.8,
        },
    )
    .unwrap();
    assert_eq!(silences.len(), 2);
    let call = &runner.calls()[0];
    assert_eq!(
        call.arg_after("-af").as_deref(),
        Some("silencedetect=noise=-30dB:d=0.8")
    );
    assert_eq!(call.arg_after("-f").as_deref(), Some("null"));
}
