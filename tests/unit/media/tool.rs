use super::*;

#[test]
fn invocation_builder_and_display() {
    let inv = Invocation::ffmpeg()
        .input(Path::new("/tmp/my clip.mp4"))
        .args(["-c", "copy"])
        .arg("out.mp4");
    assert_eq!(inv.program, "ffmpeg");
    assert!(inv.has_arg("-c"));
    assert_eq!(inv.arg_after("-c").as_deref(), Some("copy"));
    assert_eq!(inv.arg_after("-i").as_deref(), Some("/tmp/my clip.mp4"));
    let shown = inv.to_string();
    assert!(shown.starts_with("ffmpeg -hide_banner -y -i '/tmp/my clip.mp4'"));
    assert!(shown.ends_with("out.mp4"));
}

#[test]
fn run_checked_maps_nonzero_exit_to_external_failure() {
    let mut runner = RecordingRunner::new();
    runner.push_output(ToolOutput {
        code: Some(1),
        stdout: Vec::new(),
        stderr: "Invalid data found when processing input".to_string(),
    });
    let err = runner.run_checked(&Invocation::ffmpeg()).unwrap_err();
    match err {
        TalkcutError::ExternalToolFailure {
            tool,
            status,
            diagnostic_tail,
        } => {
            assert_eq!(tool, "ffmpeg");
            assert_eq!(status, "exit status 1");
            assert!(diagnostic_tail.contains("Invalid data"));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(runner.calls().len(), 1);
}

#[test]
fn unscripted_calls_succeed() {
    let mut runner = RecordingRunner::new();
    let out = runner.run_checked(&Invocation::ffprobe()).unwrap();
    assert!(out.success());
    assert!(out.stdout.is_empty());
}

#[test]
fn system_runner_reports_missing_program() {
    let mut runner = SystemRunner;
    let err = runner
        .run(&Invocation::new("talkcut-no-such-program-xyz"))
        .unwrap_err();
    assert!(matches!(err, TalkcutError::ExternalToolFailure { .. }));
}
