use super::*;
use crate::plan::resolve::ResolutionSource;

fn iv(start: f64, end: f64) -> TimeInterval {
    TimeInterval::clamped(start, end)
}

fn insert(cut_at: f64, length: f64, payload: &str) -> ResolvedEvent {
    ResolvedEvent {
        kind: AnnotationKind::Insert,
        line: 1,
        window: iv(cut_at, cut_at + length),
        payload: payload.to_string(),
        stack_level: 0,
        source: ResolutionSource::WordLevel,
        block_id: None,
    }
}

#[test]
fn no_inserts_is_one_base_cut() {
    let plan = SegmentPlan::build(30.0, &[], &[]);
    assert_eq!(plan.steps().len(), 1);
    assert_eq!(plan.steps()[0].kind, StepKind::BaseCut);
    assert_eq!(plan.steps()[0].source, iv(0.0, 30.0));
    plan.validate().unwrap();
}

#[test]
fn inserts_are_sorted_and_interleaved() {
    let plan = SegmentPlan::build(
        60.0,
        &[insert(40.0, 5.0, "b.mp4"), insert(10.0, 3.0, "a.mp4")],
        &[],
    );
    let kinds: Vec<StepKind> = plan.steps().iter().map(|s| s.kind).collect();
    assert_eq!(
        kinds,
        vec![
            StepKind::BaseCut,
            StepKind::Insert,
            StepKind::BaseCut,
            StepKind::Insert,
            StepKind::BaseCut
        ]
    );
    let steps = plan.steps();
    assert_eq!(steps[0].source, iv(0.0, 10.0));
    assert_eq!(steps[1].payload.as_deref(), Some("a.mp4"));
    assert_eq!(steps[1].output, iv(10.0, 13.0));
    assert_eq!(steps[2].source, iv(10.0, 40.0));
    assert_eq!(steps[2].output, iv(13.0, 43.0));
    assert_eq!(steps[4].source, iv(40.0, 60.0));
    assert_eq!(plan.output_duration(), 68.0);
    plan.validate().unwrap();
}

#[test]
fn insert_at_start_skips_empty_base_cut() {
    let plan = SegmentPlan::build(20.0, &[insert(0.0, 2.0, "intro.mp4")], &[]);
    assert_eq!(plan.steps()[0].kind, StepKind::Insert);
    assert_eq!(plan.steps().len(), 2);
    plan.validate().unwrap();
}

#[test]
fn same_cut_point_keeps_parse_order() {
    let plan = SegmentPlan::build(
        20.0,
        &[insert(5.0, 1.0, "first.mp4"), insert(5.0, 1.0, "second.mp4")],
        &[],
    );
    let payloads: Vec<_> = plan
        .sequential()
        .filter_map(|s| s.payload.as_deref())
        .collect();
    assert_eq!(payloads, vec!["first.mp4", "second.mp4"]);
    plan.validate().unwrap();
}

#[test]
fn insert_past_end_is_appended() {
    let plan = SegmentPlan::build(10.0, &[insert(12.0, 2.0, "outro.mp4")], &[]);
    let last = plan.steps().last().unwrap();
    assert_eq!(last.kind, StepKind::Insert);
    assert_eq!(last.output, iv(10.0, 12.0));
    plan.validate().unwrap();
}

#[test]
fn overlays_keep_stack_levels_and_do_not_affect_timeline() {
    let mut logo = insert(2.0, 5.0, "logo.png");
    logo.kind = AnnotationKind::Logo;
    logo.stack_level = 1;
    let plan = SegmentPlan::build(10.0, &[], &[logo]);
    let ov: Vec<_> = plan.overlays().collect();
    assert_eq!(ov.len(), 1);
    assert_eq!(ov[0].stack_level, 1);
    assert_eq!(ov[0].overlay_kind, Some(AnnotationKind::Logo));
    assert_eq!(plan.output_duration(), 10.0);
    plan.validate().unwrap();
}

#[test]
fn voice_segments_pack_end_to_end() {
    let plan = SegmentPlan::from_voice_segments(&[iv(0.0, 2.0), iv(5.0, 6.5), iv(9.0, 10.0)]);
    let outputs: Vec<_> = plan.steps().iter().map(|s| s.output).collect();
    assert_eq!(outputs, vec![iv(0.0, 2.0), iv(2.0, 3.5), iv(3.5, 4.5)]);
    plan.validate().unwrap();
}

#[test]
fn validate_rejects_gaps() {
    let mut plan = SegmentPlan::from_voice_segments(&[iv(0.0, 2.0), iv(5.0, 6.0)]);
    plan.steps[1].output = iv(3.0, 4.0);
    assert!(plan.validate().is_err());
}
