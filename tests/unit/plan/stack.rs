use super::*;
use crate::annotate::record::AnnotationKind;
use crate::plan::resolve::ResolutionSource;

fn iv(start: f64, end: f64) -> TimeInterval {
    TimeInterval::clamped(start, end)
}

fn event(start: f64, end: f64, block_id: Option<u32>) -> ResolvedEvent {
    ResolvedEvent {
        kind: AnnotationKind::Text,
        line: 1,
        window: iv(start, end),
        payload: String::new(),
        stack_level: 0,
        source: ResolutionSource::WordLevel,
        block_id,
    }
}

#[test]
fn third_window_returns_to_base_level() {
    assert_eq!(stack_levels(&[iv(0.0, 5.0), iv(2.0, 7.0), iv(6.0, 9.0)]), vec![0, 1, 0]);
}

#[test]
fn nested_windows_stack_up() {
    assert_eq!(
        stack_levels(&[iv(0.0, 10.0), iv(1.0, 9.0), iv(2.0, 8.0)]),
        vec![0, 1, 2]
    );
}

#[test]
fn touching_windows_do_not_stack() {
    assert_eq!(stack_levels(&[iv(0.0, 5.0), iv(5.0, 8.0)]), vec![0, 0]);
    assert!(stack_levels(&[]).is_empty());
}

#[test]
fn gap_in_lower_levels_is_reused() {
    // Level 0 frees up at 4; the fourth window overlaps only levels 1 and 2.
    let levels = stack_levels(&[
        iv(0.0, 4.0),
        iv(1.0, 10.0),
        iv(2.0, 10.0),
        iv(5.0, 9.0),
    ]);
    assert_eq!(levels, vec![0, 1, 2, 0]);
}

#[test]
fn assign_writes_levels_into_events() {
    let mut events = vec![event(0.0, 5.0, None), event(2.0, 7.0, None)];
    assign_stack_levels(&mut events);
    assert_eq!(events[0].stack_level, 0);
    assert_eq!(events[1].stack_level, 1);
}

#[test]
fn block_gaps_are_closed_and_overlaps_trimmed() {
    let mut events = vec![
        event(1.0, 2.0, Some(1)),
        event(3.0, 5.0, Some(1)),
        event(4.5, 6.0, Some(1)),
        event(7.0, 8.0, None),
        event(9.0, 9.5, Some(2)),
    ];
    normalize_blocks(&mut events);
    assert_eq!(events[0].window, iv(1.0, 3.0));
    assert_eq!(events[1].window, iv(3.0, 4.5));
    assert_eq!(events[2].window, iv(4.5, 6.0));
    assert_eq!(events[3].window, iv(7.0, 8.0));
    assert_eq!(events[4].window, iv(9.0, 9.5));
}

#[test]
fn blocks_are_independent() {
    let mut events = vec![
        event(0.0, 1.0, Some(1)),
        event(2.0, 3.0, Some(2)),
        event(4.0, 5.0, Some(1)),
    ];
    normalize_blocks(&mut events);
    assert_eq!(events[0].window, iv(0.0, 4.0));
    assert_eq!(events[1].window, iv(2.0, 3.0));
}

#[test]
fn only_text_cards_are_joined_in_a_block() {
    let mut logo = event(0.0, 2.0, Some(1));
    logo.kind = AnnotationKind::Logo;
    let mut events = vec![logo, event(3.0, 4.0, Some(1)), event(6.0, 7.0, Some(1))];
    normalize_blocks(&mut events);
    assert_eq!(events[0].window, iv(0.0, 2.0));
    assert_eq!(events[1].window, iv(3.0, 6.0));
}
