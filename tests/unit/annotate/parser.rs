use super::*;

fn parse(kind: AnnotationKind, text: &str) -> ParseOutcome {
    parse_markers(kind, text)
}

#[test]
fn insert_marker_attaches_to_anchor() {
    let out = parse(
        AnnotationKind::Insert,
        "[0:00 - 0:05] brick wall\n>>> clip.mp4 | @\"brick\"\n",
    );
    assert!(out.warnings.is_empty());
    assert_eq!(out.records.len(), 1);
    let r = &out.records[0];
    assert_eq!(r.kind, AnnotationKind::Insert);
    assert_eq!(r.line, 2);
    assert_eq!(r.anchor, TimeInterval::clamped(0.0, 5.0));
    assert_eq!(r.anchor_text, "brick wall");
    assert_eq!(r.target.as_deref(), Some("brick"));
    assert_eq!(r.payload, "clip.mp4");
    assert_eq!(r.explicit_duration, None);
    assert_eq!(r.block_id, None);
}

#[test]
fn anchor_duration_hint_and_fractions_are_parsed() {
    let out = parse(
        AnnotationKind::Media,
        "[1:02.50 - 1:10] (7.5s) el logo\n> > > logo.png | “el logo” \n> > > chart.png | @“grafico” | 4s\n",
    );
    // The first marker lacks the @ prefix.
    assert_eq!(out.warnings.malformed_lines(), 1);
    assert_eq!(out.records.len(), 1);
    let r = &out.records[0];
    assert_eq!(r.anchor, TimeInterval::clamped(62.5, 70.0));
    assert_eq!(r.anchor_text, "el logo");
    assert_eq!(r.target.as_deref(), Some("grafico"));
    assert_eq!(r.explicit_duration, Some(4.0));
}

#[test]
fn markers_without_anchor_are_ignored() {
    let out = parse(AnnotationKind::Insert, ">>> clip.mp4 | @\"x\"\n");
    assert!(out.records.is_empty());
    assert!(out.warnings.is_empty());
}

#[test]
fn malformed_markers_are_counted_and_skipped() {
    let out = parse(
        AnnotationKind::Insert,
        "[0:00 - 0:05] a\n>>> clip.mp4\n>>> | @\"a\"\n>>> clip.mp4 | a\n>>> ok.mp4 | @\"a\"\n",
    );
    assert_eq!(out.warnings.malformed_lines(), 3);
    assert_eq!(out.records.len(), 1);
    assert_eq!(out.records[0].payload, "ok.mp4");
}

#[test]
fn invalid_duration_keeps_record() {
    let out = parse(
        AnnotationKind::Media,
        "[0:00 - 0:05] a\n>>> a.png | @\"a\" | soon\n",
    );
    assert_eq!(out.records.len(), 1);
    assert_eq!(out.records[0].explicit_duration, None);
    assert!(matches!(
        out.warnings.iter().next(),
        Some(Warning::InvalidDuration { line: 2, .. })
    ));
}

#[test]
fn blocks_assign_monotonic_ids() {
    let text = "\
[0:00 - 0:05] uno
===
>>> primera
[0:05 - 0:09] dos
>>> segunda
= = =
>>> fuera
===
[0:10 - 0:12] tres
>>> tercera
===
";
    let out = parse(AnnotationKind::Text, text);
    assert!(out.warnings.is_empty());
    let ids: Vec<_> = out.records.iter().map(|r| r.block_id).collect();
    assert_eq!(ids, vec![Some(1), Some(1), None, Some(2)]);
    assert_eq!(out.records[1].anchor, TimeInterval::clamped(5.0, 9.0));
}

#[test]
fn text_cards_collect_continuation_lines() {
    let text = "\
[0:00 - 0:05] hola
>>> Línea uno
> > > Línea dos
línea tres

>>> Otra
# comentario
";
    let out = parse(AnnotationKind::Text, text);
    assert_eq!(out.records.len(), 2);
    assert_eq!(out.records[0].payload, "Línea uno\nLínea dos\nlínea tres");
    assert_eq!(out.records[0].target, None);
    assert_eq!(out.records[1].payload, "Otra");
}

#[test]
fn text_card_stops_at_next_anchor() {
    let text = "[0:00 - 0:05] a\n>>> Card\n[0:05 - 0:08] b\n>>> Next\n";
    let out = parse(AnnotationKind::Text, text);
    assert_eq!(out.records.len(), 2);
    assert_eq!(out.records[0].payload, "Card");
    assert_eq!(out.records[1].anchor.start, 5.0);
}

#[test]
fn unterminated_block_closes_at_eof_with_warning() {
    let out = parse(AnnotationKind::Text, "[0:00 - 0:05] a\n===\n>>> Card");
    assert_eq!(out.records.len(), 1);
    assert_eq!(out.records[0].block_id, Some(1));
    assert!(matches!(
        out.warnings.iter().next(),
        Some(Warning::UnterminatedBlock { opened_at: 2 })
    ));
}

#[test]
fn logo_approval_form_binds_the_anchor_window() {
    let text = "\
[0:10 - 0:20] hablamos de acme
→ acme.png | ✅
→ other.png | ❌
>>> beta.png | @\"beta\"
";
    let out = parse(AnnotationKind::Logo, text);
    assert_eq!(out.records.len(), 2);
    assert_eq!(out.records[0].payload, "acme.png");
    assert_eq!(out.records[0].target, None);
    assert_eq!(out.records[0].anchor, TimeInterval::clamped(10.0, 20.0));
    assert_eq!(out.records[1].target.as_deref(), Some("beta"));
}

#[test]
fn inverted_anchor_is_malformed_and_clears_segment() {
    let out = parse(
        AnnotationKind::Insert,
        "[0:09 - 0:05] bad\n>>> clip.mp4 | @\"x\"\n",
    );
    assert!(out.records.is_empty());
    assert_eq!(out.warnings.malformed_lines(), 1);
}

#[test]
fn phase_follows_state() {
    let kind = AnnotationKind::Insert;
    let s = ParseState::new(kind);
    assert_eq!(s.phase(), Phase::OutsideSegment);
    let (s, out) = s.step(ParseOutcome::default(), 1, "[0:00 - 0:03] x");
    assert_eq!(s.phase(), Phase::HaveSegment);
    let (s, out) = s.step(out, 2, "===");
    assert_eq!(s.phase(), Phase::InsideBlock);
    let (s, out) = s.step(out, 3, "===");
    assert_eq!(s.phase(), Phase::HaveSegment);
    assert!(s.finish(out).warnings.is_empty());
}
