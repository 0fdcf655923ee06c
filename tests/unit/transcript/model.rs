use super::*;

const DOC: &str = r#"{
  "task": "transcribe",
  "language": "spanish",
  "duration": 12.5,
  "text": "Hola mundo.",
  "words": [
    {"word": "mundo", "start": 0.6, "end": 1.0},
    {"word": "Hola", "start": 0.1, "end": 0.5}
  ],
  "segments": [{"id": 0, "start": 0.0, "end": 1.2, "text": " Hola mundo."}]
}"#;

#[test]
fn parses_recognizer_output_and_orders_words() {
    let t = Transcript::from_reader(DOC.as_bytes()).unwrap();
    assert_eq!(t.duration, 12.5);
    assert_eq!(t.words.len(), 2);
    assert_eq!(t.words[0].text, "Hola");
    assert_eq!(t.words[1].start, 0.6);
    assert_eq!(t.segments[0].text, " Hola mundo.");
}

#[test]
fn missing_sections_default_to_empty() {
    let t = Transcript::from_reader(r#"{"duration": 3.0}"#.as_bytes()).unwrap();
    assert!(t.words.is_empty());
    assert!(t.segments.is_empty());
}

#[test]
fn invalid_json_is_a_serde_error() {
    let err = Transcript::from_reader("{not json".as_bytes()).unwrap_err();
    assert!(matches!(err, TalkcutError::Serde(_)));
}

#[test]
fn missing_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let err = Transcript::from_path(dir.path().join("nope.json")).unwrap_err();
    assert!(matches!(err, TalkcutError::MissingInputFile { .. }));
}

#[test]
fn write_then_read_preserves_word_field_name() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("t.json");
    let t = Transcript::from_reader(DOC.as_bytes()).unwrap();
    t.write_to(&path).unwrap();
    let raw = std::fs::read_to_string(&path).unwrap();
    assert!(raw.contains("\"word\": \"Hola\""));
    assert_eq!(Transcript::from_path(&path).unwrap(), t);
}
