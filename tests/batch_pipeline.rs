mod common;

use common::{StubEngine, touch};
use frea::{
    config::Config,
    engine::WrapMode,
    formats::Format,
    pipeline::{BatchObserver, BatchOutcome, BatchRunState, NO_FILES_MESSAGE, Pipeline, SUCCESS_MESSAGE, Silent},
    selection::FileSelection,
};

#[derive(Default)]
struct Recorder {
    events: Vec<String>,
}

impl BatchObserver for Recorder {
    fn on_start(&mut self, total: usize) {
        self.events.push(format!("start {total}"));
    }
    fn on_progress(&mut self, state: &BatchRunState) {
        self.events.push(format!("progress {}/{}", state.completed, state.total));
    }
    fn pump(&mut self) {
        self.events.push("pump".into());
    }
    fn on_finish(&mut self, state: &BatchRunState, _outcome: &BatchOutcome) {
        self.events.push(format!("finish {}/{}", state.completed, state.total));
    }
}

#[test]
fn converts_into_sibling_converted_dirs() {
    let dir = tempfile::tempdir().unwrap();
    let a = touch(dir.path(), "notes/a.md", "# A");
    let b = touch(dir.path(), "letters/b.docx", "PK");

    let mut sel = FileSelection::new();
    sel.try_add(&a).unwrap();
    sel.try_add(&b).unwrap();

    let engine = StubEngine::default();
    let pipeline = Pipeline::new(&Config::default(), &engine);
    let mut rec = Recorder::default();
    let outcome = pipeline.run_batch(&sel, Format::Html, &mut rec);

    let out_a = dir.path().join("notes/converted/a.html");
    let out_b = dir.path().join("letters/converted/b.html");
    assert_eq!(
        outcome,
        BatchOutcome::Completed {
            converted: vec![out_a.clone(), out_b.clone()]
        }
    );
    assert_eq!(outcome.status_message(), SUCCESS_MESSAGE);
    assert!(out_a.is_file());
    assert!(out_b.is_file());
    assert_eq!(engine.sources(), vec![a.clone(), b.clone()]);

    let calls = engine.calls.borrow();
    assert_eq!(calls[0].source_format, Format::Md);
    assert_eq!(calls[1].source_format, Format::Docx);
    assert!(calls.iter().all(|c| c.target_format == Format::Html));
    assert!(calls.iter().all(|c| c.wrap == WrapMode::Preserve));

    assert_eq!(
        rec.events,
        vec!["start 2", "progress 1/2", "pump", "progress 2/2", "pump", "finish 2/2"]
    );
}

#[test]
fn fails_fast_on_first_engine_error() {
    let dir = tempfile::tempdir().unwrap();
    let names = ["one.md", "two.md", "three.md", "four.md"];
    let mut sel = FileSelection::new();
    for n in names {
        sel.try_add(touch(dir.path(), n, "x")).unwrap();
    }

    let engine = StubEngine::failing_at(1);
    let pipeline = Pipeline::new(&Config::default(), &engine);
    let mut rec = Recorder::default();
    let outcome = pipeline.run_batch(&sel, Format::Txt, &mut rec);

    assert_eq!(engine.calls.borrow().len(), 2);
    assert!(dir.path().join("converted/one.txt").is_file());
    for n in ["two", "three", "four"] {
        assert!(!dir.path().join(format!("converted/{n}.txt")).exists());
    }
    match &outcome {
        BatchOutcome::Aborted {
            file_name,
            error,
            completed,
        } => {
            assert_eq!(file_name, "two.md");
            assert!(error.contains("unexpected end of input"));
            assert_eq!(*completed, 1);
        }
        other => panic!("expected abort, got {other:?}"),
    }
    assert!(outcome.status_message().starts_with("Failed to convert two.md:"));
    assert_eq!(rec.events, vec!["start 4", "progress 1/4", "pump", "finish 1/4"]);
}

#[test]
fn failing_first_item_converts_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let mut sel = FileSelection::new();
    sel.try_add(touch(dir.path(), "a.odt", "x")).unwrap();
    sel.try_add(touch(dir.path(), "b.odt", "x")).unwrap();

    let engine = StubEngine::failing_at(0);
    let outcome = Pipeline::new(&Config::default(), &engine).run_batch(&sel, Format::Md, &mut Silent);
    assert_eq!(engine.calls.borrow().len(), 1);
    assert_eq!(outcome.completed(), 0);
    assert!(!dir.path().join("converted/a.md").exists());
}

#[test]
fn empty_selection_never_calls_engine() {
    let engine = StubEngine::default();
    let pipeline = Pipeline::new(&Config::default(), &engine);
    let mut rec = Recorder::default();
    let outcome = pipeline.run_batch(&FileSelection::new(), Format::Html, &mut rec);

    assert_eq!(outcome, BatchOutcome::NoFiles);
    assert_eq!(outcome.status_message(), NO_FILES_MESSAGE);
    assert!(engine.calls.borrow().is_empty());
    assert_eq!(rec.events, vec!["finish 0/0"]);
}

#[test]
fn same_stem_in_same_dir_overwrites() {
    let dir = tempfile::tempdir().unwrap();
    let mut sel = FileSelection::new();
    sel.try_add(touch(dir.path(), "report.md", "md")).unwrap();
    sel.try_add(touch(dir.path(), "report.html", "html")).unwrap();

    let engine = StubEngine::default();
    let outcome = Pipeline::new(&Config::default(), &engine).run_batch(&sel, Format::Docx, &mut Silent);
    assert!(outcome.is_success());
    assert_eq!(engine.calls.borrow().len(), 2);

    let out = dir.path().join("converted/report.docx");
    let body = std::fs::read_to_string(&out).unwrap();
    assert!(body.contains("report.html"));
}

#[test]
fn existing_output_dir_is_fine_and_name_is_configurable() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("out")).unwrap();
    let mut sel = FileSelection::new();
    sel.try_add(touch(dir.path(), "a.epub", "x")).unwrap();

    let mut cfg = Config::default();
    cfg.output.dir_name = "out".into();
    let engine = StubEngine::default();
    let outcome = Pipeline::new(&cfg, &engine).run_batch(&sel, Format::Pdf, &mut Silent);
    assert!(outcome.is_success());
    assert!(dir.path().join("out/a.pdf").is_file());
}

#[cfg(unix)]
#[test]
fn non_utf8_file_names_keep_their_bytes() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join(OsStr::from_bytes(b"caf\xE9.md"));
    std::fs::write(&source, "# caf").unwrap();

    let mut sel = FileSelection::new();
    sel.try_add(&source).unwrap();
    let engine = StubEngine::default();
    let outcome = Pipeline::new(&Config::default(), &engine).run_batch(&sel, Format::Html, &mut Silent);

    let expected = dir.path().join("converted").join(OsStr::from_bytes(b"caf\xE9.html"));
    assert_eq!(outcome, BatchOutcome::Completed { converted: vec![expected.clone()] });
    assert!(expected.is_file());
    assert_eq!(engine.sources(), vec![source]);
}
