//! Front-end state for one interactive session and the handlers for its events.
//!
//! Each [`UiEvent`] maps to exactly one handler method. Handlers call straight
//! into [`FileSelection`], [`preview`] and [`Pipeline`], so every behaviour is
//! reachable without a terminal attached.

use crate::{
    config::Config,
    engine::Engine,
    formats::{Format, parse_output_format},
    pipeline::{BatchObserver, BatchOutcome, BatchRunState, Pipeline},
    preview::preview,
    selection::FileSelection,
};
use std::path::PathBuf;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    AddFiles(Vec<PathBuf>),
    DropFiles(Vec<PathBuf>),
    SelectRows(Vec<usize>),
    Highlight(Option<usize>),
    RemoveSelected,
    SetOutputFormat(String),
    Convert,
}

/// Something the front end should show the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Warning { title: String, message: String },
    Status(String),
    Preview(String),
    Finished(BatchOutcome),
}

/// Progress bar model: hidden until a run starts, hidden again after success.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgressView {
    pub visible: bool,
    pub value: usize,
    pub maximum: usize,
}

pub struct Session<E: Engine> {
    pipeline: Pipeline<E>,
    files: FileSelection,
    selected_rows: Vec<usize>,
    highlighted: Option<usize>,
    output_format: Format,
    status: String,
    progress: ProgressView,
}

impl<E: Engine> Session<E> {
    pub fn new(cfg: &Config, engine: E) -> Self {
        let output_format = parse_output_format(&cfg.output.default_format).unwrap_or_else(|| {
            warn!("unknown output.default_format {:?}; using md", cfg.output.default_format);
            Format::Md
        });
        Self {
            pipeline: Pipeline::new(cfg, engine),
            files: FileSelection::new(),
            selected_rows: Vec::new(),
            highlighted: None,
            output_format,
            status: String::new(),
            progress: ProgressView::default(),
        }
    }

    pub fn files(&self) -> &FileSelection {
        &self.files
    }

    pub fn selected_rows(&self) -> &[usize] {
        &self.selected_rows
    }

    pub fn highlighted(&self) -> Option<usize> {
        self.highlighted
    }

    pub fn output_format(&self) -> Format {
        self.output_format
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn progress(&self) -> &ProgressView {
        &self.progress
    }

    pub fn handle(&mut self, event: UiEvent, observer: &mut dyn BatchObserver) -> Vec<Notice> {
        debug!(?event, "ui event");
        match event {
            UiEvent::AddFiles(paths) => self.on_add_files(paths),
            UiEvent::DropFiles(paths) => self.on_drop_files(paths),
            UiEvent::SelectRows(rows) => self.on_select_rows(rows),
            UiEvent::Highlight(row) => self.on_highlight(row),
            UiEvent::RemoveSelected => self.on_remove_selected(),
            UiEvent::SetOutputFormat(tag) => self.on_set_output_format(&tag),
            UiEvent::Convert => self.on_convert(observer),
        }
    }

    fn on_add_files(&mut self, paths: Vec<PathBuf>) -> Vec<Notice> {
        self.files
            .try_add_all(paths)
            .into_iter()
            .map(|err| Notice::Warning {
                title: "Unsupported File".into(),
                message: err.to_string(),
            })
            .collect()
    }

    fn on_drop_files(&mut self, paths: Vec<PathBuf>) -> Vec<Notice> {
        // Dropped items are validated one by one, exactly like dialog picks.
        self.on_add_files(paths)
    }

    fn on_select_rows(&mut self, rows: Vec<usize>) -> Vec<Notice> {
        let count = self.files.count();
        let rows: Vec<usize> = rows.into_iter().filter(|&r| r < count).collect();
        let current = rows.last().copied();
        self.selected_rows = rows;
        self.selected_rows.sort_unstable();
        self.selected_rows.dedup();
        self.on_highlight(current)
    }

    fn on_highlight(&mut self, row: Option<usize>) -> Vec<Notice> {
        self.highlighted = row.filter(|&r| r < self.files.count());
        let path = self.highlighted.and_then(|r| self.files.get(r)).map(|e| e.path.as_path());
        vec![Notice::Preview(preview(path))]
    }

    fn on_remove_selected(&mut self) -> Vec<Notice> {
        let rows = std::mem::take(&mut self.selected_rows);
        self.files.remove(&rows);
        self.on_highlight(None)
    }

    fn on_set_output_format(&mut self, tag: &str) -> Vec<Notice> {
        match parse_output_format(tag) {
            Some(format) => {
                self.output_format = format;
                Vec::new()
            }
            None => vec![Notice::Warning {
                title: "Unsupported Format".into(),
                message: format!("'{tag}' is not a supported output format."),
            }],
        }
    }

    fn on_convert(&mut self, observer: &mut dyn BatchObserver) -> Vec<Notice> {
        let mut tracked = ProgressTracker {
            view: &mut self.progress,
            inner: observer,
        };
        let outcome = self
            .pipeline
            .run_batch(&self.files, self.output_format, &mut tracked);
        self.status = outcome.status_message();
        info!("{}", self.status);
        vec![
            Notice::Status(self.status.clone()),
            Notice::Finished(outcome),
        ]
    }
}

/// Keeps the session's progress model in step with a run, then forwards.
struct ProgressTracker<'a> {
    view: &'a mut ProgressView,
    inner: &'a mut dyn BatchObserver,
}

impl BatchObserver for ProgressTracker<'_> {
    fn on_start(&mut self, total: usize) {
        *self.view = ProgressView {
            visible: true,
            value: 0,
            maximum: total,
        };
        self.inner.on_start(total);
    }

    fn on_progress(&mut self, state: &BatchRunState) {
        self.view.value = state.completed;
        self.inner.on_progress(state);
    }

    fn pump(&mut self) {
        self.inner.pump();
    }

    fn on_finish(&mut self, state: &BatchRunState, outcome: &BatchOutcome) {
        if outcome.is_success() {
            self.view.visible = false;
        }
        self.inner.on_finish(state, outcome);
    }
}
