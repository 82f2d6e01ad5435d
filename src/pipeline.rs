use crate::{
    config::Config,
    engine::{ConvertRequest, Engine, WrapMode},
    formats::Format,
    selection::{FileEntry, FileSelection},
    util::{base_name, ensure_dir},
};
use serde::Serialize;
use std::collections::HashSet;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub const NO_FILES_MESSAGE: &str = "Please select at least one file.";
pub const SUCCESS_MESSAGE: &str = "All files converted successfully!";

/// One file's conversion, derived at run time and dropped after its iteration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversionJob {
    pub source: PathBuf,
    pub source_format: Format,
    pub target_format: Format,
    pub destination: PathBuf,
}

impl ConversionJob {
    pub fn derive(entry: &FileEntry, target: Format, dir_name: &str) -> Self {
        Self {
            source: entry.path.clone(),
            source_format: entry.format,
            target_format: target,
            destination: output_path(&entry.path, target, dir_name),
        }
    }

    fn request(&self) -> ConvertRequest {
        ConvertRequest {
            source: self.source.clone(),
            source_format: self.source_format,
            target_format: self.target_format,
            destination: self.destination.clone(),
            wrap: WrapMode::Preserve,
        }
    }
}

/// `<dir of source>/<dir_name>/<stem>.<target>`
pub fn output_path(source: &Path, target: Format, dir_name: &str) -> PathBuf {
    let parent = source.parent().unwrap_or_else(|| Path::new(""));
    let mut name = source.file_stem().map(OsStr::to_os_string).unwrap_or_default();
    name.push(".");
    name.push(target.tag());
    parent.join(dir_name).join(name)
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchRunState {
    pub total: usize,
    pub completed: usize,
    pub last_error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BatchOutcome {
    NoFiles,
    Completed {
        converted: Vec<PathBuf>,
    },
    Aborted {
        file_name: String,
        error: String,
        completed: usize,
    },
}

impl BatchOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, BatchOutcome::Completed { .. })
    }

    /// Number of files converted before the run ended.
    pub fn completed(&self) -> usize {
        match self {
            BatchOutcome::NoFiles => 0,
            BatchOutcome::Completed { converted } => converted.len(),
            BatchOutcome::Aborted { completed, .. } => *completed,
        }
    }

    pub fn status_message(&self) -> String {
        match self {
            BatchOutcome::NoFiles => NO_FILES_MESSAGE.to_string(),
            BatchOutcome::Completed { .. } => SUCCESS_MESSAGE.to_string(),
            BatchOutcome::Aborted {
                file_name, error, ..
            } => format!("Failed to convert {file_name}: {error}"),
        }
    }
}

/// Receives progress from a batch run, synchronously and in order.
pub trait BatchObserver {
    fn on_start(&mut self, _total: usize) {}
    fn on_progress(&mut self, _state: &BatchRunState) {}
    /// Called after every progress update so the front end can redraw.
    fn pump(&mut self) {}
    fn on_finish(&mut self, _state: &BatchRunState, _outcome: &BatchOutcome) {}
}

/// Observer that ignores everything.
pub struct Silent;

impl BatchObserver for Silent {}

pub struct Pipeline<E: Engine> {
    cfg: Config,
    engine: E,
}

impl<E: Engine> Pipeline<E> {
    pub fn new(cfg: &Config, engine: E) -> Self {
        Self {
            cfg: cfg.clone(),
            engine,
        }
    }

    /// Converts every selected file in order, stopping at the first failure.
    pub fn run_batch(
        &self,
        selection: &FileSelection,
        target: Format,
        observer: &mut dyn BatchObserver,
    ) -> BatchOutcome {
        let mut state = BatchRunState {
            total: selection.count(),
            ..Default::default()
        };

        if selection.is_empty() {
            let outcome = BatchOutcome::NoFiles;
            observer.on_finish(&state, &outcome);
            return outcome;
        }

        info!("batch start files={} target={}", state.total, target);
        observer.on_start(state.total);

        let mut converted = Vec::with_capacity(state.total);
        let mut seen = HashSet::new();

        for (i, entry) in selection.iter().enumerate() {
            let job = ConversionJob::derive(entry, target, &self.cfg.output.dir_name);
            info!(
                "convert {}/{} {} -> {}",
                i + 1,
                state.total,
                job.source.display(),
                job.destination.display()
            );

            if !seen.insert(job.destination.clone()) {
                warn!("overwriting output from earlier in this batch: {}", job.destination.display());
            }

            if let Err(err) = self.convert_one(&job) {
                let file_name = base_name(&job.source);
                warn!("batch aborted at {file_name}: {err}");
                state.last_error = Some(err.clone());
                let outcome = BatchOutcome::Aborted {
                    file_name,
                    error: err,
                    completed: state.completed,
                };
                observer.on_finish(&state, &outcome);
                return outcome;
            }

            converted.push(job.destination);
            state.completed = i + 1;
            observer.on_progress(&state);
            observer.pump();
        }

        info!("batch finished files={}", state.completed);
        let outcome = BatchOutcome::Completed { converted };
        observer.on_finish(&state, &outcome);
        outcome
    }

    fn convert_one(&self, job: &ConversionJob) -> Result<(), String> {
        if let Some(dir) = job.destination.parent() {
            ensure_dir(dir).map_err(|e| format!("{e:#}"))?;
        }
        debug!(?job, "engine convert");
        self.engine
            .convert(&job.request())
            .map_err(|e| e.to_string())
    }
}
