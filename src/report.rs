use crate::{formats::Format, pipeline::BatchOutcome};
use serde::Serialize;

/// Summary of one batch run, printed as JSON when `ui.print_summary` is on.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub target_format: Format,
    pub started: String,
    pub finished: String,
    pub total: usize,
    pub completed: usize,
    pub message: String,
    pub outcome: BatchOutcome,
}

impl BatchReport {
    pub fn new(
        target_format: Format,
        total: usize,
        started: String,
        finished: String,
        outcome: BatchOutcome,
    ) -> Self {
        Self {
            target_format,
            started,
            finished,
            total,
            completed: outcome.completed(),
            message: outcome.status_message(),
            outcome,
        }
    }
}
