use thiserror::Error;

/// Raised when a path's extension is not in the supported input set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("The file '{file_name}' is not supported.")]
pub struct UnsupportedFormatError {
    pub file_name: String,
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to start {exe}: {source}")]
    Spawn {
        exe: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{reason}")]
    Failed { code: Option<i32>, reason: String },
    #[error("conversion exceeded timeout of {seconds}s")]
    TimedOut { seconds: u64 },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
