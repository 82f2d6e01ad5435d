use crate::formats::Format;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WrapMode {
    Auto,
    None,
    Preserve,
}

impl WrapMode {
    pub fn as_arg(self) -> &'static str {
        match self {
            WrapMode::Auto => "--wrap=auto",
            WrapMode::None => "--wrap=none",
            WrapMode::Preserve => "--wrap=preserve",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConvertRequest {
    pub source: PathBuf,
    pub source_format: Format,
    pub target_format: Format,
    pub destination: PathBuf,
    pub wrap: WrapMode,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineDiag {
    pub exe: String,
    pub version: Option<String>,
    pub ok: bool,
    #[serde(default)]
    pub error: Option<String>,
}
