use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub engine: Engine,
    #[serde(default)]
    pub output: Output,
    #[serde(default)]
    pub ui: Ui,
    #[serde(default)]
    pub logging: Logging,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config: {}", path.display()))?;
        let cfg: Config = toml::from_str(&raw).with_context(|| "parsing TOML")?;
        cfg.validate()
            .with_context(|| format!("invalid config: {}", path.display()))?;
        Ok(cfg)
    }

    /// Rejects enumerated values that would otherwise only fail (or be
    /// silently replaced) once a command reads them.
    pub fn validate(&self) -> Result<()> {
        crate::console::Theme::from_name(&self.ui.theme)?;
        if crate::formats::parse_output_format(&self.output.default_format).is_none() {
            bail!("unknown output.default_format: {}", self.output.default_format);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Engine {
    pub pandoc_exe: String,
    pub extra_args: Vec<String>,
    /// 0 disables the timeout; a hung conversion then blocks the run.
    pub timeout_seconds: u64,
    pub env: BTreeMap<String, String>,
}
impl Default for Engine {
    fn default() -> Self {
        Self {
            pandoc_exe: "pandoc".into(),
            extra_args: Vec::new(),
            timeout_seconds: 0,
            env: Default::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Output {
    pub dir_name: String,
    pub default_format: String,
}
impl Default for Output {
    fn default() -> Self {
        Self {
            dir_name: "converted".into(),
            default_format: "md".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Ui {
    pub theme: String,
    pub print_summary: bool,
}
impl Default for Ui {
    fn default() -> Self {
        Self {
            theme: "dark".into(),
            print_summary: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Logging {
    pub level: String,
    pub json: bool,
    pub write_to_file: bool,
    pub file_path: String,
}
impl Default for Logging {
    fn default() -> Self {
        Self {
            level: "info".into(),
            json: false,
            write_to_file: false,
            file_path: "".into(),
        }
    }
}
