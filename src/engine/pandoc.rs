use super::{Engine, types::*};
use crate::{config::Config, error::EngineError};
use anyhow::{Context, Result};
use regex::Regex;
use std::ffi::OsString;
use std::io::Read;
use std::path::PathBuf;
use std::process::{Child, Command, Output, Stdio};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

pub struct PandocEngine {
    exe: PathBuf,
    extra_args: Vec<String>,
    env: Vec<(String, String)>,
    timeout: Option<Duration>,
}

impl PandocEngine {
    pub fn new(cfg: &Config) -> Self {
        let timeout = (cfg.engine.timeout_seconds > 0)
            .then(|| Duration::from_secs(cfg.engine.timeout_seconds));
        Self {
            exe: resolve_pandoc_exe(&cfg.engine.pandoc_exe),
            extra_args: cfg.engine.extra_args.clone(),
            env: cfg
                .engine
                .env
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            timeout,
        }
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.exe);
        for (k, v) in &self.env {
            cmd.env(k, v);
        }
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        cmd
    }

    /// Full argument list for one conversion, without the executable.
    /// Paths are passed through as-is, whatever their encoding.
    pub fn args_for(&self, req: &ConvertRequest) -> Vec<OsString> {
        let mut args = vec![req.source.as_os_str().to_os_string()];
        if let Some(reader) = req.source_format.pandoc_reader() {
            args.push("-f".into());
            args.push(reader.into());
        }
        if let Some(writer) = req.target_format.pandoc_writer() {
            args.push("-t".into());
            args.push(writer.into());
        }
        args.push("-o".into());
        args.push(req.destination.as_os_str().to_os_string());
        args.push(req.wrap.as_arg().into());
        args.extend(self.extra_args.iter().map(OsString::from));
        args
    }

    fn spawn_error(&self, source: std::io::Error) -> EngineError {
        EngineError::Spawn {
            exe: self.exe.display().to_string(),
            source,
        }
    }
}

impl Engine for PandocEngine {
    fn doctor(&self) -> Result<EngineDiag> {
        let exe = self.exe.display().to_string();
        let output = match self.command().arg("--version").output() {
            Ok(o) => o,
            Err(err) => {
                return Ok(EngineDiag {
                    exe,
                    version: None,
                    ok: false,
                    error: Some(self.spawn_error(err).to_string()),
                });
            }
        };
        if !output.status.success() {
            return Ok(EngineDiag {
                exe,
                version: None,
                ok: false,
                error: Some(String::from_utf8_lossy(&output.stderr).trim().to_string()),
            });
        }
        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(EngineDiag {
            exe,
            version: parse_version(&stdout)?,
            ok: true,
            error: None,
        })
    }

    fn convert(&self, req: &ConvertRequest) -> Result<(), EngineError> {
        let args = self.args_for(req);
        debug!(exe = %self.exe.display(), ?args, "pandoc");

        let mut child = self
            .command()
            .args(&args)
            .spawn()
            .map_err(|e| self.spawn_error(e))?;

        let output = match self.timeout {
            Some(timeout) => wait_with_timeout(&mut child, timeout)?,
            None => child.wait_with_output()?,
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let reason = if stderr.is_empty() {
                format!("pandoc exited with {}", output.status)
            } else {
                stderr
            };
            return Err(EngineError::Failed {
                code: output.status.code(),
                reason,
            });
        }

        if !output.stderr.is_empty() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            debug!("pandoc stderr {}: {}", req.source.display(), stderr.trim());
        }
        Ok(())
    }
}

fn parse_version(stdout: &str) -> Result<Option<String>> {
    let re = Regex::new(r"(?m)^pandoc(?:\.exe)?\s+([0-9][0-9A-Za-z.\-]*)")
        .context("compiling version regex")?;
    Ok(re.captures(stdout).map(|c| c[1].to_string()))
}

fn resolve_pandoc_exe(raw: &str) -> PathBuf {
    let raw = raw.trim();
    if raw.is_empty() || raw.eq_ignore_ascii_case("auto") {
        if let Ok(env_val) = std::env::var("PANDOC") {
            let p = expand_tilde(&env_val);
            if p.exists() {
                return p;
            }
        }
        return PathBuf::from("pandoc");
    }
    expand_tilde(raw)
}

fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home).join(rest);
        }
    }
    PathBuf::from(path)
}

fn wait_with_timeout(child: &mut Child, timeout: Duration) -> Result<Output, EngineError> {
    // Drain pipes while waiting so a chatty pandoc can't block on a full buffer.
    let stdout_reader = child.stdout.take();
    let stderr_reader = child.stderr.take();

    let stdout_thread = std::thread::spawn(move || -> std::io::Result<Vec<u8>> {
        let mut buf = Vec::new();
        if let Some(mut out) = stdout_reader {
            out.read_to_end(&mut buf)?;
        }
        Ok(buf)
    });

    let stderr_thread = std::thread::spawn(move || -> std::io::Result<Vec<u8>> {
        let mut buf = Vec::new();
        if let Some(mut err) = stderr_reader {
            err.read_to_end(&mut buf)?;
        }
        Ok(buf)
    });

    let join = |h: std::thread::JoinHandle<std::io::Result<Vec<u8>>>| -> Result<Vec<u8>, EngineError> {
        h.join()
            .map_err(|_| EngineError::Io(std::io::Error::other("pipe reader thread panicked")))?
            .map_err(EngineError::Io)
    };

    let start = Instant::now();
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Output {
                status,
                stdout: join(stdout_thread)?,
                stderr: join(stderr_thread)?,
            });
        }

        if start.elapsed() > timeout {
            warn!("pandoc timed out after {:?}", timeout);
            let _ = child.kill();
            child.wait()?;
            // Grandchildren (pdflatex) may still hold the pipes open; leave the
            // readers to finish on their own.
            debug!("detaching pipe readers after timeout");
            drop(stdout_thread);
            drop(stderr_thread);
            return Err(EngineError::TimedOut {
                seconds: timeout.as_secs(),
            });
        }

        std::thread::sleep(Duration::from_millis(50));
    }
}
