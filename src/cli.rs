use crate::{
    config::Config,
    console::{Console, Theme},
    engine::{Engine, pandoc::PandocEngine},
    formats::{DIALOG_FILTERS, SUPPORTED_INPUT_FORMATS, SUPPORTED_OUTPUT_FORMATS},
    pipeline::BatchOutcome,
    report::BatchReport,
    session::{Notice, Session, UiEvent},
    util::{ensure_dir, now_rfc3339},
};
use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "frea")]
#[command(about = "Batch document converter (pandoc-backed)")]
pub struct Args {
    #[command(subcommand)]
    pub cmd: Command,

    /// Path to config TOML. If omitted, uses ./frea.toml if present.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Override log level (trace/debug/info/warn/error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List recognised input and output formats.
    Formats {},
    /// Check that pandoc can be run.
    Doctor {},
    /// Print a file as UTF-8 text.
    Preview {
        #[arg(long)]
        input: PathBuf,
    },
    /// Convert every file to one output format, stopping at the first failure.
    Convert {
        #[arg(long)]
        to: String,
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Interactive session: build a selection, preview, convert.
    Shell {
        #[arg(long)]
        to: Option<String>,
        files: Vec<PathBuf>,
    },
}

/// Runs one command. `Ok(false)` means the command ran but the user-facing
/// result was a failure (e.g. an aborted batch).
pub fn dispatch(args: Args) -> Result<bool> {
    let cfg = match resolve_config_path(args.config.as_deref()) {
        Some(path) => Config::load(&path)?,
        None => Config::default(),
    };
    let log_path = resolve_log_path(&cfg);
    let _guard = init_logging(&args, &cfg, log_path.as_deref())?;

    match &args.cmd {
        Command::Formats {} => formats().map(|_| true),
        Command::Doctor {} => doctor(&cfg),
        Command::Preview { input } => {
            println!("{}", crate::preview::preview(Some(input.as_path())));
            Ok(true)
        }
        Command::Convert { to, files } => convert(&cfg, to, files),
        Command::Shell { to, files } => shell(&cfg, to.as_deref(), files),
    }
}

fn resolve_config_path(user: Option<&Path>) -> Option<PathBuf> {
    if let Some(p) = user {
        return Some(p.to_path_buf());
    }
    let default = PathBuf::from("frea.toml");
    default.exists().then_some(default)
}

fn resolve_log_path(cfg: &Config) -> Option<PathBuf> {
    if !cfg.logging.write_to_file {
        return None;
    }
    if !cfg.logging.file_path.is_empty() {
        return Some(PathBuf::from(&cfg.logging.file_path));
    }
    Some(PathBuf::from("frea.log"))
}

fn init_logging(args: &Args, cfg: &Config, file_path: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let level = args
        .log_level
        .as_deref()
        .unwrap_or(cfg.logging.level.as_str());

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let stderr_layer = if cfg.logging.json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed()
    };

    let (file_layer, guard) = if let Some(path) = file_path {
        let parent = path.parent().unwrap_or_else(|| Path::new("."));
        if !parent.as_os_str().is_empty() {
            ensure_dir(parent)?;
        }
        let file = std::fs::File::create(path)
            .with_context(|| format!("create log file: {}", path.display()))?;
        let (non_blocking, guard) = tracing_appender::non_blocking(file);
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(non_blocking)
            .with_ansi(false)
            .with_target(true)
            .boxed();
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow!("failed to init logging: {e}"))?;

    Ok(guard)
}

fn formats() -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({
            "input": SUPPORTED_INPUT_FORMATS,
            "output": SUPPORTED_OUTPUT_FORMATS,
            "dialog_filters": DIALOG_FILTERS,
        }))?
    );
    Ok(())
}

fn doctor(cfg: &Config) -> Result<bool> {
    let diag = PandocEngine::new(cfg).doctor()?;
    println!("{}", serde_json::to_string_pretty(&diag)?);
    Ok(diag.ok)
}

fn convert(cfg: &Config, to: &str, files: &[PathBuf]) -> Result<bool> {
    let theme = Theme::for_stdout(&cfg.ui)?;
    let mut session = Session::new(cfg, PandocEngine::new(cfg));
    let mut console = Console::new(std::io::stdout().lock(), theme);

    let mut notices = session.handle(UiEvent::SetOutputFormat(to.to_string()), &mut console);
    if !notices.is_empty() {
        render_all(&mut console, &notices)?;
        return Ok(false);
    }
    notices = session.handle(UiEvent::AddFiles(files.to_vec()), &mut console);
    render_all(&mut console, &notices)?;

    let started = now_rfc3339();
    let notices = session.handle(UiEvent::Convert, &mut console);
    render_all(&mut console, &notices)?;
    let outcome = finished_outcome(&notices)
        .ok_or_else(|| anyhow!("convert produced no outcome"))?;

    if cfg.ui.print_summary {
        let report = BatchReport::new(
            session.output_format(),
            session.files().count(),
            started,
            now_rfc3339(),
            outcome.clone(),
        );
        console.line(&serde_json::to_string_pretty(&report)?)?;
    }
    Ok(outcome.is_success())
}

fn shell(cfg: &Config, to: Option<&str>, files: &[PathBuf]) -> Result<bool> {
    let theme = Theme::for_stdout(&cfg.ui)?;
    let mut session = Session::new(cfg, PandocEngine::new(cfg));
    let stdout = std::io::stdout();
    let mut console = Console::new(stdout.lock(), theme);

    if let Some(tag) = to {
        let notices = session.handle(UiEvent::SetOutputFormat(tag.to_string()), &mut console);
        render_all(&mut console, &notices)?;
    }
    if !files.is_empty() {
        let notices = session.handle(UiEvent::AddFiles(files.to_vec()), &mut console);
        render_all(&mut console, &notices)?;
    }
    console.line(HELP)?;

    let stdin = std::io::stdin();
    let mut last_ok = true;
    for line in stdin.lock().lines() {
        let line = line.context("reading stdin")?;
        let event = match parse_shell_line(&line) {
            Ok(ShellCommand::Event(event)) => event,
            Ok(ShellCommand::List) => {
                list_files(&mut console, &session)?;
                continue;
            }
            Ok(ShellCommand::Formats) => {
                let tags: Vec<_> = SUPPORTED_OUTPUT_FORMATS.iter().map(|f| f.tag()).collect();
                console.line(&format!("output formats: {}", tags.join(" ")))?;
                continue;
            }
            Ok(ShellCommand::Help) => {
                console.line(HELP)?;
                continue;
            }
            Ok(ShellCommand::Nothing) => continue,
            Ok(ShellCommand::Quit) => break,
            Err(msg) => {
                console.line(&msg)?;
                continue;
            }
        };
        let notices = session.handle(event, &mut console);
        render_all(&mut console, &notices)?;
        if let Some(outcome) = finished_outcome(&notices) {
            last_ok = outcome.is_success();
        }
    }
    info!("session closed files={}", session.files().count());
    Ok(last_ok)
}

fn render_all<W: Write>(console: &mut Console<W>, notices: &[Notice]) -> Result<()> {
    for n in notices {
        console.render(n)?;
    }
    Ok(())
}

fn finished_outcome(notices: &[Notice]) -> Option<BatchOutcome> {
    notices.iter().find_map(|n| match n {
        Notice::Finished(outcome) => Some(outcome.clone()),
        _ => None,
    })
}

fn list_files<W: Write, E: Engine>(console: &mut Console<W>, session: &Session<E>) -> Result<()> {
    if session.files().is_empty() {
        console.line("(no files)")?;
    }
    for (i, entry) in session.files().iter().enumerate() {
        let mark = if session.selected_rows().contains(&i) { '*' } else { ' ' };
        console.line(&format!("{mark}{:>3}  [{}] {}", i + 1, entry.format, entry.path.display()))?;
    }
    console.line(&format!("output format: {}", session.output_format()))?;
    if !session.status().is_empty() {
        console.line(&format!("last status: {}", session.status()))?;
    }
    Ok(())
}

const HELP: &str = "\
commands:
  add <paths..>     add files (same as picking them in a dialog)
  drop <paths..>    add dropped files
  select <rows..>   select rows (1-based) for removal; previews the last one
  show <row>        preview one row
  remove            remove the selected rows
  list              show the selection
  format <tag>      choose the output format
  formats           list output formats
  convert           convert every file, stopping at the first failure
  help | quit";

#[derive(Debug, PartialEq, Eq)]
pub enum ShellCommand {
    Event(UiEvent),
    List,
    Formats,
    Help,
    Nothing,
    Quit,
}

/// Parses one line of the interactive session. Paths are whitespace-separated.
pub fn parse_shell_line(line: &str) -> Result<ShellCommand, String> {
    let mut words = line.split_whitespace();
    let Some(cmd) = words.next() else {
        return Ok(ShellCommand::Nothing);
    };
    let rest: Vec<&str> = words.collect();
    debug!(cmd, ?rest, "shell command");

    let rows = |rest: &[&str]| -> Result<Vec<usize>, String> {
        rest.iter()
            .map(|w| match w.parse::<usize>() {
                Ok(n) if n >= 1 => Ok(n - 1),
                _ => Err(format!("not a row number: {w}")),
            })
            .collect()
    };

    match cmd {
        "add" | "drop" if rest.is_empty() => Err(format!("usage: {cmd} <paths..>")),
        "add" => Ok(ShellCommand::Event(UiEvent::AddFiles(
            rest.iter().map(PathBuf::from).collect(),
        ))),
        "drop" => Ok(ShellCommand::Event(UiEvent::DropFiles(
            rest.iter().map(PathBuf::from).collect(),
        ))),
        "select" => Ok(ShellCommand::Event(UiEvent::SelectRows(rows(&rest)?))),
        "show" => match rest.as_slice() {
            [] => Ok(ShellCommand::Event(UiEvent::Highlight(None))),
            [_] => Ok(ShellCommand::Event(UiEvent::Highlight(
                rows(&rest)?.first().copied(),
            ))),
            _ => Err("usage: show <row>".into()),
        },
        "remove" => Ok(ShellCommand::Event(UiEvent::RemoveSelected)),
        "format" => match rest.as_slice() {
            [tag] => Ok(ShellCommand::Event(UiEvent::SetOutputFormat(tag.to_string()))),
            _ => Err("usage: format <tag>".into()),
        },
        "convert" => Ok(ShellCommand::Event(UiEvent::Convert)),
        "list" | "ls" => Ok(ShellCommand::List),
        "formats" => Ok(ShellCommand::Formats),
        "help" | "?" => Ok(ShellCommand::Help),
        "quit" | "exit" => Ok(ShellCommand::Quit),
        other => Err(format!("unknown command: {other} (try help)")),
    }
}
