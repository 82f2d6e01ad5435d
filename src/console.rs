use crate::{
    config::Ui,
    pipeline::{BatchObserver, BatchOutcome, BatchRunState},
    session::Notice,
};
use anyhow::{Result, bail};
use std::io::{IsTerminal, Write};

const BAR_WIDTH: usize = 24;

/// Terminal colours for the front end, chosen once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub highlight: &'static str,
    pub warning: &'static str,
    pub error: &'static str,
    pub reset: &'static str,
}

impl Theme {
    pub const DARK: Theme = Theme {
        highlight: "\x1b[38;2;42;130;218m",
        warning: "\x1b[33m",
        error: "\x1b[31m",
        reset: "\x1b[0m",
    };

    pub const PLAIN: Theme = Theme {
        highlight: "",
        warning: "",
        error: "",
        reset: "",
    };

    pub fn from_name(name: &str) -> Result<Theme> {
        match name.trim().to_ascii_lowercase().as_str() {
            "dark" => Ok(Theme::DARK),
            "plain" | "none" => Ok(Theme::PLAIN),
            other => bail!("unknown ui.theme: {other}"),
        }
    }

    /// Colours only when stdout is a terminal.
    pub fn for_stdout(ui: &Ui) -> Result<Theme> {
        let theme = Theme::from_name(&ui.theme)?;
        if std::io::stdout().is_terminal() {
            Ok(theme)
        } else {
            Ok(Theme::PLAIN)
        }
    }
}

/// Writes notices and live progress to a terminal-like sink.
pub struct Console<W: Write> {
    out: W,
    theme: Theme,
}

impl<W: Write> Console<W> {
    pub fn new(out: W, theme: Theme) -> Self {
        Self { out, theme }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn line(&mut self, text: &str) -> std::io::Result<()> {
        writeln!(self.out, "{text}")
    }

    pub fn render(&mut self, notice: &Notice) -> std::io::Result<()> {
        let t = self.theme;
        match notice {
            Notice::Warning { title, message } => {
                writeln!(self.out, "{}{title}:{} {message}", t.warning, t.reset)
            }
            Notice::Status(msg) => writeln!(self.out, "{}{msg}{}", t.highlight, t.reset),
            Notice::Preview(text) => {
                if text.is_empty() {
                    Ok(())
                } else {
                    writeln!(self.out, "{}--- preview ---{}\n{text}", t.highlight, t.reset)
                }
            }
            Notice::Finished(BatchOutcome::Aborted { .. }) => {
                writeln!(self.out, "{}batch aborted{}", t.error, t.reset)
            }
            Notice::Finished(_) => Ok(()),
        }
    }

    fn progress_line(&mut self, completed: usize, total: usize) -> std::io::Result<()> {
        let filled = if total == 0 {
            0
        } else {
            completed * BAR_WIDTH / total
        };
        writeln!(
            self.out,
            "{}[{}{}]{} {completed}/{total}",
            self.theme.highlight,
            "#".repeat(filled),
            "-".repeat(BAR_WIDTH - filled),
            self.theme.reset
        )
    }
}

// Write errors on the console are not worth aborting a conversion over.
impl<W: Write> BatchObserver for Console<W> {
    fn on_start(&mut self, total: usize) {
        let _ = self.progress_line(0, total);
    }

    fn on_progress(&mut self, state: &BatchRunState) {
        let _ = self.progress_line(state.completed, state.total);
    }

    fn pump(&mut self) {
        let _ = self.out.flush();
    }

    fn on_finish(&mut self, _state: &BatchRunState, _outcome: &BatchOutcome) {
        let _ = self.out.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_is_rendered_per_update() {
        let mut console = Console::new(Vec::new(), Theme::PLAIN);
        console.on_start(2);
        console.on_progress(&BatchRunState {
            total: 2,
            completed: 1,
            last_error: None,
        });
        let out = String::from_utf8(console.into_inner()).unwrap();
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("0/2"));
        assert!(lines[1].ends_with("1/2"));
    }

    #[test]
    fn unknown_theme_is_rejected() {
        assert!(Theme::from_name("solarized").is_err());
        assert_eq!(Theme::from_name("Plain").unwrap(), Theme::PLAIN);
    }
}
