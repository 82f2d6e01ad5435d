//! Registry of the document formats the converter accepts and produces.
//!
//! Tags are file extensions without the leading dot. Every input format is
//! also an output format; `pdf` is output-only.

use serde::Serialize;
use std::fmt;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Md,
    Docx,
    Odt,
    Latex,
    Html,
    Txt,
    Rtf,
    Epub,
    Pdf,
}

pub const SUPPORTED_INPUT_FORMATS: &[Format] = &[
    Format::Md,
    Format::Docx,
    Format::Odt,
    Format::Latex,
    Format::Html,
    Format::Txt,
    Format::Rtf,
    Format::Epub,
];

pub const SUPPORTED_OUTPUT_FORMATS: &[Format] = &[
    Format::Md,
    Format::Docx,
    Format::Odt,
    Format::Latex,
    Format::Html,
    Format::Txt,
    Format::Rtf,
    Format::Epub,
    Format::Pdf,
];

/// Name and glob patterns offered by a file-open dialog.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct DialogFilter {
    pub name: &'static str,
    pub patterns: &'static [&'static str],
}

// `*.tex` is offered here but only the `latex` extension is accepted on add.
pub const DIALOG_FILTERS: &[DialogFilter] = &[
    DialogFilter { name: "All Files", patterns: &["*"] },
    DialogFilter { name: "Markdown Files", patterns: &["*.md"] },
    DialogFilter { name: "Word Files", patterns: &["*.docx"] },
    DialogFilter { name: "OpenDocument Files", patterns: &["*.odt"] },
    DialogFilter { name: "LaTeX Files", patterns: &["*.tex"] },
    DialogFilter { name: "HTML Files", patterns: &["*.html"] },
    DialogFilter { name: "Text Files", patterns: &["*.txt"] },
    DialogFilter { name: "RTF Files", patterns: &["*.rtf"] },
    DialogFilter { name: "EPUB Files", patterns: &["*.epub"] },
];

impl Format {
    pub fn tag(self) -> &'static str {
        match self {
            Format::Md => "md",
            Format::Docx => "docx",
            Format::Odt => "odt",
            Format::Latex => "latex",
            Format::Html => "html",
            Format::Txt => "txt",
            Format::Rtf => "rtf",
            Format::Epub => "epub",
            Format::Pdf => "pdf",
        }
    }

    /// Case-insensitive lookup by extension (no leading dot).
    pub fn from_extension(ext: &str) -> Option<Format> {
        let ext = ext.to_ascii_lowercase();
        SUPPORTED_OUTPUT_FORMATS
            .iter()
            .copied()
            .find(|f| f.tag() == ext)
    }

    /// Format of a path, judged by its extension alone.
    pub fn from_path(path: &Path) -> Option<Format> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Format::from_extension)
    }

    pub fn is_input(self) -> bool {
        SUPPORTED_INPUT_FORMATS.contains(&self)
    }

    /// Reader name passed to `pandoc -f`. `None` for output-only formats.
    pub fn pandoc_reader(self) -> Option<&'static str> {
        match self {
            Format::Md | Format::Txt => Some("markdown"),
            Format::Pdf => None,
            other => Some(other.tag()),
        }
    }

    /// Writer name passed to `pandoc -t`. `None` lets pandoc infer from `-o`.
    pub fn pandoc_writer(self) -> Option<&'static str> {
        match self {
            Format::Md => Some("markdown"),
            Format::Txt => Some("plain"),
            Format::Pdf => None,
            other => Some(other.tag()),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

pub fn is_supported_input(extension: &str) -> bool {
    Format::from_extension(extension).is_some_and(Format::is_input)
}

/// Parses a user-supplied output tag.
pub fn parse_output_format(tag: &str) -> Option<Format> {
    Format::from_extension(tag.trim().trim_start_matches('.'))
}
