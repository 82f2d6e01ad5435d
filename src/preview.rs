use std::path::Path;
use tracing::debug;

/// Best-effort UTF-8 text of `path` for display.
///
/// Never fails: read or decode errors come back as an inline message in place
/// of the content, and no path yields an empty preview.
pub fn preview(path: Option<&Path>) -> String {
    let Some(path) = path else {
        return String::new();
    };
    match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) => {
            debug!("preview failed for {}: {err}", path.display());
            format!("Error reading file: {err}")
        }
    }
}
