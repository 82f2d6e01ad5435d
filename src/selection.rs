use crate::{
    error::UnsupportedFormatError,
    formats::Format,
    util::{base_name, extension_lower},
};
use std::path::{Path, PathBuf};

/// A path accepted into the selection together with its detected input format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub path: PathBuf,
    pub format: Format,
}

/// Ordered list of files picked for conversion. Duplicates are allowed.
#[derive(Debug, Clone, Default)]
pub struct FileSelection {
    entries: Vec<FileEntry>,
}

impl FileSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn try_add(&mut self, path: impl AsRef<Path>) -> Result<(), UnsupportedFormatError> {
        let path = path.as_ref();
        let ext = extension_lower(path);
        let format = Format::from_extension(&ext)
            .filter(|f| f.is_input())
            .ok_or_else(|| UnsupportedFormatError {
                file_name: base_name(path),
            })?;
        self.entries.push(FileEntry {
            path: path.to_path_buf(),
            format,
        });
        Ok(())
    }

    /// Adds every path independently; a rejection never stops the rest.
    pub fn try_add_all<I, P>(&mut self, paths: I) -> Vec<UnsupportedFormatError>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        paths
            .into_iter()
            .filter_map(|p| self.try_add(p).err())
            .collect()
    }

    /// Removes the rows as they were numbered before the call.
    /// Out-of-range and repeated indices are ignored.
    pub fn remove(&mut self, indices: &[usize]) {
        let mut rows: Vec<usize> = indices
            .iter()
            .copied()
            .filter(|&i| i < self.entries.len())
            .collect();
        rows.sort_unstable();
        rows.dedup();
        for i in rows.into_iter().rev() {
            self.entries.remove(i);
        }
    }

    pub fn count(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, i: usize) -> Option<&FileEntry> {
        self.entries.get(i)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FileEntry> {
        self.entries.iter()
    }
}
