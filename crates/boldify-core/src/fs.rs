//! File-backed surface: edits are persisted with an atomic write before they count as applied.

use std::fs::{self, File};
use std::io::Write;
use std::ops::Range;
use std::path::{Path, PathBuf};

use similar::TextDiff;
use tracing::{debug, warn};

use crate::buffer::Buffer;
use crate::error::HostError;
use crate::host::{EditStatus, Surface};
use crate::language::language_for_path;
use crate::selection::Selection;

#[derive(Clone, Debug)]
pub struct WriteOptions {
    /// Keep a `.bak` copy of the previous contents.
    pub backup: bool,
    /// Apply edits in memory only.
    pub dry_run: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            backup: true,
            dry_run: false,
        }
    }
}

#[derive(Debug)]
pub struct FileDocument {
    path: PathBuf,
    original: String,
    buffer: Buffer,
    options: WriteOptions,
}

impl FileDocument {
    /// Opens `path` with the `file` scheme and a language id guessed from its extension.
    pub fn open(path: impl Into<PathBuf>, options: WriteOptions) -> Result<Self, HostError> {
        let path = path.into();
        let original = fs::read_to_string(&path)?;
        let read_only = fs::metadata(&path)?.permissions().readonly();

        let mut buffer = Buffer::new(original.clone())
            .with_scheme("file")
            .read_only(read_only);
        if let Some(language_id) = language_for_path(&path) {
            buffer = buffer.with_language(language_id);
        }

        Ok(Self {
            path,
            original,
            buffer,
            options,
        })
    }

    pub fn with_selection(mut self, selection: Selection) -> Self {
        self.buffer = self.buffer.with_selection(selection);
        self
    }

    pub fn select_all(mut self) -> Self {
        self.buffer = self.buffer.select_all();
        self
    }

    pub fn with_language(mut self, language_id: impl Into<String>) -> Self {
        self.buffer = self.buffer.with_language(language_id);
        self
    }

    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.buffer = self.buffer.with_scheme(scheme);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn content(&self) -> &str {
        self.buffer.content()
    }

    pub fn is_modified(&self) -> bool {
        self.original != self.buffer.content()
    }

    /// Unified diff from the contents read at open time to the current contents.
    pub fn diff(&self) -> Option<String> {
        if !self.is_modified() {
            return None;
        }

        let label = self.path.to_string_lossy();
        let rendered = TextDiff::from_lines(self.original.as_str(), self.buffer.content())
            .unified_diff()
            .header(&format!("a/{label}"), &format!("b/{label}"))
            .to_string();
        Some(rendered)
    }
}

impl Surface for FileDocument {
    fn uri_scheme(&self) -> &str {
        self.buffer.uri_scheme()
    }

    fn language_id(&self) -> Option<&str> {
        self.buffer.language_id()
    }

    fn selection(&self) -> Selection {
        self.buffer.selection()
    }

    fn text_in(&self, range: Range<usize>) -> Result<String, HostError> {
        self.buffer.text_in(range)
    }

    fn apply_edit(
        &mut self,
        range: Range<usize>,
        replacement: &str,
    ) -> Result<EditStatus, HostError> {
        if self.buffer.is_read_only() {
            debug!(path = %self.path.display(), "document is read-only");
            return Ok(EditStatus::Rejected);
        }

        let updated = self.buffer.spliced(range, replacement)?;

        if !self.options.dry_run {
            if let Err(err) = write_atomic(&self.path, &updated, self.options.backup) {
                warn!(path = %self.path.display(), error = %err, "failed to persist edit");
                return Ok(EditStatus::Rejected);
            }
        }

        self.buffer.replace_content(updated);
        Ok(EditStatus::Applied)
    }

    fn set_cursor(&mut self, offset: usize) -> Result<(), HostError> {
        self.buffer.set_cursor(offset)
    }
}

/// Writes through a sibling temp file and renames it over `path`.
pub fn write_atomic(path: &Path, content: &str, backup: bool) -> std::io::Result<()> {
    let tmp_path = unique_tmp_path(path);
    {
        let mut file = File::create(&tmp_path)?;
        file.write_all(content.as_bytes())?;
        file.sync_all()?;
    }

    if backup {
        if let Err(err) = fs::copy(path, path.with_extension("bak")) {
            let _ = fs::remove_file(&tmp_path);
            return Err(err);
        }
    }

    if let Err(err) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(err);
    }

    Ok(())
}

fn unique_tmp_path(path: &Path) -> PathBuf {
    (0u32..)
        .map(|counter| match counter {
            0 => path.with_extension("boldify.tmp"),
            n => path.with_extension(format!("boldify.tmp{n}")),
        })
        .find(|candidate| !candidate.exists())
        .unwrap_or_else(|| path.with_extension("boldify.tmp"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn fixture(name: &str, contents: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempdir().unwrap();
        let path = dir.path().join(name);
        fs::write(&path, contents).unwrap();
        (dir, path)
    }

    #[test]
    fn writes_atomically_with_backup() {
        let (_dir, path) = fixture("doc.md", "hello");

        write_atomic(&path, "updated", true).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "updated");
        assert_eq!(fs::read_to_string(path.with_extension("bak")).unwrap(), "hello");
    }

    #[test]
    fn open_infers_language_and_scheme() {
        let (_dir, path) = fixture("notes.tex", "x");
        let doc = FileDocument::open(&path, WriteOptions::default()).unwrap();
        assert_eq!(doc.language_id(), Some("latex"));
        assert_eq!(doc.uri_scheme(), "file");
    }

    #[test]
    fn edit_is_persisted() {
        let (_dir, path) = fixture("doc.md", "make this bold");
        let mut doc = FileDocument::open(
            &path,
            WriteOptions {
                backup: false,
                dry_run: false,
            },
        )
        .unwrap();

        assert_eq!(doc.apply_edit(5..9, "**this**").unwrap(), EditStatus::Applied);
        assert_eq!(fs::read_to_string(&path).unwrap(), "make **this** bold");
        assert!(!path.with_extension("bak").exists());
    }

    #[test]
    fn dry_run_leaves_file_untouched_and_reports_diff() {
        let (_dir, path) = fixture("doc.md", "bold\n");
        let mut doc = FileDocument::open(
            &path,
            WriteOptions {
                backup: true,
                dry_run: true,
            },
        )
        .unwrap();

        doc.apply_edit(0..4, "**bold**").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "bold\n");
        let diff = doc.diff().unwrap();
        assert!(diff.contains("-bold"));
        assert!(diff.contains("+**bold**"));
    }

    #[test]
    fn unmodified_document_has_no_diff() {
        let (_dir, path) = fixture("doc.md", "same");
        let doc = FileDocument::open(&path, WriteOptions::default()).unwrap();
        assert!(doc.diff().is_none());
    }

    #[test]
    fn failed_write_rejects_and_keeps_buffer() {
        let (dir, path) = fixture("doc.md", "text");
        let mut doc = FileDocument::open(
            &path,
            WriteOptions {
                backup: false,
                dry_run: false,
            },
        )
        .unwrap();
        drop(dir);

        assert_eq!(doc.apply_edit(0..4, "**text**").unwrap(), EditStatus::Rejected);
        assert_eq!(doc.content(), "text");
    }
}
