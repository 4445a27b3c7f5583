use std::ops::Range;

use crate::error::HostError;
use crate::host::{EditStatus, Surface};
use crate::selection::Selection;

/// In-memory document surface.
#[derive(Clone, Debug)]
pub struct Buffer {
    content: String,
    selection: Selection,
    language_id: Option<String>,
    scheme: String,
    read_only: bool,
}

impl Buffer {
    /// An `untitled` buffer with nothing selected.
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            selection: Selection::default(),
            language_id: None,
            scheme: "untitled".to_string(),
            read_only: false,
        }
    }

    pub fn with_selection(mut self, selection: Selection) -> Self {
        self.selection = selection;
        self
    }

    /// Selects the whole document.
    pub fn select_all(mut self) -> Self {
        self.selection = Selection::new(0, self.content.len());
        self
    }

    pub fn with_language(mut self, language_id: impl Into<String>) -> Self {
        self.language_id = Some(language_id.into());
        self
    }

    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = scheme.into();
        self
    }

    /// Read-only buffers reject every edit.
    pub fn read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn into_content(self) -> String {
        self.content
    }

    fn check_range(&self, range: &Range<usize>) -> Result<(), HostError> {
        let len = self.content.len();
        if range.start > range.end || range.end > len {
            return Err(HostError::OutOfBounds {
                start: range.start,
                end: range.end,
                len,
            });
        }
        for offset in [range.start, range.end] {
            if !self.content.is_char_boundary(offset) {
                return Err(HostError::NotCharBoundary(offset));
            }
        }
        Ok(())
    }

    /// Content with `range` replaced, leaving `self` untouched.
    pub(crate) fn spliced(
        &self,
        range: Range<usize>,
        replacement: &str,
    ) -> Result<String, HostError> {
        self.check_range(&range)?;
        let capacity = self.content.len() - range.len() + replacement.len();
        let mut rebuilt = String::with_capacity(capacity);
        rebuilt.push_str(&self.content[..range.start]);
        rebuilt.push_str(replacement);
        rebuilt.push_str(&self.content[range.end..]);
        Ok(rebuilt)
    }

    pub(crate) fn replace_content(&mut self, content: String) {
        self.content = content;
    }

    pub(crate) fn is_read_only(&self) -> bool {
        self.read_only
    }
}

impl Surface for Buffer {
    fn uri_scheme(&self) -> &str {
        &self.scheme
    }

    fn language_id(&self) -> Option<&str> {
        self.language_id.as_deref()
    }

    fn selection(&self) -> Selection {
        self.selection
    }

    fn text_in(&self, range: Range<usize>) -> Result<String, HostError> {
        self.check_range(&range)?;
        Ok(self.content[range].to_string())
    }

    fn apply_edit(
        &mut self,
        range: Range<usize>,
        replacement: &str,
    ) -> Result<EditStatus, HostError> {
        if self.read_only {
            return Ok(EditStatus::Rejected);
        }
        self.content = self.spliced(range, replacement)?;
        Ok(EditStatus::Applied)
    }

    fn set_cursor(&mut self, offset: usize) -> Result<(), HostError> {
        self.check_range(&(offset..offset))?;
        self.selection = Selection::caret(offset);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn applies_edit_in_place() {
        let mut buffer = Buffer::new("hello world");
        let status = buffer.apply_edit(6..11, "there").unwrap();
        assert_eq!(status, EditStatus::Applied);
        assert_eq!(buffer.content(), "hello there");
    }

    #[test]
    fn read_only_buffer_rejects_without_mutation() {
        let mut buffer = Buffer::new("hello").read_only(true);
        assert_eq!(buffer.apply_edit(0..5, "bye").unwrap(), EditStatus::Rejected);
        assert_eq!(buffer.content(), "hello");
    }

    #[test]
    fn out_of_bounds_range_is_a_fault() {
        let buffer = Buffer::new("abc");
        let err = buffer.text_in(1..10).unwrap_err();
        assert!(matches!(err, HostError::OutOfBounds { len: 3, .. }));
    }

    #[test]
    fn splitting_a_character_is_a_fault() {
        let buffer = Buffer::new("héllo");
        let err = buffer.text_in(0..2).unwrap_err();
        assert!(matches!(err, HostError::NotCharBoundary(2)));
    }

    #[test]
    fn cursor_must_be_inside_document() {
        let mut buffer = Buffer::new("abc");
        buffer.set_cursor(3).unwrap();
        assert_eq!(buffer.selection(), Selection::caret(3));
        assert!(buffer.set_cursor(4).is_err());
    }
}
