use std::ops::Range;

use crate::error::HostError;
use crate::host::{Surface, Workspace};

/// Schemes backed by real, editable documents. Diff, output and settings views are excluded.
pub const ORDINARY_SCHEMES: &[&str] = &["file", "untitled"];

/// Anchor/head pair of byte offsets. `start` may lie after `end` for backwards selections.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Selection {
    pub start: usize,
    pub end: usize,
}

impl Selection {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn caret(offset: usize) -> Self {
        Self::new(offset, offset)
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Ordered span covered by the selection.
    pub fn range(&self) -> Range<usize> {
        self.start.min(self.end)..self.start.max(self.end)
    }
}

pub fn active_surface<W: Workspace + ?Sized>(workspace: &mut W) -> Option<&mut W::Surface> {
    workspace.active_surface()
}

pub fn is_ordinary_document<S: Surface + ?Sized>(surface: &S) -> bool {
    ORDINARY_SCHEMES.contains(&surface.uri_scheme())
}

pub fn has_selection<S: Surface + ?Sized>(surface: &S) -> bool {
    !surface.selection().is_empty()
}

/// Text under the selection, line breaks included. `None` for an empty selection.
pub fn selected_text<S: Surface + ?Sized>(surface: &S) -> Result<Option<String>, HostError> {
    let selection = surface.selection();
    if selection.is_empty() {
        return Ok(None);
    }
    surface.text_in(selection.range()).map(Some)
}
