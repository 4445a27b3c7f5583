//! Narrow capability traits through which the engine talks to its host.
//!
//! The engine never owns editor state. It asks a [`Workspace`] for the focused
//! [`Surface`], reads custom templates from [`FormatSettings`], and reports
//! terminal outcomes to a [`Notifier`]. Any editor (or the command line) can
//! drive the engine by implementing these four traits.

use std::collections::{BTreeMap, HashMap};
use std::ops::Range;

use crate::error::{HostError, Severity};
use crate::selection::Selection;

/// Result of asking the host to replace a span of text.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EditStatus {
    Applied,
    Rejected,
}

/// An editable view onto a document.
pub trait Surface {
    /// URI scheme of the backing document (`file`, `untitled`, `git`, ...).
    fn uri_scheme(&self) -> &str;

    /// Language identifier reported by the host, if any.
    fn language_id(&self) -> Option<&str>;

    fn selection(&self) -> Selection;

    /// Text covered by `range`, byte offsets into the document.
    fn text_in(&self, range: Range<usize>) -> Result<String, HostError>;

    /// Replaces `range` with `replacement` as a single all-or-nothing edit.
    fn apply_edit(
        &mut self,
        range: Range<usize>,
        replacement: &str,
    ) -> Result<EditStatus, HostError>;

    /// Collapses the selection to a caret at `offset`.
    fn set_cursor(&mut self, offset: usize) -> Result<(), HostError>;
}

/// Source of the currently focused surface.
pub trait Workspace {
    type Surface: Surface;

    fn active_surface(&mut self) -> Option<&mut Self::Surface>;
}

impl<S: Surface> Workspace for Option<S> {
    type Surface = S;

    fn active_surface(&mut self) -> Option<&mut S> {
        self.as_mut()
    }
}

/// User-configured templates keyed by raw language identifier.
///
/// Implementations are consulted on every lookup; the engine never caches.
pub trait FormatSettings {
    fn custom_format(&self, language_id: &str) -> Result<Option<String>, HostError>;
}

impl FormatSettings for () {
    fn custom_format(&self, _language_id: &str) -> Result<Option<String>, HostError> {
        Ok(None)
    }
}

impl FormatSettings for HashMap<String, String> {
    fn custom_format(&self, language_id: &str) -> Result<Option<String>, HostError> {
        Ok(self.get(language_id).cloned())
    }
}

impl FormatSettings for BTreeMap<String, String> {
    fn custom_format(&self, language_id: &str) -> Result<Option<String>, HostError> {
        Ok(self.get(language_id).cloned())
    }
}

impl<T: FormatSettings + ?Sized> FormatSettings for &T {
    fn custom_format(&self, language_id: &str) -> Result<Option<String>, HostError> {
        (**self).custom_format(language_id)
    }
}

/// A user-facing message emitted once per failed invocation.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Notice {
    pub severity: Severity,
    pub message: String,
}

pub trait Notifier {
    fn notify(&mut self, notice: &Notice);
}

/// Collects notices in memory. Useful for hosts that render them later.
impl Notifier for Vec<Notice> {
    fn notify(&mut self, notice: &Notice) {
        self.push(notice.clone());
    }
}
