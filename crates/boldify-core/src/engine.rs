use std::ops::Range;

use tracing::{debug, error, info, warn};

use crate::error::{BoldifyError, BoldifyResult};
use crate::format::{resolve_template, Template};
use crate::host::{EditStatus, FormatSettings, Notice, Notifier, Surface, Workspace};
use crate::language::{classify, normalize_language_id, Family};
use crate::selection::{active_surface, has_selection, is_ordinary_document, selected_text};

/// Record of a successful invocation.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Applied {
    /// Span of the inserted text in the updated document.
    pub range: Range<usize>,
    pub original: String,
    pub replacement: String,
    pub template: Template,
    pub language_id: Option<String>,
    pub family: Option<Family>,
    /// Caret position after the edit.
    pub cursor: usize,
}

/// Wraps the active selection in bold markup.
///
/// Every failure is turned into exactly one notice before it is returned;
/// success is silent. Host faults never escape as anything but
/// [`BoldifyError::Fault`].
pub fn boldify<W, F, N>(workspace: &mut W, settings: &F, notifier: &mut N) -> BoldifyResult<Applied>
where
    W: Workspace + ?Sized,
    F: FormatSettings + ?Sized,
    N: Notifier + ?Sized,
{
    let result = run(workspace, settings);
    if let Err(err) = &result {
        report(err, notifier);
    }
    result
}

fn run<W, F>(workspace: &mut W, settings: &F) -> BoldifyResult<Applied>
where
    W: Workspace + ?Sized,
    F: FormatSettings + ?Sized,
{
    let surface = active_surface(workspace).ok_or(BoldifyError::NoEditor)?;

    if !is_ordinary_document(&*surface) {
        return Err(BoldifyError::UnsupportedView {
            scheme: surface.uri_scheme().to_string(),
        });
    }

    if !has_selection(&*surface) {
        return Err(BoldifyError::NothingSelected);
    }

    let original = match selected_text(&*surface)? {
        Some(text) if !text.is_empty() => text,
        _ => return Err(BoldifyError::NothingSelected),
    };

    let language_id = normalize_language_id(surface.language_id());
    let family = language_id.as_deref().and_then(classify);
    debug!(?language_id, ?family, "resolved language");

    let template = resolve_template(family, language_id.as_deref(), settings)?.ok_or_else(|| {
        BoldifyError::UnsupportedLanguage {
            language_id: language_id.clone(),
        }
    })?;

    let replacement = template.apply(&original);
    let target = surface.selection().range();

    let cursor = replace_selection(surface, target.clone(), &replacement)?;

    Ok(Applied {
        range: target.start..cursor,
        original,
        replacement,
        template,
        language_id,
        family,
        cursor,
    })
}

/// Replaces `range` with `replacement` and parks the caret right after it.
///
/// Returns the caret offset on success. Once the host has applied the edit a
/// failed caret move is only logged; the document already holds the new text.
pub fn replace_selection<S: Surface + ?Sized>(
    surface: &mut S,
    range: Range<usize>,
    replacement: &str,
) -> BoldifyResult<usize> {
    let start = range.start;
    match surface.apply_edit(range, replacement)? {
        EditStatus::Applied => {
            let cursor = start + replacement.len();
            if let Err(err) = surface.set_cursor(cursor) {
                warn!(cursor, error = %err, "edit applied but caret could not be moved");
            }
            Ok(cursor)
        }
        EditStatus::Rejected => Err(BoldifyError::ReplacementFailed),
    }
}

fn report<N: Notifier + ?Sized>(err: &BoldifyError, notifier: &mut N) {
    match err {
        BoldifyError::Fault(fault) => error!(error = %fault, "boldify failed unexpectedly"),
        BoldifyError::ReplacementFailed => warn!("host rejected the edit"),
        BoldifyError::UnsupportedLanguage { language_id } => {
            info!(?language_id, "no format for language")
        }
        other => debug!(outcome = %other, "precondition not met"),
    }

    notifier.notify(&Notice {
        severity: err.severity(),
        message: err.to_string(),
    });
}
