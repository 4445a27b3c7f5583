use tracing::{debug, warn};

use crate::error::HostError;
use crate::host::FormatSettings;
use crate::language::Family;

/// Token replaced with the selected text inside custom templates.
pub const PLACEHOLDER: &str = "{text}";

/// How a selection gets wrapped.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Template {
    Builtin(Family),
    Custom(String),
}

impl Template {
    pub fn apply(&self, text: &str) -> String {
        match self {
            Template::Builtin(family) => wrap_builtin(*family, text),
            Template::Custom(template) => apply_template(text, template),
        }
    }

    pub fn is_custom(&self) -> bool {
        matches!(self, Template::Custom(_))
    }
}

/// Prefix and suffix placed around a selection for each built-in family.
pub fn delimiters(family: Family) -> (&'static str, &'static str) {
    match family {
        Family::Markdown => ("**", "**"),
        Family::Html => ("<b>", "</b>"),
        Family::Latex => ("\\textbf{", "}"),
        Family::RestructuredText => ("**", "**"),
    }
}

fn wrap_builtin(family: Family, text: &str) -> String {
    let (prefix, suffix) = delimiters(family);
    let mut output = String::with_capacity(prefix.len() + text.len() + suffix.len());
    output.push_str(prefix);
    output.push_str(text);
    output.push_str(suffix);
    output
}

/// Replaces every placeholder in `template` with `text`.
///
/// Substitution is a single left-to-right pass, so a `{text}` inside `text`
/// is never expanded again. A template without the placeholder comes back as-is.
pub fn apply_template(text: &str, template: &str) -> String {
    template.replace(PLACEHOLDER, text)
}

pub fn lookup_custom_template<F: FormatSettings + ?Sized>(
    settings: &F,
    language_id: Option<&str>,
) -> Result<Option<String>, HostError> {
    match language_id {
        Some(id) => settings.custom_format(id),
        None => Ok(None),
    }
}

pub fn lookup_builtin_formatter(family: Option<Family>) -> Option<Template> {
    family.map(Template::Builtin)
}

/// Picks the template for a selection: a custom entry for the raw id wins over the family wrap.
pub fn resolve_template<F: FormatSettings + ?Sized>(
    family: Option<Family>,
    language_id: Option<&str>,
    settings: &F,
) -> Result<Option<Template>, HostError> {
    if let Some(custom) = lookup_custom_template(settings, language_id)? {
        if !custom.contains(PLACEHOLDER) {
            warn!(
                language_id = language_id.unwrap_or_default(),
                template = %custom,
                "custom format has no {PLACEHOLDER} placeholder; selection will be discarded"
            );
        }
        debug!(language_id = language_id.unwrap_or_default(), "using custom format");
        return Ok(Some(Template::Custom(custom)));
    }

    let builtin = lookup_builtin_formatter(family);
    if let Some(Template::Builtin(family)) = &builtin {
        debug!(%family, "using built-in format");
    }
    Ok(builtin)
}

/// Formats `text` for the given language, or `None` when nothing knows how to.
pub fn resolve_and_format<F: FormatSettings + ?Sized>(
    text: &str,
    family: Option<Family>,
    language_id: Option<&str>,
    settings: &F,
) -> Result<Option<String>, HostError> {
    Ok(resolve_template(family, language_id, settings)?.map(|template| template.apply(text)))
}
