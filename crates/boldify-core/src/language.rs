//! Maps host language identifiers onto the markup families boldify knows how to wrap.

use std::fmt;
use std::path::Path;

/// Human-readable list of the built-in families, used in user-facing notices.
pub const SUPPORTED_FAMILIES_LABEL: &str = "Markdown, HTML, LaTeX, and reStructuredText";

/// Built-in markup targets.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Family {
    Markdown,
    Html,
    Latex,
    RestructuredText,
}

impl Family {
    pub fn as_str(self) -> &'static str {
        match self {
            Family::Markdown => "markdown",
            Family::Html => "html",
            Family::Latex => "latex",
            Family::RestructuredText => "restructured-text",
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifier → family lookup. Matching is exact; hosts already normalise case.
const LANGUAGE_TABLE: &[(&str, Family)] = &[
    ("markdown", Family::Markdown),
    ("html", Family::Html),
    ("typescript", Family::Html),
    ("latex", Family::Latex),
    ("tex", Family::Latex),
    ("restructuredtext", Family::RestructuredText),
    ("rst", Family::RestructuredText),
];

/// File extension → host language identifier, for hosts that only know a path.
const EXTENSION_TABLE: &[(&str, &str)] = &[
    ("md", "markdown"),
    ("markdown", "markdown"),
    ("mdown", "markdown"),
    ("html", "html"),
    ("htm", "html"),
    ("xhtml", "html"),
    ("ts", "typescript"),
    ("tex", "latex"),
    ("latex", "latex"),
    ("sty", "latex"),
    ("cls", "latex"),
    ("rst", "restructuredtext"),
    ("rest", "restructuredtext"),
    ("py", "python"),
    ("json", "json"),
    ("txt", "plaintext"),
    ("adoc", "asciidoc"),
    ("org", "org"),
];

/// Returns the family for a host language identifier, or `None` when unsupported.
pub fn classify(language_id: &str) -> Option<Family> {
    LANGUAGE_TABLE
        .iter()
        .find(|(id, _)| *id == language_id)
        .map(|(_, family)| *family)
}

/// Guesses the host language identifier from a file extension.
pub fn language_for_path(path: &Path) -> Option<&'static str> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();
    EXTENSION_TABLE
        .iter()
        .find(|(ext, _)| *ext == extension)
        .map(|(_, id)| *id)
}

/// Treats an empty identifier the same as a missing one.
pub(crate) fn normalize_language_id(raw: Option<&str>) -> Option<String> {
    raw.filter(|id| !id.is_empty()).map(str::to_owned)
}
