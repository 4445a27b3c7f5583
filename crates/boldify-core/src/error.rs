use std::io;

use thiserror::Error;

use crate::language::SUPPORTED_FAMILIES_LABEL;

/// Process exit status for each outcome. 2 is left to clap's usage errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    Success = 0,
    NoEditor = 1,
    UnsupportedView = 3,
    NothingSelected = 4,
    UnsupportedLanguage = 5,
    ReplacementFailed = 6,
    Fault = 7,
    InvalidArguments = 8,
}

/// How loudly a terminal outcome should be surfaced to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl Severity {
    pub fn label(self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

/// Failures raised by the host while the core talks to it.
#[derive(Debug, Error)]
pub enum HostError {
    #[error("selection {start}..{end} is outside the document (length {len})")]
    OutOfBounds { start: usize, end: usize, len: usize },

    #[error("offset {0} does not fall on a character boundary")]
    NotCharBoundary(usize),

    #[error("could not read format settings: {0}")]
    Settings(String),

    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
}

/// Every way an invocation can end without formatting anything.
///
/// The `Display` text is the user-facing notice.
#[derive(Debug, Error)]
pub enum BoldifyError {
    #[error("No active editor found")]
    NoEditor,

    #[error("Boldify can only be used in text editors")]
    UnsupportedView { scheme: String },

    #[error("Please select text to boldify")]
    NothingSelected,

    #[error(
        "Unsupported file type: {}. Boldify supports {}. Add a custom format for '{}' under [formats] in .boldify.toml to enable it.",
        language_label(.language_id),
        SUPPORTED_FAMILIES_LABEL,
        language_label(.language_id)
    )]
    UnsupportedLanguage { language_id: Option<String> },

    #[error("Failed to apply bold formatting")]
    ReplacementFailed,

    #[error("Failed to apply bold formatting: {0}")]
    Fault(#[from] HostError),
}

impl BoldifyError {
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Self::NoEditor => ExitCode::NoEditor,
            Self::UnsupportedView { .. } => ExitCode::UnsupportedView,
            Self::NothingSelected => ExitCode::NothingSelected,
            Self::UnsupportedLanguage { .. } => ExitCode::UnsupportedLanguage,
            Self::ReplacementFailed => ExitCode::ReplacementFailed,
            Self::Fault(_) => ExitCode::Fault,
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            Self::NoEditor | Self::UnsupportedView { .. } | Self::NothingSelected => {
                Severity::Info
            }
            Self::UnsupportedLanguage { .. } => Severity::Warning,
            Self::ReplacementFailed | Self::Fault(_) => Severity::Error,
        }
    }
}

fn language_label(language_id: &Option<String>) -> &str {
    language_id.as_deref().unwrap_or("unknown")
}

pub type BoldifyResult<T> = Result<T, BoldifyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcomes_never_exit_with_usage_status() {
        let outcomes = [
            BoldifyError::NoEditor,
            BoldifyError::UnsupportedView {
                scheme: "git".into(),
            },
            BoldifyError::NothingSelected,
            BoldifyError::UnsupportedLanguage { language_id: None },
            BoldifyError::ReplacementFailed,
            BoldifyError::Fault(HostError::Settings("boom".into())),
        ];
        for outcome in &outcomes {
            assert_ne!(outcome.exit_code() as u8, 2, "{outcome:?}");
            assert_ne!(outcome.exit_code(), ExitCode::Success);
        }
    }

    #[test]
    fn unsupported_language_message_names_identifier() {
        let err = BoldifyError::UnsupportedLanguage {
            language_id: Some("json".into()),
        };
        let message = err.to_string();
        assert!(message.starts_with("Unsupported file type: json."));
        assert!(message.contains("Markdown, HTML, LaTeX, and reStructuredText"));
        assert!(message.contains("custom format for 'json'"));
        assert_eq!(err.severity(), Severity::Warning);
    }

    #[test]
    fn missing_language_is_reported_as_unknown() {
        let err = BoldifyError::UnsupportedLanguage { language_id: None };
        assert!(err.to_string().starts_with("Unsupported file type: unknown."));
    }

    #[test]
    fn fault_message_carries_description() {
        let err = BoldifyError::from(HostError::NotCharBoundary(3));
        assert_eq!(
            err.to_string(),
            "Failed to apply bold formatting: offset 3 does not fall on a character boundary"
        );
        assert_eq!(err.exit_code(), ExitCode::Fault);
    }
}
