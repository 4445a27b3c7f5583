pub mod buffer;
pub mod engine;
pub mod error;
pub mod format;
pub mod fs;
pub mod host;
pub mod language;
pub mod selection;

pub use buffer::Buffer;
pub use engine::{boldify, replace_selection, Applied};
pub use error::{BoldifyError, BoldifyResult, ExitCode, HostError, Severity};
pub use format::{apply_template, resolve_and_format, Template, PLACEHOLDER};
pub use fs::{FileDocument, WriteOptions};
pub use host::{EditStatus, FormatSettings, Notice, Notifier, Surface, Workspace};
pub use language::{classify, language_for_path, Family};
pub use selection::Selection;
