//! Configuration loader for boldify's custom formats.
//!
//! Layers are resolved lowest to highest precedence:
//! built-in defaults → git root → working directory → override flag.
//! Each layer may contribute a `[formats]` table mapping a language
//! identifier to a template containing `{text}`; later layers replace
//! earlier entries key by key.

use std::collections::BTreeMap;
use std::env;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use boldify_core::{FormatSettings, HostError};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

pub const CONFIG_FILE_NAME: &str = ".boldify.toml";

/// Configuration resolved from defaults and on-disk overrides.
#[derive(Clone, Debug)]
pub struct Config {
    pub formats: FormatTable,
    pub sources: ConfigSources,
}

impl Config {
    /// Loads configuration using the precedence rules.
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let working_dir = resolve_working_dir(options.working_dir)?;
        let override_path = options
            .override_path
            .map(|path| make_absolute(&path, &working_dir));

        if let Some(path) = &override_path {
            if !path.exists() {
                return Err(ConfigError::OverrideNotFound { path: path.clone() });
            }
        }

        let mut formats = FormatTable::default();
        let mut layers = vec![ConfigSource::DEFAULTS];
        let mut errors = Vec::new();

        let git_config_path = find_git_root(&working_dir).map(|root| root.join(CONFIG_FILE_NAME));
        let local_config_path = working_dir.join(CONFIG_FILE_NAME);

        let mut candidates = Vec::new();
        if let Some(path) = git_config_path {
            if path.exists() && Some(&path) != override_path.as_ref() && path != local_config_path
            {
                candidates.push((ConfigSourceKind::GitRoot, path));
            }
        }
        if local_config_path.exists() && Some(&local_config_path) != override_path.as_ref() {
            candidates.push((ConfigSourceKind::Local, local_config_path));
        }
        if let Some(path) = override_path {
            candidates.push((ConfigSourceKind::Override, path));
        }

        for (kind, path) in candidates {
            let source = ConfigSource::for_file(kind, path.clone());
            let raw = load_layer(&path)?;
            formats.merge(raw, &source, &mut errors);
            debug!(layer = %source.describe(), "loaded config layer");
            layers.push(source);
        }

        if !errors.is_empty() {
            return Err(ConfigError::Validation(ConfigValidationErrors(errors)));
        }

        Ok(Config {
            formats,
            sources: ConfigSources {
                working_directory: working_dir,
                layers,
            },
        })
    }

    /// Template configured for `language_id`, if any.
    pub fn format_for(&self, language_id: &str) -> Option<&str> {
        self.formats.get(language_id)
    }
}

impl FormatSettings for Config {
    fn custom_format(&self, language_id: &str) -> Result<Option<String>, HostError> {
        Ok(self.format_for(language_id).map(str::to_owned))
    }
}

/// Language id → template entries with the layer each one came from.
#[derive(Clone, Debug, Default)]
pub struct FormatTable {
    entries: BTreeMap<String, FormatEntry>,
}

#[derive(Clone, Debug)]
pub struct FormatEntry {
    pub template: String,
    pub source: ConfigSource,
}

impl FormatTable {
    pub fn get(&self, language_id: &str) -> Option<&str> {
        self.entries
            .get(language_id)
            .map(|entry| entry.template.as_str())
    }

    pub fn entry(&self, language_id: &str) -> Option<&FormatEntry> {
        self.entries.get(language_id)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    fn merge(
        &mut self,
        raw: RawConfig,
        source: &ConfigSource,
        errors: &mut Vec<ConfigValidationError>,
    ) {
        for (language_id, template) in raw.formats.unwrap_or_default() {
            if language_id.trim().is_empty() {
                errors.push(
                    ConfigValidationError::new(
                        Some(source.clone()),
                        "language identifier must not be empty".to_string(),
                    )
                    .with_context("formats"),
                );
                continue;
            }

            self.entries.insert(
                language_id,
                FormatEntry {
                    template,
                    source: source.clone(),
                },
            );
        }
    }
}

/// Re-reads configuration on every lookup so edits apply to the next invocation.
#[derive(Clone, Debug, Default)]
pub struct LiveFormats {
    options: LoadOptions,
}

impl LiveFormats {
    pub fn new(options: LoadOptions) -> Self {
        Self { options }
    }
}

impl FormatSettings for LiveFormats {
    fn custom_format(&self, language_id: &str) -> Result<Option<String>, HostError> {
        let config =
            Config::load(self.options.clone()).map_err(|err| HostError::Settings(err.to_string()))?;
        Ok(config.format_for(language_id).map(str::to_owned))
    }
}

/// Provenance information for resolved configuration.
#[derive(Clone, Debug)]
pub struct ConfigSources {
    pub working_directory: PathBuf,
    pub layers: Vec<ConfigSource>,
}

/// Specific layer of configuration (default/git/local/override).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ConfigSource {
    pub kind: ConfigSourceKind,
    pub path: Option<PathBuf>,
}

impl ConfigSource {
    const DEFAULTS: ConfigSource = ConfigSource {
        kind: ConfigSourceKind::Default,
        path: None,
    };

    fn for_file(kind: ConfigSourceKind, path: PathBuf) -> Self {
        ConfigSource {
            kind,
            path: Some(path),
        }
    }

    pub fn describe(&self) -> String {
        match (&self.kind, &self.path) {
            (ConfigSourceKind::Default, _) => "built-in defaults".to_owned(),
            (kind, Some(path)) => format!("{} at {}", kind, path.display()),
            (kind, None) => kind.to_string(),
        }
    }
}

/// Kinds of configuration sources, ordered from lowest to highest precedence.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ConfigSourceKind {
    Default,
    GitRoot,
    Local,
    Override,
}

impl fmt::Display for ConfigSourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ConfigSourceKind::Default => "defaults",
            ConfigSourceKind::GitRoot => "git-root config",
            ConfigSourceKind::Local => "local config",
            ConfigSourceKind::Override => "override config",
        };
        f.write_str(label)
    }
}

/// Loader options, typically supplied by the CLI layer.
#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub override_path: Option<PathBuf>,
    pub working_dir: Option<PathBuf>,
}

impl LoadOptions {
    pub fn with_override_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.override_path = Some(path.into());
        self
    }

    pub fn with_working_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(path.into());
        self
    }
}

/// Errors surfaced while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to resolve working directory {attempted}: {source}")]
    WorkingDirectory {
        attempted: PathBuf,
        source: io::Error,
    },
    #[error("override config {path} not found")]
    OverrideNotFound { path: PathBuf },
    #[error("failed to read config {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("configuration validation failed:\n{0}")]
    Validation(ConfigValidationErrors),
}

/// Container for validation failures, formatted as a bullet list.
#[derive(Debug)]
pub struct ConfigValidationErrors(pub Vec<ConfigValidationError>);

impl fmt::Display for ConfigValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, err) in self.0.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "- {err}")?;
        }
        Ok(())
    }
}

impl ConfigValidationErrors {
    pub fn iter(&self) -> impl Iterator<Item = &ConfigValidationError> {
        self.0.iter()
    }
}

/// Validation failure with optional provenance.
#[derive(Clone, Debug)]
pub struct ConfigValidationError {
    pub source: Option<ConfigSource>,
    pub message: String,
    pub context: Option<String>,
}

impl ConfigValidationError {
    fn new(source: Option<ConfigSource>, message: String) -> Self {
        ConfigValidationError {
            source,
            message,
            context: None,
        }
    }

    fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}

impl fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(context) = &self.context {
            write!(f, "{}: {}", context, self.message)?;
        } else {
            write!(f, "{}", self.message)?;
        }
        if let Some(source) = &self.source {
            write!(f, " ({})", source.describe())?;
        }
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    #[serde(default)]
    formats: Option<BTreeMap<String, String>>,
}

fn resolve_working_dir(override_dir: Option<PathBuf>) -> Result<PathBuf, ConfigError> {
    match override_dir {
        Some(path) => fs::canonicalize(&path).map_err(|source| ConfigError::WorkingDirectory {
            attempted: path,
            source,
        }),
        None => env::current_dir().map_err(|source| ConfigError::WorkingDirectory {
            attempted: PathBuf::from("."),
            source,
        }),
    }
}

fn make_absolute(path: &Path, base: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

fn load_layer(path: &Path) -> Result<RawConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.into(),
        source,
    })?;
    toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.into(),
        source,
    })
}

fn find_git_root(start: &Path) -> Option<PathBuf> {
    let mut current = Some(start);
    while let Some(dir) = current {
        if dir.join(".git").exists() {
            return Some(dir.to_path_buf());
        }
        current = dir.parent();
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_formats_table() {
        let raw: RawConfig = toml::from_str(
            r#"
            [formats]
            python = "**{text}**"
            "#,
        )
        .unwrap();
        let formats = raw.formats.unwrap();
        assert_eq!(formats.get("python").map(String::as_str), Some("**{text}**"));
    }

    #[test]
    fn rejects_unknown_top_level_keys() {
        let parsed: Result<RawConfig, _> = toml::from_str("[format]\npython = \"x\"\n");
        assert!(parsed.is_err());
    }

    #[test]
    fn non_string_templates_fail_to_parse() {
        let parsed: Result<RawConfig, _> = toml::from_str("[formats]\npython = 3\n");
        assert!(parsed.is_err());
    }

    #[test]
    fn validation_errors_render_with_provenance() {
        let source = ConfigSource::for_file(ConfigSourceKind::Local, PathBuf::from("/x/.boldify.toml"));
        let errors = ConfigValidationErrors(vec![ConfigValidationError::new(
            Some(source),
            "language identifier must not be empty".into(),
        )
        .with_context("formats")]);
        assert_eq!(
            errors.to_string(),
            "- formats: language identifier must not be empty (local config at /x/.boldify.toml)"
        );
    }
}
