use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use boldify_config::{LiveFormats, LoadOptions};
use boldify_core::{
    boldify, Applied, Buffer, ExitCode, FileDocument, Notice, Notifier, Selection, WriteOptions,
};
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Wrap a selection in bold markup for its language", long_about = None)]
struct Cli {
    /// Document to edit ('-' reads the selection from stdin and writes the result to stdout)
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Byte range to format as START:END (defaults to the whole document)
    #[arg(long = "selection", value_name = "START:END", value_parser = parse_selection)]
    selection: Option<Selection>,

    /// Language identifier (inferred from the file extension when omitted)
    #[arg(short = 'l', long = "language", value_name = "ID")]
    language: Option<String>,

    /// URI scheme reported for the document (file, untitled, git, ...)
    #[arg(long = "scheme", value_name = "SCHEME")]
    scheme: Option<String>,

    /// Configuration file overriding .boldify.toml discovery
    #[arg(long = "config", value_name = "PATH")]
    config: Option<PathBuf>,

    /// Print diff without writing changes
    #[arg(long = "dry-run")]
    dry_run: bool,

    /// Force creation of backup (default behaviour)
    #[arg(long = "backup")]
    backup: bool,

    /// Disable backup creation
    #[arg(long = "no-backup", conflicts_with = "backup")]
    no_backup: bool,

    /// Suppress informational output (diffs, success messages)
    #[arg(short = 'q', long = "quiet")]
    quiet: bool,

    /// Enable debug logging on stderr
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,
}

/// Prints notices to stderr, one line each.
struct StderrNotifier;

impl Notifier for StderrNotifier {
    fn notify(&mut self, notice: &Notice) {
        eprintln!("{}: {}", notice.severity.label(), notice.message);
    }
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(exit) | Err(exit) => std::process::ExitCode::from(exit as u8),
    }
}

fn init_logging(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    // A subscriber may already be installed when embedded; keep the existing one.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn run(cli: &Cli) -> Result<ExitCode, ExitCode> {
    let settings = LiveFormats::new(LoadOptions {
        override_path: cli.config.clone(),
        working_dir: None,
    });

    if cli.file == Path::new("-") {
        run_stdin(cli, &settings)
    } else {
        run_file(cli, &settings)
    }
}

fn run_file(cli: &Cli, settings: &LiveFormats) -> Result<ExitCode, ExitCode> {
    let backup = match (cli.backup, cli.no_backup) {
        (_, true) => false,
        (true, false) => true,
        (false, false) => true,
    };
    let options = WriteOptions {
        backup,
        dry_run: cli.dry_run,
    };

    let mut document = FileDocument::open(&cli.file, options).map_err(|err| {
        eprintln!("Failed to open '{}': {err}", cli.file.display());
        ExitCode::InvalidArguments
    })?;
    document = match cli.selection {
        Some(selection) => document.with_selection(selection),
        None => document.select_all(),
    };
    if let Some(language) = &cli.language {
        document = document.with_language(language.as_str());
    }
    if let Some(scheme) = &cli.scheme {
        document = document.with_scheme(scheme.as_str());
    }

    let mut workspace = Some(document);
    let applied =
        boldify(&mut workspace, settings, &mut StderrNotifier).map_err(|err| err.exit_code())?;

    if let Some(document) = workspace {
        handle_file_success(cli, &document, &applied);
    }
    Ok(ExitCode::Success)
}

fn handle_file_success(cli: &Cli, document: &FileDocument, applied: &Applied) {
    if cli.quiet {
        return;
    }

    if cli.dry_run {
        match document.diff() {
            Some(diff) => {
                print!("{diff}");
                io::stdout().flush().ok();
            }
            None => println!("No changes (dry run)"),
        }
        return;
    }

    println!(
        "Updated {} (cursor at {})",
        document.path().display(),
        applied.cursor
    );
}

fn run_stdin(cli: &Cli, settings: &LiveFormats) -> Result<ExitCode, ExitCode> {
    let input = read_stdin().map_err(|err| {
        eprintln!("{err:#}");
        ExitCode::InvalidArguments
    })?;

    let mut buffer =
        Buffer::new(input.clone()).with_scheme(cli.scheme.as_deref().unwrap_or("untitled"));
    buffer = match cli.selection {
        Some(selection) => buffer.with_selection(selection),
        None => buffer.select_all(),
    };
    if let Some(language) = &cli.language {
        buffer = buffer.with_language(language.as_str());
    }

    let mut workspace = Some(buffer);
    let result = boldify(&mut workspace, settings, &mut StderrNotifier);

    // Filters must always hand text back, otherwise the editor drops the selection.
    let (output, exit) = match (result, workspace) {
        (Ok(applied), Some(buffer)) => {
            debug!(cursor = applied.cursor, "formatted stdin selection");
            (buffer.into_content(), ExitCode::Success)
        }
        (Ok(_), None) => (input, ExitCode::Success),
        (Err(err), _) => (input, err.exit_code()),
    };

    emit(&output).map_err(|err| {
        eprintln!("{err:#}");
        ExitCode::Fault
    })?;

    match exit {
        ExitCode::Success => Ok(exit),
        other => Err(other),
    }
}

fn read_stdin() -> Result<String> {
    let mut buffer = String::new();
    io::stdin()
        .read_to_string(&mut buffer)
        .context("Failed to read selection from stdin")?;
    Ok(buffer)
}

fn emit(output: &str) -> Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();

    match handle.write_all(output.as_bytes()).and_then(|_| handle.flush()) {
        Ok(()) => Ok(()),
        Err(err) if should_ignore_pipe_error(&err) => Ok(()),
        Err(err) => Err(err).context("Failed to write result to stdout"),
    }
}

fn should_ignore_pipe_error(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::BrokenPipe | io::ErrorKind::WouldBlock
    )
}

fn parse_selection(raw: &str) -> Result<Selection, String> {
    let (start, end) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected START:END, got '{raw}'"))?;
    let start = start
        .trim()
        .parse::<usize>()
        .map_err(|err| format!("invalid start offset '{start}': {err}"))?;
    let end = end
        .trim()
        .parse::<usize>()
        .map_err(|err| format!("invalid end offset '{end}': {err}"))?;
    Ok(Selection::new(start, end))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_selection_ranges() {
        assert_eq!(parse_selection("3:9").unwrap(), Selection::new(3, 9));
        assert_eq!(parse_selection("9:3").unwrap(), Selection::new(9, 3));
        assert_eq!(parse_selection("4:4").unwrap(), Selection::caret(4));
    }

    #[test]
    fn rejects_malformed_selection() {
        assert!(parse_selection("12").unwrap_err().contains("START:END"));
        assert!(parse_selection("a:3").unwrap_err().contains("invalid start"));
        assert!(parse_selection("1:-2").unwrap_err().contains("invalid end"));
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
