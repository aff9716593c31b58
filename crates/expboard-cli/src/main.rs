//! Experiment Board CLI
//!
//! Serves the experiment kanban board and manages experiments from a terminal.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod output;

use commands::{Cli, Commands};

/// Default log filter when `RUST_LOG` is unset.
///
/// Terminal commands keep the domain layers quiet so their output stays
/// readable; the server logs every mutation and request.
fn default_filter(serving: bool, verbose: bool) -> String {
    let domain = match (serving, verbose) {
        (_, true) => "debug",
        (true, false) => "info",
        (false, false) => "warn",
    };
    format!(
        "expboard=info,expboard_web=debug,tower_http=debug,expboard_core={domain},expboard_db={domain}"
    )
}

/// Split a log file path into its directory and file name.
///
/// A bare file name lives in the working directory.
fn split_log_path(path: &Path) -> Result<(PathBuf, String)> {
    let name = path
        .file_name()
        .with_context(|| format!("Log file path has no file name: {}", path.display()))?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    Ok((dir, name.to_string_lossy().into_owned()))
}

/// Open the non-blocking file writer behind `serve --log`.
fn open_log_writer(path: &Path) -> Result<(NonBlocking, WorkerGuard)> {
    let (dir, name) = split_log_path(path)?;
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create log directory {}", dir.display()))?;

    let appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(name)
        .build(&dir)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;

    Ok(tracing_appender::non_blocking(appender))
}

/// Initialize tracing with optional file logging.
///
/// The returned guard flushes the file writer and must live until exit.
fn init_tracing(log_file: Option<&Path>, filter: String) -> Result<Option<WorkerGuard>> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| filter.into());

    let file_writer = log_file.map(open_log_writer).transpose()?;

    match file_writer {
        Some((writer, guard)) => {
            // Log to both stdout and file when --log is used
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer())
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(writer)
                        .with_ansi(false),
                )
                .init();
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
            Ok(None)
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_file = match &cli.command {
        Commands::Serve(args) if args.log => Some(match &args.log_file {
            Some(path) => path.clone(),
            None => cli.project_dir()?.join("data/serve.log"),
        }),
        _ => None,
    };

    let serving = matches!(&cli.command, Commands::Serve(_));
    let _guard = init_tracing(log_file.as_deref(), default_filter(serving, cli.verbose))?;

    cli.execute().await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter() {
        assert!(default_filter(true, false).contains("expboard_core=info"));
        assert!(default_filter(false, false).contains("expboard_core=warn"));
        assert!(default_filter(false, true).contains("expboard_db=debug"));
        assert!(default_filter(true, false).contains("tower_http=debug"));
    }

    #[test]
    fn test_split_log_path_bare_file_name() {
        let (dir, name) = split_log_path(Path::new("serve.log")).unwrap();
        assert_eq!(dir, PathBuf::from("."));
        assert_eq!(name, "serve.log");

        let (dir, name) = split_log_path(Path::new("/var/log/expboard/serve.log")).unwrap();
        assert_eq!(dir, PathBuf::from("/var/log/expboard"));
        assert_eq!(name, "serve.log");

        assert!(split_log_path(Path::new("/")).is_err());
    }

    #[test]
    fn test_open_log_writer_creates_file() {
        use std::io::Write;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/serve.log");

        let (mut writer, guard) = open_log_writer(&path).unwrap();
        writer.write_all(b"hello\n").unwrap();
        drop(writer);
        drop(guard);

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "hello\n");
    }

    #[test]
    fn test_open_log_writer_reports_bad_directory() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, "").unwrap();

        let err = open_log_writer(&blocker.join("serve.log")).unwrap_err();
        assert!(err.to_string().contains("Failed to create log directory"));
    }
}
