//! CLI command definitions and handlers.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

pub mod experiment;
pub mod serve;

/// Experiment Board - kanban tracking for product experiments
#[derive(Parser)]
#[command(name = "expboard")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to project directory (defaults to current directory)
    #[arg(short, long, global = true)]
    pub project: Option<PathBuf>,

    /// Database file (defaults to <project>/data/kanban.db)
    #[arg(long, global = true, env = "EXPBOARD_DB")]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the web server (board UI and JSON API)
    Serve(serve::ServeArgs),

    /// Manage experiments from the terminal
    #[command(subcommand, alias = "exp")]
    Experiment(experiment::ExperimentCommands),
}

impl Cli {
    /// Project directory, falling back to the working directory.
    pub fn project_dir(&self) -> Result<PathBuf> {
        match &self.project {
            Some(dir) => Ok(dir.clone()),
            None => Ok(std::env::current_dir()?),
        }
    }

    pub async fn execute(self) -> Result<()> {
        let project_dir = self.project_dir()?;
        let db_path = resolve_db_path(self.db.as_deref(), &project_dir);

        match self.command {
            Commands::Serve(args) => serve::execute(args, &db_path).await,
            Commands::Experiment(cmd) => experiment::execute(cmd, &db_path).await,
        }
    }
}

/// An explicit `--db` wins; otherwise the conventional project-relative path.
pub fn resolve_db_path(db: Option<&Path>, project_dir: &Path) -> PathBuf {
    db.map(Path::to_path_buf)
        .unwrap_or_else(|| project_dir.join(expboard_db::DEFAULT_DB_PATH))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_resolve_db_path() {
        let project = Path::new("/srv/board");
        assert_eq!(
            resolve_db_path(None, project),
            PathBuf::from("/srv/board/data/kanban.db")
        );
        assert_eq!(
            resolve_db_path(Some(Path::new("/tmp/other.db")), project),
            PathBuf::from("/tmp/other.db")
        );
    }

    #[test]
    fn test_parse_move_with_alias() {
        let cli = Cli::try_parse_from(["expboard", "exp", "move", "3", "in-progress"]).unwrap();
        match cli.command {
            Commands::Experiment(experiment::ExperimentCommands::Move { id, status }) => {
                assert_eq!(id, 3);
                assert_eq!(status.as_str(), "in-progress");
            }
            _ => panic!("expected move command"),
        }
    }

    #[test]
    fn test_parse_rejects_unknown_status() {
        assert!(Cli::try_parse_from(["expboard", "experiment", "move", "3", "archived"]).is_err());
    }
}
