//! Experiment management commands.

use anyhow::Result;
use clap::{Args, Subcommand};
use colored::Colorize;
use dialoguer::Confirm;
use expboard_core::experiment::{
    self,
    model::{ExperimentPatch, ExperimentStatus, NewExperiment},
};
use std::path::Path;

use crate::output;

#[derive(Subcommand)]
pub enum ExperimentCommands {
    /// List all experiments, newest first
    List {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Display the kanban board
    Board,

    /// Show a single experiment
    Show {
        /// Experiment ID
        id: i64,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Create a new experiment
    Create(CreateArgs),

    /// Move an experiment to another column
    Move {
        /// Experiment ID
        id: i64,

        /// Target status (todo, in-progress, review, done)
        status: ExperimentStatus,
    },

    /// Change some fields of an experiment; the others are kept
    Update(UpdateArgs),

    /// Delete an experiment
    Delete {
        /// Experiment ID
        id: i64,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Args)]
pub struct CreateArgs {
    /// Experiment name
    pub name: String,

    /// Free-text description
    #[arg(short, long)]
    pub description: Option<String>,

    /// Initial status (todo, in-progress, review, done)
    #[arg(short, long)]
    pub status: Option<ExperimentStatus>,

    /// Owner
    #[arg(short, long)]
    pub owner: Option<String>,

    /// Start date (YYYY-MM-DD)
    #[arg(long)]
    pub start_date: Option<String>,

    /// End date (YYYY-MM-DD)
    #[arg(long)]
    pub end_date: Option<String>,

    /// Revenue signal annotation
    #[arg(short, long)]
    pub revenue_signal: Option<String>,
}

#[derive(Args)]
pub struct UpdateArgs {
    /// Experiment ID
    pub id: i64,

    /// New name
    #[arg(long)]
    pub name: Option<String>,

    /// New description (empty string clears it)
    #[arg(short, long)]
    pub description: Option<String>,

    /// New status
    #[arg(short, long)]
    pub status: Option<ExperimentStatus>,

    /// New owner (empty string clears it)
    #[arg(short, long)]
    pub owner: Option<String>,

    /// New start date (empty string clears it)
    #[arg(long)]
    pub start_date: Option<String>,

    /// New end date (empty string clears it)
    #[arg(long)]
    pub end_date: Option<String>,

    /// New revenue signal (empty string clears it)
    #[arg(short, long)]
    pub revenue_signal: Option<String>,
}

impl From<CreateArgs> for NewExperiment {
    fn from(args: CreateArgs) -> Self {
        Self {
            name: Some(args.name),
            description: args.description,
            status: args.status.map(|s| s.to_string()),
            owner: args.owner,
            start_date: args.start_date,
            end_date: args.end_date,
            revenue_signal: args.revenue_signal,
        }
    }
}

impl UpdateArgs {
    fn into_patch(self) -> (i64, ExperimentPatch) {
        let patch = ExperimentPatch {
            name: self.name,
            description: self.description,
            status: self.status.map(|s| s.to_string()),
            owner: self.owner,
            start_date: self.start_date,
            end_date: self.end_date,
            revenue_signal: self.revenue_signal,
        };
        (self.id, patch)
    }
}

pub async fn execute(cmd: ExperimentCommands, db_path: &Path) -> Result<()> {
    let pool = expboard_db::init_pool(db_path)?;

    match cmd {
        ExperimentCommands::List { json } => {
            let experiments = experiment::list_experiments(&pool)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&experiments)?);
            } else {
                output::print_experiments_table(&experiments);
            }
        }

        ExperimentCommands::Board => {
            let board = expboard_core::board::get_board(&pool)?;
            output::print_board(&board);
        }

        ExperimentCommands::Show { id, json } => {
            let exp = experiment::get_experiment(&pool, id)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&exp)?);
            } else {
                output::print_experiment(&exp);
            }
        }

        ExperimentCommands::Create(args) => {
            let exp = experiment::create_experiment(&pool, &args.into())?;
            println!(
                "{} Created experiment: {} ({})",
                "✓".green().bold(),
                exp.name.cyan(),
                format!("#{}", exp.id).dimmed()
            );
        }

        ExperimentCommands::Move { id, status } => {
            let exp = experiment::move_experiment(&pool, id, status)?;
            println!(
                "{} Moved {} to {}",
                "✓".green().bold(),
                exp.name.cyan(),
                output::status_colored(exp.status)
            );
        }

        ExperimentCommands::Update(args) => {
            let (id, patch) = args.into_patch();
            let exp = experiment::update_experiment(&pool, id, &patch)?;
            println!(
                "{} Updated experiment: {} ({})",
                "✓".green().bold(),
                exp.name.cyan(),
                format!("#{}", exp.id).dimmed()
            );
        }

        ExperimentCommands::Delete { id, yes } => {
            let exp = experiment::get_experiment(&pool, id)?;
            let confirmed = yes
                || Confirm::new()
                    .with_prompt(format!("Delete experiment '{}'?", exp.name))
                    .default(false)
                    .interact()?;

            if !confirmed {
                println!("{}", "Cancelled.".dimmed());
                return Ok(());
            }

            experiment::delete_experiment(&pool, id)?;
            println!(
                "{} Deleted experiment: {} ({})",
                "✓".green().bold(),
                exp.name.cyan(),
                format!("#{}", id).dimmed()
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_args_into_new_experiment() {
        let new: NewExperiment = CreateArgs {
            name: "Pricing test".to_string(),
            description: None,
            status: Some(ExperimentStatus::InProgress),
            owner: Some("Alice".to_string()),
            start_date: None,
            end_date: None,
            revenue_signal: None,
        }
        .into();

        assert_eq!(new.name.as_deref(), Some("Pricing test"));
        assert_eq!(new.status.as_deref(), Some("in-progress"));
        assert_eq!(new.owner.as_deref(), Some("Alice"));
        assert_eq!(new.description, None);
    }

    #[test]
    fn test_update_args_only_set_fields() {
        let (id, patch) = UpdateArgs {
            id: 7,
            name: None,
            description: None,
            status: Some(ExperimentStatus::Done),
            owner: None,
            start_date: None,
            end_date: Some(String::new()),
            revenue_signal: None,
        }
        .into_patch();

        assert_eq!(id, 7);
        assert_eq!(patch.status.as_deref(), Some("done"));
        assert_eq!(patch.end_date.as_deref(), Some(""));
        assert_eq!(patch.owner, None);
    }
}
