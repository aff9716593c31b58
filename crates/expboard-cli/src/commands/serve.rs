//! Web server command.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Args)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(long, default_value = "3000")]
    pub port: u16,

    /// Host to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Also write logs to a file
    #[arg(long)]
    pub log: bool,

    /// Log file path (defaults to <project>/data/serve.log)
    #[arg(long, requires = "log")]
    pub log_file: Option<PathBuf>,
}

pub async fn execute(args: ServeArgs, db_path: &Path) -> Result<()> {
    let pool = Arc::new(expboard_db::init_pool(db_path)?);

    println!();
    println!("  {} {}", "Experiment".cyan().bold(), "Board".bold());
    println!();
    println!("  {}      http://{}:{}", "Board".green(), args.host, args.port);
    println!("  {}        http://{}:{}/experiments", "API".green(), args.host, args.port);
    println!("  {}  ws://{}:{}/ws", "WebSocket".green(), args.host, args.port);
    println!("  {}   {}", "Database".green(), db_path.display());
    println!();
    println!("  {}", "Ctrl+C to stop".dimmed());
    println!();

    expboard_web::run_server(pool, &args.host, args.port).await?;

    Ok(())
}
