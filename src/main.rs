//! naslink: hand out unguessable download links for files on a NAS, and
//! stop serving them the moment the file changes.

mod commands;
mod error;

use crate::error::Result;
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "naslink", version, about, long_about = None)]
struct Cli {
    /// Log more. Repeat for more detail (-v, -vv, -vvv). `RUST_LOG` wins.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Config file to use instead of the default `naslink.toml`.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve naslinks over HTTP (default 0.0.0.0:8080). A single argument is the port.
    Serve {
        #[arg(num_args = 0..=2, value_name = "[HOST] PORT")]
        endpoint: Vec<String>,
    },
    /// Create a naslink for each file, replacing any it already has.
    Add {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Remove the naslink of each file.
    #[command(alias = "rm")]
    Delete {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Show every naslink.
    #[command(alias = "ls")]
    List,
    /// Remove every naslink whose file was changed or removed.
    Clean {
        /// Report what would be removed without removing anything.
        #[arg(long)]
        dry_run: bool,
    },
}

impl Command {
    /// The server logs every request at info; the one-shot commands only
    /// need to mention problems.
    fn default_level(&self, verbose: u8) -> &'static str {
        let base = match self {
            Self::Serve { .. } => 1,
            _ => 0,
        };
        match verbose.saturating_add(base) {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.command.default_level(cli.verbose)));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{e:?}");
            if e.is_retryable() {
                tracing::warn!("This may be temporary; try again shortly");
            }
            ExitCode::FAILURE
        },
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let config = commands::load_config(cli.config.as_deref())?;
    let (db, code) = match cli.command {
        Command::Serve { endpoint } => {
            // Checked before touching the database so a typo doesn't create one.
            let (host, port) = commands::listen_on(&endpoint, &config.server)?;
            let db = commands::open_database(&config).await?;
            commands::serve(commands::naslinks(&db, false), &host, port).await?;
            (db, ExitCode::SUCCESS)
        },
        Command::Add { paths } => {
            let db = commands::open_database(&config).await?;
            let failed = commands::add(&commands::naslinks(&db, false), &paths).await;
            (db, exit_code(failed))
        },
        Command::Delete { paths } => {
            let db = commands::open_database(&config).await?;
            let failed = commands::delete(&commands::naslinks(&db, false), &paths).await;
            (db, exit_code(failed))
        },
        Command::List => {
            let db = commands::open_database(&config).await?;
            commands::list(&commands::naslinks(&db, false)).await?;
            (db, ExitCode::SUCCESS)
        },
        Command::Clean { dry_run } => {
            let db = commands::open_database(&config).await?;
            commands::clean(&commands::naslinks(&db, dry_run)).await?;
            (db, ExitCode::SUCCESS)
        },
    };
    db.close().await;
    Ok(code)
}

fn exit_code(failed: usize) -> ExitCode {
    if failed == 0 { ExitCode::SUCCESS } else { ExitCode::FAILURE }
}
