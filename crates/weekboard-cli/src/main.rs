use clap::Parser;
use owo_colors::{OwoColorize, Style};
use tracing_subscriber::EnvFilter;
use weekboard_core::db;
use weekboard_core::error::CoreError;
use weekboard_core::planner::Planner;
use weekboard_core::repository::SqliteRepository;

mod cli;
mod commands;
mod config;
mod parser;
mod server;
mod util;
mod views;

use cli::Commands;

/// Logs go to stderr so `--json` output stays clean. `WEEKBOARD_LOG` wins
/// over `RUST_LOG`, which wins over the configured level.
fn init_tracing(config: &config::Config, serving: bool) {
    let fallback = config
        .log_level
        .clone()
        .unwrap_or_else(|| if serving { "info,sqlx=warn" } else { "warn" }.to_string());

    let filter = EnvFilter::try_from_env("WEEKBOARD_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = cli::Cli::parse();

    let (mut config, config_error) = match config::Config::new() {
        Ok(config) => (config, None),
        Err(e) => (config::Config::default(), Some(e)),
    };
    init_tracing(&config, matches!(cli.command, Commands::Serve(_)));
    if let Some(e) = config_error {
        tracing::warn!(error = %e, "ignoring invalid configuration, using defaults");
    }
    if let Some(db_path) = cli.db {
        config.database_path = db_path;
    }

    let db_pool = match db::establish_connection(&config.database_path).await {
        Ok(pool) => pool,
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);
            std::process::exit(1);
        }
    };
    let planner = Planner::new(SqliteRepository::new(db_pool), config.planner_config());

    let result = match cli.command {
        Commands::Category(command) => commands::category::category_command(&planner, command).await,
        Commands::Week(command) => commands::week::week_command(&planner, command).await,
        Commands::View(command) => commands::view::view_week(&planner, command).await,
        Commands::Todo(command) => commands::todo::todo_command(&planner, command).await,
        Commands::Tag(command) => commands::tag::tag_command(&planner, command).await,
        Commands::Note(command) => commands::note::note_command(&planner, command).await,
        Commands::Reflect(command) => commands::reflect::reflect_command(&planner, command).await,
        Commands::Stats(selector) => commands::stats::show_stats(&planner, selector).await,
        Commands::Serve(command) => commands::serve::serve(planner, command, &config).await,
    };

    if let Err(e) = result {
        handle_error(e);
        std::process::exit(1);
    }
}

fn handle_error(err: anyhow::Error) {
    let error_style = Style::new().red().bold();

    match err.downcast_ref::<CoreError>() {
        Some(CoreError::NotFound(s)) => {
            eprintln!("{} {}", "Error:".style(error_style), s);
        }
        Some(CoreError::AmbiguousId(matches)) => {
            eprintln!("{}", "Error: Ambiguous ID.".style(error_style));
            eprintln!("Did you mean one of these?");
            for (id, label) in matches {
                eprintln!("  {} ({})", id.yellow(), label);
            }
        }
        Some(CoreError::InvalidInput(s)) => {
            eprintln!("{} Invalid input: {}", "Error:".style(error_style), s);
        }
        Some(CoreError::Forbidden(s)) => {
            eprintln!("{} {}", "Error:".style(error_style), s);
        }
        Some(CoreError::ReadOnly(s)) => {
            eprintln!("{} {}", "Error:".style(error_style), s.yellow());
        }
        Some(core_error @ (CoreError::Database(_) | CoreError::Migration(_))) => {
            tracing::debug!(error = ?core_error, "storage failure");
            eprintln!("{} {}", "Error:".style(error_style), core_error);
        }
        _ => eprintln!("{} {:#}", "Error:".style(error_style), err),
    }
}
