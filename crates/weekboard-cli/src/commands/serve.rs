use std::sync::Arc;

use anyhow::Result;
use weekboard_core::planner::Planner;
use weekboard_core::repository::SqliteRepository;

use crate::cli::ServeCommand;
use crate::config::Config;
use crate::server;

pub async fn serve(planner: Planner<SqliteRepository>, command: ServeCommand, config: &Config) -> Result<()> {
    let bind = command.bind.unwrap_or_else(|| config.server.bind.clone());
    server::serve(Arc::new(planner), &bind).await
}
