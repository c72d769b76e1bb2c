//! CLI subcommands.

pub mod migrate;
pub mod seed;

use cadastro_server::config::{ConfigError, ServerConfig};
use cadastro_server::db;
use sqlx::PgPool;
use thiserror::Error;

/// Pool size for one-shot commands.
const CLI_MAX_CONNECTIONS: u32 = 2;

/// Errors shared by commands that need the database.
#[derive(Debug, Error)]
pub enum DatabaseSetupError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Neither `CADASTRO_DATABASE_URL` nor `DATABASE_URL` is set.
    #[error("Missing environment variable: CADASTRO_DATABASE_URL")]
    MissingDatabaseUrl,

    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Load the server configuration and connect to its database.
pub async fn connect() -> Result<(ServerConfig, PgPool), DatabaseSetupError> {
    let config = ServerConfig::from_env()?;
    let database_url = config
        .database_url
        .as_ref()
        .ok_or(DatabaseSetupError::MissingDatabaseUrl)?;

    tracing::info!("Connecting to database...");
    let pool = db::create_pool(database_url, CLI_MAX_CONNECTIONS).await?;
    Ok((config, pool))
}
