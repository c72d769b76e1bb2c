//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! cadastro-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `CADASTRO_DATABASE_URL` - `PostgreSQL` connection string (falls back to
//!   `DATABASE_URL`)
//!
//! # Migration Files
//!
//! Migrations live in `crates/server/migrations/` and are embedded at compile
//! time:
//! ```text
//! migrations/
//! ├── 20261018000001_create_cliente.sql
//! └── 20261018000002_create_endereco.sql
//! ```

use thiserror::Error;

use super::{DatabaseSetupError, connect};

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error(transparent)]
    Setup(#[from] DatabaseSetupError),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Apply every pending migration.
///
/// # Errors
///
/// Returns `MigrationError` if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), MigrationError> {
    let (_, pool) = connect().await?;

    tracing::info!("Running migrations...");
    sqlx::migrate!("../server/migrations").run(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
