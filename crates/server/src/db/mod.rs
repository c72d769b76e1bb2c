//! Persistence for clientes and enderecos.
//!
//! # Tables
//!
//! - `cliente` - Customers; `email`, `cpf` and `telefone` are unique
//! - `endereco` - Addresses; `cliente_id` references `cliente(id)` with
//!   `ON DELETE CASCADE`
//!
//! # Backends
//!
//! Handlers only see the [`ClienteRepository`] and [`EnderecoRepository`]
//! traits. [`PgClienteRepository`]/[`PgEnderecoRepository`] talk to
//! `PostgreSQL`; [`MemoryStore`] implements both traits in process and backs the
//! server when no database URL is configured, as well as the HTTP tests.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p cadastro-cli -- migrate
//! ```

pub mod clientes;
pub mod enderecos;
pub mod memory;

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use cadastro_core::{
    Cliente, ClienteId, Cpf, Email, Endereco, EnderecoId, NovoCliente, NovoEndereco, Telefone,
};

pub use clientes::PgClienteRepository;
pub use enderecos::PgEnderecoRepository;
pub use memory::MemoryStore;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Requested entity (or the cliente owning it) was not found.
    #[error("not found")]
    NotFound,

    /// Unique constraint violation (e.g., duplicate CPF).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Storage for clientes, including lookups on each unique field.
///
/// Every `Cliente` returned carries its enderecos, ordered by id.
#[async_trait]
pub trait ClienteRepository: Send + Sync {
    /// All clientes, ordered by id.
    async fn find_all(&self) -> Result<Vec<Cliente>, RepositoryError>;

    async fn find_by_id(&self, id: ClienteId) -> Result<Option<Cliente>, RepositoryError>;

    async fn find_by_email(&self, email: &Email) -> Result<Option<Cliente>, RepositoryError>;

    async fn find_by_cpf(&self, cpf: &Cpf) -> Result<Option<Cliente>, RepositoryError>;

    async fn find_by_telefone(
        &self,
        telefone: &Telefone,
    ) -> Result<Option<Cliente>, RepositoryError>;

    /// Insert a new cliente with no enderecos.
    ///
    /// Returns `RepositoryError::Conflict` if a unique field is taken.
    async fn insert(&self, cliente: &NovoCliente) -> Result<Cliente, RepositoryError>;

    /// Overwrite a cliente's fields, leaving its enderecos untouched.
    ///
    /// Returns `RepositoryError::NotFound` if the cliente doesn't exist and
    /// `RepositoryError::Conflict` if a unique field is taken.
    async fn update(&self, id: ClienteId, cliente: &NovoCliente)
    -> Result<Cliente, RepositoryError>;

    /// Delete a cliente and, in the same transaction, all of its enderecos.
    ///
    /// Returns `true` if the cliente existed.
    async fn delete_by_id(&self, id: ClienteId) -> Result<bool, RepositoryError>;

    /// Cheap round trip used by the readiness probe.
    async fn ping(&self) -> Result<(), RepositoryError>;
}

/// Storage for enderecos.
#[async_trait]
pub trait EnderecoRepository: Send + Sync {
    /// All enderecos of every cliente, ordered by id.
    async fn find_all(&self) -> Result<Vec<Endereco>, RepositoryError>;

    async fn find_by_id(&self, id: EnderecoId) -> Result<Option<Endereco>, RepositoryError>;

    /// Enderecos owned by one cliente, ordered by id. Empty both when the
    /// cliente has none and when it doesn't exist.
    async fn find_by_cliente(&self, cliente_id: ClienteId)
    -> Result<Vec<Endereco>, RepositoryError>;

    /// Append an endereco to a cliente's collection.
    ///
    /// The owner is locked and checked in the same transaction as the insert.
    /// Returns `RepositoryError::NotFound` if the cliente doesn't exist.
    async fn insert_for_cliente(
        &self,
        cliente_id: ClienteId,
        endereco: &NovoEndereco,
    ) -> Result<Endereco, RepositoryError>;

    /// Returns `true` if the endereco existed.
    async fn delete_by_id(&self, id: EnderecoId) -> Result<bool, RepositoryError>;
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
/// * `max_connections` - Upper bound on pooled connections
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(
    database_url: &secrecy::SecretString,
    max_connections: u32,
) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Map unique violations to `Conflict`, naming the field the constraint guards.
pub(crate) fn conflict_or_database(e: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        let message = match db_err.constraint() {
            Some("cliente_email_key") => "Email já cadastrado",
            Some("cliente_cpf_key") => "CPF já cadastrado",
            Some("cliente_telefone_key") => "Telefone já cadastrado",
            _ => "Registro duplicado",
        };
        return RepositoryError::Conflict(message.to_owned());
    }
    RepositoryError::Database(e)
}
