//! Business logic for clientes and enderecos.
//!
//! # Services
//!
//! - `clientes` - CRUD plus uniqueness checks on email, CPF and telefone
//! - `enderecos` - Addresses scoped to their owning cliente
//!
//! Both services validate a form before touching a repository; an invalid
//! form never reaches storage.

pub mod clientes;
pub mod enderecos;

pub use clientes::ClienteService;
pub use enderecos::EnderecoService;

use thiserror::Error;

use cadastro_core::ValidationMessageError;

use crate::db::RepositoryError;

/// Errors returned by the service layer.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The submitted form violates one or more field constraints.
    #[error(transparent)]
    Validation(#[from] ValidationMessageError),

    /// The cliente or endereco does not exist (or is owned by another cliente).
    #[error("not found")]
    NotFound,

    /// A unique field is already taken by another cliente.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Storage failed.
    #[error("repository error: {0}")]
    Repository(RepositoryError),
}

impl From<RepositoryError> for ServiceError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => Self::NotFound,
            RepositoryError::Conflict(message) => Self::Conflict(message),
            other => Self::Repository(other),
        }
    }
}
