//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::ServerConfig;
use crate::db::{
    ClienteRepository, EnderecoRepository, MemoryStore, PgClienteRepository, PgEnderecoRepository,
};
use crate::services::{ClienteService, EnderecoService};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and hands out the services,
/// which in turn own the repositories.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ServerConfig,
    clientes: ClienteService,
    enderecos: EnderecoService,
}

impl AppState {
    /// Create application state over arbitrary repository implementations.
    #[must_use]
    pub fn new(
        config: ServerConfig,
        clientes: Arc<dyn ClienteRepository>,
        enderecos: Arc<dyn EnderecoRepository>,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                enderecos: EnderecoService::new(clientes.clone(), enderecos),
                clientes: ClienteService::new(clientes),
            }),
        }
    }

    /// Application state backed by `PostgreSQL`.
    #[must_use]
    pub fn postgres(config: ServerConfig, pool: PgPool) -> Self {
        Self::new(
            config,
            Arc::new(PgClienteRepository::new(pool.clone())),
            Arc::new(PgEnderecoRepository::new(pool)),
        )
    }

    /// Application state backed by an in-process [`MemoryStore`].
    #[must_use]
    pub fn memory(config: ServerConfig) -> Self {
        let store = Arc::new(MemoryStore::new());
        Self::new(config, store.clone(), store)
    }

    /// Get a reference to the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn clientes(&self) -> &ClienteService {
        &self.inner.clientes
    }

    #[must_use]
    pub fn enderecos(&self) -> &EnderecoService {
        &self.inner.enderecos
    }
}
