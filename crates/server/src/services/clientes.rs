//! Cliente service.

use std::sync::Arc;

use tracing::instrument;

use cadastro_core::{Cliente, ClienteForm, ClienteId, NovoCliente, Validate};

use super::ServiceError;
use crate::db::ClienteRepository;

/// Validating front for a [`ClienteRepository`].
#[derive(Clone)]
pub struct ClienteService {
    repo: Arc<dyn ClienteRepository>,
}

impl ClienteService {
    /// Create a new cliente service.
    #[must_use]
    pub fn new(repo: Arc<dyn ClienteRepository>) -> Self {
        Self { repo }
    }

    /// All clientes with their enderecos, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Repository` if storage fails.
    #[instrument(skip(self))]
    pub async fn list_all(&self) -> Result<Vec<Cliente>, ServiceError> {
        Ok(self.repo.find_all().await?)
    }

    /// # Errors
    ///
    /// Returns `ServiceError::Repository` if storage fails.
    #[instrument(skip(self), fields(cliente_id = %id))]
    pub async fn find_by_id(&self, id: ClienteId) -> Result<Option<Cliente>, ServiceError> {
        Ok(self.repo.find_by_id(id).await?)
    }

    /// Validate and insert a new cliente.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation` listing every violated constraint,
    /// `ServiceError::Conflict` if email, CPF or telefone is already
    /// registered, or `ServiceError::Repository` if storage fails.
    #[instrument(skip(self, form))]
    pub async fn save(&self, form: &ClienteForm) -> Result<Cliente, ServiceError> {
        let novo = form.validate()?;
        self.ensure_unique(&novo, None).await?;

        let cliente = self.repo.insert(&novo).await?;
        tracing::info!(cliente_id = %cliente.id, "Cliente created");
        Ok(cliente)
    }

    /// Validate and overwrite an existing cliente's fields.
    ///
    /// Validation runs first, so an invalid body for a missing cliente
    /// reports the violations rather than not-found.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation`, `ServiceError::NotFound`,
    /// `ServiceError::Conflict` or `ServiceError::Repository`.
    #[instrument(skip(self, form), fields(cliente_id = %id))]
    pub async fn update(&self, id: ClienteId, form: &ClienteForm) -> Result<Cliente, ServiceError> {
        let novo = form.validate()?;
        if self.repo.find_by_id(id).await?.is_none() {
            return Err(ServiceError::NotFound);
        }
        self.ensure_unique(&novo, Some(id)).await?;

        let cliente = self.repo.update(id, &novo).await?;
        tracing::info!(cliente_id = %cliente.id, "Cliente updated");
        Ok(cliente)
    }

    /// Delete a cliente together with its enderecos.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if the cliente doesn't exist or
    /// `ServiceError::Repository` if storage fails.
    #[instrument(skip(self), fields(cliente_id = %id))]
    pub async fn delete_by_id(&self, id: ClienteId) -> Result<(), ServiceError> {
        if !self.repo.delete_by_id(id).await? {
            return Err(ServiceError::NotFound);
        }
        tracing::info!("Cliente deleted");
        Ok(())
    }

    /// Whether the storage backend answers.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Repository` if the backend is unreachable.
    pub async fn ping(&self) -> Result<(), ServiceError> {
        Ok(self.repo.ping().await?)
    }

    /// Reject a cliente whose email, CPF or telefone belongs to someone else.
    ///
    /// The database constraints enforce the same rule; checking first gives
    /// a readable message without relying on constraint names.
    async fn ensure_unique(
        &self,
        novo: &NovoCliente,
        except: Option<ClienteId>,
    ) -> Result<(), ServiceError> {
        let taken_by_other = |found: Option<Cliente>| found.is_some_and(|c| Some(c.id) != except);

        if taken_by_other(self.repo.find_by_email(&novo.email).await?) {
            return Err(ServiceError::Conflict("Email já cadastrado".to_owned()));
        }
        if taken_by_other(self.repo.find_by_cpf(&novo.cpf).await?) {
            return Err(ServiceError::Conflict("CPF já cadastrado".to_owned()));
        }
        if let Some(telefone) = &novo.telefone
            && taken_by_other(self.repo.find_by_telefone(telefone).await?)
        {
            return Err(ServiceError::Conflict("Telefone já cadastrado".to_owned()));
        }
        Ok(())
    }
}
