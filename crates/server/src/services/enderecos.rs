//! Endereco service.
//!
//! Every operation reachable over HTTP is scoped to a cliente: an endereco
//! owned by a different cliente is reported as not found.

use std::sync::Arc;

use tracing::instrument;

use cadastro_core::{ClienteId, Endereco, EnderecoForm, EnderecoId, Validate};

use super::ServiceError;
use crate::db::{ClienteRepository, EnderecoRepository};

/// Validating front for an [`EnderecoRepository`], with owner checks.
#[derive(Clone)]
pub struct EnderecoService {
    clientes: Arc<dyn ClienteRepository>,
    enderecos: Arc<dyn EnderecoRepository>,
}

impl EnderecoService {
    /// Create a new endereco service.
    #[must_use]
    pub fn new(
        clientes: Arc<dyn ClienteRepository>,
        enderecos: Arc<dyn EnderecoRepository>,
    ) -> Self {
        Self {
            clientes,
            enderecos,
        }
    }

    /// Every endereco of every cliente, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Repository` if storage fails.
    #[instrument(skip(self))]
    pub async fn list_all(&self) -> Result<Vec<Endereco>, ServiceError> {
        Ok(self.enderecos.find_all().await?)
    }

    /// Look up an endereco regardless of its owner.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Repository` if storage fails.
    #[instrument(skip(self), fields(endereco_id = %id))]
    pub async fn find_by_id(&self, id: EnderecoId) -> Result<Option<Endereco>, ServiceError> {
        Ok(self.enderecos.find_by_id(id).await?)
    }

    /// The enderecos of one cliente, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if the cliente doesn't exist.
    #[instrument(skip(self), fields(cliente_id = %cliente_id))]
    pub async fn list_for_cliente(
        &self,
        cliente_id: ClienteId,
    ) -> Result<Vec<Endereco>, ServiceError> {
        self.require_cliente(cliente_id).await?;
        Ok(self.enderecos.find_by_cliente(cliente_id).await?)
    }

    /// One endereco of one cliente.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if the cliente or the endereco doesn't
    /// exist, or the endereco belongs to another cliente.
    #[instrument(skip(self), fields(cliente_id = %cliente_id, endereco_id = %endereco_id))]
    pub async fn find_for_cliente(
        &self,
        cliente_id: ClienteId,
        endereco_id: EnderecoId,
    ) -> Result<Endereco, ServiceError> {
        self.require_cliente(cliente_id).await?;
        self.owned_endereco(cliente_id, endereco_id).await
    }

    /// Validate an endereco and append it to a cliente's collection.
    ///
    /// Validation runs before the owner lookup, so an invalid body for a
    /// missing cliente reports the violations.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation` listing every violated constraint,
    /// `ServiceError::NotFound` if the cliente doesn't exist, or
    /// `ServiceError::Repository` if storage fails.
    #[instrument(skip(self, form), fields(cliente_id = %cliente_id))]
    pub async fn save(
        &self,
        cliente_id: ClienteId,
        form: &EnderecoForm,
    ) -> Result<Endereco, ServiceError> {
        let novo = form.validate()?;
        let endereco = self.enderecos.insert_for_cliente(cliente_id, &novo).await?;
        tracing::info!(endereco_id = %endereco.id, "Endereco created");
        Ok(endereco)
    }

    /// Remove one endereco of one cliente.
    ///
    /// Nothing is deleted unless the cliente exists and owns the endereco.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if the cliente or the endereco doesn't
    /// exist, or the endereco belongs to another cliente.
    #[instrument(skip(self), fields(cliente_id = %cliente_id, endereco_id = %endereco_id))]
    pub async fn delete(
        &self,
        cliente_id: ClienteId,
        endereco_id: EnderecoId,
    ) -> Result<(), ServiceError> {
        self.require_cliente(cliente_id).await?;
        self.owned_endereco(cliente_id, endereco_id).await?;
        self.delete_by_id(endereco_id).await
    }

    /// Remove an endereco regardless of its owner.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if the endereco doesn't exist.
    pub async fn delete_by_id(&self, id: EnderecoId) -> Result<(), ServiceError> {
        if !self.enderecos.delete_by_id(id).await? {
            return Err(ServiceError::NotFound);
        }
        tracing::info!(endereco_id = %id, "Endereco deleted");
        Ok(())
    }

    async fn require_cliente(&self, cliente_id: ClienteId) -> Result<(), ServiceError> {
        match self.clientes.find_by_id(cliente_id).await? {
            Some(_) => Ok(()),
            None => Err(ServiceError::NotFound),
        }
    }

    async fn owned_endereco(
        &self,
        cliente_id: ClienteId,
        endereco_id: EnderecoId,
    ) -> Result<Endereco, ServiceError> {
        self.enderecos
            .find_by_id(endereco_id)
            .await?
            .filter(|e| e.belongs_to(cliente_id))
            .ok_or(ServiceError::NotFound)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::services::ClienteService;
    use cadastro_core::{Cliente, ClienteForm};
    use chrono::NaiveDate;

    fn services() -> (ClienteService, EnderecoService) {
        let store = Arc::new(MemoryStore::new());
        (
            ClienteService::new(store.clone()),
            EnderecoService::new(store.clone(), store),
        )
    }

    async fn cliente(service: &ClienteService, n: u8) -> Cliente {
        service
            .save(&ClienteForm {
                nome: Some(format!("Cliente {n}")),
                email: Some(format!("cliente{n}@mail.com")),
                cpf: Some(format!("{n:03}.456.789-10")),
                data_nascimento: NaiveDate::from_ymd_opt(1980, 3, 4),
                telefone: None,
            })
            .await
            .unwrap()
    }

    fn rua(nome: &str) -> EnderecoForm {
        EnderecoForm {
            rua: Some(nome.to_owned()),
            numero: Some("45".to_owned()),
            bairro: Some("Savassi".to_owned()),
            cidade: Some("Belo Horizonte".to_owned()),
            estado: Some("MG".to_owned()),
            cep: Some("30140-071".to_owned()),
        }
    }

    #[tokio::test]
    async fn test_save_and_list_for_cliente() {
        let (clientes, enderecos) = services();
        let ana = cliente(&clientes, 1).await;

        let created = enderecos.save(ana.id, &rua("Rua J")).await.unwrap();
        assert!(created.belongs_to(ana.id));

        let listed = enderecos.list_for_cliente(ana.id).await.unwrap();
        assert_eq!(listed, vec![created]);
    }

    #[tokio::test]
    async fn test_save_for_missing_cliente() {
        let (_, enderecos) = services();
        let err = enderecos
            .save(ClienteId::new(99), &rua("Rua J"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound));
        assert!(enderecos.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_save_invalid_endereco() {
        let (clientes, enderecos) = services();
        let ana = cliente(&clientes, 1).await;

        let form = EnderecoForm {
            rua: Some("  ".to_owned()),
            ..rua("Rua J")
        };
        let err = enderecos.save(ana.id, &form).await.unwrap_err();
        match err {
            ServiceError::Validation(v) => assert!(v.has_message("Rua é obrigatória")),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_list_for_missing_cliente() {
        let (_, enderecos) = services();
        let err = enderecos.list_for_cliente(ClienteId::new(1)).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound));
    }

    #[tokio::test]
    async fn test_find_for_other_cliente_is_not_found() {
        let (clientes, enderecos) = services();
        let ana = cliente(&clientes, 1).await;
        let bia = cliente(&clientes, 2).await;
        let endereco = enderecos.save(ana.id, &rua("Rua J")).await.unwrap();

        let err = enderecos
            .find_for_cliente(bia.id, endereco.id)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound));
        assert_eq!(
            enderecos.find_for_cliente(ana.id, endereco.id).await.unwrap(),
            endereco
        );
    }

    #[tokio::test]
    async fn test_delete_for_other_cliente_keeps_endereco() {
        let (clientes, enderecos) = services();
        let ana = cliente(&clientes, 1).await;
        let bia = cliente(&clientes, 2).await;
        let endereco = enderecos.save(ana.id, &rua("Rua J")).await.unwrap();

        let err = enderecos.delete(bia.id, endereco.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound));
        assert!(enderecos.find_by_id(endereco.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_delete_for_missing_cliente_has_no_side_effects() {
        let (clientes, enderecos) = services();
        let ana = cliente(&clientes, 1).await;
        let endereco = enderecos.save(ana.id, &rua("Rua J")).await.unwrap();

        let err = enderecos
            .delete(ClienteId::new(42), endereco.id)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound));
        assert_eq!(enderecos.list_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_owned_endereco() {
        let (clientes, enderecos) = services();
        let ana = cliente(&clientes, 1).await;
        let endereco = enderecos.save(ana.id, &rua("Rua J")).await.unwrap();

        enderecos.delete(ana.id, endereco.id).await.unwrap();
        assert!(enderecos.list_for_cliente(ana.id).await.unwrap().is_empty());
        assert!(matches!(
            enderecos.delete_by_id(endereco.id).await.unwrap_err(),
            ServiceError::NotFound
        ));
    }

    #[tokio::test]
    async fn test_deleting_cliente_removes_enderecos() {
        let (clientes, enderecos) = services();
        let ana = cliente(&clientes, 1).await;
        enderecos.save(ana.id, &rua("Rua J")).await.unwrap();
        enderecos.save(ana.id, &rua("Rua K")).await.unwrap();

        clientes.delete_by_id(ana.id).await.unwrap();
        assert!(enderecos.list_all().await.unwrap().is_empty());
    }
}
