//! In-process storage implementing both repository traits.
//!
//! Mirrors the `PostgreSQL` schema's guarantees: serial ids starting at 1,
//! unique `email`/`cpf`/`telefone`, and enderecos removed together with their
//! cliente. A single lock guards both tables, so the owner check and the
//! insert in [`EnderecoRepository::insert_for_cliente`] are atomic.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use cadastro_core::{
    Cliente, ClienteId, Cpf, Email, Endereco, EnderecoId, NovoCliente, NovoEndereco, Telefone,
};

use super::{ClienteRepository, EnderecoRepository, RepositoryError};

#[derive(Debug, Default)]
struct Tables {
    /// Stored without enderecos; those are attached on read.
    clientes: BTreeMap<ClienteId, Cliente>,
    enderecos: BTreeMap<EnderecoId, Endereco>,
    last_cliente_id: i32,
    last_endereco_id: i32,
}

impl Tables {
    fn with_enderecos(&self, cliente: &Cliente) -> Cliente {
        Cliente {
            enderecos: self.enderecos_of(cliente.id),
            ..cliente.clone()
        }
    }

    fn enderecos_of(&self, cliente_id: ClienteId) -> Vec<Endereco> {
        self.enderecos
            .values()
            .filter(|e| e.belongs_to(cliente_id))
            .cloned()
            .collect()
    }

    fn find_where(&self, pred: impl Fn(&Cliente) -> bool) -> Option<Cliente> {
        self.clientes
            .values()
            .find(|c| pred(c))
            .map(|c| self.with_enderecos(c))
    }

    /// Same messages as the unique-constraint mapping of the `PostgreSQL` backend.
    fn check_unique(
        &self,
        cliente: &NovoCliente,
        except: Option<ClienteId>,
    ) -> Result<(), RepositoryError> {
        for other in self.clientes.values().filter(|c| Some(c.id) != except) {
            if other.email == cliente.email {
                return Err(RepositoryError::Conflict("Email já cadastrado".to_owned()));
            }
            if other.cpf == cliente.cpf {
                return Err(RepositoryError::Conflict("CPF já cadastrado".to_owned()));
            }
            if cliente.telefone.is_some() && other.telefone == cliente.telefone {
                return Err(RepositoryError::Conflict(
                    "Telefone já cadastrado".to_owned(),
                ));
            }
        }
        Ok(())
    }
}

/// Shared in-memory store. Clones see the same data.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ClienteRepository for MemoryStore {
    async fn find_all(&self) -> Result<Vec<Cliente>, RepositoryError> {
        let tables = self.tables.read().await;
        Ok(tables
            .clientes
            .values()
            .map(|c| tables.with_enderecos(c))
            .collect())
    }

    async fn find_by_id(&self, id: ClienteId) -> Result<Option<Cliente>, RepositoryError> {
        let tables = self.tables.read().await;
        Ok(tables.clientes.get(&id).map(|c| tables.with_enderecos(c)))
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<Cliente>, RepositoryError> {
        Ok(self.tables.read().await.find_where(|c| &c.email == email))
    }

    async fn find_by_cpf(&self, cpf: &Cpf) -> Result<Option<Cliente>, RepositoryError> {
        Ok(self.tables.read().await.find_where(|c| &c.cpf == cpf))
    }

    async fn find_by_telefone(
        &self,
        telefone: &Telefone,
    ) -> Result<Option<Cliente>, RepositoryError> {
        Ok(self
            .tables
            .read()
            .await
            .find_where(|c| c.telefone.as_ref() == Some(telefone)))
    }

    async fn insert(&self, cliente: &NovoCliente) -> Result<Cliente, RepositoryError> {
        let mut tables = self.tables.write().await;
        tables.check_unique(cliente, None)?;

        tables.last_cliente_id += 1;
        let id = ClienteId::new(tables.last_cliente_id);
        let created = Cliente::from_novo(id, cliente.clone(), Vec::new());
        tables.clientes.insert(id, created.clone());

        Ok(created)
    }

    async fn update(
        &self,
        id: ClienteId,
        cliente: &NovoCliente,
    ) -> Result<Cliente, RepositoryError> {
        let mut tables = self.tables.write().await;
        if !tables.clientes.contains_key(&id) {
            return Err(RepositoryError::NotFound);
        }
        tables.check_unique(cliente, Some(id))?;

        let updated = Cliente::from_novo(id, cliente.clone(), Vec::new());
        tables.clientes.insert(id, updated.clone());

        Ok(tables.with_enderecos(&updated))
    }

    async fn delete_by_id(&self, id: ClienteId) -> Result<bool, RepositoryError> {
        let mut tables = self.tables.write().await;
        if tables.clientes.remove(&id).is_none() {
            return Ok(false);
        }
        tables.enderecos.retain(|_, e| !e.belongs_to(id));
        Ok(true)
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}

#[async_trait]
impl EnderecoRepository for MemoryStore {
    async fn find_all(&self) -> Result<Vec<Endereco>, RepositoryError> {
        Ok(self.tables.read().await.enderecos.values().cloned().collect())
    }

    async fn find_by_id(&self, id: EnderecoId) -> Result<Option<Endereco>, RepositoryError> {
        Ok(self.tables.read().await.enderecos.get(&id).cloned())
    }

    async fn find_by_cliente(
        &self,
        cliente_id: ClienteId,
    ) -> Result<Vec<Endereco>, RepositoryError> {
        Ok(self.tables.read().await.enderecos_of(cliente_id))
    }

    async fn insert_for_cliente(
        &self,
        cliente_id: ClienteId,
        endereco: &NovoEndereco,
    ) -> Result<Endereco, RepositoryError> {
        let mut tables = self.tables.write().await;
        if !tables.clientes.contains_key(&cliente_id) {
            return Err(RepositoryError::NotFound);
        }

        tables.last_endereco_id += 1;
        let id = EnderecoId::new(tables.last_endereco_id);
        let created = Endereco::from_novo(id, cliente_id, endereco.clone());
        tables.enderecos.insert(id, created.clone());

        Ok(created)
    }

    async fn delete_by_id(&self, id: EnderecoId) -> Result<bool, RepositoryError> {
        Ok(self.tables.write().await.enderecos.remove(&id).is_some())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use cadastro_core::{Cep, Estado};
    use chrono::NaiveDate;

    fn novo_cliente(email: &str, cpf: &str, telefone: Option<&str>) -> NovoCliente {
        NovoCliente {
            nome: "Ana Maria".to_owned(),
            email: Email::parse(email).unwrap(),
            cpf: Cpf::parse(cpf).unwrap(),
            data_nascimento: NaiveDate::from_ymd_opt(1990, 5, 17).unwrap(),
            telefone: telefone.map(|t| Telefone::parse(t).unwrap()),
        }
    }

    fn novo_endereco(rua: &str) -> NovoEndereco {
        NovoEndereco {
            rua: rua.to_owned(),
            numero: "10".to_owned(),
            bairro: "Centro".to_owned(),
            cidade: "Recife".to_owned(),
            estado: Estado::PE,
            cep: Cep::parse("50000-000").unwrap(),
        }
    }

    #[tokio::test]
    async fn test_insert_assigns_sequential_ids() {
        let store = MemoryStore::new();
        let a = ClienteRepository::insert(&store, &novo_cliente("a@x.com", "111.111.111-11", None))
            .await
            .unwrap();
        let b = ClienteRepository::insert(&store, &novo_cliente("b@x.com", "222.222.222-22", None))
            .await
            .unwrap();
        assert_eq!(a.id.as_i32(), 1);
        assert_eq!(b.id.as_i32(), 2);
    }

    #[tokio::test]
    async fn test_insert_rejects_duplicate_cpf() {
        let store = MemoryStore::new();
        ClienteRepository::insert(&store, &novo_cliente("a@x.com", "111.111.111-11", None))
            .await
            .unwrap();
        let err = ClienteRepository::insert(&store, &novo_cliente("b@x.com", "111.111.111-11", None))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(ref m) if m == "CPF já cadastrado"));
    }

    #[tokio::test]
    async fn test_missing_telefone_is_not_a_duplicate() {
        let store = MemoryStore::new();
        ClienteRepository::insert(&store, &novo_cliente("a@x.com", "111.111.111-11", None))
            .await
            .unwrap();
        ClienteRepository::insert(&store, &novo_cliente("b@x.com", "222.222.222-22", None))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_update_may_keep_own_unique_fields() {
        let store = MemoryStore::new();
        let novo = novo_cliente("a@x.com", "111.111.111-11", Some("(81) 91234-5678"));
        let created = ClienteRepository::insert(&store, &novo).await.unwrap();

        let renamed = NovoCliente {
            nome: "Ana Maria Souza".to_owned(),
            ..novo
        };
        let updated = store.update(created.id, &renamed).await.unwrap();
        assert_eq!(updated.nome, "Ana Maria Souza");
    }

    #[tokio::test]
    async fn test_update_missing_cliente() {
        let store = MemoryStore::new();
        let err = store
            .update(
                ClienteId::new(42),
                &novo_cliente("a@x.com", "111.111.111-11", None),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound));
    }

    #[tokio::test]
    async fn test_insert_endereco_requires_owner() {
        let store = MemoryStore::new();
        let err = store
            .insert_for_cliente(ClienteId::new(1), &novo_endereco("Rua A"))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound));
        assert!(EnderecoRepository::find_all(&store).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_cliente_carries_enderecos_in_id_order() {
        let store = MemoryStore::new();
        let cliente =
            ClienteRepository::insert(&store, &novo_cliente("a@x.com", "111.111.111-11", None))
                .await
                .unwrap();
        store
            .insert_for_cliente(cliente.id, &novo_endereco("Rua A"))
            .await
            .unwrap();
        store
            .insert_for_cliente(cliente.id, &novo_endereco("Rua B"))
            .await
            .unwrap();

        let found = ClienteRepository::find_by_id(&store, cliente.id)
            .await
            .unwrap()
            .unwrap();
        let ruas: Vec<_> = found.enderecos.iter().map(|e| e.rua.as_str()).collect();
        assert_eq!(ruas, ["Rua A", "Rua B"]);
    }

    #[tokio::test]
    async fn test_delete_cliente_cascades() {
        let store = MemoryStore::new();
        let cliente =
            ClienteRepository::insert(&store, &novo_cliente("a@x.com", "111.111.111-11", None))
                .await
                .unwrap();
        let endereco = store
            .insert_for_cliente(cliente.id, &novo_endereco("Rua A"))
            .await
            .unwrap();

        assert!(ClienteRepository::delete_by_id(&store, cliente.id).await.unwrap());
        assert!(EnderecoRepository::find_by_id(&store, endereco.id)
            .await
            .unwrap()
            .is_none());
        assert!(!ClienteRepository::delete_by_id(&store, cliente.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_clones_share_data() {
        let store = MemoryStore::new();
        let clone = store.clone();
        ClienteRepository::insert(&store, &novo_cliente("a@x.com", "111.111.111-11", None))
            .await
            .unwrap();
        assert_eq!(ClienteRepository::find_all(&clone).await.unwrap().len(), 1);
    }
}
