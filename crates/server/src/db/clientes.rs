//! `PostgreSQL` repository for clientes.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;

use cadastro_core::{Cliente, ClienteId, Cpf, Email, Endereco, NovoCliente, Telefone};

use super::enderecos::{select_all, select_by_cliente};
use super::{ClienteRepository, RepositoryError, conflict_or_database};

const CLIENTE_COLUMNS: &str = "id, nome, email, cpf, data_nascimento, telefone";

#[derive(Debug, sqlx::FromRow)]
struct ClienteRow {
    id: ClienteId,
    nome: String,
    email: Email,
    cpf: Cpf,
    data_nascimento: NaiveDate,
    telefone: Option<Telefone>,
}

impl ClienteRow {
    fn into_cliente(self, enderecos: Vec<Endereco>) -> Cliente {
        Cliente {
            id: self.id,
            nome: self.nome,
            email: self.email,
            cpf: self.cpf,
            data_nascimento: self.data_nascimento,
            telefone: self.telefone,
            enderecos,
        }
    }
}

/// Repository for cliente database operations.
#[derive(Clone)]
pub struct PgClienteRepository {
    pool: PgPool,
}

impl PgClienteRepository {
    /// Create a new cliente repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Attach enderecos to a fetched row.
    async fn with_enderecos(
        &self,
        row: Option<ClienteRow>,
    ) -> Result<Option<Cliente>, RepositoryError> {
        match row {
            Some(r) => {
                let enderecos = select_by_cliente(&self.pool, r.id).await?;
                Ok(Some(r.into_cliente(enderecos)))
            }
            None => Ok(None),
        }
    }

    /// Fetch at most one cliente whose unique text `column` equals `value`.
    async fn find_one_by(
        &self,
        column: &'static str,
        value: &str,
    ) -> Result<Option<Cliente>, RepositoryError> {
        let row = sqlx::query_as::<_, ClienteRow>(&format!(
            "SELECT {CLIENTE_COLUMNS} FROM cliente WHERE {column} = $1"
        ))
        .bind(value)
        .fetch_optional(&self.pool)
        .await?;

        self.with_enderecos(row).await
    }
}

#[async_trait]
impl ClienteRepository for PgClienteRepository {
    async fn find_all(&self) -> Result<Vec<Cliente>, RepositoryError> {
        let rows = sqlx::query_as::<_, ClienteRow>(&format!(
            "SELECT {CLIENTE_COLUMNS} FROM cliente ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await?;

        let mut by_cliente: HashMap<ClienteId, Vec<Endereco>> = HashMap::new();
        for endereco in select_all(&self.pool).await? {
            by_cliente.entry(endereco.cliente_id).or_default().push(endereco);
        }

        Ok(rows
            .into_iter()
            .map(|r| {
                let enderecos = by_cliente.remove(&r.id).unwrap_or_default();
                r.into_cliente(enderecos)
            })
            .collect())
    }

    async fn find_by_id(&self, id: ClienteId) -> Result<Option<Cliente>, RepositoryError> {
        let row = sqlx::query_as::<_, ClienteRow>(&format!(
            "SELECT {CLIENTE_COLUMNS} FROM cliente WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        self.with_enderecos(row).await
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<Cliente>, RepositoryError> {
        self.find_one_by("email", email.as_str()).await
    }

    async fn find_by_cpf(&self, cpf: &Cpf) -> Result<Option<Cliente>, RepositoryError> {
        self.find_one_by("cpf", cpf.as_str()).await
    }

    async fn find_by_telefone(
        &self,
        telefone: &Telefone,
    ) -> Result<Option<Cliente>, RepositoryError> {
        self.find_one_by("telefone", telefone.as_str()).await
    }

    async fn insert(&self, cliente: &NovoCliente) -> Result<Cliente, RepositoryError> {
        let row = sqlx::query_as::<_, ClienteRow>(&format!(
            r"
            INSERT INTO cliente (nome, email, cpf, data_nascimento, telefone)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {CLIENTE_COLUMNS}
            "
        ))
        .bind(&cliente.nome)
        .bind(&cliente.email)
        .bind(&cliente.cpf)
        .bind(cliente.data_nascimento)
        .bind(&cliente.telefone)
        .fetch_one(&self.pool)
        .await
        .map_err(conflict_or_database)?;

        Ok(row.into_cliente(Vec::new()))
    }

    async fn update(
        &self,
        id: ClienteId,
        cliente: &NovoCliente,
    ) -> Result<Cliente, RepositoryError> {
        let row = sqlx::query_as::<_, ClienteRow>(&format!(
            r"
            UPDATE cliente
            SET nome = $1, email = $2, cpf = $3, data_nascimento = $4, telefone = $5,
                updated_at = NOW()
            WHERE id = $6
            RETURNING {CLIENTE_COLUMNS}
            "
        ))
        .bind(&cliente.nome)
        .bind(&cliente.email)
        .bind(&cliente.cpf)
        .bind(cliente.data_nascimento)
        .bind(&cliente.telefone)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(conflict_or_database)?
        .ok_or(RepositoryError::NotFound)?;

        let enderecos = select_by_cliente(&self.pool, row.id).await?;
        Ok(row.into_cliente(enderecos))
    }

    async fn delete_by_id(&self, id: ClienteId) -> Result<bool, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        // ON DELETE CASCADE covers this too; deleting explicitly keeps the
        // behavior independent of how the schema was created
        sqlx::query("DELETE FROM endereco WHERE cliente_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM cliente WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
