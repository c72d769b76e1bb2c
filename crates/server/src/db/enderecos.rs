//! `PostgreSQL` repository for enderecos.

use async_trait::async_trait;
use sqlx::{PgExecutor, PgPool};

use cadastro_core::{Cep, ClienteId, Endereco, EnderecoId, Estado, NovoEndereco};

use super::{EnderecoRepository, RepositoryError};

const ENDERECO_COLUMNS: &str = "id, cliente_id, rua, numero, bairro, cidade, estado, cep";

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct EnderecoRow {
    id: EnderecoId,
    cliente_id: ClienteId,
    rua: String,
    numero: String,
    bairro: String,
    cidade: String,
    estado: Estado,
    cep: Cep,
}

impl From<EnderecoRow> for Endereco {
    fn from(row: EnderecoRow) -> Self {
        Self {
            id: row.id,
            cliente_id: row.cliente_id,
            rua: row.rua,
            numero: row.numero,
            bairro: row.bairro,
            cidade: row.cidade,
            estado: row.estado,
            cep: row.cep,
        }
    }
}

/// Load the enderecos of one cliente, ordered by id.
pub(crate) async fn select_by_cliente<'e>(
    executor: impl PgExecutor<'e>,
    cliente_id: ClienteId,
) -> Result<Vec<Endereco>, RepositoryError> {
    let rows = sqlx::query_as::<_, EnderecoRow>(&format!(
        "SELECT {ENDERECO_COLUMNS} FROM endereco WHERE cliente_id = $1 ORDER BY id"
    ))
    .bind(cliente_id)
    .fetch_all(executor)
    .await?;

    Ok(rows.into_iter().map(Endereco::from).collect())
}

/// Load every endereco, ordered by id.
pub(crate) async fn select_all<'e>(
    executor: impl PgExecutor<'e>,
) -> Result<Vec<Endereco>, RepositoryError> {
    let rows = sqlx::query_as::<_, EnderecoRow>(&format!(
        "SELECT {ENDERECO_COLUMNS} FROM endereco ORDER BY id"
    ))
    .fetch_all(executor)
    .await?;

    Ok(rows.into_iter().map(Endereco::from).collect())
}

/// Repository for endereco database operations.
#[derive(Clone)]
pub struct PgEnderecoRepository {
    pool: PgPool,
}

impl PgEnderecoRepository {
    /// Create a new endereco repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EnderecoRepository for PgEnderecoRepository {
    async fn find_all(&self) -> Result<Vec<Endereco>, RepositoryError> {
        select_all(&self.pool).await
    }

    async fn find_by_id(&self, id: EnderecoId) -> Result<Option<Endereco>, RepositoryError> {
        let row = sqlx::query_as::<_, EnderecoRow>(&format!(
            "SELECT {ENDERECO_COLUMNS} FROM endereco WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Endereco::from))
    }

    async fn find_by_cliente(
        &self,
        cliente_id: ClienteId,
    ) -> Result<Vec<Endereco>, RepositoryError> {
        select_by_cliente(&self.pool, cliente_id).await
    }

    async fn insert_for_cliente(
        &self,
        cliente_id: ClienteId,
        endereco: &NovoEndereco,
    ) -> Result<Endereco, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        // Lock the owner so a concurrent delete cannot slip in before the insert
        let owner: Option<(ClienteId,)> =
            sqlx::query_as("SELECT id FROM cliente WHERE id = $1 FOR UPDATE")
                .bind(cliente_id)
                .fetch_optional(&mut *tx)
                .await?;

        if owner.is_none() {
            return Err(RepositoryError::NotFound);
        }

        let row = sqlx::query_as::<_, EnderecoRow>(&format!(
            r"
            INSERT INTO endereco (cliente_id, rua, numero, bairro, cidade, estado, cep)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {ENDERECO_COLUMNS}
            "
        ))
        .bind(cliente_id)
        .bind(&endereco.rua)
        .bind(&endereco.numero)
        .bind(&endereco.bairro)
        .bind(&endereco.cidade)
        .bind(endereco.estado)
        .bind(&endereco.cep)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("UPDATE cliente SET updated_at = NOW() WHERE id = $1")
            .bind(cliente_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(row.into())
    }

    async fn delete_by_id(&self, id: EnderecoId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM endereco WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
