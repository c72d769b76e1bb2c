//! Endereco route handlers, nested under `/clientes/{id}/enderecos`.
//!
//! An endereco that exists but belongs to another cliente answers 404, the
//! same as one that doesn't exist.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use cadastro_core::{ClienteId, Endereco, EnderecoForm, EnderecoId};

use crate::error::Result;
use crate::extract::JsonForm;
use crate::state::AppState;

pub async fn list(
    State(state): State<AppState>,
    Path(id): Path<ClienteId>,
) -> Result<Json<Vec<Endereco>>> {
    Ok(Json(state.enderecos().list_for_cliente(id).await?))
}

pub async fn show(
    State(state): State<AppState>,
    Path((id, id_endereco)): Path<(ClienteId, EnderecoId)>,
) -> Result<Json<Endereco>> {
    Ok(Json(
        state.enderecos().find_for_cliente(id, id_endereco).await?,
    ))
}

/// Add an endereco to a cliente. Responds 201 with the stored entity.
pub async fn create(
    State(state): State<AppState>,
    Path(id): Path<ClienteId>,
    JsonForm(form): JsonForm<EnderecoForm>,
) -> Result<(StatusCode, Json<Endereco>)> {
    let endereco = state.enderecos().save(id, &form).await?;
    Ok((StatusCode::CREATED, Json(endereco)))
}

pub async fn delete(
    State(state): State<AppState>,
    Path((id, id_endereco)): Path<(ClienteId, EnderecoId)>,
) -> Result<StatusCode> {
    state.enderecos().delete(id, id_endereco).await?;
    Ok(StatusCode::NO_CONTENT)
}
