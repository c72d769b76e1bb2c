//! Cliente route handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use cadastro_core::{Cliente, ClienteForm, ClienteId};

use crate::error::{AppError, Result};
use crate::extract::JsonForm;
use crate::state::AppState;

/// List every cliente with its enderecos.
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Cliente>>> {
    Ok(Json(state.clientes().list_all().await?))
}

pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<ClienteId>,
) -> Result<Json<Cliente>> {
    state
        .clientes()
        .find_by_id(id)
        .await?
        .map(Json)
        .ok_or(AppError::NotFound)
}

/// Create a cliente. Responds 201 with the stored entity.
pub async fn create(
    State(state): State<AppState>,
    JsonForm(form): JsonForm<ClienteForm>,
) -> Result<(StatusCode, Json<Cliente>)> {
    let cliente = state.clientes().save(&form).await?;
    Ok((StatusCode::CREATED, Json(cliente)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<ClienteId>,
    JsonForm(form): JsonForm<ClienteForm>,
) -> Result<Json<Cliente>> {
    Ok(Json(state.clientes().update(id, &form).await?))
}

/// Delete a cliente; its enderecos go with it.
pub async fn delete(State(state): State<AppState>, Path(id): Path<ClienteId>) -> Result<StatusCode> {
    state.clientes().delete_by_id(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
