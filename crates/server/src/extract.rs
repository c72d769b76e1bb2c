//! Request extractors.

use axum::{Json, extract::FromRequest};

use crate::error::AppError;

/// JSON request body whose rejections answer like validation failures.
///
/// A value of the wrong type or format (a `dataNascimento` that is not
/// `yyyy-MM-dd`, a number where text is expected) is reported as a 400
/// naming the field, instead of axum's plain-text 422.
#[derive(Debug, FromRequest)]
#[from_request(via(Json), rejection(AppError))]
pub struct JsonForm<T>(pub T);
