//! Field validation.
//!
//! A form is checked constraint by constraint and every failure is recorded as
//! a [`FieldError`]; nothing short-circuits, so a client gets the full list in
//! one response. The list is wrapped in a [`ValidationMessageError`], which is
//! also the JSON body of a 400 response.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single violated constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// JSON name of the offending field (`dataNascimento`, not `data_nascimento`).
    pub field: String,
    /// Human-readable message, ready to show to the user.
    pub message: String,
}

impl FieldError {
    #[must_use]
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Aggregated validation failures for one request.
///
/// ```
/// use cadastro_core::{FieldError, ValidationMessageError};
///
/// let err = ValidationMessageError::new(vec![FieldError::new("nome", "Nome é obrigatório")]);
/// assert!(err.has_message("Nome é obrigatório"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{message} ({} campo(s) inválido(s))", .errors.len())]
pub struct ValidationMessageError {
    pub message: String,
    pub errors: Vec<FieldError>,
}

impl ValidationMessageError {
    /// Summary line sent with every validation failure.
    pub const DEFAULT_MESSAGE: &'static str = "Há erros na sua requisição, verifique";

    #[must_use]
    pub fn new(errors: Vec<FieldError>) -> Self {
        Self {
            message: Self::DEFAULT_MESSAGE.to_owned(),
            errors,
        }
    }

    /// Whether any field failed with exactly this message.
    #[must_use]
    pub fn has_message(&self, message: &str) -> bool {
        self.errors.iter().any(|e| e.message == message)
    }

    /// Messages recorded for one field, in the order they were checked.
    pub fn messages_for<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.errors
            .iter()
            .filter(move |e| e.field == field)
            .map(|e| e.message.as_str())
    }
}

/// Collector used by [`Validate`] implementations.
#[derive(Debug, Default)]
pub struct Violations(Vec<FieldError>);

impl Violations {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failure unconditionally.
    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.0.push(FieldError::new(field, message));
    }

    /// Record `message` unless `ok` holds.
    pub fn ensure(&mut self, field: &str, ok: bool, message: &str) {
        if !ok {
            self.push(field, message);
        }
    }

    /// Keep the parsed value, or record the parse error's message.
    pub fn check<T, E: std::fmt::Display>(&mut self, field: &str, parsed: Result<T, E>) -> Option<T> {
        match parsed {
            Ok(value) => Some(value),
            Err(e) => {
                self.push(field, e.to_string());
                None
            }
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Finish validation: an error if anything was recorded, otherwise the
    /// value built by `build`.
    ///
    /// `build` returns `None` only when a parse failed, which also recorded a
    /// violation, so the `None` branch cannot produce an empty error.
    ///
    /// # Errors
    ///
    /// Returns every recorded violation.
    pub fn finish<T>(self, build: impl FnOnce() -> Option<T>) -> Result<T, ValidationMessageError> {
        if !self.0.is_empty() {
            return Err(ValidationMessageError::new(self.0));
        }
        build().ok_or_else(|| ValidationMessageError::new(Vec::new()))
    }
}

/// A request form that can be checked into its validated counterpart.
pub trait Validate {
    /// The checked value produced when no constraint is violated.
    type Output;

    /// Validate against a fixed "today", for date-relative rules.
    ///
    /// # Errors
    ///
    /// Returns every violated constraint.
    fn validate_at(&self, today: NaiveDate) -> Result<Self::Output, ValidationMessageError>;

    /// Validate against the local calendar date.
    ///
    /// # Errors
    ///
    /// Returns every violated constraint.
    fn validate(&self) -> Result<Self::Output, ValidationMessageError> {
        self.validate_at(chrono::Local::now().date_naive())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_collects_every_violation() {
        let mut v = Violations::new();
        v.push("nome", "Nome é obrigatório");
        v.ensure("nome", false, "O nome deve ter entre 3 e 100 caracteres");
        v.ensure("email", true, "never recorded");

        let err = v.finish(|| Some(())).unwrap_err();
        assert_eq!(err.errors.len(), 2);
        assert_eq!(err.messages_for("nome").count(), 2);
        assert_eq!(err.messages_for("email").count(), 0);
    }

    #[test]
    fn test_check_keeps_value_or_records_message() {
        let mut v = Violations::new();
        let ok: Option<i32> = v.check("idade", Ok::<_, String>(30));
        let bad: Option<i32> = v.check("cep", Err::<i32, _>("CEP inválido"));
        assert_eq!(ok, Some(30));
        assert_eq!(bad, None);
        assert!(!v.is_empty());
    }

    #[test]
    fn test_finish_without_violations_builds_value() {
        assert_eq!(Violations::new().finish(|| Some(5)).unwrap(), 5);
    }

    #[test]
    fn test_payload_shape() {
        let err = ValidationMessageError::new(vec![FieldError::new("cpf", "CPF é obrigatório")]);
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["message"], "Há erros na sua requisição, verifique");
        assert_eq!(json["errors"][0]["field"], "cpf");
        assert_eq!(json["errors"][0]["message"], "CPF é obrigatório");
    }
}
