//! Core types for the customer registry.
//!
//! This module provides type-safe wrappers for the formatted fields a
//! customer or address carries.

pub mod email;
pub mod estado;
pub mod formatted;
pub mod id;

pub use email::{Email, EmailError};
pub use estado::{Estado, EstadoError};
pub use formatted::{Cep, CepError, Cpf, CpfError, Telefone, TelefoneError};
pub use id::*;
