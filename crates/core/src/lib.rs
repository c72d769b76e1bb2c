//! Cadastro Core - Domain types and validation for the customer registry.
//!
//! This crate provides the types shared by the server and the CLI:
//! - `server` - REST API for clientes and their enderecos
//! - `cli` - Migrations and seed data
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no database access,
//! no HTTP handling. Request bodies arrive as unvalidated forms
//! ([`ClienteForm`], [`EnderecoForm`]); running [`Validate::validate`] on a
//! form either yields the checked value ([`NovoCliente`], [`NovoEndereco`]) or
//! a [`ValidationMessageError`] listing every violated constraint.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, email, CPF, CEP, phone and state codes
//! - [`validation`] - Field errors, the aggregated error payload and the `Validate` trait
//! - [`cliente`] - Customer entity and its form
//! - [`endereco`] - Address entity and its form

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cliente;
pub mod endereco;
pub mod types;
pub mod validation;

pub use cliente::{Cliente, ClienteForm, NovoCliente, age_on};
pub use endereco::{Endereco, EnderecoForm, NovoEndereco};
pub use types::*;
pub use validation::{FieldError, Validate, ValidationMessageError, Violations};
