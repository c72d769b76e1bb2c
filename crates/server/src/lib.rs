//! Cadastro Server library.
//!
//! This crate provides the REST API as a library, allowing it to be tested
//! and reused by the CLI.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;
