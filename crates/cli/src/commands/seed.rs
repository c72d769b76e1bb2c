//! Seed the database with demo clientes.
//!
//! Records go through the same services as the HTTP API, so they are
//! validated and uniqueness-checked exactly like a `POST /clientes`.
//! Clientes that already exist (same email, CPF or telefone) are skipped,
//! which makes the command safe to re-run. A cliente is only kept together
//! with all of its enderecos.

use chrono::NaiveDate;
use tracing::{info, warn};

use cadastro_core::{ClienteForm, EnderecoForm, Validate, ValidationMessageError};
use cadastro_server::services::ServiceError;
use cadastro_server::state::AppState;

use super::connect;

/// A demo cliente and the enderecos to attach to it.
struct SeedCliente {
    cliente: ClienteForm,
    enderecos: Vec<EnderecoForm>,
}

fn text(s: &str) -> Option<String> {
    Some(s.to_owned())
}

fn endereco(
    rua: &str,
    numero: &str,
    bairro: &str,
    cidade: &str,
    estado: &str,
    cep: &str,
) -> EnderecoForm {
    EnderecoForm {
        rua: text(rua),
        numero: text(numero),
        bairro: text(bairro),
        cidade: text(cidade),
        estado: text(estado),
        cep: text(cep),
    }
}

fn demo_data() -> Vec<SeedCliente> {
    vec![
        SeedCliente {
            cliente: ClienteForm {
                nome: text("Ana Maria"),
                email: text("ana.maria@mail.com"),
                cpf: text("123.456.789-10"),
                data_nascimento: NaiveDate::from_ymd_opt(1985, 1, 1),
                telefone: text("(11) 91234-5678"),
            },
            enderecos: vec![endereco(
                "Rua J",
                "123",
                "Centro",
                "São Paulo",
                "SP",
                "12345-678",
            )],
        },
        SeedCliente {
            cliente: ClienteForm {
                nome: text("João Pedro Almeida"),
                email: text("joao.pedro@mail.com"),
                cpf: text("987.654.321-00"),
                data_nascimento: NaiveDate::from_ymd_opt(1979, 11, 23),
                telefone: None,
            },
            enderecos: vec![
                endereco(
                    "Avenida Boa Viagem",
                    "4000",
                    "Boa Viagem",
                    "Recife",
                    "PE",
                    "51021-000",
                ),
                endereco(
                    "Rua da Aurora",
                    "12",
                    "Santo Amaro",
                    "Recife",
                    "PE",
                    "50050-000",
                ),
            ],
        },
    ]
}

/// Check every demo record without touching the database.
fn validate_all(data: &[SeedCliente]) -> Result<(), ValidationMessageError> {
    for seed in data {
        seed.cliente.validate()?;
        for endereco in &seed.enderecos {
            endereco.validate()?;
        }
    }
    Ok(())
}

/// What happened to one demo cliente.
#[derive(Debug, PartialEq, Eq)]
enum Outcome {
    Inserted,
    Skipped,
}

/// Insert one cliente and its enderecos as a unit.
///
/// If an endereco cannot be saved, the freshly inserted cliente is deleted
/// again so the next run does not skip it as already seeded.
async fn seed_one(state: &AppState, seed: &SeedCliente) -> Result<Outcome, ServiceError> {
    let cliente = match state.clientes().save(&seed.cliente).await {
        Ok(cliente) => cliente,
        Err(ServiceError::Conflict(reason)) => {
            warn!(%reason, "Skipping existing cliente");
            return Ok(Outcome::Skipped);
        }
        Err(e) => return Err(e),
    };

    for form in &seed.enderecos {
        if let Err(e) = state.enderecos().save(cliente.id, form).await {
            warn!(cliente_id = %cliente.id, error = %e, "Endereco failed, removing cliente");
            state.clientes().delete_by_id(cliente.id).await?;
            return Err(e);
        }
    }

    info!(cliente_id = %cliente.id, enderecos = seed.enderecos.len(), "Seeded cliente");
    Ok(Outcome::Inserted)
}

/// Insert the demo clientes and their enderecos.
///
/// With `dry_run`, only validates the demo data.
///
/// # Errors
///
/// Returns an error if the database is unreachable, a demo record is invalid,
/// or a write fails for a reason other than a duplicate.
pub async fn run(dry_run: bool) -> Result<(), Box<dyn std::error::Error>> {
    let data = demo_data();
    validate_all(&data)?;
    info!(clientes = data.len(), "Demo data validated");

    if dry_run {
        info!("Dry run, nothing written");
        return Ok(());
    }

    let (config, pool) = connect().await?;
    let state = AppState::postgres(config, pool);

    let mut inserted = 0_usize;
    let mut skipped = 0_usize;

    for seed in &data {
        match seed_one(&state, seed).await? {
            Outcome::Inserted => inserted += 1,
            Outcome::Skipped => skipped += 1,
        }
    }

    info!("Seeding complete!");
    info!("  Clientes inserted: {inserted}");
    info!("  Clientes skipped (already exist): {skipped}");

    Ok(())
}
