//! Customer entity and its request form.

use chrono::{Datelike, NaiveDate};
use serde::ser::{SerializeStruct, Serializer};
use serde::{Deserialize, Serialize};

use crate::endereco::Endereco;
use crate::types::{ClienteId, Cpf, Email, Telefone};
use crate::validation::{Validate, ValidationMessageError, Violations};

/// Minimum age, in complete years, for a cliente to be registered.
pub const IDADE_MINIMA: u32 = 18;

const NOME_MIN_CHARS: usize = 3;
const NOME_MAX_CHARS: usize = 100;

/// A persisted customer with its addresses.
///
/// Serializes with a derived `idade` (age today) alongside the stored fields.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cliente {
    pub id: ClienteId,
    pub nome: String,
    pub email: Email,
    pub cpf: Cpf,
    pub data_nascimento: NaiveDate,
    pub telefone: Option<Telefone>,
    /// Owned addresses, ordered by id.
    pub enderecos: Vec<Endereco>,
}

impl Cliente {
    /// Build a cliente from a validated form and its generated id.
    #[must_use]
    pub fn from_novo(id: ClienteId, novo: NovoCliente, enderecos: Vec<Endereco>) -> Self {
        Self {
            id,
            nome: novo.nome,
            email: novo.email,
            cpf: novo.cpf,
            data_nascimento: novo.data_nascimento,
            telefone: novo.telefone,
            enderecos,
        }
    }

    /// Age in complete years on `today`.
    #[must_use]
    pub fn idade_at(&self, today: NaiveDate) -> u32 {
        age_on(self.data_nascimento, today)
    }

    /// Age in complete years on the local calendar date.
    #[must_use]
    pub fn idade(&self) -> u32 {
        self.idade_at(chrono::Local::now().date_naive())
    }
}

impl Serialize for Cliente {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("Cliente", 8)?;
        s.serialize_field("id", &self.id)?;
        s.serialize_field("nome", &self.nome)?;
        s.serialize_field("email", &self.email)?;
        s.serialize_field("cpf", &self.cpf)?;
        s.serialize_field("dataNascimento", &self.data_nascimento)?;
        s.serialize_field("telefone", &self.telefone)?;
        s.serialize_field("enderecos", &self.enderecos)?;
        s.serialize_field("idade", &self.idade())?;
        s.end()
    }
}

/// Complete years elapsed between `birth` and `today`; zero if `birth` is later.
///
/// A birthday on 29 February counts as reached on 1 March in common years.
///
/// ```
/// use chrono::NaiveDate;
/// use cadastro_core::age_on;
///
/// let birth = NaiveDate::from_ymd_opt(1985, 1, 1).unwrap();
/// let today = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
/// assert_eq!(age_on(birth, today), 41);
/// ```
#[must_use]
pub fn age_on(birth: NaiveDate, today: NaiveDate) -> u32 {
    if today <= birth {
        return 0;
    }
    let mut years = today.year() - birth.year();
    if (today.month(), today.day()) < (birth.month(), birth.day()) {
        years -= 1;
    }
    u32::try_from(years).unwrap_or(0)
}

/// Unvalidated cliente body, as received on `POST`/`PUT /clientes`.
///
/// Every field is optional so that a missing field is reported as a
/// violation rather than a deserialization failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClienteForm {
    pub nome: Option<String>,
    pub email: Option<String>,
    pub cpf: Option<String>,
    pub data_nascimento: Option<NaiveDate>,
    pub telefone: Option<String>,
}

/// A cliente that passed validation and is ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NovoCliente {
    pub nome: String,
    pub email: Email,
    pub cpf: Cpf,
    pub data_nascimento: NaiveDate,
    pub telefone: Option<Telefone>,
}

impl Validate for ClienteForm {
    type Output = NovoCliente;

    fn validate_at(&self, today: NaiveDate) -> Result<NovoCliente, ValidationMessageError> {
        let mut v = Violations::new();

        let nome = self.nome.as_deref();
        v.ensure(
            "nome",
            nome.is_some_and(|n| !n.trim().is_empty()),
            "Nome é obrigatório",
        );
        if let Some(n) = nome {
            let len = n.chars().count();
            v.ensure(
                "nome",
                (NOME_MIN_CHARS..=NOME_MAX_CHARS).contains(&len),
                "O nome deve ter entre 3 e 100 caracteres",
            );
        }

        let email = v.check("email", Email::parse(self.email.as_deref().unwrap_or_default()));
        let cpf = v.check("cpf", Cpf::parse(self.cpf.as_deref().unwrap_or_default()));

        match self.data_nascimento {
            None => v.push("dataNascimento", "Data de nascimento é obrigatória"),
            Some(nascimento) => {
                v.ensure(
                    "dataNascimento",
                    nascimento < today,
                    "Data de nascimento deve ser válida",
                );
                v.ensure(
                    "dataNascimento",
                    age_on(nascimento, today) >= IDADE_MINIMA,
                    "Cliente deve ter no mínimo 18 anos",
                );
            }
        }

        let telefone = match self.telefone.as_deref() {
            None => Some(None),
            Some(t) => v.check("telefone", Telefone::parse(t)).map(Some),
        };

        v.finish(|| {
            Some(NovoCliente {
                nome: nome?.to_owned(),
                email: email?,
                cpf: cpf?,
                data_nascimento: self.data_nascimento?,
                telefone: telefone?,
            })
        })
    }
}
