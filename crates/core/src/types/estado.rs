//! Brazilian state codes (UF).

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing an [`Estado`].
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EstadoError {
    /// The input is empty or whitespace.
    #[error("Estado é obrigatório")]
    Empty,
    /// The input is not one of the 27 federative unit codes.
    #[error("Estado inválido")]
    Invalid,
}

/// One of the 26 states plus the Federal District, as a two-letter code.
///
/// Codes are matched exactly, in upper case.
///
/// ```
/// use cadastro_core::Estado;
///
/// assert_eq!(Estado::parse("SP"), Ok(Estado::SP));
/// assert!(Estado::parse("XY").is_err());
/// assert!(Estado::parse("sp").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
#[allow(clippy::upper_case_acronyms)]
pub enum Estado {
    AC,
    AL,
    AP,
    AM,
    BA,
    CE,
    DF,
    ES,
    GO,
    MA,
    MT,
    MS,
    MG,
    PA,
    PB,
    PR,
    PE,
    PI,
    RJ,
    RN,
    RS,
    RO,
    RR,
    SC,
    SP,
    SE,
    TO,
}

impl Estado {
    /// Every state, in alphabetical order of state name.
    pub const ALL: [Self; 27] = [
        Self::AC,
        Self::AL,
        Self::AP,
        Self::AM,
        Self::BA,
        Self::CE,
        Self::DF,
        Self::ES,
        Self::GO,
        Self::MA,
        Self::MT,
        Self::MS,
        Self::MG,
        Self::PA,
        Self::PB,
        Self::PR,
        Self::PE,
        Self::PI,
        Self::RJ,
        Self::RN,
        Self::RS,
        Self::RO,
        Self::RR,
        Self::SC,
        Self::SP,
        Self::SE,
        Self::TO,
    ];

    /// Parse a two-letter state code.
    ///
    /// # Errors
    ///
    /// Returns [`EstadoError::Empty`] for blank input and
    /// [`EstadoError::Invalid`] for anything that is not a known code.
    pub fn parse(s: &str) -> Result<Self, EstadoError> {
        if s.trim().is_empty() {
            return Err(EstadoError::Empty);
        }
        Self::ALL
            .into_iter()
            .find(|estado| estado.code() == s)
            .ok_or(EstadoError::Invalid)
    }

    /// The two-letter code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::AC => "AC",
            Self::AL => "AL",
            Self::AP => "AP",
            Self::AM => "AM",
            Self::BA => "BA",
            Self::CE => "CE",
            Self::DF => "DF",
            Self::ES => "ES",
            Self::GO => "GO",
            Self::MA => "MA",
            Self::MT => "MT",
            Self::MS => "MS",
            Self::MG => "MG",
            Self::PA => "PA",
            Self::PB => "PB",
            Self::PR => "PR",
            Self::PE => "PE",
            Self::PI => "PI",
            Self::RJ => "RJ",
            Self::RN => "RN",
            Self::RS => "RS",
            Self::RO => "RO",
            Self::RR => "RR",
            Self::SC => "SC",
            Self::SP => "SP",
            Self::SE => "SE",
            Self::TO => "TO",
        }
    }
}

impl fmt::Display for Estado {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl std::str::FromStr for Estado {
    type Err = EstadoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Estado {
    type Error = EstadoError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Estado> for &'static str {
    fn from(estado: Estado) -> Self {
        estado.code()
    }
}

// Stored as CHAR(2) / TEXT
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Estado {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Estado {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <&str as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self::parse(s.trim_end())?)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Estado {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <&str as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.code(), buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_every_code_round_trips() {
        for estado in Estado::ALL {
            assert_eq!(Estado::parse(estado.code()), Ok(estado));
        }
    }

    #[test]
    fn test_invalid_codes() {
        assert_eq!(Estado::parse("XY"), Err(EstadoError::Invalid));
        assert_eq!(Estado::parse("São Paulo"), Err(EstadoError::Invalid));
        assert_eq!(Estado::parse("sp"), Err(EstadoError::Invalid));
        assert_eq!(Estado::parse(""), Err(EstadoError::Empty));
    }

    #[test]
    fn test_messages() {
        assert_eq!(EstadoError::Invalid.to_string(), "Estado inválido");
        assert_eq!(EstadoError::Empty.to_string(), "Estado é obrigatório");
    }

    #[test]
    fn test_serde() {
        assert_eq!(serde_json::to_string(&Estado::RJ).unwrap(), "\"RJ\"");
        assert_eq!(
            serde_json::from_str::<Estado>("\"MG\"").unwrap(),
            Estado::MG
        );
        assert!(serde_json::from_str::<Estado>("\"XY\"").is_err());
    }
}
