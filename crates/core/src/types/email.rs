//! Email address type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Characters allowed in the local part besides ASCII alphanumerics.
const LOCAL_PART_SYMBOLS: &str = "!#$%&'*+/=?^_`{|}~.-";

/// Errors that can occur when parsing an [`Email`].
///
/// Every format problem renders the same user-facing message; the variants
/// exist for logging and tests.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EmailError {
    /// The input is empty or whitespace.
    #[error("Email é obrigatório")]
    Empty,
    /// The input is longer than [`Email::MAX_LENGTH`].
    #[error("Email deve ser um email válido")]
    TooLong,
    /// The input does not contain exactly one @ symbol.
    #[error("Email deve ser um email válido")]
    MissingAtSymbol,
    /// The local part (before @) is empty or has forbidden characters.
    #[error("Email deve ser um email válido")]
    InvalidLocalPart,
    /// The domain part (after @) is empty or malformed.
    #[error("Email deve ser um email válido")]
    InvalidDomain,
}

/// An email address.
///
/// ## Constraints
///
/// - Length: 1-254 characters (RFC 5321 limit)
/// - Exactly one @ symbol
/// - Local part: ASCII alphanumerics and ``!#$%&'*+/=?^_`{|}~.-``, with no
///   leading, trailing or doubled dots
/// - Domain: dot-separated labels of alphanumerics and hyphens; labels are
///   non-empty and do not start or end with a hyphen
///
/// ## Examples
///
/// ```
/// use cadastro_core::Email;
///
/// assert!(Email::parse("ana.maria@mail.com").is_ok());
/// assert!(Email::parse("user+tag@domain.com.br").is_ok());
///
/// assert!(Email::parse("").is_err());
/// assert!(Email::parse("email_invalido").is_err());
/// assert!(Email::parse("user@@mail.com").is_err());
/// assert!(Email::parse("user@mail..com").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// Maximum length of an email address (RFC 5321).
    pub const MAX_LENGTH: usize = 254;

    /// Parse an `Email` from a string.
    ///
    /// # Errors
    ///
    /// Returns [`EmailError::Empty`] for blank input and one of the format
    /// variants when the address is malformed.
    pub fn parse(s: &str) -> Result<Self, EmailError> {
        if s.trim().is_empty() {
            return Err(EmailError::Empty);
        }

        if s.len() > Self::MAX_LENGTH {
            return Err(EmailError::TooLong);
        }

        let (local, domain) = s.split_once('@').ok_or(EmailError::MissingAtSymbol)?;
        if domain.contains('@') {
            return Err(EmailError::MissingAtSymbol);
        }

        if !is_valid_local_part(local) {
            return Err(EmailError::InvalidLocalPart);
        }

        if !is_valid_domain(domain) {
            return Err(EmailError::InvalidDomain);
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the email address as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the domain part of the email (after the @).
    #[must_use]
    pub fn domain(&self) -> &str {
        self.0.split_once('@').map_or("", |(_, domain)| domain)
    }
}

fn is_valid_local_part(local: &str) -> bool {
    !local.is_empty()
        && !local.starts_with('.')
        && !local.ends_with('.')
        && !local.contains("..")
        && local
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || LOCAL_PART_SYMBOLS.contains(c))
}

fn is_valid_domain(domain: &str) -> bool {
    !domain.is_empty()
        && domain.split('.').all(|label| {
            !label.is_empty()
                && !label.starts_with('-')
                && !label.ends_with('-')
                && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        })
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Email {
    type Err = EmailError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Email {
    type Error = EmailError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Email> for String {
    fn from(email: Email) -> Self {
        email.0
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// SQLx support (with postgres feature)
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Email {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Email {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        // Rows were validated on the way in
        Ok(Self(s))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Email {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_emails() {
        assert!(Email::parse("ana.maria@mail.com").is_ok());
        assert!(Email::parse("cliente@mail.com").is_ok());
        assert!(Email::parse("user+tag@example.com").is_ok());
        assert!(Email::parse("user@sub.example.com.br").is_ok());
        assert!(Email::parse("a@b").is_ok());
    }

    #[test]
    fn test_parse_blank() {
        assert_eq!(Email::parse(""), Err(EmailError::Empty));
        assert_eq!(Email::parse("   "), Err(EmailError::Empty));
    }

    #[test]
    fn test_parse_too_long() {
        let long = format!("{}@example.com", "a".repeat(250));
        assert_eq!(Email::parse(&long), Err(EmailError::TooLong));
    }

    #[test]
    fn test_parse_missing_at() {
        assert_eq!(
            Email::parse("email_invalido"),
            Err(EmailError::MissingAtSymbol)
        );
        assert_eq!(
            Email::parse("a@b@mail.com"),
            Err(EmailError::MissingAtSymbol)
        );
    }

    #[test]
    fn test_parse_bad_local_part() {
        assert_eq!(
            Email::parse("@domain.com"),
            Err(EmailError::InvalidLocalPart)
        );
        assert_eq!(
            Email::parse(".ana@mail.com"),
            Err(EmailError::InvalidLocalPart)
        );
        assert_eq!(
            Email::parse("ana maria@mail.com"),
            Err(EmailError::InvalidLocalPart)
        );
    }

    #[test]
    fn test_parse_bad_domain() {
        assert_eq!(Email::parse("user@"), Err(EmailError::InvalidDomain));
        assert_eq!(
            Email::parse("user@mail..com"),
            Err(EmailError::InvalidDomain)
        );
        assert_eq!(
            Email::parse("user@-mail.com"),
            Err(EmailError::InvalidDomain)
        );
    }

    #[test]
    fn test_messages() {
        assert_eq!(EmailError::Empty.to_string(), "Email é obrigatório");
        assert_eq!(
            EmailError::MissingAtSymbol.to_string(),
            "Email deve ser um email válido"
        );
    }

    #[test]
    fn test_domain() {
        let email = Email::parse("user@example.com").unwrap();
        assert_eq!(email.domain(), "example.com");
    }

    #[test]
    fn test_deserialize_rejects_invalid() {
        let parsed: Email = serde_json::from_str("\"user@example.com\"").unwrap();
        assert_eq!(parsed.as_str(), "user@example.com");

        assert!(serde_json::from_str::<Email>("\"nope\"").is_err());
    }
}
