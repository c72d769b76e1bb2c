//! Fixed-format document strings: CPF, CEP and phone numbers.
//!
//! These are stored and returned exactly as typed by the client (with
//! punctuation); the only check is that the whole string matches the mask.

use std::sync::LazyLock;

use regex::Regex;

/// Macro to define a string newtype that must match a fixed mask.
///
/// Creates:
/// - A `$name(String)` wrapper with `parse()`, `as_str()`, `Display`,
///   `FromStr`, `AsRef<str>` and string-backed serde
/// - A `$error` enum with `Empty` and `Pattern` variants rendering the given
///   messages
/// - `sqlx` `Type`, `Encode`, and `Decode` implementations (with `postgres` feature)
macro_rules! define_formatted {
    (
        $(#[$meta:meta])*
        $name:ident, $error:ident,
        pattern = $pattern:literal,
        empty = $empty:literal,
        mismatch = $mismatch:literal $(,)?
    ) => {
        #[doc = concat!("Errors that can occur when parsing a [`", stringify!($name), "`].")]
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum $error {
            /// The input is empty or whitespace.
            Empty,
            /// The input does not match the mask.
            Pattern,
        }

        impl ::core::fmt::Display for $error {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                match self {
                    Self::Empty => f.write_str($empty),
                    Self::Pattern => f.write_str($mismatch),
                }
            }
        }

        impl ::std::error::Error for $error {}

        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, ::serde::Serialize, ::serde::Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// The mask every value must match, as a regular expression.
            pub const PATTERN: &'static str = $pattern;

            /// Parse a value, requiring the whole input to match the mask.
            ///
            /// # Errors
            ///
            #[doc = concat!("Returns `", stringify!($error), "::Empty` for blank input and `",
                stringify!($error), "::Pattern` when the mask does not match.")]
            pub fn parse(s: &str) -> Result<Self, $error> {
                static RE: LazyLock<Regex> =
                    LazyLock::new(|| Regex::new($pattern).expect("Invalid regex"));

                if s.trim().is_empty() {
                    return Err($error::Empty);
                }
                if !RE.is_match(s) {
                    return Err($error::Pattern);
                }
                Ok(Self(s.to_owned()))
            }

            /// Returns the value as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Returns only the digits, without punctuation.
            #[must_use]
            pub fn digits(&self) -> String {
                self.0.chars().filter(char::is_ascii_digit).collect()
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = $error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl TryFrom<String> for $name {
            type Error = $error;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::parse(&value)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        #[cfg(feature = "postgres")]
        impl ::sqlx::Type<::sqlx::Postgres> for $name {
            fn type_info() -> ::sqlx::postgres::PgTypeInfo {
                <String as ::sqlx::Type<::sqlx::Postgres>>::type_info()
            }

            fn compatible(ty: &::sqlx::postgres::PgTypeInfo) -> bool {
                <String as ::sqlx::Type<::sqlx::Postgres>>::compatible(ty)
            }
        }

        #[cfg(feature = "postgres")]
        impl<'r> ::sqlx::Decode<'r, ::sqlx::Postgres> for $name {
            fn decode(
                value: ::sqlx::postgres::PgValueRef<'r>,
            ) -> Result<Self, ::sqlx::error::BoxDynError> {
                let s = <String as ::sqlx::Decode<::sqlx::Postgres>>::decode(value)?;
                Ok(Self(s))
            }
        }

        #[cfg(feature = "postgres")]
        impl ::sqlx::Encode<'_, ::sqlx::Postgres> for $name {
            fn encode_by_ref(
                &self,
                buf: &mut ::sqlx::postgres::PgArgumentBuffer,
            ) -> Result<::sqlx::encode::IsNull, ::sqlx::error::BoxDynError> {
                <String as ::sqlx::Encode<::sqlx::Postgres>>::encode_by_ref(&self.0, buf)
            }
        }
    };
}

define_formatted!(
    /// A CPF (Cadastro de Pessoas Físicas) number formatted as `XXX.XXX.XXX-XX`.
    ///
    /// Only the mask is checked; the check digits are not verified.
    ///
    /// ```
    /// use cadastro_core::Cpf;
    ///
    /// assert!(Cpf::parse("123.456.789-10").is_ok());
    /// assert!(Cpf::parse("11111111111").is_err());
    /// ```
    Cpf, CpfError,
    pattern = r"^[0-9]{3}\.[0-9]{3}\.[0-9]{3}-[0-9]{2}$",
    empty = "CPF é obrigatório",
    mismatch = "CPF deve seguir o formato XXX.XXX.XXX-XX",
);

define_formatted!(
    /// A CEP (postal code) formatted as `XXXXX-XXX`.
    Cep, CepError,
    pattern = r"^[0-9]{5}-[0-9]{3}$",
    empty = "CEP é obrigatório",
    mismatch = "CEP deve seguir o formato XXXXX-XXX",
);

define_formatted!(
    /// A mobile phone number formatted as `(XX) XXXXX-XXXX`.
    ///
    /// The field is optional on a cliente, but a present blank value still
    /// fails the mask, so both variants render the same message.
    Telefone, TelefoneError,
    pattern = r"^\([0-9]{2}\) [0-9]{5}-[0-9]{4}$",
    empty = "O telefone deve seguir o padrão (XX) XXXXX-XXXX",
    mismatch = "O telefone deve seguir o padrão (XX) XXXXX-XXXX",
);
