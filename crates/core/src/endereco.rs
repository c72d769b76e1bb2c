//! Address entity and its request form.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::types::{Cep, ClienteId, EnderecoId, Estado};
use crate::validation::{Validate, ValidationMessageError, Violations};

/// A persisted address, always owned by one cliente.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Endereco {
    pub id: EnderecoId,
    /// Back-reference to the owner. Set on creation, never changed.
    pub cliente_id: ClienteId,
    pub rua: String,
    pub numero: String,
    pub bairro: String,
    pub cidade: String,
    pub estado: Estado,
    pub cep: Cep,
}

impl Endereco {
    /// Build an address from a validated form, its generated id and its owner.
    #[must_use]
    pub fn from_novo(id: EnderecoId, cliente_id: ClienteId, novo: NovoEndereco) -> Self {
        Self {
            id,
            cliente_id,
            rua: novo.rua,
            numero: novo.numero,
            bairro: novo.bairro,
            cidade: novo.cidade,
            estado: novo.estado,
            cep: novo.cep,
        }
    }

    /// Whether this address belongs to `cliente_id`.
    #[must_use]
    pub fn belongs_to(&self, cliente_id: ClienteId) -> bool {
        self.cliente_id == cliente_id
    }
}

/// Unvalidated address body, as received on `POST /clientes/{id}/enderecos`.
///
/// The owner comes from the path, so the body carries no cliente reference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnderecoForm {
    pub rua: Option<String>,
    pub numero: Option<String>,
    pub bairro: Option<String>,
    pub cidade: Option<String>,
    pub estado: Option<String>,
    pub cep: Option<String>,
}

/// An address that passed validation and is ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NovoEndereco {
    pub rua: String,
    pub numero: String,
    pub bairro: String,
    pub cidade: String,
    pub estado: Estado,
    pub cep: Cep,
}

fn required(v: &mut Violations, field: &str, value: Option<&str>, message: &str) -> Option<String> {
    match value {
        Some(s) if !s.trim().is_empty() => Some(s.to_owned()),
        _ => {
            v.push(field, message);
            None
        }
    }
}

impl Validate for EnderecoForm {
    type Output = NovoEndereco;

    /// Address rules do not depend on the date.
    fn validate_at(&self, _today: NaiveDate) -> Result<NovoEndereco, ValidationMessageError> {
        let mut v = Violations::new();

        let rua = required(&mut v, "rua", self.rua.as_deref(), "Rua é obrigatória");
        let numero = required(&mut v, "numero", self.numero.as_deref(), "Número é obrigatório");
        let bairro = required(&mut v, "bairro", self.bairro.as_deref(), "Bairro é obrigatório");
        let cidade = required(&mut v, "cidade", self.cidade.as_deref(), "Cidade é obrigatória");
        let estado = v.check("estado", Estado::parse(self.estado.as_deref().unwrap_or_default()));
        let cep = v.check("cep", Cep::parse(self.cep.as_deref().unwrap_or_default()));

        v.finish(|| {
            Some(NovoEndereco {
                rua: rua?,
                numero: numero?,
                bairro: bairro?,
                cidade: cidade?,
                estado: estado?,
                cep: cep?,
            })
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn rua_j() -> EnderecoForm {
        EnderecoForm {
            rua: Some("Rua J".to_owned()),
            numero: Some("123".to_owned()),
            bairro: Some("Centro".to_owned()),
            cidade: Some("São Paulo".to_owned()),
            estado: Some("SP".to_owned()),
            cep: Some("12345-678".to_owned()),
        }
    }

    #[test]
    fn test_valid_endereco() {
        let novo = rua_j().validate().unwrap();
        assert_eq!(novo.estado, Estado::SP);
        assert_eq!(novo.cep.as_str(), "12345-678");
    }

    #[test]
    fn test_empty_rua() {
        let form = EnderecoForm {
            rua: Some(String::new()),
            ..rua_j()
        };
        assert!(form.validate().unwrap_err().has_message("Rua é obrigatória"));
    }

    #[test]
    fn test_invalid_cep() {
        let form = EnderecoForm {
            cep: Some("1234567".to_owned()),
            ..rua_j()
        };
        let err = form.validate().unwrap_err();
        assert_eq!(
            err.messages_for("cep").collect::<Vec<_>>(),
            ["CEP deve seguir o formato XXXXX-XXX"]
        );
    }

    #[test]
    fn test_invalid_estado() {
        let form = EnderecoForm {
            estado: Some("XY".to_owned()),
            ..rua_j()
        };
        assert!(form.validate().unwrap_err().has_message("Estado inválido"));
    }

    #[test]
    fn test_empty_form_reports_every_field() {
        let err = EnderecoForm::default().validate().unwrap_err();
        let messages: Vec<_> = err.errors.iter().map(|e| e.message.as_str()).collect();
        assert_eq!(
            messages,
            [
                "Rua é obrigatória",
                "Número é obrigatório",
                "Bairro é obrigatório",
                "Cidade é obrigatória",
                "Estado é obrigatório",
                "CEP é obrigatório",
            ]
        );
    }

    #[test]
    fn test_from_novo_sets_owner() {
        let novo = rua_j().validate().unwrap();
        let endereco = Endereco::from_novo(EnderecoId::new(1), ClienteId::new(9), novo);
        assert!(endereco.belongs_to(ClienteId::new(9)));
        assert!(!endereco.belongs_to(ClienteId::new(10)));
    }

    #[test]
    fn test_serializes_owner_as_cliente_id() {
        let novo = rua_j().validate().unwrap();
        let endereco = Endereco::from_novo(EnderecoId::new(3), ClienteId::new(2), novo);
        let json = serde_json::to_value(&endereco).unwrap();
        assert_eq!(json["clienteId"], 2);
        assert_eq!(json["estado"], "SP");
    }
}
