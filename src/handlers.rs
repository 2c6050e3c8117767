pub mod catalog;
pub mod marketplaces;
pub mod pricing;
pub mod sales;

use axum::{response::IntoResponse, Json};
use rust_decimal::Decimal;
use serde_json::json;
use validator::ValidationError;

// ---
// Validações customizadas compartilhadas pelos payloads
// ---
pub(crate) fn validate_not_negative(val: &Decimal) -> Result<(), ValidationError> {
    if *val < Decimal::ZERO {
        let mut err = ValidationError::new("range");
        err.add_param("min".into(), &0.0);
        err.message = Some("O valor não pode ser negativo.".into());
        return Err(err);
    }
    Ok(())
}

pub(crate) fn validate_percentage(val: &Decimal) -> Result<(), ValidationError> {
    if *val < Decimal::ZERO || *val > Decimal::ONE_HUNDRED {
        let mut err = ValidationError::new("range");
        err.add_param("min".into(), &0.0);
        err.add_param("max".into(), &100.0);
        err.message = Some("O percentual deve estar entre 0 e 100.".into());
        return Err(err);
    }
    Ok(())
}

/// Margem: pode ser negativa (venda com prejuízo), mas fica abaixo de 100%.
pub(crate) fn validate_margin(val: &Decimal) -> Result<(), ValidationError> {
    if *val >= Decimal::ONE_HUNDRED || *val <= -Decimal::ONE_HUNDRED {
        let mut err = ValidationError::new("range");
        err.message = Some("A margem deve estar entre -100 e 100 (exclusivo).".into());
        return Err(err);
    }
    Ok(())
}

#[utoipa::path(
    get,
    path = "/api/health",
    tag = "Sistema",
    responses((status = 200, description = "Serviço no ar"))
)]
pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn nao_negativo() {
        assert!(validate_not_negative(&dec!(0)).is_ok());
        assert!(validate_not_negative(&dec!(19.9)).is_ok());
        let err = validate_not_negative(&dec!(-0.01)).unwrap_err();
        assert_eq!(err.code, "range");
    }

    #[test]
    fn percentual() {
        assert!(validate_percentage(&dec!(0)).is_ok());
        assert!(validate_percentage(&dec!(100)).is_ok());
        assert!(validate_percentage(&dec!(100.01)).is_err());
        assert!(validate_percentage(&dec!(-1)).is_err());
    }

    #[test]
    fn margem() {
        assert!(validate_margin(&dec!(-20)).is_ok());
        assert!(validate_margin(&dec!(99.99)).is_ok());
        assert!(validate_margin(&dec!(100)).is_err());
    }
}
