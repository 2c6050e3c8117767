// src/middleware/tenancy.rs

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
};
use uuid::Uuid;

use crate::common::error::ApiError; // Usamos o nosso ApiError para rejeição

// O nome do nosso cabeçalho HTTP customizado
pub const TENANT_ID_HEADER: &str = "x-tenant-id";

// Loja (tenant) dona dos dados da requisição.
#[derive(Debug, Clone, Copy)]
pub struct TenantContext(pub Uuid);

impl TenantContext {
    /// Lê e valida o valor do cabeçalho.
    pub fn from_header_value(value: Option<&str>) -> Result<Self, ApiError> {
        let Some(value) = value else {
            return Err(ApiError::new(
                StatusCode::BAD_REQUEST,
                "O cabeçalho X-Tenant-ID é obrigatório.",
            ));
        };

        let tenant_id = Uuid::parse_str(value.trim()).map_err(|_| {
            ApiError::new(StatusCode::BAD_REQUEST, "Cabeçalho X-Tenant-ID inválido (não é um UUID).")
        })?;

        if tenant_id.is_nil() {
            return Err(ApiError::new(StatusCode::BAD_REQUEST, "Cabeçalho X-Tenant-ID inválido."));
        }

        Ok(TenantContext(tenant_id))
    }
}

impl<S> FromRequestParts<S> for TenantContext
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header_value = match parts.headers.get(TENANT_ID_HEADER) {
            Some(value) => Some(value.to_str().map_err(|_| {
                ApiError::new(
                    StatusCode::BAD_REQUEST,
                    "Cabeçalho X-Tenant-ID contém caracteres inválidos.",
                )
            })?),
            None => None,
        };

        TenantContext::from_header_value(header_value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cabecalho_valido() {
        let id = Uuid::new_v4();
        let ctx = TenantContext::from_header_value(Some(&id.to_string())).unwrap();
        assert_eq!(ctx.0, id);
    }

    #[test]
    fn cabecalho_ausente_ou_invalido() {
        let missing = TenantContext::from_header_value(None).unwrap_err();
        assert_eq!(missing.status, StatusCode::BAD_REQUEST);
        assert!(missing.error.contains("obrigatório"));

        let invalid = TenantContext::from_header_value(Some("loja-1")).unwrap_err();
        assert!(invalid.error.contains("não é um UUID"));

        assert!(TenantContext::from_header_value(Some(&Uuid::nil().to_string())).is_err());
    }
}
