use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::pricing::PricingError;

// Nosso tipo de erro, com `thiserror` para melhor ergonomia.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    // Erros do núcleo de precificação (validação, inviável, sem comissão, duplicata)
    #[error(transparent)]
    Pricing(#[from] PricingError),

    #[error("{0} não encontrado(a)")]
    NotFound(&'static str),

    // Variante para erros de banco de dados
    #[error("Erro de banco de dados: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor: {0}")]
    InternalServerError(#[from] anyhow::Error),
}

/// Corpo de erro devolvido ao cliente: `{"error": ..., "details": ...}`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub details: Option<Value>,
}

impl ApiError {
    pub fn new(status: StatusCode, error: impl Into<String>) -> Self {
        Self { status, error: error.into(), details: None }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => json!({ "error": self.error, "details": details }),
            None => json!({ "error": self.error }),
        };
        (self.status, Json(body)).into_response()
    }
}

/// Traduz o código de erro do Postgres numa mensagem amigável.
pub fn friendly_db_message(code: &str) -> Option<(StatusCode, &'static str)> {
    match code {
        // foreign_key_violation
        "23503" => Some((
            StatusCode::CONFLICT,
            "Não é possível excluir: existem registros relacionados.",
        )),
        // unique_violation
        "23505" => Some((StatusCode::CONFLICT, "Já existe um registro com estes dados.")),
        // not_null_violation
        "23502" => Some((StatusCode::BAD_REQUEST, "Um campo obrigatório não foi informado.")),
        // check_violation
        "23514" => Some((StatusCode::BAD_REQUEST, "Um ou mais valores estão fora do permitido.")),
        // invalid_text_representation / numeric_value_out_of_range
        "22P02" | "22003" => Some((StatusCode::BAD_REQUEST, "Valor inválido informado.")),
        _ => None,
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        match err {
            // Retorna todos os detalhes da validação.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .map(|e| match &e.message {
                            Some(m) => m.to_string(),
                            None => e.code.to_string(),
                        })
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                ApiError {
                    status: StatusCode::BAD_REQUEST,
                    error: "Um ou mais campos são inválidos.".to_string(),
                    details: Some(json!(details)),
                }
            }
            AppError::Pricing(pricing_err) => {
                let status = match &pricing_err {
                    PricingError::Validation { .. } => StatusCode::BAD_REQUEST,
                    PricingError::InfeasiblePricing { .. } | PricingError::NoCommission { .. } => {
                        StatusCode::UNPROCESSABLE_ENTITY
                    }
                    PricingError::DuplicateRule { .. } => StatusCode::CONFLICT,
                };
                let details = match &pricing_err {
                    PricingError::Validation { field, reason } => {
                        let mut fields = serde_json::Map::new();
                        fields.insert(field.to_string(), json!([reason]));
                        Some(Value::Object(fields))
                    }
                    _ => None,
                };
                ApiError { status, error: pricing_err.to_string(), details }
            }
            AppError::NotFound(what) => {
                ApiError::new(StatusCode::NOT_FOUND, format!("{what} não encontrado(a)"))
            }
            AppError::DatabaseError(sqlx::Error::RowNotFound) => {
                ApiError::new(StatusCode::NOT_FOUND, "Registro não encontrado.")
            }
            AppError::DatabaseError(ref db_err) => {
                let friendly = db_err
                    .as_database_error()
                    .and_then(|e| e.code())
                    .and_then(|code| friendly_db_message(&code));

                match friendly {
                    Some((status, message)) => ApiError::new(status, message),
                    None => {
                        tracing::error!("Erro Interno do Servidor: {}", err);
                        ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Ocorreu um erro inesperado.")
                    }
                }
            }
            // O `tracing` loga a mensagem detalhada que `thiserror` nos deu.
            ref e @ AppError::InternalServerError(_) => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Ocorreu um erro inesperado.")
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        ApiError::from(self).into_response()
    }
}
