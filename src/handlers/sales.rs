// src/handlers/sales.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use super::{pricing::FormattedValues, validate_not_negative};
use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{i18n::Locale, tenancy::TenantContext},
    models::sales::{Sale, SaleMargin},
    pricing::format::format_currency,
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSalePayload {
    pub product_id: Uuid,
    pub marketplace_id: Uuid,

    #[validate(custom(function = "validate_not_negative"))]
    #[schema(example = "129.90")]
    pub price_charged: Decimal,

    #[validate(range(min = 1, message = "A quantidade deve ser ao menos 1."))]
    #[schema(example = 1)]
    pub quantity: i32,

    /// Sem data, considera agora
    pub sold_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct SalesQuery {
    pub marketplace_id: Option<Uuid>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaleMarginResponse {
    #[serde(flatten)]
    pub margin: SaleMargin,
    pub formatted: FormattedValues,
    pub formatted_total_margin: String,
}

#[utoipa::path(
    post,
    path = "/api/sales",
    tag = "Vendas",
    request_body = CreateSalePayload,
    responses(
        (status = 201, description = "Venda registrada", body = Sale),
        (status = 400, description = "Dados inválidos"),
        (status = 409, description = "Produto ou marketplace inexistente")
    ),
    params(("x-tenant-id" = Uuid, Header, description = "ID da Loja"))
)]
pub async fn create_sale(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    Json(payload): Json<CreateSalePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let sale = app_state
        .sales_service
        .record_sale(
            tenant.0,
            payload.product_id,
            payload.marketplace_id,
            payload.price_charged,
            payload.quantity,
            payload.sold_at,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(sale)))
}

#[utoipa::path(
    get,
    path = "/api/sales",
    tag = "Vendas",
    responses((status = 200, description = "Vendas da loja", body = Vec<Sale>)),
    params(
        ("x-tenant-id" = Uuid, Header, description = "ID da Loja"),
        SalesQuery
    )
)]
pub async fn list_sales(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    Query(query): Query<SalesQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let sales = app_state.sales_service.list_sales(tenant.0, query.marketplace_id).await?;
    Ok(Json(sales))
}

#[utoipa::path(
    get,
    path = "/api/sales/{id}/margin",
    tag = "Vendas",
    responses(
        (status = 200, description = "Margem realizada da venda", body = SaleMarginResponse),
        (status = 404, description = "Venda não encontrada")
    ),
    params(
        ("x-tenant-id" = Uuid, Header, description = "ID da Loja"),
        ("id" = Uuid, Path, description = "ID da venda"),
        ("accept-language" = Option<String>, Header, description = "Idioma da formatação")
    )
)]
pub async fn sale_margin(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    locale: Locale,
    Path(sale_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let margin = app_state.sales_service.sale_margin(tenant.0, sale_id).await?;

    Ok(Json(SaleMarginResponse {
        formatted: FormattedValues::from_breakdown(&margin.unit, locale.0),
        formatted_total_margin: format_currency(margin.total_margin, locale.0),
        margin,
    }))
}
