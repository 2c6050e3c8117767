// src/handlers/marketplaces.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use super::{validate_not_negative, validate_percentage};
use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::tenancy::TenantContext,
    models::marketplace::{CommissionRule, FixedFeeRuleRecord, Marketplace, MarketplacePlatform, ShippingRule},
    pricing::{commission::ResolvedCommission, fixed_fee::FixedFeeRuleType},
};

fn default_true() -> bool {
    true
}

// ---
// Payloads
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateMarketplacePayload {
    #[validate(length(min = 1, max = 120, message = "O nome é obrigatório."))]
    #[schema(example = "Mercado Livre Clássico")]
    pub name: String,

    /// Plataforma a que esta modalidade pertence
    pub parent_id: Option<Uuid>,

    #[serde(default = "default_true")]
    pub is_active: bool,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommissionPayload {
    /// Vazio = comissão padrão do marketplace
    pub category_id: Option<Uuid>,

    /// Percentual (0–100); gravado como fração
    #[validate(custom(function = "validate_percentage"))]
    #[schema(example = "12")]
    pub rate: Decimal,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ResolveCommissionQuery {
    pub category_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FixedFeePayload {
    pub rule_type: FixedFeeRuleType,

    #[schema(example = "0")]
    pub range_min: Option<Decimal>,

    #[schema(example = "79")]
    pub range_max: Option<Decimal>,

    /// Reais (constante/faixa) ou percentual do preço (percentual)
    #[validate(custom(function = "validate_not_negative"))]
    #[schema(example = "6.75")]
    pub value: Decimal,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShippingRulePayload {
    pub product_id: Uuid,
    pub marketplace_id: Uuid,

    #[validate(custom(function = "validate_not_negative"))]
    #[schema(example = "19.90")]
    pub shipping_cost: Decimal,

    #[schema(example = "79")]
    pub free_shipping_threshold: Option<Decimal>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ShippingRuleQuery {
    pub product_id: Option<Uuid>,
}

// =============================================================================
//  MARKETPLACES
// =============================================================================

#[utoipa::path(
    post,
    path = "/api/marketplaces",
    tag = "Marketplaces",
    request_body = CreateMarketplacePayload,
    responses(
        (status = 201, description = "Marketplace criado", body = Marketplace),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Plataforma pai não encontrada")
    ),
    params(("x-tenant-id" = Uuid, Header, description = "ID da Loja"))
)]
pub async fn create_marketplace(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    Json(payload): Json<CreateMarketplacePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let marketplace = app_state
        .marketplace_service
        .create_marketplace(tenant.0, payload.parent_id, &payload.name, payload.is_active)
        .await?;

    Ok((StatusCode::CREATED, Json(marketplace)))
}

#[utoipa::path(
    get,
    path = "/api/marketplaces",
    tag = "Marketplaces",
    responses((status = 200, description = "Lista de marketplaces", body = Vec<Marketplace>)),
    params(("x-tenant-id" = Uuid, Header, description = "ID da Loja"))
)]
pub async fn list_marketplaces(
    State(app_state): State<AppState>,
    tenant: TenantContext,
) -> Result<impl IntoResponse, ApiError> {
    let marketplaces = app_state.marketplace_service.list_marketplaces(tenant.0).await?;
    Ok(Json(marketplaces))
}

#[utoipa::path(
    get,
    path = "/api/marketplaces/platforms",
    tag = "Marketplaces",
    responses((status = 200, description = "Plataformas e modalidades", body = Vec<MarketplacePlatform>)),
    params(("x-tenant-id" = Uuid, Header, description = "ID da Loja"))
)]
pub async fn list_platforms(
    State(app_state): State<AppState>,
    tenant: TenantContext,
) -> Result<impl IntoResponse, ApiError> {
    let platforms = app_state.marketplace_service.list_platforms(tenant.0).await?;
    Ok(Json(platforms))
}

#[utoipa::path(
    delete,
    path = "/api/marketplaces/{id}",
    tag = "Marketplaces",
    responses(
        (status = 204, description = "Marketplace removido"),
        (status = 404, description = "Marketplace não encontrado"),
        (status = 409, description = "Marketplace com vendas ou modalidades vinculadas")
    ),
    params(
        ("x-tenant-id" = Uuid, Header, description = "ID da Loja"),
        ("id" = Uuid, Path, description = "ID do marketplace")
    )
)]
pub async fn delete_marketplace(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    Path(marketplace_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state.marketplace_service.delete_marketplace(tenant.0, marketplace_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
//  COMISSÕES
// =============================================================================

#[utoipa::path(
    post,
    path = "/api/marketplaces/{id}/commissions",
    tag = "Comissões",
    request_body = CommissionPayload,
    responses(
        (status = 201, description = "Comissão criada", body = CommissionRule),
        (status = 400, description = "Dados inválidos"),
        (status = 409, description = "Já existe comissão para o par marketplace/categoria")
    ),
    params(
        ("x-tenant-id" = Uuid, Header, description = "ID da Loja"),
        ("id" = Uuid, Path, description = "ID do marketplace")
    )
)]
pub async fn create_commission(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    Path(marketplace_id): Path<Uuid>,
    Json(payload): Json<CommissionPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let rule = app_state
        .marketplace_service
        .create_commission(tenant.0, marketplace_id, payload.category_id, payload.rate)
        .await?;

    Ok((StatusCode::CREATED, Json(rule)))
}

#[utoipa::path(
    get,
    path = "/api/marketplaces/{id}/commissions",
    tag = "Comissões",
    responses((status = 200, description = "Comissões do marketplace", body = Vec<CommissionRule>)),
    params(
        ("x-tenant-id" = Uuid, Header, description = "ID da Loja"),
        ("id" = Uuid, Path, description = "ID do marketplace")
    )
)]
pub async fn list_commissions(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    Path(marketplace_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let rules = app_state.marketplace_service.commissions(tenant.0, marketplace_id).await?;
    Ok(Json(rules.to_vec()))
}

#[utoipa::path(
    put,
    path = "/api/commissions/{id}",
    tag = "Comissões",
    request_body = CommissionPayload,
    responses(
        (status = 200, description = "Comissão atualizada", body = CommissionRule),
        (status = 404, description = "Comissão não encontrada"),
        (status = 409, description = "Já existe comissão para o par marketplace/categoria")
    ),
    params(
        ("x-tenant-id" = Uuid, Header, description = "ID da Loja"),
        ("id" = Uuid, Path, description = "ID da comissão")
    )
)]
pub async fn update_commission(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    Path(commission_id): Path<Uuid>,
    Json(payload): Json<CommissionPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let rule = app_state
        .marketplace_service
        .update_commission(tenant.0, commission_id, payload.category_id, payload.rate)
        .await?;

    Ok(Json(rule))
}

#[utoipa::path(
    delete,
    path = "/api/commissions/{id}",
    tag = "Comissões",
    responses(
        (status = 204, description = "Comissão removida"),
        (status = 404, description = "Comissão não encontrada")
    ),
    params(
        ("x-tenant-id" = Uuid, Header, description = "ID da Loja"),
        ("id" = Uuid, Path, description = "ID da comissão")
    )
)]
pub async fn delete_commission(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    Path(commission_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state.marketplace_service.delete_commission(tenant.0, commission_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/marketplaces/{id}/commissions/resolve",
    tag = "Comissões",
    responses(
        (status = 200, description = "Comissão efetiva", body = ResolvedCommission),
        (status = 422, description = "Nenhuma comissão configurada")
    ),
    params(
        ("x-tenant-id" = Uuid, Header, description = "ID da Loja"),
        ("id" = Uuid, Path, description = "ID do marketplace"),
        ResolveCommissionQuery
    )
)]
pub async fn resolve_commission(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    Path(marketplace_id): Path<Uuid>,
    Query(query): Query<ResolveCommissionQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let resolved = app_state
        .marketplace_service
        .resolve_commission(tenant.0, marketplace_id, query.category_id)
        .await?;

    Ok(Json(resolved))
}

// =============================================================================
//  VALOR FIXO
// =============================================================================

#[utoipa::path(
    post,
    path = "/api/marketplaces/{id}/fixed-fees",
    tag = "Valor fixo",
    request_body = FixedFeePayload,
    responses(
        (status = 201, description = "Regra criada", body = FixedFeeRuleRecord),
        (status = 400, description = "Faixa ou valor inválido")
    ),
    params(
        ("x-tenant-id" = Uuid, Header, description = "ID da Loja"),
        ("id" = Uuid, Path, description = "ID do marketplace")
    )
)]
pub async fn create_fixed_fee(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    Path(marketplace_id): Path<Uuid>,
    Json(payload): Json<FixedFeePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let rule = app_state
        .marketplace_service
        .create_fixed_fee(
            tenant.0,
            marketplace_id,
            payload.rule_type,
            payload.range_min,
            payload.range_max,
            payload.value,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(rule)))
}

#[utoipa::path(
    get,
    path = "/api/marketplaces/{id}/fixed-fees",
    tag = "Valor fixo",
    responses((status = 200, description = "Regras de valor fixo", body = Vec<FixedFeeRuleRecord>)),
    params(
        ("x-tenant-id" = Uuid, Header, description = "ID da Loja"),
        ("id" = Uuid, Path, description = "ID do marketplace")
    )
)]
pub async fn list_fixed_fees(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    Path(marketplace_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let rules = app_state.marketplace_service.fixed_fees(tenant.0, marketplace_id).await?;
    Ok(Json(rules.to_vec()))
}

#[utoipa::path(
    delete,
    path = "/api/fixed-fees/{id}",
    tag = "Valor fixo",
    responses(
        (status = 204, description = "Regra removida"),
        (status = 404, description = "Regra não encontrada")
    ),
    params(
        ("x-tenant-id" = Uuid, Header, description = "ID da Loja"),
        ("id" = Uuid, Path, description = "ID da regra")
    )
)]
pub async fn delete_fixed_fee(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    Path(rule_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state.marketplace_service.delete_fixed_fee(tenant.0, rule_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
//  FRETE
// =============================================================================

#[utoipa::path(
    post,
    path = "/api/shipping-rules",
    tag = "Frete",
    request_body = ShippingRulePayload,
    responses(
        (status = 200, description = "Regra de frete gravada", body = ShippingRule),
        (status = 400, description = "Dados inválidos")
    ),
    params(("x-tenant-id" = Uuid, Header, description = "ID da Loja"))
)]
pub async fn upsert_shipping_rule(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    Json(payload): Json<ShippingRulePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let rule = app_state
        .marketplace_service
        .upsert_shipping_rule(
            tenant.0,
            payload.product_id,
            payload.marketplace_id,
            payload.shipping_cost,
            payload.free_shipping_threshold,
        )
        .await?;

    Ok(Json(rule))
}

#[utoipa::path(
    get,
    path = "/api/shipping-rules",
    tag = "Frete",
    responses((status = 200, description = "Regras de frete", body = Vec<ShippingRule>)),
    params(
        ("x-tenant-id" = Uuid, Header, description = "ID da Loja"),
        ShippingRuleQuery
    )
)]
pub async fn list_shipping_rules(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    Query(query): Query<ShippingRuleQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let rules = app_state
        .marketplace_service
        .list_shipping_rules(tenant.0, query.product_id)
        .await?;

    Ok(Json(rules))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn marketplace_ativo_por_padrao() {
        let payload: CreateMarketplacePayload = serde_json::from_value(json!({ "name": "Shopee" })).unwrap();
        assert!(payload.is_active);
        assert!(payload.parent_id.is_none());
    }

    #[test]
    fn comissao_acima_de_100_e_recusada() {
        let payload: CommissionPayload = serde_json::from_value(json!({ "rate": 120 })).unwrap();
        assert!(payload.validate().is_err());

        let payload: CommissionPayload = serde_json::from_value(json!({ "rate": 12 })).unwrap();
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn tipo_de_regra_em_minusculas() {
        let payload: FixedFeePayload = serde_json::from_value(json!({
            "ruleType": "faixa",
            "rangeMin": 0,
            "rangeMax": 79,
            "value": 6.5
        }))
        .unwrap();
        assert_eq!(payload.rule_type, FixedFeeRuleType::Faixa);
        assert!(payload.validate().is_ok());
    }
}
