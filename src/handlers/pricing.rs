// src/handlers/pricing.rs

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

use super::{validate_margin, validate_not_negative, validate_percentage};
use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{i18n::Locale, tenancy::TenantContext},
    models::pricing::{PricingSettings, SavedPricing},
    pricing::{
        calculator::{ComparisonItem, MarginBreakdown, PricingResult},
        engine::PricingFormula,
        format::{format_currency, format_percent, FormatLocale},
    },
};

// ---
// Valores formatados para exibição (no idioma do Accept-Language)
// ---
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FormattedValues {
    #[schema(example = "R$ 100,00")]
    pub preco: String,
    pub custo_total: String,
    pub valor_fixo: String,
    pub frete: String,
    #[schema(example = "12,00%")]
    pub comissao: String,
    pub margem_unitaria: String,
    #[schema(example = "28,00%")]
    pub margem_percentual: String,
}

impl FormattedValues {
    pub(crate) fn from_result(result: &PricingResult, locale: FormatLocale) -> Self {
        Self {
            preco: format_currency(result.preco_sugerido, locale),
            custo_total: format_currency(result.custo_total, locale),
            valor_fixo: format_currency(result.valor_fixo, locale),
            frete: format_currency(result.frete, locale),
            comissao: format_percent(result.comissao, locale),
            margem_unitaria: format_currency(result.margem_unitaria, locale),
            margem_percentual: format_percent(result.margem_percentual, locale),
        }
    }

    pub(crate) fn from_breakdown(breakdown: &MarginBreakdown, locale: FormatLocale) -> Self {
        Self {
            preco: format_currency(breakdown.preco_venda, locale),
            custo_total: format_currency(breakdown.custo_total, locale),
            valor_fixo: format_currency(breakdown.valor_fixo, locale),
            frete: format_currency(breakdown.frete, locale),
            comissao: format_percent(breakdown.comissao, locale),
            margem_unitaria: format_currency(breakdown.margem_unitaria, locale),
            margem_percentual: format_percent(breakdown.margem_percentual, locale),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CalculationResponse {
    #[serde(flatten)]
    pub result: PricingResult,
    pub formatted: FormattedValues,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ComparisonResponseItem {
    #[serde(flatten)]
    pub item: ComparisonItem,
    pub formatted: Option<FormattedValues>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MarginResponse {
    #[serde(flatten)]
    pub margin: MarginBreakdown,
    pub formatted: FormattedValues,
}

// ---
// Payloads
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSettingsPayload {
    #[validate(custom(function = "validate_percentage"))]
    #[serde(default)]
    #[schema(example = "2.99")]
    pub card_tax_rate: Decimal,

    #[validate(custom(function = "validate_percentage"))]
    #[serde(default)]
    #[schema(example = "5")]
    pub discount_provision: Decimal,

    #[validate(custom(function = "validate_margin"))]
    #[schema(example = "20")]
    pub default_margin: Decimal,

    #[serde(default)]
    pub missing_commission_as_zero: bool,

    #[serde(default)]
    pub formula: PricingFormula,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CalculatePayload {
    pub product_id: Uuid,
    pub marketplace_id: Uuid,

    /// Sem margem, usa a margem padrão da loja
    #[schema(example = "25")]
    pub desired_margin: Option<Decimal>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ComparePayload {
    #[validate(length(min = 1, max = 100, message = "Informe de 1 a 100 produtos."))]
    pub product_ids: Vec<Uuid>,

    #[validate(length(min = 1, max = 50, message = "Informe de 1 a 50 marketplaces."))]
    pub marketplace_ids: Vec<Uuid>,

    pub desired_margin: Option<Decimal>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MarginPayload {
    pub product_id: Uuid,
    pub marketplace_id: Uuid,

    #[validate(custom(function = "validate_not_negative"))]
    #[schema(example = "129.90")]
    pub price: Decimal,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct SavedPricingQuery {
    pub product_id: Option<Uuid>,
}

/// Margem opcional validada com a mesma regra da configuração.
fn check_desired_margin(desired_margin: Option<Decimal>) -> Result<(), AppError> {
    if let Some(margin) = desired_margin {
        if let Err(e) = validate_margin(&margin) {
            let mut errors = ValidationErrors::new();
            errors.add("desiredMargin", e);
            return Err(AppError::ValidationError(errors));
        }
    }
    Ok(())
}

// =============================================================================
//  CONFIGURAÇÃO
// =============================================================================

#[utoipa::path(
    get,
    path = "/api/pricing/settings",
    tag = "Precificação",
    responses((status = 200, description = "Configuração da loja", body = PricingSettings)),
    params(("x-tenant-id" = Uuid, Header, description = "ID da Loja"))
)]
pub async fn get_settings(
    State(app_state): State<AppState>,
    tenant: TenantContext,
) -> Result<impl IntoResponse, ApiError> {
    let settings = app_state.pricing_service.get_settings(tenant.0).await?;
    Ok(Json(settings))
}

#[utoipa::path(
    put,
    path = "/api/pricing/settings",
    tag = "Precificação",
    request_body = UpdateSettingsPayload,
    responses(
        (status = 200, description = "Configuração atualizada", body = PricingSettings),
        (status = 400, description = "Dados inválidos")
    ),
    params(("x-tenant-id" = Uuid, Header, description = "ID da Loja"))
)]
pub async fn update_settings(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    Json(payload): Json<UpdateSettingsPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let settings = PricingSettings {
        tenant_id: tenant.0,
        card_tax_rate: payload.card_tax_rate,
        discount_provision: payload.discount_provision,
        default_margin: payload.default_margin,
        missing_commission_as_zero: payload.missing_commission_as_zero,
        formula: payload.formula,
        updated_at: None,
    };

    let saved = app_state.pricing_service.update_settings(&settings).await?;
    Ok(Json(saved))
}

// =============================================================================
//  CÁLCULO
// =============================================================================

#[utoipa::path(
    post,
    path = "/api/pricing/calculate",
    tag = "Precificação",
    request_body = CalculatePayload,
    responses(
        (status = 200, description = "Preço sugerido", body = CalculationResponse),
        (status = 404, description = "Produto ou marketplace não encontrado"),
        (status = 422, description = "Precificação inviável ou sem comissão")
    ),
    params(
        ("x-tenant-id" = Uuid, Header, description = "ID da Loja"),
        ("accept-language" = Option<String>, Header, description = "Idioma da formatação")
    )
)]
pub async fn calculate(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    locale: Locale,
    Json(payload): Json<CalculatePayload>,
) -> Result<impl IntoResponse, ApiError> {
    check_desired_margin(payload.desired_margin)?;

    let result = app_state
        .pricing_service
        .calculate(tenant.0, payload.product_id, payload.marketplace_id, payload.desired_margin)
        .await?;

    let formatted = FormattedValues::from_result(&result, locale.0);
    Ok(Json(CalculationResponse { result, formatted }))
}

#[utoipa::path(
    post,
    path = "/api/pricing/compare",
    tag = "Precificação",
    request_body = ComparePayload,
    responses(
        (status = 200, description = "Comparação por marketplace (erros por item)", body = Vec<ComparisonResponseItem>),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Produto ou marketplace não encontrado")
    ),
    params(
        ("x-tenant-id" = Uuid, Header, description = "ID da Loja"),
        ("accept-language" = Option<String>, Header, description = "Idioma da formatação")
    )
)]
pub async fn compare(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    locale: Locale,
    Json(payload): Json<ComparePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload.validate().map_err(AppError::ValidationError)?;
    check_desired_margin(payload.desired_margin)?;

    let items = app_state
        .pricing_service
        .compare(tenant.0, &payload.product_ids, &payload.marketplace_ids, payload.desired_margin)
        .await?;

    let response: Vec<ComparisonResponseItem> = items
        .into_iter()
        .map(|item| ComparisonResponseItem {
            formatted: item.result.as_ref().map(|r| FormattedValues::from_result(r, locale.0)),
            item,
        })
        .collect();

    Ok(Json(response))
}

#[utoipa::path(
    post,
    path = "/api/pricing/margin",
    tag = "Precificação",
    request_body = MarginPayload,
    responses(
        (status = 200, description = "Margem realizada ao preço informado", body = MarginResponse),
        (status = 404, description = "Produto ou marketplace não encontrado")
    ),
    params(
        ("x-tenant-id" = Uuid, Header, description = "ID da Loja"),
        ("accept-language" = Option<String>, Header, description = "Idioma da formatação")
    )
)]
pub async fn margin(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    locale: Locale,
    Json(payload): Json<MarginPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let margin = app_state
        .pricing_service
        .margin_at_price(tenant.0, payload.product_id, payload.marketplace_id, payload.price)
        .await?;

    let formatted = FormattedValues::from_breakdown(&margin, locale.0);
    Ok(Json(MarginResponse { margin, formatted }))
}

// =============================================================================
//  PRECIFICAÇÕES SALVAS
// =============================================================================

#[utoipa::path(
    post,
    path = "/api/pricing/saved",
    tag = "Precificação",
    request_body = CalculatePayload,
    responses(
        (status = 201, description = "Precificação calculada e salva", body = SavedPricing),
        (status = 422, description = "Precificação inviável ou sem comissão")
    ),
    params(("x-tenant-id" = Uuid, Header, description = "ID da Loja"))
)]
pub async fn save_pricing(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    Json(payload): Json<CalculatePayload>,
) -> Result<impl IntoResponse, ApiError> {
    check_desired_margin(payload.desired_margin)?;

    let saved = app_state
        .pricing_service
        .save_pricing(tenant.0, payload.product_id, payload.marketplace_id, payload.desired_margin)
        .await?;

    Ok((StatusCode::CREATED, Json(saved)))
}

#[utoipa::path(
    get,
    path = "/api/pricing/saved",
    tag = "Precificação",
    responses((status = 200, description = "Precificações salvas", body = Vec<SavedPricing>)),
    params(
        ("x-tenant-id" = Uuid, Header, description = "ID da Loja"),
        SavedPricingQuery
    )
)]
pub async fn list_saved_pricings(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    Query(query): Query<SavedPricingQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let saved = app_state
        .pricing_service
        .list_saved_pricings(tenant.0, query.product_id)
        .await?;

    Ok(Json(saved))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn result() -> PricingResult {
        PricingResult {
            custo_total: dec!(40),
            valor_fixo: dec!(5),
            frete: dec!(10),
            comissao: dec!(12),
            preco_sugerido: dec!(1234.5),
            margem_unitaria: dec!(28),
            margem_percentual: dec!(28),
            margem_desejada: dec!(28),
            commission_rule_id: None,
            fixed_fee_rule_type: None,
            free_shipping: false,
            formula: PricingFormula::Capped,
        }
    }

    #[test]
    fn valores_formatados_por_idioma() {
        let pt = FormattedValues::from_result(&result(), FormatLocale::PtBr);
        assert_eq!(pt.preco, "R$ 1.234,50");
        assert_eq!(pt.comissao, "12,00%");

        let en = FormattedValues::from_result(&result(), FormatLocale::EnUs);
        assert_eq!(en.preco, "R$1,234.50");
        assert_eq!(en.margem_percentual, "28.00%");
    }

    #[test]
    fn resposta_achata_o_resultado() {
        let response = CalculationResponse {
            formatted: FormattedValues::from_result(&result(), FormatLocale::PtBr),
            result: result(),
        };
        let value = serde_json::to_value(&response).unwrap();
        assert!(value.get("preco_sugerido").is_some());
        assert!(value.get("formula").is_some());
        assert_eq!(value["formatted"]["preco"], json!("R$ 1.234,50"));
    }

    #[test]
    fn margem_desejada_fora_do_intervalo() {
        assert!(check_desired_margin(None).is_ok());
        assert!(check_desired_margin(Some(dec!(30))).is_ok());
        assert!(matches!(check_desired_margin(Some(dec!(100))), Err(AppError::ValidationError(_))));
    }

    #[test]
    fn comparacao_exige_produtos_e_marketplaces() {
        let payload: ComparePayload = serde_json::from_value(json!({
            "productIds": [],
            "marketplaceIds": [Uuid::new_v4()]
        }))
        .unwrap();
        assert!(payload.validate().is_err());
    }
}
