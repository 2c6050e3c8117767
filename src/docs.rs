// src/docs.rs

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::OpenApi;

use crate::handlers;
use crate::models;
use crate::pricing;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health,

        // --- Catálogo ---
        handlers::catalog::create_category,
        handlers::catalog::list_categories,
        handlers::catalog::create_product,
        handlers::catalog::list_products,
        handlers::catalog::get_product,
        handlers::catalog::update_product,
        handlers::catalog::delete_product,

        // --- Marketplaces ---
        handlers::marketplaces::create_marketplace,
        handlers::marketplaces::list_marketplaces,
        handlers::marketplaces::list_platforms,
        handlers::marketplaces::delete_marketplace,

        // --- Comissões ---
        handlers::marketplaces::create_commission,
        handlers::marketplaces::list_commissions,
        handlers::marketplaces::update_commission,
        handlers::marketplaces::delete_commission,
        handlers::marketplaces::resolve_commission,

        // --- Valor fixo ---
        handlers::marketplaces::create_fixed_fee,
        handlers::marketplaces::list_fixed_fees,
        handlers::marketplaces::delete_fixed_fee,

        // --- Frete ---
        handlers::marketplaces::upsert_shipping_rule,
        handlers::marketplaces::list_shipping_rules,

        // --- Precificação ---
        handlers::pricing::get_settings,
        handlers::pricing::update_settings,
        handlers::pricing::calculate,
        handlers::pricing::compare,
        handlers::pricing::margin,
        handlers::pricing::save_pricing,
        handlers::pricing::list_saved_pricings,

        // --- Vendas ---
        handlers::sales::create_sale,
        handlers::sales::list_sales,
        handlers::sales::sale_margin,
    ),
    components(
        schemas(
            // --- Catálogo ---
            models::catalog::Category,
            models::catalog::Product,
            handlers::catalog::CreateCategoryPayload,
            handlers::catalog::ProductPayload,

            // --- Marketplaces ---
            models::marketplace::Marketplace,
            models::marketplace::MarketplacePlatform,
            models::marketplace::CommissionRule,
            models::marketplace::FixedFeeRuleRecord,
            models::marketplace::ShippingRule,
            pricing::commission::ResolvedCommission,
            pricing::fixed_fee::FixedFeeRuleType,
            handlers::marketplaces::CreateMarketplacePayload,
            handlers::marketplaces::CommissionPayload,
            handlers::marketplaces::FixedFeePayload,
            handlers::marketplaces::ShippingRulePayload,

            // --- Precificação ---
            pricing::engine::PricingFormula,
            pricing::calculator::PricingResult,
            pricing::calculator::MarginBreakdown,
            pricing::calculator::ComparisonItem,
            models::pricing::PricingSettings,
            models::pricing::SavedPricing,
            handlers::pricing::FormattedValues,
            handlers::pricing::CalculationResponse,
            handlers::pricing::ComparisonResponseItem,
            handlers::pricing::MarginResponse,
            handlers::pricing::UpdateSettingsPayload,
            handlers::pricing::CalculatePayload,
            handlers::pricing::ComparePayload,
            handlers::pricing::MarginPayload,

            // --- Vendas ---
            models::sales::Sale,
            models::sales::SaleMargin,
            handlers::sales::CreateSalePayload,
            handlers::sales::SaleMarginResponse,
        )
    ),
    tags(
        (name = "Sistema", description = "Saúde do serviço"),
        (name = "Catálogo", description = "Categorias e Produtos"),
        (name = "Marketplaces", description = "Plataformas e Modalidades"),
        (name = "Comissões", description = "Comissões por Marketplace e Categoria"),
        (name = "Valor fixo", description = "Regras de Valor Fixo por Faixa de Preço"),
        (name = "Frete", description = "Frete e Limite de Frete Grátis"),
        (name = "Precificação", description = "Preço Sugerido, Comparação e Margem"),
        (name = "Vendas", description = "Vendas e Margem Realizada")
    ),
    modifiers(&TenantHeaderAddon)
)]
pub struct ApiDoc;

struct TenantHeaderAddon;

impl utoipa::Modify for TenantHeaderAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "tenant_id",
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("x-tenant-id"))),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documento_lista_as_rotas_principais() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;
        assert!(paths.contains_key("/api/pricing/calculate"));
        assert!(paths.contains_key("/api/marketplaces/{id}/commissions/resolve"));
        assert!(paths.contains_key("/api/sales/{id}/margin"));

        let schemes = doc.components.as_ref().map(|c| &c.security_schemes);
        assert!(schemes.is_some_and(|s| s.contains_key("tenant_id")));
    }
}
