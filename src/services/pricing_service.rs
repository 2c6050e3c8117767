// src/services/pricing_service.rs

use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::PricingRepository,
    models::{
        catalog::Product,
        pricing::{NewSavedPricing, PricingSettings, SavedPricing},
    },
    pricing::{
        calculator::{self, CalculationInput, ComparisonItem, MarginBreakdown, MarketplaceTerms, PricingResult},
        shipping::ShippingTerms,
        PricingError,
    },
    services::{
        catalog_service::CatalogService,
        marketplace_service::{MarketplaceRules, MarketplaceService},
    },
};

/// Tudo o que o cálculo de um produto num marketplace precisa, já carregado.
struct LoadedTerms {
    rules: MarketplaceRules,
    shipping: ShippingTerms,
}

impl LoadedTerms {
    fn terms(&self) -> MarketplaceTerms<'_> {
        MarketplaceTerms {
            marketplace_id: self.rules.marketplace.id,
            marketplace_name: &self.rules.marketplace.name,
            commission_rules: &self.rules.commissions,
            fixed_fees: &self.rules.fixed_fees,
            shipping: self.shipping,
        }
    }
}

#[derive(Clone)]
pub struct PricingService {
    repo: PricingRepository,
    pool: PgPool,
    catalog_service: CatalogService,
    marketplace_service: MarketplaceService,
}

impl PricingService {
    pub fn new(pool: PgPool, catalog_service: CatalogService, marketplace_service: MarketplaceService) -> Self {
        Self {
            repo: PricingRepository::new(),
            pool,
            catalog_service,
            marketplace_service,
        }
    }

    // =========================================================================
    //  CONFIGURAÇÃO
    // =========================================================================

    /// Configuração da loja; sem registro, os padrões.
    pub async fn get_settings(&self, tenant_id: Uuid) -> Result<PricingSettings, AppError> {
        let settings = self.repo.get_settings(&self.pool, tenant_id).await?;
        Ok(settings.unwrap_or_else(|| PricingSettings::defaults(tenant_id)))
    }

    pub async fn update_settings(&self, settings: &PricingSettings) -> Result<PricingSettings, AppError> {
        if settings.default_margin >= Decimal::ONE_HUNDRED {
            return Err(PricingError::validation("defaultMargin", "a margem deve ser menor que 100%").into());
        }
        let saved = self.repo.upsert_settings(&self.pool, settings).await?;
        tracing::info!(tenant_id = %saved.tenant_id, formula = ?saved.formula, "Configuração de precificação atualizada");
        Ok(saved)
    }

    // =========================================================================
    //  CÁLCULO
    // =========================================================================

    async fn load_terms(&self, tenant_id: Uuid, product_id: Uuid, marketplace_id: Uuid) -> Result<LoadedTerms, AppError> {
        let rules = self.marketplace_service.pricing_rules(tenant_id, marketplace_id).await?;
        let shipping = self
            .marketplace_service
            .shipping_terms(tenant_id, product_id, marketplace_id)
            .await?;
        Ok(LoadedTerms { rules, shipping })
    }

    /// Preço sugerido de um produto num marketplace. Sem margem informada,
    /// usa a margem padrão da loja.
    pub async fn calculate(
        &self,
        tenant_id: Uuid,
        product_id: Uuid,
        marketplace_id: Uuid,
        desired_margin: Option<Decimal>,
    ) -> Result<PricingResult, AppError> {
        let settings = self.get_settings(tenant_id).await?;
        let product = self.catalog_service.get_product(tenant_id, product_id).await?;
        let loaded = self.load_terms(tenant_id, product_id, marketplace_id).await?;

        let input = CalculationInput {
            product: product.pricing_inputs(),
            marketplace: loaded.terms(),
            policy: settings.policy(),
            desired_margin: desired_margin.unwrap_or(settings.default_margin),
        };

        Ok(calculator::calculate(&input)?)
    }

    /// Comparação produto × marketplace. Erros de cálculo ficam no item;
    /// produto ou marketplace inexistente aborta a comparação.
    pub async fn compare(
        &self,
        tenant_id: Uuid,
        product_ids: &[Uuid],
        marketplace_ids: &[Uuid],
        desired_margin: Option<Decimal>,
    ) -> Result<Vec<ComparisonItem>, AppError> {
        let settings = self.get_settings(tenant_id).await?;
        let products = self.catalog_service.get_products(tenant_id, product_ids).await?;

        let mut loaded: Vec<(&Product, LoadedTerms)> = Vec::with_capacity(products.len() * marketplace_ids.len());
        for product in &products {
            for marketplace_id in marketplace_ids {
                let terms = self.load_terms(tenant_id, product.id, *marketplace_id).await?;
                loaded.push((product, terms));
            }
        }

        let policy = settings.policy();
        let desired_margin = desired_margin.unwrap_or(settings.default_margin);
        let inputs = loaded.iter().map(|(product, terms)| CalculationInput {
            product: product.pricing_inputs(),
            marketplace: terms.terms(),
            policy,
            desired_margin,
        });

        let items = calculator::compare(inputs);
        tracing::info!(
            %tenant_id,
            total = items.len(),
            with_error = items.iter().filter(|i| i.has_error).count(),
            "Comparação de preços concluída"
        );
        Ok(items)
    }

    /// Margem realizada a um preço qualquer.
    pub async fn margin_at_price(
        &self,
        tenant_id: Uuid,
        product_id: Uuid,
        marketplace_id: Uuid,
        price: Decimal,
    ) -> Result<MarginBreakdown, AppError> {
        let settings = self.get_settings(tenant_id).await?;
        let product = self.catalog_service.get_product(tenant_id, product_id).await?;
        let loaded = self.load_terms(tenant_id, product_id, marketplace_id).await?;

        Ok(calculator::margin_at(
            price,
            &product.pricing_inputs(),
            &loaded.terms(),
            &settings.policy(),
        )?)
    }

    // =========================================================================
    //  PRECIFICAÇÕES SALVAS
    // =========================================================================

    /// Calcula e grava o resultado (entradas + saídas) para consulta posterior.
    pub async fn save_pricing(
        &self,
        tenant_id: Uuid,
        product_id: Uuid,
        marketplace_id: Uuid,
        desired_margin: Option<Decimal>,
    ) -> Result<SavedPricing, AppError> {
        let result = self.calculate(tenant_id, product_id, marketplace_id, desired_margin).await?;

        let new = NewSavedPricing { product_id, marketplace_id, result };
        let saved = self.repo.insert_saved_pricing(&self.pool, tenant_id, &new).await?;

        tracing::info!(%tenant_id, %product_id, %marketplace_id, preco = %saved.preco_sugerido, "Precificação salva");
        Ok(saved)
    }

    pub async fn list_saved_pricings(&self, tenant_id: Uuid, product_id: Option<Uuid>) -> Result<Vec<SavedPricing>, AppError> {
        self.repo.list_saved_pricings(&self.pool, tenant_id, product_id).await
    }
}
