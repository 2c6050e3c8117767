// src/services/sales_service.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::SalesRepository,
    models::sales::{Sale, SaleMargin},
    pricing::PricingError,
    services::{
        catalog_service::CatalogService, marketplace_service::MarketplaceService,
        pricing_service::PricingService,
    },
};

#[derive(Clone)]
pub struct SalesService {
    repo: SalesRepository,
    pool: PgPool,
    catalog_service: CatalogService,
    marketplace_service: MarketplaceService,
    pricing_service: PricingService,
}

impl SalesService {
    pub fn new(
        pool: PgPool,
        catalog_service: CatalogService,
        marketplace_service: MarketplaceService,
        pricing_service: PricingService,
    ) -> Self {
        Self { repo: SalesRepository::new(), pool, catalog_service, marketplace_service, pricing_service }
    }

    pub async fn record_sale(
        &self,
        tenant_id: Uuid,
        product_id: Uuid,
        marketplace_id: Uuid,
        price_charged: Decimal,
        quantity: i32,
        sold_at: Option<DateTime<Utc>>,
    ) -> Result<Sale, AppError> {
        if price_charged < Decimal::ZERO {
            return Err(PricingError::validation("priceCharged", "o preço não pode ser negativo").into());
        }
        if quantity < 1 {
            return Err(PricingError::validation("quantity", "a quantidade deve ser ao menos 1").into());
        }

        // Produto e marketplace precisam ser da mesma loja
        self.catalog_service.get_product(tenant_id, product_id).await?;
        self.marketplace_service.get_marketplace(tenant_id, marketplace_id).await?;

        let sale = self
            .repo
            .create_sale(
                &self.pool,
                tenant_id,
                product_id,
                marketplace_id,
                price_charged,
                quantity,
                sold_at.unwrap_or_else(Utc::now),
            )
            .await?;

        tracing::info!(%tenant_id, sale_id = %sale.id, %product_id, %marketplace_id, "Venda registrada");
        Ok(sale)
    }

    pub async fn list_sales(&self, tenant_id: Uuid, marketplace_id: Option<Uuid>) -> Result<Vec<Sale>, AppError> {
        self.repo.list_sales(&self.pool, tenant_id, marketplace_id).await
    }

    /// Margem realizada da venda com as regras vigentes hoje.
    pub async fn sale_margin(&self, tenant_id: Uuid, sale_id: Uuid) -> Result<SaleMargin, AppError> {
        let sale = self
            .repo
            .find_sale(&self.pool, tenant_id, sale_id)
            .await?
            .ok_or(AppError::NotFound("Venda"))?;

        let unit = self
            .pricing_service
            .margin_at_price(tenant_id, sale.product_id, sale.marketplace_id, sale.price_charged)
            .await?;

        Ok(SaleMargin::new(&sale, unit))
    }
}
