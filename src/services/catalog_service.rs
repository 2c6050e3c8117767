// src/services/catalog_service.rs

use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{CatalogRepository, ProductFields},
    models::catalog::{Category, Product},
    pricing::PricingError,
};

#[derive(Clone)]
pub struct CatalogService {
    repo: CatalogRepository,
    pool: PgPool,
}

impl CatalogService {
    pub fn new(pool: PgPool) -> Self {
        Self { repo: CatalogRepository::new(), pool }
    }

    // --- CATEGORIAS ---

    pub async fn create_category(&self, tenant_id: Uuid, name: &str) -> Result<Category, AppError> {
        let category = self.repo.create_category(&self.pool, tenant_id, name.trim()).await?;
        tracing::info!(%tenant_id, category_id = %category.id, "Categoria criada");
        Ok(category)
    }

    pub async fn list_categories(&self, tenant_id: Uuid) -> Result<Vec<Category>, AppError> {
        self.repo.list_categories(&self.pool, tenant_id).await
    }

    /// A categoria informada precisa existir na mesma loja.
    pub async fn ensure_category(&self, tenant_id: Uuid, category_id: Option<Uuid>) -> Result<(), AppError> {
        let Some(category_id) = category_id else {
            return Ok(());
        };
        self.repo
            .find_category(&self.pool, tenant_id, category_id)
            .await?
            .ok_or(AppError::NotFound("Categoria"))?;
        Ok(())
    }

    // --- PRODUTOS ---

    pub async fn create_product(&self, tenant_id: Uuid, fields: &ProductFields<'_>) -> Result<Product, AppError> {
        validate_costs(fields)?;
        self.ensure_category(tenant_id, fields.category_id).await?;
        let product = self.repo.create_product(&self.pool, tenant_id, fields).await?;
        tracing::info!(%tenant_id, product_id = %product.id, sku = %product.sku, "Produto criado");
        Ok(product)
    }

    pub async fn update_product(
        &self,
        tenant_id: Uuid,
        product_id: Uuid,
        fields: &ProductFields<'_>,
    ) -> Result<Product, AppError> {
        validate_costs(fields)?;
        self.ensure_category(tenant_id, fields.category_id).await?;
        self.repo
            .update_product(&self.pool, tenant_id, product_id, fields)
            .await?
            .ok_or(AppError::NotFound("Produto"))
    }

    pub async fn get_product(&self, tenant_id: Uuid, product_id: Uuid) -> Result<Product, AppError> {
        self.repo
            .find_product(&self.pool, tenant_id, product_id)
            .await?
            .ok_or(AppError::NotFound("Produto"))
    }

    /// Busca vários produtos; ids ausentes são um erro (não se compara o que não existe).
    pub async fn get_products(&self, tenant_id: Uuid, product_ids: &[Uuid]) -> Result<Vec<Product>, AppError> {
        let products = self.repo.find_products(&self.pool, tenant_id, product_ids).await?;
        if product_ids.iter().any(|id| !products.iter().any(|p| p.id == *id)) {
            return Err(AppError::NotFound("Produto"));
        }
        Ok(products)
    }

    pub async fn list_products(&self, tenant_id: Uuid) -> Result<Vec<Product>, AppError> {
        self.repo.list_products(&self.pool, tenant_id).await
    }

    pub async fn delete_product(&self, tenant_id: Uuid, product_id: Uuid) -> Result<(), AppError> {
        if !self.repo.delete_product(&self.pool, tenant_id, product_id).await? {
            return Err(AppError::NotFound("Produto"));
        }
        tracing::info!(%tenant_id, %product_id, "Produto removido");
        Ok(())
    }
}

/// Regras do domínio que o banco não garante sozinho.
fn validate_costs(fields: &ProductFields<'_>) -> Result<(), PricingError> {
    if fields.cost_unit < Decimal::ZERO {
        return Err(PricingError::validation("costUnit", "o custo não pode ser negativo"));
    }
    if fields.packaging_cost < Decimal::ZERO {
        return Err(PricingError::validation("packagingCost", "o custo não pode ser negativo"));
    }
    if fields.tax_rate < Decimal::ZERO || fields.tax_rate > Decimal::ONE_HUNDRED {
        return Err(PricingError::validation("taxRate", "a alíquota deve estar entre 0 e 100"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use rust_decimal_macros::dec;

    fn fields(cost_unit: Decimal, tax_rate: Decimal) -> ProductFields<'static> {
        ProductFields {
            category_id: None,
            sku: "SKU-1",
            name: "Produto",
            cost_unit,
            packaging_cost: dec!(1),
            tax_rate,
        }
    }

    #[test]
    fn custos_validos_passam() {
        assert!(validate_costs(&fields(dec!(0), dec!(0))).is_ok());
        assert!(validate_costs(&fields(dec!(35.9), dec!(100))).is_ok());
    }

    #[test]
    fn custos_invalidos_sao_recusados() {
        assert_matches!(
            validate_costs(&fields(dec!(-0.01), dec!(0))),
            Err(PricingError::Validation { field: "costUnit", .. })
        );
        assert_matches!(
            validate_costs(&fields(dec!(10), dec!(100.5))),
            Err(PricingError::Validation { field: "taxRate", .. })
        );
    }
}
