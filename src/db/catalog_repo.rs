// src/db/catalog_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::catalog::{Category, Product},
};

/// Campos editáveis de um produto.
#[derive(Debug, Clone)]
pub struct ProductFields<'a> {
    pub category_id: Option<Uuid>,
    pub sku: &'a str,
    pub name: &'a str,
    pub cost_unit: Decimal,
    pub packaging_cost: Decimal,
    pub tax_rate: Decimal,
}

#[derive(Clone, Default)]
pub struct CatalogRepository;

impl CatalogRepository {
    pub fn new() -> Self {
        Self
    }

    // =========================================================================
    //  CATEGORIAS
    // =========================================================================

    pub async fn create_category<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        name: &str,
    ) -> Result<Category, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let category = sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories (tenant_id, name)
            VALUES ($1, $2)
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(name)
        .fetch_one(executor)
        .await?;

        Ok(category)
    }

    pub async fn list_categories<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
    ) -> Result<Vec<Category>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let categories = sqlx::query_as::<_, Category>(
            "SELECT * FROM categories WHERE tenant_id = $1 ORDER BY name ASC",
        )
        .bind(tenant_id)
        .fetch_all(executor)
        .await?;

        Ok(categories)
    }

    pub async fn find_category<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        category_id: Uuid,
    ) -> Result<Option<Category>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let category = sqlx::query_as::<_, Category>(
            "SELECT * FROM categories WHERE tenant_id = $1 AND id = $2",
        )
        .bind(tenant_id)
        .bind(category_id)
        .fetch_optional(executor)
        .await?;

        Ok(category)
    }

    // =========================================================================
    //  PRODUTOS
    // =========================================================================

    pub async fn create_product<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        fields: &ProductFields<'_>,
    ) -> Result<Product, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let product = sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (tenant_id, category_id, sku, name, cost_unit, packaging_cost, tax_rate)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(fields.category_id)
        .bind(fields.sku)
        .bind(fields.name)
        .bind(fields.cost_unit)
        .bind(fields.packaging_cost)
        .bind(fields.tax_rate)
        .fetch_one(executor)
        .await?;

        Ok(product)
    }

    pub async fn update_product<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        product_id: Uuid,
        fields: &ProductFields<'_>,
    ) -> Result<Option<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let product = sqlx::query_as::<_, Product>(
            r#"
            UPDATE products
            SET category_id = $3, sku = $4, name = $5,
                cost_unit = $6, packaging_cost = $7, tax_rate = $8,
                updated_at = NOW()
            WHERE tenant_id = $1 AND id = $2
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(product_id)
        .bind(fields.category_id)
        .bind(fields.sku)
        .bind(fields.name)
        .bind(fields.cost_unit)
        .bind(fields.packaging_cost)
        .bind(fields.tax_rate)
        .fetch_optional(executor)
        .await?;

        Ok(product)
    }

    pub async fn find_product<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        product_id: Uuid,
    ) -> Result<Option<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let product = sqlx::query_as::<_, Product>(
            "SELECT * FROM products WHERE tenant_id = $1 AND id = $2",
        )
        .bind(tenant_id)
        .bind(product_id)
        .fetch_optional(executor)
        .await?;

        Ok(product)
    }

    pub async fn find_products<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        product_ids: &[Uuid],
    ) -> Result<Vec<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let products = sqlx::query_as::<_, Product>(
            "SELECT * FROM products WHERE tenant_id = $1 AND id = ANY($2) ORDER BY name ASC",
        )
        .bind(tenant_id)
        .bind(product_ids)
        .fetch_all(executor)
        .await?;

        Ok(products)
    }

    pub async fn list_products<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
    ) -> Result<Vec<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let products = sqlx::query_as::<_, Product>(
            "SELECT * FROM products WHERE tenant_id = $1 ORDER BY name ASC",
        )
        .bind(tenant_id)
        .fetch_all(executor)
        .await?;

        Ok(products)
    }

    /// Retorna `true` se algo foi apagado.
    pub async fn delete_product<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        product_id: Uuid,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM products WHERE tenant_id = $1 AND id = $2")
            .bind(tenant_id)
            .bind(product_id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
