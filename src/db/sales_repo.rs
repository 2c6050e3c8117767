// src/db/sales_repo.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{common::error::AppError, models::sales::Sale};

#[derive(Clone, Default)]
pub struct SalesRepository;

impl SalesRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn create_sale<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        product_id: Uuid,
        marketplace_id: Uuid,
        price_charged: Decimal,
        quantity: i32,
        sold_at: DateTime<Utc>,
    ) -> Result<Sale, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sale = sqlx::query_as::<_, Sale>(
            r#"
            INSERT INTO sales (tenant_id, product_id, marketplace_id, price_charged, quantity, sold_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(product_id)
        .bind(marketplace_id)
        .bind(price_charged)
        .bind(quantity)
        .bind(sold_at)
        .fetch_one(executor)
        .await?;

        Ok(sale)
    }

    pub async fn list_sales<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        marketplace_id: Option<Uuid>,
    ) -> Result<Vec<Sale>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sales = sqlx::query_as::<_, Sale>(
            r#"
            SELECT * FROM sales
            WHERE tenant_id = $1 AND ($2::uuid IS NULL OR marketplace_id = $2)
            ORDER BY sold_at DESC
            "#,
        )
        .bind(tenant_id)
        .bind(marketplace_id)
        .fetch_all(executor)
        .await?;

        Ok(sales)
    }

    pub async fn find_sale<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        sale_id: Uuid,
    ) -> Result<Option<Sale>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sale = sqlx::query_as::<_, Sale>("SELECT * FROM sales WHERE tenant_id = $1 AND id = $2")
            .bind(tenant_id)
            .bind(sale_id)
            .fetch_optional(executor)
            .await?;

        Ok(sale)
    }
}
