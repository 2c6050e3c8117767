// src/db/marketplace_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::marketplace::{CommissionRule, FixedFeeRuleRecord, Marketplace, ShippingRule},
    pricing::fixed_fee::FixedFeeRuleType,
};

#[derive(Clone, Default)]
pub struct MarketplaceRepository;

impl MarketplaceRepository {
    pub fn new() -> Self {
        Self
    }

    // =========================================================================
    //  MARKETPLACES (plataformas e modalidades)
    // =========================================================================

    pub async fn create_marketplace<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        parent_id: Option<Uuid>,
        name: &str,
        is_active: bool,
    ) -> Result<Marketplace, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let marketplace = sqlx::query_as::<_, Marketplace>(
            r#"
            INSERT INTO marketplaces (tenant_id, parent_id, name, is_active)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(parent_id)
        .bind(name)
        .bind(is_active)
        .fetch_one(executor)
        .await?;

        Ok(marketplace)
    }

    pub async fn list_marketplaces<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
    ) -> Result<Vec<Marketplace>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let marketplaces = sqlx::query_as::<_, Marketplace>(
            "SELECT * FROM marketplaces WHERE tenant_id = $1 ORDER BY name ASC",
        )
        .bind(tenant_id)
        .fetch_all(executor)
        .await?;

        Ok(marketplaces)
    }

    pub async fn find_marketplace<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        marketplace_id: Uuid,
    ) -> Result<Option<Marketplace>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let marketplace = sqlx::query_as::<_, Marketplace>(
            "SELECT * FROM marketplaces WHERE tenant_id = $1 AND id = $2",
        )
        .bind(tenant_id)
        .bind(marketplace_id)
        .fetch_optional(executor)
        .await?;

        Ok(marketplace)
    }

    pub async fn delete_marketplace<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        marketplace_id: Uuid,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM marketplaces WHERE tenant_id = $1 AND id = $2")
            .bind(tenant_id)
            .bind(marketplace_id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    //  COMISSÕES
    // =========================================================================

    pub async fn list_commissions<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        marketplace_id: Uuid,
    ) -> Result<Vec<CommissionRule>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        // Padrão (category_id NULL) primeiro
        let rules = sqlx::query_as::<_, CommissionRule>(
            r#"
            SELECT * FROM commissions
            WHERE tenant_id = $1 AND marketplace_id = $2
            ORDER BY category_id NULLS FIRST, created_at ASC
            "#,
        )
        .bind(tenant_id)
        .bind(marketplace_id)
        .fetch_all(executor)
        .await?;

        Ok(rules)
    }

    pub async fn find_commission<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        commission_id: Uuid,
    ) -> Result<Option<CommissionRule>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rule = sqlx::query_as::<_, CommissionRule>(
            "SELECT * FROM commissions WHERE tenant_id = $1 AND id = $2",
        )
        .bind(tenant_id)
        .bind(commission_id)
        .fetch_optional(executor)
        .await?;

        Ok(rule)
    }

    pub async fn create_commission<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        marketplace_id: Uuid,
        category_id: Option<Uuid>,
        rate: Decimal,
    ) -> Result<CommissionRule, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rule = sqlx::query_as::<_, CommissionRule>(
            r#"
            INSERT INTO commissions (tenant_id, marketplace_id, category_id, rate)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(marketplace_id)
        .bind(category_id)
        .bind(rate)
        .fetch_one(executor)
        .await?;

        Ok(rule)
    }

    pub async fn update_commission<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        commission_id: Uuid,
        category_id: Option<Uuid>,
        rate: Decimal,
    ) -> Result<Option<CommissionRule>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rule = sqlx::query_as::<_, CommissionRule>(
            r#"
            UPDATE commissions
            SET category_id = $3, rate = $4
            WHERE tenant_id = $1 AND id = $2
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(commission_id)
        .bind(category_id)
        .bind(rate)
        .fetch_optional(executor)
        .await?;

        Ok(rule)
    }

    /// Apaga a regra e devolve o marketplace dela (para invalidar o cache).
    pub async fn delete_commission<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        commission_id: Uuid,
    ) -> Result<Option<Uuid>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let marketplace_id: Option<Uuid> = sqlx::query_scalar(
            "DELETE FROM commissions WHERE tenant_id = $1 AND id = $2 RETURNING marketplace_id",
        )
        .bind(tenant_id)
        .bind(commission_id)
        .fetch_optional(executor)
        .await?;

        Ok(marketplace_id)
    }

    // =========================================================================
    //  VALOR FIXO
    // =========================================================================

    pub async fn list_fixed_fees<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        marketplace_id: Uuid,
    ) -> Result<Vec<FixedFeeRuleRecord>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rules = sqlx::query_as::<_, FixedFeeRuleRecord>(
            r#"
            SELECT * FROM fixed_fee_rules
            WHERE tenant_id = $1 AND marketplace_id = $2
            ORDER BY range_min ASC NULLS LAST, created_at ASC
            "#,
        )
        .bind(tenant_id)
        .bind(marketplace_id)
        .fetch_all(executor)
        .await?;

        Ok(rules)
    }

    pub async fn create_fixed_fee<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        marketplace_id: Uuid,
        rule_type: FixedFeeRuleType,
        range_min: Option<Decimal>,
        range_max: Option<Decimal>,
        value: Decimal,
    ) -> Result<FixedFeeRuleRecord, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rule = sqlx::query_as::<_, FixedFeeRuleRecord>(
            r#"
            INSERT INTO fixed_fee_rules (tenant_id, marketplace_id, rule_type, range_min, range_max, value)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(marketplace_id)
        .bind(rule_type)
        .bind(range_min)
        .bind(range_max)
        .bind(value)
        .fetch_one(executor)
        .await?;

        Ok(rule)
    }

    pub async fn delete_fixed_fee<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        rule_id: Uuid,
    ) -> Result<Option<Uuid>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let marketplace_id: Option<Uuid> = sqlx::query_scalar(
            "DELETE FROM fixed_fee_rules WHERE tenant_id = $1 AND id = $2 RETURNING marketplace_id",
        )
        .bind(tenant_id)
        .bind(rule_id)
        .fetch_optional(executor)
        .await?;

        Ok(marketplace_id)
    }

    // =========================================================================
    //  FRETE (produto x marketplace)
    // =========================================================================

    /// Cria ou substitui a regra de frete do par produto/marketplace.
    pub async fn upsert_shipping_rule<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        product_id: Uuid,
        marketplace_id: Uuid,
        shipping_cost: Decimal,
        free_shipping_threshold: Option<Decimal>,
    ) -> Result<ShippingRule, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rule = sqlx::query_as::<_, ShippingRule>(
            r#"
            INSERT INTO shipping_rules (tenant_id, product_id, marketplace_id, shipping_cost, free_shipping_threshold)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (tenant_id, product_id, marketplace_id) DO UPDATE SET
                shipping_cost = EXCLUDED.shipping_cost,
                free_shipping_threshold = EXCLUDED.free_shipping_threshold,
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(product_id)
        .bind(marketplace_id)
        .bind(shipping_cost)
        .bind(free_shipping_threshold)
        .fetch_one(executor)
        .await?;

        Ok(rule)
    }

    pub async fn list_shipping_rules<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        product_id: Option<Uuid>,
    ) -> Result<Vec<ShippingRule>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rules = sqlx::query_as::<_, ShippingRule>(
            r#"
            SELECT * FROM shipping_rules
            WHERE tenant_id = $1 AND ($2::uuid IS NULL OR product_id = $2)
            ORDER BY updated_at DESC
            "#,
        )
        .bind(tenant_id)
        .bind(product_id)
        .fetch_all(executor)
        .await?;

        Ok(rules)
    }

    pub async fn find_shipping_rule<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        product_id: Uuid,
        marketplace_id: Uuid,
    ) -> Result<Option<ShippingRule>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rule = sqlx::query_as::<_, ShippingRule>(
            r#"
            SELECT * FROM shipping_rules
            WHERE tenant_id = $1 AND product_id = $2 AND marketplace_id = $3
            "#,
        )
        .bind(tenant_id)
        .bind(product_id)
        .bind(marketplace_id)
        .fetch_optional(executor)
        .await?;

        Ok(rule)
    }
}
