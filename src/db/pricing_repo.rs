// src/db/pricing_repo.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::pricing::{NewSavedPricing, PricingSettings, SavedPricing},
};

#[derive(Clone, Default)]
pub struct PricingRepository;

impl PricingRepository {
    pub fn new() -> Self {
        Self
    }

    // --- CONFIGURAÇÃO ---

    pub async fn get_settings<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
    ) -> Result<Option<PricingSettings>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let settings = sqlx::query_as::<_, PricingSettings>(
            "SELECT * FROM pricing_settings WHERE tenant_id = $1",
        )
        .bind(tenant_id)
        .fetch_optional(executor)
        .await?;

        Ok(settings)
    }

    pub async fn upsert_settings<'e, E>(
        &self,
        executor: E,
        settings: &PricingSettings,
    ) -> Result<PricingSettings, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let saved = sqlx::query_as::<_, PricingSettings>(
            r#"
            INSERT INTO pricing_settings
                (tenant_id, card_tax_rate, discount_provision, default_margin, missing_commission_as_zero, formula)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (tenant_id) DO UPDATE SET
                card_tax_rate = EXCLUDED.card_tax_rate,
                discount_provision = EXCLUDED.discount_provision,
                default_margin = EXCLUDED.default_margin,
                missing_commission_as_zero = EXCLUDED.missing_commission_as_zero,
                formula = EXCLUDED.formula,
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(settings.tenant_id)
        .bind(settings.card_tax_rate)
        .bind(settings.discount_provision)
        .bind(settings.default_margin)
        .bind(settings.missing_commission_as_zero)
        .bind(settings.formula)
        .fetch_one(executor)
        .await?;

        Ok(saved)
    }

    // --- PRECIFICAÇÕES SALVAS ---

    pub async fn insert_saved_pricing<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        new: &NewSavedPricing,
    ) -> Result<SavedPricing, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let r = &new.result;
        let saved = sqlx::query_as::<_, SavedPricing>(
            r#"
            INSERT INTO saved_pricings (
                tenant_id, product_id, marketplace_id, desired_margin, formula,
                custo_total, valor_fixo, frete, comissao,
                preco_sugerido, margem_unitaria, margem_percentual
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(new.product_id)
        .bind(new.marketplace_id)
        .bind(r.margem_desejada)
        .bind(r.formula)
        .bind(r.custo_total)
        .bind(r.valor_fixo)
        .bind(r.frete)
        .bind(r.comissao)
        .bind(r.preco_sugerido)
        .bind(r.margem_unitaria)
        .bind(r.margem_percentual)
        .fetch_one(executor)
        .await?;

        Ok(saved)
    }

    pub async fn list_saved_pricings<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        product_id: Option<Uuid>,
    ) -> Result<Vec<SavedPricing>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let saved = sqlx::query_as::<_, SavedPricing>(
            r#"
            SELECT * FROM saved_pricings
            WHERE tenant_id = $1 AND ($2::uuid IS NULL OR product_id = $2)
            ORDER BY created_at DESC
            "#,
        )
        .bind(tenant_id)
        .bind(product_id)
        .fetch_all(executor)
        .await?;

        Ok(saved)
    }
}
