// src/services/marketplace_service.rs

use std::sync::Arc;

use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{cache::RuleCache, error::AppError},
    db::{CatalogRepository, MarketplaceRepository},
    models::marketplace::{
        CommissionRule, FixedFeeRuleRecord, Marketplace, MarketplacePlatform, ShippingRule,
    },
    pricing::{
        commission::{self, CommissionRuleRef, ResolvedCommission},
        fixed_fee::{FixedFeeRule, FixedFeeRuleType, FixedFeeSchedule},
        shipping::ShippingTerms,
    },
};

/// Regras de um marketplace prontas para o cálculo.
#[derive(Debug, Clone)]
pub struct MarketplaceRules {
    pub marketplace: Marketplace,
    pub commissions: Vec<CommissionRuleRef>,
    pub fixed_fees: FixedFeeSchedule,
}

#[derive(Clone)]
pub struct MarketplaceService {
    repo: MarketplaceRepository,
    catalog_repo: CatalogRepository,
    pool: PgPool,
    cache: RuleCache,
}

impl MarketplaceService {
    pub fn new(pool: PgPool, cache: RuleCache) -> Self {
        Self { repo: MarketplaceRepository::new(), catalog_repo: CatalogRepository::new(), pool, cache }
    }

    // =========================================================================
    //  MARKETPLACES
    // =========================================================================

    pub async fn create_marketplace(
        &self,
        tenant_id: Uuid,
        parent_id: Option<Uuid>,
        name: &str,
        is_active: bool,
    ) -> Result<Marketplace, AppError> {
        // A plataforma pai precisa ser da mesma loja
        if let Some(parent) = parent_id {
            self.get_marketplace(tenant_id, parent).await?;
        }

        let marketplace = self
            .repo
            .create_marketplace(&self.pool, tenant_id, parent_id, name.trim(), is_active)
            .await?;

        tracing::info!(%tenant_id, marketplace_id = %marketplace.id, "Marketplace criado");
        Ok(marketplace)
    }

    pub async fn get_marketplace(&self, tenant_id: Uuid, marketplace_id: Uuid) -> Result<Marketplace, AppError> {
        self.repo
            .find_marketplace(&self.pool, tenant_id, marketplace_id)
            .await?
            .ok_or(AppError::NotFound("Marketplace"))
    }

    pub async fn list_marketplaces(&self, tenant_id: Uuid) -> Result<Vec<Marketplace>, AppError> {
        self.repo.list_marketplaces(&self.pool, tenant_id).await
    }

    /// Plataformas com as suas modalidades.
    pub async fn list_platforms(&self, tenant_id: Uuid) -> Result<Vec<MarketplacePlatform>, AppError> {
        let marketplaces = self.repo.list_marketplaces(&self.pool, tenant_id).await?;
        Ok(MarketplacePlatform::group(marketplaces))
    }

    pub async fn delete_marketplace(&self, tenant_id: Uuid, marketplace_id: Uuid) -> Result<(), AppError> {
        if !self.repo.delete_marketplace(&self.pool, tenant_id, marketplace_id).await? {
            return Err(AppError::NotFound("Marketplace"));
        }
        self.cache.invalidate_marketplace(tenant_id, marketplace_id);
        tracing::info!(%tenant_id, %marketplace_id, "Marketplace removido");
        Ok(())
    }

    // =========================================================================
    //  COMISSÕES
    // =========================================================================

    /// Leitura com cache por (tenant, marketplace).
    pub async fn commissions(&self, tenant_id: Uuid, marketplace_id: Uuid) -> Result<Arc<Vec<CommissionRule>>, AppError> {
        if let Some(rules) = self.cache.commissions(tenant_id, marketplace_id) {
            return Ok(rules);
        }
        let rules = self.repo.list_commissions(&self.pool, tenant_id, marketplace_id).await?;
        Ok(self.cache.store_commissions(tenant_id, marketplace_id, rules))
    }

    /// `rate_percent` chega em 0–100 e é gravado como fração.
    pub async fn create_commission(
        &self,
        tenant_id: Uuid,
        marketplace_id: Uuid,
        category_id: Option<Uuid>,
        rate_percent: Decimal,
    ) -> Result<CommissionRule, AppError> {
        let rate = commission::rate_from_percent(rate_percent)?;

        let mut tx = self.pool.begin().await?;

        // Garante que o marketplace existe (e é da loja) antes de checar duplicatas
        self.repo
            .find_marketplace(&mut *tx, tenant_id, marketplace_id)
            .await?
            .ok_or(AppError::NotFound("Marketplace"))?;
        if let Some(category) = category_id {
            self.catalog_repo
                .find_category(&mut *tx, tenant_id, category)
                .await?
                .ok_or(AppError::NotFound("Categoria"))?;
        }

        let existing = self.repo.list_commissions(&mut *tx, tenant_id, marketplace_id).await?;
        let refs: Vec<CommissionRuleRef> = existing.iter().map(CommissionRuleRef::from).collect();
        commission::ensure_unique(&refs, marketplace_id, category_id, None)?;

        let rule = self
            .repo
            .create_commission(&mut *tx, tenant_id, marketplace_id, category_id, rate)
            .await?;

        tx.commit().await?;
        self.cache.invalidate_marketplace(tenant_id, marketplace_id);

        tracing::info!(%tenant_id, %marketplace_id, commission_id = %rule.id, "Comissão criada");
        Ok(rule)
    }

    pub async fn update_commission(
        &self,
        tenant_id: Uuid,
        commission_id: Uuid,
        category_id: Option<Uuid>,
        rate_percent: Decimal,
    ) -> Result<CommissionRule, AppError> {
        let rate = commission::rate_from_percent(rate_percent)?;

        let mut tx = self.pool.begin().await?;

        let current = self
            .repo
            .find_commission(&mut *tx, tenant_id, commission_id)
            .await?
            .ok_or(AppError::NotFound("Comissão"))?;
        if let Some(category) = category_id {
            self.catalog_repo
                .find_category(&mut *tx, tenant_id, category)
                .await?
                .ok_or(AppError::NotFound("Categoria"))?;
        }

        let existing = self.repo.list_commissions(&mut *tx, tenant_id, current.marketplace_id).await?;
        let refs: Vec<CommissionRuleRef> = existing.iter().map(CommissionRuleRef::from).collect();
        commission::ensure_unique(&refs, current.marketplace_id, category_id, Some(commission_id))?;

        let rule = self
            .repo
            .update_commission(&mut *tx, tenant_id, commission_id, category_id, rate)
            .await?
            .ok_or(AppError::NotFound("Comissão"))?;

        tx.commit().await?;
        self.cache.invalidate_marketplace(tenant_id, rule.marketplace_id);
        Ok(rule)
    }

    pub async fn delete_commission(&self, tenant_id: Uuid, commission_id: Uuid) -> Result<(), AppError> {
        let marketplace_id = self
            .repo
            .delete_commission(&self.pool, tenant_id, commission_id)
            .await?
            .ok_or(AppError::NotFound("Comissão"))?;

        self.cache.invalidate_marketplace(tenant_id, marketplace_id);
        Ok(())
    }

    /// Comissão efetiva para uma categoria (ou a padrão do marketplace).
    pub async fn resolve_commission(
        &self,
        tenant_id: Uuid,
        marketplace_id: Uuid,
        category_id: Option<Uuid>,
    ) -> Result<ResolvedCommission, AppError> {
        let rules = self.commissions(tenant_id, marketplace_id).await?;
        let refs: Vec<CommissionRuleRef> = rules.iter().map(CommissionRuleRef::from).collect();
        Ok(commission::resolve(&refs, marketplace_id, category_id)?)
    }

    // =========================================================================
    //  VALOR FIXO
    // =========================================================================

    pub async fn fixed_fees(&self, tenant_id: Uuid, marketplace_id: Uuid) -> Result<Arc<Vec<FixedFeeRuleRecord>>, AppError> {
        if let Some(rules) = self.cache.fixed_fees(tenant_id, marketplace_id) {
            return Ok(rules);
        }
        let rules = self.repo.list_fixed_fees(&self.pool, tenant_id, marketplace_id).await?;
        Ok(self.cache.store_fixed_fees(tenant_id, marketplace_id, rules))
    }

    pub async fn create_fixed_fee(
        &self,
        tenant_id: Uuid,
        marketplace_id: Uuid,
        rule_type: FixedFeeRuleType,
        range_min: Option<Decimal>,
        range_max: Option<Decimal>,
        value: Decimal,
    ) -> Result<FixedFeeRuleRecord, AppError> {
        // Valida a combinação tipo/faixa/valor antes de gravar
        let rule = FixedFeeRule::from_parts(rule_type, range_min, range_max, value)?;
        let (range_min, range_max) = match rule.range() {
            Some(range) => (Some(range.min), Some(range.max)),
            None => (None, None),
        };

        self.get_marketplace(tenant_id, marketplace_id).await?;

        let record = self
            .repo
            .create_fixed_fee(&self.pool, tenant_id, marketplace_id, rule_type, range_min, range_max, value)
            .await?;

        self.cache.invalidate_marketplace(tenant_id, marketplace_id);
        tracing::info!(%tenant_id, %marketplace_id, rule_id = %record.id, "Regra de valor fixo criada");
        Ok(record)
    }

    pub async fn delete_fixed_fee(&self, tenant_id: Uuid, rule_id: Uuid) -> Result<(), AppError> {
        let marketplace_id = self
            .repo
            .delete_fixed_fee(&self.pool, tenant_id, rule_id)
            .await?
            .ok_or(AppError::NotFound("Regra de valor fixo"))?;

        self.cache.invalidate_marketplace(tenant_id, marketplace_id);
        Ok(())
    }

    // =========================================================================
    //  FRETE
    // =========================================================================

    pub async fn upsert_shipping_rule(
        &self,
        tenant_id: Uuid,
        product_id: Uuid,
        marketplace_id: Uuid,
        shipping_cost: Decimal,
        free_shipping_threshold: Option<Decimal>,
    ) -> Result<ShippingRule, AppError> {
        ShippingTerms::new(shipping_cost, free_shipping_threshold)?;

        self.catalog_repo
            .find_product(&self.pool, tenant_id, product_id)
            .await?
            .ok_or(AppError::NotFound("Produto"))?;
        self.get_marketplace(tenant_id, marketplace_id).await?;

        let rule = self
            .repo
            .upsert_shipping_rule(&self.pool, tenant_id, product_id, marketplace_id, shipping_cost, free_shipping_threshold)
            .await?;

        tracing::info!(%tenant_id, %product_id, %marketplace_id, "Regra de frete gravada");
        Ok(rule)
    }

    pub async fn list_shipping_rules(&self, tenant_id: Uuid, product_id: Option<Uuid>) -> Result<Vec<ShippingRule>, AppError> {
        self.repo.list_shipping_rules(&self.pool, tenant_id, product_id).await
    }

    /// Frete do par produto/marketplace; sem regra, frete zero.
    pub async fn shipping_terms(
        &self,
        tenant_id: Uuid,
        product_id: Uuid,
        marketplace_id: Uuid,
    ) -> Result<ShippingTerms, AppError> {
        let rule = self
            .repo
            .find_shipping_rule(&self.pool, tenant_id, product_id, marketplace_id)
            .await?;

        match rule {
            Some(rule) => Ok(rule.terms()?),
            None => Ok(ShippingTerms::default()),
        }
    }

    // =========================================================================
    //  REGRAS PARA O CÁLCULO
    // =========================================================================

    pub async fn pricing_rules(&self, tenant_id: Uuid, marketplace_id: Uuid) -> Result<MarketplaceRules, AppError> {
        let marketplace = self.get_marketplace(tenant_id, marketplace_id).await?;
        let commissions = self.commissions(tenant_id, marketplace_id).await?;
        let fixed_fees = self.fixed_fees(tenant_id, marketplace_id).await?;

        Ok(MarketplaceRules {
            marketplace,
            commissions: commissions.iter().map(CommissionRuleRef::from).collect(),
            fixed_fees: schedule_from_records(&fixed_fees)?,
        })
    }
}

/// Converte os registros do banco; um registro inconsistente é erro de validação.
pub fn schedule_from_records(records: &[FixedFeeRuleRecord]) -> Result<FixedFeeSchedule, AppError> {
    let rules = records
        .iter()
        .map(FixedFeeRuleRecord::to_rule)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(FixedFeeSchedule::new(rules))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn record(rule_type: FixedFeeRuleType, min: Option<Decimal>, max: Option<Decimal>, value: Decimal) -> FixedFeeRuleRecord {
        FixedFeeRuleRecord {
            id: Uuid::new_v4(),
            tenant_id: Uuid::nil(),
            marketplace_id: Uuid::nil(),
            rule_type,
            range_min: min,
            range_max: max,
            value,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn registros_viram_tabela_de_valor_fixo() {
        let schedule = schedule_from_records(&[
            record(FixedFeeRuleType::Faixa, Some(dec!(100.01)), Some(dec!(500)), dec!(8)),
            record(FixedFeeRuleType::Constante, None, None, dec!(3)),
            record(FixedFeeRuleType::Faixa, Some(dec!(0)), Some(dec!(100)), dec!(5)),
        ])
        .unwrap();

        assert_eq!(schedule.fee_at(dec!(99.99)), dec!(5));
        assert_eq!(schedule.fee_at(dec!(150)), dec!(8));
        assert_eq!(schedule.fee_at(dec!(900)), dec!(3));
    }

    #[test]
    fn registro_inconsistente_e_recusado() {
        let result = schedule_from_records(&[record(FixedFeeRuleType::Faixa, None, Some(dec!(10)), dec!(1))]);
        assert!(matches!(result, Err(AppError::Pricing(_))));
    }
}
