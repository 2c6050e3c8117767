// src/models/marketplace.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::pricing::{
    commission::CommissionRuleRef,
    fixed_fee::{FixedFeeRule, FixedFeeRuleType},
    shipping::ShippingTerms,
    PricingError,
};

// ---
// 1. Marketplace
// ---
// Pode ser uma "plataforma" (parent_id = NULL) ou uma "modalidade" dela,
// ex: "Mercado Livre" -> "Clássico" / "Premium".
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Marketplace {
    pub id: Uuid,

    #[schema(ignore)]
    pub tenant_id: Uuid,

    pub parent_id: Option<Uuid>,

    #[schema(example = "Mercado Livre Clássico")]
    pub name: String,

    #[schema(example = true)]
    pub is_active: bool,

    pub created_at: DateTime<Utc>,
}

/// Plataforma com as suas modalidades.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MarketplacePlatform {
    #[serde(flatten)]
    pub platform: Marketplace,
    pub modalities: Vec<Marketplace>,
}

impl MarketplacePlatform {
    /// Agrupa as modalidades sob a plataforma. Modalidades cujo pai não está na
    /// lista viram plataformas sem filhos.
    pub fn group(marketplaces: Vec<Marketplace>) -> Vec<MarketplacePlatform> {
        let (roots, children): (Vec<_>, Vec<_>) = marketplaces
            .into_iter()
            .partition(|m| m.parent_id.is_none());

        let mut platforms: Vec<MarketplacePlatform> = roots
            .into_iter()
            .map(|platform| MarketplacePlatform { platform, modalities: Vec::new() })
            .collect();

        for child in children {
            match platforms.iter_mut().find(|p| Some(p.platform.id) == child.parent_id) {
                Some(parent) => parent.modalities.push(child),
                None => platforms.push(MarketplacePlatform { platform: child, modalities: Vec::new() }),
            }
        }
        platforms
    }
}

// ---
// 2. Regra de comissão
// ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommissionRule {
    pub id: Uuid,

    #[schema(ignore)]
    pub tenant_id: Uuid,

    pub marketplace_id: Uuid,

    /// NULL = padrão do marketplace
    pub category_id: Option<Uuid>,

    /// Fração (0.12 = 12%)
    #[schema(example = "0.12")]
    pub rate: Decimal,

    pub created_at: DateTime<Utc>,
}

impl From<&CommissionRule> for CommissionRuleRef {
    fn from(rule: &CommissionRule) -> Self {
        CommissionRuleRef {
            id: rule.id,
            marketplace_id: rule.marketplace_id,
            category_id: rule.category_id,
            rate: rule.rate,
        }
    }
}

// ---
// 3. Regra de valor fixo (registro plano do banco)
// ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FixedFeeRuleRecord {
    pub id: Uuid,

    #[schema(ignore)]
    pub tenant_id: Uuid,

    pub marketplace_id: Uuid,

    pub rule_type: FixedFeeRuleType,

    #[schema(example = "0")]
    pub range_min: Option<Decimal>,

    #[schema(example = "79")]
    pub range_max: Option<Decimal>,

    /// Reais (constante/faixa) ou percentual (percentual)
    #[schema(example = "6.75")]
    pub value: Decimal,

    pub created_at: DateTime<Utc>,
}

impl FixedFeeRuleRecord {
    pub fn to_rule(&self) -> Result<FixedFeeRule, PricingError> {
        FixedFeeRule::from_parts(self.rule_type, self.range_min, self.range_max, self.value)
    }
}

// ---
// 4. Regra de frete (produto x marketplace)
// ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShippingRule {
    pub id: Uuid,

    #[schema(ignore)]
    pub tenant_id: Uuid,

    pub product_id: Uuid,
    pub marketplace_id: Uuid,

    #[schema(example = "19.90")]
    pub shipping_cost: Decimal,

    #[schema(example = "79")]
    pub free_shipping_threshold: Option<Decimal>,

    pub updated_at: DateTime<Utc>,
}

impl ShippingRule {
    pub fn terms(&self) -> Result<ShippingTerms, PricingError> {
        ShippingTerms::new(self.shipping_cost, self.free_shipping_threshold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn marketplace(name: &str, parent_id: Option<Uuid>) -> Marketplace {
        Marketplace {
            id: Uuid::new_v4(),
            tenant_id: Uuid::nil(),
            parent_id,
            name: name.to_string(),
            is_active: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn modalidades_ficam_sob_a_plataforma() {
        let ml = marketplace("Mercado Livre", None);
        let classico = marketplace("Clássico", Some(ml.id));
        let premium = marketplace("Premium", Some(ml.id));
        let shopee = marketplace("Shopee", None);
        let orphan = marketplace("Órfã", Some(Uuid::new_v4()));

        let grouped = MarketplacePlatform::group(vec![classico, ml.clone(), shopee, premium, orphan]);

        assert_eq!(grouped.len(), 3);
        let ml_group = grouped.iter().find(|p| p.platform.id == ml.id).unwrap();
        let names: Vec<_> = ml_group.modalities.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["Clássico", "Premium"]);
        assert!(grouped.iter().any(|p| p.platform.name == "Órfã" && p.modalities.is_empty()));
    }
}
