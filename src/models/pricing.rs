// src/models/pricing.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::pricing::{
    calculator::{PricingPolicy, PricingResult},
    engine::PricingFormula,
};

/// Margem desejada quando o tenant ainda não configurou nada.
pub const DEFAULT_MARGIN: Decimal = Decimal::from_parts(20, 0, 0, false, 0);

// ---
// Configuração de precificação da loja
// ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PricingSettings {
    #[schema(ignore)] // O contexto (Header) já define a loja
    pub tenant_id: Uuid,

    /// Taxa do cartão/gateway em percentual
    #[schema(example = "2.99")]
    pub card_tax_rate: Decimal,

    /// Provisão para descontos/cupons em percentual
    #[schema(example = "5")]
    pub discount_provision: Decimal,

    #[schema(example = "20")]
    pub default_margin: Decimal,

    /// Sem regra de comissão: precifica com 0% em vez de recusar
    #[schema(example = false)]
    pub missing_commission_as_zero: bool,

    pub formula: PricingFormula,

    pub updated_at: Option<DateTime<Utc>>,
}

impl PricingSettings {
    pub fn defaults(tenant_id: Uuid) -> Self {
        Self {
            tenant_id,
            card_tax_rate: Decimal::ZERO,
            discount_provision: Decimal::ZERO,
            default_margin: DEFAULT_MARGIN,
            missing_commission_as_zero: false,
            formula: PricingFormula::default(),
            updated_at: None,
        }
    }

    pub fn policy(&self) -> PricingPolicy {
        PricingPolicy {
            card_tax: self.card_tax_rate,
            discount_provision: self.discount_provision,
            formula: self.formula,
            missing_commission_as_zero: self.missing_commission_as_zero,
        }
    }
}

// ---
// Precificação salva (histórico/auditoria: entradas + saídas)
// ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SavedPricing {
    pub id: Uuid,

    #[schema(ignore)]
    pub tenant_id: Uuid,

    pub product_id: Uuid,
    pub marketplace_id: Uuid,

    pub desired_margin: Decimal,
    pub formula: PricingFormula,

    pub custo_total: Decimal,
    pub valor_fixo: Decimal,
    pub frete: Decimal,
    pub comissao: Decimal,
    pub preco_sugerido: Decimal,
    pub margem_unitaria: Decimal,
    pub margem_percentual: Decimal,

    pub created_at: DateTime<Utc>,
}

/// Dados a gravar numa precificação salva.
#[derive(Debug, Clone)]
pub struct NewSavedPricing {
    pub product_id: Uuid,
    pub marketplace_id: Uuid,
    pub result: PricingResult,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn padroes_da_loja() {
        let settings = PricingSettings::defaults(Uuid::new_v4());
        assert_eq!(settings.default_margin, dec!(20));

        let policy = settings.policy();
        assert_eq!(policy.formula, PricingFormula::Capped);
        assert!(!policy.missing_commission_as_zero);
        assert_eq!(policy.card_tax, Decimal::ZERO);
    }
}
