// src/pricing.rs

//! Núcleo de precificação: funções puras, sem I/O.
//!
//! - `engine`: margem realizada, margem unitária e preço sugerido.
//! - `commission`: resolução da comissão (categoria > padrão do marketplace).
//! - `fixed_fee`: regras de valor fixo (constante / faixa / percentual).
//! - `shipping`: frete com limite de frete grátis.
//! - `calculator`: composição de tudo acima para um produto × marketplace.
//! - `format`: formatação de moeda e percentual.

pub mod calculator;
pub mod commission;
pub mod engine;
pub mod fixed_fee;
pub mod format;
pub mod shipping;

use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

pub use calculator::{CalculationInput, ComparisonItem, PricingResult};
pub use commission::{CommissionRuleRef, ResolvedCommission};
pub use engine::{CostInputs, FeeCharge, FeeRates, PricingFormula};
pub use fixed_fee::{FixedFeeRule, FixedFeeSchedule};
pub use shipping::ShippingTerms;

/// Erros do núcleo de precificação.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PricingError {
    #[error("Valor inválido para '{field}': {reason}")]
    Validation { field: &'static str, reason: String },

    /// A soma dos percentuais (comissão + cartão + desconto + impostos + margem)
    /// chega a 100% do preço: não existe preço finito.
    #[error("Precificação inviável: a carga percentual total ({total_percent}%) atinge ou excede 100% do preço.")]
    InfeasiblePricing { total_percent: Decimal },

    /// Nem regra da categoria, nem regra padrão para o marketplace.
    #[error("Nenhuma comissão configurada para o marketplace {marketplace_id}.")]
    NoCommission { marketplace_id: Uuid },

    #[error("Já existe uma comissão para esta combinação de marketplace e categoria.")]
    DuplicateRule {
        marketplace_id: Uuid,
        category_id: Option<Uuid>,
    },
}

impl PricingError {
    pub(crate) fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        PricingError::Validation { field, reason: reason.into() }
    }
}
