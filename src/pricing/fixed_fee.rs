// src/pricing/fixed_fee.rs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{engine::FeeCharge, PricingError};

/// Tipo da regra como gravado no banco (coluna `rule_type`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "fixed_fee_rule_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum FixedFeeRuleType {
    Constante,
    Faixa,
    Percentual,
}

/// Faixa fechada de preço: `min <= preco <= max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct PriceRange {
    pub min: Decimal,
    pub max: Decimal,
}

impl PriceRange {
    pub fn contains(&self, price: Decimal) -> bool {
        self.min <= price && price <= self.max
    }
}

/// Regra de valor fixo, uma variante por tipo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixedFeeRule {
    /// Vale para qualquer preço; usada quando nenhuma faixa casa.
    Constant { value: Decimal },
    /// Valor em reais dentro da faixa.
    Band { range: PriceRange, value: Decimal },
    /// Percentual do preço dentro da faixa.
    Percent { range: PriceRange, percent: Decimal },
}

impl FixedFeeRule {
    /// Monta a regra a partir do registro plano (`range_min`/`range_max` anuláveis).
    pub fn from_parts(
        rule_type: FixedFeeRuleType,
        range_min: Option<Decimal>,
        range_max: Option<Decimal>,
        value: Decimal,
    ) -> Result<Self, PricingError> {
        if value < Decimal::ZERO {
            return Err(PricingError::validation("value", "o valor não pode ser negativo"));
        }

        let range = || -> Result<PriceRange, PricingError> {
            let (Some(min), Some(max)) = (range_min, range_max) else {
                return Err(PricingError::validation(
                    "rangeMin",
                    "regras por faixa exigem valor mínimo e máximo",
                ));
            };
            if min < Decimal::ZERO || min > max {
                return Err(PricingError::validation(
                    "rangeMin",
                    "o mínimo da faixa deve ser >= 0 e <= máximo",
                ));
            }
            Ok(PriceRange { min, max })
        };

        match rule_type {
            FixedFeeRuleType::Constante => Ok(FixedFeeRule::Constant { value }),
            FixedFeeRuleType::Faixa => Ok(FixedFeeRule::Band { range: range()?, value }),
            FixedFeeRuleType::Percentual => {
                if value > Decimal::ONE_HUNDRED {
                    return Err(PricingError::validation("value", "o percentual deve estar entre 0 e 100"));
                }
                Ok(FixedFeeRule::Percent { range: range()?, percent: value })
            }
        }
    }

    pub fn rule_type(&self) -> FixedFeeRuleType {
        match self {
            FixedFeeRule::Constant { .. } => FixedFeeRuleType::Constante,
            FixedFeeRule::Band { .. } => FixedFeeRuleType::Faixa,
            FixedFeeRule::Percent { .. } => FixedFeeRuleType::Percentual,
        }
    }

    pub fn range(&self) -> Option<PriceRange> {
        match self {
            FixedFeeRule::Constant { .. } => None,
            FixedFeeRule::Band { range, .. } | FixedFeeRule::Percent { range, .. } => Some(*range),
        }
    }

    pub fn charge(&self) -> FeeCharge {
        match *self {
            FixedFeeRule::Constant { value } | FixedFeeRule::Band { value, .. } => FeeCharge::Amount(value),
            FixedFeeRule::Percent { percent, .. } => FeeCharge::PercentOfPrice(percent),
        }
    }
}

/// Conjunto de regras de valor fixo de um marketplace.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FixedFeeSchedule {
    /// Regras por faixa, ordenadas pelo mínimo da faixa.
    ranged: Vec<FixedFeeRule>,
    constant: Option<FixedFeeRule>,
}

impl FixedFeeSchedule {
    /// Se houver mais de uma regra constante, vale a primeira.
    pub fn new(rules: impl IntoIterator<Item = FixedFeeRule>) -> Self {
        let mut ranged = Vec::new();
        let mut constant = None;

        for rule in rules {
            match rule {
                FixedFeeRule::Constant { .. } => {
                    constant.get_or_insert(rule);
                }
                _ => ranged.push(rule),
            }
        }
        ranged.sort_by_key(|r| r.range().map(|range| range.min));

        Self { ranged, constant }
    }

    pub fn ranged(&self) -> &[FixedFeeRule] {
        &self.ranged
    }

    pub fn constant(&self) -> Option<&FixedFeeRule> {
        self.constant.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.ranged.is_empty() && self.constant.is_none()
    }

    /// Regra aplicável ao preço: faixa que o contém, senão a constante.
    pub fn rule_at(&self, price: Decimal) -> Option<&FixedFeeRule> {
        self.ranged
            .iter()
            .find(|rule| rule.range().is_some_and(|range| range.contains(price)))
            .or(self.constant.as_ref())
    }

    /// Valor fixo em reais ao preço informado; 0 quando nenhuma regra se aplica.
    pub fn fee_at(&self, price: Decimal) -> Decimal {
        self.rule_at(price)
            .map(|rule| rule.charge().amount_at(price))
            .unwrap_or(Decimal::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use rust_decimal_macros::dec;

    fn band(min: Decimal, max: Decimal, value: Decimal) -> FixedFeeRule {
        FixedFeeRule::from_parts(FixedFeeRuleType::Faixa, Some(min), Some(max), value).unwrap()
    }

    #[test]
    fn faixa_escolhe_o_intervalo_do_preco() {
        let schedule = FixedFeeSchedule::new([
            band(dec!(100.01), dec!(500), dec!(8)),
            band(dec!(0), dec!(100), dec!(5)),
        ]);

        assert_eq!(schedule.fee_at(dec!(99.99)), dec!(5));
        assert_eq!(schedule.fee_at(dec!(150)), dec!(8));
        assert_eq!(schedule.fee_at(dec!(100)), dec!(5));
        assert_eq!(schedule.fee_at(dec!(500)), dec!(8));
        // Fora de qualquer faixa e sem constante
        assert_eq!(schedule.fee_at(dec!(100.005)), Decimal::ZERO);
        assert_eq!(schedule.fee_at(dec!(800)), Decimal::ZERO);
    }

    #[test]
    fn percentual_incide_sobre_o_preco() {
        let rule = FixedFeeRule::from_parts(
            FixedFeeRuleType::Percentual,
            Some(dec!(200)),
            Some(dec!(1000)),
            dec!(2.5),
        )
        .unwrap();
        let schedule = FixedFeeSchedule::new([rule]);

        assert_eq!(schedule.fee_at(dec!(400)), dec!(10));
        assert_eq!(schedule.fee_at(dec!(199.99)), Decimal::ZERO);
    }

    #[test]
    fn constante_e_fallback() {
        let schedule = FixedFeeSchedule::new([
            FixedFeeRule::from_parts(FixedFeeRuleType::Constante, None, None, dec!(6.75)).unwrap(),
            band(dec!(0), dec!(79), dec!(4)),
        ]);

        assert_eq!(schedule.fee_at(dec!(50)), dec!(4));
        assert_eq!(schedule.fee_at(dec!(80)), dec!(6.75));
        assert_eq!(schedule.rule_at(dec!(80)).map(|r| r.rule_type()), Some(FixedFeeRuleType::Constante));
    }

    #[test]
    fn sem_regras_o_valor_fixo_e_zero() {
        let schedule = FixedFeeSchedule::default();
        assert!(schedule.is_empty());
        assert_eq!(schedule.fee_at(dec!(123)), Decimal::ZERO);
    }

    #[test]
    fn faixas_sobrepostas_usam_o_menor_minimo() {
        let schedule = FixedFeeSchedule::new([
            band(dec!(50), dec!(200), dec!(9)),
            band(dec!(0), dec!(100), dec!(5)),
        ]);
        assert_eq!(schedule.fee_at(dec!(75)), dec!(5));
        assert_eq!(schedule.fee_at(dec!(150)), dec!(9));
    }

    #[test]
    fn registro_plano_invalido_e_rejeitado() {
        assert_matches!(
            FixedFeeRule::from_parts(FixedFeeRuleType::Faixa, None, Some(dec!(10)), dec!(1)),
            Err(PricingError::Validation { field: "rangeMin", .. })
        );
        assert_matches!(
            FixedFeeRule::from_parts(FixedFeeRuleType::Percentual, Some(dec!(10)), Some(dec!(5)), dec!(1)),
            Err(PricingError::Validation { .. })
        );
        assert_matches!(
            FixedFeeRule::from_parts(FixedFeeRuleType::Percentual, Some(dec!(0)), Some(dec!(5)), dec!(101)),
            Err(PricingError::Validation { field: "value", .. })
        );
        assert_matches!(
            FixedFeeRule::from_parts(FixedFeeRuleType::Constante, None, None, dec!(-2)),
            Err(PricingError::Validation { field: "value", .. })
        );
    }
}
