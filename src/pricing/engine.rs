// src/pricing/engine.rs

//! Fórmulas de margem e de preço sugerido.
//!
//! Todos os percentuais aqui são "percentuais de verdade" (12 = 12%), nunca
//! frações. Valores monetários e percentuais usam `Decimal`.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::PricingError;

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Teto da comissão cobrada por venda, em reais, na fórmula com teto.
pub const COMMISSION_CAP: Decimal = Decimal::ONE_HUNDRED;

/// Variante da fórmula de margem.
///
/// `Capped` é a canônica: comissão limitada a `COMMISSION_CAP` e alíquota de
/// imposto do produto somada às taxas. `Legacy` reproduz a fórmula antiga, sem
/// teto e sem imposto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "pricing_formula", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PricingFormula {
    #[default]
    Capped,
    Legacy,
}

/// Custos em moeda que entram na margem.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostInputs {
    /// Custo do produto (unitário + embalagem).
    pub total_cost: Decimal,
    pub fixed_fee: Decimal,
    pub shipping: Decimal,
}

impl CostInputs {
    pub fn total(&self) -> Decimal {
        self.total_cost + self.fixed_fee + self.shipping
    }

    pub fn validate(&self) -> Result<(), PricingError> {
        ensure_not_negative("totalCost", self.total_cost)?;
        ensure_not_negative("fixedFee", self.fixed_fee)?;
        ensure_not_negative("shipping", self.shipping)
    }
}

/// Taxas percentuais sobre o preço de venda.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeRates {
    pub commission: Decimal,
    pub card_tax: Decimal,
    pub discount_provision: Decimal,
    /// Alíquota de imposto do produto. Ignorada pela fórmula `Legacy`.
    pub tax_rate: Decimal,
}

impl FeeRates {
    pub fn validate(&self) -> Result<(), PricingError> {
        ensure_percentage("commission", self.commission)?;
        ensure_percentage("cardTax", self.card_tax)?;
        ensure_percentage("discountProvision", self.discount_provision)?;
        ensure_percentage("taxRate", self.tax_rate)
    }

    /// Soma dos percentuais que não são comissão, conforme a fórmula.
    fn non_commission(&self, formula: PricingFormula) -> Decimal {
        match formula {
            PricingFormula::Capped => self.card_tax + self.discount_provision + self.tax_rate,
            PricingFormula::Legacy => self.card_tax + self.discount_provision,
        }
    }
}

/// Valor fixo cobrado pelo marketplace: em reais ou em percentual do preço.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum FeeCharge {
    Amount(Decimal),
    PercentOfPrice(Decimal),
}

impl FeeCharge {
    pub const NONE: FeeCharge = FeeCharge::Amount(Decimal::ZERO);

    pub fn amount_at(&self, price: Decimal) -> Decimal {
        match *self {
            FeeCharge::Amount(value) => value,
            FeeCharge::PercentOfPrice(percent) => price * percent / HUNDRED,
        }
    }
}

/// Entrada do cálculo de preço sugerido.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceTarget {
    pub total_cost: Decimal,
    pub fixed_fee: FeeCharge,
    pub shipping: Decimal,
    pub rates: FeeRates,
    /// Margem desejada, em percentual do preço.
    pub desired_margin: Decimal,
}

/// Comissão efetivamente cobrada em reais a um determinado preço.
pub fn commission_charge(price: Decimal, commission: Decimal, formula: PricingFormula) -> Decimal {
    let raw = price * commission / HUNDRED;
    match formula {
        PricingFormula::Capped => raw.min(COMMISSION_CAP),
        PricingFormula::Legacy => raw,
    }
}

/// Total de taxas (comissão + cartão + desconto [+ imposto]) em reais.
pub fn total_fees(price: Decimal, rates: &FeeRates, formula: PricingFormula) -> Decimal {
    commission_charge(price, rates.commission, formula)
        + price * rates.non_commission(formula) / HUNDRED
}

/// Margem unitária realizada (pode ser negativa).
pub fn unit_margin(
    price: Decimal,
    costs: &CostInputs,
    rates: &FeeRates,
    formula: PricingFormula,
) -> Decimal {
    price - costs.total() - total_fees(price, rates, formula)
}

/// Margem realizada em percentual do preço. Preço zero resulta em margem zero.
pub fn margin_percent(
    price: Decimal,
    costs: &CostInputs,
    rates: &FeeRates,
    formula: PricingFormula,
) -> Decimal {
    if price.is_zero() {
        return Decimal::ZERO;
    }
    unit_margin(price, costs, rates, formula) / price * HUNDRED
}

/// Resolve a equação da margem para o preço de venda.
///
/// Na fórmula com teto a equação é linear por partes: primeiro tenta-se o
/// regime em que a comissão fica abaixo do teto; se o preço encontrado
/// ultrapassar o teto, resolve-se com a comissão fixa em `COMMISSION_CAP`.
pub fn suggested_price(target: &PriceTarget, formula: PricingFormula) -> Result<Decimal, PricingError> {
    ensure_not_negative("totalCost", target.total_cost)?;
    ensure_not_negative("shipping", target.shipping)?;
    target.rates.validate()?;

    let (fixed_amount, fee_percent) = match target.fixed_fee {
        FeeCharge::Amount(value) => {
            ensure_not_negative("fixedFee", value)?;
            (value, Decimal::ZERO)
        }
        FeeCharge::PercentOfPrice(percent) => {
            ensure_percentage("fixedFee", percent)?;
            (Decimal::ZERO, percent)
        }
    };

    let base = target.total_cost + fixed_amount + target.shipping;
    if base <= Decimal::ZERO {
        return Err(PricingError::validation(
            "totalCost",
            "a soma dos custos deve ser maior que zero",
        ));
    }

    let commission = target.rates.commission;
    let other_load = target.rates.non_commission(formula) + fee_percent + target.desired_margin;
    let total_load = other_load + commission;
    let infeasible = || PricingError::InfeasiblePricing { total_percent: total_load };

    match formula {
        PricingFormula::Legacy => solve_linear(base, total_load).ok_or_else(infeasible),
        PricingFormula::Capped => {
            if let Some(price) = solve_linear(base, total_load) {
                if raw_commission(price, commission).is_some_and(|c| c <= COMMISSION_CAP) {
                    return Ok(price);
                }
            }
            if let Some(price) = solve_linear(base + COMMISSION_CAP, other_load) {
                if raw_commission(price, commission).is_none_or(|c| c >= COMMISSION_CAP) {
                    return Ok(price);
                }
            }
            Err(infeasible())
        }
    }
}

/// `preco = numerador / (1 - carga/100)`; `None` se o denominador for <= 0.
fn solve_linear(numerator: Decimal, load_percent: Decimal) -> Option<Decimal> {
    let denominator = Decimal::ONE - load_percent / HUNDRED;
    if denominator <= Decimal::ZERO {
        return None;
    }
    numerator.checked_div(denominator)
}

/// Comissão sem teto; `None` quando o produto estoura o `Decimal`.
fn raw_commission(price: Decimal, commission: Decimal) -> Option<Decimal> {
    price.checked_mul(commission).map(|product| product / HUNDRED)
}

fn ensure_not_negative(field: &'static str, value: Decimal) -> Result<(), PricingError> {
    if value < Decimal::ZERO {
        return Err(PricingError::validation(field, "o valor não pode ser negativo"));
    }
    Ok(())
}

fn ensure_percentage(field: &'static str, value: Decimal) -> Result<(), PricingError> {
    if value < Decimal::ZERO || value > HUNDRED {
        return Err(PricingError::validation(field, "o percentual deve estar entre 0 e 100"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use rust_decimal_macros::dec;

    fn costs(total_cost: Decimal, fixed_fee: Decimal, shipping: Decimal) -> CostInputs {
        CostInputs { total_cost, fixed_fee, shipping }
    }

    fn rates(commission: Decimal, card_tax: Decimal, discount_provision: Decimal, tax_rate: Decimal) -> FeeRates {
        FeeRates { commission, card_tax, discount_provision, tax_rate }
    }

    fn close(a: Decimal, b: Decimal, tolerance: Decimal) -> bool {
        (a - b).abs() <= tolerance
    }

    #[test]
    fn margem_do_cenario_de_referencia_e_28() {
        let c = costs(dec!(40), dec!(5), dec!(10));
        let r = rates(dec!(12), dec!(3), dec!(2), dec!(0));

        assert_eq!(margin_percent(dec!(100), &c, &r, PricingFormula::Capped), dec!(28));
        assert_eq!(margin_percent(dec!(100), &c, &r, PricingFormula::Legacy), dec!(28));
        assert_eq!(unit_margin(dec!(100), &c, &r, PricingFormula::Capped), dec!(28));
    }

    #[test]
    fn preco_zero_retorna_margem_zero() {
        let c = costs(dec!(10), dec!(2), dec!(3));
        let r = rates(dec!(10), dec!(2), dec!(1), dec!(5));

        assert_eq!(margin_percent(Decimal::ZERO, &c, &r, PricingFormula::Capped), Decimal::ZERO);
        assert_eq!(margin_percent(Decimal::ZERO, &c, &r, PricingFormula::Legacy), Decimal::ZERO);
    }

    #[test]
    fn comissao_limitada_ao_teto() {
        // 15% de 1000 = 150, mas o teto é 100
        assert_eq!(commission_charge(dec!(1000), dec!(15), PricingFormula::Capped), dec!(100));
        assert_eq!(commission_charge(dec!(1000), dec!(15), PricingFormula::Legacy), dec!(150));
        assert_eq!(commission_charge(dec!(500), dec!(15), PricingFormula::Capped), dec!(75));

        let c = costs(dec!(400), dec!(0), dec!(0));
        let r = rates(dec!(15), dec!(0), dec!(0), dec!(0));
        assert_eq!(unit_margin(dec!(1000), &c, &r, PricingFormula::Capped), dec!(500));
        assert_eq!(unit_margin(dec!(1000), &c, &r, PricingFormula::Legacy), dec!(450));
    }

    #[test]
    fn aliquota_de_imposto_so_entra_na_formula_canonica() {
        let c = costs(dec!(50), dec!(0), dec!(0));
        let r = rates(dec!(10), dec!(0), dec!(0), dec!(6));

        assert_eq!(unit_margin(dec!(100), &c, &r, PricingFormula::Capped), dec!(34));
        assert_eq!(unit_margin(dec!(100), &c, &r, PricingFormula::Legacy), dec!(40));
    }

    #[test]
    fn margem_unitaria_e_percentual_sao_consistentes() {
        let c = costs(dec!(37.40), dec!(6.50), dec!(19.90));
        let r = rates(dec!(16), dec!(2.99), dec!(5), dec!(4));

        for price in [dec!(0.01), dec!(49.90), dec!(129.99), dec!(899), dec!(2500)] {
            for formula in [PricingFormula::Capped, PricingFormula::Legacy] {
                let unit = unit_margin(price, &c, &r, formula);
                let percent = margin_percent(price, &c, &r, formula);
                assert!(close(unit, price * percent / dec!(100), dec!(0.000000001)));
            }
        }
    }

    #[test]
    fn calculo_e_idempotente() {
        let c = costs(dec!(22.5), dec!(5), dec!(0));
        let r = rates(dec!(11), dec!(3), dec!(0), dec!(8));
        let first = margin_percent(dec!(79.9), &c, &r, PricingFormula::Capped);
        let second = margin_percent(dec!(79.9), &c, &r, PricingFormula::Capped);
        assert_eq!(first, second);
    }

    #[test]
    fn aumentar_custos_reduz_a_margem() {
        let r = rates(dec!(12), dec!(3), dec!(2), dec!(0));
        let base = unit_margin(dec!(100), &costs(dec!(40), dec!(5), dec!(10)), &r, PricingFormula::Capped);

        let more_cost = unit_margin(dec!(100), &costs(dec!(41), dec!(5), dec!(10)), &r, PricingFormula::Capped);
        let more_fee = unit_margin(dec!(100), &costs(dec!(40), dec!(6), dec!(10)), &r, PricingFormula::Capped);
        let more_shipping = unit_margin(dec!(100), &costs(dec!(40), dec!(5), dec!(11)), &r, PricingFormula::Capped);

        assert!(more_cost < base);
        assert!(more_fee < base);
        assert!(more_shipping < base);
    }

    fn target(total_cost: Decimal, fixed_fee: FeeCharge, shipping: Decimal, rates: FeeRates, desired_margin: Decimal) -> PriceTarget {
        PriceTarget { total_cost, fixed_fee, shipping, rates, desired_margin }
    }

    fn round_trip_margin(t: &PriceTarget, formula: PricingFormula) -> Decimal {
        let price = suggested_price(t, formula).unwrap();
        let c = costs(t.total_cost, t.fixed_fee.amount_at(price), t.shipping);
        margin_percent(price, &c, &t.rates, formula)
    }

    #[test]
    fn preco_sugerido_reproduz_a_margem_desejada() {
        let r = rates(dec!(12), dec!(3), dec!(2), dec!(0));
        let t = target(dec!(40), FeeCharge::Amount(dec!(5)), dec!(10), r, dec!(28));

        // (40 + 5 + 10) / (1 - 0.45) = 100
        assert_eq!(suggested_price(&t, PricingFormula::Capped).unwrap(), dec!(100));
        assert!(close(round_trip_margin(&t, PricingFormula::Capped), dec!(28), dec!(0.000001)));
        assert!(close(round_trip_margin(&t, PricingFormula::Legacy), dec!(28), dec!(0.000001)));
    }

    #[test]
    fn preco_sugerido_no_regime_do_teto() {
        let r = rates(dec!(16), dec!(2), dec!(0), dec!(4));
        let t = target(dec!(1200), FeeCharge::Amount(dec!(0)), dec!(30), r, dec!(20));

        let price = suggested_price(&t, PricingFormula::Capped).unwrap();
        assert_eq!(commission_charge(price, dec!(16), PricingFormula::Capped), COMMISSION_CAP);
        // (1230 + 100) / (1 - 0.26)
        assert!(close(price, dec!(1330) / dec!(0.74), dec!(0.000001)));
        assert!(close(round_trip_margin(&t, PricingFormula::Capped), dec!(20), dec!(0.000001)));

        let legacy = suggested_price(&t, PricingFormula::Legacy).unwrap();
        assert!(legacy > price);
        assert!(close(round_trip_margin(&t, PricingFormula::Legacy), dec!(20), dec!(0.000001)));
    }

    #[test]
    fn valor_fixo_percentual_entra_na_carga() {
        let r = rates(dec!(10), dec!(0), dec!(0), dec!(0));
        let t = target(dec!(60), FeeCharge::PercentOfPrice(dec!(5)), dec!(0), r, dec!(25));

        // 60 / (1 - 0.40) = 100
        assert_eq!(suggested_price(&t, PricingFormula::Capped).unwrap(), dec!(100));
        assert!(close(round_trip_margin(&t, PricingFormula::Capped), dec!(25), dec!(0.000001)));
    }

    #[test]
    fn carga_de_100_por_cento_e_inviavel() {
        let r = rates(dec!(40), dec!(30), dec!(0), dec!(0));
        let t = target(dec!(50), FeeCharge::NONE, dec!(0), r, dec!(30));
        assert_matches!(
            suggested_price(&t, PricingFormula::Legacy),
            Err(PricingError::InfeasiblePricing { total_percent }) if total_percent == dec!(100)
        );

        let r = rates(dec!(10), dec!(50), dec!(0), dec!(10));
        let t = target(dec!(50), FeeCharge::NONE, dec!(0), r, dec!(45));
        assert_matches!(
            suggested_price(&t, PricingFormula::Capped),
            Err(PricingError::InfeasiblePricing { .. })
        );
    }

    #[test]
    fn teto_torna_viavel_carga_que_seria_inviavel_sem_ele() {
        // Sem teto: 40 + 30 + 30 = 100%. Com teto a comissão vira custo fixo de 100.
        let r = rates(dec!(40), dec!(30), dec!(0), dec!(0));
        let t = target(dec!(50), FeeCharge::NONE, dec!(0), r, dec!(30));

        let price = suggested_price(&t, PricingFormula::Capped).unwrap();
        assert_eq!(price, dec!(375));
        assert!(close(round_trip_margin(&t, PricingFormula::Capped), dec!(30), dec!(0.000001)));
    }

    #[test]
    fn entradas_invalidas_sao_rejeitadas() {
        let r = rates(dec!(12), dec!(0), dec!(0), dec!(0));

        let t = target(dec!(-1), FeeCharge::NONE, dec!(0), r, dec!(10));
        assert_matches!(
            suggested_price(&t, PricingFormula::Capped),
            Err(PricingError::Validation { field: "totalCost", .. })
        );

        let t = target(dec!(0), FeeCharge::NONE, dec!(0), r, dec!(10));
        assert_matches!(suggested_price(&t, PricingFormula::Capped), Err(PricingError::Validation { .. }));

        let bad_rates = rates(dec!(120), dec!(0), dec!(0), dec!(0));
        let t = target(dec!(10), FeeCharge::NONE, dec!(0), bad_rates, dec!(10));
        assert_matches!(
            suggested_price(&t, PricingFormula::Capped),
            Err(PricingError::Validation { field: "commission", .. })
        );

        assert!(costs(dec!(1), dec!(-0.01), dec!(0)).validate().is_err());
    }
}
