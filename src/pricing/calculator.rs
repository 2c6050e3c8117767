// src/pricing/calculator.rs

//! Composição do cálculo: comissão + valor fixo + frete + engine.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use super::{
    commission::{self, CommissionRuleRef},
    engine::{self, CostInputs, FeeCharge, FeeRates, PriceTarget, PricingFormula},
    fixed_fee::{FixedFeeRuleType, FixedFeeSchedule},
    shipping::ShippingTerms,
    PricingError,
};

/// Custos e impostos de um produto.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProductInputs {
    pub product_id: Uuid,
    pub cost_unit: Decimal,
    pub packaging_cost: Decimal,
    /// Alíquota de imposto (0–100).
    pub tax_rate: Decimal,
    pub category_id: Option<Uuid>,
}

impl ProductInputs {
    pub fn total_cost(&self) -> Decimal {
        self.cost_unit + self.packaging_cost
    }

    fn validate(&self) -> Result<(), PricingError> {
        if self.cost_unit < Decimal::ZERO {
            return Err(PricingError::validation("costUnit", "o custo não pode ser negativo"));
        }
        if self.packaging_cost < Decimal::ZERO {
            return Err(PricingError::validation("packagingCost", "o custo não pode ser negativo"));
        }
        if self.tax_rate < Decimal::ZERO || self.tax_rate > Decimal::ONE_HUNDRED {
            return Err(PricingError::validation("taxRate", "a alíquota deve estar entre 0 e 100"));
        }
        Ok(())
    }
}

/// Configuração de taxas de um marketplace para um produto.
#[derive(Debug, Clone, Copy)]
pub struct MarketplaceTerms<'a> {
    pub marketplace_id: Uuid,
    pub marketplace_name: &'a str,
    pub commission_rules: &'a [CommissionRuleRef],
    pub fixed_fees: &'a FixedFeeSchedule,
    pub shipping: ShippingTerms,
}

/// Parâmetros do vendedor (por tenant).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricingPolicy {
    pub card_tax: Decimal,
    pub discount_provision: Decimal,
    pub formula: PricingFormula,
    /// Sem regra de comissão: calcula com 0% em vez de recusar.
    pub missing_commission_as_zero: bool,
}

impl Default for PricingPolicy {
    fn default() -> Self {
        Self {
            card_tax: Decimal::ZERO,
            discount_provision: Decimal::ZERO,
            formula: PricingFormula::Capped,
            missing_commission_as_zero: false,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CalculationInput<'a> {
    pub product: ProductInputs,
    pub marketplace: MarketplaceTerms<'a>,
    pub policy: PricingPolicy,
    /// Margem desejada em percentual do preço.
    pub desired_margin: Decimal,
}

/// Decomposição da margem a um preço de venda.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct MarginBreakdown {
    pub custo_total: Decimal,
    pub valor_fixo: Decimal,
    pub frete: Decimal,
    /// Comissão em percentual.
    pub comissao: Decimal,
    pub preco_venda: Decimal,
    pub margem_unitaria: Decimal,
    pub margem_percentual: Decimal,
    pub commission_rule_id: Option<Uuid>,
    pub fixed_fee_rule_type: Option<FixedFeeRuleType>,
    pub free_shipping: bool,
}

/// Resultado do cálculo de preço sugerido (efêmero).
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct PricingResult {
    pub custo_total: Decimal,
    pub valor_fixo: Decimal,
    pub frete: Decimal,
    pub comissao: Decimal,
    pub preco_sugerido: Decimal,
    pub margem_unitaria: Decimal,
    pub margem_percentual: Decimal,
    pub margem_desejada: Decimal,
    pub commission_rule_id: Option<Uuid>,
    pub fixed_fee_rule_type: Option<FixedFeeRuleType>,
    pub free_shipping: bool,
    pub formula: PricingFormula,
}

/// Item da comparação em lote. Um erro não derruba os demais itens.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonItem {
    pub product_id: Uuid,
    pub marketplace_id: Uuid,
    pub marketplace_name: String,
    pub result: Option<PricingResult>,
    pub has_error: bool,
    pub error: Option<String>,
}

const CENT: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Maior preço aceito: o teto de `NUMERIC(14, 2)`.
pub const MAX_PRICE: Decimal = Decimal::from_parts(276_447_231, 23_283, 0, false, 2);

/// Arredonda para centavos (meio para longe do zero).
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

fn effective_commission(
    product: &ProductInputs,
    marketplace: &MarketplaceTerms<'_>,
    policy: &PricingPolicy,
) -> Result<(Decimal, Option<Uuid>), PricingError> {
    match commission::resolve(marketplace.commission_rules, marketplace.marketplace_id, product.category_id) {
        Ok(resolved) => Ok((resolved.percent(), Some(resolved.rule_id))),
        Err(PricingError::NoCommission { .. }) if policy.missing_commission_as_zero => {
            Ok((Decimal::ZERO, None))
        }
        Err(e) => Err(e),
    }
}

fn fee_rates(product: &ProductInputs, policy: &PricingPolicy, commission: Decimal) -> FeeRates {
    FeeRates {
        commission,
        card_tax: policy.card_tax,
        discount_provision: policy.discount_provision,
        tax_rate: product.tax_rate,
    }
}

/// Margem realizada a um preço (preço sugerido, cobrado numa venda, ou simulado).
pub fn margin_at(
    price: Decimal,
    product: &ProductInputs,
    marketplace: &MarketplaceTerms<'_>,
    policy: &PricingPolicy,
) -> Result<MarginBreakdown, PricingError> {
    if price < Decimal::ZERO {
        return Err(PricingError::validation("price", "o preço não pode ser negativo"));
    }
    if price > MAX_PRICE {
        return Err(PricingError::validation("price", "o preço excede o valor máximo aceito"));
    }
    product.validate()?;

    let (commission, commission_rule_id) = effective_commission(product, marketplace, policy)?;
    let rates = fee_rates(product, policy, commission);
    rates.validate()?;

    let fee_rule = marketplace.fixed_fees.rule_at(price);
    let costs = CostInputs {
        total_cost: product.total_cost(),
        fixed_fee: round_money(marketplace.fixed_fees.fee_at(price)),
        shipping: marketplace.shipping.cost_at(price),
    };

    Ok(MarginBreakdown {
        custo_total: costs.total_cost,
        valor_fixo: costs.fixed_fee,
        frete: costs.shipping,
        comissao: commission.normalize(),
        preco_venda: price,
        margem_unitaria: round_money(engine::unit_margin(price, &costs, &rates, policy.formula)),
        margem_percentual: round_money(engine::margin_percent(price, &costs, &rates, policy.formula)),
        commission_rule_id,
        fixed_fee_rule_type: fee_rule.map(|r| r.rule_type()),
        free_shipping: marketplace.shipping.is_free_at(price),
    })
}

/// Preço sugerido para atingir a margem desejada num marketplace.
///
/// O valor fixo depende do preço: vale o menor preço que atinge a margem com a
/// regra aplicável a ele (faixa que o contém, senão a constante ou zero).
/// O frete grátis é resolvido antes: se o preço com frete atinge o limite,
/// recalcula-se sem frete; se esse preço cair abaixo do limite, o próprio
/// limite é o menor preço que atinge a margem.
pub fn calculate(input: &CalculationInput<'_>) -> Result<PricingResult, PricingError> {
    let CalculationInput { product, marketplace, policy, desired_margin } = input;
    product.validate()?;

    let (commission, _) = effective_commission(product, marketplace, policy)?;
    let rates = fee_rates(product, policy, commission);

    let solve = |shipping: Decimal| {
        solve_with_fee_schedule(product.total_cost(), shipping, rates, *desired_margin, marketplace.fixed_fees, policy.formula)
    };

    let shipping = marketplace.shipping;
    let price = match shipping.free_shipping_threshold {
        Some(threshold) if shipping.cost > Decimal::ZERO => {
            let with_shipping = solve(shipping.cost)?;
            if with_shipping < threshold {
                with_shipping
            } else {
                let without_shipping = solve(Decimal::ZERO)?;
                without_shipping.max(threshold)
            }
        }
        _ => solve(shipping.cost_at(Decimal::ZERO))?,
    };

    let breakdown = margin_at(round_money(price), product, marketplace, policy)?;

    Ok(PricingResult {
        custo_total: breakdown.custo_total,
        valor_fixo: breakdown.valor_fixo,
        frete: breakdown.frete,
        comissao: breakdown.comissao,
        preco_sugerido: breakdown.preco_venda,
        margem_unitaria: breakdown.margem_unitaria,
        margem_percentual: breakdown.margem_percentual,
        margem_desejada: *desired_margin,
        commission_rule_id: breakdown.commission_rule_id,
        fixed_fee_rule_type: breakdown.fixed_fee_rule_type,
        free_shipping: breakdown.free_shipping,
        formula: policy.formula,
    })
}

/// Menor preço que atinge a margem, considerando a regra de valor fixo que de
/// fato vale em cada trecho de preço.
///
/// Dentro de um trecho a margem cresce com o preço. Para cada faixa, o candidato
/// é o preço resolvido com a taxa dela, ou o mínimo da faixa se o resolvido
/// ficar abaixo. Fora das faixas vale a regra constante (ou zero). Só entram
/// candidatos cuja regra em `rule_at` é a mesma usada na resolução.
fn solve_with_fee_schedule(
    total_cost: Decimal,
    shipping: Decimal,
    rates: FeeRates,
    desired_margin: Decimal,
    schedule: &FixedFeeSchedule,
    formula: PricingFormula,
) -> Result<Decimal, PricingError> {
    let target = |fixed_fee: FeeCharge| PriceTarget {
        total_cost,
        fixed_fee,
        shipping,
        rates,
        desired_margin,
    };

    let mut best: Option<Decimal> = None;
    let consider = |best: &mut Option<Decimal>, price: Decimal| {
        *best = Some(best.map_or(price, |current| current.min(price)));
    };

    for rule in schedule.ranged() {
        let Some(range) = rule.range() else { continue };
        let price = match engine::suggested_price(&target(rule.charge()), formula) {
            Ok(price) => price,
            Err(PricingError::InfeasiblePricing { .. }) => continue,
            Err(e) => return Err(e),
        };
        if price > range.max {
            continue;
        }
        let candidate = price.max(range.min);
        if schedule.rule_at(candidate) == Some(rule) {
            consider(&mut best, candidate);
        }
    }

    let fallback_rule = schedule.constant();
    let fallback = fallback_rule.map(|rule| rule.charge()).unwrap_or(FeeCharge::NONE);
    let fallback_price = match engine::suggested_price(&target(fallback), formula) {
        Ok(price) => Some(price),
        Err(PricingError::InfeasiblePricing { .. }) if best.is_some() => None,
        Err(e) => return Err(e),
    };

    if let Some(price) = fallback_price {
        // Primeiro preço >= o resolvido que não cai em nenhuma faixa
        let uncovered = std::iter::once(price)
            .chain(
                schedule
                    .ranged()
                    .iter()
                    .filter_map(|rule| rule.range())
                    .map(|range| range.max + CENT)
                    .filter(|start| *start >= price),
            )
            .filter(|candidate| schedule.rule_at(*candidate) == fallback_rule)
            .min();
        if let Some(candidate) = uncovered {
            consider(&mut best, candidate);
        }
    }

    best.or(fallback_price).ok_or(PricingError::InfeasiblePricing {
        total_percent: rates.commission + rates.card_tax + rates.discount_provision + desired_margin,
    })
}

/// Calcula cada item de forma independente, coletando os erros por item.
pub fn compare<'a>(inputs: impl IntoIterator<Item = CalculationInput<'a>>) -> Vec<ComparisonItem> {
    inputs
        .into_iter()
        .map(|input| {
            let (result, error) = match calculate(&input) {
                Ok(result) => (Some(result), None),
                Err(e) => {
                    tracing::warn!(
                        product_id = %input.product.product_id,
                        marketplace_id = %input.marketplace.marketplace_id,
                        "Item da comparação sem preço: {}", e
                    );
                    (None, Some(e.to_string()))
                }
            };
            ComparisonItem {
                product_id: input.product.product_id,
                marketplace_id: input.marketplace.marketplace_id,
                marketplace_name: input.marketplace.marketplace_name.to_string(),
                has_error: error.is_some(),
                result,
                error,
            }
        })
        .collect()
}
