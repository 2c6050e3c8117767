// Cenários de ponta a ponta do núcleo de precificação (sem banco).

use assert_matches::assert_matches;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

use pricing_backend::pricing::{
    calculator::{self, CalculationInput, MarketplaceTerms, PricingPolicy, ProductInputs},
    commission::{self, CommissionRuleRef},
    engine::PricingFormula,
    fixed_fee::{FixedFeeRule, FixedFeeRuleType, FixedFeeSchedule},
    format::{format_currency, format_percent, FormatLocale},
    shipping::ShippingTerms,
    PricingError,
};

struct Marketplace {
    id: Uuid,
    rules: Vec<CommissionRuleRef>,
    fees: FixedFeeSchedule,
}

impl Marketplace {
    fn with_commission(rate: Decimal) -> Self {
        let id = Uuid::new_v4();
        Self {
            id,
            rules: vec![CommissionRuleRef { id: Uuid::new_v4(), marketplace_id: id, category_id: None, rate }],
            fees: FixedFeeSchedule::default(),
        }
    }

    fn with_fees(mut self, rules: Vec<FixedFeeRule>) -> Self {
        self.fees = FixedFeeSchedule::new(rules);
        self
    }

    fn terms(&self, shipping: ShippingTerms) -> MarketplaceTerms<'_> {
        MarketplaceTerms {
            marketplace_id: self.id,
            marketplace_name: "Loja Parceira",
            commission_rules: &self.rules,
            fixed_fees: &self.fees,
            shipping,
        }
    }
}

fn product(cost_unit: Decimal, packaging_cost: Decimal) -> ProductInputs {
    ProductInputs {
        product_id: Uuid::new_v4(),
        cost_unit,
        packaging_cost,
        tax_rate: Decimal::ZERO,
        category_id: None,
    }
}

fn band(min: Decimal, max: Decimal, value: Decimal) -> FixedFeeRule {
    FixedFeeRule::from_parts(FixedFeeRuleType::Faixa, Some(min), Some(max), value).unwrap()
}

fn seller_policy() -> PricingPolicy {
    PricingPolicy { card_tax: dec!(3), discount_provision: dec!(2), ..PricingPolicy::default() }
}

#[test]
fn margem_realizada_acompanha_a_faixa_de_valor_fixo() {
    let marketplace = Marketplace::with_commission(dec!(0.12))
        .with_fees(vec![band(dec!(0), dec!(100), dec!(5)), band(dec!(100.01), dec!(500), dec!(8))]);
    let shipping = ShippingTerms::new(dec!(10), None).unwrap();
    let p = product(dec!(35), dec!(5));

    let at_100 = calculator::margin_at(dec!(100), &p, &marketplace.terms(shipping), &seller_policy()).unwrap();
    assert_eq!(at_100.margem_percentual, dec!(28));
    assert_eq!(at_100.valor_fixo, dec!(5));

    // 150 - 40 - 8 - 10 - 150 * 17% = 66.5
    let at_150 = calculator::margin_at(dec!(150), &p, &marketplace.terms(shipping), &seller_policy()).unwrap();
    assert_eq!(at_150.valor_fixo, dec!(8));
    assert_eq!(at_150.margem_unitaria, dec!(66.5));
    assert_eq!(at_150.margem_percentual, dec!(44.33));
}

#[test]
fn preco_sugerido_volta_para_a_margem_desejada() {
    let marketplace = Marketplace::with_commission(dec!(0.12))
        .with_fees(vec![band(dec!(0), dec!(100), dec!(5)), band(dec!(100.01), dec!(500), dec!(8))]);
    let shipping = ShippingTerms::new(dec!(10), None).unwrap();
    let input = CalculationInput {
        product: product(dec!(35), dec!(5)),
        marketplace: marketplace.terms(shipping),
        policy: seller_policy(),
        desired_margin: dec!(28),
    };

    let result = calculator::calculate(&input).unwrap();
    assert_eq!(result.preco_sugerido, dec!(100));

    let back = calculator::margin_at(result.preco_sugerido, &input.product, &input.marketplace, &input.policy).unwrap();
    assert_eq!(back.margem_percentual, dec!(28));
}

#[test]
fn teto_da_comissao_muda_o_preco_de_itens_caros() {
    let marketplace = Marketplace::with_commission(dec!(0.20));
    let base = CalculationInput {
        product: product(dec!(900), dec!(0)),
        marketplace: marketplace.terms(ShippingTerms::default()),
        policy: PricingPolicy::default(),
        desired_margin: dec!(10),
    };

    // Com teto: (900 + 100) / 0.9
    let capped = calculator::calculate(&base).unwrap();
    assert_eq!(capped.formula, PricingFormula::Capped);
    assert_eq!(capped.preco_sugerido, dec!(1111.11));
    assert_eq!(capped.margem_percentual, dec!(10));

    // Sem teto: 900 / 0.7
    let legacy = calculator::calculate(&CalculationInput {
        policy: PricingPolicy { formula: PricingFormula::Legacy, ..PricingPolicy::default() },
        ..base
    })
    .unwrap();
    assert_eq!(legacy.preco_sugerido, dec!(1285.71));
    assert!(legacy.preco_sugerido > capped.preco_sugerido);
}

#[test]
fn comissao_por_categoria_e_padrao() {
    let marketplace_id = Uuid::new_v4();
    let electronics = Uuid::new_v4();
    let rules = vec![
        CommissionRuleRef { id: Uuid::new_v4(), marketplace_id, category_id: None, rate: dec!(0.12) },
        CommissionRuleRef { id: Uuid::new_v4(), marketplace_id, category_id: Some(electronics), rate: dec!(0.16) },
    ];

    assert_eq!(commission::resolve(&rules, marketplace_id, Some(electronics)).unwrap().rate, dec!(0.16));
    assert_eq!(commission::resolve(&rules, marketplace_id, Some(Uuid::new_v4())).unwrap().rate, dec!(0.12));
    assert_eq!(commission::resolve(&rules, marketplace_id, None).unwrap().rate, dec!(0.12));
    assert_matches!(
        commission::resolve(&rules, Uuid::new_v4(), None),
        Err(PricingError::NoCommission { .. })
    );
}

#[test]
fn comparacao_entre_marketplaces_com_formatacao() {
    let cheap = Marketplace::with_commission(dec!(0.10));
    let expensive = Marketplace::with_commission(dec!(0.20));
    let broken = Marketplace { rules: Vec::new(), ..Marketplace::with_commission(dec!(0.10)) };
    let p = product(dec!(60), dec!(0));

    let inputs = [&cheap, &expensive, &broken].map(|m| CalculationInput {
        product: p,
        marketplace: m.terms(ShippingTerms::default()),
        policy: PricingPolicy::default(),
        desired_margin: dec!(30),
    });

    let items = calculator::compare(inputs);
    assert_eq!(items.len(), 3);

    // 60 / 0.6 = 100 e 60 / 0.5 = 120
    let prices: Vec<_> = items.iter().map(|i| i.result.as_ref().map(|r| r.preco_sugerido)).collect();
    assert_eq!(prices, [Some(dec!(100)), Some(dec!(120)), None]);
    assert!(items[2].has_error);

    let price = items[1].result.as_ref().map(|r| r.preco_sugerido).unwrap();
    assert_eq!(format_currency(price, FormatLocale::PtBr), "R$ 120,00");
    assert_eq!(format_currency(price, FormatLocale::EnUs), "R$120.00");
    assert_eq!(format_percent(dec!(30), FormatLocale::PtBr), "30,00%");
}
