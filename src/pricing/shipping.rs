// src/pricing/shipping.rs

use rust_decimal::Decimal;

use super::PricingError;

/// Frete de um produto em um marketplace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ShippingTerms {
    pub cost: Decimal,
    /// A partir deste preço o frete é grátis para o vendedor (custo 0).
    pub free_shipping_threshold: Option<Decimal>,
}

impl ShippingTerms {
    pub fn new(cost: Decimal, free_shipping_threshold: Option<Decimal>) -> Result<Self, PricingError> {
        if cost < Decimal::ZERO {
            return Err(PricingError::validation("shippingCost", "o frete não pode ser negativo"));
        }
        if free_shipping_threshold.is_some_and(|t| t < Decimal::ZERO) {
            return Err(PricingError::validation(
                "freeShippingThreshold",
                "o limite de frete grátis não pode ser negativo",
            ));
        }
        Ok(Self { cost, free_shipping_threshold })
    }

    pub fn is_free_at(&self, price: Decimal) -> bool {
        self.free_shipping_threshold.is_some_and(|threshold| price >= threshold)
    }

    /// Frete que entra na fórmula ao preço informado.
    pub fn cost_at(&self, price: Decimal) -> Decimal {
        if self.is_free_at(price) {
            Decimal::ZERO
        } else {
            self.cost
        }
    }
}
