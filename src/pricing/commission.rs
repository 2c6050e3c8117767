// src/pricing/commission.rs

use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use super::PricingError;

/// Visão mínima de uma regra de comissão. `rate` é uma fração (0.12 = 12%).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommissionRuleRef {
    pub id: Uuid,
    pub marketplace_id: Uuid,
    /// `None` = regra padrão do marketplace (vale para todas as categorias).
    pub category_id: Option<Uuid>,
    pub rate: Decimal,
}

/// Comissão aplicável a um (marketplace, categoria).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedCommission {
    pub rule_id: Uuid,
    /// Fração (0.12 = 12%).
    pub rate: Decimal,
    /// `true` quando veio da regra específica da categoria.
    pub category_specific: bool,
}

impl ResolvedCommission {
    /// Taxa em percentual, como a engine espera.
    pub fn percent(&self) -> Decimal {
        self.rate * Decimal::ONE_HUNDRED
    }
}

/// Resolve a comissão: regra da categoria > regra padrão > `NoCommission`.
///
/// Uma taxa explícita de 0 é um resultado válido; a ausência de regra não é.
pub fn resolve(
    rules: &[CommissionRuleRef],
    marketplace_id: Uuid,
    category_id: Option<Uuid>,
) -> Result<ResolvedCommission, PricingError> {
    if marketplace_id.is_nil() {
        return Err(PricingError::validation("marketplaceId", "o marketplace é obrigatório"));
    }

    let of_marketplace = || rules.iter().filter(|r| r.marketplace_id == marketplace_id);

    if let Some(category) = category_id {
        if let Some(rule) = of_marketplace().find(|r| r.category_id == Some(category)) {
            return Ok(ResolvedCommission {
                rule_id: rule.id,
                rate: rule.rate,
                category_specific: true,
            });
        }
    }

    of_marketplace()
        .find(|r| r.category_id.is_none())
        .map(|rule| ResolvedCommission {
            rule_id: rule.id,
            rate: rule.rate,
            category_specific: false,
        })
        .ok_or(PricingError::NoCommission { marketplace_id })
}

/// Checagem de unicidade feita antes de inserir/atualizar uma regra.
///
/// `updating` é o id da regra em edição, que não conta como duplicata de si mesma.
pub fn ensure_unique(
    rules: &[CommissionRuleRef],
    marketplace_id: Uuid,
    category_id: Option<Uuid>,
    updating: Option<Uuid>,
) -> Result<(), PricingError> {
    let duplicate = rules.iter().any(|r| {
        r.marketplace_id == marketplace_id
            && r.category_id == category_id
            && Some(r.id) != updating
    });

    if duplicate {
        return Err(PricingError::DuplicateRule { marketplace_id, category_id });
    }
    Ok(())
}

/// Converte o percentual digitado (0–100) para a fração armazenada (0–1).
pub fn rate_from_percent(percent: Decimal) -> Result<Decimal, PricingError> {
    if percent < Decimal::ZERO || percent > Decimal::ONE_HUNDRED {
        return Err(PricingError::validation("rate", "a comissão deve estar entre 0 e 100%"));
    }
    Ok(percent / Decimal::ONE_HUNDRED)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use rust_decimal_macros::dec;

    fn rule(marketplace_id: Uuid, category_id: Option<Uuid>, rate: Decimal) -> CommissionRuleRef {
        CommissionRuleRef { id: Uuid::new_v4(), marketplace_id, category_id, rate }
    }

    #[test]
    fn categoria_especifica_tem_precedencia_sobre_padrao() {
        let marketplace = Uuid::new_v4();
        let category = Uuid::new_v4();
        let rules = vec![
            rule(marketplace, None, dec!(0.12)),
            rule(marketplace, Some(category), dec!(0.16)),
        ];

        let specific = resolve(&rules, marketplace, Some(category)).unwrap();
        assert_eq!(specific.rate, dec!(0.16));
        assert!(specific.category_specific);
        assert_eq!(specific.percent(), dec!(16));

        let other = resolve(&rules, marketplace, Some(Uuid::new_v4())).unwrap();
        assert_eq!(other.rate, dec!(0.12));
        assert!(!other.category_specific);

        let none = resolve(&rules, marketplace, None).unwrap();
        assert_eq!(none.rate, dec!(0.12));
    }

    #[test]
    fn regras_de_outros_marketplaces_sao_ignoradas() {
        let marketplace = Uuid::new_v4();
        let category = Uuid::new_v4();
        let rules = vec![rule(Uuid::new_v4(), Some(category), dec!(0.2))];

        assert_matches!(
            resolve(&rules, marketplace, Some(category)),
            Err(PricingError::NoCommission { marketplace_id }) if marketplace_id == marketplace
        );
    }

    #[test]
    fn taxa_zero_e_diferente_de_sem_regra() {
        let marketplace = Uuid::new_v4();
        let rules = vec![rule(marketplace, None, Decimal::ZERO)];

        let resolved = resolve(&rules, marketplace, None).unwrap();
        assert_eq!(resolved.rate, Decimal::ZERO);

        assert_matches!(
            resolve(&[], marketplace, None),
            Err(PricingError::NoCommission { .. })
        );
    }

    #[test]
    fn marketplace_obrigatorio() {
        assert_matches!(
            resolve(&[], Uuid::nil(), None),
            Err(PricingError::Validation { field: "marketplaceId", .. })
        );
    }

    #[test]
    fn duplicata_e_rejeitada_exceto_a_propria_regra() {
        let marketplace = Uuid::new_v4();
        let category = Uuid::new_v4();
        let default_rule = rule(marketplace, None, dec!(0.12));
        let category_rule = rule(marketplace, Some(category), dec!(0.16));
        let rules = vec![default_rule, category_rule];

        assert_matches!(
            ensure_unique(&rules, marketplace, None, None),
            Err(PricingError::DuplicateRule { category_id: None, .. })
        );
        assert_matches!(
            ensure_unique(&rules, marketplace, Some(category), None),
            Err(PricingError::DuplicateRule { .. })
        );

        // Editar a própria regra não conflita
        assert!(ensure_unique(&rules, marketplace, Some(category), Some(category_rule.id)).is_ok());
        // Mover a regra padrão para a categoria já ocupada conflita
        assert!(ensure_unique(&rules, marketplace, Some(category), Some(default_rule.id)).is_err());
        // Nova categoria ou outro marketplace estão livres
        assert!(ensure_unique(&rules, marketplace, Some(Uuid::new_v4()), None).is_ok());
        assert!(ensure_unique(&rules, Uuid::new_v4(), None, None).is_ok());
    }

    #[test]
    fn percentual_vira_fracao() {
        assert_eq!(rate_from_percent(dec!(12)).unwrap(), dec!(0.12));
        assert!(rate_from_percent(dec!(100.5)).is_err());
        assert!(rate_from_percent(dec!(-1)).is_err());
    }
}
