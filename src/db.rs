pub mod catalog_repo;
pub use catalog_repo::{CatalogRepository, ProductFields};
pub mod marketplace_repo;
pub use marketplace_repo::MarketplaceRepository;
pub mod pricing_repo;
pub use pricing_repo::PricingRepository;
pub mod sales_repo;
pub use sales_repo::SalesRepository;

#[cfg(test)]
mod tests {
    const SCHEMA: &str = include_str!("../migrations/20250101000000_init.sql");

    fn table(name: &str) -> &'static str {
        let start = SCHEMA
            .find(&format!("CREATE TABLE {name} ("))
            .unwrap_or_else(|| panic!("tabela {name} ausente"));
        let end = SCHEMA[start..].find(");").map(|i| start + i).unwrap();
        &SCHEMA[start..end]
    }

    #[test]
    fn regras_impedem_a_exclusao_do_marketplace() {
        for name in ["commissions", "fixed_fee_rules", "shipping_rules", "saved_pricings", "sales"] {
            let ddl = table(name);
            assert!(
                ddl.contains("REFERENCES marketplaces (tenant_id, id) ON DELETE RESTRICT"),
                "{name} deveria bloquear a exclusão do marketplace"
            );
        }
        assert!(!SCHEMA.contains("REFERENCES marketplaces(id)"));
    }

    #[test]
    fn chaves_estrangeiras_sao_da_mesma_loja() {
        // Nenhuma referência só por id: todas passam pelo par (tenant_id, id)
        for line in SCHEMA.lines().filter(|l| l.contains("REFERENCES")) {
            assert!(line.contains("(tenant_id, id)"), "referência sem tenant: {line}");
        }
        for name in ["categories", "products", "marketplaces"] {
            assert!(table(name).contains("UNIQUE (tenant_id, id)"));
        }
        assert!(table("commissions").contains("FOREIGN KEY (tenant_id, category_id) REFERENCES categories (tenant_id, id)"));
        assert!(table("sales").contains("FOREIGN KEY (tenant_id, product_id) REFERENCES products (tenant_id, id)"));
    }
}
