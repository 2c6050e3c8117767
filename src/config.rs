// src/config.rs

use crate::{
    common::cache::RuleCache,
    services::{
        catalog_service::CatalogService, marketplace_service::MarketplaceService,
        pricing_service::PricingService, sales_service::SalesService,
    },
};
use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{env, time::Duration};

/// Configuração lida do ambiente (com `.env` opcional).
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: String,
    pub db_max_connections: u32,
    pub db_acquire_timeout: Duration,
    pub rule_cache_ttl: Duration,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Monta a configuração a partir de uma função de busca (facilita os testes).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let database_url = lookup("DATABASE_URL").context("DATABASE_URL deve ser definida")?;

        let parse_or = |key: &str, default: u64| -> anyhow::Result<u64> {
            match lookup(key) {
                Some(raw) => raw
                    .trim()
                    .parse::<u64>()
                    .with_context(|| format!("{key} deve ser um número inteiro (recebido: '{raw}')")),
                None => Ok(default),
            }
        };

        Ok(Self {
            database_url,
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:3000".to_string()),
            db_max_connections: u32::try_from(parse_or("DB_MAX_CONNECTIONS", 5)?)
                .context("DB_MAX_CONNECTIONS fora do intervalo")?,
            db_acquire_timeout: Duration::from_secs(parse_or("DB_ACQUIRE_TIMEOUT_SECS", 3)?),
            rule_cache_ttl: Duration::from_secs(parse_or("RULE_CACHE_TTL_SECS", 300)?),
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub rule_cache: RuleCache,
    pub catalog_service: CatalogService,
    pub marketplace_service: MarketplaceService,
    pub pricing_service: PricingService,
    pub sales_service: SalesService,
}

impl AppState {
    pub async fn new(config: &Config) -> anyhow::Result<Self> {
        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(config.db_acquire_timeout)
            .connect(&config.database_url)
            .await
            .context("Falha ao conectar ao banco de dados")?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        Ok(Self::with_pool(db_pool, config.rule_cache_ttl))
    }

    // --- Monta o gráfico de dependências ---
    pub fn with_pool(db_pool: PgPool, rule_cache_ttl: Duration) -> Self {
        let rule_cache = RuleCache::new(rule_cache_ttl);

        let catalog_service = CatalogService::new(db_pool.clone());
        let marketplace_service = MarketplaceService::new(db_pool.clone(), rule_cache.clone());
        let pricing_service = PricingService::new(
            db_pool.clone(),
            catalog_service.clone(),
            marketplace_service.clone(),
        );
        let sales_service = SalesService::new(
            db_pool.clone(),
            catalog_service.clone(),
            marketplace_service.clone(),
            pricing_service.clone(),
        );

        Self {
            db_pool,
            rule_cache,
            catalog_service,
            marketplace_service,
            pricing_service,
            sales_service,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn valores_padrao() {
        let config = Config::from_lookup(lookup(&[("DATABASE_URL", "postgres://localhost/precos")])).unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:3000");
        assert_eq!(config.db_max_connections, 5);
        assert_eq!(config.db_acquire_timeout, Duration::from_secs(3));
        assert_eq!(config.rule_cache_ttl, Duration::from_secs(300));
    }

    #[test]
    fn sobrescritas_do_ambiente() {
        let config = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://db/precos"),
            ("BIND_ADDR", "127.0.0.1:8080"),
            ("DB_MAX_CONNECTIONS", "20"),
            ("RULE_CACHE_TTL_SECS", " 30 "),
        ]))
        .unwrap();
        assert_eq!(config.bind_addr, "127.0.0.1:8080");
        assert_eq!(config.db_max_connections, 20);
        assert_eq!(config.rule_cache_ttl, Duration::from_secs(30));
    }

    #[test]
    fn erros_de_configuracao() {
        assert!(Config::from_lookup(lookup(&[])).is_err());

        let err = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://db/precos"),
            ("RULE_CACHE_TTL_SECS", "cinco"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("RULE_CACHE_TTL_SECS"));
    }
}
