// src/common/cache.rs

use std::{
    hash::Hash,
    sync::Arc,
    time::{Duration, Instant},
};

use dashmap::DashMap;
use uuid::Uuid;

use crate::models::marketplace::{CommissionRule, FixedFeeRuleRecord};

/// Cache chave -> valor com validade (TTL). Invalidação é explícita.
pub struct TtlCache<K, V> {
    entries: DashMap<K, (Instant, V)>,
    ttl: Duration,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(ttl: Duration) -> Self {
        Self { entries: DashMap::new(), ttl }
    }

    pub fn get(&self, key: &K) -> Option<V> {
        if let Some(entry) = self.entries.get(key) {
            let (stored_at, value) = entry.value();
            if stored_at.elapsed() < self.ttl {
                return Some(value.clone());
            }
        }
        // Expirado (ou ausente): remove só se ainda estiver vencido
        self.entries.remove_if(key, |_, (stored_at, _)| stored_at.elapsed() >= self.ttl);
        None
    }

    pub fn insert(&self, key: K, value: V) {
        self.entries.insert(key, (Instant::now(), value));
    }

    pub fn invalidate(&self, key: &K) {
        self.entries.remove(key);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// (tenant_id, marketplace_id)
pub type MarketplaceKey = (Uuid, Uuid);

/// Regras de comissão e de valor fixo por marketplace, compartilhadas via `AppState`.
#[derive(Clone)]
pub struct RuleCache {
    commissions: Arc<TtlCache<MarketplaceKey, Arc<Vec<CommissionRule>>>>,
    fixed_fees: Arc<TtlCache<MarketplaceKey, Arc<Vec<FixedFeeRuleRecord>>>>,
}

impl RuleCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            commissions: Arc::new(TtlCache::new(ttl)),
            fixed_fees: Arc::new(TtlCache::new(ttl)),
        }
    }

    pub fn commissions(&self, tenant_id: Uuid, marketplace_id: Uuid) -> Option<Arc<Vec<CommissionRule>>> {
        self.commissions.get(&(tenant_id, marketplace_id))
    }

    pub fn store_commissions(&self, tenant_id: Uuid, marketplace_id: Uuid, rules: Vec<CommissionRule>) -> Arc<Vec<CommissionRule>> {
        let rules = Arc::new(rules);
        self.commissions.insert((tenant_id, marketplace_id), rules.clone());
        rules
    }

    pub fn fixed_fees(&self, tenant_id: Uuid, marketplace_id: Uuid) -> Option<Arc<Vec<FixedFeeRuleRecord>>> {
        self.fixed_fees.get(&(tenant_id, marketplace_id))
    }

    pub fn store_fixed_fees(&self, tenant_id: Uuid, marketplace_id: Uuid, rules: Vec<FixedFeeRuleRecord>) -> Arc<Vec<FixedFeeRuleRecord>> {
        let rules = Arc::new(rules);
        self.fixed_fees.insert((tenant_id, marketplace_id), rules.clone());
        rules
    }

    /// Chamado após qualquer escrita nas regras do marketplace.
    pub fn invalidate_marketplace(&self, tenant_id: Uuid, marketplace_id: Uuid) {
        tracing::debug!(%tenant_id, %marketplace_id, "Cache de regras invalidado");
        self.commissions.invalidate(&(tenant_id, marketplace_id));
        self.fixed_fees.invalidate(&(tenant_id, marketplace_id));
    }
}
