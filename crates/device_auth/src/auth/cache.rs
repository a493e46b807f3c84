use std::collections::HashMap;

use super::token::TokenRecord;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub tenant: String,
    pub resource: String,
}

impl CacheKey {
    pub fn new(tenant: impl Into<String>, resource: impl Into<String>) -> Self {
        Self {
            tenant: tenant.into(),
            resource: resource.into(),
        }
    }
}

/// In-memory token store. Holds at most one record per (tenant, resource).
#[derive(Debug, Default)]
pub struct TokenCache {
    records: HashMap<CacheKey, TokenRecord>,
}

impl TokenCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, tenant: &str, resource: &str) -> Option<&TokenRecord> {
        self.records.get(&CacheKey::new(tenant, resource))
    }

    /// Stores `record`, returning the one it replaced.
    pub fn insert(
        &mut self,
        tenant: &str,
        resource: &str,
        record: TokenRecord,
    ) -> Option<TokenRecord> {
        self.records.insert(CacheKey::new(tenant, resource), record)
    }

    pub fn remove(&mut self, tenant: &str, resource: &str) -> Option<TokenRecord> {
        self.records.remove(&CacheKey::new(tenant, resource))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_overwrites_existing_record() {
        let mut cache = TokenCache::new();
        assert!(cache
            .insert("tenant", "https://graph.microsoft.com", TokenRecord::new("a1", "r1", 60))
            .is_none());

        let replaced = cache
            .insert("tenant", "https://graph.microsoft.com", TokenRecord::new("a2", "r2", 60))
            .expect("previous record");

        assert_eq!(replaced.access_token, "a1");
        assert_eq!(cache.len(), 1);
        assert_eq!(
            cache.get("tenant", "https://graph.microsoft.com").unwrap().access_token,
            "a2"
        );
    }

    #[test]
    fn records_are_scoped_by_tenant_and_resource() {
        let mut cache = TokenCache::new();
        cache.insert("contoso", "https://graph.microsoft.com", TokenRecord::new("a", "r", 60));

        assert!(cache.get("fabrikam", "https://graph.microsoft.com").is_none());
        assert!(cache.get("contoso", "https://management.azure.com").is_none());

        assert!(cache.remove("contoso", "https://graph.microsoft.com").is_some());
        assert!(cache.is_empty());
    }
}
