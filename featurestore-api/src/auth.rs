//! `X-API-Key` authentication: a static key -> opaque tenant tag table.
//!
//! The feature store does not implement multi-tenant data isolation; the
//! tenant tag is carried only for logging/metrics labeling.

use std::collections::HashMap;

/// An opaque tenant tag attached to an authenticated request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantTag(pub String);

/// Static table of accepted API keys, loaded once at startup.
#[derive(Debug, Clone, Default)]
pub struct AuthConfig {
    keys: HashMap<String, TenantTag>,
}

impl AuthConfig {
    pub fn new(keys: HashMap<String, TenantTag>) -> Self {
        Self { keys }
    }

    /// Load `key:tenant` pairs from `FEATURESTORE_API_KEYS`
    /// (`"key1:tenant1,key2:tenant2"`), falling back to a single
    /// development key when unset.
    pub fn from_env() -> Self {
        let raw = std::env::var("FEATURESTORE_API_KEYS")
            .unwrap_or_else(|_| "dev-key:dev-tenant".to_string());
        let keys = raw
            .split(',')
            .filter(|s| !s.trim().is_empty())
            .filter_map(|pair| {
                let (key, tenant) = pair.split_once(':')?;
                Some((key.trim().to_string(), TenantTag(tenant.trim().to_string())))
            })
            .collect();
        Self { keys }
    }

    /// Resolve an `X-API-Key` header value to its tenant tag. `None` for a
    /// missing or unknown key — the caller maps both to 401.
    pub fn authenticate(&self, api_key: Option<&str>) -> Option<TenantTag> {
        let key = api_key?;
        self.keys.get(key).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> AuthConfig {
        let mut keys = HashMap::new();
        keys.insert("good-key".to_string(), TenantTag("acme".to_string()));
        AuthConfig::new(keys)
    }

    #[test]
    fn missing_key_is_rejected() {
        assert_eq!(config().authenticate(None), None);
    }

    #[test]
    fn unknown_key_is_rejected() {
        assert_eq!(config().authenticate(Some("bad-key")), None);
    }

    #[test]
    fn known_key_resolves_tenant() {
        assert_eq!(
            config().authenticate(Some("good-key")),
            Some(TenantTag("acme".to_string()))
        );
    }
}
