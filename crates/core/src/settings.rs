//! Per-tenant event stream settings.
//!
//! The event stream reads its delivery target from the host's company
//! settings on every delivery. This module holds the well-known setting
//! keys, the [`DeliveryTarget`] snapshot built from them, and the
//! [`SettingsStore`] port through which the settings are read and written.

use std::collections::HashMap;
use std::fmt;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::error::CoreError;
use crate::types::TenantId;

// ---------------------------------------------------------------------------
// Keys
// ---------------------------------------------------------------------------

/// Destination URL. An empty value means streaming is disabled.
pub const SETTING_ENDPOINT: &str = "event_stream.endpoint";

/// PEM-encoded private key used to sign outgoing payloads.
pub const SETTING_PRIVATE_KEY: &str = "event_stream.private_key";

/// Alternate name for [`SETTING_PRIVATE_KEY`], consulted when the primary
/// key is unset or empty.
pub const SETTING_SIGNING_KEY: &str = "event_stream.signing_key";

/// Maximum accepted length of an endpoint URL.
pub const MAX_ENDPOINT_LENGTH: usize = 2048;

// ---------------------------------------------------------------------------
// SettingsStore
// ---------------------------------------------------------------------------

/// Error type for settings storage failures.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// The backing store could not be read or written.
    #[error("Settings backend error: {0}")]
    Backend(String),
}

/// Read/write access to tenant-scoped settings owned by the host.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Fetch a setting value, `None` when the key is not set for the tenant.
    async fn get_setting(
        &self,
        tenant_id: TenantId,
        key: &str,
    ) -> Result<Option<String>, SettingsError>;

    /// Create or overwrite a setting value.
    async fn set_setting(
        &self,
        tenant_id: TenantId,
        key: &str,
        value: &str,
    ) -> Result<(), SettingsError>;

    /// Remove a setting. Removing an absent key is not an error.
    async fn unset_setting(&self, tenant_id: TenantId, key: &str) -> Result<(), SettingsError>;
}

/// Process-local [`SettingsStore`] used by tests and local runs.
#[derive(Debug, Default)]
pub struct InMemorySettingsStore {
    values: RwLock<HashMap<(TenantId, String), String>>,
}

impl InMemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style seeding of a single value.
    pub fn with_setting(self, tenant_id: TenantId, key: &str, value: &str) -> Self {
        if let Ok(mut values) = self.values.write() {
            values.insert((tenant_id, key.to_string()), value.to_string());
        }
        self
    }
}

fn poisoned<T>(_: T) -> SettingsError {
    SettingsError::Backend("settings lock poisoned".into())
}

#[async_trait]
impl SettingsStore for InMemorySettingsStore {
    async fn get_setting(
        &self,
        tenant_id: TenantId,
        key: &str,
    ) -> Result<Option<String>, SettingsError> {
        let values = self.values.read().map_err(poisoned)?;
        Ok(values.get(&(tenant_id, key.to_string())).cloned())
    }

    async fn set_setting(
        &self,
        tenant_id: TenantId,
        key: &str,
        value: &str,
    ) -> Result<(), SettingsError> {
        let mut values = self.values.write().map_err(poisoned)?;
        values.insert((tenant_id, key.to_string()), value.to_string());
        Ok(())
    }

    async fn unset_setting(&self, tenant_id: TenantId, key: &str) -> Result<(), SettingsError> {
        let mut values = self.values.write().map_err(poisoned)?;
        values.remove(&(tenant_id, key.to_string()));
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// DeliveryTarget
// ---------------------------------------------------------------------------

/// Transient snapshot of where (and whether) to deliver for one tenant.
///
/// Built fresh for every delivery; never cached across events.
#[derive(Clone, PartialEq, Eq)]
pub struct DeliveryTarget {
    /// Destination URL, empty when streaming is disabled.
    pub url: String,
    /// PEM key material, `None` when deliveries go out unsigned.
    pub signing_key: Option<Vec<u8>>,
}

impl DeliveryTarget {
    /// Build a target from raw setting values.
    ///
    /// Surrounding whitespace is ignored; an empty key counts as absent.
    pub fn from_settings(endpoint: Option<&str>, signing_key: Option<&str>) -> Self {
        let url = endpoint.map(str::trim).unwrap_or_default().to_string();
        let signing_key = signing_key
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(|k| k.as_bytes().to_vec());
        Self { url, signing_key }
    }

    /// A target that disables delivery.
    pub fn disabled() -> Self {
        Self {
            url: String::new(),
            signing_key: None,
        }
    }

    /// `false` when no endpoint is configured.
    pub fn is_enabled(&self) -> bool {
        !self.url.is_empty()
    }
}

impl fmt::Debug for DeliveryTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeliveryTarget")
            .field("url", &self.url)
            .field("signing_key", &self.signing_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Check an endpoint value submitted through the settings surface.
///
/// An empty value is accepted (it disables streaming). Anything else must be
/// an absolute `http` or `https` URL with a host.
pub fn validate_endpoint(endpoint: &str) -> Result<(), CoreError> {
    let endpoint = endpoint.trim();
    if endpoint.is_empty() {
        return Ok(());
    }
    if endpoint.len() > MAX_ENDPOINT_LENGTH {
        return Err(CoreError::Validation(format!(
            "endpoint must be at most {MAX_ENDPOINT_LENGTH} characters"
        )));
    }

    let rest = endpoint
        .strip_prefix("https://")
        .or_else(|| endpoint.strip_prefix("http://"))
        .ok_or_else(|| CoreError::Validation("endpoint must use http or https".into()))?;

    let host = rest.split(['/', '?', '#']).next().unwrap_or_default();
    if host.is_empty() || host.chars().any(char::is_whitespace) {
        return Err(CoreError::Validation("endpoint must include a host".into()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn empty_endpoint_is_disabled() {
        assert!(!DeliveryTarget::from_settings(Some(""), None).is_enabled());
        assert!(!DeliveryTarget::from_settings(Some("   "), None).is_enabled());
        assert!(!DeliveryTarget::from_settings(None, Some("key")).is_enabled());
        assert!(!DeliveryTarget::disabled().is_enabled());
    }

    #[test]
    fn endpoint_is_trimmed() {
        let target = DeliveryTarget::from_settings(Some(" https://hooks.test/in \n"), None);
        assert!(target.is_enabled());
        assert_eq!(target.url, "https://hooks.test/in");
    }

    #[test]
    fn blank_signing_key_counts_as_absent() {
        let target = DeliveryTarget::from_settings(Some("https://hooks.test"), Some("  "));
        assert!(target.signing_key.is_none());

        let target = DeliveryTarget::from_settings(Some("https://hooks.test"), Some("pem"));
        assert_eq!(target.signing_key.as_deref(), Some(b"pem".as_slice()));
    }

    #[test]
    fn debug_output_redacts_key_material() {
        let target = DeliveryTarget::from_settings(Some("https://hooks.test"), Some("SECRET"));
        let rendered = format!("{target:?}");
        assert!(!rendered.contains("SECRET"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn validate_endpoint_accepts_empty_and_http_urls() {
        assert!(validate_endpoint("").is_ok());
        assert!(validate_endpoint("http://localhost:8080/events").is_ok());
        assert!(validate_endpoint("https://hooks.example.com").is_ok());
    }

    #[test]
    fn validate_endpoint_rejects_other_values() {
        assert_matches!(validate_endpoint("ftp://example.com"), Err(CoreError::Validation(_)));
        assert_matches!(validate_endpoint("example.com"), Err(CoreError::Validation(_)));
        assert_matches!(validate_endpoint("https://"), Err(CoreError::Validation(_)));
        assert_matches!(validate_endpoint("https://a b/c"), Err(CoreError::Validation(_)));

        let long = format!("https://example.com/{}", "a".repeat(MAX_ENDPOINT_LENGTH));
        assert_matches!(validate_endpoint(&long), Err(CoreError::Validation(_)));
    }

    #[tokio::test]
    async fn in_memory_store_set_get_unset() {
        let store = InMemorySettingsStore::new();
        assert_eq!(store.get_setting(1, SETTING_ENDPOINT).await.unwrap(), None);

        store
            .set_setting(1, SETTING_ENDPOINT, "https://hooks.test")
            .await
            .unwrap();
        assert_eq!(
            store.get_setting(1, SETTING_ENDPOINT).await.unwrap().as_deref(),
            Some("https://hooks.test")
        );
        // Other tenants are unaffected.
        assert_eq!(store.get_setting(2, SETTING_ENDPOINT).await.unwrap(), None);

        store.unset_setting(1, SETTING_ENDPOINT).await.unwrap();
        assert_eq!(store.get_setting(1, SETTING_ENDPOINT).await.unwrap(), None);

        // Unsetting again is fine.
        store.unset_setting(1, SETTING_ENDPOINT).await.unwrap();
    }
}
