//! Per-tenant delivery target lookup.

use std::sync::Arc;

use eventstream_core::settings::{
    DeliveryTarget, SettingsStore, SETTING_ENDPOINT, SETTING_PRIVATE_KEY, SETTING_SIGNING_KEY,
};
use eventstream_core::types::TenantId;

/// Reads a tenant's endpoint and signing key on every call.
///
/// Nothing is cached: configuration may change between events.
#[derive(Clone)]
pub struct EndpointResolver {
    settings: Arc<dyn SettingsStore>,
}

impl EndpointResolver {
    pub fn new(settings: Arc<dyn SettingsStore>) -> Self {
        Self { settings }
    }

    /// Resolve the delivery target for `tenant_id`.
    ///
    /// An unreadable endpoint resolves to a disabled target; an unreadable
    /// key resolves to an unsigned one.
    pub async fn resolve(&self, tenant_id: TenantId) -> DeliveryTarget {
        let endpoint = match self.settings.get_setting(tenant_id, SETTING_ENDPOINT).await {
            Ok(endpoint) => endpoint,
            Err(e) => {
                tracing::warn!(tenant_id, error = %e, "Failed to read event stream endpoint");
                return DeliveryTarget::disabled();
            }
        };

        let target = DeliveryTarget::from_settings(endpoint.as_deref(), None);
        if !target.is_enabled() {
            return target;
        }

        let key = self.signing_key(tenant_id).await;
        DeliveryTarget::from_settings(Some(&target.url), key.as_deref())
    }

    /// `event_stream.private_key`, falling back to `event_stream.signing_key`.
    async fn signing_key(&self, tenant_id: TenantId) -> Option<String> {
        for key in [SETTING_PRIVATE_KEY, SETTING_SIGNING_KEY] {
            match self.settings.get_setting(tenant_id, key).await {
                Ok(Some(value)) if !value.trim().is_empty() => return Some(value),
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(tenant_id, key, error = %e, "Failed to read signing key");
                    return None;
                }
            }
        }
        None
    }
}
