//! [`PgStore`]: the PostgreSQL-backed collaborator for the pipeline.

use async_trait::async_trait;
use eventstream_core::lookup::{EntityLookup, LookupError};
use eventstream_core::normalize::EntityKind;
use eventstream_core::settings::{SettingsError, SettingsStore};
use eventstream_core::types::{DbId, RawRecord, TenantId};

use crate::repositories::{CompanySettingRepo, EntityRepo};
use crate::DbPool;

/// Implements [`SettingsStore`] and [`EntityLookup`] over a connection pool.
#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SettingsStore for PgStore {
    async fn get_setting(
        &self,
        tenant_id: TenantId,
        key: &str,
    ) -> Result<Option<String>, SettingsError> {
        let row = CompanySettingRepo::get(&self.pool, tenant_id, key)
            .await
            .map_err(backend)?;
        Ok(row.map(|setting| setting.value))
    }

    async fn set_setting(
        &self,
        tenant_id: TenantId,
        key: &str,
        value: &str,
    ) -> Result<(), SettingsError> {
        CompanySettingRepo::upsert(&self.pool, tenant_id, key, value)
            .await
            .map_err(backend)?;
        Ok(())
    }

    async fn unset_setting(&self, tenant_id: TenantId, key: &str) -> Result<(), SettingsError> {
        CompanySettingRepo::delete(&self.pool, tenant_id, key)
            .await
            .map_err(backend)?;
        Ok(())
    }
}

#[async_trait]
impl EntityLookup for PgStore {
    async fn find(
        &self,
        tenant_id: TenantId,
        kind: EntityKind,
        id: DbId,
    ) -> Result<Option<RawRecord>, LookupError> {
        let value = EntityRepo::find_json(&self.pool, tenant_id, kind, id)
            .await
            .map_err(|e| LookupError::Backend(e.to_string()))?;
        value.map(|v| into_record(kind, id, v)).transpose()
    }
}

fn backend(err: sqlx::Error) -> SettingsError {
    SettingsError::Backend(err.to_string())
}

/// Unwrap a `to_jsonb` row into a record map.
fn into_record(kind: EntityKind, id: DbId, value: serde_json::Value) -> Result<RawRecord, LookupError> {
    match value {
        serde_json::Value::Object(record) => Ok(record),
        other => Err(LookupError::Malformed {
            entity: kind.as_str(),
            id,
            reason: format!("expected JSON object, got {other}"),
        }),
    }
}
