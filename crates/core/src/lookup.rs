//! Entity lookup port.
//!
//! Some host events only carry an identifier. [`EntityLookup`] is how the
//! pipeline fetches the full record; the host's data-access layer provides
//! the real implementation.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::normalize::EntityKind;
use crate::types::{DbId, RawRecord, TenantId};

/// Error type for lookups that could not be answered.
///
/// A record that simply does not exist is `Ok(None)`, not an error.
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("Lookup backend error: {0}")]
    Backend(String),

    #[error("Malformed {entity} record with id {id}: {reason}")]
    Malformed {
        entity: &'static str,
        id: DbId,
        reason: String,
    },
}

/// Fetch full host records by id, scoped to a tenant.
#[async_trait]
pub trait EntityLookup: Send + Sync {
    async fn find(
        &self,
        tenant_id: TenantId,
        kind: EntityKind,
        id: DbId,
    ) -> Result<Option<RawRecord>, LookupError>;
}

/// Process-local [`EntityLookup`] used by tests and local runs.
#[derive(Debug, Default)]
pub struct InMemoryEntityLookup {
    records: RwLock<HashMap<(TenantId, EntityKind, DbId), RawRecord>>,
}

impl InMemoryEntityLookup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style seeding of one record.
    pub fn with_record(self, tenant_id: TenantId, kind: EntityKind, id: DbId, record: RawRecord) -> Self {
        self.insert(tenant_id, kind, id, record);
        self
    }

    pub fn insert(&self, tenant_id: TenantId, kind: EntityKind, id: DbId, record: RawRecord) {
        if let Ok(mut records) = self.records.write() {
            records.insert((tenant_id, kind, id), record);
        }
    }
}

#[async_trait]
impl EntityLookup for InMemoryEntityLookup {
    async fn find(
        &self,
        tenant_id: TenantId,
        kind: EntityKind,
        id: DbId,
    ) -> Result<Option<RawRecord>, LookupError> {
        let records = self
            .records
            .read()
            .map_err(|_| LookupError::Backend("lookup lock poisoned".into()))?;
        Ok(records.get(&(tenant_id, kind, id)).cloned())
    }
}
