//! Company settings model.
//!
//! Maps to the host's `company_settings` table, keyed by
//! `(company_id, key)`.

use serde::Serialize;
use sqlx::FromRow;
use eventstream_core::types::{DbId, Timestamp};

/// A row from the `company_settings` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CompanySetting {
    pub company_id: DbId,
    pub key: String,
    pub value: String,
    pub updated_at: Timestamp,
}
