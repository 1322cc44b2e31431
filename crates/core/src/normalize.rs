//! Flat, fixed-key normalization of host entity records.
//!
//! Each [`EntityKind`] has a versionless field catalogue. Normalizing a raw
//! record always yields every catalogue key, in catalogue order:
//!
//! - absent or `null` fields become `""`,
//! - scalar values (strings, numbers, booleans) pass through unchanged,
//! - nested arrays/objects are replaced by their compact JSON text so the
//!   output mapping stays scalar.

use serde_json::Value;

use crate::types::{DbId, RawRecord};

/// A normalized payload: field name to scalar value, catalogue ordered.
pub type NormalizedPayload = serde_json::Map<String, Value>;

// ---------------------------------------------------------------------------
// Field catalogues
// ---------------------------------------------------------------------------

pub const CLIENT_FIELDS: &[&str] = &[
    "id",
    "user_id",
    "status",
    "id_code",
    "contact_id",
    "first_name",
    "last_name",
    "company",
    "title",
    "email",
    "address1",
    "address2",
    "city",
    "state",
    "zip",
    "country",
    "username",
];

pub const INVOICE_FIELDS: &[&str] = &[
    "id",
    "id_code",
    "client_id",
    "status",
    "currency",
    "subtotal",
    "total",
    "paid",
    "due",
    "date_billed",
    "date_due",
    "date_closed",
    "note_public",
];

pub const TRANSACTION_FIELDS: &[&str] = &[
    "id",
    "client_id",
    "amount",
    "currency",
    "type",
    "transaction_type_id",
    "account_id",
    "gateway_id",
    "reference_id",
    "transaction_id",
    "parent_transaction_id",
    "status",
    "date_added",
];

/// Key under which a transaction payload embeds its normalized client.
pub const EMBEDDED_CLIENT_FIELD: &str = "client";

// ---------------------------------------------------------------------------
// EntityKind
// ---------------------------------------------------------------------------

/// Host entity kinds that can appear in an event payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Client,
    Invoice,
    Transaction,
}

impl EntityKind {
    /// Human-readable name, used in logs and lookup errors.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Client => "client",
            Self::Invoice => "invoice",
            Self::Transaction => "transaction",
        }
    }

    /// The fixed key set emitted for this kind.
    pub fn fields(&self) -> &'static [&'static str] {
        match self {
            Self::Client => CLIENT_FIELDS,
            Self::Invoice => INVOICE_FIELDS,
            Self::Transaction => TRANSACTION_FIELDS,
        }
    }
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

/// Normalize a raw record into the flat payload for `kind`.
pub fn normalize(kind: EntityKind, record: &RawRecord) -> NormalizedPayload {
    kind.fields()
        .iter()
        .map(|&field| (field.to_string(), field_or_empty(record, field)))
        .collect()
}

/// Read `field` from `record`, defaulting absent values to `""`.
pub fn field_or_empty(record: &RawRecord, field: &str) -> Value {
    match record.get(field) {
        None | Some(Value::Null) => Value::String(String::new()),
        Some(nested @ (Value::Array(_) | Value::Object(_))) => Value::String(nested.to_string()),
        Some(scalar) => scalar.clone(),
    }
}

/// Extract a positive integer id from a record field.
///
/// Host records carry ids either as numbers or numeric strings; zero, empty,
/// and non-numeric values count as "no reference".
pub fn reference_id(record: &RawRecord, field: &str) -> Option<DbId> {
    record.get(field).and_then(id_from_value)
}

/// Positive integer id from a number or a numeric string.
pub fn id_from_value(value: &Value) -> Option<DbId> {
    let id = match value {
        Value::Number(n) => n.as_i64()?,
        Value::String(s) => s.trim().parse().ok()?,
        _ => return None,
    };
    (id > 0).then_some(id)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
