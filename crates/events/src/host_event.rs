//! Host events the event stream subscribes to.
//!
//! Each host event hands over a different shape: a full record, a parameter
//! bag, or a bare identifier. [`HostEvent`] models that as one variant per
//! event, so every normalization path knows exactly what it was given.
//!
//! On the wire (bus ingress) a host event is
//! `{ "event": "<host event name>", "params": { ... } }`. Ids may arrive as
//! numbers or numeric strings; anything else (absent, `null`, zero, junk)
//! reads as `None` so the event is skipped downstream instead of rejected.

use eventstream_core::normalize;
use eventstream_core::types::{DbId, RawRecord};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

pub const CLIENTS_CREATE: &str = "Clients.create";
pub const CLIENTS_EDIT: &str = "Clients.edit";
pub const INVOICES_SET_CLOSED: &str = "Invoices.setClosed";
pub const TRANSACTIONS_ADD: &str = "Transactions.add";

/// A host event with the parameters its contract guarantees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "params")]
pub enum HostEvent {
    /// A client was created. The host passes the created record, though it
    /// may be missing in some calling contexts.
    #[serde(rename = "Clients.create")]
    ClientCreated {
        #[serde(default)]
        client: Option<RawRecord>,
    },

    /// A client was edited. Carries the updated record when available,
    /// otherwise only the client id.
    #[serde(rename = "Clients.edit")]
    ClientEdited {
        #[serde(default)]
        client: Option<RawRecord>,
        #[serde(default, deserialize_with = "lenient_id")]
        client_id: Option<DbId>,
    },

    /// An invoice was closed; only its id is supplied.
    #[serde(rename = "Invoices.setClosed")]
    InvoiceClosed {
        #[serde(default, deserialize_with = "lenient_id")]
        invoice_id: Option<DbId>,
    },

    /// A payment transaction was recorded; only ids are supplied.
    #[serde(rename = "Transactions.add")]
    TransactionAdded {
        #[serde(default, deserialize_with = "lenient_id")]
        transaction_id: Option<DbId>,
        #[serde(default, deserialize_with = "lenient_id")]
        client_id: Option<DbId>,
    },
}

fn lenient_id<'de, D>(deserializer: D) -> Result<Option<DbId>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(normalize::id_from_value))
}

impl HostEvent {
    /// The host bus name of this event.
    pub fn name(&self) -> &'static str {
        match self {
            Self::ClientCreated { .. } => CLIENTS_CREATE,
            Self::ClientEdited { .. } => CLIENTS_EDIT,
            Self::InvoiceClosed { .. } => INVOICES_SET_CLOSED,
            Self::TransactionAdded { .. } => TRANSACTIONS_ADD,
        }
    }
}
