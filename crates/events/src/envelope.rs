//! The `{ event, payload }` envelope sent to the endpoint.

use eventstream_core::normalize::NormalizedPayload;
use serde::Serialize;

/// Event names emitted to the endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EmittedEvent {
    ClientAdded,
    ClientUpdated,
    InvoiceClosed,
    TransactionAdded,
}

impl EmittedEvent {
    /// Return the wire-format name for this variant.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ClientAdded => "clientAdded",
            Self::ClientUpdated => "clientUpdated",
            Self::InvoiceClosed => "invoiceClosed",
            Self::TransactionAdded => "transactionAdded",
        }
    }
}

/// One event ready for delivery.
///
/// Immutable once built; serialized exactly once per delivery attempt so the
/// signature and the request body share the same bytes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventEnvelope {
    event: &'static str,
    payload: NormalizedPayload,
}

impl EventEnvelope {
    pub fn new(event: EmittedEvent, payload: NormalizedPayload) -> Self {
        Self {
            event: event.as_str(),
            payload,
        }
    }

    pub fn event(&self) -> &'static str {
        self.event
    }

    /// Serialize to the JSON request body.
    pub fn to_body(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}
