//! Fire-and-forget envelope dispatch.
//!
//! [`Dispatcher::dispatch`] spawns the delivery and returns immediately; the
//! caller never learns how it went. Every attempt follows the same guards:
//!
//! 1. no endpoint configured → [`DeliveryOutcome::Disabled`], no network
//! 2. no key, or signing fails → sent without a signature header
//! 3. transport failure or non-2xx → recorded, never retried

use std::sync::Arc;

use eventstream_core::signing::{self, SIGNATURE_HEADER};
use eventstream_core::types::TenantId;

use super::observer::DeliveryObserver;
use super::transport::{OutboundRequest, Transport, TransportError};
use crate::envelope::EventEnvelope;
use crate::resolver::EndpointResolver;

pub const CONTENT_TYPE_JSON: &str = "application/json";

/// How a single delivery attempt ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// The tenant has no endpoint; nothing was sent.
    Disabled,
    /// The endpoint answered 2xx.
    Delivered { status: u16, signed: bool },
    /// The endpoint answered with a non-2xx status.
    Rejected { status: u16, signed: bool },
    /// The request did not complete (DNS, connect, TLS, I/O, serialization).
    Failed { error: String, signed: bool },
}

/// Resolves, signs, and sends envelopes.
#[derive(Clone)]
pub struct Dispatcher {
    resolver: EndpointResolver,
    transport: Arc<dyn Transport>,
    observer: Arc<dyn DeliveryObserver>,
}

impl Dispatcher {
    pub fn new(
        resolver: EndpointResolver,
        transport: Arc<dyn Transport>,
        observer: Arc<dyn DeliveryObserver>,
    ) -> Self {
        Self {
            resolver,
            transport,
            observer,
        }
    }

    /// Deliver `envelope` in a background task.
    ///
    /// Must be called from within a Tokio runtime. The spawned task is not
    /// tracked; process shutdown may abandon it.
    pub fn dispatch(&self, tenant_id: TenantId, envelope: EventEnvelope) {
        let this = self.clone();
        tokio::spawn(async move {
            this.deliver(tenant_id, &envelope).await;
        });
    }

    /// Perform one delivery attempt and report it to the observer.
    pub async fn deliver(&self, tenant_id: TenantId, envelope: &EventEnvelope) -> DeliveryOutcome {
        let outcome = self.attempt(tenant_id, envelope).await;
        self.observer
            .on_delivery(tenant_id, envelope.event(), &outcome);
        outcome
    }

    async fn attempt(&self, tenant_id: TenantId, envelope: &EventEnvelope) -> DeliveryOutcome {
        let target = self.resolver.resolve(tenant_id).await;
        if !target.is_enabled() {
            return DeliveryOutcome::Disabled;
        }

        // Serialized once: these bytes are both signed and sent.
        let body = match envelope.to_body() {
            Ok(body) => body,
            Err(e) => {
                return DeliveryOutcome::Failed {
                    error: e.to_string(),
                    signed: false,
                }
            }
        };

        let mut headers = vec![("Content-Type", CONTENT_TYPE_JSON.to_string())];
        let signature = signing::sign(&body, target.signing_key.as_deref());
        let signed = signature.is_some();
        if let Some(signature) = signature {
            headers.push((SIGNATURE_HEADER, signing::encode_signature(&signature)));
        } else if target.signing_key.is_some() {
            tracing::debug!(tenant_id, event = envelope.event(), "Signing key unusable, sending unsigned");
        }

        let request = OutboundRequest {
            url: target.url,
            headers,
            body,
        };
        match self.transport.send(request).await {
            Ok(status) => DeliveryOutcome::Delivered { status, signed },
            Err(TransportError::HttpStatus(status)) => DeliveryOutcome::Rejected { status, signed },
            Err(e) => DeliveryOutcome::Failed {
                error: e.to_string(),
                signed,
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
