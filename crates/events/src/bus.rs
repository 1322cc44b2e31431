//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is where the host publishes [`TenantEvent`]s. The event
//! stream plugin is one subscriber; it is designed to be shared via
//! `Arc<EventBus>` across the application.

use eventstream_core::types::TenantId;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::host_event::HostEvent;

// ---------------------------------------------------------------------------
// TenantEvent
// ---------------------------------------------------------------------------

/// A host event together with the tenant it occurred under.
///
/// The tenant travels with every event so handlers never consult ambient
/// state to find which company's settings apply.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenantEvent {
    pub tenant_id: TenantId,
    pub event: HostEvent,
}

impl TenantEvent {
    pub fn new(tenant_id: TenantId, event: HostEvent) -> Self {
        Self { tenant_id, event }
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
pub const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out event bus.
///
/// Wraps a [`broadcast::Sender`] so that any number of subscribers can
/// independently receive every published [`TenantEvent`].
///
/// # Usage
///
/// ```rust
/// use eventstream_events::bus::{EventBus, TenantEvent};
/// use eventstream_events::HostEvent;
///
/// let bus = EventBus::default();
/// let mut rx = bus.subscribe();
///
/// bus.publish(TenantEvent::new(1, HostEvent::InvoiceClosed { invoice_id: Some(99) }));
/// ```
pub struct EventBus {
    sender: broadcast::Sender<TenantEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full, the oldest un-consumed messages are dropped
    /// and slow receivers will observe a `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// Returns the number of subscribers that will see the event. With no
    /// active subscribers the event is silently dropped.
    pub fn publish(&self, event: TenantEvent) -> usize {
        // A SendError only means there are zero receivers.
        self.sender.send(event).unwrap_or(0)
    }

    /// Subscribe to all events published on this bus.
    pub fn subscribe(&self) -> broadcast::Receiver<TenantEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
