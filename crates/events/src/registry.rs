//! Event subscriptions and the plugin that serves them.
//!
//! [`SUBSCRIPTIONS`] is the fixed table of host events the event stream
//! listens to and the name each one is emitted under. [`EventStreamPlugin`]
//! is the composition root: it owns the normalizer and dispatcher, handles
//! events from the host bus, and seeds or removes the tenant settings when
//! the plugin is installed or uninstalled.

use std::sync::Arc;

use eventstream_core::lookup::EntityLookup;
use eventstream_core::settings::{
    SettingsError, SettingsStore, SETTING_ENDPOINT, SETTING_PRIVATE_KEY, SETTING_SIGNING_KEY,
};
use eventstream_core::types::TenantId;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use crate::bus::TenantEvent;
use crate::config::DeliveryConfig;
use crate::delivery::dispatcher::Dispatcher;
use crate::delivery::observer::{DeliveryObserver, TracingObserver};
use crate::delivery::transport::{HttpTransport, Transport, TransportError};
use crate::envelope::{EmittedEvent, EventEnvelope};
use crate::host_event::{
    HostEvent, CLIENTS_CREATE, CLIENTS_EDIT, INVOICES_SET_CLOSED, TRANSACTIONS_ADD,
};
use crate::normalizer::{PayloadNormalizer, SkipReason};
use crate::resolver::EndpointResolver;

// ---------------------------------------------------------------------------
// Subscription table
// ---------------------------------------------------------------------------

/// One row of the subscription table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subscription {
    /// Host bus event name.
    pub host_event: &'static str,
    /// Name the event is delivered under.
    pub emits: EmittedEvent,
}

/// Host events the event stream subscribes to.
pub const SUBSCRIPTIONS: &[Subscription] = &[
    Subscription {
        host_event: CLIENTS_CREATE,
        emits: EmittedEvent::ClientAdded,
    },
    Subscription {
        host_event: CLIENTS_EDIT,
        emits: EmittedEvent::ClientUpdated,
    },
    Subscription {
        host_event: INVOICES_SET_CLOSED,
        emits: EmittedEvent::InvoiceClosed,
    },
    Subscription {
        host_event: TRANSACTIONS_ADD,
        emits: EmittedEvent::TransactionAdded,
    },
];

/// The subscription row serving `event`.
pub fn subscription(event: &HostEvent) -> &'static Subscription {
    let row = match event {
        HostEvent::ClientCreated { .. } => 0,
        HostEvent::ClientEdited { .. } => 1,
        HostEvent::InvoiceClosed { .. } => 2,
        HostEvent::TransactionAdded { .. } => 3,
    };
    &SUBSCRIPTIONS[row]
}

// ---------------------------------------------------------------------------
// EventStreamPlugin
// ---------------------------------------------------------------------------

/// What a handler did with an event. Never an error: the host only ever
/// sees its handler return.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandleOutcome {
    /// The envelope was handed to the dispatcher.
    Dispatched(EmittedEvent),
    /// Normalization produced no payload.
    Skipped(SkipReason),
}

/// Composition root for the event stream.
pub struct EventStreamPlugin {
    settings: Arc<dyn SettingsStore>,
    normalizer: PayloadNormalizer,
    dispatcher: Dispatcher,
}

impl EventStreamPlugin {
    pub fn new(
        settings: Arc<dyn SettingsStore>,
        lookup: Arc<dyn EntityLookup>,
        transport: Arc<dyn Transport>,
        observer: Arc<dyn DeliveryObserver>,
    ) -> Self {
        let resolver = EndpointResolver::new(Arc::clone(&settings));
        Self {
            settings,
            normalizer: PayloadNormalizer::new(lookup),
            dispatcher: Dispatcher::new(resolver, transport, observer),
        }
    }

    /// Wire the production transport and tracing observer from `config`.
    pub fn from_config(
        settings: Arc<dyn SettingsStore>,
        lookup: Arc<dyn EntityLookup>,
        config: &DeliveryConfig,
    ) -> Result<Self, TransportError> {
        let transport = HttpTransport::new(config.connect_timeout)?;
        Ok(Self::new(
            settings,
            lookup,
            Arc::new(transport),
            Arc::new(TracingObserver::new(config.log_failures)),
        ))
    }

    /// The subscription table exposed to the host bus.
    pub fn subscriptions(&self) -> &'static [Subscription] {
        SUBSCRIPTIONS
    }

    /// Handle one host event: normalize, then dispatch in the background.
    ///
    /// Returns once the payload is built; delivery itself is not awaited.
    pub async fn handle(&self, tenant_id: TenantId, event: &HostEvent) -> HandleOutcome {
        let subscription = subscription(event);

        let payload = match self.normalizer.normalize(tenant_id, event).await {
            Ok(payload) => payload,
            Err(reason) => {
                tracing::debug!(
                    tenant_id,
                    host_event = subscription.host_event,
                    ?reason,
                    "Event produced no payload, skipping delivery"
                );
                return HandleOutcome::Skipped(reason);
            }
        };

        self.dispatcher
            .dispatch(tenant_id, EventEnvelope::new(subscription.emits, payload));
        HandleOutcome::Dispatched(subscription.emits)
    }

    /// Consume the host bus until it closes or `cancel` fires.
    pub async fn run(
        self: Arc<Self>,
        mut receiver: broadcast::Receiver<TenantEvent>,
        cancel: CancellationToken,
    ) {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Event stream cancelled");
                    break;
                }
                received = receiver.recv() => match received {
                    Ok(TenantEvent { tenant_id, event }) => {
                        self.handle(tenant_id, &event).await;
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(skipped = n, "Event stream lagged, some events were not delivered");
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        tracing::info!("Event bus closed, event stream shutting down");
                        break;
                    }
                },
            }
        }
    }

    /// Seed the tenant's settings so streaming starts out disabled.
    pub async fn install(&self, tenant_id: TenantId) -> Result<(), SettingsError> {
        self.settings
            .set_setting(tenant_id, SETTING_ENDPOINT, "")
            .await?;
        self.settings
            .set_setting(tenant_id, SETTING_PRIVATE_KEY, "")
            .await?;
        tracing::info!(tenant_id, "Event stream installed");
        Ok(())
    }

    /// Remove every event stream setting for the tenant.
    pub async fn uninstall(&self, tenant_id: TenantId) -> Result<(), SettingsError> {
        for key in [SETTING_ENDPOINT, SETTING_PRIVATE_KEY, SETTING_SIGNING_KEY] {
            self.settings.unset_setting(tenant_id, key).await?;
        }
        tracing::info!(tenant_id, "Event stream uninstalled");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
