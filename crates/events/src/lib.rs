//! Outbound event stream: capture, normalize, sign, deliver.
//!
//! This crate wires host events to a single per-tenant HTTP endpoint:
//!
//! - [`EventBus`]: in-process hub carrying [`TenantEvent`]s from the host,
//!   backed by `tokio::sync::broadcast`.
//! - [`HostEvent`]: one variant per subscribed host event, with the
//!   parameters that event guarantees.
//! - [`PayloadNormalizer`]: turns a host event into a flat payload,
//!   resolving ids through the entity lookup port.
//! - [`EndpointResolver`]: reads the tenant's delivery target on every
//!   delivery.
//! - [`delivery`]: envelope serialization, signing, and the fire-and-forget
//!   HTTP [`Dispatcher`].
//! - [`EventStreamPlugin`]: the static subscription table and composition
//!   root.

pub mod bus;
pub mod config;
pub mod delivery;
pub mod envelope;
pub mod host_event;
pub mod normalizer;
pub mod registry;
pub mod resolver;

pub use bus::{EventBus, TenantEvent};
pub use config::DeliveryConfig;
pub use delivery::dispatcher::{DeliveryOutcome, Dispatcher};
pub use delivery::observer::{DeliveryObserver, NoopObserver, TracingObserver};
pub use delivery::transport::{HttpTransport, OutboundRequest, Transport, TransportError};
pub use envelope::{EmittedEvent, EventEnvelope};
pub use host_event::HostEvent;
pub use normalizer::{PayloadNormalizer, SkipReason};
pub use registry::{EventStreamPlugin, HandleOutcome, Subscription};
pub use resolver::EndpointResolver;
