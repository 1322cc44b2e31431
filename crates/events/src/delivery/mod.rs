//! Outbound delivery of event envelopes.
//!
//! The [`Dispatcher`](dispatcher::Dispatcher) resolves the tenant's target,
//! signs the serialized envelope, and hands the request to a
//! [`Transport`](transport::Transport). The outcome goes to a
//! [`DeliveryObserver`](observer::DeliveryObserver) and nowhere else.

pub mod dispatcher;
pub mod observer;
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;
