//! Delivery outcome reporting.
//!
//! Observers see every finished attempt but cannot change it: there is no
//! retry, and nothing flows back to the host.

use eventstream_core::types::TenantId;

use super::dispatcher::DeliveryOutcome;

/// Receives the outcome of each delivery attempt.
pub trait DeliveryObserver: Send + Sync {
    fn on_delivery(&self, tenant_id: TenantId, event: &str, outcome: &DeliveryOutcome);
}

/// Reports outcomes through `tracing`.
#[derive(Debug, Clone, Copy)]
pub struct TracingObserver {
    log_failures: bool,
}

impl TracingObserver {
    /// `log_failures = false` demotes rejected and failed attempts to `debug`.
    pub fn new(log_failures: bool) -> Self {
        Self { log_failures }
    }
}

impl Default for TracingObserver {
    fn default() -> Self {
        Self::new(true)
    }
}

impl DeliveryObserver for TracingObserver {
    fn on_delivery(&self, tenant_id: TenantId, event: &str, outcome: &DeliveryOutcome) {
        match outcome {
            DeliveryOutcome::Disabled => {
                tracing::trace!(tenant_id, event, "Event stream disabled, delivery skipped");
            }
            DeliveryOutcome::Delivered { status, signed } => {
                tracing::debug!(tenant_id, event, status, signed, "Event delivered");
            }
            DeliveryOutcome::Rejected { status, signed } => {
                if self.log_failures {
                    tracing::warn!(tenant_id, event, status, signed, "Event endpoint rejected delivery");
                } else {
                    tracing::debug!(tenant_id, event, status, signed, "Event endpoint rejected delivery");
                }
            }
            DeliveryOutcome::Failed { error, signed } => {
                if self.log_failures {
                    tracing::warn!(tenant_id, event, signed, error = %error, "Event delivery failed");
                } else {
                    tracing::debug!(tenant_id, event, signed, error = %error, "Event delivery failed");
                }
            }
        }
    }
}

/// Discards outcomes.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl DeliveryObserver for NoopObserver {
    fn on_delivery(&self, _tenant_id: TenantId, _event: &str, _outcome: &DeliveryOutcome) {}
}
