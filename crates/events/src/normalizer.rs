//! Host event to flat payload normalization.
//!
//! [`PayloadNormalizer`] has one function per [`HostEvent`] variant. Every
//! way an event can fail to produce a payload is an explicit early return
//! with a named [`SkipReason`]; none of them is an error for the host.

use std::sync::Arc;

use eventstream_core::lookup::EntityLookup;
use eventstream_core::normalize::{self, EntityKind, NormalizedPayload, EMBEDDED_CLIENT_FIELD};
use eventstream_core::types::{DbId, RawRecord, TenantId};
use serde_json::Value;

use crate::host_event::{
    HostEvent, CLIENTS_CREATE, CLIENTS_EDIT, INVOICES_SET_CLOSED, TRANSACTIONS_ADD,
};

/// Why an event produced no payload (and therefore no delivery).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The event carried neither a record nor a usable id.
    MissingRecord { event: &'static str },
    /// The id did not resolve to a record.
    NotFound { entity: &'static str, id: DbId },
    /// The lookup itself failed; treated like a miss.
    LookupFailed {
        entity: &'static str,
        id: DbId,
        error: String,
    },
}

/// Builds normalized payloads, fetching records by id when needed.
#[derive(Clone)]
pub struct PayloadNormalizer {
    lookup: Arc<dyn EntityLookup>,
}

impl PayloadNormalizer {
    pub fn new(lookup: Arc<dyn EntityLookup>) -> Self {
        Self { lookup }
    }

    /// Normalize `event` for `tenant_id`.
    pub async fn normalize(
        &self,
        tenant_id: TenantId,
        event: &HostEvent,
    ) -> Result<NormalizedPayload, SkipReason> {
        match event {
            HostEvent::ClientCreated { client } => self.client_created(client.as_ref()),
            HostEvent::ClientEdited { client, client_id } => {
                self.client_edited(tenant_id, client.as_ref(), *client_id)
                    .await
            }
            HostEvent::InvoiceClosed { invoice_id } => {
                self.invoice_closed(tenant_id, *invoice_id).await
            }
            HostEvent::TransactionAdded {
                transaction_id,
                client_id,
            } => {
                self.transaction_added(tenant_id, *transaction_id, *client_id)
                    .await
            }
        }
    }

    fn client_created(&self, client: Option<&RawRecord>) -> Result<NormalizedPayload, SkipReason> {
        let client = client
            .filter(|c| !c.is_empty())
            .ok_or(SkipReason::MissingRecord {
                event: CLIENTS_CREATE,
            })?;
        Ok(normalize::normalize(EntityKind::Client, client))
    }

    async fn client_edited(
        &self,
        tenant_id: TenantId,
        client: Option<&RawRecord>,
        client_id: Option<DbId>,
    ) -> Result<NormalizedPayload, SkipReason> {
        if let Some(client) = client.filter(|c| !c.is_empty()) {
            return Ok(normalize::normalize(EntityKind::Client, client));
        }

        let id = client_id
            .filter(|id| *id > 0)
            .ok_or(SkipReason::MissingRecord {
                event: CLIENTS_EDIT,
            })?;
        let record = self.fetch(tenant_id, EntityKind::Client, id).await?;
        Ok(normalize::normalize(EntityKind::Client, &record))
    }

    async fn invoice_closed(
        &self,
        tenant_id: TenantId,
        invoice_id: Option<DbId>,
    ) -> Result<NormalizedPayload, SkipReason> {
        let invoice_id = invoice_id.ok_or(SkipReason::MissingRecord {
            event: INVOICES_SET_CLOSED,
        })?;
        let record = self.fetch(tenant_id, EntityKind::Invoice, invoice_id).await?;
        Ok(normalize::normalize(EntityKind::Invoice, &record))
    }

    /// The transaction payload embeds the normalized client when the client
    /// resolves; any failure there only drops the `client` field.
    async fn transaction_added(
        &self,
        tenant_id: TenantId,
        transaction_id: Option<DbId>,
        client_id: Option<DbId>,
    ) -> Result<NormalizedPayload, SkipReason> {
        let transaction_id = transaction_id.ok_or(SkipReason::MissingRecord {
            event: TRANSACTIONS_ADD,
        })?;
        let record = self
            .fetch(tenant_id, EntityKind::Transaction, transaction_id)
            .await?;
        let mut payload = normalize::normalize(EntityKind::Transaction, &record);

        let client_ref = normalize::reference_id(&record, "client_id")
            .or(client_id.filter(|id| *id > 0));
        if let Some(client_id) = client_ref {
            match self.fetch(tenant_id, EntityKind::Client, client_id).await {
                Ok(client) => {
                    let client = normalize::normalize(EntityKind::Client, &client);
                    payload.insert(EMBEDDED_CLIENT_FIELD.to_string(), Value::Object(client));
                }
                Err(reason) => {
                    tracing::debug!(
                        tenant_id,
                        transaction_id,
                        client_id,
                        ?reason,
                        "Transaction client not resolvable, omitting client field"
                    );
                }
            }
        }

        Ok(payload)
    }

    async fn fetch(
        &self,
        tenant_id: TenantId,
        kind: EntityKind,
        id: DbId,
    ) -> Result<RawRecord, SkipReason> {
        if id <= 0 {
            return Err(SkipReason::NotFound {
                entity: kind.as_str(),
                id,
            });
        }
        match self.lookup.find(tenant_id, kind, id).await {
            Ok(Some(record)) => Ok(record),
            Ok(None) => Err(SkipReason::NotFound {
                entity: kind.as_str(),
                id,
            }),
            Err(e) => Err(SkipReason::LookupFailed {
                entity: kind.as_str(),
                id,
                error: e.to_string(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use async_trait::async_trait;
    use eventstream_core::lookup::{InMemoryEntityLookup, LookupError};
    use serde_json::json;

    fn record(value: Value) -> RawRecord {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    struct FailingLookup;

    #[async_trait]
    impl EntityLookup for FailingLookup {
        async fn find(
            &self,
            _tenant_id: TenantId,
            _kind: EntityKind,
            _id: DbId,
        ) -> Result<Option<RawRecord>, LookupError> {
            Err(LookupError::Backend("connection reset".into()))
        }
    }

    fn normalizer(lookup: InMemoryEntityLookup) -> PayloadNormalizer {
        PayloadNormalizer::new(Arc::new(lookup))
    }

    #[tokio::test]
    async fn client_created_with_empty_company() {
        let event = HostEvent::ClientCreated {
            client: Some(record(json!({
                "id": 1, "first_name": "Ada", "company": "", "email": "ada@example.test"
            }))),
        };
        let payload = normalizer(InMemoryEntityLookup::new())
            .normalize(1, &event)
            .await
            .unwrap();

        assert_eq!(payload["company"], json!(""));
        assert_eq!(payload["first_name"], json!("Ada"));
        assert_eq!(payload["address2"], json!(""));
        assert_eq!(payload.len(), normalize::CLIENT_FIELDS.len());
    }

    #[tokio::test]
    async fn client_created_without_record_is_skipped() {
        let n = normalizer(InMemoryEntityLookup::new());
        assert_matches!(
            n.normalize(1, &HostEvent::ClientCreated { client: None }).await,
            Err(SkipReason::MissingRecord { event: "Clients.create" })
        );
        assert_matches!(
            n.normalize(1, &HostEvent::ClientCreated { client: Some(RawRecord::new()) }).await,
            Err(SkipReason::MissingRecord { .. })
        );
    }

    #[tokio::test]
    async fn client_edited_prefers_record_then_falls_back_to_lookup() {
        let lookup = InMemoryEntityLookup::new().with_record(
            1,
            EntityKind::Client,
            3,
            record(json!({ "id": 3, "email": "stored@example.test" })),
        );
        let n = normalizer(lookup);

        let with_record = HostEvent::ClientEdited {
            client: Some(record(json!({ "id": 3, "email": "fresh@example.test" }))),
            client_id: Some(3),
        };
        let payload = n.normalize(1, &with_record).await.unwrap();
        assert_eq!(payload["email"], json!("fresh@example.test"));

        let id_only = HostEvent::ClientEdited {
            client: None,
            client_id: Some(3),
        };
        let payload = n.normalize(1, &id_only).await.unwrap();
        assert_eq!(payload["email"], json!("stored@example.test"));

        let nothing = HostEvent::ClientEdited {
            client: None,
            client_id: None,
        };
        assert_matches!(
            n.normalize(1, &nothing).await,
            Err(SkipReason::MissingRecord { event: "Clients.edit" })
        );
    }

    #[tokio::test]
    async fn invoice_lookup_miss_is_skipped() {
        let n = normalizer(InMemoryEntityLookup::new());
        assert_matches!(
            n.normalize(1, &HostEvent::InvoiceClosed { invoice_id: Some(99) }).await,
            Err(SkipReason::NotFound { entity: "invoice", id: 99 })
        );
    }

    #[tokio::test]
    async fn non_positive_ids_are_not_looked_up() {
        let n = PayloadNormalizer::new(Arc::new(FailingLookup));
        assert_matches!(
            n.normalize(1, &HostEvent::InvoiceClosed { invoice_id: Some(0) }).await,
            Err(SkipReason::NotFound { entity: "invoice", id: 0 })
        );
    }

    #[tokio::test]
    async fn missing_ids_skip_without_lookup() {
        let n = PayloadNormalizer::new(Arc::new(FailingLookup));
        assert_matches!(
            n.normalize(1, &HostEvent::InvoiceClosed { invoice_id: None }).await,
            Err(SkipReason::MissingRecord { event: "Invoices.setClosed" })
        );
        assert_matches!(
            n.normalize(
                1,
                &HostEvent::TransactionAdded {
                    transaction_id: None,
                    client_id: Some(7),
                },
            )
            .await,
            Err(SkipReason::MissingRecord { event: "Transactions.add" })
        );
    }

    #[tokio::test]
    async fn lookup_failure_is_skipped() {
        let n = PayloadNormalizer::new(Arc::new(FailingLookup));
        assert_matches!(
            n.normalize(1, &HostEvent::InvoiceClosed { invoice_id: Some(5) }).await,
            Err(SkipReason::LookupFailed { entity: "invoice", id: 5, .. })
        );
    }

    #[tokio::test]
    async fn transaction_embeds_resolved_client() {
        let lookup = InMemoryEntityLookup::new()
            .with_record(
                1,
                EntityKind::Transaction,
                42,
                record(json!({ "id": 42, "client_id": 7, "amount": "25.00", "currency": "USD" })),
            )
            .with_record(
                1,
                EntityKind::Client,
                7,
                record(json!({ "id": 7, "first_name": "Grace" })),
            );

        let payload = normalizer(lookup)
            .normalize(
                1,
                &HostEvent::TransactionAdded {
                    transaction_id: Some(42),
                    client_id: Some(7),
                },
            )
            .await
            .unwrap();

        assert_eq!(payload["amount"], json!("25.00"));
        assert_eq!(payload["gateway_id"], json!(""));
        let client = payload[EMBEDDED_CLIENT_FIELD].as_object().expect("client object");
        assert_eq!(client["first_name"], json!("Grace"));
        assert_eq!(client["company"], json!(""));
        assert_eq!(client.len(), normalize::CLIENT_FIELDS.len());
    }

    #[tokio::test]
    async fn transaction_omits_unresolvable_client() {
        let lookup = InMemoryEntityLookup::new().with_record(
            1,
            EntityKind::Transaction,
            42,
            record(json!({ "id": 42, "client_id": 7 })),
        );

        let payload = normalizer(lookup)
            .normalize(
                1,
                &HostEvent::TransactionAdded {
                    transaction_id: Some(42),
                    client_id: None,
                },
            )
            .await
            .unwrap();

        assert!(!payload.contains_key(EMBEDDED_CLIENT_FIELD));
        assert_eq!(payload["client_id"], json!(7));
    }

    #[tokio::test]
    async fn transaction_falls_back_to_client_param() {
        let lookup = InMemoryEntityLookup::new()
            .with_record(1, EntityKind::Transaction, 42, record(json!({ "id": 42 })))
            .with_record(1, EntityKind::Client, 7, record(json!({ "id": 7 })));

        let payload = normalizer(lookup)
            .normalize(
                1,
                &HostEvent::TransactionAdded {
                    transaction_id: Some(42),
                    client_id: Some(7),
                },
            )
            .await
            .unwrap();

        assert_eq!(payload[EMBEDDED_CLIENT_FIELD]["id"], json!(7));
    }

    #[tokio::test]
    async fn lookups_are_tenant_scoped() {
        let lookup = InMemoryEntityLookup::new().with_record(
            1,
            EntityKind::Invoice,
            99,
            record(json!({ "id": 99 })),
        );
        let n = normalizer(lookup);

        assert!(n.normalize(1, &HostEvent::InvoiceClosed { invoice_id: Some(99) }).await.is_ok());
        assert_matches!(
            n.normalize(2, &HostEvent::InvoiceClosed { invoice_id: Some(99) }).await,
            Err(SkipReason::NotFound { .. })
        );
    }
}
