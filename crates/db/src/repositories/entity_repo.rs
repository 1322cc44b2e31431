//! Read-only access to host client, invoice, and transaction records.
//!
//! Records are fetched as JSON objects (`to_jsonb`) so the normalizer sees
//! exactly the columns the host populates. Every query is scoped to the
//! owning company through `client_groups.company_id`.

use sqlx::PgPool;
use eventstream_core::normalize::EntityKind;
use eventstream_core::types::DbId;

/// Client row merged with its primary contact and login name.
const CLIENT_QUERY: &str = "\
    SELECT to_jsonb(c) || jsonb_build_object(
        'contact_id', ct.id,
        'first_name', ct.first_name,
        'last_name', ct.last_name,
        'company', ct.company,
        'title', ct.title,
        'email', ct.email,
        'address1', ct.address1,
        'address2', ct.address2,
        'city', ct.city,
        'state', ct.state,
        'zip', ct.zip,
        'country', ct.country,
        'username', u.username)
    FROM clients c
    JOIN client_groups g ON g.id = c.client_group_id
    LEFT JOIN contacts ct ON ct.client_id = c.id AND ct.contact_type = 'primary'
    LEFT JOIN users u ON u.id = c.user_id
    WHERE c.id = $1 AND g.company_id = $2";

const INVOICE_QUERY: &str = "\
    SELECT to_jsonb(i)
    FROM invoices i
    JOIN clients c ON c.id = i.client_id
    JOIN client_groups g ON g.id = c.client_group_id
    WHERE i.id = $1 AND g.company_id = $2";

const TRANSACTION_QUERY: &str = "\
    SELECT to_jsonb(t)
    FROM transactions t
    JOIN clients c ON c.id = t.client_id
    JOIN client_groups g ON g.id = c.client_group_id
    WHERE t.id = $1 AND g.company_id = $2";

/// Fetches host entity records as JSON.
pub struct EntityRepo;

impl EntityRepo {
    /// Fetch one record of `kind` owned by `company_id`.
    pub async fn find_json(
        pool: &PgPool,
        company_id: DbId,
        kind: EntityKind,
        id: DbId,
    ) -> Result<Option<serde_json::Value>, sqlx::Error> {
        sqlx::query_scalar::<_, serde_json::Value>(query_for(kind))
            .bind(id)
            .bind(company_id)
            .fetch_optional(pool)
            .await
    }
}

fn query_for(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Client => CLIENT_QUERY,
        EntityKind::Invoice => INVOICE_QUERY,
        EntityKind::Transaction => TRANSACTION_QUERY,
    }
}
