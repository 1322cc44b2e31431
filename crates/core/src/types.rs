/// Host primary keys (clients, invoices, transactions, companies).
pub type DbId = i64;

/// Tenant scope under which event stream settings are stored.
pub type TenantId = DbId;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// A raw host entity record as handed over by the host or fetched by id.
///
/// Host objects vary in which fields are populated depending on the calling
/// context, so records are kept as loose JSON objects until normalized.
pub type RawRecord = serde_json::Map<String, serde_json::Value>;
