//! Repository for the `company_settings` table.

use sqlx::PgPool;
use eventstream_core::types::DbId;

use crate::models::company_setting::CompanySetting;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "company_id, key, value, updated_at";

/// Provides get/set/unset for per-company settings.
pub struct CompanySettingRepo;

impl CompanySettingRepo {
    /// Fetch a single setting for a company.
    pub async fn get(
        pool: &PgPool,
        company_id: DbId,
        key: &str,
    ) -> Result<Option<CompanySetting>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM company_settings
             WHERE company_id = $1 AND key = $2"
        );
        sqlx::query_as::<_, CompanySetting>(&query)
            .bind(company_id)
            .bind(key)
            .fetch_optional(pool)
            .await
    }

    /// Insert or overwrite a setting value.
    pub async fn upsert(
        pool: &PgPool,
        company_id: DbId,
        key: &str,
        value: &str,
    ) -> Result<CompanySetting, sqlx::Error> {
        let query = format!(
            "INSERT INTO company_settings (company_id, key, value)
             VALUES ($1, $2, $3)
             ON CONFLICT (company_id, key)
             DO UPDATE SET value = EXCLUDED.value, updated_at = NOW()
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CompanySetting>(&query)
            .bind(company_id)
            .bind(key)
            .bind(value)
            .fetch_one(pool)
            .await
    }

    /// Delete a setting. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, company_id: DbId, key: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM company_settings WHERE company_id = $1 AND key = $2")
            .bind(company_id)
            .bind(key)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
