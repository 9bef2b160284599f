use tracing::debug;
use uuid::Uuid;

use super::models::{LedgerEntry, LedgerEntryRow, ListingFilter, ListingQuery, NewEntry};
use crate::errors::AppError;
use crate::query::compiler::compile_listing;
use crate::store::Store;

/// Service layer for ledger entry persistence and listing.
pub struct EntryService;

/// Reject malformed identifiers before any store round trip.
pub fn parse_entry_id(id: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(id).map_err(|_| AppError::InvalidIdentifier)
}

impl EntryService {
    /// Insert a validated entry; id and timestamps are assigned by the store.
    pub async fn create_entry(store: &Store, entry: NewEntry) -> Result<LedgerEntry, AppError> {
        let pool = store.pool();
        let created = store
            .retry()
            .run("create_entry", || {
                sqlx::query_as::<_, LedgerEntry>(
                    r#"
                    INSERT INTO ledger_entries (kind, amount, category, description, entry_date)
                    VALUES ($1, $2, $3, $4, $5)
                    RETURNING id, kind, amount, category, description, entry_date,
                              created_at, updated_at
                    "#,
                )
                .bind(entry.kind.as_str())
                .bind(entry.amount)
                .bind(&entry.category)
                .bind(&entry.description)
                .bind(entry.entry_date)
                .fetch_one(pool)
            })
            .await?;

        Ok(created)
    }

    /// Get a single entry by ID
    pub async fn get_entry(store: &Store, id: &str) -> Result<LedgerEntry, AppError> {
        let id = parse_entry_id(id)?;
        let pool = store.pool();

        store
            .retry()
            .run("get_entry", || {
                sqlx::query_as::<_, LedgerEntry>(
                    r#"
                    SELECT id, kind, amount, category, description, entry_date,
                           created_at, updated_at
                    FROM ledger_entries
                    WHERE id = $1
                    "#,
                )
                .bind(id)
                .fetch_optional(pool)
            })
            .await?
            .ok_or(AppError::EntryNotFound)
    }

    /// Replace every mutable field of an entry; `created_at` is kept.
    pub async fn replace_entry(
        store: &Store,
        id: &str,
        entry: NewEntry,
    ) -> Result<LedgerEntry, AppError> {
        let id = parse_entry_id(id)?;
        let pool = store.pool();

        store
            .retry()
            .run("replace_entry", || {
                sqlx::query_as::<_, LedgerEntry>(
                    r#"
                    UPDATE ledger_entries SET
                        kind = $2,
                        amount = $3,
                        category = $4,
                        description = $5,
                        entry_date = $6,
                        updated_at = NOW()
                    WHERE id = $1
                    RETURNING id, kind, amount, category, description, entry_date,
                              created_at, updated_at
                    "#,
                )
                .bind(id)
                .bind(entry.kind.as_str())
                .bind(entry.amount)
                .bind(&entry.category)
                .bind(&entry.description)
                .bind(entry.entry_date)
                .fetch_optional(pool)
            })
            .await?
            .ok_or(AppError::EntryNotFound)
    }

    /// Permanently remove an entry
    pub async fn delete_entry(store: &Store, id: &str) -> Result<(), AppError> {
        let id = parse_entry_id(id)?;
        let pool = store.pool();

        let result = store
            .retry()
            .run("delete_entry", || {
                sqlx::query("DELETE FROM ledger_entries WHERE id = $1")
                    .bind(id)
                    .execute(pool)
            })
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::EntryNotFound);
        }
        Ok(())
    }

    /// Validate raw listing parameters, then fetch one page.
    pub async fn list_entries(
        store: &Store,
        query: ListingQuery,
    ) -> Result<(Vec<LedgerEntry>, i64), AppError> {
        let filter = ListingFilter::try_from(query)?;
        Self::list_filtered(store, &filter).await
    }

    /// Fetch entries matching an already validated filter, with the total match count.
    pub async fn list_filtered(
        store: &Store,
        filter: &ListingFilter,
    ) -> Result<(Vec<LedgerEntry>, i64), AppError> {
        let compiled = compile_listing(filter);
        debug!(sql = %compiled.sql, params = compiled.params.len(), "Compiled listing query");

        let pool = store.pool();
        let rows = store
            .retry()
            .run("list_entries", || {
                compiled.query_as::<LedgerEntryRow>().fetch_all(pool)
            })
            .await?;

        let total = rows.first().map(|row| row.total_count).unwrap_or(0);
        let entries = rows.into_iter().map(|row| row.entry).collect();

        Ok((entries, total))
    }
}
