//! Relationship Ledger
//!
//! Uniqueness-enforcing store for favorites, shopping cart entries and
//! follows. The table's unique constraint decides insert races: exactly one
//! concurrent `add` of a pair survives, the others get `AlreadyExists`.

use std::collections::HashSet;

use sqlx::PgPool;

use super::{LedgerError, RelationKind, RelationRecord};

/// Repository for per-user relations
#[derive(Debug, Clone)]
pub struct RelationshipLedger {
    pool: PgPool,
}

impl RelationshipLedger {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a relation. Fails if the pair exists, or for a self-follow.
    pub async fn add(
        &self,
        kind: RelationKind,
        left: i64,
        right: i64,
    ) -> Result<RelationRecord, LedgerError> {
        if kind.is_user_to_user() && left == right {
            return Err(LedgerError::SelfRelation(left));
        }

        let sql = format!(
            r#"
            INSERT INTO {table} (user_id, {right_col})
            VALUES ($1, $2)
            RETURNING id, user_id AS left_id, {right_col} AS right_id, created_at
            "#,
            table = kind.table(),
            right_col = kind.right_column(),
        );

        let record = sqlx::query_as::<_, RelationRecord>(&sql)
            .bind(left)
            .bind(right)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| classify_insert_error(e, kind, left, right))?;

        tracing::info!(kind = %kind, left, right, "Relation added");
        Ok(record)
    }

    /// Delete a relation. Removing a pair that does not exist is an error.
    pub async fn remove(&self, kind: RelationKind, left: i64, right: i64) -> Result<(), LedgerError> {
        let sql = format!(
            "DELETE FROM {table} WHERE user_id = $1 AND {right_col} = $2",
            table = kind.table(),
            right_col = kind.right_column(),
        );

        let rows = sqlx::query(&sql)
            .bind(left)
            .bind(right)
            .execute(&self.pool)
            .await?
            .rows_affected();

        if rows == 0 {
            return Err(LedgerError::Missing { kind, left, right });
        }

        tracing::info!(kind = %kind, left, right, "Relation removed");
        Ok(())
    }

    /// Check a pair. An anonymous left side is never related to anything;
    /// store failures still propagate.
    pub async fn exists(
        &self,
        kind: RelationKind,
        left: Option<i64>,
        right: i64,
    ) -> Result<bool, LedgerError> {
        let Some(left) = left else {
            return Ok(false);
        };

        let sql = format!(
            "SELECT EXISTS (SELECT 1 FROM {table} WHERE user_id = $1 AND {right_col} = $2)",
            table = kind.table(),
            right_col = kind.right_column(),
        );

        let exists: bool = sqlx::query_scalar(&sql)
            .bind(left)
            .bind(right)
            .fetch_one(&self.pool)
            .await?;

        Ok(exists)
    }

    /// Right-hand ids related to `left`, in insertion order
    pub async fn list_for(&self, kind: RelationKind, left: i64) -> Result<Vec<i64>, LedgerError> {
        let sql = format!(
            "SELECT {right_col} FROM {table} WHERE user_id = $1 ORDER BY id",
            table = kind.table(),
            right_col = kind.right_column(),
        );

        let ids: Vec<i64> = sqlx::query_scalar(&sql)
            .bind(left)
            .fetch_all(&self.pool)
            .await?;

        Ok(ids)
    }

    /// The subset of `rights` related to `left`. Batch form of `exists`
    /// for list views.
    pub async fn related_among(
        &self,
        kind: RelationKind,
        left: Option<i64>,
        rights: &[i64],
    ) -> Result<HashSet<i64>, LedgerError> {
        let Some(left) = left else {
            return Ok(HashSet::new());
        };
        if rights.is_empty() {
            return Ok(HashSet::new());
        }

        let sql = format!(
            "SELECT {right_col} FROM {table} WHERE user_id = $1 AND {right_col} = ANY($2)",
            table = kind.table(),
            right_col = kind.right_column(),
        );

        let ids: Vec<i64> = sqlx::query_scalar(&sql)
            .bind(left)
            .bind(rights)
            .fetch_all(&self.pool)
            .await?;

        Ok(ids.into_iter().collect())
    }
}

/// Turn constraint violations into ledger outcomes
fn classify_insert_error(err: sqlx::Error, kind: RelationKind, left: i64, right: i64) -> LedgerError {
    if let Some(db_err) = err.as_database_error() {
        if db_err.is_unique_violation() {
            return LedgerError::AlreadyExists { kind, left, right };
        }
        if db_err.is_foreign_key_violation() {
            return LedgerError::foreign_key(kind, db_err.constraint(), left, right);
        }
        if db_err.is_check_violation() && kind.is_user_to_user() {
            return LedgerError::SelfRelation(left);
        }
    }
    LedgerError::Database(err)
}
