//! Identity registry
//!
//! Maps external individual labels to the internal surrogate key in the
//! `users` table. Label matching is exact: no trimming, no case folding.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::{Row, SqliteConnection, SqlitePool};
use tracing::{debug, info, warn};

use crate::models::{Individual, IndividualId};
use crate::{Error, Result};

/// SQLite `CURRENT_TIMESTAMP` text format (UTC)
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// What `register` does with a label that is already registered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicateLabelPolicy {
    /// Insert another individual under the same label
    #[default]
    Allow,
    /// Refuse with [`Error::DuplicateIndividual`]
    Reject,
}

/// Registry of individuals backed by the `users` table
#[derive(Debug, Clone)]
pub struct IdentityRegistry {
    pool: SqlitePool,
    policy: DuplicateLabelPolicy,
}

impl IdentityRegistry {
    pub fn new(pool: SqlitePool, policy: DuplicateLabelPolicy) -> Self {
        Self { pool, policy }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Look up the identity for `label`
    ///
    /// When duplicates exist the oldest registration wins.
    pub async fn resolve(&self, label: &str) -> Result<Option<IndividualId>> {
        let mut conn = self.pool.acquire().await?;
        find_identity(&mut conn, label).await
    }

    /// Register a new individual and return its identity
    pub async fn register(&self, label: &str) -> Result<IndividualId> {
        let mut tx = self.pool.begin().await?;

        if self.policy == DuplicateLabelPolicy::Reject {
            if let Some(existing) = find_identity(&mut tx, label).await? {
                warn!("Refusing duplicate registration of '{}' (existing id {})", label, existing);
                return Err(Error::DuplicateIndividual(label.to_string()));
            }
        }

        let result = sqlx::query("INSERT INTO users (individual_id) VALUES (?)")
            .bind(label)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        let id = IndividualId(result.last_insert_rowid());
        info!("Registered individual '{}' as id {}", label, id);
        Ok(id)
    }

    /// All registered individuals in registration order, `None` when there are none
    pub async fn list(&self) -> Result<Option<Vec<Individual>>> {
        let mut conn = self.pool.acquire().await?;

        let rows = sqlx::query(
            r#"
            SELECT id, individual_id, created_at
            FROM users
            ORDER BY id
            "#,
        )
        .fetch_all(&mut *conn)
        .await?;

        let mut individuals = Vec::with_capacity(rows.len());
        for row in rows {
            let created_at: String = row.get("created_at");
            let created_at = NaiveDateTime::parse_from_str(&created_at, TIMESTAMP_FORMAT)
                .map_err(|e| Error::Internal(format!("Bad created_at {:?}: {}", created_at, e)))?
                .and_utc();

            individuals.push(Individual {
                id: IndividualId(row.get("id")),
                individual_id: row.get("individual_id"),
                created_at,
            });
        }

        debug!("Listed {} individuals", individuals.len());
        Ok(if individuals.is_empty() {
            None
        } else {
            Some(individuals)
        })
    }
}

/// Identity lookup on an already-acquired connection or transaction
pub(crate) async fn find_identity(
    conn: &mut SqliteConnection,
    label: &str,
) -> Result<Option<IndividualId>> {
    let id: Option<i64> = sqlx::query_scalar(
        "SELECT id FROM users WHERE individual_id = ? ORDER BY id LIMIT 1",
    )
    .bind(label)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(id.map(IndividualId))
}
