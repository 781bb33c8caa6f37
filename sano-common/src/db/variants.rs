//! Variant store
//!
//! Persists decoded variant records against an individual and answers
//! retrieval queries. A batch is written in one transaction: either every
//! row commits or none do.

use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite, SqliteConnection, Transaction};
use tracing::{debug, error, info, warn};

use super::individuals::{find_identity, IdentityRegistry};
use crate::models::{Individual, IndividualId, VariantRecord};
use crate::{Error, Result};

/// Persistence for variant records, keyed by the identity registry
#[derive(Debug, Clone)]
pub struct VariantStore {
    registry: IdentityRegistry,
}

impl VariantStore {
    pub fn new(registry: IdentityRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &IdentityRegistry {
        &self.registry
    }

    /// Persist `records` for the individual labelled `label`
    ///
    /// Fails with [`Error::IndividualNotFound`] without writing anything if
    /// the label is unknown. Returns the number of rows written.
    pub async fn ingest_batch(&self, records: &[VariantRecord], label: &str) -> Result<usize> {
        let mut tx = self.registry.pool().begin().await?;

        let Some(user_id) = find_identity(&mut tx, label).await? else {
            warn!("Ingest refused: individual '{}' not found", label);
            return Err(Error::IndividualNotFound(label.to_string()));
        };

        let written = write_batch(tx, user_id, records).await?;
        info!(
            "Stored {} variant records for '{}' (id {})",
            written, label, user_id
        );
        Ok(written)
    }

    /// Records stored for the individual labelled `label`
    ///
    /// With a non-empty `variants` filter only records whose variant id is in
    /// the filter are returned. An empty filter is the same as no filter.
    /// Row order is unspecified.
    pub async fn query_records(
        &self,
        label: &str,
        variants: Option<&[String]>,
    ) -> Result<Vec<VariantRecord>> {
        let mut conn = self.registry.pool().acquire().await?;

        let Some(user_id) = find_identity(&mut conn, label).await? else {
            warn!("Query refused: individual '{}' not found", label);
            return Err(Error::IndividualNotFound(label.to_string()));
        };

        select_records(&mut conn, user_id, variants).await
    }

    /// All registered individuals, `None` when there are none
    pub async fn list_individuals(&self) -> Result<Option<Vec<Individual>>> {
        self.registry.list().await
    }
}

/// Insert `records` inside `tx` and commit; dropping `tx` on failure rolls
/// the whole batch back
async fn write_batch(
    mut tx: Transaction<'_, Sqlite>,
    user_id: IndividualId,
    records: &[VariantRecord],
) -> Result<usize> {
    if let Err(e) = insert_records(&mut tx, user_id, records).await {
        error!(
            "Rolling back batch of {} records for id {}: {}",
            records.len(),
            user_id,
            e
        );
        return Err(e);
    }

    tx.commit().await?;
    Ok(records.len())
}

async fn insert_records(
    conn: &mut SqliteConnection,
    user_id: IndividualId,
    records: &[VariantRecord],
) -> Result<()> {
    for record in records {
        let position = i64::try_from(record.position).map_err(|_| {
            Error::Internal(format!("Position {} exceeds the storable range", record.position))
        })?;

        sqlx::query(
            r#"
            INSERT INTO genetic_data_table (
                variant_id,
                user_id,
                chromosome,
                position,
                reference_allele,
                alternate_allele,
                alternate_allele_frequency
            ) VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.variant_id)
        .bind(user_id.0)
        .bind(record.chromosome.as_code())
        .bind(position)
        .bind(record.reference_allele.as_code())
        .bind(record.alternate_allele.as_code())
        .bind(record.alternate_allele_frequency)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

async fn select_records(
    conn: &mut SqliteConnection,
    user_id: IndividualId,
    variants: Option<&[String]>,
) -> Result<Vec<VariantRecord>> {
    let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(
        r#"
        SELECT
            variant_id,
            chromosome,
            position,
            reference_allele,
            alternate_allele,
            alternate_allele_frequency
        FROM genetic_data_table
        WHERE user_id = "#,
    );
    query.push_bind(user_id.0);

    if let Some(variants) = variants.filter(|v| !v.is_empty()) {
        query.push(" AND variant_id IN (");
        let mut separated = query.separated(", ");
        for variant in variants {
            separated.push_bind(variant.as_str());
        }
        separated.push_unseparated(")");
        debug!("Filtering id {} to {} variant ids", user_id, variants.len());
    }

    let rows = query.build().fetch_all(&mut *conn).await?;
    rows.iter().map(record_from_row).collect()
}

fn record_from_row(row: &SqliteRow) -> Result<VariantRecord> {
    let position: i64 = row.get("position");
    let position = u64::try_from(position)
        .map_err(|_| Error::Internal(format!("Stored position out of range: {}", position)))?;

    let chromosome: String = row.get("chromosome");
    let reference_allele: String = row.get("reference_allele");
    let alternate_allele: String = row.get("alternate_allele");

    VariantRecord::from_codes(
        row.get::<String, _>("variant_id"),
        &chromosome,
        position,
        &reference_allele,
        &alternate_allele,
        row.get("alternate_allele_frequency"),
    )
    .map_err(|e| Error::Internal(format!("Stored record violates domain: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{connect_in_memory, DuplicateLabelPolicy};
    use crate::models::{Allele, Chromosome};

    async fn store() -> VariantStore {
        let pool = connect_in_memory().await.unwrap();
        VariantStore::new(IdentityRegistry::new(pool, DuplicateLabelPolicy::Allow))
    }

    fn sample_records() -> Vec<VariantRecord> {
        vec![
            VariantRecord::new("rs12345", Chromosome::Chr1, 1234567, Allele::A, Allele::G, 0.12),
            VariantRecord::new("rs23456", Chromosome::ChrX, 2345678, Allele::C, Allele::T, 0.5),
            VariantRecord::new("rs34567", Chromosome::Chr2, 3456789, Allele::G, Allele::A, 0.99),
        ]
    }

    fn sorted(mut records: Vec<VariantRecord>) -> Vec<VariantRecord> {
        records.sort_by(|a, b| a.variant_id.cmp(&b.variant_id));
        records
    }

    async fn row_count(store: &VariantStore) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM genetic_data_table")
            .fetch_one(store.registry().pool())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_ingest_unknown_individual_writes_nothing() {
        let store = store().await;

        let result = store.ingest_batch(&sample_records(), "ghost").await;
        assert!(matches!(result, Err(Error::IndividualNotFound(label)) if label == "ghost"));
        assert_eq!(row_count(&store).await, 0);
    }

    #[tokio::test]
    async fn test_ingest_then_query_returns_batch() {
        let store = store().await;
        store.registry().register("individual123").await.unwrap();
        store.registry().register("someone_else").await.unwrap();

        let written = store.ingest_batch(&sample_records(), "individual123").await.unwrap();
        assert_eq!(written, 3);

        let stored = store.query_records("individual123", None).await.unwrap();
        assert_eq!(sorted(stored), sorted(sample_records()));

        let other = store.query_records("someone_else", None).await.unwrap();
        assert!(other.is_empty());
    }

    #[tokio::test]
    async fn test_query_unknown_individual_is_not_found() {
        let store = store().await;
        let result = store.query_records("ghost", None).await;
        assert!(matches!(result, Err(Error::IndividualNotFound(_))));
    }

    #[tokio::test]
    async fn test_query_filter_returns_intersection() {
        let store = store().await;
        store.registry().register("ind").await.unwrap();
        store.ingest_batch(&sample_records(), "ind").await.unwrap();

        let filter = vec!["rs12345".to_string(), "rs34567".to_string(), "rs00000".to_string()];
        let stored = store.query_records("ind", Some(&filter)).await.unwrap();

        let mut ids: Vec<String> = stored.into_iter().map(|r| r.variant_id).collect();
        ids.sort();
        assert_eq!(ids, vec!["rs12345", "rs34567"]);
    }

    #[tokio::test]
    async fn test_empty_filter_returns_everything() {
        let store = store().await;
        store.registry().register("ind").await.unwrap();
        store.ingest_batch(&sample_records(), "ind").await.unwrap();

        let stored = store.query_records("ind", Some(&[][..])).await.unwrap();
        assert_eq!(stored.len(), 3);
    }

    #[tokio::test]
    async fn test_ingest_empty_batch() {
        let store = store().await;
        store.registry().register("ind").await.unwrap();

        assert_eq!(store.ingest_batch(&[], "ind").await.unwrap(), 0);
        assert!(store.query_records("ind", None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_orphan_batch_is_rolled_back() {
        let store = store().await;
        let id = store.registry().register("ind").await.unwrap();

        let tx = store.registry().pool().begin().await.unwrap();
        let result = write_batch(tx, IndividualId(id.0 + 100), &sample_records()).await;
        assert!(matches!(result, Err(Error::Persistence(_))));
        assert_eq!(row_count(&store).await, 0);
    }

    #[tokio::test]
    async fn test_failed_row_rolls_back_whole_batch() {
        let store = store().await;
        let id = store.registry().register("ind").await.unwrap();

        // Second insert of the batch fails inside the transaction
        sqlx::query(
            "CREATE TRIGGER reject_rs23456 BEFORE INSERT ON genetic_data_table
             WHEN NEW.variant_id = 'rs23456'
             BEGIN SELECT RAISE(ABORT, 'rejected'); END",
        )
        .execute(store.registry().pool())
        .await
        .unwrap();

        let tx = store.registry().pool().begin().await.unwrap();
        let result = write_batch(tx, id, &sample_records()).await;
        assert!(matches!(result, Err(Error::Persistence(_))));
        assert_eq!(row_count(&store).await, 0);
    }

    #[tokio::test]
    async fn test_duplicate_records_are_kept() {
        let store = store().await;
        store.registry().register("ind").await.unwrap();

        let records = sample_records();
        store.ingest_batch(&records, "ind").await.unwrap();
        store.ingest_batch(&records, "ind").await.unwrap();

        assert_eq!(store.query_records("ind", None).await.unwrap().len(), 6);
    }

    #[tokio::test]
    async fn test_large_position_round_trips() {
        let store = store().await;
        store.registry().register("ind").await.unwrap();

        let record =
            VariantRecord::new("rs_far", Chromosome::Chr1, 5_000_000_000, Allele::A, Allele::T, 0.3);
        store.ingest_batch(&[record.clone()], "ind").await.unwrap();

        assert_eq!(store.query_records("ind", None).await.unwrap(), vec![record]);
    }

    #[tokio::test]
    async fn test_unstorable_position_writes_nothing() {
        let store = store().await;
        store.registry().register("ind").await.unwrap();

        let mut records = sample_records();
        records[2].position = u64::MAX;
        let result = store.ingest_batch(&records, "ind").await;

        assert!(matches!(result, Err(Error::Internal(_))));
        assert_eq!(row_count(&store).await, 0);
    }
}
