//! Ingestion pipeline: raw batch file bytes to persisted records

use tracing::{info, warn};

use crate::db::VariantStore;
use crate::models::VariantRecord;
use crate::parser;
use crate::{Error, Result};

/// Decode a raw batch file into records
///
/// The payload must be UTF-8 and start with a header line. Decoding stops at
/// the first bad record.
pub fn decode_file(bytes: &[u8]) -> Result<Vec<VariantRecord>> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| Error::Format(format!("Batch file is not valid UTF-8: {}", e)))?;

    if text.trim().is_empty() {
        return Err(Error::Format("Batch file is empty".to_string()));
    }

    parser::parse_batch(text)
}

/// Decode `bytes` and store every record for `label`, all or nothing
///
/// Returns the number of records stored.
pub async fn ingest_file(store: &VariantStore, bytes: &[u8], label: &str) -> Result<usize> {
    let records = match decode_file(bytes) {
        Ok(records) => records,
        Err(e) => {
            warn!("Rejected batch file for '{}': {}", label, e);
            return Err(e);
        }
    };

    info!("Decoded {} records for '{}'", records.len(), label);
    store.ingest_batch(&records, label).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{connect_in_memory, DuplicateLabelPolicy, IdentityRegistry};

    const BATCH: &str = "#Variant ID,Chromosome,Position on chromosome,Reference allele,Alternate allele,Alternate allele frequency\r\n\
rs12345,1,1234567,A,G,0.12\r\n\
rs23456,X,2345678,C,T,0.5\r\n";

    async fn store() -> VariantStore {
        let pool = connect_in_memory().await.unwrap();
        VariantStore::new(IdentityRegistry::new(pool, DuplicateLabelPolicy::Allow))
    }

    #[test]
    fn test_decode_file_handles_crlf_and_trailing_newline() {
        let records = decode_file(BATCH.as_bytes()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].variant_id, "rs23456");
    }

    #[test]
    fn test_decode_file_rejects_empty_and_binary_payloads() {
        assert!(matches!(decode_file(b""), Err(Error::Format(_))));
        assert!(matches!(decode_file(b"\n\n"), Err(Error::Format(_))));
        assert!(matches!(decode_file(&[0xff, 0xfe, 0x00]), Err(Error::Format(_))));
    }

    #[tokio::test]
    async fn test_ingest_file_stores_records() {
        let store = store().await;
        store.registry().register("individual123").await.unwrap();

        let stored = ingest_file(&store, BATCH.as_bytes(), "individual123").await.unwrap();
        assert_eq!(stored, 2);
        assert_eq!(store.query_records("individual123", None).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_bad_record_aborts_whole_file() {
        let store = store().await;
        store.registry().register("individual123").await.unwrap();

        let text = format!("{}rs34567,3,1,A,G,0.1\n", BATCH);
        let result = ingest_file(&store, text.as_bytes(), "individual123").await;

        assert!(matches!(result, Err(Error::Decode { line: 4, .. })));
        assert!(store.query_records("individual123", None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_non_finite_frequency_is_a_decode_error() {
        let store = store().await;
        store.registry().register("individual123").await.unwrap();

        for value in ["NaN", "inf"] {
            let text = format!("{}rs34567,1,10,A,G,{}\n", BATCH, value);
            let result = ingest_file(&store, text.as_bytes(), "individual123").await;
            assert!(matches!(result, Err(Error::Decode { line: 4, .. })));
        }
        assert!(store.query_records("individual123", None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_ingest_file_unknown_individual() {
        let store = store().await;
        let result = ingest_file(&store, BATCH.as_bytes(), "ghost").await;
        assert!(matches!(result, Err(Error::IndividualNotFound(_))));
    }
}
