//! End-to-end tests of the ingestion pipeline against sample batch files

use sano_common::db::connect_in_memory;
use sano_common::ingest::ingest_file;
use sano_common::parser::{parse_batch, records};
use sano_common::{
    Allele, Chromosome, DuplicateLabelPolicy, Error, IdentityRegistry, VariantRecord, VariantStore,
};

const INDIVIDUAL123: &str = include_str!("data/individual123.sano");
const WRONG_INDIVIDUAL123: &str = include_str!("data/wrong_individual123.sano");

async fn store() -> VariantStore {
    let pool = connect_in_memory().await.unwrap();
    VariantStore::new(IdentityRegistry::new(pool, DuplicateLabelPolicy::Allow))
}

#[test]
fn test_parse_file_to_genetic_data() {
    let expected_line_one = VariantRecord::new(
        "rs12345",
        Chromosome::Chr1,
        1234567,
        Allele::A,
        Allele::G,
        0.12,
    );

    let result = parse_batch(INDIVIDUAL123).unwrap();
    assert_eq!(result.len(), 4);
    assert_eq!(result[0], expected_line_one);
}

#[test]
fn test_invalid_file_yields_valid_records_until_the_bad_line() {
    let mut decoded = records(WRONG_INDIVIDUAL123.lines()).unwrap();

    assert!(decoded.next().unwrap().is_ok());
    assert!(matches!(decoded.next(), Some(Err(Error::Decode { line: 3, .. }))));
    assert!(decoded.next().is_none());
}

#[tokio::test]
async fn test_register_ingest_query() {
    let store = store().await;
    store.registry().register("individual123").await.unwrap();

    let stored = ingest_file(&store, INDIVIDUAL123.as_bytes(), "individual123")
        .await
        .unwrap();
    assert_eq!(stored, 4);

    let filter = vec!["rs34567".to_string(), "rs45678".to_string()];
    let mut records = store
        .query_records("individual123", Some(&filter))
        .await
        .unwrap();
    records.sort_by(|a, b| a.variant_id.cmp(&b.variant_id));

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].chromosome, Chromosome::ChrX);
    assert_eq!(records[1].chromosome, Chromosome::ChrY);
}

#[tokio::test]
async fn test_invalid_file_is_not_stored() {
    let store = store().await;
    store.registry().register("individual123").await.unwrap();

    let result = ingest_file(&store, WRONG_INDIVIDUAL123.as_bytes(), "individual123").await;
    assert!(matches!(result, Err(Error::Decode { .. })));
    assert!(store
        .query_records("individual123", None)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_register_twice_creates_two_identities() {
    let store = store().await;

    let first = store.registry().register("individual123").await.unwrap();
    let second = store.registry().register("individual123").await.unwrap();
    assert_ne!(first, second);

    let individuals = store.list_individuals().await.unwrap().unwrap();
    assert_eq!(individuals.len(), 2);
    assert!(individuals.iter().all(|i| i.individual_id == "individual123"));
}
