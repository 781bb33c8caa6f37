//! # Sano Common Library
//!
//! Core of the variant ingestion service:
//! - Canonical field registry and header resolution
//! - Record decoding with chromosome/allele domain validation
//! - Identity registry (external label to internal id)
//! - Variant store with atomic batch persistence
//! - Configuration loading

pub mod config;
pub mod db;
pub mod error;
pub mod fields;
pub mod ingest;
pub mod models;
pub mod parser;

pub use db::{DuplicateLabelPolicy, IdentityRegistry, VariantStore};
pub use error::{DomainError, Error, Result};
pub use fields::{CanonicalField, HeaderOrder};
pub use models::{Allele, Chromosome, Individual, IndividualId, VariantRecord, MAX_POSITION};
