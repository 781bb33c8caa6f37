//! Domain models: chromosomes, alleles, variant records and individuals

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Supported chromosomes
///
/// Serialized and stored as their short code (`X`, `Y`, `1`, `2`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Chromosome {
    #[serde(rename = "X")]
    ChrX,
    #[serde(rename = "Y")]
    ChrY,
    #[serde(rename = "1")]
    Chr1,
    #[serde(rename = "2")]
    Chr2,
}

impl Chromosome {
    pub const ALL: [Chromosome; 4] = [
        Chromosome::ChrX,
        Chromosome::ChrY,
        Chromosome::Chr1,
        Chromosome::Chr2,
    ];

    /// Database and file representation
    pub fn as_code(&self) -> &'static str {
        match self {
            Chromosome::ChrX => "X",
            Chromosome::ChrY => "Y",
            Chromosome::Chr1 => "1",
            Chromosome::Chr2 => "2",
        }
    }
}

impl FromStr for Chromosome {
    type Err = DomainError;

    /// Exact, case-sensitive match on the code
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Chromosome::ALL
            .into_iter()
            .find(|c| c.as_code() == s)
            .ok_or_else(|| DomainError::Chromosome(s.to_string()))
    }
}

impl fmt::Display for Chromosome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_code())
    }
}

/// Nucleotide alleles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Allele {
    A,
    C,
    G,
    T,
}

impl Allele {
    pub const ALL: [Allele; 4] = [Allele::A, Allele::C, Allele::G, Allele::T];

    pub fn as_code(&self) -> &'static str {
        match self {
            Allele::A => "A",
            Allele::C => "C",
            Allele::G => "G",
            Allele::T => "T",
        }
    }
}

impl FromStr for Allele {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Allele::ALL
            .into_iter()
            .find(|a| a.as_code() == s)
            .ok_or_else(|| DomainError::Allele(s.to_string()))
    }
}

impl fmt::Display for Allele {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_code())
    }
}

/// Largest position the store can hold (SQLite `INTEGER` is a signed 64-bit value)
pub const MAX_POSITION: u64 = i64::MAX as u64;

/// One observed variant for one individual
///
/// Chromosome and alleles are typed, so a record can never carry a value
/// outside their vocabularies. [`VariantRecord::from_codes`] is the single
/// entry point for raw text, used by both the file decoder and the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantRecord {
    /// Free-form identifier, usually an `rs` accession
    pub variant_id: String,
    pub chromosome: Chromosome,
    /// Offset on the chromosome, at most [`MAX_POSITION`]
    pub position: u64,
    pub reference_allele: Allele,
    pub alternate_allele: Allele,
    /// Expected in `[0, 1]`, not enforced
    pub alternate_allele_frequency: f64,
}

impl VariantRecord {
    pub fn new(
        variant_id: impl Into<String>,
        chromosome: Chromosome,
        position: u64,
        reference_allele: Allele,
        alternate_allele: Allele,
        alternate_allele_frequency: f64,
    ) -> Self {
        Self {
            variant_id: variant_id.into(),
            chromosome,
            position,
            reference_allele,
            alternate_allele,
            alternate_allele_frequency,
        }
    }

    /// Build a record from raw chromosome and allele codes
    ///
    /// Fails if any code is outside its vocabulary or the position does not
    /// fit the store's integer column.
    pub fn from_codes(
        variant_id: impl Into<String>,
        chromosome: &str,
        position: u64,
        reference_allele: &str,
        alternate_allele: &str,
        alternate_allele_frequency: f64,
    ) -> Result<Self, DomainError> {
        if position > MAX_POSITION {
            return Err(DomainError::Position(position));
        }
        Ok(Self::new(
            variant_id,
            chromosome.parse()?,
            position,
            reference_allele.parse()?,
            alternate_allele.parse()?,
            alternate_allele_frequency,
        ))
    }
}

/// Internal surrogate key of an individual, assigned by the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IndividualId(pub i64);

impl fmt::Display for IndividualId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A registered subject
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Individual {
    pub id: IndividualId,
    /// Caller-supplied external label
    pub individual_id: String,
    pub created_at: DateTime<Utc>,
}
