//! Canonical field registry and header column order
//!
//! Every variant batch file declares, in its header line, which column holds
//! each of the six canonical fields. [`HeaderOrder`] is the resolved mapping.

use std::fmt;

/// The six fields every variant record provides, in canonical order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CanonicalField {
    VariantId,
    Chromosome,
    Position,
    ReferenceAllele,
    AlternateAllele,
    AlternateAlleleFrequency,
}

impl CanonicalField {
    pub const COUNT: usize = 6;

    pub const ALL: [CanonicalField; Self::COUNT] = [
        CanonicalField::VariantId,
        CanonicalField::Chromosome,
        CanonicalField::Position,
        CanonicalField::ReferenceAllele,
        CanonicalField::AlternateAllele,
        CanonicalField::AlternateAlleleFrequency,
    ];

    /// Field name as used in records and the database
    pub fn name(&self) -> &'static str {
        match self {
            CanonicalField::VariantId => "variant_id",
            CanonicalField::Chromosome => "chromosome",
            CanonicalField::Position => "position",
            CanonicalField::ReferenceAllele => "reference_allele",
            CanonicalField::AlternateAllele => "alternate_allele",
            CanonicalField::AlternateAlleleFrequency => "alternate_allele_frequency",
        }
    }

    /// Human-readable label as it appears in a header line
    pub fn label(&self) -> &'static str {
        match self {
            CanonicalField::VariantId => "Variant ID",
            CanonicalField::Chromosome => "Chromosome",
            CanonicalField::Position => "Position on chromosome",
            CanonicalField::ReferenceAllele => "Reference allele",
            CanonicalField::AlternateAllele => "Alternate allele",
            CanonicalField::AlternateAlleleFrequency => "Alternate allele frequency",
        }
    }

    /// Exact label lookup
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.label() == label)
    }

    fn ordinal(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Column position of each canonical field within a batch file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderOrder {
    columns: [usize; CanonicalField::COUNT],
}

impl HeaderOrder {
    /// Columns in canonical order (`variant_id` first)
    pub fn canonical() -> Self {
        Self {
            columns: [0, 1, 2, 3, 4, 5],
        }
    }

    /// Build from fields listed in column order
    ///
    /// Returns `None` unless `fields` is a permutation of [`CanonicalField::ALL`].
    pub fn from_fields(fields: &[CanonicalField]) -> Option<Self> {
        if fields.len() != CanonicalField::COUNT {
            return None;
        }

        let mut columns = [usize::MAX; CanonicalField::COUNT];
        for (index, field) in fields.iter().enumerate() {
            let slot = &mut columns[field.ordinal()];
            if *slot != usize::MAX {
                return None;
            }
            *slot = index;
        }

        Some(Self { columns })
    }

    /// Column index holding `field`
    pub fn column(&self, field: CanonicalField) -> usize {
        self.columns[field.ordinal()]
    }

    /// Fields listed in column order
    pub fn fields_in_column_order(&self) -> [CanonicalField; CanonicalField::COUNT] {
        let mut fields = CanonicalField::ALL;
        for field in CanonicalField::ALL {
            fields[self.column(field)] = field;
        }
        fields
    }

    /// Number of columns a data line must have
    pub fn width(&self) -> usize {
        CanonicalField::COUNT
    }

    /// Render the marked header line for this order
    pub fn to_header_line(&self) -> String {
        let labels: Vec<&str> = self
            .fields_in_column_order()
            .iter()
            .map(|f| f.label())
            .collect();
        format!("#{}", labels.join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_round_trip() {
        for field in CanonicalField::ALL {
            assert_eq!(CanonicalField::from_label(field.label()), Some(field));
        }
        assert_eq!(CanonicalField::from_label("variant id"), None);
        assert_eq!(CanonicalField::from_label("Variant ID "), None);
    }

    #[test]
    fn test_from_fields_rejects_duplicates_and_wrong_length() {
        use CanonicalField::*;

        assert!(HeaderOrder::from_fields(&[VariantId, Chromosome]).is_none());
        assert!(HeaderOrder::from_fields(&[
            VariantId,
            VariantId,
            Position,
            ReferenceAllele,
            AlternateAllele,
            AlternateAlleleFrequency,
        ])
        .is_none());
    }

    #[test]
    fn test_fields_in_column_order_inverts_mapping() {
        use CanonicalField::*;

        let listed = [
            AlternateAlleleFrequency,
            Position,
            VariantId,
            AlternateAllele,
            Chromosome,
            ReferenceAllele,
        ];
        let order = HeaderOrder::from_fields(&listed).unwrap();

        assert_eq!(order.column(VariantId), 2);
        assert_eq!(order.column(AlternateAlleleFrequency), 0);
        assert_eq!(order.fields_in_column_order(), listed);
    }

    #[test]
    fn test_canonical_header_line() {
        assert_eq!(
            HeaderOrder::canonical().to_header_line(),
            "#Variant ID,Chromosome,Position on chromosome,Reference allele,Alternate allele,Alternate allele frequency"
        );
    }
}
