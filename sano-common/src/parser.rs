//! Variant batch file parsing
//!
//! A batch file is line oriented and comma delimited, with no quoting:
//!
//! ```text
//! #Variant ID,Chromosome,Position on chromosome,Reference allele,Alternate allele,Alternate allele frequency
//! rs12345,1,1234567,A,G,0.12
//! ```
//!
//! The header line names the column of each canonical field in any order.
//! Data lines are decoded lazily by [`Records`]; any field that fails to
//! coerce fails its whole record.

use tracing::debug;

use crate::error::{Error, Result};
use crate::fields::{CanonicalField, HeaderOrder};
use crate::models::VariantRecord;

/// Marker every header line starts with
pub const HEADER_MARKER: char = '#';

const DELIMITER: char = ',';

/// Resolve a marked header line into a column order
///
/// Fails with [`Error::Format`] if the marker is missing, the label count is
/// not exactly six, or a label is unknown or repeated.
pub fn resolve_header(line: &str) -> Result<HeaderOrder> {
    let Some(rest) = line.strip_prefix(HEADER_MARKER) else {
        return Err(Error::Format(format!(
            "Header line does not start with '{}'",
            HEADER_MARKER
        )));
    };

    let labels: Vec<&str> = rest.trim().split(DELIMITER).collect();
    if labels.len() != CanonicalField::COUNT {
        return Err(Error::Format(format!(
            "Header declares {} fields, expected {}",
            labels.len(),
            CanonicalField::COUNT
        )));
    }

    let fields = labels
        .iter()
        .map(|label| {
            CanonicalField::from_label(label)
                .ok_or_else(|| Error::Format(format!("Unrecognized header label: {:?}", label)))
        })
        .collect::<Result<Vec<_>>>()?;

    let order = HeaderOrder::from_fields(&fields)
        .ok_or_else(|| Error::Format("Header repeats a field label".to_string()))?;

    debug!("Resolved header order: {:?}", order.fields_in_column_order());
    Ok(order)
}

/// Decode one data line under `order`
///
/// `line_number` is 1-based and only used for error reporting. Columns past
/// the six mapped ones are ignored.
pub fn decode_line(order: &HeaderOrder, line: &str, line_number: usize) -> Result<VariantRecord> {
    let parts: Vec<&str> = line.trim().split(DELIMITER).collect();
    if parts.len() < order.width() {
        return Err(Error::decode(
            line_number,
            format!(
                "expected {} columns, found {}",
                order.width(),
                parts.len()
            ),
        ));
    }

    let raw = |field: CanonicalField| parts[order.column(field)];

    let position = raw(CanonicalField::Position)
        .trim()
        .parse::<u64>()
        .map_err(|e| {
            Error::decode(
                line_number,
                format!("position {:?} is not a valid offset: {}", raw(CanonicalField::Position), e),
            )
        })?;

    let frequency = raw(CanonicalField::AlternateAlleleFrequency)
        .trim()
        .parse::<f64>()
        .map_err(|e| {
            Error::decode(
                line_number,
                format!(
                    "alternate allele frequency {:?} is not a number: {}",
                    raw(CanonicalField::AlternateAlleleFrequency),
                    e
                ),
            )
        })?;
    if !frequency.is_finite() {
        return Err(Error::decode(
            line_number,
            format!("alternate allele frequency {} is not finite", frequency),
        ));
    }

    VariantRecord::from_codes(
        raw(CanonicalField::VariantId),
        raw(CanonicalField::Chromosome),
        position,
        raw(CanonicalField::ReferenceAllele),
        raw(CanonicalField::AlternateAllele),
        frequency,
    )
    .map_err(|e| Error::decode(line_number, e.to_string()))
}

impl VariantRecord {
    /// Encode as a data line in the column order of `order`
    pub fn to_line(&self, order: &HeaderOrder) -> String {
        let values: Vec<String> = order
            .fields_in_column_order()
            .iter()
            .map(|field| match field {
                CanonicalField::VariantId => self.variant_id.clone(),
                CanonicalField::Chromosome => self.chromosome.to_string(),
                CanonicalField::Position => self.position.to_string(),
                CanonicalField::ReferenceAllele => self.reference_allele.to_string(),
                CanonicalField::AlternateAllele => self.alternate_allele.to_string(),
                CanonicalField::AlternateAlleleFrequency => {
                    self.alternate_allele_frequency.to_string()
                }
            })
            .collect();
        values.join(",")
    }
}

/// Lazy decoder over the data lines following a header
///
/// Consumes its line source once and yields records in input order. Blank
/// lines are skipped.
pub struct Records<I> {
    order: HeaderOrder,
    lines: I,
    line_number: usize,
}

impl<'a, I> Iterator for Records<I>
where
    I: Iterator<Item = &'a str>,
{
    type Item = Result<VariantRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = self.lines.next()?;
            self.line_number += 1;
            if line.trim().is_empty() {
                continue;
            }
            return Some(decode_line(&self.order, line, self.line_number));
        }
    }
}

/// Read the header from the first line and return a decoder for the rest
pub fn records<'a, I>(lines: I) -> Result<Records<I::IntoIter>>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut lines = lines.into_iter();
    let header = lines
        .next()
        .ok_or_else(|| Error::Format("Missing header line".to_string()))?;
    let order = resolve_header(header)?;

    Ok(Records {
        order,
        lines,
        line_number: 1,
    })
}

/// Decode a whole batch from text, failing on the first bad record
pub fn parse_batch(text: &str) -> Result<Vec<VariantRecord>> {
    records(text.lines())?.collect()
}
