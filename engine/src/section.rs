//! Section codec: one named collection as a self-describing text block.
//!
//! ```text
//! # products
//! id,name,price
//! 1,Widget,9.99
//! ```

use crate::error::{Error, Result};
use crate::row::{decode_row, encode_row};
use crate::schema::{Column, FieldType, Header};
use crate::{Collection, CollectionName, Record};
use serde::{Deserialize, Serialize};

/// First character of a section's name line.
pub const SECTION_MARKER: char = '#';

/// Options for encoding sections and documents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncodeOptions {
    /// Emit `name:type` header columns
    #[serde(default)]
    pub typed_header: bool,
}

impl EncodeOptions {
    /// Options emitting typed headers.
    pub fn typed() -> Self {
        Self { typed_header: true }
    }
}

/// A successfully decoded section.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedSection {
    pub name: CollectionName,
    pub header: Header,
    pub records: Vec<Record>,
}

impl DecodedSection {
    /// Number of data rows.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the section has no rows.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl From<DecodedSection> for Collection {
    fn from(section: DecodedSection) -> Self {
        Collection::new(section.name, section.records)
    }
}

/// Why a block was not decoded as a section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "camelCase")]
pub enum SkipReason {
    /// Fewer than name line, header and one row
    TooFewLines { found: usize },
    /// First line is not a `# name` marker
    MissingMarker { line: String },
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::TooFewLines { found } => {
                write!(f, "block has {} line(s), a section needs at least 3", found)
            }
            SkipReason::MissingMarker { line } => {
                write!(f, "block does not start with a section marker: {:?}", line)
            }
        }
    }
}

/// Outcome of decoding one block.
#[derive(Debug, Clone, PartialEq)]
pub enum SectionOutcome {
    Decoded(DecodedSection),
    Skipped(SkipReason),
}

impl SectionOutcome {
    /// The decoded section, if any.
    pub fn as_decoded(&self) -> Option<&DecodedSection> {
        match self {
            SectionOutcome::Decoded(section) => Some(section),
            SectionOutcome::Skipped(_) => None,
        }
    }

    /// The skip reason, if any.
    pub fn as_skipped(&self) -> Option<&SkipReason> {
        match self {
            SectionOutcome::Decoded(_) => None,
            SectionOutcome::Skipped(reason) => Some(reason),
        }
    }
}

/// Encode a collection as a section.
///
/// Returns `Ok(None)` for an empty collection, which never becomes a
/// section. The header comes from the first record's field order, so a
/// first record without fields also yields `Ok(None)`.
pub fn encode_section(collection: &Collection, options: &EncodeOptions) -> Result<Option<String>> {
    let Some(first) = collection.records.first().filter(|r| !r.is_empty()) else {
        return Ok(None);
    };

    validate_collection_name(&collection.name)?;
    for name in first.names() {
        validate_field_name(&collection.name, name)?;
    }

    let header = infer_header(first, &collection.records, options.typed_header);

    let mut lines = Vec::with_capacity(collection.records.len() + 2);
    lines.push(format!("{} {}", SECTION_MARKER, collection.name));
    lines.push(header.encode(options.typed_header));
    lines.extend(collection.records.iter().map(|r| encode_row(r, &header)));

    Ok(Some(lines.join("\n")))
}

/// Decode a block of lines as a section.
///
/// Blank lines in the data region are skipped rather than read as rows.
pub fn decode_section(lines: &[&str]) -> SectionOutcome {
    if lines.len() < 3 {
        return SectionOutcome::Skipped(SkipReason::TooFewLines { found: lines.len() });
    }

    let Some(name) = parse_marker(lines[0]) else {
        return SectionOutcome::Skipped(SkipReason::MissingMarker {
            line: lines[0].to_string(),
        });
    };

    let header = Header::parse(lines[1]);
    let records = lines[2..]
        .iter()
        .filter(|line| !line.trim().is_empty())
        .map(|line| decode_row(line, &header))
        .collect();

    SectionOutcome::Decoded(DecodedSection {
        name: name.to_string(),
        header,
        records,
    })
}

/// Parse a `# name` line, returning the name.
pub fn parse_marker(line: &str) -> Option<&str> {
    let name = line.strip_prefix(SECTION_MARKER)?.trim();
    (!name.is_empty()).then_some(name)
}

fn infer_header(first: &Record, records: &[Record], typed: bool) -> Header {
    let columns = first
        .names()
        .map(|name| {
            let hint = if typed {
                column_type(records, name)
            } else {
                None
            };
            Column {
                name: name.to_string(),
                hint,
            }
        })
        .collect();
    Header::new(columns)
}

/// The hint for one column of a typed header.
///
/// The common type of all non-null values, or `None` when they disagree.
/// A column holding only nulls is tagged `json` so its empty cells decode
/// back to `Null`.
fn column_type(records: &[Record], name: &str) -> Option<FieldType> {
    let mut found = None;
    for ty in records
        .iter()
        .filter_map(|r| r.get(name))
        .filter_map(|v| v.field_type())
    {
        match found {
            None => found = Some(ty),
            Some(existing) if existing != ty => return None,
            Some(_) => {}
        }
    }
    found.or(Some(FieldType::Json))
}

fn validate_collection_name(name: &str) -> Result<()> {
    if name.is_empty() || name.trim() != name || name.contains(['"', '\n', '\r']) {
        return Err(Error::InvalidCollectionName(name.to_string()));
    }
    Ok(())
}

fn validate_field_name(collection: &str, field: &str) -> Result<()> {
    if field.is_empty() || field.trim() != field || field.contains([',', '"', '\n', '\r']) {
        return Err(Error::InvalidFieldName {
            collection: collection.to_string(),
            field: field.to_string(),
        });
    }
    Ok(())
}
