//! Document codec: many sections in one text, separated by blank lines.
//!
//! Decoding never fails. Blocks that are not valid sections are kept as
//! [`SectionOutcome::Skipped`] entries so callers can count them.

use crate::error::Result;
use crate::section::{decode_section, encode_section, EncodeOptions, SectionOutcome, SkipReason};
use crate::{Collection, CollectionName, DecodedSection};
use serde::{Deserialize, Serialize};

/// Separator placed between two sections.
pub const SECTION_SEPARATOR: &str = "\n\n";

/// Encode collections into a document.
///
/// Empty collections are left out. No collections yields an empty string.
pub fn encode_document<'a, I>(collections: I, options: &EncodeOptions) -> Result<String>
where
    I: IntoIterator<Item = &'a Collection>,
{
    let mut sections = Vec::new();
    for collection in collections {
        if let Some(text) = encode_section(collection, options)? {
            sections.push(text);
        }
    }
    Ok(sections.join(SECTION_SEPARATOR))
}

/// A decoded document: one outcome per block, in document order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    outcomes: Vec<SectionOutcome>,
}

impl Document {
    /// Decode document text.
    pub fn decode(text: &str) -> Self {
        let outcomes = split_blocks(text)
            .iter()
            .map(|block| decode_section(block))
            .collect();
        Self { outcomes }
    }

    /// All block outcomes.
    pub fn outcomes(&self) -> &[SectionOutcome] {
        &self.outcomes
    }

    /// Successfully decoded sections.
    pub fn sections(&self) -> impl Iterator<Item = &DecodedSection> {
        self.outcomes.iter().filter_map(SectionOutcome::as_decoded)
    }

    /// Reasons for every dropped block.
    pub fn skipped(&self) -> impl Iterator<Item = &SkipReason> {
        self.outcomes.iter().filter_map(SectionOutcome::as_skipped)
    }

    /// Number of decoded sections.
    pub fn section_count(&self) -> usize {
        self.sections().count()
    }

    /// Number of dropped blocks.
    pub fn skipped_count(&self) -> usize {
        self.skipped().count()
    }

    /// Consume the document, keeping the decoded sections.
    pub fn into_sections(self) -> impl Iterator<Item = DecodedSection> {
        self.outcomes.into_iter().filter_map(|o| match o {
            SectionOutcome::Decoded(section) => Some(section),
            SectionOutcome::Skipped(_) => None,
        })
    }

    /// Consume the document into collections.
    pub fn into_collections(self) -> Vec<Collection> {
        self.into_sections().map(Collection::from).collect()
    }

    /// Re-encode the decoded sections.
    pub fn encode(&self, options: &EncodeOptions) -> Result<String> {
        let collections: Vec<Collection> = self.sections().cloned().map(Collection::from).collect();
        encode_document(&collections, options)
    }

    /// Counts for logging and reporting.
    pub fn summary(&self) -> DocumentSummary {
        DocumentSummary::from(self)
    }
}

/// Row counts of a document, without the data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSummary {
    /// Section names and row counts, in document order
    pub sections: Vec<(CollectionName, usize)>,
    /// Blocks that were not valid sections
    pub skipped: usize,
}

impl DocumentSummary {
    /// Total rows across sections.
    pub fn record_count(&self) -> usize {
        self.sections.iter().map(|(_, n)| n).sum()
    }
}

impl From<&Document> for DocumentSummary {
    fn from(document: &Document) -> Self {
        Self {
            sections: document
                .sections()
                .map(|s| (s.name.clone(), s.len()))
                .collect(),
            skipped: document.skipped_count(),
        }
    }
}

/// Split text into blocks of non-blank logical lines.
///
/// Runs of one or more blank lines end a block.
fn split_blocks(text: &str) -> Vec<Vec<&str>> {
    let mut blocks = Vec::new();
    let mut current = Vec::new();

    for line in logical_lines(text) {
        if line.trim().is_empty() {
            if !current.is_empty() {
                blocks.push(std::mem::take(&mut current));
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        blocks.push(current);
    }

    blocks
}

/// Split text on line breaks that are outside quoted cells.
///
/// A trailing `\r` is stripped from each line.
pub(crate) fn logical_lines(text: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut in_quotes = false;
    let mut start = 0;

    for (i, b) in text.bytes().enumerate() {
        match b {
            b'"' => in_quotes = !in_quotes,
            b'\n' if !in_quotes => {
                lines.push(strip_cr(&text[start..i]));
                start = i + 1;
            }
            _ => {}
        }
    }
    if start < text.len() {
        lines.push(strip_cr(&text[start..]));
    }

    lines
}

fn strip_cr(line: &str) -> &str {
    line.strip_suffix('\r').unwrap_or(line)
}
