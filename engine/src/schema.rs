//! Column headers and optional per-column type hints.
//!
//! A plain header is a comma-joined list of field names. A typed header
//! tags every column with a type, e.g. `name:string,price:number`, so that
//! values such as the string `"42"` survive a round trip through text.
//! The `auto` tag leaves a single column to heuristic decoding.

use serde::{Deserialize, Serialize};

/// Column types that can be carried in a typed header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Number,
    Boolean,
    /// Arbitrary nested JSON
    Json,
}

impl FieldType {
    /// The tag written after the `:` in a typed header column.
    pub fn tag(self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Number => "number",
            FieldType::Boolean => "boolean",
            FieldType::Json => "json",
        }
    }

    /// Parse a header tag.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "string" => Some(FieldType::String),
            "number" => Some(FieldType::Number),
            "boolean" => Some(FieldType::Boolean),
            "json" => Some(FieldType::Json),
            _ => None,
        }
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

/// One header column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    /// Field name
    pub name: String,
    /// Type hint, present only in typed headers
    pub hint: Option<FieldType>,
}

impl Column {
    /// A column without a type hint.
    pub fn plain(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            hint: None,
        }
    }

    /// A column with a type hint.
    pub fn typed(name: impl Into<String>, hint: FieldType) -> Self {
        Self {
            name: name.into(),
            hint: Some(hint),
        }
    }
}

/// The ordered column list of a section.
///
/// Column order is authoritative for every data line of the section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Header {
    pub columns: Vec<Column>,
}

impl Header {
    /// Create a header from columns.
    pub fn new(columns: Vec<Column>) -> Self {
        Self { columns }
    }

    /// Create an untyped header from field names.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: names.into_iter().map(Column::plain).collect(),
        }
    }

    /// Parse a header line.
    ///
    /// The line is split on plain commas. It is read as typed only when
    /// every column ends in `:<tag>` with a known tag or [`AUTO_TAG`];
    /// otherwise all columns are taken verbatim as names.
    pub fn parse(line: &str) -> Self {
        let raw: Vec<&str> = line.split(',').collect();

        let typed: Option<Vec<Column>> = raw
            .iter()
            .map(|col| {
                let (name, tag) = col.rsplit_once(':')?;
                let hint = parse_tag(tag)?;
                Some(Column {
                    name: name.to_string(),
                    hint,
                })
            })
            .collect();

        match typed {
            Some(columns) => Self { columns },
            None => Self::from_names(raw),
        }
    }

    /// Render the header line.
    ///
    /// A typed line tags every column, using [`AUTO_TAG`] for columns
    /// without a hint. A plain line whose names would all read back as
    /// tagged is written with [`AUTO_TAG`] on every column instead, so that
    /// [`Header::parse`] always returns the same names.
    pub fn encode(&self, typed: bool) -> String {
        let escape = !typed && self.names().all(|name| name_looks_tagged(name));
        self.columns
            .iter()
            .map(|c| match (typed, c.hint) {
                (true, Some(hint)) => format!("{}:{}", c.name, hint),
                (true, None) => format!("{}:{}", c.name, AUTO_TAG),
                (false, _) if escape => format!("{}:{}", c.name, AUTO_TAG),
                (false, _) => c.name.clone(),
            })
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Field names in column order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Check if the header has no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Whether any column carries a type hint.
    pub fn is_typed(&self) -> bool {
        self.columns.iter().any(|c| c.hint.is_some())
    }
}

/// Tag for a column decoded without a hint.
pub const AUTO_TAG: &str = "auto";

/// `Some(None)` for [`AUTO_TAG`], `None` for an unknown tag.
fn parse_tag(tag: &str) -> Option<Option<FieldType>> {
    if tag == AUTO_TAG {
        return Some(None);
    }
    FieldType::from_tag(tag).map(Some)
}

fn name_looks_tagged(name: &str) -> bool {
    name.rsplit_once(':')
        .is_some_and(|(_, tag)| parse_tag(tag).is_some())
}
