use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;

// ---------------------------------------------------------------------------
// MetadataValue – a single cell in a non-core column
// ---------------------------------------------------------------------------

/// Cell texts read as missing in delimited input, besides the empty cell.
/// Matched exactly, case included.
pub const NULL_MARKERS: &[&str] = &[
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Whether a delimited-file cell stands for a missing value.
pub fn is_null_marker(cell: &str) -> bool {
    cell.is_empty() || NULL_MARKERS.contains(&cell)
}

/// A dynamically-typed cell value for columns outside the core five.
#[derive(Debug, Clone, PartialEq)]
pub enum MetadataValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    /// ISO-8601 date string, as rendered by Arrow.
    Date(String),
    Null,
}

impl fmt::Display for MetadataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetadataValue::String(s) => write!(f, "{s}"),
            MetadataValue::Integer(i) => write!(f, "{i}"),
            MetadataValue::Float(v) => write!(f, "{v}"),
            MetadataValue::Bool(b) => write!(f, "{b}"),
            MetadataValue::Date(d) => write!(f, "{d}"),
            MetadataValue::Null => write!(f, "<null>"),
        }
    }
}

impl MetadataValue {
    /// Infer a type from raw delimited-file text. Never fails: null markers
    /// become `Null`, anything that is not a number or a boolean stays a
    /// string.
    pub fn infer(s: &str) -> Self {
        if is_null_marker(s) {
            return MetadataValue::Null;
        }
        if let Ok(i) = s.parse::<i64>() {
            return MetadataValue::Integer(i);
        }
        if let Ok(f) = s.parse::<f64>() {
            return MetadataValue::Float(f);
        }
        match s {
            "true" | "True" | "TRUE" => MetadataValue::Bool(true),
            "false" | "False" | "FALSE" => MetadataValue::Bool(false),
            _ => MetadataValue::String(s.to_string()),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, MetadataValue::Null)
    }

    /// Text form of the value, `None` for nulls and empty strings.
    pub fn as_text(&self) -> Option<String> {
        match self {
            MetadataValue::Null => None,
            MetadataValue::String(s) | MetadataValue::Date(s) if s.is_empty() => None,
            other => Some(other.to_string()),
        }
    }

    /// Truthiness used for flag columns such as `has_full_text`.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            MetadataValue::Bool(b) => Some(*b),
            MetadataValue::Integer(i) => Some(*i != 0),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Column names of the core fields
// ---------------------------------------------------------------------------

pub const TITLE: &str = "title";
pub const ABSTRACT: &str = "abstract";
pub const JOURNAL: &str = "journal";
pub const PUBLISH_TIME: &str = "publish_time";
pub const HAS_FULL_TEXT: &str = "has_full_text";

/// Names of the columns the loader must find in the input file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnNames {
    /// Source identifier column; `source_x` in the CORD-19 release.
    pub source: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            source: "source_x".to_string(),
        }
    }
}

impl ColumnNames {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }

    /// Required columns in the order they are checked.
    pub fn required(&self) -> [&str; 5] {
        [TITLE, ABSTRACT, JOURNAL, PUBLISH_TIME, self.source.as_str()]
    }

    /// Whether `column` is one of the core fields held outside `extra`.
    pub fn is_core(&self, column: &str) -> bool {
        self.required().contains(&column)
    }
}

// ---------------------------------------------------------------------------
// Paper – one row of the metadata file
// ---------------------------------------------------------------------------

/// A single paper as read from the input file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Paper {
    pub title: Option<String>,
    pub abstract_text: Option<String>,
    pub journal: Option<String>,
    /// Raw publication date text; parsed by the cleaner.
    pub publish_time: Option<String>,
    pub source: Option<String>,
    /// Every other input column: column_name → value.
    pub extra: BTreeMap<String, MetadataValue>,
}

impl Paper {
    /// Build a paper from one row of named cells, splitting the core fields
    /// out of the row. Empty core cells become `None`.
    pub fn from_cells(cells: BTreeMap<String, MetadataValue>, columns: &ColumnNames) -> Self {
        let mut paper = Paper::default();
        for (col, value) in cells {
            match col.as_str() {
                TITLE => paper.title = value.as_text(),
                ABSTRACT => paper.abstract_text = value.as_text(),
                JOURNAL => paper.journal = value.as_text(),
                PUBLISH_TIME => paper.publish_time = value.as_text(),
                c if c == columns.source => paper.source = value.as_text(),
                _ => {
                    paper.extra.insert(col, value);
                }
            }
        }
        paper
    }

    /// Whether the value in `column` is missing.
    pub fn is_missing(&self, column: &str, columns: &ColumnNames) -> bool {
        match column {
            TITLE => self.title.is_none(),
            ABSTRACT => self.abstract_text.is_none(),
            JOURNAL => self.journal.is_none(),
            PUBLISH_TIME => self.publish_time.is_none(),
            c if c == columns.source => self.source.is_none(),
            other => self.extra.get(other).map_or(true, MetadataValue::is_null),
        }
    }
}

// ---------------------------------------------------------------------------
// Tables
// ---------------------------------------------------------------------------

/// Anything that can hand its raw papers to the cleaner.
pub trait RawPapers {
    fn papers(&self) -> impl Iterator<Item = &Paper>;
    fn column_names(&self) -> &[String];
    fn columns(&self) -> &ColumnNames;

    /// Number of papers with no value in `column`.
    fn missing_count(&self, column: &str) -> usize {
        let columns = self.columns();
        self.papers().filter(|p| p.is_missing(column, columns)).count()
    }
}

/// The file as loaded: rows in file order, no derived columns.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    pub papers: Vec<Paper>,
    /// Column names in file order.
    pub column_names: Vec<String>,
    pub columns: ColumnNames,
}

impl RawTable {
    pub fn len(&self) -> usize {
        self.papers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.papers.is_empty()
    }
}

impl RawPapers for RawTable {
    fn papers(&self) -> impl Iterator<Item = &Paper> {
        self.papers.iter()
    }

    fn column_names(&self) -> &[String] {
        &self.column_names
    }

    fn columns(&self) -> &ColumnNames {
        &self.columns
    }
}

/// A paper with the columns derived by the cleaner.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanPaper {
    pub paper: Paper,
    /// `None` when `publish_time` was absent or unparseable.
    pub publish_date: Option<NaiveDate>,
    /// Always set: the default year stands in for unparseable dates.
    pub publication_year: i32,
    pub abstract_word_count: usize,
    pub title_word_count: usize,
    /// Title-cased journal, "Unknown" when absent.
    pub journal_clean: String,
}

/// The cleaned dataset shared by the filter, the aggregator and the UI.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanTable {
    pub rows: Vec<CleanPaper>,
    pub column_names: Vec<String>,
    pub columns: ColumnNames,
}

impl CleanTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CleanPaper> {
        self.rows.iter()
    }

    /// Inclusive span of publication years, `None` for an empty table.
    pub fn year_bounds(&self) -> Option<(i32, i32)> {
        let min = self.rows.iter().map(|r| r.publication_year).min()?;
        let max = self.rows.iter().map(|r| r.publication_year).max()?;
        Some((min, max))
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.column_names.iter().any(|c| c == column)
    }
}

impl RawPapers for CleanTable {
    fn papers(&self) -> impl Iterator<Item = &Paper> {
        self.rows.iter().map(|r| &r.paper)
    }

    fn column_names(&self) -> &[String] {
        &self.column_names
    }

    fn columns(&self) -> &ColumnNames {
        &self.columns
    }

    /// An unparseable `publish_time` counts as missing once cleaned.
    fn missing_count(&self, column: &str) -> usize {
        if column == PUBLISH_TIME {
            return self.rows.iter().filter(|r| r.publish_date.is_none()).count();
        }
        let columns = self.columns();
        self.papers().filter(|p| p.is_missing(column, columns)).count()
    }
}
