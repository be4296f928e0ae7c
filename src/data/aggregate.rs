use std::collections::{BTreeMap, HashMap, HashSet};
use std::hash::Hash;

use super::model::{CleanPaper, RawPapers, HAS_FULL_TEXT};
use super::text::{tokenize, StopWords};

// ---------------------------------------------------------------------------
// FrequencyTable – ordered (key, count) pairs
// ---------------------------------------------------------------------------

/// Ordered `(key, count)` pairs. An empty table is a normal result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencyTable<K> {
    entries: Vec<(K, usize)>,
}

impl<K> Default for FrequencyTable<K> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<K: Eq + Hash + Clone> FrequencyTable<K> {
    /// Count `keys` and order by descending count. Equal counts keep the
    /// order in which their key was first seen.
    pub fn count<I: IntoIterator<Item = K>>(keys: I) -> Self {
        let mut slots: HashMap<K, usize> = HashMap::new();
        let mut entries: Vec<(K, usize)> = Vec::new();
        for key in keys {
            match slots.get(&key) {
                Some(&i) => entries[i].1 += 1,
                None => {
                    slots.insert(key.clone(), entries.len());
                    entries.push((key, 1));
                }
            }
        }
        // stable: ties stay in first-seen order
        entries.sort_by(|a, b| b.1.cmp(&a.1));
        Self { entries }
    }
}

impl<K> FrequencyTable<K> {
    /// Wrap entries that are already in display order.
    pub fn from_entries(entries: Vec<(K, usize)>) -> Self {
        Self { entries }
    }

    /// Keep the first `n` entries.
    pub fn top(mut self, n: usize) -> Self {
        self.entries.truncate(n);
        self
    }

    /// Drop entries counted fewer than `min` times.
    pub fn at_least(mut self, min: usize) -> Self {
        self.entries.retain(|(_, c)| *c >= min);
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[(K, usize)] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, (K, usize)> {
        self.entries.iter()
    }

    /// Sum of all counts.
    pub fn total(&self) -> usize {
        self.entries.iter().map(|(_, c)| c).sum()
    }
}

impl<'a, K> IntoIterator for &'a FrequencyTable<K> {
    type Item = &'a (K, usize);
    type IntoIter = std::slice::Iter<'a, (K, usize)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

// ---------------------------------------------------------------------------
// Grouped counts
// ---------------------------------------------------------------------------

/// Column used to group papers for counting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupBy {
    Year,
    Journal,
    Source,
}

impl GroupBy {
    /// Grouping key of a row; papers without a source are not counted.
    fn key(self, row: &CleanPaper) -> Option<String> {
        match self {
            GroupBy::Year => Some(row.publication_year.to_string()),
            GroupBy::Journal => Some(row.journal_clean.clone()),
            GroupBy::Source => row.paper.source.clone(),
        }
    }
}

/// Papers per distinct key, most frequent first.
pub fn count_by<'a, I>(rows: I, group: GroupBy) -> FrequencyTable<String>
where
    I: IntoIterator<Item = &'a CleanPaper>,
{
    FrequencyTable::count(rows.into_iter().filter_map(|r| group.key(r)))
}

/// Papers per publication year in ascending year order, for timelines.
pub fn yearly_counts<'a, I>(rows: I) -> FrequencyTable<i32>
where
    I: IntoIterator<Item = &'a CleanPaper>,
{
    let mut by_year: BTreeMap<i32, usize> = BTreeMap::new();
    for row in rows {
        *by_year.entry(row.publication_year).or_default() += 1;
    }
    FrequencyTable::from_entries(by_year.into_iter().collect())
}

// ---------------------------------------------------------------------------
// Word frequencies
// ---------------------------------------------------------------------------

/// Free-text column analysed for word frequencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextColumn {
    Title,
    Abstract,
}

impl TextColumn {
    pub fn label(self) -> &'static str {
        match self {
            TextColumn::Title => "Titles",
            TextColumn::Abstract => "Abstracts",
        }
    }

    fn text(self, row: &CleanPaper) -> Option<&str> {
        match self {
            TextColumn::Title => row.paper.title.as_deref(),
            TextColumn::Abstract => row.paper.abstract_text.as_deref(),
        }
    }
}

/// Word counts over one text column, stop words removed, most frequent
/// first with ties in first-seen order. Use [`FrequencyTable::top`] for a
/// top-N list.
pub fn word_frequencies<'a, I>(rows: I, column: TextColumn, stop_words: &StopWords) -> FrequencyTable<String>
where
    I: IntoIterator<Item = &'a CleanPaper>,
{
    let words = rows
        .into_iter()
        .filter_map(|r| column.text(r))
        .flat_map(tokenize)
        .filter(|w| !stop_words.contains(w));
    FrequencyTable::count(words)
}

// ---------------------------------------------------------------------------
// Summary statistics
// ---------------------------------------------------------------------------

/// Headline numbers for the overview page.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryStats {
    pub total_papers: usize,
    pub papers_with_abstract: usize,
    /// `None` when the input has no `has_full_text` column.
    pub papers_with_full_text: Option<usize>,
    pub earliest_year: Option<i32>,
    pub latest_year: Option<i32>,
    pub mean_abstract_words: f64,
    pub unique_journals: usize,
    pub unique_sources: usize,
}

impl SummaryStats {
    pub fn compute<'a, I>(rows: I, has_full_text_column: bool) -> Self
    where
        I: IntoIterator<Item = &'a CleanPaper>,
    {
        let mut total = 0usize;
        let mut with_abstract = 0usize;
        let mut full_text = 0usize;
        let mut words = 0usize;
        let mut earliest: Option<i32> = None;
        let mut latest: Option<i32> = None;
        let mut journals: HashSet<&str> = HashSet::new();
        let mut sources: HashSet<&str> = HashSet::new();

        for row in rows {
            total += 1;
            if row.paper.abstract_text.is_some() {
                with_abstract += 1;
            }
            if row
                .paper
                .extra
                .get(HAS_FULL_TEXT)
                .and_then(|v| v.as_bool())
                .unwrap_or(false)
            {
                full_text += 1;
            }
            words += row.abstract_word_count;
            let y = row.publication_year;
            earliest = Some(earliest.map_or(y, |e| e.min(y)));
            latest = Some(latest.map_or(y, |l| l.max(y)));
            journals.insert(row.journal_clean.as_str());
            if let Some(s) = row.paper.source.as_deref() {
                sources.insert(s);
            }
        }

        Self {
            total_papers: total,
            papers_with_abstract: with_abstract,
            papers_with_full_text: has_full_text_column.then_some(full_text),
            earliest_year: earliest,
            latest_year: latest,
            mean_abstract_words: if total == 0 { 0.0 } else { words as f64 / total as f64 },
            unique_journals: journals.len(),
            unique_sources: sources.len(),
        }
    }
}

/// Distribution of `abstract_word_count`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AbstractLengthStats {
    pub mean: f64,
    pub median: f64,
    pub max: usize,
}

impl AbstractLengthStats {
    /// `None` when there are no rows.
    pub fn compute<'a, I>(rows: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a CleanPaper>,
    {
        let mut counts: Vec<usize> = rows.into_iter().map(|r| r.abstract_word_count).collect();
        if counts.is_empty() {
            return None;
        }
        counts.sort_unstable();
        let n = counts.len();
        let median = if n % 2 == 1 {
            counts[n / 2] as f64
        } else {
            (counts[n / 2 - 1] + counts[n / 2]) as f64 / 2.0
        };
        Some(Self {
            mean: counts.iter().sum::<usize>() as f64 / n as f64,
            median,
            max: counts[n - 1],
        })
    }
}

/// Null count per column, only columns with at least one null, most
/// missing first. On a [`CleanTable`](super::model::CleanTable) dates the
/// cleaner could not parse are counted as null.
pub fn missing_values<T: RawPapers>(table: &T) -> FrequencyTable<String> {
    let mut entries: Vec<(String, usize)> = table
        .column_names()
        .iter()
        .map(|name| (name.clone(), table.missing_count(name)))
        .filter(|(_, nulls)| *nulls > 0)
        .collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1));
    FrequencyTable::from_entries(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::cleaner::Cleaner;
    use crate::data::model::{ColumnNames, CleanTable, MetadataValue, Paper, RawTable};
    use pretty_assertions::assert_eq;

    fn table(rows: &[(Option<&str>, Option<&str>, Option<&str>, &str, Option<&str>)]) -> CleanTable {
        let papers = rows
            .iter()
            .map(|(title, abs, journal, date, source)| Paper {
                title: title.map(String::from),
                abstract_text: abs.map(String::from),
                journal: journal.map(String::from),
                publish_time: Some(date.to_string()),
                source: source.map(String::from),
                ..Paper::default()
            })
            .collect();
        let raw = RawTable {
            papers,
            column_names: ["title", "abstract", "journal", "publish_time", "source_x"]
                .map(String::from)
                .to_vec(),
            columns: ColumnNames::default(),
        };
        Cleaner::default().clean(&raw)
    }

    #[test]
    fn count_orders_by_count_then_first_seen() {
        let freq = FrequencyTable::count(["b", "a", "c", "a", "c", "d"]);
        assert_eq!(freq.entries(), &[("a", 2), ("c", 2), ("b", 1), ("d", 1)]);
        assert_eq!(freq.total(), 6);
        assert_eq!(freq.clone().top(3).entries(), &[("a", 2), ("c", 2), ("b", 1)]);
        assert_eq!(freq.at_least(2).len(), 2);
    }

    #[test]
    fn top_n_title_words_with_custom_stop_words() {
        let t = table(&[
            (Some("Covid Study One"), None, None, "2020", None),
            (Some("Covid Study Two"), None, None, "2020", None),
            (Some("Other Paper"), None, None, "2020", None),
        ]);
        let stop = StopWords::baseline().with_extra_csv("covid");
        let top = word_frequencies(t.iter(), TextColumn::Title, &stop).top(2);
        assert_eq!(
            top.entries(),
            &[("study".to_string(), 2), ("one".to_string(), 1)]
        );
        // Deterministic for identical input.
        let again = word_frequencies(t.iter(), TextColumn::Title, &stop).top(2);
        assert_eq!(top, again);
    }

    #[test]
    fn word_frequencies_empty_when_everything_is_stopped() {
        let t = table(&[(Some("The and of"), Some("is a"), None, "2020", None)]);
        let freq = word_frequencies(t.iter(), TextColumn::Title, &StopWords::baseline());
        assert!(freq.is_empty());
        let freq = word_frequencies(t.iter(), TextColumn::Abstract, &StopWords::baseline());
        assert!(freq.is_empty());
    }

    #[test]
    fn groups_by_journal_source_and_year() {
        let t = table(&[
            (None, None, Some("lancet"), "2020-01-01", Some("PMC")),
            (None, None, Some("Lancet"), "2021-01-01", Some("Medline")),
            (None, None, None, "2021-05-05", Some("PMC")),
            (None, None, Some("BMJ"), "bad", None),
        ]);

        let journals = count_by(t.iter(), GroupBy::Journal);
        assert_eq!(
            journals.entries(),
            &[
                ("Lancet".to_string(), 2),
                ("Unknown".to_string(), 1),
                ("Bmj".to_string(), 1)
            ]
        );

        let sources = count_by(t.iter(), GroupBy::Source);
        assert_eq!(sources.total(), 3);
        assert_eq!(sources.entries()[0], ("PMC".to_string(), 2));

        let years = count_by(t.iter(), GroupBy::Year);
        assert_eq!(years.entries()[0], ("2020".to_string(), 2));

        let timeline = yearly_counts(t.iter());
        assert_eq!(timeline.entries(), &[(2020, 2), (2021, 2)]);
    }

    #[test]
    fn summary_statistics() {
        let mut t = table(&[
            (Some("t"), Some("one two three"), Some("A"), "2019", Some("PMC")),
            (Some("t"), None, Some("B"), "2022", Some("PMC")),
            (Some("t"), Some("one"), None, "x", None),
        ]);
        t.rows[0]
            .paper
            .extra
            .insert(HAS_FULL_TEXT.to_string(), MetadataValue::Bool(true));

        let summary = SummaryStats::compute(t.iter(), true);
        assert_eq!(summary.total_papers, 3);
        assert_eq!(summary.papers_with_abstract, 2);
        assert_eq!(summary.papers_with_full_text, Some(1));
        assert_eq!(summary.earliest_year, Some(2019));
        assert_eq!(summary.latest_year, Some(2022));
        assert!((summary.mean_abstract_words - 4.0 / 3.0).abs() < 1e-9);
        assert_eq!(summary.unique_journals, 3);
        assert_eq!(summary.unique_sources, 1);

        assert_eq!(SummaryStats::compute(t.iter(), false).papers_with_full_text, None);
    }

    #[test]
    fn summary_of_no_rows() {
        let summary = SummaryStats::compute(std::iter::empty(), false);
        assert_eq!(summary.total_papers, 0);
        assert_eq!(summary.earliest_year, None);
        assert_eq!(summary.mean_abstract_words, 0.0);
    }

    #[test]
    fn abstract_length_stats() {
        let t = table(&[
            (None, Some("a b c d"), None, "2020", None),
            (None, Some("a"), None, "2020", None),
            (None, None, None, "2020", None),
            (None, Some("a b"), None, "2020", None),
        ]);
        let stats = AbstractLengthStats::compute(t.iter()).expect("rows");
        assert_eq!(stats.max, 4);
        assert_eq!(stats.median, 1.5);
        assert!((stats.mean - 7.0 / 4.0).abs() < 1e-9);
        assert_eq!(AbstractLengthStats::compute(std::iter::empty()), None);
    }

    #[test]
    fn missing_values_lists_only_incomplete_columns() {
        let t = table(&[
            (Some("t"), None, None, "2020", Some("PMC")),
            (Some("t"), None, Some("J"), "2020", Some("PMC")),
        ]);
        let missing = missing_values(&t);
        assert_eq!(
            missing.entries(),
            &[("abstract".to_string(), 2), ("journal".to_string(), 1)]
        );
    }

    #[test]
    fn unparseable_dates_count_as_missing_after_cleaning() {
        let t = table(&[
            (Some("t"), Some("a"), Some("J"), "2020-01-01", Some("PMC")),
            (Some("t"), Some("a"), Some("J"), "garbage", Some("PMC")),
        ]);
        assert_eq!(
            missing_values(&t).entries(),
            &[("publish_time".to_string(), 1)]
        );

        // The raw date text is still present before cleaning.
        let raw = RawTable {
            papers: t.rows.iter().map(|r| r.paper.clone()).collect(),
            column_names: t.column_names.clone(),
            columns: t.columns.clone(),
        };
        assert!(missing_values(&raw).is_empty());
    }
}
