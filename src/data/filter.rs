use std::collections::BTreeSet;

use super::model::{CleanPaper, CleanTable};

// ---------------------------------------------------------------------------
// Filter parameters as chosen in the UI
// ---------------------------------------------------------------------------

/// Row predicates combined with AND.
///
/// Every dimension left unset (no range, empty set, empty keyword) places no
/// restriction on the rows; it never means "match nothing".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterParams {
    /// Inclusive `(min, max)` publication year range.
    pub year_range: Option<(i32, i32)>,
    /// Accepted publication years.
    pub years: BTreeSet<i32>,
    /// Accepted `journal_clean` values, matched exactly.
    pub journals: BTreeSet<String>,
    /// Case-insensitive substring searched in title and abstract.
    pub keyword: String,
}

impl FilterParams {
    pub fn with_year_range(mut self, min: i32, max: i32) -> Self {
        self.year_range = Some((min, max));
        self
    }

    pub fn with_years<I: IntoIterator<Item = i32>>(mut self, years: I) -> Self {
        self.years.extend(years);
        self
    }

    pub fn with_journals<I, S>(mut self, journals: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.journals.extend(journals.into_iter().map(Into::into));
        self
    }

    pub fn with_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keyword = keyword.into();
        self
    }

    /// Whether no predicate is active.
    pub fn is_unrestricted(&self) -> bool {
        self.year_range.is_none()
            && self.years.is_empty()
            && self.journals.is_empty()
            && self.keyword.is_empty()
    }

    /// Build the per-row predicate once; the keyword is lower-cased here
    /// rather than per row.
    fn matcher(&self) -> Matcher<'_> {
        let keyword = self.keyword.as_str();
        Matcher {
            year_range: self.year_range.map(|(a, b)| (a.min(b), a.max(b))),
            years: &self.years,
            journals: &self.journals,
            keyword: (!keyword.is_empty()).then(|| keyword.to_lowercase()),
        }
    }
}

struct Matcher<'p> {
    year_range: Option<(i32, i32)>,
    years: &'p BTreeSet<i32>,
    journals: &'p BTreeSet<String>,
    keyword: Option<String>,
}

impl Matcher<'_> {
    fn matches(&self, row: &CleanPaper) -> bool {
        if let Some((min, max)) = self.year_range {
            if row.publication_year < min || row.publication_year > max {
                return false;
            }
        }
        if !self.years.is_empty() && !self.years.contains(&row.publication_year) {
            return false;
        }
        if !self.journals.is_empty() && !self.journals.contains(&row.journal_clean) {
            return false;
        }
        if let Some(keyword) = &self.keyword {
            let hit = |text: &Option<String>| {
                text.as_deref()
                    .is_some_and(|t| t.to_lowercase().contains(keyword.as_str()))
            };
            if !hit(&row.paper.title) && !hit(&row.paper.abstract_text) {
                return false;
            }
        }
        true
    }
}

/// Return indices of rows that pass all active filters, in table order.
pub fn filtered_indices(table: &CleanTable, params: &FilterParams) -> Vec<usize> {
    if params.is_unrestricted() {
        return (0..table.len()).collect();
    }
    let matcher = params.matcher();
    table
        .rows
        .iter()
        .enumerate()
        .filter(|(_, row)| matcher.matches(row))
        .map(|(i, _)| i)
        .collect()
}

// ---------------------------------------------------------------------------
// FilteredView – read-only subset of a table
// ---------------------------------------------------------------------------

/// Rows of a [`CleanTable`] that passed a filter. Holds indices only and is
/// rebuilt whenever the parameters change.
#[derive(Debug, Clone)]
pub struct FilteredView<'t> {
    table: &'t CleanTable,
    indices: Vec<usize>,
}

impl<'t> FilteredView<'t> {
    pub fn new(table: &'t CleanTable, params: &FilterParams) -> Self {
        Self {
            table,
            indices: filtered_indices(table, params),
        }
    }

    /// View over previously computed indices (e.g. cached UI state).
    /// Out-of-range indices are dropped.
    pub fn from_indices(table: &'t CleanTable, indices: &[usize]) -> Self {
        Self {
            table,
            indices: indices.iter().copied().filter(|&i| i < table.len()).collect(),
        }
    }

    /// Every row of the table.
    pub fn all(table: &'t CleanTable) -> Self {
        Self {
            table,
            indices: (0..table.len()).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn table(&self) -> &'t CleanTable {
        self.table
    }

    pub fn get(&self, i: usize) -> Option<&'t CleanPaper> {
        self.indices.get(i).map(|&idx| &self.table.rows[idx])
    }

    pub fn iter(&self) -> impl Iterator<Item = &'t CleanPaper> + '_ {
        let table = self.table;
        self.indices.iter().map(move |&i| &table.rows[i])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::cleaner::Cleaner;
    use crate::data::model::{ColumnNames, Paper, RawTable};
    use pretty_assertions::assert_eq;

    fn table() -> CleanTable {
        let rows = [
            ("SARS-CoV-2 transmission", None, None, "2020-02-01"),
            ("Influenza vaccines", Some("no mention"), Some("lancet"), "2019-01-01"),
            ("Masks", Some("Effect on sars spread"), None, "unknown date"),
            ("Ventilation", None, Some("BMJ"), "2021-07-01"),
            ("Cohort of 2020", Some("Hospital data"), None, "2020-11-11"),
        ];
        let papers = rows
            .iter()
            .map(|(title, abs, journal, date)| Paper {
                title: Some(title.to_string()),
                abstract_text: abs.map(String::from),
                journal: journal.map(String::from),
                publish_time: Some(date.to_string()),
                ..Paper::default()
            })
            .collect();
        let raw = RawTable {
            papers,
            column_names: vec![],
            columns: ColumnNames::default(),
        };
        Cleaner::default().clean(&raw)
    }

    #[test]
    fn unrestricted_params_return_everything() {
        let t = table();
        assert_eq!(filtered_indices(&t, &FilterParams::default()), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn keyword_is_matched_verbatim() {
        let t = table();
        assert!(filtered_indices(&t, &FilterParams::default().with_keyword("   ")).is_empty());
        // "SARS-CoV-2" has no space after "sars"; "on sars spread" does.
        assert_eq!(
            filtered_indices(&t, &FilterParams::default().with_keyword("sars ")),
            vec![2]
        );
    }

    #[test]
    fn year_and_journal_are_combined() {
        let t = table();
        let params = FilterParams::default()
            .with_year_range(2020, 2020)
            .with_journals(["Unknown"]);
        let expected: Vec<usize> = t
            .iter()
            .enumerate()
            .filter(|(_, r)| r.publication_year == 2020 && r.journal_clean == "Unknown")
            .map(|(i, _)| i)
            .collect();
        assert_eq!(filtered_indices(&t, &params), expected);
        assert_eq!(expected, vec![0, 2, 4]);
    }

    #[test]
    fn keyword_is_case_insensitive_substring() {
        let t = table();
        let params = FilterParams::default().with_keyword("sars");
        assert_eq!(filtered_indices(&t, &params), vec![0, 2]);

        let params = FilterParams::default().with_keyword("HOSPITAL");
        assert_eq!(filtered_indices(&t, &params), vec![4]);
    }

    #[test]
    fn empty_sets_leave_only_the_keyword() {
        let t = table();
        let params = FilterParams {
            keyword: "mention".into(),
            ..FilterParams::default()
        };
        assert_eq!(filtered_indices(&t, &params), vec![1]);
    }

    #[test]
    fn year_set_and_inverted_range() {
        let t = table();
        let params = FilterParams::default().with_years([2019, 2021]);
        assert_eq!(filtered_indices(&t, &params), vec![1, 3]);

        let params = FilterParams::default().with_year_range(2021, 2019);
        assert_eq!(filtered_indices(&t, &params), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn out_of_range_years_give_an_empty_view() {
        let t = table();
        let params = FilterParams::default().with_year_range(1900, 1950);
        let view = FilteredView::new(&t, &params);
        assert!(view.is_empty());
        assert_eq!(view.iter().count(), 0);
    }

    #[test]
    fn view_reads_rows_without_touching_the_table() {
        let t = table();
        let before = t.clone();
        let view = FilteredView::new(&t, &FilterParams::default().with_journals(["Bmj"]));
        assert_eq!(view.len(), 1);
        assert_eq!(view.get(0).map(|r| r.paper.title.as_deref()), Some(Some("Ventilation")));
        assert_eq!(view.get(1), None);
        assert_eq!(t, before);

        let cached = FilteredView::from_indices(&t, &[4, 99]);
        assert_eq!(cached.indices(), &[4]);
        assert_eq!(FilteredView::all(&t).len(), 5);
    }
}
