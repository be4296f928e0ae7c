use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};

use super::model::{CleanPaper, CleanTable, Paper, RawPapers};

/// Year substituted when `publish_time` is absent or unparseable.
pub const DEFAULT_YEAR: i32 = 2020;

/// Journal name used when the `journal` cell is empty.
pub const UNKNOWN_JOURNAL: &str = "Unknown";

// ---------------------------------------------------------------------------
// Cleaner – derives the analysis columns
// ---------------------------------------------------------------------------

/// Adds `publish_date`, `publication_year`, word counts and `journal_clean`
/// to every row. Rows are never dropped or reordered.
///
/// Derivation reads raw columns only, so cleaning an already clean table
/// gives the same table back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cleaner {
    default_year: i32,
}

impl Default for Cleaner {
    fn default() -> Self {
        Self::new(DEFAULT_YEAR)
    }
}

impl Cleaner {
    pub fn new(default_year: i32) -> Self {
        Self { default_year }
    }

    pub fn clean<T: RawPapers>(&self, table: &T) -> CleanTable {
        let rows: Vec<CleanPaper> = table.papers().map(|p| self.clean_paper(p)).collect();

        let defaulted = rows.iter().filter(|r| r.publish_date.is_none()).count();
        if defaulted > 0 {
            log::warn!(
                "{defaulted} of {} papers have no usable publish_time; year set to {}",
                rows.len(),
                self.default_year
            );
        }
        log::debug!("Cleaned {} papers", rows.len());

        CleanTable {
            rows,
            column_names: table.column_names().to_vec(),
            columns: table.columns().clone(),
        }
    }

    pub fn clean_paper(&self, paper: &Paper) -> CleanPaper {
        let publish_date = paper.publish_time.as_deref().and_then(parse_publish_time);
        CleanPaper {
            publication_year: publish_date.map_or(self.default_year, |d| d.year()),
            publish_date,
            abstract_word_count: word_count(paper.abstract_text.as_deref()),
            title_word_count: word_count(paper.title.as_deref()),
            journal_clean: normalize_journal(paper.journal.as_deref()),
            paper: paper.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Column derivations
// ---------------------------------------------------------------------------

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%Y %b %d", "%d %b %Y", "%m/%d/%Y"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

/// Parse the date forms seen in `publish_time`. Never fails: anything
/// unrecognised is `None`.
///
/// Partial dates resolve to the first day of the period
/// (`2020` → 2020-01-01, `2020-05` → 2020-05-01, `2020 Mar` → 2020-03-01).
pub fn parse_publish_time(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }

    // Year only
    if s.len() == 4 && s.bytes().all(|b| b.is_ascii_digit()) {
        return s.parse().ok().and_then(|y| NaiveDate::from_ymd_opt(y, 1, 1));
    }
    // Year and month
    if let Ok(d) = NaiveDate::parse_from_str(&format!("{s}-01"), "%Y-%m-%d") {
        return Some(d);
    }
    NaiveDate::parse_from_str(&format!("{s} 01"), "%Y %b %d").ok()
}

/// Number of whitespace-separated tokens; absent text counts as zero.
pub fn word_count(text: Option<&str>) -> usize {
    text.map_or(0, |t| t.split_whitespace().count())
}

/// "Unknown" for a missing journal, then title-cased so that spelling
/// variants group together.
pub fn normalize_journal(journal: Option<&str>) -> String {
    let name = journal.map(str::trim).filter(|j| !j.is_empty());
    title_case(name.unwrap_or(UNKNOWN_JOURNAL))
}

/// Upper-case the first letter of every run of letters, lower-case the rest
/// (`"the LANCET"` → `"The Lancet"`, `"covid-19 reports"` → `"Covid-19 Reports"`).
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_alpha = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{ColumnNames, RawTable};
    use pretty_assertions::assert_eq;

    fn paper(title: Option<&str>, abs: Option<&str>, journal: Option<&str>, date: Option<&str>) -> Paper {
        Paper {
            title: title.map(String::from),
            abstract_text: abs.map(String::from),
            journal: journal.map(String::from),
            publish_time: date.map(String::from),
            ..Paper::default()
        }
    }

    fn raw(papers: Vec<Paper>) -> RawTable {
        RawTable {
            papers,
            column_names: ["title", "abstract", "journal", "publish_time", "source_x"]
                .map(String::from)
                .to_vec(),
            columns: ColumnNames::default(),
        }
    }

    #[test]
    fn parses_common_publish_time_forms() {
        let d = |y, m, day| NaiveDate::from_ymd_opt(y, m, day);
        assert_eq!(parse_publish_time("2020-03-15"), d(2020, 3, 15));
        assert_eq!(parse_publish_time(" 2020/03/15 "), d(2020, 3, 15));
        assert_eq!(parse_publish_time("2020 Mar 15"), d(2020, 3, 15));
        assert_eq!(parse_publish_time("2020 Mar"), d(2020, 3, 1));
        assert_eq!(parse_publish_time("2019-12"), d(2019, 12, 1));
        assert_eq!(parse_publish_time("2021"), d(2021, 1, 1));
        assert_eq!(parse_publish_time("2020-04-01T12:30:00"), d(2020, 4, 1));
        assert_eq!(parse_publish_time("2020-04-01T12:30:00Z"), d(2020, 4, 1));
        assert_eq!(parse_publish_time("2020-04-01 08:00:00"), d(2020, 4, 1));
    }

    #[test]
    fn unparseable_dates_are_none() {
        assert_eq!(parse_publish_time(""), None);
        assert_eq!(parse_publish_time("not a date"), None);
        assert_eq!(parse_publish_time("2020-13-45"), None);
        assert_eq!(parse_publish_time("20201"), None);
    }

    #[test]
    fn word_count_splits_on_whitespace() {
        assert_eq!(word_count(None), 0);
        assert_eq!(word_count(Some("")), 0);
        assert_eq!(word_count(Some("  one\ttwo\nthree  ")), 3);
        assert_eq!(word_count(Some("SARS-CoV-2 spreads.")), 2);
    }

    #[test]
    fn journal_is_defaulted_and_title_cased() {
        assert_eq!(normalize_journal(None), "Unknown");
        assert_eq!(normalize_journal(Some("   ")), "Unknown");
        assert_eq!(normalize_journal(Some("the LANCET")), "The Lancet");
        assert_eq!(normalize_journal(Some("bmj open")), "Bmj Open");
        assert_eq!(title_case("covid-19 reports"), "Covid-19 Reports");
        assert_eq!(title_case("o'neil"), "O'Neil");
    }

    #[test]
    fn defaults_fill_unparseable_rows() {
        let table = raw(vec![
            paper(Some("A b c"), Some("one two"), Some("nature"), Some("2019-06-01")),
            paper(None, None, None, Some("garbage")),
            paper(Some("x"), None, None, None),
        ]);
        let clean = Cleaner::default().clean(&table);

        assert_eq!(clean.len(), 3);
        let years: Vec<_> = clean.iter().map(|r| r.publication_year).collect();
        assert_eq!(years, vec![2019, 2020, 2020]);
        assert_eq!(clean.rows[1].publish_date, None);
        assert_eq!(clean.rows[0].abstract_word_count, 2);
        assert_eq!(clean.rows[0].title_word_count, 3);
        assert_eq!(clean.rows[1].abstract_word_count, 0);
        assert_eq!(clean.rows[1].title_word_count, 0);
        assert_eq!(clean.rows[0].journal_clean, "Nature");
        assert_eq!(clean.rows[2].journal_clean, "Unknown");
    }

    #[test]
    fn configured_default_year_is_used() {
        let table = raw(vec![paper(None, None, None, Some("n/a"))]);
        let clean = Cleaner::new(1999).clean(&table);
        assert_eq!(clean.rows[0].publication_year, 1999);
    }

    #[test]
    fn cleaning_twice_is_a_no_op() {
        let table = raw(vec![
            paper(Some("Title"), Some("abs text"), Some("jAMA"), Some("2021-02-03")),
            paper(None, None, None, Some("??")),
        ]);
        let cleaner = Cleaner::default();
        let once = cleaner.clean(&table);
        let twice = cleaner.clean(&once);
        assert_eq!(once, twice);
    }
}
