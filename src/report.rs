use std::fmt::{self, Write};

use crate::config::ExplorerConfig;
use crate::data::aggregate::{
    count_by, missing_values, word_frequencies, yearly_counts, AbstractLengthStats, GroupBy,
    SummaryStats, TextColumn,
};
use crate::data::model::{CleanTable, HAS_FULL_TEXT};
use crate::data::text::StopWords;

/// Plain-text overview of a cleaned table, printed by `--report`.
pub fn render(table: &CleanTable, config: &ExplorerConfig) -> String {
    let mut out = String::new();
    // Writing to a String cannot fail.
    let _ = write_report(&mut out, table, config);
    out
}

fn write_report(out: &mut String, table: &CleanTable, config: &ExplorerConfig) -> fmt::Result {
    writeln!(out, "=== DATASET ===")?;
    writeln!(out, "rows: {}, columns: {}", table.len(), table.column_names.len())?;

    let missing = missing_values(table).top(10);
    if !missing.is_empty() {
        writeln!(out, "\nMissing values by column:")?;
        for (col, n) in &missing {
            writeln!(out, "  {col:<24} {n}")?;
        }
    }

    let summary = SummaryStats::compute(table.iter(), table.has_column(HAS_FULL_TEXT));
    writeln!(out, "\n=== SUMMARY STATISTICS ===")?;
    writeln!(out, "total_papers: {}", summary.total_papers)?;
    writeln!(out, "papers_with_abstract: {}", summary.papers_with_abstract)?;
    match summary.papers_with_full_text {
        Some(n) => writeln!(out, "papers_with_full_text: {n}")?,
        None => writeln!(out, "papers_with_full_text: N/A")?,
    }
    match (summary.earliest_year, summary.latest_year) {
        (Some(lo), Some(hi)) => writeln!(out, "publication_range: {lo}-{hi}")?,
        _ => writeln!(out, "publication_range: N/A")?,
    }
    writeln!(out, "avg_abstract_length: {:.1}", summary.mean_abstract_words)?;
    writeln!(out, "unique_journals: {}", summary.unique_journals)?;
    writeln!(out, "unique_sources: {}", summary.unique_sources)?;

    if let Some(stats) = AbstractLengthStats::compute(table.iter()) {
        writeln!(
            out,
            "abstract_words: mean {:.1}, median {:.1}, max {}",
            stats.mean, stats.median, stats.max
        )?;
    }

    writeln!(out, "\n=== PAPERS BY YEAR ===")?;
    write_counts(out, yearly_counts(table.iter()).iter().map(|(y, n)| (y.to_string(), *n)))?;

    writeln!(out, "\n=== TOP {} JOURNALS ===", config.top_journals)?;
    let journals = count_by(table.iter(), GroupBy::Journal).top(config.top_journals);
    write_counts(out, journals.iter().cloned())?;

    writeln!(out, "\n=== TOP {} TITLE WORDS ===", config.top_words)?;
    let stop = StopWords::baseline().with_extra_csv(&config.extra_stop_words);
    let words = word_frequencies(table.iter(), TextColumn::Title, &stop).top(config.top_words);
    write_counts(out, words.iter().cloned())?;

    writeln!(out, "\n=== TOP 10 SOURCES ===")?;
    let sources = count_by(table.iter(), GroupBy::Source).top(10);
    write_counts(out, sources.iter().cloned())?;

    Ok(())
}

fn write_counts<I>(out: &mut String, entries: I) -> fmt::Result
where
    I: Iterator<Item = (String, usize)>,
{
    let mut any = false;
    for (key, n) in entries {
        writeln!(out, "  {key:<40} {n}")?;
        any = true;
    }
    if !any {
        writeln!(out, "  (none)")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::cleaner::Cleaner;
    use crate::data::model::{ColumnNames, Paper, RawTable};

    fn table(papers: Vec<Paper>) -> CleanTable {
        Cleaner::default().clean(&RawTable {
            papers,
            column_names: ["title", "abstract", "journal", "publish_time", "source_x"]
                .map(String::from)
                .to_vec(),
            columns: ColumnNames::default(),
        })
    }

    #[test]
    fn report_lists_each_section() {
        let t = table(vec![
            Paper {
                title: Some("Vaccine trial results".into()),
                abstract_text: Some("a short abstract".into()),
                journal: Some("lancet".into()),
                publish_time: Some("2021-03-01".into()),
                source: Some("PMC".into()),
                ..Paper::default()
            },
            Paper {
                title: Some("Vaccine hesitancy".into()),
                ..Paper::default()
            },
        ]);
        let text = render(&t, &ExplorerConfig::default());

        assert!(text.contains("rows: 2, columns: 5"));
        assert!(text.contains("total_papers: 2"));
        assert!(text.contains("papers_with_full_text: N/A"));
        assert!(text.contains("publication_range: 2020-2021"));
        assert!(text.contains("Lancet"));
        assert!(text.contains("vaccine"));
        assert!(text.contains("PMC"));
        assert!(text.contains("abstract"));
    }

    #[test]
    fn empty_table_reports_none() {
        let text = render(&table(vec![]), &ExplorerConfig::default());
        assert!(text.contains("rows: 0"));
        assert!(text.contains("publication_range: N/A"));
        assert!(text.contains("(none)"));
    }
}
