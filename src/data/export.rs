use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use super::filter::FilteredView;

/// File name offered in the save dialog.
pub const DEFAULT_EXPORT_NAME: &str = "cord19_filtered_results.csv";

/// Columns written for each exported paper, in output order.
#[derive(Debug, Serialize)]
struct ExportRow<'a> {
    title: &'a str,
    journal_clean: &'a str,
    publication_year: i32,
    abstract_word_count: usize,
}

/// Write the view as CSV with a header row. Returns the number of papers
/// written; an empty view produces just the header.
pub fn write_csv<W: Write>(view: &FilteredView<'_>, writer: W) -> Result<usize> {
    let mut out = csv::WriterBuilder::new().has_headers(false).from_writer(writer);
    out.write_record(["title", "journal_clean", "publication_year", "abstract_word_count"])
        .context("writing CSV header")?;

    let mut written = 0;
    for row in view.iter() {
        out.serialize(ExportRow {
            title: row.paper.title.as_deref().unwrap_or(""),
            journal_clean: &row.journal_clean,
            publication_year: row.publication_year,
            abstract_word_count: row.abstract_word_count,
        })
        .with_context(|| format!("writing row {written}"))?;
        written += 1;
    }
    out.flush().context("flushing CSV output")?;
    Ok(written)
}

/// Export the view to `path`, replacing any existing file.
pub fn export_to_path(view: &FilteredView<'_>, path: &Path) -> Result<usize> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    let written = write_csv(view, file)?;
    log::info!("Exported {written} papers to {}", path.display());
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::cleaner::Cleaner;
    use crate::data::filter::FilterParams;
    use crate::data::model::{CleanTable, ColumnNames, Paper, RawTable};
    use pretty_assertions::assert_eq;

    fn table() -> CleanTable {
        let papers = vec![
            Paper {
                title: Some("Masks, and \"more\"".into()),
                abstract_text: Some("three word abstract".into()),
                journal: Some("nature".into()),
                publish_time: Some("2021-01-01".into()),
                ..Paper::default()
            },
            Paper::default(),
        ];
        Cleaner::default().clean(&RawTable {
            papers,
            column_names: vec![],
            columns: ColumnNames::default(),
        })
    }

    #[test]
    fn writes_projected_columns() {
        let t = table();
        let view = FilteredView::all(&t);
        let mut buf = Vec::new();
        let n = write_csv(&view, &mut buf).expect("export");
        assert_eq!(n, 2);
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "title,journal_clean,publication_year,abstract_word_count\n\
             \"Masks, and \"\"more\"\"\",Nature,2021,3\n\
             ,Unknown,2020,0\n"
        );
    }

    #[test]
    fn empty_view_writes_header_only() {
        let t = table();
        let view = FilteredView::new(&t, &FilterParams::default().with_year_range(1800, 1801));
        let mut buf = Vec::new();
        assert_eq!(write_csv(&view, &mut buf).expect("export"), 0);
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "title,journal_clean,publication_year,abstract_word_count\n"
        );
    }

    #[test]
    fn export_to_path_creates_file() {
        let t = table();
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join(DEFAULT_EXPORT_NAME);
        export_to_path(&FilteredView::all(&t), &path).expect("export");
        let text = std::fs::read_to_string(&path).expect("read back");
        assert_eq!(text.lines().count(), 3);
    }
}
