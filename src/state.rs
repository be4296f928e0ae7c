use std::path::PathBuf;

use cord19_explorer::data::aggregate::{
    count_by, missing_values, word_frequencies, yearly_counts, AbstractLengthStats,
    FrequencyTable, GroupBy, SummaryStats, TextColumn,
};
use cord19_explorer::data::export::export_to_path;
use cord19_explorer::data::filter::{filtered_indices, FilterParams, FilteredView};
use cord19_explorer::data::model::HAS_FULL_TEXT;
use cord19_explorer::data::text::StopWords;
use cord19_explorer::ExplorerSession;

use crate::color::ColorMap;

// ---------------------------------------------------------------------------
// Navigation and chart choices
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Overview,
    Trends,
    Journals,
    Content,
    Sources,
    Explorer,
}

impl Section {
    pub const ALL: [Section; 6] = [
        Section::Overview,
        Section::Trends,
        Section::Journals,
        Section::Content,
        Section::Sources,
        Section::Explorer,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Section::Overview => "Data Overview",
            Section::Trends => "Publication Trends",
            Section::Journals => "Journal Analysis",
            Section::Content => "Content Analysis",
            Section::Sources => "Source Analysis",
            Section::Explorer => "Interactive Explorer",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartStyle {
    Bar,
    Line,
    Area,
}

impl ChartStyle {
    pub const ALL: [ChartStyle; 3] = [ChartStyle::Bar, ChartStyle::Line, ChartStyle::Area];

    pub fn label(self) -> &'static str {
        match self {
            ChartStyle::Bar => "Bar Chart",
            ChartStyle::Line => "Line Chart",
            ChartStyle::Area => "Area Chart",
        }
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
///
/// Every derived field is recomputed from the session table by a pure
/// pipeline call whenever one of its inputs changes, so the screen always
/// shows the result for the latest parameters.
pub struct AppState {
    pub session: ExplorerSession,
    pub section: Section,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    // -- Overview (computed once per load) --
    pub summary: Option<SummaryStats>,
    pub missing: FrequencyTable<String>,
    pub abstract_stats: Option<AbstractLengthStats>,

    // -- Publication trends --
    pub trend_range: (i32, i32),
    pub chart_style: ChartStyle,
    pub trend_counts: FrequencyTable<i32>,

    // -- Journal analysis --
    pub top_journals: usize,
    pub min_journal_papers: usize,
    pub journal_counts: FrequencyTable<String>,

    // -- Content analysis --
    pub text_column: TextColumn,
    pub top_words: usize,
    pub stop_words_text: String,
    pub word_counts: FrequencyTable<String>,
    /// Non-zero abstract word counts for the length histogram.
    pub abstract_lengths: Vec<usize>,

    // -- Source analysis --
    pub source_counts: FrequencyTable<String>,
    pub source_colors: Option<ColorMap>,

    // -- Interactive explorer --
    pub filters: FilterParams,
    pub year_options: Vec<i32>,
    pub journal_options: Vec<String>,
    /// Indices of papers passing the explorer filters (cached).
    pub visible_indices: Vec<usize>,
}

impl AppState {
    pub fn new(session: ExplorerSession) -> Self {
        let config = session.config().clone();
        Self {
            session,
            section: Section::Overview,
            status_message: None,
            summary: None,
            missing: FrequencyTable::default(),
            abstract_stats: None,
            trend_range: (config.default_year, config.default_year),
            chart_style: ChartStyle::Bar,
            trend_counts: FrequencyTable::default(),
            top_journals: config.top_journals,
            min_journal_papers: config.min_journal_papers,
            journal_counts: FrequencyTable::default(),
            text_column: TextColumn::Title,
            top_words: config.top_words,
            stop_words_text: config.extra_stop_words.clone(),
            word_counts: FrequencyTable::default(),
            abstract_lengths: Vec::new(),
            source_counts: FrequencyTable::default(),
            source_colors: None,
            filters: FilterParams::default(),
            year_options: Vec::new(),
            journal_options: Vec::new(),
            visible_indices: Vec::new(),
        }
    }

    /// Load the session's data file (no-op when already loaded) and
    /// rebuild every derived view.
    pub fn load(&mut self) {
        match self.session.load() {
            Ok(table) => {
                log::info!("{} papers ready", table.len());
                self.status_message = None;
                self.on_table_changed();
            }
            Err(e) => {
                log::error!("Failed to load data: {e}");
                self.status_message = Some(format!("Error: {e}"));
                self.clear_derived();
            }
        }
    }

    pub fn reload(&mut self) {
        self.session.invalidate();
        self.load();
    }

    /// Switch to another data file.
    pub fn open_file(&mut self, path: PathBuf) {
        self.session.set_data_path(path);
        self.load();
    }

    fn clear_derived(&mut self) {
        self.summary = None;
        self.missing = FrequencyTable::default();
        self.abstract_stats = None;
        self.trend_counts = FrequencyTable::default();
        self.journal_counts = FrequencyTable::default();
        self.word_counts = FrequencyTable::default();
        self.abstract_lengths.clear();
        self.source_counts = FrequencyTable::default();
        self.source_colors = None;
        self.filters = FilterParams::default();
        self.year_options.clear();
        self.journal_options.clear();
        self.visible_indices.clear();
    }

    /// New table: reset filter choices to its bounds and recompute all.
    fn on_table_changed(&mut self) {
        let Some(table) = self.session.table() else {
            return;
        };

        self.summary = Some(SummaryStats::compute(
            table.iter(),
            table.has_column(HAS_FULL_TEXT),
        ));
        self.missing = missing_values(table);
        self.abstract_stats = AbstractLengthStats::compute(table.iter());
        self.abstract_lengths = table
            .iter()
            .map(|r| r.abstract_word_count)
            .filter(|&n| n > 0)
            .collect();

        self.source_counts = count_by(table.iter(), GroupBy::Source).top(10);
        self.source_colors = Some(ColorMap::new(
            self.source_counts.iter().map(|(s, _)| s.as_str()),
        ));

        if let Some(bounds) = table.year_bounds() {
            self.trend_range = bounds;
        }
        self.year_options = yearly_counts(table.iter()).iter().map(|(y, _)| *y).collect();
        let journal_limit = self.session.config().explorer_journal_options;
        self.journal_options = count_by(table.iter(), GroupBy::Journal)
            .top(journal_limit)
            .iter()
            .map(|(j, _)| j.clone())
            .collect();
        self.filters = FilterParams::default();

        self.refresh_trends();
        self.refresh_journals();
        self.refresh_words();
        self.refilter();
    }

    /// Year counts within the selected range.
    pub fn refresh_trends(&mut self) {
        if let Some(table) = self.session.table() {
            let (lo, hi) = self.trend_range;
            let params = FilterParams::default().with_year_range(lo, hi);
            self.trend_counts = yearly_counts(FilteredView::new(table, &params).iter());
        }
    }

    pub fn refresh_journals(&mut self) {
        if let Some(table) = self.session.table() {
            self.journal_counts = count_by(table.iter(), GroupBy::Journal)
                .at_least(self.min_journal_papers)
                .top(self.top_journals);
        }
    }

    pub fn refresh_words(&mut self) {
        if let Some(table) = self.session.table() {
            let stop = StopWords::baseline().with_extra_csv(&self.stop_words_text);
            self.word_counts =
                word_frequencies(table.iter(), self.text_column, &stop).top(self.top_words);
        }
    }

    /// Recompute `visible_indices` after filter change.
    pub fn refilter(&mut self) {
        if let Some(table) = self.session.table() {
            self.visible_indices = filtered_indices(table, &self.filters);
        }
    }

    /// Toggle a single year in the explorer filter.
    pub fn toggle_year(&mut self, year: i32) {
        if !self.filters.years.remove(&year) {
            self.filters.years.insert(year);
        }
        self.refilter();
    }

    /// Toggle a single journal in the explorer filter.
    pub fn toggle_journal(&mut self, journal: &str) {
        if !self.filters.journals.remove(journal) {
            self.filters.journals.insert(journal.to_string());
        }
        self.refilter();
    }

    /// Clear every explorer filter.
    pub fn clear_filters(&mut self) {
        self.filters = FilterParams::default();
        self.refilter();
    }

    /// The explorer's current result set.
    pub fn visible_view(&self) -> Option<FilteredView<'_>> {
        self.session
            .table()
            .map(|t| FilteredView::from_indices(t, &self.visible_indices))
    }

    /// Write the explorer's result set to `path`.
    pub fn export_visible(&mut self, path: PathBuf) {
        let Some(view) = self.visible_view() else {
            return;
        };
        match export_to_path(&view, &path) {
            Ok(n) => {
                self.status_message = Some(format!("Exported {n} papers to {}", path.display()));
            }
            Err(e) => {
                log::error!("Export failed: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cord19_explorer::ExplorerConfig;
    use std::io::Write;

    fn state_with(rows: &str) -> (AppState, tempfile::NamedTempFile) {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "title,abstract,journal,publish_time,source_x").unwrap();
        write!(file, "{rows}").unwrap();
        let session = ExplorerSession::new(ExplorerConfig {
            data_path: file.path().to_path_buf(),
            min_journal_papers: 1,
            ..ExplorerConfig::default()
        });
        let mut state = AppState::new(session);
        state.load();
        (state, file)
    }

    #[test]
    fn load_populates_every_section() {
        let (state, _file) = state_with(
            "Vaccine study,some text,lancet,2020-01-01,PMC\n\
             Mask study,,BMJ,2021-06-01,Medline\n",
        );
        assert!(state.status_message.is_none());
        assert_eq!(state.summary.as_ref().map(|s| s.total_papers), Some(2));
        assert_eq!(state.trend_range, (2020, 2021));
        assert_eq!(state.trend_counts.total(), 2);
        assert_eq!(state.journal_counts.len(), 2);
        assert_eq!(state.word_counts.entries()[0], ("study".to_string(), 2));
        assert_eq!(state.source_counts.len(), 2);
        assert_eq!(state.year_options, vec![2020, 2021]);
        assert_eq!(state.visible_indices, vec![0, 1]);
    }

    #[test]
    fn toggles_narrow_and_widen_the_explorer() {
        let (mut state, _file) = state_with(
            "A,,lancet,2020,PMC\n\
             B,,BMJ,2021,PMC\n\
             C,,,2021,PMC\n",
        );
        state.toggle_year(2021);
        assert_eq!(state.visible_indices, vec![1, 2]);
        state.toggle_journal("Unknown");
        assert_eq!(state.visible_indices, vec![2]);
        state.toggle_year(2021);
        assert_eq!(state.visible_indices, vec![2]);
        state.clear_filters();
        assert_eq!(state.visible_indices, vec![0, 1, 2]);
    }

    #[test]
    fn failed_load_reports_error() {
        let session = ExplorerSession::new(ExplorerConfig {
            data_path: PathBuf::from("/no/such/metadata.csv"),
            ..ExplorerConfig::default()
        });
        let mut state = AppState::new(session);
        state.load();
        assert!(state
            .status_message
            .as_deref()
            .is_some_and(|m| m.contains("not found")));
        assert!(state.summary.is_none());
        assert_eq!(state.session.data_path(), PathBuf::from("/no/such/metadata.csv"));
    }

    #[test]
    fn export_writes_visible_rows() {
        let (mut state, _file) = state_with("A,,lancet,2020,PMC\nB,,BMJ,2021,PMC\n");
        state.toggle_journal("Bmj");
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        state.export_visible(path.clone());
        let text = std::fs::read_to_string(path).unwrap();
        assert_eq!(text.lines().count(), 2);
        assert!(text.contains("B,Bmj,2021,0"));
    }
}
