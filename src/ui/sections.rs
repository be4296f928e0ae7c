use eframe::egui::{self, RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use cord19_explorer::data::aggregate::{FrequencyTable, TextColumn};
use cord19_explorer::data::filter::FilteredView;

use super::panels::save_file_dialog;
use super::plot;
use crate::state::{AppState, ChartStyle, Section};

const HISTOGRAM_BINS: usize = 50;

// ---------------------------------------------------------------------------
// Central panel dispatch
// ---------------------------------------------------------------------------

pub fn central_panel(ui: &mut Ui, state: &mut AppState) {
    if !state.session.is_loaded() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a metadata file to begin  (File → Open…)");
        });
        return;
    }

    let section = state.section;
    ui.heading(section.label());
    ui.separator();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| match section {
            Section::Overview => overview(ui, state),
            Section::Trends => trends(ui, state),
            Section::Journals => journals(ui, state),
            Section::Content => content(ui, state),
            Section::Sources => sources(ui, state),
            Section::Explorer => explorer(ui, state),
        });
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

fn metric(ui: &mut Ui, label: &str, value: String) {
    egui::Frame::group(ui.style()).show(ui, |ui: &mut Ui| {
        ui.vertical(|ui: &mut Ui| {
            ui.label(RichText::new(label).small());
            ui.heading(value);
        });
    });
}

fn overview(ui: &mut Ui, state: &mut AppState) {
    if let Some(summary) = &state.summary {
        let range = match (summary.earliest_year, summary.latest_year) {
            (Some(lo), Some(hi)) => format!("{lo}-{hi}"),
            _ => "N/A".to_string(),
        };
        ui.columns(4, |cols| {
            metric(&mut cols[0], "Total Papers", summary.total_papers.to_string());
            metric(
                &mut cols[1],
                "Papers with Abstracts",
                summary.papers_with_abstract.to_string(),
            );
            metric(&mut cols[2], "Unique Journals", summary.unique_journals.to_string());
            metric(&mut cols[3], "Publication Range", range);
        });
        ui.horizontal(|ui: &mut Ui| {
            if let Some(n) = summary.papers_with_full_text {
                ui.label(format!("Papers with full text: {n}"));
                ui.separator();
            }
            ui.label(format!("Unique sources: {}", summary.unique_sources));
            ui.separator();
            ui.label(format!(
                "Average abstract length: {:.1} words",
                summary.mean_abstract_words
            ));
        });
    }

    ui.add_space(8.0);
    ui.strong("Data Preview");
    if let Some(table) = state.session.table() {
        let preview: Vec<usize> = (0..table.len().min(10)).collect();
        papers_table(ui, &FilteredView::from_indices(table, &preview));
    }

    ui.add_space(8.0);
    ui.strong("Missing Values Analysis");
    if state.missing.is_empty() {
        ui.label("No missing values in the dataset!");
    } else {
        counts_grid(ui, "missing_grid", &state.missing, "Column", "Missing");
    }
}

fn trends(ui: &mut Ui, state: &mut AppState) {
    let Some((min_year, max_year)) = state.session.table().and_then(|t| t.year_bounds()) else {
        return;
    };

    let mut changed = false;
    ui.horizontal(|ui: &mut Ui| {
        let (lo, hi) = &mut state.trend_range;
        changed |= ui
            .add(egui::Slider::new(lo, min_year..=max_year).text("From"))
            .changed();
        changed |= ui
            .add(egui::Slider::new(hi, min_year..=max_year).text("To"))
            .changed();

        egui::ComboBox::from_id_salt("chart_style")
            .selected_text(state.chart_style.label())
            .show_ui(ui, |ui: &mut Ui| {
                for style in ChartStyle::ALL {
                    ui.selectable_value(&mut state.chart_style, style, style.label());
                }
            });
    });
    if changed {
        state.refresh_trends();
    }

    let (lo, hi) = state.trend_range;
    ui.label(format!("Publications by Year ({lo}-{hi})"));
    if state.trend_counts.is_empty() {
        ui.label("No papers in the selected range.");
    } else {
        plot::year_chart(ui, &state.trend_counts, state.chart_style);
    }
}

fn journals(ui: &mut Ui, state: &mut AppState) {
    let mut changed = false;
    ui.horizontal(|ui: &mut Ui| {
        changed |= ui
            .add(egui::Slider::new(&mut state.top_journals, 5..=25).text("Top journals"))
            .changed();
        changed |= ui
            .add(
                egui::Slider::new(&mut state.min_journal_papers, 1..=100)
                    .text("Minimum papers per journal"),
            )
            .changed();
    });
    if changed {
        state.refresh_journals();
    }

    ui.label(format!(
        "Top {} Journals by Publication Count",
        state.journal_counts.len()
    ));
    if state.journal_counts.is_empty() {
        ui.label("No journal reaches the minimum paper count.");
        return;
    }
    plot::ranked_bars(
        ui,
        "journal_chart",
        &state.journal_counts,
        None,
        "Number of Publications",
    );
    counts_grid(ui, "journal_grid", &state.journal_counts, "Journal", "Papers");
}

fn content(ui: &mut Ui, state: &mut AppState) {
    ui.strong("Word Frequency Analysis");
    let mut changed = false;
    ui.horizontal(|ui: &mut Ui| {
        for column in [TextColumn::Title, TextColumn::Abstract] {
            changed |= ui
                .selectable_value(&mut state.text_column, column, column.label())
                .changed();
        }
        ui.separator();
        changed |= ui
            .add(egui::Slider::new(&mut state.top_words, 10..=50).text("Number of top words"))
            .changed();
    });
    ui.label("Additional stop words (comma-separated)");
    changed |= ui
        .add(egui::TextEdit::multiline(&mut state.stop_words_text).desired_rows(2))
        .changed();
    if changed {
        state.refresh_words();
    }

    if state.word_counts.is_empty() {
        ui.label("No words left after removing stop words.");
    } else {
        plot::ranked_bars(ui, "word_chart", &state.word_counts, None, "Frequency");
        counts_grid(ui, "word_grid", &state.word_counts, "Word", "Count");
    }

    ui.add_space(8.0);
    ui.strong("Abstract Length Analysis");
    plot::histogram(ui, &state.abstract_lengths, HISTOGRAM_BINS);
    if let Some(stats) = state.abstract_stats {
        ui.columns(3, |cols| {
            metric(&mut cols[0], "Mean Length", format!("{:.1} words", stats.mean));
            metric(&mut cols[1], "Median Length", format!("{:.1} words", stats.median));
            metric(&mut cols[2], "Max Length", format!("{} words", stats.max));
        });
    }
}

fn sources(ui: &mut Ui, state: &mut AppState) {
    if state.source_counts.is_empty() {
        ui.label("Source information not available in this dataset.");
        return;
    }
    ui.label("Top Sources by Paper Count");
    plot::ranked_bars(
        ui,
        "source_chart",
        &state.source_counts,
        state.source_colors.as_ref(),
        "Number of Papers",
    );

    let total = state.source_counts.total().max(1) as f64;
    egui::Grid::new("source_grid").striped(true).show(ui, |ui: &mut Ui| {
        ui.strong("Source");
        ui.strong("Papers");
        ui.strong("Share");
        ui.end_row();
        for (source, n) in &state.source_counts {
            let mut text = RichText::new(source);
            if let Some(colors) = &state.source_colors {
                text = text.color(colors.color_for(source));
            }
            ui.label(text);
            ui.label(n.to_string());
            ui.label(format!("{:.1}%", 100.0 * *n as f64 / total));
            ui.end_row();
        }
    });
}

fn explorer(ui: &mut Ui, state: &mut AppState) {
    ui.strong("Filter and Explore Papers");

    let mut toggled_year = None;
    let mut toggled_journal = None;
    ui.columns(3, |cols| {
        cols[0].label("Filter by Year");
        cols[0].horizontal_wrapped(|ui: &mut Ui| {
            for &year in &state.year_options {
                let mut checked = state.filters.years.contains(&year);
                if ui.checkbox(&mut checked, year.to_string()).changed() {
                    toggled_year = Some(year);
                }
            }
        });

        cols[1].label("Filter by Journal");
        ScrollArea::vertical()
            .id_salt("journal_filter")
            .max_height(160.0)
            .show(&mut cols[1], |ui: &mut Ui| {
                for journal in &state.journal_options {
                    let mut checked = state.filters.journals.contains(journal);
                    if ui.checkbox(&mut checked, journal.as_str()).changed() {
                        toggled_journal = Some(journal.clone());
                    }
                }
            });

        cols[2].label("Search in Titles/Abstracts");
        if cols[2]
            .text_edit_singleline(&mut state.filters.keyword)
            .changed()
        {
            state.refilter();
        }
        if cols[2].button("Clear filters").clicked() {
            state.clear_filters();
        }
    });
    if let Some(year) = toggled_year {
        state.toggle_year(year);
    }
    if let Some(journal) = toggled_journal {
        state.toggle_journal(&journal);
    }

    ui.add_space(8.0);
    ui.label(format!(
        "Found {} papers matching your criteria",
        state.visible_indices.len()
    ));
    if state.visible_indices.is_empty() {
        ui.label("No papers match your current filters. Try adjusting your criteria.");
        return;
    }

    if ui.button("Download Filtered Results as CSV").clicked() {
        save_file_dialog(state);
    }

    let limit = state.session.config().preview_rows;
    if let Some(table) = state.session.table() {
        let shown: Vec<usize> = state.visible_indices.iter().copied().take(limit).collect();
        papers_table(ui, &FilteredView::from_indices(table, &shown));
    }
}

// ---------------------------------------------------------------------------
// Shared widgets
// ---------------------------------------------------------------------------

/// Title, journal, year and abstract length of each paper in `view`.
fn papers_table(ui: &mut Ui, view: &FilteredView<'_>) {
    TableBuilder::new(ui)
        .striped(true)
        .max_scroll_height(360.0)
        .column(Column::initial(420.0).at_least(120.0).clip(true).resizable(true))
        .column(Column::initial(220.0).clip(true).resizable(true))
        .column(Column::auto())
        .column(Column::remainder())
        .header(20.0, |mut header| {
            header.col(|ui| {
                ui.strong("Title");
            });
            header.col(|ui| {
                ui.strong("Journal");
            });
            header.col(|ui| {
                ui.strong("Year");
            });
            header.col(|ui| {
                ui.strong("Abstract words");
            });
        })
        .body(|body| {
            body.rows(18.0, view.len(), |mut row| {
                let Some(paper) = view.get(row.index()) else {
                    return;
                };
                row.col(|ui| {
                    ui.label(paper.paper.title.as_deref().unwrap_or(""));
                });
                row.col(|ui| {
                    ui.label(paper.journal_clean.as_str());
                });
                row.col(|ui| {
                    ui.label(paper.publication_year.to_string());
                });
                row.col(|ui| {
                    ui.label(paper.abstract_word_count.to_string());
                });
            });
        });
}

fn counts_grid(ui: &mut Ui, id: &str, counts: &FrequencyTable<String>, key: &str, value: &str) {
    egui::Grid::new(id).striped(true).show(ui, |ui: &mut Ui| {
        ui.strong(key);
        ui.strong(value);
        ui.end_row();
        for (k, n) in counts {
            ui.label(k.as_str());
            ui.label(n.to_string());
            ui.end_row();
        }
    });
}
