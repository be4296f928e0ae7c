use eframe::egui::{Color32, Ui};
use egui_plot::{Bar, BarChart, Line, Plot, PlotPoints, Points};

use cord19_explorer::data::aggregate::FrequencyTable;

use crate::color::ColorMap;
use crate::state::ChartStyle;

const CHART_HEIGHT: f32 = 320.0;

// ---------------------------------------------------------------------------
// Publications per year
// ---------------------------------------------------------------------------

/// Render year counts as bars, a line or a filled area.
pub fn year_chart(ui: &mut Ui, counts: &FrequencyTable<i32>, style: ChartStyle) {
    let points: Vec<[f64; 2]> = counts
        .iter()
        .map(|(year, n)| [*year as f64, *n as f64])
        .collect();

    Plot::new("year_chart")
        .height(CHART_HEIGHT)
        .x_axis_label("Year")
        .y_axis_label("Number of Publications")
        .allow_scroll(false)
        .show(ui, |plot_ui| match style {
            ChartStyle::Bar => {
                let bars = points
                    .iter()
                    .map(|[x, y]| Bar::new(*x, *y).width(0.8).name(format!("{x}")))
                    .collect();
                plot_ui.bar_chart(BarChart::new(bars).color(Color32::LIGHT_BLUE));
            }
            ChartStyle::Line => {
                plot_ui.line(Line::new(PlotPoints::from(points.clone())).width(2.0));
                plot_ui.points(Points::new(PlotPoints::from(points.clone())).radius(3.0));
            }
            ChartStyle::Area => {
                plot_ui.line(
                    Line::new(PlotPoints::from(points.clone()))
                        .width(2.0)
                        .fill(0.0_f32),
                );
            }
        });
}

// ---------------------------------------------------------------------------
// Ranked categories (journals, sources, words)
// ---------------------------------------------------------------------------

/// Horizontal bars, first entry on top. Bar labels show on hover.
pub fn ranked_bars(
    ui: &mut Ui,
    id: &str,
    counts: &FrequencyTable<String>,
    colors: Option<&ColorMap>,
    x_label: &str,
) {
    let n = counts.len();
    let bars: Vec<Bar> = counts
        .iter()
        .enumerate()
        .map(|(i, (label, count))| {
            let bar = Bar::new((n - i) as f64, *count as f64)
                .width(0.8)
                .name(label);
            match colors {
                Some(map) => bar.fill(map.color_for(label)),
                None => bar,
            }
        })
        .collect();

    Plot::new(id)
        .height(CHART_HEIGHT.max(18.0 * n as f32))
        .x_axis_label(x_label)
        .show_y(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).horizontal().color(Color32::LIGHT_RED));
        });
}

// ---------------------------------------------------------------------------
// Abstract length histogram
// ---------------------------------------------------------------------------

/// Equal-width bins over `values`: `(start, width, count)` per bin.
pub fn histogram_bins(values: &[usize], bins: usize) -> Vec<(f64, f64, usize)> {
    let (Some(&min), Some(&max)) = (values.iter().min(), values.iter().max()) else {
        return Vec::new();
    };
    if bins == 0 {
        return Vec::new();
    }
    let span = (max - min).max(1) as f64;
    let width = span / bins as f64;
    let mut counts = vec![0usize; bins];
    for &v in values {
        let idx = (((v - min) as f64 / width) as usize).min(bins - 1);
        counts[idx] += 1;
    }
    counts
        .into_iter()
        .enumerate()
        .map(|(i, c)| (min as f64 + i as f64 * width, width, c))
        .collect()
}

pub fn histogram(ui: &mut Ui, values: &[usize], bins: usize) {
    let bars: Vec<Bar> = histogram_bins(values, bins)
        .into_iter()
        .map(|(start, width, count)| Bar::new(start + width / 2.0, count as f64).width(width))
        .collect();

    Plot::new("abstract_lengths")
        .height(CHART_HEIGHT)
        .x_axis_label("Word Count")
        .y_axis_label("Frequency")
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).color(Color32::LIGHT_GREEN));
        });
}
