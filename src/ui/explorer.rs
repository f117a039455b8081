//! "Explore Dataset": the modeler's sandbox.

use std::collections::BTreeMap;

use eframe::egui::{RichText, ScrollArea, Slider, Ui};
use egui_extras::{Column as TableColumn, TableBuilder};

use super::charts::{self, BoxChart, Heatmap, ScatterChart, Series};
use super::insights::groups_by;
use super::widgets::{self, select_column, select_optional_column, significant, tab_bar, thousands};
use crate::color::{ColorMap, ColorScale};
use crate::data::model::{CellValue, Dataset};
use crate::data::schema;
use crate::state::{AppState, DerivedCache, ExplorerState, ExplorerTab};
use crate::stats::StatsError;
use crate::stats::binning::{HistogramBin, histogram};
use crate::stats::correlation::{Correlation, pearson};
use crate::stats::summary::ColumnSummary;

const HISTOGRAM_BINS: usize = 40;

pub fn show(ui: &mut Ui, state: &mut AppState) {
    ui.label(RichText::new("ReproSight: Modeler's Sandbox").size(28.0).strong());
    ui.label(RichText::new("Interactive EDA Toolkit for Deep-Dive Analysis").size(17.0));
    ui.add_space(6.0);

    let AppState {
        dataset,
        explorer,
        derived,
        ..
    } = state;
    let Some(ds) = dataset.as_ref() else {
        charts::no_data(ui, "this view (open a file via File → Open…)");
        return;
    };

    tab_bar(
        ui,
        &mut explorer.tab,
        &[
            (ExplorerTab::Overview, "Data Overview"),
            (ExplorerTab::Univariate, "Univariate Explorer"),
            (ExplorerTab::Bivariate, "Bivariate Explorer"),
            (ExplorerTab::Correlation, "Correlation Matrix"),
        ],
    );

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| match explorer.tab {
            ExplorerTab::Overview => overview(ui, ds, derived),
            ExplorerTab::Univariate => univariate(ui, ds, explorer),
            ExplorerTab::Bivariate => bivariate(ui, ds, explorer),
            ExplorerTab::Correlation => correlation(ui, ds, explorer, derived),
        });
}

fn subheader(ui: &mut Ui, text: &str) {
    ui.add_space(8.0);
    ui.label(RichText::new(text).size(18.0).strong());
}

// ---------------------------------------------------------------------------
// Chart data
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Univariate {
    Histogram(Vec<HistogramBin>),
    Counts(Vec<(String, f64)>),
}

pub(crate) fn univariate_chart(ds: &Dataset, column: &str) -> Option<Univariate> {
    let col = ds.column(column)?;
    Some(if col.is_numeric() {
        Univariate::Histogram(histogram(&col.non_missing_f64(), HISTOGRAM_BINS))
    } else {
        Univariate::Counts(
            col.value_counts()
                .into_iter()
                .map(|(v, n)| (v.to_string(), n as f64))
                .collect(),
        )
    })
}

/// What the bivariate tab draws for a pair of columns.
#[derive(Debug, Clone)]
pub(crate) enum Bivariate {
    Scatter {
        chart: ScatterChart,
        correlation: Result<Correlation, StatsError>,
    },
    Boxes(BoxChart),
    Crosstab(Heatmap),
}

pub(crate) fn bivariate_chart(
    ds: &Dataset,
    x: &str,
    y: &str,
    color: Option<&str>,
) -> Option<Bivariate> {
    let xc = ds.column(x)?;
    let yc = ds.column(y)?;

    Some(match (xc.is_numeric(), yc.is_numeric()) {
        (true, true) => {
            let xs = xc.numeric();
            let ys = yc.numeric();
            let chart = match color.and_then(|c| ds.column(c)) {
                Some(cc) => {
                    let cmap = ColorMap::new(&cc.name, &cc.unique_values());
                    let mut groups: BTreeMap<&CellValue, Vec<[f64; 2]>> = BTreeMap::new();
                    for ((px, py), key) in xs.iter().zip(&ys).zip(&cc.values) {
                        if let (Some(px), Some(py)) = (px, py) {
                            groups.entry(key).or_default().push([*px, *py]);
                        }
                    }
                    ScatterChart {
                        title: format!("{x} vs. {y}"),
                        x_label: x.to_string(),
                        y_label: y.to_string(),
                        series: groups
                            .into_iter()
                            .map(|(key, points)| Series {
                                name: format!("{} = {key}", cmap.column),
                                color: cmap.color_for(key),
                                points,
                            })
                            .collect(),
                        trendline: None,
                    }
                }
                None => ScatterChart::from_columns(format!("{x} vs. {y}"), x, y, &xs, &ys),
            };
            Bivariate::Scatter {
                chart,
                correlation: pearson(&xs, &ys),
            }
        }
        (true, false) | (false, true) => {
            let (cat, num) = if xc.is_numeric() { (y, x) } else { (x, y) };
            Bivariate::Boxes(BoxChart {
                title: format!("Distribution of {num} by {cat}"),
                category_label: cat.to_string(),
                value_label: num.to_string(),
                groups: groups_by(ds, cat, num, None)?,
                horizontal: false,
            })
        }
        (false, false) => {
            let x_values: Vec<CellValue> = xc.unique_values().into_iter().collect();
            let y_values: Vec<CellValue> = yc.unique_values().into_iter().collect();
            let mut counts = vec![vec![0.0; x_values.len()]; y_values.len()];
            for (xv, yv) in xc.values.iter().zip(&yc.values) {
                let (Ok(j), Ok(i)) = (x_values.binary_search(xv), y_values.binary_search(yv))
                else {
                    continue;
                };
                counts[i][j] += 1.0;
            }
            let max = counts.iter().flatten().copied().fold(0.0, f64::max);
            Bivariate::Crosstab(Heatmap {
                title: format!("Counts of {y} by {x}"),
                row_labels: y_values.iter().map(CellValue::to_string).collect(),
                col_labels: x_values.iter().map(CellValue::to_string).collect(),
                values: counts,
                scale: ColorScale::sequential(0.0, max.max(1.0)),
                decimals: Some(0),
            })
        }
    })
}

// ---------------------------------------------------------------------------
// Tabs
// ---------------------------------------------------------------------------

fn overview(ui: &mut Ui, ds: &Dataset, derived: &mut DerivedCache) {
    subheader(ui, "Shape and Size");
    let (rows, cols) = ds.shape();
    ui.columns(2, |c: &mut [Ui]| {
        widgets::metric(&mut c[0], "Number of Rows", &thousands(rows));
        widgets::metric(&mut c[1], "Number of Columns", &cols.to_string());
    });

    subheader(ui, "Raw Data Inspector");
    raw_table(ui, ds);

    subheader(ui, "Missing Values Heatmap");
    let bands = derived.missing_bands(ds);
    if ds.n_rows() > bands.labels.len() {
        ui.label(
            RichText::new("Rows are pooled into bands; darker cells hold a larger share of missing values.")
                .weak(),
        );
    }
    charts::heatmap(
        ui,
        "missing_values",
        &Heatmap {
            title: "Heatmap of Missing Values".to_string(),
            row_labels: bands.labels.clone(),
            col_labels: ds.column_names(),
            values: bands.fractions.clone(),
            scale: ColorScale::sequential(0.0, 1.0),
            decimals: None,
        },
    );

    subheader(ui, "Summary Statistics (Numerical Columns)");
    let summaries = derived.summaries(ds);
    if ui.button("Copy as JSON").clicked() {
        match serde_json::to_string_pretty(summaries) {
            Ok(json) => ui.ctx().copy_text(json),
            Err(e) => log::error!("could not serialise summaries: {e}"),
        }
    }
    summary_table(ui, summaries);
}

fn raw_table(ui: &mut Ui, ds: &Dataset) {
    let names = ds.column_names();
    ScrollArea::horizontal()
        .id_salt("raw_table_scroll")
        .show(ui, |ui: &mut Ui| {
            ui.push_id("raw_table", |ui: &mut Ui| {
                TableBuilder::new(ui)
                    .striped(true)
                    .resizable(true)
                    .max_scroll_height(320.0)
                    .column(TableColumn::auto().at_least(40.0))
                    .columns(TableColumn::auto().at_least(70.0).clip(true), names.len())
                    .header(20.0, |mut header| {
                        header.col(|ui: &mut Ui| {
                            ui.strong("#");
                        });
                        for name in &names {
                            header.col(|ui: &mut Ui| {
                                ui.strong(name.as_str());
                            });
                        }
                    })
                    .body(|body| {
                        body.rows(18.0, ds.n_rows(), |mut row| {
                            let r = row.index();
                            row.col(|ui: &mut Ui| {
                                ui.label(r.to_string());
                            });
                            for c in 0..names.len() {
                                row.col(|ui: &mut Ui| {
                                    ui.label(ds.cell(r, c).to_string());
                                });
                            }
                        });
                    });
            });
        });
}

fn summary_table(ui: &mut Ui, summaries: &[ColumnSummary]) {
    if summaries.is_empty() {
        charts::no_data(ui, "numerical columns");
        return;
    }
    ScrollArea::horizontal()
        .id_salt("summary_table_scroll")
        .show(ui, |ui: &mut Ui| {
            ui.push_id("summary_table", |ui: &mut Ui| {
                TableBuilder::new(ui)
                    .striped(true)
                    .max_scroll_height(360.0)
                    .column(TableColumn::auto().at_least(140.0))
                    .columns(TableColumn::auto().at_least(80.0), ColumnSummary::HEADERS.len() - 1)
                    .header(20.0, |mut header| {
                        for h in ColumnSummary::HEADERS {
                            header.col(|ui: &mut Ui| {
                                ui.strong(h);
                            });
                        }
                    })
                    .body(|body| {
                        body.rows(18.0, summaries.len(), |mut row| {
                            let s = &summaries[row.index()];
                            row.col(|ui: &mut Ui| {
                                ui.label(s.column.as_str());
                            });
                            row.col(|ui: &mut Ui| {
                                ui.label(s.count.to_string());
                            });
                            for v in s.stats() {
                                row.col(|ui: &mut Ui| {
                                    ui.label(if v.is_nan() {
                                        "NaN".to_string()
                                    } else {
                                        format!("{v:.4}")
                                    });
                                });
                            }
                        });
                    });
            });
        });
}

fn univariate(ui: &mut Ui, ds: &Dataset, sel: &mut ExplorerState) {
    subheader(ui, "Univariate Explorer");
    select_column(
        ui,
        "univariate_column",
        "Select a column to inspect",
        &ds.column_names(),
        &mut sel.univariate_column,
    );
    let Some(column) = &sel.univariate_column else {
        return;
    };
    match univariate_chart(ds, column) {
        Some(Univariate::Histogram(bins)) => charts::histogram(
            ui,
            "univariate_histogram",
            &format!("Distribution of {column}"),
            column,
            &bins,
        ),
        Some(Univariate::Counts(counts)) => charts::bar_chart(
            ui,
            "univariate_counts",
            &format!("Category Counts for {column}"),
            column,
            "count",
            &counts,
        ),
        None => charts::no_data(ui, column),
    }
}

fn bivariate(ui: &mut Ui, ds: &Dataset, sel: &mut ExplorerState) {
    subheader(ui, "Bivariate Relationship Explorer");

    let all = ds.column_names();
    let non_metal: Vec<String> = all
        .iter()
        .filter(|c| !schema::is_metal_column(c))
        .cloned()
        .collect();
    let categorical = ds.categorical_column_names();

    ui.columns(3, |cols: &mut [Ui]| {
        select_column(&mut cols[0], "bivariate_x", "Select X-axis variable", &all, &mut sel.bivariate_x);
        select_column(
            &mut cols[1],
            "bivariate_y",
            "Select Y-axis variable",
            &non_metal,
            &mut sel.bivariate_y,
        );
        select_optional_column(
            &mut cols[2],
            "bivariate_color",
            "Select color variable (optional)",
            &categorical,
            &mut sel.bivariate_color,
        );
    });

    let (Some(x), Some(y)) = (&sel.bivariate_x, &sel.bivariate_y) else {
        return;
    };
    match bivariate_chart(ds, x, y, sel.bivariate_color.as_deref()) {
        Some(Bivariate::Scatter { chart, correlation }) => {
            subheader(ui, &format!("Scatter Plot: {x} vs. {y}"));
            charts::scatter(ui, "bivariate_scatter", &chart);
            match correlation {
                Ok(c) => {
                    widgets::info(
                        ui,
                        "",
                        &format!(
                            "Pearson Correlation: {:.3}\nP-value: {}\n(n = {} overlapping rows)",
                            c.r,
                            significant(c.p_value, 3),
                            c.n
                        ),
                    );
                    ui.label(
                        "A low p-value (e.g., < 0.05) suggests a statistically significant linear \
                         relationship.",
                    );
                }
                Err(StatsError::NotEnoughData { .. }) => {
                    widgets::warning(ui, "Not enough overlapping data to calculate correlation.")
                }
                Err(e) => widgets::warning(ui, &format!("Correlation is undefined: {e}.")),
            }
        }
        Some(Bivariate::Boxes(chart)) => charts::box_plot(ui, "bivariate_box", &chart),
        Some(Bivariate::Crosstab(map)) => charts::heatmap(ui, "bivariate_crosstab", &map),
        None => charts::no_data(ui, &format!("{x} vs. {y}")),
    }
}

fn correlation(ui: &mut Ui, ds: &Dataset, sel: &mut ExplorerState, derived: &mut DerivedCache) {
    subheader(ui, "Correlation Matrix");
    ui.label("Visualize the linear relationships between all numerical variables.");

    ui.add(
        Slider::new(&mut sel.corr_threshold, 0.0..=1.0)
            .step_by(0.05)
            .text("Filter by absolute correlation strength"),
    );
    let threshold = sel.corr_threshold;
    let matrix = derived.numeric_correlation(ds).threshold_mask(threshold);
    if matrix.is_empty() {
        widgets::warning(ui, "The dataset has no numerical columns.");
        return;
    }
    charts::heatmap(
        ui,
        "correlation_matrix",
        &Heatmap {
            title: format!("Correlation Heatmap (Threshold > {threshold:.2})"),
            row_labels: matrix.rows,
            col_labels: matrix.cols,
            values: matrix.values,
            scale: ColorScale::diverging(-1.0, 1.0),
            decimals: Some(2),
        },
    );
}
