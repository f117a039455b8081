use std::ops::RangeInclusive;

use eframe::egui::{Color32, RichText, Stroke, Ui};
use egui_plot::{
    Bar, BarChart, BoxElem, BoxPlot, BoxSpread, GridInput, GridMark, Legend, Line, LineStyle,
    Plot, PlotPoint, PlotPoints, Points, Polygon, Text,
};

use crate::color::{ColorScale, generate_palette};
use crate::stats::binning::HistogramBin;
use crate::stats::density::Kde;
use crate::stats::regression::Trendline;
use crate::stats::summary::box_summary;

pub const CHART_HEIGHT: f32 = 380.0;
const TRENDLINE_COLOR: Color32 = Color32::RED;
const BAR_COLOR: Color32 = Color32::from_rgb(99, 110, 250);

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

fn chart_title(ui: &mut Ui, title: &str) {
    ui.add_space(6.0);
    ui.label(RichText::new(title).size(16.0).strong());
}

/// Placeholder shown instead of a chart when a selection leaves no rows.
pub fn no_data(ui: &mut Ui, what: &str) {
    ui.add_space(6.0);
    ui.label(RichText::new(format!("No data to display for {what}.")).italics().weak());
}

/// Axis formatter that prints `labels[i]` at integer position `i`.
/// With `negate`, position `-i` maps to `labels[i]` (heatmap rows top-down).
fn category_formatter(
    labels: Vec<String>,
    negate: bool,
) -> impl Fn(GridMark, &RangeInclusive<f64>) -> String {
    move |mark: GridMark, _range: &RangeInclusive<f64>| {
        let v = if negate { -mark.value } else { mark.value };
        let idx = v.round();
        if (v - idx).abs() > 1e-6 || idx < 0.0 {
            return String::new();
        }
        labels.get(idx as usize).cloned().unwrap_or_default()
    }
}

/// Grid lines on every integer, so each category gets its label.
fn unit_grid(input: GridInput) -> Vec<GridMark> {
    let (min, max) = input.bounds;
    let lo = min.ceil() as i64;
    let hi = max.floor() as i64;
    // Zoomed far out: labels would overlap anyway.
    if hi - lo > 200 {
        return Vec::new();
    }
    (lo..=hi)
        .map(|v| GridMark {
            value: v as f64,
            step_size: 1.0,
        })
        .collect()
}

/// Deterministic jitter in [-1, 1] for point index `i`.
fn jitter(i: usize) -> f64 {
    // splitmix64 finalizer
    let mut z = (i as u64).wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^= z >> 31;
    (z >> 11) as f64 / (1u64 << 53) as f64 * 2.0 - 1.0
}

// ---------------------------------------------------------------------------
// Scatter (+ OLS trendline)
// ---------------------------------------------------------------------------

/// One coloured group of scatter points.
#[derive(Debug, Clone)]
pub struct Series {
    pub name: String,
    pub color: Color32,
    pub points: Vec<[f64; 2]>,
}

#[derive(Debug, Clone)]
pub struct ScatterChart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub series: Vec<Series>,
    pub trendline: Option<Trendline>,
}

impl ScatterChart {
    /// Single-colour scatter from row-aligned columns; incomplete pairs are dropped.
    pub fn from_columns(
        title: impl Into<String>,
        x_label: impl Into<String>,
        y_label: impl Into<String>,
        xs: &[Option<f64>],
        ys: &[Option<f64>],
    ) -> Self {
        let points = xs
            .iter()
            .zip(ys)
            .filter_map(|(x, y)| Some([(*x)?, (*y)?]))
            .collect();
        ScatterChart {
            title: title.into(),
            x_label: x_label.into(),
            y_label: y_label.into(),
            series: vec![Series {
                name: "observations".to_string(),
                color: BAR_COLOR,
                points,
            }],
            trendline: None,
        }
    }

    pub fn with_trendline(mut self, trendline: Option<Trendline>) -> Self {
        self.trendline = trendline;
        self
    }

    pub fn point_count(&self) -> usize {
        self.series.iter().map(|s| s.points.len()).sum()
    }

    fn x_range(&self) -> Option<(f64, f64)> {
        let xs = self.series.iter().flat_map(|s| s.points.iter().map(|p| p[0]));
        let (min, max) = xs.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), x| {
            (lo.min(x), hi.max(x))
        });
        (min <= max).then_some((min, max))
    }
}

pub fn scatter(ui: &mut Ui, id: &str, chart: &ScatterChart) {
    chart_title(ui, &chart.title);
    if chart.point_count() == 0 {
        no_data(ui, &chart.title);
        return;
    }

    Plot::new(id)
        .height(CHART_HEIGHT)
        .legend(Legend::default())
        .x_axis_label(chart.x_label.clone())
        .y_axis_label(chart.y_label.clone())
        .allow_scroll(false)
        .allow_boxed_zoom(true)
        .show(ui, |plot_ui| {
            for s in &chart.series {
                let pts: PlotPoints = s.points.iter().copied().collect();
                plot_ui.points(Points::new(pts).color(s.color).radius(2.5).name(&s.name));
            }
            if let (Some(t), Some((lo, hi))) = (&chart.trendline, chart.x_range()) {
                plot_ui.line(
                    Line::new(PlotPoints::from(t.segment(lo, hi).to_vec()))
                        .color(TRENDLINE_COLOR)
                        .width(2.0)
                        .name(format!(
                            "OLS trendline (R² = {:.3}, n = {})",
                            t.r_squared, t.n
                        )),
                );
            }
        });
}

// ---------------------------------------------------------------------------
// Box plots
// ---------------------------------------------------------------------------

/// Values of one category for box or violin charts.
#[derive(Debug, Clone)]
pub struct Group {
    pub label: String,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone)]
pub struct BoxChart {
    pub title: String,
    pub category_label: String,
    pub value_label: String,
    /// Drawn in this order.
    pub groups: Vec<Group>,
    /// Categories on the Y axis, values on X.
    pub horizontal: bool,
}

pub fn box_plot(ui: &mut Ui, id: &str, chart: &BoxChart) {
    chart_title(ui, &chart.title);
    if chart.groups.iter().all(|g| g.values.is_empty()) {
        no_data(ui, &chart.title);
        return;
    }

    let colors = generate_palette(chart.groups.len());
    let labels: Vec<String> = chart.groups.iter().map(|g| g.label.clone()).collect();

    let (x_label, y_label) = if chart.horizontal {
        (&chart.value_label, &chart.category_label)
    } else {
        (&chart.category_label, &chart.value_label)
    };

    let mut plot = Plot::new(id)
        .height(CHART_HEIGHT)
        .legend(Legend::default())
        .x_axis_label(x_label.clone())
        .y_axis_label(y_label.clone())
        .allow_scroll(false);
    plot = if chart.horizontal {
        plot.y_axis_formatter(category_formatter(labels, false))
            .y_grid_spacer(unit_grid)
    } else {
        plot.x_axis_formatter(category_formatter(labels, false))
            .x_grid_spacer(unit_grid)
    };

    plot.show(ui, |plot_ui| {
        for (i, (group, color)) in chart.groups.iter().zip(&colors).enumerate() {
            let Some(b) = box_summary(&group.values) else {
                continue;
            };
            let pos = i as f64;
            let elem = BoxElem::new(
                pos,
                BoxSpread::new(b.lower_whisker, b.q1, b.median, b.q3, b.upper_whisker),
            )
            .name(format!("{} (n = {})", group.label, b.n))
            .box_width(0.5)
            .whisker_width(0.25)
            .fill(color.gamma_multiply(0.4))
            .stroke(Stroke::new(1.5, *color));

            let mut boxes = BoxPlot::new(vec![elem]).name(&group.label).color(*color);
            if chart.horizontal {
                boxes = boxes.horizontal();
            }
            plot_ui.box_plot(boxes);

            if !b.outliers.is_empty() {
                let pts: PlotPoints = b
                    .outliers
                    .iter()
                    .map(|&v| if chart.horizontal { [v, pos] } else { [pos, v] })
                    .collect();
                plot_ui.points(Points::new(pts).color(*color).radius(2.0).name(&group.label));
            }
        }
    });
}

// ---------------------------------------------------------------------------
// Raincloud (violin + box + jittered points)
// ---------------------------------------------------------------------------

const VIOLIN_HALF_WIDTH: f64 = 0.3;
const RAIN_OFFSET: f64 = 0.42;

pub fn raincloud(ui: &mut Ui, id: &str, title: &str, x_label: &str, y_label: &str, groups: &[Group]) {
    chart_title(ui, title);
    if groups.iter().all(|g| g.values.is_empty()) {
        no_data(ui, title);
        return;
    }

    let colors = generate_palette(groups.len());
    let labels: Vec<String> = groups.iter().map(|g| g.label.clone()).collect();

    Plot::new(id)
        .height(CHART_HEIGHT)
        .x_axis_label(x_label.to_string())
        .y_axis_label(y_label.to_string())
        .x_axis_formatter(category_formatter(labels, false))
        .x_grid_spacer(unit_grid)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for (i, (group, color)) in groups.iter().zip(&colors).enumerate() {
                let center = i as f64;

                if let Some(kde) = Kde::new(&group.values) {
                    let curve = kde.curve(80);
                    let peak = curve.iter().map(|p| p[1]).fold(0.0, f64::max);
                    if peak > 0.0 {
                        let scale = VIOLIN_HALF_WIDTH / peak;
                        let right = curve.iter().map(|p| [center + p[1] * scale, p[0]]);
                        let left = curve.iter().rev().map(|p| [center - p[1] * scale, p[0]]);
                        let outline: PlotPoints = right.chain(left).collect();
                        plot_ui.polygon(
                            Polygon::new(outline)
                                .fill_color(color.gamma_multiply(0.35))
                                .stroke(Stroke::new(1.0, *color))
                                .name(&group.label),
                        );
                    }
                }

                if let Some(b) = box_summary(&group.values) {
                    plot_ui.box_plot(
                        BoxPlot::new(vec![BoxElem::new(
                            center,
                            BoxSpread::new(b.lower_whisker, b.q1, b.median, b.q3, b.upper_whisker),
                        )
                        .box_width(0.08)
                        .whisker_width(0.0)
                        .fill(Color32::WHITE)
                        .stroke(Stroke::new(1.0, *color))])
                        .name(&group.label),
                    );
                    plot_ui.line(
                        Line::new(PlotPoints::from(vec![
                            [center - VIOLIN_HALF_WIDTH, b.mean],
                            [center + VIOLIN_HALF_WIDTH, b.mean],
                        ]))
                        .color(*color)
                        .style(LineStyle::dashed_dense())
                        .name(format!("{} mean", group.label)),
                    );
                }

                let rain: PlotPoints = group
                    .values
                    .iter()
                    .enumerate()
                    .map(|(j, &v)| [center - RAIN_OFFSET + jitter(j) * 0.05, v])
                    .collect();
                plot_ui.points(Points::new(rain).color(color.gamma_multiply(0.7)).radius(1.5));
            }
        });
}

// ---------------------------------------------------------------------------
// Bar chart & histogram
// ---------------------------------------------------------------------------

/// Bars at categorical positions `0..bars.len()`.
pub fn bar_chart(ui: &mut Ui, id: &str, title: &str, x_label: &str, y_label: &str, bars: &[(String, f64)]) {
    chart_title(ui, title);
    if bars.is_empty() {
        no_data(ui, title);
        return;
    }
    let labels: Vec<String> = bars.iter().map(|(l, _)| l.clone()).collect();
    let bars: Vec<Bar> = bars
        .iter()
        .enumerate()
        .map(|(i, (label, v))| Bar::new(i as f64, *v).width(0.8).name(label))
        .collect();

    Plot::new(id)
        .height(CHART_HEIGHT)
        .x_axis_label(x_label.to_string())
        .y_axis_label(y_label.to_string())
        .x_axis_formatter(category_formatter(labels, false))
        .x_grid_spacer(unit_grid)
        .include_y(0.0)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).color(BAR_COLOR));
        });
}

pub fn histogram(ui: &mut Ui, id: &str, title: &str, x_label: &str, bins: &[HistogramBin]) {
    chart_title(ui, title);
    if bins.is_empty() {
        no_data(ui, title);
        return;
    }
    let bars: Vec<Bar> = bins
        .iter()
        .map(|b| {
            Bar::new(b.center(), b.count as f64)
                .width(b.width())
                .name(format!("[{:.3}, {:.3})", b.start, b.end))
        })
        .collect();

    Plot::new(id)
        .height(CHART_HEIGHT)
        .x_axis_label(x_label.to_string())
        .y_axis_label("count")
        .include_y(0.0)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(
                BarChart::new(bars)
                    .color(BAR_COLOR)
                    .element_formatter(Box::new(|bar, _chart| format!("{}: {}", bar.name, bar.value))),
            );
        });
}

// ---------------------------------------------------------------------------
// Heatmap
// ---------------------------------------------------------------------------

/// Annotated grid; `NaN` cells are left blank.
#[derive(Debug, Clone)]
pub struct Heatmap {
    pub title: String,
    pub row_labels: Vec<String>,
    pub col_labels: Vec<String>,
    /// Row-major, `values[row][col]`.
    pub values: Vec<Vec<f64>>,
    pub scale: ColorScale,
    /// Print cell values with this many decimals; `None` hides the text.
    pub decimals: Option<usize>,
}

/// Above this many cells the value text is dropped to keep frames cheap.
const MAX_ANNOTATED_CELLS: usize = 900;

pub fn heatmap(ui: &mut Ui, id: &str, map: &Heatmap) {
    chart_title(ui, &map.title);
    if map.values.is_empty() || map.col_labels.is_empty() {
        no_data(ui, &map.title);
        return;
    }

    let n_cells = map.row_labels.len() * map.col_labels.len();
    let annotate = map.decimals.filter(|_| n_cells <= MAX_ANNOTATED_CELLS);

    Plot::new(id)
        .height(CHART_HEIGHT.max(24.0 * map.row_labels.len().min(30) as f32))
        .x_axis_formatter(category_formatter(map.col_labels.clone(), false))
        .y_axis_formatter(category_formatter(map.row_labels.clone(), true))
        .x_grid_spacer(unit_grid)
        .y_grid_spacer(unit_grid)
        .show_grid(false)
        .allow_scroll(false)
        .allow_drag(true)
        .show(ui, |plot_ui| {
            for (i, row) in map.values.iter().enumerate() {
                for (j, &v) in row.iter().enumerate() {
                    let Some(fill) = map.scale.color_for(v) else {
                        continue;
                    };
                    let (x, y) = (j as f64, -(i as f64));
                    let cell: PlotPoints = vec![
                        [x - 0.5, y - 0.5],
                        [x + 0.5, y - 0.5],
                        [x + 0.5, y + 0.5],
                        [x - 0.5, y + 0.5],
                    ]
                    .into();
                    plot_ui.polygon(
                        Polygon::new(cell)
                            .fill_color(fill)
                            .stroke(Stroke::new(0.5, Color32::from_gray(200))),
                    );
                    if let Some(decimals) = annotate {
                        plot_ui.text(Text::new(
                            PlotPoint::new(x, y),
                            RichText::new(format!("{v:.decimals$}"))
                                .size(11.0)
                                .color(map.scale.text_color_for(v)),
                        ));
                    }
                }
            }
        });

    color_legend(ui, &map.scale);
}

/// Min / mid / max swatches under a heatmap.
fn color_legend(ui: &mut Ui, scale: &ColorScale) {
    ui.horizontal(|ui: &mut Ui| {
        let mid = (scale.min + scale.max) / 2.0;
        for v in [scale.min, mid, scale.max] {
            if let Some(c) = scale.color_for(v) {
                ui.label(RichText::new("■").color(c).size(18.0));
                ui.label(format!("{v:.2}"));
            }
        }
    });
}
