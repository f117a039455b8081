//! "Key Insights": the narrative view for stakeholders.

use std::collections::BTreeMap;

use eframe::egui::{RichText, ScrollArea, Ui};

use super::charts::{self, BoxChart, Group, Heatmap, ScatterChart};
use super::widgets::{self, select_column, tab_bar};
use crate::color::ColorScale;
use crate::data::filter::{self, filtered_indices};
use crate::data::model::{CellValue, Column, Dataset};
use crate::data::schema::{self, InfertilityStatus, hormone_axis_label, metal_axis_label};
use crate::state::{AppState, InsightsState, InsightsTab};
use crate::stats::binning::{GroupRate, group_rate};
use crate::stats::correlation::CorrelationMatrix;
use crate::stats::regression::ols;

pub fn show(ui: &mut Ui, state: &mut AppState) {
    ui.label(RichText::new("ReproSight: Key Insights").size(28.0).strong());
    ui.label(
        RichText::new("Explore key findings across different aspects of reproductive health.")
            .size(17.0),
    );
    ui.add_space(6.0);

    let AppState {
        dataset, insights, ..
    } = state;
    let Some(ds) = dataset.as_ref() else {
        charts::no_data(ui, "this view (open a file via File → Open…)");
        return;
    };

    tab_bar(
        ui,
        &mut insights.tab,
        &[
            (InsightsTab::Hormones, "Hormonal Patterns"),
            (InsightsTab::Fertility, "Fertility Analysis"),
            (InsightsTab::Menstrual, "Menstrual Cycle Insights"),
            (InsightsTab::Menopause, "Menopause Trends"),
        ],
    );

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| match insights.tab {
            InsightsTab::Hormones => hormonal_patterns(ui, ds, insights),
            InsightsTab::Fertility => fertility(ui, ds, insights),
            InsightsTab::Menstrual => menstrual(ui, ds, insights),
            InsightsTab::Menopause => menopause(ui, ds, insights),
        });
}

fn header(ui: &mut Ui, text: &str) {
    ui.add_space(4.0);
    ui.label(RichText::new(text).size(22.0).strong());
}

fn subheader(ui: &mut Ui, text: &str) {
    ui.add_space(8.0);
    ui.label(RichText::new(text).size(18.0).strong());
}

/// Warn about every expected column the table lacks; true when all are present.
fn require_columns(ui: &mut Ui, ds: &Dataset, names: &[&str]) -> bool {
    let missing: Vec<&str> = names.iter().copied().filter(|n| !ds.has_column(n)).collect();
    if missing.is_empty() {
        return true;
    }
    log::warn!("columns not found in dataset: {missing:?}");
    widgets::warning(
        ui,
        &format!("Column(s) not found in the dataset: {}", missing.join(", ")),
    );
    false
}

fn numeric_at(col: &Column, rows: &[usize]) -> Vec<Option<f64>> {
    rows.iter().map(|&r| col.values[r].as_f64()).collect()
}

// ---------------------------------------------------------------------------
// Chart data
// ---------------------------------------------------------------------------

pub(crate) fn metal_hormone_correlation(ds: &Dataset) -> CorrelationMatrix {
    CorrelationMatrix::compute(ds, &ds.present(&schema::HORMONES), &ds.present(&schema::METALS))
}

/// Metal vs hormone scatter with its OLS trendline.
pub(crate) fn hormone_scatter(ds: &Dataset, metal: &str, hormone: &str) -> Option<ScatterChart> {
    let xs = ds.column(metal)?.numeric();
    let ys = ds.column(hormone)?.numeric();
    Some(
        ScatterChart::from_columns(
            format!("Relationship between {metal} and {hormone}"),
            metal_axis_label(metal),
            hormone_axis_label(hormone),
            &xs,
            &ys,
        )
        .with_trendline(ols(&xs, &ys).ok()),
    )
}

/// Metal values for respondents reporting infertility (Yes) and not (No).
pub(crate) fn infertility_groups(ds: &Dataset, metal: &str) -> Option<Vec<Group>> {
    let status = ds.column(schema::INFERTILITY)?;
    let metal_col = ds.column(metal)?;
    let group = |wanted: InfertilityStatus| Group {
        label: wanted.to_string(),
        values: status
            .values
            .iter()
            .zip(&metal_col.values)
            .filter(|(s, _)| InfertilityStatus::from_cell(s) == wanted)
            .filter_map(|(_, v)| v.as_f64())
            .collect(),
    };
    Some(vec![
        group(InfertilityStatus::Yes),
        group(InfertilityStatus::No),
    ])
}

/// Share of respondents aged 18-49 reporting infertility, per age band.
/// Unknown status counts as not infertile.
pub(crate) fn infertility_rate_by_age(ds: &Dataset) -> Vec<GroupRate> {
    let (Some(age), Some(status)) = (ds.column(schema::AGE), ds.column(schema::INFERTILITY)) else {
        return Vec::new();
    };
    let observations: Vec<(f64, bool)> = filtered_indices(ds, &[filter::reproductive_age()])
        .into_iter()
        .filter_map(|r| {
            let a = age.values[r].as_f64()?;
            Some((a, InfertilityStatus::from_cell(&status.values[r]) == InfertilityStatus::Yes))
        })
        .collect();
    group_rate(&observations, &schema::AGE_BIN_EDGES, &schema::AGE_BIN_LABELS)
}

/// Group the numeric `value` column by the distinct values of `category`,
/// in category order. Rows are restricted to `rows` when given.
pub(crate) fn groups_by(
    ds: &Dataset,
    category: &str,
    value: &str,
    rows: Option<&[usize]>,
) -> Option<Vec<Group>> {
    let cat = ds.column(category)?;
    let value_col = ds.column(value)?;
    let all: Vec<usize>;
    let rows = match rows {
        Some(r) => r,
        None => {
            all = (0..ds.n_rows()).collect();
            &all
        }
    };

    let mut grouped: BTreeMap<&CellValue, Vec<f64>> = BTreeMap::new();
    for &r in rows {
        let key = &cat.values[r];
        if key.is_missing() {
            continue;
        }
        let entry = grouped.entry(key).or_default();
        if let Some(v) = value_col.values[r].as_f64() {
            entry.push(v);
        }
    }
    Some(
        grouped
            .into_iter()
            .map(|(k, values)| Group {
                label: k.to_string(),
                values,
            })
            .collect(),
    )
}

/// Metal per age of first period, plausible ages only, ascending.
pub(crate) fn menarche_groups(ds: &Dataset, metal: &str) -> Option<Vec<Group>> {
    let rows = filtered_indices(ds, &[filter::plausible_menarche()]);
    groups_by(ds, schema::FIRST_PERIOD_AGE, metal, Some(&rows))
}

pub(crate) fn menopause_scatter(ds: &Dataset, metal: &str) -> Option<ScatterChart> {
    let rows = filtered_indices(ds, &filter::plausible_menopause());
    let xs = numeric_at(ds.column(metal)?, &rows);
    let ys = numeric_at(ds.column(schema::LAST_PERIOD_AGE)?, &rows);
    Some(
        ScatterChart::from_columns(
            format!("Relationship between {metal} and Age of Last Period"),
            metal_axis_label(metal),
            "Age of Last Menstrual Period",
            &xs,
            &ys,
        )
        .with_trendline(ols(&xs, &ys).ok()),
    )
}

// ---------------------------------------------------------------------------
// Tabs
// ---------------------------------------------------------------------------

fn hormonal_patterns(ui: &mut Ui, ds: &Dataset, sel: &mut InsightsState) {
    header(ui, "Analyzing Hormonal Patterns");

    let hormones = ds.present(&schema::HORMONES);
    let metals = ds.present(&schema::METALS);

    if hormones.is_empty() || metals.is_empty() {
        log::warn!("hormone or metal columns missing, skipping heatmap");
        widgets::warning(ui, "Some hormone or metal columns were not found in the dataset.");
    } else {
        let m = metal_hormone_correlation(ds);
        charts::heatmap(
            ui,
            "metal_hormone_heatmap",
            &Heatmap {
                title: "Correlation Heatmap: Heavy Metals vs. Hormones".to_string(),
                row_labels: m.rows,
                col_labels: m.cols,
                values: m.values,
                scale: ColorScale::diverging(-1.0, 1.0),
                decimals: Some(2),
            },
        );
        ui.label(
            "This heatmap shows the linear relationship between various heavy metals and key \
             reproductive hormones. Bright red indicates a strong positive correlation, while \
             bright blue indicates a strong negative correlation.",
        );
    }

    subheader(ui, "Metal vs. Hormone Impact Analysis");
    ui.columns(2, |cols: &mut [Ui]| {
        select_column(
            &mut cols[0],
            "metal_scatter_select",
            "Select a metal to plot:",
            &metals,
            &mut sel.scatter_metal,
        );
        select_column(
            &mut cols[1],
            "hormone_scatter_select",
            "Select a hormone to plot:",
            &hormones,
            &mut sel.scatter_hormone,
        );
    });

    if let (Some(metal), Some(hormone)) = (&sel.scatter_metal, &sel.scatter_hormone) {
        if let Some(chart) = hormone_scatter(ds, metal, hormone) {
            charts::scatter(ui, "metal_hormone_scatter", &chart);
        }
    }
}

fn metal_selector(ui: &mut Ui, ds: &Dataset, id: &str, label: &str, selected: &mut Option<String>) {
    let metals = ds.present(&schema::METALS);
    if metals.is_empty() {
        widgets::warning(ui, "None of the heavy metal columns were found in the dataset.");
        return;
    }
    select_column(ui, id, label, &metals, selected);
}

fn fertility(ui: &mut Ui, ds: &Dataset, sel: &mut InsightsState) {
    header(ui, "Infertility Insights");
    subheader(
        ui,
        "How does heavy metal exposure differ between fertile and infertile groups?",
    );

    metal_selector(
        ui,
        ds,
        "fertility_metal_select",
        "Select a heavy metal to compare:",
        &mut sel.fertility_metal,
    );

    if require_columns(ui, ds, &[schema::INFERTILITY]) {
        if let Some(metal) = &sel.fertility_metal {
            if let Some(groups) = infertility_groups(ds, metal) {
                charts::box_plot(
                    ui,
                    "fertility_box",
                    &BoxChart {
                        title: format!(
                            "Distribution of {metal} for Fertile and Infertile Groups"
                        ),
                        category_label: "Reported Infertility (1 Year+)".to_string(),
                        value_label: metal_axis_label(metal),
                        groups,
                        horizontal: false,
                    },
                );
                widgets::info(
                    ui,
                    "How to Interpret This Chart:",
                    "If the box for the \"Infertile\" group is noticeably higher than the \
                     \"Fertile\" group, it suggests a possible link between higher exposure to \
                     that metal and reported infertility.",
                );
            }
        }
    }

    ui.separator();
    subheader(ui, "Infertility Rate by Age Group");
    if !require_columns(ui, ds, &[schema::AGE, schema::INFERTILITY]) {
        return;
    }
    let rates = infertility_rate_by_age(ds);
    if rates.is_empty() {
        widgets::warning(
            ui,
            "Not enough data in the 18-50 age range to display infertility rates by age group.",
        );
        return;
    }
    let bars: Vec<(String, f64)> = rates.into_iter().map(|r| (r.label, r.rate_pct)).collect();
    charts::bar_chart(
        ui,
        "infertility_rate_by_age",
        "Infertility Rate by Age Group",
        "Age Group",
        "Infertility Rate (%)",
        &bars,
    );
    widgets::info(
        ui,
        "How to Interpret This Chart:",
        "This chart shows the percentage of women in each age group who reported experiencing \
         infertility for at least one year.",
    );
}

fn menstrual(ui: &mut Ui, ds: &Dataset, sel: &mut InsightsState) {
    header(ui, "Analysing Menstrual Cycle Patterns");
    subheader(ui, "Comparing Heavy Metal Exposure for Regular vs. Irregular Cycles");

    metal_selector(
        ui,
        ds,
        "menstrual_metal_select",
        "Select a heavy metal to compare:",
        &mut sel.menstrual_metal,
    );
    if require_columns(ui, ds, &[schema::REGULAR_PERIODS]) {
        if let Some(metal) = &sel.menstrual_metal {
            if let Some(groups) = groups_by(ds, schema::REGULAR_PERIODS, metal, None) {
                charts::raincloud(
                    ui,
                    "menstrual_raincloud",
                    &format!("Raincloud Plot: {metal} for Regular vs. Irregular Cycles"),
                    "Regular Menstrual Periods",
                    &metal_axis_label(metal),
                    &groups,
                );
            }
        }
    }

    ui.separator();
    subheader(ui, "How heavy Metal Exposure affects the Age of First Period");
    metal_selector(
        ui,
        ds,
        "menarche_metal_select",
        "Select a heavy metal to investigate:",
        &mut sel.menarche_metal,
    );
    if !require_columns(ui, ds, &[schema::FIRST_PERIOD_AGE]) {
        return;
    }
    let Some(metal) = &sel.menarche_metal else {
        return;
    };
    if let Some(groups) = menarche_groups(ds, metal) {
        charts::box_plot(
            ui,
            "menarche_box",
            &BoxChart {
                title: format!("Distribution of {metal} by Age of First Period"),
                category_label: "Age of First Period".to_string(),
                value_label: metal_axis_label(metal),
                groups,
                horizontal: true,
            },
        );
        widgets::info(
            ui,
            "",
            "This chart helps explore if metal exposure levels differ by the age of first \
             menstruation. You can look for a trend (e.g., rising or falling) in the boxes as age \
             increases.",
        );
    }
}

fn menopause(ui: &mut Ui, ds: &Dataset, sel: &mut InsightsState) {
    header(ui, "Menopause Trends");
    subheader(ui, "Investigating the Link Between Toxin Exposure and Menopause Age");

    metal_selector(
        ui,
        ds,
        "menopause_metal_select",
        "Select a heavy metal to investigate:",
        &mut sel.menopause_metal,
    );
    if !require_columns(ui, ds, &[schema::LAST_PERIOD_AGE]) {
        return;
    }
    let Some(metal) = &sel.menopause_metal else {
        return;
    };
    if let Some(chart) = menopause_scatter(ds, metal) {
        charts::scatter(ui, "menopause_scatter", &chart);
        widgets::info(
            ui,
            "How to Interpret This Chart:",
            "A downward-sloping trendline could suggest an association between higher exposure \
             to a metal and an earlier age of menopause.",
        );
    }
    ui.add_space(4.0);
    ui.label(RichText::new("Ages of 100 or more are survey codes and are excluded.").weak());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn col_f(name: &str, v: &[Option<f64>]) -> Column {
        Column::new(
            name,
            v.iter()
                .map(|x| x.map(CellValue::Float).unwrap_or(CellValue::Missing))
                .collect(),
        )
    }

    fn col_t(name: &str, v: &[Option<&str>]) -> Column {
        Column::new(
            name,
            v.iter()
                .map(|x| x.map(|s| CellValue::Text(s.into())).unwrap_or(CellValue::Missing))
                .collect(),
        )
    }

    fn survey() -> Dataset {
        Dataset::from_columns(vec![
            col_f("age_years", &[Some(20.0), Some(22.0), Some(33.0), Some(55.0), Some(17.0), None]),
            col_f("infertility_1yr", &[Some(1.0), Some(2.0), Some(1.0), Some(1.0), Some(2.0), Some(9.0)]),
            col_f("lead_µg/dL", &[Some(1.0), Some(2.0), Some(3.0), Some(4.0), None, Some(6.0)]),
            col_f("testosterone", &[Some(20.0), Some(25.0), Some(31.0), Some(35.0), Some(40.0), None]),
            col_t("regular_periods", &[Some("Yes"), Some("No"), Some("Yes"), None, Some("No"), Some("Yes")]),
            col_f("first_period_age", &[Some(12.0), Some(13.0), Some(12.0), Some(25.0), Some(7.0), Some(13.0)]),
            col_f("last_period_age", &[None, Some(48.0), Some(999.0), Some(52.0), None, Some(50.0)]),
        ])
        .unwrap()
    }

    #[test]
    fn heatmap_uses_present_columns_only() {
        let m = metal_hormone_correlation(&survey());
        assert_eq!(m.rows, vec!["testosterone"]);
        assert_eq!(m.cols, vec!["lead_µg/dL"]);
        assert!((-1.0..=1.0).contains(&m.values[0][0]));
    }

    #[test]
    fn hormone_scatter_has_trendline() {
        let chart = hormone_scatter(&survey(), "lead_µg/dL", "testosterone").unwrap();
        assert_eq!(chart.point_count(), 4);
        assert!(chart.trendline.is_some());
        assert_eq!(chart.x_label, "Blood Lead Concentration");
        assert_eq!(chart.y_label, "Testosterone Level");
        assert!(hormone_scatter(&survey(), "mercury_µg/L", "testosterone").is_none());
    }

    #[test]
    fn infertility_groups_are_yes_then_no() {
        let groups = infertility_groups(&survey(), "lead_µg/dL").unwrap();
        assert_eq!(groups[0].label, "Yes");
        assert_eq!(groups[0].values, vec![1.0, 3.0, 4.0]);
        assert_eq!(groups[1].label, "No");
        assert_eq!(groups[1].values, vec![2.0]);
    }

    #[test]
    fn infertility_rate_only_counts_reproductive_ages() {
        let rates = infertility_rate_by_age(&survey());
        // 20 (Yes) and 22 (No) → 18-24 at 50 %, 33 (Yes) → 30-34 at 100 %.
        assert_eq!(rates.len(), 2);
        assert_eq!(rates[0].label, "18-24");
        assert_eq!(rates[0].rate_pct, 50.0);
        assert_eq!(rates[0].n, 2);
        assert_eq!(rates[1].label, "30-34");
        assert_eq!(rates[1].rate_pct, 100.0);
    }

    #[test]
    fn regular_period_groups_skip_missing_category() {
        let groups = groups_by(&survey(), "regular_periods", "lead_µg/dL", None).unwrap();
        let labels: Vec<_> = groups.iter().map(|g| g.label.as_str()).collect();
        assert_eq!(labels, ["No", "Yes"]);
        assert_eq!(groups[0].values, vec![2.0]);
        assert_eq!(groups[1].values, vec![1.0, 3.0, 6.0]);
    }

    #[test]
    fn menarche_groups_are_plausible_and_ascending() {
        let groups = menarche_groups(&survey(), "lead_µg/dL").unwrap();
        let labels: Vec<_> = groups.iter().map(|g| g.label.as_str()).collect();
        assert_eq!(labels, ["12.0", "13.0"]);
        assert_eq!(groups[0].values, vec![1.0, 3.0]);
        assert_eq!(groups[1].values, vec![2.0, 6.0]);
    }

    #[test]
    fn menopause_drops_missing_and_coded_ages() {
        let chart = menopause_scatter(&survey(), "lead_µg/dL").unwrap();
        assert_eq!(chart.series[0].points, vec![[2.0, 48.0], [4.0, 52.0], [6.0, 50.0]]);
        assert!(chart.trendline.is_some());
    }

    #[test]
    fn every_metal_selection_builds_without_panicking() {
        let ds = survey();
        for metal in schema::METALS {
            let _ = infertility_groups(&ds, metal);
            let _ = groups_by(&ds, schema::REGULAR_PERIODS, metal, None);
            let _ = menarche_groups(&ds, metal);
            let _ = menopause_scatter(&ds, metal);
            for hormone in schema::HORMONES {
                let _ = hormone_scatter(&ds, metal, hormone);
            }
        }
    }
}
