//! Column names of the survey table and the labels the views derive from them.

use std::fmt;

use super::model::CellValue;

pub const HORMONES: [&str; 3] = ["testosterone", "estradiol", "shbg"];

/// Blood metal concentrations in mass units, offered by every metal selector.
pub const METALS: [&str; 5] = [
    "lead_µg/dL",
    "cadmium_µg/L",
    "mercury_µg/L",
    "selenium_µg/L",
    "manganese_µg/L",
];

/// Every metal-derived column (both unit systems plus sample weights).
pub const ALL_METAL_COLUMNS: [&str; 11] = [
    "lead_µg/dL",
    "cadmium_µg/L",
    "mercury_µg/L",
    "selenium_µg/L",
    "manganese_µg/L",
    "lead_µmol/L",
    "cadmium_nmol/L",
    "mercury_nmol/L",
    "selenium_µmol/L",
    "manganese_nmol/L",
    "Blood metal weights",
];

pub const INFERTILITY: &str = "infertility_1yr";
pub const AGE: &str = "age_years";
pub const REGULAR_PERIODS: &str = "regular_periods";
pub const FIRST_PERIOD_AGE: &str = "first_period_age";
pub const LAST_PERIOD_AGE: &str = "last_period_age";

/// Age band edges for the infertility-by-age chart (right-open bins).
pub const AGE_BIN_EDGES: [f64; 7] = [18.0, 25.0, 30.0, 35.0, 40.0, 45.0, 50.0];
pub const AGE_BIN_LABELS: [&str; 6] = ["18-24", "25-29", "30-34", "35-39", "40-44", "45-50"];

pub fn is_metal_column(name: &str) -> bool {
    ALL_METAL_COLUMNS.contains(&name)
}

/// Upper-case the first character and lower-case the rest.
fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// `"lead_µg/dL"` → `"Blood Lead Concentration"`.
pub fn metal_axis_label(column: &str) -> String {
    let element = column.split('_').next().unwrap_or(column);
    format!("Blood {} Concentration", capitalize(element))
}

/// `"shbg"` → `"Shbg Level"`.
pub fn hormone_axis_label(column: &str) -> String {
    format!("{} Level", capitalize(column))
}

// ---------------------------------------------------------------------------
// Infertility status (questionnaire code → label)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum InfertilityStatus {
    Yes,
    No,
    Unknown,
}

impl InfertilityStatus {
    /// Code 1 means the respondent tried for a year without conceiving, 2 means not.
    pub fn from_cell(cell: &CellValue) -> Self {
        match cell.as_f64() {
            Some(v) if v == 1.0 => InfertilityStatus::Yes,
            Some(v) if v == 2.0 => InfertilityStatus::No,
            _ => InfertilityStatus::Unknown,
        }
    }
}

impl fmt::Display for InfertilityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            InfertilityStatus::Yes => "Yes",
            InfertilityStatus::No => "No",
            InfertilityStatus::Unknown => "Unknown",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metal_labels_use_element_name() {
        assert_eq!(metal_axis_label("lead_µg/dL"), "Blood Lead Concentration");
        assert_eq!(metal_axis_label("manganese_nmol/L"), "Blood Manganese Concentration");
        assert_eq!(metal_axis_label("Blood metal weights"), "Blood Blood metal weights Concentration");
    }

    #[test]
    fn hormone_labels_capitalize_first_letter_only() {
        assert_eq!(hormone_axis_label("shbg"), "Shbg Level");
        assert_eq!(hormone_axis_label("testosterone"), "Testosterone Level");
    }

    #[test]
    fn infertility_codes_map_to_status() {
        assert_eq!(InfertilityStatus::from_cell(&CellValue::Integer(1)), InfertilityStatus::Yes);
        assert_eq!(InfertilityStatus::from_cell(&CellValue::Float(2.0)), InfertilityStatus::No);
        assert_eq!(InfertilityStatus::from_cell(&CellValue::Integer(9)), InfertilityStatus::Unknown);
        assert_eq!(InfertilityStatus::from_cell(&CellValue::Missing), InfertilityStatus::Unknown);
    }

    #[test]
    fn metal_column_membership() {
        assert!(is_metal_column("selenium_µmol/L"));
        assert!(is_metal_column("Blood metal weights"));
        assert!(!is_metal_column("estradiol"));
    }
}
