use super::model::Dataset;
use super::schema;

// ---------------------------------------------------------------------------
// Row predicates on numeric columns
// ---------------------------------------------------------------------------

/// A predicate on one numeric column. A row whose cell is missing fails
/// every predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum RowFilter {
    /// `min <= value < max`, or `min <= value <= max` when `inclusive_max`.
    Range {
        column: String,
        min: f64,
        max: f64,
        inclusive_max: bool,
    },
    /// `value < max`.
    Below { column: String, max: f64 },
    NotMissing { column: String },
}

impl RowFilter {
    pub fn column(&self) -> &str {
        match self {
            RowFilter::Range { column, .. }
            | RowFilter::Below { column, .. }
            | RowFilter::NotMissing { column } => column,
        }
    }

    fn accepts(&self, value: Option<f64>) -> bool {
        let Some(v) = value else {
            return false;
        };
        match self {
            RowFilter::Range {
                min,
                max,
                inclusive_max,
                ..
            } => v >= *min && if *inclusive_max { v <= *max } else { v < *max },
            RowFilter::Below { max, .. } => v < *max,
            RowFilter::NotMissing { .. } => true,
        }
    }
}

/// Reproductive years: `18 <= age_years < 50`.
pub fn reproductive_age() -> RowFilter {
    RowFilter::Range {
        column: schema::AGE.to_string(),
        min: 18.0,
        max: 50.0,
        inclusive_max: false,
    }
}

/// Plausible age at first period: `8 <= first_period_age <= 20`.
pub fn plausible_menarche() -> RowFilter {
    RowFilter::Range {
        column: schema::FIRST_PERIOD_AGE.to_string(),
        min: 8.0,
        max: 20.0,
        inclusive_max: true,
    }
}

/// Age at last period recorded and below the 100+ sentinel codes.
pub fn plausible_menopause() -> Vec<RowFilter> {
    vec![
        RowFilter::NotMissing {
            column: schema::LAST_PERIOD_AGE.to_string(),
        },
        RowFilter::Below {
            column: schema::LAST_PERIOD_AGE.to_string(),
            max: 100.0,
        },
    ]
}

/// Return indices of rows that pass all filters.
///
/// A filter on a column the table does not have matches nothing.
pub fn filtered_indices(dataset: &Dataset, filters: &[RowFilter]) -> Vec<usize> {
    let mut columns = Vec::with_capacity(filters.len());
    for f in filters {
        match dataset.column(f.column()) {
            Some(col) => columns.push((f, col.numeric())),
            None => {
                log::warn!("filter on unknown column '{}' removes every row", f.column());
                return Vec::new();
            }
        }
    }

    (0..dataset.n_rows())
        .filter(|&row| columns.iter().all(|(f, values)| f.accepts(values[row])))
        .collect()
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::data::model::{CellValue, Column};

    fn ages(values: &[Option<f64>]) -> Dataset {
        let cells = values
            .iter()
            .map(|v| v.map(CellValue::Float).unwrap_or(CellValue::Missing))
            .collect();
        Dataset::from_columns(vec![Column::new(schema::AGE, cells)]).unwrap()
    }

    #[test]
    fn reproductive_age_is_right_open() {
        let ds = ages(&[Some(17.9), Some(18.0), Some(49.9), Some(50.0), None, Some(30.0)]);
        assert_eq!(filtered_indices(&ds, &[reproductive_age()]), vec![1, 2, 5]);
    }

    #[test]
    fn menarche_bounds_are_inclusive() {
        let cells = [7.0, 8.0, 13.0, 20.0, 21.0]
            .iter()
            .map(|&v| CellValue::Float(v))
            .collect();
        let ds = Dataset::from_columns(vec![Column::new(schema::FIRST_PERIOD_AGE, cells)]).unwrap();
        assert_eq!(filtered_indices(&ds, &[plausible_menarche()]), vec![1, 2, 3]);
    }

    #[test]
    fn menopause_drops_missing_and_sentinels() {
        let cells = vec![
            CellValue::Integer(51),
            CellValue::Missing,
            CellValue::Integer(999),
            CellValue::Float(45.0),
        ];
        let ds = Dataset::from_columns(vec![Column::new(schema::LAST_PERIOD_AGE, cells)]).unwrap();
        assert_eq!(filtered_indices(&ds, &plausible_menopause()), vec![0, 3]);
    }

    #[test]
    fn unknown_column_matches_nothing() {
        let ds = ages(&[Some(30.0)]);
        let f = RowFilter::NotMissing {
            column: "nope".into(),
        };
        assert!(filtered_indices(&ds, &[f]).is_empty());
    }

    #[test]
    fn no_filters_keeps_everything() {
        let ds = ages(&[None, Some(1.0)]);
        assert_eq!(filtered_indices(&ds, &[]), vec![0, 1]);
    }

    proptest! {
        #[test]
        fn reproductive_age_never_keeps_rows_outside_bound(
            values in prop::collection::vec(prop::option::of(-10.0f64..120.0), 0..200)
        ) {
            let ds = ages(&values);
            let kept = filtered_indices(&ds, &[reproductive_age()]);
            for &row in &kept {
                let age = values[row].unwrap();
                prop_assert!((18.0..50.0).contains(&age));
            }
            let expected = values
                .iter()
                .filter(|v| matches!(v, Some(a) if (18.0..50.0).contains(a)))
                .count();
            prop_assert_eq!(kept.len(), expected);
        }
    }
}
