use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

use thiserror::Error;

// ---------------------------------------------------------------------------
// CellValue – a single cell of the survey table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell mirroring the common dataframe dtypes.
/// Using `BTreeMap` / `BTreeSet` downstream so `CellValue` must be `Ord`.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Float(f64),
    Integer(i64),
    Bool(bool),
    Text(String),
    Missing,
}

// -- Manual Eq/Ord so we can put CellValue in BTreeSet --

impl Eq for CellValue {}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use std::cmp::Ordering;
        use CellValue::*;
        fn discriminant(v: &CellValue) -> u8 {
            match v {
                Missing => 0,
                Bool(_) => 1,
                Integer(_) | Float(_) => 2,
                Text(_) => 3,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Missing, Missing) => Ordering::Equal,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            // Mixed numeric cells compare by value, integers first on ties.
            (Integer(a), Float(b)) => (*a as f64).total_cmp(b).then(Ordering::Less),
            (Float(a), Integer(b)) => a.total_cmp(&(*b as f64)).then(Ordering::Greater),
            (Text(a), Text(b)) => a.cmp(b),
            _ => Ordering::Equal,
        }
    }
}

impl std::hash::Hash for CellValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            CellValue::Text(s) => s.hash(state),
            CellValue::Integer(i) => i.hash(state),
            CellValue::Float(f) => f.to_bits().hash(state),
            CellValue::Bool(b) => b.hash(state),
            CellValue::Missing => {}
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) if v.is_nan() => write!(f, "<NA>"),
            CellValue::Float(v) if v.fract() == 0.0 && v.abs() < 1e15 => write!(f, "{v:.1}"),
            CellValue::Float(v) => write!(f, "{v:.4}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Missing => write!(f, "<NA>"),
        }
    }
}

impl CellValue {
    /// Interpret the cell as a number. NaN counts as missing.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) if !v.is_nan() => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        match self {
            CellValue::Missing => true,
            CellValue::Float(v) => v.is_nan(),
            _ => false,
        }
    }
}

// ---------------------------------------------------------------------------
// Column
// ---------------------------------------------------------------------------

/// Whether a column is plotted as numbers or as categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Every non-missing cell is a number (an all-missing column counts too).
    Numeric,
    Categorical,
}

/// One named column of the survey table.
#[derive(Debug, Clone)]
pub struct Column {
    pub name: String,
    pub kind: ColumnKind,
    pub values: Vec<CellValue>,
}

impl Column {
    /// Build a column and infer its kind from the cells.
    pub fn new(name: impl Into<String>, values: Vec<CellValue>) -> Self {
        let numeric = values.iter().all(|v| {
            matches!(
                v,
                CellValue::Float(_) | CellValue::Integer(_) | CellValue::Missing
            )
        });
        Column {
            name: name.into(),
            kind: if numeric {
                ColumnKind::Numeric
            } else {
                ColumnKind::Categorical
            },
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_numeric(&self) -> bool {
        self.kind == ColumnKind::Numeric
    }

    /// Row-aligned numeric view; `None` where the cell is missing or not a number.
    pub fn numeric(&self) -> Vec<Option<f64>> {
        self.values.iter().map(CellValue::as_f64).collect()
    }

    /// All numeric cells with missing values dropped.
    pub fn non_missing_f64(&self) -> Vec<f64> {
        self.values.iter().filter_map(CellValue::as_f64).collect()
    }

    pub fn missing_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_missing()).count()
    }

    /// Sorted set of distinct non-missing values.
    pub fn unique_values(&self) -> BTreeSet<CellValue> {
        self.values
            .iter()
            .filter(|v| !v.is_missing())
            .cloned()
            .collect()
    }

    /// Distinct non-missing values with their counts, most frequent first.
    pub fn value_counts(&self) -> Vec<(CellValue, usize)> {
        let mut counts: BTreeMap<&CellValue, usize> = BTreeMap::new();
        for v in self.values.iter().filter(|v| !v.is_missing()) {
            *counts.entry(v).or_default() += 1;
        }
        let mut out: Vec<(CellValue, usize)> =
            counts.into_iter().map(|(v, n)| (v.clone(), n)).collect();
        out.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        out
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

#[derive(Debug, Error, PartialEq)]
pub enum DatasetError {
    #[error("column '{column}' has {found} rows but the table has {expected}")]
    RaggedColumn {
        column: String,
        expected: usize,
        found: usize,
    },
    #[error("duplicate column name '{0}'")]
    DuplicateColumn(String),
}

/// The full parsed table with a column-name index.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    columns: Vec<Column>,
    n_rows: usize,
    index: HashMap<String, usize>,
}

impl Dataset {
    /// Assemble a dataset; every column must have the same number of rows.
    pub fn from_columns(columns: Vec<Column>) -> Result<Self, DatasetError> {
        let n_rows = columns.first().map(Column::len).unwrap_or(0);
        let mut index = HashMap::with_capacity(columns.len());
        for (i, col) in columns.iter().enumerate() {
            if col.len() != n_rows {
                return Err(DatasetError::RaggedColumn {
                    column: col.name.clone(),
                    expected: n_rows,
                    found: col.len(),
                });
            }
            if index.insert(col.name.clone(), i).is_some() {
                return Err(DatasetError::DuplicateColumn(col.name.clone()));
            }
        }
        Ok(Dataset {
            columns,
            n_rows,
            index,
        })
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    /// `(rows, columns)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.n_rows, self.columns.len())
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.index.get(name).map(|&i| &self.columns[i])
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn numeric_column_names(&self) -> Vec<String> {
        self.columns
            .iter()
            .filter(|c| c.is_numeric())
            .map(|c| c.name.clone())
            .collect()
    }

    pub fn categorical_column_names(&self) -> Vec<String> {
        self.columns
            .iter()
            .filter(|c| !c.is_numeric())
            .map(|c| c.name.clone())
            .collect()
    }

    /// The subset of `names` present in the table, in the requested order.
    pub fn present(&self, names: &[&str]) -> Vec<String> {
        names
            .iter()
            .filter(|n| self.has_column(n))
            .map(|n| n.to_string())
            .collect()
    }

    /// Cell at `(row, column index)`, `Missing` when out of range.
    pub fn cell(&self, row: usize, col: usize) -> &CellValue {
        const MISSING: &CellValue = &CellValue::Missing;
        self.columns
            .get(col)
            .and_then(|c| c.values.get(row))
            .unwrap_or(MISSING)
    }

    /// Fraction of missing cells per (row band, column). Consecutive rows are
    /// pooled into at most `max_bands` bands so large tables stay drawable.
    pub fn missing_bands(&self, max_bands: usize) -> MissingBands {
        if self.n_rows == 0 || max_bands == 0 {
            return MissingBands::default();
        }
        let band = self.n_rows.div_ceil(max_bands);
        let starts: Vec<usize> = (0..self.n_rows).step_by(band).collect();

        let labels = starts
            .iter()
            .map(|&start| {
                let end = (start + band).min(self.n_rows) - 1;
                if start == end {
                    start.to_string()
                } else {
                    format!("{start}-{end}")
                }
            })
            .collect();
        let fractions = starts
            .iter()
            .map(|&start| {
                let end = (start + band).min(self.n_rows);
                self.columns
                    .iter()
                    .map(|c| {
                        let rows = &c.values[start..end];
                        rows.iter().filter(|v| v.is_missing()).count() as f64 / rows.len() as f64
                    })
                    .collect()
            })
            .collect();
        MissingBands { labels, fractions }
    }
}

/// Missing-value share per row band (rows) and column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MissingBands {
    /// `"0-9"`, `"10-19"`, … (a single index for one-row bands).
    pub labels: Vec<String>,
    pub fractions: Vec<Vec<f64>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn floats(vals: &[Option<f64>]) -> Vec<CellValue> {
        vals.iter()
            .map(|v| v.map(CellValue::Float).unwrap_or(CellValue::Missing))
            .collect()
    }

    #[test]
    fn column_kind_is_inferred_from_cells() {
        let num = Column::new("age_years", floats(&[Some(21.0), None, Some(40.0)]));
        assert_eq!(num.kind, ColumnKind::Numeric);

        let cat = Column::new(
            "regular_periods",
            vec![CellValue::Text("Yes".into()), CellValue::Missing],
        );
        assert_eq!(cat.kind, ColumnKind::Categorical);

        let empty = Column::new("all_missing", vec![CellValue::Missing; 3]);
        assert!(empty.is_numeric());
    }

    #[test]
    fn nan_counts_as_missing() {
        let col = Column::new("shbg", vec![CellValue::Float(f64::NAN), CellValue::Integer(3)]);
        assert_eq!(col.missing_count(), 1);
        assert_eq!(col.numeric(), vec![None, Some(3.0)]);
        assert_eq!(CellValue::Float(f64::NAN).to_string(), "<NA>");
    }

    #[test]
    fn value_counts_sorted_by_frequency() {
        let col = Column::new(
            "education",
            vec![
                CellValue::Text("College".into()),
                CellValue::Text("High school".into()),
                CellValue::Text("High school".into()),
                CellValue::Missing,
            ],
        );
        let counts = col.value_counts();
        assert_eq!(counts[0], (CellValue::Text("High school".into()), 2));
        assert_eq!(counts[1], (CellValue::Text("College".into()), 1));
        assert_eq!(counts.len(), 2);
    }

    #[test]
    fn mixed_numeric_cells_order_by_value() {
        assert!(CellValue::Integer(2) < CellValue::Float(2.5));
        assert!(CellValue::Float(1.5) < CellValue::Integer(2));
        assert!(CellValue::Missing < CellValue::Integer(-100));
    }

    #[test]
    fn ragged_columns_are_rejected() {
        let err = Dataset::from_columns(vec![
            Column::new("a", floats(&[Some(1.0), Some(2.0)])),
            Column::new("b", floats(&[Some(1.0)])),
        ])
        .unwrap_err();
        assert_eq!(
            err,
            DatasetError::RaggedColumn {
                column: "b".into(),
                expected: 2,
                found: 1
            }
        );
    }

    #[test]
    fn present_keeps_requested_order_and_skips_absent() {
        let ds = Dataset::from_columns(vec![
            Column::new("shbg", floats(&[Some(1.0)])),
            Column::new("testosterone", floats(&[Some(2.0)])),
        ])
        .unwrap();
        assert_eq!(
            ds.present(&["testosterone", "estradiol", "shbg"]),
            vec!["testosterone".to_string(), "shbg".to_string()]
        );
        assert_eq!(ds.shape(), (1, 2));
        assert_eq!(ds.cell(5, 0), &CellValue::Missing);
    }

    #[test]
    fn missing_bands_pool_consecutive_rows() {
        let ds = Dataset::from_columns(vec![
            Column::new("a", floats(&[Some(1.0), None, None, Some(4.0), None])),
            Column::new("b", floats(&[None, Some(2.0), Some(3.0), Some(4.0), Some(5.0)])),
        ])
        .unwrap();

        let bands = ds.missing_bands(2);
        assert_eq!(bands.labels, vec!["0-2", "3-4"]);
        assert_eq!(bands.fractions[0], vec![2.0 / 3.0, 1.0 / 3.0]);
        assert_eq!(bands.fractions[1], vec![0.5, 0.0]);

        let per_row = ds.missing_bands(100);
        assert_eq!(per_row.labels, vec!["0", "1", "2", "3", "4"]);
        assert_eq!(per_row.fractions[1], vec![1.0, 0.0]);

        assert_eq!(ds.missing_bands(0), MissingBands::default());
    }
}
