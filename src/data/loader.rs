use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{
    Array, AsArray, BooleanArray, Float32Array, Float64Array, Int32Array, Int64Array,
    StringArray,
};
use arrow::datatypes::{
    ArrowPrimitiveType, DataType, Int8Type, Int16Type, UInt8Type, UInt16Type, UInt32Type,
    UInt64Type,
};
use arrow::util::display::array_value_to_string;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{CellValue, Column, Dataset};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a survey table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row plus one row per respondent (the usual export)
/// * `.parquet` – one Arrow column per survey column (`df.to_parquet()`)
/// * `.json`    – `[{ "age_years": 31, "lead_µg/dL": 0.8, ... }, ...]`
pub fn load_file(path: &Path) -> Result<Dataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let dataset = match ext.as_str() {
        "csv" => load_csv(path),
        "parquet" | "pq" => load_parquet(path),
        "json" => load_json(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
    .with_context(|| format!("loading {}", path.display()))?;

    log::info!(
        "Loaded {} rows x {} columns from {}",
        dataset.n_rows(),
        dataset.n_cols(),
        path.display()
    );
    Ok(dataset)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, every other row one respondent.
/// Cells are type-guessed one by one; see [`guess_cell_type`].
fn load_csv(path: &Path) -> Result<Dataset> {
    let reader = csv::Reader::from_path(path).context("opening CSV")?;
    read_csv(reader)
}

fn read_csv<R: std::io::Read>(mut reader: csv::Reader<R>) -> Result<Dataset> {
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut columns: Vec<Vec<CellValue>> = vec![Vec::new(); headers.len()];

    for (row_no, result) in reader.records().enumerate() {
        // Header is line 1; report data rows with their 1-based line number.
        let record = result.with_context(|| format!("CSV row {}", row_no + 2))?;
        if record.len() != headers.len() {
            bail!(
                "CSV row {}: expected {} fields but found {}",
                row_no + 2,
                headers.len(),
                record.len()
            );
        }
        for (col_idx, value) in record.iter().enumerate() {
            columns[col_idx].push(guess_cell_type(value));
        }
    }

    let columns = headers
        .into_iter()
        .zip(columns)
        .map(|(name, values)| Column::new(name, values))
        .collect();
    Ok(Dataset::from_columns(columns)?)
}

/// Parse one CSV cell the way a dataframe reader would.
fn guess_cell_type(raw: &str) -> CellValue {
    let s = raw.trim();
    if s.is_empty() || matches!(s, "NA" | "N/A" | "NaN" | "nan" | "null" | "NULL") {
        return CellValue::Missing;
    }
    if let Ok(i) = s.parse::<i64>() {
        return CellValue::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return CellValue::Float(f);
    }
    match s {
        "true" | "True" | "TRUE" => CellValue::Bool(true),
        "false" | "False" | "FALSE" => CellValue::Bool(false),
        _ => CellValue::Text(s.to_string()),
    }
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "age_years": 31, "lead_µg/dL": 0.82, "regular_periods": "Yes" },
///   ...
/// ]
/// ```
///
/// Column order is the order keys are first seen; absent keys are missing.
fn load_json(path: &Path) -> Result<Dataset> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    parse_json_records(&text)
}

fn parse_json_records(text: &str) -> Result<Dataset> {
    let root: JsonValue = serde_json::from_str(text).context("parsing JSON")?;

    let records = root.as_array().context("Expected top-level JSON array")?;

    let mut names: Vec<String> = Vec::new();
    let mut columns: Vec<Vec<CellValue>> = Vec::new();

    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;

        for key in obj.keys() {
            if !names.contains(key) {
                names.push(key.clone());
                columns.push(vec![CellValue::Missing; i]);
            }
        }
        for (name, values) in names.iter().zip(columns.iter_mut()) {
            values.push(obj.get(name).map(json_to_cell).unwrap_or(CellValue::Missing));
        }
    }

    let columns = names
        .into_iter()
        .zip(columns)
        .map(|(name, values)| Column::new(name, values))
        .collect();
    Ok(Dataset::from_columns(columns)?)
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => CellValue::Text(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::Text(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Missing,
        other => CellValue::Text(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file holding the survey table, one Arrow column per survey
/// column. Works with files written by both **Pandas** and **Polars**.
fn load_parquet(path: &Path) -> Result<Dataset> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let names: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut columns: Vec<Vec<CellValue>> = vec![Vec::new(); names.len()];

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        for (col_idx, values) in columns.iter_mut().enumerate() {
            let array = batch.column(col_idx);
            values.extend((0..batch.num_rows()).map(|row| extract_cell(array, row)));
        }
    }

    let columns = names
        .into_iter()
        .zip(columns)
        .map(|(name, values)| Column::new(name, values))
        .collect();
    Ok(Dataset::from_columns(columns)?)
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_cell(col: &Arc<dyn Array>, row: usize) -> CellValue {
    if col.is_null(row) {
        return CellValue::Missing;
    }
    let any = col.as_any();
    match col.data_type() {
        DataType::Utf8 => any
            .downcast_ref::<StringArray>()
            .map(|s| CellValue::Text(s.value(row).to_string()))
            .unwrap_or(CellValue::Missing),
        DataType::LargeUtf8 => CellValue::Text(col.as_string::<i64>().value(row).to_string()),
        DataType::Int32 => any
            .downcast_ref::<Int32Array>()
            .map(|a| CellValue::Integer(a.value(row) as i64))
            .unwrap_or(CellValue::Missing),
        DataType::Int64 => any
            .downcast_ref::<Int64Array>()
            .map(|a| CellValue::Integer(a.value(row)))
            .unwrap_or(CellValue::Missing),
        DataType::Float32 => any
            .downcast_ref::<Float32Array>()
            .map(|a| CellValue::Float(a.value(row) as f64))
            .unwrap_or(CellValue::Missing),
        DataType::Float64 => any
            .downcast_ref::<Float64Array>()
            .map(|a| CellValue::Float(a.value(row)))
            .unwrap_or(CellValue::Missing),
        DataType::Boolean => any
            .downcast_ref::<BooleanArray>()
            .map(|a| CellValue::Bool(a.value(row)))
            .unwrap_or(CellValue::Missing),
        DataType::Int8 => integer_cell::<Int8Type>(col.as_ref(), row),
        DataType::Int16 => integer_cell::<Int16Type>(col.as_ref(), row),
        DataType::UInt8 => integer_cell::<UInt8Type>(col.as_ref(), row),
        DataType::UInt16 => integer_cell::<UInt16Type>(col.as_ref(), row),
        DataType::UInt32 => integer_cell::<UInt32Type>(col.as_ref(), row),
        DataType::UInt64 => integer_cell::<UInt64Type>(col.as_ref(), row),
        // Dictionary (pandas `category`), dates, timestamps, decimals: keep the
        // displayed value.
        _ => array_value_to_string(col.as_ref(), row).map_or(CellValue::Missing, CellValue::Text),
    }
}

fn integer_cell<T: ArrowPrimitiveType>(col: &dyn Array, row: usize) -> CellValue
where
    T::Native: TryInto<i64>,
{
    col.as_primitive_opt::<T>()
        .and_then(|a| a.value(row).try_into().ok())
        .map_or(CellValue::Missing, CellValue::Integer)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use arrow::array::{DictionaryArray, Int16Array};
    use arrow::datatypes::{Field, Int32Type, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;

    use super::*;
    use crate::data::model::ColumnKind;

    fn write_temp(suffix: &str, contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn csv_cells_are_type_guessed() {
        let file = write_temp(
            ".csv",
            "age_years,lead_µg/dL,regular_periods\n\
             31,0.82,Yes\n\
             45,,No\n\
             NA,1.5,\n",
        );
        let ds = load_file(file.path()).unwrap();
        assert_eq!(ds.shape(), (3, 3));

        let age = ds.column("age_years").unwrap();
        assert_eq!(age.kind, ColumnKind::Numeric);
        assert_eq!(age.values[0], CellValue::Integer(31));
        assert_eq!(age.values[2], CellValue::Missing);

        let lead = ds.column("lead_µg/dL").unwrap();
        assert_eq!(lead.numeric(), vec![Some(0.82), None, Some(1.5)]);

        let periods = ds.column("regular_periods").unwrap();
        assert_eq!(periods.kind, ColumnKind::Categorical);
        assert_eq!(periods.missing_count(), 1);
    }

    #[test]
    fn ragged_csv_rows_are_reported() {
        let file = write_temp(".csv", "a,b\n1,2\n3\n");
        let err = load_file(file.path()).unwrap_err();
        assert!(format!("{err:#}").contains("row 3"), "{err:#}");
    }

    #[test]
    fn unsupported_extension_is_an_error() {
        let file = write_temp(".xlsx", "");
        let err = load_file(file.path()).unwrap_err();
        assert!(format!("{err:#}").contains(".xlsx"));
    }

    #[test]
    fn json_records_fill_absent_keys_with_missing() {
        let ds = parse_json_records(
            r#"[{"age_years": 30, "shbg": 41.5},
                {"age_years": 52, "regular_periods": "No"}]"#,
        )
        .unwrap();
        assert_eq!(
            ds.column_names(),
            vec!["age_years", "shbg", "regular_periods"]
        );
        assert_eq!(ds.column("shbg").unwrap().values[1], CellValue::Missing);
        assert_eq!(ds.column("regular_periods").unwrap().values[0], CellValue::Missing);
        assert_eq!(
            ds.column("regular_periods").unwrap().values[1],
            CellValue::Text("No".into())
        );
    }

    #[test]
    fn parquet_columns_are_read_with_nulls() {
        let schema = Arc::new(Schema::new(vec![
            Field::new("age_years", DataType::Int64, true),
            Field::new("estradiol", DataType::Float64, true),
            Field::new("regular_periods", DataType::Utf8, true),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(Int64Array::from(vec![Some(25), None])),
                Arc::new(Float64Array::from(vec![Some(12.5), Some(80.0)])),
                Arc::new(StringArray::from(vec![Some("Yes"), None])),
            ],
        )
        .unwrap();

        let file = tempfile::Builder::new().suffix(".parquet").tempfile().unwrap();
        let mut writer = ArrowWriter::try_new(file.reopen().unwrap(), schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let ds = load_file(file.path()).unwrap();
        assert_eq!(ds.shape(), (2, 3));
        assert_eq!(ds.column("age_years").unwrap().values[1], CellValue::Missing);
        assert_eq!(ds.column("estradiol").unwrap().numeric(), vec![Some(12.5), Some(80.0)]);
        assert_eq!(
            ds.column("regular_periods").unwrap().values[0],
            CellValue::Text("Yes".into())
        );
    }

    #[test]
    fn parquet_narrow_integers_and_categories_keep_their_values() {
        let categories: DictionaryArray<Int32Type> = vec!["Yes", "No", "Yes"].into_iter().collect();
        let schema = Arc::new(Schema::new(vec![
            Field::new("first_period_age", DataType::Int16, true),
            Field::new("regular_periods", categories.data_type().clone(), true),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(Int16Array::from(vec![Some(12), Some(13), None])),
                Arc::new(categories),
            ],
        )
        .unwrap();

        let file = tempfile::Builder::new().suffix(".parquet").tempfile().unwrap();
        let mut writer = ArrowWriter::try_new(file.reopen().unwrap(), schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let ds = load_file(file.path()).unwrap();
        let age = ds.column("first_period_age").unwrap();
        assert_eq!(age.kind, ColumnKind::Numeric);
        assert_eq!(
            age.values,
            vec![CellValue::Integer(12), CellValue::Integer(13), CellValue::Missing]
        );

        let periods = ds.column("regular_periods").unwrap();
        assert_eq!(periods.kind, ColumnKind::Categorical);
        assert_eq!(
            periods.values,
            vec![
                CellValue::Text("Yes".into()),
                CellValue::Text("No".into()),
                CellValue::Text("Yes".into()),
            ]
        );
    }
}
