use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{
    Array, AsArray, BooleanArray, Float32Array, Float64Array, Int32Array, Int64Array,
    StringArray,
};
use arrow::datatypes::DataType;
use arrow::util::display::array_value_to_string;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::error::DataError;
use super::filter::{apply_filters, City, FilterSelection};
use super::model::{CellValue, RawTable, TripTable};
use crate::config::SOURCE_EXTENSIONS;

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load a city's trips from `data_dir` and apply the month/day filters.
pub fn load_data(data_dir: &Path, selection: &FilterSelection) -> Result<TripTable> {
    let path = resolve_source(data_dir, selection.city)?;
    let table = load_file(&path)?;
    log::info!("loaded {} trips from {}", table.len(), path.display());

    let filtered = apply_filters(&table, selection.month, selection.day);
    log::debug!(
        "{} of {} trips match month={} day={}",
        filtered.len(),
        table.len(),
        selection.month,
        selection.day
    );
    Ok(filtered)
}

/// First existing `<stem>.<ext>` for the city, trying CSV before the alternatives.
pub fn resolve_source(data_dir: &Path, city: City) -> Result<PathBuf, DataError> {
    SOURCE_EXTENSIONS
        .iter()
        .map(|ext| data_dir.join(format!("{}.{ext}", city.file_stem())))
        .find(|p| p.is_file())
        .ok_or_else(|| DataError::MissingSource {
            city: city.name().to_string(),
            path: data_dir.join(format!("{}.{}", city.file_stem(), SOURCE_EXTENSIONS[0])),
        })
}

/// Load a trip table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row, one trip per line (the published datasets)
/// * `.parquet` – one column per field
/// * `.json`    – `[{ "Start Time": "...", "Start Station": "...", ... }, ...]`
pub fn load_file(path: &Path) -> Result<TripTable> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let raw = match ext.as_str() {
        "csv" => read_csv(path)?,
        "parquet" | "pq" => read_parquet(path)?,
        "json" => read_json(path)?,
        other => return Err(DataError::UnsupportedExtension(other.to_string()).into()),
    };

    TripTable::from_raw(raw).with_context(|| format!("reading trips from {}", path.display()))
}

// ---------------------------------------------------------------------------
// CSV reader
// ---------------------------------------------------------------------------

fn read_csv(path: &Path) -> Result<RawTable> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        rows.push(record.iter().map(CellValue::from_field).collect());
    }

    Ok(RawTable { headers, rows })
}

// ---------------------------------------------------------------------------
// JSON reader
// ---------------------------------------------------------------------------

/// Records-oriented JSON; column order follows the keys of the first record.
fn read_json(path: &Path) -> Result<RawTable> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root
        .as_array()
        .context("Expected top-level JSON array")?;

    let headers: Vec<String> = match records.first().and_then(|r| r.as_object()) {
        Some(obj) => obj.keys().cloned().collect(),
        None => Vec::new(),
    };

    let mut rows = Vec::with_capacity(records.len());
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        rows.push(
            headers
                .iter()
                .map(|h| obj.get(h).map(json_to_cell).unwrap_or(CellValue::Null))
                .collect(),
        );
    }

    Ok(RawTable { headers, rows })
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
        JsonValue::Null => CellValue::Null,
        other => CellValue::Text(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet reader
// ---------------------------------------------------------------------------

fn read_parquet(path: &Path) -> Result<RawTable> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;
    let headers: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut rows = Vec::new();
    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        for row in 0..batch.num_rows() {
            rows.push(
                batch
                    .columns()
                    .iter()
                    .map(|col| extract_cell(col, row))
                    .collect::<Result<Vec<_>>>()?,
            );
        }
    }

    Ok(RawTable { headers, rows })
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_cell(col: &Arc<dyn Array>, row: usize) -> Result<CellValue> {
    if col.is_null(row) {
        return Ok(CellValue::Null);
    }
    let any = col.as_any();
    let value = match col.data_type() {
        DataType::Utf8 => any
            .downcast_ref::<StringArray>()
            .map(|s| CellValue::Text(s.value(row).to_string())),
        DataType::LargeUtf8 => Some(CellValue::Text(
            col.as_string::<i64>().value(row).to_string(),
        )),
        DataType::Int32 => any
            .downcast_ref::<Int32Array>()
            .map(|a| CellValue::Integer(a.value(row) as i64)),
        DataType::Int64 => any
            .downcast_ref::<Int64Array>()
            .map(|a| CellValue::Integer(a.value(row))),
        DataType::Float32 => any
            .downcast_ref::<Float32Array>()
            .map(|a| CellValue::Float(a.value(row) as f64)),
        DataType::Float64 => any
            .downcast_ref::<Float64Array>()
            .map(|a| CellValue::Float(a.value(row))),
        DataType::Boolean => any
            .downcast_ref::<BooleanArray>()
            .map(|a| CellValue::Bool(a.value(row))),
        // Timestamps and anything else come through as their display text.
        _ => Some(CellValue::Text(
            array_value_to_string(col.as_ref(), row).context("formatting parquet value")?,
        )),
    };
    value.with_context(|| format!("unexpected array type for {:?}", col.data_type()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::{DayFilter, MonthFilter};
    use arrow::datatypes::{Field, Schema, TimeUnit};
    use arrow::array::{ArrayRef, TimestampSecondArray};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;

    const CHICAGO: &str = "\
,Start Time,End Time,Trip Duration,Start Station,End Station,User Type,Gender,Birth Year
0,2017-03-06 08:00:00,2017-03-06 08:10:00,600,Clark St,State St,Subscriber,Male,1989.0
1,2017-01-02 09:00:00,2017-01-02 09:05:00,300,State St,Clark St,Customer,,
2,2017-03-07 17:30:00,2017-03-07 17:40:00,600.5,Clark St,Lake St,Subscriber,Female,1975.0
3,2017-06-04 12:00:00,2017-06-04 12:20:00,1200,Lake St,State St,Subscriber,Male,1990.0
";

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn csv_keeps_columns_and_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "chicago.csv", CHICAGO);

        let table = load_file(&path).unwrap();
        assert_eq!(table.len(), 4);
        assert_eq!(table.columns.len(), 9);
        assert_eq!(table.columns[0], "");
        assert!(table.has_gender && table.has_birth_year);
        assert_eq!(table.trips[0].cells[0], CellValue::Text("0".into()));
        assert_eq!(table.trips[3].start_station, "Lake St");
        assert!(table.trips[1].gender.is_null());
        assert_eq!(table.trips[2].duration, 600.5);
    }

    #[test]
    fn load_data_filters_by_month() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "chicago.csv", CHICAGO);

        let selection = FilterSelection {
            city: City::Chicago,
            month: MonthFilter::Month(3),
            day: DayFilter::All,
        };
        let table = load_data(dir.path(), &selection).unwrap();
        assert_eq!(table.len(), 2);
        assert!(table.trips.iter().all(|t| t.month == 3));
    }

    #[test]
    fn missing_source_names_the_csv() {
        let dir = tempfile::tempdir().unwrap();
        let err = resolve_source(dir.path(), City::Washington).unwrap_err();
        match err {
            DataError::MissingSource { city, path } => {
                assert_eq!(city, "washington");
                assert!(path.ends_with("washington.csv"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn malformed_csv_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            dir.path(),
            "chicago.csv",
            "Start Time,Trip Duration,Start Station,End Station,User Type\nnot-a-date,60,A,B,Customer\n",
        );
        let err = load_file(&path).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DataError>(),
            Some(DataError::BadTimestamp { row: 0, .. })
        ));
    }

    #[test]
    fn unsupported_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "chicago.xlsx", "");
        let err = load_file(&path).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DataError>(),
            Some(DataError::UnsupportedExtension(ext)) if ext == "xlsx"
        ));
    }

    #[test]
    fn csv_text_columns_are_not_reformatted() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            dir.path(),
            "chicago.csv",
            "Start Time,Trip Duration,Start Station,End Station,User Type,Birth Year\n\
             2017-01-02 08:00:00,60,007,1.50,Customer,NaN\n",
        );
        let table = load_file(&path).unwrap();
        let trip = &table.trips[0];
        assert_eq!(trip.start_station, "007");
        assert_eq!(trip.end_station, "1.50");
        assert_eq!(trip.cells[2], CellValue::Text("007".into()));
        assert_eq!(trip.birth_year, None);
        assert_eq!(trip.duration, 60.0);
    }

    #[test]
    fn json_columns_follow_first_record() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            dir.path(),
            "chicago.json",
            r#"[{"Start Time": "2017-02-01 07:00:00", "Start Station": "A", "End Station": "B",
                 "Trip Duration": 60, "User Type": "Customer"}]"#,
        );
        let table = load_file(&path).unwrap();
        assert_eq!(
            table.columns,
            vec!["Start Time", "Start Station", "End Station", "Trip Duration", "User Type"]
        );
    }

    #[test]
    fn json_records_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            dir.path(),
            "washington.json",
            r#"[
                {"Start Time": "2017-02-01 07:00:00", "Start Station": "A", "End Station": "B",
                 "Trip Duration": 420.5, "User Type": "Subscriber"},
                {"Start Time": "2017-02-02 07:00:00", "Start Station": "B", "End Station": "A",
                 "Trip Duration": 100, "User Type": null}
            ]"#,
        );
        let table = load_file(&path).unwrap();
        assert_eq!(table.len(), 2);
        assert!(!table.has_demographics());
        assert_eq!(table.trips[0].duration, 420.5);
        assert!(table.trips[1].user_type.is_null());
    }

    #[test]
    fn parquet_is_used_when_no_csv_exists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("new_york_city.parquet");

        let schema = Arc::new(Schema::new(vec![
            Field::new("Start Time", DataType::Timestamp(TimeUnit::Second, None), false),
            Field::new("Start Station", DataType::Utf8, false),
            Field::new("End Station", DataType::Utf8, false),
            Field::new("Trip Duration", DataType::Int64, false),
            Field::new("User Type", DataType::Utf8, true),
        ]));
        // 2017-05-01 10:00:00 and 2017-05-02 11:30:00 UTC
        let columns: Vec<ArrayRef> = vec![
            Arc::new(TimestampSecondArray::from(vec![1_493_632_800, 1_493_724_600])),
            Arc::new(StringArray::from(vec!["A", "B"])),
            Arc::new(StringArray::from(vec!["B", "C"])),
            Arc::new(Int64Array::from(vec![60, 90])),
            Arc::new(StringArray::from(vec![Some("Customer"), None])),
        ];
        let batch = RecordBatch::try_new(schema.clone(), columns).unwrap();
        let file = std::fs::File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        assert_eq!(resolve_source(dir.path(), City::NewYorkCity).unwrap(), path);
        let table = load_file(&path).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.trips[0].month, 5);
        assert_eq!(table.trips[1].hour(), 11);
        assert_eq!(table.trips[1].duration, 90.0);
        assert!(table.trips[1].user_type.is_null());
    }
}
