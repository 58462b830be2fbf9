use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use arrow::array::{
    Array, AsArray, BooleanArray, Date32Array, Float32Array, Float64Array, Int32Array, Int64Array,
    StringArray,
};
use arrow::datatypes::DataType;
use chrono::NaiveDate;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;
use thiserror::Error;

use super::clean::{load_and_clean, RawRow};
use super::model::MaterialDataset;

// ---------------------------------------------------------------------------
// Column contract
// ---------------------------------------------------------------------------

/// Required columns, in export order. This is the contract with the source
/// export and with [`super::export`]; a missing column aborts the whole load.
pub const COLUMNS: [&str; 12] = [
    "Material_ID",
    "Material_Name",
    "Material_Type",
    "Vendor_Name",
    "Supplier_Portal_Name",
    "Unit_Price_Latest",
    "Benchmark_Price",
    "Currency",
    "Price_Deviation (%)",
    "GMP_Compliance",
    "Price_Tier",
    "Price_Source_Timestamp",
];

/// Fatal dataset-level load failures (row-level problems go to the failure
/// list instead).
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("dataset is missing required column '{0}'")]
    MissingColumn(&'static str),
    #[error("unsupported file extension: .{0}")]
    UnsupportedExtension(String),
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a materials dataset from a file. Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row with the contract columns (the source export)
/// * `.json`    – records-oriented array of objects
/// * `.parquet` – flat columns named as in the contract
///
/// All three paths produce the same raw rows and share one cleaning pass, so
/// validation behaves identically regardless of format.
pub fn load_file(path: &Path) -> Result<MaterialDataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let raw_rows = match ext.as_str() {
        "csv" => load_csv(path)?,
        "json" => load_json(path)?,
        "parquet" | "pq" => load_parquet(path)?,
        other => return Err(DatasetError::UnsupportedExtension(other.to_string()).into()),
    };

    let (records, failures) = load_and_clean(&raw_rows);
    Ok(MaterialDataset::from_parts(records, failures))
}

fn raw_row_from_cells(cells: [String; 12]) -> RawRow {
    let [material_id, material_name, material_type, vendor_name, portal, price, benchmark_price, currency, price_deviation_pct, gmp, price_tier, timestamp] =
        cells;
    RawRow {
        material_id,
        material_name,
        material_type,
        vendor_name,
        portal,
        price,
        benchmark_price,
        currency,
        price_deviation_pct,
        gmp,
        price_tier,
        timestamp,
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(path: &Path) -> Result<Vec<RawRow>> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut col_idx = [0usize; 12];
    for (slot, name) in col_idx.iter_mut().zip(COLUMNS) {
        *slot = headers
            .iter()
            .position(|h| h == name)
            .ok_or(DatasetError::MissingColumn(name))?;
    }

    let mut raw_rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        let cells = col_idx.map(|i| record.get(i).unwrap_or("").to_string());
        raw_rows.push(raw_row_from_cells(cells));
    }
    Ok(raw_rows)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default
/// `df.to_json(orient='records')`):
///
/// ```json
/// [
///   {
///     "Material_ID": "MAT-001",
///     "Unit_Price_Latest": 12.4,
///     "Price_Deviation (%)": "5%",
///     ...
///   },
///   ...
/// ]
/// ```
fn load_json(path: &Path) -> Result<Vec<RawRow>> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root.as_array().context("Expected top-level JSON array")?;

    // The column contract is checked against the first record; later records
    // may omit keys, which clean as empty cells. An empty export carries no
    // columns at all and fails the contract the same way.
    let first_obj = match records.first() {
        Some(first) => Some(first.as_object().context("Row 0 is not a JSON object")?),
        None => None,
    };
    for name in COLUMNS {
        if !first_obj.is_some_and(|obj| obj.contains_key(name)) {
            return Err(DatasetError::MissingColumn(name).into());
        }
    }

    let mut raw_rows = Vec::with_capacity(records.len());
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        let cells = COLUMNS.map(|name| json_cell_to_string(obj.get(name)));
        raw_rows.push(raw_row_from_cells(cells));
    }
    Ok(raw_rows)
}

fn json_cell_to_string(val: Option<&JsonValue>) -> String {
    match val {
        Some(JsonValue::String(s)) => s.clone(),
        Some(JsonValue::Number(n)) => n.to_string(),
        Some(JsonValue::Bool(b)) => b.to_string(),
        Some(JsonValue::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with one flat column per contract column. Works with
/// files written by both **Pandas** (`df.to_parquet()`) and **Polars**
/// (`df.write_parquet()`); numeric, boolean and Date32 columns are
/// stringified into the shared cleaning path.
fn load_parquet(path: &Path) -> Result<Vec<RawRow>> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;

    // The file-level schema covers every batch; checking it up front makes a
    // missing column fatal even for a file with no row groups.
    let mut col_idx = [0usize; 12];
    for (slot, name) in col_idx.iter_mut().zip(COLUMNS) {
        *slot = builder
            .schema()
            .index_of(name)
            .map_err(|_| DatasetError::MissingColumn(name))?;
    }

    let reader = builder.build().context("building parquet reader")?;
    let mut raw_rows = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        for row in 0..batch.num_rows() {
            let cells = col_idx.map(|i| cell_to_string(batch.column(i), row));
            raw_rows.push(raw_row_from_cells(cells));
        }
    }

    Ok(raw_rows)
}

/// Stringify a single Arrow cell. Nulls become empty cells, exactly like an
/// empty CSV field.
fn cell_to_string(col: &Arc<dyn Array>, row: usize) -> String {
    if col.is_null(row) {
        return String::new();
    }
    match col.data_type() {
        DataType::Utf8 => {
            let arr = col.as_any().downcast_ref::<StringArray>().unwrap();
            arr.value(row).to_string()
        }
        DataType::LargeUtf8 => col.as_string::<i64>().value(row).to_string(),
        DataType::Int32 => {
            let arr = col.as_any().downcast_ref::<Int32Array>().unwrap();
            arr.value(row).to_string()
        }
        DataType::Int64 => {
            let arr = col.as_any().downcast_ref::<Int64Array>().unwrap();
            arr.value(row).to_string()
        }
        DataType::Float32 => {
            let arr = col.as_any().downcast_ref::<Float32Array>().unwrap();
            arr.value(row).to_string()
        }
        DataType::Float64 => {
            let arr = col.as_any().downcast_ref::<Float64Array>().unwrap();
            arr.value(row).to_string()
        }
        DataType::Boolean => {
            let arr = col.as_any().downcast_ref::<BooleanArray>().unwrap();
            arr.value(row).to_string()
        }
        DataType::Date32 => {
            let arr = col.as_any().downcast_ref::<Date32Array>().unwrap();
            date32_to_string(arr.value(row))
        }
        _ => String::new(),
    }
}

/// Date32 is days since the Unix epoch; render as `%Y-%m-%d` so the shared
/// timestamp parser accepts it.
fn date32_to_string(days: i32) -> String {
    NaiveDate::from_num_days_from_ce_opt(days + 719_163)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    const GOOD_CSV: &str = "\
Material_ID,Material_Name,Material_Type,Vendor_Name,Supplier_Portal_Name,Unit_Price_Latest,Benchmark_Price,Currency,Price_Deviation (%),GMP_Compliance,Price_Tier,Price_Source_Timestamp
MAT-001,Ethanol,Solvent,Acme Pharma,SAP Ariba,12.4,11.8,USD,5%,Yes,Medium,01-01-2024
MAT-002,Lactose,Excipient,Helios Chem,Coupa,3.1,,EUR,bad,No,Low,02-01-2024
";

    fn temp_path(name: &str) -> std::path::PathBuf {
        let mut p = std::env::temp_dir();
        p.push(format!("pharma_lens_loader_{}_{name}", std::process::id()));
        p
    }

    fn write_temp(name: &str, contents: &str) -> std::path::PathBuf {
        let path = temp_path(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn csv_load_cleans_and_records_failures() {
        let path = write_temp("good.csv", GOOD_CSV);
        let ds = load_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(ds.len(), 1);
        assert_eq!(ds.records[0].material_id, "MAT-001");
        assert_eq!(ds.failures.len(), 1);
        assert_eq!(ds.failures[0].row_index, 1);
        assert_eq!(ds.failures[0].reason(), "invalid_percentage");
    }

    #[test]
    fn missing_column_is_fatal() {
        let truncated = GOOD_CSV.replace("Price_Deviation (%)", "Deviation");
        let path = write_temp("missing.csv", &truncated);
        let err = load_file(&path).unwrap_err();
        std::fs::remove_file(&path).ok();

        let ds_err = err.downcast_ref::<DatasetError>().unwrap();
        assert!(matches!(
            ds_err,
            DatasetError::MissingColumn("Price_Deviation (%)")
        ));
    }

    #[test]
    fn json_load_shares_the_cleaning_path() {
        let json = r#"[
            {
                "Material_ID": "MAT-001",
                "Material_Name": "Ethanol",
                "Material_Type": "Solvent",
                "Vendor_Name": "Acme Pharma",
                "Supplier_Portal_Name": "SAP Ariba",
                "Unit_Price_Latest": 12.4,
                "Benchmark_Price": null,
                "Currency": "USD",
                "Price_Deviation (%)": "5%",
                "GMP_Compliance": true,
                "Price_Tier": "Medium",
                "Price_Source_Timestamp": "2024-01-01"
            }
        ]"#;
        let path = write_temp("rows.json", json);
        let ds = load_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(ds.len(), 1);
        assert_eq!(ds.records[0].price, 12.4);
        assert_eq!(ds.records[0].benchmark_price, None);
        assert_eq!(ds.records[0].price_deviation_pct, 5.0);
        assert!(ds.failures.is_empty());
    }

    #[test]
    fn empty_json_array_still_fails_the_contract() {
        let path = write_temp("empty.json", "[]");
        let err = load_file(&path).unwrap_err();
        std::fs::remove_file(&path).ok();

        let ds_err = err.downcast_ref::<DatasetError>().unwrap();
        assert!(matches!(ds_err, DatasetError::MissingColumn("Material_ID")));
    }

    #[test]
    fn parquet_schema_is_checked_before_any_rows() {
        use arrow::datatypes::{DataType, Field, Schema};
        use parquet::arrow::ArrowWriter;

        // A file with a wrong schema and no row groups at all.
        let schema = Arc::new(Schema::new(vec![Field::new("Foo", DataType::Utf8, true)]));
        let path = temp_path("empty.parquet");
        let file = std::fs::File::create(&path).unwrap();
        let writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.close().unwrap();

        let err = load_file(&path).unwrap_err();
        std::fs::remove_file(&path).ok();

        let ds_err = err.downcast_ref::<DatasetError>().unwrap();
        assert!(matches!(ds_err, DatasetError::MissingColumn("Material_ID")));
    }

    #[test]
    fn parquet_load_shares_the_cleaning_path() {
        use arrow::array::{ArrayRef, StringArray};
        use arrow::datatypes::{DataType, Field, Schema};
        use arrow::record_batch::RecordBatch;
        use parquet::arrow::ArrowWriter;

        let fields: Vec<Field> = COLUMNS
            .iter()
            .map(|name| Field::new(*name, DataType::Utf8, true))
            .collect();
        let schema = Arc::new(Schema::new(fields));
        let cells = [
            "MAT-001",
            "Ethanol",
            "Solvent",
            "Acme Pharma",
            "SAP Ariba",
            "12.4",
            "",
            "USD",
            "5%",
            "Yes",
            "Medium",
            "01-01-2024",
        ];
        let columns: Vec<ArrayRef> = cells
            .iter()
            .map(|v| Arc::new(StringArray::from(vec![*v])) as ArrayRef)
            .collect();
        let batch = RecordBatch::try_new(schema.clone(), columns).unwrap();

        let path = temp_path("rows.parquet");
        let file = std::fs::File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let ds = load_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(ds.len(), 1);
        assert_eq!(ds.records[0].price, 12.4);
        assert_eq!(ds.records[0].benchmark_price, None);
        assert!(ds.failures.is_empty());
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let err = load_file(Path::new("data.xlsx")).unwrap_err();
        assert!(err.downcast_ref::<DatasetError>().is_some());
    }

    #[test]
    fn date32_renders_to_iso() {
        assert_eq!(date32_to_string(0), "1970-01-01");
        assert_eq!(date32_to_string(19_723), "2024-01-01");
    }
}
