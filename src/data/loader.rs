use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use calamine::{Data, Reader, open_workbook_auto};
use arrow::array::{
    Array, AsArray, BooleanArray, Float32Array, Float64Array, Int32Array, Int64Array, StringArray,
};
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{Cell, RawTable};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// A loaded table and the sheet name used for its output files.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedSheet {
    pub name: String,
    pub table: RawTable,
}

/// Load one sheet from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.xlsx` / `.xlsm` / `.xls` / `.ods` – one worksheet, header in its first used row
/// * `.csv`     – header row, one record per sample
/// * `.json`    – `[{ "生测编号": "Ⅲ2-16", "100 ppm": 0.95, ... }, ...]`
/// * `.parquet` – flat scalar columns (strings, ints, floats, bools)
///
/// For workbooks `sheet` picks the worksheet (the first one when `None`) and
/// the worksheet name becomes the sheet name.  Single-table formats take the
/// name from `sheet` or, failing that, the file stem.
pub fn load_sheet(path: &Path, sheet: Option<&str>) -> Result<LoadedSheet> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let loaded = match ext.as_str() {
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => load_workbook(path, sheet),
        other => {
            let table = match other {
                "csv" => load_csv(path),
                "json" => load_json(path),
                "parquet" | "pq" => load_parquet(path),
                _ => bail!("Unsupported file extension: .{other}"),
            }?;
            let name = sheet.map_or_else(|| sheet_name(path), str::to_string);
            Ok(LoadedSheet { name, table })
        }
    }?;
    log::debug!(
        "loaded {} [{}]: {} rows x {} columns",
        path.display(),
        loaded.name,
        loaded.table.n_rows(),
        loaded.table.n_cols()
    );
    Ok(loaded)
}

/// The first (or only) sheet of a file.
pub fn load_file(path: &Path) -> Result<RawTable> {
    load_sheet(path, None).map(|loaded| loaded.table)
}

/// Sheet name used in output file names: the file stem.
pub fn sheet_name(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("sheet")
        .to_string()
}

// ---------------------------------------------------------------------------
// Workbook loader
// ---------------------------------------------------------------------------

fn load_workbook(path: &Path, sheet: Option<&str>) -> Result<LoadedSheet> {
    let mut workbook = open_workbook_auto(path).context("opening workbook")?;
    let names = workbook.sheet_names();
    let name = match sheet {
        Some(wanted) => names
            .iter()
            .find(|n| n.as_str() == wanted)
            .cloned()
            .with_context(|| format!("no worksheet '{wanted}', available: {}", names.join(", ")))?,
        None => names.first().cloned().context("workbook has no worksheets")?,
    };
    let range = workbook
        .worksheet_range(&name)
        .with_context(|| format!("reading worksheet '{name}'"))?;

    let mut rows = range.rows();
    let headers: Vec<String> = rows
        .next()
        .map(|header| header.iter().map(|c| c.to_string().trim().to_string()).collect())
        .unwrap_or_default();
    let rows = rows
        .map(|row| row.iter().map(workbook_cell).collect())
        .collect();

    Ok(LoadedSheet {
        name,
        table: RawTable::new(headers, rows),
    })
}

fn workbook_cell(data: &Data) -> Cell {
    match data {
        Data::Int(i) => Cell::Integer(*i),
        Data::Float(f) => Cell::Float(*f),
        Data::String(s) => Cell::guess(s),
        Data::Bool(b) => Cell::Bool(*b),
        Data::Empty => Cell::Empty,
        Data::Error(e) => {
            log::warn!("spreadsheet error cell {e:?} read as empty");
            Cell::Empty
        }
        other => Cell::Text(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(path: &Path) -> Result<RawTable> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .context("opening CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        rows.push(record.iter().map(Cell::guess).collect());
    }

    Ok(RawTable::new(headers, rows))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Records-oriented JSON (`df.to_json(orient='records', force_ascii=False)`).
/// Column order is the order keys first appear.
fn load_json(path: &Path) -> Result<RawTable> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root.as_array().context("Expected top-level JSON array")?;

    let mut headers: Vec<String> = Vec::new();
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        for key in obj.keys() {
            if !headers.contains(key) {
                headers.push(key.clone());
            }
        }
    }

    let rows = records
        .iter()
        .filter_map(|rec| rec.as_object())
        .map(|obj| {
            headers
                .iter()
                .map(|h| obj.get(h).map_or(Cell::Empty, json_to_cell))
                .collect()
        })
        .collect();

    Ok(RawTable::new(headers, rows))
}

fn json_to_cell(val: &JsonValue) -> Cell {
    match val {
        JsonValue::String(s) => Cell::guess(s),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Cell::Integer(i)
            } else if let Some(f) = n.as_f64() {
                Cell::Float(f)
            } else {
                Cell::Text(n.to_string())
            }
        }
        JsonValue::Bool(b) => Cell::Bool(*b),
        JsonValue::Null => Cell::Empty,
        other => Cell::Text(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file written by Pandas (`df.to_parquet()`) or Polars.
/// Every column becomes one table column; nested types are rejected.
fn load_parquet(path: &Path) -> Result<RawTable> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let headers: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut rows: Vec<Vec<Cell>> = Vec::new();
    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let columns = batch.columns();
        for row in 0..batch.num_rows() {
            let cells = columns
                .iter()
                .zip(&headers)
                .map(|(col, name)| {
                    extract_cell(col, row).with_context(|| format!("Row {row}, column '{name}'"))
                })
                .collect::<Result<Vec<Cell>>>()?;
            rows.push(cells);
        }
    }

    Ok(RawTable::new(headers, rows))
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_cell(col: &Arc<dyn Array>, row: usize) -> Result<Cell> {
    if col.is_null(row) {
        return Ok(Cell::Empty);
    }
    let cell = match col.data_type() {
        DataType::Utf8 => {
            let arr = col
                .as_any()
                .downcast_ref::<StringArray>()
                .context("expected StringArray")?;
            Cell::guess(arr.value(row))
        }
        DataType::LargeUtf8 => Cell::guess(col.as_string::<i64>().value(row)),
        DataType::Int32 => {
            let arr = col
                .as_any()
                .downcast_ref::<Int32Array>()
                .context("expected Int32Array")?;
            Cell::Integer(arr.value(row) as i64)
        }
        DataType::Int64 => {
            let arr = col
                .as_any()
                .downcast_ref::<Int64Array>()
                .context("expected Int64Array")?;
            Cell::Integer(arr.value(row))
        }
        DataType::Float32 => {
            let arr = col
                .as_any()
                .downcast_ref::<Float32Array>()
                .context("expected Float32Array")?;
            Cell::Float(arr.value(row) as f64)
        }
        DataType::Float64 => {
            let arr = col
                .as_any()
                .downcast_ref::<Float64Array>()
                .context("expected Float64Array")?;
            Cell::Float(arr.value(row))
        }
        DataType::Boolean => {
            let arr = col
                .as_any()
                .downcast_ref::<BooleanArray>()
                .context("expected BooleanArray")?;
            Cell::Bool(arr.value(row))
        }
        other => bail!("unsupported parquet column type {other:?}"),
    };
    Ok(cell)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_cells_are_typed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("热图测试.csv");
        std::fs::write(&path, "生测编号,100 ppm,50 ppm\nⅢ 2-01,0.95,\nCK,0,0\n").unwrap();

        let table = load_file(&path).unwrap();
        assert_eq!(table.headers, vec!["生测编号", "100 ppm", "50 ppm"]);
        assert_eq!(table.rows[0][0], Cell::Text("Ⅲ 2-01".into()));
        assert_eq!(table.rows[0][1], Cell::Float(0.95));
        assert_eq!(table.rows[0][2], Cell::Empty);
        assert_eq!(sheet_name(&path), "热图测试");
    }

    #[test]
    fn json_keeps_key_order_and_fills_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("energy.json");
        std::fs::write(
            &path,
            r#"[{"Step":"Reactant","Uncatalyzed":0.0,"Catalyzed":0.0},
                {"Step":"TS1","Uncatalyzed":28.5}]"#,
        )
        .unwrap();

        let table = load_file(&path).unwrap();
        assert_eq!(table.headers, vec!["Step", "Uncatalyzed", "Catalyzed"]);
        assert_eq!(table.rows[1][2], Cell::Empty);
        assert_eq!(table.rows[1][1], Cell::Float(28.5));
    }

    #[test]
    fn unknown_extension_is_rejected() {
        assert!(load_file(Path::new("data.txt")).is_err());
    }

    #[test]
    fn single_table_formats_name_the_sheet() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kinetics.csv");
        std::fs::write(&path, "t,y\n0,1\n").unwrap();

        assert_eq!(load_sheet(&path, None).unwrap().name, "kinetics");
        assert_eq!(load_sheet(&path, Some("反应动力学")).unwrap().name, "反应动力学");
    }

    #[test]
    fn workbook_cells_map_to_typed_cells() {
        assert_eq!(workbook_cell(&Data::Float(0.95)), Cell::Float(0.95));
        assert_eq!(workbook_cell(&Data::String(" 12 ".into())), Cell::Integer(12));
        assert_eq!(workbook_cell(&Data::String("CK".into())), Cell::Text("CK".into()));
        assert_eq!(workbook_cell(&Data::Empty), Cell::Empty);
    }

    #[test]
    fn missing_workbook_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_sheet(&dir.path().join("absent.xlsx"), None).is_err());
    }
}
