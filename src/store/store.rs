// Copyright 2025 Adobe. All rights reserved.
// This file is licensed to you under the Apache License,
// Version 2.0 (http://www.apache.org/licenses/LICENSE-2.0)
// or the MIT license (http://opensource.org/licenses/MIT),
// at your option.
//
// Unless required by applicable law or agreed to in writing,
// this software is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR REPRESENTATIONS OF ANY KIND, either express or
// implied. See the LICENSE-MIT and LICENSE-APACHE files for the
// specific language governing permissions and limitations under
// each license.

use crate::store::error::{StoreError, StoreResult};
use crate::table::Table;
use crate::util::format_file_size;
use csv::{ReaderBuilder, WriterBuilder};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// File-based persistence for content datasets.
///
/// Tables are written as `.csv` (header row, empty cells for missing values)
/// or `.json` (array of row objects, dates as ISO strings); the file
/// extension picks the format. The data directory is created on
/// construction.
///
/// # Examples
///
/// ```no_run
/// use content_pulse::store::ContentStore;
/// use content_pulse::table::Table;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = ContentStore::new("./data")?;
/// let table = Table::from_value(&serde_json::json!({"views": [100, 200]}))?;
/// store.save_table(&table, "metrics.csv")?;
///
/// let loaded = store.load_table("metrics.csv")?.expect("file exists");
/// assert_eq!(loaded.row_count(), 2);
/// # Ok(())
/// # }
/// ```
pub struct ContentStore {
    data_dir: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileFormat {
    Csv,
    Json,
}

/// One persisted file as reported by [`ContentStore::stats`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredFile {
    pub name: String,
    pub size: String,
}

/// Snapshot of what the data directory holds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreStats {
    pub timestamp: String,
    pub data_directory: String,
    pub available_files: Vec<StoredFile>,
}

impl ContentStore {
    /// Open a store rooted at `data_dir`, creating the directory if needed.
    pub fn new(data_dir: impl Into<PathBuf>) -> StoreResult<Self> {
        let data_dir = data_dir.into();
        fs::create_dir_all(&data_dir)?;
        Ok(Self { data_dir })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Persist a table; the extension of `filename` selects CSV or JSON.
    pub fn save_table(&self, table: &Table, filename: &str) -> StoreResult<PathBuf> {
        let path = self.data_dir.join(filename);
        match detect_format(filename)? {
            FileFormat::Csv => write_csv(table, &path)?,
            FileFormat::Json => {
                let records = Value::Array(table.to_records());
                fs::write(&path, serde_json::to_string_pretty(&records)?)?;
            }
        }
        info!("Saved table rows={} to {}", table.row_count(), path.display());
        Ok(path)
    }

    /// Load a table previously saved with [`save_table`](Self::save_table).
    /// Returns `None` when the file does not exist.
    pub fn load_table(&self, filename: &str) -> StoreResult<Option<Table>> {
        let format = detect_format(filename)?;
        let path = self.data_dir.join(filename);
        if !path.exists() {
            return Ok(None);
        }
        let table = match format {
            FileFormat::Csv => read_csv(&path)?,
            FileFormat::Json => {
                let value: Value = serde_json::from_str(&fs::read_to_string(&path)?)?;
                Table::from_value(&value)?
            }
        };
        Ok(Some(table))
    }

    /// Persist an arbitrary JSON document (must use a `.json` name).
    pub fn save_json(&self, value: &Value, filename: &str) -> StoreResult<PathBuf> {
        if detect_format(filename)? != FileFormat::Json {
            return Err(StoreError::UnsupportedFormat(filename.to_string()));
        }
        let path = self.data_dir.join(filename);
        fs::write(&path, serde_json::to_string_pretty(value)?)?;
        Ok(path)
    }

    /// Load a JSON document, or `None` when the file does not exist.
    pub fn load_json(&self, filename: &str) -> StoreResult<Option<Value>> {
        if detect_format(filename)? != FileFormat::Json {
            return Err(StoreError::UnsupportedFormat(filename.to_string()));
        }
        let path = self.data_dir.join(filename);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_str(&fs::read_to_string(&path)?)?))
    }

    /// Report which `.csv`/`.json` files the data directory holds.
    pub fn stats(&self) -> StoreStats {
        let mut available_files = Vec::new();
        if let Ok(entries) = fs::read_dir(&self.data_dir) {
            for entry in entries.flatten() {
                let name = entry.file_name().to_string_lossy().to_string();
                if detect_format(&name).is_ok() {
                    let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
                    available_files.push(StoredFile {
                        name,
                        size: format_file_size(size),
                    });
                }
            }
        }
        available_files.sort_by(|a, b| a.name.cmp(&b.name));

        StoreStats {
            timestamp: chrono::Utc::now().to_rfc3339(),
            data_directory: self.data_dir.display().to_string(),
            available_files,
        }
    }
}

fn detect_format(filename: &str) -> StoreResult<FileFormat> {
    let lower = filename.to_ascii_lowercase();
    if lower.ends_with(".csv") {
        Ok(FileFormat::Csv)
    } else if lower.ends_with(".json") {
        Ok(FileFormat::Json)
    } else {
        Err(StoreError::UnsupportedFormat(filename.to_string()))
    }
}

fn write_csv(table: &Table, path: &Path) -> StoreResult<()> {
    let mut writer = WriterBuilder::new().from_path(path)?;
    writer.write_record(table.column_names())?;
    for row in 0..table.row_count() {
        let record: Vec<String> = table
            .columns()
            .map(|(_, column)| cell_to_csv(&column.cell_to_value(row)))
            .collect();
        writer.write_record(&record)?;
    }
    writer.flush().map_err(StoreError::IoError)?;
    Ok(())
}

fn cell_to_csv(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn read_csv(path: &Path) -> StoreResult<Table> {
    let mut reader = ReaderBuilder::new().from_path(path)?;
    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

    let mut columns: Vec<Vec<Value>> = vec![Vec::new(); headers.len()];
    for record in reader.records() {
        let record = record?;
        for (idx, cells) in columns.iter_mut().enumerate() {
            cells.push(parse_csv_cell(record.get(idx).unwrap_or("")));
        }
    }

    let mut map = Map::new();
    for (header, cells) in headers.into_iter().zip(columns) {
        map.insert(header, Value::Array(cells));
    }
    Ok(Table::from_columns(&map)?)
}

/// A CSV cell carries no type, so re-infer one: empty is missing, then
/// integer, float, boolean, and finally plain text.
fn parse_csv_cell(cell: &str) -> Value {
    if cell.is_empty() {
        return Value::Null;
    }
    if let Ok(i) = cell.parse::<i64>() {
        return Value::Number(Number::from(i));
    }
    if let Ok(f) = cell.parse::<f64>() {
        if let Some(n) = Number::from_f64(f) {
            return Value::Number(n);
        }
    }
    match cell {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => Value::String(cell.to_string()),
    }
}
