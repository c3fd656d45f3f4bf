use chrono::{DateTime, NaiveDate};
use serde_json::{Map, Number, Value};
use thiserror::Error;

/// Errors that can occur while building a table from caller input
#[derive(Error, Debug)]
pub enum TableError {
    #[error("Unsupported input shape: {0}")]
    UnsupportedInput(String),

    #[error("Column '{name}' is not an array of values")]
    MalformedColumn { name: String },

    #[error("Record {index} is not an object")]
    MalformedRecord { index: usize },
}

/// Semantic type of a column, inferred from its non-missing values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    Numeric,
    Boolean,
    Date,
    Text,
}

/// A single typed column. Cells are `None` where the value is missing.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    Numeric(Vec<Option<f64>>),
    Boolean(Vec<Option<bool>>),
    Date(Vec<Option<NaiveDate>>),
    Text(Vec<Option<String>>),
}

impl Column {
    pub fn data_type(&self) -> DataType {
        match self {
            Column::Numeric(_) => DataType::Numeric,
            Column::Boolean(_) => DataType::Boolean,
            Column::Date(_) => DataType::Date,
            Column::Text(_) => DataType::Text,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Column::Numeric(v) => v.len(),
            Column::Boolean(v) => v.len(),
            Column::Date(v) => v.len(),
            Column::Text(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of non-missing cells.
    pub fn valid_count(&self) -> usize {
        match self {
            Column::Numeric(v) => v.iter().filter(|c| c.is_some()).count(),
            Column::Boolean(v) => v.iter().filter(|c| c.is_some()).count(),
            Column::Date(v) => v.iter().filter(|c| c.is_some()).count(),
            Column::Text(v) => v.iter().filter(|c| c.is_some()).count(),
        }
    }

    /// Numeric cells, or `None` for non-numeric columns.
    pub fn as_numeric(&self) -> Option<&[Option<f64>]> {
        match self {
            Column::Numeric(v) => Some(v),
            _ => None,
        }
    }

    /// Number of distinct non-missing values.
    pub fn unique_count(&self) -> usize {
        fn distinct<T: PartialEq + Clone>(values: &[Option<T>]) -> usize {
            let mut seen: Vec<T> = Vec::new();
            for v in values.iter().flatten() {
                if !seen.contains(v) {
                    seen.push(v.clone());
                }
            }
            seen.len()
        }
        match self {
            Column::Numeric(v) => distinct(v),
            Column::Boolean(v) => distinct(v),
            Column::Date(v) => distinct(v),
            Column::Text(v) => distinct(v),
        }
    }

    /// Cell rendered back to a JSON value. Integer-valued floats are written
    /// as JSON integers so a round trip through a file keeps them readable.
    pub fn cell_to_value(&self, idx: usize) -> Value {
        match self {
            Column::Numeric(v) => match v.get(idx).copied().flatten() {
                Some(n) => number_to_value(n),
                None => Value::Null,
            },
            Column::Boolean(v) => match v.get(idx).copied().flatten() {
                Some(b) => Value::Bool(b),
                None => Value::Null,
            },
            Column::Date(v) => match v.get(idx).copied().flatten() {
                Some(d) => Value::String(d.format("%Y-%m-%d").to_string()),
                None => Value::Null,
            },
            Column::Text(v) => match v.get(idx).and_then(|c| c.clone()) {
                Some(s) => Value::String(s),
                None => Value::Null,
            },
        }
    }
}

fn number_to_value(n: f64) -> Value {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 9.0e15 {
        Value::Number(Number::from(n as i64))
    } else {
        Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null)
    }
}

/// In-memory table of named, equal-length columns.
///
/// Row order is significant (it usually reflects creation time) but rows are
/// not required to be sorted. A table is built fresh per analysis call and
/// discarded afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    columns: Vec<(String, Column)>,
    rows: usize,
}

impl Table {
    /// Empty table with no rows and no columns.
    pub fn empty() -> Self {
        Self {
            columns: Vec::new(),
            rows: 0,
        }
    }

    /// Build a table from a JSON value, either a `{column: [values...]}`
    /// mapping or an already-tabular array of row objects.
    pub fn from_value(value: &Value) -> Result<Self, TableError> {
        match value {
            Value::Object(map) => Self::from_columns(map),
            Value::Array(rows) => Self::from_records(rows),
            other => Err(TableError::UnsupportedInput(format!(
                "expected an object of columns or an array of records, got {}",
                json_type_name(other)
            ))),
        }
    }

    /// Build from a mapping of column name to value sequence.
    ///
    /// Columns of unequal length are right-padded with missing values up to
    /// the longest column.
    pub fn from_columns(map: &Map<String, Value>) -> Result<Self, TableError> {
        let mut raw: Vec<(String, Vec<Option<Value>>)> = Vec::with_capacity(map.len());
        for (name, value) in map {
            let cells = match value {
                Value::Array(items) => items
                    .iter()
                    .map(|v| if v.is_null() { None } else { Some(v.clone()) })
                    .collect(),
                _ => {
                    return Err(TableError::MalformedColumn { name: name.clone() });
                }
            };
            raw.push((name.clone(), cells));
        }
        Ok(Self::from_raw_columns(raw))
    }

    /// Build from an array of row objects, the shape the JSON persistence
    /// format uses. Column order follows first appearance across rows; keys
    /// absent from a row become missing cells.
    pub fn from_records(rows: &[Value]) -> Result<Self, TableError> {
        let mut names: Vec<String> = Vec::new();
        for (index, row) in rows.iter().enumerate() {
            let Value::Object(obj) = row else {
                return Err(TableError::MalformedRecord { index });
            };
            for key in obj.keys() {
                if !names.iter().any(|n| n == key) {
                    names.push(key.clone());
                }
            }
        }

        let mut raw: Vec<(String, Vec<Option<Value>>)> = names
            .into_iter()
            .map(|n| (n, Vec::with_capacity(rows.len())))
            .collect();
        for row in rows {
            let obj = row.as_object().expect("checked above");
            for (name, cells) in &mut raw {
                let cell = obj.get(name.as_str()).filter(|v| !v.is_null()).cloned();
                cells.push(cell);
            }
        }
        Ok(Self::from_raw_columns(raw))
    }

    fn from_raw_columns(mut raw: Vec<(String, Vec<Option<Value>>)>) -> Self {
        let rows = raw.iter().map(|(_, cells)| cells.len()).max().unwrap_or(0);
        for (_, cells) in &mut raw {
            cells.resize(rows, None);
        }
        let columns = raw
            .into_iter()
            .map(|(name, cells)| (name, infer_column(cells)))
            .collect();
        Self { columns, rows }
    }

    pub fn row_count(&self) -> usize {
        self.rows
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    /// Column names in insertion order.
    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|(n, _)| n.clone()).collect()
    }

    pub fn columns(&self) -> impl Iterator<Item = (&str, &Column)> {
        self.columns.iter().map(|(n, c)| (n.as_str(), c))
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, c)| c)
    }

    /// Numeric columns only, in table order.
    pub fn numeric_columns(&self) -> Vec<(&str, &[Option<f64>])> {
        self.columns
            .iter()
            .filter_map(|(n, c)| c.as_numeric().map(|v| (n.as_str(), v)))
            .collect()
    }

    /// Rows as JSON objects, the persistence layer's JSON format.
    pub fn to_records(&self) -> Vec<Value> {
        (0..self.rows)
            .map(|idx| {
                let mut obj = Map::new();
                for (name, column) in &self.columns {
                    obj.insert(name.clone(), column.cell_to_value(idx));
                }
                Value::Object(obj)
            })
            .collect()
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Infer the column type from its non-missing cells and build the typed
/// column. Mixed-type columns fall back to text.
fn infer_column(cells: Vec<Option<Value>>) -> Column {
    let present: Vec<&Value> = cells.iter().flatten().collect();

    if present.iter().all(|v| v.is_number()) {
        return Column::Numeric(
            cells
                .iter()
                .map(|c| c.as_ref().and_then(Value::as_f64))
                .collect(),
        );
    }

    if !present.is_empty() && present.iter().all(|v| v.is_boolean()) {
        return Column::Boolean(
            cells
                .iter()
                .map(|c| c.as_ref().and_then(Value::as_bool))
                .collect(),
        );
    }

    if !present.is_empty()
        && present
            .iter()
            .all(|v| v.as_str().map(|s| parse_date(s).is_some()).unwrap_or(false))
    {
        return Column::Date(
            cells
                .iter()
                .map(|c| c.as_ref().and_then(|v| v.as_str()).and_then(parse_date))
                .collect(),
        );
    }

    Column::Text(
        cells
            .iter()
            .map(|c| c.as_ref().map(value_to_text))
            .collect(),
    )
}

/// Accepts plain dates and RFC 3339 timestamps.
fn parse_date(s: &str) -> Option<NaiveDate> {
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(d);
    }
    DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive())
}

fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn table_from(value: Value) -> Table {
        Table::from_value(&value).unwrap()
    }

    #[test]
    fn test_empty_mapping_yields_empty_table() {
        let table = table_from(json!({}));
        assert_eq!(table.row_count(), 0);
        assert_eq!(table.column_count(), 0);
        assert!(table.is_empty());
    }

    #[test]
    fn test_columns_preserve_order() {
        let table = table_from(json!({
            "views": [1, 2],
            "likes": [3, 4],
            "title": ["a", "b"],
        }));
        assert_eq!(table.column_names(), vec!["views", "likes", "title"]);
        assert_eq!(table.row_count(), 2);
    }

    #[test]
    fn test_numeric_inference_mixes_ints_and_floats() {
        let table = table_from(json!({"x": [1, 2.5, 3]}));
        let col = table.column("x").unwrap();
        assert_eq!(col.data_type(), DataType::Numeric);
        assert_eq!(col.as_numeric().unwrap(), &[Some(1.0), Some(2.5), Some(3.0)]);
    }

    #[test]
    fn test_null_becomes_missing() {
        let table = table_from(json!({"x": [1, null, 3]}));
        let col = table.column("x").unwrap();
        assert_eq!(col.data_type(), DataType::Numeric);
        assert_eq!(col.valid_count(), 2);
    }

    #[test]
    fn test_boolean_and_date_inference() {
        let table = table_from(json!({
            "active": [true, false, true],
            "date": ["2024-01-15", "2024-01-20", null],
        }));
        assert_eq!(table.column("active").unwrap().data_type(), DataType::Boolean);
        let date = table.column("date").unwrap();
        assert_eq!(date.data_type(), DataType::Date);
        assert_eq!(date.valid_count(), 2);
    }

    #[test]
    fn test_rfc3339_timestamps_parse_as_dates() {
        let table = table_from(json!({"ts": ["2024-01-15T10:30:00Z"]}));
        assert_eq!(table.column("ts").unwrap().data_type(), DataType::Date);
    }

    #[test]
    fn test_mixed_column_falls_back_to_text() {
        let table = table_from(json!({"x": [1, "two", 3]}));
        assert_eq!(table.column("x").unwrap().data_type(), DataType::Text);
    }

    #[test]
    fn test_short_columns_are_right_padded() {
        let table = table_from(json!({
            "long": [1, 2, 3, 4],
            "short": [10, 20],
        }));
        assert_eq!(table.row_count(), 4);
        let short = table.column("short").unwrap();
        assert_eq!(short.len(), 4);
        assert_eq!(short.valid_count(), 2);
    }

    #[test]
    fn test_scalar_column_is_rejected() {
        let err = Table::from_value(&json!({"x": 5})).unwrap_err();
        assert!(matches!(err, TableError::MalformedColumn { .. }));
    }

    #[test]
    fn test_top_level_scalar_is_rejected() {
        let err = Table::from_value(&json!("nope")).unwrap_err();
        assert!(err.to_string().contains("got a string"));
    }

    #[test]
    fn test_from_records_collects_columns_across_rows() {
        let table = table_from(json!([
            {"views": 100, "likes": 10},
            {"views": 200, "shares": 5},
        ]));
        assert_eq!(table.column_names(), vec!["views", "likes", "shares"]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.column("likes").unwrap().valid_count(), 1);
        assert_eq!(table.column("shares").unwrap().valid_count(), 1);
    }

    #[test]
    fn test_from_records_rejects_non_object_rows() {
        let err = Table::from_value(&json!([1, 2, 3])).unwrap_err();
        assert!(matches!(err, TableError::MalformedRecord { index: 0 }));
    }

    #[test]
    fn test_to_records_round_trip() {
        let source = json!({
            "views": [100, 250],
            "date": ["2024-01-15", "2024-01-20"],
            "title": ["a", null],
        });
        let table = table_from(source);
        let records = table.to_records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["views"], json!(100));
        assert_eq!(records[0]["date"], json!("2024-01-15"));
        assert_eq!(records[1]["title"], Value::Null);

        let rebuilt = Table::from_records(&records).unwrap();
        assert_eq!(rebuilt.column_names(), table.column_names());
        assert_eq!(rebuilt.row_count(), table.row_count());
    }

    #[test]
    fn test_unique_count() {
        let table = table_from(json!({"t": ["a", "b", "a", null]}));
        assert_eq!(table.column("t").unwrap().unique_count(), 2);
    }

    #[test]
    fn test_numeric_columns_selection() {
        let table = table_from(json!({
            "views": [1, 2],
            "title": ["a", "b"],
            "likes": [3, 4],
        }));
        let numeric = table.numeric_columns();
        let names: Vec<&str> = numeric.iter().map(|(n, _)| *n).collect();
        assert_eq!(names, vec!["views", "likes"]);
    }
}
