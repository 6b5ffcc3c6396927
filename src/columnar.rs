// src/columnar.rs

use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

pub const DEFAULT_ID_FIELD: &str = "row_id";

static NULL: Value = Value::Null;

/// A sub-block of the payload had a shape the projectors cannot read.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("`{block}`: {reason}")]
pub struct ProjectionError {
    pub block: String,
    pub reason: String,
}

impl ProjectionError {
    pub fn new(block: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            block: block.into(),
            reason: reason.into(),
        }
    }
}

/// One reconstructed table row: field name → scalar.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    fields: BTreeMap<String, Value>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Value of `field`, or `null` when the row has no such key.
    pub fn get(&self, field: &str) -> &Value {
        self.fields.get(field).unwrap_or(&NULL)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn insert(&mut self, field: impl Into<String>, value: Value) {
        self.fields.insert(field.into(), value);
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl From<&Map<String, Value>> for Row {
    fn from(map: &Map<String, Value>) -> Self {
        Self {
            fields: map.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
        }
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// Read `value` as a map, treating `null` as empty.
pub(crate) fn as_map<'a>(
    block: &str,
    what: &str,
    value: &'a Value,
) -> Result<Option<&'a Map<String, Value>>, ProjectionError> {
    match value {
        Value::Null => Ok(None),
        Value::Object(map) => Ok(Some(map)),
        other => Err(ProjectionError::new(
            block,
            format!("expected {} to be an object, found {}", what, type_name(other)),
        )),
    }
}

pub(crate) fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn finite_number(id: &str) -> Option<f64> {
    id.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Sort identifiers numerically when every one of them is a finite number,
/// otherwise lexicographically.
pub fn order_ids(ids: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut ids: Vec<String> = ids.into_iter().collect();
    let numeric: Option<Vec<f64>> = ids.iter().map(|id| finite_number(id)).collect();

    match numeric {
        Some(keys) => {
            let mut keyed: Vec<(f64, String)> = keys.into_iter().zip(ids).collect();
            // "1" and "1.0" compare equal as numbers; fall back to the text
            keyed.sort_by(|(ka, a), (kb, b)| ka.total_cmp(kb).then_with(|| a.cmp(b)));
            keyed.into_iter().map(|(_, id)| id).collect()
        }
        None => {
            ids.sort();
            ids
        }
    }
}

/// Turn a column-major block (`column → id → value`) into ordered rows.
///
/// Every distinct id under any column yields exactly one row; the row holds
/// the id under `id_field` and every column, `null` where the column has no
/// entry for that id. An absent or `null` block produces no rows.
pub fn columnar_to_rows(
    block_name: &str,
    block: &Value,
    id_field: &str,
) -> Result<Vec<Row>, ProjectionError> {
    let Some(columns) = as_map(block_name, "the block", block)? else {
        return Ok(Vec::new());
    };

    let mut parsed: Vec<(&str, Option<&Map<String, Value>>)> = Vec::with_capacity(columns.len());
    let mut ids = BTreeSet::new();
    for (name, column) in columns {
        let cells = as_map(block_name, &format!("column `{}`", name), column)?;
        if let Some(cells) = cells {
            ids.extend(cells.keys().cloned());
        }
        parsed.push((name.as_str(), cells));
    }

    Ok(order_ids(ids)
        .into_iter()
        .map(|id| {
            let mut row = Row::new();
            row.insert(id_field, Value::String(id.clone()));
            for (name, cells) in &parsed {
                let value = cells
                    .and_then(|c| c.get(&id))
                    .cloned()
                    .unwrap_or(Value::Null);
                row.insert(*name, value);
            }
            row
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ids(rows: &[Row], field: &str) -> Vec<String> {
        rows.iter()
            .map(|r| r.get(field).as_str().unwrap_or_default().to_string())
            .collect()
    }

    #[test]
    fn numeric_ids_sort_numerically() {
        let order = order_ids(["10", "2", "1"].map(String::from));
        assert_eq!(order, vec!["1", "2", "10"]);
    }

    #[test]
    fn mixed_ids_sort_lexicographically() {
        assert_eq!(order_ids(["b", "a"].map(String::from)), vec!["a", "b"]);
        assert_eq!(
            order_ids(["10", "x", "2"].map(String::from)),
            vec!["10", "2", "x"]
        );
    }

    #[test]
    fn non_finite_ids_are_not_numeric() {
        assert_eq!(
            order_ids(["inf", "2", "10"].map(String::from)),
            vec!["10", "2", "inf"]
        );
    }

    #[test]
    fn one_row_per_distinct_id_across_columns() {
        let block = json!({
            "open":  { "1": 10.0, "2": 11.0 },
            "close": { "3": 12.5 },
            "color": {}
        });
        let rows = columnar_to_rows("wick_days", &block, "ts").unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(ids(&rows, "ts"), vec!["1", "2", "3"]);

        for row in &rows {
            assert!(row.contains("open"));
            assert!(row.contains("close"));
            assert!(row.contains("color"));
            assert_eq!(row.len(), 4);
        }
        assert_eq!(rows[2].get("open"), &Value::Null);
        assert_eq!(rows[2].get("close"), &json!(12.5));
    }

    #[test]
    fn missing_value_is_null_not_absent() {
        let block = json!({ "source": { "0": "A" }, "float": {} });
        let rows = columnar_to_rows("float", &block, DEFAULT_ID_FIELD).unwrap();
        assert_eq!(rows.len(), 1);
        let expected: Row = [
            ("row_id", json!("0")),
            ("source", json!("A")),
            ("float", Value::Null),
        ]
        .into_iter()
        .collect();
        assert_eq!(rows[0], expected);
    }

    #[test]
    fn null_block_and_null_columns_are_empty() {
        assert!(columnar_to_rows("gap_days", &Value::Null, "row")
            .unwrap()
            .is_empty());

        let rows = columnar_to_rows("gap_days", &json!({ "type": null, "color": { "0": "red" } }), "row")
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("type"), &Value::Null);
    }

    #[test]
    fn non_object_shapes_are_projection_errors() {
        let err = columnar_to_rows("offerings", &json!([1, 2]), "row").unwrap_err();
        assert_eq!(err.block, "offerings");

        let err = columnar_to_rows("offerings", &json!({ "form": "S-1" }), "row").unwrap_err();
        assert!(err.reason.contains("column `form`"));
    }

    #[test]
    fn row_get_defaults_to_null() {
        let row = Row::new();
        assert!(row.is_empty());
        assert_eq!(row.get("anything"), &Value::Null);
    }
}
