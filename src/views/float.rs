// src/views/float.rs

use super::{col, Cell, Layout, SortRule, ViewDescriptor, ViewKind};

/// `float_data` is already row-shaped: `id → { source, float }`, listed in
/// property order (array-index ids first).
pub static DESCRIPTOR: ViewDescriptor = ViewDescriptor {
    kind: ViewKind::Float,
    block: "float_data",
    layout: Layout::Records,
    columns: &[
        col("Source", Cell::Raw("source")),
        col("Float", Cell::Raw("float")),
    ],
    sort: SortRule::AsGiven,
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::DisplayLocale;
    use serde_json::{json, Value};

    #[test]
    fn index_ids_come_first_in_numeric_order() {
        let data: Value = serde_json::from_str(
            r#"{"float_data": {
                "10": {"source": "Nasdaq"},
                "1": {"source": "Yahoo", "float": 12500000},
                "0": {"source": "Finviz", "float": 12.3}
            }}"#,
        )
        .unwrap();

        let table = DESCRIPTOR.project(&data, &DisplayLocale::default()).unwrap();
        assert_eq!(table.columns, vec!["Source", "Float"]);

        let sources: Vec<&Value> = table.rows.iter().map(|r| r.get("Source")).collect();
        assert_eq!(sources, vec![&json!("Finviz"), &json!("Yahoo"), &json!("Nasdaq")]);
        assert_eq!(table.rows[2].get("Float"), &Value::Null);
        assert!(table.rows[2].contains("Float"));
    }

    #[test]
    fn named_ids_follow_in_payload_order() {
        let data: Value = serde_json::from_str(
            r#"{"float_data": {
                "yahoo": {"source": "Yahoo"},
                "01": {"source": "Padded"},
                "3": {"source": "Three"},
                "finviz": {"source": "Finviz"}
            }}"#,
        )
        .unwrap();

        let table = DESCRIPTOR.project(&data, &DisplayLocale::default()).unwrap();
        let sources: Vec<&str> = table
            .rows
            .iter()
            .map(|r| r.get("Source").as_str().unwrap())
            .collect();
        assert_eq!(sources, vec!["Three", "Yahoo", "Padded", "Finviz"]);
    }

    #[test]
    fn non_object_record_is_rejected() {
        let data = json!({ "float_data": { "0": 5 } });
        let err = DESCRIPTOR.project(&data, &DisplayLocale::default()).unwrap_err();
        assert_eq!(err.block, "float_data");
        assert!(err.reason.contains("record `0`"));
    }
}
