// src/views/gap.rs

use super::{col, Cell, Layout, SortRule, ViewDescriptor, ViewKind};

pub static DESCRIPTOR: ViewDescriptor = ViewDescriptor {
    kind: ViewKind::Gap,
    block: "gap_days",
    layout: Layout::Columnar { id_field: "row" },
    columns: &[
        col("start_date", Cell::Raw("start_date")),
        col("end_date", Cell::Raw("end_date")),
        col("type", Cell::Raw("type")),
        col("color", Cell::Raw("color")),
        col("price_gap", Cell::Raw("price_gap")),
        col("retracement_price", Cell::Raw("retracement_price")),
    ],
    sort: SortRule::AsGiven,
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::DisplayLocale;
    use serde_json::json;

    #[test]
    fn rows_follow_numeric_id_order() {
        let data = json!({
            "gap_days": {
                "start_date": { "10": "2024-05-01", "2": "2024-02-01" },
                "type": { "10": "up", "2": "down" },
                "price_gap": { "2": 0.35 }
            }
        });
        let table = DESCRIPTOR.project(&data, &DisplayLocale::default()).unwrap();
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].get("start_date"), &json!("2024-02-01"));
        assert_eq!(table.rows[0].get("price_gap"), &json!(0.35));
        assert_eq!(table.rows[1].get("type"), &json!("up"));
        assert!(table.rows[1].get("price_gap").is_null());
        assert!(!table.rows[0].contains("row"));
    }
}
