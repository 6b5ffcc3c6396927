// src/views/offerings.rs

use super::{col, Cell, Direction, Layout, SortRule, ViewDescriptor, ViewKind};

/// SEC filings, newest first by the raw `filingDate` text.
pub static DESCRIPTOR: ViewDescriptor = ViewDescriptor {
    kind: ViewKind::Offerings,
    block: "offerings",
    layout: Layout::Columnar { id_field: "row" },
    columns: &[
        col("Filing Date", Cell::OrEmpty("filingDate")),
        col("Form Type", Cell::OrEmpty("form")),
        col("Accession Number", Cell::OrEmpty("accessionNumber")),
        col("File Number", Cell::OrEmpty("fileNumber")),
        col("Primary Document", Cell::OrEmpty("primaryDocument")),
        col("Description", Cell::OrEmpty("primaryDocDescription")),
        col("Acceptance Date", Cell::DateOnly("acceptanceDateTime")),
        col("Report Date", Cell::OrEmpty("reportDate")),
    ],
    sort: SortRule::Source("filingDate", Direction::Descending),
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::DisplayLocale;
    use serde_json::json;

    fn sample() -> serde_json::Value {
        json!({
            "offerings": {
                "filingDate": { "0": "2024-01-15", "1": "2024-03-01", "2": "2023-11-30" },
                "form": { "0": "S-3", "1": "424B5", "2": "8-K" },
                "accessionNumber": { "0": "0001-24-000001", "1": "0001-24-000002" },
                "acceptanceDateTime": {
                    "0": "2024-01-15T16:30:01.000Z",
                    "1": "not a date",
                    "2": null
                },
                "size": { "0": 12034, "1": 883, "2": 91 }
            }
        })
    }

    #[test]
    fn newest_filing_first() {
        let table = DESCRIPTOR.project(&sample(), &DisplayLocale::default()).unwrap();
        let dates: Vec<&str> = table
            .rows
            .iter()
            .map(|r| r.get("Filing Date").as_str().unwrap())
            .collect();
        assert_eq!(dates, vec!["2024-03-01", "2024-01-15", "2023-11-30"]);
    }

    #[test]
    fn columns_are_renamed_and_defaulted() {
        let table = DESCRIPTOR.project(&sample(), &DisplayLocale::default()).unwrap();
        assert_eq!(
            table.columns,
            vec![
                "Filing Date",
                "Form Type",
                "Accession Number",
                "File Number",
                "Primary Document",
                "Description",
                "Acceptance Date",
                "Report Date"
            ]
        );

        let newest = &table.rows[0];
        assert_eq!(newest.get("Form Type"), &json!("424B5"));
        assert_eq!(newest.get("Acceptance Date"), &json!("not a date"));
        assert_eq!(newest.get("File Number"), &json!(""));
        assert!(!newest.contains("size"));

        let middle = &table.rows[1];
        assert_eq!(middle.get("Acceptance Date"), &json!("Jan 15, 2024"));

        let oldest = &table.rows[2];
        assert_eq!(oldest.get("Accession Number"), &json!(""));
        assert_eq!(oldest.get("Acceptance Date"), &json!(""));
    }

    #[test]
    fn missing_block_has_no_rows() {
        let table = DESCRIPTOR
            .project(&json!({ "message": "x" }), &DisplayLocale::default())
            .unwrap();
        assert!(table.rows.is_empty());
        assert_eq!(table.columns.len(), 8);
    }
}
