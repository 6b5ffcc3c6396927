// src/views/wick.rs

use super::{col, Cell, Direction, Layout, SortRule, ViewDescriptor, ViewKind};

/// Daily candles keyed by timestamp. `Date` prefers the explicit field and
/// falls back to the timestamp id; rows are sorted on that resolved text.
pub static DESCRIPTOR: ViewDescriptor = ViewDescriptor {
    kind: ViewKind::Wick,
    block: "wick_days",
    layout: Layout::Columnar { id_field: "ts" },
    columns: &[
        col("Date", Cell::FirstOf("Date", "ts")),
        col("Open", Cell::Raw("Open")),
        col("High", Cell::Raw("High")),
        col("Low", Cell::Raw("Low")),
        col("Close", Cell::Raw("Close")),
        col("Volume", Cell::Raw("Volume")),
        col("Color", Cell::Raw("Color")),
        col("Type", Cell::Raw("Types")),
        col("Price_of_Interest", Cell::Raw("Price_of_Interest")),
        col("Dividends", Cell::Raw("Dividends")),
        col("Stock_Splits", Cell::Raw("Stock Splits")),
    ],
    sort: SortRule::Column("Date", Direction::Ascending),
};
