// src/views/mod.rs
//
// Per-table projection rules: which payload block feeds a table, which
// fields become which columns, and how the rows are ordered.

pub mod float;
pub mod gap;
pub mod offerings;
pub mod wick;

use serde_json::Value;
use std::borrow::Cow;
use std::cmp::Ordering;
use tracing::debug;

pub use crate::columnar::ProjectionError;
use crate::columnar::{as_map, columnar_to_rows, type_name, Row};
use crate::render::{format_date_only, format_epoch_millis, render_table, DisplayLocale};
use crate::surface::SurfaceId;

/// How the source block encodes its rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// `column → id → value`, reshaped with the given id field name.
    Columnar { id_field: &'static str },
    /// `id → { field: value }`, taken in the order given.
    Records,
}

/// How one output cell is computed from a source row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    /// The source value unchanged; missing stays `null`.
    Raw(&'static str),
    /// The source value, `""` when it is missing or falsy (`null`, `false`,
    /// `0`, `""`).
    OrEmpty(&'static str),
    /// A timestamp reduced to a date-only string. Missing gives `""`,
    /// unparseable text is kept as is.
    DateOnly(&'static str),
    /// The first field when it holds a truthy value, otherwise the second.
    FirstOf(&'static str, &'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortRule {
    /// Keep the order the block produced.
    AsGiven,
    /// Sort source rows by the text of a raw source field, before projection.
    Source(&'static str, Direction),
    /// Sort projected rows by the text of an output column.
    Column(&'static str, Direction),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSpec {
    pub label: &'static str,
    pub cell: Cell,
}

pub const fn col(label: &'static str, cell: Cell) -> ColumnSpec {
    ColumnSpec { label, cell }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewDescriptor {
    pub kind: ViewKind,
    /// Key of the source block inside the data object.
    pub block: &'static str,
    pub layout: Layout,
    pub columns: &'static [ColumnSpec],
    pub sort: SortRule,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewKind {
    Float,
    Offerings,
    Wick,
    Gap,
}

impl ViewKind {
    /// Fixed render order.
    pub const ALL: [ViewKind; 4] = [
        ViewKind::Float,
        ViewKind::Offerings,
        ViewKind::Wick,
        ViewKind::Gap,
    ];

    pub fn descriptor(&self) -> &'static ViewDescriptor {
        match self {
            ViewKind::Float => &float::DESCRIPTOR,
            ViewKind::Offerings => &offerings::DESCRIPTOR,
            ViewKind::Wick => &wick::DESCRIPTOR,
            ViewKind::Gap => &gap::DESCRIPTOR,
        }
    }

    pub fn surface(&self) -> SurfaceId {
        match self {
            ViewKind::Float => SurfaceId::Float,
            ViewKind::Offerings => SurfaceId::Offerings,
            ViewKind::Wick => SurfaceId::Wick,
            ViewKind::Gap => SurfaceId::Gap,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ViewKind::Float => "float",
            ViewKind::Offerings => "offerings",
            ViewKind::Wick => "wick",
            ViewKind::Gap => "gap",
        }
    }
}

/// Column labels plus rows keyed by those labels, ready for the renderer.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

impl Table {
    pub fn render(&self, locale: &DisplayLocale) -> String {
        render_table(&self.columns, &self.rows, locale)
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn sort_text(value: &Value) -> Cow<'_, str> {
    match value {
        Value::Null => Cow::Borrowed(""),
        Value::String(s) => Cow::Borrowed(s.as_str()),
        other => Cow::Owned(other.to_string()),
    }
}

fn sort_rows(rows: &mut [Row], field: &str, direction: Direction) {
    rows.sort_by(|a, b| {
        let ord: Ordering = sort_text(a.get(field)).cmp(&sort_text(b.get(field)));
        match direction {
            Direction::Ascending => ord,
            Direction::Descending => ord.reverse(),
        }
    });
}

impl Cell {
    pub fn resolve(&self, row: &Row, locale: &DisplayLocale) -> Value {
        match *self {
            Cell::Raw(field) => row.get(field).clone(),
            Cell::OrEmpty(field) => match row.get(field) {
                value if is_truthy(value) => value.clone(),
                _ => Value::String(String::new()),
            },
            Cell::DateOnly(field) => Value::String(match row.get(field) {
                Value::Null => String::new(),
                Value::String(s) if s.is_empty() => String::new(),
                Value::String(s) => format_date_only(s, locale).unwrap_or_else(|| s.clone()),
                Value::Number(n) => n
                    .as_i64()
                    .and_then(|ms| format_epoch_millis(ms, locale))
                    .unwrap_or_else(|| n.to_string()),
                other => other.to_string(),
            }),
            Cell::FirstOf(primary, fallback) => {
                let value = row.get(primary);
                if is_truthy(value) {
                    value.clone()
                } else {
                    row.get(fallback).clone()
                }
            }
        }
    }
}

/// `Some(n)` when `key` is the canonical text of an array index: no sign,
/// no leading zeros, below `u32::MAX`.
fn array_index(key: &str) -> Option<u32> {
    let n: u32 = key.parse().ok()?;
    (n != u32::MAX && n.to_string() == key).then_some(n)
}

/// Rows of an `id → record` block in property order: array-index ids
/// ascending, then every other id in the order the payload lists them.
fn records_to_rows(block_name: &str, block: &Value) -> Result<Vec<Row>, ProjectionError> {
    let Some(records) = as_map(block_name, "the block", block)? else {
        return Ok(Vec::new());
    };
    let mut ordered: Vec<(&String, &Value)> = records.iter().collect();
    // stable, so non-index ids keep document order
    ordered.sort_by_key(|(id, _)| match array_index(id) {
        Some(n) => (0, n),
        None => (1, 0),
    });
    ordered
        .into_iter()
        .map(|(id, record)| match record {
            Value::Object(fields) => Ok(Row::from(fields)),
            other => Err(ProjectionError::new(
                block_name,
                format!("expected record `{}` to be an object, found {}", id, type_name(other)),
            )),
        })
        .collect()
}

impl ViewDescriptor {
    pub fn labels(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.label.to_string()).collect()
    }

    /// Project this view out of the unwrapped data object.
    pub fn project(&self, data: &Value, locale: &DisplayLocale) -> Result<Table, ProjectionError> {
        let block = data.get(self.block).unwrap_or(&Value::Null);
        let mut source = match self.layout {
            Layout::Columnar { id_field } => columnar_to_rows(self.block, block, id_field)?,
            Layout::Records => records_to_rows(self.block, block)?,
        };

        if let SortRule::Source(field, direction) = self.sort {
            sort_rows(&mut source, field, direction);
        }

        let mut rows: Vec<Row> = source
            .iter()
            .map(|src| {
                self.columns
                    .iter()
                    .map(|c| (c.label, c.cell.resolve(src, locale)))
                    .collect()
            })
            .collect();

        if let SortRule::Column(label, direction) = self.sort {
            sort_rows(&mut rows, label, direction);
        }

        debug!(view = self.kind.as_str(), rows = rows.len(), "projected");
        Ok(Table {
            columns: self.labels(),
            rows,
        })
    }
}

/// The data object's `message` text, blank when absent or falsy.
pub fn message(data: &Value) -> String {
    match data.get("message") {
        Some(Value::String(s)) => s.clone(),
        Some(v) if is_truthy(v) => v.to_string(),
        _ => String::new(),
    }
}

/// Project all four views in render order. Any failure aborts the lot.
pub fn project_all(
    data: &Value,
    locale: &DisplayLocale,
) -> Result<Vec<(ViewKind, Table)>, ProjectionError> {
    if !data.is_object() && !data.is_null() {
        return Err(ProjectionError::new(
            "payload",
            format!("expected the data object, found {}", type_name(data)),
        ));
    }
    ViewKind::ALL
        .iter()
        .map(|kind| {
            kind.descriptor()
                .project(data, locale)
                .map(|table| (*kind, table))
        })
        .collect()
}
