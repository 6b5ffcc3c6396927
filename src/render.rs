// src/render.rs

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use std::fmt::Write;

use crate::columnar::Row;

/// Markup written in place of a table that has no rows.
pub const NO_DATA_HTML: &str =
    "<thead><tr><th>—</th></tr></thead><tbody><tr><td>No data</td></tr></tbody>";

/// How numbers and dates are shown in rendered cells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayLocale {
    pub grouping: String,
    pub decimal: String,
    /// chrono `strftime` pattern for date-only cells.
    pub date_format: String,
    pub max_fraction_digits: usize,
}

impl Default for DisplayLocale {
    fn default() -> Self {
        Self {
            grouping: ",".to_string(),
            decimal: ".".to_string(),
            date_format: "%b %d, %Y".to_string(),
            max_fraction_digits: 6,
        }
    }
}

pub fn escape_html(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Insert the grouping separator every three digits of an unsigned integer string.
fn group_digits(digits: &str, sep: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3 * sep.len());
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push_str(sep);
        }
        out.push(c);
    }
    out
}

pub fn format_float(value: f64, locale: &DisplayLocale) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let digits = if value.fract() == 0.0 {
        0
    } else {
        locale.max_fraction_digits
    };
    let fixed = format!("{:.*}", digits, value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let frac = frac_part.trim_end_matches('0');

    let mut out = String::new();
    // no "-0" after rounding
    if value < 0.0 && (int_part.bytes().any(|b| b != b'0') || !frac.is_empty()) {
        out.push('-');
    }
    out.push_str(&group_digits(int_part, &locale.grouping));
    if !frac.is_empty() {
        out.push_str(&locale.decimal);
        out.push_str(frac);
    }
    out
}

pub fn format_number(number: &Number, locale: &DisplayLocale) -> String {
    if let Some(i) = number.as_i64() {
        let grouped = group_digits(&i.unsigned_abs().to_string(), &locale.grouping);
        return if i < 0 { format!("-{}", grouped) } else { grouped };
    }
    if let Some(u) = number.as_u64() {
        return group_digits(&u.to_string(), &locale.grouping);
    }
    format_float(number.as_f64().unwrap_or(f64::NAN), locale)
}

/// Text shown for one cell. `null` is blank; containers fall back to compact JSON.
pub fn format_value(value: &Value, locale: &DisplayLocale) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => format_number(n, locale),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Parse the timestamp shapes the filings feed uses; the calendar date is
/// taken as written, without shifting into another time zone.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

fn write_date(date: NaiveDate, locale: &DisplayLocale) -> Option<String> {
    let mut out = String::new();
    // a bad pattern surfaces as fmt::Error here rather than a panic
    write!(out, "{}", date.format(&locale.date_format)).ok()?;
    Some(out)
}

pub fn format_date_only(raw: &str, locale: &DisplayLocale) -> Option<String> {
    write_date(parse_date(raw)?, locale)
}

pub fn format_epoch_millis(millis: i64, locale: &DisplayLocale) -> Option<String> {
    write_date(DateTime::from_timestamp_millis(millis)?.date_naive(), locale)
}

/// Render a table body as HTML: a header row from `columns`, then one row per
/// record with cells in column order. No rows gives [`NO_DATA_HTML`].
pub fn render_table(columns: &[String], rows: &[Row], locale: &DisplayLocale) -> String {
    if rows.is_empty() {
        return NO_DATA_HTML.to_string();
    }

    let mut out = String::from("<thead><tr>");
    for col in columns {
        out.push_str("<th>");
        out.push_str(&escape_html(col));
        out.push_str("</th>");
    }
    out.push_str("</tr></thead><tbody>");

    for row in rows {
        out.push_str("<tr>");
        for col in columns {
            out.push_str("<td>");
            out.push_str(&escape_html(&format_value(row.get(col), locale)));
            out.push_str("</td>");
        }
        out.push_str("</tr>");
    }

    out.push_str("</tbody>");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::{Html, Selector};
    use serde_json::json;

    fn fmt(v: Value) -> String {
        format_value(&v, &DisplayLocale::default())
    }

    #[test]
    fn integers_get_thousands_separators() {
        assert_eq!(fmt(json!(1234567)), "1,234,567");
        assert_eq!(fmt(json!(-1234)), "-1,234");
        assert_eq!(fmt(json!(999)), "999");
        assert_eq!(fmt(json!(18446744073709551615u64)), "18,446,744,073,709,551,615");
    }

    #[test]
    fn integral_floats_have_no_fraction() {
        assert_eq!(fmt(json!(1234567.0)), "1,234,567");
        assert_eq!(fmt(json!(-0.0)), "0");
    }

    #[test]
    fn fractions_are_limited_to_six_digits() {
        assert_eq!(fmt(json!(3.14159265)), "3.141593");
        assert_eq!(fmt(json!(1234.5)), "1,234.5");
        assert_eq!(fmt(json!(-0.25)), "-0.25");
        assert_eq!(fmt(json!(0.0000001)), "0");
    }

    #[test]
    fn custom_separators() {
        let locale = DisplayLocale {
            grouping: ".".to_string(),
            decimal: ",".to_string(),
            ..DisplayLocale::default()
        };
        assert_eq!(format_value(&json!(1234567.75), &locale), "1.234.567,75");
    }

    #[test]
    fn other_values_use_their_text() {
        assert_eq!(fmt(Value::Null), "");
        assert_eq!(fmt(json!("red")), "red");
        assert_eq!(fmt(json!(true)), "true");
        assert_eq!(fmt(json!([1, 2])), "[1,2]");
    }

    #[test]
    fn date_only_formats() {
        let locale = DisplayLocale::default();
        assert_eq!(
            format_date_only("2024-03-01T16:05:12.000Z", &locale).as_deref(),
            Some("Mar 01, 2024")
        );
        assert_eq!(
            format_date_only("2024-01-15T08:00:00", &locale).as_deref(),
            Some("Jan 15, 2024")
        );
        assert_eq!(
            format_date_only("2023-12-31", &locale).as_deref(),
            Some("Dec 31, 2023")
        );
        assert_eq!(format_date_only("yesterday", &locale), None);
        assert_eq!(
            format_epoch_millis(1_709_251_200_000, &locale).as_deref(),
            Some("Mar 01, 2024")
        );
    }

    #[test]
    fn empty_rows_render_placeholder() {
        let html = render_table(&["Source".to_string()], &[], &DisplayLocale::default());
        assert_eq!(html, NO_DATA_HTML);
        assert!(!html.contains("Source"));
    }

    #[test]
    fn table_cells_follow_column_order() {
        let columns = vec!["Source".to_string(), "Float".to_string()];
        let rows: Vec<Row> = vec![
            [("Float", json!(1500000)), ("Source", json!("<b>A</b>"))]
                .into_iter()
                .collect(),
            [("Source", json!("B"))].into_iter().collect(),
        ];
        let html = render_table(&columns, &rows, &DisplayLocale::default());

        let doc = Html::parse_fragment(&format!("<table>{}</table>", html));
        let th = Selector::parse("thead th").unwrap();
        let td = Selector::parse("tbody tr td").unwrap();

        let headers: Vec<String> = doc.select(&th).map(|e| e.text().collect()).collect();
        assert_eq!(headers, vec!["Source", "Float"]);

        let cells: Vec<String> = doc.select(&td).map(|e| e.text().collect()).collect();
        assert_eq!(cells, vec!["<b>A</b>", "1,500,000", "B", ""]);
        assert!(html.contains("&lt;b&gt;A&lt;/b&gt;"));
    }

    #[test]
    fn rendering_is_deterministic() {
        let columns = vec!["x".to_string()];
        let rows: Vec<Row> = vec![[("x", json!(0.5))].into_iter().collect()];
        let locale = DisplayLocale::default();
        assert_eq!(
            render_table(&columns, &rows, &locale),
            render_table(&columns, &rows, &locale)
        );
    }
}
