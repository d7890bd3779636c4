//! Column descriptors and row access
//!
//! A column names a field by dotted path (`category.name`, `images.0`) and is
//! resolved against the JSON form of the row. Paths that do not resolve yield
//! `None` and render blank; they are never an error.

use super::format::{CellText, Format};
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// A row the data table can display
///
/// Rows are serialized once per render and cells are read from the resulting
/// JSON by column path. `row_id` must be stable across fetches.
pub trait TableRow: Serialize {
    fn row_id(&self) -> String;
}

impl TableRow for Value {
    fn row_id(&self) -> String {
        match self.get("id") {
            Some(Value::String(s)) => s.clone(),
            Some(other) if !other.is_null() => other.to_string(),
            _ => String::new(),
        }
    }
}

/// Horizontal alignment of a column's header and cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

/// Custom cell formatter; overrides `format` when present
pub type CellRenderer<R> = Arc<dyn Fn(Option<&Value>, &R) -> CellText + Send + Sync>;

/// Describes how to label, align and format one field of a row
pub struct Column<R> {
    pub id: String,
    pub label: String,
    pub align: Align,
    pub format: Option<Format>,
    pub render: Option<CellRenderer<R>>,
    pub min_width: Option<u16>,
    pub max_width: Option<u16>,
}

impl<R> Column<R> {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            align: Align::Left,
            format: None,
            render: None,
            min_width: None,
            max_width: None,
        }
    }

    pub fn align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }

    pub fn format(mut self, format: Format) -> Self {
        self.format = Some(format);
        self
    }

    pub fn render<F>(mut self, render: F) -> Self
    where
        F: Fn(Option<&Value>, &R) -> CellText + Send + Sync + 'static,
    {
        self.render = Some(Arc::new(render));
        self
    }

    pub fn min_width(mut self, width: u16) -> Self {
        self.min_width = Some(width);
        self
    }

    pub fn max_width(mut self, width: u16) -> Self {
        self.max_width = Some(width);
        self
    }
}

impl<R> Clone for Column<R> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            label: self.label.clone(),
            align: self.align,
            format: self.format,
            render: self.render.clone(),
            min_width: self.min_width,
            max_width: self.max_width,
        }
    }
}

impl<R> fmt::Debug for Column<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("align", &self.align)
            .field("format", &self.format)
            .field("render", &self.render.is_some())
            .finish()
    }
}

/// Resolve a dotted path against a JSON value
///
/// Numeric segments index into arrays. Returns `None` as soon as a segment
/// does not resolve.
pub fn resolve_path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    if path.is_empty() {
        return Some(value);
    }

    path.split('.').try_fold(value, |current, segment| match current {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn resolves_nested_objects_and_arrays() {
        let row = json!({"a": {"b": "x"}, "images": ["one.png", "two.png"]});
        assert_eq!(resolve_path(&row, "a.b"), Some(&json!("x")));
        assert_eq!(resolve_path(&row, "images.1"), Some(&json!("two.png")));
    }

    #[test]
    fn malformed_paths_resolve_to_none() {
        let row = json!({"a": {"b": "x"}});
        assert_eq!(resolve_path(&row, "a.c"), None);
        assert_eq!(resolve_path(&row, "a.b.c"), None);
        assert_eq!(resolve_path(&row, "a..b"), None);
        assert_eq!(resolve_path(&row, "missing"), None);
    }

    #[test]
    fn json_rows_use_id_field() {
        assert_eq!(json!({"id": "p-1"}).row_id(), "p-1");
        assert_eq!(json!({"id": 42}).row_id(), "42");
        assert_eq!(json!({"name": "x"}).row_id(), "");
    }
}
