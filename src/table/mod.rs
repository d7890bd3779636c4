// Generic data table
//
// Renders a server-paginated page of rows through caller-supplied column
// descriptors. The table owns presentation state only (pagination, loading,
// selection); the rows themselves belong to the container that fetched them,
// and page/size changes are handed back to that container as `TableEvent`s.
//
// `DataTable::view` produces a render-agnostic `TableView`. The TUI draws it
// with ratatui (tui::components::data_table) and the headless CLI prints it as
// text (table::text), so both share the same responsive and formatting rules.

pub mod column;
pub mod format;
pub mod pagination;
pub mod responsive;
pub mod text;

pub use column::{resolve_path, Align, Column, TableRow};
pub use format::{CellText, Format, Tone};
pub use pagination::Pagination;
pub use responsive::{ResponsiveConfig, Viewport};

use crate::i18n::Locale;
use serde_json::Value;

/// Label of the always-present row-index column
pub const INDEX_HEADER: &str = "#";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderCell {
    pub label: String,
    pub align: Align,
    pub min_width: Option<u16>,
    pub max_width: Option<u16>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewRow {
    pub id: String,
    /// 1-based index across pages
    pub number: usize,
    pub cells: Vec<CellText>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableBody {
    /// Placeholder rows while a fetch is in flight
    Skeleton(usize),
    /// Single message spanning every column
    Empty(String),
    Rows(Vec<ViewRow>),
}

/// Everything needed to draw one frame of the table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableView {
    /// Index column first, then the columns visible at this viewport
    pub header: Vec<HeaderCell>,
    pub body: TableBody,
    pub viewport: Viewport,
}

impl TableView {
    pub fn column_count(&self) -> usize {
        self.header.len()
    }
}

/// Navigation commands, decoupled from any particular key binding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableCommand {
    Up,
    Down,
    First,
    Last,
    Activate,
    ActionMenu,
    NextPage,
    PrevPage,
    LargerPageSize,
    SmallerPageSize,
}

/// Changes the owning container must react to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableEvent {
    PageChanged(usize),
    /// Page index has already been reset to 0
    PageSizeChanged(usize),
    RowActivated(String),
    ActionMenu(String),
}

pub struct DataTable<R> {
    columns: Vec<Column<R>>,
    responsive: ResponsiveConfig,
    locale: Locale,
    pagination: Pagination,
    loading: bool,
    selected: Option<usize>,
    empty_message: String,
}

impl<R: TableRow> DataTable<R> {
    pub fn new(columns: Vec<Column<R>>, page_size: usize, locale: Locale) -> Self {
        Self {
            columns,
            responsive: ResponsiveConfig::default(),
            locale,
            pagination: Pagination::new(page_size),
            loading: false,
            selected: None,
            empty_message: locale.labels().no_data.to_string(),
        }
    }

    /// Replace (not merge) the default responsive rules
    pub fn with_responsive(mut self, responsive: ResponsiveConfig) -> Self {
        self.responsive = responsive;
        self
    }

    pub fn with_empty_message(mut self, message: impl Into<String>) -> Self {
        self.empty_message = message.into();
        self
    }

    pub fn columns(&self) -> &[Column<R>] {
        &self.columns
    }

    pub fn responsive(&self) -> &ResponsiveConfig {
        &self.responsive
    }

    pub fn pagination(&self) -> &Pagination {
        &self.pagination
    }

    pub fn pagination_mut(&mut self) -> &mut Pagination {
        &mut self.pagination
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected_row<'a>(&self, rows: &'a [R]) -> Option<&'a R> {
        self.selected.and_then(|i| rows.get(i))
    }

    /// Keep the selection inside the current page after rows are replaced
    pub fn sync_rows(&mut self, len: usize) {
        self.selected = match (self.selected, len) {
            (_, 0) => None,
            (Some(i), len) if i >= len => Some(len - 1),
            (None, _) => Some(0),
            (sel, _) => sel,
        };
    }

    pub fn visible_columns(&self, viewport: Viewport) -> Vec<&Column<R>> {
        self.columns
            .iter()
            .filter(|c| !self.responsive.is_hidden(c, viewport))
            .collect()
    }

    /// Build the render model for `rows` at `viewport`
    ///
    /// `rows` must already be the current page; the table does not slice.
    pub fn view(&self, rows: &[R], viewport: Viewport) -> TableView {
        let visible = self.visible_columns(viewport);

        let mut header = Vec::with_capacity(visible.len() + 1);
        header.push(HeaderCell {
            label: INDEX_HEADER.to_string(),
            align: Align::Right,
            min_width: Some(3),
            max_width: Some(6),
        });
        header.extend(visible.iter().map(|c| HeaderCell {
            label: c.label.clone(),
            align: c.align,
            min_width: c.min_width,
            max_width: c.max_width,
        }));

        let body = if self.loading {
            TableBody::Skeleton(self.pagination.page_size())
        } else if rows.is_empty() {
            TableBody::Empty(self.empty_message.clone())
        } else {
            TableBody::Rows(
                rows.iter()
                    .enumerate()
                    .map(|(k, row)| self.view_row(k, row, &visible, viewport))
                    .collect(),
            )
        };

        TableView {
            header,
            body,
            viewport,
        }
    }

    fn view_row(&self, k: usize, row: &R, visible: &[&Column<R>], viewport: Viewport) -> ViewRow {
        // A row that fails to serialize renders as blank cells
        let json = serde_json::to_value(row).unwrap_or(Value::Null);

        let cells = visible
            .iter()
            .map(|column| {
                let value = resolve_path(&json, &column.id);
                match &column.render {
                    Some(render) => render(value, row),
                    None => format::format_value(column.format, value, viewport, self.locale),
                }
            })
            .collect();

        ViewRow {
            id: row.row_id(),
            number: self.pagination.row_number(k),
            cells,
        }
    }

    /// Apply a navigation command against the current page of `rows`
    pub fn apply(&mut self, command: TableCommand, rows: &[R]) -> Option<TableEvent> {
        let len = rows.len();
        match command {
            TableCommand::Up => {
                if len > 0 {
                    self.selected = Some(self.selected.map_or(0, |i| i.saturating_sub(1)));
                }
                None
            }
            TableCommand::Down => {
                if len > 0 {
                    self.selected = Some(self.selected.map_or(0, |i| (i + 1).min(len - 1)));
                }
                None
            }
            TableCommand::First => {
                self.selected = (len > 0).then_some(0);
                None
            }
            TableCommand::Last => {
                self.selected = len.checked_sub(1);
                None
            }
            TableCommand::Activate => self
                .selected_row(rows)
                .map(|row| TableEvent::RowActivated(row.row_id())),
            TableCommand::ActionMenu => self
                .selected_row(rows)
                .map(|row| TableEvent::ActionMenu(row.row_id())),
            TableCommand::NextPage => {
                let page = self.pagination.next_page()?;
                self.pagination.set_page(page);
                self.selected = None;
                Some(TableEvent::PageChanged(page))
            }
            TableCommand::PrevPage => {
                let page = self.pagination.prev_page()?;
                self.pagination.set_page(page);
                self.selected = None;
                Some(TableEvent::PageChanged(page))
            }
            TableCommand::LargerPageSize | TableCommand::SmallerPageSize => {
                let size = self
                    .pagination
                    .cycle_page_size(command == TableCommand::LargerPageSize);
                if self.pagination.set_page_size(size) {
                    self.selected = None;
                    Some(TableEvent::PageSizeChanged(size))
                } else {
                    None
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn columns() -> Vec<Column<Value>> {
        vec![
            Column::new("name", "Name"),
            Column::new("category.name", "Category"),
            Column::new("sellingPrice", "Price").format(Format::Price),
            Column::new("createdAt", "Created").format(Format::Date),
            Column::new("updatedAt", "Updated").format(Format::DateTime),
        ]
    }

    fn rows(n: usize) -> Vec<Value> {
        (0..n)
            .map(|i| {
                json!({
                    "id": format!("p-{}", i),
                    "name": format!("Product {}", i),
                    "category": {"name": "Dairy"},
                    "sellingPrice": 1000 * (i + 1),
                    "createdAt": "2024-03-05T00:00:00Z",
                })
            })
            .collect()
    }

    fn cell_texts(view: &TableView, row: usize) -> Vec<String> {
        match &view.body {
            TableBody::Rows(rows) => rows[row].cells.iter().map(|c| c.text.clone()).collect(),
            other => panic!("expected rows, got {:?}", other),
        }
    }

    #[test]
    fn loading_renders_page_size_skeleton_rows() {
        let mut table = DataTable::new(columns(), 10, Locale::Vi);
        table.set_loading(true);
        let view = table.view(&rows(3), Viewport::Desktop);
        assert_eq!(view.body, TableBody::Skeleton(10));
    }

    #[test]
    fn empty_rows_render_single_message() {
        let table = DataTable::new(columns(), 10, Locale::En);
        let view = table.view(&[], Viewport::Desktop);
        assert_eq!(view.body, TableBody::Empty("No data".to_string()));
    }

    #[test]
    fn no_columns_leaves_only_index_header() {
        let table: DataTable<Value> = DataTable::new(Vec::new(), 10, Locale::Vi);
        let view = table.view(&rows(2), Viewport::Desktop);
        assert_eq!(view.column_count(), 1);
        assert_eq!(view.header[0].label, INDEX_HEADER);
    }

    #[test]
    fn row_numbers_follow_page_offset() {
        let mut table = DataTable::new(columns(), 10, Locale::Vi);
        table.pagination_mut().set_total(100);
        table.pagination_mut().set_page(3);
        let view = table.view(&rows(10), Viewport::Desktop);
        let TableBody::Rows(view_rows) = view.body else {
            panic!("expected rows");
        };
        let numbers: Vec<usize> = view_rows.iter().map(|r| r.number).collect();
        assert_eq!(numbers, (31..=40).collect::<Vec<_>>());
    }

    #[test]
    fn cells_resolve_paths_and_formats() {
        let table = DataTable::new(columns(), 10, Locale::Vi);
        let view = table.view(&rows(1), Viewport::Desktop);
        assert_eq!(
            cell_texts(&view, 0),
            vec!["Product 0", "Dairy", "1.000 VND", "05/03/2024", "Không thời hạn"]
        );
    }

    #[test]
    fn responsive_hiding_applies_to_header_and_cells() {
        let table = DataTable::new(columns(), 10, Locale::Vi);

        let mobile = table.view(&rows(1), Viewport::Mobile);
        let labels: Vec<&str> = mobile.header.iter().map(|h| h.label.as_str()).collect();
        assert_eq!(labels, vec!["#", "Name", "Category", "Price"]);
        assert_eq!(cell_texts(&mobile, 0).len(), 3);

        let tablet = table.view(&rows(1), Viewport::Tablet);
        let labels: Vec<&str> = tablet.header.iter().map(|h| h.label.as_str()).collect();
        assert_eq!(labels, vec!["#", "Name", "Category", "Price", "Created"]);
    }

    #[test]
    fn custom_render_overrides_format() {
        let columns = vec![Column::new("sellingPrice", "Price")
            .format(Format::Price)
            .render(|value, _row: &Value| {
                CellText::plain(format!("~{}", value.and_then(Value::as_u64).unwrap_or(0)))
            })];
        let table = DataTable::new(columns, 10, Locale::Vi);
        let view = table.view(&rows(1), Viewport::Desktop);
        assert_eq!(cell_texts(&view, 0), vec!["~1000"]);
    }

    #[test]
    fn malformed_paths_render_blank() {
        let columns = vec![Column::new("category.name.first", "Broken")];
        let table = DataTable::new(columns, 10, Locale::Vi);
        let view = table.view(&rows(1), Viewport::Desktop);
        assert_eq!(cell_texts(&view, 0), vec![""]);
    }

    #[test]
    fn page_size_change_resets_page_and_emits_event() {
        let mut table = DataTable::new(columns(), 10, Locale::Vi);
        let data = rows(10);
        table.pagination_mut().set_total(100);
        assert_eq!(
            table.apply(TableCommand::NextPage, &data),
            Some(TableEvent::PageChanged(1))
        );
        assert_eq!(
            table.apply(TableCommand::LargerPageSize, &data),
            Some(TableEvent::PageSizeChanged(25))
        );
        assert_eq!(table.pagination().page_index(), 0);
    }

    #[test]
    fn paging_stops_at_bounds() {
        let mut table = DataTable::new(columns(), 10, Locale::Vi);
        table.pagination_mut().set_total(5);
        assert_eq!(table.apply(TableCommand::NextPage, &rows(5)), None);
        assert_eq!(table.apply(TableCommand::PrevPage, &rows(5)), None);
    }

    #[test]
    fn selection_and_activation() {
        let mut table = DataTable::new(columns(), 10, Locale::Vi);
        let data = rows(3);
        table.sync_rows(data.len());
        assert_eq!(table.selected(), Some(0));

        table.apply(TableCommand::Down, &data);
        table.apply(TableCommand::Down, &data);
        table.apply(TableCommand::Down, &data);
        assert_eq!(table.selected(), Some(2));

        assert_eq!(
            table.apply(TableCommand::Activate, &data),
            Some(TableEvent::RowActivated("p-2".into()))
        );
        assert_eq!(
            table.apply(TableCommand::ActionMenu, &data),
            Some(TableEvent::ActionMenu("p-2".into()))
        );

        table.sync_rows(1);
        assert_eq!(table.selected(), Some(0));
        table.sync_rows(0);
        assert_eq!(table.apply(TableCommand::Activate, &[]), None);
    }
}
