//! Plain-text rendering of a [`TableView`] for the headless CLI
//!
//! Widths are measured in terminal cells (unicode-width) so Vietnamese
//! diacritics and CJK product names line up.

use super::{Align, Pagination, TableBody, TableView};
use crate::i18n::Labels;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

pub(crate) const SKELETON: &str = "░░░░";
const COLUMN_GAP: &str = "  ";

/// Render the table plus a pagination footer
pub fn render_plain(view: &TableView, pagination: &Pagination, labels: &Labels) -> String {
    let widths = column_widths(view);
    let mut out = String::new();

    let header: Vec<String> = view
        .header
        .iter()
        .zip(&widths)
        .map(|(h, &w)| pad(&h.label, w, h.align))
        .collect();
    out.push_str(header.join(COLUMN_GAP).trim_end());
    out.push('\n');

    let rule_width = widths.iter().sum::<usize>() + COLUMN_GAP.len() * widths.len().saturating_sub(1);
    out.push_str(&"─".repeat(rule_width));
    out.push('\n');

    match &view.body {
        TableBody::Skeleton(n) => {
            let line: Vec<String> = widths
                .iter()
                .map(|&w| pad(SKELETON, w, Align::Left))
                .collect();
            for _ in 0..*n {
                out.push_str(line.join(COLUMN_GAP).trim_end());
                out.push('\n');
            }
        }
        TableBody::Empty(message) => {
            out.push_str(&pad(message, rule_width, Align::Center));
            out.push('\n');
        }
        TableBody::Rows(rows) => {
            for row in rows {
                let mut cells = Vec::with_capacity(widths.len());
                cells.push(pad(&row.number.to_string(), widths[0], view.header[0].align));
                for (i, cell) in row.cells.iter().enumerate() {
                    let header = &view.header[i + 1];
                    cells.push(pad(&cell.text, widths[i + 1], header.align));
                }
                out.push_str(cells.join(COLUMN_GAP).trim_end());
                out.push('\n');
            }
        }
    }

    out.push_str(&footer(pagination, labels));
    out.push('\n');
    out
}

/// `Rows per page: 10 · 1–10 of 57 · Page 1/6`
pub fn footer(pagination: &Pagination, labels: &Labels) -> String {
    let (first, last) = pagination.visible_range();
    format!(
        "{}: {} · {}–{} {} {} · {} {}/{}",
        labels.rows_per_page,
        pagination.page_size(),
        first,
        last,
        labels.of,
        pagination.total(),
        labels.page,
        pagination.page_index() + 1,
        pagination.page_count()
    )
}

pub(crate) fn column_widths(view: &TableView) -> Vec<usize> {
    let mut widths: Vec<usize> = view
        .header
        .iter()
        .map(|h| h.label.width().max(h.min_width.unwrap_or(0) as usize))
        .collect();

    if let TableBody::Rows(rows) = &view.body {
        for row in rows {
            widths[0] = widths[0].max(row.number.to_string().len());
            for (i, cell) in row.cells.iter().enumerate() {
                if let Some(w) = widths.get_mut(i + 1) {
                    *w = (*w).max(cell.text.width());
                }
            }
        }
    } else if let TableBody::Skeleton(_) = &view.body {
        for w in widths.iter_mut() {
            *w = (*w).max(SKELETON.width());
        }
    }

    for (w, h) in widths.iter_mut().zip(&view.header) {
        if let Some(max) = h.max_width {
            *w = (*w).min(max as usize);
        }
    }
    widths
}

/// Fit `text` into exactly `width` cells, cutting with an ellipsis if needed
fn pad(text: &str, width: usize, align: Align) -> String {
    let fitted = fit_width(text, width);
    let gap = width.saturating_sub(fitted.width());
    match align {
        Align::Left => format!("{}{}", fitted, " ".repeat(gap)),
        Align::Right => format!("{}{}", " ".repeat(gap), fitted),
        Align::Center => {
            let left = gap / 2;
            format!("{}{}{}", " ".repeat(left), fitted, " ".repeat(gap - left))
        }
    }
}

pub fn fit_width(text: &str, width: usize) -> String {
    if text.width() <= width {
        return text.to_string();
    }
    if width == 0 {
        return String::new();
    }

    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w + 1 > width {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::Locale;
    use crate::table::{Column, DataTable, Format, Viewport};
    use serde_json::{json, Value};

    fn table() -> DataTable<Value> {
        DataTable::new(
            vec![
                Column::new("name", "Name").max_width(12),
                Column::new("sellingPrice", "Price")
                    .format(Format::Price)
                    .align(Align::Right),
            ],
            10,
            Locale::Vi,
        )
    }

    #[test]
    fn renders_rows_with_numbers_and_footer() {
        let mut table = table();
        table.pagination_mut().set_total(12);
        table.pagination_mut().set_page(1);
        let rows = vec![
            json!({"id": "a", "name": "Sữa chua", "sellingPrice": 15000}),
            json!({"id": "b", "name": "Bánh mì", "sellingPrice": 8000}),
        ];
        let out = render_plain(
            &table.view(&rows, Viewport::Desktop),
            table.pagination(),
            Locale::En.labels(),
        );
        let lines: Vec<&str> = out.lines().collect();
        assert!(lines[0].starts_with("  #  Name"));
        assert!(lines[2].starts_with(" 11  Sữa chua"));
        assert!(lines[2].ends_with("15.000 VND"));
        assert!(lines[3].starts_with(" 12  Bánh mì"));
        assert_eq!(lines[4], "Rows per page: 10 · 11–12 of 12 · Page 2/2");
    }

    #[test]
    fn long_text_is_cut_to_max_width() {
        let table = table();
        let rows = vec![json!({"id": "a", "name": "Nước giải khát có ga", "sellingPrice": 1})];
        let out = render_plain(
            &table.view(&rows, Viewport::Desktop),
            table.pagination(),
            Locale::En.labels(),
        );
        assert!(out.contains("Nước giải k…"));
    }

    #[test]
    fn skeleton_prints_page_size_lines() {
        let mut table = table();
        table.set_loading(true);
        let out = render_plain(
            &table.view(&[], Viewport::Desktop),
            table.pagination(),
            Locale::En.labels(),
        );
        assert_eq!(out.lines().filter(|l| l.contains(SKELETON)).count(), 10);
    }

    #[test]
    fn empty_state_prints_message() {
        let table: DataTable<Value> =
            DataTable::new(vec![Column::new("name", "Name")], 10, Locale::En);
        let out = render_plain(
            &table.view(&[], Viewport::Desktop),
            table.pagination(),
            Locale::En.labels(),
        );
        assert!(out.contains("No data"));
        assert!(out.contains("0–0 of 0"));

        let vi = self::table();
        let out = render_plain(
            &vi.view(&[], Viewport::Desktop),
            vi.pagination(),
            Locale::Vi.labels(),
        );
        assert!(out.contains(Locale::Vi.labels().no_data));
    }

    #[test]
    fn fit_width_respects_cells() {
        assert_eq!(fit_width("abc", 5), "abc");
        assert_eq!(fit_width("abcdef", 4), "abc…");
        assert_eq!(fit_width("abcdef", 0), "");
    }
}
