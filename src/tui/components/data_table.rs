// Data table component
//
// Draws a `TableView` with ratatui: bordered block, header row, body (rows,
// skeleton placeholders or a centered empty message) and a pagination footer.

use crate::i18n::Labels;
use crate::table::text::{column_widths, fit_width, footer, SKELETON};
use crate::table::{Align, CellText, HeaderCell, Pagination, TableBody, TableView};
use crate::theme::Theme;
use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

pub struct DataTableProps<'a> {
    pub title: &'a str,
    pub view: &'a TableView,
    pub pagination: &'a Pagination,
    pub selected: Option<usize>,
    pub focused: bool,
}

pub fn render(f: &mut Frame, area: Rect, props: &DataTableProps, theme: &Theme, labels: &Labels) {
    let border_color = if props.focused {
        theme.border_focused
    } else {
        theme.border
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(Span::styled(
            format!(" {} ", props.title),
            Style::default().fg(theme.title).add_modifier(Modifier::BOLD),
        ));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let [body_area, footer_area] =
        Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(inner);

    let view = props.view;
    let widths = column_widths(view);
    let constraints: Vec<Constraint> = widths
        .iter()
        .map(|&w| Constraint::Length(w as u16))
        .collect();

    let header = Row::new(
        view.header
            .iter()
            .zip(&widths)
            .map(|(h, &w)| aligned_cell(&fit_width(&h.label, w), h.align)),
    )
    .style(Style::default().fg(theme.header).add_modifier(Modifier::BOLD));

    let rows: Vec<Row> = match &view.body {
        TableBody::Skeleton(n) => {
            let line = Row::new(widths.iter().map(|_| Cell::from(SKELETON)))
                .style(Style::default().fg(theme.skeleton));
            vec![line; *n]
        }
        TableBody::Empty(_) => Vec::new(),
        TableBody::Rows(rows) => rows
            .iter()
            .map(|row| {
                let mut cells = Vec::with_capacity(widths.len());
                cells.push(
                    aligned_cell(&row.number.to_string(), view.header[0].align)
                        .style(Style::default().fg(theme.muted)),
                );
                for (i, cell) in row.cells.iter().enumerate() {
                    let (Some(header), Some(&w)) = (view.header.get(i + 1), widths.get(i + 1))
                    else {
                        continue;
                    };
                    cells.push(styled_cell(cell, header, w, theme));
                }
                Row::new(cells)
            })
            .collect(),
    };

    let table = Table::new(rows, constraints)
        .header(header)
        .column_spacing(2)
        .row_highlight_style(Style::default().bg(theme.selection_bg).add_modifier(Modifier::BOLD));

    let mut state = TableState::default();
    if matches!(view.body, TableBody::Rows(_)) {
        state.select(props.selected);
    }
    f.render_stateful_widget(table, body_area, &mut state);

    if let TableBody::Empty(message) = &view.body {
        // Below the header row
        let message_area = Rect {
            y: body_area.y + 2.min(body_area.height.saturating_sub(1)),
            height: 1,
            ..body_area
        };
        f.render_widget(
            Paragraph::new(message.as_str())
                .alignment(Alignment::Center)
                .style(Style::default().fg(theme.muted)),
            message_area,
        );
    }

    f.render_widget(
        Paragraph::new(footer(props.pagination, labels))
            .alignment(Alignment::Right)
            .style(Style::default().fg(theme.muted)),
        footer_area,
    );
}

fn aligned_cell(text: &str, align: Align) -> Cell<'static> {
    let alignment = match align {
        Align::Left => Alignment::Left,
        Align::Center => Alignment::Center,
        Align::Right => Alignment::Right,
    };
    Cell::from(Line::from(text.to_string()).alignment(alignment))
}

fn styled_cell(cell: &CellText, header: &HeaderCell, width: usize, theme: &Theme) -> Cell<'static> {
    let color = theme.tone(cell.tone);
    let style = if cell.badge {
        Style::default().fg(color).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(color)
    };
    aligned_cell(&fit_width(&cell.text, width), header.align).style(style)
}
