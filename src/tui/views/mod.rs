// Views module - screen-level rendering logic
//
// The shell is the same for every tab: title bar with tabs, the active
// screen, status bar. Toasts and the help overlay are drawn last so they sit
// on top.

mod cart;
mod form;
mod list;
mod logs;

pub use cart::CartScreen;
pub use list::ListScreen;
pub use logs::LogsScreen;

use super::app::App;
use super::components;
use super::layout::centered_rect;
use ratatui::{
    layout::{Constraint, Layout},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

/// Main UI render function - called on every frame
pub fn draw(f: &mut Frame, app: &mut App) {
    let [title, body, status] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(6),
        Constraint::Length(2),
    ])
    .areas(f.area());

    components::title_bar::render(f, title, app);

    let theme = app.theme.clone();
    let ctx = super::traits::RenderContext {
        theme: &theme,
        locale: app.locale,
        labels: app.locale.labels(),
    };
    if let Some(screen) = app.screens.get_mut(app.active) {
        screen.render(f, body, &ctx);
    }

    components::status_bar::render(f, status, app);
    app.toasts.render(f, body, &app.theme);

    if app.show_help {
        render_help(f, app);
    }
}

fn render_help(f: &mut Frame, app: &App) {
    let theme = &app.theme;
    let locale = app.locale;
    let rows: [(&str, &str); 8] = [
        ("Tab / Shift+Tab", locale.pick("Chuyển tab", "Switch tab")),
        ("F1-F8", locale.pick("Mở tab theo số", "Jump to tab")),
        ("t", locale.pick("Đổi giao diện", "Cycle theme")),
        ("/", locale.pick("Tìm kiếm", "Search")),
        ("s", locale.pick("Lọc trạng thái", "Status filter")),
        ("← →  [ ]", locale.pick("Trang / cỡ trang", "Page / page size")),
        ("Enter / m", locale.pick("Chi tiết / thao tác", "Details / actions")),
        ("q / Ctrl+C", locale.pick("Thoát", "Quit")),
    ];

    let mut lines: Vec<Line> = rows
        .iter()
        .map(|(keys, what)| {
            Line::from(vec![
                Span::styled(
                    format!("{:>16}  ", keys),
                    Style::default().fg(theme.accent).add_modifier(Modifier::BOLD),
                ),
                Span::styled(*what, Style::default().fg(theme.text)),
            ])
        })
        .collect();
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        app.active_screen_hints(),
        Style::default().fg(theme.muted),
    )));

    let area = centered_rect(64, lines.len() as u16 + 2, f.area());
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border_focused))
        .title(Span::styled(
            " ? ",
            Style::default().fg(theme.title).add_modifier(Modifier::BOLD),
        ));
    f.render_widget(Clear, area);
    f.render_widget(
        Paragraph::new(lines)
            .block(block)
            .wrap(ratatui::widgets::Wrap { trim: true }),
        area,
    );
}
