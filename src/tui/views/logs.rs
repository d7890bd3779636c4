//! Logs screen
//!
//! Shows the in-memory log buffer, color-coded by level. Follows the tail
//! until the user scrolls up; `End` resumes following.

use crate::i18n::Locale;
use crate::logging::{LogBuffer, LogEntry, LogLevel};
use crate::notify::Notice;
use crate::theme::Theme;
use crate::tui::clipboard;
use crate::tui::traits::{Handled, RenderContext, Screen};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
    Frame,
};

pub struct LogsScreen {
    buffer: LogBuffer,
    level: LogLevel,
    /// `None` follows the newest entry
    selected: Option<usize>,
    entry_count: usize,
    locale: Locale,
    notices: Vec<Notice>,
}

impl LogsScreen {
    pub fn new(buffer: LogBuffer, locale: Locale) -> Self {
        Self {
            buffer,
            level: LogLevel::Info,
            selected: None,
            entry_count: 0,
            locale,
            notices: Vec::new(),
        }
    }

    fn entries(&self) -> Vec<LogEntry> {
        self.buffer.snapshot(self.level)
    }

    fn level_color(level: LogLevel, theme: &Theme) -> ratatui::style::Color {
        match level {
            LogLevel::Error => theme.danger,
            LogLevel::Warn => theme.title,
            LogLevel::Info => theme.info,
            LogLevel::Debug | LogLevel::Trace => theme.muted,
        }
    }

    fn scroll(&mut self, delta: isize) {
        if self.entry_count == 0 {
            return;
        }
        let last = self.entry_count - 1;
        let current = self.selected.unwrap_or(last);
        let next = current.saturating_add_signed(delta).min(last);
        self.selected = (next != last || delta < 0).then_some(next);
    }
}

impl Screen for LogsScreen {
    fn title(&self) -> &str {
        self.locale.pick("Nhật ký", "Logs")
    }

    fn handle_key(&mut self, key: KeyEvent) -> Handled {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.scroll(-1),
            KeyCode::Down | KeyCode::Char('j') => self.scroll(1),
            KeyCode::PageUp => self.scroll(-10),
            KeyCode::PageDown => self.scroll(10),
            KeyCode::Home | KeyCode::Char('g') => {
                self.selected = (self.entry_count > 0).then_some(0);
            }
            KeyCode::End | KeyCode::Char('G') => self.selected = None,
            KeyCode::Char('l') => {
                self.level = self.level.cycle();
                self.selected = None;
            }
            KeyCode::Char('c') => {
                self.buffer.clear();
                self.selected = None;
            }
            KeyCode::Char('y') => {
                let entries = self.entries();
                let entry = match self.selected {
                    Some(i) => entries.get(i),
                    None => entries.last(),
                };
                if let Some(entry) = entry {
                    let text = format!(
                        "{} {} {} {}",
                        entry.timestamp.format("%H:%M:%S%.3f"),
                        entry.level.as_str(),
                        entry.target,
                        entry.message
                    );
                    let labels = self.locale.labels();
                    self.notices.push(match clipboard::copy_to_clipboard(&text) {
                        Ok(()) => Notice::success(labels.copied),
                        Err(e) => {
                            tracing::warn!("Clipboard copy failed: {:#}", e);
                            Notice::error(labels.copy_failed)
                        }
                    });
                }
            }
            _ => return Handled::No,
        }
        Handled::Yes
    }

    fn render(&mut self, f: &mut Frame, area: Rect, ctx: &RenderContext) {
        let theme = ctx.theme;
        let entries = self.entries();
        self.entry_count = entries.len();
        if let Some(i) = self.selected {
            if i >= self.entry_count {
                self.selected = None;
            }
        }

        let items: Vec<ListItem> = entries
            .iter()
            .map(|entry| {
                ListItem::new(Line::from(vec![
                    Span::styled(
                        format!("{} ", entry.timestamp.format("%H:%M:%S")),
                        Style::default().fg(theme.muted),
                    ),
                    Span::styled(
                        format!("{:<5} ", entry.level.as_str()),
                        Style::default().fg(Self::level_color(entry.level, theme)),
                    ),
                    Span::styled(format!("{} ", entry.target), Style::default().fg(theme.muted)),
                    Span::styled(entry.message.clone(), Style::default().fg(theme.text)),
                ]))
            })
            .collect();

        let title = format!(
            " {} ({}, ≤{}) ",
            self.title(),
            self.entry_count,
            self.level.as_str()
        );
        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(theme.border_focused))
                    .title(Span::styled(
                        title,
                        Style::default().fg(theme.title).add_modifier(Modifier::BOLD),
                    )),
            )
            .highlight_style(Style::default().bg(theme.selection_bg));

        let position = self.selected.or(self.entry_count.checked_sub(1));
        let mut state = ListState::default().with_selected(position);
        f.render_stateful_widget(list, area, &mut state);
    }

    fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    fn key_hints(&self) -> &'static str {
        self.locale.pick(
            "↑↓ cuộn · End theo dõi · l mức log · c xóa · y sao chép",
            "↑↓ scroll · End follow · l level · c clear · y copy",
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Local;

    fn entry(level: LogLevel, message: &str) -> LogEntry {
        LogEntry {
            timestamp: Local::now(),
            level,
            target: "storedesk".into(),
            message: message.into(),
        }
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, crossterm::event::KeyModifiers::NONE)
    }

    #[test]
    fn level_filter_cycles_verbosity() {
        let buffer = LogBuffer::new();
        buffer.add(entry(LogLevel::Info, "info"));
        buffer.add(entry(LogLevel::Debug, "debug"));
        let mut screen = LogsScreen::new(buffer, Locale::En);

        assert_eq!(screen.entries().len(), 1);
        screen.handle_key(key(KeyCode::Char('l')));
        assert_eq!(screen.entries().len(), 2);
    }

    #[test]
    fn scrolling_leaves_and_resumes_follow() {
        let buffer = LogBuffer::new();
        for i in 0..5 {
            buffer.add(entry(LogLevel::Info, &format!("m{}", i)));
        }
        let mut screen = LogsScreen::new(buffer, Locale::En);
        screen.entry_count = 5;

        screen.handle_key(key(KeyCode::Up));
        assert_eq!(screen.selected, Some(3));
        screen.handle_key(key(KeyCode::Down));
        assert_eq!(screen.selected, None);

        screen.handle_key(key(KeyCode::Home));
        assert_eq!(screen.selected, Some(0));
        screen.handle_key(key(KeyCode::End));
        assert_eq!(screen.selected, None);
    }
}
