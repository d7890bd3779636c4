//! Toast notification component
//!
//! A non-blocking overlay that auto-dismisses after a configurable duration.
//! Renders in the bottom-right corner on top of all other content. Errors stay
//! on screen longer than confirmations.

use crate::notify::{Notice, NoticeLevel};
use crate::theme::Theme;
use ratatui::{
    layout::{Alignment, Rect},
    style::Style,
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};
use std::collections::VecDeque;
use std::time::{Duration, Instant};
use unicode_width::UnicodeWidthStr;

/// At most this many toasts are stacked
const MAX_VISIBLE: usize = 3;

/// A toast notification that auto-dismisses
pub struct Toast {
    pub notice: Notice,
    created_at: Instant,
    duration: Duration,
}

impl Toast {
    pub fn new(notice: Notice) -> Self {
        let duration = match notice.level {
            NoticeLevel::Error => Duration::from_secs(5),
            NoticeLevel::Info | NoticeLevel::Success => Duration::from_secs(2),
        };
        Self {
            notice,
            created_at: Instant::now(),
            duration,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.created_at.elapsed() >= self.duration
    }

    /// Render the toast `offset` slots above the bottom-right corner
    ///
    /// Uses `Clear` widget to ensure toast is visible on top of other content.
    pub fn render(&self, f: &mut Frame, area: Rect, offset: u16, theme: &Theme) {
        // 2 chars padding each side plus border
        let width = (self.notice.message.width() as u16 + 4).min(area.width.saturating_sub(4));
        let height = 3;

        let x = area.right().saturating_sub(width + 2);
        let y = area.bottom().saturating_sub((height + 2) + offset * height);
        if y < area.y {
            return;
        }

        let toast_area = Rect::new(x, y, width, height);
        let color = theme.notice(self.notice.level);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(color));

        let text = Paragraph::new(self.notice.message.as_str())
            .alignment(Alignment::Center)
            .style(Style::default().fg(color))
            .block(block);

        f.render_widget(Clear, toast_area);
        f.render_widget(text, toast_area);
    }
}

/// Queue of live toasts, newest at the bottom
#[derive(Default)]
pub struct Toasts {
    items: VecDeque<Toast>,
}

impl Toasts {
    pub fn push(&mut self, notice: Notice) {
        self.items.push_back(Toast::new(notice));
        while self.items.len() > MAX_VISIBLE {
            self.items.pop_front();
        }
    }

    /// Drop expired toasts
    pub fn tick(&mut self) {
        self.items.retain(|t| !t.is_expired());
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn render(&self, f: &mut Frame, area: Rect, theme: &Theme) {
        for (offset, toast) in self.items.iter().rev().enumerate() {
            toast.render(f, area, offset as u16, theme);
        }
    }
}
