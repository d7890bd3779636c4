//! Core screen trait

use super::Handled;
use crate::i18n::{Labels, Locale};
use crate::notify::Notice;
use crate::theme::Theme;
use crossterm::event::KeyEvent;
use ratatui::{layout::Rect, Frame};

/// Immutable context passed to screens during rendering
pub struct RenderContext<'a> {
    pub theme: &'a Theme,
    pub locale: Locale,
    pub labels: &'static Labels,
}

/// One tab of the application
///
/// Screens own their data and their background work. Network results arrive
/// on channels the screen drains in [`Screen::tick`], so nothing blocks the UI
/// loop.
pub trait Screen {
    fn title(&self) -> &str;

    /// Called every time the tab becomes active; the first call should fetch
    fn on_enter(&mut self) {}

    fn handle_key(&mut self, key: KeyEvent) -> Handled;

    /// Drain finished background work
    fn tick(&mut self) {}

    fn render(&mut self, f: &mut Frame, area: Rect, ctx: &RenderContext);

    /// Notices raised since the last call
    fn take_notices(&mut self) -> Vec<Notice> {
        Vec::new()
    }

    /// True while a text field has focus, so global keys like `q` type instead
    fn captures_input(&self) -> bool {
        false
    }

    /// Short key reference for the status bar
    fn key_hints(&self) -> &'static str {
        ""
    }
}
