// Status bar component
//
// Renders at the bottom: who is signed in, which API is targeted and the
// active screen's key hints.

use crate::i18n::Locale;
use crate::session::Session;
use crate::table::Viewport;
use crate::tui::app::App;
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// User name, else the token fingerprint, else "guest"
fn user_label(session: Option<Session>, locale: Locale) -> String {
    match session {
        Some(session) => {
            let fingerprint = session.fingerprint();
            format!("👤 {}", session.user_name.unwrap_or(fingerprint))
        }
        None => format!("👤 {}", locale.pick("khách", "guest")),
    }
}

/// Render the status bar
///
/// Adapts to terminal width:
/// - Wide: user, API URL and key hints
/// - Narrow: user and key hints only
pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let user = user_label(app.context.current(), app.locale);

    let mut spans = vec![Span::styled(format!(" {} ", user), Style::default().fg(theme.status_bar))];
    if Viewport::from_width(area.width) == Viewport::Desktop {
        spans.push(Span::styled(
            format!("│ {} │ {} │ ⏱ {} ", app.api_url, app.locale.code(), app.uptime()),
            Style::default().fg(theme.muted),
        ));
    }
    spans.push(Span::styled(
        format!("│ {} · ? help · q quit", app.active_screen_hints()),
        Style::default().fg(theme.muted),
    ));

    let status = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(Style::default().fg(theme.border)),
    );

    f.render_widget(status, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_label_prefers_name_then_fingerprint() {
        let named = Session::new("token", Some("admin".into()));
        assert_eq!(user_label(Some(named), Locale::En), "👤 admin");

        let anonymous = Session::new("token", None);
        let fingerprint = anonymous.fingerprint();
        assert_eq!(user_label(Some(anonymous), Locale::En), format!("👤 {}", fingerprint));

        assert_eq!(user_label(None, Locale::En), "👤 guest");
        assert_eq!(user_label(None, Locale::Vi), "👤 khách");
    }
}
