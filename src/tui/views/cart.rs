// Cart screen
//
// Renders `CartState` and feeds key presses into it. Every accepted edit is
// offered to `CartSync`, which debounces and writes in the background; events
// from the writer are folded back in on `tick`.

use crate::cart::{CartBackend, CartEvent, CartState, CartSync, LineState, PendingUpdate};
use crate::i18n::{Labels, Locale};
use crate::notify::Notice;
use crate::table::format::group_number;
use crate::tui::traits::{Handled, RenderContext, Screen};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

pub struct CartScreen<B: CartBackend> {
    state: CartState,
    sync: CartSync<B>,
    events: mpsc::UnboundedReceiver<CartEvent>,
    selected: usize,
    /// Typing into the selected line's quantity field
    editing: bool,
    locale: Locale,
    labels: &'static Labels,
    notices: Vec<Notice>,
    entered: bool,
}

impl<B: CartBackend> CartScreen<B> {
    pub fn new(backend: Arc<B>, delay: Duration, locale: Locale) -> Self {
        let (sync, events) = CartSync::spawn(backend, delay);
        Self {
            state: CartState::new(),
            sync,
            events,
            selected: 0,
            editing: false,
            locale,
            labels: locale.labels(),
            notices: Vec::new(),
            entered: false,
        }
    }

    fn selected_id(&self) -> Option<String> {
        self.state
            .lines()
            .get(self.selected)
            .map(|l| l.cart_id.clone())
    }

    fn reload(&mut self) {
        self.state.set_loading(true);
        self.sync.reload();
    }

    fn offer(&mut self, update: PendingUpdate) {
        let cart_id = update.cart_id.clone();
        if let Some(old) = self.sync.offer(update) {
            // The other line's edit will never be sent
            if old.cart_id != cart_id {
                self.state.settle(&old.cart_id, old.quantity);
            }
        }
    }

    /// Leave the quantity field of the selected line
    fn commit(&mut self) {
        self.editing = false;
        if let Some(id) = self.selected_id() {
            if let Some(update) = self.state.commit_quantity(&id) {
                self.offer(update);
            }
        }
    }

    fn type_digit(&mut self, id: &str, digit: char) {
        let mut text = if self.editing {
            self.state.draft(id).unwrap_or("").to_string()
        } else {
            String::new()
        };
        text.push(digit);
        if self.state.type_quantity(id, &text) {
            self.editing = true;
        }
    }

    fn move_selection(&mut self, down: bool) {
        if self.editing {
            self.commit();
        }
        let len = self.state.lines().len();
        if len == 0 {
            return;
        }
        self.selected = if down {
            (self.selected + 1).min(len - 1)
        } else {
            self.selected.saturating_sub(1)
        };
    }

    fn price(&self, value: f64) -> String {
        format!("{} VND", group_number(value, self.locale))
    }

    fn quantity_cell(&self, index: usize) -> String {
        let Some(line) = self.state.lines().get(index) else {
            return String::new();
        };
        let marker = match line.state {
            LineState::Stable => " ",
            LineState::LocallyEdited => "*",
            LineState::PendingSync => "…",
        };
        match (&line.draft, self.editing && index == self.selected) {
            (Some(draft), true) => format!("[{}▏]{}", draft, marker),
            _ => format!("‹ {} ›{}", line.quantity, marker),
        }
    }
}

impl<B: CartBackend> Screen for CartScreen<B> {
    fn title(&self) -> &str {
        self.locale.pick("Giỏ hàng", "Cart")
    }

    fn on_enter(&mut self) {
        if !self.entered {
            self.entered = true;
            self.reload();
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Handled {
        let Some(id) = self.selected_id() else {
            return match key.code {
                KeyCode::Char('r') => {
                    self.reload();
                    Handled::Yes
                }
                _ => Handled::No,
            };
        };

        match key.code {
            KeyCode::Char(d) if d.is_ascii_digit() => self.type_digit(&id, d),
            KeyCode::Backspace if self.editing => {
                let mut text = self.state.draft(&id).unwrap_or("").to_string();
                text.pop();
                self.state.type_quantity(&id, &text);
            }
            KeyCode::Enter | KeyCode::Esc | KeyCode::Tab if self.editing => self.commit(),
            KeyCode::Up | KeyCode::Char('k') => self.move_selection(false),
            KeyCode::Down | KeyCode::Char('j') => self.move_selection(true),
            KeyCode::Char('+') | KeyCode::Char('=') | KeyCode::Right => {
                if self.editing {
                    self.commit();
                }
                if let Some(update) = self.state.increment(&id) {
                    self.offer(update);
                }
            }
            KeyCode::Char('-') | KeyCode::Left => {
                if self.editing {
                    self.commit();
                }
                if let Some(update) = self.state.decrement(&id) {
                    self.offer(update);
                }
            }
            KeyCode::Char('d') | KeyCode::Delete => {
                self.editing = false;
                self.sync.remove(&id);
            }
            KeyCode::Char('r') => self.reload(),
            _ => return Handled::No,
        }
        Handled::Yes
    }

    fn tick(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            if let Some(notice) = self.state.apply(event, self.labels) {
                self.notices.push(notice);
            }
        }
        let len = self.state.lines().len();
        if self.selected >= len {
            self.selected = len.saturating_sub(1);
            self.editing = false;
        }
    }

    fn render(&mut self, f: &mut Frame, area: Rect, ctx: &RenderContext) {
        let theme = ctx.theme;
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.border_focused))
            .title(Span::styled(
                format!(" {} ", self.title()),
                Style::default().fg(theme.title).add_modifier(Modifier::BOLD),
            ));
        let inner = block.inner(area);
        f.render_widget(block, area);

        let [body, footer] =
            Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(inner);

        if self.state.is_loading() && !self.state.is_loaded() {
            f.render_widget(
                Paragraph::new(ctx.labels.loading).style(Style::default().fg(theme.skeleton)),
                body,
            );
            return;
        }
        if self.state.lines().is_empty() {
            f.render_widget(
                Paragraph::new(ctx.labels.no_data)
                    .alignment(Alignment::Center)
                    .style(Style::default().fg(theme.muted)),
                body,
            );
            return;
        }

        let header = Row::new(vec![
            Cell::from("#"),
            Cell::from(self.locale.pick("Sản phẩm", "Product")),
            Cell::from(Line::from(self.locale.pick("Đơn giá", "Price")).alignment(Alignment::Right)),
            Cell::from(Line::from(self.locale.pick("Số lượng", "Quantity")).alignment(Alignment::Center)),
            Cell::from(Line::from(self.locale.pick("Thành tiền", "Total")).alignment(Alignment::Right)),
        ])
        .style(Style::default().fg(theme.header).add_modifier(Modifier::BOLD));

        let rows: Vec<Row> = self
            .state
            .lines()
            .iter()
            .enumerate()
            .map(|(i, line)| {
                let qty_color = match line.state {
                    LineState::Stable => theme.text,
                    LineState::LocallyEdited => theme.accent,
                    LineState::PendingSync => theme.muted,
                };
                Row::new(vec![
                    Cell::from(Line::from((i + 1).to_string()).alignment(Alignment::Right))
                        .style(Style::default().fg(theme.muted)),
                    Cell::from(line.product_name.clone()).style(Style::default().fg(theme.text)),
                    Cell::from(Line::from(self.price(line.selling_price)).alignment(Alignment::Right))
                        .style(Style::default().fg(theme.text)),
                    Cell::from(Line::from(self.quantity_cell(i)).alignment(Alignment::Center))
                        .style(Style::default().fg(qty_color)),
                    Cell::from(Line::from(self.price(line.line_total())).alignment(Alignment::Right))
                        .style(Style::default().fg(theme.success)),
                ])
            })
            .collect();

        let widths = [
            Constraint::Length(3),
            Constraint::Min(16),
            Constraint::Length(14),
            Constraint::Length(12),
            Constraint::Length(16),
        ];
        let table = Table::new(rows, widths)
            .header(header)
            .column_spacing(2)
            .row_highlight_style(Style::default().bg(theme.selection_bg));
        let mut state = TableState::default().with_selected(Some(self.selected));
        f.render_stateful_widget(table, body, &mut state);

        let total = format!(
            "{}: {}",
            self.locale.pick("Tổng cộng", "Total"),
            self.price(self.state.total())
        );
        f.render_widget(
            Paragraph::new(total)
                .alignment(Alignment::Right)
                .style(Style::default().fg(theme.title).add_modifier(Modifier::BOLD)),
            footer,
        );
    }

    fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    fn captures_input(&self) -> bool {
        self.editing
    }

    fn key_hints(&self) -> &'static str {
        if self.editing {
            self.locale.pick("Enter xác nhận · Backspace xóa số", "Enter confirm · Backspace erase")
        } else {
            self.locale.pick(
                "↑↓ chọn · +/- số lượng · 0-9 nhập số lượng · d xóa · r tải lại",
                "↑↓ select · +/- quantity · 0-9 type quantity · d remove · r reload",
            )
        }
    }
}

impl<B: CartBackend> Drop for CartScreen<B> {
    fn drop(&mut self) {
        // Unsent edits are discarded on teardown
        self.sync.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiClient;
    use crate::demo;
    use crate::session::{RequestContext, Session};
    use crossterm::event::KeyModifiers;
    use tokio::sync::oneshot;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    async fn open_cart(signed_in: bool) -> (CartScreen<ApiClient>, ApiClient, oneshot::Sender<()>) {
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let addr = demo::start_demo_server("127.0.0.1:0".parse().unwrap(), shutdown_rx)
            .await
            .unwrap();
        let context = if signed_in {
            RequestContext::with_session(Session::new("demo-token", Some("demo".into())))
        } else {
            RequestContext::anonymous()
        };
        let client = ApiClient::new(format!("http://{}", addr), Duration::from_secs(5), context).unwrap();
        let screen = CartScreen::new(Arc::new(client.clone()), Duration::from_millis(30), Locale::En);
        (screen, client, shutdown_tx)
    }

    async fn pump(screen: &mut CartScreen<ApiClient>, ms: u64) {
        for _ in 0..(ms / 10) {
            tokio::time::sleep(Duration::from_millis(10)).await;
            screen.tick();
        }
    }

    #[tokio::test]
    async fn loads_cart_on_first_enter() {
        let (mut screen, _client, _shutdown) = open_cart(true).await;
        screen.on_enter();
        pump(&mut screen, 200).await;

        assert!(screen.state.is_loaded());
        assert_eq!(screen.state.lines().len(), 3);
        assert!(screen.take_notices().is_empty());
    }

    #[tokio::test]
    async fn anonymous_cart_reports_expired_session() {
        let (mut screen, _client, _shutdown) = open_cart(false).await;
        screen.on_enter();
        pump(&mut screen, 200).await;

        assert_eq!(
            screen.take_notices(),
            vec![Notice::error(Locale::En.labels().unauthorized)]
        );
    }

    #[tokio::test]
    async fn rapid_increments_send_one_write() {
        let (mut screen, client, _shutdown) = open_cart(true).await;
        screen.on_enter();
        pump(&mut screen, 200).await;

        for _ in 0..3 {
            screen.handle_key(key(KeyCode::Char('+')));
        }
        assert_eq!(screen.state.lines()[0].quantity, 5);
        assert_eq!(screen.state.lines()[0].state, LineState::LocallyEdited);

        pump(&mut screen, 300).await;
        assert_eq!(screen.state.lines()[0].state, LineState::Stable);

        let items = client.fetch_cart().await.unwrap();
        assert_eq!(items[0].quantity, 5);
    }

    #[tokio::test]
    async fn typed_quantity_commits_on_enter() {
        let (mut screen, client, _shutdown) = open_cart(true).await;
        screen.on_enter();
        pump(&mut screen, 200).await;

        screen.handle_key(key(KeyCode::Char('1')));
        screen.handle_key(key(KeyCode::Char('0')));
        assert!(screen.captures_input());
        // 100 exceeds the 12 in stock and is rejected
        screen.handle_key(key(KeyCode::Char('0')));
        assert_eq!(screen.state.draft("cart-1"), Some("10"));

        screen.handle_key(key(KeyCode::Enter));
        assert!(!screen.captures_input());
        assert_eq!(screen.state.lines()[0].quantity, 10);

        pump(&mut screen, 300).await;
        assert_eq!(client.fetch_cart().await.unwrap()[0].quantity, 10);
    }

    #[tokio::test]
    async fn remove_refetches_cart() {
        let (mut screen, _client, _shutdown) = open_cart(true).await;
        screen.on_enter();
        pump(&mut screen, 200).await;

        screen.handle_key(key(KeyCode::Down));
        screen.handle_key(key(KeyCode::Char('d')));
        pump(&mut screen, 300).await;

        let ids: Vec<&str> = screen.state.lines().iter().map(|l| l.cart_id.as_str()).collect();
        assert_eq!(ids, vec!["cart-1", "cart-3"]);
        assert_eq!(
            screen.take_notices(),
            vec![Notice::success(Locale::En.labels().cart_removed)]
        );
    }
}
