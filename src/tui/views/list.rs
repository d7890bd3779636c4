// Generic list screen
//
// One instance per browsable resource. Owns the fetched page of rows, the
// `DataTable` presentation state, the debounced search box and the status
// filter. Every network call runs in a spawned task and reports back on the
// screen's channel; `tick` folds the results in.
//
// List fetches are tagged with a sequence number but applied in arrival order.
// A response older than the latest request is logged at debug level.

use crate::api::{
    ApiClient, ApiError, ListQuery, Mutation, Page, Resource, StatusFilter,
};
use crate::debounce::Debouncer;
use crate::i18n::{Labels, Locale};
use crate::notify::Notice;
use crate::table::{DataTable, ResponsiveConfig, TableCommand, TableEvent, TableRow, Viewport};
use crate::tui::clipboard;
use crate::tui::components::data_table::{self, DataTableProps};
use crate::tui::input::{InputOutcome, TextInput};
use crate::tui::layout::centered_rect;
use crate::tui::traits::{Handled, RenderContext, Screen};
use crate::tui::views::form::{DetailView, FormOutcome, FormView};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
    Frame,
};
use std::marker::PhantomData;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::mpsc;

/// Background results for one list screen
enum ListMessage<R> {
    Page {
        seq: u64,
        result: Result<Page<R>, ApiError>,
    },
    Saved(Result<Option<String>, ApiError>),
    Deleted(Result<Option<String>, ApiError>),
    Exported(Result<PathBuf, String>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuAction {
    View,
    Edit,
    Delete,
    CopyJson,
    Export,
}

impl MenuAction {
    fn label(&self, locale: Locale) -> &'static str {
        match self {
            MenuAction::View => locale.pick("Xem chi tiết", "View details"),
            MenuAction::Edit => locale.pick("Chỉnh sửa", "Edit"),
            MenuAction::Delete => locale.pick("Xóa", "Delete"),
            MenuAction::CopyJson => locale.pick("Sao chép JSON", "Copy JSON"),
            MenuAction::Export => locale.pick("Xuất Excel", "Export spreadsheet"),
        }
    }
}

enum Overlay {
    Detail(DetailView),
    Menu {
        id: String,
        actions: Vec<MenuAction>,
        selected: usize,
    },
    ConfirmDelete {
        id: String,
    },
    Form(FormView),
}

pub struct ListScreen<Res: Resource> {
    client: ApiClient,
    locale: Locale,
    labels: &'static Labels,
    title: String,
    table: DataTable<Res::Row>,
    rows: Vec<Res::Row>,

    search: TextInput,
    searching: bool,
    applied_search: String,
    search_debounce: Debouncer<String>,
    search_rx: mpsc::UnboundedReceiver<String>,
    status: Option<StatusFilter>,

    tx: mpsc::UnboundedSender<ListMessage<Res::Row>>,
    rx: mpsc::UnboundedReceiver<ListMessage<Res::Row>>,
    issued: u64,
    entered: bool,

    overlay: Option<Overlay>,
    notices: Vec<Notice>,
    export_dir: PathBuf,
    _resource: PhantomData<Res>,
}

impl<Res: Resource> ListScreen<Res> {
    pub fn new(
        client: ApiClient,
        locale: Locale,
        page_size: usize,
        search_delay: Duration,
        responsive: ResponsiveConfig,
        export_dir: PathBuf,
    ) -> Self {
        let table = DataTable::new(Res::columns(locale), page_size, locale).with_responsive(responsive);
        let (search_debounce, search_rx) = Debouncer::spawn(search_delay);
        let (tx, rx) = mpsc::unbounded_channel();

        Self {
            client,
            locale,
            labels: locale.labels(),
            title: Res::title(locale).to_string(),
            table,
            rows: Vec::new(),
            search: TextInput::default(),
            searching: false,
            applied_search: String::new(),
            search_debounce,
            search_rx,
            status: None,
            tx,
            rx,
            issued: 0,
            entered: false,
            overlay: None,
            notices: Vec::new(),
            export_dir,
            _resource: PhantomData,
        }
    }

    fn editable(&self) -> bool {
        !Res::form_fields(self.locale).is_empty()
    }

    fn query(&self) -> ListQuery {
        let p = self.table.pagination();
        ListQuery::page(p.page_index(), p.page_size())
            .search(self.applied_search.clone())
            .status(self.status)
    }

    fn fetch(&mut self) {
        self.issued += 1;
        let seq = self.issued;
        let query = self.query();
        let client = self.client.clone();
        let tx = self.tx.clone();
        self.table.set_loading(true);

        tokio::spawn(async move {
            let result = client.list::<Res::Row>(Res::PATH, &query).await;
            let _ = tx.send(ListMessage::Page { seq, result });
        });
    }

    fn apply_page(&mut self, seq: u64, result: Result<Page<Res::Row>, ApiError>) {
        if seq < self.issued {
            tracing::debug!(resource = Res::PATH, seq, latest = self.issued, "Applying stale list response");
        } else {
            self.table.set_loading(false);
        }

        match result {
            Ok(page) => {
                tracing::debug!(resource = Res::PATH, items = page.items.len(), total = page.total_items_count, "Page loaded");
                self.table.pagination_mut().set_total(page.total_items_count);
                self.rows = page.items;
            }
            Err(error) => {
                self.rows.clear();
                self.table.pagination_mut().set_total(0);
                self.notices
                    .push(Notice::from_api_error(&error, self.labels.load_failed, self.labels));
            }
        }
        self.table.sync_rows(self.rows.len());
    }

    fn apply_search(&mut self, term: String) {
        let term = term.trim().to_string();
        if term == self.applied_search {
            return;
        }
        tracing::debug!(resource = Res::PATH, %term, "Search settled");
        self.applied_search = term;
        self.table.pagination_mut().reset();
        self.fetch();
    }

    fn cycle_status(&mut self) {
        self.status = StatusFilter::cycle(self.status);
        self.table.pagination_mut().reset();
        self.fetch();
    }

    fn handle_table_event(&mut self, event: TableEvent) {
        match event {
            TableEvent::PageChanged(_) | TableEvent::PageSizeChanged(_) => self.fetch(),
            TableEvent::RowActivated(id) => self.open_detail(&id),
            TableEvent::ActionMenu(id) => {
                let mut actions = vec![MenuAction::View];
                if self.editable() {
                    actions.push(MenuAction::Edit);
                }
                actions.extend([MenuAction::Delete, MenuAction::CopyJson, MenuAction::Export]);
                self.overlay = Some(Overlay::Menu {
                    id,
                    actions,
                    selected: 0,
                });
            }
        }
    }

    fn row(&self, id: &str) -> Option<&Res::Row> {
        self.rows.iter().find(|r| r.row_id() == id)
    }

    fn selected_id(&self) -> Option<String> {
        self.table.selected_row(&self.rows).map(TableRow::row_id)
    }

    fn open_detail(&mut self, id: &str) {
        if let Some(row) = self.row(id) {
            self.overlay = Some(Overlay::Detail(DetailView::new(row, self.table.columns(), self.locale)));
        }
    }

    fn open_create(&mut self) {
        if self.editable() {
            self.overlay = Some(Overlay::Form(FormView::create(
                Res::form_fields(self.locale),
                self.labels,
            )));
        }
    }

    fn open_edit(&mut self, id: &str) {
        if !self.editable() {
            return;
        }
        let Some(row) = self.row(id) else {
            return;
        };
        let entity = serde_json::to_value(row).unwrap_or_default();
        self.overlay = Some(Overlay::Form(FormView::edit(
            Res::form_fields(self.locale),
            self.labels,
            id,
            &entity,
        )));
    }

    fn copy_row(&mut self, id: &str) {
        let Some(row) = self.row(id) else {
            return;
        };
        let notice = match clipboard::copy_json(row) {
            Ok(()) => Notice::success(self.labels.copied),
            Err(e) => {
                tracing::warn!("Clipboard copy failed: {:#}", e);
                Notice::error(self.labels.copy_failed)
            }
        };
        self.notices.push(notice);
    }

    fn submit(&mut self, body: serde_json::Value, editing_id: Option<String>) {
        let client = self.client.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = match editing_id {
                Some(id) => client.update::<_, serde_json::Value>(&Res::item_path(&id), &body).await,
                None => client.create::<_, serde_json::Value>(Res::PATH, &body).await,
            };
            let _ = tx.send(ListMessage::Saved(result.map(|m| mutation_message(&m))));
        });
    }

    fn delete(&mut self, id: String) {
        let client = self.client.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = client.delete(&Res::item_path(&id)).await;
            let _ = tx.send(ListMessage::Deleted(result.map(|m| mutation_message(&m))));
        });
    }

    fn export(&mut self) {
        let client = self.client.clone();
        let tx = self.tx.clone();
        let query = self.query();
        let path = self.export_dir.join(format!(
            "{}-{}.xlsx",
            Res::PATH.trim_start_matches('/'),
            chrono::Local::now().format("%Y%m%d-%H%M%S")
        ));
        tokio::spawn(async move {
            let result = match client.export(&Res::KIND.export_path(), &query).await {
                Ok(bytes) => tokio::fs::write(&path, bytes)
                    .await
                    .map(|()| path)
                    .map_err(|e| e.to_string()),
                Err(e) => Err(e.to_string()),
            };
            let _ = tx.send(ListMessage::Exported(result));
        });
    }

    fn apply_message(&mut self, message: ListMessage<Res::Row>) {
        match message {
            ListMessage::Page { seq, result } => self.apply_page(seq, result),
            ListMessage::Saved(result) => match result {
                Ok(message) => {
                    self.overlay = None;
                    self.notices.push(Notice::success(message.unwrap_or_else(|| self.labels.saved.to_string())));
                    self.fetch();
                }
                Err(error) => {
                    if let Some(Overlay::Form(form)) = &mut self.overlay {
                        form.set_submitting(false);
                    }
                    self.notices
                        .push(Notice::from_api_error(&error, self.labels.save_failed, self.labels));
                }
            },
            ListMessage::Deleted(result) => match result {
                Ok(message) => {
                    self.notices.push(Notice::success(message.unwrap_or_else(|| self.labels.deleted.to_string())));
                    self.fetch();
                }
                Err(error) => self
                    .notices
                    .push(Notice::from_api_error(&error, self.labels.delete_failed, self.labels)),
            },
            ListMessage::Exported(result) => match result {
                Ok(path) => self.notices.push(Notice::success(path.display().to_string())),
                Err(error) => {
                    tracing::warn!(resource = Res::PATH, %error, "Export failed");
                    self.notices.push(Notice::error(self.locale.pick("Xuất file thất bại", "Export failed")));
                }
            },
        }
    }

    fn handle_overlay_key(&mut self, key: KeyEvent) -> Handled {
        let Some(overlay) = self.overlay.take() else {
            return Handled::No;
        };

        match overlay {
            Overlay::Detail(detail) => match key.code {
                KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') => {}
                KeyCode::Char('y') => {
                    let id = detail.id.clone();
                    self.overlay = Some(Overlay::Detail(detail));
                    self.copy_row(&id);
                }
                _ => self.overlay = Some(Overlay::Detail(detail)),
            },
            Overlay::Menu {
                id,
                actions,
                mut selected,
            } => match key.code {
                KeyCode::Esc => {}
                KeyCode::Up | KeyCode::Char('k') => {
                    selected = selected.saturating_sub(1);
                    self.overlay = Some(Overlay::Menu { id, actions, selected });
                }
                KeyCode::Down | KeyCode::Char('j') => {
                    selected = (selected + 1).min(actions.len().saturating_sub(1));
                    self.overlay = Some(Overlay::Menu { id, actions, selected });
                }
                KeyCode::Enter => match actions.get(selected) {
                    Some(MenuAction::View) => self.open_detail(&id),
                    Some(MenuAction::Edit) => self.open_edit(&id),
                    Some(MenuAction::Delete) => self.overlay = Some(Overlay::ConfirmDelete { id }),
                    Some(MenuAction::CopyJson) => self.copy_row(&id),
                    Some(MenuAction::Export) => self.export(),
                    None => {}
                },
                _ => self.overlay = Some(Overlay::Menu { id, actions, selected }),
            },
            Overlay::ConfirmDelete { id } => match key.code {
                KeyCode::Char('y') | KeyCode::Enter => self.delete(id),
                KeyCode::Char('n') | KeyCode::Esc => {}
                _ => self.overlay = Some(Overlay::ConfirmDelete { id }),
            },
            Overlay::Form(mut form) => match form.handle_key(key) {
                FormOutcome::Cancel => {}
                FormOutcome::Continue => self.overlay = Some(Overlay::Form(form)),
                FormOutcome::Invalid => {
                    self.notices.push(Notice::error(self.labels.form_invalid));
                    self.overlay = Some(Overlay::Form(form));
                }
                FormOutcome::Submit(body) => {
                    form.set_submitting(true);
                    let editing_id = form.editing_id().map(str::to_string);
                    self.overlay = Some(Overlay::Form(form));
                    self.submit(body, editing_id);
                }
            },
        }
        Handled::Yes
    }

    fn handle_search_key(&mut self, key: KeyEvent) -> Handled {
        match key.code {
            KeyCode::Esc => self.searching = false,
            KeyCode::Enter => {
                self.searching = false;
                // Skip the rest of the debounce window
                if let Some(term) = self.search_debounce.take_pending() {
                    self.apply_search(term);
                }
            }
            _ => {
                if self.search.handle_key(key) == InputOutcome::Changed {
                    self.search_debounce.push(self.search.value().to_string());
                }
            }
        }
        Handled::Yes
    }

    fn render_toolbar(&self, f: &mut Frame, area: Rect, ctx: &RenderContext) {
        let theme = ctx.theme;
        let search = if self.searching {
            self.search.display()
        } else if self.search.value().is_empty() {
            "/".to_string()
        } else {
            self.search.value().to_string()
        };
        let status = match self.status {
            None => ctx.labels.status_all,
            Some(StatusFilter::Active) => ctx.labels.active,
            Some(StatusFilter::UnActive) => ctx.labels.inactive,
        };
        let search_style = if self.searching {
            Style::default().fg(theme.border_focused)
        } else {
            Style::default().fg(theme.muted)
        };

        let line = Line::from(vec![
            Span::styled(format!(" {}: ", ctx.labels.search), Style::default().fg(theme.muted)),
            Span::styled(search, search_style),
            Span::styled("   [s] ", Style::default().fg(theme.muted)),
            Span::styled(status, Style::default().fg(theme.accent)),
        ]);
        f.render_widget(Paragraph::new(line), area);
    }

    fn render_overlay(&self, f: &mut Frame, area: Rect, ctx: &RenderContext) {
        let theme = ctx.theme;
        match &self.overlay {
            None => {}
            Some(Overlay::Detail(detail)) => detail.render(f, area, &self.title, theme),
            Some(Overlay::Form(form)) => {
                let title = match form.editing_id() {
                    Some(id) => format!("{} · {}", self.title, id),
                    None => format!("{} · +", self.title),
                };
                form.render(f, area, &title, theme);
            }
            Some(Overlay::Menu { actions, selected, .. }) => {
                let width = 30;
                let modal = centered_rect(width, actions.len() as u16 + 2, area);
                let items: Vec<ListItem> = actions
                    .iter()
                    .map(|a| ListItem::new(a.label(self.locale)))
                    .collect();
                let list = List::new(items)
                    .block(
                        Block::default()
                            .borders(Borders::ALL)
                            .border_style(Style::default().fg(theme.border_focused)),
                    )
                    .style(Style::default().fg(theme.text))
                    .highlight_style(Style::default().bg(theme.selection_bg).add_modifier(Modifier::BOLD));
                let mut state = ListState::default().with_selected(Some(*selected));
                f.render_widget(Clear, modal);
                f.render_stateful_widget(list, modal, &mut state);
            }
            Some(Overlay::ConfirmDelete { id }) => {
                let modal = centered_rect(44, 3, area);
                let text = format!(
                    "{} {}? (y/n)",
                    self.locale.pick("Xóa", "Delete"),
                    id
                );
                f.render_widget(Clear, modal);
                f.render_widget(
                    Paragraph::new(text).style(Style::default().fg(theme.danger)).block(
                        Block::default()
                            .borders(Borders::ALL)
                            .border_style(Style::default().fg(theme.danger)),
                    ),
                    modal,
                );
            }
        }
    }
}

fn mutation_message<T>(mutation: &Mutation<T>) -> Option<String> {
    mutation.message().map(str::to_string)
}

impl<Res: Resource> Screen for ListScreen<Res> {
    fn title(&self) -> &str {
        &self.title
    }

    fn on_enter(&mut self) {
        if !self.entered {
            self.entered = true;
            self.fetch();
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Handled {
        if self.overlay.is_some() {
            return self.handle_overlay_key(key);
        }
        if self.searching {
            return self.handle_search_key(key);
        }

        let command = match key.code {
            KeyCode::Up | KeyCode::Char('k') => Some(TableCommand::Up),
            KeyCode::Down | KeyCode::Char('j') => Some(TableCommand::Down),
            KeyCode::Home | KeyCode::Char('g') => Some(TableCommand::First),
            KeyCode::End | KeyCode::Char('G') => Some(TableCommand::Last),
            KeyCode::Enter => Some(TableCommand::Activate),
            KeyCode::Char('m') | KeyCode::Char(' ') => Some(TableCommand::ActionMenu),
            KeyCode::Right | KeyCode::PageDown | KeyCode::Char('l') => Some(TableCommand::NextPage),
            KeyCode::Left | KeyCode::PageUp | KeyCode::Char('h') => Some(TableCommand::PrevPage),
            KeyCode::Char(']') => Some(TableCommand::LargerPageSize),
            KeyCode::Char('[') => Some(TableCommand::SmallerPageSize),
            _ => None,
        };
        if let Some(command) = command {
            if let Some(event) = self.table.apply(command, &self.rows) {
                self.handle_table_event(event);
            }
            return Handled::Yes;
        }

        match key.code {
            KeyCode::Char('/') => self.searching = true,
            KeyCode::Char('s') => self.cycle_status(),
            KeyCode::Char('r') if !key.modifiers.contains(KeyModifiers::CONTROL) => self.fetch(),
            KeyCode::Char('n') => self.open_create(),
            KeyCode::Char('x') => self.export(),
            KeyCode::Char('e') => {
                if let Some(id) = self.selected_id() {
                    self.open_edit(&id);
                }
            }
            KeyCode::Char('d') | KeyCode::Delete => {
                if let Some(id) = self.selected_id() {
                    self.overlay = Some(Overlay::ConfirmDelete { id });
                }
            }
            KeyCode::Char('y') => {
                if let Some(id) = self.selected_id() {
                    self.copy_row(&id);
                }
            }
            _ => return Handled::No,
        }
        Handled::Yes
    }

    fn tick(&mut self) {
        while let Ok(term) = self.search_rx.try_recv() {
            self.apply_search(term);
        }
        while let Ok(message) = self.rx.try_recv() {
            self.apply_message(message);
        }
    }

    fn render(&mut self, f: &mut Frame, area: Rect, ctx: &RenderContext) {
        let [toolbar, body] =
            Layout::vertical([Constraint::Length(1), Constraint::Min(3)]).areas(area);
        self.render_toolbar(f, toolbar, ctx);

        let viewport = Viewport::from_width(body.width);
        let view = self.table.view(&self.rows, viewport);
        let props = DataTableProps {
            title: &self.title,
            view: &view,
            pagination: self.table.pagination(),
            selected: self.table.selected(),
            focused: self.overlay.is_none(),
        };
        data_table::render(f, body, &props, ctx.theme, ctx.labels);

        self.render_overlay(f, area, ctx);
    }

    fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    fn captures_input(&self) -> bool {
        self.searching || matches!(self.overlay, Some(Overlay::Form(_)))
    }

    fn key_hints(&self) -> &'static str {
        if self.searching {
            return self.locale.pick("Enter áp dụng · Esc đóng", "Enter apply · Esc close");
        }
        if self.editable() {
            self.locale.pick(
                "/ tìm · s trạng thái · ←→ trang · [] cỡ trang · Enter xem · m thao tác · n thêm · e sửa · d xóa · x xuất",
                "/ search · s status · ←→ page · [] size · Enter view · m menu · n new · e edit · d delete · x export",
            )
        } else {
            self.locale.pick(
                "/ tìm · s trạng thái · ←→ trang · [] cỡ trang · Enter xem · m thao tác · d xóa · x xuất",
                "/ search · s status · ←→ page · [] size · Enter view · m menu · d delete · x export",
            )
        }
    }
}
