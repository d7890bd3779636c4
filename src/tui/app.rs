// App state - the orchestrator
//
// The App owns the tab list, the theme and the toast queue. It does not own
// entity data; each screen fetches and holds its own. Key dispatch is layered:
// help overlay, then global keys, then the active screen. A screen that is
// capturing text input sees every key except Ctrl+C.

use super::components::Toasts;
use super::traits::{Handled, RenderContext, Screen};
use super::views::{CartScreen, ListScreen, LogsScreen};
use crate::api::{
    Addresses, ApiClient, Batches, Categories, News, Orders, Products, Resource,
};
use crate::config::Config;
use crate::i18n::Locale;
use crate::logging::LogBuffer;
use crate::session::RequestContext;
use crate::theme::Theme;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

pub struct App {
    pub screens: Vec<Box<dyn Screen>>,
    pub active: usize,
    pub theme: Theme,
    pub locale: Locale,
    pub toasts: Toasts,
    pub show_help: bool,
    pub should_quit: bool,
    pub api_url: String,
    pub context: RequestContext,
    pub started_at: Instant,
}

impl App {
    pub fn new(
        screens: Vec<Box<dyn Screen>>,
        theme: Theme,
        locale: Locale,
        api_url: impl Into<String>,
        context: RequestContext,
    ) -> Self {
        let mut app = Self {
            screens,
            active: 0,
            theme,
            locale,
            toasts: Toasts::default(),
            show_help: false,
            should_quit: false,
            api_url: api_url.into(),
            context,
            started_at: Instant::now(),
        };
        app.set_active(0);
        app
    }

    /// Build every tab from config
    pub fn with_config(config: &Config, client: ApiClient, log_buffer: LogBuffer) -> Self {
        let locale = config.locale;
        let export_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));

        fn list<Res: Resource>(
            config: &Config,
            client: &ApiClient,
            export_dir: &std::path::Path,
        ) -> Box<dyn Screen> {
            Box::new(ListScreen::<Res>::new(
                client.clone(),
                config.locale,
                config.page_size,
                config.search_debounce(),
                config.table.resolve(Res::responsive()),
                export_dir.to_path_buf(),
            ))
        }

        let screens: Vec<Box<dyn Screen>> = vec![
            list::<Products>(config, &client, &export_dir),
            list::<Categories>(config, &client, &export_dir),
            list::<Orders>(config, &client, &export_dir),
            list::<News>(config, &client, &export_dir),
            list::<Batches>(config, &client, &export_dir),
            list::<Addresses>(config, &client, &export_dir),
            Box::new(CartScreen::new(
                Arc::new(client.clone()),
                config.cart_debounce(),
                locale,
            )),
            Box::new(LogsScreen::new(log_buffer, locale)),
        ];

        Self::new(
            screens,
            Theme::by_name(&config.theme),
            locale,
            client.base_url(),
            client.context().clone(),
        )
    }

    pub fn set_active(&mut self, index: usize) {
        if index >= self.screens.len() {
            return;
        }
        self.active = index;
        self.screens[index].on_enter();
        tracing::debug!(tab = self.screens[index].title(), "Switched tab");
    }

    pub fn next_tab(&mut self) {
        if !self.screens.is_empty() {
            self.set_active((self.active + 1) % self.screens.len());
        }
    }

    pub fn prev_tab(&mut self) {
        if !self.screens.is_empty() {
            let len = self.screens.len();
            self.set_active((self.active + len - 1) % len);
        }
    }

    pub fn next_theme(&mut self) {
        let names = Theme::NAMES;
        let current = names.iter().position(|n| *n == self.theme.name).unwrap_or(0);
        self.theme = Theme::by_name(names[(current + 1) % names.len()]);
    }

    pub fn active_screen_hints(&self) -> &'static str {
        self.screens
            .get(self.active)
            .map(|s| s.key_hints())
            .unwrap_or("")
    }

    pub fn render_context(&self) -> RenderContext<'_> {
        RenderContext {
            theme: &self.theme,
            locale: self.locale,
            labels: self.locale.labels(),
        }
    }

    /// Drain background work of every screen and collect notices
    ///
    /// Inactive screens tick too so a cart write finishing after the user
    /// switched tabs still reports.
    pub fn tick(&mut self) {
        for screen in self.screens.iter_mut() {
            screen.tick();
            for notice in screen.take_notices() {
                if notice.is_error() {
                    tracing::debug!(message = %notice.message, "Error notice");
                }
                self.toasts.push(notice);
            }
        }
        self.toasts.tick();
    }

    pub fn uptime(&self) -> String {
        let secs = self.started_at.elapsed().as_secs();
        format!("{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        // Layer 1: help overlay swallows everything
        if self.show_help {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
                self.show_help = false;
            }
            return;
        }

        let capturing = self
            .screens
            .get(self.active)
            .is_some_and(|s| s.captures_input());

        // Layer 2: global keys
        if !capturing && self.handle_global_key(key).was_handled() {
            return;
        }

        // Layer 3: active screen
        if let Some(screen) = self.screens.get_mut(self.active) {
            screen.handle_key(key);
        }
    }

    fn handle_global_key(&mut self, key: KeyEvent) -> Handled {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('?') => self.show_help = true,
            KeyCode::Char('t') => self.next_theme(),
            KeyCode::Tab => self.next_tab(),
            KeyCode::BackTab => self.prev_tab(),
            KeyCode::F(n) if (1..=self.screens.len() as u8).contains(&n) => {
                self.set_active(n as usize - 1)
            }
            _ => return Handled::No,
        }
        Handled::Yes
    }
}
