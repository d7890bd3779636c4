//! Configuration for the storedesk client
//!
//! Configuration is loaded in order of precedence:
//! 1. Environment variables (highest priority)
//! 2. Config file (~/.config/storedesk/config.toml)
//! 3. Built-in defaults (lowest priority)

use crate::i18n::Locale;
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

// ─────────────────────────────────────────────────────────────────────────────
// Submodules
// ─────────────────────────────────────────────────────────────────────────────

mod observability;
mod serialization;
mod table;

#[cfg(test)]
mod tests;

pub use observability::{FileLogging, LogRotation, LoggingConfig};
pub use table::{FileTable, TableSettings};

// ─────────────────────────────────────────────────────────────────────────────
// Constants
// ─────────────────────────────────────────────────────────────────────────────

/// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

const DEFAULT_API_URL: &str = "http://localhost:5000/api";
const DEFAULT_THEME: &str = "Storedesk Dark";
const DEFAULT_DEMO_BIND: SocketAddr =
    SocketAddr::V4(std::net::SocketAddrV4::new(std::net::Ipv4Addr::LOCALHOST, 7878));

// ─────────────────────────────────────────────────────────────────────────────
// Application Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the storefront REST API
    pub api_url: String,

    /// Per-request timeout for the HTTP client
    pub timeout_secs: u64,

    /// Display locale for labels, numbers and notices
    pub locale: Locale,

    /// Built-in theme name
    pub theme: String,

    /// Initial rows per page on list screens
    pub page_size: usize,

    /// Quiet period before a search term is sent
    pub search_debounce_ms: u64,

    /// Quiet period before a cart quantity edit is written
    pub cart_debounce_ms: u64,

    /// Whether to run the TUI (headless commands ignore this)
    pub enable_tui: bool,

    /// Demo mode: serve the built-in mock API and point the client at it
    pub demo_mode: bool,

    /// Address the demo API binds to
    pub demo_bind: SocketAddr,

    /// Logging configuration
    pub logging: LoggingConfig,

    /// Data table overrides
    pub table: TableSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            timeout_secs: 30,
            locale: Locale::Vi,
            theme: DEFAULT_THEME.to_string(),
            page_size: 10,
            search_debounce_ms: 500,
            cart_debounce_ms: 500,
            enable_tui: true,
            demo_mode: false,
            demo_bind: DEFAULT_DEMO_BIND,
            logging: LoggingConfig::default(),
            table: TableSettings::default(),
        }
    }
}

impl Config {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    pub fn cart_debounce(&self) -> Duration {
        Duration::from_millis(self.cart_debounce_ms)
    }

    /// URL the client should talk to, accounting for demo mode
    pub fn effective_api_url(&self) -> String {
        if self.demo_mode {
            format!("http://{}", self.demo_bind)
        } else {
            self.api_url.clone()
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// File Configuration (deserialization layer)
// ─────────────────────────────────────────────────────────────────────────────

/// Config file structure (subset of Config that makes sense to persist)
#[derive(Debug, Deserialize, Default)]
pub(crate) struct FileConfig {
    pub api_url: Option<String>,
    pub timeout_secs: Option<u64>,
    pub locale: Option<String>,
    pub theme: Option<String>,
    pub page_size: Option<usize>,
    pub search_debounce_ms: Option<u64>,
    pub cart_debounce_ms: Option<u64>,
    pub demo_bind: Option<String>,

    /// Optional [logging] section
    pub logging: Option<FileLogging>,

    /// Optional [table] section
    pub table: Option<FileTable>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Configuration Loading
// ─────────────────────────────────────────────────────────────────────────────

impl Config {
    /// Get the config file path: ~/.config/storedesk/config.toml
    /// Uses Unix-style ~/.config on all platforms for consistency
    pub fn config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|p| p.join(".config").join("storedesk").join("config.toml"))
    }

    /// Create config file with defaults if it doesn't exist
    pub fn ensure_config_exists() {
        let Some(path) = Self::config_path() else {
            return;
        };

        if path.exists() {
            return;
        }

        if let Some(parent) = path.parent() {
            if std::fs::create_dir_all(parent).is_err() {
                return; // Config is optional
            }
        }

        let _ = std::fs::write(&path, Self::default().to_toml());
    }

    /// Load file config if it exists
    ///
    /// A config file that exists but does not parse is fatal: the process
    /// exits with a readable message instead of running on defaults.
    fn load_file_config() -> FileConfig {
        let Some(path) = Self::config_path() else {
            return FileConfig::default();
        };

        match std::fs::read_to_string(&path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("\n╔══════════════════════════════════════════════════════════════╗");
                    eprintln!("║  CONFIG ERROR - Failed to parse configuration file          ║");
                    eprintln!("╚══════════════════════════════════════════════════════════════╝\n");
                    eprintln!("  File: {}\n", path.display());
                    eprintln!("  Error: {}\n", e);
                    eprintln!("  Tip: Check for:\n");
                    eprintln!("    - Missing quotes around string values");
                    eprintln!("    - Unknown format names in [table] lists");
                    eprintln!("    - Numbers written as strings\n");
                    eprintln!("  To reset, run `storedesk config --reset`.\n");
                    std::process::exit(1);
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => FileConfig::default(),
            Err(e) => {
                eprintln!("\n╔══════════════════════════════════════════════════════════════╗");
                eprintln!("║  CONFIG ERROR - Cannot read configuration file              ║");
                eprintln!("╚══════════════════════════════════════════════════════════════╝\n");
                eprintln!("  File: {}\n", path.display());
                eprintln!("  Error: {}\n", e);
                std::process::exit(1);
            }
        }
    }

    /// Load configuration: file -> env vars -> defaults
    pub fn from_env() -> Self {
        let file = Self::load_file_config();
        Self::from_sources(file, |key| std::env::var(key).ok())
    }

    /// Merge a parsed file with an environment lookup
    pub(crate) fn from_sources(file: FileConfig, env: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let flag = |key: &str| {
            env(key).map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        };

        // API URL: env > file > default
        let api_url = env("STOREDESK_API_URL")
            .or(file.api_url)
            .unwrap_or(defaults.api_url);

        // Locale: env > file > default
        let locale = env("STOREDESK_LOCALE")
            .or(file.locale)
            .map(|code| Locale::from_code(&code))
            .unwrap_or(defaults.locale);

        // Theme: env > file > default
        let theme = env("STOREDESK_THEME")
            .or(file.theme)
            .unwrap_or(defaults.theme);

        // TUI toggle and demo mode: env only (runtime flags)
        let enable_tui = !flag("STOREDESK_NO_TUI").unwrap_or(false);
        let demo_mode = flag("STOREDESK_DEMO").unwrap_or(false);

        let demo_bind = match env("STOREDESK_DEMO_BIND").or(file.demo_bind) {
            Some(addr) => addr.parse().unwrap_or_else(|_| {
                eprintln!("Invalid demo_bind {:?}, using {}", addr, defaults.demo_bind);
                defaults.demo_bind
            }),
            None => defaults.demo_bind,
        };

        Self {
            api_url,
            timeout_secs: file.timeout_secs.unwrap_or(defaults.timeout_secs).max(1),
            locale,
            theme,
            page_size: file.page_size.unwrap_or(defaults.page_size).max(1),
            search_debounce_ms: file
                .search_debounce_ms
                .unwrap_or(defaults.search_debounce_ms),
            cart_debounce_ms: file.cart_debounce_ms.unwrap_or(defaults.cart_debounce_ms),
            enable_tui,
            demo_mode,
            demo_bind,
            logging: LoggingConfig::from_file(file.logging),
            table: TableSettings::from_file(file.table),
        }
    }
}
