//! Config serialization to TOML
//!
//! Single source of truth for config file format.

use super::Config;
use crate::table::{Format, ResponsiveConfig};

fn formats_to_toml(formats: &[Format]) -> String {
    let names: Vec<&str> = formats.iter().map(Format::as_str).collect();
    format!("{:?}", names)
}

impl Config {
    /// Serialize the [table] section; commented-out defaults when not overridden
    fn table_to_toml(&self) -> String {
        match &self.table.responsive {
            Some(r) => format!(
                "[table]\nmobile_hidden_formats = {}\ntablet_hidden_formats = {}\nmobile_hidden_ids = {:?}\ntablet_hidden_ids = {:?}\n",
                formats_to_toml(&r.mobile_hidden_formats),
                formats_to_toml(&r.tablet_hidden_formats),
                r.mobile_hidden_ids,
                r.tablet_hidden_ids,
            ),
            None => {
                let d = ResponsiveConfig::default();
                format!(
                    r#"# Responsive column hiding for every list screen.
# Setting any key here replaces the built-in rules entirely.
# [table]
# mobile_hidden_formats = {}
# tablet_hidden_formats = {}
# mobile_hidden_ids = []
# tablet_hidden_ids = ["description"]
"#,
                    formats_to_toml(&d.mobile_hidden_formats),
                    formats_to_toml(&d.tablet_hidden_formats),
                )
            }
        }
    }

    /// Serialize config to TOML format
    pub fn to_toml(&self) -> String {
        format!(
            r#"# storedesk configuration

# Storefront API base URL (STOREDESK_API_URL overrides)
api_url = "{api_url}"

# HTTP request timeout in seconds
timeout_secs = {timeout}

# Display language: vi, en (STOREDESK_LOCALE overrides)
locale = "{locale}"

# Theme: Storedesk Dark, Storedesk Light, Terminal
theme = "{theme}"

# Rows per page when a list opens: 5, 10, 25, 50
page_size = {page_size}

# Quiet period (ms) before a search term is sent
search_debounce_ms = {search_ms}

# Quiet period (ms) before a cart quantity change is saved
cart_debounce_ms = {cart_ms}

# Demo API bind address (used when STOREDESK_DEMO=1)
demo_bind = "{demo_bind}"

# Logging configuration (RUST_LOG env var overrides)
[logging]
level = "{log_level}"
# JSON file logging (in addition to the TUI log view or stderr)
file_enabled = {log_file_enabled}
file_dir = "{log_file_dir}"
file_rotation = "{log_file_rotation}"  # hourly, daily, never
file_prefix = "{log_file_prefix}"

{table}"#,
            api_url = self.api_url,
            timeout = self.timeout_secs,
            locale = self.locale.code(),
            theme = self.theme,
            page_size = self.page_size,
            search_ms = self.search_debounce_ms,
            cart_ms = self.cart_debounce_ms,
            demo_bind = self.demo_bind,
            log_level = self.logging.level,
            log_file_enabled = self.logging.file_enabled,
            log_file_dir = self.logging.file_dir.display().to_string().replace('\\', "/"),
            log_file_rotation = self.logging.file_rotation.as_str(),
            log_file_prefix = self.logging.file_prefix,
            table = self.table_to_toml(),
        )
    }
}
