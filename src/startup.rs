// Startup module - displays banner and module status
//
// Shows version info, where the config came from, the API target and the
// session, either on stdout (headless) or in the Logs screen (TUI).

use crate::config::{Config, VERSION};
use crate::session::Session;

/// ANSI color codes for terminal output
mod colors {
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD: &str = "\x1b[1m";
    pub const DIM: &str = "\x1b[2m";
    pub const CYAN: &str = "\x1b[36m";
    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const MAGENTA: &str = "\x1b[35m";
}

/// Module loading result for display
pub struct ModuleStatus {
    pub name: &'static str,
    pub enabled: bool,
    pub description: &'static str,
}

/// What startup resolved, for display
pub struct StartupInfo<'a> {
    pub api_url: &'a str,
    pub session: Option<Session>,
}

fn module_status(config: &Config, info: &StartupInfo) -> Vec<ModuleStatus> {
    vec![
        ModuleStatus {
            name: "api",
            enabled: true,
            description: "REST client",
        },
        ModuleStatus {
            name: "tui",
            enabled: config.enable_tui,
            description: "Terminal interface",
        },
        ModuleStatus {
            name: "session",
            enabled: info.session.is_some(),
            description: "Bearer token",
        },
        ModuleStatus {
            name: "file-log",
            enabled: config.logging.file_enabled,
            description: "JSON log files",
        },
        ModuleStatus {
            name: "demo",
            enabled: config.demo_mode,
            description: "Built-in mock API",
        },
    ]
}

/// Print the startup banner (headless mode)
pub fn print_startup(config: &Config, info: &StartupInfo) {
    use colors::*;

    println!();
    println!("  {BOLD}{CYAN}Storedesk{RESET} {DIM}v{VERSION}{RESET}");
    println!("  {DIM}Terminal client for the storefront admin API{RESET}");
    println!();

    if let Some(path) = Config::config_path() {
        if path.exists() {
            println!("  {DIM}Config:{RESET} {GREEN}✓{RESET} {}", path.display());
        } else {
            println!("  {DIM}Config:{RESET} {DIM}(using defaults){RESET}");
        }
    }
    println!();

    for module in module_status(config, info) {
        let (icon, style) = if module.enabled {
            (format!("{GREEN}✓{RESET}"), "")
        } else {
            (format!("{DIM}○{RESET}"), DIM)
        };
        println!(
            "    {icon} {style}{:<10}{RESET} {DIM}{}{RESET}",
            module.name, module.description
        );
    }
    println!();

    println!("  {MAGENTA}▸{RESET} API at {BOLD}{}{RESET}", info.api_url);
    if config.demo_mode {
        println!("  {YELLOW}▸{RESET} {YELLOW}Demo mode active{RESET} {DIM}(seeded data){RESET}");
    }
    println!();
}

/// Write the same information to the log (shown on the Logs screen)
pub fn log_startup(config: &Config, info: &StartupInfo) {
    tracing::info!("Storedesk v{}", VERSION);
    for module in module_status(config, info) {
        let icon = if module.enabled { "✓" } else { "○" };
        tracing::info!("  {} {} - {}", icon, module.name, module.description);
    }
    tracing::info!("▸ API at {}", info.api_url);
    match &info.session {
        Some(session) => tracing::info!(
            session = %session.fingerprint(),
            user = session.user_name.as_deref().unwrap_or("-"),
            "▸ Signed in"
        ),
        None => tracing::info!("▸ Anonymous; `storedesk login --token …` to sign in"),
    }
    if config.demo_mode {
        tracing::info!("▸ Demo mode active (seeded data)");
    }
}
