// CLI module - command-line argument parsing and handlers
//
// Subcommands:
// - list / export: headless access to the same resources the TUI browses
// - login / logout: manage the persisted session
// - config --show/--path/--reset: configuration management
//
// Without a subcommand the TUI starts.

use crate::api::{
    Addresses, ApiClient, Batches, Categories, ListQuery, News, Orders, Products, Resource,
    ResourceKind, StatusFilter,
};
use crate::config::{Config, VERSION};
use crate::notify::Notice;
use crate::session::{Session, SessionStore};
use crate::table::{text, DataTable, Viewport};
use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::io::Write;
use std::path::PathBuf;

/// Storedesk - terminal client for the storefront admin API
#[derive(Parser)]
#[command(name = "storedesk")]
#[command(version = VERSION)]
#[command(about = "Terminal client for the storefront admin API", long_about = None)]
pub struct Cli {
    /// Serve the built-in demo API and connect to it
    #[arg(long, global = true)]
    pub demo: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print one page of a resource as a table
    List {
        resource: ResourceKind,

        /// 1-based page number
        #[arg(long, default_value_t = 1)]
        page: usize,

        /// Rows per page (defaults to config page_size)
        #[arg(long)]
        page_size: Option<usize>,

        #[arg(long)]
        search: Option<String>,

        #[arg(long)]
        status: Option<StatusArg>,

        /// Render width in columns; picks the responsive layout (default: terminal width)
        #[arg(long)]
        width: Option<u16>,
    },

    /// Download a spreadsheet export
    Export {
        resource: ResourceKind,

        #[arg(long, short)]
        out: PathBuf,

        #[arg(long)]
        search: Option<String>,
    },

    /// Save an access token as the current session
    Login {
        #[arg(long)]
        token: String,

        #[arg(long)]
        name: Option<String>,
    },

    /// Forget the current session
    Logout,

    /// Manage configuration
    Config {
        /// Show effective configuration
        #[arg(long)]
        show: bool,

        /// Reset config file to defaults
        #[arg(long)]
        reset: bool,

        /// Show config file path
        #[arg(long)]
        path: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StatusArg {
    Active,
    Inactive,
}

impl From<StatusArg> for StatusFilter {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::Active => StatusFilter::Active,
            StatusArg::Inactive => StatusFilter::UnActive,
        }
    }
}

impl Commands {
    /// Commands that never touch the network
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            Commands::Login { .. } | Commands::Logout | Commands::Config { .. }
        )
    }
}

/// Handle commands that need no API client
pub fn handle_local(command: &Commands, store: &SessionStore) -> Result<()> {
    match command {
        Commands::Login { token, name } => {
            let session = Session::new(token.trim(), name.clone());
            store.save(&session)?;
            println!(
                "Signed in{} (session {})",
                name.as_deref().map(|n| format!(" as {}", n)).unwrap_or_default(),
                session.fingerprint()
            );
        }
        Commands::Logout => {
            if store.clear()? {
                println!("Signed out.");
            } else {
                println!("No session to clear.");
            }
        }
        Commands::Config { show, reset, path } => {
            if *path {
                handle_config_path()?;
            } else if *show {
                handle_config_show();
            } else if *reset {
                handle_config_reset()?;
            } else {
                println!("Usage: storedesk config [--show|--reset|--path]");
                println!();
                println!("Options:");
                println!("  --show    Display effective configuration");
                println!("  --reset   Reset config file to defaults");
                println!("  --path    Show config file path");
            }
        }
        Commands::List { .. } | Commands::Export { .. } => {
            bail!("command needs the API client")
        }
    }
    Ok(())
}

/// Handle commands that talk to the API
pub async fn handle_remote(command: Commands, config: &Config, client: &ApiClient) -> Result<()> {
    match command {
        Commands::List {
            resource,
            page,
            page_size,
            search,
            status,
            width,
        } => {
            let query = ListQuery::page(page.saturating_sub(1), page_size.unwrap_or(config.page_size).max(1))
                .search(search.unwrap_or_default())
                .status(status.map(StatusFilter::from));
            let width = width.unwrap_or_else(terminal_width);
            let output = match resource {
                ResourceKind::Products => render_list::<Products>(client, config, query, width).await,
                ResourceKind::Categories => render_list::<Categories>(client, config, query, width).await,
                ResourceKind::Orders => render_list::<Orders>(client, config, query, width).await,
                ResourceKind::News => render_list::<News>(client, config, query, width).await,
                ResourceKind::Batches => render_list::<Batches>(client, config, query, width).await,
                ResourceKind::Addresses => render_list::<Addresses>(client, config, query, width).await,
            }?;
            print!("{}", output);
        }
        Commands::Export { resource, out, search } => {
            let labels = config.locale.labels();
            let query = ListQuery::page(0, config.page_size).search(search.unwrap_or_default());
            let bytes = client
                .export(&resource.export_path(), &query)
                .await
                .map_err(|e| anyhow!(Notice::from_api_error(&e, labels.load_failed, labels).message))?;
            std::fs::write(&out, &bytes).with_context(|| format!("Failed to write {}", out.display()))?;
            println!("{} bytes written to {}", bytes.len(), out.display());
        }
        local => handle_local(&local, &store_or_default()?)?,
    }
    Ok(())
}

/// Fetch one page and render it with the same table rules as the TUI
async fn render_list<Res: Resource>(
    client: &ApiClient,
    config: &Config,
    query: ListQuery,
    width: u16,
) -> Result<String> {
    let labels = config.locale.labels();
    let mut table = DataTable::new(Res::columns(config.locale), query.page_size, config.locale)
        .with_responsive(config.table.resolve(Res::responsive()));

    let page = client
        .list::<Res::Row>(Res::PATH, &query)
        .await
        .map_err(|e| anyhow!(Notice::from_api_error(&e, labels.load_failed, labels).message))?;

    let pagination = table.pagination_mut();
    pagination.set_total(page.total_items_count);
    pagination.set_page(query.page_index);

    let view = table.view(&page.items, Viewport::from_width(width));
    Ok(format!(
        "{}\n{}",
        Res::title(config.locale),
        text::render_plain(&view, table.pagination(), labels)
    ))
}

fn terminal_width() -> u16 {
    crossterm::terminal::size().map(|(w, _)| w).unwrap_or(120)
}

pub fn store_or_default() -> Result<SessionStore> {
    SessionStore::default_path()
        .map(SessionStore::new)
        .context("Could not determine home directory for the session file")
}

fn handle_config_path() -> Result<()> {
    let path = Config::config_path().context("Could not determine config path")?;
    println!("{}", path.display());
    Ok(())
}

fn handle_config_show() {
    let config = Config::from_env();

    println!("# Effective configuration (env > file > defaults)");
    println!();
    print!("{}", config.to_toml());

    println!();
    if let Some(path) = Config::config_path() {
        if path.exists() {
            println!("# Source: {}", path.display());
        } else {
            println!("# Source: defaults (no config file)");
        }
    }
}

fn handle_config_reset() -> Result<()> {
    let path = Config::config_path().context("Could not determine config path")?;

    if path.exists() {
        eprint!(
            "Config file exists at {}. Overwrite? [y/N] ",
            path.display()
        );
        std::io::stderr().flush().context("Failed to flush stderr")?;

        let mut input = String::new();
        std::io::stdin()
            .read_line(&mut input)
            .context("Failed to read answer")?;

        if !input.trim().eq_ignore_ascii_case("y") {
            println!("Aborted.");
            return Ok(());
        }
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    std::fs::write(&path, Config::default().to_toml())
        .with_context(|| format!("Failed to write {}", path.display()))?;

    println!("Config reset to defaults: {}", path.display());
    Ok(())
}
