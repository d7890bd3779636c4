// Storedesk - terminal client for a retail storefront admin API
//
// Browses products, categories, orders, news, batches and addresses through
// a generic paginated data table, and edits the signed-in customer's cart
// with optimistic, debounced quantity updates.
//
// Architecture:
// - API client (reqwest): typed access to the REST endpoints, bearer token
//   read from a shared RequestContext
// - Table: column descriptors, formatting and responsive hiding, rendered by
//   the TUI (ratatui) and by the headless `list` command
// - Cart: optimistic quantity state plus a debounced background writer
// - Demo: an in-process axum mock of the API for offline use

mod api;
mod cart;
mod cli;
mod config;
mod debounce;
mod demo;
mod form;
mod i18n;
mod logging;
mod notify;
mod session;
mod startup;
mod table;
mod theme;
mod tui;

use anyhow::{Context, Result};
use api::ApiClient;
use clap::Parser;
use cli::Cli;
use config::Config;
use logging::{LogBuffer, LogSink};
use session::{RequestContext, Session};
use std::time::Duration;
use tokio::sync::oneshot;

/// Artificial delay on demo responses so loading states are visible
const DEMO_LATENCY: Duration = Duration::from_millis(300);

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Session and config commands need neither logging nor a client
    if let Some(command) = cli.command.as_ref().filter(|c| c.is_local()) {
        return cli::handle_local(command, &cli::store_or_default()?);
    }

    // Ensure config template exists (helps users discover options)
    Config::ensure_config_exists();

    let mut config = Config::from_env();
    if cli.demo {
        config.demo_mode = true;
    }

    // In TUI mode logs go to the Logs screen so they don't garble the display
    let tui_mode = cli.command.is_none() && config.enable_tui;
    let log_buffer = LogBuffer::new();
    let sink = if tui_mode {
        LogSink::Buffer(log_buffer.clone())
    } else {
        LogSink::Stderr
    };
    let _file_guard = logging::init(&config.logging, sink);

    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let demo_addr = if config.demo_mode {
        let addr = demo::start_demo_server_with_latency(config.demo_bind, DEMO_LATENCY, shutdown_rx)
            .await
            .context("Failed to start demo API")?;
        Some(addr)
    } else {
        None
    };

    let store = cli::store_or_default()?;
    let context = RequestContext::from_store(&store);
    if demo_addr.is_some() && context.current().is_none() {
        // The demo cart only checks that some bearer token is present
        context.set_session(Session::new("demo-token", Some("demo".into())));
    }

    let api_url = match demo_addr {
        Some(addr) => format!("http://{}", addr),
        None => config.effective_api_url(),
    };
    let client = ApiClient::new(api_url.clone(), config.timeout(), context.clone())
        .context("Failed to create API client")?;

    let info = startup::StartupInfo {
        api_url: &api_url,
        session: context.current(),
    };

    let result = match cli.command {
        Some(command) => cli::handle_remote(command, &config, &client).await,
        None if tui_mode => {
            startup::log_startup(&config, &info);
            tui::run_tui(&config, client, log_buffer).await
        }
        None => {
            startup::print_startup(&config, &info);
            if demo_addr.is_some() {
                tracing::info!("TUI disabled; serving the demo API until Ctrl+C");
                tokio::signal::ctrl_c()
                    .await
                    .context("Failed to listen for Ctrl+C")?;
            } else {
                println!("TUI disabled. Try `storedesk list products` or `storedesk --help`.");
            }
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!("{:#}", e);
    }

    // The demo server may already be gone; that's fine
    let _ = shutdown_tx.send(());
    tracing::info!("Shutdown complete");
    result
}
