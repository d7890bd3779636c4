//! Screen trait system for the TUI
//!
//! Each tab is a [`Screen`]. The App owns the tab list, routes keys to the
//! active screen and collects the notices screens produce.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         App                                 │
//! │     (orchestrator: tabs, global keys, toasts, help)         │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!        ┌──────────┬──────────┼──────────┬──────────┐
//!        ▼          ▼          ▼          ▼          ▼
//!    Products   Categories   ...        Cart       Logs
//! ```

mod interactive;
mod screen;

pub use interactive::Handled;
pub use screen::{RenderContext, Screen};
