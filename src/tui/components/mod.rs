// Components module - reusable UI building blocks
//
// Shell components are rendered in every view:
// - Title bar: App name and tab strip
// - Status bar: Session, API target, key hints
// - Toasts: Auto-dismissing notices
//
// The data table component is shared by every list screen.

pub mod data_table;
pub mod status_bar;
pub mod title_bar;
pub mod toast;

pub use toast::Toasts;
