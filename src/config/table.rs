//! [table] section: responsive column overrides
//!
//! Any list present in the file switches the whole responsive policy to the
//! file's lists. Absent lists are then empty, not defaulted, matching how a
//! caller-supplied policy replaces the table's defaults.

use crate::table::{Format, ResponsiveConfig};
use serde::Deserialize;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableSettings {
    /// Global override for every list screen; `None` keeps per-screen rules
    pub responsive: Option<ResponsiveConfig>,
}

#[derive(Debug, Deserialize, Default)]
pub struct FileTable {
    pub mobile_hidden_formats: Option<Vec<Format>>,
    pub tablet_hidden_formats: Option<Vec<Format>>,
    pub mobile_hidden_ids: Option<Vec<String>>,
    pub tablet_hidden_ids: Option<Vec<String>>,
}

impl FileTable {
    fn is_empty(&self) -> bool {
        self.mobile_hidden_formats.is_none()
            && self.tablet_hidden_formats.is_none()
            && self.mobile_hidden_ids.is_none()
            && self.tablet_hidden_ids.is_none()
    }
}

impl TableSettings {
    pub fn from_file(file: Option<FileTable>) -> Self {
        let responsive = file.filter(|f| !f.is_empty()).map(|f| ResponsiveConfig {
            mobile_hidden_formats: f.mobile_hidden_formats.unwrap_or_default(),
            tablet_hidden_formats: f.tablet_hidden_formats.unwrap_or_default(),
            mobile_hidden_ids: f.mobile_hidden_ids.unwrap_or_default(),
            tablet_hidden_ids: f.tablet_hidden_ids.unwrap_or_default(),
        });
        Self { responsive }
    }

    /// Pick the policy for one screen: config override, then the screen's own
    /// rules, then the table defaults
    pub fn resolve(&self, screen: Option<ResponsiveConfig>) -> ResponsiveConfig {
        self.responsive
            .clone()
            .or(screen)
            .unwrap_or_default()
    }
}
