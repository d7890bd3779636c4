//! Responsive column policy for the data table.
//!
//! Single source of truth for width thresholds and for which columns collapse
//! on narrow terminals.

use super::column::Column;
use super::format::Format;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Viewport {
    /// < 60 cols: split pane, phone-sized terminal
    Mobile,
    /// 60-99 cols: half-screen
    Tablet,
    /// 100+ cols: full terminal
    Desktop,
}

impl Viewport {
    pub fn from_width(width: u16) -> Self {
        match width {
            0..=59 => Viewport::Mobile,
            60..=99 => Viewport::Tablet,
            _ => Viewport::Desktop,
        }
    }

    /// Check if at most this viewport (inclusive), i.e. this narrow or narrower
    pub fn at_most(&self, max: Viewport) -> bool {
        self.ordinal() <= max.ordinal()
    }

    fn ordinal(&self) -> u8 {
        match self {
            Viewport::Mobile => 0,
            Viewport::Tablet => 1,
            Viewport::Desktop => 2,
        }
    }
}

/// Which columns to hide per viewport
///
/// A caller-supplied config replaces the defaults wholesale; the lists are
/// never merged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponsiveConfig {
    pub mobile_hidden_formats: Vec<Format>,
    pub tablet_hidden_formats: Vec<Format>,
    pub mobile_hidden_ids: Vec<String>,
    pub tablet_hidden_ids: Vec<String>,
}

impl Default for ResponsiveConfig {
    fn default() -> Self {
        Self {
            mobile_hidden_formats: vec![
                Format::Date,
                Format::DateTime,
                Format::Boolean,
                Format::Array,
                Format::Number,
            ],
            tablet_hidden_formats: vec![Format::DateTime, Format::Boolean],
            mobile_hidden_ids: Vec::new(),
            tablet_hidden_ids: Vec::new(),
        }
    }
}

impl ResponsiveConfig {
    /// Whether `column` is hidden at `viewport`
    ///
    /// Mobile rules apply only on mobile; tablet rules apply only on tablet
    /// (not on mobile). Nothing is hidden on desktop.
    pub fn is_hidden<R>(&self, column: &Column<R>, viewport: Viewport) -> bool {
        let matches = |formats: &[Format], ids: &[String]| {
            column.format.is_some_and(|f| formats.contains(&f))
                || ids.iter().any(|id| id == &column.id)
        };

        match viewport {
            Viewport::Mobile => matches(&self.mobile_hidden_formats, &self.mobile_hidden_ids),
            Viewport::Tablet => matches(&self.tablet_hidden_formats, &self.tablet_hidden_ids),
            Viewport::Desktop => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn col(id: &str, format: Option<Format>) -> Column<Value> {
        let c = Column::new(id, id);
        match format {
            Some(f) => c.format(f),
            None => c,
        }
    }

    #[test]
    fn viewport_thresholds() {
        assert_eq!(Viewport::from_width(40), Viewport::Mobile);
        assert_eq!(Viewport::from_width(59), Viewport::Mobile);
        assert_eq!(Viewport::from_width(60), Viewport::Tablet);
        assert_eq!(Viewport::from_width(99), Viewport::Tablet);
        assert_eq!(Viewport::from_width(100), Viewport::Desktop);
    }

    #[test]
    fn at_most_comparisons() {
        assert!(Viewport::Mobile.at_most(Viewport::Tablet));
        assert!(Viewport::Tablet.at_most(Viewport::Tablet));
        assert!(!Viewport::Desktop.at_most(Viewport::Tablet));
    }

    #[test]
    fn default_mobile_rules() {
        let config = ResponsiveConfig::default();
        for format in [
            Format::Date,
            Format::DateTime,
            Format::Boolean,
            Format::Array,
            Format::Number,
        ] {
            assert!(config.is_hidden(&col("x", Some(format)), Viewport::Mobile));
        }
        assert!(!config.is_hidden(&col("x", Some(Format::Price)), Viewport::Mobile));
        assert!(!config.is_hidden(&col("name", None), Viewport::Mobile));
    }

    #[test]
    fn tablet_rules_do_not_include_mobile_only_formats() {
        let config = ResponsiveConfig::default();
        assert!(config.is_hidden(&col("x", Some(Format::DateTime)), Viewport::Tablet));
        assert!(config.is_hidden(&col("x", Some(Format::Boolean)), Viewport::Tablet));
        assert!(!config.is_hidden(&col("x", Some(Format::Date)), Viewport::Tablet));
        assert!(!config.is_hidden(&col("x", Some(Format::Number)), Viewport::Tablet));
    }

    #[test]
    fn desktop_shows_everything() {
        let config = ResponsiveConfig {
            mobile_hidden_ids: vec!["sku".into()],
            tablet_hidden_ids: vec!["sku".into()],
            ..ResponsiveConfig::default()
        };
        assert!(!config.is_hidden(&col("sku", Some(Format::DateTime)), Viewport::Desktop));
    }

    #[test]
    fn hidden_ids_apply_per_viewport() {
        let config = ResponsiveConfig {
            tablet_hidden_ids: vec!["description".into()],
            ..ResponsiveConfig::default()
        };
        let description = col("description", None);
        assert!(config.is_hidden(&description, Viewport::Tablet));
        // Tablet ids are not carried down to mobile
        assert!(!config.is_hidden(&description, Viewport::Mobile));
    }

    #[test]
    fn override_replaces_defaults() {
        let config = ResponsiveConfig {
            mobile_hidden_formats: vec![Format::Price],
            tablet_hidden_formats: Vec::new(),
            mobile_hidden_ids: Vec::new(),
            tablet_hidden_ids: Vec::new(),
        };
        assert!(config.is_hidden(&col("x", Some(Format::Price)), Viewport::Mobile));
        assert!(!config.is_hidden(&col("x", Some(Format::Date)), Viewport::Mobile));
        assert!(!config.is_hidden(&col("x", Some(Format::DateTime)), Viewport::Tablet));
    }
}
