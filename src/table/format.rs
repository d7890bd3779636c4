//! Declarative cell formatters
//!
//! Each column may carry a [`Format`] tag. The tag set is closed so the
//! mapping below is checked for exhaustiveness at compile time. A column's
//! custom renderer, when present, bypasses all of this.

use super::responsive::Viewport;
use crate::i18n::Locale;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Text columns are cut to this many characters on mobile
const MOBILE_TEXT_LIMIT: usize = 30;
/// Array columns are cut to this many characters on mobile
const MOBILE_ARRAY_LIMIT: usize = 20;
/// Image file names shown next to the thumbnail marker
const IMAGE_NAME_LIMIT: usize = 24;
const MOBILE_IMAGE_NAME_LIMIT: usize = 10;

/// Declarative format codes for column values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Date,
    DateTime,
    Number,
    Boolean,
    Array,
    Role,
    Price,
    Images,
    Deleted,
    Status,
}

impl Format {
    pub const ALL: [Format; 10] = [
        Format::Date,
        Format::DateTime,
        Format::Number,
        Format::Boolean,
        Format::Array,
        Format::Role,
        Format::Price,
        Format::Images,
        Format::Deleted,
        Format::Status,
    ];

    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|f| f.as_str().eq_ignore_ascii_case(s.trim()))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Format::Date => "date",
            Format::DateTime => "datetime",
            Format::Number => "number",
            Format::Boolean => "boolean",
            Format::Array => "array",
            Format::Role => "role",
            Format::Price => "price",
            Format::Images => "images",
            Format::Deleted => "deleted",
            Format::Status => "status",
        }
    }
}

/// Semantic color of a cell; the renderer maps tones to theme colors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tone {
    #[default]
    Plain,
    Muted,
    Success,
    Danger,
    Accent,
}

/// Formatted cell content
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CellText {
    pub text: String,
    pub tone: Tone,
    /// Rendered as a colored badge rather than plain text
    pub badge: bool,
}

impl CellText {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tone: Tone::Plain,
            badge: false,
        }
    }

    pub fn toned(text: impl Into<String>, tone: Tone) -> Self {
        Self {
            text: text.into(),
            tone,
            badge: false,
        }
    }

    pub fn badge(text: impl Into<String>, tone: Tone) -> Self {
        Self {
            text: text.into(),
            tone,
            badge: true,
        }
    }

    pub fn blank() -> Self {
        Self::default()
    }
}

/// Staff/customer roles known to the storefront
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    Manager,
    Staff,
    Customer,
}

impl Role {
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_lowercase().as_str() {
            "admin" => Some(Role::Admin),
            "manager" => Some(Role::Manager),
            "staff" => Some(Role::Staff),
            "customer" => Some(Role::Customer),
            _ => None,
        }
    }

    pub fn label(&self, locale: Locale) -> &'static str {
        let labels = locale.labels();
        match self {
            Role::Admin => labels.role_admin,
            Role::Manager => labels.role_manager,
            Role::Staff => labels.role_staff,
            Role::Customer => labels.role_customer,
        }
    }
}

/// Format a resolved value according to the column's format tag
pub fn format_value(
    format: Option<Format>,
    value: Option<&Value>,
    viewport: Viewport,
    locale: Locale,
) -> CellText {
    let labels = locale.labels();
    let mobile = viewport == Viewport::Mobile;

    let Some(format) = format else {
        let text = plain_text(value);
        return CellText::plain(if mobile {
            truncate_chars(&text, MOBILE_TEXT_LIMIT)
        } else {
            text
        });
    };

    match format {
        Format::Date => {
            if is_empty(value) {
                return CellText::plain("-");
            }
            CellText::plain(format_timestamp(value, "%d/%m/%Y"))
        }
        Format::DateTime => {
            if is_empty(value) {
                return CellText::toned(labels.no_expiry, Tone::Muted);
            }
            let pattern = if mobile { "%d/%m" } else { "%d/%m/%Y %H:%M" };
            CellText::plain(format_timestamp(value, pattern))
        }
        Format::Number => match value.and_then(as_number) {
            Some(n) => CellText::plain(group_number(n, locale)),
            None => CellText::plain("-"),
        },
        Format::Boolean => {
            let truthy = matches!(value, Some(Value::Bool(true)));
            CellText::plain(if truthy { labels.yes } else { labels.no })
        }
        Format::Array => {
            let joined = join_array(value);
            CellText::plain(if mobile {
                truncate_chars(&joined, MOBILE_ARRAY_LIMIT)
            } else {
                joined
            })
        }
        Format::Role => match value.and_then(Value::as_str).and_then(Role::from_code) {
            Some(role) => CellText::plain(role.label(locale)),
            None => CellText::plain("-"),
        },
        Format::Price => match value.and_then(as_number) {
            Some(n) => {
                let suffix = if mobile { "đ" } else { "VND" };
                CellText::plain(format!("{} {}", group_number(n, locale), suffix))
            }
            None => CellText::plain("N/A"),
        },
        Format::Images => match first_image(value) {
            Some(url) => {
                let limit = if mobile {
                    MOBILE_IMAGE_NAME_LIMIT
                } else {
                    IMAGE_NAME_LIMIT
                };
                let name = url.rsplit('/').next().unwrap_or(url);
                CellText::toned(format!("▣ {}", truncate_chars(name, limit)), Tone::Accent)
            }
            None => CellText::blank(),
        },
        Format::Deleted => {
            if matches!(value, Some(Value::Bool(true))) {
                CellText::badge(labels.unavailable, Tone::Danger)
            } else {
                CellText::badge(labels.available, Tone::Success)
            }
        }
        Format::Status => match value.and_then(Value::as_str) {
            Some("Active") => CellText::badge(labels.active, Tone::Success),
            Some("UnActive") => CellText::badge(labels.inactive, Tone::Danger),
            _ => CellText::plain("-"),
        },
    }
}

/// Group a number with the locale's separators
///
/// At most three fraction digits are kept, trailing zeros dropped.
pub fn group_number(value: f64, locale: Locale) -> String {
    let (thousands, decimal) = locale.separators();

    let millis = (value.abs() * 1000.0).round() as u128;
    let int_part = millis / 1000;
    let frac_part = millis % 1000;

    let digits = int_part.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(thousands);
        }
        grouped.push(ch);
    }

    if frac_part > 0 {
        let frac = format!("{:03}", frac_part);
        grouped.push(decimal);
        grouped.push_str(frac.trim_end_matches('0'));
    }

    if value < 0.0 && millis > 0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

/// Cut a string to `max` characters, appending an ellipsis when cut
pub fn truncate_chars(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        let head: String = s.chars().take(max).collect();
        format!("{}...", head)
    } else {
        s.to_string()
    }
}

fn is_empty(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(Value::Array(items)) => items.is_empty(),
        _ => false,
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) if !s.trim().is_empty() => {
            s.trim().parse::<f64>().ok().filter(|n| n.is_finite())
        }
        _ => None,
    }
}

fn plain_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn join_array(value: Option<&Value>) -> String {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => s.clone(),
                Value::Object(map) => map
                    .get("name")
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .unwrap_or_else(|| item.to_string()),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join(", "),
        other => plain_text(other),
    }
}

fn first_image(value: Option<&Value>) -> Option<&str> {
    let first = match value? {
        Value::Array(items) => items.first()?,
        single => single,
    };
    match first {
        Value::String(s) if !s.is_empty() => Some(s.as_str()),
        Value::Object(map) => map.get("url").and_then(Value::as_str),
        _ => None,
    }
}

/// Parse a timestamp value into wall-clock time
///
/// RFC 3339 strings keep their own offset; epoch numbers are milliseconds UTC.
fn parse_timestamp(value: &Value) -> Option<NaiveDateTime> {
    match value {
        Value::String(s) => {
            let s = s.trim();
            if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                return Some(dt.naive_local());
            }
            for pattern in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"] {
                if let Ok(dt) = NaiveDateTime::parse_from_str(s, pattern) {
                    return Some(dt);
                }
            }
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        }
        Value::Number(n) => n
            .as_i64()
            .and_then(DateTime::from_timestamp_millis)
            .map(|dt| dt.naive_utc()),
        _ => None,
    }
}

/// Unparseable timestamps are shown as-is rather than hidden
fn format_timestamp(value: Option<&Value>, pattern: &str) -> String {
    match value {
        Some(v) => match parse_timestamp(v) {
            Some(dt) => dt.format(pattern).to_string(),
            None => plain_text(Some(v)),
        },
        None => String::new(),
    }
}
