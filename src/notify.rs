// User-facing notices
//
// Every API error is caught by the screen that issued the call and turned
// into a `Notice`. The TUI renders notices as toasts; the headless CLI prints
// them to stderr.

use crate::api::ApiError;
use crate::i18n::Labels;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }

    /// Convert an API failure into a localized notice
    ///
    /// Transport failures get the generic network message; an expired session
    /// gets its own message; anything else uses `fallback` (what the caller
    /// was trying to do) with the server's message appended when present.
    pub fn from_api_error(error: &ApiError, fallback: &str, labels: &Labels) -> Self {
        let message = match error {
            ApiError::Transport(_) => labels.network_error.to_string(),
            ApiError::Unauthorized => labels.unauthorized.to_string(),
            ApiError::Status { message, .. } if !message.is_empty() => {
                format!("{}: {}", fallback, message)
            }
            _ => fallback.to_string(),
        };
        Self::error(message)
    }

    pub fn is_error(&self) -> bool {
        self.level == NoticeLevel::Error
    }
}
