use std::io;

use thiserror::Error;

use crate::api::models::MailboxName;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("api error: {0}")]
    Api(String),
    #[error("server rejected {action}")]
    Rejected { action: &'static str },
    #[error("{action} timed out")]
    Timeout { action: &'static str },
    #[error("email `{0}` not found")]
    NotFound(String),
    #[error("email `{id}` in {mailbox} is no longer valid")]
    StaleId {
        mailbox: MailboxName,
        id: String,
        replaced_by: Option<(MailboxName, String)>,
    },
    #[error("another operation on email `{0}` is still in flight")]
    Busy(String),
    #[error("{action} is not allowed from {mailbox}")]
    InvalidMailbox {
        action: &'static str,
        mailbox: MailboxName,
    },
    #[error("{0} cancelled")]
    Cancelled(&'static str),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("url parse error: {0}")]
    Url(#[from] url::ParseError),
}

impl AppError {
    /// Notice shown to the user when an action fails. `None` means the
    /// failure is silent (the user backed out of a confirmation).
    pub fn user_message(&self) -> Option<String> {
        match self {
            AppError::Cancelled(_) => None,
            AppError::NotFound(_) => {
                Some("This email could not be loaded. Return to the list and try again.".to_string())
            }
            AppError::StaleId { .. } => Some(
                "This email has moved since it was displayed. Refresh and try again.".to_string(),
            ),
            AppError::Busy(_) => {
                Some("This email is still being updated. Please wait a moment.".to_string())
            }
            AppError::Rejected { action } | AppError::Timeout { action } => {
                Some(format!("Unable to {action}. Please try again."))
            }
            other => Some(format!("Something went wrong: {other}. Please try again.")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancelled_actions_are_silent() {
        assert!(AppError::Cancelled("move to trash").user_message().is_none());
    }

    #[test]
    fn rejected_actions_name_the_action() {
        let message = AppError::Rejected {
            action: "restore this email",
        }
        .user_message()
        .unwrap_or_default();
        assert_eq!(message, "Unable to restore this email. Please try again.");
    }
}
