//! Drag-and-drop transfer of emails between mailbox views.
//!
//! A drag source writes a [`TransferPayload`] under [`TRANSFER_TYPE`]; drop
//! targets only react to data carrying that type. Anything that fails to
//! parse or validate is ignored: a drop is a gesture, not a committed action.

use serde::{Deserialize, Serialize};

use crate::api::models::{EmailPreview, MailboxName};
use crate::error::AppResult;
use crate::store::EmailRef;

/// Private marker type for email drags.
pub const TRANSFER_TYPE: &str = "application/email-item";
const PLAIN_TEXT_TYPE: &str = "text/plain";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferPayload {
    pub id: String,
    pub origin: MailboxName,
    /// Lets the destination render the email before its next list fetch.
    #[serde(rename = "email", default, skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<EmailPreview>,
}

impl TransferPayload {
    pub fn from_preview(origin: MailboxName, preview: &EmailPreview) -> Self {
        Self {
            id: preview.id.clone(),
            origin,
            snapshot: Some(preview.clone()),
        }
    }

    pub fn encode(&self) -> AppResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parses raw drag data, logging and discarding anything malformed.
    pub fn parse(raw: &str) -> Option<Self> {
        let payload = match serde_json::from_str::<TransferPayload>(raw) {
            Ok(payload) => payload,
            Err(err) => {
                log::debug!("ignoring malformed drag payload: {err}");
                return None;
            }
        };

        if payload.id.trim().is_empty() {
            log::debug!("ignoring drag payload without an id");
            return None;
        }

        Some(payload)
    }
}

/// Typed entries attached to a drag, keyed by media type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DragData {
    entries: Vec<(String, String)>,
}

impl DragData {
    pub fn new() -> Self {
        Self::default()
    }

    /// What a drag source attaches when an email row starts dragging.
    pub fn for_email(origin: MailboxName, preview: &EmailPreview) -> AppResult<Self> {
        let mut data = Self::new();
        data.set(PLAIN_TEXT_TYPE, &preview.id);
        data.set(
            TRANSFER_TYPE,
            &TransferPayload::from_preview(origin, preview).encode()?,
        );
        Ok(data)
    }

    pub fn set(&mut self, media_type: &str, value: &str) {
        self.entries.retain(|(kind, _)| kind != media_type);
        self.entries.push((media_type.to_string(), value.to_string()));
    }

    pub fn get(&self, media_type: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(kind, _)| kind == media_type)
            .map(|(_, value)| value.as_str())
    }

    pub fn has_type(&self, media_type: &str) -> bool {
        self.get(media_type).is_some()
    }

    /// Whether a drop target should highlight while this hovers over it.
    pub fn is_email_transfer(&self) -> bool {
        self.has_type(TRANSFER_TYPE)
    }
}

/// What a valid drop asks the engine to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferPlan {
    MoveToTrash {
        email: EmailRef,
        snapshot: Option<EmailPreview>,
    },
    Restore {
        id: String,
        snapshot: Option<EmailPreview>,
    },
}

/// Validates a drop of `data` onto `destination`.
///
/// Trash accepts Inbox and Sent items; Inbox accepts Trash items. Self-drops
/// and every other pairing are no-ops.
pub fn plan_drop(data: &DragData, destination: MailboxName) -> Option<TransferPlan> {
    let payload = TransferPayload::parse(data.get(TRANSFER_TYPE)?)?;
    plan_payload(payload, destination)
}

pub fn plan_payload(payload: TransferPayload, destination: MailboxName) -> Option<TransferPlan> {
    let TransferPayload {
        id,
        origin,
        snapshot,
    } = payload;

    match (origin, destination) {
        (MailboxName::Inbox | MailboxName::Sent, MailboxName::Trash) => {
            Some(TransferPlan::MoveToTrash {
                email: EmailRef::new(origin, id),
                snapshot,
            })
        }
        (MailboxName::Trash, MailboxName::Inbox) => Some(TransferPlan::Restore { id, snapshot }),
        _ => {
            log::debug!("ignoring drop of {origin} item {id} onto {destination}");
            None
        }
    }
}
