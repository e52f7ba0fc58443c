pub mod api;
pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod mail;
pub mod store;
pub mod sync;
pub mod transfer;

pub use api::MailboxGateway;
pub use api::models::{EmailDetail, EmailPreview, MailboxName, OutgoingEmail, Timestamp};
pub use engine::{Confirmer, DestructiveAction, MailboxEngine, SyncPolicy};
pub use error::{AppError, AppResult};
pub use store::{CacheEvent, CacheStore, EmailRef, Resolution};
