pub mod client;
pub mod methods;
pub mod models;

use std::future::Future;

use crate::error::AppResult;

use models::{
    DeleteResponse, GetEmailResponse, MailboxName, MoveResponse, OutgoingEmail,
    SendEmailResponse,
};

pub use client::HttpGateway;

/// The remote mailbox service. Implementations hold no mailbox state; every
/// call is a single request/response round-trip.
pub trait MailboxGateway: Send + Sync {
    /// ListInbox, ListSent or ListTrash.
    fn list(
        &self,
        mailbox: MailboxName,
    ) -> impl Future<Output = AppResult<Vec<models::EmailPreview>>> + Send;

    fn get_email(&self, id: &str) -> impl Future<Output = AppResult<GetEmailResponse>> + Send;

    fn send_email(
        &self,
        email: &OutgoingEmail,
    ) -> impl Future<Output = AppResult<SendEmailResponse>> + Send;

    /// The server allocates a new id for the trashed copy.
    fn move_to_trash(&self, id: &str) -> impl Future<Output = AppResult<MoveResponse>> + Send;

    /// The server allocates a new id for the restored copy in the inbox.
    fn restore_email(&self, id: &str) -> impl Future<Output = AppResult<MoveResponse>> + Send;

    fn permanently_delete(
        &self,
        id: &str,
    ) -> impl Future<Output = AppResult<DeleteResponse>> + Send;
}
