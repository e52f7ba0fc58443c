use crate::api::MailboxGateway;
use crate::api::models::{EmailDetail, MailboxName};
use crate::error::{AppError, AppResult};
use crate::store::EmailRef;

use super::{MailboxEngine, ensure_current};

const LIST: &str = "load the mailbox";
const OPEN: &str = "load this email";

impl<G: MailboxGateway> MailboxEngine<G> {
    /// Lists one mailbox and replaces its collection. Returns `false` when
    /// the result arrived after a newer request for the same mailbox and was
    /// discarded.
    pub async fn fetch_mailbox(&self, mailbox: MailboxName) -> AppResult<bool> {
        let ticket = self.store().begin_fetch(mailbox);
        match self.call(LIST, self.gateway.list(mailbox)).await {
            Ok(emails) => Ok(self.store().finish_fetch(ticket, emails)),
            Err(err) => {
                log::warn!("listing {mailbox} failed: {err}");
                Err(err)
            }
        }
    }

    /// Replaces all three collections from the server without touching the
    /// session state. Optimistic edits made while this is in flight may be
    /// overwritten.
    pub async fn reload_all(&self) -> AppResult<()> {
        let (inbox, sent, trash) = tokio::join!(
            self.fetch_mailbox(MailboxName::Inbox),
            self.fetch_mailbox(MailboxName::Sent),
            self.fetch_mailbox(MailboxName::Trash),
        );
        inbox.and(sent).and(trash).map(|_| ())
    }

    /// User-triggered refresh: drops the opened overlay and selection, then
    /// reloads every mailbox so server unread flags are authoritative again.
    pub async fn refresh(&self) -> AppResult<()> {
        self.store().reset_session();
        self.reload_all().await
    }

    /// Refetches every mailbox invalidated since the last call.
    pub async fn refetch_stale(&self) -> AppResult<()> {
        let stale = self.store().take_stale();
        let mut outcome = Ok(());
        for mailbox in stale {
            if let Err(err) = self.fetch_mailbox(mailbox).await {
                if outcome.is_ok() {
                    outcome = Err(err);
                }
            }
        }
        outcome
    }

    /// Opens an email's detail. The id counts as opened before the request
    /// is sent, so the unread badge updates without waiting on the network.
    pub async fn open_email(&self, email: &EmailRef) -> AppResult<EmailDetail> {
        {
            let mut store = self.store();
            ensure_current(&store, email)?;
            store.mark_opened(&email.id);
            store.select(Some(email.clone()));
        }

        let response = self
            .call(OPEN, self.gateway.get_email(&email.id))
            .await
            .map_err(|err| self.surface(OPEN, err))?;
        let Some(detail) = response.email else {
            return Err(self.surface(OPEN, AppError::NotFound(email.id.clone())));
        };

        let mut store = self.store();
        if !store.is_retired(email) {
            // Fetching the body marks the message read on the server.
            store.mark_read(email.mailbox, &email.id);
            store.cache_detail(email.clone(), detail.clone());
        }
        Ok(detail)
    }

    /// Closes the detail pane.
    pub fn close_email(&self) {
        self.store().select(None);
    }
}
