use crate::api::MailboxGateway;
use crate::api::models::{EmailDetail, EmailPreview, MailboxName, OutgoingEmail, SendEmailResponse};
use crate::error::{AppError, AppResult};
use crate::store::{CacheEvent, CacheStore, EmailRef};
use crate::transfer::{DragData, TransferPlan, plan_drop};

use super::{DestructiveAction, MailboxEngine};

const TRASH: &str = "move this email to trash";
const RESTORE: &str = "restore this email";
const DELETE: &str = "permanently delete this email";
const SEND: &str = "send this email";

impl<G: MailboxGateway> MailboxEngine<G> {
    /// Moves `id` from Inbox or Sent to Trash and returns where it lives now.
    pub async fn move_to_trash(&self, id: &str, source: MailboxName) -> AppResult<EmailRef> {
        self.trash_with_snapshot(EmailRef::new(source, id), None)
            .await
    }

    /// Moves a trashed email back to the inbox.
    pub async fn restore_email(&self, id: &str) -> AppResult<EmailRef> {
        self.restore_with_snapshot(EmailRef::new(MailboxName::Trash, id), None)
            .await
    }

    /// Deletes a trashed email for good. Nothing replaces it anywhere.
    pub async fn permanently_delete(&self, id: &str) -> AppResult<()> {
        let email = EmailRef::new(MailboxName::Trash, id);
        let _claim = self.claim(&email)?;
        self.confirm(DestructiveAction::PermanentlyDelete)?;

        match self
            .call(DELETE, self.gateway.permanently_delete(&email.id))
            .await
        {
            Ok(response) if response.success => {}
            Ok(_) => return Err(self.surface(DELETE, AppError::Rejected { action: DELETE })),
            Err(err) => return Err(self.surface(DELETE, err)),
        }

        let mut store = self.store();
        store.remove_by_ids(MailboxName::Trash, &[email.id.as_str()]);
        store.retire(&email, None);
        self.invalidate(&mut store, &[MailboxName::Trash]);
        log::info!("permanently deleted {id} from trash");
        Ok(())
    }

    pub async fn send_email(&self, email: &OutgoingEmail) -> AppResult<SendEmailResponse> {
        if email.to.trim().is_empty() {
            return Err(AppError::InvalidInput("a recipient is required".to_string()));
        }

        let response = match self.call(SEND, self.gateway.send_email(email)).await {
            Ok(response) if response.success => response,
            Ok(_) => return Err(self.surface(SEND, AppError::Rejected { action: SEND })),
            Err(err) => return Err(self.surface(SEND, err)),
        };

        let mut store = self.store();
        // Mail to oneself comes back through the inbox.
        self.invalidate(&mut store, &[MailboxName::Inbox]);
        store.publish(CacheEvent::ComposeClosed);
        Ok(response)
    }

    /// Handles a drop onto the `destination` view. Drops that do not carry a
    /// valid transfer payload for this view are ignored and yield `None`.
    pub async fn drop_on(
        &self,
        data: &DragData,
        destination: MailboxName,
    ) -> AppResult<Option<EmailRef>> {
        let Some(plan) = plan_drop(data, destination) else {
            return Ok(None);
        };
        self.apply_transfer(plan).await.map(Some)
    }

    pub async fn apply_transfer(&self, plan: TransferPlan) -> AppResult<EmailRef> {
        match plan {
            TransferPlan::MoveToTrash { email, snapshot } => {
                self.trash_with_snapshot(email, snapshot).await
            }
            TransferPlan::Restore { id, snapshot } => {
                self.restore_with_snapshot(EmailRef::new(MailboxName::Trash, id), snapshot)
                    .await
            }
        }
    }

    async fn trash_with_snapshot(
        &self,
        email: EmailRef,
        snapshot: Option<EmailPreview>,
    ) -> AppResult<EmailRef> {
        if email.mailbox == MailboxName::Trash {
            return Err(AppError::InvalidMailbox {
                action: TRASH,
                mailbox: email.mailbox,
            });
        }

        let _claim = self.claim(&email)?;
        self.confirm(DestructiveAction::MoveToTrash)?;
        let held = held_preview(&self.store(), &email, snapshot);

        let response = match self.call(TRASH, self.gateway.move_to_trash(&email.id)).await {
            Ok(response) if response.success => response,
            Ok(_) => return Err(self.surface(TRASH, AppError::Rejected { action: TRASH })),
            Err(err) => return Err(self.surface(TRASH, err)),
        };

        let moved = EmailRef::new(MailboxName::Trash, new_id_or(&response.new_id, &email.id));
        let mut store = self.store();
        let preview = held.or_else(|| held_preview(&store, &email, None));

        store.remove_by_ids(email.mailbox, &[email.id.as_str()]);
        store.remove_by_ids(MailboxName::Trash, &[email.id.as_str(), moved.id.as_str()]);
        if let Some(preview) = preview {
            store.remember_unread(moved.clone(), preview.unread);
            store.upsert_front(MailboxName::Trash, preview.relocated(&moved.id, false));
        }
        store.retire(&email, Some(moved.clone()));

        let mut stale = vec![MailboxName::Trash, email.mailbox];
        if self.policy.invalidate_sent_on_move && email.mailbox != MailboxName::Sent {
            stale.push(MailboxName::Sent);
        }
        self.invalidate(&mut store, &stale);

        log::info!("moved {} {} to trash as {}", email.mailbox, email.id, moved.id);
        Ok(moved)
    }

    async fn restore_with_snapshot(
        &self,
        email: EmailRef,
        snapshot: Option<EmailPreview>,
    ) -> AppResult<EmailRef> {
        if email.mailbox != MailboxName::Trash {
            return Err(AppError::InvalidMailbox {
                action: RESTORE,
                mailbox: email.mailbox,
            });
        }

        let _claim = self.claim(&email)?;
        self.confirm(DestructiveAction::Restore)?;
        let held = held_preview(&self.store(), &email, snapshot);

        let response = match self
            .call(RESTORE, self.gateway.restore_email(&email.id))
            .await
        {
            Ok(response) if response.success => response,
            Ok(_) => return Err(self.surface(RESTORE, AppError::Rejected { action: RESTORE })),
            Err(err) => return Err(self.surface(RESTORE, err)),
        };

        let restored = EmailRef::new(MailboxName::Inbox, new_id_or(&response.new_id, &email.id));
        let mut store = self.store();
        let preview = held.or_else(|| held_preview(&store, &email, None));

        let unread = store
            .take_remembered_unread(&email)
            .or(preview.as_ref().map(|preview| preview.unread))
            .unwrap_or(false);

        store.remove_by_ids(MailboxName::Trash, &[email.id.as_str()]);
        store.remove_by_ids(MailboxName::Inbox, &[email.id.as_str(), restored.id.as_str()]);
        if let Some(preview) = preview {
            store.upsert_front(MailboxName::Inbox, preview.relocated(&restored.id, unread));
        }
        store.retire(&email, Some(restored.clone()));

        let mut stale = vec![MailboxName::Trash, MailboxName::Inbox];
        if self.policy.invalidate_sent_on_move {
            stale.push(MailboxName::Sent);
        }
        self.invalidate(&mut store, &stale);

        log::info!("restored trash {} to inbox as {}", email.id, restored.id);
        Ok(restored)
    }
}

/// The freshest preview fields known locally: the listed preview, then the
/// drag snapshot, then a previously fetched detail.
fn held_preview(
    store: &CacheStore,
    email: &EmailRef,
    snapshot: Option<EmailPreview>,
) -> Option<EmailPreview> {
    store
        .find(email.mailbox, &email.id)
        .cloned()
        .or(snapshot)
        .or_else(|| store.detail(email).map(EmailDetail::preview))
}

/// An empty id in a successful response means the id did not change.
fn new_id_or(new_id: &str, old_id: &str) -> String {
    let new_id = new_id.trim();
    if new_id.is_empty() {
        old_id.to_string()
    } else {
        new_id.to_string()
    }
}
