mod confirm;
mod fetch;
mod mutations;

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::{Notify, broadcast};

use crate::api::MailboxGateway;
use crate::api::client::DEFAULT_TIMEOUT;
use crate::api::models::{EmailPreview, MailboxName};
use crate::config::Settings;
use crate::error::{AppError, AppResult};
use crate::store::{CacheEvent, CacheStore, EmailRef, Resolution};

pub use confirm::{AlwaysConfirm, Confirmer, DestructiveAction};

/// Knobs that change how mutations reconcile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncPolicy {
    /// Upper bound on each gateway call.
    pub call_timeout: Duration,
    /// Refetch Sent after every trash/restore, not only when Sent was the
    /// source.
    pub invalidate_sent_on_move: bool,
}

impl Default for SyncPolicy {
    fn default() -> Self {
        Self {
            call_timeout: DEFAULT_TIMEOUT,
            invalidate_sent_on_move: true,
        }
    }
}

impl SyncPolicy {
    pub fn from_settings(settings: &Settings) -> AppResult<Self> {
        Ok(Self {
            call_timeout: settings.timeout()?,
            invalidate_sent_on_move: settings.invalidate_sent_on_move(),
        })
    }
}

/// Client-side mailbox synchronization engine.
///
/// Owns the cache store and sequences every operation against the gateway:
/// local bookkeeping first, then the round-trip, then reconciliation. A
/// failed round-trip leaves the collections as they were.
pub struct MailboxEngine<G> {
    gateway: G,
    store: Arc<Mutex<CacheStore>>,
    policy: SyncPolicy,
    confirmer: Arc<dyn Confirmer>,
    wake: Arc<Notify>,
}

impl<G: MailboxGateway> MailboxEngine<G> {
    pub fn new(gateway: G) -> Self {
        Self {
            gateway,
            store: Arc::new(Mutex::new(CacheStore::new())),
            policy: SyncPolicy::default(),
            confirmer: Arc::new(AlwaysConfirm),
            wake: Arc::new(Notify::new()),
        }
    }

    pub fn with_policy(mut self, policy: SyncPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_confirmer(mut self, confirmer: impl Confirmer + 'static) -> Self {
        self.confirmer = Arc::new(confirmer);
        self
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn policy(&self) -> SyncPolicy {
        self.policy
    }

    // -- read side -----------------------------------------------------------

    /// Runs `f` against the store under its lock.
    pub fn read<R>(&self, f: impl FnOnce(&CacheStore) -> R) -> R {
        f(&self.store())
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CacheEvent> {
        self.store().subscribe()
    }

    pub fn snapshot(&self, mailbox: MailboxName) -> Vec<EmailPreview> {
        self.store().snapshot(mailbox)
    }

    pub fn unread_count(&self) -> usize {
        self.store().unread_count()
    }

    pub fn displayed_unread(&self, preview: &EmailPreview) -> bool {
        self.store().displayed_unread(preview)
    }

    pub fn selection(&self) -> Option<EmailRef> {
        self.store().selection().cloned()
    }

    /// Where an email shown under `email` lives now.
    pub fn resolve(&self, email: &EmailRef) -> Resolution {
        self.store().resolve(email)
    }

    /// Wakes the background refresher whenever a mailbox is invalidated.
    pub fn wake_handle(&self) -> Arc<Notify> {
        Arc::clone(&self.wake)
    }

    // -- internals -----------------------------------------------------------

    fn store(&self) -> MutexGuard<'_, CacheStore> {
        lock(&self.store)
    }

    async fn call<T>(
        &self,
        action: &'static str,
        request: impl Future<Output = AppResult<T>>,
    ) -> AppResult<T> {
        match tokio::time::timeout(self.policy.call_timeout, request).await {
            Ok(result) => result,
            Err(_) => Err(AppError::Timeout { action }),
        }
    }

    /// Claims `email.id` for the duration of one mutation.
    fn claim(&self, email: &EmailRef) -> AppResult<InFlight> {
        let mut store = self.store();
        ensure_current(&store, email)?;
        if !store.try_begin_mutation(&email.id) {
            return Err(AppError::Busy(email.id.clone()));
        }

        Ok(InFlight {
            store: Arc::clone(&self.store),
            id: email.id.clone(),
        })
    }

    fn confirm(&self, action: DestructiveAction) -> AppResult<()> {
        if self.confirmer.confirm(action) {
            Ok(())
        } else {
            Err(AppError::Cancelled(action.label()))
        }
    }

    /// Logs a failed action and publishes its user-facing notice.
    fn surface(&self, action: &str, err: AppError) -> AppError {
        log::warn!("{action} failed: {err}");
        if let Some(message) = err.user_message() {
            self.store().publish(CacheEvent::Failed { message });
        }
        err
    }

    fn invalidate(&self, store: &mut CacheStore, mailboxes: &[MailboxName]) {
        for mailbox in mailboxes {
            store.invalidate(*mailbox);
        }
        self.wake.notify_one();
    }
}

fn lock(store: &Mutex<CacheStore>) -> MutexGuard<'_, CacheStore> {
    store.lock().unwrap_or_else(PoisonError::into_inner)
}

fn ensure_current(store: &CacheStore, email: &EmailRef) -> AppResult<()> {
    if !store.is_retired(email) {
        return Ok(());
    }

    Err(AppError::StaleId {
        mailbox: email.mailbox,
        id: email.id.clone(),
        replaced_by: store
            .replacement(email)
            .map(|next| (next.mailbox, next.id.clone())),
    })
}

/// Releases the in-flight claim on drop, including when the owning future
/// is cancelled.
struct InFlight {
    store: Arc<Mutex<CacheStore>>,
    id: String,
}

impl Drop for InFlight {
    fn drop(&mut self) {
        lock(&self.store).finish_mutation(&self.id);
    }
}
