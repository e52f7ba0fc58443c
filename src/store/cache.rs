use std::collections::{HashMap, HashSet};

use tokio::sync::broadcast;

use crate::api::models::{EmailDetail, EmailPreview, MailboxName};

use super::remap::{EmailRef, RemapLog, Resolution};

const EVENT_CAPACITY: usize = 64;

/// Published after every state change so views can re-render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheEvent {
    Replaced(MailboxName),
    Changed(MailboxName),
    Invalidated(MailboxName),
    Opened(String),
    SelectionChanged(Option<EmailRef>),
    Reset,
    ComposeClosed,
    Failed { message: String },
}

/// Identifies one list request. Only the most recent ticket per mailbox may
/// write its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    mailbox: MailboxName,
    seq: u64,
}

impl FetchTicket {
    pub fn mailbox(&self) -> MailboxName {
        self.mailbox
    }
}

/// Owns the three mailbox collections and all session-local state derived
/// from them. Every operation is synchronous and total.
#[derive(Debug)]
pub struct CacheStore {
    collections: HashMap<MailboxName, Vec<EmailPreview>>,
    opened: HashSet<String>,
    selection: Option<EmailRef>,
    details: HashMap<EmailRef, EmailDetail>,
    in_flight: HashSet<String>,
    remap: RemapLog,
    trashed_unread: HashMap<EmailRef, bool>,
    latest_fetch: HashMap<MailboxName, u64>,
    next_seq: u64,
    stale: HashSet<MailboxName>,
    events: broadcast::Sender<CacheEvent>,
}

impl Default for CacheStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CacheStore {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            collections: HashMap::new(),
            opened: HashSet::new(),
            selection: None,
            details: HashMap::new(),
            in_flight: HashSet::new(),
            remap: RemapLog::default(),
            trashed_unread: HashMap::new(),
            latest_fetch: HashMap::new(),
            next_seq: 0,
            stale: HashSet::new(),
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CacheEvent> {
        self.events.subscribe()
    }

    pub(crate) fn publish(&self, event: CacheEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    // -- collections ---------------------------------------------------------

    /// `None` until the first fetch of that mailbox completes.
    pub fn get(&self, mailbox: MailboxName) -> Option<&[EmailPreview]> {
        self.collections.get(&mailbox).map(Vec::as_slice)
    }

    /// The collection as rendered: absent collections are empty.
    pub fn snapshot(&self, mailbox: MailboxName) -> Vec<EmailPreview> {
        self.get(mailbox).map(<[_]>::to_vec).unwrap_or_default()
    }

    pub fn find(&self, mailbox: MailboxName, id: &str) -> Option<&EmailPreview> {
        self.get(mailbox)?.iter().find(|preview| preview.id == id)
    }

    pub fn contains(&self, mailbox: MailboxName, id: &str) -> bool {
        self.find(mailbox, id).is_some()
    }

    pub fn replace(&mut self, mailbox: MailboxName, emails: Vec<EmailPreview>) {
        let mut seen = HashSet::with_capacity(emails.len());
        let deduped = emails
            .into_iter()
            .filter(|preview| seen.insert(preview.id.clone()))
            .collect::<Vec<_>>();

        log::debug!("replacing {mailbox} with {} previews", deduped.len());
        self.collections.insert(mailbox, deduped);
        self.publish(CacheEvent::Replaced(mailbox));
    }

    /// Insert, or move an existing entry with the same id, to the front.
    pub fn upsert_front(&mut self, mailbox: MailboxName, preview: EmailPreview) {
        let emails = self.collections.entry(mailbox).or_default();
        emails.retain(|entry| entry.id != preview.id);
        emails.insert(0, preview);
        self.publish(CacheEvent::Changed(mailbox));
    }

    /// Absent collections stay absent.
    pub fn remove_by_ids(&mut self, mailbox: MailboxName, ids: &[&str]) {
        let Some(emails) = self.collections.get_mut(&mailbox) else {
            return;
        };

        let before = emails.len();
        emails.retain(|entry| !ids.contains(&entry.id.as_str()));
        if emails.len() != before {
            self.publish(CacheEvent::Changed(mailbox));
        }
    }

    /// Clears the unread flag on one preview. Returns whether it changed.
    pub fn mark_read(&mut self, mailbox: MailboxName, id: &str) -> bool {
        let Some(preview) = self
            .collections
            .get_mut(&mailbox)
            .and_then(|emails| emails.iter_mut().find(|entry| entry.id == id))
        else {
            return false;
        };

        if !preview.unread {
            return false;
        }
        preview.unread = false;
        self.publish(CacheEvent::Changed(mailbox));
        true
    }

    // -- fetch ordering ------------------------------------------------------

    pub fn begin_fetch(&mut self, mailbox: MailboxName) -> FetchTicket {
        self.next_seq += 1;
        self.latest_fetch.insert(mailbox, self.next_seq);
        FetchTicket {
            mailbox,
            seq: self.next_seq,
        }
    }

    pub fn is_latest(&self, ticket: FetchTicket) -> bool {
        self.latest_fetch.get(&ticket.mailbox) == Some(&ticket.seq)
    }

    /// Applies a fetch result unless a newer request for the same mailbox
    /// was issued after it.
    pub fn finish_fetch(&mut self, ticket: FetchTicket, emails: Vec<EmailPreview>) -> bool {
        if !self.is_latest(ticket) {
            log::debug!(
                "discarding out-of-order {} fetch #{}",
                ticket.mailbox,
                ticket.seq
            );
            return false;
        }

        self.stale.remove(&ticket.mailbox);
        self.replace(ticket.mailbox, emails);
        true
    }

    // -- invalidation --------------------------------------------------------

    /// Marks `mailbox` for refetch. A list request already in flight was
    /// issued before the change and can no longer clear the mark, so its
    /// result is discarded like any superseded fetch.
    pub fn invalidate(&mut self, mailbox: MailboxName) {
        self.next_seq += 1;
        self.latest_fetch.insert(mailbox, self.next_seq);
        self.stale.insert(mailbox);
        self.publish(CacheEvent::Invalidated(mailbox));
    }

    pub fn is_stale(&self, mailbox: MailboxName) -> bool {
        self.stale.contains(&mailbox)
    }

    /// Stale mailboxes in a fixed order, clearing the set.
    pub fn take_stale(&mut self) -> Vec<MailboxName> {
        let stale = MailboxName::ALL
            .into_iter()
            .filter(|mailbox| self.stale.contains(mailbox))
            .collect();
        self.stale.clear();
        stale
    }

    // -- read overlay --------------------------------------------------------

    /// Returns `true` the first time an id is opened this session.
    pub fn mark_opened(&mut self, id: &str) -> bool {
        if !self.opened.insert(id.to_string()) {
            return false;
        }
        self.publish(CacheEvent::Opened(id.to_string()));
        true
    }

    pub fn is_opened(&self, id: &str) -> bool {
        self.opened.contains(id)
    }

    pub fn opened_ids(&self) -> &HashSet<String> {
        &self.opened
    }

    pub fn displayed_unread(&self, preview: &EmailPreview) -> bool {
        preview.unread && !self.opened.contains(&preview.id)
    }

    /// Inbox previews still shown as unread after the opened overlay.
    pub fn unread_count(&self) -> usize {
        self.get(MailboxName::Inbox)
            .unwrap_or_default()
            .iter()
            .filter(|preview| self.displayed_unread(preview))
            .count()
    }

    // -- selection and details -----------------------------------------------

    pub fn selection(&self) -> Option<&EmailRef> {
        self.selection.as_ref()
    }

    pub fn select(&mut self, email: Option<EmailRef>) {
        if self.selection == email {
            return;
        }
        self.selection = email.clone();
        self.publish(CacheEvent::SelectionChanged(email));
    }

    pub fn cache_detail(&mut self, email: EmailRef, detail: EmailDetail) {
        self.details.insert(email, detail);
    }

    pub fn detail(&self, email: &EmailRef) -> Option<&EmailDetail> {
        self.details.get(email)
    }

    /// Clears the opened overlay and selection; collections are untouched.
    pub fn reset_session(&mut self) {
        self.opened.clear();
        self.selection = None;
        self.publish(CacheEvent::Reset);
    }

    // -- mutation bookkeeping ------------------------------------------------

    /// Claims `id` for one mutation. Fails if another is already running.
    pub fn try_begin_mutation(&mut self, id: &str) -> bool {
        self.in_flight.insert(id.to_string())
    }

    pub fn finish_mutation(&mut self, id: &str) {
        self.in_flight.remove(id);
    }

    pub fn is_in_flight(&self, id: &str) -> bool {
        self.in_flight.contains(id)
    }

    pub fn resolve(&self, email: &EmailRef) -> Resolution {
        self.remap.resolve(email)
    }

    pub fn is_retired(&self, email: &EmailRef) -> bool {
        self.remap.is_retired(email)
    }

    pub fn replacement(&self, email: &EmailRef) -> Option<&EmailRef> {
        self.remap.replacement(email)
    }

    /// Keeps the unread flag a message had before it was trashed; the
    /// trashed copy itself is always listed as read.
    pub fn remember_unread(&mut self, trashed: EmailRef, unread: bool) {
        self.trashed_unread.insert(trashed, unread);
    }

    pub fn take_remembered_unread(&mut self, trashed: &EmailRef) -> Option<bool> {
        self.trashed_unread.remove(trashed)
    }

    /// Records that `old` no longer exists, moving the selection and detail
    /// along with it.
    pub fn retire(&mut self, old: &EmailRef, replacement: Option<EmailRef>) {
        self.trashed_unread.remove(old);
        let detail = self.details.remove(old);
        if let (Some(new), Some(mut detail)) = (&replacement, detail) {
            detail.id = new.id.clone();
            self.details.insert(new.clone(), detail);
        }

        if self.selection.as_ref() == Some(old) {
            self.select(replacement.clone());
        }

        self.remap.retire(old.clone(), replacement);
    }
}
