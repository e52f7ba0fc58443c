#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use mailbox_sync::api::models::{
    DeleteResponse, EmailDetail, EmailPreview, GetEmailResponse, MailboxName, MoveResponse,
    OutgoingEmail, SendEmailResponse,
};
use mailbox_sync::{AppError, AppResult, MailboxGateway};
use tokio::sync::Notify;

/// One gateway round-trip, as the fake saw it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Call {
    List(MailboxName),
    Get(String),
    Send(String),
    Trash(String),
    Restore(String),
    Delete(String),
}

/// Which kind of call a hold or scripted failure applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    List(MailboxName),
    Get,
    Send,
    Trash,
    Restore,
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Rejected,
    Unreachable,
}

#[derive(Default)]
struct State {
    lists: HashMap<MailboxName, Vec<EmailPreview>>,
    details: HashMap<String, EmailDetail>,
    new_ids: HashMap<String, String>,
    outcomes: HashMap<Op, Outcome>,
    holds: HashMap<Op, Arc<Notify>>,
    calls: Vec<Call>,
}

/// In-memory gateway scripted per test. Trashing `x` yields `x-t` and
/// restoring `x` yields `x-r` unless a new id is scripted.
#[derive(Default)]
pub struct FakeGateway {
    state: Mutex<State>,
}

impl FakeGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_inbox(previews: Vec<EmailPreview>) -> Self {
        let gateway = Self::new();
        gateway.set_list(MailboxName::Inbox, previews);
        gateway
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    pub fn set_list(&self, mailbox: MailboxName, previews: Vec<EmailPreview>) {
        self.state().lists.insert(mailbox, previews);
    }

    pub fn set_detail(&self, detail: EmailDetail) {
        self.state().details.insert(detail.id.clone(), detail);
    }

    pub fn set_new_id(&self, old: &str, new: &str) {
        self.state()
            .new_ids
            .insert(old.to_string(), new.to_string());
    }

    pub fn fail(&self, op: Op, outcome: Outcome) {
        self.state().outcomes.insert(op, outcome);
    }

    /// The next call of `op` waits until the returned handle is notified.
    pub fn hold(&self, op: Op) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        self.state().holds.insert(op, Arc::clone(&notify));
        notify
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state().calls.clone()
    }

    pub fn count(&self, call: &Call) -> usize {
        self.state().calls.iter().filter(|seen| *seen == call).count()
    }

    fn begin(&self, op: Op, call: Call) -> (Option<Outcome>, Option<Arc<Notify>>) {
        let mut state = self.state();
        state.calls.push(call);
        (state.outcomes.get(&op).copied(), state.holds.remove(&op))
    }

    async fn pass(hold: Option<Arc<Notify>>) {
        if let Some(hold) = hold {
            hold.notified().await;
        }
    }

    fn moved(&self, outcome: Option<Outcome>, id: &str, suffix: &str) -> AppResult<MoveResponse> {
        match outcome {
            Some(Outcome::Unreachable) => Err(AppError::Api("service unreachable".to_string())),
            Some(Outcome::Rejected) => Ok(MoveResponse {
                success: false,
                new_id: String::new(),
            }),
            None => {
                let new_id = self
                    .state()
                    .new_ids
                    .get(id)
                    .cloned()
                    .unwrap_or_else(|| format!("{id}-{suffix}"));
                Ok(MoveResponse {
                    success: true,
                    new_id,
                })
            }
        }
    }
}

impl MailboxGateway for FakeGateway {
    async fn list(&self, mailbox: MailboxName) -> AppResult<Vec<EmailPreview>> {
        let (outcome, hold) = self.begin(Op::List(mailbox), Call::List(mailbox));
        // Captured before any hold so a held call returns what was listed
        // when it was issued.
        let listed = self.state().lists.get(&mailbox).cloned().unwrap_or_default();
        Self::pass(hold).await;
        match outcome {
            Some(_) => Err(AppError::Api(format!("listing {mailbox} unavailable"))),
            None => Ok(listed),
        }
    }

    async fn get_email(&self, id: &str) -> AppResult<GetEmailResponse> {
        let (outcome, hold) = self.begin(Op::Get, Call::Get(id.to_string()));
        Self::pass(hold).await;
        if outcome.is_some() {
            return Err(AppError::Api("service unreachable".to_string()));
        }
        Ok(GetEmailResponse {
            email: self.state().details.get(id).cloned(),
        })
    }

    async fn send_email(&self, email: &OutgoingEmail) -> AppResult<SendEmailResponse> {
        let (outcome, hold) = self.begin(Op::Send, Call::Send(email.to.clone()));
        Self::pass(hold).await;
        match outcome {
            Some(Outcome::Unreachable) => Err(AppError::Api("service unreachable".to_string())),
            Some(Outcome::Rejected) => Ok(SendEmailResponse {
                success: false,
                id: None,
            }),
            None => Ok(SendEmailResponse {
                success: true,
                id: Some("sent-1".to_string()),
            }),
        }
    }

    async fn move_to_trash(&self, id: &str) -> AppResult<MoveResponse> {
        let (outcome, hold) = self.begin(Op::Trash, Call::Trash(id.to_string()));
        Self::pass(hold).await;
        self.moved(outcome, id, "t")
    }

    async fn restore_email(&self, id: &str) -> AppResult<MoveResponse> {
        let (outcome, hold) = self.begin(Op::Restore, Call::Restore(id.to_string()));
        Self::pass(hold).await;
        self.moved(outcome, id, "r")
    }

    async fn permanently_delete(&self, id: &str) -> AppResult<DeleteResponse> {
        let (outcome, hold) = self.begin(Op::Delete, Call::Delete(id.to_string()));
        Self::pass(hold).await;
        match outcome {
            Some(Outcome::Unreachable) => Err(AppError::Api("service unreachable".to_string())),
            Some(Outcome::Rejected) => Ok(DeleteResponse { success: false }),
            None => Ok(DeleteResponse { success: true }),
        }
    }
}

pub fn preview(id: &str, unread: bool) -> EmailPreview {
    EmailPreview {
        id: id.to_string(),
        from: "Ann <ann@example.com>".to_string(),
        subject: format!("Subject {id}"),
        unread,
        received_at: None,
    }
}

pub fn detail(id: &str, body: &str) -> EmailDetail {
    EmailDetail {
        id: id.to_string(),
        from: "Ann <ann@example.com>".to_string(),
        to: vec!["me@example.com".to_string()],
        cc: vec![],
        subject: format!("Subject {id}"),
        body: body.to_string(),
        unread: true,
        received_at: None,
    }
}

pub fn ids(previews: &[EmailPreview]) -> Vec<&str> {
    previews.iter().map(|preview| preview.id.as_str()).collect()
}
