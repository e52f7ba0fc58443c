use std::collections::HashMap;

use crate::api::models::MailboxName;

/// An id together with the mailbox that gives it meaning.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EmailRef {
    pub mailbox: MailboxName,
    pub id: String,
}

impl EmailRef {
    pub fn new(mailbox: MailboxName, id: impl Into<String>) -> Self {
        Self {
            mailbox,
            id: id.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Never moved.
    Current(EmailRef),
    /// Moved one or more times; this is where it lives now.
    Moved(EmailRef),
    /// Permanently deleted.
    Deleted,
}

/// Records every ref retired by a confirmed move or delete.
#[derive(Debug, Default)]
pub struct RemapLog {
    retired: HashMap<EmailRef, Option<EmailRef>>,
}

impl RemapLog {
    pub fn retire(&mut self, old: EmailRef, replacement: Option<EmailRef>) {
        if let Some(new) = &replacement {
            // A ref that becomes current again is live, whatever it was before.
            self.retired.remove(new);
            if *new == old {
                return;
            }
        }
        self.retired.insert(old, replacement);
    }

    pub fn is_retired(&self, email: &EmailRef) -> bool {
        self.retired.contains_key(email)
    }

    pub fn replacement(&self, email: &EmailRef) -> Option<&EmailRef> {
        self.retired.get(email).and_then(Option::as_ref)
    }

    pub fn resolve(&self, email: &EmailRef) -> Resolution {
        let mut current = email;
        let mut moved = false;

        // Targets are never retired at insertion time, so chains are acyclic;
        // the bound only guards the loop.
        for _ in 0..=self.retired.len() {
            match self.retired.get(current) {
                None => break,
                Some(None) => return Resolution::Deleted,
                Some(Some(next)) => {
                    current = next;
                    moved = true;
                }
            }
        }

        if moved {
            Resolution::Moved(current.clone())
        } else {
            Resolution::Current(current.clone())
        }
    }
}
