/// Actions that need an explicit yes from the user before they run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DestructiveAction {
    MoveToTrash,
    Restore,
    PermanentlyDelete,
}

impl DestructiveAction {
    pub fn prompt(self) -> &'static str {
        match self {
            DestructiveAction::MoveToTrash => "Move this email to trash?",
            DestructiveAction::Restore => "Restore this email to the inbox?",
            DestructiveAction::PermanentlyDelete => {
                "Are you sure you want to permanently delete this email? This action cannot be undone."
            }
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DestructiveAction::MoveToTrash => "move to trash",
            DestructiveAction::Restore => "restore",
            DestructiveAction::PermanentlyDelete => "permanent delete",
        }
    }

    pub fn is_irreversible(self) -> bool {
        matches!(self, DestructiveAction::PermanentlyDelete)
    }
}

/// Asks the user. Implemented by the UI layer.
pub trait Confirmer: Send + Sync {
    fn confirm(&self, action: DestructiveAction) -> bool;
}

impl<F> Confirmer for F
where
    F: Fn(DestructiveAction) -> bool + Send + Sync,
{
    fn confirm(&self, action: DestructiveAction) -> bool {
        self(action)
    }
}

/// Answers yes to everything, for headless callers that confirm upstream.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysConfirm;

impl Confirmer for AlwaysConfirm {
    fn confirm(&self, _action: DestructiveAction) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permanent_delete_prompt_is_distinct() {
        let delete = DestructiveAction::PermanentlyDelete.prompt();
        assert_ne!(delete, DestructiveAction::MoveToTrash.prompt());
        assert!(delete.contains("cannot be undone"));
        assert!(DestructiveAction::PermanentlyDelete.is_irreversible());
        assert!(!DestructiveAction::MoveToTrash.is_irreversible());
    }
}
