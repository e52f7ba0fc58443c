use super::models::MailboxName;

pub const SERVICE_NAME: &str = "com.emailclient.backend.grpc.EmailService";

pub const GET_EMAIL: &str = "GetEmail";
pub const SEND_EMAIL: &str = "SendEmail";
pub const MOVE_TO_TRASH: &str = "MoveToTrash";
pub const RESTORE_EMAIL: &str = "RestoreEmail";
pub const PERMANENTLY_DELETE: &str = "PermanentlyDelete";

pub fn list_method(mailbox: MailboxName) -> &'static str {
    match mailbox {
        MailboxName::Inbox => "ListInbox",
        MailboxName::Sent => "ListSent",
        MailboxName::Trash => "ListTrash",
    }
}

pub fn method_path(method: &str) -> String {
    format!("/{SERVICE_NAME}/{method}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_service_scoped_paths() {
        assert_eq!(
            method_path(list_method(MailboxName::Trash)),
            "/com.emailclient.backend.grpc.EmailService/ListTrash"
        );
    }
}
