use crate::api::models::{Attachment, EmailDetail, OutgoingEmail, Timestamp};
use crate::error::{AppError, AppResult};

use super::html::html_to_text;

pub const NO_SUBJECT: &str = "(no subject)";
const REPLY_PREFIX: &str = "Re:";
const FORWARD_PREFIX: &str = "Fwd:";

/// Initial values for the compose surface.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComposeDraft {
    pub to: Option<String>,
    pub subject: String,
    pub body: String,
    pub cc: Vec<String>,
    pub bcc: Vec<String>,
}

impl ComposeDraft {
    /// Fills cc and bcc from comma-separated address fields as typed.
    pub fn with_copies(mut self, cc: &str, bcc: &str) -> Self {
        self.cc = split_addresses(cc);
        self.bcc = split_addresses(bcc);
        self
    }

    pub fn into_outgoing(self, attachments: Vec<Attachment>) -> AppResult<OutgoingEmail> {
        let to = self
            .to
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .ok_or_else(|| AppError::InvalidInput("a recipient is required".to_string()))?;

        Ok(OutgoingEmail {
            to,
            subject: self.subject,
            body: self.body,
            cc: self.cc,
            bcc: self.bcc,
            attachments,
        })
    }
}

/// Splits a comma-separated address field, dropping empty entries.
pub fn split_addresses(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

pub fn reply_subject(subject: &str) -> String {
    prefixed_subject(subject, REPLY_PREFIX)
}

pub fn forward_subject(subject: &str) -> String {
    prefixed_subject(subject, FORWARD_PREFIX)
}

fn prefixed_subject(subject: &str, prefix: &str) -> String {
    let already = subject
        .get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix));
    if already {
        return subject.to_string();
    }

    let base = if subject.is_empty() { NO_SUBJECT } else { subject };
    format!("{prefix} {base}")
}

/// The address inside `<...>` when present, otherwise the whole field.
pub fn reply_recipient(from: &str) -> String {
    let mut rest = from;
    while let Some(open) = rest.find('<') {
        let after = &rest[open + 1..];
        let Some(close) = after.find('>') else {
            break;
        };
        if close > 0 {
            return after[..close].trim().to_string();
        }
        rest = &after[close + 1..];
    }
    from.trim().to_string()
}

pub fn quote(text: &str) -> String {
    text.split('\n')
        .map(|line| format!("> {}", line.strip_suffix('\r').unwrap_or(line)))
        .collect::<Vec<_>>()
        .join("\n")
}

/// e.g. `Tue, Nov 14, 2023, 10:13 PM`, always in UTC.
pub fn format_quote_date(timestamp: Option<Timestamp>) -> String {
    timestamp
        .and_then(Timestamp::to_datetime)
        .map(|date| date.format("%a, %b %-d, %Y, %-I:%M %p").to_string())
        .unwrap_or_default()
}

pub fn plain_body(email: &EmailDetail) -> String {
    if email.is_html() {
        html_to_text(&email.body)
    } else {
        email.body.clone()
    }
}

pub fn build_reply(email: &EmailDetail) -> ComposeDraft {
    let date = format_quote_date(email.received_at);
    let quoted = quote(&plain_body(email));

    ComposeDraft {
        to: Some(reply_recipient(&email.from)),
        subject: reply_subject(&email.subject),
        body: format!("\n\nOn {date}, {} wrote:\n{quoted}", email.from),
        ..ComposeDraft::default()
    }
}

pub fn build_forward(email: &EmailDetail) -> ComposeDraft {
    let subject = if email.subject.is_empty() {
        NO_SUBJECT
    } else {
        email.subject.as_str()
    };

    let mut headers = vec![
        "--- Forwarded message ---".to_string(),
        format!("From: {}", email.from),
        format!("Date: {}", format_quote_date(email.received_at)),
        format!("Subject: {subject}"),
    ];
    if !email.to.is_empty() {
        headers.push(format!("To: {}", email.to.join(", ")));
    }
    if !email.cc.is_empty() {
        headers.push(format!("Cc: {}", email.cc.join(", ")));
    }

    ComposeDraft {
        to: None,
        subject: forward_subject(&email.subject),
        body: format!("\n\n{}\n\n{}", headers.join("\n"), plain_body(email)),
        ..ComposeDraft::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reply_subject_is_idempotent() {
        for subject in ["", "Hello", "re: hi", "RE:x", "Re: Re: y", " re: spaced", "Fwd: z"] {
            let once = reply_subject(subject);
            assert_eq!(reply_subject(&once), once, "subject {subject:?}");
        }
    }

    #[test]
    fn existing_prefix_passes_through_unchanged() {
        assert_eq!(reply_subject("RE: Budget"), "RE: Budget");
        assert_eq!(forward_subject("fwd: Budget"), "fwd: Budget");
        assert_eq!(reply_subject("Budget"), "Re: Budget");
        assert_eq!(reply_subject(""), "Re: (no subject)");
    }

    #[test]
    fn recipient_prefers_bracketed_address() {
        assert_eq!(reply_recipient("Ann Lee <ann@example.com>"), "ann@example.com");
        assert_eq!(reply_recipient("  bob@example.com "), "bob@example.com");
        assert_eq!(reply_recipient("odd <> pair <c@example.com>"), "c@example.com");
        assert_eq!(reply_recipient("broken <d@example.com"), "broken <d@example.com");
    }

    #[test]
    fn quote_prefixes_every_line() {
        assert_eq!(quote("a\r\nb\n\nc"), "> a\n> b\n> \n> c");
    }

    #[test]
    fn quote_date_is_deterministic_utc() {
        let ts = Timestamp {
            seconds: 1_700_000_000,
            nanos: 0,
        };
        assert_eq!(format_quote_date(Some(ts)), "Tue, Nov 14, 2023, 10:13 PM");
        assert_eq!(format_quote_date(None), "");
    }

    #[test]
    fn split_addresses_trims_and_drops_blanks() {
        assert_eq!(split_addresses(" a@x.com, ,b@y.com "), ["a@x.com", "b@y.com"]);
        assert!(split_addresses("").is_empty());
    }

    #[test]
    fn typed_copy_fields_reach_the_outgoing_email() {
        let draft = ComposeDraft {
            to: Some(" bob@example.com ".to_string()),
            subject: "Hi".to_string(),
            ..ComposeDraft::default()
        }
        .with_copies("carol@example.com, , dan@example.com", "  ");

        let outgoing = draft.into_outgoing(vec![]).expect("outgoing");
        assert_eq!(outgoing.to, "bob@example.com");
        assert_eq!(outgoing.cc, ["carol@example.com", "dan@example.com"]);
        assert!(outgoing.bcc.is_empty());
    }

    #[test]
    fn draft_without_recipient_cannot_be_sent() {
        let draft = ComposeDraft {
            to: Some("  ".to_string()),
            ..ComposeDraft::default()
        };
        assert!(matches!(
            draft.into_outgoing(vec![]),
            Err(AppError::InvalidInput(_))
        ));
    }
}
