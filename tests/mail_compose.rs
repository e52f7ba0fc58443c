use mailbox_sync::api::models::{EmailDetail, Timestamp};
use mailbox_sync::mail::{build_forward, build_reply, html_to_text};

fn email(body: &str) -> EmailDetail {
    EmailDetail {
        id: "e1".to_string(),
        from: "Ann <ann@example.com>".to_string(),
        to: vec!["me@example.com".to_string(), "team@example.com".to_string()],
        cc: vec![],
        subject: "Plans".to_string(),
        body: body.to_string(),
        unread: false,
        received_at: Some(Timestamp {
            seconds: 1_700_000_000,
            nanos: 0,
        }),
    }
}

#[test]
fn reply_quotes_flattened_html_under_an_attribution_line() {
    let draft = build_reply(&email("<p>Hi</p><br>Bye"));

    assert_eq!(draft.to.as_deref(), Some("ann@example.com"));
    assert_eq!(draft.subject, "Re: Plans");
    assert_eq!(
        draft.body,
        "\n\nOn Tue, Nov 14, 2023, 10:13 PM, Ann <ann@example.com> wrote:\n> Hi\n> \n> Bye"
    );
}

#[test]
fn reply_keeps_plain_bodies_verbatim() {
    let draft = build_reply(&email("a < b\nsecond"));
    assert!(draft.body.ends_with("wrote:\n> a < b\n> second"));
}

#[test]
fn forward_lists_headers_and_omits_empty_cc() {
    let draft = build_forward(&email("<div>Agenda</div><div>Lunch &amp; talks</div>"));

    assert_eq!(draft.to, None);
    assert_eq!(draft.subject, "Fwd: Plans");
    assert_eq!(
        draft.body,
        "\n\n--- Forwarded message ---\n\
         From: Ann <ann@example.com>\n\
         Date: Tue, Nov 14, 2023, 10:13 PM\n\
         Subject: Plans\n\
         To: me@example.com, team@example.com\n\n\
         Agenda\nLunch & talks"
    );
}

#[test]
fn forward_includes_cc_and_fills_missing_subject() {
    let mut original = email("hello");
    original.subject = String::new();
    original.to.clear();
    original.cc = vec!["boss@example.com".to_string()];

    let draft = build_forward(&original);

    assert_eq!(draft.subject, "Fwd: (no subject)");
    assert!(draft.body.contains("Subject: (no subject)\nCc: boss@example.com\n\nhello"));
    assert!(!draft.body.contains("To:"));
}

#[test]
fn html_flattening_collapses_blank_runs() {
    assert_eq!(
        html_to_text("<h1>Title</h1><p>One</p><p></p><p>Two<br/>Three</p>"),
        "Title\nOne\n\nTwo\nThree"
    );
}
