mod common;

use std::sync::atomic::Ordering;
use std::time::Duration;

use serde_json::json;

use lr_domain::identity::IdentityKey;
use lr_gateway::runtime::Outcome;

use common::*;

/// Recorder writes run on spawned tasks.
async fn settle() {
    tokio::time::sleep(Duration::from_millis(20)).await;
}

#[tokio::test]
async fn first_message_is_primed_second_is_not() {
    let h = Harness::new();

    h.dispatcher
        .dispatch(&[text_event("t1", "U1", "@#what is 2+2")])
        .await;
    h.dispatcher
        .dispatch(&[text_event("t2", "U1", "@#and 3+3")])
        .await;

    let sent = h.conversation.sent();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].1, format!("{PREAMBLE}what is 2+2"));
    assert_eq!(sent[1].1, "and 3+3");
    assert_eq!(sent[0].0, sent[1].0, "both turns use the same session");

    assert_eq!(h.sessions.len(), 1);
    assert_eq!(h.conversation.started.load(Ordering::SeqCst), 1);

    let replies = h.line.replies();
    assert_eq!(replies[0], ("t1".into(), format!("answer to: {PREAMBLE}what is 2+2")));
    assert_eq!(replies[1], ("t2".into(), "answer to: and 3+3".into()));
}

#[tokio::test]
async fn unprefixed_text_is_ignored() {
    let h = Harness::new();

    let outcomes = h.dispatcher.dispatch(&[text_event("t1", "U1", "hello")]).await;

    assert_eq!(outcomes, vec![Outcome::Ignored]);
    assert!(h.line.replies().is_empty());
    assert!(h.conversation.sent().is_empty());
    assert!(h.sessions.is_empty());
}

#[tokio::test]
async fn reset_without_prior_session_replies_primed_greeting() {
    let h = Harness::new();

    h.dispatcher.dispatch(&[text_event("t1", "U1", "@#RESET")]).await;

    assert_eq!(h.line.reply_texts(), vec![format!("{PREAMBLE}{GREETING}")]);
    assert_eq!(h.sessions.len(), 1);
    assert!(h.conversation.sent().is_empty());
}

#[tokio::test]
async fn reset_replaces_existing_session() {
    let h = Harness::new();
    let who = IdentityKey::user("U1");

    h.dispatcher
        .dispatch(&[text_event("t1", "U1", "@#hello")])
        .await;
    let before = h.sessions.get(&who).unwrap().session_id().to_owned();

    h.dispatcher.dispatch(&[text_event("t2", "U1", "@#reset")]).await;
    let after = h.sessions.get(&who).unwrap().session_id().to_owned();

    assert_ne!(before, after);
    assert_eq!(h.sessions.len(), 1);
    assert_eq!(h.line.reply_texts()[1], GREETING);

    // The fresh session already exists, so the next message is not primed.
    h.dispatcher.dispatch(&[text_event("t3", "U1", "@#again")]).await;
    let sent = h.conversation.sent();
    assert_eq!(sent.last().unwrap(), &(after, "again".to_owned()));
}

#[tokio::test]
async fn sticker_reply_leaves_sessions_untouched() {
    let h = Harness::new();

    h.dispatcher.dispatch(&[sticker_event("t1", "U1")]).await;

    let texts = h.line.reply_texts();
    assert_eq!(texts.len(), 1);
    assert!(texts[0].contains("52002734"));
    assert!(texts[0].contains("11537"));
    assert!(texts[0].contains("cony,wave"));
    assert!(h.sessions.is_empty());
    assert!(h.conversation.sent().is_empty());
}

#[tokio::test]
async fn image_is_described() {
    let h = Harness::new();

    h.dispatcher.dispatch(&[image_event("t1", "U1")]).await;

    assert_eq!(h.line.reply_texts(), vec!["an image of 4 bytes".to_owned()]);
    assert_eq!(h.images.seen.lock().len(), 1);
    assert!(h.sessions.is_empty());
}

#[tokio::test]
async fn image_fetch_failure_replies_and_batch_continues() {
    let h = Harness::with(
        FakeConversation::default(),
        FakeImages::default(),
        FakeLine {
            fail_fetch: true,
            ..FakeLine::default()
        },
    );

    let outcomes = h
        .dispatcher
        .dispatch(&[image_event("t1", "U1"), text_event("t2", "U1", "@#still there?")])
        .await;

    assert_eq!(outcomes.len(), 2);
    let texts = h.line.reply_texts();
    assert_eq!(texts.len(), 2);
    assert!(texts[0].starts_with("Sorry, I couldn't recognize this image"));
    assert!(texts[0].contains("not found"));
    assert_eq!(texts[1], format!("answer to: {PREAMBLE}still there?"));
    assert!(h.images.seen.lock().is_empty());
}

#[tokio::test]
async fn image_description_failure_replies_with_error() {
    let h = Harness::with(
        FakeConversation::default(),
        FakeImages {
            fail: true,
            ..FakeImages::default()
        },
        FakeLine::default(),
    );

    h.dispatcher.dispatch(&[image_event("t1", "U1")]).await;

    let texts = h.line.reply_texts();
    assert!(texts[0].starts_with("Sorry, I couldn't recognize this image"));
    assert!(texts[0].contains("blocked"));
}

#[tokio::test]
async fn conversation_failure_gives_fallback_reply() {
    let h = Harness::with(
        FakeConversation::failing(),
        FakeImages::default(),
        FakeLine::default(),
    );

    let outcomes = h.dispatcher.dispatch(&[text_event("t1", "U1", "@#hi")]).await;

    let texts = h.line.reply_texts();
    assert_eq!(texts.len(), 1);
    assert!(texts[0].contains("quota exhausted"));
    assert!(matches!(&outcomes[0], Outcome::Replied { delivered: true, .. }));
    // The session was still created.
    assert_eq!(h.sessions.len(), 1);
}

#[tokio::test]
async fn reply_failure_does_not_stop_batch() {
    let h = Harness::with(
        FakeConversation::default(),
        FakeImages::default(),
        FakeLine {
            fail_replies: true,
            ..FakeLine::default()
        },
    );

    let outcomes = h
        .dispatcher
        .dispatch(&[
            text_event("t1", "U1", "@#one"),
            text_event("t2", "U2", "@#two"),
        ])
        .await;

    assert_eq!(outcomes.len(), 2);
    assert!(outcomes
        .iter()
        .all(|o| matches!(o, Outcome::Replied { delivered: false, .. })));
    assert_eq!(h.conversation.sent().len(), 2);
}

#[tokio::test]
async fn log_only_events_produce_no_reply() {
    let h = Harness::new();

    let outcomes = h
        .dispatcher
        .dispatch(&[
            json!({ "type": "follow", "replyToken": "t1", "source": user_source("U1") }),
            json!({
                "type": "postback", "replyToken": "t2", "source": user_source("U1"),
                "postback": { "data": "a=1" }
            }),
            json!({
                "type": "beacon", "replyToken": "t3", "source": user_source("U1"),
                "beacon": { "hwid": "abc", "type": "enter" }
            }),
            json!({
                "type": "message", "replyToken": "t4", "source": user_source("U1"),
                "message": { "type": "video", "id": "v1" }
            }),
            json!({ "type": "unfollow", "source": user_source("U1") }),
            json!({ "garbage": true }),
        ])
        .await;

    assert_eq!(outcomes, vec![Outcome::Logged; 6]);
    assert!(h.line.replies().is_empty());
    assert!(h.sessions.is_empty());
}

#[tokio::test]
async fn text_without_identity_is_skipped() {
    let h = Harness::new();

    let outcomes = h
        .dispatcher
        .dispatch(&[json!({
            "type": "message",
            "replyToken": "t1",
            "message": { "type": "text", "id": "m", "text": "@#hi" }
        })])
        .await;

    assert!(matches!(outcomes[0], Outcome::Skipped { .. }));
    assert!(h.sessions.is_empty());
    assert!(h.line.replies().is_empty());
}

#[tokio::test]
async fn group_and_user_identities_are_separate() {
    let h = Harness::new();

    h.dispatcher
        .dispatch(&[
            text_event("t1", "U1", "@#from user"),
            json!({
                "type": "message", "replyToken": "t2",
                "source": { "type": "group", "groupId": "G1" },
                "message": { "type": "text", "id": "m", "text": "@#from group" }
            }),
        ])
        .await;

    assert_eq!(h.sessions.len(), 2);
    let sent = h.conversation.sent();
    assert_ne!(sent[0].0, sent[1].0);
    assert!(sent.iter().all(|(_, text)| text.starts_with(PREAMBLE)));
}

#[tokio::test]
async fn same_identity_is_serialized_across_batches() {
    let h = Harness::with(
        FakeConversation::slow(Duration::from_millis(30)),
        FakeImages::default(),
        FakeLine::default(),
    );

    let mut tasks = Vec::new();
    for i in 0..4 {
        let dispatcher = h.dispatcher.clone();
        tasks.push(tokio::spawn(async move {
            dispatcher
                .dispatch(&[text_event(&format!("t{i}"), "U1", &format!("@#msg {i}"))])
                .await
        }));
    }
    for t in tasks {
        t.await.unwrap();
    }

    assert_eq!(h.conversation.max_in_flight.load(Ordering::SeqCst), 1);
    assert_eq!(h.conversation.started.load(Ordering::SeqCst), 1);

    // Exactly one of the four messages was the first turn.
    let primed = h
        .conversation
        .sent()
        .iter()
        .filter(|(_, text)| text.starts_with(PREAMBLE))
        .count();
    assert_eq!(primed, 1);
}

#[tokio::test]
async fn different_identities_run_concurrently() {
    let h = Harness::with(
        FakeConversation::slow(Duration::from_millis(50)),
        FakeImages::default(),
        FakeLine::default(),
    );

    let a = {
        let d = h.dispatcher.clone();
        tokio::spawn(async move { d.dispatch(&[text_event("t1", "U1", "@#a")]).await })
    };
    let b = {
        let d = h.dispatcher.clone();
        tokio::spawn(async move { d.dispatch(&[text_event("t2", "U2", "@#b")]).await })
    };
    a.await.unwrap();
    b.await.unwrap();

    assert_eq!(h.conversation.max_in_flight.load(Ordering::SeqCst), 2);
    assert_eq!(h.sessions.len(), 2);
}

#[tokio::test]
async fn delivered_messages_are_recorded() {
    let h = Harness::new();

    h.dispatcher.dispatch(&[text_event("t1", "U1", "@#hello")]).await;
    settle().await;

    let lines = h.recorder.lines.lock().clone();
    assert!(lines.contains(&("U1".into(), "user".into(), "hello".into())));
    assert!(lines.contains(&(
        "U1".into(),
        "bot".into(),
        format!("answer to: {PREAMBLE}hello")
    )));
}

#[tokio::test]
async fn outcomes_match_batch_order() {
    let h = Harness::new();

    let outcomes = h
        .dispatcher
        .dispatch(&[
            text_event("t1", "U1", "plain"),
            sticker_event("t2", "U1"),
            json!({ "type": "follow", "replyToken": "t3", "source": user_source("U1") }),
        ])
        .await;

    assert_eq!(outcomes[0], Outcome::Ignored);
    assert!(matches!(outcomes[1], Outcome::Replied { .. }));
    assert_eq!(outcomes[2], Outcome::Logged);
}
