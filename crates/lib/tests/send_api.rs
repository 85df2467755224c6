//! Integration tests: run the Send API client against a local stand-in for the Graph API
//! that records every request and answers from a script.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use fbmessenger::api::{AttachmentStager, AttachmentType};
use fbmessenger::{
    Client, Message, PostbackButton, QuickReply, SendError, SendOptions, SenderAction,
};
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
struct Recorded {
    path: String,
    query: HashMap<String, String>,
    body: Value,
}

#[derive(Clone, Default)]
struct Platform {
    requests: Arc<Mutex<Vec<Recorded>>>,
    replies: Arc<Mutex<VecDeque<(StatusCode, String)>>>,
}

impl Platform {
    fn reply(&self, status: StatusCode, body: &str) {
        self.replies
            .lock()
            .unwrap()
            .push_back((status, body.to_string()));
    }

    fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }
}

async fn record(
    State(platform): State<Platform>,
    Path(path): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    Json(body): Json<Value>,
) -> (StatusCode, String) {
    platform.requests.lock().unwrap().push(Recorded {
        path: format!("/{}", path),
        query,
        body,
    });
    platform
        .replies
        .lock()
        .unwrap()
        .pop_front()
        .unwrap_or((StatusCode::OK, r#"{"recipient_id":"U1","message_id":"mid.1"}"#.to_string()))
}

async fn start_platform() -> (Platform, String) {
    let platform = Platform::default();
    let app = Router::new()
        .route("/*path", post(record))
        .with_state(platform.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind platform");
    let addr = listener.local_addr().expect("local_addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (platform, format!("http://{}/v10.0", addr))
}

async fn client() -> (Platform, Client) {
    let (platform, base) = start_platform().await;
    (platform, Client::new("secret-token", Some(base)).unwrap())
}

fn temp_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("fbmessenger-{}-{}", tag, uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

#[tokio::test]
async fn text_message_wire_shape() {
    let (platform, client) = client().await;
    let ok = client
        .send_message("U1", "hello", SendOptions::default())
        .await
        .unwrap();
    assert!(ok);

    let reqs = platform.requests();
    assert_eq!(reqs.len(), 1);
    assert_eq!(reqs[0].path, "/v10.0/me/messages");
    assert_eq!(reqs[0].query.get("access_token").map(String::as_str), Some("secret-token"));
    assert_eq!(
        reqs[0].body,
        json!({
            "messaging_type": "MESSAGE_TAG",
            "recipient": {"id": "U1"},
            "message": {"text": "hello"}
        })
    );
}

#[tokio::test]
async fn reply_uses_response_type_and_sender() {
    let (platform, client) = client().await;
    let incoming = Message::new("U7", "P1", Some("hi".to_string()), None);
    client
        .send_reply(&incoming, "hi back", SendOptions::default())
        .await
        .unwrap();
    let body = &platform.requests()[0].body;
    assert_eq!(body["messaging_type"], "RESPONSE");
    assert_eq!(body["recipient"]["id"], "U7");
}

#[tokio::test]
async fn success_without_message_id_is_false() {
    let (platform, client) = client().await;
    platform.reply(StatusCode::OK, r#"{"recipient_id":"U1"}"#);
    let ok = client
        .send_message("U1", "hello", SendOptions::default())
        .await
        .unwrap();
    assert!(!ok);
}

#[tokio::test]
async fn platform_error_is_exposed() {
    let (platform, client) = client().await;
    platform.reply(
        StatusCode::BAD_REQUEST,
        r#"{"error":{"message":"m","type":"t","code":1,"fbtrace_id":"f"}}"#,
    );
    let err = client
        .send_message("U1", "hello", SendOptions::default())
        .await
        .unwrap_err();
    match err {
        SendError::Platform(e) => {
            assert_eq!(e.message, "m");
            assert_eq!(e.error_type, "t");
            assert_eq!(e.code, 1);
            assert_eq!(e.subcode, None);
            assert_eq!(e.fbtrace_id.as_deref(), Some("f"));
        }
        other => panic!("expected platform error, got {:?}", other),
    }
}

#[tokio::test]
async fn error_status_without_error_object_is_protocol_violation() {
    let (platform, client) = client().await;
    platform.reply(StatusCode::INTERNAL_SERVER_ERROR, r#"{"oops":true}"#);
    let err = client
        .send_message("U1", "hello", SendOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, SendError::Protocol(_)), "{:?}", err);
}

#[tokio::test]
async fn quick_replies_on_the_wire() {
    let (platform, client) = client().await;
    let opts = SendOptions::reply().quick_replies(vec![
        QuickReply::new("A", "a"),
        QuickReply::new("B", "b").with_image_url("https://img/b.png"),
    ]);
    client.send_message("U1", "pick", opts).await.unwrap();
    let msg = &platform.requests()[0].body["message"];
    assert_eq!(msg["text"], "pick");
    assert_eq!(
        msg["quick_replies"],
        json!([
            {"content_type": "text", "title": "A", "payload": "a"},
            {"content_type": "text", "title": "B", "payload": "b", "image_url": "https://img/b.png"}
        ])
    );
}

#[tokio::test]
async fn buttons_become_template_without_message_text() {
    let (platform, client) = client().await;
    let opts = SendOptions::reply().buttons(vec![
        PostbackButton::new("Of course!", "yes"),
        PostbackButton::new("I found this bug...", "bug"),
    ]);
    client
        .send_message("U1", "Do you like this library?", opts)
        .await
        .unwrap();
    let msg = &platform.requests()[0].body["message"];
    assert!(msg.get("text").is_none());
    assert_eq!(
        msg["attachment"],
        json!({
            "type": "template",
            "payload": {
                "template_type": "button",
                "text": "Do you like this library?",
                "buttons": [
                    {"type": "postback", "payload": "yes", "title": "Of course!"},
                    {"type": "postback", "payload": "bug", "title": "I found this bug..."}
                ]
            }
        })
    );
}

#[tokio::test]
async fn invalid_calls_make_no_requests() {
    let (platform, client) = client().await;
    let four: Vec<_> = (0..4).map(|i| PostbackButton::new(format!("{}", i), "p")).collect();
    let cases = vec![
        ("hi".to_string(), SendOptions::default().buttons(four)),
        (
            "hi".to_string(),
            SendOptions::default()
                .buttons(vec![PostbackButton::new("a", "a")])
                .quick_replies(vec![QuickReply::new("b", "b")]),
        ),
        (
            "x".repeat(641),
            SendOptions::default()
                .buttons(vec![PostbackButton::new("a", "a")])
                .images(vec![PathBuf::from("/tmp/never-sent.png")]),
        ),
    ];
    for (text, opts) in cases {
        let err = client.send_message("U1", &text, opts).await.unwrap_err();
        assert!(matches!(err, SendError::InvalidArgument(_)));
    }
    assert!(platform.requests().is_empty());
}

#[tokio::test]
async fn images_are_sent_first_in_order() {
    let (platform, base) = start_platform().await;
    let src = temp_dir("img-src");
    let public = temp_dir("img-public");
    let a = src.join("a.png");
    let b = src.join("b.png");
    std::fs::write(&a, b"a").unwrap();
    std::fs::write(&b, b"b").unwrap();
    let client = Client::new("secret-token", Some(base))
        .unwrap()
        .with_attachment_staging(AttachmentStager::new(
            Some(public.clone()),
            Some("https://files.example.com/".to_string()),
        ));

    let ok = client
        .send_message("U1", "look", SendOptions::reply().images(vec![a, b]))
        .await
        .unwrap();
    assert!(ok);

    let reqs = platform.requests();
    assert_eq!(reqs.len(), 3);
    for (req, name) in reqs.iter().zip(["a.png", "b.png"]) {
        assert_eq!(req.body["messaging_type"], "RESPONSE");
        assert!(req.body["message"].get("text").is_none());
        assert_eq!(
            req.body["message"]["attachment"],
            json!({
                "type": "image",
                "payload": {"url": format!("https://files.example.com/{}", name), "is_reusable": true}
            })
        );
    }
    assert_eq!(reqs[2].body["message"], json!({"text": "look"}));
    assert!(public.join("a.png").exists());
    assert!(public.join("b.png").exists());
}

#[tokio::test]
async fn failed_image_stops_the_send() {
    let (platform, base) = start_platform().await;
    let src = temp_dir("img-fail");
    let a = src.join("a.png");
    let b = src.join("b.png");
    std::fs::write(&a, b"a").unwrap();
    std::fs::write(&b, b"b").unwrap();
    let client = Client::new("secret-token", Some(base))
        .unwrap()
        .with_attachment_staging(AttachmentStager::new(
            None,
            Some("https://files.example.com/".to_string()),
        ));
    platform.reply(StatusCode::OK, r#"{"message_id":"mid.1"}"#);
    platform.reply(
        StatusCode::BAD_REQUEST,
        r#"{"error":{"message":"bad url","type":"OAuthException","code":100,"error_subcode":2018008,"fbtrace_id":"x"}}"#,
    );

    let err = client
        .send_message("U1", "look", SendOptions::default().images(vec![a, b]))
        .await
        .unwrap_err();
    assert_eq!(err.platform_code(), Some(100));
    assert_eq!(platform.requests().len(), 2);
}

#[tokio::test]
async fn send_attachments_uses_message_tag_and_file_type() {
    let (platform, base) = start_platform().await;
    let src = temp_dir("files");
    let doc = src.join("report.pdf");
    std::fs::write(&doc, b"pdf").unwrap();
    let client = Client::new("secret-token", Some(base))
        .unwrap()
        .with_attachment_staging(AttachmentStager::new(
            None,
            Some("https://files.example.com/".to_string()),
        ));

    let ok = client
        .send_attachments("U1", &[doc], AttachmentType::File)
        .await
        .unwrap();
    assert!(ok);
    let body = &platform.requests()[0].body;
    assert_eq!(body["messaging_type"], "MESSAGE_TAG");
    assert_eq!(body["message"]["attachment"]["type"], "file");
    assert_eq!(
        body["message"]["attachment"]["payload"]["url"],
        "https://files.example.com/report.pdf"
    );
}

#[tokio::test]
async fn attachments_without_public_url_fail_before_sending() {
    let (platform, client) = client().await;
    let err = client
        .send_attachments("U1", &[PathBuf::from("/tmp/x.png")], AttachmentType::Image)
        .await
        .unwrap_err();
    assert!(matches!(err, SendError::MissingPublicUrl));
    assert!(platform.requests().is_empty());
}

#[tokio::test]
async fn sender_action_wire_shape() {
    let (platform, client) = client().await;
    platform.reply(StatusCode::OK, r#"{"recipient_id":"U1"}"#);
    let ok = client.send_action("U1", SenderAction::TypingOn).await.unwrap();
    assert!(ok);
    assert_eq!(
        platform.requests()[0].body,
        json!({"recipient": {"id": "U1"}, "sender_action": "typing_on"})
    );
}

#[tokio::test]
async fn profile_settings_hit_profile_endpoint() {
    let (platform, client) = client().await;
    platform.reply(StatusCode::OK, r#"{"result":"success"}"#);
    platform.reply(StatusCode::OK, r#"{"result":"success"}"#);
    client.set_greeting_text("Welcome!").await.unwrap();
    client.set_get_started_payload("GET_STARTED").await.unwrap();

    let reqs = platform.requests();
    assert_eq!(reqs[0].path, "/v10.0/me/messenger_profile");
    assert_eq!(
        reqs[0].body,
        json!({"greeting": [{"locale": "default", "text": "Welcome!"}]})
    );
    assert_eq!(reqs[1].body, json!({"get_started": {"payload": "GET_STARTED"}}));
}
