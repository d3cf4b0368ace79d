//! Multi-turn conversations across the types and provider crates.
//!
//! Runs against a local wiremock server; no API key needed.

use qianwen_provider::{ChatSession, Qianwen, QianwenError, StreamSink};
use qianwen_types::{Message, Role};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

/// Replies with the last user message reversed, streamed one character per event.
struct EchoReversed;

impl Respond for EchoReversed {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let body: serde_json::Value =
            serde_json::from_slice(&request.body).unwrap_or(serde_json::Value::Null);
        let last = body["input"]["messages"]
            .as_array()
            .and_then(|m| m.last())
            .and_then(|m| m["content"].as_str())
            .unwrap_or_default();
        let mut sse = String::new();
        for ch in last.chars().rev() {
            sse.push_str(&format!(
                "data:{}\n\n",
                serde_json::json!({ "output": { "text": ch.to_string() } })
            ));
        }
        ResponseTemplate::new(200).set_body_raw(sse, "text/event-stream")
    }
}

#[derive(Default)]
struct Transcript {
    fragments: Vec<String>,
    result: Option<Result<String, QianwenError>>,
    loading_seen: Vec<bool>,
}

impl StreamSink for Transcript {
    fn on_fragment(&mut self, fragment: &str) {
        assert_eq!(self.loading_seen, vec![true], "fragment outside loading window");
        self.fragments.push(fragment.to_string());
    }

    fn on_loading(&mut self, loading: bool) {
        self.loading_seen.push(loading);
    }

    fn on_complete(&mut self, result: Result<String, QianwenError>) {
        assert!(self.result.is_none(), "completion delivered twice");
        self.result = Some(result);
    }
}

async fn echo_server() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/apps/calendar/completion"))
        .respond_with(EchoReversed)
        .mount(&server)
        .await;
    server
}

fn session(server: &MockServer) -> ChatSession {
    ChatSession::new(Qianwen::new("test-key", "calendar").base_url(server.uri()))
}

#[tokio::test]
async fn fragments_concatenate_to_completion() {
    let server = echo_server().await;
    let mut chat = session(&server);
    let mut transcript = Transcript::default();

    chat.send("abc", &mut transcript).await;

    assert_eq!(transcript.fragments, vec!["c", "b", "a"]);
    assert_eq!(transcript.loading_seen, vec![true, false]);
    let text = transcript.result.unwrap().unwrap();
    assert_eq!(text, transcript.fragments.concat());
}

#[tokio::test]
async fn system_prompt_survives_long_conversation() {
    let server = echo_server().await;
    let mut chat = session(&server)
        .with_history_capacity(5)
        .with_system_prompt("You manage a calendar.");

    for i in 0..10 {
        let mut transcript = Transcript::default();
        chat.send(format!("event {i}"), &mut transcript).await;
        assert!(transcript.result.unwrap().is_ok());
        assert!(chat.history().len() <= 5);
    }

    let history = chat.history().messages();
    assert_eq!(history[0], Message::system("You manage a calendar."));
    assert_eq!(history.last(), Some(&Message::assistant("9 tneve")));
    assert_eq!(
        history.iter().filter(|m| m.role() == Role::System).count(),
        1
    );
}

#[tokio::test]
async fn sessions_keep_separate_histories() {
    let server = echo_server().await;
    let mut alice = session(&server);
    let mut bob = session(&server);

    let mut t1 = Transcript::default();
    let mut t2 = Transcript::default();
    tokio::join!(alice.send("hello", &mut t1), bob.send("world", &mut t2));

    assert_eq!(t1.result.unwrap().unwrap(), "olleh");
    assert_eq!(t2.result.unwrap().unwrap(), "dlrow");
    assert_eq!(
        alice.history().messages(),
        &[Message::user("hello"), Message::assistant("olleh")]
    );
    assert_eq!(
        bob.history().messages(),
        &[Message::user("world"), Message::assistant("dlrow")]
    );
}

#[tokio::test]
async fn clear_history_resets_context() {
    let server = echo_server().await;
    let mut chat = session(&server);

    chat.send("first", &mut Transcript::default()).await;
    assert_eq!(chat.history().len(), 2);

    chat.clear_history();
    chat.send("hi", &mut Transcript::default()).await;

    let requests = server.received_requests().await.unwrap_or_default();
    let last: serde_json::Value = serde_json::from_slice(&requests.last().unwrap().body).unwrap();
    assert_eq!(
        last["input"]["messages"],
        serde_json::json!([{ "role": "user", "content": "hi" }])
    );
}
