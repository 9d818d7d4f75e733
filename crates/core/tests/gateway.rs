//! Tests for the scripted gateway.

use ccore::{Gateway, Message, Request, Response, ToolCall, testing::Scripted};

fn request(prompt: &str) -> Request {
    Request::new("test-model").with_messages(vec![Message::system("sys"), Message::user(prompt)])
}

#[tokio::test]
async fn queued_responses_come_first() {
    let gateway = Scripted::echo();
    gateway.push(Response::tools(vec![ToolCall::new("broadcast", "{}")]));

    let first = gateway.send(&request("hello")).await.unwrap();
    assert_eq!(first.tool_calls.len(), 1);
    assert!(first.content.is_none());

    let second = gateway.send(&request("hello")).await.unwrap();
    assert_eq!(second.content.as_deref(), Some("hello"));
    assert_eq!(gateway.calls(), 2);
}

#[tokio::test]
async fn persona_includes_system_prompt() {
    let gateway = Scripted::persona();
    let response = gateway.send(&request("what now")).await.unwrap();
    assert_eq!(response.content.as_deref(), Some("sys | what now"));
}

#[tokio::test]
async fn records_requests_in_order() {
    let gateway = Scripted::echo();
    gateway.send(&request("one")).await.unwrap();
    gateway.send(&request("two")).await.unwrap();

    let requests = gateway.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].last_user(), Some("one"));
    assert_eq!(requests[1].last_user(), Some("two"));
}
