//! Tests for the orchestrator and its agent registry.

mod common;

use ccore::{Response, Role, ToolCall, testing::Scripted};
use common::{config, context, context_with};
use conclave_runtime::{MissingAgent, ORCHESTRATOR_SUBJECT, Orchestrator, Participant};
use std::{collections::BTreeMap, time::Duration};
use tokio_util::sync::CancellationToken;

#[tokio::test]
async fn new_seeds_coordination_turn() {
    let dir = tempfile::tempdir().unwrap();
    let gateway = Scripted::persona();
    let orchestrator = Orchestrator::new(context(dir.path(), gateway.clone()))
        .await
        .unwrap();

    assert_eq!(gateway.calls(), 1);
    assert!(
        gateway.requests()[0].messages[0]
            .content
            .contains(&format!("You are an expert {ORCHESTRATOR_SUBJECT} assistant."))
    );

    let history = orchestrator.history();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].role, Role::User);
    assert!(history[0].content.starts_with("You are not supposed to answer"));
    assert!(orchestrator.is_empty());

    // the seed turn alone is not worth a transcript
    assert!(orchestrator.close().await.unwrap().is_empty());
}

#[tokio::test]
async fn orchestrator_exposes_routing_tools() {
    let dir = tempfile::tempdir().unwrap();
    let orchestrator = Orchestrator::new(context(dir.path(), Scripted::echo()))
        .await
        .unwrap();

    let toolbox = orchestrator.toolbox();
    let names: Vec<_> = toolbox.names().collect();
    assert_eq!(
        names,
        [
            "add_agent",
            "broadcast",
            "fetch_external_info",
            "save_content_to_file",
            "send_to_agent"
        ]
    );
}

#[tokio::test]
async fn add_agent_registers_once() {
    let dir = tempfile::tempdir().unwrap();
    let gateway = Scripted::persona();
    let mut orchestrator = Orchestrator::new(context(dir.path(), gateway.clone()))
        .await
        .unwrap();

    assert_eq!(
        orchestrator.add_agent("Chef", None).await.unwrap(),
        "Agent 'Chef' added."
    );
    assert_eq!(
        orchestrator.add_agent("chef", None).await.unwrap(),
        "Agent 'chef' already exists."
    );
    assert_eq!(orchestrator.len(), 1);
    assert_eq!(orchestrator.agents().collect::<Vec<_>>(), ["chef"]);
    // orchestrator prompt plus one chef prompt
    assert_eq!(gateway.calls(), 2);
}

#[tokio::test]
async fn add_agent_requires_subject() {
    let dir = tempfile::tempdir().unwrap();
    let mut orchestrator = Orchestrator::new(context(dir.path(), Scripted::echo()))
        .await
        .unwrap();

    assert_eq!(
        orchestrator.add_agent("  ", None).await.unwrap(),
        "No subject provided."
    );
    assert!(orchestrator.is_empty());
}

#[tokio::test]
async fn add_agent_uses_model_override() {
    let dir = tempfile::tempdir().unwrap();
    let mut orchestrator = Orchestrator::new(context(dir.path(), Scripted::echo()))
        .await
        .unwrap();

    orchestrator.add_agent("poet", Some("local")).await.unwrap();
    orchestrator.add_agent("judge", None).await.unwrap();

    let poet = orchestrator.get("poet").unwrap();
    assert_eq!(poet.lock().await.model(), "local");
    let judge = orchestrator.get("judge").unwrap();
    assert_eq!(judge.lock().await.model(), "o4-mini");
}

#[tokio::test]
async fn send_to_missing_agent_creates_it() {
    let dir = tempfile::tempdir().unwrap();
    let gateway = Scripted::persona();
    let mut orchestrator = Orchestrator::new(context(dir.path(), gateway))
        .await
        .unwrap();

    let answer = orchestrator
        .send_to_agent("mathematician", "What is 2+2?")
        .await
        .unwrap();
    assert!(answer.ends_with(" | What is 2+2?"));
    assert_eq!(orchestrator.len(), 1);

    let agent = orchestrator.get("Mathematician").unwrap();
    let agent = agent.lock().await;
    assert_eq!(agent.subject(), "mathematician");
    assert_eq!(agent.history().len(), 2);
    drop(agent);

    let last = orchestrator.history().last().unwrap();
    assert_eq!(last.role, Role::User);
    assert_eq!(last.content, format!("Agent 'mathematician' response: {answer}"));
}

#[tokio::test]
async fn send_to_missing_agent_can_be_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let gateway = Scripted::persona();
    let mut config = config(dir.path());
    config.missing_agent = MissingAgent::Reject;
    let mut orchestrator = Orchestrator::new(context_with(gateway.clone(), config))
        .await
        .unwrap();

    let answer = orchestrator.send_to_agent("chef", "Dinner?").await.unwrap();
    assert_eq!(answer, "No agent found for subject 'chef'.");
    assert!(orchestrator.is_empty());
    assert_eq!(orchestrator.history().len(), 1);
    assert_eq!(gateway.calls(), 1);
}

#[tokio::test]
async fn send_to_agent_requires_message() {
    let dir = tempfile::tempdir().unwrap();
    let mut orchestrator = Orchestrator::new(context(dir.path(), Scripted::echo()))
        .await
        .unwrap();

    let answer = orchestrator.send_to_agent("chef", "").await.unwrap();
    assert_eq!(answer, "No message provided.");
    assert!(orchestrator.is_empty());
}

#[tokio::test]
async fn send_to_agent_reuses_registered_agent() {
    let dir = tempfile::tempdir().unwrap();
    let mut orchestrator = Orchestrator::new(context(dir.path(), Scripted::persona()))
        .await
        .unwrap();

    orchestrator.send_to_agent("poet", "first").await.unwrap();
    orchestrator.send_to_agent("Poet", "second").await.unwrap();

    assert_eq!(orchestrator.len(), 1);
    let poet = orchestrator.get("poet").unwrap();
    assert_eq!(poet.lock().await.history().len(), 4);
}

#[tokio::test]
async fn broadcast_reaches_every_agent() {
    let dir = tempfile::tempdir().unwrap();
    let mut orchestrator = Orchestrator::new(context(dir.path(), Scripted::persona()))
        .await
        .unwrap();
    for subject in ["chef", "poet", "judge"] {
        orchestrator.add_agent(subject, None).await.unwrap();
    }

    let replies = orchestrator.broadcast("hello").await;
    assert_eq!(replies.len(), 3);

    for subject in ["chef", "poet", "judge"] {
        let agent = orchestrator.get(subject).unwrap();
        let agent = agent.lock().await;
        let system = &agent.system().unwrap().content;
        assert_eq!(replies[subject], format!("{system} | hello"));
        assert_eq!(agent.history().len(), 2);
    }

    // broadcast does not touch the orchestrator's own conversation
    assert_eq!(orchestrator.history().len(), 1);
}

#[tokio::test]
async fn broadcast_without_agents_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let orchestrator = Orchestrator::new(context(dir.path(), Scripted::echo()))
        .await
        .unwrap();
    assert!(orchestrator.broadcast("hello").await.is_empty());
}

#[tokio::test]
async fn broadcast_reports_agent_errors() {
    let dir = tempfile::tempdir().unwrap();
    let gateway = Scripted::new(|req| {
        if req.system().is_some_and(|s| s.contains("fragile")) {
            anyhow::bail!("model overloaded");
        }
        Ok(Response::text(req.last_user().unwrap_or_default().to_owned()))
    });
    let mut orchestrator = Orchestrator::new(context(dir.path(), gateway))
        .await
        .unwrap();
    orchestrator.add_agent("steady", None).await.unwrap();
    orchestrator.add_agent("fragile", None).await.unwrap();

    let replies = orchestrator.broadcast("ping").await;
    assert_eq!(replies["steady"], "ping");
    assert_eq!(replies["fragile"], "Error: model overloaded");
}

#[tokio::test]
async fn cancelled_broadcast_returns_without_replies() {
    let dir = tempfile::tempdir().unwrap();
    let mut orchestrator = Orchestrator::new(context(dir.path(), Scripted::persona()))
        .await
        .unwrap();
    orchestrator.add_agent("chef", None).await.unwrap();
    orchestrator.add_agent("poet", None).await.unwrap();

    let cancel = CancellationToken::new();
    cancel.cancel();
    let replies = orchestrator.broadcast_with("hello", cancel).await;
    assert!(replies.is_empty());

    let chef = orchestrator.get("chef").unwrap();
    assert!(chef.lock().await.history().is_empty());
}

#[tokio::test(start_paused = true)]
async fn broadcast_waits_for_the_slowest_agent_only() {
    let dir = tempfile::tempdir().unwrap();
    let delay = Duration::from_secs(10);
    let gateway = Scripted::persona().with_delay(delay);
    let mut orchestrator = Orchestrator::new(context(dir.path(), gateway))
        .await
        .unwrap();
    for subject in ["chef", "poet", "judge", "pilot"] {
        orchestrator.add_agent(subject, None).await.unwrap();
    }

    let started = tokio::time::Instant::now();
    let replies = orchestrator.broadcast("hello").await;
    assert_eq!(replies.len(), 4);
    assert!(replies.values().all(|reply| reply.ends_with(" | hello")));
    assert!(started.elapsed() < delay * 2);
}

#[tokio::test(start_paused = true)]
async fn cancellation_interrupts_slow_agents() {
    let dir = tempfile::tempdir().unwrap();
    let gateway = Scripted::persona().with_delay(Duration::from_secs(60));
    let mut orchestrator = Orchestrator::new(context(dir.path(), gateway))
        .await
        .unwrap();
    orchestrator.add_agent("chef", None).await.unwrap();
    orchestrator.add_agent("poet", None).await.unwrap();

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(1)).await;
        trigger.cancel();
    });

    let started = tokio::time::Instant::now();
    let replies = orchestrator.broadcast_with("hello", cancel).await;
    assert!(replies.is_empty());
    assert!(started.elapsed() < Duration::from_secs(60));
}

#[tokio::test]
async fn tool_call_routes_to_agent() {
    let dir = tempfile::tempdir().unwrap();
    let gateway = Scripted::persona();
    let mut orchestrator = Orchestrator::new(context(dir.path(), gateway.clone()))
        .await
        .unwrap();

    gateway.push(Response::tools(vec![ToolCall::new(
        "send_to_agent",
        r#"{"agent_subject": "poet", "message": "Write a haiku"}"#,
    )]));
    let answer = orchestrator.chat("I need a haiku", false).await.unwrap();

    assert!(answer.ends_with(" | Write a haiku"));
    assert_eq!(orchestrator.agents().collect::<Vec<_>>(), ["poet"]);

    let history = orchestrator.history();
    assert_eq!(history.len(), 4);
    assert_eq!(history[1].content, "I need a haiku");
    assert_eq!(
        history[2].content,
        format!("Agent 'poet' response: {answer}")
    );
    assert_eq!(history[3].role, Role::Assistant);
    assert_eq!(history[3].content, answer);
}

#[tokio::test]
async fn tool_call_adds_agent() {
    let dir = tempfile::tempdir().unwrap();
    let gateway = Scripted::persona();
    let mut orchestrator = Orchestrator::new(context(dir.path(), gateway.clone()))
        .await
        .unwrap();

    gateway.push(Response::tools(vec![
        ToolCall::new("add_agent", r#"{"subject": "Game Designer"}"#),
        ToolCall::new("add_agent", r#"{"subject": "game designer"}"#),
    ]));
    let answer = orchestrator.chat("Plan a game", false).await.unwrap();

    assert_eq!(
        answer,
        "Agent 'Game Designer' added.Agent 'game designer' already exists."
    );
    assert_eq!(orchestrator.agents().collect::<Vec<_>>(), ["game_designer"]);
}

#[tokio::test]
async fn broadcast_tool_renders_replies() {
    let dir = tempfile::tempdir().unwrap();
    let gateway = Scripted::echo();
    let mut orchestrator = Orchestrator::new(context(dir.path(), gateway.clone()))
        .await
        .unwrap();

    gateway.push(Response::tools(vec![ToolCall::new(
        "broadcast",
        r#"{"message": "status?"}"#,
    )]));
    let empty = orchestrator.chat("Anyone there?", false).await.unwrap();
    assert_eq!(empty, "No agents registered to broadcast to.");

    orchestrator.add_agent("chef", None).await.unwrap();
    orchestrator.add_agent("poet", None).await.unwrap();
    gateway.push(Response::tools(vec![ToolCall::new(
        "broadcast",
        r#"{"message": "status?"}"#,
    )]));
    let answer = orchestrator.chat("Status round", false).await.unwrap();

    let replies: BTreeMap<String, String> = serde_json::from_str(&answer).unwrap();
    assert_eq!(replies.len(), 2);
    assert_eq!(replies["chef"], "status?");
    assert_eq!(replies["poet"], "status?");
}

#[tokio::test]
async fn unknown_tool_is_reported_in_history() {
    let dir = tempfile::tempdir().unwrap();
    let gateway = Scripted::echo();
    let mut orchestrator = Orchestrator::new(context(dir.path(), gateway.clone()))
        .await
        .unwrap();

    gateway.push(Response::tools(vec![ToolCall::new("launch_rockets", "{}")]));
    let answer = orchestrator.chat("go", false).await.unwrap();
    assert_eq!(answer, "\n\nFunction `launch_rockets` not found or not callable.");
    assert_eq!(orchestrator.history().last().unwrap().content, answer);
}

#[tokio::test]
async fn close_saves_agents_and_orchestrator() {
    let dir = tempfile::tempdir().unwrap();
    let mut orchestrator = Orchestrator::new(context(dir.path(), Scripted::persona()))
        .await
        .unwrap();
    orchestrator.send_to_agent("chef", "Dinner?").await.unwrap();
    orchestrator.add_agent("idle", None).await.unwrap();

    let saved = orchestrator.close().await.unwrap();
    assert_eq!(saved.len(), 2);
    let names: Vec<_> = saved
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert!(names[0].starts_with("chef_"));
    assert!(names[1].starts_with("ai_agents_orchestrator_"));
    assert!(saved.iter().all(|p| p.exists()));
}
