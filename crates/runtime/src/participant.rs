//! The conversation loop shared by agents and the orchestrator.

use crate::{Agent, Toolbox};
use anyhow::Result;
use ccore::{Gateway, Message};
use std::sync::Arc;

/// Instruction appended once per brainstorm round in complex mode.
pub(crate) fn brainstorm_prompt(prompt: &str) -> String {
    format!("Make 10 unique suggestions for the following prompt: '{prompt}'")
}

/// Instruction that closes a brainstorm.
pub(crate) const SYNTHESIS_PROMPT: &str = "Get the best ideas from all suggestions based on coolness, quality, and odds of success, and merge them in a final idea. Elaborate the idea and write it without any explanation.";

/// A conversational participant: a conversation plus the tools it exposes.
///
/// [`Agent`] is the base participant. [`Orchestrator`](crate::Orchestrator)
/// wraps an agent and brings a larger toolbox; tool calls made during its
/// turns resolve against that toolbox.
pub trait Participant: Send + Sync + Sized + 'static {
    /// The model gateway driving this participant.
    type Gateway: Gateway;

    /// The underlying conversation.
    fn agent(&self) -> &Agent<Self::Gateway>;

    /// The underlying conversation, mutably.
    fn agent_mut(&mut self) -> &mut Agent<Self::Gateway>;

    /// The tools this participant exposes to the model.
    fn toolbox(&self) -> Arc<Toolbox<Self>>;
}

/// One gateway round trip with history and tools.
///
/// Text content starts the answer; each requested tool call is dispatched
/// in order and its text appended. A non-empty answer is recorded as one
/// assistant turn.
pub(crate) async fn send<P: Participant>(participant: &mut P, model: Option<&str>) -> Result<String> {
    let toolbox = participant.toolbox();
    let request = participant.agent().request(model, toolbox.tools());
    tracing::info!("{} thinking...", participant.agent().subject());
    let response = participant.agent().context().complete(&request).await?;

    let mut answer = response.content.unwrap_or_default();
    for call in &response.tool_calls {
        let output = toolbox.dispatch(participant, call).await;
        answer.push_str(&output);
    }

    if !answer.is_empty() {
        participant
            .agent_mut()
            .history
            .push(Message::assistant(answer.clone()));
    }
    Ok(answer)
}

/// Append `prompt` and answer it.
///
/// Complex mode brainstorms first: each round asks for ten suggestions,
/// then a final synthesis merges them into one elaborated idea.
pub(crate) async fn chat<P: Participant>(
    participant: &mut P,
    prompt: &str,
    complex: bool,
) -> Result<String> {
    let config = participant.agent().context().config.clone();

    if complex {
        for round in 0..config.brainstorm_rounds {
            participant
                .agent_mut()
                .add_user_message(&brainstorm_prompt(prompt), false)
                .await?;
            let ideas = send(participant, None).await?;
            tracing::debug!("brainstorm round {}: {} chars", round + 1, ideas.len());
        }

        participant
            .agent_mut()
            .add_user_message(SYNTHESIS_PROMPT, false)
            .await?;
        return send(participant, Some(config.answer_model.as_str())).await;
    }

    participant.agent_mut().add_user_message(prompt, false).await?;
    send(participant, Some(config.answer_model.as_str())).await
}
