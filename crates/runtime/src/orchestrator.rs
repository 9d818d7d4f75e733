//! The orchestrator: an agent that routes work to other agents.

use crate::{
    Agent, Context, MissingAgent, Participant, Toolbox, builtin, participant, transcript::safe_name,
};
use anyhow::Result;
use ccore::{Gateway, Message};
use std::{collections::BTreeMap, path::PathBuf, sync::Arc};
use tokio::{sync::Mutex, task::JoinSet};
use tokio_util::sync::CancellationToken;

/// Subject of the orchestrating agent.
pub const ORCHESTRATOR_SUBJECT: &str = "AI Agents Orchestrator";

/// First turn of every orchestrator conversation.
const COORDINATION_PROMPT: &str = "You are not supposed to answer the questions directly, you have to pass on to multiple specialized agents. Your role is to orchestrate the agents and manage their interactions and make sure to have agents from different areas so the project has all the necessary information. Make sure to tell the agents to save the files of the project like scripts, documentation and configs and search the internet when needed by using tools.";

/// A registered agent, shared with broadcast workers.
type Handle<G> = Arc<Mutex<Agent<G>>>;

/// An agent that owns a registry of other agents.
///
/// Besides the base tools the model can call `add_agent`,
/// `send_to_agent` and `broadcast`. Registry keys are normalized
/// subjects, so every subject maps to exactly one agent.
pub struct Orchestrator<G: Gateway> {
    agent: Agent<G>,
    registry: BTreeMap<String, Handle<G>>,
    tools: Arc<Toolbox<Orchestrator<G>>>,
}

impl<G: Gateway> Orchestrator<G> {
    /// Create the orchestrator and load its persona.
    pub async fn new(ctx: Context<G>) -> Result<Self> {
        let mut agent = Agent::new(ctx);
        agent.set_subject(ORCHESTRATOR_SUBJECT, None, None).await?;
        agent.history.push(Message::user(COORDINATION_PROMPT));
        agent.start_offset = agent.history.len();

        Ok(Self {
            agent,
            registry: BTreeMap::new(),
            tools: Arc::new(toolbox()),
        })
    }

    /// The orchestrator's own conversation.
    pub fn history(&self) -> &[Message] {
        self.agent.history()
    }

    /// Registered subjects (normalized), sorted.
    pub fn agents(&self) -> impl Iterator<Item = &str> {
        self.registry.keys().map(String::as_str)
    }

    /// The agent registered for `subject`.
    pub fn get(&self, subject: &str) -> Option<Handle<G>> {
        self.registry.get(&safe_name(subject)).cloned()
    }

    /// Number of registered agents.
    pub fn len(&self) -> usize {
        self.registry.len()
    }

    /// Whether no agent is registered.
    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    /// Append a user turn to the orchestrator's conversation.
    pub async fn add_user_message(&mut self, text: &str, reset: bool) -> Result<()> {
        self.agent.add_user_message(text, reset).await
    }

    /// Append previously saved turns and move the checkpoint past them.
    pub fn restore(&mut self, messages: impl IntoIterator<Item = Message>) {
        self.agent.restore(messages);
        self.agent.start_offset = self.agent.history.len();
    }

    /// Answer `prompt`, letting the model route work through its tools.
    pub async fn chat(&mut self, prompt: &str, complex: bool) -> Result<String> {
        participant::chat(self, prompt, complex).await
    }

    /// One gateway round trip over the orchestrator's history.
    pub async fn send(&mut self, model: Option<&str>) -> Result<String> {
        participant::send(self, model).await
    }

    /// Register an agent for `subject`.
    ///
    /// An existing agent for the subject is kept as is.
    pub async fn add_agent(&mut self, subject: &str, model: Option<&str>) -> Result<String> {
        let subject = subject.trim();
        if subject.is_empty() {
            tracing::warn!("add_agent called without a subject");
            return Ok("No subject provided.".to_owned());
        }
        if self.registry.contains_key(&safe_name(subject)) {
            return Ok(format!("Agent '{subject}' already exists."));
        }

        self.create_agent(subject, model).await?;
        Ok(format!("Agent '{subject}' added."))
    }

    /// Send `message` to the agent for `subject` and return its answer.
    ///
    /// The answer is also recorded in the orchestrator's own history.
    pub async fn send_to_agent(&mut self, subject: &str, message: &str) -> Result<String> {
        let subject = subject.trim();
        if message.is_empty() {
            tracing::warn!("no message provided for agent '{subject}'");
            return Ok("No message provided.".to_owned());
        }

        let existing = self.registry.get(&safe_name(subject)).cloned();
        let handle = match existing {
            Some(handle) => handle,
            None => match self.agent.context().config.missing_agent {
                MissingAgent::Create if !subject.is_empty() => {
                    self.create_agent(subject, None).await?
                }
                _ => return Ok(format!("No agent found for subject '{subject}'.")),
            },
        };

        tracing::info!("sending message to agent '{subject}': {message}");
        let answer = handle.lock().await.chat(message, false).await?;
        self.agent
            .add_user_message(&format!("Agent '{subject}' response: {answer}"), false)
            .await?;
        Ok(answer)
    }

    /// Send `message` to every registered agent concurrently.
    pub async fn broadcast(&self, message: &str) -> BTreeMap<String, String> {
        self.broadcast_with(message, CancellationToken::new()).await
    }

    /// Broadcast that can be abandoned through `cancel`.
    ///
    /// Every agent gets its own task; the call returns once all of them
    /// finished or were cancelled. Agents that were cancelled are missing
    /// from the result, agents that failed map to their error text.
    pub async fn broadcast_with(
        &self,
        message: &str,
        cancel: CancellationToken,
    ) -> BTreeMap<String, String> {
        tracing::info!("broadcasting to {} agents: {message}", self.registry.len());
        let mut workers = JoinSet::new();
        for (subject, handle) in &self.registry {
            let subject = subject.clone();
            let handle = handle.clone();
            let message = message.to_owned();
            let cancel = cancel.clone();
            workers.spawn(async move {
                let reply = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => None,
                    reply = async { handle.lock().await.chat(&message, false).await } => Some(reply),
                };
                (subject, reply)
            });
        }

        let mut replies = BTreeMap::new();
        while let Some(joined) = workers.join_next().await {
            match joined {
                Ok((subject, Some(Ok(answer)))) => {
                    replies.insert(subject, answer);
                }
                Ok((subject, Some(Err(e)))) => {
                    tracing::warn!("agent '{subject}' failed during broadcast: {e}");
                    replies.insert(subject, format!("Error: {e}"));
                }
                Ok((subject, None)) => {
                    tracing::info!("broadcast to '{subject}' cancelled");
                }
                Err(e) => tracing::warn!("broadcast worker stopped: {e}"),
            }
        }
        replies
    }

    /// End the session: save every agent's transcript, then our own.
    pub async fn close(self) -> Result<Vec<PathBuf>> {
        let mut saved = Vec::new();
        for (subject, handle) in &self.registry {
            match handle.lock().await.persist() {
                Ok(Some(path)) => saved.push(path),
                Ok(None) => {}
                Err(e) => tracing::warn!("failed to save transcript of '{subject}': {e}"),
            }
        }

        saved.extend(self.agent.close()?);
        Ok(saved)
    }

    async fn create_agent(&mut self, subject: &str, model: Option<&str>) -> Result<Handle<G>> {
        let model = model.unwrap_or(self.agent.model()).to_owned();
        let mut agent = Agent::new(self.agent.context().clone()).with_model(model);
        agent.set_subject(subject, None, None).await?;

        let handle = Arc::new(Mutex::new(agent));
        self.registry.insert(safe_name(subject), handle.clone());
        tracing::info!("added agent '{subject}'");
        Ok(handle)
    }
}

impl<G: Gateway> Participant for Orchestrator<G> {
    type Gateway = G;

    fn agent(&self) -> &Agent<G> {
        &self.agent
    }

    fn agent_mut(&mut self) -> &mut Agent<G> {
        &mut self.agent
    }

    fn toolbox(&self) -> Arc<Toolbox<Self>> {
        self.tools.clone()
    }
}

/// The base tools plus the orchestration tools.
fn toolbox<G: Gateway>() -> Toolbox<Orchestrator<G>> {
    let mut tools = builtin::toolbox();
    tools
        .register::<tool::AddAgent>(
            "add_agent",
            "Adds a specialized agent for a subject.",
            tool::add_agent::<G>,
        )
        .register::<tool::SendToAgent>(
            "send_to_agent",
            "Sends a message to a specific agent.",
            tool::send_to_agent::<G>,
        )
        .register::<tool::Broadcast>(
            "broadcast",
            "Broadcasts a message to all agents.",
            tool::broadcast::<G>,
        );
    tools
}

mod tool {
    use super::Orchestrator;
    use crate::toolbox::args;
    use anyhow::Result;
    use ccore::Gateway;
    use futures_util::future::BoxFuture;
    use schemars::JsonSchema;
    use serde::Deserialize;
    use serde_json::Value;

    #[derive(Deserialize, JsonSchema)]
    pub struct AddAgent {
        /// The subject the new agent specializes in
        subject: String,
        /// Optional model override for the new agent
        #[serde(default)]
        model: Option<String>,
    }

    #[derive(Deserialize, JsonSchema)]
    pub struct SendToAgent {
        /// The subject of the agent to send the message to
        agent_subject: String,
        /// The message to send
        message: String,
    }

    #[derive(Deserialize, JsonSchema)]
    pub struct Broadcast {
        /// The message to broadcast
        message: String,
    }

    pub fn add_agent<G: Gateway>(
        orchestrator: &mut Orchestrator<G>,
        value: Value,
    ) -> BoxFuture<'_, Result<Option<String>>> {
        Box::pin(async move {
            let AddAgent { subject, model } = args(value)?;
            orchestrator
                .add_agent(&subject, model.as_deref())
                .await
                .map(Some)
        })
    }

    pub fn send_to_agent<G: Gateway>(
        orchestrator: &mut Orchestrator<G>,
        value: Value,
    ) -> BoxFuture<'_, Result<Option<String>>> {
        Box::pin(async move {
            let SendToAgent {
                agent_subject,
                message,
            } = args(value)?;
            orchestrator
                .send_to_agent(&agent_subject, &message)
                .await
                .map(Some)
        })
    }

    pub fn broadcast<G: Gateway>(
        orchestrator: &mut Orchestrator<G>,
        value: Value,
    ) -> BoxFuture<'_, Result<Option<String>>> {
        Box::pin(async move {
            let Broadcast { message } = args(value)?;
            if orchestrator.is_empty() {
                return Ok(Some("No agents registered to broadcast to.".to_owned()));
            }
            let replies = orchestrator.broadcast(&message).await;
            Ok(Some(serde_json::to_string_pretty(&replies)?))
        })
    }
}
