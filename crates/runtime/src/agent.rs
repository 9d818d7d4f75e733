//! A persona-bound conversation.

use crate::{Context, Participant, Toolbox, Transcript, builtin, participant, sandbox};
use anyhow::Result;
use ccore::{Gateway, Message, Request, Tool};
use compact_str::CompactString;
use std::{path::PathBuf, sync::Arc};

/// Subject of an agent that was never given one.
pub const DEFAULT_SUBJECT: &str = "General AI Assistant";

/// One conversation participant: a system prompt derived from its
/// subject, an append-only history, and the base tool set.
pub struct Agent<G: Gateway> {
    ctx: Context<G>,
    model: CompactString,
    subject: String,
    system: Option<Message>,
    pub(crate) history: Vec<Message>,
    pub(crate) start_offset: usize,
    tools: Arc<Toolbox<Agent<G>>>,
}

impl<G: Gateway> Agent<G> {
    /// Create an agent using the context's default model.
    pub fn new(ctx: Context<G>) -> Self {
        Self {
            model: ctx.config.model.clone(),
            ctx,
            subject: DEFAULT_SUBJECT.to_owned(),
            system: None,
            history: Vec::new(),
            start_offset: 0,
            tools: Arc::new(builtin::toolbox()),
        }
    }

    /// Use `model` for plain sends.
    pub fn with_model(mut self, model: impl Into<CompactString>) -> Self {
        self.model = model.into();
        self
    }

    /// The persona subject.
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// The default model.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// The system turn, once set.
    pub fn system(&self) -> Option<&Message> {
        self.system.as_ref()
    }

    /// The conversation so far, without the system turn.
    pub fn history(&self) -> &[Message] {
        &self.history
    }

    /// History index of the last reset point.
    pub fn start_offset(&self) -> usize {
        self.start_offset
    }

    /// The shared session collaborators.
    pub fn context(&self) -> &Context<G> {
        &self.ctx
    }

    /// Bind the agent to `subject` and load its system prompt.
    ///
    /// The prompt comes from the subject cache; on a miss one no-history
    /// gateway call polishes the base instruction into a system prompt.
    pub async fn set_subject(
        &mut self,
        subject: &str,
        personality: Option<&str>,
        expertise: Option<&str>,
    ) -> Result<()> {
        let base = base_prompt(subject, personality, expertise);
        self.subject = subject.to_owned();

        let ctx = &self.ctx;
        let model = ctx.config.prompt_model.as_str();
        let prompt = ctx
            .cache
            .get_or_create(subject, || async {
                ctx.complete_text(&generation_prompt(&base), model).await
            })
            .await?;

        self.set_system_message(prompt);
        Ok(())
    }

    /// Replace the system turn.
    pub fn set_system_message(&mut self, prompt: impl Into<String>) {
        self.system = Some(Message::system(prompt));
    }

    /// Append a user turn, loading the system prompt first if needed.
    ///
    /// Empty text appends nothing. `reset` moves the checkpoint used by
    /// [`close`](Self::close) to the current end of history.
    pub async fn add_user_message(&mut self, text: &str, reset: bool) -> Result<()> {
        if !text.is_empty() {
            if self.system.is_none() {
                let subject = self.subject.clone();
                self.set_subject(&subject, None, None).await?;
            }
            self.history.push(Message::user(text));
        }

        if reset {
            self.start_offset = self.history.len();
        }
        Ok(())
    }

    /// Append previously saved turns verbatim.
    pub fn restore(&mut self, messages: impl IntoIterator<Item = Message>) {
        self.history.extend(messages);
    }

    /// Answer `prompt`.
    ///
    /// With `complex` set the agent brainstorms for the configured number
    /// of rounds and answers with a synthesis of all suggestions.
    pub async fn chat(&mut self, prompt: &str, complex: bool) -> Result<String> {
        participant::chat(self, prompt, complex).await
    }

    /// One gateway round trip over the current history.
    pub async fn send(&mut self, model: Option<&str>) -> Result<String> {
        participant::send(self, model).await
    }

    /// One-shot completion of `prompt`, ignoring history and system turn.
    pub async fn send_no_history(&self, prompt: &str, model: Option<&str>) -> Result<String> {
        self.ctx
            .complete_text(prompt, model.unwrap_or(&self.model))
            .await
    }

    /// Look `query` up with the search collaborator.
    pub async fn fetch_external_info(&self, query: &str) -> String {
        self.ctx.search.search(query).await
    }

    /// Write `content` under the sandbox root.
    pub fn save_content_to_file(&self, content: &str, filepath: &str) -> Result<Option<PathBuf>> {
        sandbox::save(&self.ctx.config.paths.sandbox, content, filepath)
    }

    /// End the session, saving the transcript if anything new was said.
    pub fn close(self) -> Result<Option<PathBuf>> {
        self.persist()
    }

    /// Save the transcript when history grew past the checkpoint.
    pub(crate) fn persist(&self) -> Result<Option<PathBuf>> {
        if self.history.len() <= self.start_offset {
            tracing::info!("nothing new from '{}', transcript not saved", self.subject);
            return Ok(None);
        }

        let transcript = Transcript::new(self.history.clone());
        let path = transcript.save(&self.ctx.config.paths.logs, &self.subject)?;
        tracing::info!("saved '{}' transcript to {}", self.subject, path.display());
        Ok(Some(path))
    }

    /// Build a request over the system turn and history.
    pub(crate) fn request(&self, model: Option<&str>, tools: Vec<Tool>) -> Request {
        let messages = self
            .system
            .iter()
            .chain(self.history.iter())
            .cloned()
            .collect();

        let request = Request::new(model.unwrap_or(&self.model)).with_messages(messages);
        if tools.is_empty() {
            request
        } else {
            request.with_tools(tools)
        }
    }
}

impl<G: Gateway> Participant for Agent<G> {
    type Gateway = G;

    fn agent(&self) -> &Agent<G> {
        self
    }

    fn agent_mut(&mut self) -> &mut Agent<G> {
        self
    }

    fn toolbox(&self) -> Arc<Toolbox<Self>> {
        self.tools.clone()
    }
}

/// The instruction a persona prompt is generated from.
pub(crate) fn base_prompt(subject: &str, personality: Option<&str>, expertise: Option<&str>) -> String {
    let mut prompt = match personality {
        Some(personality) if !personality.is_empty() => {
            format!("You are a {personality} {subject} assistant.")
        }
        _ => format!("You are an expert {subject} assistant."),
    };
    if let Some(expertise) = expertise.filter(|e| !e.is_empty()) {
        prompt.push_str(&format!(" Your expertise level is {expertise}."));
    }
    prompt
}

/// The no-history request that turns a base instruction into a prompt.
pub(crate) fn generation_prompt(base: &str) -> String {
    format!(
        "give me the best system message for this base system message: '{base}' without any titles and responses, only the system message"
    )
}
