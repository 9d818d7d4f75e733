//! Scripted gateway for tests.
//!
//! [`Scripted`] replays queued responses first and falls back to a
//! responder function once the queue is empty. Every request is recorded
//! so tests can assert on what the runtime actually sent.

use crate::{Gateway, Request, Response};
use anyhow::Result;
use parking_lot::Mutex;
use std::{collections::VecDeque, sync::Arc, time::Duration};

type Responder = Arc<dyn Fn(&Request) -> Result<Response> + Send + Sync>;

/// A deterministic in-process gateway.
#[derive(Clone)]
pub struct Scripted {
    queue: Arc<Mutex<VecDeque<Response>>>,
    requests: Arc<Mutex<Vec<Request>>>,
    responder: Responder,
    delay: Option<Duration>,
}

impl Scripted {
    /// Create a gateway answering with `responder` once the queue is empty.
    pub fn new<F>(responder: F) -> Self
    where
        F: Fn(&Request) -> Result<Response> + Send + Sync + 'static,
    {
        Self {
            queue: Arc::default(),
            requests: Arc::default(),
            responder: Arc::new(responder),
            delay: None,
        }
    }

    /// Echo the last user turn back as text.
    pub fn echo() -> Self {
        Self::new(|req| Ok(Response::text(req.last_user().unwrap_or_default())))
    }

    /// Answer `"{system} | {last user turn}"`.
    ///
    /// Distinct personas produce distinct answers for the same prompt,
    /// which makes fan-out results attributable.
    pub fn persona() -> Self {
        Self::new(|req| {
            Ok(Response::text(format!(
                "{} | {}",
                req.system().unwrap_or_default(),
                req.last_user().unwrap_or_default()
            )))
        })
    }

    /// Sleep before every answer.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Queue a response to be returned before the responder is consulted.
    pub fn push(&self, response: Response) {
        self.queue.lock().push_back(response);
    }

    /// Every request received so far, in arrival order.
    pub fn requests(&self) -> Vec<Request> {
        self.requests.lock().clone()
    }

    /// Number of requests received so far.
    pub fn calls(&self) -> usize {
        self.requests.lock().len()
    }
}

impl Gateway for Scripted {
    async fn send(&self, request: &Request) -> Result<Response> {
        self.requests.lock().push(request.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let queued = self.queue.lock().pop_front();
        match queued {
            Some(response) => Ok(response),
            None => (self.responder)(request),
        }
    }
}
