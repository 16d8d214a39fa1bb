//! Scripted generation client for tests and dry runs.
//!
//! Replies are chosen by the first matching rule (model or prompt substring), falling
//! back to a default reply. The client tracks every request it saw and the peak number
//! of calls in flight at once.

use super::{GenerationClient, GenerationRequest};
use crate::error::ApiError;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// What a scripted call returns
#[derive(Debug, Clone)]
pub enum ScriptedReply {
    Text { content: String, delay: Duration },
    Fail { message: String, delay: Duration },
}

impl ScriptedReply {
    pub fn text(content: impl Into<String>) -> Self {
        Self::Text {
            content: content.into(),
            delay: Duration::ZERO,
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self::Fail {
            message: message.into(),
            delay: Duration::ZERO,
        }
    }

    pub fn after(self, delay: Duration) -> Self {
        match self {
            Self::Text { content, .. } => Self::Text { content, delay },
            Self::Fail { message, .. } => Self::Fail { message, delay },
        }
    }

    fn delay(&self) -> Duration {
        match self {
            Self::Text { delay, .. } | Self::Fail { delay, .. } => *delay,
        }
    }
}

enum Matcher {
    Model(String),
    Prompt(String),
}

impl Matcher {
    fn matches(&self, request: &GenerationRequest) -> bool {
        match self {
            Matcher::Model(model) => request.model == *model,
            Matcher::Prompt(needle) => request.prompt.contains(needle.as_str()),
        }
    }
}

pub struct ScriptedClient {
    rules: Vec<(Matcher, ScriptedReply)>,
    default_reply: ScriptedReply,
    requests: Mutex<Vec<GenerationRequest>>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl ScriptedClient {
    pub fn new(default_reply: ScriptedReply) -> Self {
        Self {
            rules: Vec::new(),
            default_reply,
            requests: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
        }
    }

    /// Reply for requests addressed to `model`
    pub fn on_model(mut self, model: impl Into<String>, reply: ScriptedReply) -> Self {
        self.rules.push((Matcher::Model(model.into()), reply));
        self
    }

    /// Reply for requests whose prompt contains `needle`
    pub fn on_prompt(mut self, needle: impl Into<String>, reply: ScriptedReply) -> Self {
        self.rules.push((Matcher::Prompt(needle.into()), reply));
        self
    }

    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().len()
    }

    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    fn reply_for(&self, request: &GenerationRequest) -> ScriptedReply {
        self.rules
            .iter()
            .find(|(matcher, _)| matcher.matches(request))
            .map(|(_, reply)| reply.clone())
            .unwrap_or_else(|| self.default_reply.clone())
    }
}

#[async_trait]
impl GenerationClient for ScriptedClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, ApiError> {
        self.requests.lock().push(request.clone());
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);

        let reply = self.reply_for(request);
        if !reply.delay().is_zero() {
            tokio::time::sleep(reply.delay()).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        match reply {
            ScriptedReply::Text { content, .. } => Ok(content),
            ScriptedReply::Fail { message, .. } => Err(ApiError::ProviderRequestFailed(message)),
        }
    }

    fn provider_name(&self) -> &str {
        "scripted"
    }
}
