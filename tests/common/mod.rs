//! Shared test helpers: a scripted model client.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use futures::stream::{self, BoxStream};

use chick::error::ChickError;
use chick::provider::{ChatRequest, ChatResponse, ModelClient};
use chick::types::{ChatTurn, TextStreamDelta, Usage};

/// What the client does once its script runs out.
enum Fallback {
    Text(String),
    Fail,
}

/// A model client that replays queued replies and records every request.
pub struct ScriptedClient {
    replies: Mutex<VecDeque<Result<String, String>>>,
    chunks: Mutex<VecDeque<Result<String, String>>>,
    requests: Mutex<Vec<ChatRequest>>,
    calls: AtomicUsize,
    fallback: Fallback,
}

impl ScriptedClient {
    pub fn new() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            chunks: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
            fallback: Fallback::Fail,
        }
    }

    /// A client that answers every call with the same text.
    pub fn always(text: &str) -> Self {
        Self {
            fallback: Fallback::Text(text.to_string()),
            ..Self::new()
        }
    }

    pub fn with_replies<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let client = Self::new();
        for reply in replies {
            client.queue_reply(reply);
        }
        client
    }

    pub fn queue_reply(&self, text: impl Into<String>) {
        self.replies.lock().unwrap().push_back(Ok(text.into()));
    }

    pub fn queue_failure(&self, message: impl Into<String>) {
        self.replies.lock().unwrap().push_back(Err(message.into()));
    }

    pub fn queue_chunk(&self, text: impl Into<String>) {
        self.chunks.lock().unwrap().push_back(Ok(text.into()));
    }

    pub fn queue_chunk_failure(&self, message: impl Into<String>) {
        self.chunks.lock().unwrap().push_back(Err(message.into()));
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_messages(&self) -> Vec<ChatTurn> {
        self.requests
            .lock()
            .unwrap()
            .last()
            .map(|r| r.messages.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ModelClient for ScriptedClient {
    fn provider_name(&self) -> &str {
        "scripted"
    }

    fn model_id(&self) -> &str {
        "scripted-model"
    }

    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, ChickError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());

        let next = self.replies.lock().unwrap().pop_front();
        let text = match next {
            Some(Ok(text)) => text,
            Some(Err(message)) => return Err(ChickError::api(500, message)),
            None => match &self.fallback {
                Fallback::Text(text) => text.clone(),
                Fallback::Fail => return Err(ChickError::api(500, "script exhausted")),
            },
        };

        let mut response = ChatResponse::text(text);
        response.usage = Usage {
            input_tokens: 10,
            output_tokens: 5,
            total_tokens: 15,
        };
        Ok(response)
    }

    async fn stream(
        &self,
        request: &ChatRequest,
    ) -> Result<BoxStream<'static, Result<TextStreamDelta, ChickError>>, ChickError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());

        let chunks: Vec<_> = self
            .chunks
            .lock()
            .unwrap()
            .drain(..)
            .map(|chunk| match chunk {
                Ok(text) => Ok(TextStreamDelta::text(text)),
                Err(message) => Err(ChickError::Stream(message)),
            })
            .collect();
        Ok(Box::pin(stream::iter(chunks)))
    }
}
