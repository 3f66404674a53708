//! OpenAI-compatible Chat Completions client (DeepSeek, OpenAI, Ollama, custom).

use async_trait::async_trait;
use futures::stream::BoxStream;
use futures::StreamExt;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::error::ChickError;
use crate::models::LanguageModel;
use crate::types::{ChatTurn, FinishReason, StreamEventType, TextStreamDelta, Usage};

use super::http::{
    bearer_headers, parse_sse_line, shared_client, status_to_error, SseLine, SseLineBuffer,
};
use super::{ChatRequest, ChatResponse, ModelClient};

pub struct OpenAiCompatibleClient {
    model: LanguageModel,
    api_key: Option<String>,
    base_url: String,
}

impl OpenAiCompatibleClient {
    pub fn new(model: LanguageModel, api_key: Option<String>, base_url: impl Into<String>) -> Self {
        Self {
            model,
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    fn build_request_body(&self, request: &ChatRequest, stream: bool) -> Value {
        let messages: Vec<Value> = request.messages.iter().map(turn_to_openai).collect();

        let mut obj = serde_json::Map::new();
        obj.insert("model".into(), self.model.model_id.clone().into());
        obj.insert("messages".into(), messages.into());
        obj.insert("stream".into(), stream.into());

        let settings = &request.settings;
        if let Some(max) = settings.max_tokens {
            obj.insert("max_tokens".into(), max.into());
        }
        if let Some(temp) = settings.temperature {
            obj.insert("temperature".into(), temp.into());
        }
        if let Some(top_p) = settings.top_p {
            obj.insert("top_p".into(), top_p.into());
        }
        if let Some(ref stops) = settings.stop_sequences {
            obj.insert("stop".into(), json!(stops));
        }
        if let Some(seed) = settings.seed {
            obj.insert("seed".into(), seed.into());
        }
        for (key, value) in &settings.extra {
            obj.insert(key.clone(), value.clone());
        }

        Value::Object(obj)
    }

    async fn send(&self, body: &Value) -> Result<reqwest::Response, ChickError> {
        let resp = shared_client()
            .post(self.endpoint())
            .headers(bearer_headers(self.api_key.as_deref()))
            .json(body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body_text = resp.text().await.unwrap_or_default();
            return Err(status_to_error(status.as_u16(), &body_text));
        }
        Ok(resp)
    }
}

#[async_trait]
impl ModelClient for OpenAiCompatibleClient {
    fn provider_name(&self) -> &str {
        self.model.provider.as_str()
    }

    fn model_id(&self) -> &str {
        &self.model.model_id
    }

    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, ChickError> {
        let body = self.build_request_body(request, false);
        debug!(model = %self.model, messages = request.messages.len(), "chat completion");

        let data: CompletionResponse = self.send(&body).await?.json().await?;
        let choice = data
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ChickError::api(200, "No choices in completion response"))?;

        Ok(ChatResponse {
            text: choice.message.content.unwrap_or_default(),
            usage: data.usage.map(Usage::from).unwrap_or_default(),
            finish_reason: choice.finish_reason.as_deref().and_then(parse_finish_reason),
        })
    }

    async fn stream(
        &self,
        request: &ChatRequest,
    ) -> Result<BoxStream<'static, Result<TextStreamDelta, ChickError>>, ChickError> {
        let body = self.build_request_body(request, true);
        debug!(model = %self.model, messages = request.messages.len(), "chat completion stream");

        let byte_stream = self.send(&body).await?.bytes_stream();

        let stream = async_stream::stream! {
            let mut lines = SseLineBuffer::default();
            let mut finished = false;
            futures::pin_mut!(byte_stream);

            while let Some(chunk_result) = byte_stream.next().await {
                let chunk = match chunk_result {
                    Ok(c) => c,
                    Err(e) => {
                        yield Err(ChickError::Network(e));
                        finished = true;
                        break;
                    }
                };

                lines.push(&chunk);
                while let Some(line) = lines.next_line() {
                    match parse_sse_line(&line) {
                        SseLine::Ignored => {}
                        SseLine::Done => {
                            finished = true;
                            break;
                        }
                        SseLine::Data(data) => {
                            if let Some(delta) = delta_from_data(data) {
                                yield Ok(delta);
                            }
                        }
                    }
                }
                if finished {
                    break;
                }
            }

            // A last event may arrive without a trailing newline.
            if !finished {
                if let Some(line) = lines.finish() {
                    if let SseLine::Data(data) = parse_sse_line(&line) {
                        if let Some(delta) = delta_from_data(data) {
                            yield Ok(delta);
                        }
                    }
                }
            }
        };

        Ok(Box::pin(stream))
    }
}

/// Turn one SSE `data:` payload into a delta. Unparseable and empty chunks yield nothing.
fn delta_from_data(data: &str) -> Option<TextStreamDelta> {
    let Ok(chunk) = serde_json::from_str::<StreamChunk>(data) else {
        debug!(line = data, "skipping unparseable stream chunk");
        return None;
    };
    let usage = chunk.usage.map(Usage::from);
    match chunk.choices.into_iter().next() {
        Some(choice) => {
            let finish = choice.finish_reason.as_deref().and_then(parse_finish_reason);
            Some(TextStreamDelta {
                text: choice.delta.content.unwrap_or_default(),
                event_type: if finish.is_some() {
                    StreamEventType::Done
                } else {
                    StreamEventType::TextDelta
                },
                finish_reason: finish,
                usage,
            })
        }
        None => usage.map(|usage| TextStreamDelta {
            text: String::new(),
            event_type: StreamEventType::Done,
            finish_reason: None,
            usage: Some(usage),
        }),
    }
}

fn turn_to_openai(turn: &ChatTurn) -> Value {
    json!({ "role": turn.role.to_string(), "content": turn.content })
}

fn parse_finish_reason(s: &str) -> Option<FinishReason> {
    match s {
        "stop" => Some(FinishReason::Stop),
        "length" => Some(FinishReason::Length),
        "tool_calls" => Some(FinishReason::ToolCalls),
        "content_filter" => Some(FinishReason::ContentFilter),
        _ => None,
    }
}

// Wire types (internal)

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
    usage: Option<WireUsage>,
}

#[derive(Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct CompletionMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct WireUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

impl From<WireUsage> for Usage {
    fn from(u: WireUsage) -> Self {
        Usage {
            input_tokens: u.prompt_tokens,
            output_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        }
    }
}

#[derive(Deserialize)]
struct StreamChunk {
    #[serde(default)]
    choices: Vec<StreamChoice>,
    usage: Option<WireUsage>,
}

#[derive(Deserialize)]
struct StreamChoice {
    delta: StreamDelta,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct StreamDelta {
    content: Option<String>,
}
