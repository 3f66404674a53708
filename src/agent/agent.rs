//! Core Agent struct: the tool-call loop and its streaming variant.

use std::sync::Arc;

use async_stream::try_stream;
use futures::{Stream, StreamExt};
use tracing::{debug, info, warn};

use crate::config::ChickConfig;
use crate::error::ChickError;
use crate::provider::{self, ChatRequest, ModelClient};
use crate::tools::{Tool, ToolRegistry};
use crate::types::{ChatTurn, GenerationSettings, Message, Usage};

use super::conversation::Conversation;
use super::directive::{parse_tool_calls, strip_tool_calls};
use super::dispatch::{execute_tool_call, ToolExecution};
use super::prompt::{base_prompt, build_system_prompt, tool_results_turn};

/// Tool rounds allowed per call before a final answer is forced.
pub const DEFAULT_MAX_TOOL_ITERATIONS: usize = 3;

/// Everything one [`Agent::run_detailed`] call did.
#[derive(Debug, Clone, Default)]
pub struct AgentRun {
    /// Text returned to the caller and stored as the assistant turn.
    pub answer: String,
    /// Rounds that executed at least one directive.
    pub rounds: usize,
    pub model_calls: usize,
    /// Every directive executed, in order.
    pub executions: Vec<ToolExecution>,
    /// The budget ran out and one extra model call produced the answer.
    pub forced_final: bool,
    pub usage: Usage,
}

/// A conversational agent that lets the model call tools through in-band
/// `[TOOL_CALL:name:params]` directives.
///
/// Each call to [`Agent::run`] appends exactly one user turn and one assistant
/// turn to the history; intermediate tool rounds live only in the working
/// buffer of that call (see [`AgentRun`]).
pub struct Agent {
    name: String,
    client: Arc<dyn ModelClient>,
    system_prompt: Option<String>,
    registry: ToolRegistry,
    tool_calling: bool,
    max_tool_iterations: usize,
    settings: GenerationSettings,
    conversation: Conversation,
}

impl Agent {
    /// Create a new agent around a model client.
    pub fn new(name: impl Into<String>, client: Arc<dyn ModelClient>) -> Self {
        Self {
            name: name.into(),
            client,
            system_prompt: None,
            registry: ToolRegistry::new(),
            tool_calling: false,
            max_tool_iterations: DEFAULT_MAX_TOOL_ITERATIONS,
            settings: GenerationSettings::default(),
            conversation: Conversation::new(),
        }
    }

    /// Build the client, settings and history ceiling from config.
    pub fn from_config(name: impl Into<String>, config: &ChickConfig) -> Result<Self, ChickError> {
        let client = provider::create_client(config)?;
        Ok(Self::new(name, client)
            .with_settings(config.generation_settings())
            .with_max_history(config.max_history_length))
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    /// Replace the registry. A non-empty registry turns tool calling on.
    pub fn with_registry(mut self, registry: ToolRegistry) -> Self {
        self.tool_calling = !registry.is_empty();
        self.registry = registry;
        self
    }

    pub fn with_settings(mut self, settings: GenerationSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_max_tool_iterations(mut self, max: usize) -> Self {
        self.max_tool_iterations = max;
        self
    }

    /// Bound the history window offered to the model.
    pub fn with_max_history(mut self, max_len: usize) -> Self {
        let mut conversation = Conversation::with_max_len(max_len);
        for message in self.conversation.messages() {
            conversation.add_message(message.clone());
        }
        self.conversation = conversation;
        self
    }

    /// Register a tool and turn tool calling on.
    pub fn add_tool(&mut self, tool: Arc<dyn Tool>, auto_expand: bool) {
        self.registry.register(tool, auto_expand);
        self.tool_calling = true;
    }

    pub fn set_tool_calling(&mut self, enabled: bool) {
        self.tool_calling = enabled;
    }

    pub fn tool_calling_enabled(&self) -> bool {
        self.tool_calling
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn clear_history(&mut self) {
        self.conversation.clear();
    }

    /// Answer one user input, executing tool directives along the way.
    pub async fn run(&mut self, input: &str) -> Result<String, ChickError> {
        Ok(self.run_detailed(input).await?.answer)
    }

    /// Like [`Agent::run`], but also report the intermediate rounds.
    ///
    /// A model failure propagates and leaves the history untouched.
    pub async fn run_detailed(&mut self, input: &str) -> Result<AgentRun, ChickError> {
        let system = if self.tool_calling {
            build_system_prompt(self.system_prompt.as_deref(), &self.registry)
        } else {
            base_prompt(self.system_prompt.as_deref()).to_string()
        };
        let mut buffer = self.working_buffer(system, input);
        let mut report = AgentRun::default();

        if self.tool_calling {
            self.tool_loop(&mut buffer, &mut report).await?;
        } else {
            report.answer = self.call_model(&buffer, &mut report).await?;
        }

        self.conversation.add_user_message(input);
        self.conversation.add_assistant_message(report.answer.clone());
        info!(
            agent = %self.name,
            rounds = report.rounds,
            model_calls = report.model_calls,
            forced_final = report.forced_final,
            "run complete"
        );
        Ok(report)
    }

    async fn tool_loop(
        &self,
        buffer: &mut Vec<ChatTurn>,
        report: &mut AgentRun,
    ) -> Result<(), ChickError> {
        for iteration in 1..=self.max_tool_iterations {
            let text = self.call_model(buffer, report).await?;
            let calls = parse_tool_calls(&text);
            if calls.is_empty() {
                report.answer = text;
                return Ok(());
            }

            debug!(iteration, calls = calls.len(), "executing tool calls");
            report.rounds = iteration;
            let mut results = Vec::with_capacity(calls.len());
            for call in &calls {
                let execution = execute_tool_call(&self.registry, call).await;
                results.push(execution.to_string());
                report.executions.push(execution);
            }

            buffer.push(ChatTurn::assistant(strip_tool_calls(&text, &calls)));
            buffer.push(ChatTurn::user(tool_results_turn(&results)));
        }

        warn!(
            max_tool_iterations = self.max_tool_iterations,
            "tool budget exhausted, forcing a final answer"
        );
        report.forced_final = true;
        report.answer = self.call_model(buffer, report).await?;
        Ok(())
    }

    /// Stream a reply without tool handling.
    ///
    /// Chunks are yielded as they arrive. The exchange is recorded in history
    /// only once the stream completes; a failure mid-stream is yielded and
    /// leaves history untouched.
    pub fn stream_run(
        &mut self,
        input: &str,
    ) -> impl Stream<Item = Result<String, ChickError>> + '_ {
        let input = input.to_string();
        try_stream! {
            let system = base_prompt(self.system_prompt.as_deref()).to_string();
            let request = ChatRequest {
                messages: self.working_buffer(system, &input),
                settings: self.settings.clone(),
            };

            let mut deltas = self.client.stream(&request).await?;
            let mut answer = String::new();
            while let Some(delta) = deltas.next().await {
                let delta = delta?;
                if delta.text.is_empty() {
                    continue;
                }
                answer.push_str(&delta.text);
                yield delta.text;
            }

            self.conversation.add_user_message(input);
            self.conversation.add_assistant_message(answer);
        }
    }

    fn working_buffer(&self, system: String, input: &str) -> Vec<ChatTurn> {
        let window = self.conversation.window();
        let mut turns = Vec::with_capacity(window.len() + 2);
        turns.push(ChatTurn::system(system));
        turns.extend(window.iter().map(Message::to_turn));
        turns.push(ChatTurn::user(input));
        turns
    }

    async fn call_model(
        &self,
        turns: &[ChatTurn],
        report: &mut AgentRun,
    ) -> Result<String, ChickError> {
        let request = ChatRequest {
            messages: turns.to_vec(),
            settings: self.settings.clone(),
        };
        report.model_calls += 1;
        debug!(call = report.model_calls, turns = turns.len(), "invoking model");
        let response = self.client.complete(&request).await?;
        report.usage.merge(&response.usage);
        Ok(response.text)
    }
}

impl std::fmt::Debug for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("name", &self.name)
            .field("provider", &self.client.provider_name())
            .field("model", &self.client.model_id())
            .field("tool_calling", &self.tool_calling)
            .field("max_tool_iterations", &self.max_tool_iterations)
            .field("tools", &self.registry.names())
            .field("history", &self.conversation.len())
            .finish()
    }
}
