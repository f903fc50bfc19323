//! Turn runner for OpenAI-compatible chat-completions providers.
//!
//! Each turn resends the whole transcript (no truncation or summarization),
//! advertises the agent's tools, and loops while the model asks for tool
//! calls. The loop is bounded by `RunConfig::max_tool_turns`.

use crate::agent::{
    Agent, AgentDefinition, AgentError, AgentInfo, AgentResponse, ResponseMetadata, RunConfig,
    ToolInvocation,
};
use crate::events::{AppEvent, EventSender, TokenUsage};
use crate::session::{ChatMessage, MessageRole, ToolCallRecord};
use crate::tools::ToolExecutor;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Instant;
use tracing::{info, info_span, warn, Instrument, Span};

pub struct TurnRunner {
    info: AgentInfo,
    definition: AgentDefinition,
    config: RunConfig,
    client: reqwest::Client,
    event_sender: EventSender,
}

impl TurnRunner {
    pub fn new(definition: AgentDefinition, config: RunConfig, event_sender: EventSender) -> Self {
        Self {
            info: AgentInfo {
                name: definition.name.clone(),
                description: "Answers cryptocurrency price questions with a live price lookup".to_string(),
                model: config.model.clone(),
            },
            definition,
            config,
            client: reqwest::Client::new(),
            event_sender,
        }
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    fn traced(&self) -> bool {
        !self.config.tracing_disabled
    }

    /// Convert the transcript into chat-completions messages.
    ///
    /// Runs of `Tool` messages are replayed as one assistant message carrying
    /// the `tool_calls`, followed by one `tool` message per result.
    fn convert_history(history: &[ChatMessage]) -> Vec<Value> {
        let mut messages = Vec::with_capacity(history.len());
        let mut pending_tools: Vec<&ChatMessage> = Vec::new();

        for m in history {
            match m.role {
                MessageRole::Tool => pending_tools.push(m),
                MessageRole::User | MessageRole::Assistant => {
                    Self::flush_tool_messages(&mut messages, &mut pending_tools);
                    let role = if m.role == MessageRole::User { "user" } else { "assistant" };
                    messages.push(json!({ "role": role, "content": m.content }));
                }
            }
        }
        Self::flush_tool_messages(&mut messages, &mut pending_tools);

        messages
    }

    fn flush_tool_messages(messages: &mut Vec<Value>, pending: &mut Vec<&ChatMessage>) {
        let calls: Vec<(&ToolCallRecord, &str)> = pending
            .drain(..)
            .filter_map(|m| m.tool_call.as_ref().map(|call| (call, m.content.as_str())))
            .collect();
        if calls.is_empty() {
            return;
        }

        let tool_calls: Vec<ToolCall> = calls
            .iter()
            .map(|(call, _)| ToolCall {
                id: call.id.clone(),
                kind: "function".to_string(),
                function: FunctionCall {
                    name: call.name.clone(),
                    arguments: call.arguments.to_string(),
                },
            })
            .collect();
        messages.push(json!({
            "role": "assistant",
            "content": Value::Null,
            "tool_calls": tool_calls
        }));

        for (call, output) in calls {
            messages.push(json!({
                "role": "tool",
                "tool_call_id": call.id,
                "content": output
            }));
        }
    }

    async fn http_post(&self, body: &Value) -> Result<ChatCompletionResponse, AgentError> {
        let resp = self
            .client
            .post(self.config.completions_url())
            .bearer_auth(&self.config.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| AgentError::Network(format!("request error: {}", e)))?;

        let status = resp.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            let text = resp.text().await.unwrap_or_default();
            return Err(AgentError::Authentication(format!("{}: {}", status, text)));
        }
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(AgentError::Provider {
                status: status.as_u16(),
                body: text,
            });
        }

        resp.json::<ChatCompletionResponse>()
            .await
            .map_err(|e| AgentError::InvalidResponse(format!("decode error: {}", e)))
    }

    async fn run_turn(&self, transcript: &[ChatMessage]) -> Result<AgentResponse, AgentError> {
        let start = Instant::now();

        let mut messages = vec![json!({
            "role": "system",
            "content": self.definition.instructions
        })];
        messages.extend(Self::convert_history(transcript));

        let tools = self.definition.tools.specs_for_openai();
        let executor = ToolExecutor::new(self.definition.tools.clone(), self.event_sender.clone());
        let mut invocations = Vec::new();
        let mut token_usage: Option<TokenUsage> = None;
        let mut model = None;

        let _ = self.event_sender.send(AppEvent::ChatCreated);

        for round_trip in 1..=self.config.max_tool_turns {
            let mut body = json!({
                "model": self.config.model,
                "messages": messages,
            });
            if !tools.is_empty() {
                body["tools"] = json!(tools);
                body["tool_choice"] = json!("auto");
            }

            if self.traced() {
                info!(round_trip, messages = messages.len(), "Sending chat completion request");
            }
            let resp = self.http_post(&body).await?;

            if let Some(usage) = resp.usage {
                token_usage
                    .get_or_insert_with(TokenUsage::default)
                    .accumulate(usage.into());
            }
            if resp.model.is_some() {
                model = resp.model;
            }

            let Some(choice) = resp.choices.into_iter().next() else {
                return Err(AgentError::InvalidResponse("no choices".to_string()));
            };
            let Some(msg) = choice.message else {
                return Err(AgentError::InvalidResponse("choice without a message".to_string()));
            };

            let tool_calls = msg.tool_calls.unwrap_or_default();
            if !tool_calls.is_empty() {
                // The assistant's tool request must precede the results
                messages.push(json!({
                    "role": "assistant",
                    "content": msg.content,
                    "tool_calls": tool_calls
                }));

                for call in tool_calls {
                    let args: Value = serde_json::from_str(&call.function.arguments)
                        .unwrap_or(Value::String(call.function.arguments.clone()));

                    if self.traced() {
                        info!(tool = %call.function.name, id = %call.id, "Model requested tool");
                    }
                    let outcome = executor
                        .execute_tool_with_result(call.id.clone(), &call.function.name, args.clone())
                        .await;
                    if self.traced() {
                        info!(tool = %call.function.name, ok = outcome.ok, duration_ms = outcome.duration_ms, "Tool finished");
                    }

                    messages.push(json!({
                        "role": "tool",
                        "tool_call_id": call.id,
                        "content": outcome.output
                    }));
                    invocations.push(ToolInvocation {
                        call: ToolCallRecord {
                            id: call.id,
                            name: call.function.name,
                            arguments: args,
                        },
                        output: outcome.output,
                    });
                }

                // Continue loop for next assistant turn
                continue;
            }

            let Some(content) = msg.content else {
                return Err(AgentError::InvalidResponse(
                    "model returned neither content nor tool calls".to_string(),
                ));
            };

            let _ = self.event_sender.send(AppEvent::ChatCompleted { token_usage });
            if let Some(u) = token_usage {
                let _ = self.event_sender.send(AppEvent::TokenCount(u));
            }

            return Ok(AgentResponse {
                content,
                tool_calls: invocations,
                metadata: ResponseMetadata::new()
                    .with_processing_time(start.elapsed())
                    .with_token_usage(token_usage)
                    .with_model(model.or_else(|| Some(self.config.model.clone())))
                    .with_round_trips(round_trip),
            });
        }

        warn!(
            limit = self.config.max_tool_turns,
            "Model kept requesting tools; abandoning turn"
        );
        Err(AgentError::ToolLoopExceeded {
            limit: self.config.max_tool_turns,
        })
    }
}

#[async_trait]
impl Agent for TurnRunner {
    async fn submit(&self, transcript: &[ChatMessage]) -> Result<AgentResponse, AgentError> {
        let span = if self.traced() {
            info_span!(
                "turn",
                agent = %self.definition.name,
                model = %self.config.model,
                history = transcript.len()
            )
        } else {
            Span::none()
        };

        self.run_turn(transcript).instrument(span).await
    }

    fn info(&self) -> AgentInfo {
        self.info.clone()
    }
}

#[derive(Debug, Clone, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    usage: Option<TokenUsageResponse>,
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
struct TokenUsageResponse {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
    #[serde(default)]
    total_tokens: u32,
}

impl From<TokenUsageResponse> for TokenUsage {
    fn from(usage: TokenUsageResponse) -> Self {
        TokenUsage {
            input_tokens: usage.prompt_tokens,
            output_tokens: usage.completion_tokens,
            total_tokens: usage.total_tokens,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct Choice {
    #[serde(default)]
    message: Option<Message>,
}

#[derive(Debug, Clone, Deserialize)]
struct Message {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<ToolCall>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ToolCall {
    #[serde(default)]
    id: String,
    #[serde(rename = "type", default = "function_kind")]
    kind: String,
    function: FunctionCall,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct FunctionCall {
    name: String,
    #[serde(default)]
    arguments: String,
}

fn function_kind() -> String {
    "function".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Session;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_convert_history_plain_turns() {
        let mut session = Session::new();
        session.add_user_message("btc");
        session.add_assistant_message("The current price of BTC is $1");
        session.add_user_message("eth");

        let messages = TurnRunner::convert_history(session.messages());
        assert_eq!(
            messages,
            vec![
                json!({"role": "user", "content": "btc"}),
                json!({"role": "assistant", "content": "The current price of BTC is $1"}),
                json!({"role": "user", "content": "eth"}),
            ]
        );
    }

    #[test]
    fn test_convert_history_replays_tool_calls() {
        let mut session = Session::new();
        session.add_user_message("btc and eth");
        for (id, symbol) in [("call_1", "BTC"), ("call_2", "ETH")] {
            session.add_tool_message(
                ToolCallRecord {
                    id: id.to_string(),
                    name: "crypto_price".to_string(),
                    arguments: json!({ "symbol": symbol }),
                },
                format!("The current price of {} is $1", symbol),
            );
        }
        session.add_assistant_message("Both are $1");

        let messages = TurnRunner::convert_history(session.messages());
        assert_eq!(messages.len(), 5);
        assert_eq!(messages[1]["role"], "assistant");
        assert_eq!(messages[1]["content"], Value::Null);
        assert_eq!(messages[1]["tool_calls"][0]["id"], "call_1");
        assert_eq!(messages[1]["tool_calls"][1]["function"]["name"], "crypto_price");
        assert_eq!(
            messages[1]["tool_calls"][1]["function"]["arguments"],
            json!({ "symbol": "ETH" }).to_string()
        );
        assert_eq!(
            messages[2],
            json!({"role": "tool", "tool_call_id": "call_1", "content": "The current price of BTC is $1"})
        );
        assert_eq!(messages[3]["tool_call_id"], "call_2");
        assert_eq!(messages[4], json!({"role": "assistant", "content": "Both are $1"}));
    }

    #[test]
    fn test_tool_call_type_defaults_to_function() {
        let call: ToolCall = serde_json::from_value(json!({
            "id": "x",
            "function": { "name": "crypto_price", "arguments": "{\"symbol\":\"btc\"}" }
        }))
        .unwrap();
        assert_eq!(call.kind, "function");
    }
}
