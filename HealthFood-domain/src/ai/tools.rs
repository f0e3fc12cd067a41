//! Function-calling loop.

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, warn};

use super::{AiError, ChatMessage, ChatModel, CompletionRequest, ToolDefinition};

/// Runs the tools a model asks for
#[async_trait]
pub trait ToolExecutor: Send + Sync {
    /// Execute one call; the value is sent back to the model as JSON
    async fn execute(&self, name: &str, arguments: Value) -> Value;
}

/// Let the model call tools until it answers in text
///
/// Each round the model sees the conversation so far plus the results of
/// the calls it made. After `max_loops` rounds one last call is made
/// without tools so the model has to answer.
pub async fn run_with_tools(
    model: &dyn ChatModel,
    messages: Vec<ChatMessage>,
    tools: Vec<ToolDefinition>,
    executor: &dyn ToolExecutor,
    max_loops: usize,
) -> Result<String, AiError> {
    let mut working = messages;

    for round in 0..max_loops {
        let request = CompletionRequest::new(working.clone()).with_tools(tools.clone());
        let reply = model.complete(request).await?;

        if reply.tool_calls.is_empty() {
            return Ok(reply.text());
        }

        debug!("Round {}: model requested {} tool calls", round + 1, reply.tool_calls.len());

        let calls = reply.tool_calls.clone();
        working.push(reply);

        for call in &calls {
            let arguments = serde_json::from_str::<Value>(&call.function.arguments)
                .ok()
                .filter(Value::is_object)
                .unwrap_or_else(|| json!({}));

            let result = executor.execute(&call.function.name, arguments).await;
            let content = match result {
                Value::String(text) => text,
                other => other.to_string(),
            };
            working.push(ChatMessage::tool_result(call, content));
        }
    }

    warn!("Tool loop hit {} rounds, asking for a final answer", max_loops);
    let reply = model.complete(CompletionRequest::new(working)).await?;
    Ok(reply.text())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{FunctionCall, MockChatModel, ToolCall};
    use std::sync::Mutex;

    struct RecordingExecutor {
        calls: Mutex<Vec<(String, Value)>>,
    }

    #[async_trait]
    impl ToolExecutor for RecordingExecutor {
        async fn execute(&self, name: &str, arguments: Value) -> Value {
            self.calls.lock().unwrap().push((name.to_string(), arguments));
            json!({"ok": true})
        }
    }

    fn tool_call_reply(arguments: &str) -> ChatMessage {
        ChatMessage {
            role: "assistant".to_string(),
            content: None,
            tool_calls: vec![ToolCall {
                id: "call_1".to_string(),
                kind: "function".to_string(),
                function: FunctionCall {
                    name: "lookup".to_string(),
                    arguments: arguments.to_string(),
                },
            }],
            tool_call_id: None,
            name: None,
        }
    }

    fn executor() -> RecordingExecutor {
        RecordingExecutor {
            calls: Mutex::new(Vec::new()),
        }
    }

    #[tokio::test]
    async fn plain_answer_skips_tools() {
        let mut model = MockChatModel::new();
        model
            .expect_complete()
            .times(1)
            .returning(|_| Ok(ChatMessage::assistant("Eat more greens")));

        let executor = executor();
        let answer = run_with_tools(&model, vec![ChatMessage::user("hi")], vec![], &executor, 3)
            .await
            .unwrap();

        assert_eq!(answer, "Eat more greens");
        assert!(executor.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn tool_results_are_fed_back() {
        let mut model = MockChatModel::new();
        let mut seq = mockall::Sequence::new();
        model
            .expect_complete()
            .times(1)
            .in_sequence(&mut seq)
            .withf(|request| request.messages.len() == 1)
            .returning(|_| Ok(tool_call_reply("{\"name\":\"oat\"}")));
        model
            .expect_complete()
            .times(1)
            .in_sequence(&mut seq)
            .withf(|request| {
                request.messages.len() == 3
                    && request.messages[2].role == "tool"
                    && request.messages[2].text() == "{\"ok\":true}"
            })
            .returning(|_| Ok(ChatMessage::assistant("Oats are fine")));

        let executor = executor();
        let answer = run_with_tools(&model, vec![ChatMessage::user("oats?")], vec![], &executor, 3)
            .await
            .unwrap();

        assert_eq!(answer, "Oats are fine");
        let calls = executor.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0], ("lookup".to_string(), json!({"name": "oat"})));
    }

    #[tokio::test]
    async fn bad_arguments_become_empty_object_and_loop_is_bounded() {
        let mut model = MockChatModel::new();
        model
            .expect_complete()
            .withf(|request| !request.tools.is_empty())
            .times(2)
            .returning(|_| Ok(tool_call_reply("not json")));
        model
            .expect_complete()
            .withf(|request| request.tools.is_empty())
            .times(1)
            .returning(|_| Ok(ChatMessage::assistant("Final")));

        let executor = executor();
        let tools = vec![ToolDefinition::function("lookup", "find", json!({"type": "object"}))];
        let answer = run_with_tools(&model, vec![ChatMessage::user("x")], tools, &executor, 2)
            .await
            .unwrap();

        assert_eq!(answer, "Final");
        let calls = executor.calls.lock().unwrap();
        assert_eq!(calls.len(), 2);
        assert!(calls.iter().all(|(_, args)| args == &json!({})));
    }
}
