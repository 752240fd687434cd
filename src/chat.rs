//! Conversational play: an LLM drives the game through tool calls.

use crate::error::PiError;
use crate::llm_client::{ChatBackend, ChatMessage};
use crate::service::PiService;
use crate::tools::{PiTool, dispatch};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

/// Instructions given to the model at the start of every conversation.
pub const SYSTEM_PROMPT: &str = "You are a Pi memorization game assistant.

IMPORTANT INSTRUCTIONS:
1. When user wants to start, use start_pi_game
2. When user says a sequence of digits (like \"3.14159\" or \"14159265\"), use verify_pi_sequence to check them
3. The verify_pi_sequence tool checks ALL digits at once and tells you where the first mistake is
4. Be encouraging and energetic! This is fast-paced!
5. When they get digits right, celebrate briefly then prompt for more
6. When they're wrong, tell them exactly where and what the right digit was
7. For position quizzes use guess_pi_position, then check_position_guess with the user's answer

Remember: Users will say multiple digits at once like \"3.1415926535\" - use verify_pi_sequence for this!";

/// Message history of one chat, system prompt first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    id: String,
    messages: Vec<ChatMessage>,
}

impl Conversation {
    /// Starts a conversation seeded with the system prompt.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            messages: vec![ChatMessage::system(SYSTEM_PROMPT)],
        }
    }

    /// Conversation id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Every message so far.
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }
}

/// One tool executed during a turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolInvocation {
    /// Tool name as requested by the model.
    pub name: String,
    /// Decoded arguments, or the raw string when they are not JSON.
    pub arguments: Value,
    /// What the tool returned to the model.
    pub result: Value,
}

/// Outcome of a chat turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatReply {
    /// Final assistant text.
    pub reply: String,
    /// Tools run before answering, in call order.
    pub tools_used: Vec<ToolInvocation>,
}

/// Runs one user turn.
///
/// The model first sees the tool definitions. If it asks for tools, every
/// call is executed and a second completion (without tools) produces the
/// reply. On error the conversation is restored to its state before the turn
/// and games or quizzes started during the turn are ended, since no message
/// holds their ids any more. Moves made on existing games are kept.
///
/// # Errors
///
/// Upstream errors from the backend.
#[instrument(skip(backend, service, conversation), fields(conversation_id = %conversation.id))]
pub async fn chat_turn(
    backend: &dyn ChatBackend,
    service: &PiService,
    conversation: &mut Conversation,
    message: &str,
) -> Result<ChatReply, PiError> {
    let checkpoint = conversation.messages.len();
    let mut created = Vec::new();
    let result = run_turn(
        backend,
        service,
        &mut conversation.messages,
        &mut created,
        message,
    )
    .await;
    if let Err(e) = &result {
        warn!(error = %e, sessions = created.len(), "Chat turn failed, rolling back");
        conversation.messages.truncate(checkpoint);
        for id in &created {
            service.sessions().remove(id);
        }
    }
    result
}

/// Session id a tool result introduces, if any.
fn created_session(tool: &str, result: &Value) -> Option<String> {
    let key = match PiTool::from_str(tool).ok()? {
        PiTool::StartPiGame => "game_id",
        PiTool::GuessPiPosition => "quiz_id",
        _ => return None,
    };
    result.get(key)?.as_str().map(str::to_string)
}

async fn run_turn(
    backend: &dyn ChatBackend,
    service: &PiService,
    messages: &mut Vec<ChatMessage>,
    created: &mut Vec<String>,
    message: &str,
) -> Result<ChatReply, PiError> {
    messages.push(ChatMessage::user(message));

    let tools = PiTool::definitions();
    let first = backend.complete(messages, Some(tools.as_slice())).await?;
    let calls = first.requested_tools().to_vec();

    if calls.is_empty() {
        let reply = first.content.clone().unwrap_or_default();
        messages.push(ChatMessage::assistant(reply.clone()));
        return Ok(ChatReply {
            reply,
            tools_used: Vec::new(),
        });
    }

    messages.push(first);
    let mut tools_used = Vec::with_capacity(calls.len());
    for call in calls {
        debug!(tool = %call.function.name, "Executing tool call");
        let result = dispatch(service, &call.function.name, &call.function.arguments);
        created.extend(created_session(&call.function.name, &result));
        messages.push(ChatMessage::tool(call.id.clone(), result.to_string()));

        let arguments = serde_json::from_str(&call.function.arguments)
            .unwrap_or_else(|_| Value::String(call.function.arguments.clone()));
        tools_used.push(ToolInvocation {
            name: call.function.name,
            arguments,
            result,
        });
    }

    let last = backend.complete(messages, None).await?;
    let reply = last.content.unwrap_or_default();
    messages.push(ChatMessage::assistant(reply.clone()));
    info!(tools = tools_used.len(), "Chat turn complete");

    Ok(ChatReply { reply, tools_used })
}

/// Shared, individually locked conversation.
pub type ConversationHandle = Arc<tokio::sync::Mutex<Conversation>>;

#[derive(Debug)]
struct Slot {
    conversation: ConversationHandle,
    last_seen: Instant,
}

/// In-memory conversation store, separate from game sessions.
#[derive(Debug, Clone, Default)]
pub struct ChatStore {
    conversations: Arc<Mutex<HashMap<String, Slot>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl ChatStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the conversation under `id`, or a fresh one under a new id
    /// when `id` is absent or unknown.
    #[instrument(skip(self))]
    pub fn get_or_create(&self, id: Option<&str>) -> ConversationHandle {
        let mut conversations = lock(&self.conversations);
        if let Some(slot) = id.and_then(|id| conversations.get_mut(id)) {
            slot.last_seen = Instant::now();
            return Arc::clone(&slot.conversation);
        }

        let id = uuid::Uuid::new_v4().to_string();
        info!(conversation_id = %id, "Created conversation");
        let conversation = Arc::new(tokio::sync::Mutex::new(Conversation::new(id.clone())));
        conversations.insert(
            id,
            Slot {
                conversation: Arc::clone(&conversation),
                last_seen: Instant::now(),
            },
        );
        conversation
    }

    /// Looks up a conversation.
    pub fn get(&self, id: &str) -> Option<ConversationHandle> {
        let mut conversations = lock(&self.conversations);
        conversations.get_mut(id).map(|slot| {
            slot.last_seen = Instant::now();
            Arc::clone(&slot.conversation)
        })
    }

    /// Snapshot of a conversation's messages.
    ///
    /// # Errors
    ///
    /// Not found for an unknown id.
    pub async fn history(&self, id: &str) -> Result<Vec<ChatMessage>, PiError> {
        let handle = self
            .get(id)
            .ok_or_else(|| PiError::not_found("Conversation not found"))?;
        let conversation = handle.lock().await;
        Ok(conversation.messages.clone())
    }

    /// Forgets a conversation. Returns false if it did not exist.
    #[instrument(skip(self))]
    pub fn remove(&self, id: &str) -> bool {
        let removed = lock(&self.conversations).remove(id).is_some();
        if removed {
            info!(conversation_id = id, "Removed conversation");
        }
        removed
    }

    /// Drops every conversation untouched for longer than `max_idle`.
    #[instrument(skip(self))]
    pub fn evict_idle(&self, max_idle: Duration) -> usize {
        let mut conversations = lock(&self.conversations);
        let before = conversations.len();
        conversations.retain(|_, slot| slot.last_seen.elapsed() <= max_idle);
        let evicted = before - conversations.len();
        if evicted > 0 {
            info!(evicted, "Evicted idle conversations");
        }
        evicted
    }

    /// Number of stored conversations.
    pub fn len(&self) -> usize {
        lock(&self.conversations).len()
    }

    /// True when no conversations are stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
