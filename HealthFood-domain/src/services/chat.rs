//! Nutrition chat with tool calling.
//!
//! The assistant may look foods up in the database and write newly
//! reported conditions or weight changes back to the profile it is talking
//! about. When the AI backend is unreachable a fixed piece of advice built
//! from the profile is returned instead, so a message always gets an answer.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use health_food_data::models::{ChatSessionContext, HealthProfileChanges, NewChatMessage};
use health_food_data::repository::{ChatRepositoryTrait, FoodRepositoryTrait, HealthProfileRepositoryTrait};

use crate::ai::{run_with_tools, ChatMessage, ChatModel, ToolDefinition, ToolExecutor};
use crate::entities::conversions::{convert_to_domain_message, convert_to_domain_session};
use crate::entities::{ChatReply, ChatRole, ChatSession, ConversationMessage, MessageType, OutgoingMessage};
use crate::errors::{ServiceError, ServiceResult};

use super::owned_profile;

/// Earlier messages replayed to the model
pub const HISTORY_LIMIT: u32 = 6;

/// Tool rounds before the model must answer
pub const MAX_TOOL_LOOPS: usize = 3;

const SESSION_LIST_LIMIT: u32 = 10;
const MESSAGE_LIST_LIMIT: u32 = 50;
const DEFAULT_IMAGE_PROMPT: &str = "Please analyze the food in this image and advise me.";

/// Chat sessions and the assistant behind them
#[derive(Clone)]
pub struct ChatService {
    chats: Arc<dyn ChatRepositoryTrait>,
    profiles: Arc<dyn HealthProfileRepositoryTrait>,
    foods: Arc<dyn FoodRepositoryTrait>,
    model: Arc<dyn ChatModel>,
    language: String,
}

impl ChatService {
    pub fn new(
        chats: Arc<dyn ChatRepositoryTrait>,
        profiles: Arc<dyn HealthProfileRepositoryTrait>,
        foods: Arc<dyn FoodRepositoryTrait>,
        model: Arc<dyn ChatModel>,
        language: String,
    ) -> Self {
        Self {
            chats,
            profiles,
            foods,
            model,
            language,
        }
    }

    pub async fn list_sessions(&self, profile_id: i64, user_id: i64) -> ServiceResult<Vec<ChatSession>> {
        owned_profile(self.profiles.as_ref(), profile_id, user_id).await?;
        let sessions = self.chats.list_sessions(profile_id, SESSION_LIST_LIMIT).await?;
        Ok(sessions.into_iter().map(convert_to_domain_session).collect())
    }

    pub async fn create_session(&self, profile_id: i64, user_id: i64, name: Option<String>) -> ServiceResult<ChatSession> {
        owned_profile(self.profiles.as_ref(), profile_id, user_id).await?;
        let name = name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty());
        let session = self.chats.create_session(profile_id, name).await?;
        Ok(convert_to_domain_session(session))
    }

    /// The latest messages of a session, oldest first
    pub async fn list_messages(&self, session_id: i64, user_id: i64) -> ServiceResult<Vec<ConversationMessage>> {
        self.session(session_id, user_id).await?;
        let messages = self.chats.list_messages(session_id, MESSAGE_LIST_LIMIT).await?;
        Ok(messages.into_iter().map(convert_to_domain_message).collect())
    }

    /// Store a user message, ask the assistant and store its answer
    pub async fn send_message(&self, session_id: i64, user_id: i64, message: OutgoingMessage) -> ServiceResult<ChatReply> {
        let context = self.session(session_id, user_id).await?;

        let image_data = message
            .image_data
            .map(|data| data.trim().to_string())
            .filter(|data| !data.is_empty());
        match message.message_type {
            MessageType::Text if message.content.trim().is_empty() => {
                return Err(ServiceError::Validation("Message content is required".to_string()));
            }
            MessageType::Image if image_data.is_none() => {
                return Err(ServiceError::Validation("Image messages need image_data".to_string()));
            }
            MessageType::File => {
                return Err(ServiceError::Validation("message_type must be text or image".to_string()));
            }
            _ => {}
        }

        let history = self.chats.list_messages(session_id, HISTORY_LIMIT).await?;

        let metadata = image_data
            .as_ref()
            .map(|data| json!({ "has_image": true, "image_data": data }));
        self.chats
            .add_message(NewChatMessage {
                session_id,
                role: ChatRole::User,
                content: message.content.clone(),
                message_type: message.message_type,
                metadata,
            })
            .await?;

        let mut messages = vec![ChatMessage::system(system_prompt(&context, &self.language))];
        messages.extend(history.iter().map(|stored| match stored.role {
            ChatRole::User => ChatMessage::user(stored.content.clone()),
            ChatRole::Assistant => ChatMessage::assistant(stored.content.clone()),
        }));
        messages.push(match (&message.message_type, &image_data) {
            (MessageType::Image, Some(data)) => {
                let text = if message.content.trim().is_empty() {
                    DEFAULT_IMAGE_PROMPT.to_string()
                } else {
                    message.content.clone()
                };
                ChatMessage::user_with_image(text, format!("data:image/jpeg;base64,{}", data))
            }
            _ => ChatMessage::user(message.content.clone()),
        });

        let executor = ProfileToolExecutor::new(self.foods.clone(), self.profiles.clone(), &context);
        let answer = match run_with_tools(self.model.as_ref(), messages, chat_tools(), &executor, MAX_TOOL_LOOPS).await {
            Ok(answer) if !answer.trim().is_empty() => answer,
            Ok(_) => {
                warn!("Assistant returned an empty answer for session {}", session_id);
                fallback_advice(context.conditions_text.as_deref())
            }
            Err(e) => {
                warn!("Falling back to offline advice for session {}: {}", session_id, e);
                fallback_advice(context.conditions_text.as_deref())
            }
        };

        self.chats
            .add_message(NewChatMessage {
                session_id,
                role: ChatRole::Assistant,
                content: answer.clone(),
                message_type: MessageType::Text,
                metadata: None,
            })
            .await?;

        Ok(ChatReply {
            message: "Message sent".to_string(),
            ai_response: answer,
        })
    }

    async fn session(&self, session_id: i64, user_id: i64) -> ServiceResult<ChatSessionContext> {
        self.chats
            .session_context(session_id, user_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Chat session not found".to_string()))
    }
}

/// Tools offered to the assistant in every chat turn
pub fn chat_tools() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition::function(
            "search_food_database",
            "Look up detailed information about a food in the database",
            json!({
                "type": "object",
                "properties": {
                    "food_name": {
                        "type": "string",
                        "description": "Name of the food to look up"
                    }
                },
                "required": ["food_name"]
            }),
        ),
        ToolDefinition::function(
            "update_health_status",
            "Update the health profile: medical conditions and measurements such as weight",
            json!({
                "type": "object",
                "properties": {
                    "new_conditions": {
                        "type": "array",
                        "items": {"type": "string"},
                        "description": "Conditions the user reports, e.g. 'diabetes', 'high blood pressure'"
                    },
                    "condition_text_update": {
                        "type": "string",
                        "description": "Short note about the change, e.g. 'Gained 2kg this month'"
                    },
                    "weight_delta_kg": {
                        "type": "number",
                        "description": "Weight change in kg, positive or negative (e.g. 2 or -1.5)"
                    },
                    "new_weight_kg": {
                        "type": "number",
                        "description": "New weight when the user states it explicitly"
                    }
                },
                "required": []
            }),
        ),
    ]
}

fn system_prompt(context: &ChatSessionContext, language: &str) -> String {
    let mut profile = format!(
        "USER PROFILE:\n- Profile: {}\n- Health conditions: {}\n- Current weight: {} kg\n",
        context.profile_name,
        context.conditions_text.as_deref().unwrap_or("No information yet"),
        context
            .weight
            .map(|w| w.to_string())
            .unwrap_or_else(|| "unknown".to_string()),
    );
    let listed = conditions_list(&context.conditions_json);
    if !listed.is_empty() {
        profile.push_str(&format!("- Specific conditions: {}\n", listed.join(", ")));
    }

    format!(
        "You are a health and nutrition advisor. Your tasks:\n\n\
         1. FOOD ADVICE:\n\
         \x20  - Use your own expertise to advise on foods\n\
         \x20  - Base the advice on the user's specific health situation\n\
         \x20  - Only call search_food_database for specialty or regional foods you are unsure about\n\
         \x20  - Say whether to eat it, how much, and how to prepare it\n\n\
         2. HEALTH UPDATES:\n\
         \x20  - When the user reveals new health information (\"I have diabetes\", \"I gained 2kg\", \"my blood pressure is high\"), call update_health_status\n\
         \x20  - Pass new_conditions, condition_text_update and weight_delta_kg or new_weight_kg as appropriate\n\
         \x20  - Examples:\n\
         \x20    + \"I have diabetes\" -> update_health_status({{\"new_conditions\": [\"diabetes\"], \"condition_text_update\": \"User reports diabetes\"}})\n\
         \x20    + \"I gained 2kg this month\" -> update_health_status({{\"weight_delta_kg\": 2, \"condition_text_update\": \"Gained 2kg this month\"}})\n\n\
         3. PRINCIPLES:\n\
         \x20  - Health safety comes first\n\
         \x20  - Give concrete, practical advice\n\
         \x20  - Recommend seeing a doctor when needed\n\n\
         {profile}\n\
         Answer professionally and kindly, grounded in scientific evidence. Always reply in {language}."
    )
}

/// Advice given when the AI backend cannot answer
pub fn fallback_advice(conditions_text: Option<&str>) -> String {
    let conditions = conditions_text
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .unwrap_or("no specific information yet");

    format!(
        "The AI service is not reachable right now. Here is basic advice based on your current profile.\n\
         - Health conditions: {conditions}.\n\
         - For food questions, prefer a varied diet with plenty of vegetables and limit refined sugar and fried food.\n\
         - With a chronic condition (for example diabetes or high blood pressure), check with your doctor before changing your diet.\n\
         Please configure AZURE_OPENAI_ENDPOINT and AZURE_OPENAI_API_KEY for more detailed advice."
    )
}

fn conditions_list(conditions: &Value) -> Vec<String> {
    conditions
        .get("conditions_list")
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(Value::as_str).map(str::to_string).collect())
        .unwrap_or_default()
}

/// A JSON number, or a string holding one
fn number(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

struct ProfileSnapshot {
    conditions_text: Option<String>,
    conditions_json: Value,
    weight: Option<f64>,
}

/// Runs the chat tools against one profile
///
/// Keeps the profile state it last wrote so that several updates in one
/// turn build on each other.
pub struct ProfileToolExecutor {
    foods: Arc<dyn FoodRepositoryTrait>,
    profiles: Arc<dyn HealthProfileRepositoryTrait>,
    profile_id: i64,
    user_id: i64,
    snapshot: Mutex<ProfileSnapshot>,
}

impl ProfileToolExecutor {
    pub fn new(
        foods: Arc<dyn FoodRepositoryTrait>,
        profiles: Arc<dyn HealthProfileRepositoryTrait>,
        context: &ChatSessionContext,
    ) -> Self {
        Self {
            foods,
            profiles,
            profile_id: context.health_profile_id,
            user_id: context.user_id,
            snapshot: Mutex::new(ProfileSnapshot {
                conditions_text: context.conditions_text.clone(),
                conditions_json: context.conditions_json.clone(),
                weight: context.weight,
            }),
        }
    }

    async fn search_food(&self, arguments: &Value) -> Value {
        let name = arguments
            .get("food_name")
            .and_then(Value::as_str)
            .map(str::trim)
            .unwrap_or_default();
        if name.is_empty() {
            return json!({ "error": "food_name is required" });
        }

        match self.foods.search_by_name(name, 5).await {
            Ok(foods) => match foods.into_iter().next() {
                Some(food) => json!({
                    "name": food.name,
                    "category": food.category,
                    "nutrients": food.nutrients,
                    "contraindications": food.contraindications,
                    "recommended_portions": food.recommended_portions,
                    "preparation_notes": food.preparation_notes,
                }),
                None => json!({ "error": format!("No information found about {}", name) }),
            },
            Err(e) => {
                warn!("Food lookup failed: {}", e);
                json!({ "error": format!("Food lookup failed: {}", e) })
            }
        }
    }

    async fn update_health_status(&self, arguments: &Value) -> Value {
        let mut snapshot = self.snapshot.lock().await;

        let mut conditions = conditions_list(&snapshot.conditions_json);
        if let Some(new_conditions) = arguments.get("new_conditions").and_then(Value::as_array) {
            for condition in new_conditions.iter().filter_map(Value::as_str).map(str::trim) {
                if !condition.is_empty() && !conditions.iter().any(|c| c == condition) {
                    conditions.push(condition.to_string());
                }
            }
        }

        let mut conditions_json = if snapshot.conditions_json.is_object() {
            snapshot.conditions_json.clone()
        } else {
            json!({})
        };
        conditions_json["conditions_list"] = json!(conditions);

        let note = arguments
            .get("condition_text_update")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|note| !note.is_empty());
        let conditions_text = note.map(|note| match snapshot.conditions_text.as_deref() {
            Some(current) if !current.is_empty() => format!("{}\n{}", current, note),
            _ => note.to_string(),
        });

        let weight = match (number(arguments.get("new_weight_kg")), number(arguments.get("weight_delta_kg"))) {
            (Some(new_weight), _) => Some(new_weight),
            (None, Some(delta)) => snapshot.weight.map(|current| current + delta),
            (None, None) => None,
        };

        let changes = HealthProfileChanges {
            conditions_json: Some(conditions_json.clone()),
            conditions_text: conditions_text.clone(),
            weight,
            ..Default::default()
        };

        match self.profiles.update(self.profile_id, self.user_id, changes).await {
            Ok(Some(_)) => {
                snapshot.conditions_json = conditions_json;
                if conditions_text.is_some() {
                    snapshot.conditions_text = conditions_text;
                }
                if weight.is_some() {
                    snapshot.weight = weight;
                }
                info!("Assistant updated health status of profile {}", self.profile_id);
                json!({
                    "success": true,
                    "updated_conditions": conditions,
                    "new_weight": snapshot.weight,
                    "message": "Health status updated"
                })
            }
            Ok(None) => json!({ "success": false, "error": "Profile not found" }),
            Err(e) => {
                warn!("Health status update failed: {}", e);
                json!({ "success": false, "error": e.to_string() })
            }
        }
    }
}

#[async_trait]
impl ToolExecutor for ProfileToolExecutor {
    async fn execute(&self, name: &str, arguments: Value) -> Value {
        debug!("Executing tool {}", name);
        match name {
            "search_food_database" => self.search_food(&arguments).await,
            "update_health_status" => self.update_health_status(&arguments).await,
            other => json!({ "error": format!("Unknown function {}", other) }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{AiError, FunctionCall, MockChatModel, ToolCall};
    use health_food_data::database::DatabasePool;
    use health_food_data::models::NewFood;
    use health_food_data::repository::testing::{insert_profile, insert_user, test_pool};
    use health_food_data::repository::{ChatRepository, FoodRepository, HealthProfileRepository};

    struct Fixture {
        pool: DatabasePool,
        user_id: i64,
        profile_id: i64,
    }

    fn fixture() -> Fixture {
        let pool = test_pool();
        let user_id = insert_user(&pool, "lan@example.com");
        let profile_id = insert_profile(&pool, user_id, "Grandma");
        Fixture {
            pool,
            user_id,
            profile_id,
        }
    }

    fn service(fixture: &Fixture, model: MockChatModel) -> ChatService {
        ChatService::new(
            Arc::new(ChatRepository::new(fixture.pool.clone())),
            Arc::new(HealthProfileRepository::new(fixture.pool.clone())),
            Arc::new(FoodRepository::new(fixture.pool.clone())),
            Arc::new(model),
            "English".to_string(),
        )
    }

    fn tool_call(name: &str, arguments: Value) -> ChatMessage {
        ChatMessage {
            role: "assistant".to_string(),
            content: None,
            tool_calls: vec![ToolCall {
                id: "call_1".to_string(),
                kind: "function".to_string(),
                function: FunctionCall {
                    name: name.to_string(),
                    arguments: arguments.to_string(),
                },
            }],
            tool_call_id: None,
            name: None,
        }
    }

    fn text(content: &str) -> OutgoingMessage {
        OutgoingMessage {
            content: content.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn reply_is_stored_after_user_message() {
        let fixture = fixture();
        let mut model = MockChatModel::new();
        model
            .expect_complete()
            .times(1)
            .withf(|request| {
                request.messages[0].text().contains("Profile: Grandma") && request.messages.len() == 2
            })
            .returning(|_| Ok(ChatMessage::assistant("Eat brown rice in small portions.")));
        let chat = service(&fixture, model);

        let session = chat.create_session(fixture.profile_id, fixture.user_id, None).await.unwrap();
        let reply = chat.send_message(session.id, fixture.user_id, text("Can I eat rice?")).await.unwrap();
        assert_eq!(reply.ai_response, "Eat brown rice in small portions.");

        let messages = chat.list_messages(session.id, fixture.user_id).await.unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, ChatRole::User);
        assert_eq!(messages[1].role, ChatRole::Assistant);
    }

    #[tokio::test]
    async fn history_excludes_the_current_message() {
        let fixture = fixture();
        let mut model = MockChatModel::new();
        let mut seq = mockall::Sequence::new();
        model
            .expect_complete()
            .times(1)
            .in_sequence(&mut seq)
            .withf(|request| request.messages.len() == 2)
            .returning(|_| Ok(ChatMessage::assistant("first answer")));
        model
            .expect_complete()
            .times(1)
            .in_sequence(&mut seq)
            .withf(|request| {
                request.messages.len() == 4
                    && request.messages[1].text() == "first question"
                    && request.messages[2].text() == "first answer"
                    && request.messages[3].text() == "second question"
            })
            .returning(|_| Ok(ChatMessage::assistant("second answer")));
        let chat = service(&fixture, model);

        let session = chat.create_session(fixture.profile_id, fixture.user_id, None).await.unwrap();
        chat.send_message(session.id, fixture.user_id, text("first question")).await.unwrap();
        let reply = chat.send_message(session.id, fixture.user_id, text("second question")).await.unwrap();
        assert_eq!(reply.ai_response, "second answer");
    }

    #[tokio::test]
    async fn offline_model_gives_fallback_advice() {
        let fixture = fixture();
        let mut model = MockChatModel::new();
        model.expect_complete().returning(|_| Err(AiError::NotConfigured));
        let chat = service(&fixture, model);

        let session = chat.create_session(fixture.profile_id, fixture.user_id, None).await.unwrap();
        let reply = chat.send_message(session.id, fixture.user_id, text("Is durian ok?")).await.unwrap();

        assert!(reply.ai_response.contains("no specific information yet"));
        assert!(reply.ai_response.contains("AZURE_OPENAI_ENDPOINT"));
    }

    #[tokio::test]
    async fn image_message_sends_data_url() {
        let fixture = fixture();
        let mut model = MockChatModel::new();
        model
            .expect_complete()
            .times(1)
            .withf(|request| {
                let last = serde_json::to_value(request.messages.last().unwrap()).unwrap();
                last["content"][0]["text"] == DEFAULT_IMAGE_PROMPT
                    && last["content"][1]["image_url"]["url"] == "data:image/jpeg;base64,QUJD"
            })
            .returning(|_| Ok(ChatMessage::assistant("That is pho.")));
        let chat = service(&fixture, model);

        let session = chat.create_session(fixture.profile_id, fixture.user_id, None).await.unwrap();
        chat.send_message(
            session.id,
            fixture.user_id,
            OutgoingMessage {
                content: String::new(),
                message_type: MessageType::Image,
                image_data: Some("QUJD".to_string()),
            },
        )
        .await
        .unwrap();

        let messages = chat.list_messages(session.id, fixture.user_id).await.unwrap();
        assert_eq!(messages[0].metadata["has_image"], json!(true));
        assert_eq!(messages[0].message_type, MessageType::Image);
    }

    #[tokio::test]
    async fn empty_text_is_rejected() {
        let fixture = fixture();
        let chat = service(&fixture, MockChatModel::new());
        let session = chat.create_session(fixture.profile_id, fixture.user_id, None).await.unwrap();

        let err = chat.send_message(session.id, fixture.user_id, text("   ")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[tokio::test]
    async fn session_list_is_capped_at_ten() {
        let fixture = fixture();
        let chat = service(&fixture, MockChatModel::new());
        for i in 0..12 {
            chat.create_session(fixture.profile_id, fixture.user_id, Some(format!("Chat {}", i)))
                .await
                .unwrap();
        }

        let sessions = chat.list_sessions(fixture.profile_id, fixture.user_id).await.unwrap();
        assert_eq!(sessions.len(), 10);
    }

    #[tokio::test]
    async fn foreign_session_is_not_found() {
        let fixture = fixture();
        let stranger = insert_user(&fixture.pool, "stranger@example.com");
        let chat = service(&fixture, MockChatModel::new());
        let session = chat.create_session(fixture.profile_id, fixture.user_id, None).await.unwrap();

        assert!(matches!(
            chat.send_message(session.id, stranger, text("hi")).await,
            Err(ServiceError::NotFound(_))
        ));
        assert!(matches!(
            chat.list_messages(session.id, stranger).await,
            Err(ServiceError::NotFound(_))
        ));
        assert!(matches!(
            chat.list_sessions(fixture.profile_id, stranger).await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn update_tool_persists_conditions_and_weight() {
        let fixture = fixture();
        let mut model = MockChatModel::new();
        let mut seq = mockall::Sequence::new();
        model
            .expect_complete()
            .times(1)
            .in_sequence(&mut seq)
            .withf(|request| request.messages.len() == 2)
            .returning(|_| {
                Ok(tool_call(
                    "update_health_status",
                    json!({
                        "new_conditions": ["diabetes"],
                        "condition_text_update": "User reports diabetes",
                        "new_weight_kg": 58
                    }),
                ))
            });
        model
            .expect_complete()
            .times(1)
            .in_sequence(&mut seq)
            .withf(|request| request.messages.last().map(|m| m.role.as_str()) == Some("tool"))
            .returning(|_| Ok(ChatMessage::assistant("Noted, I updated your profile.")));
        let chat = service(&fixture, model);

        let session = chat.create_session(fixture.profile_id, fixture.user_id, None).await.unwrap();
        chat.send_message(session.id, fixture.user_id, text("I have diabetes and weigh 58kg"))
            .await
            .unwrap();

        let profile = HealthProfileRepository::new(fixture.pool.clone())
            .get_for_user(fixture.profile_id, fixture.user_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(profile.conditions_json["conditions_list"], json!(["diabetes"]));
        assert_eq!(profile.conditions_text.as_deref(), Some("User reports diabetes"));
        assert_eq!(profile.weight, Some(58.0));
    }

    #[tokio::test]
    async fn weight_delta_needs_a_known_weight() {
        let fixture = fixture();
        let context = ChatSessionContext {
            session_id: 1,
            health_profile_id: fixture.profile_id,
            user_id: fixture.user_id,
            profile_name: "Grandma".to_string(),
            conditions_text: Some("gout".to_string()),
            conditions_json: json!({"conditions_list": ["gout"]}),
            weight: Some(60.0),
            height: None,
        };
        let executor = ProfileToolExecutor::new(
            Arc::new(FoodRepository::new(fixture.pool.clone())),
            Arc::new(HealthProfileRepository::new(fixture.pool.clone())),
            &context,
        );

        let first = executor
            .execute(
                "update_health_status",
                json!({"new_conditions": ["gout", "anemia"], "weight_delta_kg": -1.5}),
            )
            .await;
        assert_eq!(first["updated_conditions"], json!(["gout", "anemia"]));
        assert_eq!(first["new_weight"], json!(58.5));

        let second = executor
            .execute("update_health_status", json!({"condition_text_update": "Feeling better"}))
            .await;
        assert_eq!(second["new_weight"], json!(58.5));

        let profile = HealthProfileRepository::new(fixture.pool.clone())
            .get_for_user(fixture.profile_id, fixture.user_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(profile.conditions_text.as_deref(), Some("gout\nFeeling better"));
    }

    #[tokio::test]
    async fn food_search_returns_first_match() {
        let fixture = fixture();
        FoodRepository::new(fixture.pool.clone())
            .create(NewFood {
                name: "Bitter melon".to_string(),
                category: Some("Vegetable".to_string()),
                contraindications: Some(json!(["pregnancy"])),
                ..Default::default()
            })
            .await
            .unwrap();
        let context = ChatSessionContext {
            session_id: 1,
            health_profile_id: fixture.profile_id,
            user_id: fixture.user_id,
            profile_name: "Grandma".to_string(),
            conditions_text: None,
            conditions_json: json!({}),
            weight: None,
            height: None,
        };
        let executor = ProfileToolExecutor::new(
            Arc::new(FoodRepository::new(fixture.pool.clone())),
            Arc::new(HealthProfileRepository::new(fixture.pool.clone())),
            &context,
        );

        let found = executor.execute("search_food_database", json!({"food_name": "bitter"})).await;
        assert_eq!(found["name"], "Bitter melon");
        assert_eq!(found["contraindications"], json!(["pregnancy"]));

        let missing = executor.execute("search_food_database", json!({"food_name": "unobtainium"})).await;
        assert!(missing.get("error").is_some());

        let unknown = executor.execute("delete_everything", json!({})).await;
        assert!(unknown["error"].as_str().unwrap().contains("delete_everything"));
    }
}
