use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::handlers;

/// Configure Swagger UI endpoints
pub fn configure_swagger_routes() -> SwaggerUi {
    SwaggerUi::new("/api-docs").url("/api-docs/openapi.json", ApiDoc::openapi())
}

/// Registers the bearer JWT scheme referenced by `security(("bearer" = []))`
struct BearerSecurity;

impl Modify for BearerSecurity {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

// API Documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health::health_check,

        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::logout,
        handlers::auth::me,
        handlers::auth::my_stats,

        handlers::profiles::list_profiles,
        handlers::profiles::create_profile,
        handlers::profiles::get_profile,
        handlers::profiles::update_profile,
        handlers::profiles::delete_profile,

        handlers::documents::upload_document,
        handlers::documents::list_documents,
        handlers::documents::get_document,

        handlers::chat::list_sessions,
        handlers::chat::create_session,
        handlers::chat::list_messages,
        handlers::chat::send_message,

        handlers::foods::list_foods,
        handlers::foods::get_food,
        handlers::foods::create_food,
        handlers::foods::update_food,
        handlers::foods::delete_food,
        handlers::foods::system_stats,

        handlers::plans::create_plan,
        handlers::plans::list_plans,
        handlers::plans::get_plan,
        handlers::plans::update_plan_status,
        handlers::plans::delete_plan,
        handlers::plans::adjust_plan,
        handlers::plans::daily_summary,
        handlers::plans::list_activities,
        handlers::plans::update_activity,
        handlers::plans::update_meal,

        handlers::logs::create_activity_log,
        handlers::logs::list_activity_logs,
        handlers::logs::delete_activity_log,
        handlers::logs::create_meal_log,
        handlers::logs::list_meal_logs,
        handlers::logs::delete_meal_log,
        handlers::logs::auto_match_activities,

        handlers::speech::text_to_speech,
        handlers::speech::speech_to_text,
        handlers::speech::speech_status,
    ),
    components(
        schemas(
            // Request payloads
            crate::entities::common::ErrorResponse,
            crate::entities::common::MessageResponse,
            crate::entities::auth::PublicRegistrationRequest,
            crate::entities::auth::PublicLoginRequest,
            crate::entities::profiles::PublicProfileRequest,
            crate::entities::profiles::PublicProfileUpdateRequest,
            crate::entities::chat::PublicCreateSessionRequest,
            crate::entities::chat::PublicChatMessageRequest,
            crate::entities::foods::PublicFoodRequest,
            crate::entities::plans::PublicPlanRequest,
            crate::entities::plans::PlanStatusRequest,
            crate::entities::plans::PublicActivityUpdateRequest,
            crate::entities::plans::MealCompletionRequest,
            crate::entities::plans::AdjustPlanRequest,
            crate::entities::plans::PublicActivityLogRequest,
            crate::entities::plans::PublicMealLogRequest,
            crate::entities::documents::DocumentUploadForm,
            crate::entities::speech::SpeechToTextForm,
            crate::entities::speech::TextToSpeechRequest,
            crate::entities::speech::TextToSpeechResponse,
            crate::entities::speech::SpeechToTextResponse,
            crate::entities::speech::SpeechStatusResponse,

            // Health
            handlers::health::HealthResponse,
            handlers::health::ComponentHealthStatus,

            // Domain responses
            health_food_domain::entities::AccountUser,
            health_food_domain::entities::AuthSession,
            health_food_domain::entities::AccountOverview,
            health_food_domain::entities::HealthProfile,
            health_food_domain::entities::UploadedDocument,
            health_food_domain::entities::Document,
            health_food_domain::entities::DocumentListItem,
            health_food_domain::entities::ChatSession,
            health_food_domain::entities::ConversationMessage,
            health_food_domain::entities::ChatReply,
            health_food_domain::entities::Food,
            health_food_domain::entities::PlanAnalysis,
            health_food_domain::entities::WeeklyTarget,
            health_food_domain::entities::ExerciseRecommendation,
            health_food_domain::entities::NutritionGuidelines,
            health_food_domain::entities::Macros,
            health_food_domain::entities::CreatedPlan,
            health_food_domain::entities::HealthPlan,
            health_food_domain::entities::PlanActivity,
            health_food_domain::entities::PlanMeal,
            health_food_domain::entities::DailySummary,
            health_food_domain::entities::AdjustmentAnalysis,
            health_food_domain::entities::AdjustedActivity,
            health_food_domain::entities::AdjustedDay,
            health_food_domain::entities::AdjustmentResult,
            health_food_domain::entities::ActivityLog,
            health_food_domain::entities::MealLog,
            health_food_domain::entities::AutoMatchResult,
            health_food_domain::entities::SystemStatistics,
            health_food_domain::entities::UserStatistics,
        )
    ),
    modifiers(&BearerSecurity),
    tags(
        (name = "health", description = "Service health"),
        (name = "auth", description = "Registration, login and the current account"),
        (name = "profiles", description = "Health profiles of an account"),
        (name = "documents", description = "Medical record uploads"),
        (name = "chat", description = "Nutrition chat with the assistant"),
        (name = "foods", description = "Food catalogue"),
        (name = "admin", description = "Administrator statistics"),
        (name = "health-plans", description = "Goal-based exercise and meal plans"),
        (name = "logs", description = "Activity and meal logs"),
        (name = "speech", description = "Text-to-speech and speech-to-text"),
    ),
    info(
        title = "HealthFood API",
        version = "0.1.0",
        description = "Health food chatbot: profiles, medical records, AI nutrition chat and health plans",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        ),
    ),
    servers(
        (url = "/", description = "Local development server")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_doc_generation() {
        let openapi = ApiDoc::openapi();

        assert_eq!(openapi.info.title, "HealthFood API");
        assert_eq!(openapi.info.version, "0.1.0");

        let tags = openapi.tags.as_ref().expect("tags");
        assert!(tags.iter().any(|tag| tag.name == "health-plans"));
        assert!(tags.iter().any(|tag| tag.name == "speech"));

        let paths = &openapi.paths.paths;
        assert!(paths.contains_key("/api/health"));
        assert!(paths.contains_key("/api/profiles/{profile_id}/chats"));
        assert!(paths.contains_key("/api/health-plans/{plan_id}/daily/{date}"));
        assert!(paths.contains_key("/api/profiles/{profile_id}/auto-match-activities"));
    }

    #[test]
    fn test_uploads_are_documented_as_multipart() {
        use utoipa::openapi::PathItemType;

        let openapi = ApiDoc::openapi();
        for path in ["/api/profiles/{profile_id}/documents", "/api/speech/stt"] {
            let body = openapi.paths.paths[path].operations[&PathItemType::Post]
                .request_body
                .as_ref()
                .expect("request body");
            assert!(body.content.contains_key("multipart/form-data"), "{}", path);
        }

        let schemas = openapi.components.expect("components").schemas;
        assert!(schemas.contains_key("DocumentUploadForm"));
        assert!(schemas.contains_key("SpeechToTextForm"));
    }

    #[test]
    fn test_bearer_scheme_registered() {
        let openapi = ApiDoc::openapi();
        let components = openapi.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer"));
    }
}
