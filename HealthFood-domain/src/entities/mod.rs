// Domain entities and value objects
pub mod account;
pub mod chat;
pub mod conversions;
pub mod document;
pub mod food;
pub mod plan;
pub mod profile;
pub mod stats;

// Re-export common types for easier imports
pub use account::{AccountOverview, AccountUser, AuthSession, Registration};
pub use chat::{ChatReply, ChatRole, ChatSession, ConversationMessage, MessageType, OutgoingMessage};
pub use document::{Document, DocumentListItem, DocumentUpload, UploadedDocument};
pub use food::{Food, FoodInput, FoodQuery, FoodUpdate};
pub use plan::{
    ActivityLog, ActivityLogInput, ActivityUpdate, AdjustedActivity, AdjustedDay, AdjustmentAnalysis,
    AdjustmentResult, AutoMatchResult, CreatedPlan, DailySummary, ExerciseRecommendation, HealthPlan, Macros,
    MealLog, MealLogInput, NutritionGuidelines, PlanActivity, PlanAnalysis, PlanMeal, PlanRequest, PlanStatus,
    WeeklyTarget,
};
pub use profile::{HealthProfile, ProfileInput, ProfileUpdate};
pub use stats::{SystemStatistics, UserStatistics};
