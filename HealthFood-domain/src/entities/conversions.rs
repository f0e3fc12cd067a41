//! Conversions from data-layer records to domain entities.
//!
//! Named `convert_to_domain_<entity>`, one per record type.

use health_food_data::models::{
    ActivityLogRecord, ChatMessageRecord, ChatSessionRecord, DocumentRecord, DocumentSummary, FoodRecord,
    HealthPlanRecord, HealthProfileRecord, MealLogRecord, PlanActivityRecord, PlanMealRecord, SystemStats,
    UserStats,
};

use super::chat::{ChatSession, ConversationMessage};
use super::document::{Document, DocumentListItem};
use super::food::Food;
use super::plan::{ActivityLog, HealthPlan, MealLog, PlanActivity, PlanMeal};
use super::profile::HealthProfile;
use super::stats::{SystemStatistics, UserStatistics};

pub fn convert_to_domain_profile(record: HealthProfileRecord) -> HealthProfile {
    HealthProfile {
        id: record.id,
        user_id: record.user_id,
        profile_name: record.profile_name,
        age: record.age,
        gender: record.gender,
        weight: record.weight,
        height: record.height,
        conditions_text: record.conditions_text,
        conditions_json: record.conditions_json,
        is_default: record.is_default,
        created_at: record.created_at,
        updated_at: record.updated_at,
    }
}

pub fn convert_to_domain_document(record: DocumentRecord) -> Document {
    Document {
        id: record.id,
        health_profile_id: record.health_profile_id,
        filename: record.filename,
        original_content: record.original_content,
        ai_summary: record.ai_summary,
        file_type: record.file_type,
        file_size: record.file_size,
        uploaded_at: record.uploaded_at,
    }
}

pub fn convert_to_domain_document_item(summary: DocumentSummary) -> DocumentListItem {
    DocumentListItem {
        id: summary.id,
        filename: summary.filename,
        ai_summary: summary.ai_summary,
        file_size: summary.file_size,
        uploaded_at: summary.uploaded_at,
    }
}

pub fn convert_to_domain_session(record: ChatSessionRecord) -> ChatSession {
    ChatSession {
        id: record.id,
        health_profile_id: record.health_profile_id,
        session_name: record.session_name,
        started_at: record.started_at,
        last_message_at: record.last_message_at,
        message_count: record.message_count,
    }
}

pub fn convert_to_domain_message(record: ChatMessageRecord) -> ConversationMessage {
    ConversationMessage {
        id: record.id,
        session_id: record.session_id,
        role: record.role,
        content: record.content,
        message_type: record.message_type,
        metadata: record.metadata,
        created_at: record.created_at,
    }
}

pub fn convert_to_domain_food(record: FoodRecord) -> Food {
    Food {
        id: record.id,
        name: record.name,
        category: record.category,
        subcategory: record.subcategory,
        nutrients: record.nutrients,
        contraindications: record.contraindications,
        benefits: record.benefits,
        recommended_portions: record.recommended_portions,
        preparation_notes: record.preparation_notes,
        source_reliability: record.source_reliability,
        created_by: record.created_by,
        created_at: record.created_at,
        updated_at: record.updated_at,
    }
}

/// Plan view; the AI analysis is kept only when `with_analysis` is set
pub fn convert_to_domain_plan(record: HealthPlanRecord, with_analysis: bool) -> HealthPlan {
    HealthPlan {
        id: record.id,
        health_profile_id: record.health_profile_id,
        title: record.title,
        goal_type: record.goal_type,
        target_value: record.target_value,
        target_unit: record.target_unit,
        duration_days: record.duration_days,
        start_date: record.start_date,
        end_date: record.end_date,
        status: record.status,
        available_activities: record.available_activities,
        dietary_restrictions: record.dietary_restrictions,
        notes: record.notes,
        ai_analysis: with_analysis.then_some(record.ai_analysis),
        created_at: record.created_at,
        updated_at: record.updated_at,
    }
}

pub fn convert_to_domain_activity(record: PlanActivityRecord) -> PlanActivity {
    PlanActivity {
        id: record.id,
        health_plan_id: record.health_plan_id,
        date: record.date,
        activity_type: record.activity_type,
        activity_name: record.activity_name,
        duration_minutes: record.duration_minutes,
        intensity: record.intensity,
        calories_target: record.calories_target,
        instructions: record.instructions,
        is_completed: record.is_completed,
        completed_at: record.completed_at,
        activity_log_id: record.activity_log_id,
    }
}

pub fn convert_to_domain_meal(record: PlanMealRecord) -> PlanMeal {
    PlanMeal {
        id: record.id,
        health_plan_id: record.health_plan_id,
        date: record.date,
        meal_type: record.meal_type,
        food_items: record.food_items,
        total_calories: record.total_calories,
        macros: record.macros,
        preparation_notes: record.preparation_notes,
        is_completed: record.is_completed,
        completed_at: record.completed_at,
    }
}

pub fn convert_to_domain_activity_log(record: ActivityLogRecord) -> ActivityLog {
    ActivityLog {
        id: record.id,
        health_profile_id: record.health_profile_id,
        date: record.date,
        activity_type: record.activity_type,
        activity_name: record.activity_name,
        duration_minutes: record.duration_minutes,
        intensity: record.intensity,
        calories_burned: record.calories_burned,
        notes: record.notes,
        plan_activity_id: record.plan_activity_id,
        created_at: record.created_at,
    }
}

pub fn convert_to_domain_meal_log(record: MealLogRecord) -> MealLog {
    MealLog {
        id: record.id,
        health_profile_id: record.health_profile_id,
        date: record.date,
        meal_type: record.meal_type,
        food_items: record.food_items,
        total_calories: record.total_calories,
        notes: record.notes,
        created_at: record.created_at,
    }
}

pub fn convert_to_domain_system_stats(stats: SystemStats) -> SystemStatistics {
    SystemStatistics {
        users: stats.users,
        health_profiles: stats.health_profiles,
        documents: stats.documents,
        foods: stats.foods,
        chat_sessions: stats.chat_sessions,
        chat_messages: stats.chat_messages,
        health_plans: stats.health_plans,
    }
}

pub fn convert_to_domain_user_stats(stats: UserStats) -> UserStatistics {
    UserStatistics {
        profiles: stats.profiles,
        documents: stats.documents,
        chat_sessions: stats.chat_sessions,
        health_plans: stats.health_plans,
    }
}
