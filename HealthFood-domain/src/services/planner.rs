use std::sync::Arc;

use chrono::{Duration, NaiveDate, Utc};
use serde_json::{json, Value};
use tracing::{info, warn};
use validator::Validate;

use health_food_data::models::{
    HealthPlanRecord, HealthProfileRecord, NewActivityLog, NewHealthPlan, NewMealLog, PlanActivityChanges,
};
use health_food_data::repository::{HealthPlanRepositoryTrait, HealthProfileRepositoryTrait, LogRepositoryTrait};

use crate::ai::prompts::parse_json_object;
use crate::ai::{ChatMessage, ChatModel, CompletionRequest};
use crate::entities::conversions::{
    convert_to_domain_activity, convert_to_domain_activity_log, convert_to_domain_meal, convert_to_domain_meal_log,
    convert_to_domain_plan,
};
use crate::entities::{
    ActivityLog, ActivityLogInput, ActivityUpdate, AdjustmentResult, AutoMatchResult, CreatedPlan, DailySummary,
    HealthPlan, MealLog, MealLogInput, PlanActivity, PlanAnalysis, PlanMeal, PlanRequest, PlanStatus,
};
use crate::errors::{ServiceError, ServiceResult};

use super::owned_profile;
use super::schedule::{
    adjusted_rows, adjusted_schedule, analyze_deviation, build_schedule, estimate_calories_burned,
    fallback_analysis, format_date, plan_end_date, DATE_FORMAT,
};

pub const DEFAULT_ADJUSTMENT_DAYS: i64 = 7;
pub const DEFAULT_LOG_LIMIT: u32 = 20;
pub const MAX_LOG_LIMIT: u32 = 100;
pub const DEFAULT_MATCH_DAYS: i64 = 14;

const LOOKBACK_DAYS: i64 = 7;

/// AI-generated diet and exercise plans, and the logs they are checked against
#[derive(Clone)]
pub struct HealthPlanService {
    plans: Arc<dyn HealthPlanRepositoryTrait>,
    logs: Arc<dyn LogRepositoryTrait>,
    profiles: Arc<dyn HealthProfileRepositoryTrait>,
    model: Arc<dyn ChatModel>,
    language: String,
}

impl HealthPlanService {
    pub fn new(
        plans: Arc<dyn HealthPlanRepositoryTrait>,
        logs: Arc<dyn LogRepositoryTrait>,
        profiles: Arc<dyn HealthProfileRepositoryTrait>,
        model: Arc<dyn ChatModel>,
        language: String,
    ) -> Self {
        Self {
            plans,
            logs,
            profiles,
            model,
            language,
        }
    }

    /// Analyze the goal, lay out the schedule and store both
    pub async fn create_plan(&self, profile_id: i64, user_id: i64, request: PlanRequest) -> ServiceResult<CreatedPlan> {
        request.validate()?;
        if request.target_value <= 0.0 {
            return Err(ServiceError::Validation("target_value: Target value must be positive".to_string()));
        }

        let end_date = plan_end_date(request.start_date, request.duration_days)
            .ok_or_else(|| ServiceError::Validation("start_date: Plan would end after the last supported date".to_string()))?;

        let profile = owned_profile(self.profiles.as_ref(), profile_id, user_id).await?;
        let analysis = self.analyze(&profile, &request).await;

        let (activities, meals) = build_schedule(request.start_date, request.duration_days, &analysis);
        let activity_count = activities.len();

        let plan = self
            .plans
            .create_with_schedule(
                NewHealthPlan {
                    health_profile_id: profile_id,
                    title: request.title.trim().to_string(),
                    goal_type: request.goal_type,
                    target_value: request.target_value,
                    target_unit: request.target_unit,
                    duration_days: request.duration_days,
                    start_date: format_date(request.start_date),
                    end_date: format_date(end_date),
                    available_activities: json!(request.available_activities),
                    dietary_restrictions: json!(request.dietary_restrictions),
                    ai_analysis: json!(analysis),
                    notes: request.notes,
                },
                activities,
                meals,
            )
            .await?;

        info!(
            "Created plan {} for profile {} with {} activities",
            plan.id, profile_id, activity_count
        );
        Ok(CreatedPlan {
            plan_id: plan.id,
            ai_analysis: analysis,
        })
    }

    pub async fn list_plans(&self, profile_id: i64, user_id: i64, status: Option<PlanStatus>) -> ServiceResult<Vec<HealthPlan>> {
        owned_profile(self.profiles.as_ref(), profile_id, user_id).await?;
        let plans = self.plans.list_for_profile(profile_id, status).await?;
        Ok(plans.into_iter().map(|plan| convert_to_domain_plan(plan, false)).collect())
    }

    pub async fn get_plan(&self, profile_id: i64, plan_id: i64, user_id: i64) -> ServiceResult<HealthPlan> {
        let plan = self.profile_plan(profile_id, plan_id, user_id).await?;
        Ok(convert_to_domain_plan(plan, true))
    }

    pub async fn update_status(
        &self,
        profile_id: i64,
        plan_id: i64,
        user_id: i64,
        status: PlanStatus,
    ) -> ServiceResult<HealthPlan> {
        self.profile_plan(profile_id, plan_id, user_id).await?;
        let plan = self
            .plans
            .update_status(plan_id, status)
            .await?
            .ok_or_else(plan_not_found)?;
        Ok(convert_to_domain_plan(plan, false))
    }

    pub async fn delete_plan(&self, profile_id: i64, plan_id: i64, user_id: i64) -> ServiceResult<()> {
        self.profile_plan(profile_id, plan_id, user_id).await?;
        if !self.plans.delete(plan_id).await? {
            return Err(plan_not_found());
        }
        Ok(())
    }

    /// Everything scheduled on one day of a plan
    pub async fn daily_summary(&self, plan_id: i64, user_id: i64, date: NaiveDate) -> ServiceResult<DailySummary> {
        self.user_plan(plan_id, user_id).await?;
        let day = format_date(date);

        let activities: Vec<PlanActivity> = self
            .plans
            .list_activities(plan_id, Some(&day))
            .await?
            .into_iter()
            .map(convert_to_domain_activity)
            .collect();
        let meals: Vec<PlanMeal> = self
            .plans
            .list_meals(plan_id, Some(&day))
            .await?
            .into_iter()
            .map(convert_to_domain_meal)
            .collect();

        let total = activities.len() + meals.len();
        let completed = activities.iter().filter(|a| a.is_completed).count() + meals.iter().filter(|m| m.is_completed).count();
        let completion_rate = if total == 0 {
            0.0
        } else {
            completed as f64 / total as f64 * 100.0
        };

        Ok(DailySummary {
            plan_id,
            date: day,
            total_calories_target: meals.iter().filter_map(|m| m.total_calories).sum(),
            total_burn_target: activities.iter().filter_map(|a| a.calories_target).sum(),
            completion_rate,
            activities,
            meals,
        })
    }

    pub async fn list_activities(&self, plan_id: i64, user_id: i64, date: Option<NaiveDate>) -> ServiceResult<Vec<PlanActivity>> {
        self.user_plan(plan_id, user_id).await?;
        let day = date.map(format_date);
        let activities = self.plans.list_activities(plan_id, day.as_deref()).await?;
        Ok(activities.into_iter().map(convert_to_domain_activity).collect())
    }

    pub async fn update_activity(
        &self,
        plan_id: i64,
        activity_id: i64,
        user_id: i64,
        update: ActivityUpdate,
    ) -> ServiceResult<PlanActivity> {
        self.user_plan(plan_id, user_id).await?;
        if update.duration_minutes.is_some_and(|minutes| minutes <= 0) {
            return Err(ServiceError::Validation("duration_minutes: Duration must be positive".to_string()));
        }

        let changes = PlanActivityChanges {
            activity_type: update.activity_type,
            activity_name: update.activity_name,
            duration_minutes: update.duration_minutes,
            is_completed: update.is_completed,
        };
        self.plans
            .update_activity(plan_id, activity_id, changes)
            .await?
            .map(convert_to_domain_activity)
            .ok_or_else(|| ServiceError::NotFound("Activity not found".to_string()))
    }

    pub async fn set_meal_completed(&self, plan_id: i64, meal_id: i64, user_id: i64, completed: bool) -> ServiceResult<PlanMeal> {
        self.user_plan(plan_id, user_id).await?;
        self.plans
            .set_meal_completed(plan_id, meal_id, completed)
            .await?
            .map(convert_to_domain_meal)
            .ok_or_else(|| ServiceError::NotFound("Meal not found".to_string()))
    }

    /// Rescale upcoming exercise from how the previous week went
    ///
    /// Pending activities from `target_date` on are replaced; completed ones
    /// are kept.
    pub async fn adjust_plan(
        &self,
        profile_id: i64,
        plan_id: i64,
        user_id: i64,
        target_date: NaiveDate,
        adjustment_days: Option<i64>,
    ) -> ServiceResult<AdjustmentResult> {
        let days = adjustment_days.unwrap_or(DEFAULT_ADJUSTMENT_DAYS);
        if !(1..=30).contains(&days) {
            return Err(ServiceError::Validation(
                "adjustment_days: Adjustment must cover 1 to 30 days".to_string(),
            ));
        }

        let (window_start, window_end) = target_date
            .checked_sub_signed(Duration::days(LOOKBACK_DAYS))
            .zip(target_date.pred_opt())
            .ok_or_else(|| ServiceError::Validation("target_date: Date is out of range".to_string()))?;

        let plan = self.profile_plan(profile_id, plan_id, user_id).await?;

        let (from, until) = (format_date(window_start), format_date(target_date));
        let planned_meals = self.plans.meals_between(plan_id, &from, &until).await?;
        let planned_activities = self.plans.activities_between(plan_id, &from, &until).await?;
        let consumed = self.logs.meal_calories_between(profile_id, &from, &until).await?;

        let analysis = analyze_deviation(
            window_start,
            window_end,
            &planned_meals,
            consumed,
            &planned_activities,
        );

        let recommendations = stored_analysis(&plan).exercise_recommendations;
        let plan_range = (
            NaiveDate::parse_from_str(&plan.start_date, DATE_FORMAT).unwrap_or(NaiveDate::MIN),
            NaiveDate::parse_from_str(&plan.end_date, DATE_FORMAT).unwrap_or(NaiveDate::MAX),
        );
        let schedule = adjusted_schedule(target_date, days, plan_range, &recommendations, analysis.exercise_multiplier);

        for day in &schedule {
            self.plans
                .replace_pending_activities(plan_id, &day.date, adjusted_rows(day))
                .await?;
        }

        info!(
            "Adjusted plan {} for {} days at {:.1}x",
            plan_id,
            schedule.len(),
            analysis.exercise_multiplier
        );
        Ok(AdjustmentResult {
            adjustment_analysis: analysis,
            adjusted_schedule: schedule,
            message: "Plan adjusted based on recent activity".to_string(),
        })
    }

    pub async fn create_activity_log(&self, profile_id: i64, user_id: i64, input: ActivityLogInput) -> ServiceResult<ActivityLog> {
        input.validate()?;
        owned_profile(self.profiles.as_ref(), profile_id, user_id).await?;

        let calories_burned = input
            .calories_burned
            .unwrap_or_else(|| estimate_calories_burned(input.intensity.as_deref(), input.duration_minutes));

        let log = self
            .logs
            .create_activity_log(NewActivityLog {
                health_profile_id: profile_id,
                date: format_date(input.date),
                activity_type: input.activity_type.trim().to_string(),
                activity_name: input.activity_name,
                duration_minutes: input.duration_minutes,
                intensity: input.intensity,
                calories_burned: Some(calories_burned),
                notes: input.notes,
            })
            .await?;
        Ok(convert_to_domain_activity_log(log))
    }

    pub async fn list_activity_logs(&self, profile_id: i64, user_id: i64, limit: Option<u32>) -> ServiceResult<Vec<ActivityLog>> {
        owned_profile(self.profiles.as_ref(), profile_id, user_id).await?;
        let logs = self.logs.list_activity_logs(profile_id, log_limit(limit)).await?;
        Ok(logs.into_iter().map(convert_to_domain_activity_log).collect())
    }

    pub async fn delete_activity_log(&self, profile_id: i64, user_id: i64, log_id: i64) -> ServiceResult<()> {
        owned_profile(self.profiles.as_ref(), profile_id, user_id).await?;
        if !self.logs.delete_activity_log(profile_id, log_id).await? {
            return Err(ServiceError::NotFound("Activity log not found".to_string()));
        }
        Ok(())
    }

    /// Store a meal; without a total the item calories are added up
    pub async fn create_meal_log(&self, profile_id: i64, user_id: i64, input: MealLogInput) -> ServiceResult<MealLog> {
        input.validate()?;
        owned_profile(self.profiles.as_ref(), profile_id, user_id).await?;

        let total_calories = input.total_calories.or_else(|| item_calories(&input.food_items));

        let log = self
            .logs
            .create_meal_log(NewMealLog {
                health_profile_id: profile_id,
                date: format_date(input.date),
                meal_type: input.meal_type.trim().to_string(),
                food_items: Value::Array(input.food_items),
                total_calories,
                notes: input.notes,
            })
            .await?;
        Ok(convert_to_domain_meal_log(log))
    }

    pub async fn list_meal_logs(&self, profile_id: i64, user_id: i64, limit: Option<u32>) -> ServiceResult<Vec<MealLog>> {
        owned_profile(self.profiles.as_ref(), profile_id, user_id).await?;
        let logs = self.logs.list_meal_logs(profile_id, log_limit(limit)).await?;
        Ok(logs.into_iter().map(convert_to_domain_meal_log).collect())
    }

    pub async fn delete_meal_log(&self, profile_id: i64, user_id: i64, log_id: i64) -> ServiceResult<()> {
        owned_profile(self.profiles.as_ref(), profile_id, user_id).await?;
        if !self.logs.delete_meal_log(profile_id, log_id).await? {
            return Err(ServiceError::NotFound("Meal log not found".to_string()));
        }
        Ok(())
    }

    /// Tick off plan activities that logged exercise already covers
    pub async fn auto_match_activities(&self, profile_id: i64, user_id: i64, days_back: Option<i64>) -> ServiceResult<AutoMatchResult> {
        let days_back = days_back.unwrap_or(DEFAULT_MATCH_DAYS);
        if !(1..=90).contains(&days_back) {
            return Err(ServiceError::Validation("days_back: Must be between 1 and 90".to_string()));
        }
        owned_profile(self.profiles.as_ref(), profile_id, user_id).await?;

        let since = format_date(Utc::now().date_naive() - Duration::days(days_back));
        let logs = self.logs.unmatched_activity_logs(profile_id, &since).await?;

        let mut matched = 0;
        for log in &logs {
            if let Some(activity) = self
                .plans
                .find_pending_match(profile_id, &log.date, &log.activity_type)
                .await?
            {
                self.plans.complete_with_log(activity.id, log.id).await?;
                matched += 1;
            }
        }

        info!("Matched {} of {} activity logs for profile {}", matched, logs.len(), profile_id);
        Ok(AutoMatchResult {
            message: format!("Matched {} activities", matched),
            total_checked: logs.len(),
            matched,
        })
    }

    async fn analyze(&self, profile: &HealthProfileRecord, request: &PlanRequest) -> PlanAnalysis {
        let prompt = analysis_prompt(profile, request, &self.language);
        let completion = CompletionRequest::new(vec![ChatMessage::user(prompt)])
            .with_temperature(0.3)
            .json();

        let reply = match self.model.complete(completion).await {
            Ok(reply) => reply.text(),
            Err(e) => {
                warn!("Plan analysis unavailable, using fallback: {}", e);
                return fallback_analysis(request.duration_days);
            }
        };

        match parse_json_object(&reply).map(serde_json::from_value::<PlanAnalysis>) {
            Some(Ok(analysis)) => analysis,
            Some(Err(e)) => {
                warn!("Plan analysis did not match the expected shape: {}", e);
                fallback_analysis(request.duration_days)
            }
            None => {
                warn!("Plan analysis was not a JSON object");
                fallback_analysis(request.duration_days)
            }
        }
    }

    async fn profile_plan(&self, profile_id: i64, plan_id: i64, user_id: i64) -> ServiceResult<HealthPlanRecord> {
        owned_profile(self.profiles.as_ref(), profile_id, user_id).await?;
        self.plans
            .get_for_profile(plan_id, profile_id)
            .await?
            .ok_or_else(plan_not_found)
    }

    async fn user_plan(&self, plan_id: i64, user_id: i64) -> ServiceResult<HealthPlanRecord> {
        self.plans
            .get_for_user(plan_id, user_id)
            .await?
            .ok_or_else(plan_not_found)
    }
}

fn plan_not_found() -> ServiceError {
    ServiceError::NotFound("Health plan not found".to_string())
}

fn log_limit(limit: Option<u32>) -> u32 {
    limit.unwrap_or(DEFAULT_LOG_LIMIT).clamp(1, MAX_LOG_LIMIT)
}

fn stored_analysis(plan: &HealthPlanRecord) -> PlanAnalysis {
    serde_json::from_value(plan.ai_analysis.clone()).unwrap_or_else(|e| {
        warn!("Stored analysis of plan {} is unreadable: {}", plan.id, e);
        PlanAnalysis::default()
    })
}

fn item_calories(items: &[Value]) -> Option<f64> {
    let values: Vec<f64> = items
        .iter()
        .filter_map(|item| item.get("calories").and_then(Value::as_f64))
        .collect();
    (!values.is_empty()).then(|| values.iter().sum())
}

fn or_unknown<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "unknown".to_string())
}

fn list_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "No restrictions".to_string()
    } else {
        items.join(", ")
    }
}

fn analysis_prompt(profile: &HealthProfileRecord, request: &PlanRequest, language: &str) -> String {
    format!(
        r#"You are a nutrition and sports expert. Analyze the following information and build a detailed health plan.

USER:
- Age: {age}
- Gender: {gender}
- Current weight: {weight} kg
- Height: {height} cm
- Health conditions: {conditions}

GOAL:
- Type: {goal_type}
- Value: {target_value} {target_unit}
- Duration: {duration} days

CONSTRAINTS:
- Available activities: {activities}
- Dietary restrictions: {restrictions}

Return JSON with these fields:
{{
  "feasibility_score": (1-10, 10 is most achievable),
  "weekly_targets": [{{"week": 1, "target_progress": (percent of goal), "focus": "focus of the week"}}],
  "exercise_recommendations": [{{
    "activity": "activity name",
    "frequency_per_week": (sessions per week),
    "duration_minutes": (minutes per session),
    "intensity": "low/medium/high",
    "calories_per_session": (estimated calories),
    "notes": "notes"
  }}],
  "nutrition_guidelines": {{
    "daily_calories": (calories per day),
    "macros": {{"protein_percent": 0, "carbs_percent": 0, "fat_percent": 0}},
    "meal_timing": ["breakfast", "lunch", "dinner", "snack"],
    "hydration_liters": (liters per day),
    "supplements": ["vitamin D"]
  }},
  "risk_factors": ["risk"],
  "success_tips": ["tip"],
  "progress_indicators": ["indicator"]
}}

Write text values in {language}. Return only JSON."#,
        age = or_unknown(profile.age),
        gender = profile.gender.as_deref().unwrap_or("unknown"),
        weight = or_unknown(profile.weight),
        height = or_unknown(profile.height),
        conditions = profile.conditions_text.as_deref().unwrap_or("None"),
        goal_type = request.goal_type,
        target_value = request.target_value,
        target_unit = request.target_unit,
        duration = request.duration_days,
        activities = list_or_none(&request.available_activities),
        restrictions = list_or_none(&request.dietary_restrictions),
    )
}
