//! Plan schedule arithmetic.
//!
//! Exercises are spread over a 7-day week: on day offset `d` an exercise
//! done `f` times a week is scheduled when `d % 7 < f`. Meals split the
//! daily calorie budget evenly.

use chrono::{Duration, NaiveDate};
use serde_json::json;

use health_food_data::models::{NewPlanActivity, NewPlanMeal, PlanActivityRecord, PlanMealRecord};

use crate::entities::{
    AdjustedActivity, AdjustedDay, AdjustmentAnalysis, ExerciseRecommendation, NutritionGuidelines, PlanAnalysis,
    WeeklyTarget,
};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

const DEFAULT_MEALS: [&str; 3] = ["breakfast", "lunch", "dinner"];
const ADJUSTMENT_REASON: &str = "Adjusted based on recent activity";

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Last day of a plan, inclusive; `None` past the last representable date
pub fn plan_end_date(start: NaiveDate, duration_days: i64) -> Option<NaiveDate> {
    start.checked_add_signed(Duration::days(duration_days.max(1) - 1))
}

/// Analysis used when the AI cannot produce one
pub fn fallback_analysis(duration_days: i64) -> PlanAnalysis {
    let weeks = (duration_days / 7).max(1);

    PlanAnalysis {
        feasibility_score: 7.0,
        weekly_targets: (0..weeks)
            .map(|i| WeeklyTarget {
                week: (i + 1) as u32,
                target_progress: ((i + 1) as f64 * 100.0 / weeks as f64).min(100.0),
                focus: format!("Week {}: stay consistent", i + 1),
            })
            .collect(),
        exercise_recommendations: vec![ExerciseRecommendation {
            activity: "walking".to_string(),
            frequency_per_week: 5.0,
            duration_minutes: 30.0,
            intensity: "medium".to_string(),
            calories_per_session: Some(150.0),
            notes: Some("Safe baseline activity".to_string()),
        }],
        nutrition_guidelines: NutritionGuidelines::default(),
        risk_factors: vec!["Low motivation".to_string(), "Not following the plan".to_string()],
        success_tips: vec!["Set small goals".to_string(), "Track progress daily".to_string()],
        progress_indicators: vec!["Weight".to_string(), "Energy".to_string(), "Sleep".to_string()],
    }
}

fn is_scheduled(day_offset: i64, exercise: &ExerciseRecommendation) -> bool {
    ((day_offset % 7) as f64) < exercise.frequency_per_week
}

/// Day-by-day activities and meals for a new plan
pub fn build_schedule(
    start: NaiveDate,
    duration_days: i64,
    analysis: &PlanAnalysis,
) -> (Vec<NewPlanActivity>, Vec<NewPlanMeal>) {
    let nutrition = &analysis.nutrition_guidelines;
    let meal_timing: Vec<String> = if nutrition.meal_timing.is_empty() {
        DEFAULT_MEALS.iter().map(|m| m.to_string()).collect()
    } else {
        nutrition.meal_timing.clone()
    };
    let calories_per_meal = nutrition.daily_calories / meal_timing.len() as f64;
    let macros = json!(nutrition.macros);

    let mut activities = Vec::new();
    let mut meals = Vec::new();

    for (day_offset, day) in (0..duration_days).zip(start.iter_days()) {
        let date = format_date(day);

        for exercise in &analysis.exercise_recommendations {
            if is_scheduled(day_offset, exercise) {
                activities.push(NewPlanActivity {
                    date: date.clone(),
                    activity_type: exercise.activity.clone(),
                    activity_name: exercise.activity.clone(),
                    duration_minutes: exercise.duration_minutes as i64,
                    intensity: Some(exercise.intensity.clone()),
                    calories_target: exercise.calories_per_session,
                    instructions: exercise.notes.clone(),
                });
            }
        }

        for meal_type in &meal_timing {
            meals.push(NewPlanMeal {
                date: date.clone(),
                meal_type: meal_type.clone(),
                food_items: json!([{
                    "name": "Recommended foods",
                    "amount": "moderate portion",
                    "calories": calories_per_meal,
                    "notes": "Follow the nutrition guidelines"
                }]),
                total_calories: Some(calories_per_meal),
                macros: macros.clone(),
                preparation_notes: Some(format!("{} as planned", meal_type)),
            });
        }
    }

    (activities, meals)
}

/// Compare the week before `target` with what was logged
pub fn analyze_deviation(
    window_start: NaiveDate,
    window_end: NaiveDate,
    planned_meals: &[PlanMealRecord],
    consumed_calories: f64,
    planned_activities: &[PlanActivityRecord],
) -> AdjustmentAnalysis {
    let planned_calories: f64 = planned_meals.iter().filter_map(|m| m.total_calories).sum();
    let calorie_variance = consumed_calories - planned_calories;

    let completed = planned_activities.iter().filter(|a| a.is_completed).count();
    let exercise_completion_rate = if planned_activities.is_empty() {
        100.0
    } else {
        completed as f64 / planned_activities.len() as f64 * 100.0
    };

    let needs_adjustment = calorie_variance.abs() > planned_calories * 0.2 || exercise_completion_rate < 70.0;
    let exercise_multiplier = if calorie_variance > 0.0 {
        1.2
    } else if exercise_completion_rate < 70.0 {
        0.8
    } else {
        1.0
    };

    AdjustmentAnalysis {
        window_start: format_date(window_start),
        window_end: format_date(window_end),
        planned_calories,
        consumed_calories,
        calorie_variance,
        exercise_completion_rate,
        needs_adjustment,
        exercise_multiplier,
    }
}

/// Rescaled activities for `days` days from `start`, clipped to the plan's
/// inclusive `(first, last)` dates
pub fn adjusted_schedule(
    start: NaiveDate,
    days: i64,
    (plan_start, plan_end): (NaiveDate, NaiveDate),
    exercises: &[ExerciseRecommendation],
    multiplier: f64,
) -> Vec<AdjustedDay> {
    (0..days)
        .zip(start.iter_days())
        .filter(|(_, date)| *date >= plan_start)
        .take_while(|(_, date)| *date <= plan_end)
        .map(|(offset, date)| AdjustedDay {
            date: format_date(date),
            activities: exercises
                .iter()
                .filter(|exercise| is_scheduled(offset, exercise))
                .map(|exercise| AdjustedActivity {
                    activity_type: exercise.activity.clone(),
                    activity_name: exercise.activity.clone(),
                    duration_minutes: (exercise.duration_minutes * multiplier) as i64,
                    intensity: exercise.intensity.clone(),
                    calories_target: exercise.calories_per_session,
                    adjustment_reason: ADJUSTMENT_REASON.to_string(),
                })
                .collect(),
            adjustment_notes: format!("Day {}: adjusted {:.1}x", offset + 1, multiplier),
        })
        .collect()
}

/// Rows replacing a day's pending activities
pub fn adjusted_rows(day: &AdjustedDay) -> Vec<NewPlanActivity> {
    day.activities
        .iter()
        .map(|activity| NewPlanActivity {
            date: day.date.clone(),
            activity_type: activity.activity_type.clone(),
            activity_name: activity.activity_name.clone(),
            duration_minutes: activity.duration_minutes,
            intensity: Some(activity.intensity.clone()),
            calories_target: activity.calories_target,
            instructions: Some(activity.adjustment_reason.clone()),
        })
        .collect()
}

/// Calories burned per minute at an intensity; medium when unknown
pub fn calories_per_minute(intensity: Option<&str>) -> f64 {
    match intensity.map(|i| i.trim().to_ascii_lowercase()).as_deref() {
        Some("low") => 4.0,
        Some("high") => 10.0,
        _ => 7.0,
    }
}

pub fn estimate_calories_burned(intensity: Option<&str>, duration_minutes: i64) -> f64 {
    calories_per_minute(intensity) * duration_minutes as f64
}
