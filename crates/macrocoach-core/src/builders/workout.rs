use macrocoach_model::{DayWorkout, PersonalData, ResponseCategory};

use crate::normalize::TypedRecord;
use crate::pipeline::{Pipeline, PipelineError};

/// Days a full workout plan covers.
pub const WORKOUT_DAYS: usize = 7;

pub fn workout_prompt(personal: &PersonalData) -> String {
    format!(
        r#"Generate a seven-day workout plan for:
{{
  "goal": "{goal}",
  "weight": {weight}
}}

Return a JSON object with this structure:
{{
  "workoutPlan": [
    {{
      "day": "string",
      "focus": "string",
      "exercises": [
        {{"name": "string", "sets": number, "reps": number, "rest": number, "notes": "string"}}
      ]
    }}
  ]
}}

Use one entry per day, rest days included, and give rest in seconds."#,
        goal = personal.goal,
        weight = personal.weight,
    )
}

/// One request. A plan that does not cover seven days is returned but
/// logged.
pub async fn generate_workout_plan(
    pipeline: &Pipeline,
    personal: &PersonalData,
) -> Result<Vec<DayWorkout>, PipelineError> {
    let prompt = workout_prompt(personal);
    let days = pipeline
        .execute_as(&prompt, ResponseCategory::WorkoutPlan, TypedRecord::into_workout_plan)
        .await?;
    if days.len() != WORKOUT_DAYS {
        tracing::warn!(days = days.len(), "workout plan does not cover seven days");
    }
    Ok(days)
}
