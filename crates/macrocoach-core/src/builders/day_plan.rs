use macrocoach_model::{DayPlan, MacroTarget, PersonalData, ResponseCategory, Tier, Weekday};

use crate::normalize::TypedRecord;
use crate::pipeline::{Pipeline, PipelineError};

fn tier_guidance(tier: Tier) -> &'static str {
    match tier {
        Tier::Affordable => "Budget: everyday chicken, eggs, brown rice, lentils, local fish",
        Tier::Premium => "Premium: olive oil, salmon, quinoa, grass-fed beef",
    }
}

pub fn day_plan_prompt(
    personal: &PersonalData,
    tdee: f64,
    targets: &[MacroTarget],
    tier: Tier,
    day: Weekday,
) -> String {
    let targets = serde_json::to_string(targets).unwrap_or_default();
    format!(
        r#"Generate a high-protein meal plan for {day}.

Profile:
- Daily calories: {tdee} kcal
- Goal: {goal}
- Plan type: {tier}
- Macro targets: {targets}
- {guidance}

Return a JSON object with this structure:
{{
  "dayPlan": {{
    "breakfast": {{
      "name": "string",
      "time": "HH:MM",
      "recipe": "ingredients with quantities",
      "calories": number,
      "macros": {{"protein": number, "carbs": number, "fats": number}}
    }},
    "lunch": {{same structure}},
    "dinner": {{same structure}},
    "snacks": [{{same structure}}]
  }}
}}"#,
        tdee = tdee.round(),
        goal = personal.goal,
        guidance = tier_guidance(tier),
    )
}

/// One request for a single (tier, day) pair.
pub async fn generate_day_plan(
    pipeline: &Pipeline,
    personal: &PersonalData,
    tdee: f64,
    targets: &[MacroTarget],
    tier: Tier,
    day: Weekday,
) -> Result<DayPlan, PipelineError> {
    let prompt = day_plan_prompt(personal, tdee, targets, tier, day);
    pipeline
        .execute_as(&prompt, ResponseCategory::SingleDayPlan, TypedRecord::into_day_plan)
        .await
}
