use macrocoach_model::{MacroTarget, PersonalData, ResponseCategory};

use crate::normalize::TypedRecord;
use crate::pipeline::{Pipeline, PipelineError};

pub fn macro_targets_prompt(personal: &PersonalData, tdee: f64) -> String {
    format!(
        r#"Generate daily macro targets for this person:
{{
  "weight": {weight},
  "goal": "{goal}",
  "tdee": {tdee}
}}

Return a JSON object with this structure:
{{
  "macroTargets": [
    {{"nutrient": "protein", "amount": number, "details": "string"}},
    {{"nutrient": "carbs", "amount": number, "details": "string"}},
    {{"nutrient": "fats", "amount": number, "details": "string"}}
  ]
}}"#,
        weight = personal.weight,
        goal = personal.goal,
        tdee = tdee.round(),
    )
}

/// One request; the normalized targets are returned as-is.
pub async fn generate_macro_targets(
    pipeline: &Pipeline,
    personal: &PersonalData,
    tdee: f64,
) -> Result<Vec<MacroTarget>, PipelineError> {
    let prompt = macro_targets_prompt(personal, tdee);
    pipeline
        .execute_as(&prompt, ResponseCategory::MacroSet, TypedRecord::into_macro_set)
        .await
}
