use macrocoach_model::{GroceryItem, MealPlan, ResponseCategory, Tier, WeeklyPlan};

use crate::normalize::TypedRecord;
use crate::pipeline::{Pipeline, PipelineError};

pub fn grocery_prompt(week: &WeeklyPlan) -> String {
    let meals = serde_json::to_string(week).unwrap_or_default();
    format!(
        r#"Generate a complete grocery list for this weekly meal plan:
{meals}

Return a JSON object with this structure:
{{
  "groceryList": [
    {{"item": "string", "quantity": number, "unit": "string", "price": number, "notes": "string"}}
  ]
}}

Every item needs all five fields. Cover every ingredient for the whole week,
merge duplicate ingredients by summing quantities, and price items in local
currency."#
    )
}

/// Keep items whose name survived normalization.
pub fn complete_items(items: Vec<GroceryItem>) -> Vec<GroceryItem> {
    items.into_iter().filter(|i| !i.item.is_empty()).collect()
}

/// One request for `tier`'s week.
pub async fn generate_grocery_list(
    pipeline: &Pipeline,
    plan: &MealPlan,
    tier: Tier,
) -> Result<Vec<GroceryItem>, PipelineError> {
    let prompt = grocery_prompt(plan.tier(tier));
    let items = pipeline
        .execute_as(&prompt, ResponseCategory::GroceryList, TypedRecord::into_grocery_list)
        .await?;
    let total = items.len();
    let items = complete_items(items);
    if items.len() < total {
        tracing::debug!(tier = %tier, dropped = total - items.len(), "dropped incomplete grocery items");
    }
    Ok(items)
}
