//! Canned model output, clean and damaged, plus provider wire bodies.

use macrocoach_model::Weekday;
use serde_json::json;

/// Macro targets wrapped in a code fence with a closing remark.
pub const MACROS_FENCED: &str = "Here are your targets:\n```json\n{\"macroTargets\": [{\"nutrient\": \"protein\", \"amount\": 180, \"details\": \"2.2g per kg\"}, {\"nutrient\": \"carbs\", \"amount\": 250, \"details\": \"around training\"}, {\"nutrient\": \"fats\", \"amount\": 70, \"details\": \"\"}]}\n```\nLet me know if you need anything else.";

/// Macro targets with the objects run together.
pub const MACROS_RUN_TOGETHER: &str = r#"{"macroTargets": [{"nutrient": "protein", "amount": 150, "details": "x"} {"nutrient": "carbs", "amount": 200, "details": "y"}]}"#;

/// A grocery list with a unit glued to a number, a padded name and an
/// empty unit.
pub const GROCERY_WITH_UNITS: &str = r#"{"groceryList": [{"item": " Chicken breast ", "quantity": 5kg, "unit": "", "price": 350, "notes": "family pack"}, {"item": "Rice", "quantity": 2, "unit": "kg", "price": 90, "notes": ""}]}"#;

/// A grocery list pricing an item as a string, which the validator rejects.
pub const GROCERY_STRING_PRICE: &str = r#"{"groceryList": [{"item": "Rice", "quantity": 2, "unit": "kg", "price": "90", "notes": ""}]}"#;

/// A day plan cut off inside lunch.
pub const DAY_PLAN_TRUNCATED: &str = r#"{"dayPlan": {"breakfast": {"name": "Egg white omelette", "time": "08:00", "recipe": "6 egg whites", "calories": 350, "macros": {"protein": 35, "carbs": 20, "fats": 8}}, "lunch": {"name": "Grilled chick"#;

/// A workout plan with a trailing comma and an inline comment.
pub const WORKOUT_MESSY: &str = r#"{"workoutPlan": [
  {"day": "monday", "focus": "push", "exercises": [
    {"name": "Bench press", "sets": 4, "reps": 8, "rest": 90, "notes": ""}, // heavy
  ]},
  {"day": "tuesday", "focus": "rest", "exercises": []}
]}"#;

/// Plain prose with no JSON at all.
pub const NOT_JSON: &str = "I'm sorry, I can't help with that.";

/// A JSON value with the right root key and the wrong shape.
pub const WRONG_SHAPE: &str = r#"{"macroTargets": "protein 150g"}"#;

fn meal(name: &str, protein: u32) -> serde_json::Value {
    json!({
        "name": name,
        "time": "08:00",
        "recipe": format!("{name} recipe"),
        "calories": 400,
        "macros": {"protein": protein, "carbs": 40, "fats": 12}
    })
}

/// A valid meal batch covering `days` in both tiers. Meal names embed the
/// tier and day, e.g. `affordable-monday-breakfast`.
pub fn meal_batch(days: &[Weekday]) -> String {
    let tier = |tier: &str| {
        let map: serde_json::Map<String, serde_json::Value> = days
            .iter()
            .map(|d| {
                let name = |slot: &str| format!("{tier}-{d}-{slot}");
                (
                    d.to_string(),
                    json!({
                        "breakfast": meal(&name("breakfast"), 30),
                        "lunch": meal(&name("lunch"), 45),
                        "dinner": meal(&name("dinner"), 40),
                        "snack": meal(&name("snack"), 15)
                    }),
                )
            })
            .collect();
        serde_json::Value::Object(map)
    };
    json!({"mealPlan": {"affordable": tier("affordable"), "premium": tier("premium")}}).to_string()
}

/// A valid single-day plan whose breakfast is named `name`.
pub fn day_plan(name: &str) -> String {
    json!({
        "dayPlan": {
            "breakfast": meal(name, 30),
            "lunch": meal("lunch", 45),
            "dinner": meal("dinner", 40),
            "snacks": [meal("snack", 15)]
        }
    })
    .to_string()
}

/// A chat-completions response body carrying `text`.
pub fn together_body(text: &str) -> String {
    json!({"choices": [{"message": {"role": "assistant", "content": text}}]}).to_string()
}

/// A generate-content response body carrying `text` in one part.
pub fn gemini_body(text: &str) -> String {
    json!({"candidates": [{"content": {"role": "model", "parts": [{"text": text}]}}]}).to_string()
}
