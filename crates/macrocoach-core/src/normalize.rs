//! Value normalization: validated JSON into typed records.
//!
//! Normalization never fails. Every field read goes through a total accessor
//! that falls back to a canonical default, so the records produced here
//! always satisfy the model invariants (finite non-negative numbers, defined
//! strings, day keys drawn from the seven weekday tokens).

use macrocoach_model::{
    DayPlan, DayWorkout, GroceryItem, MacroTarget, Macros, Meal, MealPlan, ResponseCategory,
    Weekday, WeeklyPlan, WorkoutExercise,
};
use serde::Serialize;
use serde_json::Value;

/// Unit assigned to grocery items that arrive without one.
pub const DEFAULT_UNIT: &str = "unit";

/// The typed result of one successful pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TypedRecord {
    MacroSet(Vec<MacroTarget>),
    MealBatch(MealPlan),
    GroceryList(Vec<GroceryItem>),
    WorkoutPlan(Vec<DayWorkout>),
    SingleDayPlan(DayPlan),
}

impl TypedRecord {
    pub fn category(&self) -> ResponseCategory {
        match self {
            Self::MacroSet(_) => ResponseCategory::MacroSet,
            Self::MealBatch(_) => ResponseCategory::MealBatch,
            Self::GroceryList(_) => ResponseCategory::GroceryList,
            Self::WorkoutPlan(_) => ResponseCategory::WorkoutPlan,
            Self::SingleDayPlan(_) => ResponseCategory::SingleDayPlan,
        }
    }

    pub fn into_macro_set(self) -> Option<Vec<MacroTarget>> {
        match self {
            Self::MacroSet(targets) => Some(targets),
            _ => None,
        }
    }

    pub fn into_meal_batch(self) -> Option<MealPlan> {
        match self {
            Self::MealBatch(plan) => Some(plan),
            _ => None,
        }
    }

    pub fn into_grocery_list(self) -> Option<Vec<GroceryItem>> {
        match self {
            Self::GroceryList(items) => Some(items),
            _ => None,
        }
    }

    pub fn into_workout_plan(self) -> Option<Vec<DayWorkout>> {
        match self {
            Self::WorkoutPlan(days) => Some(days),
            _ => None,
        }
    }

    pub fn into_day_plan(self) -> Option<DayPlan> {
        match self {
            Self::SingleDayPlan(plan) => Some(plan),
            _ => None,
        }
    }
}

/// Build the typed record for `category` from a validated value.
pub fn normalize(value: &Value, category: ResponseCategory) -> TypedRecord {
    let root = value.get(category.root_key());
    match category {
        ResponseCategory::MacroSet => {
            TypedRecord::MacroSet(elements(root).map(macro_target).collect())
        }
        ResponseCategory::MealBatch => TypedRecord::MealBatch(MealPlan {
            affordable: weekly_plan(root.and_then(|p| p.get("affordable"))),
            premium: weekly_plan(root.and_then(|p| p.get("premium"))),
        }),
        ResponseCategory::GroceryList => {
            TypedRecord::GroceryList(elements(root).map(grocery_item).collect())
        }
        ResponseCategory::WorkoutPlan => {
            TypedRecord::WorkoutPlan(elements(root).map(day_workout).collect())
        }
        ResponseCategory::SingleDayPlan => TypedRecord::SingleDayPlan(day_plan(root)),
    }
}

// ---------------------------------------------------------------------------
// Coercion
// ---------------------------------------------------------------------------

/// Tolerant numeric coercion.
///
/// Numbers pass through; strings keep only their digits and first decimal
/// point before parsing. Anything else, and any negative or non-finite
/// result, becomes 0.
pub fn coerce_number(value: Option<&Value>) -> f64 {
    let n = match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => parse_digits(s),
        _ => 0.0,
    };
    if n.is_finite() && n > 0.0 { n } else { 0.0 }
}

fn parse_digits(s: &str) -> f64 {
    let mut seen_point = false;
    let kept: String = s
        .chars()
        .filter(|&c| {
            if c.is_ascii_digit() {
                true
            } else if c == '.' && !seen_point {
                seen_point = true;
                true
            } else {
                false
            }
        })
        .collect();
    kept.parse().unwrap_or(0.0)
}

/// Whole-number coercion, truncating toward zero.
pub fn coerce_count(value: Option<&Value>) -> u32 {
    coerce_number(value) as u32
}

/// Text coercion: strings as-is, numbers and booleans rendered, anything
/// else empty.
pub fn coerce_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

fn elements(value: Option<&Value>) -> impl Iterator<Item = &Value> {
    value
        .and_then(Value::as_array)
        .map(|a| a.iter())
        .into_iter()
        .flatten()
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

fn macro_target(value: &Value) -> MacroTarget {
    MacroTarget {
        nutrient: coerce_text(value.get("nutrient")),
        amount: coerce_number(value.get("amount")),
        details: coerce_text(value.get("details")),
    }
}

fn grocery_item(value: &Value) -> GroceryItem {
    let unit = coerce_text(value.get("unit"));
    GroceryItem {
        item: coerce_text(value.get("item")).trim().to_owned(),
        quantity: coerce_number(value.get("quantity")),
        unit: if unit.trim().is_empty() {
            DEFAULT_UNIT.to_owned()
        } else {
            unit
        },
        price: coerce_number(value.get("price")),
        notes: coerce_text(value.get("notes")),
    }
}

fn day_workout(value: &Value) -> DayWorkout {
    DayWorkout {
        day: coerce_text(value.get("day")),
        focus: coerce_text(value.get("focus")),
        exercises: elements(value.get("exercises")).map(exercise).collect(),
    }
}

fn exercise(value: &Value) -> WorkoutExercise {
    WorkoutExercise {
        name: coerce_text(value.get("name")),
        sets: coerce_count(value.get("sets")),
        reps: coerce_count(value.get("reps")),
        rest: coerce_number(value.get("rest")),
        notes: coerce_text(value.get("notes")),
    }
}

/// A fully populated meal. The `{"empty": true}` marker left by the
/// sanitizer, like an absent meal, becomes [`Meal::empty`].
pub fn meal(value: Option<&Value>) -> Meal {
    let Some(value) = value.filter(|v| v.is_object()) else {
        return Meal::empty();
    };
    if value.get("empty").and_then(Value::as_bool) == Some(true) {
        return Meal::empty();
    }
    let macros = value.get("macros");
    Meal {
        name: coerce_text(value.get("name")),
        time: coerce_text(value.get("time")),
        recipe: coerce_text(value.get("recipe")),
        calories: coerce_number(value.get("calories")),
        macros: Macros {
            protein: coerce_number(macros.and_then(|m| m.get("protein"))),
            carbs: coerce_number(macros.and_then(|m| m.get("carbs"))),
            fats: coerce_number(macros.and_then(|m| m.get("fats"))),
        },
    }
}

/// A fully populated day. A singular `snack` object stands in for a missing
/// `snacks` array.
pub fn day_plan(value: Option<&Value>) -> DayPlan {
    let get = |key: &str| value.and_then(|v| v.get(key));
    let snacks = match (get("snacks"), get("snack")) {
        (Some(Value::Array(snacks)), _) => snacks.iter().map(|s| meal(Some(s))).collect(),
        (None, Some(snack)) if snack.is_object() => vec![meal(Some(snack))],
        _ => Vec::new(),
    };
    DayPlan {
        breakfast: meal(get("breakfast")),
        lunch: meal(get("lunch")),
        dinner: meal(get("dinner")),
        snacks,
    }
}

/// Day-keyed plans. Keys are matched case-insensitively against the seven
/// weekday tokens; anything else is dropped.
pub fn weekly_plan(value: Option<&Value>) -> WeeklyPlan {
    let mut plan = WeeklyPlan::new();
    let Some(days) = value.and_then(Value::as_object) else {
        return plan;
    };
    for (key, day) in days {
        match key.parse::<Weekday>() {
            Ok(weekday) => {
                plan.insert(weekday, day_plan(Some(day)));
            }
            Err(_) => tracing::debug!(key = %key, "dropping non-weekday key from weekly plan"),
        }
    }
    plan
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numeric_strings_are_coerced() {
        assert_eq!(coerce_number(Some(&json!("5kg"))), 5.0);
        assert_eq!(coerce_number(Some(&json!("350"))), 350.0);
        assert_eq!(coerce_number(Some(&json!("$12.50"))), 12.5);
        assert_eq!(coerce_number(Some(&json!("1.2.3"))), 1.23);
        assert_eq!(coerce_number(Some(&json!("about"))), 0.0);
        assert_eq!(coerce_number(Some(&json!("."))), 0.0);
    }

    #[test]
    fn numbers_pass_through_and_clamp() {
        assert_eq!(coerce_number(Some(&json!(42.5))), 42.5);
        assert_eq!(coerce_number(Some(&json!(-3))), 0.0);
        assert_eq!(coerce_number(Some(&json!(true))), 0.0);
        assert_eq!(coerce_number(None), 0.0);
    }

    #[test]
    fn counts_truncate() {
        assert_eq!(coerce_count(Some(&json!(3.9))), 3);
        assert_eq!(coerce_count(Some(&json!("8-12"))), 812);
        assert_eq!(coerce_count(Some(&json!(null))), 0);
    }

    #[test]
    fn text_coercion() {
        assert_eq!(coerce_text(Some(&json!("x"))), "x");
        assert_eq!(coerce_text(Some(&json!(12))), "12");
        assert_eq!(coerce_text(Some(&json!(false))), "false");
        assert_eq!(coerce_text(Some(&json!({"a": 1}))), "");
        assert_eq!(coerce_text(None), "");
    }

    #[test]
    fn grocery_item_with_string_numbers() {
        let value = json!({"groceryList": [{"item": "Rice", "quantity": "5kg", "price": "350"}]});
        let items = normalize(&value, ResponseCategory::GroceryList)
            .into_grocery_list()
            .unwrap();
        assert_eq!(
            items,
            vec![GroceryItem {
                item: "Rice".to_string(),
                quantity: 5.0,
                unit: "unit".to_string(),
                price: 350.0,
                notes: String::new(),
            }]
        );
    }

    #[test]
    fn grocery_item_names_are_trimmed() {
        let value = json!({"groceryList": [{"item": "  Oats ", "unit": " ", "quantity": 1, "price": 2}]});
        let items = normalize(&value, ResponseCategory::GroceryList)
            .into_grocery_list()
            .unwrap();
        assert_eq!(items[0].item, "Oats");
        assert_eq!(items[0].unit, DEFAULT_UNIT);
    }

    #[test]
    fn macro_set_from_doubled_brace_scenario() {
        let text = crate::sanitize::sanitize(
            "{{\"macroTargets\": [{\"nutrient\":\"protein\",\"amount\":150,\"details\":\"x\"}]}}",
        );
        let value: Value = serde_json::from_str(&text).unwrap();
        let targets = normalize(&value, ResponseCategory::MacroSet)
            .into_macro_set()
            .unwrap();
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].amount, 150.0);
    }

    #[test]
    fn sentinel_and_missing_meals_are_empty() {
        let plan = day_plan(Some(&json!({
            "breakfast": {"empty": true},
            "lunch": {"name": "Rice", "calories": "600 kcal"},
            "snacks": [{"empty": true}, {"name": "Nuts"}]
        })));
        assert!(plan.breakfast.is_empty());
        assert!(plan.dinner.is_empty());
        assert_eq!(plan.lunch.name, "Rice");
        assert_eq!(plan.lunch.calories, 600.0);
        assert_eq!(plan.lunch.macros, Macros::default());
        assert_eq!(plan.snacks.len(), 2);
        assert!(plan.snacks[0].is_empty());
    }

    #[test]
    fn singular_snack_fills_in_for_snacks() {
        let plan = day_plan(Some(&json!({"snack": {"name": "Apple"}})));
        assert_eq!(plan.snacks.len(), 1);
        assert_eq!(plan.snacks[0].name, "Apple");

        let plan = day_plan(Some(&json!({"snacks": [], "snack": {"name": "Apple"}})));
        assert!(plan.snacks.is_empty());
    }

    #[test]
    fn weekly_keys_are_canonicalized() {
        let value = json!({"mealPlan": {"affordable": {
            "Monday": {"breakfast": {"name": "Oats"}},
            " friday ": {},
            "someday": {},
            "notes": "ignored"
        }}});
        let plan = normalize(&value, ResponseCategory::MealBatch)
            .into_meal_batch()
            .unwrap();
        let days: Vec<Weekday> = plan.affordable.keys().copied().collect();
        assert_eq!(days, vec![Weekday::Monday, Weekday::Friday]);
        assert_eq!(plan.affordable[&Weekday::Monday].breakfast.name, "Oats");
        assert!(plan.premium.is_empty());
    }

    #[test]
    fn workout_plan_normalizes_exercises() {
        let value = json!({"workoutPlan": [{"day": "Monday", "focus": "Push", "exercises": [
            {"name": "Bench", "sets": "4", "reps": 8.7, "rest": "90s"}
        ]}]});
        let days = normalize(&value, ResponseCategory::WorkoutPlan)
            .into_workout_plan()
            .unwrap();
        let bench = &days[0].exercises[0];
        assert_eq!((bench.sets, bench.reps, bench.rest), (4, 8, 90.0));
        assert_eq!(bench.notes, "");
    }

    #[test]
    fn normalization_is_total_on_garbage() {
        for category in [
            ResponseCategory::MacroSet,
            ResponseCategory::MealBatch,
            ResponseCategory::GroceryList,
            ResponseCategory::WorkoutPlan,
            ResponseCategory::SingleDayPlan,
        ] {
            for value in [json!(null), json!("x"), json!({"macroTargets": [1, "a", null]})] {
                let record = normalize(&value, category);
                assert_eq!(record.category(), category);
            }
        }
    }

    #[test]
    fn record_accessors_reject_other_categories() {
        let record = TypedRecord::SingleDayPlan(DayPlan::default());
        assert!(record.clone().into_macro_set().is_none());
        assert!(record.into_day_plan().is_some());
    }
}
