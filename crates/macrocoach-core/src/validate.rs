//! Structural validation of parsed responses.
//!
//! Validation is strict about JSON types: a string where a string is
//! expected, a JSON number where a number is expected. Lenient coercion is
//! the normalizer's job. Every accessor is total, so malformed input simply
//! yields `false`.

use macrocoach_model::ResponseCategory;
use serde_json::{Map, Value, json};

const MEAL_KEYS: [&str; 3] = ["breakfast", "lunch", "dinner"];

/// Decide whether `value` has the shape `category` requires.
///
/// For [`ResponseCategory::SingleDayPlan`] missing or null meals are
/// replaced by empty meals, and a missing or non-array `snacks` by an empty
/// array, before judging. Empty placeholders never count as the valid meal
/// a day plan needs. No other category is modified.
pub fn validate(value: &mut Value, category: ResponseCategory) -> bool {
    match category {
        ResponseCategory::MacroSet => non_empty_array(value, category.root_key())
            .is_some_and(|targets| targets.iter().all(is_macro_target)),
        ResponseCategory::MealBatch => value
            .get("mealPlan")
            .and_then(|plan| plan.get("affordable"))
            .and_then(Value::as_object)
            .is_some_and(|days| days.values().any(has_typed_breakfast)),
        ResponseCategory::GroceryList => non_empty_array(value, category.root_key())
            .is_some_and(|items| items.iter().all(is_grocery_item)),
        ResponseCategory::WorkoutPlan => non_empty_array(value, category.root_key())
            .is_some_and(|days| days.iter().all(is_day_workout)),
        ResponseCategory::SingleDayPlan => value
            .get_mut(category.root_key())
            .and_then(Value::as_object_mut)
            .is_some_and(|plan| {
                fill_missing_meals(plan);
                day_has_valid_meal(plan)
            }),
    }
}

/// The meal placeholder inserted where a day plan lacks a meal.
pub fn empty_meal() -> Value {
    json!({
        "name": "",
        "time": "",
        "recipe": "",
        "calories": 0,
        "macros": {"protein": 0, "carbs": 0, "fats": 0}
    })
}

/// True when `meal` has string name/time/recipe and numeric
/// calories/protein/carbs/fats.
pub fn is_valid_meal(meal: &Value) -> bool {
    let macros = meal.get("macros");
    ["name", "time", "recipe"].iter().all(|k| is_string(meal.get(*k)))
        && is_number(meal.get("calories"))
        && ["protein", "carbs", "fats"]
            .iter()
            .all(|k| is_number(macros.and_then(|m| m.get(*k))))
}

fn non_empty_array<'a>(value: &'a Value, key: &str) -> Option<&'a Vec<Value>> {
    value.get(key).and_then(Value::as_array).filter(|a| !a.is_empty())
}

fn is_string(value: Option<&Value>) -> bool {
    value.is_some_and(Value::is_string)
}

fn is_number(value: Option<&Value>) -> bool {
    value.is_some_and(Value::is_number)
}

fn is_macro_target(target: &Value) -> bool {
    is_string(target.get("nutrient"))
        && is_number(target.get("amount"))
        && is_string(target.get("details"))
}

fn is_grocery_item(item: &Value) -> bool {
    is_string(item.get("item"))
        && is_string(item.get("unit"))
        && is_number(item.get("quantity"))
        && is_number(item.get("price"))
}

fn is_day_workout(day: &Value) -> bool {
    is_string(day.get("day"))
        && is_string(day.get("focus"))
        && day.get("exercises").is_some_and(Value::is_array)
}

/// Weekly batches are accepted on the breakfast of any affordable day; only
/// protein is required among the macros.
fn has_typed_breakfast(day: &Value) -> bool {
    let Some(breakfast) = day.get("breakfast") else {
        return false;
    };
    ["name", "time", "recipe"]
        .iter()
        .all(|k| is_string(breakfast.get(*k)))
        && is_number(breakfast.get("calories"))
        && is_number(breakfast.get("macros").and_then(|m| m.get("protein")))
}

fn fill_missing_meals(plan: &mut Map<String, Value>) {
    for key in MEAL_KEYS {
        if plan.get(key).is_none_or(Value::is_null) {
            plan.insert(key.to_owned(), empty_meal());
        }
    }
    if !plan.get("snacks").is_some_and(Value::is_array) {
        plan.insert("snacks".to_owned(), Value::Array(Vec::new()));
    }
}

fn day_has_valid_meal(plan: &Map<String, Value>) -> bool {
    let counts = |meal: &Value| is_valid_meal(meal) && *meal != empty_meal();
    let main = MEAL_KEYS.iter().filter_map(|k| plan.get(*k)).any(counts);
    let snack = plan
        .get("snacks")
        .and_then(Value::as_array)
        .is_some_and(|snacks| snacks.iter().any(counts));
    main || snack
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meal(name: &str) -> Value {
        json!({
            "name": name,
            "time": "08:00",
            "recipe": "Mix",
            "calories": 400,
            "macros": {"protein": 30, "carbs": 40, "fats": 10}
        })
    }

    #[test]
    fn macro_set_accepts_typed_targets() {
        let mut value = json!({"macroTargets": [
            {"nutrient": "protein", "amount": 150, "details": "1g/lb"},
            {"nutrient": "carbs", "amount": 200.5, "details": ""}
        ]});
        assert!(validate(&mut value, ResponseCategory::MacroSet));
    }

    #[test]
    fn macro_set_rejects_string_amount_and_empty_list() {
        let mut bad = json!({"macroTargets": [{"nutrient": "protein", "amount": "150", "details": ""}]});
        assert!(!validate(&mut bad, ResponseCategory::MacroSet));
        let mut empty = json!({"macroTargets": []});
        assert!(!validate(&mut empty, ResponseCategory::MacroSet));
        let mut missing = json!({"targets": []});
        assert!(!validate(&mut missing, ResponseCategory::MacroSet));
    }

    #[test]
    fn meal_batch_needs_one_typed_affordable_breakfast() {
        let mut value = json!({"mealPlan": {"affordable": {
            "monday": {"lunch": meal("Rice")},
            "tuesday": {"breakfast": {"name": "Oats", "time": "07:00", "recipe": "r", "calories": 300, "macros": {"protein": 12}}}
        }}});
        assert!(validate(&mut value, ResponseCategory::MealBatch));
    }

    #[test]
    fn meal_batch_rejects_premium_only_and_bad_types() {
        let mut premium_only = json!({"mealPlan": {"premium": {"monday": {"breakfast": meal("Oats")}}}});
        assert!(!validate(&mut premium_only, ResponseCategory::MealBatch));
        let mut bad_calories = json!({"mealPlan": {"affordable": {"monday": {"breakfast": {
            "name": "Oats", "time": "07:00", "recipe": "r", "calories": "300", "macros": {"protein": 12}
        }}}}});
        assert!(!validate(&mut bad_calories, ResponseCategory::MealBatch));
        let mut not_object = json!({"mealPlan": {"affordable": []}});
        assert!(!validate(&mut not_object, ResponseCategory::MealBatch));
    }

    #[test]
    fn grocery_list_is_strict() {
        let mut good = json!({"groceryList": [{"item": "Rice", "quantity": 5, "unit": "kg", "price": 3.2}]});
        assert!(validate(&mut good, ResponseCategory::GroceryList));
        let mut string_quantity = json!({"groceryList": [{"item": "Rice", "quantity": "5kg", "price": "350"}]});
        assert!(!validate(&mut string_quantity, ResponseCategory::GroceryList));
    }

    #[test]
    fn workout_plan_requires_exercise_arrays() {
        let mut good = json!({"workoutPlan": [{"day": "Monday", "focus": "Legs", "exercises": []}]});
        assert!(validate(&mut good, ResponseCategory::WorkoutPlan));
        let mut bad = json!({"workoutPlan": [{"day": "Monday", "focus": "Legs", "exercises": "squats"}]});
        assert!(!validate(&mut bad, ResponseCategory::WorkoutPlan));
    }

    #[test]
    fn day_plan_is_completed_in_place() {
        let mut value = json!({"dayPlan": {"breakfast": meal("Eggs"), "dinner": null, "snacks": "none"}});
        assert!(validate(&mut value, ResponseCategory::SingleDayPlan));
        assert_eq!(value["dayPlan"]["lunch"], empty_meal());
        assert_eq!(value["dayPlan"]["dinner"], empty_meal());
        assert_eq!(value["dayPlan"]["snacks"], json!([]));
    }

    #[test]
    fn day_plan_accepts_a_single_valid_snack() {
        let mut value = json!({"dayPlan": {"snacks": [{"name": "x"}, meal("Nuts")]}});
        assert!(validate(&mut value, ResponseCategory::SingleDayPlan));
    }

    #[test]
    fn day_plan_of_placeholders_is_rejected() {
        let mut value = json!({"dayPlan": {}});
        assert!(!validate(&mut value, ResponseCategory::SingleDayPlan));
        let mut partial = json!({"dayPlan": {"breakfast": {"name": "Eggs", "macros": {"protein": 1}}}});
        assert!(!validate(&mut partial, ResponseCategory::SingleDayPlan));
    }

    #[test]
    fn only_day_plans_are_modified() {
        let original = json!({"groceryList": []});
        let mut value = original.clone();
        assert!(!validate(&mut value, ResponseCategory::GroceryList));
        assert_eq!(value, original);
    }

    #[test]
    fn non_objects_fail_closed() {
        for category in [
            ResponseCategory::MacroSet,
            ResponseCategory::MealBatch,
            ResponseCategory::GroceryList,
            ResponseCategory::WorkoutPlan,
            ResponseCategory::SingleDayPlan,
        ] {
            for mut value in [json!(null), json!(42), json!("text"), json!([1, 2])] {
                assert!(!validate(&mut value, category));
            }
        }
    }
}
