//! Pass 3: repairs specific to weekly meal plans and single-day plans.

use super::lexer::{
    Token, find_key_value, is_balanced, lex, matching_close, next_significant, render,
};
use super::punctuation::{collapse_doubled_braces, quote_bare_keys};

/// Placeholder for a meal that a truncated day plan never got to.
const EMPTY_MEAL_JSON: &str = r#"{"name": "", "time": "", "recipe": "", "calories": 0, "macros": {"protein": 0, "carbs": 0, "fats": 0}}"#;

const MAIN_MEALS: [&str; 3] = ["breakfast", "lunch", "dinner"];

/// Dispatch on the root key. Bare keys are quoted first so that a plan
/// written as `{mealPlan: ...}` is repaired on the first run, not the second.
pub(crate) fn repair_category_shape(text: &str) -> String {
    let quoted = render(&quote_bare_keys(lex(text)));
    if quoted.contains("\"mealPlan\"") {
        repair_meal_plan(&quoted)
    } else if quoted.contains("\"dayPlan\"") {
        rebuild_truncated_day_plan(&quoted)
    } else {
        text.to_owned()
    }
}

pub(crate) fn repair_meal_plan(text: &str) -> String {
    let tokens = lex(text);
    let tokens = collapse_doubled_braces(tokens);
    let tokens = separate_adjacent_objects(tokens);
    let tokens = close_snack_objects(tokens);
    let tokens = mark_empty_objects(tokens);
    render(&tokens)
}

/// Between `}` and `{`, leave exactly one comma.
pub(crate) fn separate_adjacent_objects(tokens: Vec<Token>) -> Vec<Token> {
    let mut out: Vec<Token> = Vec::with_capacity(tokens.len());
    let mut i = 0;

    while i < tokens.len() {
        let token = &tokens[i];
        out.push(token.clone());
        i += 1;
        if !token.is('}') {
            continue;
        }

        let mut j = i;
        let mut commas = 0;
        while let Some(n) = next_significant(&tokens, j) {
            if tokens[n].is(',') {
                commas += 1;
                j = n + 1;
            } else {
                break;
            }
        }
        let Some(n) = next_significant(&tokens, j) else {
            continue;
        };
        if tokens[n].is('{') && commas != 1 {
            out.push(Token::Punct(','));
            out.push(Token::Space(" ".to_owned()));
            i = n;
        }
    }

    out
}

/// Inside each `"snacks": [ ... ]`, close any snack object still open when
/// the array's `]` arrives.
pub(crate) fn close_snack_objects(mut tokens: Vec<Token>) -> Vec<Token> {
    let mut from = 0;
    while let Some(open) = find_key_value(&tokens, from, "snacks") {
        from = open + 1;
        if !tokens[open].is('[') {
            continue;
        }

        let mut braces = 0usize;
        let mut brackets = 0usize;
        for i in open..tokens.len() {
            match tokens[i].punct() {
                Some('{') => braces += 1,
                Some('}') => braces = braces.saturating_sub(1),
                Some('[') => brackets += 1,
                Some(']') => {
                    brackets -= 1;
                    if brackets == 0 {
                        for _ in 0..braces {
                            tokens.insert(i, Token::Punct('}'));
                        }
                        break;
                    }
                }
                _ => {}
            }
        }
    }
    tokens
}

/// Replace `{}` with `{"empty": true}` so that empty meals survive as an
/// explicit marker.
pub(crate) fn mark_empty_objects(tokens: Vec<Token>) -> Vec<Token> {
    let mut out: Vec<Token> = Vec::with_capacity(tokens.len());
    let mut i = 0;

    while i < tokens.len() {
        if tokens[i].is('{') {
            if let Some(n) = next_significant(&tokens, i + 1) {
                if tokens[n].is('}') {
                    out.extend(lex(r#"{"empty": true}"#));
                    i = n + 1;
                    continue;
                }
            }
        }
        out.push(tokens[i].clone());
        i += 1;
    }

    out
}

/// Salvage a truncated day plan.
///
/// When the text is unbalanced, every meal object that closed properly and
/// carries a `macros` key is kept, and the plan is rebuilt around them with
/// empty placeholders for the rest. Balanced text, and text with no complete
/// meal, is returned unchanged.
pub(crate) fn rebuild_truncated_day_plan(text: &str) -> String {
    let tokens = lex(text);
    if is_balanced(&tokens) {
        return text.to_owned();
    }
    let Some(plan) = find_key_value(&tokens, 0, "dayPlan").filter(|&p| tokens[p].is('{')) else {
        return text.to_owned();
    };

    let meals: Vec<Option<String>> = MAIN_MEALS
        .iter()
        .map(|key| {
            member_value(&tokens, plan, key).and_then(|start| complete_meal(&tokens, start))
        })
        .collect();

    let snacks: Vec<String> = member_value(&tokens, plan, "snacks")
        .filter(|&s| tokens[s].is('['))
        .map(|s| complete_array_meals(&tokens, s))
        .unwrap_or_default();

    if meals.iter().all(Option::is_none) && snacks.is_empty() {
        return text.to_owned();
    }

    let mut fields: Vec<String> = MAIN_MEALS
        .iter()
        .zip(meals)
        .map(|(key, meal)| format!("\"{key}\": {}", meal.as_deref().unwrap_or(EMPTY_MEAL_JSON)))
        .collect();
    fields.push(format!("\"snacks\": [{}]", snacks.join(", ")));

    format!("{{\"dayPlan\": {{{}}}}}", fields.join(", "))
}

/// Start index of the value of `key` directly inside the object at `open`.
fn member_value(tokens: &[Token], open: usize, key: &str) -> Option<usize> {
    let mut depth = 0usize;
    for i in open..tokens.len() {
        match tokens[i].punct() {
            Some('{' | '[') => depth += 1,
            Some('}' | ']') => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return None;
                }
            }
            _ if depth == 1 && tokens[i].is_string(key) => {
                let colon = next_significant(tokens, i + 1)?;
                if tokens[colon].is(':') {
                    return next_significant(tokens, colon + 1);
                }
            }
            _ => {}
        }
    }
    None
}

/// The text of the meal object starting at `start`, if it closed and has
/// macros.
fn complete_meal(tokens: &[Token], start: usize) -> Option<String> {
    if !tokens[start].is('{') {
        return None;
    }
    let end = matching_close(tokens, start)?;
    let object = &tokens[start..=end];
    find_key_value(object, 0, "macros")?;
    Some(render(object))
}

/// Every complete meal object directly inside the array at `open`.
fn complete_array_meals(tokens: &[Token], open: usize) -> Vec<String> {
    let mut meals = Vec::new();
    let mut i = open + 1;
    while let Some(n) = next_significant(tokens, i) {
        match tokens[n].punct() {
            Some('{') => {
                let Some(end) = matching_close(tokens, n) else {
                    break;
                };
                if let Some(meal) = complete_meal(tokens, n) {
                    meals.push(meal);
                }
                i = end + 1;
            }
            Some(']') => break,
            _ => i = n + 1,
        }
    }
    meals
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn run(f: fn(Vec<Token>) -> Vec<Token>, input: &str) -> String {
        render(&f(lex(input)))
    }

    #[test]
    fn adjacent_objects_get_one_comma() {
        assert_eq!(
            run(separate_adjacent_objects, r#"[{"a": 1} {"b": 2},, {"c": 3}, {"d": 4}]"#),
            r#"[{"a": 1}, {"b": 2}, {"c": 3}, {"d": 4}]"#
        );
    }

    #[test]
    fn open_snack_is_closed_before_array_end() {
        assert_eq!(
            run(close_snack_objects, r#"{"snacks": [{"name": "Nuts", "macros": {"protein": 5}]}"#),
            r#"{"snacks": [{"name": "Nuts", "macros": {"protein": 5}}]}"#
        );
    }

    #[test]
    fn closed_snacks_are_untouched() {
        let input = r#"{"snacks": [{"name": "Nuts"}], "x": {"snacks": []}}"#;
        assert_eq!(run(close_snack_objects, input), input);
    }

    #[test]
    fn empty_objects_become_sentinel() {
        assert_eq!(
            run(mark_empty_objects, r#"{"snacks": [{ }], "a": "{}"}"#),
            r#"{"snacks": [{"empty": true}], "a": "{}"}"#
        );
    }

    #[test]
    fn meal_plan_repair_composes() {
        let input = r#"{{"mealPlan": {"affordable": {"monday": {"breakfast": {"name": "Oats"} "snacks": [{}]}}}}}"#;
        let out = repair_meal_plan(input);
        assert_eq!(
            out,
            r#"{"mealPlan": {"affordable": {"monday": {"breakfast": {"name": "Oats"} "snacks": [{"empty": true}]}}}}"#
        );
    }

    #[test]
    fn truncated_day_plan_keeps_complete_meals() {
        let input = r#"{"dayPlan": {"breakfast": {"name": "Eggs", "time": "08:00", "recipe": "r", "calories": 350, "macros": {"protein": 35, "carbs": 20, "fats": 8}}, "lunch": {"name": "Grilled chick"#;
        let out = rebuild_truncated_day_plan(input);
        let value: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["dayPlan"]["breakfast"]["name"], "Eggs");
        assert_eq!(value["dayPlan"]["lunch"]["name"], "");
        assert_eq!(value["dayPlan"]["dinner"]["calories"], 0);
        assert_eq!(value["dayPlan"]["snacks"], serde_json::json!([]));
    }

    #[test]
    fn truncated_day_plan_keeps_complete_snacks() {
        let input = r#"{"dayPlan": {"snacks": [{"name": "Nuts", "macros": {"protein": 5}}, {"name": "Ba"#;
        let out = rebuild_truncated_day_plan(input);
        let value: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["dayPlan"]["snacks"].as_array().unwrap().len(), 1);
        assert_eq!(value["dayPlan"]["breakfast"]["name"], "");
    }

    #[test]
    fn meal_without_macros_is_not_salvaged() {
        let input = r#"{"dayPlan": {"breakfast": {"name": "Eggs"}, "lunch": {"#;
        assert_eq!(rebuild_truncated_day_plan(input), input);
    }

    #[test]
    fn balanced_day_plan_is_untouched() {
        let input = r#"{"dayPlan": {"breakfast": {"name": "Eggs", "macros": {}}}}"#;
        assert_eq!(rebuild_truncated_day_plan(input), input);
    }

    #[test]
    fn dispatch_by_root_key() {
        let other = r#"{"groceryList": [{}]}"#;
        assert_eq!(repair_category_shape(other), other);
        assert!(repair_category_shape(r#"{"mealPlan": {"a": {}}}"#).contains("\"empty\""));
    }

    #[test]
    fn bare_root_key_is_dispatched() {
        assert_eq!(
            repair_category_shape(r#"{mealPlan: {"affordable": {"monday": {"snacks": [{}]}}}}"#),
            r#"{"mealPlan": {"affordable": {"monday": {"snacks": [{"empty": true}]}}}}"#
        );
        let day = repair_category_shape(r#"{dayPlan: {breakfast: {"name": "E", "macros": {"protein": 1}}, lunch: {"na"#);
        assert!(day.starts_with(r#"{"dayPlan": {"breakfast": {"name": "E""#), "{day}");
    }
}
