//! Pass 6: re-segment a malformed `macroTargets` array.

use super::lexer::{Token, find_key_value, lex, next_significant, render};

/// Rebuild the `macroTargets` array as a list of flat objects.
///
/// Elements are split on `}` `,` `{` boundaries; each piece loses one
/// leading `{` and one trailing `}` and is rewrapped in a single pair. The
/// array is rewritten only when some piece was not already a well-formed
/// `{ ... }`, so correct arrays come through untouched. Text with more
/// closers than openers is left for the parser to reject.
pub(crate) fn repair_macro_targets(text: &str) -> String {
    let tokens = lex(text);
    if over_closed(&tokens) {
        return text.to_owned();
    }
    let Some(open) = find_key_value(&tokens, 0, "macroTargets") else {
        return text.to_owned();
    };
    if !tokens[open].is('[') {
        return text.to_owned();
    }
    let Some(close) = array_end(&tokens, open) else {
        return text.to_owned();
    };

    let body = &tokens[open + 1..close];
    if !body.iter().any(|t| t.is('{') || t.is('}')) {
        return text.to_owned();
    }

    let pieces = split_elements(body);
    let mut malformed = false;
    let mut rebuilt = Vec::with_capacity(pieces.len());

    for piece in pieces {
        let trimmed = trim_spaces(piece);
        if trimmed.is_empty() {
            malformed = true;
            continue;
        }
        let starts = trimmed.first().is_some_and(|t| t.is('{'));
        let ends = trimmed.last().is_some_and(|t| t.is('}'));
        if !(starts && ends) || trimmed.len() < 2 {
            malformed = true;
        }

        let inner = match (starts, ends) {
            (true, true) if trimmed.len() >= 2 => &trimmed[1..trimmed.len() - 1],
            (true, _) => &trimmed[1..],
            (false, true) => &trimmed[..trimmed.len() - 1],
            (false, false) => trimmed,
        };
        rebuilt.push(format!("{{{}}}", render(trim_spaces(inner))));
    }

    if !malformed {
        return text.to_owned();
    }

    format!(
        "{}[{}]{}",
        render(&tokens[..open]),
        rebuilt.join(", "),
        render(&tokens[close + 1..])
    )
}

fn over_closed(tokens: &[Token]) -> bool {
    let count = |kinds: [char; 2]| {
        tokens
            .iter()
            .filter(|t| t.punct().is_some_and(|c| kinds.contains(&c)))
            .count()
    };
    count(['}', ']']) > count(['{', '['])
}

/// Index of the `]` closing the array at `open`, counting only brackets.
fn array_end(tokens: &[Token], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, token) in tokens.iter().enumerate().skip(open) {
        match token.punct() {
            Some('[') => depth += 1,
            Some(']') => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Split at every `}` `,` `{` run, keeping the braces with their pieces.
fn split_elements(body: &[Token]) -> Vec<&[Token]> {
    let mut pieces = Vec::new();
    let mut start = 0;
    let mut i = 0;

    while i < body.len() {
        if body[i].is('}') {
            let comma = next_significant(body, i + 1).filter(|&c| body[c].is(','));
            let brace = comma
                .and_then(|c| next_significant(body, c + 1))
                .filter(|&b| body[b].is('{'));
            if let Some(brace) = brace {
                pieces.push(&body[start..=i]);
                start = brace;
                i = brace;
                continue;
            }
        }
        i += 1;
    }
    pieces.push(&body[start..]);
    pieces
}

fn trim_spaces(tokens: &[Token]) -> &[Token] {
    let start = tokens.iter().position(|t| !t.is_space()).unwrap_or(tokens.len());
    let end = tokens.iter().rposition(|t| !t.is_space()).map_or(start, |e| e + 1);
    &tokens[start..end.max(start)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn well_formed_array_is_untouched() {
        let input = r#"{"macroTargets": [{"nutrient": "protein", "amount": 150}, {"nutrient": "fats", "amount": 60}]}"#;
        assert_eq!(repair_macro_targets(input), input);
    }

    #[test]
    fn unrelated_text_is_untouched() {
        let input = r#"{"groceryList": [{"item": "rice"}]}"#;
        assert_eq!(repair_macro_targets(input), input);
    }

    #[test]
    fn missing_braces_are_restored() {
        let input = r#"{"macroTargets": [{"nutrient": "protein", "amount": 150}, {"nutrient": "carbs", "amount": 200]}"#;
        let out = repair_macro_targets(input);
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["macroTargets"].as_array().unwrap().len(), 2);
        assert_eq!(value["macroTargets"][1]["amount"], 200);
    }

    #[test]
    fn empty_objects_are_kept() {
        let input = r#"{"macroTargets": [{"nutrient": "protein"}, {}, {"nutrient": "fats"}]}"#;
        let out = repair_macro_targets(input);
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        let targets = value["macroTargets"].as_array().unwrap();
        assert_eq!(targets.len(), 3);
        assert_eq!(targets[1], serde_json::json!({}));
    }

    #[test]
    fn over_closed_text_is_untouched() {
        let input = r#"{"macroTargets": [{"nutrient": "p", "sub": {"a": 1}}, "amount": 2]}]}"#;
        assert_eq!(repair_macro_targets(input), input);
    }

    #[test]
    fn scalar_arrays_are_untouched() {
        let input = r#"{"macroTargets": ["protein", "carbs"]}"#;
        assert_eq!(repair_macro_targets(input), input);
    }
}
