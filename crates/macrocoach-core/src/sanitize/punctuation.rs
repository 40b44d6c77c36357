//! Pass 4: generic punctuation repair.

use std::sync::LazyLock;

use regex::Regex;

use super::lexer::{Token, lex, next_significant, prev_significant, render};

static NUMBER_WITH_UNIT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(-?\d+(?:\.\d+)?)[A-Za-z%]+$").unwrap());

static NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^-?\d+(?:\.\d+)?$").unwrap());

static BARE_KEY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_-]*$").unwrap());

/// Unit words that may trail a number after a space, as in `30 g`.
const UNIT_WORDS: &[&str] = &[
    "g", "gm", "gms", "gram", "grams", "kg", "mg", "ml", "l", "kcal", "cal", "calories", "oz",
    "lb", "lbs", "min", "mins", "sec", "secs", "s", "%",
];

pub(crate) fn repair_punctuation(text: &str) -> String {
    let tokens = lex(text);
    let tokens = strip_numeric_units(tokens);
    let tokens = insert_missing_commas(tokens);
    let tokens = quote_bare_keys(tokens);
    let tokens = collapse_doubled_braces(tokens);
    let tokens = tidy_commas(tokens);
    render(&tokens)
}

/// `30g` becomes `30`; `30 g` becomes `30` when the unit ends the value.
pub(crate) fn strip_numeric_units(tokens: Vec<Token>) -> Vec<Token> {
    let mut out: Vec<Token> = Vec::with_capacity(tokens.len());
    let mut i = 0;

    while i < tokens.len() {
        let token = &tokens[i];
        let is_key = next_significant(&tokens, i + 1).is_some_and(|n| tokens[n].is(':'));

        if let Token::Word(word) = token {
            if !is_key {
                if let Some(caps) = NUMBER_WITH_UNIT_RE.captures(word) {
                    out.push(Token::Word(caps[1].to_owned()));
                    i += 1;
                    continue;
                }
                if NUMBER_RE.is_match(word) && unit_follows(&tokens, i) {
                    out.push(token.clone());
                    i += 3;
                    continue;
                }
            }
        }

        out.push(token.clone());
        i += 1;
    }

    out
}

/// True when `tokens[i]` is followed by a space, a unit word, and then the
/// end of the value.
fn unit_follows(tokens: &[Token], i: usize) -> bool {
    let (Some(space), Some(Token::Word(unit))) = (tokens.get(i + 1), tokens.get(i + 2)) else {
        return false;
    };
    if !space.is_space() || !UNIT_WORDS.contains(&unit.to_ascii_lowercase().as_str()) {
        return false;
    }
    match next_significant(tokens, i + 3) {
        None => true,
        Some(n) => matches!(tokens[n].punct(), Some(',' | '}' | ']')),
    }
}

/// Insert a comma between a token that ends a value and one that starts
/// the next value or key.
pub(crate) fn insert_missing_commas(tokens: Vec<Token>) -> Vec<Token> {
    let mut out: Vec<Token> = Vec::with_capacity(tokens.len());
    let mut last_significant: Option<usize> = None;

    for token in tokens {
        if token.is_space() {
            out.push(token);
            continue;
        }
        if let Some(prev) = last_significant {
            if token.starts_value() && out[prev].ends_value() {
                out.insert(prev + 1, Token::Punct(','));
            }
        }
        out.push(token);
        last_significant = Some(out.len() - 1);
    }

    out
}

/// Quote identifier-like words in key position.
pub(crate) fn quote_bare_keys(mut tokens: Vec<Token>) -> Vec<Token> {
    for i in 0..tokens.len() {
        let Token::Word(word) = &tokens[i] else {
            continue;
        };
        if !BARE_KEY_RE.is_match(word) {
            continue;
        }
        let before_colon = next_significant(&tokens, i + 1).is_some_and(|n| tokens[n].is(':'));
        let key_position = match prev_significant(&tokens, i) {
            None => true,
            Some(p) => matches!(tokens[p].punct(), Some('{' | ',')),
        };
        if before_colon && key_position {
            tokens[i] = Token::Str {
                text: format!("\"{word}\""),
                closed: true,
            };
        }
    }
    tokens
}

/// Collapse `{{ ... }}` into `{ ... }`.
///
/// A `{` directly following another `{` opens a phantom frame; the closer
/// that pops a phantom frame is dropped along with it.
pub(crate) fn collapse_doubled_braces(tokens: Vec<Token>) -> Vec<Token> {
    let mut out = Vec::with_capacity(tokens.len());
    let mut frames: Vec<(char, bool)> = Vec::new();
    let mut prev_was_brace = false;

    for token in tokens {
        if token.is_space() {
            out.push(token);
            continue;
        }
        let opens_brace = token.is('{');
        match token.punct() {
            Some('{') if prev_was_brace => frames.push(('{', true)),
            Some(c @ ('{' | '[')) => {
                frames.push((c, false));
                out.push(token);
            }
            Some('}') => match frames.last() {
                Some(('{', true)) => {
                    frames.pop();
                }
                Some(('{', false)) => {
                    frames.pop();
                    out.push(token);
                }
                _ => out.push(token),
            },
            Some(']') => {
                if matches!(frames.last(), Some(('[', _))) {
                    frames.pop();
                }
                out.push(token);
            }
            _ => out.push(token),
        }
        prev_was_brace = opens_brace;
    }

    out
}

/// Drop trailing, leading, and repeated commas.
pub(crate) fn tidy_commas(tokens: Vec<Token>) -> Vec<Token> {
    let mut out: Vec<Token> = Vec::with_capacity(tokens.len());

    for (i, token) in tokens.iter().enumerate() {
        if token.is(',') {
            let next = next_significant(&tokens, i + 1).and_then(|n| tokens[n].punct());
            let prev = prev_significant(&out, out.len()).map(|p| out[p].punct());
            let dangling_before = matches!(next, Some('}' | ']' | ','));
            let dangling_after = match prev {
                None => true,
                Some(p) => matches!(p, Some('{' | '[')),
            };
            if dangling_before || dangling_after {
                continue;
            }
        }
        out.push(token.clone());
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(f: fn(Vec<Token>) -> Vec<Token>, input: &str) -> String {
        render(&f(lex(input)))
    }

    #[test]
    fn unit_suffixes_are_stripped_from_values() {
        assert_eq!(
            run(strip_numeric_units, r#"{"protein": 30g, "fats": 12.5 g, "rest": 60s}"#),
            r#"{"protein": 30, "fats": 12.5, "rest": 60}"#
        );
    }

    #[test]
    fn unit_suffix_on_key_is_kept() {
        assert_eq!(run(strip_numeric_units, "{2x: 1}"), "{2x: 1}");
    }

    #[test]
    fn spaced_unit_mid_text_is_kept() {
        assert_eq!(
            run(strip_numeric_units, r#"{"a": 3 g extra}"#),
            r#"{"a": 3 g extra}"#
        );
    }

    #[test]
    fn commas_inserted_between_values() {
        assert_eq!(
            run(insert_missing_commas, r#"{"a": 1 "b": 2} {"c": [1 2]}"#),
            r#"{"a": 1, "b": 2}, {"c": [1, 2]}"#
        );
    }

    #[test]
    fn bare_keys_are_quoted() {
        assert_eq!(
            run(quote_bare_keys, r#"{name: "Oats", "a": 1, calories : 300}"#),
            r#"{"name": "Oats", "a": 1, "calories" : 300}"#
        );
    }

    #[test]
    fn bare_values_are_not_quoted() {
        assert_eq!(run(quote_bare_keys, r#"{"a": true}"#), r#"{"a": true}"#);
    }

    #[test]
    fn doubled_braces_collapse() {
        assert_eq!(
            run(collapse_doubled_braces, r#"{{"a": {"b": 1}}}"#),
            r#"{"a": {"b": 1}}"#
        );
        assert_eq!(
            run(collapse_doubled_braces, r#"[{{ "a": 1 }}, {"b": 2}]"#),
            r#"[{ "a": 1 }, {"b": 2}]"#
        );
    }

    #[test]
    fn tripled_braces_collapse() {
        assert_eq!(run(collapse_doubled_braces, r#"{{{"a": 1}}}"#), r#"{"a": 1}"#);
    }

    #[test]
    fn nested_objects_are_not_collapsed() {
        let input = r#"{"a": {"b": {"c": 1}}}"#;
        assert_eq!(run(collapse_doubled_braces, input), input);
    }

    #[test]
    fn trailing_and_repeated_commas_are_dropped() {
        assert_eq!(
            run(tidy_commas, r#"{"a": [1, 2,], "b": 3,, "c": 4, }"#),
            r#"{"a": [1, 2], "b": 3, "c": 4 }"#
        );
        assert_eq!(run(tidy_commas, "[, 1]"), "[ 1]");
    }

    #[test]
    fn commas_inside_strings_are_untouched() {
        let input = r#"{"a": "x,}"}"#;
        assert_eq!(run(tidy_commas, input), input);
    }

    #[test]
    fn full_punctuation_repair() {
        let input = r#"{{macroTargets: [{nutrient: "protein" amount: 150g, details: "x",},]}}"#;
        let repaired = repair_punctuation(input);
        let value: serde_json::Value = serde_json::from_str(&repaired).unwrap();
        assert_eq!(value["macroTargets"][0]["amount"], 150);
        assert_eq!(value["macroTargets"][0]["nutrient"], "protein");
    }
}
