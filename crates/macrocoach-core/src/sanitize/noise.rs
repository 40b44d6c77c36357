//! Noise removal and candidate extraction: the first two sanitizer passes.

use std::sync::LazyLock;

use regex::Regex;

use super::lexer::{Token, lex, map_outside_strings};

static CODE_FENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```[A-Za-z]*").unwrap());

static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"https?://[^\s"'<>,{}\[\]]+"#).unwrap());

static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Pass 1: strip everything that is never part of the payload.
pub(crate) fn strip_noise(text: &str) -> String {
    let text = strip_non_printable(text);
    let text = strip_code_fences(&text);
    let text = strip_urls(&text);
    let text = strip_comments(&text);
    let text = strip_trailing_note(&text);
    let text = strip_ellipses(&text);
    collapse_whitespace(&text)
}

pub(crate) fn strip_code_fences(text: &str) -> String {
    CODE_FENCE_RE.replace_all(text, "").into_owned()
}

/// URLs are dropped everywhere, including inside string literals.
pub(crate) fn strip_urls(text: &str) -> String {
    URL_RE.replace_all(text, "").into_owned()
}

/// Remove `//` line comments and `/* */` block comments outside strings.
pub(crate) fn strip_comments(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    let mut in_string = false;
    let mut escaped = false;

    while let Some(c) = chars.next() {
        if in_string {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        match c {
            '"' => {
                in_string = true;
                out.push(c);
            }
            '/' if chars.peek() == Some(&'/') => {
                for next in chars.by_ref() {
                    if next == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = '\0';
                for next in chars.by_ref() {
                    if prev == '*' && next == '/' {
                        break;
                    }
                    prev = next;
                }
                out.push(' ');
            }
            _ => out.push(c),
        }
    }

    out
}

/// Truncate at a `Note:` section that follows the start of the payload.
///
/// A `Note:` before the first `{` or `[` is left for extraction to discard.
pub(crate) fn strip_trailing_note(text: &str) -> String {
    let tokens = lex(text);
    let mut offset = 0;
    let mut payload_started = false;

    for (i, token) in tokens.iter().enumerate() {
        match token {
            Token::Punct('{' | '[') => payload_started = true,
            Token::Word(word) if payload_started && tokens.get(i + 1).is_some_and(|t| t.is(':')) => {
                if let Some(prefix) = word.strip_suffix("Note") {
                    if !prefix.chars().any(char::is_alphanumeric) {
                        let cut = offset + prefix.len();
                        return text[..cut].to_owned();
                    }
                }
            }
            _ => {}
        }
        offset += token_len(token);
    }

    text.to_owned()
}

fn token_len(token: &Token) -> usize {
    match token {
        Token::Str { text, .. } | Token::Word(text) | Token::Space(text) => text.len(),
        Token::Punct(c) => c.len_utf8(),
    }
}

pub(crate) fn strip_ellipses(text: &str) -> String {
    map_outside_strings(text, |run| run.replace("...", "").replace('\u{2026}', ""))
}

/// Drop control characters other than newline and tab, plus zero-width
/// characters and byte-order marks. Other non-ASCII text is kept.
pub(crate) fn strip_non_printable(text: &str) -> String {
    text.chars()
        .filter(|&c| {
            let control = c.is_control() && c != '\n' && c != '\t';
            let invisible = matches!(c, '\u{200B}'..='\u{200D}' | '\u{2060}' | '\u{FEFF}');
            !control && !invisible
        })
        .collect()
}

pub(crate) fn collapse_whitespace(text: &str) -> String {
    WHITESPACE_RE.replace_all(text, " ").trim().to_owned()
}

/// Pass 2: isolate the JSON candidate.
///
/// The candidate runs from the first `{` or `[` to the last closing
/// delimiter after it. A candidate with no closer at all runs to the end of
/// the text so truncated output can still be balanced later.
pub(crate) fn extract_candidate(text: &str) -> String {
    let Some(start) = text.find(['{', '[']) else {
        return text.to_owned();
    };
    match text[start..].rfind(['}', ']']) {
        Some(end) => text[start..=start + end].to_owned(),
        None => text[start..].to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fences_are_removed() {
        assert_eq!(
            strip_code_fences("```json\n{\"a\": 1}\n```"),
            "\n{\"a\": 1}\n"
        );
    }

    #[test]
    fn urls_are_removed_even_inside_strings() {
        let out = strip_urls(r#"{"src": "https://example.com/x?y=1", "n": 1} see http://a.b"#);
        assert_eq!(out, r#"{"src": "", "n": 1} see "#);
    }

    #[test]
    fn comments_outside_strings_are_removed() {
        let input = "{\"a\": 1, // first\n \"b\": \"x // y\" /* block */}";
        assert_eq!(
            strip_comments(input),
            "{\"a\": 1, \n \"b\": \"x // y\"  }"
        );
    }

    #[test]
    fn unterminated_block_comment_runs_to_end() {
        assert_eq!(strip_comments(r#"{"a": 1} /* oops"#), r#"{"a": 1}  "#);
    }

    #[test]
    fn note_after_payload_truncates() {
        let out = strip_trailing_note(r#"{"a": "Note: keep"} Note: these are estimates."#);
        assert_eq!(out, r#"{"a": "Note: keep"} "#);
    }

    #[test]
    fn note_before_payload_is_kept() {
        let input = r#"Note: here you go {"a": 1}"#;
        assert_eq!(strip_trailing_note(input), input);
    }

    #[test]
    fn ellipses_outside_strings_are_removed() {
        assert_eq!(
            strip_ellipses(r#"[1, 2, ...] "wait..." …"#),
            r#"[1, 2, ] "wait..." "#
        );
    }

    #[test]
    fn non_printable_characters_are_removed() {
        let out = strip_non_printable("{\u{feff}\"a\u{200b}\": \"caf\u{e9}\"\u{0007}}\n");
        assert_eq!(out, "{\"a\": \"caf\u{e9}\"}\n");
    }

    #[test]
    fn whitespace_is_collapsed_and_trimmed() {
        assert_eq!(collapse_whitespace("  {\n\t\"a\":   1 }\r\n"), "{ \"a\": 1 }");
    }

    #[test]
    fn extraction_takes_first_opener_to_last_closer() {
        assert_eq!(
            extract_candidate(r#"Sure! Here it is: {"a": [1]} Enjoy!"#),
            r#"{"a": [1]}"#
        );
        assert_eq!(extract_candidate("list: [1, 2] done"), "[1, 2]");
    }

    #[test]
    fn extraction_without_closer_runs_to_end() {
        assert_eq!(extract_candidate(r#"ok {"a": "b"#), r#"{"a": "b"#);
    }

    #[test]
    fn extraction_without_opener_is_identity() {
        assert_eq!(extract_candidate("no json here"), "no json here");
    }

    #[test]
    fn strip_noise_composes_all_removals() {
        let raw = "```json\n{\"a\": 1, // c\n \"b\": [1, ...]}\n```\nNote: estimates only";
        assert_eq!(strip_noise(raw), "{\"a\": 1, \"b\": [1, ]}");
    }
}
