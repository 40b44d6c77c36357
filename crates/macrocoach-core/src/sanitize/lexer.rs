//! A forgiving tokenizer for JSON-like text.
//!
//! Lexing is total: any input produces a token stream that renders back to
//! exactly the input. The repair passes work on tokens so that rewrites never
//! touch the inside of string literals.

/// One lexical unit of candidate text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Token {
    /// A string literal including its quotes. `closed` is false when the
    /// input ended before the closing quote.
    Str { text: String, closed: bool },
    /// One of `{ } [ ] : ,`.
    Punct(char),
    /// Any other run of non-whitespace: numbers, literals, bare keys, prose.
    Word(String),
    Space(String),
}

impl Token {
    pub(crate) fn punct(&self) -> Option<char> {
        match self {
            Token::Punct(c) => Some(*c),
            _ => None,
        }
    }

    pub(crate) fn is(&self, c: char) -> bool {
        self.punct() == Some(c)
    }

    pub(crate) fn is_space(&self) -> bool {
        matches!(self, Token::Space(_))
    }

    /// True for a closed string literal whose content equals `key`.
    pub(crate) fn is_string(&self, key: &str) -> bool {
        match self {
            Token::Str { text, closed: true } => text.len() == key.len() + 2 && &text[1..text.len() - 1] == key,
            _ => false,
        }
    }

    /// True when this token can end a JSON value.
    pub(crate) fn ends_value(&self) -> bool {
        match self {
            Token::Punct(c) => matches!(c, '}' | ']'),
            Token::Str { closed, .. } => *closed,
            Token::Word(_) => true,
            Token::Space(_) => false,
        }
    }

    /// True when this token can start a JSON value (or an object key).
    pub(crate) fn starts_value(&self) -> bool {
        match self {
            Token::Punct(c) => matches!(c, '{' | '['),
            Token::Str { .. } | Token::Word(_) => true,
            Token::Space(_) => false,
        }
    }

    fn push_to(&self, out: &mut String) {
        match self {
            Token::Str { text, .. } | Token::Word(text) | Token::Space(text) => out.push_str(text),
            Token::Punct(c) => out.push(*c),
        }
    }
}

fn is_punct(c: char) -> bool {
    matches!(c, '{' | '}' | '[' | ']' | ':' | ',')
}

/// Split `text` into tokens.
pub(crate) fn lex(text: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut chars = text.char_indices().peekable();

    while let Some((start, c)) = chars.next() {
        if c.is_whitespace() {
            let mut end = start + c.len_utf8();
            while let Some(&(i, next)) = chars.peek() {
                if !next.is_whitespace() {
                    break;
                }
                end = i + next.len_utf8();
                chars.next();
            }
            tokens.push(Token::Space(text[start..end].to_owned()));
        } else if c == '"' {
            let mut end = text.len();
            let mut closed = false;
            let mut escaped = false;
            for (i, next) in chars.by_ref() {
                if escaped {
                    escaped = false;
                } else if next == '\\' {
                    escaped = true;
                } else if next == '"' {
                    end = i + 1;
                    closed = true;
                    break;
                }
            }
            tokens.push(Token::Str {
                text: text[start..end].to_owned(),
                closed,
            });
        } else if is_punct(c) {
            tokens.push(Token::Punct(c));
        } else {
            let mut end = start + c.len_utf8();
            while let Some(&(i, next)) = chars.peek() {
                if next.is_whitespace() || next == '"' || is_punct(next) {
                    break;
                }
                end = i + next.len_utf8();
                chars.next();
            }
            tokens.push(Token::Word(text[start..end].to_owned()));
        }
    }

    tokens
}

/// Concatenate tokens back into text.
pub(crate) fn render(tokens: &[Token]) -> String {
    let mut out = String::new();
    for token in tokens {
        token.push_to(&mut out);
    }
    out
}

/// Index of the next non-space token at or after `from`.
pub(crate) fn next_significant(tokens: &[Token], from: usize) -> Option<usize> {
    (from..tokens.len()).find(|&i| !tokens[i].is_space())
}

/// Index of the last non-space token strictly before `before`.
pub(crate) fn prev_significant(tokens: &[Token], before: usize) -> Option<usize> {
    (0..before.min(tokens.len())).rev().find(|&i| !tokens[i].is_space())
}

/// Index of the delimiter closing the `{` or `[` at `open`, counting both
/// kinds of nesting. `None` when the input ends first.
pub(crate) fn matching_close(tokens: &[Token], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, token) in tokens.iter().enumerate().skip(open) {
        match token.punct() {
            Some('{' | '[') => depth += 1,
            Some('}' | ']') => {
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

/// Index of the first token of the value bound to `key` at or after `from`,
/// i.e. the token following `"key" :`.
pub(crate) fn find_key_value(tokens: &[Token], from: usize, key: &str) -> Option<usize> {
    let mut i = from;
    while i < tokens.len() {
        if tokens[i].is_string(key) {
            if let Some(colon) = next_significant(tokens, i + 1) {
                if tokens[colon].is(':') {
                    return next_significant(tokens, colon + 1);
                }
            }
        }
        i += 1;
    }
    None
}

/// True when every opener is closed by a delimiter of the same kind, no
/// closer is unmatched, and no string literal is left open.
pub(crate) fn is_balanced(tokens: &[Token]) -> bool {
    let mut stack = Vec::new();
    for token in tokens {
        match token {
            Token::Punct(c @ ('{' | '[')) => stack.push(*c),
            Token::Punct('}') => {
                if stack.pop() != Some('{') {
                    return false;
                }
            }
            Token::Punct(']') => {
                if stack.pop() != Some('[') {
                    return false;
                }
            }
            Token::Str { closed: false, .. } => return false,
            _ => {}
        }
    }
    stack.is_empty()
}

/// Apply `f` to every maximal run of text outside string literals, leaving
/// string literals untouched.
pub(crate) fn map_outside_strings(text: &str, f: impl Fn(&str) -> String) -> String {
    let mut out = String::with_capacity(text.len());
    let mut run = String::new();
    for token in lex(text) {
        match token {
            Token::Str { text, .. } => {
                if !run.is_empty() {
                    out.push_str(&f(&run));
                    run.clear();
                }
                out.push_str(&text);
            }
            other => other.push_to(&mut run),
        }
    }
    if !run.is_empty() {
        out.push_str(&f(&run));
    }
    out
}
