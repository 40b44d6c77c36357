//! Pass 5: delimiter balancing.

use super::lexer::{Token, lex, prev_significant, render};

fn closer_for(opener: char) -> char {
    if opener == '{' { '}' } else { ']' }
}

fn opener_for(closer: char) -> char {
    if closer == '}' { '{' } else { '[' }
}

/// Close whatever the text left open.
///
/// A closer that matches an outer frame first closes every frame nested
/// inside it. At the end of input an open string literal is terminated, a
/// dangling `,` is dropped, a dangling key or `:` gets a `null` value, and
/// the remaining frames are closed innermost first. Openers are never
/// inserted; closers with no matching frame are left in place.
pub(crate) fn balance_delimiters(text: &str) -> String {
    let mut stack: Vec<char> = Vec::new();
    let mut out: Vec<Token> = Vec::new();

    for token in lex(text) {
        match token.punct() {
            Some(c @ ('{' | '[')) => {
                stack.push(c);
                out.push(token);
            }
            Some(c @ ('}' | ']')) => {
                let want = opener_for(c);
                if let Some(pos) = stack.iter().rposition(|&o| o == want) {
                    for inner in stack.drain(pos + 1..).rev() {
                        out.push(Token::Punct(closer_for(inner)));
                    }
                    stack.pop();
                }
                out.push(token);
            }
            _ => out.push(token),
        }
    }

    if stack.is_empty() && !matches!(out.last(), Some(Token::Str { closed: false, .. })) {
        return render(&out);
    }

    if let Some(Token::Str { text, closed }) = out.last_mut() {
        if !*closed {
            if text.ends_with('\\') {
                text.pop();
            }
            text.push('"');
            *closed = true;
        }
    }

    if let Some(last) = prev_significant(&out, out.len()) {
        let is_string = matches!(out[last], Token::Str { .. });
        match out[last].punct() {
            Some(',') => out.truncate(last),
            Some(':') => out.push(Token::Word("null".to_owned())),
            _ if is_string && in_key_position(&out, last, &stack) => {
                out.push(Token::Punct(':'));
                out.push(Token::Space(" ".to_owned()));
                out.push(Token::Word("null".to_owned()));
            }
            _ => {}
        }
    }

    for opener in stack.iter().rev() {
        out.push(Token::Punct(closer_for(*opener)));
    }

    render(&out)
}

/// True when the string at `idx` sits where an object key belongs.
fn in_key_position(tokens: &[Token], idx: usize, stack: &[char]) -> bool {
    if stack.last() != Some(&'{') {
        return false;
    }
    match prev_significant(tokens, idx) {
        Some(p) => matches!(tokens[p].punct(), Some('{' | ',')),
        None => false,
    }
}
