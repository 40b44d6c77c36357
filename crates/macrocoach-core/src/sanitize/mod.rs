//! Response sanitizer.
//!
//! Turns raw model output into text that is as likely as possible to parse
//! as the intended JSON. [`sanitize`] is a fixed sequence of pure passes:
//!
//! 1. noise removal (fences, URLs, comments, trailing notes, ellipses,
//!    non-printable characters, whitespace runs)
//! 2. candidate extraction (first opener to last closer)
//! 3. category shape repair (weekly meal plans and truncated day plans)
//! 4. punctuation repair (unit suffixes, commas, bare keys, doubled braces)
//! 5. delimiter balancing
//! 6. `macroTargets` array re-segmentation
//!
//! Every pass is total: it never fails, it only rewrites.

mod balance;
mod lexer;
mod macro_targets;
mod noise;
mod punctuation;
mod shape;

/// A named sanitizer pass.
pub type Pass = fn(&str) -> String;

/// The passes in application order.
pub const PASSES: [(&str, Pass); 6] = [
    ("strip_noise", noise::strip_noise),
    ("extract_candidate", noise::extract_candidate),
    ("repair_category_shape", shape::repair_category_shape),
    ("repair_punctuation", punctuation::repair_punctuation),
    ("balance_delimiters", balance::balance_delimiters),
    ("repair_macro_targets", macro_targets::repair_macro_targets),
];

/// Run every pass over `raw`.
pub fn sanitize(raw: &str) -> String {
    let mut text = raw.to_owned();
    for (name, pass) in PASSES {
        let next = pass(&text);
        if next != text {
            tracing::trace!(pass = name, before = text.len(), after = next.len(), "sanitizer pass rewrote text");
        }
        text = next;
    }
    text
}
