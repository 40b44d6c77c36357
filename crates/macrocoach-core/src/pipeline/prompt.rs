/// Wrap a builder prompt in the shared JSON-only instructions.
pub fn json_only_prompt(prompt: &str) -> String {
    format!(
        "You are a fitness and nutrition expert. Answer with a single valid JSON object.

{prompt}

Rules:
1. Output the JSON object and nothing else
2. No commentary, notes, or markdown code fences
3. No URLs or special characters
4. Plain text for every string value
5. Numbers without units
6. Separate every array element and object property with a comma
7. Close every array and object"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_is_embedded() {
        let wrapped = json_only_prompt("Generate macros for 80kg.");
        assert!(wrapped.contains("\n\nGenerate macros for 80kg.\n\n"));
        assert!(wrapped.starts_with("You are a fitness and nutrition expert."));
        assert!(wrapped.ends_with("Close every array and object"));
    }
}
