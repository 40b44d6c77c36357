//! Runs the `macrocoach` binary on commands that need no provider.

use std::process::Command;

fn macrocoach() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_macrocoach"));
    cmd.env("RUST_LOG", "off");
    cmd
}

#[test]
fn repair_prints_the_normalized_record() {
    let tmp = tempfile::TempDir::new().unwrap();
    let path = tmp.path().join("raw.txt");
    std::fs::write(
        &path,
        "```json\n{\"groceryList\": [{\"item\": \"Oats\", \"quantity\": 2kg, \"unit\": \"\", \"price\": 120, \"notes\": \"\"},]}\n```",
    )
    .unwrap();

    let output = macrocoach()
        .args(["repair", "--category", "grocery"])
        .arg(&path)
        .output()
        .unwrap();

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let items: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(items[0]["item"], "Oats");
    assert_eq!(items[0]["quantity"], 2.0);
    assert_eq!(items[0]["unit"], "unit");
}

#[test]
fn repair_cleaned_prints_sanitized_text() {
    let tmp = tempfile::TempDir::new().unwrap();
    let path = tmp.path().join("raw.txt");
    std::fs::write(&path, "Sure! {\"macroTargets\": [{\"nutrient\": \"protein\"").unwrap();

    let output = macrocoach()
        .args(["repair", "--category", "macros", "--cleaned"])
        .arg(&path)
        .output()
        .unwrap();

    assert!(output.status.success());
    let text = String::from_utf8(output.stdout).unwrap();
    let value: serde_json::Value = serde_json::from_str(text.trim()).unwrap();
    assert_eq!(value["macroTargets"][0]["nutrient"], "protein");
}

#[test]
fn repair_failure_exits_nonzero() {
    let tmp = tempfile::TempDir::new().unwrap();
    let path = tmp.path().join("raw.txt");
    std::fs::write(&path, "no json here").unwrap();

    let output = macrocoach()
        .args(["repair", "--category", "workout"])
        .arg(&path)
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("could not be repaired as a workout_plan"), "{stderr}");
}

#[test]
fn completions_are_printed() {
    let output = macrocoach().args(["completions", "bash"]).output().unwrap();
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("macrocoach"));
}
