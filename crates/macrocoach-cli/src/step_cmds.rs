//! One subcommand per request builder. Each prints its record as pretty
//! JSON on stdout.

use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use macrocoach_core::builders::{
    fill_missing_days, generate_day_plan, generate_grocery_list, generate_macro_targets,
    generate_meal_plan, generate_workout_plan,
};
use macrocoach_core::pipeline::{Pipeline, PipelineError};
use macrocoach_model::{MacroTarget, MealPlan, PersonalData, Tier, Weekday};

/// A user-facing generation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    MacroTargets,
    MealPlan,
    DayPlan,
    GroceryList,
    WorkoutPlan,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::MacroTargets => "macro targets",
            Self::MealPlan => "meal plan",
            Self::DayPlan => "day plan",
            Self::GroceryList => "grocery list",
            Self::WorkoutPlan => "workout plan",
        };
        f.write_str(s)
    }
}

pub fn log_step_failure(step: Step, err: &PipelineError) {
    tracing::error!(step = %step, category = %err.category(), error = %err, "generation step failed");
}

/// Log the full failure and reduce it to the one message users see.
pub fn step_failed(step: Step, err: &PipelineError) -> anyhow::Error {
    log_step_failure(step, err);
    anyhow::anyhow!("could not generate the {step} part of the plan")
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("failed to serialize output")?;
    println!("{json}");
    Ok(())
}

/// Macro targets from a file, or none (the meal builders then use their
/// defaults).
pub fn load_targets(path: Option<&Path>) -> Result<Vec<MacroTarget>> {
    let Some(path) = path else {
        return Ok(Vec::new());
    };
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read targets file {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("{} does not hold a list of macro targets", path.display()))
}

pub fn load_meal_plan(path: &Path) -> Result<MealPlan> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read meal plan file {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("{} does not hold a meal plan", path.display()))
}

pub async fn run_macros(pipeline: &Pipeline, personal: &PersonalData, tdee: f64) -> Result<()> {
    let targets = generate_macro_targets(pipeline, personal, tdee)
        .await
        .map_err(|e| step_failed(Step::MacroTargets, &e))?;
    print_json(&targets)
}

pub async fn run_meals(
    pipeline: &Pipeline,
    personal: &PersonalData,
    tdee: f64,
    targets: &[MacroTarget],
    fill_missing: bool,
) -> Result<()> {
    let mut plan = generate_meal_plan(pipeline, personal, tdee, targets)
        .await
        .map_err(|e| step_failed(Step::MealPlan, &e))?;
    if fill_missing {
        for tier in Tier::ALL {
            fill_missing_days(pipeline, &mut plan, personal, tdee, targets, tier)
                .await
                .map_err(|e| step_failed(Step::DayPlan, &e))?;
        }
    }
    print_json(&plan)
}

pub async fn run_day(
    pipeline: &Pipeline,
    personal: &PersonalData,
    tdee: f64,
    targets: &[MacroTarget],
    tier: Tier,
    day: Weekday,
) -> Result<()> {
    let plan = generate_day_plan(pipeline, personal, tdee, targets, tier, day)
        .await
        .map_err(|e| step_failed(Step::DayPlan, &e))?;
    print_json(&plan)
}

pub async fn run_grocery(pipeline: &Pipeline, plan: &MealPlan, tier: Tier) -> Result<()> {
    if plan.tier(tier).is_empty() {
        anyhow::bail!("the meal plan has no {tier} days to shop for");
    }
    let items = generate_grocery_list(pipeline, plan, tier)
        .await
        .map_err(|e| step_failed(Step::GroceryList, &e))?;
    print_json(&items)
}

pub async fn run_workout(pipeline: &Pipeline, personal: &PersonalData) -> Result<()> {
    let days = generate_workout_plan(pipeline, personal)
        .await
        .map_err(|e| step_failed(Step::WorkoutPlan, &e))?;
    print_json(&days)
}
