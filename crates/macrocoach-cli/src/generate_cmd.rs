//! `macrocoach generate`: every step in order, keeping what succeeded.

use chrono::{DateTime, Utc};
use serde::Serialize;

use macrocoach_core::builders::{
    fill_missing_days, generate_grocery_list, generate_macro_targets, generate_meal_plan,
    generate_workout_plan,
};
use macrocoach_core::pipeline::{Pipeline, PipelineError};
use macrocoach_model::{
    DayWorkout, GroceryItem, MacroTarget, MealPlan, PersonalData, ProviderId, Tier,
};

use crate::step_cmds::{Step, log_step_failure};

#[derive(Debug, Clone)]
pub struct GenerateOptions {
    pub tdee: f64,
    /// Tier the grocery list is built for.
    pub tier: Tier,
    pub fill_premium: bool,
}

/// Everything `generate` produced. Steps after `failed_step` are absent.
#[derive(Debug, Serialize)]
pub struct GeneratedPlan {
    pub generated_at: DateTime<Utc>,
    pub provider: ProviderId,
    pub model: String,
    pub macro_targets: Option<Vec<MacroTarget>>,
    pub meal_plan: Option<MealPlan>,
    pub grocery_list: Option<Vec<GroceryItem>>,
    pub workout_plan: Option<Vec<DayWorkout>>,
    pub failed_step: Option<Step>,
}

impl GeneratedPlan {
    fn new(pipeline: &Pipeline) -> Self {
        Self {
            generated_at: Utc::now(),
            provider: pipeline.provider(),
            model: pipeline.model().to_owned(),
            macro_targets: None,
            meal_plan: None,
            grocery_list: None,
            workout_plan: None,
            failed_step: None,
        }
    }

    fn failed(mut self, step: Step, err: &PipelineError) -> Self {
        log_step_failure(step, err);
        self.failed_step = Some(step);
        self
    }
}

/// Macros, then meals, then groceries, then workout. Stops at the first
/// step that fails.
pub async fn run_generate(
    pipeline: &Pipeline,
    personal: &PersonalData,
    options: &GenerateOptions,
) -> GeneratedPlan {
    let mut out = GeneratedPlan::new(pipeline);

    let targets = match generate_macro_targets(pipeline, personal, options.tdee).await {
        Ok(targets) => targets,
        Err(e) => return out.failed(Step::MacroTargets, &e),
    };
    out.macro_targets = Some(targets.clone());

    let mut plan = match generate_meal_plan(pipeline, personal, options.tdee, &targets).await {
        Ok(plan) => plan,
        Err(e) => return out.failed(Step::MealPlan, &e),
    };
    if options.fill_premium {
        // A failed fill keeps the days filled so far.
        if let Err(e) =
            fill_missing_days(pipeline, &mut plan, personal, options.tdee, &targets, Tier::Premium)
                .await
        {
            tracing::warn!(error = %e, "could not fill every premium day");
        }
    }

    if plan.tier(options.tier).is_empty() {
        tracing::warn!(tier = %options.tier, "no days to build a grocery list from");
        out.meal_plan = Some(plan);
        out.failed_step = Some(Step::GroceryList);
        return out;
    }
    let groceries = generate_grocery_list(pipeline, &plan, options.tier).await;
    out.meal_plan = Some(plan);
    match groceries {
        Ok(items) => out.grocery_list = Some(items),
        Err(e) => return out.failed(Step::GroceryList, &e),
    }

    match generate_workout_plan(pipeline, personal).await {
        Ok(days) => out.workout_plan = Some(days),
        Err(e) => return out.failed(Step::WorkoutPlan, &e),
    }
    out
}
