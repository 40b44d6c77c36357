//! Weekly meal plans, generated as two concurrent day batches.

use macrocoach_model::{
    MacroTarget, Macros, MealPlan, PersonalData, ResponseCategory, Tier, Weekday,
};
use tracing::{info, warn};

use crate::normalize::TypedRecord;
use crate::pipeline::{Pipeline, PipelineError};

use super::day_plan::generate_day_plan;

/// Monday to Thursday.
pub const FIRST_BATCH: [Weekday; 4] = [
    Weekday::Monday,
    Weekday::Tuesday,
    Weekday::Wednesday,
    Weekday::Thursday,
];

/// Friday to Sunday.
pub const SECOND_BATCH: [Weekday; 3] = [Weekday::Friday, Weekday::Saturday, Weekday::Sunday];

/// Daily macro totals the meal plan is built around.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DailyTargets {
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
}

impl DailyTargets {
    pub const DEFAULT_PROTEIN: f64 = 150.0;
    pub const DEFAULT_CARBS: f64 = 200.0;
    pub const DEFAULT_FATS: f64 = 60.0;

    /// Pick protein, carbs, and fats out of `targets`, falling back to the
    /// defaults for any nutrient that is missing or zero.
    pub fn from_targets(targets: &[MacroTarget]) -> Self {
        let find = |names: &[&str], default: f64| {
            targets
                .iter()
                .find(|t| names.iter().any(|n| t.nutrient.trim().eq_ignore_ascii_case(n)))
                .map(|t| t.amount)
                .filter(|amount| *amount > 0.0)
                .unwrap_or(default)
        };
        Self {
            protein: find(&["protein"], Self::DEFAULT_PROTEIN),
            carbs: find(&["carbs", "carbohydrates"], Self::DEFAULT_CARBS),
            fats: find(&["fats", "fat"], Self::DEFAULT_FATS),
        }
    }

    fn share(&self, fraction: f64) -> Macros {
        Macros {
            protein: (self.protein * fraction).round(),
            carbs: (self.carbs * fraction).round(),
            fats: (self.fats * fraction).round(),
        }
    }
}

/// Per-meal macro sub-targets: 25% breakfast, 35% lunch, 30% dinner, 10%
/// snack, each rounded to whole grams.
#[derive(Debug, Clone, PartialEq)]
pub struct MealDistribution {
    pub breakfast: Macros,
    pub lunch: Macros,
    pub dinner: Macros,
    pub snack: Macros,
}

impl MealDistribution {
    pub fn new(daily: &DailyTargets) -> Self {
        Self {
            breakfast: daily.share(0.25),
            lunch: daily.share(0.35),
            dinner: daily.share(0.30),
            snack: daily.share(0.10),
        }
    }
}

fn grams(m: &Macros) -> String {
    format!("{}g protein, {}g carbs, {}g fats", m.protein, m.carbs, m.fats)
}

fn day_list(days: &[Weekday]) -> String {
    days.iter().map(|d| d.as_str()).collect::<Vec<_>>().join(", ")
}

pub fn meal_batch_prompt(
    personal: &PersonalData,
    tdee: f64,
    daily: &DailyTargets,
    days: &[Weekday],
) -> String {
    let split = MealDistribution::new(daily);
    let first = days.first().copied().unwrap_or(Weekday::Monday);
    let days = day_list(days);
    format!(
        r#"Generate a macro-matched meal plan for: {days}

Daily targets:
- Calories: {tdee} kcal
- Protein: {protein}g
- Carbs: {carbs}g
- Fats: {fats}g
- Goal: {goal}

Per-meal targets:
- Breakfast: {breakfast}
- Lunch: {lunch}
- Dinner: {dinner}
- Snack: {snack}

Give every day an affordable version (everyday ingredients) and a premium
version (higher quality ingredients) with the same macros.

Return a JSON object with this structure:
{{
  "mealPlan": {{
    "affordable": {{
      "{first}": {{
        "breakfast": {{
          "name": "string",
          "time": "HH:MM",
          "recipe": "ingredients with quantities",
          "calories": number,
          "macros": {{"protein": number, "carbs": number, "fats": number}}
        }},
        "lunch": {{same structure}},
        "dinner": {{same structure}},
        "snack": {{same structure}}
      }}
    }},
    "premium": {{same structure as affordable}}
  }}
}}

Include only these days: {days}."#,
        tdee = tdee.round(),
        protein = daily.protein,
        carbs = daily.carbs,
        fats = daily.fats,
        goal = personal.goal,
        breakfast = grams(&split.breakfast),
        lunch = grams(&split.lunch),
        dinner = grams(&split.dinner),
        snack = grams(&split.snack),
    )
}

/// Union of the batches' day maps, tier by tier. Later batches win on a
/// shared day, which does not happen when batches cover disjoint days.
pub fn merge_batches(batches: impl IntoIterator<Item = MealPlan>) -> MealPlan {
    let mut merged = MealPlan::default();
    for batch in batches {
        let MealPlan {
            affordable,
            premium,
        } = batch;
        merged.affordable.extend(affordable);
        merged.premium.extend(premium);
    }
    merged
}

async fn generate_batch(
    pipeline: &Pipeline,
    personal: &PersonalData,
    tdee: f64,
    daily: &DailyTargets,
    days: &[Weekday],
) -> Result<MealPlan, PipelineError> {
    let prompt = meal_batch_prompt(personal, tdee, daily, days);
    pipeline
        .execute_as(&prompt, ResponseCategory::MealBatch, TypedRecord::into_meal_batch)
        .await
}

/// Generate the week as two concurrent batches and merge them.
///
/// Days missing after the merge are logged, not treated as failures.
pub async fn generate_meal_plan(
    pipeline: &Pipeline,
    personal: &PersonalData,
    tdee: f64,
    targets: &[MacroTarget],
) -> Result<MealPlan, PipelineError> {
    let daily = DailyTargets::from_targets(targets);
    let (first, second) = futures::join!(
        generate_batch(pipeline, personal, tdee, &daily, &FIRST_BATCH),
        generate_batch(pipeline, personal, tdee, &daily, &SECOND_BATCH),
    );
    let plan = merge_batches([first?, second?]);

    for tier in Tier::ALL {
        let missing = plan.missing_days(tier);
        if !missing.is_empty() {
            warn!(tier = %tier, missing = ?missing, "meal plan is missing days");
        }
    }
    Ok(plan)
}

/// Fill each day absent from `tier` with a single-day request, one day at a
/// time. Returns the days that were filled.
pub async fn fill_missing_days(
    pipeline: &Pipeline,
    plan: &mut MealPlan,
    personal: &PersonalData,
    tdee: f64,
    targets: &[MacroTarget],
    tier: Tier,
) -> Result<Vec<Weekday>, PipelineError> {
    let missing = plan.missing_days(tier);
    for day in &missing {
        let day_plan = generate_day_plan(pipeline, personal, tdee, targets, tier, *day).await?;
        plan.tier_mut(tier).insert(*day, day_plan);
        info!(tier = %tier, day = %day, "filled missing day");
    }
    Ok(missing)
}

#[cfg(test)]
mod tests {
    use super::*;
    use macrocoach_model::{DayPlan, Goal, Meal};

    fn target(nutrient: &str, amount: f64) -> MacroTarget {
        MacroTarget {
            nutrient: nutrient.to_string(),
            amount,
            details: String::new(),
        }
    }

    #[test]
    fn batches_cover_the_week_once() {
        let mut days: Vec<Weekday> = FIRST_BATCH.iter().chain(&SECOND_BATCH).copied().collect();
        days.sort();
        days.dedup();
        assert_eq!(days, Weekday::ALL.to_vec());
    }

    #[test]
    fn daily_targets_read_named_nutrients() {
        let daily = DailyTargets::from_targets(&[
            target("Protein", 180.0),
            target("carbohydrates", 250.0),
            target("fats", 70.0),
        ]);
        assert_eq!(
            daily,
            DailyTargets {
                protein: 180.0,
                carbs: 250.0,
                fats: 70.0
            }
        );
    }

    #[test]
    fn daily_targets_default_when_missing() {
        let daily = DailyTargets::from_targets(&[target("protein", 0.0), target("fiber", 30.0)]);
        assert_eq!(daily.protein, 150.0);
        assert_eq!(daily.carbs, 200.0);
        assert_eq!(daily.fats, 60.0);
    }

    #[test]
    fn distribution_rounds_each_share() {
        let split = MealDistribution::new(&DailyTargets {
            protein: 150.0,
            carbs: 200.0,
            fats: 60.0,
        });
        assert_eq!(
            split.breakfast,
            Macros {
                protein: 38.0,
                carbs: 50.0,
                fats: 15.0
            }
        );
        assert_eq!(split.lunch.carbs, 70.0);
        assert_eq!(split.dinner.carbs, 60.0);
        assert_eq!(split.snack.fats, 6.0);
    }

    #[test]
    fn batch_prompt_lists_days_and_splits() {
        let personal = PersonalData {
            weight: 70.0,
            goal: Goal::WeightLoss,
        };
        let daily = DailyTargets::from_targets(&[]);
        let prompt = meal_batch_prompt(&personal, 2200.0, &daily, &SECOND_BATCH);
        assert!(prompt.contains("for: friday, saturday, sunday"));
        assert!(prompt.contains("\"friday\": {"));
        assert!(prompt.contains("Breakfast: 38g protein, 50g carbs, 15g fats"));
        assert!(prompt.contains("Goal: weight-loss"));
    }

    #[test]
    fn merge_is_a_per_tier_union() {
        let day = |name: &str| DayPlan {
            breakfast: Meal {
                name: name.to_string(),
                ..Meal::empty()
            },
            ..DayPlan::default()
        };
        let mut first = MealPlan::default();
        first.affordable.insert(Weekday::Monday, day("a-mon"));
        first.premium.insert(Weekday::Monday, day("p-mon"));
        let mut second = MealPlan::default();
        second.affordable.insert(Weekday::Friday, day("a-fri"));

        let merged = merge_batches([first, second]);
        assert_eq!(merged.affordable.len(), 2);
        assert_eq!(merged.premium.len(), 1);
        assert_eq!(merged.premium[&Weekday::Monday].breakfast.name, "p-mon");
        assert!(!merged.premium.contains_key(&Weekday::Friday));
    }
}
