use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Error returned when parsing one of the model enums from a string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {kind}: {value:?}")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

impl ParseEnumError {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_owned(),
        }
    }
}

/// The expected shape of a model response.
///
/// Fixed when a request is built; selects the validation and normalization
/// rules applied to the response text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseCategory {
    MacroSet,
    MealBatch,
    GroceryList,
    WorkoutPlan,
    SingleDayPlan,
}

impl ResponseCategory {
    /// The top-level JSON key a response of this category is wrapped in.
    pub fn root_key(self) -> &'static str {
        match self {
            Self::MacroSet => "macroTargets",
            Self::MealBatch => "mealPlan",
            Self::GroceryList => "groceryList",
            Self::WorkoutPlan => "workoutPlan",
            Self::SingleDayPlan => "dayPlan",
        }
    }
}

impl fmt::Display for ResponseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::MacroSet => "macro_set",
            Self::MealBatch => "meal_batch",
            Self::GroceryList => "grocery_list",
            Self::WorkoutPlan => "workout_plan",
            Self::SingleDayPlan => "single_day_plan",
        };
        f.write_str(s)
    }
}

impl FromStr for ResponseCategory {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "macro_set" | "macros" => Ok(Self::MacroSet),
            "meal_batch" | "meals" => Ok(Self::MealBatch),
            "grocery_list" | "grocery" => Ok(Self::GroceryList),
            "workout_plan" | "workout" => Ok(Self::WorkoutPlan),
            "single_day_plan" | "day" => Ok(Self::SingleDayPlan),
            other => Err(ParseEnumError::new("response category", other)),
        }
    }
}

// ---------------------------------------------------------------------------

/// Meal-plan variant, differing in ingredient quality assumptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Affordable,
    Premium,
}

impl Tier {
    pub const ALL: [Tier; 2] = [Tier::Affordable, Tier::Premium];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Affordable => "affordable",
            Self::Premium => "premium",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tier {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "affordable" => Ok(Self::Affordable),
            "premium" => Ok(Self::Premium),
            other => Err(ParseEnumError::new("tier", other)),
        }
    }
}

// ---------------------------------------------------------------------------

/// One of the seven fixed day tokens keying a weekly plan.
///
/// Declaration order is calendar order, so a `BTreeMap<Weekday, _>` iterates
/// Monday first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    pub const ALL: [Weekday; 7] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
        Weekday::Sunday,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Monday => "monday",
            Self::Tuesday => "tuesday",
            Self::Wednesday => "wednesday",
            Self::Thursday => "thursday",
            Self::Friday => "friday",
            Self::Saturday => "saturday",
            Self::Sunday => "sunday",
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Weekday {
    type Err = ParseEnumError;

    /// Case-insensitive; surrounding whitespace is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        Weekday::ALL
            .into_iter()
            .find(|d| d.as_str() == lowered)
            .ok_or_else(|| ParseEnumError::new("weekday", s))
    }
}

// ---------------------------------------------------------------------------

/// Fitness goal driving macro and workout prompts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Goal {
    WeightLoss,
    WeightGain,
    MuscleGain,
    Maintenance,
}

impl fmt::Display for Goal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::WeightLoss => "weight-loss",
            Self::WeightGain => "weight-gain",
            Self::MuscleGain => "muscle-gain",
            Self::Maintenance => "maintenance",
        };
        f.write_str(s)
    }
}

impl FromStr for Goal {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "weight-loss" => Ok(Self::WeightLoss),
            "weight-gain" => Ok(Self::WeightGain),
            "muscle-gain" => Ok(Self::MuscleGain),
            "maintenance" => Ok(Self::Maintenance),
            other => Err(ParseEnumError::new("goal", other)),
        }
    }
}

// ---------------------------------------------------------------------------

/// Identifies an LLM backend behind the model gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderId {
    /// OpenAI-compatible chat-completion endpoint with bearer auth.
    Together,
    /// Google generative-content endpoint.
    Gemini,
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Together => "together",
            Self::Gemini => "gemini",
        };
        f.write_str(s)
    }
}

impl FromStr for ProviderId {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "together" => Ok(Self::Together),
            "gemini" => Ok(Self::Gemini),
            other => Err(ParseEnumError::new("provider", other)),
        }
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// The subset of a user's profile the prompts need.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonalData {
    /// Body weight in kilograms.
    pub weight: f64,
    pub goal: Goal,
}

/// Macronutrient grams for one meal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Macros {
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
}

/// A single meal. Every field is present after normalization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Meal {
    pub name: String,
    /// Textual `HH:MM`.
    pub time: String,
    pub recipe: String,
    pub calories: f64,
    pub macros: Macros,
}

impl Meal {
    /// The placeholder used where a meal is structurally required but absent.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// One day of meals.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DayPlan {
    pub breakfast: Meal,
    pub lunch: Meal,
    pub dinner: Meal,
    pub snacks: Vec<Meal>,
}

/// Day token to day plan. Map semantics rule out duplicate days.
pub type WeeklyPlan = BTreeMap<Weekday, DayPlan>;

/// A week of meals for both tiers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MealPlan {
    pub affordable: WeeklyPlan,
    pub premium: WeeklyPlan,
}

impl MealPlan {
    pub fn tier(&self, tier: Tier) -> &WeeklyPlan {
        match tier {
            Tier::Affordable => &self.affordable,
            Tier::Premium => &self.premium,
        }
    }

    pub fn tier_mut(&mut self, tier: Tier) -> &mut WeeklyPlan {
        match tier {
            Tier::Affordable => &mut self.affordable,
            Tier::Premium => &mut self.premium,
        }
    }

    /// Days of the week with no plan under `tier`, in calendar order.
    pub fn missing_days(&self, tier: Tier) -> Vec<Weekday> {
        let plan = self.tier(tier);
        Weekday::ALL
            .into_iter()
            .filter(|d| !plan.contains_key(d))
            .collect()
    }
}

/// A daily target for one nutrient.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MacroTarget {
    pub nutrient: String,
    pub amount: f64,
    pub details: String,
}

/// One line of a grocery list. Duplicates are kept as-is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroceryItem {
    pub item: String,
    pub quantity: f64,
    pub unit: String,
    pub price: f64,
    pub notes: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkoutExercise {
    pub name: String,
    pub sets: u32,
    pub reps: u32,
    /// Rest between sets, in seconds.
    pub rest: f64,
    pub notes: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DayWorkout {
    pub day: String,
    pub focus: String,
    pub exercises: Vec<WorkoutExercise>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_display_roundtrips_through_from_str() {
        for category in [
            ResponseCategory::MacroSet,
            ResponseCategory::MealBatch,
            ResponseCategory::GroceryList,
            ResponseCategory::WorkoutPlan,
            ResponseCategory::SingleDayPlan,
        ] {
            let parsed: ResponseCategory = category.to_string().parse().unwrap();
            assert_eq!(parsed, category);
        }
    }

    #[test]
    fn category_root_keys() {
        assert_eq!(ResponseCategory::MacroSet.root_key(), "macroTargets");
        assert_eq!(ResponseCategory::SingleDayPlan.root_key(), "dayPlan");
    }

    #[test]
    fn weekday_parse_is_case_insensitive() {
        assert_eq!(" Monday ".parse::<Weekday>().unwrap(), Weekday::Monday);
        assert_eq!("SUNDAY".parse::<Weekday>().unwrap(), Weekday::Sunday);
        let err = "someday".parse::<Weekday>().unwrap_err();
        assert_eq!(err.to_string(), "invalid weekday: \"someday\"");
    }

    #[test]
    fn weekly_plan_iterates_in_calendar_order() {
        let mut plan = WeeklyPlan::new();
        plan.insert(Weekday::Sunday, DayPlan::default());
        plan.insert(Weekday::Monday, DayPlan::default());
        plan.insert(Weekday::Thursday, DayPlan::default());
        let days: Vec<Weekday> = plan.keys().copied().collect();
        assert_eq!(
            days,
            vec![Weekday::Monday, Weekday::Thursday, Weekday::Sunday]
        );
    }

    #[test]
    fn missing_days_reports_gaps() {
        let mut plan = MealPlan::default();
        for day in &Weekday::ALL[..4] {
            plan.affordable.insert(*day, DayPlan::default());
        }
        assert_eq!(
            plan.missing_days(Tier::Affordable),
            vec![Weekday::Friday, Weekday::Saturday, Weekday::Sunday]
        );
        assert_eq!(plan.missing_days(Tier::Premium).len(), 7);
    }

    #[test]
    fn meal_plan_serializes_lowercase_day_keys() {
        let mut plan = MealPlan::default();
        plan.affordable.insert(Weekday::Friday, DayPlan::default());
        let json = serde_json::to_value(&plan).unwrap();
        assert!(json["affordable"]["friday"]["breakfast"].is_object());
        assert!(json["premium"].as_object().unwrap().is_empty());
    }

    #[test]
    fn goal_and_provider_parse() {
        assert_eq!("muscle-gain".parse::<Goal>().unwrap(), Goal::MuscleGain);
        assert_eq!(Goal::WeightLoss.to_string(), "weight-loss");
        assert_eq!("gemini".parse::<ProviderId>().unwrap(), ProviderId::Gemini);
        assert!("openai".parse::<ProviderId>().is_err());
    }

    #[test]
    fn empty_meal_is_default() {
        assert!(Meal::empty().is_empty());
        let meal = Meal {
            name: "Oats".to_string(),
            ..Meal::empty()
        };
        assert!(!meal.is_empty());
    }
}
