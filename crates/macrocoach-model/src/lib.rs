//! Domain records and provider configuration for macrocoach.
//!
//! Every record here is built once, fully, by the normalizer in
//! `macrocoach-core` and is never mutated afterwards.

pub mod config;
pub mod models;

pub use config::{ConfigError, ProviderConfig};
pub use models::{
    DayPlan, DayWorkout, Goal, GroceryItem, MacroTarget, Macros, Meal, MealPlan, ParseEnumError,
    PersonalData, ProviderId, ResponseCategory, Tier, Weekday, WeeklyPlan, WorkoutExercise,
};
