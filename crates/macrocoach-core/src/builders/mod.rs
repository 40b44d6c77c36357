//! Domain request builders.
//!
//! Each builder writes the category-specific prompt, runs it through a
//! [`Pipeline`](crate::pipeline::Pipeline), and post-processes the typed
//! record (merging meal batches, filtering grocery items).

pub mod day_plan;
pub mod grocery;
pub mod macros;
pub mod meal_plan;
pub mod workout;

pub use day_plan::generate_day_plan;
pub use grocery::generate_grocery_list;
pub use macros::generate_macro_targets;
pub use meal_plan::{
    DailyTargets, MealDistribution, fill_missing_days, generate_meal_plan, merge_batches,
};
pub use workout::generate_workout_plan;
