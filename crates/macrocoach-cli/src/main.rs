mod config;
mod generate_cmd;
mod repair_cmd;
mod step_cmds;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use macrocoach_core::pipeline::{Pipeline, RetryPolicy};
use macrocoach_model::{Goal, PersonalData, ProviderId, ResponseCategory, Tier, Weekday};

use config::CliOverrides;

#[derive(Parser)]
#[command(name = "macrocoach", about = "Fitness plans from LLM completions, repaired and validated")]
struct Cli {
    /// Provider to call (overrides MACROCOACH_PROVIDER env var)
    #[arg(long, global = true)]
    provider: Option<ProviderId>,

    /// Model id (overrides MACROCOACH_MODEL env var)
    #[arg(long, global = true)]
    model: Option<String>,

    /// Retries after the first failed attempt
    #[arg(long, global = true, default_value_t = RetryPolicy::DEFAULT_MAX_RETRIES)]
    max_retries: u32,

    /// Pause between attempts, in milliseconds
    #[arg(long, global = true, default_value_t = 1000)]
    retry_delay_ms: u64,

    #[command(subcommand)]
    command: Commands,
}

/// Who the plan is for.
#[derive(Args, Debug, Clone)]
pub struct ProfileArgs {
    /// Body weight in kilograms
    #[arg(long)]
    weight: f64,
    /// weight-loss, weight-gain, muscle-gain, or maintenance
    #[arg(long, default_value = "maintenance")]
    goal: Goal,
}

impl ProfileArgs {
    fn personal(&self) -> PersonalData {
        PersonalData {
            weight: self.weight,
            goal: self.goal,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a macrocoach config file
    Init {
        /// Provider the config selects
        #[arg(long, default_value = "gemini")]
        provider: ProviderId,
        /// Together API key to store
        #[arg(long)]
        together_key: Option<String>,
        /// Google API key to store
        #[arg(long)]
        google_key: Option<String>,
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
    /// Generate daily macro targets
    Macros {
        #[command(flatten)]
        profile: ProfileArgs,
        /// Total daily energy expenditure in kcal
        #[arg(long)]
        tdee: f64,
    },
    /// Generate a weekly meal plan
    Meals {
        #[command(flatten)]
        profile: ProfileArgs,
        #[arg(long)]
        tdee: f64,
        /// JSON file with macro targets (output of `macros`)
        #[arg(long)]
        targets: Option<PathBuf>,
        /// Fill days the weekly batches left out, one request per day
        #[arg(long)]
        fill_missing: bool,
    },
    /// Generate one day of meals
    Day {
        #[command(flatten)]
        profile: ProfileArgs,
        #[arg(long)]
        tdee: f64,
        #[arg(long)]
        targets: Option<PathBuf>,
        #[arg(long, default_value = "affordable")]
        tier: Tier,
        /// Day of the week, e.g. monday
        #[arg(long)]
        day: Weekday,
    },
    /// Generate a grocery list for a saved meal plan
    Grocery {
        /// JSON file with a meal plan (output of `meals`)
        #[arg(long)]
        plan: PathBuf,
        #[arg(long, default_value = "affordable")]
        tier: Tier,
    },
    /// Generate a weekly workout plan
    Workout {
        #[command(flatten)]
        profile: ProfileArgs,
    },
    /// Run every step: macros, meals, grocery list, workout
    Generate {
        #[command(flatten)]
        profile: ProfileArgs,
        #[arg(long)]
        tdee: f64,
        /// Tier the grocery list is built for
        #[arg(long, default_value = "affordable")]
        tier: Tier,
        /// Fill premium days the weekly batches left out
        #[arg(long)]
        fill_premium: bool,
    },
    /// Repair a saved raw model response offline
    Repair {
        /// Expected shape: macros, meals, grocery, workout, or day
        #[arg(long)]
        category: ResponseCategory,
        /// File holding the raw response, or - for stdin
        input: PathBuf,
        /// Print the sanitized text instead of the typed record
        #[arg(long)]
        cleaned: bool,
    },
    /// Print shell completions
    Completions {
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let policy = RetryPolicy::new(cli.max_retries, Duration::from_millis(cli.retry_delay_ms));
    let overrides = CliOverrides {
        provider: cli.provider,
        model: cli.model.clone(),
    };

    match cli.command {
        Commands::Init {
            provider,
            together_key,
            google_key,
            force,
        } => {
            cmd_init(provider, together_key, google_key, force)?;
        }
        Commands::Macros { profile, tdee } => {
            let pipeline = build_pipeline(&overrides, policy)?;
            step_cmds::run_macros(&pipeline, &profile.personal(), tdee).await?;
        }
        Commands::Meals {
            profile,
            tdee,
            targets,
            fill_missing,
        } => {
            let pipeline = build_pipeline(&overrides, policy)?;
            let targets = step_cmds::load_targets(targets.as_deref())?;
            step_cmds::run_meals(&pipeline, &profile.personal(), tdee, &targets, fill_missing)
                .await?;
        }
        Commands::Day {
            profile,
            tdee,
            targets,
            tier,
            day,
        } => {
            let pipeline = build_pipeline(&overrides, policy)?;
            let targets = step_cmds::load_targets(targets.as_deref())?;
            step_cmds::run_day(&pipeline, &profile.personal(), tdee, &targets, tier, day).await?;
        }
        Commands::Grocery { plan, tier } => {
            let pipeline = build_pipeline(&overrides, policy)?;
            let plan = step_cmds::load_meal_plan(&plan)?;
            step_cmds::run_grocery(&pipeline, &plan, tier).await?;
        }
        Commands::Workout { profile } => {
            let pipeline = build_pipeline(&overrides, policy)?;
            step_cmds::run_workout(&pipeline, &profile.personal()).await?;
        }
        Commands::Generate {
            profile,
            tdee,
            tier,
            fill_premium,
        } => {
            let pipeline = build_pipeline(&overrides, policy)?;
            let options = generate_cmd::GenerateOptions {
                tdee,
                tier,
                fill_premium,
            };
            let plan = generate_cmd::run_generate(&pipeline, &profile.personal(), &options).await;
            step_cmds::print_json(&plan)?;
            if let Some(step) = plan.failed_step {
                anyhow::bail!("could not generate the {step} part of the plan");
            }
        }
        Commands::Repair {
            category,
            input,
            cleaned,
        } => {
            repair_cmd::run_repair(&input, category, cleaned)?;
        }
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "macrocoach", &mut std::io::stdout());
        }
    }

    Ok(())
}

/// Resolve configuration and construct the provider. Credential problems
/// surface here, before any request is sent.
fn build_pipeline(overrides: &CliOverrides, policy: RetryPolicy) -> anyhow::Result<Pipeline> {
    let config = config::resolve(overrides)?;
    tracing::debug!(provider = %config.provider, model = %config.model, "resolved provider");
    let pipeline = Pipeline::from_config(&config)
        .with_context(|| format!("failed to set up the {} provider", config.provider))?;
    Ok(pipeline.with_policy(policy))
}

/// Execute the `macrocoach init` command: write a config file.
fn cmd_init(
    provider: ProviderId,
    together_key: Option<String>,
    google_key: Option<String>,
    force: bool,
) -> anyhow::Result<()> {
    let path = config::config_path();

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}\nUse --force to overwrite.",
            path.display()
        );
    }

    let cfg = config::ConfigFile {
        provider: config::ProviderSection {
            kind: provider.to_string(),
            model: None,
            base_url: None,
            timeout_secs: None,
        },
        keys: config::KeysSection {
            together: together_key,
            google: google_key,
        },
    };
    let has_key = match provider {
        ProviderId::Together => cfg.keys.together.is_some(),
        ProviderId::Gemini => cfg.keys.google.is_some(),
    };

    config::save_config(&path, &cfg)?;

    println!("Config written to {}", path.display());
    println!("  provider.kind = {provider}");
    if !has_key {
        println!();
        println!(
            "No {provider} key stored; set {} or rerun with a key.",
            macrocoach_model::ProviderConfig::api_key_var(provider)
        );
    }

    Ok(())
}

#[cfg(test)]
mod test_util {
    use std::sync::{Mutex, MutexGuard};

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    /// Serialize tests that mutate process environment.
    pub fn lock_env() -> MutexGuard<'static, ()> {
        ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner())
    }
}
