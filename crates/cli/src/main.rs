//! Cookmate CLI - meal planning from the terminal.
//!
//! # Usage
//!
//! ```bash
//! # Sign in and set up a profile
//! cookmate login google
//! cookmate onboard --diet vegan,gluten-free --utensil oven,blender --skill beginner
//!
//! # Browse and search
//! cookmate catalog
//! cookmate search lentil soup
//!
//! # Ask Gemini for a recipe and put its ingredients on the list
//! cookmate generate --ingredients "chickpeas, spinach" --meal-type dinner --add-to-list
//!
//! # Shopping list
//! cookmate list add Milk -q 2
//! cookmate list show
//! ```
//!
//! State lives under `COOKMATE_DATA_DIR` (default `.cookmate`). Set
//! `RUST_LOG` to change verbosity and `COOKMATE_LOG_FORMAT=json` for
//! structured logs on stderr.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use cookmate_app::services::GenerationInputs;
use cookmate_app::{AppConfig, AppState};
use cookmate_core::{
    ChefSkillLevel, DietRequirement, KitchenUtensil, PreferenceUpdate, Provider,
};

mod commands;

use commands::prefs::OnboardingAnswers;

#[derive(Parser, Debug)]
#[command(name = "cookmate")]
#[command(author, version, about = "Cookmate meal planning tools")]
struct Cli {
    /// Directory holding the persisted state (overrides `COOKMATE_DATA_DIR`)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Sign in (google, apple or mock)
    Login { provider: Provider },
    /// Sign out and clear preferences
    Logout,
    /// Show session and configuration status
    Status,
    /// Complete onboarding in one step
    Onboard {
        /// Dietary requirements, comma separated
        #[arg(long, value_delimiter = ',')]
        diet: Vec<DietRequirement>,

        /// Kitchen utensils, comma separated
        #[arg(long, value_delimiter = ',')]
        utensil: Vec<KitchenUtensil>,

        #[arg(long)]
        skill: Option<ChefSkillLevel>,

        #[arg(long)]
        servings: Option<u32>,

        /// Weekly budget in dollars
        #[arg(long)]
        budget: Option<Decimal>,
    },
    /// View or change preferences
    Prefs {
        #[command(subcommand)]
        action: PrefsAction,
    },
    /// List the built-in recipes by category
    Catalog,
    /// Show a recipe
    Recipe { id: String },
    /// Search the cookbook
    Search {
        /// Search terms; empty shows every catalog recipe
        term: Vec<String>,
    },
    /// Generate a recipe with Gemini
    Generate {
        /// Ingredients to use
        #[arg(long, default_value = "")]
        ingredients: String,

        /// Meal type, e.g. dinner
        #[arg(long, default_value = "")]
        meal_type: String,

        /// Cravings, e.g. spicy
        #[arg(long, default_value = "")]
        cravings: String,

        /// Put the ingredients on the shopping list
        #[arg(long)]
        add_to_list: bool,
    },
    /// Manage the shopping list
    List {
        #[command(subcommand)]
        action: ListAction,
    },
}

#[derive(Subcommand, Debug)]
enum PrefsAction {
    /// Show the current profile
    Show,
    /// Replace one preference
    Set {
        #[command(subcommand)]
        field: SetField,
    },
    /// Turn a diet on or off
    ToggleDiet { diet: DietRequirement },
    /// Turn a kitchen utensil on or off
    ToggleUtensil { utensil: KitchenUtensil },
    /// Go through onboarding again
    ResetOnboarding,
    /// List accepted diet, utensil and skill values
    Choices,
}

#[derive(Subcommand, Debug)]
enum SetField {
    Diets {
        #[arg(required = true, value_delimiter = ',')]
        diets: Vec<DietRequirement>,
    },
    Utensils {
        #[arg(required = true, value_delimiter = ',')]
        utensils: Vec<KitchenUtensil>,
    },
    Skill { level: ChefSkillLevel },
    Servings { servings: u32 },
    Budget { amount: Decimal },
}

impl From<SetField> for PreferenceUpdate {
    fn from(field: SetField) -> Self {
        match field {
            SetField::Diets { diets } => Self::DietaryRequirements(diets.into_iter().collect()),
            SetField::Utensils { utensils } => Self::KitchenUtensils(utensils.into_iter().collect()),
            SetField::Skill { level } => Self::ChefSkillLevel(level),
            SetField::Servings { servings } => Self::Servings(servings),
            SetField::Budget { amount } => Self::WeeklyBudget(amount),
        }
    }
}

#[derive(Subcommand, Debug)]
enum ListAction {
    /// Show pending and completed items
    Show,
    /// Add an item
    Add {
        name: String,

        /// Quantity (default 1)
        #[arg(short, long, default_value = "")]
        quantity: String,
    },
    /// Add every ingredient of a catalog recipe
    AddRecipe { id: String },
    /// Remove an item by id
    Remove { id: String },
    /// Check or uncheck an item by id
    Toggle { id: String },
    /// Remove every item
    Clear,
}

#[tokio::main]
async fn main() {
    init_tracing();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "cookmate_app=info,cookmate_cli=info".into());

    let json = std::env::var("COOKMATE_LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    let (text_layer, json_layer) = if json {
        (None, Some(fmt::layer().json().with_writer(std::io::stderr)))
    } else {
        (Some(fmt::layer().with_writer(std::io::stderr)), None)
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(text_layer)
        .with(json_layer)
        .init();
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = AppConfig::from_env()?;
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }

    let state = AppState::from_config(&config)?;
    state.load()?;

    let output = match cli.command {
        Commands::Login { provider } => commands::session::login(&state, provider).await?,
        Commands::Logout => commands::session::logout(&state)?,
        Commands::Status => commands::session::status(&state),
        Commands::Onboard {
            diet,
            utensil,
            skill,
            servings,
            budget,
        } => commands::prefs::onboard(
            &state,
            OnboardingAnswers {
                diets: diet,
                utensils: utensil,
                skill,
                servings,
                budget,
            },
        )?,
        Commands::Prefs { action } => match action {
            PrefsAction::Show => commands::prefs::show(&state)?,
            PrefsAction::Set { field } => commands::prefs::set(&state, field.into())?,
            PrefsAction::ToggleDiet { diet } => commands::prefs::toggle_diet(&state, diet)?,
            PrefsAction::ToggleUtensil { utensil } => {
                commands::prefs::toggle_utensil(&state, utensil)?
            }
            PrefsAction::ResetOnboarding => commands::prefs::reset_onboarding(&state)?,
            PrefsAction::Choices => commands::prefs::choices(),
        },
        Commands::Catalog => commands::recipes::catalog(&state)?,
        Commands::Recipe { id } => commands::recipes::show(&state, &id)?,
        Commands::Search { term } => commands::recipes::search(&state, term.join(" ")).await?,
        Commands::Generate {
            ingredients,
            meal_type,
            cravings,
            add_to_list,
        } => {
            let inputs = GenerationInputs {
                ingredients,
                meal_type,
                cravings,
            };
            commands::recipes::generate(&state, inputs, add_to_list).await?
        }
        Commands::List { action } => match action {
            ListAction::Show => commands::list::show(&state)?,
            ListAction::Add { name, quantity } => commands::list::add(&state, &name, &quantity)?,
            ListAction::AddRecipe { id } => commands::list::add_recipe(&state, &id)?,
            ListAction::Remove { id } => commands::list::remove(&state, &id)?,
            ListAction::Toggle { id } => commands::list::toggle(&state, &id)?,
            ListAction::Clear => commands::list::clear(&state)?,
        },
    };

    emit(&output);
    Ok(())
}

#[allow(clippy::print_stdout)]
fn emit(output: &str) {
    println!("{output}");
}
