use clap::{Parser, Subcommand};
use log::debug;
use std::path::PathBuf;
use std::sync::Arc;

use recipe_finder::{
    AppConfig, DetailSeed, PersistentStore, RecipeError, RecipeFinder, SearchState,
    SpoonacularClient,
};

#[derive(Parser)]
#[command(
    name = "recipe-finder",
    about = "Find recipes by ingredient and keep your favourites"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Store file override (defaults to storage.path from configuration)
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    /// Keep favourites and preferences in memory only
    #[arg(long, global = true, conflicts_with = "store")]
    ephemeral: bool,

    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Search recipes by ingredients, e.g. `search beef carrots`
    Search {
        #[arg(required = true)]
        ingredients: Vec<String>,
    },
    /// Show ingredients and instructions for one recipe
    Show {
        id: i64,
        #[arg(long, default_value = "")]
        title: String,
        #[arg(long, default_value = "")]
        image: String,
    },
    /// Pin or unpin a recipe as a favourite
    Favourite {
        id: i64,
        #[arg(long, default_value = "")]
        title: String,
        #[arg(long, default_value = "")]
        image: String,
    },
    /// List favourite recipes
    Favourites,
    /// Show or change the measurement system (metric or us)
    Units { unit: Option<String> },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let mut config = AppConfig::load()?;
    if let Some(path) = cli.store {
        config.storage.path = path;
    }

    let app = if cli.ephemeral {
        let catalog = SpoonacularClient::new(&config.catalog)?;
        RecipeFinder::new(Arc::new(catalog), PersistentStore::in_memory())
    } else {
        RecipeFinder::from_config(&config)?
    };

    match cli.command {
        Command::Search { ingredients } => search(&app, &ingredients.join(" ")).await,
        Command::Show { id, title, image } => show(&app, DetailSeed::new(id, title, image)).await,
        Command::Favourite { id, title, image } => {
            let session = app.detail_session(DetailSeed::new(id, title, image));
            match session.toggle_favourite().await {
                Ok(true) => println!("Added {} to favourites", id),
                Ok(false) => println!("Removed {} from favourites", id),
                Err(RecipeError::StorageUnavailable(reason)) => {
                    eprintln!("warning: favourites could not be saved ({})", reason)
                }
                Err(e) => return Err(e.into()),
            }
        }
        Command::Favourites => {
            let favourites = app.favourites().list().await;
            if favourites.is_empty() {
                println!("No favourite recipes yet.");
            }
            for recipe in favourites {
                println!("{:>8}  {}", recipe.id, recipe.title);
            }
        }
        Command::Units { unit: None } => {
            println!("{}", app.preferences().get_measurement_unit().await);
        }
        Command::Units { unit: Some(raw) } => {
            match app.preferences().set_measurement_unit_str(&raw).await {
                Ok(unit) => println!("Measurement unit set to {}", unit),
                Err(RecipeError::StorageUnavailable(reason)) => {
                    eprintln!("warning: preference could not be saved ({})", reason)
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    Ok(())
}

async fn search(app: &RecipeFinder, query: &str) {
    let session = app.search_session();
    session.submit(query).await;
    let view = session.view();
    debug!("Search ended in {:?}", view.state);

    match view.state {
        SearchState::Idle => println!("Enter one or more ingredients to search."),
        SearchState::Loading => {}
        SearchState::Failed => {
            eprintln!("{}", view.error_message.unwrap_or_default());
        }
        SearchState::Success => {
            if let Some(line) = view.summary_line() {
                println!("{}", line);
            }
            for recipe in &view.results {
                match recipe.ready_in_minutes {
                    Some(minutes) => {
                        println!("{:>8}  {} ({} min)", recipe.id, recipe.title, minutes)
                    }
                    None => println!("{:>8}  {}", recipe.id, recipe.title),
                }
            }
        }
    }
}

async fn show(app: &RecipeFinder, seed: DetailSeed) {
    let session = app.detail_session(seed);
    session.load().await;
    let view = session.view();

    println!("{}{}", view.title(), if view.is_favourite { " ♥" } else { "" });
    let Some(detail) = &view.detail else {
        eprintln!("{}", view.error_message.unwrap_or_default());
        return;
    };

    println!(
        "Serves {} · ready in {} min\n",
        detail.servings, detail.ready_in_minutes
    );
    println!("Ingredients ({}):", view.measurement_unit);
    for ingredient in &detail.ingredients {
        println!(
            "  - {}: {}",
            ingredient.name,
            view.format_measurement(ingredient)
        );
    }

    println!("\nInstructions:");
    for step in detail.instruction_steps() {
        println!("  {}. {}", step.number, step.text);
    }
}
