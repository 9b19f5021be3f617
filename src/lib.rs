//! Recipe lookup client with a local favourites and preferences store.
//!
//! Searches a remote recipe catalog by ingredient text, loads one recipe's
//! ingredients and instructions, and keeps favourites plus the preferred
//! measurement system in a durable key-value store.

pub mod app;
pub mod catalog;
pub mod config;
pub mod error;
pub mod favourites;
pub mod model;
pub mod preferences;
pub mod session;
pub mod storage;

pub use app::RecipeFinder;
pub use catalog::{RecipeCatalog, SpoonacularClient};
pub use config::AppConfig;
pub use error::{CatalogFailure, RecipeError, Result};
pub use favourites::FavouritesRepository;
pub use model::{
    Consistency, Ingredient, InstructionGroup, InstructionStep, Measure, Measures,
    MeasurementUnit, RecipeDetail, RecipeSummary, SearchPage,
};
pub use preferences::PreferenceRepository;
pub use session::{DetailSeed, DetailSession, DetailView, SearchSession, SearchState, SearchView};
pub use storage::{FileBackend, MemoryBackend, PersistentStore, StorageBackend};
