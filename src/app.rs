use log::info;
use std::sync::Arc;

use crate::catalog::{RecipeCatalog, SpoonacularClient};
use crate::config::AppConfig;
use crate::error::Result;
use crate::favourites::FavouritesRepository;
use crate::preferences::PreferenceRepository;
use crate::session::{DetailSeed, DetailSession, SearchSession};
use crate::storage::{FileBackend, PersistentStore};

/// Explicitly constructed set of shared components
///
/// One store, one catalog client and the two repositories built on the
/// store. Sessions borrow these through `Arc`s; nothing is process-global.
#[derive(Clone)]
pub struct RecipeFinder {
    catalog: Arc<dyn RecipeCatalog>,
    favourites: Arc<FavouritesRepository>,
    preferences: Arc<PreferenceRepository>,
}

impl RecipeFinder {
    pub fn new(catalog: Arc<dyn RecipeCatalog>, store: PersistentStore) -> Self {
        RecipeFinder {
            catalog,
            favourites: Arc::new(FavouritesRepository::new(store.clone())),
            preferences: Arc::new(PreferenceRepository::new(store)),
        }
    }

    /// Spoonacular client plus a file-backed store, as configured
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let catalog = SpoonacularClient::new(&config.catalog)?;
        info!(
            "Using {} catalog at {} with store {}",
            catalog.catalog_name(),
            config.catalog.base_url,
            config.storage.path.display()
        );
        let store = PersistentStore::new(FileBackend::new(config.storage.path.clone()));
        Ok(Self::new(Arc::new(catalog), store))
    }

    pub fn catalog(&self) -> &Arc<dyn RecipeCatalog> {
        &self.catalog
    }

    pub fn favourites(&self) -> &FavouritesRepository {
        &self.favourites
    }

    pub fn preferences(&self) -> &PreferenceRepository {
        &self.preferences
    }

    pub fn search_session(&self) -> SearchSession {
        SearchSession::new(Arc::clone(&self.catalog))
    }

    pub fn detail_session(&self, seed: DetailSeed) -> DetailSession {
        DetailSession::new(
            seed,
            Arc::clone(&self.catalog),
            Arc::clone(&self.favourites),
            Arc::clone(&self.preferences),
        )
    }
}
