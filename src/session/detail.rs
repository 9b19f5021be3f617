use log::{debug, warn};
use std::sync::Arc;
use tokio::sync::{watch, Mutex};

use crate::catalog::RecipeCatalog;
use crate::error::{RecipeError, Result};
use crate::favourites::FavouritesRepository;
use crate::model::{Ingredient, MeasurementUnit, RecipeDetail, RecipeSummary};
use crate::preferences::PreferenceRepository;

/// Identity carried over from a search result or a favourites entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailSeed {
    pub id: i64,
    pub title: String,
    pub image_url: String,
}

impl DetailSeed {
    pub fn new(id: i64, title: impl Into<String>, image_url: impl Into<String>) -> Self {
        DetailSeed {
            id,
            title: title.into(),
            image_url: image_url.into(),
        }
    }

    /// The summary saved when this recipe is pinned
    pub fn summary(&self) -> RecipeSummary {
        RecipeSummary::new(self.id, self.title.clone(), self.image_url.clone())
    }
}

impl From<&RecipeSummary> for DetailSeed {
    fn from(summary: &RecipeSummary) -> Self {
        DetailSeed::new(summary.id, summary.title.clone(), summary.image_url.clone())
    }
}

/// Everything a recipe page renders
#[derive(Debug, Clone, PartialEq)]
pub struct DetailView {
    pub seed: DetailSeed,
    pub loading: bool,
    pub detail: Option<RecipeDetail>,
    pub is_favourite: bool,
    pub measurement_unit: MeasurementUnit,
    /// Set when the detail fetch failed
    pub error_message: Option<String>,
    /// Set when a favourite or preference change could only be kept in memory
    pub storage_warning: Option<String>,
}

impl DetailView {
    /// `"{amount} {unitLong}"` in the active measurement system
    pub fn format_measurement(&self, ingredient: &Ingredient) -> String {
        ingredient
            .measures
            .for_unit(self.measurement_unit)
            .to_string()
    }

    pub fn title(&self) -> &str {
        match &self.detail {
            Some(detail) if !detail.title.is_empty() => &detail.title,
            _ => &self.seed.title,
        }
    }
}

/// One recipe page: remote detail merged with favourite status and units
pub struct DetailSession {
    seed: DetailSeed,
    catalog: Arc<dyn RecipeCatalog>,
    favourites: Arc<FavouritesRepository>,
    preferences: Arc<PreferenceRepository>,
    state: watch::Sender<DetailView>,
    unit: watch::Receiver<MeasurementUnit>,
    // Serialises toggles with each other and with favourite lookups
    favourite_lock: Mutex<()>,
}

impl DetailSession {
    pub fn new(
        seed: DetailSeed,
        catalog: Arc<dyn RecipeCatalog>,
        favourites: Arc<FavouritesRepository>,
        preferences: Arc<PreferenceRepository>,
    ) -> Self {
        let unit = preferences.subscribe();
        let (state, _) = watch::channel(DetailView {
            seed: seed.clone(),
            loading: false,
            detail: None,
            is_favourite: false,
            measurement_unit: *unit.borrow(),
            error_message: None,
            storage_warning: None,
        });
        DetailSession {
            seed,
            catalog,
            favourites,
            preferences,
            state,
            unit,
            favourite_lock: Mutex::new(()),
        }
    }

    pub fn seed(&self) -> &DetailSeed {
        &self.seed
    }

    /// Current page state, with the measurement unit as of right now
    pub fn view(&self) -> DetailView {
        let mut view = self.state.borrow().clone();
        view.measurement_unit = self.measurement_unit();
        view
    }

    /// Fires whenever loading, detail, favourite or warning state changes
    ///
    /// Unit changes made elsewhere arrive on [`Self::unit_changed`] instead.
    pub fn subscribe(&self) -> watch::Receiver<DetailView> {
        self.state.subscribe()
    }

    /// Fires whenever the active measurement unit changes
    pub fn unit_changed(&self) -> watch::Receiver<MeasurementUnit> {
        self.unit.clone()
    }

    pub fn measurement_unit(&self) -> MeasurementUnit {
        *self.unit.borrow()
    }

    /// Preference, favourite flag and remote detail, fetched concurrently
    ///
    /// `loading` stays set until all three have resolved.
    pub async fn load(&self) {
        let id = self.seed.id;
        self.state.send_modify(|state| {
            state.loading = true;
            state.error_message = None;
        });

        let (unit, _, detail) = tokio::join!(
            self.preferences.get_measurement_unit(),
            self.refresh_favourite(),
            self.catalog.get_details(id),
        );
        debug!("Recipe {} shown in {} units", id, unit);

        self.state.send_modify(|state| {
            state.loading = false;
            state.measurement_unit = unit;
            match detail {
                Ok(detail) => {
                    state.detail = Some(detail);
                    state.error_message = None;
                }
                Err(e) => {
                    warn!("Failed to load recipe {}: {}", id, e);
                    state.error_message = Some(format!("Could not load recipe details. {}", e));
                }
            }
        });
    }

    /// Re-read whether this recipe is a favourite
    pub async fn refresh_favourite(&self) -> bool {
        let _guard = self.favourite_lock.lock().await;
        let is_favourite = self.favourites.contains(self.seed.id).await;
        self.state
            .send_modify(|state| state.is_favourite = is_favourite);
        is_favourite
    }

    /// Measurement string for `ingredient` in the active unit
    pub fn format_measurement(&self, ingredient: &Ingredient) -> String {
        ingredient
            .measures
            .for_unit(self.measurement_unit())
            .to_string()
    }

    /// Pin or unpin this recipe according to the saved list; returns the new flag
    ///
    /// If the store cannot be written the change is kept for this session,
    /// a storage warning is published and `StorageUnavailable` is returned.
    pub async fn toggle_favourite(&self) -> Result<bool> {
        let _guard = self.favourite_lock.lock().await;
        let was_favourite = self.favourites.contains(self.seed.id).await;

        let result = if was_favourite {
            self.favourites.remove(self.seed.id).await
        } else {
            self.favourites.add(self.seed.summary()).await
        };

        match result {
            Ok(()) => {
                self.state.send_modify(|state| {
                    state.is_favourite = !was_favourite;
                    state.storage_warning = None;
                });
                Ok(!was_favourite)
            }
            Err(RecipeError::StorageUnavailable(message)) => {
                self.state.send_modify(|state| {
                    state.is_favourite = !was_favourite;
                    state.storage_warning =
                        Some("Favourites will not be kept after you close the app.".to_string());
                });
                Err(RecipeError::StorageUnavailable(message))
            }
            Err(e) => Err(e),
        }
    }

    /// Change the measurement preference; every open page follows it
    pub async fn set_measurement_unit(&self, unit: MeasurementUnit) -> Result<()> {
        let result = self.preferences.set_measurement_unit(unit).await;
        self.state.send_modify(|state| {
            state.measurement_unit = unit;
            if let Err(RecipeError::StorageUnavailable(_)) = &result {
                state.storage_warning = Some(
                    "Measurement preference will not be kept after you close the app.".to_string(),
                );
            }
        });
        result
    }
}
