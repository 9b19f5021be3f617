use log::{debug, info, warn};
use serde_json::Value;
use tokio::sync::Mutex;

use crate::error::{RecipeError, Result};
use crate::model::RecipeSummary;
use crate::storage::{PersistentStore, ReadyStore};

pub const FAVOURITES_KEY: &str = "favourites";

/// Owner of the saved favourites list
///
/// Every operation runs under one async mutex, so concurrent add/remove
/// calls are applied one full read-modify-write at a time. The mutex also
/// guards the list used in place of the store when it cannot be opened.
pub struct FavouritesRepository {
    store: PersistentStore,
    session_only: Mutex<Vec<RecipeSummary>>,
}

impl FavouritesRepository {
    pub fn new(store: PersistentStore) -> Self {
        FavouritesRepository {
            store,
            session_only: Mutex::new(Vec::new()),
        }
    }

    /// All favourites in insertion order; empty when nothing can be read
    pub async fn list(&self) -> Vec<RecipeSummary> {
        let session_only = self.session_only.lock().await;
        match self.store.init().await {
            Ok(store) => read_favourites(&store).await,
            Err(_) => session_only.clone(),
        }
    }

    pub async fn contains(&self, id: i64) -> bool {
        self.list().await.iter().any(|f| f.id == id)
    }

    /// Append `summary` unless its id is already saved
    pub async fn add(&self, summary: RecipeSummary) -> Result<()> {
        let id = summary.id;
        let added = self
            .modify(move |favourites| {
                if favourites.iter().any(|f| f.id == summary.id) {
                    return false;
                }
                favourites.push(summary);
                true
            })
            .await?;
        if added {
            info!("Added recipe {} to favourites", id);
        } else {
            debug!("Recipe {} is already a favourite", id);
        }
        Ok(())
    }

    /// Drop any favourite with `id`; the resulting list is always written back
    pub async fn remove(&self, id: i64) -> Result<()> {
        self.modify(|favourites| {
            favourites.retain(|f| f.id != id);
            true
        })
        .await?;
        info!("Removed recipe {} from favourites", id);
        Ok(())
    }

    /// Apply `change` to the current list; write back when it returns true
    async fn modify<F>(&self, change: F) -> Result<bool>
    where
        F: FnOnce(&mut Vec<RecipeSummary>) -> bool,
    {
        let mut session_only = self.session_only.lock().await;
        let store = match self.store.init().await {
            Ok(store) => store,
            Err(e) => {
                change(&mut *session_only);
                return Err(e);
            }
        };

        let mut favourites = read_favourites(&store).await;
        if !change(&mut favourites) {
            return Ok(false);
        }

        let value = serde_json::to_value(&favourites)
            .map_err(|e| RecipeError::StorageUnavailable(e.to_string()))?;
        store.set(FAVOURITES_KEY, value).await?;
        Ok(true)
    }
}

async fn read_favourites(store: &ReadyStore) -> Vec<RecipeSummary> {
    match store.get(FAVOURITES_KEY).await {
        Some(Value::Null) | None => Vec::new(),
        Some(value) => serde_json::from_value(value).unwrap_or_else(|e| {
            warn!("Ignoring malformed favourites list: {}", e);
            Vec::new()
        }),
    }
}
