use log::{debug, warn};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::watch;

use crate::catalog::RecipeCatalog;
use crate::model::RecipeSummary;

/// Lifecycle of the most recent search submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchState {
    #[default]
    Idle,
    Loading,
    Success,
    Failed,
}

/// Everything a results page renders
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchView {
    pub state: SearchState,
    pub query: String,
    pub results: Vec<RecipeSummary>,
    pub count: usize,
    /// Matches known to the catalog, which may exceed `count`
    pub total_results: u32,
    pub error_message: Option<String>,
}

impl SearchView {
    /// "Found N recipe(s)" once a search has succeeded
    pub fn summary_line(&self) -> Option<String> {
        (self.state == SearchState::Success).then(|| format!("Found {} recipe(s)", self.count))
    }
}

/// Search lifecycle for one results page
///
/// Only the latest submission may change the published view. A submission
/// whose request finishes after a newer one started is dropped on arrival.
pub struct SearchSession {
    catalog: Arc<dyn RecipeCatalog>,
    generation: Mutex<u64>,
    view: watch::Sender<SearchView>,
}

impl SearchSession {
    pub fn new(catalog: Arc<dyn RecipeCatalog>) -> Self {
        let (view, _) = watch::channel(SearchView::default());
        SearchSession {
            catalog,
            generation: Mutex::new(0),
            view,
        }
    }

    pub fn view(&self) -> SearchView {
        self.view.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SearchView> {
        self.view.subscribe()
    }

    /// Run one search and publish its outcome unless superseded meanwhile
    pub async fn submit(&self, query: &str) {
        let query = query.trim();
        if query.is_empty() {
            self.begin(|view| *view = SearchView::default());
            return;
        }

        let ticket = self.begin(|view| {
            view.state = SearchState::Loading;
            view.query = query.to_string();
            view.error_message = None;
        });

        let outcome = self.catalog.search_page(query).await;

        self.finish(ticket, |view| match outcome {
            Ok(page) => {
                debug!("Search {:?} returned {} recipe(s)", query, page.results.len());
                view.state = SearchState::Success;
                view.count = page.results.len();
                view.total_results = page.total_results;
                view.results = page.results;
                view.error_message = None;
            }
            Err(e) => {
                warn!("Search {:?} failed: {}", query, e);
                view.state = SearchState::Failed;
                view.results.clear();
                view.count = 0;
                view.total_results = 0;
                view.error_message = Some(format!("Could not load recipes. {}", e));
            }
        });
    }

    /// Start a new generation and publish its first state
    fn begin(&self, update: impl FnOnce(&mut SearchView)) -> u64 {
        let mut generation = self
            .generation
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        *generation += 1;
        self.view.send_modify(update);
        *generation
    }

    fn finish(&self, ticket: u64, update: impl FnOnce(&mut SearchView)) {
        let generation = self
            .generation
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if *generation != ticket {
            debug!("Discarding superseded search result ({} < {})", ticket, *generation);
            return;
        }
        self.view.send_modify(update);
    }
}
