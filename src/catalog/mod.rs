mod instructions;
mod spoonacular;

pub use instructions::raw_instruction_lines;
pub use spoonacular::SpoonacularClient;

use async_trait::async_trait;
use html_escape::decode_html_entities;
use log::warn;

use crate::error::{RecipeError, Result};
use crate::model::{RecipeDetail, RecipeSummary, SearchPage};

/// Remote recipe catalog
///
/// Implementations are stateless with respect to local data: they never
/// touch the persistent store and every call is a single attempt.
#[async_trait]
pub trait RecipeCatalog: Send + Sync {
    /// Get the catalog name (e.g., "spoonacular")
    fn catalog_name(&self) -> &str;

    /// Search by ingredient text and return the full page, in catalog order
    async fn search_page(&self, query: &str) -> Result<SearchPage>;

    /// Search by ingredient text, keeping only the summaries
    async fn search(&self, query: &str) -> Result<Vec<RecipeSummary>> {
        Ok(self.search_page(query).await?.results)
    }

    /// Fetch the full record for one recipe
    async fn get_details(&self, id: i64) -> Result<RecipeDetail>;
}

/// Trimmed query text, or `EmptyQuery` when nothing is left
pub fn validate_query(query: &str) -> Result<&str> {
    let query = query.trim();
    if query.is_empty() {
        return Err(RecipeError::EmptyQuery);
    }
    Ok(query)
}

pub fn validate_id(id: i64) -> Result<i64> {
    if id <= 0 {
        return Err(RecipeError::InvalidId(id));
    }
    Ok(id)
}

/// Decode HTML entities in catalog-supplied text and trim whitespace
pub(crate) fn clean_text(text: &str) -> String {
    decode_html_entities(text).trim().to_string()
}

/// Clean titles and drop summaries the catalog could not have meant
pub(crate) fn normalize_page(mut page: SearchPage) -> SearchPage {
    page.results = page
        .results
        .into_iter()
        .filter_map(|mut summary| {
            if summary.id <= 0 {
                warn!("Dropping search result with invalid id {}", summary.id);
                return None;
            }
            summary.title = clean_text(&summary.title);
            summary.image_url = summary.image_url.trim().to_string();
            Some(summary)
        })
        .collect();
    page
}

pub(crate) fn normalize_detail(mut detail: RecipeDetail) -> RecipeDetail {
    detail.title = clean_text(&detail.title);
    detail.image_url = detail.image_url.trim().to_string();
    for ingredient in &mut detail.ingredients {
        ingredient.original_text = clean_text(&ingredient.original_text);
    }
    detail
}
