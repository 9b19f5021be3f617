use async_trait::async_trait;
use config::ConfigError;
use log::debug;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::time::Duration;

use super::{normalize_detail, normalize_page, validate_id, validate_query, RecipeCatalog};
use crate::config::CatalogConfig;
use crate::error::{CatalogFailure, Result};
use crate::model::{RecipeDetail, SearchPage};

const DEFAULT_BASE_URL: &str = "https://api.spoonacular.com";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

/// Client for the Spoonacular recipe API
pub struct SpoonacularClient {
    client: Client,
    api_key: String,
    base_url: String,
    add_recipe_information: bool,
    results_per_page: Option<u32>,
}

impl SpoonacularClient {
    /// Create a client from configuration
    pub fn new(config: &CatalogConfig) -> Result<Self> {
        // Try config first, then fall back to environment variable
        let api_key = config
            .resolved_api_key()
            .ok_or_else(|| ConfigError::NotFound("catalog.api_key".to_string()))?;

        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(CatalogFailure::from)?;

        Ok(SpoonacularClient {
            client,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            add_recipe_information: config.add_recipe_information,
            results_per_page: Some(config.results_per_page),
        })
    }

    /// Create a client against the public endpoint with default settings
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    #[doc(hidden)]
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .unwrap_or_default();

        SpoonacularClient {
            client,
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            add_recipe_information: true,
            results_per_page: None,
        }
    }

    /// Toggle `addRecipeInformation` on searches
    pub fn add_recipe_information(mut self, enabled: bool) -> Self {
        self.add_recipe_information = enabled;
        self
    }

    async fn fetch_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request
            .query(&[("apiKey", self.api_key.as_str())])
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(CatalogFailure::from)?;

        let body = response.text().await.map_err(CatalogFailure::from)?;
        debug!("Catalog response: {} bytes", body.len());

        let parsed = serde_json::from_str(&body).map_err(CatalogFailure::from)?;
        Ok(parsed)
    }
}

#[async_trait]
impl RecipeCatalog for SpoonacularClient {
    fn catalog_name(&self) -> &str {
        "spoonacular"
    }

    async fn search_page(&self, query: &str) -> Result<SearchPage> {
        let query = validate_query(query)?;
        debug!("Searching catalog for {:?}", query);

        let mut request = self
            .client
            .get(format!("{}/recipes/complexSearch", self.base_url))
            .query(&[("query", query)]);
        if self.add_recipe_information {
            request = request.query(&[("addRecipeInformation", "true")]);
        }
        if let Some(number) = self.results_per_page {
            request = request.query(&[("number", number)]);
        }

        let page: SearchPage = self.fetch_json(request).await?;
        Ok(normalize_page(page))
    }

    async fn get_details(&self, id: i64) -> Result<RecipeDetail> {
        let id = validate_id(id)?;
        debug!("Fetching details for recipe {}", id);

        let request = self
            .client
            .get(format!("{}/recipes/{}/information", self.base_url, id));
        let detail: RecipeDetail = self.fetch_json(request).await?;
        Ok(normalize_detail(detail))
    }
}
