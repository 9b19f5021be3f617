use thiserror::Error;

/// Errors that can occur while looking up recipes or touching local state
#[derive(Error, Debug)]
pub enum RecipeError {
    /// Search text was empty or whitespace only; no request was sent
    #[error("Search query cannot be empty")]
    EmptyQuery,

    /// Recipe ids handed out by the catalog are always positive
    #[error("Invalid recipe id: {0}")]
    InvalidId(i64),

    /// The remote catalog could not be reached or returned unusable data
    #[error("Recipe catalog unavailable: {0}")]
    CatalogUnavailable(#[from] CatalogFailure),

    /// The local persistence medium could not be opened or written
    #[error("Local storage unavailable: {0}")]
    StorageUnavailable(String),

    /// Attempted to store a measurement unit other than metric or us
    #[error("Invalid measurement preference: {0:?}")]
    InvalidPreference(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

/// Underlying cause of a [`RecipeError::CatalogUnavailable`]
#[derive(Error, Debug)]
pub enum CatalogFailure {
    /// Connection, timeout or non-success HTTP status
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response body did not match the expected shape
    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl RecipeError {
    /// Errors caught before any I/O happens
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            RecipeError::EmptyQuery | RecipeError::InvalidId(_) | RecipeError::InvalidPreference(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, RecipeError>;
