//! View-facing state machines built on the catalog and the local repositories.

mod detail;
mod search;

pub use detail::{DetailSeed, DetailSession, DetailView};
pub use search::{SearchSession, SearchState, SearchView};
