//! Catalog provider abstraction
//!
//! The catalog is an external, read-only metadata service. Providers return
//! errors as-is; degrading them to empty results is the caller's job (see
//! `services::catalog`).
use crate::{
    error::AppResult,
    models::{ContentItem, Genre, GenreId, Trailer},
};

pub mod tmdb;

pub use tmdb::TmdbProvider;

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CatalogProvider: Send + Sync {
    /// Titles trending this week
    async fn trending(&self) -> AppResult<Vec<ContentItem>>;

    async fn top_rated(&self) -> AppResult<Vec<ContentItem>>;

    async fn popular(&self) -> AppResult<Vec<ContentItem>>;

    /// Titles tagged with a single genre
    async fn by_genre(&self, genre_id: GenreId) -> AppResult<Vec<ContentItem>>;

    /// Free-text title search
    async fn search(&self, query: &str) -> AppResult<Vec<ContentItem>>;

    /// Full record for one title; `None` when the catalog has no such id
    async fn details(&self, id: u64) -> AppResult<Option<ContentItem>>;

    /// YouTube trailers for a title, in catalog order
    async fn trailers(&self, id: u64) -> AppResult<Vec<Trailer>>;

    async fn genres(&self) -> AppResult<Vec<Genre>>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}
