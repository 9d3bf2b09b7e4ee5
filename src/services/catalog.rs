//! Catalog browsing for the active profile.
//!
//! Provider failures never propagate from here: a failed query is logged and
//! treated as an empty result. Every list handed out has passed the content
//! policy for the viewer.

use std::sync::Arc;

use futures::future::join_all;
use serde::Serialize;

use crate::{
    error::{AppError, AppResult},
    models::{ContentItem, Genre, GenreId, Profile, Trailer},
    services::{
        policy::{genres, ContentPolicy},
        providers::CatalogProvider,
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RowSource {
    Trending,
    TopRated,
    Popular,
    Genre(GenreId),
}

struct RowSpec {
    title: &'static str,
    source: RowSource,
    for_kids: bool,
}

const HOME_ROWS: &[RowSpec] = &[
    RowSpec { title: "Trending Now", source: RowSource::Trending, for_kids: true },
    RowSpec { title: "Top Rated", source: RowSource::TopRated, for_kids: true },
    RowSpec { title: "Popular", source: RowSource::Popular, for_kids: true },
    RowSpec { title: "Action Movies", source: RowSource::Genre(genres::ACTION), for_kids: false },
    RowSpec { title: "Comedy Movies", source: RowSource::Genre(genres::COMEDY), for_kids: true },
    RowSpec { title: "Horror Movies", source: RowSource::Genre(genres::HORROR), for_kids: false },
    RowSpec { title: "Romance Movies", source: RowSource::Genre(genres::ROMANCE), for_kids: false },
    RowSpec { title: "Documentaries", source: RowSource::Genre(genres::DOCUMENTARY), for_kids: false },
    RowSpec { title: "Animation", source: RowSource::Genre(genres::ANIMATION), for_kids: true },
    RowSpec { title: "Thrillers", source: RowSource::Genre(genres::THRILLER), for_kids: false },
    RowSpec { title: "Dramas", source: RowSource::Genre(genres::DRAMA), for_kids: false },
];

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FeedRow {
    pub title: String,
    pub items: Vec<ContentItem>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct HomeFeed {
    pub hero: Option<ContentItem>,
    pub hero_trailer_key: Option<String>,
    pub rows: Vec<FeedRow>,
}

/// A title cleared for playback
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Playback {
    pub item: ContentItem,
    pub trailer_key: Option<String>,
}

#[derive(Clone)]
pub struct CatalogService {
    provider: Arc<dyn CatalogProvider>,
    policy: Arc<ContentPolicy>,
}

impl CatalogService {
    pub fn new(provider: Arc<dyn CatalogProvider>, policy: Arc<ContentPolicy>) -> Self {
        Self { provider, policy }
    }

    pub fn policy(&self) -> &ContentPolicy {
        &self.policy
    }

    fn degrade<T: Default>(&self, what: &str, result: AppResult<T>) -> T {
        result.unwrap_or_else(|e| {
            tracing::warn!(
                error = %e,
                query = %what,
                provider = self.provider.name(),
                "Catalog query failed, using empty result"
            );
            T::default()
        })
    }

    async fn fetch_row(&self, source: RowSource) -> Vec<ContentItem> {
        match source {
            RowSource::Trending => self.degrade("trending", self.provider.trending().await),
            RowSource::TopRated => self.degrade("top_rated", self.provider.top_rated().await),
            RowSource::Popular => self.degrade("popular", self.provider.popular().await),
            RowSource::Genre(id) => {
                self.degrade(&format!("genre:{}", id), self.provider.by_genre(id).await)
            }
        }
    }

    /// Fetches every home row concurrently and filters each for the viewer
    pub async fn home_feed(&self, viewer: &Profile) -> HomeFeed {
        let specs: Vec<&RowSpec> = HOME_ROWS
            .iter()
            .filter(|spec| spec.for_kids || !viewer.is_kid)
            .collect();

        let fetched = join_all(specs.iter().map(|spec| self.fetch_row(spec.source))).await;

        let rows: Vec<FeedRow> = specs
            .iter()
            .zip(fetched)
            .map(|(spec, items)| FeedRow {
                title: spec.title.to_string(),
                items: self.policy.filter(items, viewer.is_kid),
            })
            .collect();

        let hero = rows
            .first()
            .and_then(|row| row.items.first())
            .cloned();
        let hero_trailer_key = match &hero {
            Some(item) => self.trailer(item.id).await.map(|t| t.key),
            None => None,
        };

        tracing::info!(
            profile_id = %viewer.id,
            rows = rows.len(),
            items = rows.iter().map(|r| r.items.len()).sum::<usize>(),
            "Home feed assembled"
        );

        HomeFeed {
            hero,
            hero_trailer_key,
            rows,
        }
    }

    /// Searches the catalog; a blank query returns nothing without a request
    pub async fn search(&self, viewer: &Profile, query: &str) -> Vec<ContentItem> {
        let query = query.trim();
        if query.is_empty() {
            return Vec::new();
        }

        let results = self.degrade("search", self.provider.search(query).await);
        self.policy.filter(results, viewer.is_kid)
    }

    /// Full record for a title the viewer may open
    pub async fn details(&self, viewer: &Profile, id: u64) -> AppResult<ContentItem> {
        let item = self
            .degrade("details", self.provider.details(id).await)
            .ok_or_else(|| AppError::NotFound(format!("Title {}", id)))?;
        self.gate(viewer, item)
    }

    /// Title and trailer for the watch page, gated by the policy
    pub async fn watch(&self, viewer: &Profile, id: u64) -> AppResult<Playback> {
        let (details, trailers) =
            futures::join!(self.provider.details(id), self.provider.trailers(id));

        let item = self
            .degrade("details", details)
            .ok_or_else(|| AppError::NotFound(format!("Title {}", id)))?;
        let item = self.gate(viewer, item)?;

        let trailer_key = self
            .degrade("trailers", trailers)
            .into_iter()
            .next()
            .map(|t| t.key);

        Ok(Playback { item, trailer_key })
    }

    /// First trailer for a title the viewer may open
    pub async fn trailer_for(&self, viewer: &Profile, id: u64) -> AppResult<Option<Trailer>> {
        if viewer.is_kid {
            self.details(viewer, id).await?;
        }
        Ok(self.trailer(id).await)
    }

    pub async fn trailer(&self, id: u64) -> Option<Trailer> {
        self.degrade("trailers", self.provider.trailers(id).await)
            .into_iter()
            .next()
    }

    pub async fn genres(&self) -> Vec<Genre> {
        self.degrade("genres", self.provider.genres().await)
    }

    fn gate(&self, viewer: &Profile, item: ContentItem) -> AppResult<ContentItem> {
        if !viewer.is_kid {
            return Ok(item);
        }
        match self.policy.evaluate(&item) {
            Ok(()) => Ok(item),
            Err(reason) => {
                tracing::info!(
                    profile_id = %viewer.id,
                    item_id = item.id,
                    reason = ?reason,
                    "Blocked title for kid profile"
                );
                Err(AppError::ContentBlocked)
            }
        }
    }
}
