//! TMDB (The Movie Database) v3 provider
//!
//! All requests are GETs authenticated with the `api_key` query parameter.
//! List endpoints return the first page only.
use crate::{
    cached,
    db::{Cache, CacheKey},
    error::{AppError, AppResult},
    models::{
        ContentItem, Genre, GenreId, TmdbGenreList, TmdbPage, TmdbVideoList, Trailer,
    },
    services::providers::CatalogProvider,
};
use reqwest::{Client as HttpClient, Response, StatusCode};
use serde::de::DeserializeOwned;

const TRAILER_TYPE: &str = "Trailer";
const TRAILER_SITE: &str = "YouTube";

#[derive(Clone)]
pub struct TmdbProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    cache: Option<Cache>,
}

impl TmdbProvider {
    pub fn new(api_key: String, api_url: String, cache: Option<Cache>) -> Self {
        if api_key.is_empty() {
            tracing::warn!("TMDB_API_KEY is not set; catalog requests will be rejected");
        }

        Self {
            http_client: HttpClient::new(),
            api_key,
            api_url: api_url.trim_end_matches('/').to_string(),
            cache,
        }
    }

    async fn send(&self, path: &str, params: &[(&str, &str)]) -> AppResult<Response> {
        let url = format!("{}{}", self.api_url, path);

        let response = self
            .http_client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str())])
            .query(params)
            .send()
            .await?;

        Ok(response)
    }

    async fn read_json<T: DeserializeOwned>(path: &str, response: Response) -> AppResult<T> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "TMDB returned status {} for {}: {}",
                status, path, body
            )));
        }

        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| {
            tracing::error!(error = %e, path = %path, "Failed to deserialize TMDB response");
            AppError::ExternalApi(format!("Failed to parse TMDB response: {}", e))
        })
    }

    async fn fetch_list(&self, path: &str, params: &[(&str, &str)]) -> AppResult<Vec<ContentItem>> {
        let response = self.send(path, params).await?;
        let page: TmdbPage = Self::read_json(path, response).await?;
        let items: Vec<ContentItem> = page.results.into_iter().map(ContentItem::from).collect();

        tracing::debug!(path = %path, results = items.len(), provider = "tmdb", "Catalog list fetched");
        Ok(items)
    }
}

#[async_trait::async_trait]
impl CatalogProvider for TmdbProvider {
    async fn trending(&self) -> AppResult<Vec<ContentItem>> {
        cached!(self.cache, CacheKey::Trending, async move {
            self.fetch_list("/trending/movie/week", &[]).await
        })
    }

    async fn top_rated(&self) -> AppResult<Vec<ContentItem>> {
        cached!(self.cache, CacheKey::TopRated, async move {
            self.fetch_list("/movie/top_rated", &[]).await
        })
    }

    async fn popular(&self) -> AppResult<Vec<ContentItem>> {
        cached!(self.cache, CacheKey::Popular, async move {
            self.fetch_list("/movie/popular", &[]).await
        })
    }

    async fn by_genre(&self, genre_id: GenreId) -> AppResult<Vec<ContentItem>> {
        cached!(self.cache, CacheKey::Genre(genre_id), async move {
            let genre = genre_id.to_string();
            self.fetch_list("/discover/movie", &[("with_genres", genre.as_str())])
                .await
        })
    }

    async fn search(&self, query: &str) -> AppResult<Vec<ContentItem>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(AppError::InvalidInput(
                "Search query cannot be empty".to_string(),
            ));
        }

        cached!(self.cache, CacheKey::Search(query.to_string()), async move {
            let items = self.fetch_list("/search/movie", &[("query", query)]).await?;
            tracing::info!(query = %query, results = items.len(), provider = "tmdb", "Title search completed");
            Ok::<_, AppError>(items)
        })
    }

    async fn details(&self, id: u64) -> AppResult<Option<ContentItem>> {
        cached!(self.cache, CacheKey::Details(id), async move {
            let path = format!("/movie/{}", id);
            let response = self.send(&path, &[]).await?;
            if response.status() == StatusCode::NOT_FOUND {
                return Ok(None);
            }
            let item: ContentItem = Self::read_json(&path, response).await?;
            Ok::<_, AppError>(Some(item))
        })
    }

    async fn trailers(&self, id: u64) -> AppResult<Vec<Trailer>> {
        cached!(self.cache, CacheKey::Trailers(id), async move {
            let path = format!("/movie/{}/videos", id);
            let response = self.send(&path, &[]).await?;
            let videos: TmdbVideoList = Self::read_json(&path, response).await?;

            let trailers: Vec<Trailer> = videos
                .results
                .into_iter()
                .filter(|v| v.video_type == TRAILER_TYPE && v.site == TRAILER_SITE)
                .map(|v| Trailer {
                    key: v.key,
                    name: v.name,
                    site: v.site,
                })
                .collect();
            Ok::<_, AppError>(trailers)
        })
    }

    async fn genres(&self) -> AppResult<Vec<Genre>> {
        cached!(self.cache, CacheKey::GenreList, async move {
            let path = "/genre/movie/list";
            let response = self.send(path, &[]).await?;
            let list: TmdbGenreList = Self::read_json(path, response).await?;
            Ok::<_, AppError>(list.genres)
        })
    }

    fn name(&self) -> &'static str {
        "tmdb"
    }
}
