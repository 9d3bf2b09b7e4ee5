//! Kid-safety content policy.
//!
//! A single predicate decides whether a catalog item may be shown to a
//! viewer. Non-kid viewers see everything. For kid viewers an item must:
//!
//! 1. not be flagged adult,
//! 2. carry no genre from [`BLOCKED_GENRES`],
//! 3. carry at least one genre from [`ALLOWED_GENRES`],
//! 4. have a vote average inside the configured [`RatingBand`].
//!
//! The same policy value is used for the home feed, search results, the
//! watchlist view and the playback gate.

use crate::models::{ContentItem, GenreId};

pub mod genres {
    use crate::models::GenreId;

    pub const ACTION: GenreId = 28;
    pub const ADVENTURE: GenreId = 12;
    pub const ANIMATION: GenreId = 16;
    pub const COMEDY: GenreId = 35;
    pub const CRIME: GenreId = 80;
    pub const DOCUMENTARY: GenreId = 99;
    pub const DRAMA: GenreId = 18;
    pub const FAMILY: GenreId = 10751;
    pub const FANTASY: GenreId = 14;
    pub const HORROR: GenreId = 27;
    pub const MUSIC: GenreId = 10402;
    pub const MYSTERY: GenreId = 9648;
    pub const ROMANCE: GenreId = 10749;
    pub const THRILLER: GenreId = 53;
    pub const WAR: GenreId = 10752;
    pub const WESTERN: GenreId = 37;
}

use genres::*;

/// Genres that exclude an item from kid profiles regardless of other genres
pub const BLOCKED_GENRES: &[GenreId] = &[
    HORROR,
    THRILLER,
    CRIME,
    DOCUMENTARY,
    MUSIC,
    MYSTERY,
    ACTION,
    ROMANCE,
    WESTERN,
    WAR,
    DRAMA,
];

/// A kid-visible item needs at least one of these
pub const ALLOWED_GENRES: &[GenreId] = &[ANIMATION, FAMILY, ADVENTURE, FANTASY, COMEDY];

/// Default vote-average band for kid profiles
pub const KID_RATING_BAND: RatingBand = RatingBand {
    min: Some(5.0),
    max: Some(8.0),
};

/// Inclusive bounds on an item's vote average; a missing bound is open
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatingBand {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl RatingBand {
    pub fn new(min: Option<f64>, max: Option<f64>) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, rating: f64) -> bool {
        if rating.is_nan() {
            return false;
        }
        self.min.map_or(true, |min| rating >= min) && self.max.map_or(true, |max| rating <= max)
    }
}

/// Why an item was withheld from a kid viewer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    Adult,
    BlockedGenre(GenreId),
    NoAllowedGenre,
    RatingOutOfBand,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContentPolicy {
    blocked_genres: Vec<GenreId>,
    allowed_genres: Vec<GenreId>,
    rating_band: RatingBand,
}

impl Default for ContentPolicy {
    fn default() -> Self {
        Self {
            blocked_genres: BLOCKED_GENRES.to_vec(),
            allowed_genres: ALLOWED_GENRES.to_vec(),
            rating_band: KID_RATING_BAND,
        }
    }
}

impl ContentPolicy {
    pub fn new(blocked_genres: Vec<GenreId>, allowed_genres: Vec<GenreId>, band: RatingBand) -> Self {
        Self {
            blocked_genres,
            allowed_genres,
            rating_band: band,
        }
    }

    pub fn with_rating_band(mut self, band: RatingBand) -> Self {
        self.rating_band = band;
        self
    }

    pub fn rating_band(&self) -> RatingBand {
        self.rating_band
    }

    /// Runs the kid checks in order and reports the first one that fails
    pub fn evaluate(&self, item: &ContentItem) -> Result<(), Rejection> {
        if item.adult {
            return Err(Rejection::Adult);
        }
        if let Some(genre) = item
            .genre_ids
            .iter()
            .find(|id| self.blocked_genres.contains(id))
        {
            return Err(Rejection::BlockedGenre(*genre));
        }
        if !item.has_any_genre(&self.allowed_genres) {
            return Err(Rejection::NoAllowedGenre);
        }
        if !self.rating_band.contains(item.vote_average) {
            return Err(Rejection::RatingOutOfBand);
        }
        Ok(())
    }

    pub fn is_permitted(&self, item: &ContentItem, viewer_is_kid: bool) -> bool {
        !viewer_is_kid || self.evaluate(item).is_ok()
    }

    /// Keeps the permitted items, preserving order
    pub fn filter(&self, items: Vec<ContentItem>, viewer_is_kid: bool) -> Vec<ContentItem> {
        if !viewer_is_kid {
            return items;
        }

        let before = items.len();
        let kept: Vec<ContentItem> = items
            .into_iter()
            .filter(|item| self.evaluate(item).is_ok())
            .collect();

        tracing::debug!(before, after = kept.len(), "Applied kid content policy");
        kept
    }
}
