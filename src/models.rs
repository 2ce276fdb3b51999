use jiff::civil::Date;
use serde::Deserialize;

use crate::entities::movie;

/// One entry of a title search, as returned by the movie database.
#[derive(Clone, Debug, Deserialize)]
pub struct MovieSummary {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub original_title: String,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
}

/// Full record for a single movie from the movie database.
#[derive(Clone, Debug, Deserialize)]
pub struct MovieDetail {
    pub id: i64,
    pub original_title: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
}

/// A movie about to be stored; rating, ranking and review start out empty.
#[derive(Clone, Debug, PartialEq)]
pub struct NewMovie {
    pub title: String,
    pub year: Option<i32>,
    pub description: String,
    pub img_url: Option<String>,
}

impl NewMovie {
    pub fn from_detail(detail: MovieDetail, image_base_url: &str) -> Self {
        let title = if detail.original_title.trim().is_empty() {
            detail.title.unwrap_or_default()
        } else {
            detail.original_title
        };

        Self {
            title,
            year: detail.release_date.as_deref().and_then(release_year),
            description: detail.overview.unwrap_or_default(),
            img_url: detail.poster_path.as_deref().map(|path| poster_url(image_base_url, path)),
        }
    }
}

impl NewMovie {
    /// Whether `existing` was created from the same movie database entry,
    /// as opposed to a different film that happens to share the title.
    pub fn describes(&self, existing: &movie::Model) -> bool {
        existing.title == self.title
            && existing.year == self.year
            && existing.description == self.description
            && existing.img_url == self.img_url
    }
}

/// Year of a `YYYY-MM-DD` release date. Partial dates fall back to their first segment.
pub fn release_year(release_date: &str) -> Option<i32> {
    let raw = release_date.trim();
    if let Ok(date) = raw.parse::<Date>() {
        return Some(i32::from(date.year()));
    }
    raw.split('-').next().and_then(|year| year.trim().parse().ok())
}

pub fn poster_url(image_base_url: &str, poster_path: &str) -> String {
    format!("{}/{}", image_base_url.trim_end_matches('/'), poster_path.trim_start_matches('/'))
}
