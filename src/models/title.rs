use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};

use crate::error::AppError;

/// Content rating vocabulary used across the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ContentRating {
    #[serde(rename = "G")]
    G,
    #[serde(rename = "PG")]
    Pg,
    #[serde(rename = "13+")]
    Teen13,
    #[serde(rename = "16+")]
    Teen16,
    #[serde(rename = "18+")]
    Adult18,
}

impl ContentRating {
    pub const ALL: [ContentRating; 5] = [
        ContentRating::G,
        ContentRating::Pg,
        ContentRating::Teen13,
        ContentRating::Teen16,
        ContentRating::Adult18,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentRating::G => "G",
            ContentRating::Pg => "PG",
            ContentRating::Teen13 => "13+",
            ContentRating::Teen16 => "16+",
            ContentRating::Adult18 => "18+",
        }
    }
}

impl Display for ContentRating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentRating {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ContentRating::ALL
            .into_iter()
            .find(|rating| rating.as_str() == s)
            .ok_or_else(|| AppError::Internal(format!("Unknown content rating: {}", s)))
    }
}

/// Whether a title is a single feature or an episodic series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TitleType {
    Movie,
    Series,
}

impl TitleType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TitleType::Movie => "Movie",
            TitleType::Series => "Series",
        }
    }
}

impl FromStr for TitleType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Movie" => Ok(TitleType::Movie),
            "Series" => Ok(TitleType::Series),
            other => Err(AppError::Internal(format!("Unknown title type: {}", other))),
        }
    }
}

/// A movie or series in the catalog
///
/// Movies always carry `episode_count == 1`, and kids content never carries a
/// 16+ or 18+ rating. Both are guaranteed by whoever loads the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Title {
    pub show_id: String,
    pub title_name: String,
    pub category: String,
    #[serde(default)]
    pub sub_category: Option<String>,
    /// Minutes for movies, seasons or runtime units for series as delivered by the catalog
    pub duration: i32,
    pub age_rating: ContentRating,
    #[serde(rename = "type")]
    pub title_type: TitleType,
    pub year: i32,
    pub origin_region: String,
    pub language: String,
    pub episode_count: i32,
    pub is_kids_content: bool,
    /// External (IMDB-style) rating on a 1-10 scale
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub votes: Option<u64>,
    #[serde(default)]
    pub has_external_rating: bool,
    #[serde(default)]
    pub completeness_score: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_rating_round_trips_through_str() {
        for rating in ContentRating::ALL {
            assert_eq!(rating.as_str().parse::<ContentRating>().unwrap(), rating);
        }
    }

    #[test]
    fn test_content_rating_rejects_unknown_value() {
        let result = "R".parse::<ContentRating>();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Unknown content rating"));
    }

    #[test]
    fn test_content_rating_serde_uses_catalog_labels() {
        let json = serde_json::to_string(&ContentRating::Teen13).unwrap();
        assert_eq!(json, r#""13+""#);

        let rating: ContentRating = serde_json::from_str(r#""PG""#).unwrap();
        assert_eq!(rating, ContentRating::Pg);
    }

    #[test]
    fn test_title_deserializes_with_optional_fields_missing() {
        let json = r#"{
            "show_id": "s1",
            "title_name": "Ocean Friends",
            "category": "Kids",
            "duration": 90,
            "age_rating": "G",
            "type": "Movie",
            "year": 2024,
            "origin_region": "Europe",
            "language": "English",
            "episode_count": 1,
            "is_kids_content": true
        }"#;

        let title: Title = serde_json::from_str(json).unwrap();
        assert_eq!(title.title_type, TitleType::Movie);
        assert_eq!(title.sub_category, None);
        assert_eq!(title.rating, None);
        assert_eq!(title.votes, None);
        assert!(!title.has_external_rating);
    }
}
