use serde::{Deserialize, Serialize};

use super::{ContentRating, Title, TitleType};

/// A title paired with the score it was ranked by
///
/// For personalized rankings `score` is the weighted rank score, for
/// similar-title lookups it is the similarity to the reference title.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RankedTitle {
    pub show_id: String,
    pub title_name: String,
    pub category: String,
    pub sub_category: Option<String>,
    pub year: i32,
    #[serde(rename = "type")]
    pub title_type: TitleType,
    pub duration: i32,
    pub age_rating: ContentRating,
    pub language: String,
    pub rating: Option<f64>,
    pub score: f64,
}

impl RankedTitle {
    pub fn new(title: Title, score: f64) -> Self {
        Self {
            show_id: title.show_id,
            title_name: title.title_name,
            category: title.category,
            sub_category: title.sub_category,
            year: title.year,
            title_type: title.title_type,
            duration: title.duration,
            age_rating: title.age_rating,
            language: title.language,
            rating: title.rating,
            score,
        }
    }
}
