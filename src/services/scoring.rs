use crate::models::{Profile, Title};

/// Sub-score used whenever a factor has no data to judge by
pub const NEUTRAL_SCORE: f64 = 5.0;

/// Upper bound of every sub-score
pub const MAX_SUB_SCORE: f64 = 10.0;

/// Age thresholds (in years) and the recency sub-score awarded at or below each
const RECENCY_BANDS: &[(i32, f64)] = &[(1, 10.0), (3, 8.0), (5, 6.0), (10, 4.0)];
const RECENCY_FLOOR: f64 = 2.0;

/// Below this many votes a title is treated as having no audience yet
const MIN_VOTES: u64 = 10;
const POPULARITY_SLOPE: f64 = 3.33;

/// Weight applied to each sub-score before summing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreWeights {
    pub preference_match: f64,
    pub language_match: f64,
    pub external_rating: f64,
    pub recency: f64,
    pub popularity: f64,
}

impl ScoreWeights {
    pub const DEFAULT: ScoreWeights = ScoreWeights {
        preference_match: 3.0,
        language_match: 2.0,
        external_rating: 2.5,
        recency: 1.0,
        popularity: 1.5,
    };
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// The five independent factor scores of one (title, profile) pair, each in [0, 10]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubScores {
    pub preference_match: f64,
    pub language_match: f64,
    pub external_rating: f64,
    pub recency: f64,
    pub popularity: f64,
}

impl SubScores {
    /// Weighted sum of the sub-scores, unrounded
    pub fn weighted_total(&self, weights: &ScoreWeights) -> f64 {
        self.preference_match * weights.preference_match
            + self.language_match * weights.language_match
            + self.external_rating * weights.external_rating
            + self.recency * weights.recency
            + self.popularity * weights.popularity
    }
}

/// Content-based scoring of catalog titles against a viewer profile
///
/// Immutable after construction, so one instance can be shared by every
/// concurrent ranking request. The rank score is only meaningful for ordering:
/// it is not normalized and tops out at 102.5 with the default weights.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringModel {
    weights: ScoreWeights,
    current_year: i32,
}

impl ScoringModel {
    /// Creates a model with the default weights, measuring recency from `current_year`
    pub fn new(current_year: i32) -> Self {
        Self::with_weights(ScoreWeights::DEFAULT, current_year)
    }

    pub fn with_weights(weights: ScoreWeights, current_year: i32) -> Self {
        Self {
            weights,
            current_year,
        }
    }

    pub fn current_year(&self) -> i32 {
        self.current_year
    }

    /// Computes every factor score for the pair without weighting them
    pub fn sub_scores(&self, title: &Title, profile: &Profile) -> SubScores {
        SubScores {
            preference_match: preference_match(title, profile),
            language_match: language_match(title, profile),
            external_rating: external_rating(title),
            recency: recency(title, self.current_year),
            popularity: popularity(title),
        }
    }

    /// Rank score of `title` for `profile`, rounded to two decimals
    pub fn score(&self, title: &Title, profile: &Profile) -> f64 {
        round2(self.sub_scores(title, profile).weighted_total(&self.weights))
    }
}

/// How well the title's category matches the profile's preference tags
///
/// Checks run in priority order and the first hit wins: exact category tag,
/// exact sub-category tag, then a case-insensitive substring match between the
/// category and any tag in either direction.
pub fn preference_match(title: &Title, profile: &Profile) -> f64 {
    let tags = profile.preference_tags();
    if tags.is_empty() {
        return NEUTRAL_SCORE;
    }

    if tags.contains(&title.category.as_str()) {
        return 10.0;
    }

    if let Some(sub_category) = title.sub_category.as_deref() {
        if tags.contains(&sub_category) {
            return 8.0;
        }
    }

    let category = title.category.to_lowercase();
    let partial = tags.iter().any(|tag| {
        let tag = tag.to_lowercase();
        category.contains(&tag) || tag.contains(&category)
    });
    if partial {
        return 6.0;
    }

    3.0
}

/// Language affinity between the title and the profile's preferred language
pub fn language_match(title: &Title, profile: &Profile) -> f64 {
    if title.language == "Unknown" {
        return NEUTRAL_SCORE;
    }

    let language = title.language.to_lowercase();
    if language == profile.preferred_language.to_lowercase() {
        return 10.0;
    }

    // English is broadly understood
    if language == "english" || language == "en" {
        return 7.0;
    }

    3.0
}

/// The external rating used as-is; it is already on a 0-10 scale
pub fn external_rating(title: &Title) -> f64 {
    match title.rating {
        Some(rating) if title.has_external_rating => rating,
        _ => NEUTRAL_SCORE,
    }
}

/// Favors recent releases, stepping down with the title's age in years
pub fn recency(title: &Title, current_year: i32) -> f64 {
    let age = current_year - title.year;
    RECENCY_BANDS
        .iter()
        .find(|(max_age, _)| age <= *max_age)
        .map(|(_, score)| *score)
        .unwrap_or(RECENCY_FLOOR)
}

/// Log-scaled vote count
///
/// Missing vote data is neutral, but a title that has votes and fewer than
/// ten of them scores zero.
pub fn popularity(title: &Title) -> f64 {
    match title.votes {
        Some(votes) if title.has_external_rating => {
            if votes < MIN_VOTES {
                return 0.0;
            }
            (((votes as f64).log10() - 1.0) * POPULARITY_SLOPE).clamp(0.0, MAX_SUB_SCORE)
        }
        _ => NEUTRAL_SCORE,
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
