use crate::models::Title;

const SAME_CATEGORY: f64 = 10.0;
const SAME_SUB_CATEGORY: f64 = 10.0;
const SAME_TYPE: f64 = 5.0;
const MAX_YEAR_GAP: i32 = 5;
const YEAR_POINTS_PER_STEP: f64 = 2.0;
const MAX_RATING_GAP: f64 = 1.0;
const RATING_POINTS_PER_UNIT: f64 = 10.0;

/// Additive similarity between a reference title and a candidate
///
/// Callers must only pass titles that share a category; the category bonus is
/// granted unconditionally. The result is an ordinal score for sorting and is
/// not normalized. Sub-categories compare equal when both are absent.
pub fn similarity(reference: &Title, candidate: &Title) -> f64 {
    let mut score = SAME_CATEGORY;

    if reference.sub_category == candidate.sub_category {
        score += SAME_SUB_CATEGORY;
    }

    if reference.title_type == candidate.title_type {
        score += SAME_TYPE;
    }

    let year_diff = (reference.year - candidate.year).abs();
    if year_diff <= MAX_YEAR_GAP {
        score += (MAX_YEAR_GAP - year_diff) as f64 * YEAR_POINTS_PER_STEP;
    }

    if let (Some(a), Some(b)) = (reference.rating, candidate.rating) {
        let rating_diff = (a - b).abs();
        if rating_diff <= MAX_RATING_GAP {
            score += (MAX_RATING_GAP - rating_diff) * RATING_POINTS_PER_UNIT;
        }
    }

    score
}
