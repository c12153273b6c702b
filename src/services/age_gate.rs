use crate::models::{AgeBand, ContentRating, Profile};

use crate::models::ContentRating::{Adult18, Pg, Teen13, Teen16, G};

const KIDS_UNDER_13: &[ContentRating] = &[G, Pg];
const KIDS_TEEN: &[ContentRating] = &[G, Pg, Teen13];
const ADULT: &[ContentRating] = &[G, Pg, Teen13, Teen16, Adult18];

/// Ratings for any profile no rule matches, including unrecognized age bands
pub const FALLBACK_RATINGS: &[ContentRating] = &[G, Pg, Teen13];

/// One row of the age-gate policy
struct PolicyRule {
    /// `None` matches both kids and regular profiles
    kids: Option<bool>,
    age_band: AgeBand,
    permitted: &'static [ContentRating],
}

/// Evaluated top to bottom, first match wins
const POLICY: &[PolicyRule] = &[
    PolicyRule {
        kids: Some(true),
        age_band: AgeBand::Under13,
        permitted: KIDS_UNDER_13,
    },
    PolicyRule {
        kids: Some(true),
        age_band: AgeBand::Teen,
        permitted: KIDS_TEEN,
    },
    PolicyRule {
        kids: None,
        age_band: AgeBand::YoungAdult,
        permitted: ADULT,
    },
    PolicyRule {
        kids: None,
        age_band: AgeBand::Adult,
        permitted: ADULT,
    },
    PolicyRule {
        kids: None,
        age_band: AgeBand::MiddleAge,
        permitted: ADULT,
    },
    PolicyRule {
        kids: None,
        age_band: AgeBand::Senior,
        permitted: ADULT,
    },
];

/// Maps an age band and kids flag to the content ratings the viewer may see
///
/// Never fails: combinations outside the policy table get [`FALLBACK_RATINGS`].
pub fn permitted_ratings(age_band: AgeBand, is_kids_profile: bool) -> &'static [ContentRating] {
    POLICY
        .iter()
        .find(|rule| {
            rule.age_band == age_band && rule.kids.map_or(true, |kids| kids == is_kids_profile)
        })
        .map(|rule| rule.permitted)
        .unwrap_or(FALLBACK_RATINGS)
}

/// Convenience wrapper over [`permitted_ratings`] for a whole profile
pub fn permitted_ratings_for(profile: &Profile) -> &'static [ContentRating] {
    permitted_ratings(profile.age_band, profile.kids_profile)
}
