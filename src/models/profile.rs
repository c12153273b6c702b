use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Age classification attached to a viewer profile
///
/// Values outside the fixed set deserialize to `Unrecognized` so that the
/// age gate can apply its permissive default instead of rejecting the profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgeBand {
    #[serde(rename = "<13")]
    Under13,
    #[serde(rename = "13-17")]
    Teen,
    #[serde(rename = "18-24")]
    YoungAdult,
    #[serde(rename = "25-34")]
    Adult,
    #[serde(rename = "35-49")]
    MiddleAge,
    #[serde(rename = "50+")]
    Senior,
    #[serde(other, rename = "unknown")]
    Unrecognized,
}

impl FromStr for AgeBand {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "<13" => AgeBand::Under13,
            "13-17" => AgeBand::Teen,
            "18-24" => AgeBand::YoungAdult,
            "25-34" => AgeBand::Adult,
            "35-49" => AgeBand::MiddleAge,
            "50+" => AgeBand::Senior,
            _ => AgeBand::Unrecognized,
        })
    }
}

/// A viewer profile within an account
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Profile {
    pub profile_id: i64,
    pub account_id: i64,
    pub profile_name: String,
    pub kids_profile: bool,
    pub age_band: AgeBand,
    pub preferred_language: String,
    /// Comma separated preference tags, e.g. "Drama, Comedy"
    #[serde(default)]
    pub preferences: Option<String>,
    pub created_at: NaiveDate,
}

impl Profile {
    /// Parses the free-text preferences into trimmed, non-empty tags
    ///
    /// Blank segments are dropped on purpose: `"Drama,"` means Drama only and
    /// `"  "` means no preferences, rather than matching every category.
    pub fn preference_tags(&self) -> Vec<&str> {
        self.preferences
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
            .collect()
    }
}
