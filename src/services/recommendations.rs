use std::sync::Arc;

use tracing::instrument;

use crate::{
    error::AppResult,
    models::{Profile, RankedTitle, Title},
    services::{
        age_gate,
        catalog::{CatalogStore, TitleFilter},
        scoring::ScoringModel,
        similarity,
    },
};

/// Pool size scored before category filtering in [`RankingEngine::recommend_in_category`]
pub const CATEGORY_HEADROOM: usize = 100;

/// Ranks catalog titles for viewer profiles
///
/// Holds no per-request state: every call fetches fresh snapshots from the
/// catalog store, scores them and discards them. Profiles or titles that do
/// not exist yield an empty ranking rather than an error; store failures are
/// propagated unchanged.
#[derive(Clone)]
pub struct RankingEngine {
    store: Arc<dyn CatalogStore>,
    scoring: ScoringModel,
}

impl RankingEngine {
    pub fn new(store: Arc<dyn CatalogStore>, scoring: ScoringModel) -> Self {
        Self { store, scoring }
    }

    pub fn scoring(&self) -> &ScoringModel {
        &self.scoring
    }

    /// Personalized top-`limit` titles for a profile
    ///
    /// Candidates are the titles whose rating the profile is permitted to see
    /// (kids profiles additionally only see kids content), minus `exclude_ids`.
    #[instrument(skip(self, exclude_ids), fields(store = self.store.name(), excluded = exclude_ids.len()))]
    pub async fn recommend(
        &self,
        profile_id: i64,
        limit: usize,
        exclude_ids: &[String],
    ) -> AppResult<Vec<RankedTitle>> {
        let Some(profile) = self.store.get_profile(profile_id).await? else {
            tracing::debug!("Profile not found, returning empty recommendations");
            return Ok(Vec::new());
        };

        let candidates = self.candidates_for(&profile).await?;
        let total = candidates.len();

        let candidates: Vec<Title> = candidates
            .into_iter()
            .filter(|title| !exclude_ids.contains(&title.show_id))
            .collect();

        let scored = candidates
            .into_iter()
            .map(|title| {
                let score = self.scoring.score(&title, &profile);
                RankedTitle::new(title, score)
            })
            .collect();

        let ranked = rank(scored, limit);

        tracing::info!(
            candidates = total,
            returned = ranked.len(),
            "Recommendations ranked"
        );

        Ok(ranked)
    }

    /// Personalized recommendations restricted to one category
    ///
    /// Scores a widened pool of `max(CATEGORY_HEADROOM, limit)` personalized
    /// recommendations, keeps those in `category`, then truncates. This can
    /// return fewer than `limit` titles even when the catalog holds more
    /// matches, if they rank below the widened pool.
    #[instrument(skip(self), fields(store = self.store.name()))]
    pub async fn recommend_in_category(
        &self,
        profile_id: i64,
        category: &str,
        limit: usize,
    ) -> AppResult<Vec<RankedTitle>> {
        let pool = self
            .recommend(profile_id, CATEGORY_HEADROOM.max(limit), &[])
            .await?;

        let ranked: Vec<RankedTitle> = pool
            .into_iter()
            .filter(|rec| rec.category == category)
            .take(limit)
            .collect();

        if ranked.len() < limit {
            tracing::debug!(
                returned = ranked.len(),
                requested = limit,
                "Category pool under-filled"
            );
        }

        Ok(ranked)
    }

    /// Titles in the reference title's category, ordered by similarity to it
    ///
    /// Not age gated: every title sharing the category is a candidate.
    #[instrument(skip(self), fields(store = self.store.name()))]
    pub async fn similar_titles(&self, show_id: &str, limit: usize) -> AppResult<Vec<RankedTitle>> {
        let Some(reference) = self.store.get_title(show_id).await? else {
            tracing::debug!("Reference title not found, returning empty list");
            return Ok(Vec::new());
        };

        let filter = TitleFilter {
            category: Some(reference.category.clone()),
            exclude_show_id: Some(reference.show_id.clone()),
            ..Default::default()
        };
        let candidates = self.store.list_titles(&filter).await?;
        let total = candidates.len();

        let scored = candidates
            .into_iter()
            .map(|candidate| {
                let score = similarity::similarity(&reference, &candidate);
                RankedTitle::new(candidate, score)
            })
            .collect();

        let ranked = rank(scored, limit);

        tracing::info!(
            candidates = total,
            returned = ranked.len(),
            "Similar titles ranked"
        );

        Ok(ranked)
    }

    /// Age-appropriate candidate titles for a profile, in store order
    async fn candidates_for(&self, profile: &Profile) -> AppResult<Vec<Title>> {
        let permitted = age_gate::permitted_ratings_for(profile);

        let filter = TitleFilter {
            ratings: Some(permitted.to_vec()),
            kids_only: profile.kids_profile,
            ..Default::default()
        };

        self.store.list_titles(&filter).await
    }
}

/// Sorts by descending score and truncates
///
/// The sort is stable, so equal scores keep the store's retrieval order.
fn rank(mut scored: Vec<RankedTitle>, limit: usize) -> Vec<RankedTitle> {
    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored.truncate(limit);
    scored
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::memory::InMemoryCatalogStore,
        error::AppError,
        models::{AgeBand, ContentRating, TitleType},
        services::catalog::MockCatalogStore,
    };
    use chrono::NaiveDate;

    const YEAR: i32 = 2026;

    fn title(show_id: &str, category: &str, rating: ContentRating) -> Title {
        Title {
            show_id: show_id.to_string(),
            title_name: format!("Title {}", show_id),
            category: category.to_string(),
            sub_category: None,
            duration: 100,
            age_rating: rating,
            title_type: TitleType::Movie,
            year: 2015,
            origin_region: "North America".to_string(),
            language: "English".to_string(),
            episode_count: 1,
            is_kids_content: matches!(rating, ContentRating::G | ContentRating::Pg),
            rating: None,
            votes: None,
            has_external_rating: false,
            completeness_score: 0.8,
        }
    }

    fn profile(profile_id: i64, age_band: AgeBand, kids: bool, preferences: &str) -> Profile {
        Profile {
            profile_id,
            account_id: 1,
            profile_name: format!("Profile {}", profile_id),
            kids_profile: kids,
            age_band,
            preferred_language: "English".to_string(),
            preferences: Some(preferences.to_string()),
            created_at: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
        }
    }

    fn engine(profiles: Vec<Profile>, titles: Vec<Title>) -> RankingEngine {
        let store = InMemoryCatalogStore::new(profiles, titles);
        RankingEngine::new(Arc::new(store), ScoringModel::new(YEAR))
    }

    fn ids(ranked: &[RankedTitle]) -> Vec<&str> {
        ranked.iter().map(|r| r.show_id.as_str()).collect()
    }

    #[tokio::test]
    async fn test_kids_profile_only_sees_permitted_kids_titles() {
        let mut animation = title("anim", "Animation", ContentRating::G);
        animation.year = 2025;
        animation.rating = Some(8.0);
        animation.votes = Some(1500);
        animation.has_external_rating = true;

        let adult = title("adult", "Animation", ContentRating::Adult18);
        let mut teen_kids = title("teen", "Kids", ContentRating::Teen13);
        teen_kids.is_kids_content = true;
        let mut grown_up_pg = title("pg-general", "Kids", ContentRating::Pg);
        grown_up_pg.is_kids_content = false;

        let engine = engine(
            vec![profile(1, AgeBand::Under13, true, "Kids,Animation")],
            vec![animation, adult, teen_kids, grown_up_pg],
        );

        let recs = engine.recommend(1, 10, &[]).await.unwrap();
        assert_eq!(ids(&recs), vec!["anim"]);
        assert_eq!(recs[0].score, 90.87);
    }

    #[tokio::test]
    async fn test_recommendations_respect_permitted_ratings() {
        let titles: Vec<Title> = ContentRating::ALL
            .into_iter()
            .enumerate()
            .map(|(i, rating)| title(&format!("s{}", i), "Drama", rating))
            .collect();
        let engine = engine(
            vec![
                profile(1, AgeBand::Teen, false, "Drama"),
                profile(2, AgeBand::Adult, false, "Drama"),
            ],
            titles,
        );

        let teen = engine.recommend(1, 10, &[]).await.unwrap();
        let permitted = age_gate::permitted_ratings(AgeBand::Teen, false);
        assert_eq!(teen.len(), 3);
        assert!(teen.iter().all(|r| permitted.contains(&r.age_rating)));

        let adult = engine.recommend(2, 10, &[]).await.unwrap();
        assert_eq!(adult.len(), 5);
    }

    #[tokio::test]
    async fn test_excluded_ids_never_returned() {
        let titles = vec![
            title("s1", "Drama", ContentRating::Pg),
            title("s2", "Drama", ContentRating::Pg),
            title("s3", "Drama", ContentRating::Pg),
        ];
        let engine = engine(vec![profile(1, AgeBand::Adult, false, "Drama")], titles);

        let excluded = vec!["s1".to_string(), "s3".to_string()];
        let recs = engine.recommend(1, 10, &excluded).await.unwrap();
        assert_eq!(ids(&recs), vec!["s2"]);
    }

    #[tokio::test]
    async fn test_unknown_profile_returns_empty() {
        let engine = engine(vec![], vec![title("s1", "Drama", ContentRating::G)]);
        let recs = engine.recommend(42, 10, &[]).await.unwrap();
        assert!(recs.is_empty());
    }

    #[tokio::test]
    async fn test_sorted_descending_and_truncated() {
        let mut recent = title("recent", "Comedy", ContentRating::Pg);
        recent.year = 2026;
        let mut preferred = title("preferred", "Drama", ContentRating::Pg);
        preferred.year = 2026;
        let old = title("old", "Comedy", ContentRating::Pg);

        let engine = engine(
            vec![profile(1, AgeBand::Adult, false, "Drama")],
            vec![old, recent, preferred],
        );

        let recs = engine.recommend(1, 2, &[]).await.unwrap();
        assert_eq!(ids(&recs), vec!["preferred", "recent"]);
        assert!(recs[0].score > recs[1].score);
    }

    #[tokio::test]
    async fn test_equal_scores_keep_store_order() {
        let titles = vec![
            title("c", "Drama", ContentRating::Pg),
            title("a", "Drama", ContentRating::Pg),
            title("b", "Drama", ContentRating::Pg),
        ];
        let engine = engine(vec![profile(1, AgeBand::Adult, false, "Drama")], titles);

        let recs = engine.recommend(1, 10, &[]).await.unwrap();
        assert_eq!(ids(&recs), vec!["c", "a", "b"]);
    }

    #[tokio::test]
    async fn test_category_recommendations_filter_and_truncate() {
        let titles = vec![
            title("d1", "Drama", ContentRating::Pg),
            title("c1", "Comedy", ContentRating::Pg),
            title("d2", "Drama", ContentRating::Pg),
            title("d3", "Drama", ContentRating::Pg),
        ];
        let engine = engine(vec![profile(1, AgeBand::Adult, false, "Comedy")], titles);

        let recs = engine.recommend_in_category(1, "Drama", 2).await.unwrap();
        assert_eq!(ids(&recs), vec!["d1", "d2"]);
        assert!(recs.iter().all(|r| r.category == "Drama"));
    }

    #[tokio::test]
    async fn test_category_recommendations_under_fill_outside_headroom() {
        // The headroom pool is filled by preferred comedies, pushing every
        // drama outside it.
        let mut titles: Vec<Title> = (0..CATEGORY_HEADROOM)
            .map(|i| title(&format!("c{}", i), "Comedy", ContentRating::Pg))
            .collect();
        titles.push(title("d1", "Drama", ContentRating::Pg));
        let engine = engine(vec![profile(1, AgeBand::Adult, false, "Comedy")], titles);

        let recs = engine.recommend_in_category(1, "Drama", 5).await.unwrap();
        assert!(recs.is_empty());
    }

    #[tokio::test]
    async fn test_category_recommendations_unknown_profile() {
        let engine = engine(vec![], vec![title("d1", "Drama", ContentRating::Pg)]);
        let recs = engine.recommend_in_category(9, "Drama", 5).await.unwrap();
        assert!(recs.is_empty());
    }

    #[tokio::test]
    async fn test_similar_titles_same_category_excluding_reference() {
        let mut reference = title("ref", "Drama", ContentRating::Teen16);
        reference.year = 2020;
        let mut close = title("close", "Drama", ContentRating::Adult18);
        close.year = 2020;
        let mut far = title("far", "Drama", ContentRating::G);
        far.year = 1990;
        let other = title("other", "Comedy", ContentRating::G);

        let engine = engine(vec![], vec![far, reference, other, close]);

        let similar = engine.similar_titles("ref", 10).await.unwrap();
        assert_eq!(ids(&similar), vec!["close", "far"]);
        assert_eq!(similar[0].score, 35.0);
        assert_eq!(similar[1].score, 25.0);
    }

    #[tokio::test]
    async fn test_similar_titles_ties_keep_store_order() {
        let reference = title("ref", "Drama", ContentRating::Pg);
        let engine = engine(
            vec![],
            vec![
                title("z", "Drama", ContentRating::Pg),
                reference,
                title("m", "Drama", ContentRating::Pg),
                title("a", "Drama", ContentRating::Pg),
            ],
        );

        let similar = engine.similar_titles("ref", 2).await.unwrap();
        assert_eq!(ids(&similar), vec!["z", "m"]);
    }

    #[tokio::test]
    async fn test_similar_titles_unknown_reference_returns_empty() {
        let engine = engine(vec![], vec![title("s1", "Drama", ContentRating::Pg)]);
        let similar = engine.similar_titles("not-a-real-id", 10).await.unwrap();
        assert!(similar.is_empty());
    }

    #[tokio::test]
    async fn test_store_failure_propagates() {
        let mut store = MockCatalogStore::new();
        store.expect_name().return_const("mock");
        store
            .expect_get_profile()
            .returning(|_| Ok(Some(profile(1, AgeBand::Adult, false, "Drama"))));
        store
            .expect_list_titles()
            .returning(|_| Err(AppError::Database(sqlx::Error::PoolTimedOut)));

        let engine = RankingEngine::new(Arc::new(store), ScoringModel::new(YEAR));
        let result = engine.recommend(1, 10, &[]).await;
        assert!(matches!(result, Err(AppError::Database(_))));
    }

    #[tokio::test]
    async fn test_candidate_filter_sent_to_store() {
        let mut store = MockCatalogStore::new();
        store.expect_name().return_const("mock");
        store
            .expect_get_profile()
            .returning(|_| Ok(Some(profile(1, AgeBand::Under13, true, "Kids"))));
        store
            .expect_list_titles()
            .withf(|filter| {
                filter.kids_only
                    && filter.ratings == Some(vec![ContentRating::G, ContentRating::Pg])
                    && filter.category.is_none()
            })
            .times(1)
            .returning(|_| Ok(Vec::new()));

        let engine = RankingEngine::new(Arc::new(store), ScoringModel::new(YEAR));
        let recs = engine.recommend(1, 10, &[]).await.unwrap();
        assert!(recs.is_empty());
    }
}
