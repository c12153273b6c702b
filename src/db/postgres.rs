use chrono::NaiveDate;
use sqlx::{postgres::PgPoolOptions, PgPool, Postgres, QueryBuilder};

use crate::{
    error::{AppError, AppResult},
    models::{AgeBand, CatalogStatistics, Profile, Title, TitleType},
    services::catalog::{CatalogStore, SortField, SortOrder, TitleFilter, TitlePage, TitleQuery},
};

const PROFILE_COLUMNS: &str = "profile_id, account_id, profile_name, kids_profile, age_band, \
     preferred_language, preferences, created_at";

const TITLE_COLUMNS: &str = "show_id, title_name, category, sub_category, duration, age_rating, \
     content_type, year, origin_region, language, episode_count, is_kids_content, rating, votes, \
     has_external_rating, completeness_score";

/// Creates a PostgreSQL connection pool
///
/// Establishes a pool of database connections for efficient reuse.
/// The pool automatically manages connection lifecycle and limits.
pub async fn create_pool(database_url: &str, max_connections: u32) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;

    Ok(pool)
}

/// Applies the bundled catalog schema
pub async fn run_migrations(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    tracing::info!("Catalog migrations applied");
    Ok(())
}

#[derive(Debug, sqlx::FromRow)]
struct ProfileRow {
    profile_id: i64,
    account_id: i64,
    profile_name: String,
    kids_profile: bool,
    age_band: String,
    preferred_language: String,
    preferences: Option<String>,
    created_at: NaiveDate,
}

impl From<ProfileRow> for Profile {
    fn from(row: ProfileRow) -> Self {
        // Unknown bands parse to `AgeBand::Unrecognized`, never an error
        let age_band = row
            .age_band
            .parse::<AgeBand>()
            .unwrap_or(AgeBand::Unrecognized);

        Profile {
            profile_id: row.profile_id,
            account_id: row.account_id,
            profile_name: row.profile_name,
            kids_profile: row.kids_profile,
            age_band,
            preferred_language: row.preferred_language,
            preferences: row.preferences,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct TitleRow {
    show_id: String,
    title_name: String,
    category: String,
    sub_category: Option<String>,
    duration: i32,
    age_rating: String,
    content_type: String,
    year: i32,
    origin_region: String,
    language: String,
    episode_count: i32,
    is_kids_content: bool,
    rating: Option<f64>,
    votes: Option<i64>,
    has_external_rating: bool,
    completeness_score: f64,
}

impl TryFrom<TitleRow> for Title {
    type Error = AppError;

    fn try_from(row: TitleRow) -> Result<Self, Self::Error> {
        Ok(Title {
            age_rating: row.age_rating.parse()?,
            title_type: row.content_type.parse()?,
            show_id: row.show_id,
            title_name: row.title_name,
            category: row.category,
            sub_category: row.sub_category,
            duration: row.duration,
            year: row.year,
            origin_region: row.origin_region,
            language: row.language,
            episode_count: row.episode_count,
            is_kids_content: row.is_kids_content,
            rating: row.rating,
            votes: row.votes.map(|v| v.max(0) as u64),
            has_external_rating: row.has_external_rating,
            completeness_score: row.completeness_score,
        })
    }
}

fn into_titles(rows: Vec<TitleRow>) -> AppResult<Vec<Title>> {
    rows.into_iter().map(Title::try_from).collect()
}

/// Escapes LIKE wildcards so user input only matches literally
fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Builds the dynamic `list_titles` query; natural order is the surrogate key
fn list_titles_query(filter: &TitleFilter) -> QueryBuilder<'static, Postgres> {
    let mut query = QueryBuilder::new(format!("SELECT {} FROM titles WHERE TRUE", TITLE_COLUMNS));

    if let Some(ratings) = &filter.ratings {
        let labels: Vec<String> = ratings.iter().map(|r| r.as_str().to_string()).collect();
        query.push(" AND age_rating = ANY(").push_bind(labels).push(")");
    }

    if filter.kids_only {
        query.push(" AND is_kids_content = TRUE");
    }

    if let Some(category) = &filter.category {
        query.push(" AND category = ").push_bind(category.clone());
    }

    if let Some(show_id) = &filter.exclude_show_id {
        query.push(" AND show_id <> ").push_bind(show_id.clone());
    }

    query.push(" ORDER BY id");
    query
}

/// Appends the [`TitleQuery`] criteria to a query ending in a WHERE clause
fn push_query_criteria(builder: &mut QueryBuilder<'static, Postgres>, query: &TitleQuery) {
    if let Some(category) = &query.category {
        builder.push(" AND category = ").push_bind(category.clone());
    }
    if let Some(title_type) = query.title_type {
        builder
            .push(" AND content_type = ")
            .push_bind(title_type.as_str());
    }
    if let Some(rating) = query.age_rating {
        builder.push(" AND age_rating = ").push_bind(rating.as_str());
    }
    if let Some(year_min) = query.year_min {
        builder.push(" AND year >= ").push_bind(year_min);
    }
    if let Some(year_max) = query.year_max {
        builder.push(" AND year <= ").push_bind(year_max);
    }
    if query.kids_only {
        builder.push(" AND is_kids_content = TRUE");
    }
    if let Some(min_rating) = query.min_rating {
        builder.push(" AND rating >= ").push_bind(min_rating);
    }
    if let Some(language) = &query.language {
        builder.push(" AND language = ").push_bind(language.clone());
    }
}

fn sort_column(field: SortField) -> &'static str {
    match field {
        SortField::Rating => "rating",
        SortField::Year => "year",
        SortField::TitleName => "title_name",
        SortField::Duration => "duration",
    }
}

/// NULL ratings sort lowest in both directions
fn sort_direction(order: SortOrder) -> &'static str {
    match order {
        SortOrder::Asc => "ASC NULLS FIRST",
        SortOrder::Desc => "DESC NULLS LAST",
    }
}

fn query_titles_query(query: &TitleQuery) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(format!("SELECT {} FROM titles WHERE TRUE", TITLE_COLUMNS));
    push_query_criteria(&mut builder, query);

    builder.push(format!(
        " ORDER BY {} {}, id",
        sort_column(query.sort_by),
        sort_direction(query.order)
    ));
    builder
        .push(" LIMIT ")
        .push_bind(i64::try_from(query.limit).unwrap_or(i64::MAX))
        .push(" OFFSET ")
        .push_bind(i64::try_from(query.offset).unwrap_or(i64::MAX));
    builder
}

fn count_titles_query(query: &TitleQuery) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new("SELECT COUNT(*) FROM titles WHERE TRUE");
    push_query_criteria(&mut builder, query);
    builder
}

#[derive(Debug, sqlx::FromRow)]
struct StatisticsRow {
    total_accounts: i64,
    total_profiles: i64,
    kids_profiles: i64,
    total_titles: i64,
    kids_content: i64,
    movies: i64,
    series: i64,
    titles_with_ratings: i64,
    avg_rating: Option<f64>,
    unique_categories: i64,
    unique_languages: i64,
    unique_regions: i64,
}

impl From<StatisticsRow> for CatalogStatistics {
    fn from(row: StatisticsRow) -> Self {
        let count = |value: i64| value.max(0) as u64;
        CatalogStatistics {
            total_accounts: count(row.total_accounts),
            total_profiles: count(row.total_profiles),
            kids_profiles: count(row.kids_profiles),
            total_titles: count(row.total_titles),
            kids_content: count(row.kids_content),
            movies: count(row.movies),
            series: count(row.series),
            titles_with_ratings: count(row.titles_with_ratings),
            avg_rating: row.avg_rating,
            unique_categories: count(row.unique_categories),
            unique_languages: count(row.unique_languages),
            unique_regions: count(row.unique_regions),
        }
    }
}

/// Catalog store backed by the PostgreSQL catalog schema
#[derive(Clone)]
pub struct PgCatalogStore {
    pool: PgPool,
}

impl PgCatalogStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl CatalogStore for PgCatalogStore {
    async fn get_profile(&self, profile_id: i64) -> AppResult<Option<Profile>> {
        let row = sqlx::query_as::<_, ProfileRow>(&format!(
            "SELECT {} FROM profiles WHERE profile_id = $1",
            PROFILE_COLUMNS
        ))
        .bind(profile_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Profile::from))
    }

    async fn list_profiles(&self, account_id: Option<i64>) -> AppResult<Vec<Profile>> {
        let rows = sqlx::query_as::<_, ProfileRow>(&format!(
            "SELECT {} FROM profiles WHERE ($1::BIGINT IS NULL OR account_id = $1) \
             ORDER BY profile_id",
            PROFILE_COLUMNS
        ))
        .bind(account_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Profile::from).collect())
    }

    async fn get_title(&self, show_id: &str) -> AppResult<Option<Title>> {
        let row = sqlx::query_as::<_, TitleRow>(&format!(
            "SELECT {} FROM titles WHERE show_id = $1",
            TITLE_COLUMNS
        ))
        .bind(show_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Title::try_from).transpose()
    }

    async fn list_titles(&self, filter: &TitleFilter) -> AppResult<Vec<Title>> {
        let mut query = list_titles_query(filter);
        let rows: Vec<TitleRow> = query.build_query_as().fetch_all(&self.pool).await?;

        tracing::debug!(rows = rows.len(), ?filter, "Listed catalog titles");

        into_titles(rows)
    }

    async fn search_titles(&self, query: &str, limit: usize) -> AppResult<Vec<Title>> {
        let pattern = format!("%{}%", escape_like(query));

        let rows = sqlx::query_as::<_, TitleRow>(&format!(
            "SELECT {} FROM titles WHERE title_name ILIKE $1 ORDER BY id LIMIT $2",
            TITLE_COLUMNS
        ))
        .bind(pattern)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        into_titles(rows)
    }

    async fn query_titles(&self, query: &TitleQuery) -> AppResult<TitlePage> {
        let total: i64 = count_titles_query(query)
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        let rows: Vec<TitleRow> = query_titles_query(query)
            .build_query_as()
            .fetch_all(&self.pool)
            .await?;

        tracing::debug!(rows = rows.len(), total, "Queried catalog titles");

        Ok(TitlePage {
            titles: into_titles(rows)?,
            total: total.max(0) as u64,
        })
    }

    async fn list_categories(&self) -> AppResult<Vec<String>> {
        let categories = sqlx::query_scalar::<_, String>(
            r#"
            SELECT DISTINCT category
            FROM titles
            WHERE category <> 'Unknown' AND category <> ''
            ORDER BY category
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }

    async fn statistics(&self) -> AppResult<CatalogStatistics> {
        let row = sqlx::query_as::<_, StatisticsRow>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM accounts) AS total_accounts,
                (SELECT COUNT(*) FROM profiles) AS total_profiles,
                (SELECT COUNT(*) FROM profiles WHERE kids_profile) AS kids_profiles,
                COUNT(*) AS total_titles,
                COUNT(*) FILTER (WHERE is_kids_content) AS kids_content,
                COUNT(*) FILTER (WHERE content_type = $1) AS movies,
                COUNT(*) FILTER (WHERE content_type = $2) AS series,
                COUNT(*) FILTER (WHERE has_external_rating) AS titles_with_ratings,
                AVG(rating) FILTER (WHERE has_external_rating) AS avg_rating,
                COUNT(DISTINCT category) AS unique_categories,
                COUNT(DISTINCT language) AS unique_languages,
                COUNT(DISTINCT origin_region) AS unique_regions
            FROM titles
            "#,
        )
        .bind(TitleType::Movie.as_str())
        .bind(TitleType::Series.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    fn name(&self) -> &'static str {
        "postgres"
    }
}
