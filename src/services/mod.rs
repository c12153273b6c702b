pub mod age_gate;
pub mod cached_catalog;
pub mod catalog;
pub mod recommendations;
pub mod scoring;
pub mod similarity;

pub use cached_catalog::CachedCatalogStore;
pub use catalog::{CatalogStore, SortField, SortOrder, TitleFilter, TitlePage, TitleQuery};
pub use recommendations::RankingEngine;
pub use scoring::{ScoreWeights, ScoringModel};
