mod profile;
mod recommendation;
mod statistics;
mod title;

pub use profile::{AgeBand, Profile};
pub use recommendation::RankedTitle;
pub use statistics::CatalogStatistics;
pub use title::{ContentRating, Title, TitleType};
