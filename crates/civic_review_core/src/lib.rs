//! Record schemas and storage for civic surveys and transportation reviews.
//! This crate is the single source of truth for field constraints.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;

pub use config::{ConfigError, CoreConfig, LoggingConfig};
pub use logging::{
    default_log_level, flush_logging, init_logging, init_logging_from_config, logging_status,
    LoggingError,
};
pub use model::geo::{BoundingBox, GeoPoint};
pub use model::place::{City, Country, PlaceId, PlaceKind, Region};
pub use model::review::{
    BikeReview, BikeReviewSubmission, CarReview, CarReviewSubmission, Review, ReviewFields,
    ReviewId, ReviewKind, ReviewSubmission, TransitReview, TransitReviewSubmission,
};
pub use model::survey::{DemographicSurvey, SurveyId, SurveyPlaces, SurveySubmission};
pub use model::validation::ValidationError;
pub use model::vocab::{Disability, Ethnicity, Gender, IncomeBracket, TagSet, Vocabulary};
pub use repo::place_repo::{PlaceRepository, SqlitePlaceRepository};
pub use repo::review_repo::{
    ReviewListQuery, ReviewRepository, ReviewRow, SqliteBikeReviewRepository,
    SqliteCarReviewRepository, SqliteReviewRepository, SqliteTransitReviewRepository,
};
pub use repo::survey_repo::{SqliteSurveyRepository, SurveyListQuery, SurveyRepository};
pub use repo::{RepoError, RepoResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
