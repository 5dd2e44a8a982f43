//! Transportation review domain model.
//!
//! # Responsibility
//! - Define the shared review field set and the three concrete review kinds.
//! - Convert unvalidated submissions into review records.
//!
//! # Invariants
//! - `ReviewFields` is only ever embedded; it has no identity or table.
//! - Every concrete review carries `minutes_per_day`, `score`, `location`
//!   and `comment`.
//! - `minutes_per_day` is within `0..=1440`; `comment` holds at most 5000
//!   characters.

use super::geo::GeoPoint;
use super::validation::{
    check_int, check_small_int, check_text, int, required, small_int, ValidationError,
    ValidationResult, MAX_COMMENT_CHARS, MAX_MINUTES_PER_DAY, SMALL_INT_MAX,
};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier of a review, unique within its kind.
pub type ReviewId = Uuid;

/// Concrete review kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewKind {
    Transit,
    Bike,
    Car,
}

impl ReviewKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Transit => "transit",
            Self::Bike => "bike",
            Self::Car => "car",
        }
    }
}

impl Display for ReviewKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fields common to every review kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewFields {
    pub minutes_per_day: u16,
    /// No domain bound beyond the small-integer range.
    pub score: u16,
    pub location: GeoPoint,
    pub comment: String,
}

impl ReviewFields {
    pub fn new(
        minutes_per_day: u16,
        score: u16,
        location: GeoPoint,
        comment: impl Into<String>,
    ) -> Self {
        Self {
            minutes_per_day,
            score,
            location,
            comment: comment.into(),
        }
    }

    pub fn validate(&self) -> ValidationResult<()> {
        check_small_int("minutes_per_day", self.minutes_per_day, MAX_MINUTES_PER_DAY)?;
        check_small_int("score", self.score, SMALL_INT_MAX)?;
        self.location.validate("location")?;
        check_text("comment", &self.comment, MAX_COMMENT_CHARS)
    }
}

/// Capability shared by the concrete review records.
pub trait Review {
    const KIND: ReviewKind;

    fn id(&self) -> ReviewId;

    fn fields(&self) -> &ReviewFields;

    /// Validates shared fields, then kind-specific ones.
    fn validate(&self) -> ValidationResult<()>;
}

fn validate_id(id: ReviewId) -> ValidationResult<()> {
    if id.is_nil() {
        return Err(ValidationError::NilId);
    }
    Ok(())
}

/// Review of a transit stop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitReview {
    pub id: ReviewId,
    #[serde(flatten)]
    pub review: ReviewFields,
    /// Transit stop identifier; not checked against any stations table.
    pub station_id: u32,
}

impl TransitReview {
    pub fn new(review: ReviewFields, station_id: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            review,
            station_id,
        }
    }
}

impl Review for TransitReview {
    const KIND: ReviewKind = ReviewKind::Transit;

    fn id(&self) -> ReviewId {
        self.id
    }

    fn fields(&self) -> &ReviewFields {
        &self.review
    }

    fn validate(&self) -> ValidationResult<()> {
        validate_id(self.id)?;
        self.review.validate()?;
        check_int("station_id", self.station_id)
    }
}

/// Review of a cycling route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BikeReview {
    pub id: ReviewId,
    #[serde(flatten)]
    pub review: ReviewFields,
    pub safety: u16,
    pub noise: u16,
}

impl BikeReview {
    pub fn new(review: ReviewFields, safety: u16, noise: u16) -> Self {
        Self {
            id: Uuid::new_v4(),
            review,
            safety,
            noise,
        }
    }
}

impl Review for BikeReview {
    const KIND: ReviewKind = ReviewKind::Bike;

    fn id(&self) -> ReviewId {
        self.id
    }

    fn fields(&self) -> &ReviewFields {
        &self.review
    }

    fn validate(&self) -> ValidationResult<()> {
        validate_id(self.id)?;
        self.review.validate()?;
        check_small_int("safety", self.safety, SMALL_INT_MAX)?;
        check_small_int("noise", self.noise, SMALL_INT_MAX)
    }
}

/// Review of a driving route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarReview {
    pub id: ReviewId,
    #[serde(flatten)]
    pub review: ReviewFields,
    pub traffic: u16,
    pub road_quality: u16,
}

impl CarReview {
    pub fn new(review: ReviewFields, traffic: u16, road_quality: u16) -> Self {
        Self {
            id: Uuid::new_v4(),
            review,
            traffic,
            road_quality,
        }
    }
}

impl Review for CarReview {
    const KIND: ReviewKind = ReviewKind::Car;

    fn id(&self) -> ReviewId {
        self.id
    }

    fn fields(&self) -> &ReviewFields {
        &self.review
    }

    fn validate(&self) -> ValidationResult<()> {
        validate_id(self.id)?;
        self.review.validate()?;
        check_small_int("traffic", self.traffic, SMALL_INT_MAX)?;
        check_small_int("road_quality", self.road_quality, SMALL_INT_MAX)
    }
}

/// Unvalidated shared review fields from the submission workflow.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewSubmission {
    pub minutes_per_day: Option<i64>,
    pub score: Option<i64>,
    pub location: Option<GeoPoint>,
    pub comment: Option<String>,
}

impl ReviewSubmission {
    pub fn into_fields(self) -> ValidationResult<ReviewFields> {
        let fields = ReviewFields {
            minutes_per_day: small_int(
                "minutes_per_day",
                required("minutes_per_day", self.minutes_per_day)?,
                MAX_MINUTES_PER_DAY,
            )?,
            score: small_int("score", required("score", self.score)?, SMALL_INT_MAX)?,
            location: required("location", self.location)?,
            comment: required("comment", self.comment)?,
        };
        fields.validate()?;
        Ok(fields)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransitReviewSubmission {
    #[serde(flatten)]
    pub review: ReviewSubmission,
    pub station_id: Option<i64>,
}

impl TransitReviewSubmission {
    pub fn into_review(self) -> ValidationResult<TransitReview> {
        let review = self.review.into_fields()?;
        let station_id = int("station_id", required("station_id", self.station_id)?)?;
        Ok(TransitReview::new(review, station_id))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BikeReviewSubmission {
    #[serde(flatten)]
    pub review: ReviewSubmission,
    pub safety: Option<i64>,
    pub noise: Option<i64>,
}

impl BikeReviewSubmission {
    pub fn into_review(self) -> ValidationResult<BikeReview> {
        let review = self.review.into_fields()?;
        let safety = small_int("safety", required("safety", self.safety)?, SMALL_INT_MAX)?;
        let noise = small_int("noise", required("noise", self.noise)?, SMALL_INT_MAX)?;
        Ok(BikeReview::new(review, safety, noise))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CarReviewSubmission {
    #[serde(flatten)]
    pub review: ReviewSubmission,
    pub traffic: Option<i64>,
    pub road_quality: Option<i64>,
}

impl CarReviewSubmission {
    pub fn into_review(self) -> ValidationResult<CarReview> {
        let review = self.review.into_fields()?;
        let traffic = small_int("traffic", required("traffic", self.traffic)?, SMALL_INT_MAX)?;
        let road_quality = small_int(
            "road_quality",
            required("road_quality", self.road_quality)?,
            SMALL_INT_MAX,
        )?;
        Ok(CarReview::new(review, traffic, road_quality))
    }
}
