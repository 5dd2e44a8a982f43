//! Demographic survey domain model.
//!
//! # Responsibility
//! - Define the one-time respondent profile and its field constraints.
//! - Convert unvalidated submissions into records, all-or-nothing.
//!
//! # Invariants
//! - `id` is stable and never nil.
//! - `minutes_per_day_outside` is within `0..=1440`.
//! - `safe_rating` is within `0..=10`.
//! - `comment_experience` holds at most 5000 characters.
//! - `income` has no implicit default: absent means "not recorded".

use super::geo::GeoPoint;
use super::place::PlaceId;
use super::validation::{
    check_small_int, check_text, required, small_int, ValidationError, ValidationResult,
    MAX_COMMENT_CHARS, MAX_MINUTES_PER_DAY, MAX_SAFE_RATING, SMALL_INT_MAX,
};
use super::vocab::{Disability, Ethnicity, Gender, IncomeBracket, TagSet, Vocabulary};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier of a demographic survey.
pub type SurveyId = Uuid;

/// Place references every survey must carry.
///
/// All three are foreign keys with cascading delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveyPlaces {
    pub country_id: PlaceId,
    /// Region (state/province) id.
    pub state_id: PlaceId,
    pub city_id: PlaceId,
}

/// One respondent profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemographicSurvey {
    pub id: SurveyId,
    #[serde(flatten)]
    pub places: SurveyPlaces,
    /// Independent of the place references.
    pub location: Option<GeoPoint>,
    pub age: Option<u16>,
    pub gender: Option<TagSet<Gender>>,
    pub income: Option<IncomeBracket>,
    pub ethnicity: Option<TagSet<Ethnicity>>,
    pub disability: Option<TagSet<Disability>>,
    pub minutes_per_day_outside: u16,
    pub safe_rating: u16,
    pub comment_experience: String,
}

impl DemographicSurvey {
    /// Creates a survey with a generated id and every optional field absent.
    pub fn new(
        places: SurveyPlaces,
        minutes_per_day_outside: u16,
        safe_rating: u16,
        comment_experience: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            places,
            location: None,
            age: None,
            gender: None,
            income: None,
            ethnicity: None,
            disability: None,
            minutes_per_day_outside,
            safe_rating,
            comment_experience: comment_experience.into(),
        }
    }

    /// Creates a survey with a caller-provided id.
    ///
    /// Used by import paths where identity already exists externally.
    pub fn with_id(
        id: SurveyId,
        places: SurveyPlaces,
        minutes_per_day_outside: u16,
        safe_rating: u16,
        comment_experience: impl Into<String>,
    ) -> ValidationResult<Self> {
        if id.is_nil() {
            return Err(ValidationError::NilId);
        }
        let mut survey = Self::new(
            places,
            minutes_per_day_outside,
            safe_rating,
            comment_experience,
        );
        survey.id = id;
        Ok(survey)
    }

    /// Checks every field constraint. Place existence is checked by the
    /// repository.
    pub fn validate(&self) -> ValidationResult<()> {
        if self.id.is_nil() {
            return Err(ValidationError::NilId);
        }
        if let Some(location) = &self.location {
            location.validate("location")?;
        }
        if let Some(age) = self.age {
            check_small_int("age", age, SMALL_INT_MAX)?;
        }
        check_small_int(
            "minutes_per_day_outside",
            self.minutes_per_day_outside,
            MAX_MINUTES_PER_DAY,
        )?;
        check_small_int("safe_rating", self.safe_rating, MAX_SAFE_RATING)?;
        check_text(
            "comment_experience",
            &self.comment_experience,
            MAX_COMMENT_CHARS,
        )
    }
}

/// Unvalidated survey payload from the submission workflow.
///
/// Every field is optional so that missing required values surface as
/// `ValidationError::MissingField` instead of a decoding failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurveySubmission {
    pub country_id: Option<PlaceId>,
    pub state_id: Option<PlaceId>,
    pub city_id: Option<PlaceId>,
    pub location: Option<GeoPoint>,
    pub age: Option<i64>,
    pub gender: Option<Vec<String>>,
    pub income: Option<String>,
    pub ethnicity: Option<Vec<String>>,
    pub disability: Option<Vec<String>>,
    pub minutes_per_day_outside: Option<i64>,
    pub safe_rating: Option<i64>,
    pub comment_experience: Option<String>,
}

impl SurveySubmission {
    /// Converts the payload into a validated survey with a new id.
    pub fn into_survey(self) -> ValidationResult<DemographicSurvey> {
        let places = SurveyPlaces {
            country_id: required("country", self.country_id)?,
            state_id: required("state", self.state_id)?,
            city_id: required("city", self.city_id)?,
        };
        let minutes_per_day_outside = small_int(
            "minutes_per_day_outside",
            required("minutes_per_day_outside", self.minutes_per_day_outside)?,
            MAX_MINUTES_PER_DAY,
        )?;
        let safe_rating = small_int(
            "safe_rating",
            required("safe_rating", self.safe_rating)?,
            MAX_SAFE_RATING,
        )?;
        let comment_experience = required("comment_experience", self.comment_experience)?;

        let mut survey = DemographicSurvey::new(
            places,
            minutes_per_day_outside,
            safe_rating,
            comment_experience,
        );
        survey.location = self.location;
        survey.age = self
            .age
            .map(|age| small_int("age", age, SMALL_INT_MAX))
            .transpose()?;
        survey.gender = tag_set("gender", self.gender)?;
        survey.income = self
            .income
            .map(|code| {
                IncomeBracket::from_code(&code)
                    .ok_or(ValidationError::UnknownTag {
                        field: "income",
                        value: code,
                    })
            })
            .transpose()?;
        survey.ethnicity = tag_set("ethnicity", self.ethnicity)?;
        survey.disability = tag_set("disability", self.disability)?;

        survey.validate()?;
        Ok(survey)
    }
}

fn tag_set<T: Vocabulary>(
    field: &'static str,
    codes: Option<Vec<String>>,
) -> ValidationResult<Option<TagSet<T>>> {
    codes
        .map(|codes| TagSet::from_codes(field, codes))
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::{DemographicSurvey, SurveyPlaces, SurveySubmission};
    use crate::model::validation::ValidationError;
    use crate::model::vocab::{Gender, IncomeBracket};

    fn places() -> SurveyPlaces {
        SurveyPlaces {
            country_id: 1,
            state_id: 10,
            city_id: 100,
        }
    }

    fn submission() -> SurveySubmission {
        SurveySubmission {
            country_id: Some(1),
            state_id: Some(10),
            city_id: Some(100),
            minutes_per_day_outside: Some(90),
            safe_rating: Some(7),
            comment_experience: Some("Sidewalks are narrow".to_string()),
            ..SurveySubmission::default()
        }
    }

    #[test]
    fn new_leaves_optional_fields_absent() {
        let survey = DemographicSurvey::new(places(), 30, 5, "ok");
        assert!(!survey.id.is_nil());
        assert_eq!(survey.income, None);
        assert_eq!(survey.gender, None);
        assert_eq!(survey.location, None);
        assert!(survey.validate().is_ok());
    }

    #[test]
    fn minutes_outside_bound_is_inclusive() {
        let mut survey = DemographicSurvey::new(places(), 1440, 5, "");
        assert!(survey.validate().is_ok());

        survey.minutes_per_day_outside = 1441;
        assert!(matches!(
            survey.validate(),
            Err(ValidationError::OutOfRange {
                field: "minutes_per_day_outside",
                value: 1441,
                ..
            })
        ));
    }

    #[test]
    fn safe_rating_bound_is_inclusive() {
        let mut survey = DemographicSurvey::new(places(), 10, 10, "");
        assert!(survey.validate().is_ok());

        survey.safe_rating = 11;
        assert!(matches!(
            survey.validate(),
            Err(ValidationError::OutOfRange {
                field: "safe_rating",
                ..
            })
        ));
    }

    #[test]
    fn submission_converts_tags_and_income() {
        let mut input = submission();
        input.gender = Some(vec!["F".to_string(), "NB".to_string()]);
        input.income = Some("GT_50".to_string());

        let survey = input.into_survey().unwrap();
        let gender = survey.gender.unwrap();
        assert!(gender.contains(Gender::Woman));
        assert!(gender.contains(Gender::NonBinary));
        assert_eq!(survey.income, Some(IncomeBracket::From50kTo100k));
    }

    #[test]
    fn submission_rejects_padded_codes() {
        let mut input = submission();
        input.gender = Some(vec![" F ".to_string()]);
        assert_eq!(
            input.into_survey().unwrap_err(),
            ValidationError::UnknownTag {
                field: "gender",
                value: " F ".to_string(),
            }
        );

        let mut input = submission();
        input.income = Some(" GT_50".to_string());
        assert_eq!(
            input.into_survey().unwrap_err(),
            ValidationError::UnknownTag {
                field: "income",
                value: " GT_50".to_string(),
            }
        );
    }

    #[test]
    fn submission_reports_missing_required_field() {
        let mut input = submission();
        input.safe_rating = None;
        assert_eq!(
            input.into_survey().unwrap_err(),
            ValidationError::MissingField("safe_rating")
        );
    }

    #[test]
    fn submission_rejects_negative_age_and_unknown_income() {
        let mut input = submission();
        input.age = Some(-3);
        assert!(matches!(
            input.into_survey(),
            Err(ValidationError::OutOfRange { field: "age", .. })
        ));

        let mut input = submission();
        input.income = Some("GT_1000".to_string());
        assert!(matches!(
            input.into_survey(),
            Err(ValidationError::UnknownTag { field: "income", .. })
        ));
    }
}
