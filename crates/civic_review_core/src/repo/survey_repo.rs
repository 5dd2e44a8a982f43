//! Demographic survey repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD APIs over `demographic_surveys` storage.
//! - Check place references before writing so a dangling reference surfaces
//!   as `RepoError::MissingPlace`.
//!
//! # Invariants
//! - Write paths call `DemographicSurvey::validate()` before SQL mutations.
//! - Validation, reference checks and the write share one transaction.
//! - Multi-select columns hold comma-delimited codes; NULL means absent.

use super::place_repo::ensure_place_exists;
use super::{
    ensure_connection_ready, push_pagination, read_location, read_optional_small_int,
    read_small_int, read_uuid, revalidate, RepoError, RepoResult,
};
use crate::model::place::{PlaceId, PlaceKind};
use crate::model::survey::{DemographicSurvey, SurveyId, SurveyPlaces};
use crate::model::vocab::{IncomeBracket, TagSet, Vocabulary};
use log::info;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, Row};

const TABLE: &str = "demographic_surveys";
const REQUIRED_TABLES: &[&str] = &["countries", "regions", "cities", TABLE];

const SURVEY_SELECT_SQL: &str = "SELECT
    uuid,
    country_id,
    state_id,
    city_id,
    location_lat,
    location_lon,
    age,
    gender,
    income,
    ethnicity,
    disability,
    minutes_per_day_outside,
    safe_rating,
    comment_experience
FROM demographic_surveys";

/// Query options for listing surveys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SurveyListQuery {
    pub city_id: Option<PlaceId>,
    pub limit: Option<u32>,
    pub offset: u32,
}

/// Repository interface for survey CRUD operations.
pub trait SurveyRepository {
    fn create_survey(&self, survey: &DemographicSurvey) -> RepoResult<SurveyId>;
    fn update_survey(&self, survey: &DemographicSurvey) -> RepoResult<()>;
    fn get_survey(&self, id: SurveyId) -> RepoResult<Option<DemographicSurvey>>;
    fn list_surveys(&self, query: &SurveyListQuery) -> RepoResult<Vec<DemographicSurvey>>;
    fn delete_survey(&self, id: SurveyId) -> RepoResult<()>;
    fn count_surveys(&self) -> RepoResult<u64>;
}

/// SQLite-backed survey repository.
pub struct SqliteSurveyRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSurveyRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, REQUIRED_TABLES)?;
        Ok(Self { conn })
    }
}

impl SurveyRepository for SqliteSurveyRepository<'_> {
    fn create_survey(&self, survey: &DemographicSurvey) -> RepoResult<SurveyId> {
        survey.validate()?;

        let tx = self.conn.unchecked_transaction()?;
        ensure_places_exist(&tx, &survey.places)?;
        tx.execute(
            "INSERT INTO demographic_surveys (
                uuid,
                country_id,
                state_id,
                city_id,
                location_lat,
                location_lon,
                age,
                gender,
                income,
                ethnicity,
                disability,
                minutes_per_day_outside,
                safe_rating,
                comment_experience
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14);",
            params_from_iter(survey_values(survey)),
        )?;
        tx.commit()?;

        info!(
            "event=survey_create module=repo status=ok id={} city_id={}",
            survey.id, survey.places.city_id
        );
        Ok(survey.id)
    }

    fn update_survey(&self, survey: &DemographicSurvey) -> RepoResult<()> {
        survey.validate()?;

        let tx = self.conn.unchecked_transaction()?;
        ensure_places_exist(&tx, &survey.places)?;
        let changed = tx.execute(
            "UPDATE demographic_surveys
             SET
                country_id = ?2,
                state_id = ?3,
                city_id = ?4,
                location_lat = ?5,
                location_lon = ?6,
                age = ?7,
                gender = ?8,
                income = ?9,
                ethnicity = ?10,
                disability = ?11,
                minutes_per_day_outside = ?12,
                safe_rating = ?13,
                comment_experience = ?14,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1;",
            params_from_iter(survey_values(survey)),
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(survey.id));
        }
        tx.commit()?;

        info!(
            "event=survey_update module=repo status=ok id={} city_id={}",
            survey.id, survey.places.city_id
        );
        Ok(())
    }

    fn get_survey(&self, id: SurveyId) -> RepoResult<Option<DemographicSurvey>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{SURVEY_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_survey_row(row)?));
        }

        Ok(None)
    }

    fn list_surveys(&self, query: &SurveyListQuery) -> RepoResult<Vec<DemographicSurvey>> {
        let mut sql = format!("{SURVEY_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(city_id) = query.city_id {
            sql.push_str(" AND city_id = ?");
            bind_values.push(Value::Integer(city_id));
        }

        sql.push_str(" ORDER BY created_at DESC, uuid ASC");
        push_pagination(&mut sql, &mut bind_values, query.limit, query.offset);

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut surveys = Vec::new();
        while let Some(row) = rows.next()? {
            surveys.push(parse_survey_row(row)?);
        }

        Ok(surveys)
    }

    fn delete_survey(&self, id: SurveyId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM demographic_surveys WHERE uuid = ?1;",
            [id.to_string()],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        info!("event=survey_delete module=repo status=ok id={id}");
        Ok(())
    }

    fn count_surveys(&self) -> RepoResult<u64> {
        let count: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM demographic_surveys;", [], |row| {
                    row.get(0)
                })?;
        Ok(count.unsigned_abs())
    }
}

fn ensure_places_exist(conn: &Connection, places: &SurveyPlaces) -> RepoResult<()> {
    ensure_place_exists(conn, PlaceKind::Country, places.country_id)?;
    ensure_place_exists(conn, PlaceKind::Region, places.state_id)?;
    ensure_place_exists(conn, PlaceKind::City, places.city_id)
}

/// Bind values in `uuid, country_id, ..., comment_experience` column order.
fn survey_values(survey: &DemographicSurvey) -> Vec<Value> {
    let location = survey.location;
    vec![
        Value::Text(survey.id.to_string()),
        Value::Integer(survey.places.country_id),
        Value::Integer(survey.places.state_id),
        Value::Integer(survey.places.city_id),
        location.map_or(Value::Null, |point| Value::Real(point.latitude)),
        location.map_or(Value::Null, |point| Value::Real(point.longitude)),
        survey
            .age
            .map_or(Value::Null, |age| Value::Integer(i64::from(age))),
        tags_value(survey.gender.as_ref()),
        survey
            .income
            .map_or(Value::Null, |income| Value::Text(income.code().to_string())),
        tags_value(survey.ethnicity.as_ref()),
        tags_value(survey.disability.as_ref()),
        Value::Integer(i64::from(survey.minutes_per_day_outside)),
        Value::Integer(i64::from(survey.safe_rating)),
        Value::Text(survey.comment_experience.clone()),
    ]
}

fn tags_value<T: Vocabulary>(tags: Option<&TagSet<T>>) -> Value {
    tags.map_or(Value::Null, |tags| Value::Text(tags.to_delimited()))
}

fn read_tags<T: Vocabulary>(row: &Row<'_>, column: &'static str) -> RepoResult<Option<TagSet<T>>> {
    match row.get::<_, Option<String>>(column)? {
        Some(text) => TagSet::parse_delimited(column, &text)
            .map(Some)
            .map_err(|err| RepoError::InvalidData(format!("{err} in {TABLE}.{column}"))),
        None => Ok(None),
    }
}

fn parse_survey_row(row: &Row<'_>) -> RepoResult<DemographicSurvey> {
    let income = match row.get::<_, Option<String>>("income")? {
        Some(code) => Some(IncomeBracket::from_code(&code).ok_or_else(|| {
            RepoError::InvalidData(format!("invalid income `{code}` in {TABLE}.income"))
        })?),
        None => None,
    };

    let survey = DemographicSurvey {
        id: read_uuid(row, TABLE)?,
        places: SurveyPlaces {
            country_id: row.get("country_id")?,
            state_id: row.get("state_id")?,
            city_id: row.get("city_id")?,
        },
        location: read_location(row, TABLE)?,
        age: read_optional_small_int(row, TABLE, "age")?,
        gender: read_tags(row, "gender")?,
        income,
        ethnicity: read_tags(row, "ethnicity")?,
        disability: read_tags(row, "disability")?,
        minutes_per_day_outside: read_small_int(row, TABLE, "minutes_per_day_outside")?,
        safe_rating: read_small_int(row, TABLE, "safe_rating")?,
        comment_experience: row.get("comment_experience")?,
    };
    revalidate(TABLE, survey.validate())?;
    Ok(survey)
}
