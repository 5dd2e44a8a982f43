//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define per-entity data access contracts (create, read, update, delete,
//!   list).
//! - Isolate SQLite query details from callers.
//!
//! # Invariants
//! - Write paths call `validate()` before any SQL mutation.
//! - Read paths reject invalid persisted state instead of masking it.
//! - Repositories only accept connections at the latest schema version.

use crate::db::migrations::{current_version, latest_version};
use crate::db::DbError;
use crate::model::geo::GeoPoint;
use crate::model::place::{PlaceId, PlaceKind};
use crate::model::validation::ValidationError;
use rusqlite::types::Value;
use rusqlite::{Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub mod place_repo;
pub mod review_repo;
pub mod survey_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    /// Record failed field validation; nothing was written.
    Validation(ValidationError),
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// No record with this id exists.
    NotFound(Uuid),
    /// A referenced place does not exist.
    MissingPlace { kind: PlaceKind, id: PlaceId },
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Persisted data cannot be converted to a valid record.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "record not found: {id}"),
            Self::MissingPlace { kind, id } => write!(f, "referenced {kind} does not exist: {id}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "repository requires table `{table}`")
            }
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_)
            | Self::MissingPlace { .. }
            | Self::UninitializedConnection { .. }
            | Self::MissingRequiredTable(_)
            | Self::InvalidData(_) => None,
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Checks that `conn` is migrated and carries the given tables.
pub(crate) fn ensure_connection_ready(
    conn: &Connection,
    tables: &[&'static str],
) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for &table in tables {
        let exists: i64 = conn.query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table],
            |row| row.get(0),
        )?;
        if exists == 0 {
            return Err(RepoError::MissingRequiredTable(table));
        }
    }

    Ok(())
}

pub(crate) fn read_uuid(row: &Row<'_>, table: &str) -> RepoResult<Uuid> {
    let text: String = row.get("uuid")?;
    Uuid::parse_str(&text)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{text}` in {table}.uuid")))
}

pub(crate) fn read_small_int(row: &Row<'_>, table: &str, column: &str) -> RepoResult<u16> {
    let value: i64 = row.get(column)?;
    u16::try_from(value).map_err(|_| {
        RepoError::InvalidData(format!("invalid value `{value}` in {table}.{column}"))
    })
}

pub(crate) fn read_optional_small_int(
    row: &Row<'_>,
    table: &str,
    column: &str,
) -> RepoResult<Option<u16>> {
    match row.get::<_, Option<i64>>(column)? {
        Some(value) => u16::try_from(value).map(Some).map_err(|_| {
            RepoError::InvalidData(format!("invalid value `{value}` in {table}.{column}"))
        }),
        None => Ok(None),
    }
}

pub(crate) fn read_int(row: &Row<'_>, table: &str, column: &str) -> RepoResult<u32> {
    let value: i64 = row.get(column)?;
    u32::try_from(value).map_err(|_| {
        RepoError::InvalidData(format!("invalid value `{value}` in {table}.{column}"))
    })
}

/// Reads the `location_lat`/`location_lon` column pair.
pub(crate) fn read_location(row: &Row<'_>, table: &str) -> RepoResult<Option<GeoPoint>> {
    let latitude: Option<f64> = row.get("location_lat")?;
    let longitude: Option<f64> = row.get("location_lon")?;
    match (latitude, longitude) {
        (Some(latitude), Some(longitude)) => Ok(Some(GeoPoint {
            latitude,
            longitude,
        })),
        (None, None) => Ok(None),
        _ => Err(RepoError::InvalidData(format!(
            "half-set location in {table}.location_lat/location_lon"
        ))),
    }
}

/// Re-validates a decoded record, reporting failures as corrupt data.
pub(crate) fn revalidate(table: &str, result: Result<(), ValidationError>) -> RepoResult<()> {
    result.map_err(|err| RepoError::InvalidData(format!("{err} in {table}")))
}

/// Appends `LIMIT`/`OFFSET` clauses and their bind values.
pub(crate) fn push_pagination(
    sql: &mut String,
    bind_values: &mut Vec<Value>,
    limit: Option<u32>,
    offset: u32,
) {
    if let Some(limit) = limit {
        sql.push_str(" LIMIT ?");
        bind_values.push(Value::Integer(i64::from(limit)));
        if offset > 0 {
            sql.push_str(" OFFSET ?");
            bind_values.push(Value::Integer(i64::from(offset)));
        }
    } else if offset > 0 {
        sql.push_str(" LIMIT -1 OFFSET ?");
        bind_values.push(Value::Integer(i64::from(offset)));
    }
}
