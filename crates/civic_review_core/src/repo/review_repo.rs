//! Review repository contracts and one generic SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD and bounding-box listing for every review kind.
//! - Map the shared review columns once; each kind only describes its own
//!   extra columns through `ReviewRow`.
//!
//! # Invariants
//! - Each review kind lives in its own table; there is no shared table.
//! - Write paths call `Review::validate()` before SQL mutations.
//! - Shared columns come first, in `BASE_COLUMNS` order, then the kind's
//!   `EXTRA_COLUMNS`.

use super::{
    ensure_connection_ready, push_pagination, read_int, read_location, read_small_int,
    read_uuid, revalidate, RepoError, RepoResult,
};
use crate::model::geo::BoundingBox;
use crate::model::review::{
    BikeReview, CarReview, Review, ReviewFields, ReviewId, TransitReview,
};
use log::info;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, Row};
use std::marker::PhantomData;

const BASE_COLUMNS: &[&str] = &[
    "uuid",
    "minutes_per_day",
    "score",
    "location_lat",
    "location_lon",
    "comment",
];

/// Storage mapping for a concrete review kind.
pub trait ReviewRow: Review + Sized {
    const TABLE: &'static str;
    const EXTRA_COLUMNS: &'static [&'static str];

    /// Bind values for `EXTRA_COLUMNS`, in the same order.
    fn extra_values(&self) -> Vec<Value>;

    /// Rebuilds the record from its shared fields plus the kind's columns.
    fn from_row(id: ReviewId, review: ReviewFields, row: &Row<'_>) -> RepoResult<Self>;
}

impl ReviewRow for TransitReview {
    const TABLE: &'static str = "transit_reviews";
    const EXTRA_COLUMNS: &'static [&'static str] = &["station_id"];

    fn extra_values(&self) -> Vec<Value> {
        vec![Value::Integer(i64::from(self.station_id))]
    }

    fn from_row(id: ReviewId, review: ReviewFields, row: &Row<'_>) -> RepoResult<Self> {
        Ok(Self {
            id,
            review,
            station_id: read_int(row, Self::TABLE, "station_id")?,
        })
    }
}

impl ReviewRow for BikeReview {
    const TABLE: &'static str = "bike_reviews";
    const EXTRA_COLUMNS: &'static [&'static str] = &["safety", "noise"];

    fn extra_values(&self) -> Vec<Value> {
        vec![
            Value::Integer(i64::from(self.safety)),
            Value::Integer(i64::from(self.noise)),
        ]
    }

    fn from_row(id: ReviewId, review: ReviewFields, row: &Row<'_>) -> RepoResult<Self> {
        Ok(Self {
            id,
            review,
            safety: read_small_int(row, Self::TABLE, "safety")?,
            noise: read_small_int(row, Self::TABLE, "noise")?,
        })
    }
}

impl ReviewRow for CarReview {
    const TABLE: &'static str = "car_reviews";
    const EXTRA_COLUMNS: &'static [&'static str] = &["traffic", "road_quality"];

    fn extra_values(&self) -> Vec<Value> {
        vec![
            Value::Integer(i64::from(self.traffic)),
            Value::Integer(i64::from(self.road_quality)),
        ]
    }

    fn from_row(id: ReviewId, review: ReviewFields, row: &Row<'_>) -> RepoResult<Self> {
        Ok(Self {
            id,
            review,
            traffic: read_small_int(row, Self::TABLE, "traffic")?,
            road_quality: read_small_int(row, Self::TABLE, "road_quality")?,
        })
    }
}

/// Query options for listing reviews.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReviewListQuery {
    /// Only reviews located inside this box.
    pub within: Option<BoundingBox>,
    pub limit: Option<u32>,
    pub offset: u32,
}

/// Repository interface for review CRUD operations of one kind.
pub trait ReviewRepository<R: Review> {
    fn create_review(&self, review: &R) -> RepoResult<ReviewId>;
    fn update_review(&self, review: &R) -> RepoResult<()>;
    fn get_review(&self, id: ReviewId) -> RepoResult<Option<R>>;
    fn list_reviews(&self, query: &ReviewListQuery) -> RepoResult<Vec<R>>;
    fn delete_review(&self, id: ReviewId) -> RepoResult<()>;
    fn count_reviews(&self) -> RepoResult<u64>;
}

/// SQLite-backed review repository for kind `R`.
pub struct SqliteReviewRepository<'conn, R> {
    conn: &'conn Connection,
    _kind: PhantomData<fn() -> R>,
}

pub type SqliteTransitReviewRepository<'conn> = SqliteReviewRepository<'conn, TransitReview>;
pub type SqliteBikeReviewRepository<'conn> = SqliteReviewRepository<'conn, BikeReview>;
pub type SqliteCarReviewRepository<'conn> = SqliteReviewRepository<'conn, CarReview>;

impl<'conn, R: ReviewRow> SqliteReviewRepository<'conn, R> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &[R::TABLE])?;
        Ok(Self {
            conn,
            _kind: PhantomData,
        })
    }
}

impl<R: ReviewRow> ReviewRepository<R> for SqliteReviewRepository<'_, R> {
    fn create_review(&self, review: &R) -> RepoResult<ReviewId> {
        review.validate()?;

        let columns = columns::<R>();
        let placeholders = (1..=columns.len())
            .map(|index| format!("?{index}"))
            .collect::<Vec<_>>()
            .join(", ");
        self.conn.execute(
            &format!(
                "INSERT INTO {} ({}) VALUES ({placeholders});",
                R::TABLE,
                columns.join(", ")
            ),
            params_from_iter(review_values(review)),
        )?;

        info!(
            "event=review_create module=repo status=ok kind={} id={}",
            R::KIND,
            review.id()
        );
        Ok(review.id())
    }

    fn update_review(&self, review: &R) -> RepoResult<()> {
        review.validate()?;

        let assignments = columns::<R>()
            .iter()
            .enumerate()
            .skip(1)
            .map(|(index, column)| format!("{column} = ?{}", index + 1))
            .collect::<Vec<_>>()
            .join(", ");
        let changed = self.conn.execute(
            &format!(
                "UPDATE {}
                 SET {assignments}, updated_at = (strftime('%s', 'now') * 1000)
                 WHERE uuid = ?1;",
                R::TABLE
            ),
            params_from_iter(review_values(review)),
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(review.id()));
        }

        info!(
            "event=review_update module=repo status=ok kind={} id={}",
            R::KIND,
            review.id()
        );
        Ok(())
    }

    fn get_review(&self, id: ReviewId) -> RepoResult<Option<R>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{} WHERE uuid = ?1;", select_sql::<R>()))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_review_row(row)?));
        }

        Ok(None)
    }

    fn list_reviews(&self, query: &ReviewListQuery) -> RepoResult<Vec<R>> {
        let mut sql = format!("{} WHERE 1 = 1", select_sql::<R>());
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(bbox) = query.within {
            sql.push_str(
                " AND location_lat BETWEEN ? AND ? AND location_lon BETWEEN ? AND ?",
            );
            bind_values.extend([
                Value::Real(bbox.south_west.latitude),
                Value::Real(bbox.north_east.latitude),
                Value::Real(bbox.south_west.longitude),
                Value::Real(bbox.north_east.longitude),
            ]);
        }

        sql.push_str(" ORDER BY created_at DESC, uuid ASC");
        push_pagination(&mut sql, &mut bind_values, query.limit, query.offset);

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut reviews = Vec::new();
        while let Some(row) = rows.next()? {
            reviews.push(parse_review_row(row)?);
        }

        Ok(reviews)
    }

    fn delete_review(&self, id: ReviewId) -> RepoResult<()> {
        let changed = self.conn.execute(
            &format!("DELETE FROM {} WHERE uuid = ?1;", R::TABLE),
            [id.to_string()],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        info!(
            "event=review_delete module=repo status=ok kind={} id={id}",
            R::KIND
        );
        Ok(())
    }

    fn count_reviews(&self) -> RepoResult<u64> {
        let count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM {};", R::TABLE),
            [],
            |row| row.get(0),
        )?;
        Ok(count.unsigned_abs())
    }
}

fn columns<R: ReviewRow>() -> Vec<&'static str> {
    BASE_COLUMNS
        .iter()
        .chain(R::EXTRA_COLUMNS)
        .copied()
        .collect()
}

fn select_sql<R: ReviewRow>() -> String {
    format!("SELECT {} FROM {}", columns::<R>().join(", "), R::TABLE)
}

fn review_values<R: ReviewRow>(review: &R) -> Vec<Value> {
    let fields = review.fields();
    let mut values = vec![
        Value::Text(review.id().to_string()),
        Value::Integer(i64::from(fields.minutes_per_day)),
        Value::Integer(i64::from(fields.score)),
        Value::Real(fields.location.latitude),
        Value::Real(fields.location.longitude),
        Value::Text(fields.comment.clone()),
    ];
    values.extend(review.extra_values());
    values
}

fn parse_review_row<R: ReviewRow>(row: &Row<'_>) -> RepoResult<R> {
    let id = read_uuid(row, R::TABLE)?;
    let location = read_location(row, R::TABLE)?.ok_or_else(|| {
        RepoError::InvalidData(format!("missing location in {}", R::TABLE))
    })?;
    let fields = ReviewFields {
        minutes_per_day: read_small_int(row, R::TABLE, "minutes_per_day")?,
        score: read_small_int(row, R::TABLE, "score")?,
        location,
        comment: row.get("comment")?,
    };

    let review = R::from_row(id, fields, row)?;
    revalidate(R::TABLE, review.validate())?;
    Ok(review)
}
