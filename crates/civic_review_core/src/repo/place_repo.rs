//! Place hierarchy repository.
//!
//! # Responsibility
//! - Load and remove the country/region/city rows surveys point at.
//!
//! # Invariants
//! - Deleting a place cascades to its children and to every survey that
//!   references it (enforced by foreign keys, not by this code).

use super::{ensure_connection_ready, RepoError, RepoResult};
use crate::model::place::{City, Country, PlaceId, PlaceKind, Region};
use log::info;
use rusqlite::{params, Connection, OptionalExtension};

const REQUIRED_TABLES: &[&str] = &["countries", "regions", "cities"];

/// Repository interface for the place hierarchy.
pub trait PlaceRepository {
    fn create_country(&self, country: &Country) -> RepoResult<()>;
    fn create_region(&self, region: &Region) -> RepoResult<()>;
    fn create_city(&self, city: &City) -> RepoResult<()>;
    fn get_country(&self, id: PlaceId) -> RepoResult<Option<Country>>;
    fn get_region(&self, id: PlaceId) -> RepoResult<Option<Region>>;
    fn get_city(&self, id: PlaceId) -> RepoResult<Option<City>>;
    /// Deletes one place and everything that depends on it.
    fn delete_place(&self, kind: PlaceKind, id: PlaceId) -> RepoResult<()>;
}

/// SQLite-backed place repository.
pub struct SqlitePlaceRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePlaceRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, REQUIRED_TABLES)?;
        Ok(Self { conn })
    }
}

impl PlaceRepository for SqlitePlaceRepository<'_> {
    fn create_country(&self, country: &Country) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO countries (id, name, code) VALUES (?1, ?2, ?3);",
            params![country.id, country.name, country.code],
        )?;
        Ok(())
    }

    fn create_region(&self, region: &Region) -> RepoResult<()> {
        ensure_place_exists(self.conn, PlaceKind::Country, region.country_id)?;
        self.conn.execute(
            "INSERT INTO regions (id, country_id, name) VALUES (?1, ?2, ?3);",
            params![region.id, region.country_id, region.name],
        )?;
        Ok(())
    }

    fn create_city(&self, city: &City) -> RepoResult<()> {
        ensure_place_exists(self.conn, PlaceKind::Country, city.country_id)?;
        ensure_place_exists(self.conn, PlaceKind::Region, city.region_id)?;
        self.conn.execute(
            "INSERT INTO cities (id, region_id, country_id, name) VALUES (?1, ?2, ?3, ?4);",
            params![city.id, city.region_id, city.country_id, city.name],
        )?;
        Ok(())
    }

    fn get_country(&self, id: PlaceId) -> RepoResult<Option<Country>> {
        let country = self
            .conn
            .query_row(
                "SELECT id, name, code FROM countries WHERE id = ?1;",
                [id],
                |row| {
                    Ok(Country {
                        id: row.get("id")?,
                        name: row.get("name")?,
                        code: row.get("code")?,
                    })
                },
            )
            .optional()?;
        Ok(country)
    }

    fn get_region(&self, id: PlaceId) -> RepoResult<Option<Region>> {
        let region = self
            .conn
            .query_row(
                "SELECT id, country_id, name FROM regions WHERE id = ?1;",
                [id],
                |row| {
                    Ok(Region {
                        id: row.get("id")?,
                        country_id: row.get("country_id")?,
                        name: row.get("name")?,
                    })
                },
            )
            .optional()?;
        Ok(region)
    }

    fn get_city(&self, id: PlaceId) -> RepoResult<Option<City>> {
        let city = self
            .conn
            .query_row(
                "SELECT id, region_id, country_id, name FROM cities WHERE id = ?1;",
                [id],
                |row| {
                    Ok(City {
                        id: row.get("id")?,
                        region_id: row.get("region_id")?,
                        country_id: row.get("country_id")?,
                        name: row.get("name")?,
                    })
                },
            )
            .optional()?;
        Ok(city)
    }

    fn delete_place(&self, kind: PlaceKind, id: PlaceId) -> RepoResult<()> {
        let changed = self.conn.execute(
            &format!("DELETE FROM {} WHERE id = ?1;", place_table(kind)),
            [id],
        )?;
        if changed == 0 {
            return Err(RepoError::MissingPlace { kind, id });
        }

        info!("event=place_delete module=repo status=ok kind={kind} id={id}");
        Ok(())
    }
}

fn place_table(kind: PlaceKind) -> &'static str {
    match kind {
        PlaceKind::Country => "countries",
        PlaceKind::Region => "regions",
        PlaceKind::City => "cities",
    }
}

/// Fails with `MissingPlace` unless the referenced row exists.
pub(crate) fn ensure_place_exists(
    conn: &Connection,
    kind: PlaceKind,
    id: PlaceId,
) -> RepoResult<()> {
    let exists: i64 = conn.query_row(
        &format!(
            "SELECT EXISTS(SELECT 1 FROM {} WHERE id = ?1);",
            place_table(kind)
        ),
        [id],
        |row| row.get(0),
    )?;
    if exists == 0 {
        return Err(RepoError::MissingPlace { kind, id });
    }
    Ok(())
}
