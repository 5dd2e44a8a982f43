use civic_review_core::db::open_db_in_memory;
use civic_review_core::{
    City, Country, PlaceKind, PlaceRepository, Region, RepoError, SqlitePlaceRepository,
};

fn canada() -> Country {
    Country {
        id: 1,
        name: "Canada".to_string(),
        code: "CA".to_string(),
    }
}

#[test]
fn create_and_get_place_hierarchy() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePlaceRepository::try_new(&conn).unwrap();

    let region = Region {
        id: 10,
        country_id: 1,
        name: "Ontario".to_string(),
    };
    let city = City {
        id: 100,
        region_id: 10,
        country_id: 1,
        name: "Toronto".to_string(),
    };
    repo.create_country(&canada()).unwrap();
    repo.create_region(&region).unwrap();
    repo.create_city(&city).unwrap();

    assert_eq!(repo.get_country(1).unwrap(), Some(canada()));
    assert_eq!(repo.get_region(10).unwrap(), Some(region));
    assert_eq!(repo.get_city(100).unwrap(), Some(city));
    assert_eq!(repo.get_city(101).unwrap(), None);
}

#[test]
fn child_place_requires_existing_parent() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePlaceRepository::try_new(&conn).unwrap();

    let err = repo
        .create_region(&Region {
            id: 10,
            country_id: 7,
            name: "Nowhere".to_string(),
        })
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::MissingPlace {
            kind: PlaceKind::Country,
            id: 7
        }
    ));

    repo.create_country(&canada()).unwrap();
    let err = repo
        .create_city(&City {
            id: 100,
            region_id: 10,
            country_id: 1,
            name: "Orphan".to_string(),
        })
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::MissingPlace {
            kind: PlaceKind::Region,
            id: 10
        }
    ));
}

#[test]
fn deleting_region_removes_its_cities() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePlaceRepository::try_new(&conn).unwrap();

    repo.create_country(&canada()).unwrap();
    repo.create_region(&Region {
        id: 10,
        country_id: 1,
        name: "Quebec".to_string(),
    })
    .unwrap();
    repo.create_city(&City {
        id: 100,
        region_id: 10,
        country_id: 1,
        name: "Montreal".to_string(),
    })
    .unwrap();

    repo.delete_place(PlaceKind::Region, 10).unwrap();

    assert!(repo.get_city(100).unwrap().is_none());
    assert!(repo.get_country(1).unwrap().is_some());
}

#[test]
fn deleting_unknown_place_reports_missing_place() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePlaceRepository::try_new(&conn).unwrap();

    assert!(matches!(
        repo.delete_place(PlaceKind::City, 404),
        Err(RepoError::MissingPlace {
            kind: PlaceKind::City,
            id: 404
        })
    ));
}
