use civic_review_core::db::open_db_in_memory;
use civic_review_core::{
    flush_logging, init_logging, City, Country, DemographicSurvey, GeoPoint, PlaceRepository,
    Region, ReviewFields, ReviewRepository, SqlitePlaceRepository, SqliteSurveyRepository,
    SqliteTransitReviewRepository, SurveyPlaces, SurveyRepository, TransitReview,
};
use std::path::Path;

const PRIVATE_COMMENT: &str = "private-comment-text";

#[test]
fn writes_emit_metadata_only_events() {
    let log_dir = tempfile::tempdir().unwrap();
    init_logging("info", log_dir.path()).unwrap();

    let conn = open_db_in_memory().unwrap();
    let places = seed_places(&conn);

    let surveys = SqliteSurveyRepository::try_new(&conn).unwrap();
    let mut survey = DemographicSurvey::new(places, 30, 5, PRIVATE_COMMENT);
    surveys.create_survey(&survey).unwrap();
    survey.safe_rating = 6;
    surveys.update_survey(&survey).unwrap();
    surveys.delete_survey(survey.id).unwrap();

    let reviews = SqliteTransitReviewRepository::try_new(&conn).unwrap();
    let mut review = TransitReview::new(
        ReviewFields::new(
            20,
            3,
            GeoPoint::new(49.2827, -123.1207).unwrap(),
            PRIVATE_COMMENT,
        ),
        42,
    );
    reviews.create_review(&review).unwrap();
    review.review.score = 4;
    reviews.update_review(&review).unwrap();
    reviews.delete_review(review.id).unwrap();

    flush_logging();
    let logs = read_logs(log_dir.path());

    assert!(logs.contains(&format!("event=survey_update module=repo status=ok id={}", survey.id)));
    assert!(logs.contains(&format!("event=survey_delete module=repo status=ok id={}", survey.id)));
    assert!(logs.contains(&format!(
        "event=review_update module=repo status=ok kind=transit id={}",
        review.id
    )));
    assert!(logs.contains(&format!(
        "event=review_delete module=repo status=ok kind=transit id={}",
        review.id
    )));
    assert!(!logs.contains(PRIVATE_COMMENT));
}

fn read_logs(dir: &Path) -> String {
    let mut logs = String::new();
    for entry in std::fs::read_dir(dir).unwrap() {
        let path = entry.unwrap().path();
        if path.is_file() {
            logs.push_str(&std::fs::read_to_string(path).unwrap());
        }
    }
    logs
}

fn seed_places(conn: &rusqlite::Connection) -> SurveyPlaces {
    let repo = SqlitePlaceRepository::try_new(conn).unwrap();
    repo.create_country(&Country {
        id: 1,
        name: "Canada".to_string(),
        code: "CA".to_string(),
    })
    .unwrap();
    repo.create_region(&Region {
        id: 10,
        country_id: 1,
        name: "British Columbia".to_string(),
    })
    .unwrap();
    repo.create_city(&City {
        id: 100,
        region_id: 10,
        country_id: 1,
        name: "Vancouver".to_string(),
    })
    .unwrap();

    SurveyPlaces {
        country_id: 1,
        state_id: 10,
        city_id: 100,
    }
}
