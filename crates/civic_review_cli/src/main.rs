//! CLI smoke entry point.
//!
//! Opens (and migrates) the configured database and prints schema version
//! and per-table record counts.

use civic_review_core::db::migrations::current_version;
use civic_review_core::db::open_db;
use civic_review_core::{
    core_version, flush_logging, init_logging_from_config, CoreConfig, ReviewRepository,
    SqliteBikeReviewRepository, SqliteCarReviewRepository, SqliteSurveyRepository,
    SqliteTransitReviewRepository, SurveyRepository,
};
use clap::Parser;
use log::info;
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "civic-review", version, about = "Civic survey/review storage probe")]
struct Args {
    /// TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Database file; overrides `database_path` from the config.
    #[arg(long)]
    db: Option<PathBuf>,
}

fn main() -> ExitCode {
    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let mut config = match &args.config {
        Some(path) => CoreConfig::from_file(path)?,
        None => CoreConfig::default(),
    };
    if let Some(db) = args.db {
        config.database_path = db;
    }
    init_logging_from_config(&config.logging)?;

    let conn = open_db(&config.database_path)?;
    info!(
        "event=cli_status module=cli status=start db={}",
        config.database_path.display()
    );

    println!("civic_review_core version={}", core_version());
    println!("database={}", config.database_path.display());
    println!("schema_version={}", current_version(&conn)?);
    println!(
        "demographic_surveys={}",
        SqliteSurveyRepository::try_new(&conn)?.count_surveys()?
    );
    println!(
        "transit_reviews={}",
        SqliteTransitReviewRepository::try_new(&conn)?.count_reviews()?
    );
    println!(
        "bike_reviews={}",
        SqliteBikeReviewRepository::try_new(&conn)?.count_reviews()?
    );
    println!(
        "car_reviews={}",
        SqliteCarReviewRepository::try_new(&conn)?.count_reviews()?
    );

    flush_logging();
    Ok(())
}
