//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `graphicone_models` linkage.
//! - Optionally open (and migrate) a database file and report its schema.
//! - Optionally write the open/migration log events to a log directory.
//! - Keep output deterministic for quick local sanity checks.

use graphicone_models::db::migrations::current_user_version;
use graphicone_models::schema::catalog::ALL_TABLES;
use graphicone_models::SqliteRecordStore;
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("graphicone_models ping={}", graphicone_models::ping());
    println!(
        "graphicone_models version={}",
        graphicone_models::models_version()
    );

    let mut args = std::env::args().skip(1);
    let Some(db_path) = args.next() else {
        return ExitCode::SUCCESS;
    };

    if let Some(log_dir) = args.next() {
        if let Err(err) = graphicone_models::init_logging(
            graphicone_models::default_log_level(),
            &log_dir,
        ) {
            eprintln!("graphicone_models error={err}");
            return ExitCode::FAILURE;
        }
        println!("log_dir={log_dir}");
    }

    let code = match inspect_db(&db_path) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("graphicone_models error={err}");
            ExitCode::FAILURE
        }
    };
    graphicone_models::flush_logging();
    code
}

fn inspect_db(db_path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let conn = graphicone_models::open_db(db_path)?;
    SqliteRecordStore::try_new(&conn)?;
    println!("schema_version={}", current_user_version(&conn)?);
    println!("tables={}", ALL_TABLES.len());
    Ok(())
}
