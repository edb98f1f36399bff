#![forbid(unsafe_code)]

use std::str::FromStr;

use log::{error, info};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{migrate::MigrateDatabase, Pool, Sqlite};

use crate::utils::archive_utils::get_absolute_path;
use crate::utils::config::{ArchiveDirs, Config};
use crate::utils::errors::Errors;

// Database constants.
const SQLITE_PROTOCOL: &str = "sqlite://";
const DATABASE_FILE: &str = "/books.db";
const POOL_MIN_CONNECTIONS: u32 = 2;
const POOL_MAX_CONNECTIONS: u32 = 8;

// ---------------------------------------------------------------------------
// db_url:
// ---------------------------------------------------------------------------
/** Calculate the record store location.  A configured path wins when present,
 * otherwise the database lives in the data directory tree. */
pub fn db_url(dirs: &ArchiveDirs, config: &Config) -> String {
    let path = match &config.db_path {
        Some(p) => get_absolute_path(p),
        None => dirs.database_dir.clone() + DATABASE_FILE,
    };
    SQLITE_PROTOCOL.to_string() + &path
}

// ---------------------------------------------------------------------------
// init_db:
// ---------------------------------------------------------------------------
// See the migrations directory for the books table definition.
pub async fn init_db(url: &str) -> Pool<Sqlite> {
    // Should look like this: "sqlite:///home/somebody/.archive/database/books.db"
    if !Sqlite::database_exists(url).await.unwrap_or(false) {
        info!("Creating database {}", url);
        match Sqlite::create_database(url).await {
            Ok(_) => info!("Create db success"),
            Err(e) => {
                let msg = Errors::StoreUnavailable(format!("database {} create error: {}", url, e));
                error!("{}", msg);
                panic!("{}", msg);
            }
        }
    } else {
        info!("Database already exists");
    }

    let options = SqliteConnectOptions::from_str(url)
        .expect("Unable to create connection db options")
        .journal_mode(SqliteJournalMode::Wal)
        .foreign_keys(true);

    // Create the database connection pool.
    let db = SqlitePoolOptions::new()
        .min_connections(POOL_MIN_CONNECTIONS)
        .max_connections(POOL_MAX_CONNECTIONS)
        .connect_with(options).await
        .expect("Unable to create connection db");

    run_migrations(&db).await;
    db
}

// ---------------------------------------------------------------------------
// run_migrations:
// ---------------------------------------------------------------------------
/** The migrations are embedded at compile time so the same schema is
 * available to test databases. */
pub async fn run_migrations(db: &Pool<Sqlite>) {
    match sqlx::migrate!().run(db).await {
        Ok(_) => info!("Migration success"),
        Err(e) => panic!("Migration run error: {}", e),
    }
}

// ***************************************************************************
//                              Test Support
// ***************************************************************************
// ---------------------------------------------------------------------------
// fixture_books:
// ---------------------------------------------------------------------------
/** The fixture store used across the catalog tests: overlapping authors and
 * publication years so conjunctive filters can discriminate. */
#[cfg(test)]
pub fn fixture_books() -> Vec<crate::utils::db_types::Book> {
    use crate::utils::db_types::Book;
    vec![
        Book::new(1, 1999, "Connie Willis".to_string(),
                  "To Say Nothing of the Dog".to_string(),
                  "When I first caught sight of the bishop's bird stump, I was underwater.".to_string()),
        Book::new(2, 2010, "Connie Willis".to_string(),
                  "Blackout/All Clear".to_string(),
                  "Colin tried the door, but it was locked.".to_string()),
        Book::new(3, 1986, "Orson Scott Card".to_string(),
                  "Speaker for the Dead".to_string(),
                  "In the year 1830, after the formation of Starways Congress, a robot scout ship sent a report by ansible.".to_string()),
        Book::new(4, 2010, "Paolo Bacigalupi".to_string(),
                  "The Windup Girl".to_string(),
                  "No! I don't want the mangosteen.".to_string()),
    ]
}

// ---------------------------------------------------------------------------
// init_fixture_db:
// ---------------------------------------------------------------------------
/** Build an in-memory store seeded with the fixture rows.  A single
 * connection keeps every query on the same in-memory database. */
#[cfg(test)]
pub async fn init_fixture_db() -> Pool<Sqlite> {
    let db = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Unable to create in-memory database");
    run_migrations(&db).await;

    for book in fixture_books() {
        sqlx::query("INSERT INTO books (id, published, author, title, first_sentence) VALUES (?, ?, ?, ?, ?)")
            .bind(book.id)
            .bind(book.published)
            .bind(book.author)
            .bind(book.title)
            .bind(book.first_sentence)
            .execute(&db)
            .await
            .expect("Unable to insert fixture book");
    }
    db
}
