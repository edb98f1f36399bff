#![forbid(unsafe_code)]

use std::sync::Arc;

use anyhow::Result;
use log::error;
use poem_openapi::{payload::Json, ApiResponse, OpenApi};
use sqlx::{Pool, Row, Sqlite};

use crate::utils::config::RuntimeCtx;
use crate::utils::db_statements::LIST_ALL_BOOKS;
use crate::utils::db_types::Book;
use crate::utils::errors::{store_unavailable, HttpResult};

// ***************************************************************************
//                          Request/Response Definitions
// ***************************************************************************
pub struct ListBooksApi {
    ctx: Arc<RuntimeCtx>,
}

impl ListBooksApi {
    pub fn new(ctx: Arc<RuntimeCtx>) -> Self {
        Self { ctx }
    }
}

// ------------------- HTTP Status Codes -------------------
#[derive(Debug, ApiResponse)]
enum CatalogResponse {
    #[oai(status = 200)]
    Http200(Json<Vec<Book>>),
    #[oai(status = 500)]
    Http500(Json<HttpResult>),
}

fn make_http_200(books: Vec<Book>) -> CatalogResponse {
    CatalogResponse::Http200(Json(books))
}
fn make_http_500(msg: String) -> CatalogResponse {
    CatalogResponse::Http500(Json(HttpResult::new(500.to_string(), msg)))
}

// ***************************************************************************
//                             OpenAPI Endpoint
// ***************************************************************************
#[OpenApi]
impl ListBooksApi {
    /** Return every record in the catalog, in id order.  No filtering takes
     * place and an empty store yields an empty array. */
    #[oai(path = "/resources/books/all", method = "get")]
    async fn get_all_books(&self) -> CatalogResponse {
        match list_all_books(&self.ctx.db).await {
            Ok(books) => make_http_200(books),
            Err(e) => {
                let msg = "ERROR: ".to_owned() + e.to_string().as_str();
                error!("{}", msg);
                make_http_500(msg)
            }
        }
    }
}

// ***************************************************************************
//                             Private Functions
// ***************************************************************************
// ---------------------------------------------------------------------------
// list_all_books:
// ---------------------------------------------------------------------------
pub(crate) async fn list_all_books(db: &Pool<Sqlite>) -> Result<Vec<Book>> {
    // Get a connection to the db and start a transaction.  Uncommitted
    // transactions are automatically rolled back when they go out of scope.
    let mut tx = db.begin().await.map_err(store_unavailable)?;

    let rows = sqlx::query(LIST_ALL_BOOKS)
        .fetch_all(&mut *tx)
        .await
        .map_err(store_unavailable)?;

    // Commit the transaction.
    tx.commit().await.map_err(store_unavailable)?;

    // Collect the row data into book records.
    let mut books: Vec<Book> = vec![];
    for row in rows {
        books.push(Book::new(row.get(0), row.get(1), row.get(2), row.get(3), row.get(4)));
    }
    Ok(books)
}

// ***************************************************************************
//                                  Tests
// ***************************************************************************
#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::db_init::{fixture_books, init_fixture_db};

    #[tokio::test]
    async fn list_all_returns_full_store() {
        let db = init_fixture_db().await;
        let books = list_all_books(&db).await.unwrap();
        // Member-for-member identity with the source store, all five fields.
        assert_eq!(books, fixture_books());
    }

    #[tokio::test]
    async fn list_all_on_empty_store_is_empty() {
        let db = sqlx::sqlite::SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        crate::utils::db_init::run_migrations(&db).await;
        let books = list_all_books(&db).await.unwrap();
        assert!(books.is_empty());
    }
}
