#![forbid(unsafe_code)]

use std::sync::Arc;

use anyhow::Result;
use log::{error, info};
use poem::Request;
use poem_openapi::param::Query;
use poem_openapi::{payload::Html, payload::Json, ApiResponse, OpenApi};
use sqlx::{Pool, Row, Sqlite};

use crate::utils::archive_utils::{debug_request, RequestDebug};
use crate::utils::config::RuntimeCtx;
use crate::utils::db_statements::FILTER_BOOKS_TEMPLATE;
use crate::utils::db_types::Book;
use crate::utils::errors::{store_unavailable, Errors, HttpResult, NOT_FOUND_BODY};
use crate::utils::query_filter::{sql_substitute_where_clause, BookFilter};

// ***************************************************************************
//                          Request/Response Definitions
// ***************************************************************************
pub struct FilterBooksApi {
    ctx: Arc<RuntimeCtx>,
}

impl FilterBooksApi {
    pub fn new(ctx: Arc<RuntimeCtx>) -> Self {
        Self { ctx }
    }
}

#[derive(Debug)]
struct ReqFilterBooks {
    id: Option<i32>,
    published: Option<i32>,
    author: Option<String>,
}

// Implement the debug record trait for logging.
impl RequestDebug for ReqFilterBooks {
    type Req = ReqFilterBooks;
    fn get_request_info(&self) -> String {
        let mut s = String::with_capacity(255);
        s.push_str("  Recognized filter parameters:");
        s.push_str("\n    id: ");
        s.push_str(format!("{:?}", self.id).as_str());
        s.push_str("\n    published: ");
        s.push_str(format!("{:?}", self.published).as_str());
        s.push_str("\n    author: ");
        s.push_str(format!("{:?}", self.author).as_str());
        s
    }
}

// ------------------- HTTP Status Codes -------------------
#[derive(Debug, ApiResponse)]
enum FilterResponse {
    #[oai(status = 200)]
    Http200(Json<Vec<Book>>),
    /// No recognized filter key was supplied.
    #[oai(status = 404)]
    Http404(Html<String>),
    #[oai(status = 500)]
    Http500(Json<HttpResult>),
}

fn make_http_200(books: Vec<Book>) -> FilterResponse {
    FilterResponse::Http200(Json(books))
}
fn make_http_404() -> FilterResponse {
    FilterResponse::Http404(Html(NOT_FOUND_BODY.to_string()))
}
fn make_http_500(msg: String) -> FilterResponse {
    FilterResponse::Http500(Json(HttpResult::new(500.to_string(), msg)))
}

// ***************************************************************************
//                             OpenAPI Endpoint
// ***************************************************************************
#[OpenApi]
impl FilterBooksApi {
    /** Return the records matching every filter parameter present on the
     * request.  At least one of id, published or author must be supplied;
     * anything else on the query string does not participate. */
    #[oai(path = "/resources/books", method = "get")]
    async fn get_books(
        &self,
        http_req: &Request,
        id: Query<Option<i32>>,
        published: Query<Option<i32>>,
        author: Query<Option<String>>,
    ) -> FilterResponse {
        // Package the recognized parameters; unrecognized ones are ignored.
        let req = ReqFilterBooks { id: id.0, published: published.0, author: author.0 };

        // Conditional logging depending on log level.
        debug_request(http_req, &req);

        // Zero recognized parameters is an error, not match-all.  The /all
        // endpoint is the only way to list the whole catalog.
        let filter = BookFilter::new(req.id, req.published, req.author);
        if filter.is_empty() {
            info!("{}", Errors::NoFilterSpecified);
            return make_http_404();
        }

        match filter_books(&self.ctx.db, &filter).await {
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
// filter_books:
// ---------------------------------------------------------------------------
/** Execute the conjunctive filter.  A filter that matches nothing yields an
 * empty list, not an error. */
pub(crate) async fn filter_books(db: &Pool<Sqlite>, filter: &BookFilter) -> Result<Vec<Book>> {
    // Substitute the rendered clause into the statement template.
    let sql_query = sql_substitute_where_clause(FILTER_BOOKS_TEMPLATE, filter);

    // Get a connection to the db and start a transaction.  Uncommitted
    // transactions are automatically rolled back when they go out of scope.
    let mut tx = db.begin().await.map_err(store_unavailable)?;

    let rows = filter
        .bind_values(sqlx::query(&sql_query))
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

    async fn matching_ids(db: &Pool<Sqlite>, filter: &BookFilter) -> Vec<i32> {
        filter_books(db, filter).await.unwrap().iter().map(|b| b.id).collect()
    }

    #[tokio::test]
    async fn author_filter_matches_every_row_for_author() {
        let db = init_fixture_db().await;
        let filter = BookFilter::new(None, None, Some("Connie Willis".to_string()));
        assert_eq!(matching_ids(&db, &filter).await, vec![1, 2]);
    }

    #[tokio::test]
    async fn author_and_published_conjunction_narrows() {
        let db = init_fixture_db().await;
        let filter = BookFilter::new(None, Some(1999), Some("Connie Willis".to_string()));
        assert_eq!(matching_ids(&db, &filter).await, vec![1]);
    }

    #[tokio::test]
    async fn published_filter_matches_every_year_row() {
        let db = init_fixture_db().await;
        let filter = BookFilter::new(None, Some(2010), None);
        assert_eq!(matching_ids(&db, &filter).await, vec![2, 4]);
    }

    #[tokio::test]
    async fn id_filter_round_trips_the_source_record() {
        let db = init_fixture_db().await;
        let filter = BookFilter::new(Some(3), None, None);
        let books = filter_books(&db, &filter).await.unwrap();
        assert_eq!(books, vec![fixture_books()[2].clone()]);
    }

    #[tokio::test]
    async fn all_three_keys_conjoin() {
        let db = init_fixture_db().await;
        let filter = BookFilter::new(Some(2), Some(2010), Some("Connie Willis".to_string()));
        assert_eq!(matching_ids(&db, &filter).await, vec![2]);
    }

    #[tokio::test]
    async fn disjoint_conjunction_yields_empty_list() {
        // Both values exist in the store but never on the same row.
        let db = init_fixture_db().await;
        let filter = BookFilter::new(None, Some(1986), Some("Connie Willis".to_string()));
        let books = filter_books(&db, &filter).await.unwrap();
        assert!(books.is_empty());
    }

    #[tokio::test]
    async fn unknown_value_yields_empty_list_not_error() {
        let db = init_fixture_db().await;
        let filter = BookFilter::new(None, None, Some("Nobody".to_string()));
        let books = filter_books(&db, &filter).await.unwrap();
        assert!(books.is_empty());
    }

    #[tokio::test]
    async fn closed_store_reports_store_unavailable() {
        let db = init_fixture_db().await;
        db.close().await;
        let filter = BookFilter::new(None, None, Some("Connie Willis".to_string()));
        let err = filter_books(&db, &filter).await.unwrap_err();
        assert!(err.to_string().contains("Record store unavailable"));
    }

    #[tokio::test]
    async fn author_match_is_exact_text() {
        let db = init_fixture_db().await;
        // No partial matching and no case folding.
        let partial = BookFilter::new(None, None, Some("Connie".to_string()));
        assert!(filter_books(&db, &partial).await.unwrap().is_empty());
        let folded = BookFilter::new(None, None, Some("connie willis".to_string()));
        assert!(filter_books(&db, &folded).await.unwrap().is_empty());
    }
}
