#![forbid(unsafe_code)]

use std::sync::Arc;

use poem::error::NotFoundError;
use poem::http::StatusCode;
use poem::web::Html;
use poem::{get, handler, Endpoint, EndpointExt, Response, Route};
use poem_openapi::OpenApiService;

use crate::pages::routes::{about, home};
use crate::utils::config::RuntimeCtx;
use crate::utils::errors::NOT_FOUND_BODY;
use crate::v1::books::books_all::ListBooksApi;
use crate::v1::books::books_filter::FilterBooksApi;
use crate::v1::books::version::VersionApi;

// Static banner served at the catalog root.
const BANNER_BODY: &str = concat!(
    "<h1>Distant Reading Archive</h1>\n",
    "<p>A prototype API for distant reading of science fiction novels.</p>",
);

// ***************************************************************************
//                          Route Table Construction
// ***************************************************************************
// ---------------------------------------------------------------------------
// build_catalog_app:
// ---------------------------------------------------------------------------
/** Assemble the catalog route table once at startup.  The runtime context is
 * handed to each endpoint at construction rather than read from process-wide
 * state. */
pub fn build_catalog_app(ctx: Arc<RuntimeCtx>) -> impl Endpoint {
    // Assign base URL.
    let api_url = format!("http://{}:{}{}",
        ctx.parms.config.http_addr,
        ctx.parms.config.http_port,
        "/api/v1");

    let endpoints = (ListBooksApi::new(ctx.clone()), FilterBooksApi::new(ctx.clone()), VersionApi);
    let api_service =
        OpenApiService::new(endpoints, ctx.parms.config.title.clone(), env!("CARGO_PKG_VERSION"))
            .server(api_url);

    // Allow the generated openapi spec to be retrieved from the server.
    let spec = api_service.spec_endpoint();
    let ui = api_service.swagger_ui();

    Route::new()
        .nest("/api/v1", api_service)
        .nest("/docs", ui)
        .at("/spec", spec)
        .at("/", get(banner))
        .catch_error(resource_not_found)
}

// ---------------------------------------------------------------------------
// build_pages_app:
// ---------------------------------------------------------------------------
/** Assemble the page-renderer route table.  Both the root path and /home map
 * to the home view. */
pub fn build_pages_app() -> impl Endpoint {
    Route::new()
        .at("/", get(home))
        .at("/home", get(home))
        .at("/about", get(about))
        .catch_error(resource_not_found)
}

// ***************************************************************************
//                             Private Functions
// ***************************************************************************
// ---------------------------------------------------------------------------
// banner:
// ---------------------------------------------------------------------------
#[handler]
fn banner() -> Html<&'static str> {
    Html(BANNER_BODY)
}

// ---------------------------------------------------------------------------
// resource_not_found:
// ---------------------------------------------------------------------------
/** Shared 404 handler.  Routing misses and the zero-filter case surface the
 * same HTML body. */
async fn resource_not_found(_: NotFoundError) -> Response {
    Response::builder()
        .status(StatusCode::NOT_FOUND)
        .content_type("text/html; charset=utf-8")
        .body(NOT_FOUND_BODY)
}

// ***************************************************************************
//                                  Tests
// ***************************************************************************
#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::config::{Config, Parms};
    use crate::utils::db_init::{fixture_books, init_fixture_db};
    use crate::utils::db_types::Book;
    use poem::http::{Method, Uri};
    use poem::Request;

    async fn test_catalog_app() -> impl Endpoint {
        let db = init_fixture_db().await;
        let parms = Parms { config_file: Default::default(), config: Config::new() };
        build_catalog_app(Arc::new(RuntimeCtx { parms, db }))
    }

    fn get_request(uri: &str) -> Request {
        Request::builder()
            .method(Method::GET)
            .uri(uri.parse::<Uri>().unwrap())
            .finish()
    }

    async fn body_string(resp: Response) -> String {
        resp.into_body().into_string().await.unwrap()
    }

    #[tokio::test]
    async fn banner_served_at_catalog_root() {
        let app = test_catalog_app().await;
        let resp = app.get_response(get_request("/")).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_string(resp).await, BANNER_BODY);
    }

    #[tokio::test]
    async fn all_endpoint_returns_full_catalog() {
        let app = test_catalog_app().await;
        let resp = app.get_response(get_request("/api/v1/resources/books/all")).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let books: Vec<Book> = serde_json::from_str(&body_string(resp).await).unwrap();
        assert_eq!(books, fixture_books());
    }

    #[tokio::test]
    async fn filter_endpoint_conjoins_present_parameters() {
        let app = test_catalog_app().await;
        let resp = app
            .get_response(get_request("/api/v1/resources/books?author=Connie%20Willis&published=1999"))
            .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let books: Vec<Book> = serde_json::from_str(&body_string(resp).await).unwrap();
        assert_eq!(books, vec![fixture_books()[0].clone()]);
    }

    #[tokio::test]
    async fn filter_endpoint_without_parameters_is_404() {
        let app = test_catalog_app().await;
        let resp = app.get_response(get_request("/api/v1/resources/books")).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_string(resp).await, NOT_FOUND_BODY);
    }

    #[tokio::test]
    async fn filter_endpoint_with_empty_author_value_is_404() {
        // An empty-valued recognized key is the zero-filter case, not a
        // match against the empty string.
        let app = test_catalog_app().await;
        let resp = app.get_response(get_request("/api/v1/resources/books?author=")).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_string(resp).await, NOT_FOUND_BODY);
    }

    #[tokio::test]
    async fn non_numeric_id_is_rejected() {
        let app = test_catalog_app().await;
        let resp = app.get_response(get_request("/api/v1/resources/books?id=abc")).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn store_failure_returns_500_http_result() {
        let db = init_fixture_db().await;
        db.close().await;
        let parms = Parms { config_file: Default::default(), config: Config::new() };
        let app = build_catalog_app(Arc::new(RuntimeCtx { parms, db }));

        let resp = app
            .get_response(get_request("/api/v1/resources/books?author=Connie%20Willis"))
            .await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let payload: serde_json::Value = serde_json::from_str(&body_string(resp).await).unwrap();
        assert_eq!(payload["result_code"], "500");
        assert!(payload["result_msg"].as_str().unwrap().contains("Record store unavailable"));
    }

    #[tokio::test]
    async fn unrecognized_parameters_do_not_count_as_filters() {
        let app = test_catalog_app().await;
        let resp = app
            .get_response(get_request("/api/v1/resources/books?genre=scifi&award=hugo"))
            .await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_string(resp).await, NOT_FOUND_BODY);
    }

    #[tokio::test]
    async fn unknown_catalog_route_is_404() {
        let app = test_catalog_app().await;
        let resp = app.get_response(get_request("/api/v1/resources/movies")).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_string(resp).await, NOT_FOUND_BODY);
    }

    #[tokio::test]
    async fn pages_home_served_at_both_paths() {
        let app = build_pages_app();
        for path in ["/", "/home"] {
            let resp = app.get_response(get_request(path)).await;
            assert_eq!(resp.status(), StatusCode::OK);
            let body = body_string(resp).await;
            assert!(body.contains("Blog Post 1"));
            assert!(body.contains("Blog Post 2"));
        }
    }

    #[tokio::test]
    async fn pages_about_served() {
        let app = build_pages_app();
        let resp = app.get_response(get_request("/about")).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(body_string(resp).await.contains("<h1>About</h1>"));
    }

    #[tokio::test]
    async fn unknown_page_route_is_404() {
        let app = build_pages_app();
        let resp = app.get_response(get_request("/contact")).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_string(resp).await, NOT_FOUND_BODY);
    }
}
