#![forbid(unsafe_code)]

use poem_openapi::Object;
use thiserror::Error;

/// The exact body returned for unknown routes and for filter requests that
/// name none of the recognized keys.
pub const NOT_FOUND_BODY: &str = "<h1>404</h1><p>The resource could not be found.</p>";

/// Error enumerates the errors returned by this application.
#[derive(Error, Debug)]
pub enum Errors {
    /// Input parameter logging.
    #[error("archive_server input parameters:\n{}", .0)]
    InputParms(String),

    /// Represents all other cases of `std::io::Error`.
    #[error(transparent)]
    IOError(#[from] std::io::Error),

    /// Inaccessible logger configuration file.
    #[error("Unable to access the Log4rs configuration file: {}", .0)]
    Log4rsInitialization(String),

    #[error("Reading application configuration file: {}", .0)]
    ReadingConfigFile(String),

    #[error("Unable to parse TOML file: {}", .0)]
    TOMLParseError(String),

    /// The filter endpoint was called without any recognized filter key.
    #[error("No recognized filter parameter specified: expected at least one of id, published, author")]
    NoFilterSpecified,

    /// The record store could not be reached or a query against it failed.
    #[error("Record store unavailable: {}", .0)]
    StoreUnavailable(String),
}

// ---------------------------------------------------------------------------
// store_unavailable:
// ---------------------------------------------------------------------------
/** Wrap a database failure in the store taxonomy before it surfaces as a
 * server error. */
pub fn store_unavailable(e: sqlx::Error) -> anyhow::Error {
    Errors::StoreUnavailable(e.to_string()).into()
}

// ---------------------------------------------------------------------------
// HttpResult:
// ---------------------------------------------------------------------------
/** Generic JSON payload for non-200 responses. */
#[derive(Object, Debug)]
pub struct HttpResult {
    pub result_code: String,
    pub result_msg: String,
}

impl HttpResult {
    pub fn new(result_code: String, result_msg: String) -> Self {
        Self { result_code, result_msg }
    }
}
