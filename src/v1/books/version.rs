#![forbid(unsafe_code)]

use poem_openapi::{payload::Json, Object, OpenApi};

// From cargo.toml.
const ARCHIVE_VERSION: Option<&str> = option_env!("CARGO_PKG_VERSION");

// ***************************************************************************
//                          Request/Response Definitions
// ***************************************************************************
pub struct VersionApi;

#[derive(Object)]
struct RespVersion {
    result_code: String,
    result_msg: String,
    server_version: String,
}

// ***************************************************************************
//                             OpenAPI Endpoint
// ***************************************************************************
#[OpenApi]
impl VersionApi {
    #[oai(path = "/version", method = "get")]
    async fn get_version(&self) -> Json<RespVersion> {
        Json(RespVersion::new("0", "success", ARCHIVE_VERSION.unwrap_or("unknown")))
    }
}

// ***************************************************************************
//                          Request/Response Methods
// ***************************************************************************
impl RespVersion {
    fn new(result_code: &str, result_msg: &str, server_version: &str) -> Self {
        Self {
            result_code: result_code.to_string(),
            result_msg: result_msg.to_string(),
            server_version: server_version.to_string(),
        }
    }
}
