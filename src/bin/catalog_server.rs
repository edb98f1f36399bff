#![forbid(unsafe_code)]

use std::sync::Arc;

use log::info;
use poem::listener::TcpListener;
use structopt::StructOpt;

use archive_server::server::build_catalog_app;
use archive_server::utils::config::{init_runtime_context, ArchiveArgs};

const SERVER_NAME: &str = "CatalogServer"; // for poem logging

// ---------------------------------------------------------------------------
// main:
// ---------------------------------------------------------------------------
#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    // Announce ourselves.
    println!("Starting catalog_server!");

    // Read arguments and configuration, then open the record store.
    let args = ArchiveArgs::from_args();
    let ctx = Arc::new(init_runtime_context(&args).await);

    // Assign the bind address before the context moves into the app.
    let addr = format!("{}:{}", ctx.parms.config.http_addr, ctx.parms.config.http_port);
    info!("Catalog service listening on {}", addr);

    // Create the routes and run the server.
    let app = build_catalog_app(ctx);
    poem::Server::new(TcpListener::bind(addr))
        .name(SERVER_NAME)
        .run(app)
        .await
}
