#![forbid(unsafe_code)]

use log::info;
use poem::listener::TcpListener;
use structopt::StructOpt;

use archive_server::server::build_pages_app;
use archive_server::utils::config::{get_parms, init_archive_dirs, init_log, ArchiveArgs};

const SERVER_NAME: &str = "PageServer"; // for poem logging

// ---------------------------------------------------------------------------
// main:
// ---------------------------------------------------------------------------
#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    // Announce ourselves.
    println!("Starting page_server!");

    // The page renderer shares the catalog's configuration layout but never
    // touches the record store.
    let args = ArchiveArgs::from_args();
    let dirs = init_archive_dirs(&args);
    let parms = get_parms(&dirs).expect("FAILED to read configuration file.");
    init_log(&dirs, parms.config.debug);

    let addr = format!("{}:{}", parms.config.http_addr, parms.config.http_port);
    info!("Page service listening on {}", addr);

    // Create the routes and run the server.
    let app = build_pages_app();
    poem::Server::new(TcpListener::bind(addr))
        .name(SERVER_NAME)
        .run(app)
        .await
}
