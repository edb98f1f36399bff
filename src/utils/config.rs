#![forbid(unsafe_code)]

use std::os::unix::fs::PermissionsExt;
use std::{env, fs, path::Path};

use anyhow::{anyhow, Result};
use fs_mistrust::Mistrust;
use log::{error, info, LevelFilter};
use log4rs::append::console::ConsoleAppender;
use log4rs::config::{Appender, Root};
use log4rs::encode::pattern::PatternEncoder;
use serde::Deserialize;
use sqlx::{Pool, Sqlite};
use structopt::StructOpt;

use crate::utils::archive_utils::get_absolute_path;
use crate::utils::{db_init, errors::Errors};

// ***************************************************************************
//                                Constants
// ***************************************************************************
// Directory and file locations.  Unless otherwise noted, all files and
// directories are relative to the root directory.
const ENV_ARCHIVE_ROOT_DIR : &str = "ARCHIVE_ROOT_DIR";
const DEFAULT_ROOT_DIR     : &str = "~/.archive";
const CONFIG_DIR           : &str = "/config";
const LOGS_DIR             : &str = "/logs";
const DATABASE_DIR         : &str = "/database";
const LOG4RS_CONFIG_FILE   : &str = "/log4rs.yml";   // relative to config dir
const ARCHIVE_CONFIG_FILE  : &str = "/archive.toml"; // relative to config dir

// Networking.
const DEFAULT_HTTP_ADDR    : &str = "127.0.0.1";
const DEFAULT_HTTP_PORT    : u16  = 8000;

// Service identification.
const DEFAULT_TITLE        : &str = "Distant Reading Archive";

// Log pattern used when no log4rs.yml is present in the config directory.
const CONSOLE_LOG_PATTERN  : &str = "{d(%Y-%m-%d %H:%M:%S)} {h({l})} {t} - {m}{n}";

// ***************************************************************************
//                             Directory Structs
// ***************************************************************************
// ---------------------------------------------------------------------------
// ArchiveDirs:
// ---------------------------------------------------------------------------
#[derive(Debug, Deserialize)]
#[allow(dead_code)]
pub struct ArchiveDirs {
    pub root_dir: String,
    pub config_dir: String,
    pub logs_dir: String,
    pub database_dir: String,
}

// ***************************************************************************
//                               Config Structs
// ***************************************************************************
// ---------------------------------------------------------------------------
// CommandLineArgs:
// ---------------------------------------------------------------------------
#[derive(Debug, StructOpt)]
#[structopt(name = "archive_args", about = "Command line arguments for the archive servers.")]
pub struct ArchiveArgs {
    /// Specify the server's root data directory.
    ///
    /// This directory contains the configuration, log and database files
    /// used during execution.  The root directory is calculated using the
    /// following priority order:
    ///
    ///   1. If set, the value of the ARCHIVE_ROOT_DIR environment variable,
    ///
    ///   2. Otherwise, if set, the value of this argument,
    ///
    ///   3. Otherwise, ~/.archive
    ///
    #[structopt(short, long)]
    pub root_dir: Option<String>,
}

// ---------------------------------------------------------------------------
// Parms:
// ---------------------------------------------------------------------------
#[derive(Debug)]
#[allow(dead_code)]
pub struct Parms {
    pub config_file: String,
    pub config: Config,
}

// ---------------------------------------------------------------------------
// RuntimeCtx:
// ---------------------------------------------------------------------------
/** The explicit runtime state handed to the server-construction functions and
 * from there to each endpoint.  Nothing here is process-wide. */
#[derive(Debug)]
pub struct RuntimeCtx {
    pub parms: Parms,
    pub db: Pool<Sqlite>,
}

// ---------------------------------------------------------------------------
// Config:
// ---------------------------------------------------------------------------
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    pub title: String,
    pub http_addr: String,
    pub http_port: u16,
    /// Overrides the store location under the database directory.
    pub db_path: Option<String>,
    /// Enables debug-level logging, including per-request dumps.
    pub debug: bool,
}

impl Config {
    pub fn new() -> Self {
        Config::default()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            http_addr: DEFAULT_HTTP_ADDR.to_string(),
            http_port: DEFAULT_HTTP_PORT,
            db_path: None,
            debug: false,
        }
    }
}

// ***************************************************************************
//                            Directory Functions
// ***************************************************************************
// ---------------------------------------------------------------------------
// init_archive_dirs:
// ---------------------------------------------------------------------------
/** Calculate the external data directories, creating any that do not exist. */
pub fn init_archive_dirs(args: &ArchiveArgs) -> ArchiveDirs {
    // Initialize the mistrust object.
    let mistrust = get_mistrust();

    // Check that each path is absolute and is a directory with the proper
    // permissions assigned if it exists.  If it doesn't exist, create it.
    let root_dir = get_root_dir(args);
    check_archive_dir(&root_dir, "root directory", &mistrust);

    let config_dir = root_dir.clone() + CONFIG_DIR;
    check_archive_dir(&config_dir, "config directory", &mistrust);

    let logs_dir = root_dir.clone() + LOGS_DIR;
    check_archive_dir(&logs_dir, "logs directory", &mistrust);

    let database_dir = root_dir.clone() + DATABASE_DIR;
    check_archive_dir(&database_dir, "database directory", &mistrust);

    // Package up and return the directories.
    ArchiveDirs { root_dir, config_dir, logs_dir, database_dir }
}

// ---------------------------------------------------------------------------
// check_archive_dir:
// ---------------------------------------------------------------------------
/** Check that the path is absolute and, if it exists, that it has the proper
 * permissions assigned.  If it doesn't exist, create it.  The mistrust
 * package creates directories with 0o700 permissions.
 *
 * Any failure results in a panic.
 */
fn check_archive_dir(dir: &String, msgname: &str, mistrust: &Mistrust) {
    // Get the path object.
    let path = Path::new(dir);
    if !path.is_absolute() {
        panic!("The archive {} path must be absolute: {}", msgname, dir);
    }
    if path.exists() {
        // Make sure the path represents a directory.
        if !path.is_dir() {
            panic!("The archive {} path must be a directory: {}", msgname, dir);
        }

        // Make sure the directory has rwx for owner only.
        let meta = path.metadata().unwrap_or_else(|_| panic!("Unable to read metadata for {}: {}", msgname, dir));
        let perm = meta.permissions().mode();
        if perm & 0o777 != 0o700 {
            panic!("The archive {} path must have 0o700 permissions: {}", msgname, dir);
        }
    } else {
        // Create the directory with the correct permissions.
        match mistrust.make_directory(path) {
            Ok(_) => (),
            Err(e) => {
                panic!("Make directory error for {:?}: {}", path, &e.to_string());
            }
        }
    }
}

// ---------------------------------------------------------------------------
// get_mistrust:
// ---------------------------------------------------------------------------
/** Configure a new mistrust object for initial directory processing. */
fn get_mistrust() -> Mistrust {
    match Mistrust::builder()
        .ignore_prefix(get_absolute_path("~"))
        .trust_group(0)
        .build() {
            Ok(m) => m,
            Err(e) => {
                panic!("Mistrust configuration error: {}", &e.to_string());
            }
        }
}

// ---------------------------------------------------------------------------
// get_root_dir:
// ---------------------------------------------------------------------------
fn get_root_dir(args: &ArchiveArgs) -> String {
    // Order of precedence:
    //  1. Environment variable
    //  2. Command line --root-dir argument
    //  3. Default location
    //
    let root_dir = env::var(ENV_ARCHIVE_ROOT_DIR).unwrap_or_else(
        |_| {
            match args.root_dir.clone() {
                Some(r) => r,
                None => DEFAULT_ROOT_DIR.to_string(),
            }
        });

    // Canonicalize the path.
    get_absolute_path(&root_dir)
}

// ***************************************************************************
//                               Log Functions
// ***************************************************************************
// ---------------------------------------------------------------------------
// init_log:
// ---------------------------------------------------------------------------
/** Initialize log4rs from the config directory's log4rs.yml when one exists,
 * otherwise fall back to a console appender. */
pub fn init_log(dirs: &ArchiveDirs, debug: bool) {
    let logconfig = dirs.config_dir.clone() + LOG4RS_CONFIG_FILE;
    if Path::new(&logconfig).is_file() {
        match log4rs::init_file(logconfig.clone(), Default::default()) {
            Ok(_) => info!("Log4rs initialized using: {}", logconfig),
            Err(e) => {
                println!("{}", e);
                let s = format!("{}", Errors::Log4rsInitialization(logconfig));
                panic!("{}", s);
            },
        }
    } else {
        init_console_log(debug);
    }
}

// ---------------------------------------------------------------------------
// init_console_log:
// ---------------------------------------------------------------------------
fn init_console_log(debug: bool) {
    let stdout = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::new(CONSOLE_LOG_PATTERN)))
        .build();
    let level = if debug { LevelFilter::Debug } else { LevelFilter::Info };
    let logconfig = log4rs::Config::builder()
        .appender(Appender::builder().build("stdout", Box::new(stdout)))
        .build(Root::builder().appender("stdout").build(level))
        .expect("Unable to assemble the default console log configuration.");
    log4rs::init_config(logconfig).expect("Unable to initialize console logging.");
    info!("Log4rs initialized with the default console configuration.");
}

/// ***************************************************************************
//                             Parms Functions
// ***************************************************************************
// ---------------------------------------------------------------------------
// get_parms:
// ---------------------------------------------------------------------------
/** Retrieve the application parameters from the configuration file in the
 * config directory.  If the file cannot be read, default values are used. */
pub fn get_parms(dirs: &ArchiveDirs) -> Result<Parms> {
    // Get the config file path from its data directory.
    let config_file = dirs.config_dir.clone() + ARCHIVE_CONFIG_FILE;

    // Read the configuration file.
    let config_file_abs = get_absolute_path(&config_file);
    let contents = match fs::read_to_string(&config_file_abs) {
        Ok(c) => c,
        Err(_) => {
            println!("Unable to read configuration at {}. Using default values.", config_file_abs);
            return Ok(Parms { config_file: Default::default(), config: Config::new() });
        }
    };

    // Parse the toml configuration.
    let config: Config = match toml::from_str(&contents) {
        Ok(c)  => c,
        Err(e) => {
            let msg = format!("{}\n   {}", Errors::TOMLParseError(config_file_abs), e);
            error!("{}", msg);
            return Result::Err(anyhow!(msg));
        }
    };

    Ok(Parms { config_file: config_file_abs, config })
}

// ***************************************************************************
//                             Config Functions
// ***************************************************************************
// ---------------------------------------------------------------------------
// init_runtime_context:
// ---------------------------------------------------------------------------
/** Assemble the runtime context for the catalog service: data directories,
 * configuration, logging and the record store pool.  If any of these fail
 * the application aborts. */
pub async fn init_runtime_context(args: &ArchiveArgs) -> RuntimeCtx {
    let dirs = init_archive_dirs(args);
    let parms = get_parms(&dirs).expect("FAILED to read configuration file.");
    init_log(&dirs, parms.config.debug);
    info!("{}", Errors::InputParms(format!("{:#?}", parms)));

    let db = db_init::init_db(&db_init::db_url(&dirs, &parms.config)).await;
    RuntimeCtx { parms, db }
}
