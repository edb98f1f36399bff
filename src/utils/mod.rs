#![forbid(unsafe_code)]

pub mod archive_utils;
pub mod config;
pub mod db_init;
pub mod db_statements;
pub mod db_types;
pub mod errors;
pub mod query_filter;
