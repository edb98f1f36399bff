#![forbid(unsafe_code)]

pub mod pages;
pub mod server;
pub mod utils;
pub mod v1;
