#![forbid(unsafe_code)]

pub mod books_all;
pub mod books_filter;
pub mod version;
