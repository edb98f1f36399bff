#![forbid(unsafe_code)]

pub mod books;
