// This file contains all SQL statements issued by the catalog service.
#![forbid(unsafe_code)]

pub const PLACEHOLDER: &str = "${PLACEHOLDER}";

// ========================= books table ===========================
pub const LIST_ALL_BOOKS: &str = concat!(
    "SELECT id, published, author, title, first_sentence ",
    "FROM books ORDER BY id",
);

// The placeholder is replaced with the rendered conjunction of the
// recognized filter keys present on the request.  Values always travel as
// bound parameters, never as statement text.
pub const FILTER_BOOKS_TEMPLATE: &str = concat!(
    "SELECT id, published, author, title, first_sentence ",
    "FROM books WHERE ${PLACEHOLDER}",
);
