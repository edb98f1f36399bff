// This file contains the catalog database structs and related definitions.
#![forbid(unsafe_code)]

use poem_openapi::Object;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// books:
// ---------------------------------------------------------------------------
/** A single row of the read-only books store.  All five fields are returned
 * to callers exactly as stored. */
#[derive(Object, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: i32,
    pub published: i32,
    pub author: String,
    pub title: String,
    pub first_sentence: String,
}

impl Book {
    pub fn new(id: i32, published: i32, author: String, title: String, first_sentence: String)
    -> Book {
        Book { id, published, author, title, first_sentence }
    }
}
