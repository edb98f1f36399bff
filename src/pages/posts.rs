#![forbid(unsafe_code)]

use serde::Serialize;

// ---------------------------------------------------------------------------
// Post:
// ---------------------------------------------------------------------------
/** One entry of the static post collection rendered on the home page.  The
 * collection is immutable for the process lifetime. */
#[derive(Debug, Clone, Serialize)]
pub struct Post {
    pub author: String,
    pub title: String,
    pub content: String,
    pub date_posted: String,
}

impl Post {
    fn new(author: &str, title: &str, content: &str, date_posted: &str) -> Post {
        Post {
            author: author.to_string(),
            title: title.to_string(),
            content: content.to_string(),
            date_posted: date_posted.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// sample_posts:
// ---------------------------------------------------------------------------
pub fn sample_posts() -> Vec<Post> {
    vec![
        Post::new("Corey Schafer", "Blog Post 1", "First post content", "April 20, 2018"),
        Post::new("Jane Doe", "Blog Post 2", "Second post content", "April 21, 2018"),
    ]
}
