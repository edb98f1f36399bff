#![forbid(unsafe_code)]

use poem::error::InternalServerError;
use poem::handler;
use poem::web::Html;
use tera::Context;

use crate::pages::posts::sample_posts;
use crate::pages::TEMPLATES;

// ---------------------------------------------------------------------------
// home:
// ---------------------------------------------------------------------------
/** Render the home page with the static post collection. */
#[handler]
pub fn home() -> poem::Result<Html<String>> {
    let mut context = Context::new();
    context.insert("title", "");
    context.insert("posts", &sample_posts());
    let body = TEMPLATES.render("home.html", &context).map_err(InternalServerError)?;
    Ok(Html(body))
}

// ---------------------------------------------------------------------------
// about:
// ---------------------------------------------------------------------------
/** Render the about page with its fixed title. */
#[handler]
pub fn about() -> poem::Result<Html<String>> {
    let mut context = Context::new();
    context.insert("title", "About");
    let body = TEMPLATES.render("about.html", &context).map_err(InternalServerError)?;
    Ok(Html(body))
}

// ***************************************************************************
//                                  Tests
// ***************************************************************************
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn home_renders_every_post() {
        let mut context = Context::new();
        context.insert("title", "");
        context.insert("posts", &sample_posts());
        let body = TEMPLATES.render("home.html", &context).unwrap();
        for post in sample_posts() {
            assert!(body.contains(&post.title));
            assert!(body.contains(&post.author));
            assert!(body.contains(&post.content));
            assert!(body.contains(&post.date_posted));
        }
        // Home has no page-specific title, so the layout default applies.
        assert!(body.contains("<title>Distant Reading Archive</title>"));
    }

    #[test]
    fn about_carries_title_through_layout() {
        let mut context = Context::new();
        context.insert("title", "About");
        let body = TEMPLATES.render("about.html", &context).unwrap();
        assert!(body.contains("<title>Distant Reading Archive - About</title>"));
        assert!(body.contains("<h1>About</h1>"));
    }
}
