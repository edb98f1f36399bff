#![forbid(unsafe_code)]

use lazy_static::lazy_static;
use tera::Tera;

pub mod posts;
pub mod routes;

// The compiled template set.  Templates are embedded at build time so the
// server needs no runtime template directory.
lazy_static! {
    pub static ref TEMPLATES: Tera = {
        let mut tera = Tera::default();
        tera.add_raw_templates(vec![
            ("layout.html", include_str!("../../templates/layout.html")),
            ("home.html", include_str!("../../templates/home.html")),
            ("about.html", include_str!("../../templates/about.html")),
        ])
        .expect("Unable to compile the page templates.");
        tera
    };
}
