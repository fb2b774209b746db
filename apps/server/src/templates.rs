//! Server-rendered pages.
//!
//! Templates are compiled into the binary and registered once at startup.
//! Handlebars HTML-escapes every `{{value}}`, so user-supplied text such as
//! a username is safe to interpolate.

use handlebars::{Handlebars, RenderError, TemplateError};
use serde::Serialize;

const INDEX: &str = "index";
const LOGIN: &str = "login";

/// Data for the sales screen shell.
#[derive(Debug, Serialize)]
pub struct IndexPage<'a> {
    pub username: &'a str,
    pub role: &'a str,
    pub tax_bps: u32,
    pub tax_percent: f64,
    pub currency: &'a str,
    pub min_search: usize,
    pub max_results: i64,
}

/// Data for the sign-in form.
#[derive(Debug, Serialize)]
pub struct LoginPage<'a> {
    pub error: Option<&'a str>,
}

#[derive(Debug, Clone)]
pub struct Pages {
    registry: Handlebars<'static>,
}

impl Pages {
    /// Registers the embedded templates.
    pub fn new() -> Result<Self, TemplateError> {
        let mut registry = Handlebars::new();
        registry.register_template_string(INDEX, include_str!("../templates/index.hbs"))?;
        registry.register_template_string(LOGIN, include_str!("../templates/login.hbs"))?;
        Ok(Pages { registry })
    }

    pub fn index(&self, page: &IndexPage<'_>) -> Result<String, RenderError> {
        self.registry.render(INDEX, page)
    }

    pub fn login(&self, page: &LoginPage<'_>) -> Result<String, RenderError> {
        self.registry.render(LOGIN, page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index_page(username: &str) -> IndexPage<'_> {
        IndexPage {
            username,
            role: "cashier",
            tax_bps: 800,
            tax_percent: 8.0,
            currency: "$",
            min_search: 2,
            max_results: 10,
        }
    }

    #[test]
    fn test_index_escapes_username() {
        let pages = Pages::new().unwrap();
        let html = pages.index(&index_page(r#"<b>"Tom" & Jo</b>"#)).unwrap();

        assert!(html.contains("&lt;b&gt;&quot;Tom&quot; &amp; Jo&lt;/b&gt;"));
        assert!(!html.contains("<b>"));
        assert!(html.contains(r#"data-tax-bps="800""#));
        assert!(html.contains(r#"data-min-search="2""#));
    }

    #[test]
    fn test_login_error_is_optional() {
        let pages = Pages::new().unwrap();

        let plain = pages.login(&LoginPage { error: None }).unwrap();
        assert!(!plain.contains("class=\"error\""));

        let failed = pages
            .login(&LoginPage {
                error: Some("invalid username or password"),
            })
            .unwrap();
        assert!(failed.contains("invalid username or password"));
    }
}
