//! HTML pages.
//!
//! There is one template with two variants. Both are rendered once, at
//! startup, so a request never has to touch the template engine.

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use upon::Engine;

const TEMPLATE: &str = include_str!("../../../assets/pages/page.html");

#[derive(Debug, Clone)]
pub struct Pages {
    landing: String,
    invalid: String,
}
impl Pages {
    pub fn new() -> Result<Self> {
        let engine = Engine::new();
        let template = engine.compile(TEMPLATE).or_raise(|| ErrorKind::Template)?;
        let render = |invalid: bool| {
            template.render(&engine, upon::value! { invalid: invalid }).to_string().or_raise(|| ErrorKind::Template)
        };
        Ok(Self { landing: render(false)?, invalid: render(true)? })
    }

    /// Shown for `/`.
    pub fn landing(&self) -> &str {
        &self.landing
    }

    /// Shown for any identifier that doesn't resolve to an intact file.
    pub fn invalid(&self) -> &str {
        &self.invalid
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_landing_page() {
        let pages = Pages::new().unwrap();
        assert!(pages.landing().contains("Welcome to naslink!"));
        assert!(!pages.landing().contains("Requested file was changed or removed."));
        assert!(pages.landing().contains("/logo.svg"));
    }

    #[test]
    fn test_invalid_page() {
        let pages = Pages::new().unwrap();
        assert!(pages.invalid().contains("You've Been NasLinked!!"));
        assert!(pages.invalid().contains("Requested file was changed or removed."));
        assert!(!pages.invalid().contains("Welcome to naslink!"));
    }
}
