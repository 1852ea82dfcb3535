//! Bundled web template for the rendered header.

use crate::Result;
use std::path::Path;

const INDEX_HTML: &str = include_str!("../web/index.html");
const STYLE_CSS: &str = include_str!("../web/style.css");
const ANIMATION_JS: &str = include_str!("../web/animation.js");

/// Write the bundled template into a scratch directory and return the
/// `file://` URL of its index page. Safe to call repeatedly.
pub fn materialize() -> Result<String> {
    let dir = std::env::temp_dir().join("repogif-web");
    std::fs::create_dir_all(&dir)?;
    std::fs::write(dir.join("index.html"), INDEX_HTML)?;
    std::fs::write(dir.join("style.css"), STYLE_CSS)?;
    std::fs::write(dir.join("animation.js"), ANIMATION_JS)?;
    page_url(&dir.join("index.html"))
}

/// `file://` URL for a page path.
pub fn page_url(path: &Path) -> Result<String> {
    let abs = std::fs::canonicalize(path)?;
    Ok(format!("file://{}", abs.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_materialize_is_idempotent() {
        let first = materialize().unwrap();
        let second = materialize().unwrap();
        assert_eq!(first, second);
        assert!(first.starts_with("file://"));
        assert!(first.ends_with("index.html"));
    }

    #[test]
    fn test_bundled_template_exposes_host_hooks() {
        for hook in [
            "repogifSetup",
            "repogifMoveCursor",
            "repogifShowCursor",
            "repogifHideCursor",
            "repogifClick",
            "startAnimation",
        ] {
            assert!(ANIMATION_JS.contains(hook), "missing hook {}", hook);
        }
        assert!(INDEX_HTML.contains("star-button"));
        assert!(INDEX_HTML.contains("cursor"));
    }
}
