//! File-based routing: a page's location under `pages/` is its URL.

use crate::utils::error::{KitError, Result};
use std::path::{Component, Path};

pub const PAGES_DIR: &str = "pages";
const INDEX_PAGE: &str = "index";

/// URL path served by the page file at `path`.
///
/// `pages/index.html` is `/`, `pages/about/index.html` is `/about` and
/// `pages/login.html` is `/login`.
pub fn route_for_page(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    let mut segments: Vec<String> = Vec::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => segments.push(part.to_string_lossy().into_owned()),
            Component::CurDir => {}
            _ => return Err(invalid(path, "must be a relative path inside pages/")),
        }
    }

    if segments.first().map(String::as_str) != Some(PAGES_DIR) {
        return Err(invalid(path, "must live under pages/"));
    }
    segments.remove(0);

    let file = segments
        .pop()
        .ok_or_else(|| invalid(path, "does not name a page file"))?;
    let stem = Path::new(&file)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or(file);
    if stem != INDEX_PAGE {
        segments.push(stem);
    }

    Ok(format!("/{}", segments.join("/")))
}

fn invalid(path: &Path, reason: &str) -> KitError {
    KitError::ValidationError {
        message: format!("Page {} {}", path.display(), reason),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_pages_map_to_directory() {
        assert_eq!(route_for_page("pages/index.html").unwrap(), "/");
        assert_eq!(route_for_page("pages/about/index.html").unwrap(), "/about");
        assert_eq!(route_for_page("./pages/docs/guide/index.html").unwrap(), "/docs/guide");
    }

    #[test]
    fn test_named_pages_drop_extension() {
        assert_eq!(route_for_page("pages/login.html").unwrap(), "/login");
        assert_eq!(route_for_page("pages/account/settings.tsx").unwrap(), "/account/settings");
    }

    #[test]
    fn test_paths_outside_pages_rejected() {
        assert!(route_for_page("src/login.html").is_err());
        assert!(route_for_page("/pages/login.html").is_err());
        assert!(route_for_page("pages/../secret.html").is_err());
        assert!(route_for_page("pages").is_err());
    }
}
