//! URL helper functions

use crate::config::SiteConfig;

/// Generate a URL with the root path
///
/// # Examples
/// ```ignore
/// url_for(&config, "/post/hello") // -> "/blog/post/hello"
/// ```
pub fn url_for(config: &SiteConfig, path: &str) -> String {
    let root = config.root.trim_end_matches('/');
    let path = path.trim_start_matches('/');

    if path.is_empty() {
        format!("{}/", root)
    } else {
        format!("{}/{}", root, path)
    }
}

/// Path of the n-th listing page (1-based)
pub fn listing_path(page: usize) -> String {
    if page <= 1 {
        "/".to_string()
    } else {
        format!("/page/{}/", page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> SiteConfig {
        let mut config = SiteConfig::default();
        config.root = "/blog/".to_string();
        config
    }

    #[test]
    fn test_url_for() {
        let config = test_config();
        assert_eq!(url_for(&config, "/post/hello"), "/blog/post/hello");
        assert_eq!(url_for(&config, "/"), "/blog/");
    }

    #[test]
    fn test_listing_path() {
        assert_eq!(listing_path(1), "/");
        assert_eq!(listing_path(3), "/page/3/");
    }
}
