//! URL helper functions

use crate::config::SiteConfig;

/// Path of a post page
///
/// # Examples
/// ```ignore
/// post_path("my-first-post") // -> "/post/my-first-post"
/// ```
pub fn post_path(uid: &str) -> String {
    format!("/post/{}", uid)
}

/// Generate a full URL including the domain
///
/// # Examples
/// ```ignore
/// full_url_for(&config, "/post/hello") // -> "https://blog.example.com/post/hello"
/// ```
pub fn full_url_for(config: &SiteConfig, path: &str) -> String {
    let base = config.url.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    format!("{}/{}", base, path)
}

/// Output file for a route, relative to the public directory
///
/// # Examples
/// ```ignore
/// route_file("/") // -> "index.html"
/// route_file("/post/hello") // -> "post/hello/index.html"
/// ```
pub fn route_file(route: &str) -> String {
    let route = route.trim_matches('/');
    if route.is_empty() {
        "index.html".to_string()
    } else {
        format!("{}/index.html", route)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_path() {
        assert_eq!(post_path("hello-world"), "/post/hello-world");
    }

    #[test]
    fn test_full_url_for() {
        let mut config = SiteConfig::default();
        config.url = "https://blog.example.com/".to_string();
        assert_eq!(
            full_url_for(&config, "/post/hello"),
            "https://blog.example.com/post/hello"
        );
        assert_eq!(full_url_for(&config, "/"), "https://blog.example.com/");
    }

    #[test]
    fn test_route_file() {
        assert_eq!(route_file("/"), "index.html");
        assert_eq!(route_file("/post/hello"), "post/hello/index.html");
    }
}
