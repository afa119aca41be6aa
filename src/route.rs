//! Client-side routes of the blog.

use std::fmt;

const POST_PREFIX: &str = "/post/";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// `/`, the post listing.
    Home,

    /// `/post/:postId`.
    Post(String),

    /// `/guest`.
    Guestbook,

    /// `/update`, the changelog.
    Changelog,
}

impl Route {
    /// Parses a path. Trailing slashes are ignored; anything unrecognized is
    /// `None`.
    pub fn parse(path: &str) -> Option<Route> {
        let trimmed = path.trim_end_matches('/');
        match trimmed {
            "" => Some(Route::Home),
            "/guest" => Some(Route::Guestbook),
            "/update" => Some(Route::Changelog),
            _ => match trimmed.strip_prefix(POST_PREFIX) {
                Some(id) if !id.is_empty() && !id.contains('/') => {
                    Some(Route::Post(id.to_owned()))
                }
                _ => None,
            },
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_owned(),
            Route::Post(id) => format!("{}{}", POST_PREFIX, id),
            Route::Guestbook => "/guest".to_owned(),
            Route::Changelog => "/update".to_owned(),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.path())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!(Some(Route::Home), Route::parse("/"));
        assert_eq!(Some(Route::Home), Route::parse(""));
        assert_eq!(
            Some(Route::Post("Docker-Basic".to_owned())),
            Route::parse("/post/Docker-Basic/")
        );
        assert_eq!(Some(Route::Guestbook), Route::parse("/guest"));
        assert_eq!(Some(Route::Changelog), Route::parse("/update"));
        assert_eq!(None, Route::parse("/post/"));
        assert_eq!(None, Route::parse("/post/a/b"));
        assert_eq!(None, Route::parse("/about"));
    }

    #[test]
    fn test_path_parses_back() {
        for route in &[
            Route::Home,
            Route::Post("React-State".to_owned()),
            Route::Guestbook,
            Route::Changelog,
        ] {
            assert_eq!(Some(route.clone()), Route::parse(&route.path()));
        }
    }
}
