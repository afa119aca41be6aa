//! Defines the [`Source`] trait, which retrieves raw post files by their path
//! relative to the posts root, and its two implementations: [`FsSource`] for
//! a local checkout and [`HttpSource`] for a deployed site.

use std::fmt;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

use url::Url;

/// Retrieves the raw text of post files. `relative_path` always uses `/` as
/// the separator (e.g. `Frontend/CSS/Selector.md`).
pub trait Source: Sync {
    fn fetch(&self, relative_path: &str) -> Result<String>;

    /// A human-readable location for log messages.
    fn describe(&self, relative_path: &str) -> String;
}

/// Reads post files from a directory on disk (usually `public/posts`).
pub struct FsSource {
    root: PathBuf,
}

impl FsSource {
    pub fn new<P: Into<PathBuf>>(root: P) -> FsSource {
        FsSource { root: root.into() }
    }

    fn path(&self, relative_path: &str) -> PathBuf {
        relative_path
            .split('/')
            .fold(self.root.clone(), |path, segment| path.join(segment))
    }
}

impl Source for FsSource {
    fn fetch(&self, relative_path: &str) -> Result<String> {
        let path = self.path(relative_path);
        fs::read_to_string(&path).map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => Error::NotFound(path.display().to_string()),
            io::ErrorKind::InvalidData => Error::Encoding(path.display().to_string()),
            _ => Error::Io(err),
        })
    }

    fn describe(&self, relative_path: &str) -> String {
        self.path(relative_path).display().to_string()
    }
}

/// Fetches post files from a deployed site, under `{site_url}/posts/`.
pub struct HttpSource {
    posts_url: Url,
    agent: ureq::Agent,
}

impl HttpSource {
    /// `site_url` is the site root. Its path should end in a slash if the
    /// site isn't served from the domain root: [`Url::join`] treats the last
    /// segment of a slash-less path as a file name and replaces it.
    pub fn new(site_url: &Url, timeout: Duration) -> Result<HttpSource> {
        Ok(HttpSource {
            posts_url: site_url.join("posts/")?,
            agent: ureq::AgentBuilder::new().timeout(timeout).build(),
        })
    }

    fn url(&self, relative_path: &str) -> Result<Url> {
        Ok(self.posts_url.join(relative_path)?)
    }
}

impl Source for HttpSource {
    fn fetch(&self, relative_path: &str) -> Result<String> {
        let url = self.url(relative_path)?;
        match self.agent.get(url.as_str()).call() {
            // Single-page hosts answer unknown paths with the app's
            // index.html instead of a 404.
            Ok(response) if response.content_type() == "text/html" => {
                Err(Error::NotFound(url.to_string()))
            }
            Ok(response) => response.into_string().map_err(|err| match err.kind() {
                io::ErrorKind::InvalidData => Error::Encoding(url.to_string()),
                _ => Error::Io(err),
            }),
            Err(ureq::Error::Status(404, _)) => Err(Error::NotFound(url.to_string())),
            Err(err) => Err(Error::Http(Box::new(err))),
        }
    }

    fn describe(&self, relative_path: &str) -> String {
        match self.url(relative_path) {
            Ok(url) => url.to_string(),
            Err(_) => format!("{}{}", self.posts_url, relative_path),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error retrieving a post file.
#[derive(Debug)]
pub enum Error {
    /// Returned when there is no file at the requested location.
    NotFound(String),

    /// Returned when the file was retrieved but isn't valid UTF-8.
    Encoding(String),

    /// Returned for other I/O errors, including reading a response body.
    Io(io::Error),

    /// Returned for HTTP failures other than a 404.
    Http(Box<ureq::Error>),

    /// Returned when a post path can't be joined onto the site URL.
    UrlParse(url::ParseError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::NotFound(location) => write!(f, "`{}` not found", location),
            Error::Encoding(location) => write!(f, "`{}` is not valid UTF-8", location),
            Error::Io(err) => err.fmt(f),
            Error::Http(err) => err.fmt(f),
            Error::UrlParse(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::NotFound(_) | Error::Encoding(_) => None,
            Error::Io(err) => Some(err),
            Error::Http(err) => Some(err.as_ref()),
            Error::UrlParse(err) => Some(err),
        }
    }
}

impl From<url::ParseError> for Error {
    /// Converts a [`url::ParseError`] into an [`Error`]. It allows us to use
    /// the `?` operator for URL parsing and joining functions.
    fn from(err: url::ParseError) -> Error {
        Error::UrlParse(err)
    }
}
