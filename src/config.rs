//! Project configuration. A project is a directory containing a
//! `heonlog.yaml` file; every field is optional and relative paths are
//! resolved against that directory.

use serde::Deserialize;
use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use crate::loader::CategoryPolicy;

pub const PROJECT_FILE: &str = "heonlog.yaml";

#[derive(Deserialize)]
struct Timeout(u64);
impl Default for Timeout {
    fn default() -> Self {
        Timeout(10)
    }
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct Project {
    posts_directory: Option<PathBuf>,
    post_index: Option<PathBuf>,
    category_tree: Option<PathBuf>,
    site_url: Option<Url>,
    threads: Option<usize>,
    timeout_secs: Timeout,
    category_policy: CategoryPolicy,
}

/// Resolved project settings.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub root_directory: PathBuf,
    pub posts_directory: PathBuf,
    pub post_index: PathBuf,
    pub category_tree: PathBuf,

    /// When set, posts are fetched from `{site_url}/posts/` instead of
    /// `posts_directory`.
    pub site_url: Option<Url>,
    pub threads: usize,
    pub timeout: Duration,
    pub category_policy: CategoryPolicy,
}

impl Config {
    /// Looks for `heonlog.yaml` in `dir` and then in each of its parents.
    pub fn from_directory(dir: &Path, threads: Option<usize>) -> Result<Config> {
        let path = dir.join(PROJECT_FILE);
        if path.exists() {
            Config::from_project_file(&path, threads)
        } else {
            match dir.parent() {
                Some(parent) => Config::from_directory(parent, threads),
                None => Err(Error::ProjectFileNotFound),
            }
        }
    }

    /// Loads a project file. `threads` overrides the file's `threads` value.
    pub fn from_project_file(path: &Path, threads: Option<usize>) -> Result<Config> {
        let file = File::open(path).map_err(|err| Error::Open {
            path: path.to_owned(),
            err,
        })?;
        let project: Project = serde_yaml::from_reader(file).map_err(|err| Error::Yaml {
            path: path.to_owned(),
            err,
        })?;
        let root = match path.parent() {
            Some(root) => root.to_owned(),
            None => return Err(Error::NoParentDirectory(path.to_owned())),
        };
        log::debug!("using project file `{}`", path.display());

        let resolve = |p: Option<PathBuf>, default: &str| {
            root.join(p.unwrap_or_else(|| PathBuf::from(default)))
        };
        Ok(Config {
            posts_directory: resolve(project.posts_directory, "public/posts"),
            post_index: resolve(project.post_index, "src/data/posts.json"),
            category_tree: resolve(project.category_tree, "src/data/categories.json"),
            site_url: project.site_url,
            threads: threads
                .or(project.threads)
                .unwrap_or_else(num_cpus::get)
                .max(1),
            timeout: Duration::from_secs(project.timeout_secs.0),
            category_policy: project.category_policy,
            root_directory: root,
        })
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error locating or reading the project file.
#[derive(Debug)]
pub enum Error {
    /// Returned when no directory up to the filesystem root has a
    /// `heonlog.yaml`.
    ProjectFileNotFound,

    Open { path: PathBuf, err: std::io::Error },

    Yaml { path: PathBuf, err: serde_yaml::Error },

    NoParentDirectory(PathBuf),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::ProjectFileNotFound => {
                write!(f, "could not find `{}` in any parent directory", PROJECT_FILE)
            }
            Error::Open { path, err } => {
                write!(f, "opening project file `{}`: {}", path.display(), err)
            }
            Error::Yaml { path, err } => {
                write!(f, "loading configuration `{}`: {}", path.display(), err)
            }
            Error::NoParentDirectory(path) => write!(
                f,
                "can't get parent directory for provided project file path `{}`",
                path.display()
            ),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::ProjectFileNotFound => None,
            Error::Open { err, .. } => Some(err),
            Error::Yaml { err, .. } => Some(err),
            Error::NoParentDirectory(_) => None,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::fs;

    #[test]
    fn test_defaults() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        fs::write(dir.path().join(PROJECT_FILE), "{}\n")?;
        let config = Config::from_directory(dir.path(), Some(2))?;
        assert_eq!(dir.path().join("public/posts"), config.posts_directory);
        assert_eq!(dir.path().join("src/data/posts.json"), config.post_index);
        assert_eq!(dir.path().join("src/data/categories.json"), config.category_tree);
        assert_eq!(None, config.site_url);
        assert_eq!(2, config.threads);
        assert_eq!(Duration::from_secs(10), config.timeout);
        assert_eq!(CategoryPolicy::Tolerate, config.category_policy);
        Ok(())
    }

    #[test]
    fn test_found_from_subdirectory() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        fs::write(
            dir.path().join(PROJECT_FILE),
            "posts_directory: content\nsite_url: https://heonlog.netlify.app\nthreads: 3\ntimeout_secs: 2\ncategory_policy: reject\n",
        )?;
        let nested = dir.path().join("a").join("b");
        fs::create_dir_all(&nested)?;

        let config = Config::from_directory(&nested, None)?;
        assert_eq!(dir.path(), config.root_directory);
        assert_eq!(dir.path().join("content"), config.posts_directory);
        assert_eq!(
            Some("https://heonlog.netlify.app/"),
            config.site_url.as_ref().map(Url::as_str)
        );
        assert_eq!(3, config.threads);
        assert_eq!(Duration::from_secs(2), config.timeout);
        assert_eq!(CategoryPolicy::Reject, config.category_policy);
        Ok(())
    }

    #[test]
    fn test_invalid_policy() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        fs::write(dir.path().join(PROJECT_FILE), "category_policy: panic\n")?;
        assert!(matches!(
            Config::from_directory(dir.path(), None),
            Err(Error::Yaml { .. })
        ));
        Ok(())
    }

    #[test]
    fn test_fixture_project() -> Result<()> {
        let config = Config::from_directory(Path::new("./testdata"), Some(1))?;
        assert!(config.posts_directory.ends_with("public/posts"));
        assert!(config.post_index.ends_with("data/posts.json"));
        Ok(())
    }
}
