//! Reading the build-time artifacts (the post index and the category tree).
//! Both are JSON documents treated as read-only data for the lifetime of the
//! process.

use serde::de::DeserializeOwned;
use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Deserializes a JSON artifact from `path`. `kind` names the artifact in
/// error messages.
pub fn read_json<T: DeserializeOwned>(path: &Path, kind: &'static str) -> Result<T> {
    let file = File::open(path).map_err(|err| Error::Open {
        kind,
        path: path.to_owned(),
        err,
    })?;
    let value = serde_json::from_reader(BufReader::new(file)).map_err(|err| Error::Json {
        kind,
        path: path.to_owned(),
        err,
    })?;
    log::debug!("loaded {} from `{}`", kind, path.display());
    Ok(value)
}

pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error reading an artifact.
#[derive(Debug)]
pub enum Error {
    /// Returned when the artifact file can't be opened.
    Open {
        kind: &'static str,
        path: PathBuf,
        err: std::io::Error,
    },

    /// Returned when the artifact isn't valid JSON of the expected shape.
    Json {
        kind: &'static str,
        path: PathBuf,
        err: serde_json::Error,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Open { kind, path, err } => {
                write!(f, "opening {} file `{}`: {}", kind, path.display(), err)
            }
            Error::Json { kind, path, err } => {
                write!(f, "parsing {} file `{}`: {}", kind, path.display(), err)
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Open { err, .. } => Some(err),
            Error::Json { err, .. } => Some(err),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::post::PostIndex;
    use std::io::Write;

    #[test]
    fn test_read_missing_file() {
        let err = PostIndex::from_file(Path::new("./testdata/data/missing.json"))
            .unwrap_err();
        assert!(matches!(err, Error::Open { kind: "post index", .. }));
    }

    #[test]
    fn test_read_malformed_file() -> std::io::Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        file.write_all(b"{\"id\": 1}")?;
        let err = PostIndex::from_file(file.path()).unwrap_err();
        assert!(matches!(err, Error::Json { .. }));
        Ok(())
    }

    #[test]
    fn test_read_fixture() -> Result<()> {
        let index = PostIndex::from_file(Path::new("./testdata/data/posts.json"))?;
        assert_eq!(6, index.len());
        Ok(())
    }
}
