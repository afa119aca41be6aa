//! Defines the [`Document`], [`Frontmatter`], and [`Error`] types along with
//! [`parse_document`], which splits a post source file into its YAML
//! frontmatter and its markdown body.

use std::fmt;

use chrono::{DateTime, NaiveDate};
use serde::de::{self, Deserializer, SeqAccess, Visitor};
use serde::Deserialize;

const FENCE: &str = "---";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// A post source file split into its structured header and its body.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub frontmatter: Frontmatter,

    /// The markdown after the closing fence. Handed to the renderer
    /// untouched.
    pub body: String,
}

/// The header block of a post. `createdAt` is the only field besides the
/// title that must be present.
#[derive(Debug, Clone, PartialEq)]
pub struct Frontmatter {
    pub title: String,
    pub desc: String,
    pub created_at: NaiveDate,
    pub tags: Vec<String>,
}

#[derive(Deserialize)]
struct RawFrontmatter {
    title: String,

    #[serde(default)]
    desc: String,

    #[serde(rename = "createdAt")]
    created_at: String,

    #[serde(default, deserialize_with = "deserialize_tags")]
    tags: Vec<String>,
}

/// Parses a post source file. The file must be structured as follows:
///
/// 1. Initial frontmatter fence (`---`)
/// 2. YAML frontmatter with fields `title`, `createdAt`, and optionally
///    `desc` and `tags`
/// 3. Terminal frontmatter fence (`---`) on a line of its own
/// 4. Post body
///
/// For example:
///
/// ```md
/// ---
/// title: CSS selectors
/// desc: Specificity and combinators.
/// createdAt: 2024-03-19
/// tags: [Layout, Tailwind]
/// ---
/// # Selectors
/// ```
pub fn parse_document(input: &str) -> Result<Document> {
    let (yaml, body) = split_frontmatter(input)?;
    let raw: RawFrontmatter = serde_yaml::from_str(yaml)?;
    Ok(Document {
        frontmatter: Frontmatter {
            created_at: parse_date(&raw.created_at)?,
            title: raw.title,
            desc: raw.desc,
            tags: raw.tags,
        },
        body: body.to_owned(),
    })
}

// Returns the YAML block and the body. The closing fence must be alone on
// its line, apart from trailing whitespace.
fn split_frontmatter(input: &str) -> Result<(&str, &str)> {
    let input = input.trim_start_matches('\u{feff}');
    if !input.starts_with(FENCE) {
        return Err(Error::FrontmatterMissingStartFence);
    }
    let rest = &input[FENCE.len()..];
    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if offset > 0 && line.trim_end() == FENCE {
            return Ok((&rest[..offset], &rest[offset + line.len()..]));
        }
        offset += line.len();
    }
    Err(Error::FrontmatterMissingEndFence)
}

fn parse_date(value: &str) -> Result<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .or_else(|_| {
            DateTime::parse_from_rfc3339(value).map(|dt| dt.naive_local().date())
        })
        .map_err(|err| Error::InvalidDate {
            value: value.to_owned(),
            err,
        })
}

// `tags` may be written as a list or, for single-tag posts, as a bare
// string.
fn deserialize_tags<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    struct TagsVisitor;

    impl<'de> Visitor<'de> for TagsVisitor {
        type Value = Vec<String>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a tag or a list of tags")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<Self::Value, E> {
            Ok(vec![v.to_owned()])
        }

        fn visit_unit<E: de::Error>(self) -> std::result::Result<Self::Value, E> {
            Ok(Vec::new())
        }

        fn visit_seq<A: SeqAccess<'de>>(
            self,
            mut seq: A,
        ) -> std::result::Result<Self::Value, A::Error> {
            let mut tags = Vec::with_capacity(seq.size_hint().unwrap_or(0));
            while let Some(tag) = seq.next_element::<String>()? {
                tags.push(tag);
            }
            Ok(tags)
        }
    }

    deserializer.deserialize_any(TagsVisitor)
}

/// Represents the result of a [`Document`]-parse operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error parsing a [`Document`].
#[derive(Debug)]
pub enum Error {
    /// Returned when a post source file is missing its starting frontmatter
    /// fence (`---`).
    FrontmatterMissingStartFence,

    /// Returned when the starting fence was found but the ending one was
    /// missing.
    FrontmatterMissingEndFence,

    /// Returned when there was an error parsing the frontmatter as YAML.
    DeserializeYaml(serde_yaml::Error),

    /// Returned when `createdAt` is not a `YYYY-MM-DD` date.
    InvalidDate {
        value: String,
        err: chrono::ParseError,
    },
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::FrontmatterMissingStartFence => {
                write!(f, "post must begin with `---`")
            }
            Error::FrontmatterMissingEndFence => {
                write!(f, "missing closing `---`")
            }
            Error::DeserializeYaml(err) => err.fmt(f),
            Error::InvalidDate { value, err } => {
                write!(f, "invalid `createdAt` value `{}`: {}", value, err)
            }
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::FrontmatterMissingStartFence => None,
            Error::FrontmatterMissingEndFence => None,
            Error::DeserializeYaml(err) => Some(err),
            Error::InvalidDate { err, .. } => Some(err),
        }
    }
}

impl From<serde_yaml::Error> for Error {
    /// Converts a [`serde_yaml::Error`] into an [`Error`]. It allows us to use
    /// the `?` operator for [`serde_yaml`] deserialization functions.
    fn from(err: serde_yaml::Error) -> Error {
        Error::DeserializeYaml(err)
    }
}
