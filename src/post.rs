//! Defines the [`PostDescriptor`], [`PostIndex`], and [`Post`] types. A
//! descriptor locates a post's source file; a [`Post`] is the parsed result
//! held in memory by a listing or detail view.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::index;
use crate::parser::Document;

pub const MARKDOWN_EXTENSION: &str = ".md";

/// Identifies where a post's markdown lives:
/// `{category}/{subcategory}/{id}.md` under the posts root.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PostDescriptor {
    pub id: String,
    pub category: String,
    pub subcategory: String,
}

impl PostDescriptor {
    /// The source file location relative to the posts root. Always uses `/`
    /// so it can be joined onto a URL as well as a path.
    pub fn relative_path(&self) -> String {
        format!(
            "{}/{}/{}{}",
            self.category, self.subcategory, self.id, MARKDOWN_EXTENSION
        )
    }
}

/// The ordered list of every post on the site, as written by the build step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostIndex(Vec<PostDescriptor>);

impl PostIndex {
    pub fn new(descriptors: Vec<PostDescriptor>) -> PostIndex {
        PostIndex(descriptors)
    }

    /// Reads a post index artifact (a JSON array of descriptors).
    pub fn from_file(path: &Path) -> index::Result<PostIndex> {
        index::read_json(path, "post index")
    }

    /// Returns the first descriptor whose id is `id`.
    pub fn find(&self, id: &str) -> Option<&PostDescriptor> {
        self.0.iter().find(|d| d.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PostDescriptor> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> IntoIterator for &'a PostIndex {
    type Item = &'a PostDescriptor;
    type IntoIter = std::slice::Iter<'a, PostDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// A post loaded into memory: the frontmatter fields, the location fields
/// from its descriptor, and the markdown body.
#[derive(Debug, Clone, PartialEq)]
pub struct Post {
    pub post_id: String,
    pub title: String,
    pub desc: String,
    pub created_at: NaiveDate,
    pub category: String,
    pub subcategory: String,

    /// Tags in the order they are written in the frontmatter. Unique by
    /// convention only.
    pub tags: Vec<String>,

    /// The unrendered markdown body.
    pub content: String,
}

impl Post {
    /// Combines a descriptor with its parsed source file. The category and
    /// subcategory come from the file's location, not from the frontmatter.
    pub fn from_document(descriptor: &PostDescriptor, document: Document) -> Post {
        let Document { frontmatter, body } = document;
        Post {
            post_id: descriptor.id.clone(),
            title: frontmatter.title,
            desc: frontmatter.desc,
            created_at: frontmatter.created_at,
            category: descriptor.category.clone(),
            subcategory: descriptor.subcategory.clone(),
            tags: frontmatter.tags,
            content: body,
        }
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// The stable per-page key a discussion widget threads comments under.
    pub fn discussion_key(&self) -> String {
        crate::route::Route::Post(self.post_id.clone()).path()
    }
}
