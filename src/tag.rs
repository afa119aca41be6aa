//! Tag handling: deriving the tag universe from a post collection
//! ([`extract_all_tags`]) and the [`TagSet`] of tags a reader has selected.

use std::collections::{BTreeSet, HashSet};

use crate::post::Post;

/// Returns every tag used by `posts`, without duplicates, in the order each
/// tag is first seen (posts in order, then tags in order within a post).
pub fn extract_all_tags<'a, I>(posts: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a Post>,
{
    let mut seen: HashSet<&str> = HashSet::new();
    let mut tags = Vec::new();
    for post in posts {
        for tag in &post.tags {
            if seen.insert(tag.as_str()) {
                tags.push(tag.clone());
            }
        }
    }
    tags
}

/// The set of tags currently selected. Values are never mutated in place:
/// [`TagSet::toggle`] returns the next set and leaves `self` alone.
///
/// Iteration order is sorted, but nothing relies on it; the set is only used
/// for membership tests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagSet(BTreeSet<String>);

impl TagSet {
    pub fn new() -> TagSet {
        TagSet::default()
    }

    /// Returns a copy of the set with `tag` added if it was absent or removed
    /// if it was present.
    pub fn toggle(&self, tag: &str) -> TagSet {
        let mut next = self.0.clone();
        if !next.remove(tag) {
            next.insert(tag.to_owned());
        }
        TagSet(next)
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.0.contains(tag)
    }

    /// Reports whether any of `tags` is in the set.
    pub fn intersects<S: AsRef<str>>(&self, tags: &[S]) -> bool {
        tags.iter().any(|t| self.0.contains(t.as_ref()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>> std::iter::FromIterator<S> for TagSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> TagSet {
        TagSet(iter.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::post::test::post;

    #[test]
    fn test_extract_all_tags_first_seen_order() {
        let posts = vec![
            post("A", "Frontend", "CSS", &["Layout", "Tailwind"]),
            post("B", "Backend", "Node.js", &["Express", "Layout"]),
            post("C", "DevOps", "Docker", &[]),
            post("D", "DevOps", "Docker", &["Compose", "Express"]),
        ];
        assert_eq!(
            vec!["Layout", "Tailwind", "Express", "Compose"],
            extract_all_tags(&posts)
        );
    }

    #[test]
    fn test_extract_all_tags_empty() {
        let posts: Vec<Post> = Vec::new();
        assert!(extract_all_tags(&posts).is_empty());
    }

    #[test]
    fn test_extract_all_tags_repeated_collection() {
        let posts = vec![
            post("A", "Frontend", "CSS", &["Layout"]),
            post("B", "Backend", "Node.js", &["Express", "NestJS"]),
        ];
        let doubled: Vec<Post> = posts.iter().chain(posts.iter()).cloned().collect();
        assert_eq!(extract_all_tags(&posts), extract_all_tags(&doubled));
    }

    #[test]
    fn test_extract_all_tags_duplicate_within_post() {
        let posts = vec![post("A", "Frontend", "CSS", &["Layout", "Layout"])];
        assert_eq!(vec!["Layout"], extract_all_tags(&posts));
    }

    #[test]
    fn test_toggle_returns_new_set() {
        let empty = TagSet::new();
        let one = empty.toggle("Layout");
        assert!(empty.is_empty());
        assert!(one.contains("Layout"));

        let two = one.toggle("Express");
        assert_eq!(2, two.len());
        assert_eq!(1, one.len());

        let back = two.toggle("Layout");
        assert!(!back.contains("Layout"));
        assert!(back.contains("Express"));
    }

    #[test]
    fn test_intersects() {
        let set: TagSet = vec!["Layout", "Express"].into_iter().collect();
        assert!(set.intersects(&["Hooks", "Express"]));
        assert!(!set.intersects(&["Hooks"]));
        assert!(!set.intersects::<&str>(&[]));
    }
}
