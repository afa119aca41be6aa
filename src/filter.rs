//! The filter engine. A post is kept when it passes all three dimensions
//! (category, subcategory, tags). Within the tag dimension a post only needs
//! one of the selected tags.
//!
//! Each call is a linear scan over the collection.

use crate::post::Post;
use crate::tag::TagSet;

/// Returns the posts matching every active filter, in their original order.
/// `None` and an empty `tags` set each disable their dimension.
pub fn filter_posts<'a>(
    posts: &'a [Post],
    category: Option<&str>,
    subcategory: Option<&str>,
    tags: &TagSet,
) -> Vec<&'a Post> {
    posts
        .iter()
        .filter(|post| matches(post, category, subcategory, tags))
        .collect()
}

/// The per-post predicate behind [`filter_posts`].
pub fn matches(
    post: &Post,
    category: Option<&str>,
    subcategory: Option<&str>,
    tags: &TagSet,
) -> bool {
    if let Some(category) = category {
        if post.category != category {
            return false;
        }
    }
    if let Some(subcategory) = subcategory {
        if post.subcategory != subcategory {
            return false;
        }
    }
    tags.is_empty() || tags.intersects(&post.tags)
}
