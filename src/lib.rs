//! The library code for `heonlog`, the content core of a markdown blog. The
//! blog's posts live under `public/posts/<Category>/<Subcategory>/<id>.md`
//! and are described by two build-time artifacts: the post index
//! ([`crate::post::PostIndex`]) and the category tree
//! ([`crate::category::CategoryTree`]).
//!
//! A listing view goes through three steps:
//!
//! 1. Loading every post in the index from a [`crate::source::Source`]
//!    ([`crate::loader`]), splitting each file into frontmatter and body
//!    ([`crate::parser`])
//! 2. Deriving the tag universe ([`crate::tag`])
//! 3. Filtering the collection by the reader's current selection
//!    ([`crate::selection`], [`crate::filter`])
//!
//! Posts that fail to load are logged and left out of the listing. Selection
//! changes are pure: each toggle returns a new [`crate::selection::Selection`]
//! and the filter is re-run over the unchanged collection.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod category;
pub mod config;
pub mod filter;
pub mod index;
pub mod loader;
pub mod parser;
pub mod post;
pub mod route;
pub mod selection;
pub mod source;
pub mod tag;
pub mod value;
pub mod write;
