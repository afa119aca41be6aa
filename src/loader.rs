//! Loads [`Post`]s from a [`Source`]. A listing load fetches every post in
//! the [`PostIndex`] on a pool of worker threads and drops (and logs) the
//! ones that fail, so one bad file never takes the listing down. A detail
//! load returns its error to the caller.
//!
//! [`Listing`] holds the result for a view and refuses results from loads
//! that were superseded while they were in flight.

use std::fmt;
use std::thread;

use crossbeam_channel::unbounded;
use serde::Deserialize;

use crate::category::CategoryTree;
use crate::parser::{self, parse_document};
use crate::post::{Post, PostDescriptor, PostIndex};
use crate::source::{self, Source};
use crate::tag::extract_all_tags;

/// What to do with a post whose category or subcategory isn't in the
/// category tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryPolicy {
    /// Load it anyway.
    Tolerate,

    /// Fail the load with [`Error::UnknownCategory`].
    Reject,
}

impl Default for CategoryPolicy {
    fn default() -> Self {
        CategoryPolicy::Tolerate
    }
}

/// Loads posts from `source`. `threads` below 2 loads on the calling thread.
pub struct Loader<'a, S: Source> {
    source: &'a S,
    categories: &'a CategoryTree,
    policy: CategoryPolicy,
    threads: usize,
}

impl<'a, S: Source> Loader<'a, S> {
    pub fn new(
        source: &'a S,
        categories: &'a CategoryTree,
        policy: CategoryPolicy,
        threads: usize,
    ) -> Loader<'a, S> {
        Loader {
            source,
            categories,
            policy,
            threads,
        }
    }

    /// Fetches and parses the post `descriptor` points at.
    pub fn load(&self, descriptor: &PostDescriptor) -> Result<Post> {
        if self.policy == CategoryPolicy::Reject
            && !self
                .categories
                .contains(&descriptor.category, &descriptor.subcategory)
        {
            return Err(Error::UnknownCategory(descriptor.clone()));
        }

        let relative_path = descriptor.relative_path();
        log::debug!("loading `{}`", self.source.describe(&relative_path));
        let contents = self.source.fetch(&relative_path)?;
        let document = parse_document(&contents).map_err(|err| Error::Parse {
            location: self.source.describe(&relative_path),
            err,
        })?;
        Ok(Post::from_document(descriptor, document))
    }

    /// Loads the post with id `id`, failing with [`Error::NotFound`] if the
    /// index has no such post.
    pub fn load_by_id(&self, index: &PostIndex, id: &str) -> Result<Post> {
        match index.find(id) {
            Some(descriptor) => self.load(descriptor),
            None => Err(Error::NotFound(format!("post `{}`", id))),
        }
    }

    /// Loads every post in `index`, in index order. Posts that fail to load
    /// are logged and left out.
    pub fn load_all(&self, index: &PostIndex) -> Vec<Post> {
        let results: Vec<Result<Post>> = if self.threads < 2 || index.len() < 2 {
            index.iter().map(|d| self.load(d)).collect()
        } else {
            self.load_parallel(index)
        };

        let mut posts = Vec::with_capacity(results.len());
        for (descriptor, result) in index.iter().zip(results) {
            match result {
                Ok(post) => posts.push(post),
                Err(err) => log::warn!("skipping post `{}`: {}", descriptor.id, err),
            }
        }
        log::info!("loaded {} of {} posts", posts.len(), index.len());
        posts
    }

    // Returns one result per descriptor, in index order regardless of which
    // worker finished first.
    fn load_parallel(&self, index: &PostIndex) -> Vec<Result<Post>> {
        let (jobs_tx, jobs_rx) = unbounded::<(usize, &PostDescriptor)>();
        let (results_tx, results_rx) = unbounded::<(usize, Result<Post>)>();

        for job in index.iter().enumerate() {
            // the receiver is still in scope
            let _ = jobs_tx.send(job);
        }
        drop(jobs_tx);

        let workers = self.threads.min(index.len());
        thread::scope(|scope| {
            for _ in 0..workers {
                let jobs_rx = jobs_rx.clone();
                let results_tx = results_tx.clone();
                scope.spawn(move || {
                    for (i, descriptor) in jobs_rx {
                        if results_tx.send((i, self.load(descriptor))).is_err() {
                            break;
                        }
                    }
                });
            }
        });
        drop(results_tx);

        let mut slots: Vec<Option<Result<Post>>> = (0..index.len()).map(|_| None).collect();
        for (i, result) in results_rx {
            slots[i] = Some(result);
        }
        slots
            .into_iter()
            .zip(index.iter())
            .map(|(slot, descriptor)| {
                slot.unwrap_or_else(|| {
                    Err(Error::NotFound(format!("post `{}` (worker exited)", descriptor.id)))
                })
            })
            .collect()
    }
}

/// Identifies one load started by [`Listing::begin`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Generation(u64);

/// The post collection and tag universe owned by one listing view. Each
/// reload begins a new generation; results from older generations are
/// discarded so a slow load can't overwrite a newer one.
#[derive(Debug, Default)]
pub struct Listing {
    generation: u64,
    posts: Vec<Post>,
    tags: Vec<String>,
}

impl Listing {
    pub fn new() -> Listing {
        Listing::default()
    }

    /// Starts a load and returns the ticket to commit it with.
    pub fn begin(&mut self) -> Generation {
        self.generation += 1;
        Generation(self.generation)
    }

    /// Replaces the collection with `posts` if `generation` is still the
    /// latest. Returns whether the posts were applied.
    pub fn commit(&mut self, generation: Generation, posts: Vec<Post>) -> bool {
        if generation.0 != self.generation {
            log::debug!(
                "discarding stale load {} (current is {})",
                generation.0,
                self.generation
            );
            return false;
        }
        self.tags = extract_all_tags(&posts);
        self.posts = posts;
        true
    }

    /// Clears the view and invalidates every outstanding load.
    pub fn reset(&mut self) {
        self.generation += 1;
        self.posts.clear();
        self.tags.clear();
    }

    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    /// Every tag used by the current posts, in first-seen order.
    pub fn tags(&self) -> &[String] {
        &self.tags
    }
}

/// The two kinds of load failure readers of the blog can tell apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Parse,
}

pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error loading a [`Post`].
#[derive(Debug)]
pub enum Error {
    /// Returned when the index has no such post.
    NotFound(String),

    /// Returned when the post file couldn't be retrieved.
    Fetch(source::Error),

    /// Returned when the post file's frontmatter is malformed.
    Parse {
        location: String,
        err: parser::Error,
    },

    /// Returned under [`CategoryPolicy::Reject`] for posts filed under a
    /// category or subcategory missing from the tree.
    UnknownCategory(PostDescriptor),
}

impl Error {
    /// Classifies the error. Retrieval failures of any sort count as
    /// [`ErrorKind::NotFound`]; bad content, including a file that isn't
    /// UTF-8 and an unknown category, counts as [`ErrorKind::Parse`].
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Fetch(source::Error::Encoding(_)) => ErrorKind::Parse,
            Error::NotFound(_) | Error::Fetch(_) => ErrorKind::NotFound,
            Error::Parse { .. } | Error::UnknownCategory(_) => ErrorKind::Parse,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::NotFound(what) => write!(f, "{} not found", what),
            Error::Fetch(err) => err.fmt(f),
            Error::Parse { location, err } => write!(f, "parsing `{}`: {}", location, err),
            Error::UnknownCategory(d) => write!(
                f,
                "post `{}` is filed under unknown category `{}/{}`",
                d.id, d.category, d.subcategory
            ),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::NotFound(_) => None,
            Error::Fetch(err) => Some(err),
            Error::Parse { err, .. } => Some(err),
            Error::UnknownCategory(_) => None,
        }
    }
}

impl From<source::Error> for Error {
    /// Converts a [`source::Error`] into an [`Error`]. This allows us to use
    /// the `?` operator on [`Source::fetch`].
    fn from(err: source::Error) -> Error {
        Error::Fetch(err)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::post::test::post;
    use crate::source::test::MemorySource;
    use crate::source::FsSource;
    use std::path::Path;

    fn descriptor(id: &str, category: &str, subcategory: &str) -> PostDescriptor {
        PostDescriptor {
            id: id.to_owned(),
            category: category.to_owned(),
            subcategory: subcategory.to_owned(),
        }
    }

    fn memory_fixture() -> (MemorySource, PostIndex) {
        let source = MemorySource::default()
            .with(
                "Frontend/CSS/A.md",
                "---\ntitle: A\ncreatedAt: 2024-03-19\ntags: [Layout]\n---\nbody A",
            )
            .with(
                "Backend/Node.js/B.md",
                "---\ntitle: B\ncreatedAt: 2024-03-17\ntags: [Express]\n---\nbody B",
            )
            .with("Backend/Node.js/Broken.md", "no frontmatter here");
        let index = PostIndex::new(vec![
            descriptor("A", "Frontend", "CSS"),
            descriptor("Gone", "Frontend", "CSS"),
            descriptor("Broken", "Backend", "Node.js"),
            descriptor("B", "Backend", "Node.js"),
        ]);
        (source, index)
    }

    fn ids(posts: &[Post]) -> Vec<&str> {
        posts.iter().map(|p| p.post_id.as_str()).collect()
    }

    #[test]
    fn test_load_all_skips_failures() {
        let (source, index) = memory_fixture();
        let tree = CategoryTree::default();
        for threads in &[1, 4] {
            let loader = Loader::new(&source, &tree, CategoryPolicy::Tolerate, *threads);
            let posts = loader.load_all(&index);
            assert_eq!(vec!["A", "B"], ids(&posts));
            assert_eq!("body B", posts[1].content);
        }
    }

    #[test]
    fn test_error_kinds() {
        let (source, index) = memory_fixture();
        let tree = CategoryTree::default();
        let loader = Loader::new(&source, &tree, CategoryPolicy::Tolerate, 1);
        assert_eq!(
            ErrorKind::NotFound,
            loader.load_by_id(&index, "Gone").unwrap_err().kind()
        );
        assert_eq!(
            ErrorKind::NotFound,
            loader.load_by_id(&index, "Unindexed").unwrap_err().kind()
        );
        assert_eq!(
            ErrorKind::Parse,
            loader.load_by_id(&index, "Broken").unwrap_err().kind()
        );
    }

    #[test]
    fn test_invalid_utf8_is_a_parse_error() -> std::io::Result<()> {
        let dir = tempfile::tempdir()?;
        std::fs::create_dir_all(dir.path().join("Frontend").join("CSS"))?;
        std::fs::write(
            dir.path().join("Frontend").join("CSS").join("Latin1.md"),
            b"---\ntitle: caf\xe9\ncreatedAt: 2024-01-01\n---\n",
        )?;
        let source = FsSource::new(dir.path());
        let tree = CategoryTree::default();
        let loader = Loader::new(&source, &tree, CategoryPolicy::Tolerate, 1);
        let err = loader
            .load(&descriptor("Latin1", "Frontend", "CSS"))
            .unwrap_err();
        assert_eq!(ErrorKind::Parse, err.kind());
        Ok(())
    }

    #[test]
    fn test_reject_unknown_category() -> serde_json::Result<()> {
        let (source, index) = memory_fixture();
        let tree: CategoryTree = serde_json::from_str(
            r#"{"Frontend": {"name": "FE", "subcategories": {"CSS": {"name": "CSS"}}}}"#,
        )?;

        let tolerant = Loader::new(&source, &tree, CategoryPolicy::Tolerate, 1);
        assert_eq!(vec!["A", "B"], ids(&tolerant.load_all(&index)));

        let strict = Loader::new(&source, &tree, CategoryPolicy::Reject, 1);
        assert_eq!(vec!["A"], ids(&strict.load_all(&index)));
        assert!(matches!(
            strict.load_by_id(&index, "B"),
            Err(Error::UnknownCategory(_))
        ));
        Ok(())
    }

    #[test]
    fn test_load_fixture_tree() -> crate::index::Result<()> {
        let index = PostIndex::from_file(Path::new("./testdata/data/posts.json"))?;
        let tree = CategoryTree::from_file(Path::new("./testdata/data/categories.json"))?;
        let source = FsSource::new("./testdata/public/posts");
        let loader = Loader::new(&source, &tree, CategoryPolicy::Tolerate, 3);
        let posts = loader.load_all(&index);

        // `Missing` is in the index but has no file.
        assert_eq!(
            vec!["Module", "Selector", "React-State", "Express-Middleware", "Docker-Basic"],
            ids(&posts)
        );
        let selector = &posts[1];
        assert_eq!("CSS 선택자 완벽 가이드", selector.title);
        assert_eq!(vec!["Layout", "Tailwind"], selector.tags);
        Ok(())
    }

    #[test]
    fn test_listing_commit_and_tags() {
        let mut listing = Listing::new();
        let generation = listing.begin();
        assert!(listing.commit(
            generation,
            vec![
                post("A", "Frontend", "CSS", &["Layout"]),
                post("B", "Backend", "Node.js", &["Express", "Layout"]),
            ],
        ));
        assert_eq!(2, listing.posts().len());
        assert_eq!(vec!["Layout", "Express"], listing.tags());
    }

    #[test]
    fn test_listing_discards_stale_generation() {
        let mut listing = Listing::new();
        let slow = listing.begin();
        let fast = listing.begin();
        assert!(listing.commit(fast, vec![post("New", "Frontend", "CSS", &[])]));
        assert!(!listing.commit(slow, vec![post("Old", "Frontend", "CSS", &[])]));
        assert_eq!(vec!["New"], ids(listing.posts()));
    }

    #[test]
    fn test_listing_reset_invalidates_outstanding_loads() {
        let mut listing = Listing::new();
        let pending = listing.begin();
        listing.reset();
        assert!(!listing.commit(pending, vec![post("A", "Frontend", "CSS", &["Layout"])]));
        assert!(listing.posts().is_empty());
        assert!(listing.tags().is_empty());
    }
}
