//! The selection state machine. A reader's selection is a position in the
//! category tree ([`CategoryPath`]) plus a set of tags ([`TagSet`]); user
//! toggles are [`Action`]s applied through pure reducers that return the
//! next state.
//!
//! [`CategoryPath`] is a tagged pair, so a subcategory can't be selected
//! without its parent category, and subcategory toggles are checked against
//! the [`CategoryTree`] so the pair always names a real branch of it.

use crate::category::{CategoryTree, SubcategoryNode};
use crate::filter::filter_posts;
use crate::post::Post;
use crate::tag::TagSet;

/// A user toggle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    ToggleCategory(String),
    ToggleSubcategory(String),
    ToggleTag(String),
}

/// Where the reader is in the category tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryPath {
    /// No category filter.
    All,

    /// A category with no subcategory filter.
    Category(String),

    /// A category and one of its subcategories.
    Subcategory(String, String),
}

impl Default for CategoryPath {
    fn default() -> Self {
        CategoryPath::All
    }
}

impl CategoryPath {
    pub fn category(&self) -> Option<&str> {
        match self {
            CategoryPath::All => None,
            CategoryPath::Category(c) | CategoryPath::Subcategory(c, _) => Some(c),
        }
    }

    pub fn subcategory(&self) -> Option<&str> {
        match self {
            CategoryPath::Subcategory(_, s) => Some(s),
            _ => None,
        }
    }

    /// Selecting the active category clears it; selecting any other category
    /// moves there and drops the subcategory.
    pub fn toggle_category(self, key: &str) -> CategoryPath {
        match self.category() {
            Some(current) if current == key => CategoryPath::All,
            _ => CategoryPath::Category(key.to_owned()),
        }
    }

    /// Selecting the active subcategory clears it; selecting another
    /// subcategory of the current category moves there. Keys that `tree`
    /// doesn't list under the current category, and any key when no category
    /// is selected, leave the path unchanged.
    pub fn toggle_subcategory(self, key: &str, tree: &CategoryTree) -> CategoryPath {
        match self {
            CategoryPath::All => CategoryPath::All,
            CategoryPath::Subcategory(c, s) if s == key => CategoryPath::Category(c),
            CategoryPath::Category(c) | CategoryPath::Subcategory(c, _)
                if tree.contains(&c, key) =>
            {
                CategoryPath::Subcategory(c, key.to_owned())
            }
            path => {
                log::debug!("ignoring subcategory `{}` outside {:?}", key, path.category());
                path
            }
        }
    }

    /// Applies an [`Action`]. Tag toggles don't move the path.
    pub fn reduce(self, action: &Action, tree: &CategoryTree) -> CategoryPath {
        match action {
            Action::ToggleCategory(key) => self.toggle_category(key),
            Action::ToggleSubcategory(key) => self.toggle_subcategory(key, tree),
            Action::ToggleTag(_) => self,
        }
    }
}

/// The full selection for a listing view. The initial value selects
/// nothing, so every post is visible.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub path: CategoryPath,
    pub tags: TagSet,
}

impl Selection {
    pub fn new() -> Selection {
        Selection::default()
    }

    /// Returns the selection after `action`; `self` is left untouched.
    /// Subcategory toggles are checked against `tree`.
    pub fn apply(&self, action: &Action, tree: &CategoryTree) -> Selection {
        Selection {
            path: self.path.clone().reduce(action, tree),
            tags: match action {
                Action::ToggleTag(tag) => self.tags.toggle(tag),
                _ => self.tags.clone(),
            },
        }
    }

    /// Folds a sequence of actions over the initial selection.
    pub fn from_actions<'a, I>(actions: I, tree: &CategoryTree) -> Selection
    where
        I: IntoIterator<Item = &'a Action>,
    {
        actions
            .into_iter()
            .fold(Selection::new(), |selection, action| selection.apply(action, tree))
    }

    pub fn selected_category(&self) -> Option<&str> {
        self.path.category()
    }

    pub fn selected_subcategory(&self) -> Option<&str> {
        self.path.subcategory()
    }

    pub fn selected_tags(&self) -> &TagSet {
        &self.tags
    }

    /// The subcategories a reader can pick next: those of the selected
    /// category, or none when no category is selected or it isn't in `tree`.
    pub fn subcategory_choices<'t>(&self, tree: &'t CategoryTree) -> &'t [SubcategoryNode] {
        self.selected_category()
            .and_then(|key| tree.get(key))
            .map(|node| node.subcategories.as_slice())
            .unwrap_or(&[])
    }

    /// Filters `posts` by this selection.
    pub fn filter<'a>(&self, posts: &'a [Post]) -> Vec<&'a Post> {
        filter_posts(
            posts,
            self.selected_category(),
            self.selected_subcategory(),
            &self.tags,
        )
    }
}
