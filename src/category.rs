//! Defines the [`CategoryTree`]: the two-level category → subcategory
//! hierarchy the blog is organized by. The tree is loaded once from the
//! `categories.json` artifact and never changes afterwards.
//!
//! The artifact is a JSON object keyed by category:
//!
//! ```json
//! {
//!   "Frontend": {
//!     "name": "프론트엔드",
//!     "subcategories": { "CSS": { "name": "CSS" } }
//!   }
//! }
//! ```
//!
//! Key order in the file is the display order, so it's preserved here.

use serde::de::{Deserializer, MapAccess, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;
use std::path::Path;

use crate::index;

#[derive(Debug, Clone, PartialEq)]
pub struct SubcategoryNode {
    pub key: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryNode {
    pub key: String,
    pub name: String,
    pub subcategories: Vec<SubcategoryNode>,
}

impl CategoryNode {
    pub fn subcategory(&self, key: &str) -> Option<&SubcategoryNode> {
        self.subcategories.iter().find(|s| s.key == key)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryTree(Vec<CategoryNode>);

impl CategoryTree {
    pub fn new(categories: Vec<CategoryNode>) -> CategoryTree {
        CategoryTree(categories)
    }

    /// Reads a category tree artifact.
    pub fn from_file(path: &Path) -> index::Result<CategoryTree> {
        index::read_json(path, "category tree")
    }

    pub fn get(&self, key: &str) -> Option<&CategoryNode> {
        self.0.iter().find(|c| c.key == key)
    }

    /// Reports whether `subcategory` is listed under `category`.
    pub fn contains(&self, category: &str, subcategory: &str) -> bool {
        self.get(category)
            .map_or(false, |c| c.subcategory(subcategory).is_some())
    }

    pub fn iter(&self) -> impl Iterator<Item = &CategoryNode> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Deserialize, Serialize)]
struct NamedEntry {
    name: String,

    #[serde(default)]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    #[serde(deserialize_with = "deserialize_ordered")]
    #[serde(serialize_with = "serialize_ordered")]
    subcategories: Vec<(String, Leaf)>,
}

#[derive(Deserialize, Serialize)]
struct Leaf {
    name: String,
}

// Deserializes a JSON object into its entries, in file order.
fn deserialize_ordered<'de, D, T>(deserializer: D) -> Result<Vec<(String, T)>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    struct OrderedVisitor<T>(PhantomData<T>);

    impl<'de, T: Deserialize<'de>> Visitor<'de> for OrderedVisitor<T> {
        type Value = Vec<(String, T)>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a map keyed by category")
        }

        fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
            let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some(entry) = map.next_entry::<String, T>()? {
                entries.push(entry);
            }
            Ok(entries)
        }
    }

    deserializer.deserialize_map(OrderedVisitor(PhantomData))
}

#[allow(clippy::ptr_arg)]
fn serialize_ordered<S, T>(entries: &Vec<(String, T)>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    T: Serialize,
{
    let mut map = serializer.serialize_map(Some(entries.len()))?;
    for (key, value) in entries {
        map.serialize_entry(key, value)?;
    }
    map.end()
}

impl<'de> Deserialize<'de> for CategoryTree {
    fn deserialize<D>(deserializer: D) -> Result<CategoryTree, D::Error>
    where
        D: Deserializer<'de>,
    {
        let entries: Vec<(String, NamedEntry)> = deserialize_ordered(deserializer)?;
        Ok(CategoryTree(
            entries
                .into_iter()
                .map(|(key, entry)| CategoryNode {
                    key,
                    name: entry.name,
                    subcategories: entry
                        .subcategories
                        .into_iter()
                        .map(|(key, leaf)| SubcategoryNode {
                            key,
                            name: leaf.name,
                        })
                        .collect(),
                })
                .collect(),
        ))
    }
}

impl Serialize for CategoryTree {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let entries: Vec<(String, NamedEntry)> = self
            .0
            .iter()
            .map(|c| {
                (
                    c.key.clone(),
                    NamedEntry {
                        name: c.name.clone(),
                        subcategories: c
                            .subcategories
                            .iter()
                            .map(|s| (s.key.clone(), Leaf { name: s.name.clone() }))
                            .collect(),
                    },
                )
            })
            .collect();
        serialize_ordered(&entries, serializer)
    }
}
