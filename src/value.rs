//! Conversions from the blog's types into template [`Value`]s.

use gtmpl_value::Value;
use std::collections::HashMap;

use crate::category::CategoryTree;
use crate::post::Post;
use crate::selection::Selection;

fn strings<'a, I: IntoIterator<Item = &'a str>>(items: I) -> Value {
    Value::Array(items.into_iter().map(|s| Value::String(s.to_owned())).collect())
}

fn option(value: Option<&str>) -> Value {
    match value {
        Some(s) => Value::String(s.to_owned()),
        None => Value::Nil,
    }
}

impl From<&Post> for Value {
    /// Converts a [`Post`] into an object with one field per [`Post`] field
    /// plus `url`, the post's route. `created_at` is formatted `YYYY-MM-DD`.
    fn from(post: &Post) -> Value {
        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("post_id".to_owned(), Value::String(post.post_id.clone()));
        m.insert("title".to_owned(), Value::String(post.title.clone()));
        m.insert("desc".to_owned(), Value::String(post.desc.clone()));
        m.insert(
            "created_at".to_owned(),
            Value::String(post.created_at.format("%Y-%m-%d").to_string()),
        );
        m.insert("category".to_owned(), Value::String(post.category.clone()));
        m.insert("subcategory".to_owned(), Value::String(post.subcategory.clone()));
        m.insert("tags".to_owned(), strings(post.tags.iter().map(String::as_str)));
        m.insert("content".to_owned(), Value::String(post.content.clone()));
        m.insert("url".to_owned(), Value::String(post.discussion_key()));
        Value::Object(m)
    }
}

impl From<&Selection> for Value {
    /// `category` and `subcategory` are nil when unselected.
    fn from(selection: &Selection) -> Value {
        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("category".to_owned(), option(selection.selected_category()));
        m.insert("subcategory".to_owned(), option(selection.selected_subcategory()));
        m.insert("tags".to_owned(), strings(selection.tags.iter()));
        Value::Object(m)
    }
}

impl From<&CategoryTree> for Value {
    fn from(tree: &CategoryTree) -> Value {
        Value::Array(
            tree.iter()
                .map(|c| {
                    let mut m: HashMap<String, Value> = HashMap::new();
                    m.insert("key".to_owned(), Value::String(c.key.clone()));
                    m.insert("name".to_owned(), Value::String(c.name.clone()));
                    m.insert(
                        "subcategories".to_owned(),
                        Value::Array(
                            c.subcategories
                                .iter()
                                .map(|s| {
                                    let mut m: HashMap<String, Value> = HashMap::new();
                                    m.insert("key".to_owned(), Value::String(s.key.clone()));
                                    m.insert("name".to_owned(), Value::String(s.name.clone()));
                                    Value::Object(m)
                                })
                                .collect(),
                        ),
                    );
                    Value::Object(m)
                })
                .collect(),
        )
    }
}
