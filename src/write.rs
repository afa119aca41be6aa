//! Renders listing and post pages through [`gtmpl`] templates. Rendering the
//! markdown itself is left to whatever consumes the output; post bodies are
//! passed to the template as raw markdown.

use gtmpl::{Context, Template, Value};
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::category::CategoryTree;
use crate::post::Post;
use crate::selection::Selection;

const LIST_TEMPLATE: &str = include_str!("../templates/list.tmpl");
const POST_TEMPLATE: &str = include_str!("../templates/post.tmpl");

/// Holds the parsed templates for the two page kinds.
pub struct Writer {
    list_template: Template,
    post_template: Template,
}

impl Writer {
    /// Parses the template files, falling back to the built-in templates for
    /// any that aren't given.
    pub fn new(list_template: Option<&Path>, post_template: Option<&Path>) -> Result<Writer> {
        Ok(Writer {
            list_template: parse_template(list_template, LIST_TEMPLATE)?,
            post_template: parse_template(post_template, POST_TEMPLATE)?,
        })
    }

    /// Renders a listing page. The template sees `posts` (the filtered
    /// posts), `tags` (the tag universe), `selection`, and `categories`.
    pub fn write_listing<W: io::Write>(
        &self,
        w: &mut W,
        posts: &[&Post],
        tags: &[String],
        selection: &Selection,
        categories: &CategoryTree,
    ) -> Result<()> {
        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert(
            "posts".to_owned(),
            Value::Array(posts.iter().map(|p| Value::from(*p)).collect()),
        );
        m.insert(
            "tags".to_owned(),
            Value::Array(tags.iter().map(|t| Value::String(t.clone())).collect()),
        );
        m.insert("selection".to_owned(), Value::from(selection));
        m.insert("categories".to_owned(), Value::from(categories));
        execute(&self.list_template, w, Value::Object(m))
    }

    /// Renders a single post page. The template sees the post as `post`.
    pub fn write_post<W: io::Write>(&self, w: &mut W, post: &Post) -> Result<()> {
        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("post".to_owned(), Value::from(post));
        execute(&self.post_template, w, Value::Object(m))
    }
}

fn execute<W: io::Write>(template: &Template, w: &mut W, value: Value) -> Result<()> {
    template.execute(w, &Context::from(value)?)?;
    Ok(())
}

fn parse_template(path: Option<&Path>, builtin: &str) -> Result<Template> {
    let contents = match path {
        Some(path) => fs::read_to_string(path).map_err(|err| Error::OpenTemplateFile {
            path: path.to_owned(),
            err,
        })?,
        None => builtin.to_owned(),
    };
    let mut template = Template::default();
    template.parse(&contents)?;
    Ok(template)
}

/// The result of a fallible page-writing operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error in a page-writing operation.
#[derive(Debug)]
pub enum Error {
    /// An error parsing or executing a template.
    Template(String),

    /// Returned for I/O problems while opening template files.
    OpenTemplateFile { path: PathBuf, err: io::Error },
}

impl From<String> for Error {
    /// Converts a template error message ([`String`]) into an [`Error`]. This
    /// allows us to use the `?` operator for fallible template operations.
    fn from(err: String) -> Error {
        Error::Template(err)
    }
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as presentable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Template(err) => err.fmt(f),
            Error::OpenTemplateFile { path, err } => {
                write!(f, "opening template file `{}`: {}", path.display(), err)
            }
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Template(_) => None,
            Error::OpenTemplateFile { err, .. } => Some(err),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::post::test::post;
    use crate::selection::Action;
    use std::io::Write;

    fn render_listing(writer: &Writer, posts: &[Post], selection: &Selection) -> Result<String> {
        let filtered = selection.filter(posts);
        let tags = crate::tag::extract_all_tags(posts);
        let mut out = Vec::new();
        writer.write_listing(&mut out, &filtered, &tags, selection, &CategoryTree::default())?;
        Ok(String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_builtin_listing() -> Result<()> {
        let writer = Writer::new(None, None)?;
        let mut posts = vec![
            post("Selector", "Frontend", "CSS", &["Layout", "Tailwind"]),
            post("Express-Middleware", "Backend", "Node.js", &["Express"]),
        ];
        posts[0].title = "CSS 선택자 완벽 가이드".to_owned();
        posts[0].desc = "CSS 선택자의 다양한 사용법".to_owned();

        let out = render_listing(&writer, &posts, &Selection::new())?;
        assert!(out.contains("CSS 선택자 완벽 가이드"));
        assert!(out.contains("/post/Selector"));
        assert!(out.contains("#Layout #Tailwind"));
        assert!(out.contains("CSS 선택자의 다양한 사용법"));
        assert!(out.contains("Backend/Node.js"));
        Ok(())
    }

    #[test]
    fn test_builtin_listing_empty() -> Result<()> {
        let writer = Writer::new(None, None)?;
        let posts = vec![post("Selector", "Frontend", "CSS", &["Layout"])];
        let selection = Selection::new().apply(
            &Action::ToggleCategory("DevOps".to_owned()),
            &CategoryTree::default(),
        );
        let out = render_listing(&writer, &posts, &selection)?;
        assert_eq!("게시글이 없습니다.", out.trim());
        Ok(())
    }

    #[test]
    fn test_builtin_post() -> Result<()> {
        let writer = Writer::new(None, None)?;
        let mut p = post("Docker-Basic", "DevOps", "Docker", &["Container", "Compose"]);
        p.content = "# Docker\n\n```bash\ndocker run\n```\n".to_owned();
        let mut out = Vec::new();
        writer.write_post(&mut out, &p)?;
        let out = String::from_utf8(out).unwrap();
        assert!(out.starts_with("Docker-Basic\n2024-03-20  DevOps/Docker #Container #Compose"));
        assert!(out.contains("```bash\ndocker run\n```"));
        Ok(())
    }

    #[test]
    fn test_custom_template() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let mut file = tempfile::NamedTempFile::new()?;
        file.write_all(b"{{range .posts}}{{.post_id}};{{end}}{{.selection.category}}")?;
        let writer = Writer::new(Some(file.path()), None)?;
        let posts = vec![
            post("A", "Frontend", "CSS", &["Layout"]),
            post("B", "Backend", "Node.js", &["Express"]),
        ];
        let selection = Selection::new().apply(
            &Action::ToggleCategory("Frontend".to_owned()),
            &CategoryTree::default(),
        );
        assert_eq!("A;Frontend", render_listing(&writer, &posts, &selection)?);
        Ok(())
    }

    #[test]
    fn test_missing_template_file() {
        assert!(matches!(
            Writer::new(Some(Path::new("./testdata/missing.tmpl")), None),
            Err(Error::OpenTemplateFile { .. })
        ));
    }
}
