//! Typed GROQ query builder
//!
//! Queries are assembled from filters and projections and rendered to GROQ
//! text only when executed. Values supplied by callers are always bound as
//! `$parameters`, never spliced into the query text.

use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Filter expression
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Attribute path on the current document, e.g. `slug.current`
    Attr(String),
    /// Attribute path on the enclosing document, e.g. `^._id`
    Parent(String),
    /// Bound parameter, e.g. `$slug`
    Param(String),
    /// String literal
    Str(String),
    /// Boolean literal
    Bool(bool),
    Eq(Box<Expr>, Box<Expr>),
    And(Vec<Expr>),
}

impl Expr {
    pub fn attr(path: &str) -> Self {
        Expr::Attr(path.to_string())
    }

    pub fn parent(path: &str) -> Self {
        Expr::Parent(path.to_string())
    }

    pub fn param(name: &str) -> Self {
        Expr::Param(name.to_string())
    }

    pub fn string(value: &str) -> Self {
        Expr::Str(value.to_string())
    }

    /// `_type == "<name>"`
    pub fn type_is(name: &str) -> Self {
        Expr::attr("_type").equals(Expr::string(name))
    }

    pub fn equals(self, other: Expr) -> Self {
        Expr::Eq(Box::new(self), Box::new(other))
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Attr(path) => write!(f, "{}", path),
            Expr::Parent(path) => write!(f, "^.{}", path),
            Expr::Param(name) => write!(f, "${}", name),
            // JSON string syntax is valid GROQ string syntax
            Expr::Str(value) => write!(f, "{}", Value::String(value.clone())),
            Expr::Bool(value) => write!(f, "{}", value),
            Expr::Eq(lhs, rhs) => write!(f, "{} == {}", lhs, rhs),
            Expr::And(terms) => {
                for (i, term) in terms.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" && ")?;
                    }
                    write!(f, "{}", term)?;
                }
                Ok(())
            }
        }
    }
}

/// A projected field
#[derive(Debug, Clone, PartialEq)]
pub enum Field {
    /// `name`
    Plain(String),
    /// `name { a, b }`
    Nested(String, Vec<Field>),
    /// `name -> { a, b }`, following a reference
    Deref(String, Vec<Field>),
    /// `'name': <subquery>`
    Alias(String, Box<Query>),
}

impl Field {
    pub fn plain(name: &str) -> Self {
        Field::Plain(name.to_string())
    }

    pub fn nested(name: &str, fields: Vec<Field>) -> Self {
        Field::Nested(name.to_string(), fields)
    }

    pub fn deref(name: &str, fields: Vec<Field>) -> Self {
        Field::Deref(name.to_string(), fields)
    }

    pub fn alias(name: &str, query: Query) -> Self {
        Field::Alias(name.to_string(), Box::new(query))
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Plain(name) => write!(f, "{}", name),
            Field::Nested(name, fields) => write!(f, "{} {}", name, Projection(fields)),
            Field::Deref(name, fields) => write!(f, "{}->{}", name, Projection(fields)),
            Field::Alias(name, query) => write!(f, "'{}': {}", name, query),
        }
    }
}

struct Projection<'a>(&'a [Field]);

impl fmt::Display for Projection<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, field) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", field)?;
        }
        f.write_str("}")
    }
}

/// A document query: `*[filter][slice]{projection}`
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Query {
    filters: Vec<Expr>,
    first: bool,
    projection: Vec<Field>,
    params: BTreeMap<String, Value>,
}

impl Query {
    /// Query over every document in the dataset
    pub fn all() -> Self {
        Self::default()
    }

    /// Add a filter term (terms are joined with `&&`)
    pub fn filter(mut self, expr: Expr) -> Self {
        self.filters.push(expr);
        self
    }

    /// Take the first match only (`[0]`), yielding a document or null
    pub fn first(mut self) -> Self {
        self.first = true;
        self
    }

    /// Set the projection
    pub fn project(mut self, fields: Vec<Field>) -> Self {
        self.projection = fields;
        self
    }

    /// Bind a parameter value
    pub fn bind(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.params.insert(name.to_string(), value.into());
        self
    }

    /// Bound parameters
    pub fn params(&self) -> &BTreeMap<String, Value> {
        &self.params
    }

    /// Whether the query yields a single document
    pub fn is_single(&self) -> bool {
        self.first
    }

    /// Render the GROQ text
    pub fn to_groq(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("*")?;
        if !self.filters.is_empty() {
            write!(f, "[{}]", Expr::And(self.filters.clone()))?;
        }
        if self.first {
            f.write_str("[0]")?;
        }
        if !self.projection.is_empty() {
            write!(f, "{}", Projection(&self.projection))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_filter_and_projection() {
        let query = Query::all()
            .filter(Expr::type_is("post"))
            .project(vec![
                Field::plain("_id"),
                Field::nested("slug", vec![Field::plain("current")]),
            ]);
        assert_eq!(query.to_groq(), r#"*[_type == "post"]{_id, slug {current}}"#);
        assert!(query.params().is_empty());
    }

    #[test]
    fn test_render_subquery_and_deref() {
        let comments = Query::all()
            .filter(Expr::type_is("comment"))
            .filter(Expr::attr("post._ref").equals(Expr::parent("_id")))
            .filter(Expr::attr("approved").equals(Expr::Bool(true)));
        let query = Query::all()
            .filter(Expr::attr("slug.current").equals(Expr::param("slug")))
            .first()
            .project(vec![
                Field::deref("author", vec![Field::plain("name")]),
                Field::alias("comments", comments),
            ])
            .bind("slug", "hello");

        assert_eq!(
            query.to_groq(),
            concat!(
                r#"*[slug.current == $slug][0]{author->{name}, "#,
                r#"'comments': *[_type == "comment" && post._ref == ^._id && approved == true]}"#
            )
        );
        assert_eq!(query.params().get("slug"), Some(&Value::from("hello")));
        assert!(query.is_single());
    }

    #[test]
    fn test_string_literals_are_escaped() {
        let expr = Expr::attr("title").equals(Expr::string(r#"say "hi""#));
        assert_eq!(expr.to_string(), r#"title == "say \"hi\"""#);
    }
}
