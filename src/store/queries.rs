//! Queries issued by the blog

use super::query::{Expr, Field, Query};

/// Every post's id and slug, for path enumeration
pub fn post_paths() -> Query {
    Query::all().filter(Expr::type_is("post")).project(vec![
        Field::plain("_id"),
        Field::nested("slug", vec![Field::plain("current")]),
    ])
}

/// One post by slug, with its author and approved comments joined in
pub fn post_by_slug(slug: &str) -> Query {
    Query::all()
        .filter(Expr::type_is("post"))
        .filter(Expr::attr("slug.current").equals(Expr::param("slug")))
        .first()
        .project(vec![
            Field::plain("_id"),
            Field::plain("_createdAt"),
            Field::plain("title"),
            Field::deref("author", vec![Field::plain("name"), Field::plain("image")]),
            Field::alias("comments", approved_comments()),
            Field::plain("description"),
            Field::plain("mainImage"),
            Field::plain("slug"),
            Field::plain("body"),
        ])
        .bind("slug", slug)
}

/// Listing for the index page
pub fn post_index() -> Query {
    Query::all().filter(Expr::type_is("post")).project(vec![
        Field::plain("_id"),
        Field::plain("title"),
        Field::deref("author", vec![Field::plain("name"), Field::plain("image")]),
        Field::plain("description"),
        Field::plain("mainImage"),
        Field::plain("slug"),
    ])
}

/// Comments on the enclosing post that have been approved
fn approved_comments() -> Query {
    Query::all()
        .filter(Expr::type_is("comment"))
        .filter(Expr::attr("post._ref").equals(Expr::parent("_id")))
        .filter(Expr::attr("approved").equals(Expr::Bool(true)))
}
