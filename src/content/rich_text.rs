//! Rich-text rendering: Portable Text nodes to HTML
//!
//! Each node is dispatched on its variant. Headings, list items and links
//! have dedicated rules; everything else goes through the default arm so an
//! undeclared node type or style never fails the page.

use std::fmt::Write;

use super::portable_text::{Annotation, BlockStyle, ImageNode, ListKind, Node, Span, TextBlock};
use crate::config::SanityConfig;
use crate::helpers::{asset_url, html_escape};

/// Renders post bodies with the site's serializers
#[derive(Debug, Clone)]
pub struct RichTextRenderer {
    /// Project and dataset used to resolve embedded asset references
    sanity: SanityConfig,
}

impl RichTextRenderer {
    /// Create a renderer for the given project and dataset
    pub fn new(sanity: &SanityConfig) -> Self {
        Self {
            sanity: sanity.clone(),
        }
    }

    /// Render a whole document
    pub fn render(&self, nodes: &[Node]) -> String {
        let mut out = String::new();
        let mut lists = ListStack::default();

        for node in nodes {
            match node {
                Node::Block(block) if block.list_item.is_some() => {
                    let kind = block.list_item.clone().unwrap_or(ListKind::Bullet);
                    lists.open_item(&mut out, &kind, block.level);
                    self.render_list_item(&mut out, block);
                }
                _ => {
                    lists.close_all(&mut out);
                    self.render_node(&mut out, node);
                }
            }
        }
        lists.close_all(&mut out);

        out
    }

    fn render_node(&self, out: &mut String, node: &Node) {
        match node {
            Node::Block(block) => self.render_block(out, block),
            Node::Image(image) => self.render_image(out, image),
            Node::Unknown { raw, .. } => {
                let type_name = node.type_name();
                tracing::debug!("No serializer for node type {:?}, using default", type_name);
                let text = raw
                    .get("children")
                    .and_then(|c| c.as_array())
                    .map(|children| {
                        children
                            .iter()
                            .filter_map(|c| c.get("text").and_then(|t| t.as_str()))
                            .collect::<String>()
                    })
                    .unwrap_or_default();
                let _ = write!(
                    out,
                    r#"<div data-type="{}">{}</div>"#,
                    html_escape(type_name),
                    escape_text(&text)
                );
            }
        }
    }

    fn render_block(&self, out: &mut String, block: &TextBlock) {
        let inner = render_spans(block);
        match &block.style {
            BlockStyle::Heading(1) => {
                let _ = write!(out, r#"<h1 class="my-5 text-2xl font-bold">{}</h1>"#, inner);
            }
            // Level two is emitted with the level-one tag
            BlockStyle::Heading(2) => {
                let _ = write!(out, r#"<h1 class="my-5 text-xl font-bold">{}</h1>"#, inner);
            }
            BlockStyle::Heading(level) => {
                let _ = write!(out, "<h{level}>{}</h{level}>", inner);
            }
            BlockStyle::Blockquote => {
                let _ = write!(out, "<blockquote>{}</blockquote>", inner);
            }
            BlockStyle::Normal | BlockStyle::Other(_) => {
                let _ = write!(out, "<p>{}</p>", inner);
            }
        }
    }

    fn render_list_item(&self, out: &mut String, block: &TextBlock) {
        let _ = write!(out, r#"<li class="ml-4 list-disc">{}"#, render_spans(block));
    }

    fn render_image(&self, out: &mut String, image: &ImageNode) {
        match asset_url(&self.sanity, &image.asset.reference) {
            Some(src) => {
                let alt = image.alt.as_deref().unwrap_or("");
                let _ = write!(
                    out,
                    r#"<figure><img src="{}" alt="{}"/></figure>"#,
                    html_escape(&src),
                    html_escape(alt)
                );
            }
            None => {
                tracing::debug!("Skipping image with unresolved asset {:?}", image.asset.reference);
            }
        }
    }
}

/// Open lists, innermost last. Each frame tracks whether its `<li>` is open.
#[derive(Default)]
struct ListStack {
    frames: Vec<(ListKind, bool)>,
}

impl ListStack {
    fn open_item(&mut self, out: &mut String, kind: &ListKind, level: usize) {
        // Nest at most one level deeper than the current list
        let level = level.clamp(1, self.frames.len() + 1);

        while self.frames.len() > level {
            self.close_top(out);
        }

        if self.frames.len() == level {
            let same_kind = self.frames.last().map(|(k, _)| k == kind).unwrap_or(false);
            if same_kind {
                if let Some((_, li_open)) = self.frames.last_mut() {
                    if *li_open {
                        out.push_str("</li>");
                        *li_open = false;
                    }
                }
            } else {
                self.close_top(out);
            }
        }

        while self.frames.len() < level {
            out.push_str(list_open_tag(kind));
            self.frames.push((kind.clone(), false));
        }

        if let Some((_, li_open)) = self.frames.last_mut() {
            *li_open = true;
        }
    }

    fn close_top(&mut self, out: &mut String) {
        if let Some((kind, li_open)) = self.frames.pop() {
            if li_open {
                out.push_str("</li>");
            }
            out.push_str(list_close_tag(&kind));
        }
    }

    fn close_all(&mut self, out: &mut String) {
        while !self.frames.is_empty() {
            self.close_top(out);
        }
    }
}

fn list_open_tag(kind: &ListKind) -> &'static str {
    match kind {
        ListKind::Number => "<ol>",
        ListKind::Bullet | ListKind::Other(_) => "<ul>",
    }
}

fn list_close_tag(kind: &ListKind) -> &'static str {
    match kind {
        ListKind::Number => "</ol>",
        ListKind::Bullet | ListKind::Other(_) => "</ul>",
    }
}

/// Render a block's spans, nesting marks so adjacent spans sharing a mark
/// end up inside one element.
fn render_spans(block: &TextBlock) -> String {
    let mut out = String::new();
    let mut open: Vec<&str> = Vec::new();

    for (i, span) in block.children.iter().enumerate() {
        // Close from the innermost open mark down to the first one this span drops
        if let Some(pos) = open.iter().position(|m| !span.marks.iter().any(|s| s == m)) {
            while open.len() > pos {
                if let Some(mark) = open.pop() {
                    out.push_str(&close_mark(block, mark));
                }
            }
        }

        // Marks that run furthest into the following spans open outermost
        let mut new_marks: Vec<&str> = Vec::new();
        for mark in &span.marks {
            if !open.contains(&mark.as_str()) && !new_marks.contains(&mark.as_str()) {
                new_marks.push(mark.as_str());
            }
        }
        new_marks.sort_by_key(|m| std::cmp::Reverse(mark_run(&block.children[i..], m)));

        for mark in new_marks {
            out.push_str(&open_mark(block, mark));
            open.push(mark);
        }

        out.push_str(&escape_text(&span.text));
    }

    while let Some(mark) = open.pop() {
        out.push_str(&close_mark(block, mark));
    }

    out
}

/// Number of consecutive spans, from the first, that carry `mark`
fn mark_run(spans: &[Span], mark: &str) -> usize {
    spans
        .iter()
        .take_while(|span| span.marks.iter().any(|m| m == mark))
        .count()
}

fn open_mark(block: &TextBlock, mark: &str) -> String {
    match mark {
        "strong" => "<strong>".to_string(),
        "em" => "<em>".to_string(),
        "code" => "<code>".to_string(),
        "underline" => r#"<span style="text-decoration:underline">"#.to_string(),
        "strike-through" => "<del>".to_string(),
        key => match block.mark_def(key).map(|d| &d.kind) {
            Some(Annotation::Link { href }) => format!(
                r#"<a href="{}" class="text-blue-500 hover:underline">"#,
                html_escape(href)
            ),
            _ => String::new(),
        },
    }
}

fn close_mark(block: &TextBlock, mark: &str) -> String {
    match mark {
        "strong" => "</strong>".to_string(),
        "em" => "</em>".to_string(),
        "code" => "</code>".to_string(),
        "underline" => "</span>".to_string(),
        "strike-through" => "</del>".to_string(),
        // Link text is always followed by a space inside the anchor
        key => match block.mark_def(key).map(|d| &d.kind) {
            Some(Annotation::Link { .. }) => " </a>".to_string(),
            _ => String::new(),
        },
    }
}

fn escape_text(text: &str) -> String {
    html_escape(text).replace('\n', "<br/>")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::portable_text::MarkDef;
    use serde_json::json;

    fn renderer() -> RichTextRenderer {
        RichTextRenderer::new(&SanityConfig {
            project_id: "p1".to_string(),
            dataset: "production".to_string(),
            ..Default::default()
        })
    }

    fn heading(level: u8, text: &str) -> Node {
        Node::Block(TextBlock {
            style: BlockStyle::Heading(level),
            ..TextBlock::paragraph(text)
        })
    }

    fn list_item(kind: ListKind, level: usize, text: &str) -> Node {
        Node::Block(TextBlock {
            list_item: Some(kind),
            level,
            ..TextBlock::paragraph(text)
        })
    }

    fn link_block(spans: Vec<Span>) -> Node {
        Node::Block(TextBlock {
            children: spans,
            mark_defs: vec![MarkDef {
                key: "l1".to_string(),
                kind: Annotation::Link {
                    href: "https://example.com".to_string(),
                },
            }],
            ..TextBlock::paragraph("")
        })
    }

    #[test]
    fn test_h1_and_h2_share_the_h1_tag() {
        let html = renderer().render(&[heading(2, "Second"), heading(1, "First")]);
        assert_eq!(
            html,
            concat!(
                r#"<h1 class="my-5 text-xl font-bold">Second</h1>"#,
                r#"<h1 class="my-5 text-2xl font-bold">First</h1>"#
            )
        );
        assert!(!html.contains("<h2"));
    }

    #[test]
    fn test_link_has_trailing_space() {
        let html = renderer().render(&[link_block(vec![
            Span::plain("Read "),
            Span::marked("the docs", &["l1"]),
            Span::plain("."),
        ])]);
        assert_eq!(
            html,
            r#"<p>Read <a href="https://example.com" class="text-blue-500 hover:underline">the docs </a>.</p>"#
        );
    }

    #[test]
    fn test_adjacent_link_spans_share_one_anchor() {
        let html = renderer().render(&[link_block(vec![
            Span::marked("bold", &["l1", "strong"]),
            Span::marked(" plain", &["l1"]),
        ])]);
        assert_eq!(html.matches("<a ").count(), 1);
        assert!(html.contains("<strong>bold</strong> plain </a>"));
    }

    #[test]
    fn test_link_stays_outermost_when_listed_after_decorator() {
        let html = renderer().render(&[link_block(vec![
            Span::marked("bold", &["strong", "l1"]),
            Span::marked(" plain", &["l1"]),
        ])]);
        assert_eq!(
            html,
            r#"<p><a href="https://example.com" class="text-blue-500 hover:underline"><strong>bold</strong> plain </a></p>"#
        );
    }

    #[test]
    fn test_repeated_mark_opens_once() {
        let html = renderer().render(&[Node::Block(TextBlock {
            children: vec![Span::marked("x", &["em", "em"])],
            ..TextBlock::paragraph("")
        })]);
        assert_eq!(html, "<p><em>x</em></p>");
    }

    #[test]
    fn test_list_items_are_grouped() {
        let html = renderer().render(&[
            list_item(ListKind::Bullet, 1, "one"),
            list_item(ListKind::Bullet, 1, "two"),
            Node::Block(TextBlock::paragraph("after")),
        ]);
        assert_eq!(
            html,
            concat!(
                r#"<ul><li class="ml-4 list-disc">one</li>"#,
                r#"<li class="ml-4 list-disc">two</li></ul>"#,
                "<p>after</p>"
            )
        );
    }

    #[test]
    fn test_nested_and_numbered_lists() {
        let html = renderer().render(&[
            list_item(ListKind::Bullet, 1, "outer"),
            list_item(ListKind::Number, 2, "inner"),
            list_item(ListKind::Bullet, 1, "back"),
        ]);
        assert_eq!(
            html,
            concat!(
                r#"<ul><li class="ml-4 list-disc">outer"#,
                r#"<ol><li class="ml-4 list-disc">inner</li></ol></li>"#,
                r#"<li class="ml-4 list-disc">back</li></ul>"#
            )
        );
    }

    #[test]
    fn test_list_level_jump_nests_one_level() {
        let html = renderer().render(&[
            list_item(ListKind::Bullet, 1, "top"),
            list_item(ListKind::Bullet, 3, "deep"),
            list_item(ListKind::Bullet, 1_000_000_000, "huge"),
        ]);
        assert_eq!(
            html,
            concat!(
                r#"<ul><li class="ml-4 list-disc">top"#,
                r#"<ul><li class="ml-4 list-disc">deep"#,
                r#"<ul><li class="ml-4 list-disc">huge</li></ul></li></ul></li></ul>"#
            )
        );
    }

    #[test]
    fn test_unknown_node_falls_back() {
        let nodes: Vec<Node> = serde_json::from_value(json!([
            { "_type": "codeSnippet", "code": "fn main() {}" },
            { "_type": "callout", "children": [{ "_type": "span", "text": "Heads <up>" }] }
        ]))
        .unwrap();

        let html = renderer().render(&nodes);
        assert_eq!(
            html,
            r#"<div data-type="codeSnippet"></div><div data-type="callout">Heads &lt;up&gt;</div>"#
        );
    }

    #[test]
    fn test_default_styles_and_decorators() {
        let nodes: Vec<Node> = serde_json::from_value(json!([
            { "_type": "block", "style": "h3", "children": [{ "_type": "span", "text": "Sub" }] },
            { "_type": "block", "style": "blockquote", "children": [{ "_type": "span", "text": "Quote" }] },
            { "_type": "block", "style": "fancy", "children": [
                { "_type": "span", "text": "a", "marks": ["em"] },
                { "_type": "span", "text": "b", "marks": ["highlight"] },
                { "_type": "span", "text": "c\nd", "marks": ["code"] }
            ] }
        ]))
        .unwrap();

        let html = renderer().render(&nodes);
        assert_eq!(
            html,
            "<h3>Sub</h3><blockquote>Quote</blockquote><p><em>a</em>b<code>c<br/>d</code></p>"
        );
    }

    #[test]
    fn test_image_node() {
        let nodes: Vec<Node> = serde_json::from_value(json!([
            { "_type": "image", "asset": { "_ref": "image-abc-640x480-png" }, "alt": "A cat" },
            { "_type": "image", "asset": { "_ref": "not-an-image" } }
        ]))
        .unwrap();

        let html = renderer().render(&nodes);
        assert_eq!(
            html,
            r#"<figure><img src="https://cdn.sanity.io/images/p1/production/abc-640x480.png" alt="A cat"/></figure>"#
        );
    }

    #[test]
    fn test_render_is_deterministic() {
        let nodes = vec![heading(1, "T"), Node::Block(TextBlock::paragraph("x & y"))];
        let r = renderer();
        assert_eq!(r.render(&nodes), r.render(&nodes));
        assert!(r.render(&nodes).contains("<p>x &amp; y</p>"));
    }
}
