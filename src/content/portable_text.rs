//! Portable Text document model
//!
//! A post body is an array of typed nodes. Text blocks (`_type: "block"`)
//! and images are modelled explicitly; any other node type is kept as raw
//! JSON so rendering can fall back to default markup instead of failing.

use serde::Deserialize;
use serde_json::Value;

use super::post::Reference;

/// A node in a rich-text document
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "Value")]
pub enum Node {
    /// Paragraph, heading, quote or list item
    Block(TextBlock),
    /// Embedded image
    Image(ImageNode),
    /// Node type without a dedicated rule
    Unknown { type_name: String, raw: Value },
}

impl Node {
    /// The node's `_type`
    pub fn type_name(&self) -> &str {
        match self {
            Node::Block(_) => "block",
            Node::Image(_) => "image",
            Node::Unknown { type_name, .. } => type_name,
        }
    }
}

impl TryFrom<Value> for Node {
    type Error = String;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let type_name = value
            .get("_type")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        match type_name.as_str() {
            "block" => serde_json::from_value::<RawBlock>(value)
                .map(|raw| Node::Block(raw.into()))
                .map_err(|e| format!("invalid block: {}", e)),
            "image" => serde_json::from_value::<ImageNode>(value)
                .map(Node::Image)
                .map_err(|e| format!("invalid image: {}", e)),
            _ => Ok(Node::Unknown {
                type_name,
                raw: value,
            }),
        }
    }
}

/// A block of inline text
#[derive(Debug, Clone, PartialEq)]
pub struct TextBlock {
    pub style: BlockStyle,
    pub list_item: Option<ListKind>,
    /// List nesting level, starting at 1
    pub level: usize,
    pub children: Vec<Span>,
    pub mark_defs: Vec<MarkDef>,
}

impl TextBlock {
    /// Paragraph with a single unmarked span
    pub fn paragraph(text: &str) -> Self {
        Self {
            style: BlockStyle::Normal,
            list_item: None,
            level: 1,
            children: vec![Span::plain(text)],
            mark_defs: Vec::new(),
        }
    }

    /// Look up an annotation by mark key
    pub fn mark_def(&self, key: &str) -> Option<&MarkDef> {
        self.mark_defs.iter().find(|d| d.key == key)
    }
}

/// Block style
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockStyle {
    Normal,
    Heading(u8),
    Blockquote,
    Other(String),
}

impl From<&str> for BlockStyle {
    fn from(style: &str) -> Self {
        match style {
            "normal" => BlockStyle::Normal,
            "blockquote" => BlockStyle::Blockquote,
            "h1" => BlockStyle::Heading(1),
            "h2" => BlockStyle::Heading(2),
            "h3" => BlockStyle::Heading(3),
            "h4" => BlockStyle::Heading(4),
            "h5" => BlockStyle::Heading(5),
            "h6" => BlockStyle::Heading(6),
            other => BlockStyle::Other(other.to_string()),
        }
    }
}

/// List item kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListKind {
    Bullet,
    Number,
    Other(String),
}

impl From<&str> for ListKind {
    fn from(kind: &str) -> Self {
        match kind {
            "bullet" => ListKind::Bullet,
            "number" => ListKind::Number,
            other => ListKind::Other(other.to_string()),
        }
    }
}

/// Inline run of text with marks
#[derive(Debug, Clone, PartialEq)]
pub struct Span {
    pub text: String,
    /// Decorator names (`strong`, `em`, ...) or annotation keys
    pub marks: Vec<String>,
}

impl Span {
    pub fn plain(text: &str) -> Self {
        Self {
            text: text.to_string(),
            marks: Vec::new(),
        }
    }

    pub fn marked(text: &str, marks: &[&str]) -> Self {
        Self {
            text: text.to_string(),
            marks: marks.iter().map(|m| m.to_string()).collect(),
        }
    }
}

/// Annotation definition referenced from span marks
#[derive(Debug, Clone, PartialEq)]
pub struct MarkDef {
    pub key: String,
    pub kind: Annotation,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Annotation {
    Link { href: String },
    Other(String),
}

/// Embedded image node
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ImageNode {
    pub asset: Reference,
    #[serde(default)]
    pub alt: Option<String>,
}

/// Wire shape of a block
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawBlock {
    #[serde(default)]
    style: Option<String>,
    #[serde(default)]
    list_item: Option<String>,
    #[serde(default)]
    level: Option<usize>,
    #[serde(default)]
    children: Vec<Value>,
    #[serde(default)]
    mark_defs: Vec<Value>,
}

impl From<RawBlock> for TextBlock {
    fn from(raw: RawBlock) -> Self {
        // Non-span children keep their text, if any, without marks
        let children = raw
            .children
            .iter()
            .map(|child| Span {
                text: child
                    .get("text")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
                marks: child
                    .get("marks")
                    .and_then(Value::as_array)
                    .map(|marks| {
                        marks
                            .iter()
                            .filter_map(Value::as_str)
                            .map(str::to_string)
                            .collect()
                    })
                    .unwrap_or_default(),
            })
            .collect();

        let mark_defs = raw
            .mark_defs
            .iter()
            .filter_map(|def| {
                let key = def.get("_key")?.as_str()?.to_string();
                let kind = match def.get("_type").and_then(Value::as_str) {
                    Some("link") => Annotation::Link {
                        href: def
                            .get("href")
                            .and_then(Value::as_str)
                            .unwrap_or_default()
                            .to_string(),
                    },
                    other => Annotation::Other(other.unwrap_or_default().to_string()),
                };
                Some(MarkDef { key, kind })
            })
            .collect();

        TextBlock {
            style: raw.style.as_deref().map(BlockStyle::from).unwrap_or(BlockStyle::Normal),
            list_item: raw.list_item.as_deref().map(ListKind::from),
            level: raw.level.unwrap_or(1).max(1),
            children,
            mark_defs,
        }
    }
}
