/// Inline text spans with formatting
#[derive(Debug, Clone, PartialEq)]
pub enum Span {
    Text(String),
    Bold(Vec<Span>),
    Italic(Vec<Span>),
    Strikethrough(Vec<Span>),
    Code(String),
    Link { url: String, content: Vec<Span> },
    Image { url: String, alt: String },
    /// Inline HTML, emitted untouched
    Html(String),
    LineBreak,
}

/// A single list item: its leading text, then any blocks it contains
/// (nested lists, code, quotes, further paragraphs) in source order
#[derive(Debug, Clone, PartialEq)]
pub struct ListItem {
    pub content: Vec<Span>,
    pub blocks: Vec<Block>,
    /// For task lists: None = not a task, Some(false) = unchecked, Some(true) = checked
    pub checked: Option<bool>,
}

/// A list (ordered or unordered)
#[derive(Debug, Clone, PartialEq)]
pub struct List {
    /// Starting number for ordered lists, None for bullet lists
    pub start: Option<u64>,
    pub items: Vec<ListItem>,
}

impl List {
    pub fn ordered(&self) -> bool {
        self.start.is_some()
    }
}

/// Block-level elements parsed from Markdown
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Heading {
        level: u8,
        content: Vec<Span>,
    },
    Paragraph {
        content: Vec<Span>,
    },
    CodeBlock {
        language: Option<String>,
        content: String,
    },
    List(List),
    Quote(Vec<Block>),
    Table {
        headers: Vec<Vec<Span>>,
        rows: Vec<Vec<Vec<Span>>>,
    },
    /// Block-level HTML, emitted untouched
    Html(String),
    Rule,
    PageBreak,
}
