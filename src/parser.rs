use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};

use crate::block::{Block, List, ListItem, Span};

/// A paragraph with only this text becomes a page break.
pub const PAGE_BREAK_MARKER: &str = "---pagebreak---";

/// Strip a leading YAML front-matter block. The block must open with a
/// `---` line, close with `---` or `...`, and hold `key: value` lines;
/// anything else (such as a leading horizontal rule) is left alone.
fn strip_frontmatter(markdown: &str) -> &str {
    let mut lines = markdown.split_inclusive('\n');
    let mut offset = match lines.next() {
        Some(first) if first.trim_end() == "---" => first.len(),
        _ => return markdown,
    };

    let mut has_key = false;
    for line in lines {
        offset += line.len();
        let trimmed = line.trim_end();
        if trimmed == "---" || trimmed == "..." {
            if !has_key {
                return markdown;
            }
            return markdown[offset..].trim_start_matches(['\r', '\n']);
        }
        // Blank lines, nested values and sequence items
        if trimmed.is_empty() || line.starts_with([' ', '\t']) || trimmed.starts_with("- ") {
            continue;
        }
        if !is_yaml_key(trimmed) {
            return markdown;
        }
        has_key = true;
    }
    markdown
}

fn is_yaml_key(line: &str) -> bool {
    match line.split_once(':') {
        Some((key, rest)) => {
            !key.is_empty()
                && key.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '-')
                && (rest.is_empty() || rest.starts_with(' '))
        }
        None => false,
    }
}

/// Parse markdown text into a list of blocks
pub fn parse(markdown: &str) -> Vec<Block> {
    let markdown = strip_frontmatter(markdown);
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_TASKLISTS);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    let parser = Parser::new_ext(markdown, options);
    let mut blocks = Vec::new();
    let mut state = ParseState::default();

    for event in parser {
        process_event(event, &mut state, &mut blocks);
    }

    blocks
}

#[derive(Default)]
struct ParseState {
    // Current inline content being built
    spans: Vec<Span>,
    // Parent span buffers while inside bold/italic/links
    span_stack: Vec<Vec<Span>>,

    heading_level: Option<u8>,

    in_code_block: bool,
    code_language: Option<String>,
    code_content: String,

    in_html_block: bool,
    html_content: String,

    link_url: Option<String>,
    image_url: Option<String>,

    // Open quotes and lists, innermost last
    containers: Vec<Container>,

    in_table: bool,
    table_headers: Vec<Vec<Span>>,
    table_rows: Vec<Vec<Vec<Span>>>,
    current_row: Vec<Vec<Span>>,
    in_table_head: bool,
}

enum Container {
    Quote(Vec<Block>),
    List(ListBuilder),
}

struct ListBuilder {
    start: Option<u64>,
    items: Vec<ListItem>,
    current: ItemBuilder,
}

#[derive(Default)]
struct ItemBuilder {
    spans: Vec<Span>,
    blocks: Vec<Block>,
    checked: Option<bool>,
}

impl ItemBuilder {
    /// Text before the first child block is the item's own content; later
    /// text becomes a paragraph so it stays after those blocks.
    fn add_text(&mut self, content: Vec<Span>) {
        if !self.blocks.is_empty() {
            self.blocks.push(Block::Paragraph { content });
            return;
        }
        // Loose list items hold several paragraphs
        if !self.spans.is_empty() {
            self.spans.push(Span::LineBreak);
        }
        self.spans.extend(content);
    }

    fn finish(&mut self) -> ListItem {
        let item = std::mem::take(self);
        ListItem {
            content: item.spans,
            blocks: item.blocks,
            checked: item.checked,
        }
    }
}

/// Route a finished block into the innermost open quote or list item, or
/// the document.
fn push_block(state: &mut ParseState, blocks: &mut Vec<Block>, block: Block) {
    match state.containers.last_mut() {
        Some(Container::Quote(quote)) => quote.push(block),
        Some(Container::List(list)) => list.current.blocks.push(block),
        None => blocks.push(block),
    }
}

/// Tight list items carry bare text; move it into the item before a
/// child block starts.
fn flush_item_text(state: &mut ParseState) {
    if state.spans.is_empty() {
        return;
    }
    if let Some(Container::List(list)) = state.containers.last_mut() {
        let pending = std::mem::take(&mut state.spans);
        list.current.add_text(pending);
    }
}

fn open_inline(state: &mut ParseState) {
    state.span_stack.push(std::mem::take(&mut state.spans));
}

fn close_inline(state: &mut ParseState, wrap: impl FnOnce(Vec<Span>) -> Span) {
    let inner = std::mem::take(&mut state.spans);
    if let Some(mut parent) = state.span_stack.pop() {
        parent.push(wrap(inner));
        state.spans = parent;
    }
}

fn plain_text(spans: &[Span]) -> String {
    let mut out = String::new();
    for span in spans {
        match span {
            Span::Text(text) | Span::Code(text) => out.push_str(text),
            Span::Bold(inner) | Span::Italic(inner) | Span::Strikethrough(inner) => {
                out.push_str(&plain_text(inner))
            }
            Span::Link { content, .. } => out.push_str(&plain_text(content)),
            Span::Image { alt, .. } => out.push_str(alt),
            Span::Html(_) => {}
            Span::LineBreak => out.push(' '),
        }
    }
    out
}

fn is_page_break(content: &[Span]) -> bool {
    matches!(content, [Span::Text(text)] if text.trim() == PAGE_BREAK_MARKER)
}

fn process_event(event: Event, state: &mut ParseState, blocks: &mut Vec<Block>) {
    match event {
        Event::Start(Tag::Heading { level, .. }) => {
            flush_item_text(state);
            state.heading_level = Some(heading_level_to_u8(level));
        }
        Event::End(TagEnd::Heading(_)) => {
            if let Some(level) = state.heading_level.take() {
                let content = std::mem::take(&mut state.spans);
                push_block(state, blocks, Block::Heading { level, content });
            }
        }

        Event::Start(Tag::Paragraph) => {}
        Event::End(TagEnd::Paragraph) => {
            let content = std::mem::take(&mut state.spans);
            if content.is_empty() || state.in_table {
                return;
            }
            if let Some(Container::List(list)) = state.containers.last_mut() {
                list.current.add_text(content);
            } else if is_page_break(&content) {
                push_block(state, blocks, Block::PageBreak);
            } else {
                push_block(state, blocks, Block::Paragraph { content });
            }
        }

        Event::Text(text) => {
            if state.in_code_block {
                state.code_content.push_str(&text);
            } else {
                state.spans.push(Span::Text(text.into_string()));
            }
        }

        Event::Code(code) => {
            state.spans.push(Span::Code(code.into_string()));
        }

        Event::Start(Tag::Strong) | Event::Start(Tag::Emphasis) | Event::Start(Tag::Strikethrough) => {
            open_inline(state);
        }
        Event::End(TagEnd::Strong) => close_inline(state, Span::Bold),
        Event::End(TagEnd::Emphasis) => close_inline(state, Span::Italic),
        Event::End(TagEnd::Strikethrough) => close_inline(state, Span::Strikethrough),

        Event::Start(Tag::Link { dest_url, .. }) => {
            state.link_url = Some(dest_url.into_string());
            open_inline(state);
        }
        Event::End(TagEnd::Link) => {
            let url = state.link_url.take().unwrap_or_default();
            close_inline(state, |content| Span::Link { url, content });
        }

        Event::Start(Tag::Image { dest_url, .. }) => {
            state.image_url = Some(dest_url.into_string());
            open_inline(state);
        }
        Event::End(TagEnd::Image) => {
            let url = state.image_url.take().unwrap_or_default();
            close_inline(state, |alt| Span::Image {
                url,
                alt: plain_text(&alt),
            });
        }

        Event::Start(Tag::CodeBlock(kind)) => {
            flush_item_text(state);
            state.in_code_block = true;
            state.code_language = match kind {
                CodeBlockKind::Fenced(lang) => {
                    let lang = lang.into_string();
                    if lang.is_empty() { None } else { Some(lang) }
                }
                CodeBlockKind::Indented => None,
            };
            state.code_content.clear();
        }
        Event::End(TagEnd::CodeBlock) => {
            state.in_code_block = false;
            let content = std::mem::take(&mut state.code_content);
            let language = state.code_language.take();
            push_block(state, blocks, Block::CodeBlock { language, content });
        }

        Event::Start(Tag::HtmlBlock) => {
            flush_item_text(state);
            state.in_html_block = true;
            state.html_content.clear();
        }
        Event::Html(html) => {
            if state.in_html_block {
                state.html_content.push_str(&html);
            } else {
                push_block(state, blocks, Block::Html(html.into_string()));
            }
        }
        Event::End(TagEnd::HtmlBlock) => {
            state.in_html_block = false;
            let html = std::mem::take(&mut state.html_content);
            push_block(state, blocks, Block::Html(html));
        }
        Event::InlineHtml(html) => {
            state.spans.push(Span::Html(html.into_string()));
        }

        Event::Start(Tag::BlockQuote(_)) => {
            flush_item_text(state);
            state.containers.push(Container::Quote(Vec::new()));
        }
        Event::End(TagEnd::BlockQuote(_)) => {
            if let Some(Container::Quote(inner)) = state.containers.pop() {
                push_block(state, blocks, Block::Quote(inner));
            }
        }

        Event::Start(Tag::List(start)) => {
            flush_item_text(state);
            state.containers.push(Container::List(ListBuilder {
                start,
                items: Vec::new(),
                current: ItemBuilder::default(),
            }));
        }
        Event::End(TagEnd::List(_)) => {
            if let Some(Container::List(builder)) = state.containers.pop() {
                let list = List {
                    start: builder.start,
                    items: builder.items,
                };
                // A nested list lands in the enclosing item
                push_block(state, blocks, Block::List(list));
            }
        }

        Event::Start(Tag::Item) => {
            if let Some(Container::List(list)) = state.containers.last_mut() {
                list.current = ItemBuilder::default();
            }
        }
        Event::End(TagEnd::Item) => {
            flush_item_text(state);
            if let Some(Container::List(list)) = state.containers.last_mut() {
                let item = list.current.finish();
                list.items.push(item);
            }
        }

        Event::TaskListMarker(checked) => {
            if let Some(Container::List(list)) = state.containers.last_mut() {
                list.current.checked = Some(checked);
            }
        }

        Event::Start(Tag::Table(_)) => {
            flush_item_text(state);
            state.in_table = true;
            state.table_headers.clear();
            state.table_rows.clear();
        }
        Event::End(TagEnd::Table) => {
            state.in_table = false;
            let headers = std::mem::take(&mut state.table_headers);
            let rows = std::mem::take(&mut state.table_rows);
            push_block(state, blocks, Block::Table { headers, rows });
        }

        Event::Start(Tag::TableHead) => {
            state.in_table_head = true;
            state.current_row.clear();
        }
        Event::End(TagEnd::TableHead) => {
            state.in_table_head = false;
            state.table_headers = std::mem::take(&mut state.current_row);
        }

        Event::Start(Tag::TableRow) => {
            state.current_row.clear();
        }
        Event::End(TagEnd::TableRow) => {
            if !state.in_table_head {
                let row = std::mem::take(&mut state.current_row);
                state.table_rows.push(row);
            }
        }

        Event::Start(Tag::TableCell) => {
            state.spans.clear();
        }
        Event::End(TagEnd::TableCell) => {
            let cell_content = std::mem::take(&mut state.spans);
            state.current_row.push(cell_content);
        }

        Event::Rule => {
            flush_item_text(state);
            push_block(state, blocks, Block::Rule);
        }

        Event::SoftBreak => {
            state.spans.push(Span::Text(" ".to_string()));
        }
        Event::HardBreak => {
            state.spans.push(Span::LineBreak);
        }

        // Footnotes, math and metadata are not part of generated books
        _ => {}
    }
}

fn heading_level_to_u8(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}
