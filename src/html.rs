use html_escape::{encode_double_quoted_attribute, encode_text};

use crate::block::{Block, List, Span};

/// Convert blocks to an HTML fragment
pub fn blocks_to_html(blocks: &[Block]) -> String {
    let mut out = String::new();
    for block in blocks {
        emit_block(block, &mut out);
    }
    out
}

fn emit_block(block: &Block, out: &mut String) {
    match block {
        Block::Heading { level, content } => {
            out.push_str(&format!("<h{}>", level));
            spans_to_html(content, out);
            out.push_str(&format!("</h{}>\n", level));
        }
        Block::Paragraph { content } => {
            out.push_str("<p>");
            spans_to_html(content, out);
            out.push_str("</p>\n");
        }
        Block::CodeBlock { language, content } => {
            out.push_str("<pre><code");
            if let Some(lang) = language {
                out.push_str(" class=\"language-");
                out.push_str(&encode_double_quoted_attribute(lang));
                out.push('"');
            }
            out.push('>');
            out.push_str(&encode_text(content));
            out.push_str("</code></pre>\n");
        }
        Block::List(list) => {
            list_to_html(list, out);
        }
        Block::Quote(inner) => {
            out.push_str("<blockquote>\n");
            for block in inner {
                emit_block(block, out);
            }
            out.push_str("</blockquote>\n");
        }
        Block::Table { headers, rows } => {
            table_to_html(headers, rows, out);
        }
        Block::Html(html) => {
            out.push_str(html);
            if !html.ends_with('\n') {
                out.push('\n');
            }
        }
        Block::Rule => {
            out.push_str("<hr />\n");
        }
        Block::PageBreak => {
            // wkhtmltopdf honours the CSS break property
            out.push_str("<div style=\"page-break-after: always;\"></div>\n");
        }
    }
}

fn spans_to_html(spans: &[Span], out: &mut String) {
    for span in spans {
        span_to_html(span, out);
    }
}

fn span_to_html(span: &Span, out: &mut String) {
    match span {
        Span::Text(text) => {
            out.push_str(&encode_text(text));
        }
        Span::Bold(inner) => {
            out.push_str("<strong>");
            spans_to_html(inner, out);
            out.push_str("</strong>");
        }
        Span::Italic(inner) => {
            out.push_str("<em>");
            spans_to_html(inner, out);
            out.push_str("</em>");
        }
        Span::Strikethrough(inner) => {
            out.push_str("<del>");
            spans_to_html(inner, out);
            out.push_str("</del>");
        }
        Span::Code(text) => {
            out.push_str("<code>");
            out.push_str(&encode_text(text));
            out.push_str("</code>");
        }
        Span::Link { url, content } => {
            out.push_str("<a href=\"");
            out.push_str(&encode_double_quoted_attribute(url));
            out.push_str("\">");
            spans_to_html(content, out);
            out.push_str("</a>");
        }
        Span::Image { url, alt } => {
            out.push_str("<img src=\"");
            out.push_str(&encode_double_quoted_attribute(url));
            out.push_str("\" alt=\"");
            out.push_str(&encode_double_quoted_attribute(alt));
            out.push_str("\" />");
        }
        Span::Html(html) => {
            out.push_str(html);
        }
        Span::LineBreak => {
            out.push_str("<br />\n");
        }
    }
}

fn list_to_html(list: &List, out: &mut String) {
    match list.start {
        Some(1) => out.push_str("<ol>\n"),
        Some(start) => out.push_str(&format!("<ol start=\"{}\">\n", start)),
        None => out.push_str("<ul>\n"),
    }

    for item in &list.items {
        out.push_str("<li>");
        match item.checked {
            Some(true) => out.push_str("<input type=\"checkbox\" checked disabled /> "),
            Some(false) => out.push_str("<input type=\"checkbox\" disabled /> "),
            None => {}
        }
        spans_to_html(&item.content, out);

        if !item.blocks.is_empty() {
            out.push('\n');
            for block in &item.blocks {
                emit_block(block, out);
            }
        }
        out.push_str("</li>\n");
    }

    out.push_str(if list.ordered() { "</ol>\n" } else { "</ul>\n" });
}

fn table_to_html(headers: &[Vec<Span>], rows: &[Vec<Vec<Span>>], out: &mut String) {
    if headers.is_empty() {
        return;
    }

    out.push_str("<table>\n<thead>\n<tr>");
    for cell in headers {
        out.push_str("<th>");
        spans_to_html(cell, out);
        out.push_str("</th>");
    }
    out.push_str("</tr>\n</thead>\n");

    if !rows.is_empty() {
        out.push_str("<tbody>\n");
        for row in rows {
            out.push_str("<tr>");
            for cell in row {
                out.push_str("<td>");
                spans_to_html(cell, out);
                out.push_str("</td>");
            }
            out.push_str("</tr>\n");
        }
        out.push_str("</tbody>\n");
    }

    out.push_str("</table>\n");
}

#[cfg(test)]
mod tests {
    use crate::markdown_to_html;

    #[test]
    fn heading() {
        assert_eq!(markdown_to_html("# Hello"), "<h1>Hello</h1>\n");
        assert_eq!(markdown_to_html("### Deep"), "<h3>Deep</h3>\n");
    }

    #[test]
    fn chapter_outline() {
        let html = markdown_to_html("# Space\n\n## Chapter 1: Launch\n\nWe lift off.");
        assert_eq!(
            html,
            "<h1>Space</h1>\n<h2>Chapter 1: Launch</h2>\n<p>We lift off.</p>\n"
        );
    }

    #[test]
    fn bold_and_italic() {
        assert_eq!(markdown_to_html("**bold**"), "<p><strong>bold</strong></p>\n");
        assert_eq!(markdown_to_html("*italic*"), "<p><em>italic</em></p>\n");
        assert_eq!(
            markdown_to_html("***both***"),
            "<p><em><strong>both</strong></em></p>\n"
        );
        assert_eq!(markdown_to_html("~~gone~~"), "<p><del>gone</del></p>\n");
    }

    #[test]
    fn inline_code() {
        assert_eq!(markdown_to_html("`a < b`"), "<p><code>a &lt; b</code></p>\n");
    }

    #[test]
    fn code_block() {
        assert_eq!(
            markdown_to_html("```rust\nlet x = 1;\n```"),
            "<pre><code class=\"language-rust\">let x = 1;\n</code></pre>\n"
        );
    }

    #[test]
    fn unordered_list() {
        assert_eq!(
            markdown_to_html("- one\n- two"),
            "<ul>\n<li>one</li>\n<li>two</li>\n</ul>\n"
        );
    }

    #[test]
    fn ordered_list() {
        assert_eq!(
            markdown_to_html("1. one\n2. two"),
            "<ol>\n<li>one</li>\n<li>two</li>\n</ol>\n"
        );
        assert!(markdown_to_html("5. five").starts_with("<ol start=\"5\">"));
    }

    #[test]
    fn nested_list() {
        assert_eq!(
            markdown_to_html("- outer\n  - inner"),
            "<ul>\n<li>outer\n<ul>\n<li>inner</li>\n</ul>\n</li>\n</ul>\n"
        );
    }

    #[test]
    fn code_block_inside_list_item() {
        assert_eq!(
            markdown_to_html("1. Install\n\n   ```\n   cargo build\n   ```\n\n2. Run"),
            "<ol>\n<li>Install\n<pre><code>cargo build\n</code></pre>\n</li>\n<li>Run</li>\n</ol>\n"
        );
    }

    #[test]
    fn quote_inside_list_item() {
        assert_eq!(
            markdown_to_html("- item\n\n  > quoted\n"),
            "<ul>\n<li>item\n<blockquote>\n<p>quoted</p>\n</blockquote>\n</li>\n</ul>\n"
        );
    }

    #[test]
    fn document_opening_with_a_rule_keeps_everything() {
        assert_eq!(
            markdown_to_html("---\n\n# My Book\n\nIntro text.\n\n---\n\n## Chapter 1\n\nBody."),
            "<hr />\n<h1>My Book</h1>\n<p>Intro text.</p>\n<hr />\n<h2>Chapter 1</h2>\n<p>Body.</p>\n"
        );
    }

    #[test]
    fn hard_break() {
        assert_eq!(
            markdown_to_html("line one  \nline two"),
            "<p>line one<br />\nline two</p>\n"
        );
    }

    #[test]
    fn escapes_text() {
        assert_eq!(
            markdown_to_html("Fish & chips <3"),
            "<p>Fish &amp; chips &lt;3</p>\n"
        );
    }

    #[test]
    fn raw_html_passes_through() {
        let html = markdown_to_html("<div class=\"note\">hi</div>\n");
        assert_eq!(html, "<div class=\"note\">hi</div>\n");
    }

    #[test]
    fn link() {
        assert_eq!(
            markdown_to_html("[NASA](https://nasa.gov)"),
            "<p><a href=\"https://nasa.gov\">NASA</a></p>\n"
        );
    }

    #[test]
    fn table() {
        let md = "| A | B |\n|---|---|\n| 1 | 2 |";
        assert_eq!(
            markdown_to_html(md),
            "<table>\n<thead>\n<tr><th>A</th><th>B</th></tr>\n</thead>\n<tbody>\n<tr><td>1</td><td>2</td></tr>\n</tbody>\n</table>\n"
        );
    }

    #[test]
    fn horizontal_rule() {
        assert_eq!(markdown_to_html("---"), "<hr />\n");
    }

    #[test]
    fn page_break() {
        assert_eq!(
            markdown_to_html("---pagebreak---"),
            "<div style=\"page-break-after: always;\"></div>\n"
        );
    }
}
