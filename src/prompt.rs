use std::io::{BufRead, Write};
use std::num::NonZeroU64;

use crate::error::{Error, Result};
use crate::pipeline::BookRequest;
use crate::template::Template;

/// Ask for topic, chapter count and template on `input`, writing prompts to `out`.
pub fn ask_request<R: BufRead, W: Write>(input: &mut R, out: &mut W) -> Result<BookRequest> {
    let topic = ask(input, out, "Enter the eBook topic: ")?;
    if topic.is_empty() {
        return Err(Error::EmptyTopic);
    }

    let chapters = parse_chapters(&ask(input, out, "Enter the number of chapters: ")?)?;

    write_menu(out).map_err(|e| Error::io("writing template menu", e))?;
    let choice = parse_number(&ask(input, out, "Choose a template (1-5): ")?)?;
    let template = match Template::from_choice_checked(choice) {
        Some(template) => template,
        None => {
            let fallback = Template::default();
            tracing::warn!(choice, "unknown template choice, using {}", fallback.label());
            writeln!(out, "No template {choice}, using {}.", fallback.label())
                .map_err(|e| Error::io("writing prompt", e))?;
            fallback
        }
    };

    Ok(BookRequest {
        topic,
        chapters,
        template,
    })
}

fn ask<R: BufRead, W: Write>(input: &mut R, out: &mut W, question: &str) -> Result<String> {
    write!(out, "{question}")
        .and_then(|()| out.flush())
        .map_err(|e| Error::io("writing prompt", e))?;

    let mut line = String::new();
    let read = input
        .read_line(&mut line)
        .map_err(|e| Error::io("reading answer", e))?;
    if read == 0 {
        return Err(Error::InputClosed);
    }
    Ok(line.trim().to_string())
}

fn write_menu<W: Write>(out: &mut W) -> std::io::Result<()> {
    writeln!(out, "Available templates:")?;
    for template in Template::ALL {
        writeln!(out, "{}. {}", template.number(), template.label())?;
    }
    Ok(())
}

fn parse_number(answer: &str) -> Result<i64> {
    answer.parse().map_err(|source| Error::InvalidNumber {
        input: answer.to_string(),
        source,
    })
}

/// A chapter count is a positive integer with no upper bound.
pub fn parse_chapters(answer: &str) -> Result<NonZeroU64> {
    let count: u64 = answer.trim().parse().map_err(|source| Error::InvalidNumber {
        input: answer.to_string(),
        source,
    })?;
    NonZeroU64::new(count).ok_or(Error::ZeroChapters)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn run(answers: &str) -> (Result<BookRequest>, String) {
        let mut input = Cursor::new(answers.as_bytes().to_vec());
        let mut out = Vec::new();
        let result = ask_request(&mut input, &mut out);
        (result, String::from_utf8(out).unwrap())
    }

    #[test]
    fn reads_all_three_answers() {
        let (result, out) = run("Space Exploration\n3\n4\n");
        let request = result.unwrap();
        assert_eq!(request.topic, "Space Exploration");
        assert_eq!(request.chapters.get(), 3);
        assert_eq!(request.template, Template::Elegant);

        assert!(out.starts_with("Enter the eBook topic: Enter the number of chapters: "));
        assert!(out.contains("Available templates:\n1. Classic\n2. Modern\n3. Minimalist\n4. Elegant\n5. Dark\n"));
        assert!(out.ends_with("Choose a template (1-5): "));
    }

    #[test]
    fn windows_line_endings() {
        let (result, _) = run("Rust\r\n2\r\n5\r\n");
        let request = result.unwrap();
        assert_eq!(request.topic, "Rust");
        assert_eq!(request.template, Template::Dark);
    }

    #[test]
    fn unknown_template_falls_back_with_a_note() {
        let (result, out) = run("Rust\n2\n9\n");
        assert_eq!(result.unwrap().template, Template::Classic);
        assert!(out.contains("No template 9, using Classic."));
    }

    #[test]
    fn non_numeric_chapters_is_rejected() {
        let (result, _) = run("Rust\nthree\n1\n");
        match result.unwrap_err() {
            Error::InvalidNumber { input, .. } => assert_eq!(input, "three"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn zero_chapters_is_rejected() {
        assert!(matches!(parse_chapters("0"), Err(Error::ZeroChapters)));
        assert!(matches!(parse_chapters("-2"), Err(Error::InvalidNumber { .. })));
        assert_eq!(parse_chapters(" 12 ").unwrap().get(), 12);
    }

    #[test]
    fn chapter_count_is_not_capped_at_32_bits() {
        assert_eq!(parse_chapters("5000000000").unwrap().get(), 5_000_000_000);
    }

    #[test]
    fn non_numeric_template_is_rejected() {
        let (result, _) = run("Rust\n2\ndark\n");
        assert!(matches!(result, Err(Error::InvalidNumber { .. })));
    }

    #[test]
    fn empty_topic_is_rejected() {
        let (result, _) = run("   \n3\n1\n");
        assert!(matches!(result, Err(Error::EmptyTopic)));
    }

    #[test]
    fn closed_input() {
        let (result, _) = run("Rust\n");
        assert!(matches!(result, Err(Error::InputClosed)));
    }
}
