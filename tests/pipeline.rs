#![cfg(unix)]

use std::fs;
use std::num::NonZeroU64;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use ebookgen::{BookRequest, Generate, Pipeline, Result, Step, Template, TemplateStore, WkHtmlToPdf};

struct CannedBook;

impl Generate for CannedBook {
    fn generate(&self, request: &BookRequest) -> Result<String> {
        let topic = &request.topic;
        let mut book = format!("# {topic}\n");
        for n in 1..=request.chapters.get() {
            book.push_str(&format!("\n## Chapter {n}\n\nSome *prose* about {topic}.\n"));
        }
        Ok(book)
    }
}

/// Stand-in for wkhtmltopdf that copies the page on stdin to the output path.
fn fake_wkhtmltopdf(dir: &Path) -> PathBuf {
    let path = dir.join("wkhtmltopdf");
    fs::write(&path, "#!/bin/sh\nfor last; do :; done\ncat > \"$last\"\n").unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

fn bundled_templates() -> TemplateStore {
    TemplateStore::new(Path::new(env!("CARGO_MANIFEST_DIR")).join("pdf_templates"))
}

#[test]
fn space_exploration_end_to_end() {
    let temp_dir = tempfile::tempdir().unwrap();
    let renderer = WkHtmlToPdf::at(fake_wkhtmltopdf(temp_dir.path())).unwrap();
    let pipeline = Pipeline::new(CannedBook, bundled_templates(), renderer);

    let request = BookRequest {
        topic: "Space Exploration".to_string(),
        chapters: NonZeroU64::new(3).unwrap(),
        template: Template::from_choice(1),
    };

    let mut steps = Vec::new();
    let files = pipeline
        .run(&request, temp_dir.path(), |step| steps.push(step.to_string()))
        .unwrap();

    assert_eq!(files.markdown, temp_dir.path().join("Space-Exploration.md"));
    assert_eq!(files.pdf, temp_dir.path().join("Space-Exploration.pdf"));
    assert_eq!(steps.len(), 5);
    assert_eq!(steps[0], Step::Generate.to_string());

    let markdown = fs::read_to_string(&files.markdown).unwrap();
    assert!(markdown.starts_with("# Space Exploration\n"));
    assert_eq!(markdown.matches("## Chapter").count(), 3);

    // The fake renderer leaves the final HTML in the "PDF"
    let page = fs::read_to_string(&files.pdf).unwrap();
    assert!(page.contains("<h1>Space Exploration</h1>"));
    assert!(page.contains("<h2>Chapter 3</h2>"));
    assert!(page.contains("<em>prose</em>"));
    assert!(page.contains("Georgia"));
    assert!(!page.contains(ebookgen::PLACEHOLDER));
}

#[test]
fn each_bundled_template_renders() {
    let temp_dir = tempfile::tempdir().unwrap();
    let renderer = WkHtmlToPdf::at(fake_wkhtmltopdf(temp_dir.path())).unwrap();
    let pipeline = Pipeline::new(CannedBook, bundled_templates(), renderer);

    for template in Template::ALL {
        let request = BookRequest {
            topic: format!("Topic {}", template.label()),
            chapters: NonZeroU64::new(1).unwrap(),
            template,
        };
        let files = pipeline.run(&request, temp_dir.path(), |_| {}).unwrap();
        let page = fs::read_to_string(&files.pdf).unwrap();
        assert!(page.contains(&format!("<h1>Topic {}</h1>", template.label())));
    }
}
