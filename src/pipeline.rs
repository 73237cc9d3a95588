use std::fmt;
use std::num::NonZeroU64;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::generator::Generate;
use crate::output::{OutputFiles, save_markdown};
use crate::render::Render;
use crate::template::{Template, TemplateStore};

/// What the user asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookRequest {
    pub topic: String,
    pub chapters: NonZeroU64,
    pub template: Template,
}

/// A pipeline stage, reported before it starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Generate,
    Persist(PathBuf),
    Convert,
    Embed(Template),
    Render(PathBuf),
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Generate => write!(f, "Generating eBook content..."),
            Step::Persist(path) => write!(f, "Saving eBook as Markdown ({})...", path.display()),
            Step::Convert => write!(f, "Converting Markdown to HTML..."),
            Step::Embed(template) => {
                write!(f, "Embedding HTML content into HTML template ({template})...")
            }
            Step::Render(path) => write!(f, "Converting HTML to PDF ({})...", path.display()),
        }
    }
}

/// Generate, save, convert, embed and render one book.
pub struct Pipeline<G, R> {
    generator: G,
    templates: TemplateStore,
    renderer: R,
}

impl<G: Generate, R: Render> Pipeline<G, R> {
    pub fn new(generator: G, templates: TemplateStore, renderer: R) -> Self {
        Self {
            generator,
            templates,
            renderer,
        }
    }

    /// Run every stage in order. Files written before a failing stage are
    /// left in place.
    pub fn run(
        &self,
        request: &BookRequest,
        out_dir: &Path,
        mut on_step: impl FnMut(&Step),
    ) -> Result<OutputFiles> {
        // Checked up front so a bad template never costs a generation
        self.templates.locate(request.template)?;
        let files = OutputFiles::for_topic(out_dir, &request.topic);

        on_step(&Step::Generate);
        let markdown = self.generator.generate(request)?;
        tracing::info!(bytes = markdown.len(), "content generated");

        on_step(&Step::Persist(files.markdown.clone()));
        save_markdown(&markdown, &files.markdown)?;

        on_step(&Step::Convert);
        let fragment = crate::markdown_to_html(&markdown);

        on_step(&Step::Embed(request.template));
        let document = self.templates.embed(&fragment, request.template)?;

        on_step(&Step::Render(files.pdf.clone()));
        self.renderer.render(&document, &files.pdf)?;
        tracing::info!("wrote {}", files.pdf.display());

        Ok(files)
    }
}
