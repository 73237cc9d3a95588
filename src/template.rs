use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Token each template carries once, replaced by the converted book.
pub const PLACEHOLDER: &str = "{{MARKDOWN_CONTENT}}";

/// Directory name searched beside the executable and in the working directory.
pub const TEMPLATES_DIR_NAME: &str = "pdf_templates";
pub const TEMPLATES_ENV: &str = "EBOOKGEN_TEMPLATES";

/// The bundled page styles, in menu order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Template {
    #[default]
    Classic,
    Modern,
    Minimalist,
    Elegant,
    Dark,
}

impl Template {
    pub const ALL: [Template; 5] = [
        Template::Classic,
        Template::Modern,
        Template::Minimalist,
        Template::Elegant,
        Template::Dark,
    ];

    /// Map a menu number to a template. Unknown numbers fall back to Classic.
    pub fn from_choice(choice: i64) -> Self {
        Self::from_choice_checked(choice).unwrap_or(Template::Classic)
    }

    /// Like [`Template::from_choice`] but reports when the number is not on the menu.
    pub fn from_choice_checked(choice: i64) -> Option<Self> {
        Self::ALL.into_iter().find(|t| i64::from(t.number()) == choice)
    }

    pub fn number(self) -> u8 {
        match self {
            Template::Classic => 1,
            Template::Modern => 2,
            Template::Minimalist => 3,
            Template::Elegant => 4,
            Template::Dark => 5,
        }
    }

    pub fn file_name(self) -> &'static str {
        match self {
            Template::Classic => "classic.html",
            Template::Modern => "modern.html",
            Template::Minimalist => "minimalist.html",
            Template::Elegant => "elegant.html",
            Template::Dark => "dark.html",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Template::Classic => "Classic",
            Template::Modern => "Modern",
            Template::Minimalist => "Minimalist",
            Template::Elegant => "Elegant",
            Template::Dark => "Dark",
        }
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_name())
    }
}

/// A directory of template files.
#[derive(Debug, Clone)]
pub struct TemplateStore {
    dir: PathBuf,
}

impl TemplateStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Pick the templates directory: configured, `EBOOKGEN_TEMPLATES`,
    /// beside the executable, then the working directory.
    /// An explicit setting is used even when it does not exist, so the
    /// not-found error names it.
    pub fn discover(configured: Option<&Path>) -> Self {
        let explicit = configured
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(TEMPLATES_ENV).map(PathBuf::from));
        if let Some(dir) = explicit {
            return Self::new(dir);
        }

        let beside_exe = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(|dir| dir.join(TEMPLATES_DIR_NAME)));
        Self::new(pick_dir(beside_exe, PathBuf::from(TEMPLATES_DIR_NAME)))
    }

    /// Path of `template`, which must exist.
    pub fn locate(&self, template: Template) -> Result<PathBuf> {
        let path = self.dir.join(template.file_name());
        if path.is_file() {
            Ok(path)
        } else {
            Err(self.not_found(template))
        }
    }

    /// Read `template` and put `fragment` where the placeholder is.
    /// The fragment is inserted as-is.
    pub fn embed(&self, fragment: &str, template: Template) -> Result<String> {
        let path = self.dir.join(template.file_name());
        let text = fs::read_to_string(&path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => self.not_found(template),
            _ => Error::io(format!("reading template {}", path.display()), e),
        })?;

        if !text.contains(PLACEHOLDER) {
            tracing::warn!("{} has no {} placeholder", path.display(), PLACEHOLDER);
        }
        Ok(fill(&text, fragment))
    }

    fn not_found(&self, template: Template) -> Error {
        Error::TemplateNotFound {
            name: template.file_name().to_string(),
            dir: self.dir.clone(),
        }
    }
}

/// Replace the first placeholder in `template` with `fragment`.
pub fn fill(template: &str, fragment: &str) -> String {
    template.replacen(PLACEHOLDER, fragment, 1)
}

fn pick_dir(candidate: Option<PathBuf>, fallback: PathBuf) -> PathBuf {
    candidate.filter(|dir| dir.is_dir()).unwrap_or(fallback)
}
