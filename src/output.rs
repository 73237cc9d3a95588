use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Characters replaced by '-' when a topic becomes a file name.
const UNSAFE_CHARS: [char; 3] = [' ', '/', '\\'];

/// Turn a topic into a file stem without spaces or path separators.
pub fn sanitize_stem(topic: &str) -> String {
    topic.replace(UNSAFE_CHARS, "-")
}

/// The Markdown and PDF files written for one book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFiles {
    pub markdown: PathBuf,
    pub pdf: PathBuf,
}

impl OutputFiles {
    pub fn for_topic(dir: &Path, topic: &str) -> Self {
        let stem = sanitize_stem(topic);
        Self {
            markdown: dir.join(format!("{stem}.md")),
            pdf: dir.join(format!("{stem}.pdf")),
        }
    }
}

/// Write the generated Markdown verbatim, replacing any existing file.
pub fn save_markdown(content: &str, path: &Path) -> Result<()> {
    fs::write(path, content).map_err(|e| Error::io(format!("writing {}", path.display()), e))
}
