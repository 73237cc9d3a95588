use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::error::{Error, Result};

pub const WKHTMLTOPDF_ENV: &str = "WKHTMLTOPDF";

#[cfg(windows)]
pub const DEFAULT_BINARY: &str = r"C:\Program Files\wkhtmltopdf\bin\wkhtmltopdf.exe";
#[cfg(not(windows))]
pub const DEFAULT_BINARY: &str = "/usr/local/bin/wkhtmltopdf";

pub const DOWNLOAD_URL: &str = "https://wkhtmltopdf.org/downloads.html";

/// Turns a complete HTML document into a PDF file.
pub trait Render {
    fn render(&self, html: &str, dest: &Path) -> Result<()>;
}

/// Renders through an installed `wkhtmltopdf` executable.
#[derive(Debug, Clone)]
pub struct WkHtmlToPdf {
    binary: PathBuf,
    options: Vec<String>,
}

impl WkHtmlToPdf {
    /// Find the executable: `configured`, then `WKHTMLTOPDF`, then the
    /// platform default. The chosen path must exist.
    pub fn resolve(configured: Option<&Path>) -> Result<Self> {
        let from_env = std::env::var_os(WKHTMLTOPDF_ENV).map(PathBuf::from);
        Self::at(choose_binary(configured, from_env))
    }

    pub fn at(binary: PathBuf) -> Result<Self> {
        let checked = fs::metadata(&binary).and_then(|meta| {
            if meta.is_file() {
                Ok(())
            } else {
                Err(io::Error::other("not a file"))
            }
        });
        if let Err(source) = checked {
            return Err(Error::RendererNotFound {
                path: binary,
                source,
            });
        }

        tracing::debug!("using wkhtmltopdf at {}", binary.display());
        Ok(Self {
            binary,
            options: Vec::new(),
        })
    }

    /// Extra command-line options placed before the input argument.
    pub fn with_options(mut self, options: Vec<String>) -> Self {
        self.options = options;
        self
    }

    fn command(&self, dest: &Path) -> Command {
        let mut cmd = Command::new(&self.binary);
        cmd.arg("--quiet")
            .args(["--encoding", "UTF-8"])
            .args(&self.options)
            // Read the page from stdin
            .arg("-")
            .arg(dest)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());
        cmd
    }
}

impl Render for WkHtmlToPdf {
    fn render(&self, html: &str, dest: &Path) -> Result<()> {
        let mut child = self
            .command(dest)
            .spawn()
            .map_err(|source| Error::RendererNotFound {
                path: self.binary.clone(),
                source,
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            // A renderer that dies early closes the pipe; its stderr says why
            match stdin.write_all(html.as_bytes()) {
                Err(e) if e.kind() != io::ErrorKind::BrokenPipe => {
                    return Err(Error::io("sending HTML to wkhtmltopdf", e));
                }
                _ => {}
            }
        }

        let output = child
            .wait_with_output()
            .map_err(|e| Error::io("waiting for wkhtmltopdf", e))?;

        if !output.status.success() {
            return Err(Error::RenderFailed {
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(())
    }
}

fn choose_binary(configured: Option<&Path>, from_env: Option<PathBuf>) -> PathBuf {
    configured
        .map(Path::to_path_buf)
        .or(from_env)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_BINARY))
}

/// Multi-line guidance printed when the executable cannot be used.
pub fn install_help(path: &Path) -> String {
    let rule = "=".repeat(70);
    let mut lines = vec![
        rule.clone(),
        "Error: wkhtmltopdf is not installed or not found at the configured path.".to_string(),
        "Please ensure wkhtmltopdf is correctly installed and its executable path is set:"
            .to_string(),
    ];
    if cfg!(windows) {
        lines.push(format!(
            "  For Windows, verify that '{}' points to wkhtmltopdf.exe.",
            path.display()
        ));
        lines.push(format!(
            "  The installer puts it in '{}' by default.",
            r"C:\Program Files\wkhtmltopdf\bin\wkhtmltopdf.exe"
        ));
    } else {
        lines.push(format!(
            "  For Linux/macOS, ensure it is at '{}' (the default is /usr/local/bin/wkhtmltopdf).",
            path.display()
        ));
    }
    lines.push(format!(
        "  Set {} or renderer.path in the config file, or pass --wkhtmltopdf, to use another location.",
        WKHTMLTOPDF_ENV
    ));
    lines.push(format!("You can download wkhtmltopdf from: {}", DOWNLOAD_URL));
    lines.push(rule);
    lines.join("\n")
}
