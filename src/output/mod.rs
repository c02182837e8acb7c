pub mod console;
pub mod json;
pub mod markdown;
pub mod sarif;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{GuardError, Result};
use crate::rules::Assessment;

/// Output format selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Annotated, colour-emphasised terminal report.
    #[default]
    Cli,
    Json,
    Markdown,
    Sarif,
}

impl OutputFormat {
    pub fn from_str_lenient(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "cli" | "console" | "text" => Some(Self::Cli),
            "json" => Some(Self::Json),
            "markdown" | "md" => Some(Self::Markdown),
            "sarif" => Some(Self::Sarif),
            _ => None,
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cli => write!(f, "cli"),
            Self::Json => write!(f, "json"),
            Self::Markdown => write!(f, "markdown"),
            Self::Sarif => write!(f, "sarif"),
        }
    }
}

/// Render an assessment into the specified format.
pub fn render(assessment: &Assessment, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Cli => Ok(console::render(assessment)),
        OutputFormat::Json => json::render(assessment),
        OutputFormat::Markdown => Ok(markdown::render(assessment)),
        OutputFormat::Sarif => sarif::render(assessment),
    }
}

/// Write the persisted copy of a report.
///
/// The file always receives the markdown rendering, whatever format was
/// printed to the terminal.
pub fn persist(assessment: &Assessment, path: &Path) -> Result<()> {
    let document = markdown::render(assessment);
    write_private(path, document.as_bytes()).map_err(|e| GuardError::Output {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    tracing::debug!(path = %path.display(), bytes = document.len(), "report written");
    Ok(())
}

#[cfg(unix)]
fn write_private(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    use std::io::Write;
    use std::os::unix::fs::OpenOptionsExt;

    let mut file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    file.write_all(bytes)
}

#[cfg(not(unix))]
fn write_private(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    std::fs::write(path, bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{aggregate, Category, Findings, SeverityCatalogue};

    fn sample() -> Assessment {
        let mut findings = Findings::new();
        findings.push(Category::NoHttps, "http://insecure.example");
        findings.push(Category::NoAuthentication, "GET /users");
        findings.push(Category::UntypedQueryParameter, "GET /users param: q");
        aggregate(&findings, &SeverityCatalogue::builtin()).unwrap()
    }

    #[test]
    fn unknown_format_is_none() {
        assert_eq!(OutputFormat::from_str_lenient("xml"), None);
        assert_eq!(OutputFormat::from_str_lenient("JSON"), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::from_str_lenient("md"), Some(OutputFormat::Markdown));
    }

    #[test]
    fn rendering_is_deterministic() {
        colored::control::set_override(false);
        let assessment = sample();
        for format in [
            OutputFormat::Cli,
            OutputFormat::Json,
            OutputFormat::Markdown,
            OutputFormat::Sarif,
        ] {
            let first = render(&assessment, format).unwrap();
            let second = render(&assessment, format).unwrap();
            assert_eq!(first, second, "{format}");
        }
    }

    #[test]
    fn persist_writes_markdown_regardless_of_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.md");
        let assessment = sample();
        persist(&assessment, &path).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, markdown::render(&assessment));
    }

    #[test]
    fn persist_failure_is_output_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing-dir").join("report.md");
        let err = persist(&sample(), &path).unwrap_err();
        assert!(matches!(err, GuardError::Output { .. }));
    }
}
