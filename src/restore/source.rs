//! Restore sources given on the command line
//!
//! Each argument is either a local file or an `http(s)://` URL (e.g. the raw
//! link of a file in a hosted git repository; private repositories need the
//! token in the URL).

use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{PolicyError, PolicyResult};
use crate::models::PolicyDocument;

/// Where a policy document is read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentSource {
    File(PathBuf),
    Url(String),
}

impl DocumentSource {
    /// Classify a command-line argument
    pub fn parse(arg: &str) -> Self {
        let lower = arg.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            Self::Url(arg.to_string())
        } else {
            Self::File(PathBuf::from(arg))
        }
    }

    /// Read the raw document text
    pub fn read(&self) -> PolicyResult<String> {
        match self {
            Self::File(path) => read_file(path),
            Self::Url(url) => fetch_url(url),
        }
    }

    /// Read and parse the document
    pub fn load(&self) -> PolicyResult<PolicyDocument> {
        let content = self.read()?;
        PolicyDocument::parse(&content, &self.to_string())
    }
}

impl fmt::Display for DocumentSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Url(url) => f.write_str(url),
        }
    }
}

fn read_file(path: &Path) -> PolicyResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| PolicyError::Io(format!("Failed to read {}: {}", path.display(), e)))
}

fn fetch_url(url: &str) -> PolicyResult<String> {
    let fetch_error = |reason: String| PolicyError::Fetch {
        url: url.to_string(),
        reason,
    };

    let response = reqwest::blocking::get(url).map_err(|e| fetch_error(e.to_string()))?;
    let status = response.status();
    if !status.is_success() {
        return Err(fetch_error(format!("status {}", status)));
    }
    response.text().map_err(|e| fetch_error(e.to_string()))
}
