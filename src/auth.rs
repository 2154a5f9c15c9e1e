//! Authentication inputs: cookies and auth headers
//!
//! Both parsers are recoverable by contract: malformed input yields an
//! absent value (with a warning for the caller to surface), never an error
//! that aborts the run.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A browser cookie record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    /// Empty means "let the browser scope it to the target URL".
    #[serde(default)]
    pub domain: String,
    #[serde(default = "root_path")]
    pub path: String,
}

fn root_path() -> String {
    "/".to_string()
}

/// How a `--cookies` argument should be interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CookieSource {
    /// Existing file, parsed as a JSON array of cookie records.
    File(PathBuf),
    /// Inline `name=value; name2=value2` string.
    Inline(String),
}

impl CookieSource {
    pub fn classify(raw: &str) -> Self {
        let path = Path::new(raw);
        if path.exists() {
            CookieSource::File(path.to_path_buf())
        } else {
            CookieSource::Inline(raw.to_string())
        }
    }
}

/// Outcome of parsing a recoverable input: a value, or absence with an
/// optional warning the caller decides how to surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseOutcome<T> {
    Parsed(T),
    Absent(Option<String>),
}

impl<T> ParseOutcome<T> {
    /// Print the warning, if any, to stderr and reduce to an `Option`.
    pub fn surface(self) -> Option<T> {
        match self {
            ParseOutcome::Parsed(value) => Some(value),
            ParseOutcome::Absent(warning) => {
                if let Some(w) = warning {
                    eprintln!("Warning: {w}");
                }
                None
            }
        }
    }
}

/// Parse the `--cookies` argument: a JSON cookie file path or an inline
/// cookie string. Zero valid cookies yields absent.
pub fn parse_cookies(raw: &str) -> ParseOutcome<Vec<Cookie>> {
    if raw.trim().is_empty() {
        return ParseOutcome::Absent(None);
    }
    match CookieSource::classify(raw) {
        CookieSource::File(path) => parse_cookie_file(&path),
        CookieSource::Inline(s) => parse_cookie_string(&s),
    }
}

fn parse_cookie_file(path: &Path) -> ParseOutcome<Vec<Cookie>> {
    let parsed = std::fs::read_to_string(path)
        .map_err(|e| e.to_string())
        .and_then(|content| serde_json::from_str::<Vec<Cookie>>(&content).map_err(|e| e.to_string()));

    match parsed {
        Ok(cookies) if !cookies.is_empty() => ParseOutcome::Parsed(cookies),
        Ok(_) => ParseOutcome::Absent(None),
        Err(_) => ParseOutcome::Absent(Some(format!(
            "Could not parse cookie file {}",
            path.display()
        ))),
    }
}

fn parse_cookie_string(raw: &str) -> ParseOutcome<Vec<Cookie>> {
    let cookies: Vec<Cookie> = raw
        .split(';')
        .filter_map(|segment| {
            let (name, value) = segment.split_once('=')?;
            Some(Cookie {
                name: name.trim().to_string(),
                value: value.trim().to_string(),
                domain: String::new(),
                path: "/".to_string(),
            })
        })
        .collect();

    if cookies.is_empty() {
        ParseOutcome::Absent(None)
    } else {
        ParseOutcome::Parsed(cookies)
    }
}

/// Parse a `key: value` auth header string into a single header pair.
pub fn parse_auth_header(raw: &str) -> ParseOutcome<(String, String)> {
    match raw.split_once(':') {
        Some((key, value)) => {
            ParseOutcome::Parsed((key.trim().to_string(), value.trim().to_string()))
        }
        None => ParseOutcome::Absent(Some(format!("Invalid auth header format: {raw}"))),
    }
}
