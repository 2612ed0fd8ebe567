//! On-disk layout for saved pages and extractions
//!
//! Pages land at `{out}/{host}/{dirs}/{name}` and extractions at
//! `{out}/extract/{host}/{dirs}/{base}.{ext}`. The host and every path segment
//! are sanitized separately, so the result always stays under `out`.

use crate::config::ExtractFormat;
use crate::crawler::Signals;
use crate::output::render::{render_json, render_markdown, render_plain_text};
use crate::state::ContentFingerprint;
use crate::{Result, ScrawlerError};
use std::path::{Path, PathBuf};
use url::Url;

/// Subdirectory of the output directory holding extractions
pub const EXTRACT_DIR: &str = "extract";

/// Cleans one host or path component for use as a file or directory name
///
/// `..` is removed, `\` and `/` separators are trimmed from the ends, and the
/// characters `: * ? " < > |` become `_`. An empty result becomes `site`.
///
/// # Examples
///
/// ```
/// use scrawler::output::sanitize;
///
/// assert_eq!(sanitize("example.com:8080"), "example.com_8080");
/// assert_eq!(sanitize(".."), "site");
/// ```
pub fn sanitize(component: &str) -> String {
    let cleaned = component.replace("..", "").replace('\\', "/");
    let cleaned = cleaned.trim().trim_matches('/');
    if cleaned.is_empty() {
        return "site".to_string();
    }
    cleaned
        .chars()
        .map(|c| match c {
            ':' | '*' | '?' | '"' | '<' | '>' | '|' | '/' => '_',
            other => other,
        })
        .collect()
}

/// Directory parts and final segment of a URL path
struct PathParts {
    dirs: Vec<String>,
    /// Last segment, `None` for a root path or a trailing slash
    leaf: Option<String>,
}

fn split_path(url: &Url) -> PathParts {
    let path = url.path().replace('\\', "/");
    let trailing = path.is_empty() || path.ends_with('/');

    let mut segments: Vec<String> = path
        .split('/')
        .map(|s| s.replace("..", ""))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .map(|s| sanitize(&s))
        .collect();

    let leaf = if trailing { None } else { segments.pop() };
    PathParts {
        dirs: segments,
        leaf,
    }
}

fn host_dir(url: &Url) -> String {
    sanitize(url.host_str().unwrap_or_default())
}

fn query_suffix(url: &Url) -> Option<String> {
    url.query()
        .filter(|q| !q.is_empty())
        .map(|q| ContentFingerprint::of(q.as_bytes()).to_hex())
}

fn join_dirs(root: PathBuf, dirs: &[String]) -> PathBuf {
    dirs.iter().fold(root, |acc, dir| acc.join(dir))
}

/// Computes where a fetched page is written
///
/// # Naming
///
/// - Root path or trailing slash: `index.html`
/// - Last segment without a `.`: `.html` is appended
/// - Query string present: `-{hash}` is inserted before the extension
pub fn page_location(out_dir: &Path, url: &Url) -> PathBuf {
    let parts = split_path(url);

    let (stem, ext) = match parts.leaf {
        None => ("index".to_string(), "html".to_string()),
        Some(leaf) => match leaf.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => (stem.to_string(), ext.to_string()),
            Some(_) => (leaf.clone(), String::new()),
            None => (leaf.clone(), "html".to_string()),
        },
    };

    let stem = match query_suffix(url) {
        Some(hash) => format!("{}-{}", stem, hash),
        None => stem,
    };
    let name = if ext.is_empty() {
        stem
    } else {
        format!("{}.{}", stem, ext)
    };

    join_dirs(out_dir.join(host_dir(url)), &parts.dirs).join(name)
}

/// Computes where the extraction for a page is written
///
/// The base name is the last path segment with its extension removed, or
/// `index` for a root path or trailing slash.
pub fn extraction_location(out_dir: &Path, url: &Url, format: ExtractFormat) -> PathBuf {
    let parts = split_path(url);

    let base = match parts.leaf {
        None => "index".to_string(),
        Some(leaf) => match leaf.rsplit_once('.') {
            Some((stem, _)) if !stem.is_empty() => stem.to_string(),
            Some(_) => "index".to_string(),
            None => leaf.clone(),
        },
    };
    let base = match query_suffix(url) {
        Some(hash) => format!("{}-{}", base, hash),
        None => base,
    };

    join_dirs(out_dir.join(EXTRACT_DIR).join(host_dir(url)), &parts.dirs)
        .join(format!("{}.{}", base, format.extension()))
}

async fn write_file(path: &Path, contents: &[u8]) -> Result<()> {
    let to_error = |source| ScrawlerError::SaveFailed {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await.map_err(to_error)?;
    }
    tokio::fs::write(path, contents).await.map_err(to_error)
}

/// Writes a page body under the output directory
///
/// # Returns
///
/// * `Ok(PathBuf)` - Where the page was written
/// * `Err(ScrawlerError::SaveFailed)` - The directory or file could not be written
pub async fn save_page(out_dir: &Path, url: &Url, body: &[u8]) -> Result<PathBuf> {
    let path = page_location(out_dir, url);
    write_file(&path, body).await?;
    Ok(path)
}

/// Renders and writes the extraction for a page
pub async fn save_extraction(
    out_dir: &Path,
    url: &Url,
    format: ExtractFormat,
    signals: &Signals,
) -> Result<PathBuf> {
    let rendered = match format {
        ExtractFormat::Json => render_json(signals)?,
        ExtractFormat::Markdown => render_markdown(signals),
        ExtractFormat::Text => render_plain_text(signals),
    };

    let path = extraction_location(out_dir, url, format);
    write_file(&path, rendered.as_bytes()).await?;
    Ok(path)
}
