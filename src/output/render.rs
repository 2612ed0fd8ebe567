//! Renderers for extracted page signals

use crate::crawler::Signals;
use crate::Result;
use std::fmt::Write;

/// Renders signals as Markdown
///
/// Sections with no content are left out entirely.
///
/// # Example
///
/// ```
/// use scrawler::crawler::Signals;
/// use scrawler::output::render_markdown;
///
/// let signals = Signals {
///     title: "Home".to_string(),
///     headings: vec!["Welcome".to_string()],
///     ..Signals::default()
/// };
/// assert_eq!(render_markdown(&signals), "# Home\n\n## Headings\n\n- Welcome\n\n");
/// ```
pub fn render_markdown(signals: &Signals) -> String {
    let mut out = String::new();

    if !signals.title.is_empty() {
        let _ = write!(out, "# {}\n\n", signals.title);
    }
    if !signals.meta_description.is_empty() {
        let _ = write!(out, "> {}\n\n", signals.meta_description);
    }
    if !signals.headings.is_empty() {
        out.push_str("## Headings\n\n");
        for heading in &signals.headings {
            let _ = writeln!(out, "- {}", heading);
        }
        out.push('\n');
    }
    if !signals.paragraphs.is_empty() {
        out.push_str("## Paragraphs\n\n");
        for paragraph in &signals.paragraphs {
            let _ = write!(out, "{}\n\n", paragraph);
        }
    }
    if !signals.links.is_empty() {
        out.push_str("## Links\n\n");
        for link in &signals.links {
            let _ = writeln!(out, "- {}", link);
        }
        out.push('\n');
    }

    out
}

/// Renders signals as plain text, one block per section
pub fn render_plain_text(signals: &Signals) -> String {
    let mut out = String::new();

    if !signals.title.is_empty() {
        let _ = write!(out, "{}\n\n", signals.title);
    }
    if !signals.meta_description.is_empty() {
        let _ = write!(out, "{}\n\n", signals.meta_description);
    }
    for heading in &signals.headings {
        let _ = writeln!(out, "{}", heading);
    }
    if !signals.headings.is_empty() {
        out.push('\n');
    }
    for paragraph in &signals.paragraphs {
        let _ = write!(out, "{}\n\n", paragraph);
    }
    for link in &signals.links {
        let _ = writeln!(out, "{}", link);
    }
    if !signals.links.is_empty() {
        out.push('\n');
    }

    out
}

/// Renders signals as pretty-printed JSON
pub fn render_json(signals: &Signals) -> Result<String> {
    Ok(serde_json::to_string_pretty(signals)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Signals {
        Signals {
            url: "https://example.com/".to_string(),
            title: "Example".to_string(),
            meta_description: "An example page".to_string(),
            headings: vec!["Intro".to_string(), "Usage".to_string()],
            paragraphs: vec!["A paragraph that is long enough.".to_string()],
            links: vec!["https://example.com/a".to_string()],
        }
    }

    #[test]
    fn test_render_markdown_full() {
        let expected = "# Example\n\n\
                        > An example page\n\n\
                        ## Headings\n\n- Intro\n- Usage\n\n\
                        ## Paragraphs\n\nA paragraph that is long enough.\n\n\
                        ## Links\n\n- https://example.com/a\n\n";
        assert_eq!(render_markdown(&sample()), expected);
    }

    #[test]
    fn test_render_markdown_empty() {
        assert_eq!(render_markdown(&Signals::default()), "");
    }

    #[test]
    fn test_render_plain_text() {
        let expected = "Example\n\n\
                        An example page\n\n\
                        Intro\nUsage\n\n\
                        A paragraph that is long enough.\n\n\
                        https://example.com/a\n\n";
        assert_eq!(render_plain_text(&sample()), expected);
    }

    #[test]
    fn test_render_json_fields() {
        let json = render_json(&sample()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["url"], "https://example.com/");
        assert_eq!(value["meta_description"], "An example page");
        assert_eq!(value["headings"][1], "Usage");
        assert!(json.contains("\n  \"title\""));
    }

    #[test]
    fn test_render_json_omits_empty_description() {
        let signals = Signals {
            meta_description: String::new(),
            ..sample()
        };
        let json = render_json(&signals).unwrap();
        assert!(!json.contains("meta_description"));
    }
}
