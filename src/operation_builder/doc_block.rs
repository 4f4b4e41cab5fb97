//! Facts carried by a handler's doc comment.
//!
//! A doc block is free text followed by tag lines:
//!
//! ```text
//! List employees.
//!
//! Paginated, ordered by last name.
//!
//! @see https://example.com/docs/employees Employee guide
//! @throws NotFoundException when the department does not exist
//! @deprecated
//! ```
//!
//! The first paragraph is the summary, the remaining paragraphs the description.

use crate::annotation::{DocTag, ThrowsDirective};
use crate::openapi::ExternalDocs;
use url::Url;

/// A doc comment split into summary, description and tags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocBlock {
    pub summary: Option<String>,
    pub description: Option<String>,
    pub tags: Vec<DocTag>,
}

impl DocBlock {
    pub fn parse(text: &str) -> Self {
        let mut paragraphs: Vec<Vec<&str>> = vec![Vec::new()];
        let mut tags = Vec::new();

        for line in text.lines().map(str::trim) {
            if let Some(tag) = line.strip_prefix('@') {
                let (name, body) = tag.split_once(char::is_whitespace).unwrap_or((tag, ""));
                if !name.is_empty() {
                    tags.push(DocTag::new(name, body.trim()));
                }
                continue;
            }
            if line.is_empty() {
                if paragraphs.last().is_some_and(|p| !p.is_empty()) {
                    paragraphs.push(Vec::new());
                }
                continue;
            }
            if let Some(paragraph) = paragraphs.last_mut() {
                paragraph.push(line);
            }
        }

        let mut paragraphs = paragraphs
            .into_iter()
            .filter(|p| !p.is_empty())
            .map(|p| p.join(" "));
        let summary = paragraphs.next();
        let rest: Vec<String> = paragraphs.collect();
        let description = (!rest.is_empty()).then(|| rest.join("\n\n"));

        Self {
            summary,
            description,
            tags,
        }
    }

    /// `@throws Type description` tags.
    pub fn throws(&self) -> Vec<ThrowsDirective> {
        self.tags
            .iter()
            .filter(|tag| tag.name == "throws")
            .filter_map(|tag| {
                let (exception, description) = tag
                    .body
                    .split_once(char::is_whitespace)
                    .unwrap_or((tag.body.as_str(), ""));
                if exception.is_empty() {
                    return None;
                }
                let description = description.trim();
                Some(ThrowsDirective {
                    exception: exception.to_string(),
                    description: (!description.is_empty()).then(|| description.to_string()),
                })
            })
            .collect()
    }
}

pub fn is_deprecated(tags: &[DocTag]) -> bool {
    tags.iter().any(|tag| tag.name == "deprecated")
}

/// External docs from the first valid `@link`, else the first valid `@see`.
pub fn external_docs(tags: &[DocTag]) -> Option<ExternalDocs> {
    first_link(tags, "link").or_else(|| first_link(tags, "see"))
}

fn first_link(tags: &[DocTag], name: &str) -> Option<ExternalDocs> {
    tags.iter()
        .filter(|tag| tag.name == name)
        .find_map(|tag| parse_link(&tag.body))
}

/// `https://host/path Optional description`. Only absolute http(s) URLs with a host qualify.
fn parse_link(body: &str) -> Option<ExternalDocs> {
    let body = body.trim();
    let (raw_url, description) = body.split_once(char::is_whitespace).unwrap_or((body, ""));
    let url = Url::parse(raw_url).ok()?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return None;
    }
    let description = description.trim();
    Some(ExternalDocs {
        url: raw_url.to_string(),
        description: (!description.is_empty()).then(|| description.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_summary_description_and_tags() {
        let block = DocBlock::parse(
            "List employees.\n\nPaginated,\nordered by last name.\n\nSecond paragraph.\n\n@deprecated\n@throws NotFoundException when missing",
        );
        assert_eq!(block.summary.as_deref(), Some("List employees."));
        assert_eq!(
            block.description.as_deref(),
            Some("Paginated, ordered by last name.\n\nSecond paragraph.")
        );
        assert_eq!(
            block.tags,
            vec![
                DocTag::new("deprecated", ""),
                DocTag::new("throws", "NotFoundException when missing"),
            ]
        );
        assert!(is_deprecated(&block.tags));
    }

    #[test]
    fn test_throws_tags() {
        let block = DocBlock::parse("@throws BadRequestException\n@throws\n@throws Conflict Already exists");
        let throws = block.throws();
        assert_eq!(throws.len(), 2);
        assert_eq!(throws[0].exception, "BadRequestException");
        assert_eq!(throws[0].description, None);
        assert_eq!(throws[1].description.as_deref(), Some("Already exists"));
    }

    #[test]
    fn test_link_wins_over_see() {
        let tags = vec![
            DocTag::new("see", "https://example.com/see See docs"),
            DocTag::new("link", "https://example.com/link Link docs"),
        ];
        assert_eq!(
            external_docs(&tags),
            Some(ExternalDocs {
                url: "https://example.com/link".to_string(),
                description: Some("Link docs".to_string()),
            })
        );
    }

    #[test]
    fn test_invalid_link_falls_back_to_see() {
        let tags = vec![
            DocTag::new("link", "not-a-url"),
            DocTag::new("see", "SomeClass::method"),
            DocTag::new("see", "http://example.com/docs"),
        ];
        let docs = external_docs(&tags).unwrap();
        assert_eq!(docs.url, "http://example.com/docs");
        assert_eq!(docs.description, None);
    }

    #[test]
    fn test_non_http_urls_ignored() {
        let tags = vec![
            DocTag::new("link", "ftp://example.com/file"),
            DocTag::new("see", "mailto:someone@example.com"),
        ];
        assert_eq!(external_docs(&tags), None);
        assert!(!is_deprecated(&tags));
    }
}
