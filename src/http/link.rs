//! `Link` header parsing (RFC 8288)
//!
//! Format: `Link: <https://gitee.com/api/v5/user/repos?page=2>; rel="next", ...`

/// Page links advertised by a paginated response
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkHeader {
    pub first: Option<String>,
    pub prev: Option<String>,
    pub next: Option<String>,
    pub last: Option<String>,
}

impl LinkHeader {
    /// Name of the header carrying page links
    pub const HEADER_NAME: &'static str = "link";

    /// Parse a header value. Unknown relations and malformed entries are skipped.
    pub fn parse(header: &str) -> Self {
        let mut links = Self::default();

        for part in header.split(',') {
            let part = part.trim();
            let mut url = None;
            let mut rels: Vec<&str> = Vec::new();

            for segment in part.split(';') {
                let segment = segment.trim();
                if segment.starts_with('<') && segment.ends_with('>') && segment.len() >= 2 {
                    url = Some(&segment[1..segment.len() - 1]);
                } else if let Some(stripped) = segment.strip_prefix("rel=") {
                    let rel_value = stripped.trim_matches('"').trim_matches('\'');
                    rels.extend(rel_value.split_whitespace());
                }
            }

            let Some(url) = url else { continue };
            for rel in rels {
                let slot = match rel.to_ascii_lowercase().as_str() {
                    "first" => &mut links.first,
                    "prev" | "previous" => &mut links.prev,
                    "next" => &mut links.next,
                    "last" => &mut links.last,
                    _ => continue,
                };
                if slot.is_none() {
                    *slot = Some(url.to_string());
                }
            }
        }

        links
    }

    /// Links from a response's headers, if present
    pub fn from_headers(headers: &reqwest::header::HeaderMap) -> Option<Self> {
        headers
            .get(Self::HEADER_NAME)
            .and_then(|v| v.to_str().ok())
            .map(Self::parse)
    }
}

#[cfg(test)]
mod link_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_all_relations() {
        let header = r#"<https://api.github.com/user/repos?page=3>; rel="next", <https://api.github.com/user/repos?page=5>; rel="last", <https://api.github.com/user/repos?page=1>; rel="first", <https://api.github.com/user/repos?page=1>; rel="prev""#;
        let links = LinkHeader::parse(header);

        assert_eq!(
            links,
            LinkHeader {
                first: Some("https://api.github.com/user/repos?page=1".to_string()),
                prev: Some("https://api.github.com/user/repos?page=1".to_string()),
                next: Some("https://api.github.com/user/repos?page=3".to_string()),
                last: Some("https://api.github.com/user/repos?page=5".to_string()),
            }
        );
    }

    #[test]
    fn test_parse_last_page_has_no_next() {
        let header = r#"<https://gitee.com/api/v5/user/repos?page=1>; rel="first", <https://gitee.com/api/v5/user/repos?page=1>; rel="prev""#;
        let links = LinkHeader::parse(header);
        assert!(links.next.is_none());
        assert!(links.last.is_none());
        assert!(links.first.is_some());
    }

    #[test]
    fn test_parse_unquoted_and_multi_rel() {
        let links = LinkHeader::parse("<https://x.test/a?page=2>; rel=next, <https://x.test/a?page=9>; rel=\"last end\"");
        assert_eq!(links.next.as_deref(), Some("https://x.test/a?page=2"));
        assert_eq!(links.last.as_deref(), Some("https://x.test/a?page=9"));
    }

    #[test]
    fn test_parse_garbage() {
        assert_eq!(LinkHeader::parse(""), LinkHeader::default());
        assert_eq!(LinkHeader::parse("rel=\"next\""), LinkHeader::default());
        assert_eq!(LinkHeader::parse("<>; rel=\"next\"").next.as_deref(), Some(""));
    }
}
