//! Source text handed to the content pipeline.

/// Combine caller text and URL into the text the model reads.
///
/// The URL is appended as `"\n\nURL Source: <url>"`. Returns `None` when both
/// are missing or blank.
pub fn compose_source(text: Option<&str>, url: Option<&str>) -> Option<String> {
    let text = text.filter(|t| !t.trim().is_empty());
    let url = url.map(str::trim).filter(|u| !u.is_empty());

    match (text, url) {
        (None, None) => None,
        (text, url) => {
            let mut source = text.unwrap_or_default().to_string();
            if let Some(url) = url {
                source.push_str("\n\nURL Source: ");
                source.push_str(url);
            }
            Some(source)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_only() {
        assert_eq!(compose_source(Some("A story"), None).as_deref(), Some("A story"));
    }

    #[test]
    fn test_text_and_url() {
        assert_eq!(
            compose_source(Some("A story"), Some("https://example.com/post")).as_deref(),
            Some("A story\n\nURL Source: https://example.com/post")
        );
    }

    #[test]
    fn test_url_only() {
        assert_eq!(
            compose_source(None, Some(" https://example.com ")).as_deref(),
            Some("\n\nURL Source: https://example.com")
        );
    }

    #[test]
    fn test_nothing() {
        assert_eq!(compose_source(None, None), None);
        assert_eq!(compose_source(Some("  "), Some("")), None);
    }
}
