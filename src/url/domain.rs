use crate::{UrlError, UrlResult};
use url::Url;

/// Extracts the domain from a URL
///
/// Retrieves the host portion of a URL and converts it to lowercase. This is
/// the key under which learning records and learned patterns are stored.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use adaptive_crawler::url::extract_domain;
///
/// let url = Url::parse("https://EXAMPLE.COM/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("example.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Parses and validates a crawl target supplied by a caller
///
/// The target must be an absolute `http` or `https` URL with a host.
///
/// # Returns
///
/// * `Ok(Url)` - The parsed target
/// * `Err(UrlError)` - The input is empty, malformed, or not crawlable
pub fn parse_target_url(input: &str) -> UrlResult<Url> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(UrlError::Parse("URL cannot be empty".to_string()));
    }

    let url = Url::parse(trimmed).map_err(|e| UrlError::Parse(format!("{}: {}", trimmed, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(url),
        _ => Err(UrlError::MissingDomain),
    }
}

/// Validates a bare domain name supplied for discovery
///
/// Accepts hosts like `example.com` or `shop.example.co.uk`; rejects empty
/// input, schemes, paths, and anything that is not a plausible host name.
/// Returns the lowercased domain.
pub fn normalize_domain(input: &str) -> UrlResult<String> {
    let domain = input.trim().to_lowercase();

    if domain.is_empty() {
        return Err(UrlError::MalformedDomain(
            "domain cannot be empty".to_string(),
        ));
    }

    if !domain
        .chars()
        .all(|c| c.is_alphanumeric() || c == '.' || c == '-')
    {
        return Err(UrlError::MalformedDomain(format!(
            "'{}' contains invalid characters",
            domain
        )));
    }

    if domain.starts_with('.')
        || domain.ends_with('.')
        || domain.starts_with('-')
        || domain.ends_with('-')
        || domain.contains("..")
    {
        return Err(UrlError::MalformedDomain(format!(
            "'{}' is not a valid host name",
            domain
        )));
    }

    if !domain.contains('.') {
        return Err(UrlError::MalformedDomain(format!(
            "'{}' must contain at least one dot (e.g., 'example.com')",
            domain
        )));
    }

    Ok(domain)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_with_port() {
        let url = Url::parse("https://example.com:8080/").unwrap();
        assert_eq!(extract_domain(&url), Some("example.com".to_string()));
    }

    #[test]
    fn test_extract_mixed_case() {
        let url = Url::parse("https://Blog.Example.COM/post").unwrap();
        assert_eq!(extract_domain(&url), Some("blog.example.com".to_string()));
    }

    #[test]
    fn test_parse_target_url_accepts_http_and_https() {
        assert!(parse_target_url("https://example.com").is_ok());
        assert!(parse_target_url("http://example.com/page?q=1").is_ok());
        assert!(parse_target_url("  https://example.com/  ").is_ok());
    }

    #[test]
    fn test_parse_target_url_rejects_empty() {
        assert!(matches!(parse_target_url(""), Err(UrlError::Parse(_))));
        assert!(matches!(parse_target_url("   "), Err(UrlError::Parse(_))));
    }

    #[test]
    fn test_parse_target_url_rejects_relative_and_other_schemes() {
        assert!(matches!(
            parse_target_url("/just/a/path"),
            Err(UrlError::Parse(_))
        ));
        assert!(matches!(
            parse_target_url("ftp://example.com/file"),
            Err(UrlError::InvalidScheme(_))
        ));
        assert!(matches!(
            parse_target_url("mailto:someone@example.com"),
            Err(UrlError::InvalidScheme(_))
        ));
    }

    #[test]
    fn test_normalize_domain() {
        assert_eq!(normalize_domain("Example.COM").unwrap(), "example.com");
        assert_eq!(
            normalize_domain(" shop.example.co.uk ").unwrap(),
            "shop.example.co.uk"
        );

        assert!(normalize_domain("").is_err());
        assert!(normalize_domain("example").is_err());
        assert!(normalize_domain("https://example.com").is_err());
        assert!(normalize_domain("example.com/path").is_err());
        assert!(normalize_domain(".example.com").is_err());
        assert!(normalize_domain("exa mple.com").is_err());
    }
}
