//! Lexical signals computed from the raw URL string alone.

pub const SUSPICIOUS_KEYWORDS: [&str; 6] = ["login", "verify", "secure", "account", "update", "bank"];

/// Character count of the raw URL
pub fn url_length(url: &str) -> usize {
    url.chars().count()
}

/// True when the URL starts with an `https` scheme prefix (case-insensitive)
pub fn has_ssl(url: &str) -> bool {
    url.to_lowercase().starts_with("https")
}

pub fn has_suspicious_keyword(url: &str) -> bool {
    let url_lower = url.to_lowercase();
    SUSPICIOUS_KEYWORDS
        .iter()
        .any(|keyword| url_lower.contains(keyword))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_length_counts_characters() {
        assert_eq!(url_length(""), 0);
        assert_eq!(url_length("https://a.io"), 12);
        // Multi-byte characters count once
        assert_eq!(url_length("http://bücher.de"), 16);
    }

    #[test]
    fn test_has_ssl() {
        assert!(has_ssl("https://example.com"));
        assert!(has_ssl("HTTPS://EXAMPLE.COM"));
        assert!(!has_ssl("http://example.com"));
        assert!(!has_ssl("example.com/https"));
        assert!(!has_ssl(""));
    }

    #[test]
    fn test_has_suspicious_keyword() {
        assert!(has_suspicious_keyword("http://example.com/LOGIN"));
        assert!(has_suspicious_keyword("https://mybank.example"));
        assert!(has_suspicious_keyword("http://x.com/?next=account"));
        assert!(!has_suspicious_keyword("https://www.paypal.com/signin"));
        assert!(!has_suspicious_keyword(""));
    }
}
