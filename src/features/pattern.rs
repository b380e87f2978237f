use super::brand_impersonation::{BrandImpersonationAnalyzer, BrandMatch};
use crate::domain_utils::DomainUtils;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const SHORTENING_SERVICES: [&str; 6] =
    ["bit.ly", "tinyurl.com", "goo.gl", "t.co", "bit.do", "ow.ly"];

// Applied to the raw URL. `\d` flags nearly every real URL; kept for parity
// with the scores this detector was calibrated on.
static SUSPICIOUS_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"@",
        r"-\w*\.com",
        r"\d",
        r"^\d{1,3}(\.\d{1,3}){3}$",
        r"(?:https?://)?(?:www\.)?\d+\.\d+\.\d+\.\d+",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("suspicious URL pattern must compile"))
    .collect()
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternVerdict {
    Clean,
    Suspicious,
    Impersonation,
}

impl fmt::Display for PatternVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PatternVerdict::Clean => "clean",
            PatternVerdict::Suspicious => "suspicious",
            PatternVerdict::Impersonation => "impersonation",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PatternAnalysis {
    pub verdict: PatternVerdict,
    pub brand_match: Option<BrandMatch>,
}

#[derive(Debug, Clone, Default)]
pub struct PatternClassifier {
    brands: BrandImpersonationAnalyzer,
}

impl PatternClassifier {
    pub fn new(brands: BrandImpersonationAnalyzer) -> Self {
        Self { brands }
    }

    /// Check if a host belongs to a known shortener
    pub fn is_shortener(host: &str) -> bool {
        SHORTENING_SERVICES.iter().any(|service| host.contains(service))
    }

    pub fn matches_suspicious_pattern(url: &str) -> bool {
        SUSPICIOUS_PATTERNS.iter().any(|re| re.is_match(url))
    }

    /// Categorical verdict; impersonation, then shorteners, then raw patterns
    pub fn analyze(&self, url: &str) -> PatternAnalysis {
        let host = DomainUtils::extract_host(url);

        if let Some(brand_match) = self.brands.detect(&host) {
            return PatternAnalysis {
                verdict: PatternVerdict::Impersonation,
                brand_match: Some(brand_match),
            };
        }

        let verdict = if Self::is_shortener(&host) {
            log::debug!("Shortening service host: {host}");
            PatternVerdict::Suspicious
        } else if Self::matches_suspicious_pattern(url) {
            PatternVerdict::Suspicious
        } else {
            PatternVerdict::Clean
        };

        PatternAnalysis {
            verdict,
            brand_match: None,
        }
    }

    pub fn classify(&self, url: &str) -> PatternVerdict {
        self.analyze(url).verdict
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_url() {
        let classifier = PatternClassifier::default();
        assert_eq!(
            classifier.classify("https://www.paypal.com/signin"),
            PatternVerdict::Clean
        );
        assert_eq!(
            classifier.classify("https://example.org/about"),
            PatternVerdict::Clean
        );
    }

    #[test]
    fn test_shorteners_are_suspicious() {
        let classifier = PatternClassifier::default();
        assert_eq!(
            classifier.classify("https://bit.ly/abcdef"),
            PatternVerdict::Suspicious
        );
        assert_eq!(
            classifier.classify("http://tinyurl.com/xyz"),
            PatternVerdict::Suspicious
        );
        assert!(PatternClassifier::is_shortener("ow.ly"));
        assert!(!PatternClassifier::is_shortener("example.com"));
    }

    #[test]
    fn test_regex_patterns() {
        let classifier = PatternClassifier::default();
        for url in [
            "http://user@example.org",
            "http://secure-update.com/",
            "http://192.168.10.4/index.html",
            "10.0.0.1",
            "https://example.org/page2",
        ] {
            assert_eq!(classifier.classify(url), PatternVerdict::Suspicious, "{url}");
        }
    }

    #[test]
    fn test_any_digit_is_suspicious() {
        // Deliberately broad: a single digit anywhere is enough
        assert!(PatternClassifier::matches_suspicious_pattern(
            "https://www.wikipedia.org/wiki/2"
        ));
        assert!(!PatternClassifier::matches_suspicious_pattern(
            "https://www.wikipedia.org/wiki/Rust"
        ));
    }

    #[test]
    fn test_shortener_and_pattern_both_suspicious() {
        let classifier = PatternClassifier::default();
        assert_eq!(
            classifier.classify("https://bit.ly/a1-b.com"),
            PatternVerdict::Suspicious
        );
    }

    #[test]
    fn test_impersonation_takes_precedence() {
        let classifier = PatternClassifier::default();

        // Also has a digit, an "@" and a hyphenated ".com"
        let analysis = classifier.analyze("http://paypa1.com/a-b.com?u=me@x");
        assert_eq!(analysis.verdict, PatternVerdict::Impersonation);
        assert_eq!(analysis.brand_match.unwrap().brand, "paypal");
    }

    #[test]
    fn test_idn_homograph_is_impersonation() {
        let classifier = PatternClassifier::default();

        for url in ["http://p\u{0430}ypal.com/", "http://xn--pypal-4ve.com/"] {
            let analysis = classifier.analyze(url);
            assert_eq!(analysis.verdict, PatternVerdict::Impersonation, "{url}");
            assert_eq!(analysis.brand_match.unwrap().brand, "paypal");
        }
    }

    #[test]
    fn test_malformed_input() {
        let classifier = PatternClassifier::default();
        assert_eq!(classifier.classify(""), PatternVerdict::Clean);
        assert_eq!(classifier.classify("::::"), PatternVerdict::Clean);
        assert_eq!(classifier.classify("ht!tp://x"), PatternVerdict::Clean);
    }

    #[test]
    fn test_verdict_display() {
        assert_eq!(PatternVerdict::Impersonation.to_string(), "impersonation");
        assert_eq!(PatternVerdict::Clean.to_string(), "clean");
    }
}
