use crate::domain_utils::DomainUtils;
use crate::similarity;

/// Ratio a label must exceed to count as a lookalike of a brand
pub const SIMILARITY_THRESHOLD: f64 = 0.75;

pub const DEFAULT_BRANDS: &[&str] = &[
    "microsoft", "paypal", "google", "apple", "amazon", "linkedin",
    "facebook", "instagram", "twitter", "tiktok", "netflix",
    "whatsapp", "youtube", "icloud", "gmail", "outlook",
    "bankofamerica", "wellsfargo", "chase", "citibank", "capitalone",
    "hdfc", "icici", "sbi", "axisbank", "kotak",
    "flipkart", "snapdeal", "myntra", "olx", "ebay",
    "github", "gitlab", "dropbox", "adobe", "zoom",
    "spotify", "airbnb", "uber", "zomato", "swiggy",
    "venmo", "revolut", "stripe", "binance",
    "telegram", "discord", "skype", "yahoo", "protonmail",
    "pinterest", "quora", "reddit", "booking", "expedia",
];

#[derive(Debug, Clone, PartialEq)]
pub struct BrandMatch {
    pub brand: String,
    pub label: String,
    pub score: f64,
}

/// Map confusable digits to the letter they imitate
pub fn normalize(label: &str) -> String {
    label
        .chars()
        .map(|c| match c {
            '0' => 'o',
            '1' => 'l',
            '3' => 'e',
            '5' => 's',
            '7' => 't',
            '8' => 'b',
            other => other,
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct BrandImpersonationAnalyzer {
    brands: Vec<String>,
}

impl Default for BrandImpersonationAnalyzer {
    fn default() -> Self {
        Self::new(DEFAULT_BRANDS.iter().map(|b| b.to_string()).collect())
    }
}

impl BrandImpersonationAnalyzer {
    pub fn new(brands: Vec<String>) -> Self {
        let brands = brands
            .into_iter()
            .map(|b| b.trim().to_lowercase())
            .filter(|b| !b.is_empty())
            .collect();
        Self { brands }
    }

    pub fn brands(&self) -> &[String] {
        &self.brands
    }

    /// Detect a host whose main label looks like a brand without spelling it.
    /// The first qualifying brand in list order is reported. Punycode hosts
    /// are compared in their Unicode form.
    pub fn detect(&self, host: &str) -> Option<BrandMatch> {
        let host = DomainUtils::unicode_host(host);
        let label = DomainUtils::main_label(&host);
        let normalized = normalize(label);

        for brand in &self.brands {
            let score = similarity::ratio(&normalized, brand);
            let looks_alike = score > SIMILARITY_THRESHOLD;
            let spells_brand = label.contains(brand.as_str());

            if looks_alike && !spells_brand {
                log::info!("Impersonation detected: {label} -> {brand} (score: {score:.2})");
                return Some(BrandMatch {
                    brand: brand.clone(),
                    label: label.to_string(),
                    score,
                });
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("paypa1"), "paypal");
        assert_eq!(normalize("g00g1e"), "google");
        assert_eq!(normalize("57385"), "stebs");
        assert_eq!(normalize("micros0ft-login"), "microsoft-login");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn test_digit_lookalike_detected() {
        let analyzer = BrandImpersonationAnalyzer::default();

        let detection = analyzer.detect("paypa1.com").unwrap();
        assert_eq!(detection.brand, "paypal");
        assert_eq!(detection.label, "paypa1");
        assert!((detection.score - 1.0).abs() < 1e-9);

        assert_eq!(analyzer.detect("www.micros0ft.com").unwrap().brand, "microsoft");
        assert_eq!(analyzer.detect("faceb00k.net").unwrap().brand, "facebook");
    }

    #[test]
    fn test_typo_lookalike_detected() {
        let analyzer = BrandImpersonationAnalyzer::default();

        assert_eq!(analyzer.detect("arnazon.com").unwrap().brand, "amazon");
        assert_eq!(analyzer.detect("gooogle.com").unwrap().brand, "google");
    }

    #[test]
    fn test_mixed_script_homograph_detected() {
        let analyzer = BrandImpersonationAnalyzer::default();

        // Cyrillic "а" in place of the first Latin "a"
        let detection = analyzer.detect("p\u{0430}ypal.com").unwrap();
        assert_eq!(detection.brand, "paypal");
        assert_eq!(detection.label, "p\u{0430}ypal");
        assert!((detection.score - 5.0 / 6.0).abs() < 1e-9);

        // Same host as the url crate hands it over
        let detection = analyzer.detect("xn--pypal-4ve.com").unwrap();
        assert_eq!(detection.brand, "paypal");
        assert_eq!(detection.label, "p\u{0430}ypal");
    }

    #[test]
    fn test_literal_brand_is_not_impersonation() {
        let analyzer = BrandImpersonationAnalyzer::default();

        assert!(analyzer.detect("www.paypal.com").is_none());
        assert!(analyzer.detect("login.paypal.com").is_none());
        assert!(analyzer.detect("paypals.com").is_none());
    }

    #[test]
    fn test_unrelated_and_long_labels() {
        let analyzer = BrandImpersonationAnalyzer::default();

        assert!(analyzer.detect("wikipedia.org").is_none());
        assert!(analyzer.detect("").is_none());
        // Extra words dilute the ratio below the threshold
        assert!(analyzer.detect("paypa1-login-secure.com").is_none());
    }

    #[test]
    fn test_threshold_is_exclusive() {
        // ratio("abcd", "bcde") is exactly 0.75
        let analyzer = BrandImpersonationAnalyzer::new(vec!["bcde".to_string()]);
        assert!(analyzer.detect("abcd.com").is_none());
    }

    #[test]
    fn test_first_brand_in_order_wins() {
        let analyzer =
            BrandImpersonationAnalyzer::new(vec!["paypai".to_string(), "paypal".to_string()]);
        assert_eq!(analyzer.detect("paypa1.com").unwrap().brand, "paypai");
    }
}
