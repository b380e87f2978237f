use url::Url;

/// Minimal URL/domain helpers that never fail on malformed input
pub struct DomainUtils;

impl DomainUtils {
    /// Extract the lower-cased host of a URL, without port or userinfo.
    /// Returns an empty string when no authority can be found.
    pub fn extract_host(url: &str) -> String {
        let trimmed = url.trim();

        if let Ok(parsed) = Url::parse(trimmed) {
            if let Some(host) = parsed.host_str() {
                return host
                    .trim_start_matches('[')
                    .trim_end_matches(']')
                    .to_lowercase();
            }
            // Parsed fine but carries no host (mailto:, "paypal.com:443", ...)
            if !trimmed.contains("//") {
                return String::new();
            }
        }

        Self::authority_fallback(trimmed)
    }

    /// Hand-rolled authority extraction for strings the url crate rejects
    fn authority_fallback(url: &str) -> String {
        let Some(start) = url.find("//") else {
            return String::new();
        };

        let rest = &url[start + 2..];
        let authority = rest.split(['/', '?', '#']).next().unwrap_or("");

        // Drop userinfo
        let host_port = authority.rsplit('@').next().unwrap_or("");

        let host = if let Some(stripped) = host_port.strip_prefix('[') {
            stripped.split(']').next().unwrap_or("")
        } else {
            host_port.split(':').next().unwrap_or("")
        };

        host.to_lowercase()
    }

    /// Display form of a host: punycode labels (`xn--...`) are decoded so
    /// lookalike letters from other scripts stay visible. Undecodable labels
    /// are kept as they are.
    pub fn unicode_host(host: &str) -> String {
        let (decoded, result) = idna::domain_to_unicode(host);
        if result.is_err() {
            log::debug!("Could not fully decode host {host}");
        }
        decoded.to_lowercase()
    }

    /// The label right before the TLD: "secure.paypal-login.com" -> "paypal-login".
    /// Hosts without a dot are returned unchanged.
    pub fn main_label(host: &str) -> &str {
        let parts: Vec<&str> = host.split('.').collect();
        if parts.len() >= 2 {
            parts[parts.len() - 2]
        } else {
            host
        }
    }

    /// Extract root domain for WHOIS queries (removes subdomains)
    /// e.g., "www.paypal.com" -> "paypal.com"
    pub fn extract_root_domain(domain: &str) -> String {
        let parts: Vec<&str> = domain.split('.').collect();

        if parts.len() < 2 {
            return domain.to_string();
        }

        let root = format!("{}.{}", parts[parts.len() - 2], parts[parts.len() - 1]);

        if parts.len() >= 3 {
            let common_two_part_tlds = [
                "co.uk", "com.au", "co.jp", "co.kr", "com.br", "co.za", "com.mx", "co.in",
                "com.sg", "co.nz", "com.ar", "co.il", "org.uk", "net.au", "gov.uk", "ac.uk",
                "edu.au",
            ];

            if common_two_part_tlds.contains(&root.as_str()) {
                return format!("{}.{}", parts[parts.len() - 3], root);
            }
        }

        root
    }

    /// Check if domain matches any in list (exact or as a subdomain)
    pub fn matches_suffix(domain: &str, suffixes: &[String]) -> bool {
        let domain_lower = domain.to_lowercase();
        suffixes
            .iter()
            .any(|suffix| domain_lower.ends_with(&suffix.to_lowercase()))
    }
}
