use crate::domain_utils::DomainUtils;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{OnceCell, RwLock};

/// Sentinel for "age could not be determined"
pub const UNKNOWN_AGE: i64 = -1;

static CREATION_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^\s*(?:domain\s*)?(?:creation\s*date|created(?:\s*on|_date)?|registered(?:\s*on)?|registration\s*(?:date|time)|registration_time|domain_date_created|create_date|fecha\s*de\s*creaci[oó]n|date\s*de\s*cr[eé]ation|erstellt\s*am)\s*[:.]+\s*(.+?)\s*$",
    )
    .expect("creation date pattern must compile")
});

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegistrationRecord {
    pub domain: String,
    /// Creation dates in the order the registry reported them
    pub creation_dates: Vec<DateTime<Utc>>,
}

/// Source of domain registration records
#[async_trait]
pub trait RegistrationLookup: Send + Sync {
    async fn lookup(&self, domain: &str) -> Result<RegistrationRecord>;
}

/// Process-wide memo of resolved ages. Each domain gets its own cell so
/// concurrent callers for one domain share a single lookup.
#[derive(Debug, Clone, Default)]
pub struct DomainAgeCache {
    entries: Arc<RwLock<HashMap<String, Arc<OnceCell<i64>>>>>,
}

impl DomainAgeCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, domain: &str) -> Option<i64> {
        let entries = self.entries.read().await;
        entries.get(domain).and_then(|cell| cell.get().copied())
    }

    pub async fn len(&self) -> usize {
        let entries = self.entries.read().await;
        entries.values().filter(|cell| cell.initialized()).count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    async fn slot(&self, domain: &str) -> Arc<OnceCell<i64>> {
        {
            let entries = self.entries.read().await;
            if let Some(cell) = entries.get(domain) {
                return cell.clone();
            }
        }

        let mut entries = self.entries.write().await;
        entries.entry(domain.to_string()).or_default().clone()
    }

    /// Return the cached age or run `resolve` once to fill it
    pub async fn get_or_resolve<F, Fut>(&self, domain: &str, resolve: F) -> i64
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = i64>,
    {
        let cell = self.slot(domain).await;
        *cell.get_or_init(resolve).await
    }
}

pub struct DomainAgeResolver {
    cache: DomainAgeCache,
    lookup: Arc<dyn RegistrationLookup>,
    lookup_delay: Duration,
    wildcard_suffixes: Vec<String>,
}

impl DomainAgeResolver {
    pub fn new(
        cache: DomainAgeCache,
        lookup: Arc<dyn RegistrationLookup>,
        lookup_delay: Duration,
        wildcard_suffixes: Vec<String>,
    ) -> Self {
        Self {
            cache,
            lookup,
            lookup_delay,
            wildcard_suffixes,
        }
    }

    pub fn cache(&self) -> &DomainAgeCache {
        &self.cache
    }

    /// Domains whose registration says nothing about the site itself
    pub fn skips_lookup(&self, domain: &str) -> bool {
        domain.is_empty()
            || DomainUtils::matches_suffix(domain, &self.wildcard_suffixes)
            || domain.matches('.').count() > 2
    }

    /// Age of `domain` in days, or -1. Never fails; every outcome is cached.
    pub async fn resolve_age(&self, domain: &str) -> i64 {
        let domain = domain.trim().to_lowercase();
        self.cache
            .get_or_resolve(&domain, || self.resolve_uncached(&domain))
            .await
    }

    async fn resolve_uncached(&self, domain: &str) -> i64 {
        if self.skips_lookup(domain) {
            log::debug!("Skipping registration lookup for {domain:?}");
            return UNKNOWN_AGE;
        }

        // Registries throttle aggressive clients
        tokio::time::sleep(self.lookup_delay).await;

        match self.lookup.lookup(domain).await {
            Ok(record) => match record.creation_dates.first() {
                Some(created) => {
                    let age = age_in_days(*created, Utc::now());
                    log::debug!("Domain {domain} is {age} days old");
                    age
                }
                None => {
                    log::warn!("No creation date in registration record for {domain}");
                    UNKNOWN_AGE
                }
            },
            Err(e) => {
                log::warn!("WHOIS error for domain {domain}: {e}");
                UNKNOWN_AGE
            }
        }
    }
}

/// Whole days between creation and `now`; future dates count as zero
pub fn age_in_days(created: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - created).num_days().max(0)
}

/// Registration lookup over the WHOIS protocol (TCP port 43)
#[derive(Debug, Clone)]
pub struct WhoisClient {
    timeout: Duration,
}

impl WhoisClient {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Determine the appropriate WHOIS server for a domain
    pub fn whois_server_for(domain: &str) -> &'static str {
        let tld = domain.split('.').next_back().unwrap_or(domain);

        match tld {
            "com" | "net" => "whois.verisign-grs.com",
            "org" => "whois.pir.org",
            "info" => "whois.afilias.net",
            "biz" => "whois.neulevel.biz",
            "us" => "whois.nic.us",
            "uk" => "whois.nic.uk",
            "de" => "whois.denic.de",
            "fr" => "whois.afnic.fr",
            "it" => "whois.nic.it",
            "nl" => "whois.domain-registry.nl",
            "au" => "whois.auda.org.au",
            "ca" => "whois.cira.ca",
            "jp" => "whois.jprs.jp",
            "cn" => "whois.cnnic.cn",
            "ru" => "whois.tcinet.ru",
            "br" => "whois.registro.br",
            "in" => "whois.registry.in",
            "io" => "whois.nic.io",
            "mx" => "whois.mx",
            "tk" => "whois.dot.tk",
            "ml" => "whois.dot.ml",
            "ga" => "whois.dot.ga",
            "cf" => "whois.dot.cf",
            _ => "whois.iana.org",
        }
    }

    async fn query_whois_server(&self, server: &str, domain: &str) -> Result<String> {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};
        use tokio::net::TcpStream;
        use tokio::time::timeout;

        log::debug!("Connecting to WHOIS server: {server}:43");

        let mut stream = timeout(self.timeout, TcpStream::connect(format!("{server}:43"))).await??;

        stream.write_all(format!("{domain}\r\n").as_bytes()).await?;

        // Registries answer in assorted encodings
        let mut raw = Vec::new();
        timeout(self.timeout, stream.read_to_end(&mut raw)).await??;
        let response = String::from_utf8_lossy(&raw).into_owned();

        if response.trim().is_empty() {
            return Err(anyhow!("Empty WHOIS response from {server}"));
        }

        Ok(response)
    }

    async fn try_fallback_whois_servers(&self, domain: &str) -> Result<RegistrationRecord> {
        for server in ["whois.iana.org", "whois.internic.net"] {
            log::debug!("Trying fallback WHOIS server: {server}");
            match self.query_whois_server(server, domain).await {
                Ok(text) => return Ok(parse_whois_text(&text, domain)),
                Err(e) => log::debug!("Fallback server {server} failed: {e}"),
            }
        }

        Err(anyhow!("All WHOIS servers failed for {domain}"))
    }
}

#[async_trait]
impl RegistrationLookup for WhoisClient {
    async fn lookup(&self, domain: &str) -> Result<RegistrationRecord> {
        let root_domain = DomainUtils::extract_root_domain(domain);

        if root_domain.is_empty()
            || !root_domain.contains('.')
            || root_domain.contains(|c: char| c.is_whitespace() || c == ',' || c == ';')
        {
            return Err(anyhow!("Invalid domain format: {root_domain} (from: {domain})"));
        }

        let server = Self::whois_server_for(&root_domain);
        log::debug!("Using WHOIS server {server} for {root_domain}");

        match self.query_whois_server(server, &root_domain).await {
            Ok(text) => Ok(parse_whois_text(&text, &root_domain)),
            Err(e) => {
                log::debug!("WHOIS query to {server} failed: {e}");
                self.try_fallback_whois_servers(&root_domain).await
            }
        }
    }
}

/// Collect every parseable creation date line of a WHOIS response
pub fn parse_whois_text(text: &str, domain: &str) -> RegistrationRecord {
    let creation_dates: Vec<DateTime<Utc>> = text
        .lines()
        .filter_map(|line| CREATION_LINE.captures(line))
        .filter_map(|captures| {
            let value = captures.get(1)?.as_str();
            let parsed = parse_date_string(value);
            if parsed.is_none() {
                log::debug!("Could not parse date format: '{value}'");
            }
            parsed
        })
        .collect();

    if creation_dates.is_empty() {
        let preview: String = text.chars().take(500).collect();
        log::debug!("Could not find creation date in WHOIS response. Preview: {preview}");
    }

    RegistrationRecord {
        domain: domain.to_string(),
        creation_dates,
    }
}

/// Parse the date formats registries commonly emit
pub fn parse_date_string(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();

    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Ok(parsed) = DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%z") {
        return Some(parsed.with_timezone(&Utc));
    }

    const DATETIME_FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S",
        "%Y.%m.%d %H:%M:%S",
        "%d-%b-%Y %H:%M:%S",
    ];
    const DATE_FORMATS: [&str; 8] = [
        "%Y-%m-%d", "%Y.%m.%d", "%Y/%m/%d", "%d-%b-%Y", "%d-%m-%Y", "%d.%m.%Y", "%m/%d/%Y",
        "%Y%m%d",
    ];

    // Trailing zone names ("CLST", "(JST)") are dropped
    let tokens: Vec<&str> = value.split_whitespace().collect();
    let candidates = [
        value.to_string(),
        tokens.iter().take(2).copied().collect::<Vec<_>>().join(" "),
        tokens.first().copied().unwrap_or("").to_string(),
    ];

    for candidate in &candidates {
        let candidate = candidate.trim_end_matches('Z');
        for format in DATETIME_FORMATS {
            if let Ok(parsed) = NaiveDateTime::parse_from_str(candidate, format) {
                return Some(Utc.from_utc_datetime(&parsed));
            }
        }
        for format in DATE_FORMATS {
            if let Ok(date) = NaiveDate::parse_from_str(candidate, format) {
                return date
                    .and_hms_opt(0, 0, 0)
                    .map(|parsed| Utc.from_utc_datetime(&parsed));
            }
        }
    }

    None
}
