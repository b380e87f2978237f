//! Scripted collaborators shared by the unit tests.

use crate::config::Config;
use crate::content_probe::{FetchedPage, PageFetcher};
use crate::detector::PhishingDetector;
use crate::domain_age::{DomainAgeCache, RegistrationLookup, RegistrationRecord};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Registration records keyed by domain; unknown domains fail
#[derive(Default)]
pub struct MockLookup {
    ages: HashMap<String, i64>,
    calls: Mutex<Vec<String>>,
}

impl MockLookup {
    pub fn with_ages(ages: &[(&str, i64)]) -> Arc<Self> {
        Arc::new(Self {
            ages: ages.iter().map(|(d, a)| (d.to_string(), *a)).collect(),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl RegistrationLookup for MockLookup {
    async fn lookup(&self, domain: &str) -> Result<RegistrationRecord> {
        self.calls.lock().unwrap().push(domain.to_string());
        let age = self
            .ages
            .get(domain)
            .ok_or_else(|| anyhow!("no WHOIS record for {domain}"))?;
        let created: DateTime<Utc> =
            Utc::now() - chrono::Duration::days(*age) - chrono::Duration::hours(1);
        Ok(RegistrationRecord {
            domain: domain.to_string(),
            creation_dates: vec![created],
        })
    }
}

/// Pages keyed by URL; unknown URLs behave like an unreachable host
#[derive(Default)]
pub struct MockFetcher {
    pages: HashMap<String, FetchedPage>,
    calls: AtomicUsize,
}

impl MockFetcher {
    pub fn with_pages(pages: &[(&str, u16, &str)]) -> Arc<Self> {
        Arc::new(Self {
            pages: pages
                .iter()
                .map(|(url, status, body)| {
                    (
                        url.to_string(),
                        FetchedPage {
                            status: *status,
                            body: body.to_string(),
                        },
                    )
                })
                .collect(),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PageFetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| anyhow!("error sending request for url ({url})"))
    }
}

pub fn test_config() -> Config {
    Config {
        lookup_delay_ms: 0,
        ..Config::default()
    }
}

pub fn detector(lookup: Arc<MockLookup>, fetcher: Arc<MockFetcher>) -> PhishingDetector {
    PhishingDetector::with_collaborators(&test_config(), DomainAgeCache::new(), lookup, fetcher)
}
