#![allow(clippy::uninlined_format_args)]

use phishscan::config::Config;
use phishscan::content_probe::{HttpFetcher, LiveContentProber};
use phishscan::domain_age::{DomainAgeCache, DomainAgeResolver, WhoisClient, UNKNOWN_AGE};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    println!("Testing REAL WHOIS lookups and content probes (no mocks)...");

    let config = Config::default();
    let resolver = DomainAgeResolver::new(
        DomainAgeCache::new(),
        Arc::new(WhoisClient::new(config.whois_timeout())),
        config.lookup_delay(),
        config.wildcard_suffixes.clone(),
    );
    let prober = LiveContentProber::new(Arc::new(HttpFetcher::new(
        config.probe_timeout(),
        &config.user_agent,
    )?));

    let test_domains = vec![
        "google.com",
        "example.com",
        "www.paypal.com",
        "foo.blogspot.com",
        "this-domain-should-not-exist-4821.com",
    ];

    for domain in test_domains {
        println!("\n=== Domain: {} ===", domain);

        let age = resolver.resolve_age(domain).await;
        if age == UNKNOWN_AGE {
            println!("  Age: unknown");
        } else {
            println!("  Age: {} days", age);
        }

        let url = format!("https://{}/", domain);
        println!("  Probe {}: {}", url, prober.probe(&url).await);
    }

    println!("\n=== Cache ===");
    println!("  Entries: {}", resolver.cache().len().await);

    Ok(())
}
