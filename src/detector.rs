use crate::config::Config;
use crate::content_probe::{HttpFetcher, LiveContentProber, PageFetcher, ProbeOutcome};
use crate::domain_age::{DomainAgeCache, DomainAgeResolver, RegistrationLookup, WhoisClient};
use crate::domain_utils::DomainUtils;
use crate::features::brand_impersonation::BrandImpersonationAnalyzer;
use crate::features::lexical;
use crate::features::pattern::{PatternAnalysis, PatternClassifier, PatternVerdict};
use crate::features::FeatureSet;
use crate::scorer::{Classification, RiskAssessment, RiskScorer};
use futures_util::stream::{self, StreamExt};
use serde::Serialize;
use std::sync::Arc;

/// One row of a batch run
#[derive(Debug, Clone, Serialize)]
pub struct BatchResult {
    pub url: String,
    pub features: FeatureSet,
    pub classification: Classification,
}

/// URL classification pipeline: lexical, pattern, domain age, live content
pub struct PhishingDetector {
    patterns: PatternClassifier,
    ages: DomainAgeResolver,
    prober: LiveContentProber,
    scorer: RiskScorer,
    concurrency: usize,
}

impl PhishingDetector {
    /// Detector backed by real WHOIS and HTTP clients
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let lookup = Arc::new(WhoisClient::new(config.whois_timeout()));
        let fetcher = Arc::new(HttpFetcher::new(config.probe_timeout(), &config.user_agent)?);
        Ok(Self::with_collaborators(
            config,
            DomainAgeCache::new(),
            lookup,
            fetcher,
        ))
    }

    pub fn with_collaborators(
        config: &Config,
        cache: DomainAgeCache,
        lookup: Arc<dyn RegistrationLookup>,
        fetcher: Arc<dyn PageFetcher>,
    ) -> Self {
        let brands = BrandImpersonationAnalyzer::new(config.brands.clone());

        Self {
            patterns: PatternClassifier::new(brands),
            ages: DomainAgeResolver::new(
                cache,
                lookup,
                config.lookup_delay(),
                config.wildcard_suffixes.clone(),
            ),
            prober: LiveContentProber::new(fetcher),
            scorer: RiskScorer::new(),
            concurrency: config.concurrency.max(1),
        }
    }

    pub fn age_cache(&self) -> &DomainAgeCache {
        self.ages.cache()
    }

    /// Every signal for `url`. The domain age is always resolved; lookalike
    /// pages are never fetched and report `NoMatch`.
    pub async fn extract_features(&self, url: &str) -> FeatureSet {
        let analysis = self.patterns.analyze(url);
        self.collect_features(url, analysis).await
    }

    async fn collect_features(&self, url: &str, analysis: PatternAnalysis) -> FeatureSet {
        let domain = DomainUtils::extract_host(url);
        let domain_age_days = self.ages.resolve_age(&domain).await;
        let probe = if analysis.verdict == PatternVerdict::Impersonation {
            ProbeOutcome::NoMatch
        } else {
            self.prober.probe(url).await
        };

        FeatureSet {
            url: url.to_string(),
            url_length: lexical::url_length(url),
            has_ssl: lexical::has_ssl(url),
            has_suspicious_keyword: lexical::has_suspicious_keyword(url),
            pattern_verdict: analysis.verdict,
            impersonated_brand: analysis.brand_match.map(|m| m.brand),
            domain,
            domain_age_days,
            probe,
        }
    }

    pub async fn assess(&self, url: &str) -> (FeatureSet, RiskAssessment) {
        let features = self.extract_features(url).await;
        let assessment = self.scorer.assess(&features);
        log::debug!(
            "{url}: score {} -> {} ({})",
            assessment.score,
            assessment.classification,
            assessment.reasons.join("; ")
        );
        (features, assessment)
    }

    /// Impersonation is decided before any network stage runs
    pub async fn classify(&self, url: &str) -> Classification {
        let analysis = self.patterns.analyze(url);
        if analysis.verdict == PatternVerdict::Impersonation {
            return Classification::Phishing;
        }

        let features = self.collect_features(url, analysis).await;
        self.scorer.classify(&features)
    }

    /// Classify many URLs concurrently; results keep the input order
    pub async fn classify_batch<S: AsRef<str>>(&self, urls: &[S]) -> Vec<BatchResult> {
        log::info!(
            "Classifying {} URLs ({} at a time)",
            urls.len(),
            self.concurrency
        );

        stream::iter(urls.iter().map(|url| url.as_ref()))
            .map(|url| async move {
                let features = self.extract_features(url).await;
                let classification = self.scorer.classify(&features);
                BatchResult {
                    url: url.to_string(),
                    features,
                    classification,
                }
            })
            .buffered(self.concurrency)
            .collect()
            .await
    }
}
