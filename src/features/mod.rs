pub mod brand_impersonation;
pub mod lexical;
pub mod pattern;

use crate::content_probe::ProbeOutcome;
use pattern::PatternVerdict;
use serde::Serialize;

/// Every per-URL signal the scorer consumes. Built once per URL and not
/// modified afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureSet {
    pub url: String,
    pub domain: String,
    pub url_length: usize,
    pub has_ssl: bool,
    pub has_suspicious_keyword: bool,
    pub pattern_verdict: PatternVerdict,
    pub impersonated_brand: Option<String>,
    /// Days since registration, or -1 when unknown
    pub domain_age_days: i64,
    pub probe: ProbeOutcome,
}

impl FeatureSet {
    pub fn has_login_form(&self) -> bool {
        self.probe == ProbeOutcome::LoginForm
    }
}
