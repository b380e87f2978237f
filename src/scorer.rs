//! Risk Scorer
//!
//! Turns a [`FeatureSet`] into the final verdict. Every triggered signal adds
//! one point; impersonation skips scoring entirely. Weights and thresholds
//! are fixed so results stay comparable between runs.

use crate::domain_age::UNKNOWN_AGE;
use crate::features::pattern::PatternVerdict;
use crate::features::FeatureSet;
use serde::{Deserialize, Serialize};
use std::fmt;

/// URLs longer than this many characters score a point
pub const MAX_URL_LENGTH: usize = 150;
/// Domains younger than this many days score a point
pub const MIN_DOMAIN_AGE_DAYS: i64 = 30;
/// Scores at or above this are phishing
pub const PHISHING_THRESHOLD: u32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    Legitimate,
    Phishing,
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Classification::Legitimate => f.write_str("legitimate"),
            Classification::Phishing => f.write_str("phishing"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RiskAssessment {
    pub score: u32,
    pub reasons: Vec<String>,
    pub classification: Classification,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RiskScorer;

impl RiskScorer {
    pub fn new() -> Self {
        Self
    }

    pub fn assess(&self, features: &FeatureSet) -> RiskAssessment {
        if features.pattern_verdict == PatternVerdict::Impersonation {
            let brand = features.impersonated_brand.as_deref().unwrap_or("a known brand");
            return RiskAssessment {
                score: 0,
                reasons: vec![format!("Domain impersonates {brand}")],
                classification: Classification::Phishing,
            };
        }

        let checks = [
            (
                features.url_length > MAX_URL_LENGTH,
                format!("URL longer than {MAX_URL_LENGTH} characters"),
            ),
            (!features.has_ssl, "No HTTPS".to_string()),
            (
                features.has_suspicious_keyword,
                "Suspicious keyword in URL".to_string(),
            ),
            (
                features.pattern_verdict == PatternVerdict::Suspicious,
                "Suspicious URL pattern".to_string(),
            ),
            (
                features.domain_age_days == UNKNOWN_AGE
                    || features.domain_age_days < MIN_DOMAIN_AGE_DAYS,
                if features.domain_age_days == UNKNOWN_AGE {
                    "Domain age unknown".to_string()
                } else {
                    format!("Domain younger than {MIN_DOMAIN_AGE_DAYS} days")
                },
            ),
            (
                features.probe.is_risky(),
                format!("Live content check: {}", features.probe),
            ),
        ];

        let reasons: Vec<String> = checks
            .into_iter()
            .filter(|(triggered, _)| *triggered)
            .map(|(_, reason)| reason)
            .collect();
        let score = reasons.len() as u32;

        RiskAssessment {
            score,
            reasons,
            classification: Self::classify_score(score),
        }
    }

    pub fn classify(&self, features: &FeatureSet) -> Classification {
        self.assess(features).classification
    }

    pub fn classify_score(score: u32) -> Classification {
        if score >= PHISHING_THRESHOLD {
            Classification::Phishing
        } else {
            Classification::Legitimate
        }
    }
}
