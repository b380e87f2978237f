pub mod batch;
pub mod config;
pub mod content_probe;
pub mod detector;
pub mod domain_age;
pub mod domain_utils;
pub mod features;
pub mod scorer;
pub mod similarity;

#[cfg(test)]
mod test_support;

pub use batch::{BatchRunner, BatchSummary};
pub use config::Config;
pub use detector::{BatchResult, PhishingDetector};
pub use features::FeatureSet;
pub use scorer::{Classification, RiskAssessment};
