pub mod aggregator;
pub mod config;
pub mod engine;
pub mod heuristics;
pub mod signals;
pub mod url_features;
pub mod whitelist;

pub use aggregator::{Decision, Verdict, VerdictAggregator};
pub use config::{EngineConfig, Thresholds};
pub use engine::{ScanEngine, ScanReport, ScanRequest};
pub use heuristics::{HeuristicDetector, HeuristicFlags};
pub use signals::{Detection, LogoDetector, ModelRegistry, TextClassifier, UrlClassifier};
pub use url_features::{UrlFeatureExtractor, FEATURE_COUNT};
pub use whitelist::DomainTrustFilter;
