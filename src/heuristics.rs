use crate::config::EngineConfig;
use regex::Regex;
use serde::Serialize;

/// Structural red flags computed from the request authority alone. Each is a
/// weak signal on its own; the aggregator only acts on them together with a
/// moderate URL-model score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct HeuristicFlags {
    pub suspicious_tld: bool,
    pub random_subdomain: bool,
    pub suspicious_hyphen: bool,
    pub brand_keyword: bool,
}

pub struct HeuristicDetector {
    suspicious_tlds: Vec<String>,
    brand_keywords: Vec<String>,
    random_run: Regex,
}

impl HeuristicDetector {
    pub fn new(config: &EngineConfig) -> anyhow::Result<Self> {
        Ok(HeuristicDetector {
            suspicious_tlds: config
                .suspicious_tlds
                .iter()
                .map(|t| t.to_lowercase())
                .collect(),
            brand_keywords: config
                .brand_keywords
                .iter()
                .map(|k| k.to_lowercase())
                .collect(),
            // A long alphanumeric run right before a dot, the shape of
            // auto-generated phishing subdomains.
            random_run: Regex::new(r"[a-z0-9]{10,}\.")?,
        })
    }

    pub fn analyze(&self, domain: &str) -> HeuristicFlags {
        let domain = domain.to_lowercase();
        HeuristicFlags {
            suspicious_tld: self
                .suspicious_tlds
                .iter()
                .any(|tld| domain.ends_with(tld.as_str())),
            random_subdomain: self.random_run.is_match(&domain),
            suspicious_hyphen: Self::has_suspicious_hyphen(&domain),
            brand_keyword: self.brand_keywords.iter().any(|kw| domain.contains(kw)),
        }
    }

    /// Hyphenated leftmost label, the "paypal-secure.com" pattern. A leading
    /// "www." is not the label being judged, and short labels ("e-bay") are
    /// too common legitimately to flag.
    fn has_suspicious_hyphen(domain: &str) -> bool {
        let without_www = domain.strip_prefix("www.").unwrap_or(domain);
        let main_label = without_www.split('.').next().unwrap_or("");
        main_label.contains('-') && main_label.len() > 5
    }
}
