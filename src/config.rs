use serde::{Deserialize, Serialize};

/// Engine configuration: static trust/heuristic tables plus decision
/// thresholds. Loaded once at startup and passed by reference; nothing in
/// here mutates after load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Root domains trusted to bypass all scoring. Subdomains inherit trust.
    pub trusted_domains: Vec<String>,
    /// Low-reputation TLDs (leading dot), checked as domain suffixes.
    pub suspicious_tlds: Vec<String>,
    /// Brand/action keywords flagged when they appear inside the domain.
    pub brand_keywords: Vec<String>,
    pub thresholds: Thresholds,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Thresholds {
    /// URL-model probability above which the URL signal counts as a vote.
    pub url_vote: f64,
    /// Text-model probability above which the content signal counts as a
    /// vote. High on purpose: news/blog pages trip lower cutoffs.
    pub text_vote: f64,
    /// URL-model probability that forces PHISHING on its own.
    pub url_override: f64,
    /// URL-model floor paired with the random-subdomain heuristic.
    pub random_subdomain_url: f64,
    /// Minimum detection confidence for a logo label to be kept.
    pub logo_confidence_floor: f64,
    /// HTML shorter than this is not a meaningful text signal.
    pub min_html_len: usize,
    /// Screenshot payloads at or below this size are ignored.
    pub min_screenshot_len: usize,
    /// HTML is clamped to this many bytes before classification.
    pub max_html_chars: usize,
}

impl Default for Thresholds {
    fn default() -> Self {
        Thresholds {
            url_vote: 0.6,
            text_vote: 0.85,
            url_override: 0.90,
            random_subdomain_url: 0.5,
            logo_confidence_floor: 0.5,
            min_html_len: 50,
            min_screenshot_len: 100,
            max_html_chars: 8192,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            trusted_domains: vec![
                // Global tech giants
                "google.com".to_string(),
                "microsoft.com".to_string(),
                "facebook.com".to_string(),
                "youtube.com".to_string(),
                "github.com".to_string(),
                "amazon.com".to_string(),
                "stackoverflow.com".to_string(),
                "chatgpt.com".to_string(),
                "openai.com".to_string(),
                "apple.com".to_string(),
                "netflix.com".to_string(),
                "linkedin.com".to_string(),
                "twitter.com".to_string(),
                "x.com".to_string(),
                "instagram.com".to_string(),
                "reddit.com".to_string(),
                "wikipedia.org".to_string(),
                "discord.com".to_string(),
                "spotify.com".to_string(),
                "zoom.us".to_string(),
                "dropbox.com".to_string(),
                // Vietnamese trusted sites
                "vnexpress.net".to_string(),
                "tuoitre.vn".to_string(),
                "thanhnien.vn".to_string(),
                "dantri.com.vn".to_string(),
                "vietnamnet.vn".to_string(),
                "shopee.vn".to_string(),
                "tiki.vn".to_string(),
                "lazada.vn".to_string(),
                "sendo.vn".to_string(),
                "momo.vn".to_string(),
                "vietcombank.com.vn".to_string(),
                "techcombank.com.vn".to_string(),
                "vietinbank.vn".to_string(),
                "bidv.com.vn".to_string(),
                "fpt.com.vn".to_string(),
                "viettel.vn".to_string(),
                "vingroup.net".to_string(),
            ],
            suspicious_tlds: vec![
                ".cfd".to_string(),
                ".xyz".to_string(),
                ".top".to_string(),
                ".tk".to_string(),
                ".ml".to_string(),
                ".ga".to_string(),
                ".cf".to_string(),
                ".gq".to_string(),
                ".pw".to_string(),
                ".cc".to_string(),
                ".su".to_string(),
                ".buzz".to_string(),
                ".rest".to_string(),
                ".icu".to_string(),
                ".cam".to_string(),
                ".info".to_string(),
            ],
            brand_keywords: vec![
                "login".to_string(),
                "signin".to_string(),
                "verify".to_string(),
                "secure".to_string(),
                "account".to_string(),
                "update".to_string(),
                "confirm".to_string(),
                "bank".to_string(),
                "paypal".to_string(),
                "microsoft".to_string(),
                "apple".to_string(),
                "amazon".to_string(),
                "netflix".to_string(),
                "support".to_string(),
                "service".to_string(),
                "billing".to_string(),
                "invoice".to_string(),
            ],
            thresholds: Thresholds::default(),
        }
    }
}

impl EngineConfig {
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: EngineConfig = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_file(&self, path: &str) -> anyhow::Result<()> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        let t = &self.thresholds;
        for (name, value) in [
            ("url_vote", t.url_vote),
            ("text_vote", t.text_vote),
            ("url_override", t.url_override),
            ("random_subdomain_url", t.random_subdomain_url),
            ("logo_confidence_floor", t.logo_confidence_floor),
        ] {
            if !(0.0..=1.0).contains(&value) {
                anyhow::bail!("threshold '{}' must be in [0, 1], got {}", name, value);
            }
        }
        for tld in &self.suspicious_tlds {
            if !tld.starts_with('.') || tld.len() < 2 {
                anyhow::bail!("suspicious TLD '{}' must start with a dot", tld);
            }
        }
        if self.max_html_chars() < t.min_html_len {
            anyhow::bail!(
                "max_html_chars ({}) must not be smaller than min_html_len ({})",
                t.max_html_chars,
                t.min_html_len
            );
        }
        Ok(())
    }

    fn max_html_chars(&self) -> usize {
        self.thresholds.max_html_chars
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.trusted_domains.contains(&"google.com".to_string()));
        assert_eq!(config.suspicious_tlds.len(), 16);
    }

    #[test]
    fn test_yaml_round_trip() {
        let config = EngineConfig::default();
        let yaml = serde_yaml::to_string(&config).unwrap();
        let parsed: EngineConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed.trusted_domains, config.trusted_domains);
        assert_eq!(parsed.thresholds.url_vote, config.thresholds.url_vote);
    }

    #[test]
    fn test_rejects_out_of_range_threshold() {
        let mut config = EngineConfig::default();
        config.thresholds.url_vote = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_tld_without_dot() {
        let mut config = EngineConfig::default();
        config.suspicious_tlds.push("xyz".to_string());
        assert!(config.validate().is_err());
    }
}
