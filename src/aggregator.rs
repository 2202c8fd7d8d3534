use crate::config::Thresholds;
use crate::heuristics::HeuristicFlags;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    #[serde(rename = "SAFE")]
    Safe,
    #[serde(rename = "PHISHING")]
    Phishing,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Safe => write!(f, "SAFE"),
            Verdict::Phishing => write!(f, "PHISHING"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    pub verdict: Verdict,
    pub confidence: f64,
    pub votes: u32,
    pub reason: String,
}

// Per-branch confidence constants. Deliberately fixed rather than derived
// from the input scores: the contract stays simple and testable at the cost
// of genuine calibration.
const CONF_WHITELIST: f64 = 1.0;
const CONF_CONSENSUS: f64 = 0.95;
const CONF_URL_OVERRIDE: f64 = 0.90;
const CONF_SUSPICIOUS_TLD: f64 = 0.85;
const CONF_RANDOM_SUBDOMAIN: f64 = 0.85;
const CONF_SUSPICIOUS_HYPHEN: f64 = 0.80;
const CONF_SAFE: f64 = 0.9;
const CONF_AMBIGUOUS: f64 = 0.45;

/// Combines collector scores and heuristic flags into the final verdict.
///
/// The policy is an ordered list of rules, first match wins. Votes give
/// multi-signal consensus; the overrides catch single-signal cases strong
/// enough to act alone, and structurally suspicious domains where the
/// tabular score alone is only moderate. A total function: whatever subset
/// of signals ran, it produces a verdict.
pub struct VerdictAggregator {
    url_vote: f64,
    text_vote: f64,
    url_override: f64,
    random_subdomain_url: f64,
}

impl VerdictAggregator {
    pub fn new(thresholds: &Thresholds) -> Self {
        VerdictAggregator {
            url_vote: thresholds.url_vote,
            text_vote: thresholds.text_vote,
            url_override: thresholds.url_override,
            random_subdomain_url: thresholds.random_subdomain_url,
        }
    }

    /// Number of signals crossing their individual decision thresholds.
    pub fn count_votes(&self, url_score: f64, text_score: f64, logos: &[String]) -> u32 {
        let mut votes = 0;
        if url_score > self.url_vote {
            votes += 1;
        }
        if text_score > self.text_vote {
            votes += 1;
        }
        if !logos.is_empty() {
            votes += 1;
        }
        votes
    }

    pub fn decide(
        &self,
        whitelisted: bool,
        url_score: f64,
        text_score: f64,
        logos: &[String],
        flags: &HeuristicFlags,
    ) -> Decision {
        if whitelisted {
            return Decision {
                verdict: Verdict::Safe,
                confidence: CONF_WHITELIST,
                votes: 0,
                reason: "trusted domain".to_string(),
            };
        }

        let votes = self.count_votes(url_score, text_score, logos);

        if votes >= 2 {
            log::warn!("Multi-signal consensus: {votes}/3 risk votes");
            return Decision {
                verdict: Verdict::Phishing,
                confidence: CONF_CONSENSUS,
                votes,
                reason: format!("{votes}/3 signals agree"),
            };
        }

        if url_score > self.url_override {
            log::warn!("Very high URL risk score ({url_score:.4}), overriding to PHISHING");
            return Decision {
                verdict: Verdict::Phishing,
                confidence: CONF_URL_OVERRIDE,
                votes,
                reason: format!("URL risk {url_score:.4} above override threshold"),
            };
        }

        if flags.suspicious_tld && url_score > self.url_vote {
            log::warn!("Suspicious TLD with moderate URL risk, overriding to PHISHING");
            return Decision {
                verdict: Verdict::Phishing,
                confidence: CONF_SUSPICIOUS_TLD,
                votes,
                reason: "suspicious TLD with moderate URL risk".to_string(),
            };
        }

        if flags.random_subdomain && url_score > self.random_subdomain_url {
            log::warn!("Random subdomain pattern with elevated URL risk, overriding to PHISHING");
            return Decision {
                verdict: Verdict::Phishing,
                confidence: CONF_RANDOM_SUBDOMAIN,
                votes,
                reason: "random subdomain with elevated URL risk".to_string(),
            };
        }

        if flags.suspicious_hyphen && url_score > self.url_vote {
            log::warn!("Hyphenated impersonation-style domain, overriding to PHISHING");
            return Decision {
                verdict: Verdict::Phishing,
                confidence: CONF_SUSPICIOUS_HYPHEN,
                votes,
                reason: "hyphenated impersonation-style domain".to_string(),
            };
        }

        // A lone vote is ambiguous evidence: still SAFE, but with low
        // confidence so callers can choose to warn.
        let confidence = if votes == 1 { CONF_AMBIGUOUS } else { CONF_SAFE };
        Decision {
            verdict: Verdict::Safe,
            confidence,
            votes,
            reason: if votes == 1 {
                "single ambiguous signal".to_string()
            } else {
                "no risk signals".to_string()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aggregator() -> VerdictAggregator {
        VerdictAggregator::new(&Thresholds::default())
    }

    fn no_flags() -> HeuristicFlags {
        HeuristicFlags::default()
    }

    fn logos(labels: &[&str]) -> Vec<String> {
        labels.iter().map(|l| l.to_string()).collect()
    }

    #[test]
    fn test_whitelist_short_circuits_everything() {
        // Maximally hostile signals lose to a trusted domain
        let flags = HeuristicFlags {
            suspicious_tld: true,
            random_subdomain: true,
            suspicious_hyphen: true,
            brand_keyword: true,
        };
        let d = aggregator().decide(true, 1.0, 1.0, &logos(&["paypal"]), &flags);
        assert_eq!(d.verdict, Verdict::Safe);
        assert_eq!(d.confidence, 1.0);
    }

    #[test]
    fn test_two_votes_is_consensus() {
        let d = aggregator().decide(false, 0.7, 0.9, &[], &no_flags());
        assert_eq!(d.verdict, Verdict::Phishing);
        assert_eq!(d.confidence, 0.95);
        assert_eq!(d.votes, 2);
    }

    #[test]
    fn test_three_votes_is_consensus() {
        let d = aggregator().decide(false, 0.99, 0.99, &logos(&["apple"]), &no_flags());
        assert_eq!(d.verdict, Verdict::Phishing);
        assert_eq!(d.confidence, 0.95);
        assert_eq!(d.votes, 3);
    }

    #[test]
    fn test_very_high_url_score_overrides_alone() {
        let d = aggregator().decide(false, 0.95, 0.0, &[], &no_flags());
        assert_eq!(d.verdict, Verdict::Phishing);
        assert_eq!(d.confidence, 0.90);
    }

    #[test]
    fn test_url_override_checked_before_tld_rule() {
        // Both rule 3 and rule 4 conditions hold; rule 3 wins on order
        let flags = HeuristicFlags { suspicious_tld: true, ..Default::default() };
        let d = aggregator().decide(false, 0.95, 0.0, &[], &flags);
        assert_eq!(d.verdict, Verdict::Phishing);
        assert_eq!(d.confidence, 0.90);
    }

    #[test]
    fn test_suspicious_tld_with_moderate_score() {
        let flags = HeuristicFlags { suspicious_tld: true, ..Default::default() };
        let d = aggregator().decide(false, 0.7, 0.0, &[], &flags);
        assert_eq!(d.verdict, Verdict::Phishing);
        assert_eq!(d.confidence, 0.85);
    }

    #[test]
    fn test_suspicious_tld_without_score_stays_safe() {
        let flags = HeuristicFlags { suspicious_tld: true, ..Default::default() };
        let d = aggregator().decide(false, 0.3, 0.0, &[], &flags);
        assert_eq!(d.verdict, Verdict::Safe);
        assert_eq!(d.confidence, 0.9);
    }

    #[test]
    fn test_random_subdomain_uses_lower_floor() {
        let flags = HeuristicFlags { random_subdomain: true, ..Default::default() };
        // 0.55 is below the vote threshold but above the subdomain floor
        let d = aggregator().decide(false, 0.55, 0.0, &[], &flags);
        assert_eq!(d.verdict, Verdict::Phishing);
        assert_eq!(d.confidence, 0.85);
        assert_eq!(d.votes, 0);
    }

    #[test]
    fn test_suspicious_hyphen_with_moderate_score() {
        let flags = HeuristicFlags { suspicious_hyphen: true, ..Default::default() };
        let d = aggregator().decide(false, 0.65, 0.0, &[], &flags);
        assert_eq!(d.verdict, Verdict::Phishing);
        assert_eq!(d.confidence, 0.80);
    }

    #[test]
    fn test_all_signals_absent_is_confident_safe() {
        let d = aggregator().decide(false, 0.0, 0.0, &[], &no_flags());
        assert_eq!(d.verdict, Verdict::Safe);
        assert_eq!(d.confidence, 0.9);
        assert_eq!(d.votes, 0);
    }

    #[test]
    fn test_single_vote_is_ambiguous_safe() {
        let d = aggregator().decide(false, 0.7, 0.0, &[], &no_flags());
        assert_eq!(d.verdict, Verdict::Safe);
        assert_eq!(d.confidence, 0.45);
        assert_eq!(d.votes, 1);
    }

    #[test]
    fn test_logo_alone_is_one_vote() {
        let d = aggregator().decide(false, 0.0, 0.0, &logos(&["netflix"]), &no_flags());
        assert_eq!(d.verdict, Verdict::Safe);
        assert_eq!(d.confidence, 0.45);
        assert_eq!(d.votes, 1);
    }

    #[test]
    fn test_deterministic() {
        let flags = HeuristicFlags { suspicious_tld: true, ..Default::default() };
        let a = aggregator().decide(false, 0.7, 0.5, &logos(&["apple"]), &flags);
        let b = aggregator().decide(false, 0.7, 0.5, &logos(&["apple"]), &flags);
        assert_eq!(a, b);
    }

    #[test]
    fn test_vote_thresholds_are_strict() {
        // Exactly at the threshold does not count as a vote
        assert_eq!(aggregator().count_votes(0.6, 0.85, &[]), 0);
        assert_eq!(aggregator().count_votes(0.601, 0.851, &[]), 2);
    }
}
