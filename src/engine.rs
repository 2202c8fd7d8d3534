use crate::aggregator::{Verdict, VerdictAggregator};
use crate::config::EngineConfig;
use crate::heuristics::HeuristicDetector;
use crate::signals::{
    collect_logo_labels, collect_text_score, collect_url_score, LogoResult, ModelRegistry,
    SignalResult,
};
use crate::url_features::{UrlFeatureExtractor, FEATURE_COUNT};
use crate::whitelist::DomainTrustFilter;
use serde::{Deserialize, Serialize};
use url::Url;

pub const MODULE_WHITELIST: &str = "WHITELIST_PASSED";
pub const MODULE_URL: &str = "URL";
pub const MODULE_TEXT: &str = "TEXT";
pub const MODULE_IMAGE: &str = "IMAGE";

/// One resource to classify. Immutable once received; nothing about a scan
/// persists across requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanRequest {
    pub url: String,
    #[serde(default)]
    pub html_content: String,
    #[serde(default)]
    pub screenshot_base64: String,
}

impl ScanRequest {
    pub fn for_url(url: &str) -> Self {
        ScanRequest {
            url: url.to_string(),
            html_content: String::new(),
            screenshot_base64: String::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    pub url: String,
    pub final_verdict: Verdict,
    pub confidence: f64,
    pub details: ScanDetails,
}

/// Per-signal breakdown. Scores default to 0 for modules that did not run,
/// so `modules_run` is the only reliable record of what executed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanDetails {
    pub url_score: f64,
    pub text_score: f64,
    pub logo_detected: Vec<String>,
    pub risk_votes: u32,
    pub modules_run: Vec<String>,
}

/// The full scan pipeline: trusted-domain bypass, lexical feature
/// extraction, the three signal collectors, heuristic detectors, and the
/// verdict aggregator. Holds only read-only state, so one engine serves any
/// number of concurrent scans.
pub struct ScanEngine {
    config: EngineConfig,
    registry: ModelRegistry,
    trust_filter: DomainTrustFilter,
    extractor: UrlFeatureExtractor,
    heuristics: HeuristicDetector,
    aggregator: VerdictAggregator,
}

impl ScanEngine {
    /// Fails when the configuration is invalid or when a loaded URL model
    /// disagrees with the extractor about vector length. The mismatch check
    /// is deliberate: feeding a model a wrong-shaped vector produces
    /// plausible-looking garbage scores, so it must never get that far.
    pub fn new(config: EngineConfig, registry: ModelRegistry) -> anyhow::Result<Self> {
        config.validate()?;
        if let Some(model) = &registry.url_model {
            let expected = model.expected_features();
            if expected != FEATURE_COUNT {
                anyhow::bail!(
                    "URL model expects {} features but the extractor produces {}; \
                     refusing to start with a mismatched model",
                    expected,
                    FEATURE_COUNT
                );
            }
        }
        let trust_filter = DomainTrustFilter::new(&config.trusted_domains);
        let heuristics = HeuristicDetector::new(&config)?;
        let aggregator = VerdictAggregator::new(&config.thresholds);
        Ok(ScanEngine {
            trust_filter,
            extractor: UrlFeatureExtractor::new()?,
            heuristics,
            aggregator,
            config,
            registry,
        })
    }

    pub fn trust_filter(&self) -> &DomainTrustFilter {
        &self.trust_filter
    }

    pub fn heuristics(&self) -> &HeuristicDetector {
        &self.heuristics
    }

    pub fn extractor(&self) -> &UrlFeatureExtractor {
        &self.extractor
    }

    /// Classify one resource. Total: every failure mode inside degrades to
    /// a missing signal, and the aggregator decides from whatever is left.
    pub async fn scan(&self, request: &ScanRequest) -> ScanReport {
        log::info!("Analyzing: {}", request.url);

        let domain = Self::request_domain(&request.url);

        // Trust check runs before everything, including malformed-URL
        // handling: a weird URL that still parses to a trusted host is
        // trusted.
        if self.trust_filter.is_trusted(&domain) {
            log::info!("Trusted domain, bypassing analysis: {domain}");
            return ScanReport {
                url: request.url.clone(),
                final_verdict: Verdict::Safe,
                confidence: 1.0,
                details: ScanDetails {
                    modules_run: vec![MODULE_WHITELIST.to_string()],
                    ..ScanDetails::default()
                },
            };
        }

        let features = self.extractor.extract(&request.url);
        let (url_signal, text_signal, logo_signal) = self.collect_signals(request, features).await;

        let flags = self.heuristics.analyze(&domain);
        log::debug!("Heuristic flags for {domain}: {flags:?}");

        let decision = self.aggregator.decide(
            false,
            url_signal.score,
            text_signal.score,
            &logo_signal.labels,
            &flags,
        );
        log::info!(
            "Verdict for {}: {} (confidence {:.2}, {}/3 votes, {})",
            request.url,
            decision.verdict,
            decision.confidence,
            decision.votes,
            decision.reason
        );

        let mut modules_run = Vec::new();
        if url_signal.ran {
            modules_run.push(MODULE_URL.to_string());
        }
        if text_signal.ran {
            modules_run.push(MODULE_TEXT.to_string());
        }
        if logo_signal.ran {
            modules_run.push(MODULE_IMAGE.to_string());
        }

        ScanReport {
            url: request.url.clone(),
            final_verdict: decision.verdict,
            confidence: decision.confidence,
            details: ScanDetails {
                url_score: url_signal.score,
                text_score: text_signal.score,
                logo_detected: logo_signal.labels,
                risk_votes: decision.votes,
                modules_run,
            },
        }
    }

    /// Run the three collectors concurrently on the blocking pool; none of
    /// them depends on another, and the aggregator waits for all of them.
    async fn collect_signals(
        &self,
        request: &ScanRequest,
        features: Vec<f64>,
    ) -> (SignalResult, SignalResult, LogoResult) {
        let t = &self.config.thresholds;
        let (min_html, max_html) = (t.min_html_len, t.max_html_chars);
        let (min_shot, floor) = (t.min_screenshot_len, t.logo_confidence_floor);

        let url_model = self.registry.url_model.clone();
        let url_task =
            tokio::task::spawn_blocking(move || collect_url_score(url_model.as_ref(), &features));

        let text_model = self.registry.text_model.clone();
        let html = request.html_content.clone();
        let text_task = tokio::task::spawn_blocking(move || {
            collect_text_score(text_model.as_ref(), &html, min_html, max_html)
        });

        let logo_model = self.registry.logo_model.clone();
        let screenshot = request.screenshot_base64.clone();
        let logo_task = tokio::task::spawn_blocking(move || {
            collect_logo_labels(logo_model.as_ref(), &screenshot, min_shot, floor)
        });

        let (url_signal, text_signal, logo_signal) = tokio::join!(url_task, text_task, logo_task);

        (
            url_signal.unwrap_or_else(|e| {
                log::warn!("URL collector task failed: {e}");
                SignalResult::default()
            }),
            text_signal.unwrap_or_else(|e| {
                log::warn!("Text collector task failed: {e}");
                SignalResult::default()
            }),
            logo_signal.unwrap_or_else(|e| {
                log::warn!("Image collector task failed: {e}");
                LogoResult::default()
            }),
        )
    }

    fn request_domain(url: &str) -> String {
        Url::parse(url.trim())
            .ok()
            .and_then(|u| u.host_str().map(|h| h.to_lowercase()))
            .unwrap_or_default()
    }
}
