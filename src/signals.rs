use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use std::collections::BTreeSet;
use std::sync::Arc;

/// A single object-detector hit.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub label: String,
    pub confidence: f64,
}

/// Tabular model scoring the lexical feature vector. `expected_features` is
/// checked against the extractor at engine construction so a vector-length
/// drift fails loudly at startup instead of silently mis-scoring forever.
pub trait UrlClassifier: Send + Sync {
    fn expected_features(&self) -> usize;
    fn score(&self, features: &[f64]) -> anyhow::Result<f64>;
}

/// Text model scoring raw HTML for phishing language. Implementations are
/// expected to bound their own input (e.g. a 512-token budget).
pub trait TextClassifier: Send + Sync {
    fn score(&self, text: &str) -> anyhow::Result<f64>;
}

/// Object detector returning brand-logo hits for a decoded screenshot.
pub trait LogoDetector: Send + Sync {
    fn detect(&self, image: &[u8]) -> anyhow::Result<Vec<Detection>>;
}

/// The set of models available to the engine. Any slot may be empty: a
/// missing model is degraded mode, not an error, and its collector is simply
/// recorded as not having run.
#[derive(Default, Clone)]
pub struct ModelRegistry {
    pub url_model: Option<Arc<dyn UrlClassifier>>,
    pub text_model: Option<Arc<dyn TextClassifier>>,
    pub logo_model: Option<Arc<dyn LogoDetector>>,
}

impl ModelRegistry {
    pub fn with_url_model(mut self, model: Arc<dyn UrlClassifier>) -> Self {
        self.url_model = Some(model);
        self
    }

    pub fn with_text_model(mut self, model: Arc<dyn TextClassifier>) -> Self {
        self.text_model = Some(model);
        self
    }

    pub fn with_logo_model(mut self, model: Arc<dyn LogoDetector>) -> Self {
        self.logo_model = Some(model);
        self
    }
}

/// Outcome of one probability-producing collector. `score` stays 0.0 when
/// `ran` is false, so callers must consult `ran` rather than infer execution
/// from a nonzero score.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SignalResult {
    pub score: f64,
    pub ran: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogoResult {
    pub labels: Vec<String>,
    pub ran: bool,
}

/// Run the URL model over an extracted feature vector. Model faults are
/// contained here: they log and degrade to "did not run".
pub fn collect_url_score(
    model: Option<&Arc<dyn UrlClassifier>>,
    features: &[f64],
) -> SignalResult {
    let Some(model) = model else {
        return SignalResult::default();
    };
    match model.score(features) {
        Ok(score) => SignalResult {
            score: score.clamp(0.0, 1.0),
            ran: true,
        },
        Err(e) => {
            log::warn!("URL classifier failed, treating as not run: {e}");
            SignalResult::default()
        }
    }
}

/// Run the text model over the page HTML. Skipped for short HTML: a few
/// dozen characters is not a meaningful text signal. Oversized HTML is
/// silently clamped before classification.
pub fn collect_text_score(
    model: Option<&Arc<dyn TextClassifier>>,
    html: &str,
    min_len: usize,
    max_chars: usize,
) -> SignalResult {
    let Some(model) = model else {
        return SignalResult::default();
    };
    if html.len() <= min_len {
        log::debug!("HTML too short ({} bytes), skipping text analysis", html.len());
        return SignalResult::default();
    }
    match model.score(clamp_utf8(html, max_chars)) {
        Ok(score) => SignalResult {
            score: score.clamp(0.0, 1.0),
            ran: true,
        },
        Err(e) => {
            log::warn!("Text classifier failed, treating as not run: {e}");
            SignalResult::default()
        }
    }
}

/// Run the logo detector over a base64 screenshot payload. Only labels whose
/// detection confidence clears `confidence_floor` are kept, deduplicated.
/// Bad base64 or a detector fault degrades to "did not run".
pub fn collect_logo_labels(
    model: Option<&Arc<dyn LogoDetector>>,
    screenshot_base64: &str,
    min_len: usize,
    confidence_floor: f64,
) -> LogoResult {
    let Some(model) = model else {
        return LogoResult::default();
    };
    if screenshot_base64.len() <= min_len {
        log::debug!(
            "Screenshot payload too small ({} chars), skipping image analysis",
            screenshot_base64.len()
        );
        return LogoResult::default();
    }
    let image = match decode_screenshot(screenshot_base64) {
        Ok(image) => image,
        Err(e) => {
            log::warn!("Screenshot decode failed, treating as not run: {e}");
            return LogoResult::default();
        }
    };
    match model.detect(&image) {
        Ok(detections) => {
            let labels: BTreeSet<String> = detections
                .into_iter()
                .filter(|d| d.confidence > confidence_floor)
                .map(|d| d.label)
                .collect();
            LogoResult {
                labels: labels.into_iter().collect(),
                ran: true,
            }
        }
        Err(e) => {
            log::warn!("Logo detector failed, treating as not run: {e}");
            LogoResult::default()
        }
    }
}

/// Decode a screenshot payload, tolerating a data-URL prefix
/// ("data:image/png;base64,....").
fn decode_screenshot(payload: &str) -> anyhow::Result<Vec<u8>> {
    let raw = match payload.split_once(',') {
        Some((_, rest)) => rest,
        None => payload,
    };
    Ok(BASE64.decode(raw.trim())?)
}

/// Truncate to at most `max_chars` bytes without splitting a UTF-8 sequence.
fn clamp_utf8(text: &str, max_chars: usize) -> &str {
    if text.len() <= max_chars {
        return text;
    }
    let mut end = max_chars;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}
