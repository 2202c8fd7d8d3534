use regex::Regex;
use url::{Host, Url};

/// Number of lexical features the URL model was trained on. The extractor
/// output order below is part of the model contract: reordering or resizing
/// it silently invalidates every score the model produces.
pub const FEATURE_COUNT: usize = 21;

pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "url_length",
    "hostname_length",
    "path_length",
    "count_at",
    "count_dash",
    "count_dot",
    "count_slash",
    "count_question",
    "count_equal",
    "count_http",
    "count_www",
    "count_special",
    "is_https",
    "is_ip",
    "has_login",
    "has_secure",
    "has_account",
    "has_verify",
    "has_signin",
    "has_bank",
    "has_confirm",
];

const URL_KEYWORDS: [&str; 7] = [
    "login", "secure", "account", "verify", "signin", "bank", "confirm",
];

/// Turns a raw URL string into the fixed-length lexical feature vector.
/// Never fails: an unparsable URL yields all zeros so a garbage input
/// degrades to a meaningless-but-harmless score instead of an error.
pub struct UrlFeatureExtractor {
    special_chars: Regex,
}

impl UrlFeatureExtractor {
    pub fn new() -> anyhow::Result<Self> {
        Ok(UrlFeatureExtractor {
            special_chars: Regex::new(r#"[!@#$%^&*(),?":{}|<>]"#)?,
        })
    }

    pub fn extract(&self, url: &str) -> Vec<f64> {
        let url = url.trim();
        let parsed = match Url::parse(url) {
            Ok(parsed) => parsed,
            Err(e) => {
                log::debug!("URL parse failed for feature extraction: {e}");
                return vec![0.0; FEATURE_COUNT];
            }
        };

        let authority = Self::authority(&parsed);
        let path = Self::path_as_written(url, &parsed);
        let url_lower = url.to_lowercase();

        // Slashes are counted with the "://" scheme separator stripped so the
        // protocol delimiter is not misread as path depth.
        let slash_count = url.replace("://", "").matches('/').count();

        let is_ip = matches!(parsed.host(), Some(Host::Ipv4(_)) | Some(Host::Ipv6(_)));

        let mut features = vec![
            url.len() as f64,
            authority.len() as f64,
            path.len() as f64,
            url.matches('@').count() as f64,
            url.matches('-').count() as f64,
            url.matches('.').count() as f64,
            slash_count as f64,
            url.matches('?').count() as f64,
            url.matches('=').count() as f64,
            url.matches("http").count() as f64,
            url.matches("www").count() as f64,
            self.special_chars.find_iter(url).count() as f64,
            if parsed.scheme() == "https" { 1.0 } else { 0.0 },
            if is_ip { 1.0 } else { 0.0 },
        ];

        for keyword in URL_KEYWORDS {
            features.push(if url_lower.contains(keyword) { 1.0 } else { 0.0 });
        }

        debug_assert_eq!(features.len(), FEATURE_COUNT);
        features
    }

    /// Reconstruct the authority component (userinfo, host, port) the way it
    /// appeared in the request, since the trained model saw whole-authority
    /// lengths rather than bare hostnames.
    fn authority(parsed: &Url) -> String {
        let mut authority = String::new();
        if !parsed.username().is_empty() {
            authority.push_str(parsed.username());
            if let Some(password) = parsed.password() {
                authority.push(':');
                authority.push_str(password);
            }
            authority.push('@');
        }
        if let Some(host) = parsed.host_str() {
            authority.push_str(host);
        }
        if let Some(port) = parsed.port() {
            authority.push(':');
            authority.push_str(&port.to_string());
        }
        authority
    }

    /// `Url` normalizes an absent path to "/"; the model was trained on the
    /// path as written, where "https://a.com" has an empty path.
    fn path_as_written<'a>(raw: &str, parsed: &'a Url) -> &'a str {
        let path = parsed.path();
        if path == "/" {
            let after_scheme = raw
                .split_once("://")
                .map(|(_, rest)| rest)
                .unwrap_or(raw);
            if !after_scheme.contains('/') {
                return "";
            }
        }
        path
    }
}
