/// Trusted-domain bypass. A matching domain skips every model and heuristic
/// and is reported SAFE with full confidence; this runs before anything else
/// so top-tier sites never pay inference cost or risk a false positive.
pub struct DomainTrustFilter {
    domains: Vec<String>,
}

impl DomainTrustFilter {
    pub fn new(trusted_domains: &[String]) -> Self {
        DomainTrustFilter {
            domains: trusted_domains.iter().map(|d| d.to_lowercase()).collect(),
        }
    }

    /// True if `domain` exactly equals a trusted entry or is a strict
    /// subdomain of one (dot-boundary suffix match):
    /// - is_trusted("gemini.google.com") -> true
    /// - is_trusted("evilgoogle.com") -> false
    /// - is_trusted("google.com.evil.net") -> false
    pub fn is_trusted(&self, domain: &str) -> bool {
        let domain = domain.to_lowercase();
        if domain.is_empty() {
            return false;
        }
        for trusted in &self.domains {
            if &domain == trusted {
                return true;
            }
            if domain.len() > trusted.len() + 1
                && domain.ends_with(trusted)
                && domain.as_bytes()[domain.len() - trusted.len() - 1] == b'.'
            {
                return true;
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter() -> DomainTrustFilter {
        DomainTrustFilter::new(&["google.com".to_string(), "zoom.us".to_string()])
    }

    #[test]
    fn test_exact_match() {
        assert!(filter().is_trusted("google.com"));
        assert!(filter().is_trusted("zoom.us"));
    }

    #[test]
    fn test_subdomain_match() {
        assert!(filter().is_trusted("mail.google.com"));
        assert!(filter().is_trusted("deep.nested.sub.google.com"));
    }

    #[test]
    fn test_case_insensitive() {
        assert!(filter().is_trusted("GOOGLE.COM"));
        assert!(filter().is_trusted("Mail.Google.Com"));
    }

    #[test]
    fn test_suffix_requires_dot_boundary() {
        assert!(!filter().is_trusted("evilgoogle.com"));
        assert!(!filter().is_trusted("notzoom.us"));
    }

    #[test]
    fn test_trusted_domain_embedded_in_hostile_domain() {
        assert!(!filter().is_trusted("google.com.evil.net"));
    }

    #[test]
    fn test_empty_domain() {
        assert!(!filter().is_trusted(""));
    }
}
