// Endpoint classification
// Pure predicates deciding which requests the auth pipeline leaves alone

/// URL fragments marking endpoints exempt from credential attachment and
/// session preflight. Kept separate from [`DEFAULT_NO_RETRY_FRAGMENTS`];
/// deploying a new identity route means updating both lists.
pub const DEFAULT_PUBLIC_FRAGMENTS: &[&str] = &[
    "check-authentication",
    "authorization-token",
    "login",
    "logout",
    "social-login",
];

/// URL fragments marking endpoints exempt from 401/403 recovery. Kept
/// separate from [`DEFAULT_PUBLIC_FRAGMENTS`]; deploying a new identity
/// route means updating both lists.
pub const DEFAULT_NO_RETRY_FRAGMENTS: &[&str] = &[
    "check-authentication",
    "authorization-token",
    "login",
    "logout",
    "social-login",
];

/// Classifies outgoing request URLs against the two allowlists.
///
/// Matching is substring containment against the full URL, re-evaluated per
/// request. No state, no errors.
#[derive(Clone, Debug)]
pub struct EndpointClassifier {
    public_fragments: Vec<String>,
    no_retry_fragments: Vec<String>,
}

impl EndpointClassifier {
    pub fn new(public_fragments: Vec<String>, no_retry_fragments: Vec<String>) -> Self {
        Self {
            public_fragments,
            no_retry_fragments,
        }
    }

    /// True iff the URL targets a public endpoint: no Authorization header,
    /// no session preflight, ever.
    pub fn is_public(&self, url: &str) -> bool {
        self.public_fragments.iter().any(|f| url.contains(f.as_str()))
    }

    /// True iff a 401/403 from this URL must not enter the recovery path.
    /// Retrying a failed login or refresh call against itself is never
    /// attempted.
    pub fn should_not_retry(&self, url: &str) -> bool {
        self.no_retry_fragments
            .iter()
            .any(|f| url.contains(f.as_str()))
    }
}

impl Default for EndpointClassifier {
    fn default() -> Self {
        Self::new(
            DEFAULT_PUBLIC_FRAGMENTS.iter().map(|s| s.to_string()).collect(),
            DEFAULT_NO_RETRY_FRAGMENTS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        )
    }
}
