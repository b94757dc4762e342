// Trust-Domain Classifier
//
// Curated allow-list of high-authority sources. Affects evidence labels and
// the AI evidence digest only; never the score directly.

/// High-authority domains and suffixes (matched as lowercase substrings)
pub const HIGH_TRUST_DOMAINS: &[&str] = &[
    ".gov",
    ".edu",
    ".mil",
    "who.int",
    "un.org",
    "reuters.com",
    "apnews.com",
    "bloomberg.com",
    "bbc.com",
    "bbc.co.uk",
    "npr.org",
    "pbs.org",
    "wsj.com",
    "nytimes.com",
    "washingtonpost.com",
    "nature.com",
    "sciencemag.org",
    "nejm.org",
    "snopes.com",
    "politifact.com",
    "factcheck.org",
    "afp.com",
];

/// Marker prefixed to evidence labels from high-authority sources
pub const TRUST_MARKER: &str = "✅";

/// Marker prefixed to digest lines handed to the AI judge
pub const DIGEST_TRUST_MARKER: &str = "[HIGH AUTHORITY]";

/// Whether a URL or domain belongs to the high-authority allow-list
pub fn is_high_trust(url: &str) -> bool {
    let lowered = url.to_lowercase();
    HIGH_TRUST_DOMAINS.iter().any(|domain| lowered.contains(domain))
}

/// Evidence label with the trust marker applied when warranted
pub fn label_source(name: &str, url: &str) -> String {
    if is_high_trust(url) || is_high_trust(name) {
        format!("{} {}", TRUST_MARKER, name)
    } else {
        name.to_string()
    }
}
