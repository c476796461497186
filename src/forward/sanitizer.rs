//! Stealth header sanitization.
//!
//! # Responsibilities
//! - Normalize caller-supplied header names to lower-case
//! - Strip hop-by-hop and relay-disclosure headers
//! - Inject browser-identity defaults when absent
//!
//! # Design Decisions
//! - `host` and `content-length` are removed because the transport layer
//!   recomputes them from the resolved target and body; stale values cause
//!   protocol-level failures (TLS SNI/host mismatch)
//! - Forwarding headers (`via`, `x-forwarded-*`, `x-real-ip`, ...) are
//!   removed so the upstream cannot tell the request was relayed
//! - Caller-supplied identity headers are never overwritten

use std::collections::HashMap;

/// Headers that must never reach the upstream.
pub const BANNED_HEADERS: [&str; 10] = [
    "host",
    "connection",
    "content-length",
    "via",
    "x-forwarded-for",
    "x-forwarded-host",
    "x-forwarded-proto",
    "forwarded",
    "x-real-ip",
    "cf-connecting-ip",
];

/// Fallback browser identity when the caller does not supply one.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Defaults injected for absent browser-identity fields.
const DEFAULT_HEADERS: [(&str, &str); 4] = [
    ("user-agent", DEFAULT_USER_AGENT),
    (
        "accept",
        "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8",
    ),
    ("accept-language", "en-US,en;q=0.9"),
    ("accept-encoding", "gzip, deflate, br"),
];

/// Sanitize caller-supplied headers before forwarding.
///
/// Lower-cases every key (last occurrence wins on mixed-case duplicates),
/// removes [`BANNED_HEADERS`], and injects [`DEFAULT_HEADERS`] for any
/// identity field that is absent or empty. Pure transform; never fails.
pub fn sanitize(headers: &HashMap<String, String>) -> HashMap<String, String> {
    let mut sanitized: HashMap<String, String> = HashMap::with_capacity(headers.len() + 4);

    // Sorted iteration keeps cross-case collisions deterministic; exact
    // duplicate JSON keys already collapse to the last value during decode.
    let mut names: Vec<&String> = headers.keys().collect();
    names.sort();
    for name in names {
        sanitized.insert(name.to_ascii_lowercase(), headers[name].clone());
    }

    for banned in BANNED_HEADERS {
        sanitized.remove(banned);
    }

    for (name, default) in DEFAULT_HEADERS {
        let missing = sanitized.get(name).map(|v| v.is_empty()).unwrap_or(true);
        if missing {
            sanitized.insert(name.to_string(), default.to_string());
        }
    }

    sanitized
}
