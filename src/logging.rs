//! Tracing setup and log redaction
//!
//! Launch diagnostics contain command lines with passwords in them. Anything
//! that might carry a secret goes through [`sanitize`] before it is logged.

use once_cell::sync::Lazy;
use regex::Regex;

/// Maximum line length before truncation
const MAX_LINE_LENGTH: usize = 2048;

/// Default filter when `RUST_LOG` is not set
pub const DEFAULT_FILTER: &str = "opconsole=info,warn";

/// Sensitive patterns to redact
static SENSITIVE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        // Tera Term connect password: /passwd="..." or /passwd=...
        Regex::new(r#"(?i)/passwd=("[^"]*"|\S+)"#).unwrap(),
        // cmdkey credential: /pass:...
        Regex::new(r"(?i)/pass:\S+").unwrap(),
        // oc login --password '...'
        Regex::new(r#"(?i)--password\s+('[^']*'|"[^"]*"|\S+)"#).unwrap(),
        // Encoded su password, even a single byte: sendln #NN...
        Regex::new(r"(?i)sendln\s+(#\d{1,3})+").unwrap(),
        // Encoded macro passwords (#NN#NN...)
        Regex::new(r"(#\d{1,3}){2,}").unwrap(),
        // Authorization headers
        Regex::new(r"(?i)authorization\s*:\s*(bearer|basic)\s+[^\s]+").unwrap(),
        // Generic secrets by key name (key=value patterns)
        Regex::new(r#"(?i)(password|passwd|pwd|secret|token|passphrase)\s*[:=]\s*["']?[^\s"']+["']?"#).unwrap(),
    ]
});

/// Sanitize a string by removing sensitive information
pub fn sanitize(input: &str) -> String {
    let mut result = input.to_string();

    for pattern in SENSITIVE_PATTERNS.iter() {
        result = pattern.replace_all(&result, "[REDACTED]").to_string();
    }

    if result.len() > MAX_LINE_LENGTH {
        let mut cut = MAX_LINE_LENGTH;
        while !result.is_char_boundary(cut) {
            cut -= 1;
        }
        result = format!("{}... [truncated]", &result[..cut]);
    }

    result
}

/// Install the global tracing subscriber. Safe to call more than once.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_FILTER.into()),
        )
        .try_init();
}
