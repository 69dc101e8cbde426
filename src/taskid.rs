//! Canonical task identifier resolution from review-request URLs.
//!
//! Two URL shapes are recognized:
//!
//! - GitLab merge requests: `http://host/group/project/-/merge_requests/N`
//!   resolves to `project/merge_requests/N`
//! - GitHub pull requests: `https://github.com/owner/repo/pull/N`
//!   resolves to `repo/pull/N`
//!
//! Resolution is pure and deterministic; the same URL always yields the
//! same task id.

use std::sync::OnceLock;

use regex::Regex;

use crate::{AppError, Result};

fn gitlab_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        #[allow(clippy::unwrap_used)] // Pattern is a compile-time literal.
        Regex::new(r"^https?://[^/]+/(?:.+?/)*([^/]+)/-/merge_requests/(\d+)").unwrap()
    })
}

fn github_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        #[allow(clippy::unwrap_used)] // Pattern is a compile-time literal.
        Regex::new(r"^https?://github\.com/[^/]+/([^/]+)/pull/(\d+)").unwrap()
    })
}

/// Resolve a review-request URL into its canonical task id.
///
/// # Errors
///
/// Returns `AppError::InvalidUrl` when the URL carries a recognized
/// merge-request or pull-request marker but the request number is missing,
/// zero, or malformed, and `AppError::UnsupportedHost` when the URL matches
/// neither recognized shape.
pub fn resolve(url: &str) -> Result<String> {
    if let Some(captures) = gitlab_pattern().captures(url) {
        let repo = &captures[1];
        let number = parse_request_number(&captures[2], url)?;
        return Ok(format!("{repo}/merge_requests/{number}"));
    }

    if let Some(captures) = github_pattern().captures(url) {
        let repo = &captures[1];
        let number = parse_request_number(&captures[2], url)?;
        return Ok(format!("{repo}/pull/{number}"));
    }

    // A marker without a valid trailing number never reaches the captures
    // above; distinguish that case from a wholly foreign URL.
    if url.contains("/-/merge_requests") || url.contains("github.com") && url.contains("/pull") {
        return Err(AppError::InvalidUrl(format!(
            "missing or malformed request number in {url}"
        )));
    }

    Err(AppError::UnsupportedHost(format!(
        "not a GitLab merge request or GitHub pull request URL: {url}"
    )))
}

fn parse_request_number(digits: &str, url: &str) -> Result<u64> {
    match digits.parse::<u64>() {
        Ok(n) if n >= 1 => Ok(n),
        _ => Err(AppError::InvalidUrl(format!(
            "request number must be a positive integer in {url}"
        ))),
    }
}
