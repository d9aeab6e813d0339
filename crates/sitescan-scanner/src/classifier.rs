//! Pure URL and response heuristics.
//!
//! None of these touch the network. A false positive on `is_blocked` or
//! `needs_rendering` costs one extra browser fetch.

use regex::Regex;
use std::sync::OnceLock;

/// Status codes treated as anti-automation responses.
const BLOCKED_STATUSES: [u16; 3] = [403, 429, 503];

/// Lower-case body markers of challenge and rate-limit pages.
const BLOCK_MARKERS: [&str; 5] = [
    "captcha",
    "cloudflare",
    "access denied",
    "please verify",
    "rate limit",
];

/// Download suffixes matched at the end of the URL.
const SKIP_SUFFIXES: [&str; 4] = [".pdf", ".zip", ".exe", ".dmg"];

/// Download markers matched anywhere in the URL.
const SKIP_FRAGMENTS: [&str; 4] = [".pdf?", "/pdf/", "/download", "file-pdf"];

/// Client-app mount points of React, Next.js and Vue shells.
const MOUNT_MARKERS: [&str; 3] = [r#"id="root""#, r#"id="__next""#, r#"id="app""#];

/// Text shorter than this next to a mount point means script-rendered content.
pub const RENDER_TEXT_THRESHOLD: usize = 500;

/// Whether the URL points at a downloadable asset rather than a page.
pub fn should_skip(url: &str) -> bool {
    let lower = url.to_lowercase();
    SKIP_SUFFIXES.iter().any(|suffix| lower.ends_with(suffix))
        || SKIP_FRAGMENTS.iter().any(|fragment| lower.contains(fragment))
}

/// Whether a response looks like a block page instead of real content.
pub fn is_blocked(status: u16, body: &str) -> bool {
    if BLOCKED_STATUSES.contains(&status) {
        return true;
    }
    let lower = body.to_lowercase();
    BLOCK_MARKERS.iter().any(|marker| lower.contains(marker))
}

/// Whether the markup is a client-rendered shell whose text only appears
/// after scripts run.
pub fn needs_rendering(body: &str) -> bool {
    static TAG_REGEX: OnceLock<Regex> = OnceLock::new();
    let tags = TAG_REGEX.get_or_init(|| Regex::new(r"<[^>]*>").expect("valid regex"));

    let text_len = tags.replace_all(body, "").trim().chars().count();
    if text_len >= RENDER_TEXT_THRESHOLD {
        return false;
    }

    let lower = body.to_lowercase();
    MOUNT_MARKERS.iter().any(|marker| lower.contains(marker))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skip_download_suffixes() {
        assert!(should_skip("https://b.example/blocked.pdf"));
        assert!(should_skip("https://b.example/REPORT.PDF"));
        assert!(should_skip("https://b.example/archive.zip"));
        assert!(should_skip("https://b.example/setup.exe"));
        assert!(should_skip("https://b.example/app.dmg"));
    }

    #[test]
    fn test_skip_download_fragments() {
        assert!(should_skip("https://b.example/report.pdf?version=2"));
        assert!(should_skip("https://b.example/pdf/annual"));
        assert!(should_skip("https://b.example/downloads/latest"));
        assert!(should_skip("https://b.example/assets/file-pdf-123"));
    }

    #[test]
    fn test_regular_pages_are_not_skipped() {
        assert!(!should_skip("https://a.example/ok"));
        assert!(!should_skip("https://a.example/pdfs-explained"));
        assert!(!should_skip("https://a.example/zipcode/lookup"));
    }

    #[test]
    fn test_blocked_by_status() {
        for status in [403, 429, 503] {
            assert!(is_blocked(status, "<html>fine</html>"), "status {status}");
        }
        assert!(!is_blocked(200, "<html>fine</html>"));
        assert!(!is_blocked(404, "<html>not here</html>"));
    }

    #[test]
    fn test_blocked_by_body_marker() {
        assert!(is_blocked(200, "<div class='g-reCAPTCHA'></div>"));
        assert!(is_blocked(200, "Checking your browser - Cloudflare"));
        assert!(is_blocked(200, "<h1>Access Denied</h1>"));
        assert!(is_blocked(200, "Please verify you are a human"));
        assert!(is_blocked(200, "You hit our Rate Limit"));
    }

    #[test]
    fn test_spa_shell_needs_rendering() {
        let shell = r#"<html><head><script src="/main.js"></script></head>
            <body><div id="root"></div></body></html>"#;
        assert!(needs_rendering(shell));

        let next = r#"<html><body><div ID="__next">Loading</div></body></html>"#;
        assert!(needs_rendering(next));

        let vue = r#"<body><div id="app"></div></body>"#;
        assert!(needs_rendering(vue));
    }

    #[test]
    fn test_text_rich_page_does_not_need_rendering() {
        let text = "word ".repeat(200);
        let page = format!(r#"<html><body><div id="root"><p>{text}</p></div></body></html>"#);
        assert!(!needs_rendering(&page));
    }

    #[test]
    fn test_short_page_without_mount_point() {
        assert!(!needs_rendering("<html><body><p>Short static page</p></body></html>"));
    }
}
