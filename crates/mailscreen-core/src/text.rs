//! Text normalization and deterministic text statistics
//!
//! Everything here is a pure function: identical input text produces
//! identical output across calls and processes.

use once_cell::sync::Lazy;
use regex::Regex;

static URL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(https?://\S+|www\.\S+)").expect("valid url regex"));

static MARKUP_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<[^>]*>").expect("valid markup regex"));

static WHITESPACE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

static EMAIL_ADDRESS_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[A-Za-z0-9._%+-]+@([A-Za-z0-9.-]+\.[A-Za-z]{2,})").expect("valid address regex")
});

/// Remove markup tags from text, replacing each tag with a space.
///
/// Text without any angle brackets is returned unchanged.
pub fn strip_markup(text: &str) -> String {
    if text.contains('<') && text.contains('>') {
        MARKUP_PATTERN.replace_all(text, " ").into_owned()
    } else {
        text.to_string()
    }
}

/// Normalize raw email text: strip markup, drop NUL bytes, collapse
/// whitespace, trim, and lower-case.
pub fn normalize_text(text: &str) -> String {
    let stripped = strip_markup(text);
    let cleaned = stripped.replace('\0', " ");
    WHITESPACE_PATTERN
        .replace_all(&cleaned, " ")
        .trim()
        .to_lowercase()
}

/// Count URL-like substrings (`http://`, `https://`, `www.`)
pub fn count_urls(text: &str) -> u32 {
    URL_PATTERN.find_iter(text).count() as u32
}

/// Number of exclamation marks
pub fn exclamation_count(text: &str) -> u32 {
    text.chars().filter(|c| *c == '!').count() as u32
}

/// Body length in characters
pub fn body_length(text: &str) -> u32 {
    text.chars().count() as u32
}

/// Extract the sender domain from an address like `user@example.com`,
/// a `From:` header line, or a bare domain. Returns `None` when no
/// domain can be resolved.
pub fn extract_sender_domain(sender: &str) -> Option<String> {
    let sender = sender.trim();
    if sender.is_empty() {
        return None;
    }

    if let Some(caps) = EMAIL_ADDRESS_PATTERN.captures(sender) {
        return Some(caps[1].to_lowercase());
    }

    // Bare domain: at least one dot, no whitespace
    if sender.contains('.') && !sender.contains(char::is_whitespace) && !sender.contains('@') {
        return Some(sender.trim_matches(|c| c == '<' || c == '>').to_lowercase());
    }

    None
}

/// Extract the unique host names of every URL in the text, in first-seen
/// order. Hosts are lower-cased with any port or path stripped; the
/// `www.` prefix is removed but other subdomains are kept.
pub fn extract_link_domains(text: &str) -> Vec<String> {
    let mut seen = Vec::new();
    for m in URL_PATTERN.find_iter(text) {
        let url = m.as_str();
        let without_scheme = match url.find("://") {
            Some(pos) => &url[pos + 3..],
            None => url,
        };

        let host = without_scheme
            .split(['/', '?', '#'])
            .next()
            .unwrap_or("")
            .split(':')
            .next()
            .unwrap_or("")
            .trim_end_matches(['.', ',', ';', ')', ']'])
            .to_lowercase();

        let host = host.strip_prefix("www.").unwrap_or(&host).to_string();

        if !host.is_empty() && host.contains('.') && !seen.contains(&host) {
            seen.push(host);
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_markup_and_lowercases() {
        let raw = "<html><body>Hello   <b>World</b>!</body></html>";
        assert_eq!(normalize_text(raw), "hello world !");
    }

    #[test]
    fn test_normalize_plain_text_untouched_except_case() {
        assert_eq!(normalize_text("  Team Meeting\n at 10 "), "team meeting at 10");
    }

    #[test]
    fn test_normalize_is_deterministic() {
        let raw = "Verify <a href=\"x\">NOW</a>!!!";
        assert_eq!(normalize_text(raw), normalize_text(raw));
    }

    #[test]
    fn test_count_urls() {
        assert_eq!(count_urls("no links here"), 0);
        assert_eq!(
            count_urls("see https://a.com and http://b.org plus www.c.net"),
            3
        );
    }

    #[test]
    fn test_exclamation_and_length() {
        assert_eq!(exclamation_count("Act now!! Really!"), 3);
        assert_eq!(body_length("abc"), 3);
    }

    #[test]
    fn test_extract_sender_domain() {
        assert_eq!(
            extract_sender_domain("Alice <alice@Example.COM>"),
            Some("example.com".to_string())
        );
        assert_eq!(
            extract_sender_domain("mail.linkedin.com"),
            Some("mail.linkedin.com".to_string())
        );
        assert_eq!(extract_sender_domain(""), None);
        assert_eq!(extract_sender_domain("no domain here"), None);
    }

    #[test]
    fn test_extract_link_domains_dedupes_and_strips_www() {
        let text = "https://www.linkedin.com/jobs and https://linkedin.com/feed \
                    plus http://mail.linkedin.com:443/x";
        assert_eq!(
            extract_link_domains(text),
            vec!["linkedin.com".to_string(), "mail.linkedin.com".to_string()]
        );
    }
}
