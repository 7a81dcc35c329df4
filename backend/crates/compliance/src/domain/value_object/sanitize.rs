//! Free-text Sanitizing
//!
//! Vendor names, job names and admin reasons are echoed back to the
//! dashboard, so markup and script vectors are removed before storage.

const URL_SCHEMES: &[&str] = &["http", "https", "mailto", "tel"];

/// Strip `<`/`>`, `javascript:` and inline `on*=` handlers, then trim
pub fn sanitize_input(input: &str) -> String {
    let without_tags: String = input.chars().filter(|c| !matches!(c, '<' | '>')).collect();
    let without_js = remove_ignore_ascii_case(&without_tags, "javascript:");
    strip_event_handlers(&without_js).trim().to_string()
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}

/// Absolute URL with an http, https, mailto or tel scheme
pub fn is_valid_url(url: &str) -> bool {
    let url = url.trim();
    let Some((scheme, rest)) = url.split_once(':') else {
        return false;
    };
    let scheme = scheme.to_ascii_lowercase();
    if !URL_SCHEMES.contains(&scheme.as_str()) || rest.chars().any(char::is_whitespace) {
        return false;
    }

    match scheme.as_str() {
        "http" | "https" => rest
            .strip_prefix("//")
            .and_then(|r| r.split(['/', '?', '#']).next())
            .is_some_and(|host| !host.is_empty()),
        _ => !rest.is_empty(),
    }
}

/// Remove every occurrence of an ASCII `needle`, case-insensitively
fn remove_ignore_ascii_case(haystack: &str, needle: &str) -> String {
    let mut out = haystack.to_string();
    // Lowercasing ASCII keeps byte offsets stable
    while let Some(pos) = out.to_ascii_lowercase().find(needle) {
        out.replace_range(pos..pos + needle.len(), "");
    }
    out
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Drop `onclick=...`-style attributes, including a quoted value
fn strip_event_handlers(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = String::with_capacity(input.len());
    let mut copied_to = 0;
    let mut i = 0;

    while i + 2 < bytes.len() {
        let at_boundary = i == 0 || !is_word_byte(bytes[i - 1]);
        if at_boundary && bytes[i..i + 2].eq_ignore_ascii_case(b"on") {
            if let Some(end) = handler_end(bytes, i + 2) {
                out.push_str(&input[copied_to..i]);
                copied_to = end;
                i = end;
                continue;
            }
        }
        i += 1;
    }

    out.push_str(&input[copied_to..]);
    out
}

/// End offset of `\w+\s*=\s*("...")?` starting at `start`
fn handler_end(bytes: &[u8], start: usize) -> Option<usize> {
    let mut j = start;
    while j < bytes.len() && is_word_byte(bytes[j]) {
        j += 1;
    }
    if j == start {
        return None;
    }
    while j < bytes.len() && bytes[j].is_ascii_whitespace() {
        j += 1;
    }
    if bytes.get(j) != Some(&b'=') {
        return None;
    }
    j += 1;
    while j < bytes.len() && bytes[j].is_ascii_whitespace() {
        j += 1;
    }

    if let Some(&quote @ (b'"' | b'\'')) = bytes.get(j) {
        if let Some(close) = bytes[j + 1..].iter().position(|&b| b == quote) {
            return Some(j + 1 + close + 1);
        }
    }
    Some(j)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_strips_markup() {
        assert_eq!(sanitize_input("  ACME <b>Corp</b> "), "ACME bCorp/b");
        assert_eq!(sanitize_input("JavaScript:alert(1)"), "alert(1)");
        assert_eq!(
            sanitize_input("img src=x onerror=\"steal()\" ok"),
            "img src=x  ok"
        );
        assert_eq!(sanitize_input("x ONLOAD = 'a' y"), "x  y");
    }

    #[test]
    fn test_sanitize_keeps_plain_text() {
        assert_eq!(sanitize_input("Tata Steel Ltd."), "Tata Steel Ltd.");
        assert_eq!(sanitize_input("condition=met"), "condition=met");
        assert_eq!(sanitize_input("on time"), "on time");
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#039;Jerry&#039;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_is_valid_url() {
        assert!(is_valid_url("https://ravono.in/reports"));
        assert!(is_valid_url("http://localhost:8001"));
        assert!(is_valid_url("mailto:ops@ravono.in"));
        assert!(is_valid_url("tel:+919876543210"));

        assert!(!is_valid_url("javascript:alert(1)"));
        assert!(!is_valid_url("data:text/html;base64,AAAA"));
        assert!(!is_valid_url("https://"));
        assert!(!is_valid_url("not a url"));
        assert!(!is_valid_url("ftp://files.example.com"));
    }
}
