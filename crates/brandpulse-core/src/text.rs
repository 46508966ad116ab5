//! Free-text sanitization and region inference.

use regex::Regex;
use std::sync::OnceLock;

/// Strips control characters and collapses runs of whitespace.
///
/// External sources embed NULs, carriage returns, and layout whitespace in
/// scraped text; everything downstream assumes single-space-separated prose.
#[must_use]
pub fn sanitize_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last_was_space = true;

    for ch in text.chars() {
        if ch.is_control() {
            continue;
        }
        if ch.is_whitespace() {
            if !last_was_space {
                out.push(' ');
                last_was_space = true;
            }
            continue;
        }
        out.push(ch);
        last_was_space = false;
    }

    while out.ends_with(' ') {
        out.pop();
    }
    out
}

/// Truncates to at most `max_chars` characters, appending an ellipsis when cut.
#[must_use]
pub fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars).collect();
    format!("{}...", cut.trim_end())
}

/// Fixed region keyword table. First match wins; no match means no region tag.
const REGION_PATTERNS: [(&str, &str); 5] = [
    (
        "North America",
        r"\b(US|USA|United States|Canada|America)\b",
    ),
    (
        "Europe",
        r"\b(UK|United Kingdom|Germany|France|Italy|Spain|Netherlands|EU|Europe)\b",
    ),
    (
        "Asia-Pacific",
        r"\b(Australia|Japan|Singapore|Hong Kong|India|China|Korea|APAC|Asia)\b",
    ),
    (
        "LATAM",
        r"\b(Brazil|Mexico|Argentina|Colombia|Chile|Latin America|LATAM)\b",
    ),
    (
        "Middle East",
        r"\b(UAE|Saudi|Israel|Dubai|Middle East|MEA)\b",
    ),
];

fn region_regexes() -> &'static Vec<(&'static str, Regex)> {
    static REGEXES: OnceLock<Vec<(&'static str, Regex)>> = OnceLock::new();
    REGEXES.get_or_init(|| {
        REGION_PATTERNS
            .iter()
            .map(|(region, pattern)| {
                let re = Regex::new(&format!("(?i){pattern}")).expect("valid region regex");
                (*region, re)
            })
            .collect()
    })
}

/// Infers a coarse region tag from free text by keyword matching.
#[must_use]
pub fn extract_region(text: &str) -> Option<&'static str> {
    region_regexes()
        .iter()
        .find(|(_, re)| re.is_match(text))
        .map(|(region, _)| *region)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_strips_control_chars() {
        assert_eq!(sanitize_text("hello\x00wor\x1fld"), "helloworld");
    }

    #[test]
    fn sanitize_collapses_whitespace() {
        assert_eq!(sanitize_text("  too \t many\n\nspaces  "), "too many spaces");
    }

    #[test]
    fn sanitize_handles_empty_input() {
        assert_eq!(sanitize_text(""), "");
        assert_eq!(sanitize_text(" \n\t "), "");
    }

    #[test]
    fn truncate_leaves_short_text_alone() {
        assert_eq!(truncate("short", 10), "short");
    }

    #[test]
    fn truncate_appends_ellipsis() {
        assert_eq!(truncate("a long message here", 6), "a long...");
    }

    #[test]
    fn region_first_match_wins() {
        // "US" (North America) appears before "Germany" in the table order,
        // so a text mentioning both maps to North America.
        assert_eq!(
            extract_region("Shipping from Germany to the US"),
            Some("North America")
        );
    }

    #[test]
    fn region_matching_is_case_insensitive() {
        assert_eq!(extract_region("great service in singapore"), Some("Asia-Pacific"));
    }

    #[test]
    fn region_none_when_no_keyword() {
        assert_eq!(extract_region("no geography mentioned at all"), None);
    }

    #[test]
    fn region_requires_word_boundary() {
        // "usable" contains "us" but must not match the US keyword.
        assert_eq!(extract_region("a very usable product"), None);
    }
}
