//! JSON-LD review extraction for scraped review-platform pages.
//!
//! Trustpilot and G2 both embed schema.org structured data in
//! `application/ld+json` script tags. Parsing that is far more stable than
//! scraping the rendered markup.

use chrono::{DateTime, Utc};
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

/// One review pulled out of a page's structured data.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ExtractedReview {
    pub id: Option<String>,
    pub rating: i32,
    pub title: Option<String>,
    pub body: String,
    pub author: String,
    pub published_at: Option<DateTime<Utc>>,
}

fn script_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?is)<script[^>]*type\s*=\s*["']application/ld\+json["'][^>]*>(.*?)</script>"#)
            .expect("valid json-ld script regex")
    })
}

/// Extracts every schema.org `Review` node embedded in `html`.
///
/// Nodes without a rating or a body are skipped; a review with neither is
/// useless to the classifier and the alert path.
pub(crate) fn extract_reviews(html: &str) -> Vec<ExtractedReview> {
    let mut reviews = Vec::new();

    for cap in script_regex().captures_iter(html) {
        let raw = cap.get(1).map_or("", |m| m.as_str()).trim();
        if raw.is_empty() {
            continue;
        }
        let Ok(value) = serde_json::from_str::<Value>(raw) else {
            continue;
        };
        collect_review_nodes(&value, &mut reviews);
    }

    reviews
}

fn collect_review_nodes(value: &Value, out: &mut Vec<ExtractedReview>) {
    match value {
        Value::Object(map) => {
            if is_review_node(map.get("@type")) {
                if let Some(review) = parse_review_node(map) {
                    out.push(review);
                }
            }
            for child in map.values() {
                collect_review_nodes(child, out);
            }
        }
        Value::Array(items) => {
            for child in items {
                collect_review_nodes(child, out);
            }
        }
        _ => {}
    }
}

fn is_review_node(node_type: Option<&Value>) -> bool {
    let matches_review = |s: &str| s.eq_ignore_ascii_case("review");
    match node_type {
        Some(Value::String(s)) => matches_review(s),
        Some(Value::Array(values)) => values
            .iter()
            .filter_map(Value::as_str)
            .any(matches_review),
        _ => false,
    }
}

fn parse_review_node(map: &serde_json::Map<String, Value>) -> Option<ExtractedReview> {
    let rating = map
        .get("reviewRating")
        .and_then(|r| r.get("ratingValue"))
        .and_then(rating_value)?;

    let body = map
        .get("reviewBody")
        .or_else(|| map.get("description"))
        .and_then(Value::as_str)?
        .trim()
        .to_string();
    if body.is_empty() {
        return None;
    }

    let author = map
        .get("author")
        .and_then(author_name)
        .unwrap_or_else(|| "Anonymous".to_string());

    let title = map
        .get("headline")
        .or_else(|| map.get("name"))
        .and_then(Value::as_str)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());

    let id = map
        .get("@id")
        .or_else(|| map.get("id"))
        .and_then(Value::as_str)
        .map(str::to_string);

    let published_at = map
        .get("datePublished")
        .and_then(Value::as_str)
        .and_then(parse_date);

    Some(ExtractedReview {
        id,
        rating,
        title,
        body,
        author,
        published_at,
    })
}

/// Rating values show up as numbers or numeric strings depending on the site.
#[allow(clippy::cast_possible_truncation)]
fn rating_value(value: &Value) -> Option<i32> {
    match value {
        Value::Number(n) => n.as_f64().map(|f| f.round() as i32),
        Value::String(s) => s.trim().parse::<f64>().ok().map(|f| f.round() as i32),
        _ => None,
    }
}

fn author_name(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Object(map) => map
            .get("name")
            .and_then(Value::as_str)
            .map(|s| s.trim().to_string()),
        _ => None,
    }
    .filter(|s| !s.is_empty())
}

fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    // Some pages emit a bare date.
    chrono::NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><head>
        <script type="application/ld+json">
        {
          "@context": "https://schema.org",
          "@type": "LocalBusiness",
          "review": [
            {
              "@type": "Review",
              "@id": "rev-100",
              "headline": "Great product",
              "reviewBody": "Works exactly as promised.",
              "datePublished": "2025-06-09T10:00:00Z",
              "author": { "@type": "Person", "name": "Dana" },
              "reviewRating": { "@type": "Rating", "ratingValue": "5" }
            },
            {
              "@type": "Review",
              "reviewBody": "Cancelled after one month, support never answered.",
              "datePublished": "2025-06-10",
              "author": "Sam",
              "reviewRating": { "ratingValue": 1 }
            }
          ]
        }
        </script>
        </head><body></body></html>
    "#;

    #[test]
    fn extracts_nested_review_nodes() {
        let reviews = extract_reviews(PAGE);
        assert_eq!(reviews.len(), 2);

        assert_eq!(reviews[0].id.as_deref(), Some("rev-100"));
        assert_eq!(reviews[0].rating, 5);
        assert_eq!(reviews[0].author, "Dana");
        assert_eq!(reviews[0].title.as_deref(), Some("Great product"));
        assert!(reviews[0].published_at.is_some());

        assert_eq!(reviews[1].rating, 1);
        assert_eq!(reviews[1].author, "Sam");
        assert!(reviews[1].title.is_none());
        assert!(reviews[1].published_at.is_some());
    }

    #[test]
    fn skips_nodes_without_rating_or_body() {
        let html = r#"
            <script type="application/ld+json">
            [
              { "@type": "Review", "reviewBody": "no rating here" },
              { "@type": "Review", "reviewRating": { "ratingValue": 4 } },
              { "@type": "Product", "name": "not a review" }
            ]
            </script>
        "#;
        assert!(extract_reviews(html).is_empty());
    }

    #[test]
    fn ignores_malformed_json_blocks() {
        let html = r#"
            <script type="application/ld+json">{not json}</script>
            <script type="application/ld+json">
            { "@type": "Review", "reviewBody": "ok", "reviewRating": { "ratingValue": 3 } }
            </script>
        "#;
        let reviews = extract_reviews(html);
        assert_eq!(reviews.len(), 1);
        assert_eq!(reviews[0].rating, 3);
        assert_eq!(reviews[0].author, "Anonymous");
    }
}
