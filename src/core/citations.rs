//! Pattern-based extraction of Supreme Court of Canada citations.

use std::sync::LazyLock;

use regex::Regex;

static CITATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\[?\d{4}\]\s*\d*\s*S\.?C\.?R\.?\s*\d+|R\.\s*v\.\s*[A-Z][a-zA-Z]+|Reference\s+re\s+[A-Z][a-zA-Z\s]+",
    )
    .expect("citation pattern compiles")
});

/// Citations found in `text`, de-duplicated, in first-seen order.
///
/// Recognizes report citations (`[1986] 1 SCR 103`), criminal
/// style of cause (`R. v. Oakes`) and references (`Reference re Secession of Quebec`).
pub fn extract(text: &str) -> Vec<String> {
    let mut found: Vec<String> = Vec::new();
    for m in CITATION.find_iter(text) {
        let citation = m.as_str().trim_end().to_string();
        if !found.contains(&citation) {
            found.push(citation);
        }
    }
    found
}
