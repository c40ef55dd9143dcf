//! Case-page slugs to display names.
//!
//! ```text
//! r-v-oakes-1986                         → R. v. Oakes
//! reference-re-secession-of-quebec-1998  → Reference re Secession Of Quebec
//! carter-v-canada-2015                   → Carter V Canada 2015
//! ```
//!
//! The two prefixed forms drop their trailing year token; anything else keeps
//! every token.

pub fn slug_to_case_name(slug: &str) -> String {
    let parts: Vec<&str> = slug.split('-').collect();
    match parts.as_slice() {
        ["r", "v", rest @ ..] => format!("R. v. {}", title_case(without_year(rest))),
        ["reference", "re", rest @ ..] => {
            format!("Reference re {}", title_case(without_year(rest)))
        }
        _ => title_case(&parts),
    }
}

fn without_year<'a>(tokens: &'a [&'a str]) -> &'a [&'a str] {
    tokens.split_last().map(|(_, init)| init).unwrap_or(&[])
}

fn title_case(tokens: &[&str]) -> String {
    tokens
        .iter()
        .map(|token| capitalize(token))
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
