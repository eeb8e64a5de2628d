//! Company-name normalisation shared by every sub-score that compares companies.

const LEGAL_SUFFIXES: [&str; 8] = [
    "inc",
    "llc",
    "ltd",
    "limited",
    "corp",
    "corporation",
    "company",
    "co",
];

/// Lowercase, split on anything that is not alphanumeric, drop one trailing legal-entity
/// token and join what is left.
///
/// `"Acme Corp."`, `"ACME, Inc"`, `"Acme,Inc"` and `"acme"` all normalise to `"acme"`. A name
/// made only of a suffix token (`"Co"`) is kept as-is.
pub fn normalize_company(name: &str) -> String {
    let lowered = fold_case(name);
    let mut tokens: Vec<&str> = lowered
        .split(|ch: char| !ch.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .collect();

    if tokens.len() > 1 && tokens.last().is_some_and(|last| LEGAL_SUFFIXES.contains(last)) {
        tokens.pop();
    }

    tokens.concat()
}

/// Case folding used for every free-text comparison (topics, industries, company names).
pub(crate) fn fold_case(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Whether two company names refer to the same organisation. Blank names never match.
pub fn companies_match(left: &str, right: &str) -> bool {
    let left = normalize_company(left);
    !left.is_empty() && left == normalize_company(right)
}
