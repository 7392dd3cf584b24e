use unidecode::unidecode;

/// Folds a name to the form used for roster keys and fragment lookups:
/// ASCII, lowercase, single-spaced.
pub fn clean_str(input: &str) -> String {
    unidecode(input)
        .trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<&str>>()
        .join(" ")
}

/// True when `needle`, once cleaned, occurs inside the cleaned `haystack`.
/// An empty needle never matches.
pub fn contains_clean(haystack: &str, needle: &str) -> bool {
    let needle = clean_str(needle);
    !needle.is_empty() && clean_str(haystack).contains(&needle)
}
