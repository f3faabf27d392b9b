//! Normalisation of repeatable, comma-separated flag values.

/// Flatten flag values where each entry may itself be a comma-separated list.
///
/// `["tag1,tag2", "tag3"]` becomes `["tag1", "tag2", "tag3"]`. Whitespace around
/// each entry is trimmed and empty entries are dropped.
pub fn combine_comma_separated<S: AsRef<str>>(inputs: &[S]) -> Vec<String> {
    inputs
        .iter()
        .flat_map(|list| list.as_ref().split(','))
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

/// Remove duplicates, keeping the first occurrence of each value.
pub fn dedup_preserving_order(values: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    values
        .into_iter()
        .filter(|v| seen.insert(v.clone()))
        .collect()
}
