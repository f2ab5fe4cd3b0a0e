/// Reduce a free-form category token to the lookup form used by the mapping tables:
/// lower-case, invisible characters stripped, and runs of whitespace, `_` or `-` joined by a single `-`.
pub(crate) fn normalize_token(value: &str) -> String {
    let cleaned = value.replace(['\u{feff}', '\u{200b}'], "");
    cleaned
        .split(|c: char| c.is_whitespace() || c == '_' || c == '-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
        .to_lowercase()
}
