//! Text normalization for raw field values and header names.

/// Trim `raw`; the empty string and any of `null_tokens` (case-insensitive) are missing.
pub fn normalize_missing(raw: &str, null_tokens: &[String]) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || null_tokens.iter().any(|t| t.eq_ignore_ascii_case(trimmed)) {
        None
    } else {
        Some(trimmed.to_string())
    }
}

pub fn lowercase(value: &str) -> String {
    value.to_lowercase()
}

/// Replace each `_` and `-` with a space and trim. Empty results are missing.
pub fn normalize_separators(value: &str) -> Option<String> {
    let replaced: String = value
        .chars()
        .map(|c| if c == '_' || c == '-' { ' ' } else { c })
        .collect();
    let trimmed = replaced.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Header comparison key: trimmed, BOM stripped, lower-cased, Spanish accents folded.
pub fn fold_header(name: &str) -> String {
    name.trim()
        .trim_start_matches('\u{feff}')
        .chars()
        .flat_map(char::to_lowercase)
        .map(|c| match c {
            'á' | 'à' | 'ä' | 'â' => 'a',
            'é' | 'è' | 'ë' | 'ê' => 'e',
            'í' | 'ì' | 'ï' | 'î' => 'i',
            'ó' | 'ò' | 'ö' | 'ô' => 'o',
            'ú' | 'ù' | 'ü' | 'û' => 'u',
            'ñ' => 'n',
            other => other,
        })
        .collect()
}
