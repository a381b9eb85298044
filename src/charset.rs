//! Character classes shared by the pipeline stages.

/// Check if character is a CJK unified ideograph (U+4E00 to U+9FFF).
///
/// Matches exactly the ideograph block admitted by the character filter.
pub fn is_cjk_ideograph(c: char) -> bool {
    ('\u{4E00}'..='\u{9FFF}').contains(&c)
}

/// Check if character belongs to the sanitized output alphabet.
///
/// Printable ASCII, CJK unified ideographs, tab, LF and CR.
pub fn is_allowed_char(c: char) -> bool {
    matches!(c, '\u{20}'..='\u{7E}' | '\t' | '\n' | '\r') || is_cjk_ideograph(c)
}

/// Counts CJK ideographs in `text`.
pub fn cjk_count(text: &str) -> usize {
    text.chars().filter(|&c| is_cjk_ideograph(c)).count()
}

/// Counts CJK ideographs and total characters in one pass.
pub fn cjk_stats(text: &str) -> (usize, usize) {
    text.chars().fold((0, 0), |(cjk, total), c| {
        (cjk + usize::from(is_cjk_ideograph(c)), total + 1)
    })
}

/// Counts CJK ideographs and UTF-16 code units in one pass.
///
/// Astral characters such as emoji count as two units.
pub fn cjk_stats_utf16(text: &str) -> (usize, usize) {
    text.chars().fold((0, 0), |(cjk, units), c| {
        (cjk + usize::from(is_cjk_ideograph(c)), units + c.len_utf16())
    })
}

/// Whitespace trimmed at the validation boundary: Unicode `White_Space`
/// without NEL (U+0085), plus the BOM (U+FEFF).
pub fn is_trim_whitespace(c: char) -> bool {
    c == '\u{FEFF}' || (c.is_whitespace() && c != '\u{85}')
}

/// Trims [`is_trim_whitespace`] characters from both ends.
pub fn trim_text(text: &str) -> &str {
    text.trim_matches(is_trim_whitespace)
}

/// Ratio of CJK ideographs to total characters (0.0 for empty text).
pub fn cjk_ratio(text: &str) -> f64 {
    let (cjk, total) = cjk_stats(text);
    if total == 0 {
        0.0
    } else {
        cjk as f64 / total as f64
    }
}

/// Returns true when CJK ideographs make up more than `ratio` of `text`.
///
/// Compared as `count > len * ratio`; a text sitting exactly on the
/// threshold is not dominated.
pub fn cjk_exceeds(text: &str, ratio: f64) -> bool {
    let (cjk, total) = cjk_stats(text);
    total > 0 && cjk as f64 > total as f64 * ratio
}

/// Like [`cjk_exceeds`], with the length measured in UTF-16 code units.
pub fn cjk_exceeds_utf16(text: &str, ratio: f64) -> bool {
    let (cjk, units) = cjk_stats_utf16(text);
    units > 0 && cjk as f64 > units as f64 * ratio
}
