//! Validity checks for code submissions.

use crate::charset::{cjk_exceeds_utf16, cjk_ratio, trim_text};
use crate::options::ValidatorOptions;
use serde::{Deserialize, Serialize};

/// Reason reported for empty or whitespace-only input.
pub const REASON_EMPTY: &str = "code content must not be empty";

/// Reason reported when CJK text dominates the input.
pub const REASON_MOSTLY_CHINESE: &str =
    "code content is mostly Chinese text, please provide valid code";

/// Reason reported for accepted input.
pub const REASON_VALID: &str = "code content is valid";

/// Outcome of [`validate`], meant for direct display to an end user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationVerdict {
    /// Whether the text looks like code.
    pub is_valid: bool,
    /// Human-readable explanation, populated for both outcomes.
    #[serde(rename = "message", alias = "reason")]
    pub reason: String,
}

impl ValidationVerdict {
    fn accept() -> Self {
        Self {
            is_valid: true,
            reason: REASON_VALID.to_string(),
        }
    }

    fn reject(reason: &str) -> Self {
        Self {
            is_valid: false,
            reason: reason.to_string(),
        }
    }
}

/// Validate with the default 80% CJK ceiling.
pub fn validate(code: &str) -> ValidationVerdict {
    validate_with_options(code, &ValidatorOptions::default())
}

/// Validate a code submission.
///
/// Rejects empty input, whitespace-only input (a BOM counts as whitespace),
/// and input whose trimmed text is more than `max_cjk_ratio` CJK ideographs.
/// The ratio's denominator is the UTF-16 length, so an emoji weighs two.
pub fn validate_with_options(code: &str, options: &ValidatorOptions) -> ValidationVerdict {
    let trimmed = trim_text(code);
    if trimmed.is_empty() {
        return ValidationVerdict::reject(REASON_EMPTY);
    }

    if cjk_exceeds_utf16(trimmed, options.max_cjk_ratio) {
        return ValidationVerdict::reject(REASON_MOSTLY_CHINESE);
    }

    ValidationVerdict::accept()
}

/// Result of [`check_cjk_ratio`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RatioCheck {
    /// Whether the ratio is within the ceiling.
    pub passed: bool,
    /// Share of CJK ideographs over all characters.
    pub ratio: f64,
}

/// Gate on the share of CJK ideographs across the whole (untrimmed) text.
///
/// Passes when `ratio <= max_ratio`. Empty text passes with ratio 0.0.
pub fn check_cjk_ratio(code: &str, max_ratio: f64) -> RatioCheck {
    let ratio = cjk_ratio(code);
    RatioCheck {
        passed: ratio <= max_ratio,
        ratio,
    }
}
