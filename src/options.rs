//! Options for the sanitize pipeline and the validator.

use crate::error::{Error, Result};
use crate::markers::MarkerSet;

/// CJK share above which an unquoted, uncommented line counts as prose.
pub const PROSE_CJK_RATIO: f64 = 0.3;

/// CJK share above which a whole submission counts as prose, not code.
pub const PROSE_TEXT_RATIO: f64 = 0.8;

/// Default ceiling for [`check_cjk_ratio`](crate::check_cjk_ratio).
pub const DEFAULT_MAX_CJK_RATIO: f64 = 0.1;

/// Input length cap (in characters) used by the input gate and `strict()`.
pub const MAX_INPUT_CHARS: usize = 50_000;

/// Sanitize pipeline configuration options.
#[derive(Debug, Clone)]
pub struct SanitizeOptions {
    /// Enable Stage 1: character filter
    pub filter_chars: bool,
    /// Enable Stage 2: fence stripper
    pub strip_fences: bool,
    /// Enable Stage 3: line classifier
    pub classify_lines: bool,
    /// CJK ratio threshold for the prose-explanation heuristic (0.0-1.0)
    pub prose_cjk_ratio: f64,
    /// Suggestion-phrase markers
    pub markers: MarkerSet,
    /// Truncate input to this many characters before Stage 1
    pub max_input_chars: Option<usize>,
}

impl Default for SanitizeOptions {
    fn default() -> Self {
        Self {
            filter_chars: true,
            strip_fences: true,
            classify_lines: true,
            prose_cjk_ratio: PROSE_CJK_RATIO,
            markers: MarkerSet::default(),
            max_input_chars: None,
        }
    }
}

impl SanitizeOptions {
    /// Creates options with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates options for minimal cleanup (character filter and fences only).
    pub fn minimal() -> Self {
        Self {
            classify_lines: false,
            ..Self::default()
        }
    }

    /// Creates options that also cap input length at [`MAX_INPUT_CHARS`].
    pub fn strict() -> Self {
        Self {
            max_input_chars: Some(MAX_INPUT_CHARS),
            ..Self::default()
        }
    }

    /// Sets the prose-explanation threshold.
    pub fn with_prose_ratio(mut self, ratio: f64) -> Self {
        self.prose_cjk_ratio = ratio;
        self
    }

    /// Replaces the suggestion markers.
    pub fn with_markers(mut self, markers: MarkerSet) -> Self {
        self.markers = markers;
        self
    }

    /// Caps input length in characters.
    pub fn with_max_input_chars(mut self, max: usize) -> Self {
        self.max_input_chars = Some(max);
        self
    }

    /// Disables the line classifier.
    pub fn without_line_classifier(mut self) -> Self {
        self.classify_lines = false;
        self
    }

    /// Checks that thresholds are usable.
    pub fn validate(&self) -> Result<()> {
        check_ratio("prose_cjk_ratio", self.prose_cjk_ratio)
    }
}

/// Validator configuration options.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidatorOptions {
    /// CJK ratio above which the text is rejected as prose.
    pub max_cjk_ratio: f64,
}

impl Default for ValidatorOptions {
    fn default() -> Self {
        Self {
            max_cjk_ratio: PROSE_TEXT_RATIO,
        }
    }
}

impl ValidatorOptions {
    /// Sets the rejection threshold.
    pub fn with_max_cjk_ratio(mut self, ratio: f64) -> Self {
        self.max_cjk_ratio = ratio;
        self
    }

    /// Checks that the threshold is usable.
    pub fn validate(&self) -> Result<()> {
        check_ratio("max_cjk_ratio", self.max_cjk_ratio)
    }
}

pub(crate) fn check_ratio(name: &'static str, value: f64) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(Error::InvalidThreshold { name, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = SanitizeOptions::default();
        assert!(options.filter_chars);
        assert!(options.strip_fences);
        assert!(options.classify_lines);
        assert_eq!(options.prose_cjk_ratio, PROSE_CJK_RATIO);
        assert_eq!(options.max_input_chars, None);
        assert_eq!(options.markers, MarkerSet::default());
    }

    #[test]
    fn test_minimal_options() {
        let options = SanitizeOptions::minimal();
        assert!(options.filter_chars);
        assert!(options.strip_fences);
        assert!(!options.classify_lines);
    }

    #[test]
    fn test_strict_options() {
        assert_eq!(
            SanitizeOptions::strict().max_input_chars,
            Some(MAX_INPUT_CHARS)
        );
    }

    #[test]
    fn test_threshold_validation() {
        assert!(SanitizeOptions::default().validate().is_ok());
        assert!(SanitizeOptions::default()
            .with_prose_ratio(1.5)
            .validate()
            .is_err());
        assert!(ValidatorOptions::default().validate().is_ok());
        assert!(matches!(
            ValidatorOptions::default().with_max_cjk_ratio(-0.1).validate(),
            Err(Error::InvalidThreshold {
                name: "max_cjk_ratio",
                ..
            })
        ));
        assert!(check_ratio("nan", f64::NAN).is_err());
    }
}
