//! # codeclean
//!
//! A deterministic sanitize → classify → validate pipeline for untrusted,
//! model-generated source code, run before the code is stored, displayed, or
//! handed to an execution sandbox.
//!
//! ## Pipeline
//!
//! - **Character filter**: drops invisible, control, and encoding-noise code points
//! - **Fence stripper**: drops markdown code fences, wherever they appear
//! - **Line classifier**: drops prose explanations and suggestion phrases
//! - **Language detector / validator**: tags the result and decides whether it looks like code
//!
//! ## Quick Start
//!
//! ```
//! use codeclean::{detect_code_language, sanitize, validate_code, LanguageTag};
//!
//! let raw = "```python\ndef greet():\n    print(\"你好\")\n```\n建议添加文档字符串";
//! let code = sanitize(raw);
//! assert_eq!(code, "def greet():\n    print(\"你好\")");
//!
//! assert_eq!(detect_code_language(&code), LanguageTag::Python);
//! assert!(validate_code(&code).is_valid);
//! ```
//!
//! ## Features
//!
//! - `async`: Async file/reader API with Tokio
//! - `python`: Python bindings via PyO3
//! - `ffi`: C ABI exports

pub mod charset;
pub mod cleanup;
pub mod detect;
pub mod error;
pub mod markers;
pub mod options;
pub mod validate;

#[cfg(feature = "ffi")]
pub mod ffi;

#[cfg(feature = "python")]
mod python;

#[cfg(feature = "async")]
pub mod async_api;

// Re-exports
pub use cleanup::{
    classify_line, classify_lines, explain_lines, filter_chars, prepare_lines, sanitize_input,
    strip_fences, DropReason, LineDecision, LineReport,
};
pub use detect::{detect_language, LanguageTag};
pub use error::{Error, Result};
pub use markers::{Marker, MarkerKind, MarkerSet};
pub use options::{
    SanitizeOptions, ValidatorOptions, DEFAULT_MAX_CJK_RATIO, MAX_INPUT_CHARS, PROSE_CJK_RATIO,
    PROSE_TEXT_RATIO,
};
pub use validate::{check_cjk_ratio, validate, RatioCheck, ValidationVerdict};

use rayon::prelude::*;
use serde::Serialize;
use tracing::warn;

/// Sanitizes raw model output with default options.
///
/// Runs the character filter, fence stripper and line classifier in order.
/// Always run this before submitting text to an execution backend.
///
/// # Example
///
/// ```
/// let clean = codeclean::sanitize("```js\nconsole.log(1)\n```\n\n\n");
/// assert_eq!(clean, "console.log(1)");
/// ```
pub fn sanitize(raw: &str) -> String {
    cleanup::sanitize(raw, &SanitizeOptions::default())
}

/// Sanitizes raw model output with custom options.
pub fn sanitize_with_options(raw: &str, options: &SanitizeOptions) -> String {
    cleanup::sanitize(raw, options)
}

/// Sanitizes a byte buffer.
///
/// Bytes that are not valid UTF-8 are not text; they sanitize to an empty
/// string.
pub fn sanitize_bytes(data: &[u8]) -> String {
    sanitize(coerce_text(data))
}

/// Interprets bytes as text at an API boundary.
///
/// Returns the empty string for invalid UTF-8.
pub fn coerce_text(data: &[u8]) -> &str {
    match std::str::from_utf8(data) {
        Ok(text) => text,
        Err(e) => {
            warn!(error = %e, "input is not valid UTF-8, treating as empty");
            ""
        }
    }
}

/// Guesses the language of a snippet (`python`, `javascript`, `java`, `unknown`).
///
/// Works on raw or sanitized text; intended for sanitized output.
pub fn detect_code_language(text: &str) -> LanguageTag {
    detect::detect_language(text)
}

/// Checks whether a snippet looks like code rather than prose.
///
/// The verdict's reason is meant for direct display to an end user.
pub fn validate_code(text: &str) -> ValidationVerdict {
    validate::validate(text)
}

/// Result of running the whole pipeline once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SanitizeReport {
    /// Sanitized text.
    pub cleaned: String,
    /// Language guess for the sanitized text.
    pub language: LanguageTag,
    /// Validity verdict for the sanitized text.
    pub verdict: ValidationVerdict,
}

/// Sanitizes, then classifies and validates the cleaned text.
///
/// # Example
///
/// ```
/// let report = codeclean::process("这是一段说明\n以上就是全部内容");
/// assert_eq!(report.cleaned, "");
/// assert!(!report.verdict.is_valid);
/// ```
pub fn process(raw: &str) -> SanitizeReport {
    process_with_options(raw, &SanitizeOptions::default(), &ValidatorOptions::default())
}

/// Runs [`process`] with custom options.
pub fn process_with_options(
    raw: &str,
    options: &SanitizeOptions,
    validator: &ValidatorOptions,
) -> SanitizeReport {
    let cleaned = cleanup::sanitize(raw, options);
    let language = detect::detect_language(&cleaned);
    let verdict = validate::validate_with_options(&cleaned, validator);

    SanitizeReport {
        cleaned,
        language,
        verdict,
    }
}

/// Sanitizes many inputs in parallel, preserving input order.
pub fn sanitize_batch<S>(inputs: &[S], options: &SanitizeOptions) -> Vec<String>
where
    S: AsRef<str> + Sync,
{
    inputs
        .par_iter()
        .map(|raw| cleanup::sanitize(raw.as_ref(), options))
        .collect()
}

/// Processes many inputs in parallel, preserving input order.
pub fn process_batch<S>(
    inputs: &[S],
    options: &SanitizeOptions,
    validator: &ValidatorOptions,
) -> Vec<SanitizeReport>
where
    S: AsRef<str> + Sync,
{
    inputs
        .par_iter()
        .map(|raw| process_with_options(raw.as_ref(), options, validator))
        .collect()
}
