//! # Sanitize Pipeline
//!
//! A 3-stage pipeline for stripping non-code noise from model-generated source.
//!
//! ## Pipeline Stages
//!
//! 1. **Stage 1: Character Filter** - zero-width/format characters, control characters,
//!    noncharacters, and anything outside printable ASCII + CJK ideographs
//! 2. **Stage 2: Fence Stripper** - markdown code-fence openers and closers, wherever they occur
//! 3. **Stage 3: Line Classifier** - prose explanations, suggestion phrases, trailing blank lines
//!
//! Every stage is a pure `&str -> String` transform and never fails.

use crate::charset::{cjk_exceeds, cjk_ratio, is_allowed_char};
use crate::options::{SanitizeOptions, MAX_INPUT_CHARS};
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::LazyLock;
use tracing::{debug, trace};

// ============================================================================
// Stage 1: Character Filter
// ============================================================================

/// Stage 1: Remove encoding noise
///
/// - Zero-width and formatting characters
/// - C0/C1 control characters (tab, LF, CR survive)
/// - Replacement character and noncharacters
/// - Everything outside printable ASCII, CJK ideographs, tab, LF, CR
pub fn filter_chars(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut removed = 0usize;

    for c in input.chars() {
        if is_invisible_char(c)
            || is_control_char(c)
            || is_noncharacter(c)
            // Allow-list runs last
            || !is_allowed_char(c)
        {
            removed += 1;
            continue;
        }
        result.push(c);
    }

    if removed > 0 {
        trace!(removed, "character filter removed code points");
    }

    result
}

/// Check if character is a zero-width or formatting character
fn is_invisible_char(c: char) -> bool {
    matches!(
        c,
        '\u{200B}'..='\u{200D}' // Zero-width space, non-joiner, joiner
        | '\u{FEFF}'            // BOM
        | '\u{00A0}'            // No-break space
        | '\u{2000}'..='\u{200A}' // General punctuation spaces
        | '\u{2028}'            // Line separator
        | '\u{2029}' // Paragraph separator
    )
}

/// Check if character is a C0/C1 control character other than tab, LF, CR
fn is_control_char(c: char) -> bool {
    matches!(
        c,
        '\0'..='\x08' | '\x0B' | '\x0C' | '\x0E'..='\x1F' | '\x7F'..='\u{9F}'
    )
}

/// Check if character is U+FFFD or a Unicode noncharacter
fn is_noncharacter(c: char) -> bool {
    let code = c as u32;
    c == '\u{FFFD}' || (0xFDD0..=0xFDEF).contains(&code) || (code & 0xFFFE) == 0xFFFE
}

// ============================================================================
// Stage 2: Fence Stripper
// ============================================================================

// Opener with optional language tag, or bare closer; one trailing newline
static RE_FENCE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"```[A-Za-z]*\n?").unwrap());

/// Stage 2: Strip markdown code fences
///
/// Each fence marker is removed independently; pairing is not checked, so
/// fences from concatenated responses in the middle of the text go too.
pub fn strip_fences(input: &str) -> String {
    RE_FENCE.replace_all(input, "").into_owned()
}

// ============================================================================
// Stage 3: Line Classifier
// ============================================================================

/// Why the line classifier dropped a line.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DropReason {
    /// Mostly-CJK line with no quotes and no leading `#`.
    ProseExplanation {
        /// CJK share of the trimmed line.
        cjk_ratio: f64,
    },
    /// Line matched a suggestion marker.
    Suggestion {
        /// The marker pattern that fired.
        marker: String,
        /// The marker's configured reason.
        reason: String,
    },
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DropReason::ProseExplanation { cjk_ratio } => {
                write!(f, "prose explanation ({:.0}% CJK)", cjk_ratio * 100.0)
            }
            DropReason::Suggestion { marker, reason } => {
                write!(f, "suggestion phrase '{}' ({})", marker, reason)
            }
        }
    }
}

/// Line classifier outcome for a single line.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum LineDecision {
    /// Whitespace-only line; always retained.
    Blank,
    /// Code line; retained verbatim.
    Keep,
    /// Commentary line; removed.
    Drop(DropReason),
}

impl LineDecision {
    /// Returns true unless the line is dropped.
    pub fn is_retained(&self) -> bool {
        !matches!(self, LineDecision::Drop(_))
    }
}

/// Per-line entry produced by [`explain_lines`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineReport {
    /// 1-based line number in the classifier input.
    pub line_number: usize,
    /// Original line content.
    pub text: String,
    /// Classifier decision.
    #[serde(flatten)]
    pub decision: LineDecision,
}

/// Classifies one line.
///
/// The prose heuristic is checked first, so a line that trips both reports
/// as a prose explanation.
pub fn classify_line(line: &str, options: &SanitizeOptions) -> LineDecision {
    let trimmed = line.trim();

    if trimmed.is_empty() {
        return LineDecision::Blank;
    }

    if is_prose_explanation(trimmed, options.prose_cjk_ratio) {
        return LineDecision::Drop(DropReason::ProseExplanation {
            cjk_ratio: cjk_ratio(trimmed),
        });
    }

    if let Some(marker) = options.markers.first_match(trimmed) {
        return LineDecision::Drop(DropReason::Suggestion {
            marker: marker.pattern.clone(),
            reason: marker.reason.clone(),
        });
    }

    LineDecision::Keep
}

/// Mostly-CJK line that is neither a string literal nor a `#` comment
fn is_prose_explanation(trimmed: &str, ratio: f64) -> bool {
    cjk_exceeds(trimmed, ratio)
        && !trimmed.contains('"')
        && !trimmed.contains('\'')
        && !trimmed.starts_with('#')
}

/// Stage 3: Line classification
///
/// - Drop prose-explanation lines
/// - Drop suggestion-phrase lines
/// - Keep blank lines inside the code
/// - Trim trailing blank lines
pub fn classify_lines(input: &str, options: &SanitizeOptions) -> String {
    let mut kept: Vec<&str> = Vec::new();

    for (index, line) in input.split('\n').enumerate() {
        match classify_line(line, options) {
            LineDecision::Drop(reason) => {
                debug!(line = index + 1, %reason, "dropping line");
            }
            LineDecision::Blank | LineDecision::Keep => kept.push(line),
        }
    }

    while kept.last().is_some_and(|line| line.trim().is_empty()) {
        kept.pop();
    }

    kept.join("\n")
}

/// Reports the classifier decision for every line of `input`.
///
/// Trailing-blank trimming is not reflected; trailing blank lines show up as
/// [`LineDecision::Blank`].
pub fn explain_lines(input: &str, options: &SanitizeOptions) -> Vec<LineReport> {
    input
        .split('\n')
        .enumerate()
        .map(|(index, line)| LineReport {
            line_number: index + 1,
            text: line.to_string(),
            decision: classify_line(line, options),
        })
        .collect()
}

// ============================================================================
// Input Gate
// ============================================================================

/// Strip C0 control characters (keeping tab, LF, CR) and DEL, then cap the
/// text at [`MAX_INPUT_CHARS`] characters.
///
/// A lighter gate than [`sanitize`] for free-form text fields.
pub fn sanitize_input(input: &str) -> String {
    input
        .chars()
        .filter(|&c| !matches!(c, '\0'..='\x08' | '\x0B' | '\x0C' | '\x0E'..='\x1F' | '\x7F'))
        .take(MAX_INPUT_CHARS)
        .collect()
}

/// Returns at most the first `max` characters of `input`.
pub(crate) fn truncate_chars(input: &str, max: usize) -> &str {
    match input.char_indices().nth(max) {
        Some((byte_index, _)) => &input[..byte_index],
        None => input,
    }
}

// ============================================================================
// Main Pipeline
// ============================================================================

/// Run the full sanitize pipeline
///
/// # Example
///
/// ```
/// use codeclean::{cleanup::sanitize, SanitizeOptions};
///
/// let raw = "```python\nprint('hi')\n```\n以上代码可以直接运行";
/// let clean = sanitize(raw, &SanitizeOptions::default());
/// assert_eq!(clean, "print('hi')");
/// ```
pub fn sanitize(input: &str, options: &SanitizeOptions) -> String {
    let mut result = prepare_lines(input, options);

    // Stage 3: Line classifier
    if options.classify_lines {
        result = classify_lines(&result, options);
    }

    trace!(
        input_len = input.len(),
        output_len = result.len(),
        "sanitize finished"
    );

    result
}

/// Runs the input cap and the enabled stages that precede the line classifier.
///
/// The result is exactly what Stage 3 sees inside [`sanitize`].
pub fn prepare_lines(input: &str, options: &SanitizeOptions) -> String {
    let mut result = match options.max_input_chars {
        Some(max) => truncate_chars(input, max).to_string(),
        None => input.to_string(),
    };

    // Stage 1: Character filter
    if options.filter_chars {
        result = filter_chars(&result);
    }

    // Stage 2: Fence stripper
    if options.strip_fences {
        result = strip_fences(&result);
    }

    result
}

/// Run the pipeline with default options
pub fn sanitize_default(input: &str) -> String {
    sanitize(input, &SanitizeOptions::default())
}
