//! Language detection for sanitized code.
//!
//! A keyword heuristic, not a parser: markers are checked case-insensitively
//! in a fixed priority order (Python, JavaScript, Java) and the first
//! category with any hit wins. Polyglot snippets resolve to the earlier
//! category.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Python markers (checked first)
const PYTHON_MARKERS: &[&str] = &["import ", "def ", "print(", "if __name__"];

/// JavaScript markers (checked second)
const JAVASCRIPT_MARKERS: &[&str] = &["function ", "const ", "let ", "console.log"];

/// Java markers (checked third, matched against lower-cased input)
const JAVA_MARKERS: &[&str] = &["public class", "public static void main", "system.out.println"];

/// Detected language tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LanguageTag {
    /// Python source
    Python,
    /// JavaScript source
    JavaScript,
    /// Java source
    Java,
    /// No marker matched
    Unknown,
}

impl LanguageTag {
    /// Wire name of the tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            LanguageTag::Python => "python",
            LanguageTag::JavaScript => "javascript",
            LanguageTag::Java => "java",
            LanguageTag::Unknown => "unknown",
        }
    }

    /// Returns true for any tag other than `Unknown`.
    pub fn is_known(&self) -> bool {
        !matches!(self, LanguageTag::Unknown)
    }
}

impl std::fmt::Display for LanguageTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LanguageTag {
    type Err = std::convert::Infallible;

    /// Unrecognized names map to `Unknown`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "python" | "py" => LanguageTag::Python,
            "javascript" | "js" => LanguageTag::JavaScript,
            "java" => LanguageTag::Java,
            _ => LanguageTag::Unknown,
        })
    }
}

/// Detect the language of a code snippet.
pub fn detect_language(code: &str) -> LanguageTag {
    if code.is_empty() {
        return LanguageTag::Unknown;
    }

    let lower = code.to_lowercase();
    let has_any = |markers: &[&str]| markers.iter().any(|m| lower.contains(m));

    if has_any(PYTHON_MARKERS) {
        return LanguageTag::Python;
    }

    if has_any(JAVASCRIPT_MARKERS) {
        return LanguageTag::JavaScript;
    }

    if has_any(JAVA_MARKERS) {
        return LanguageTag::Java;
    }

    LanguageTag::Unknown
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_python() {
        assert_eq!(detect_language("import os\nos.getcwd()"), LanguageTag::Python);
        assert_eq!(detect_language("def main():\n    pass"), LanguageTag::Python);
        assert_eq!(detect_language("print(42)"), LanguageTag::Python);
        assert_eq!(
            detect_language("if __name__ == '__main__':\n    run()"),
            LanguageTag::Python
        );
    }

    #[test]
    fn test_detect_javascript() {
        assert_eq!(detect_language("function add(a, b) {}"), LanguageTag::JavaScript);
        assert_eq!(detect_language("const x = 1;"), LanguageTag::JavaScript);
        assert_eq!(detect_language("console.log('hi')"), LanguageTag::JavaScript);
    }

    #[test]
    fn test_detect_java() {
        let code = "public class Main {\n  public static void main(String[] a) {\n    System.out.println(1);\n  }\n}";
        assert_eq!(detect_language(code), LanguageTag::Java);
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(detect_language("IMPORT sys"), LanguageTag::Python);
        assert_eq!(detect_language("CONSOLE.LOG(1)"), LanguageTag::JavaScript);
    }

    #[test]
    fn test_python_wins_over_javascript() {
        let code = "def foo():\n    pass\nfunction bar(){}";
        assert_eq!(detect_language(code), LanguageTag::Python);
    }

    #[test]
    fn test_java_with_import_is_python() {
        // First match wins, even when it misroutes
        let code = "import java.util.List;\npublic class A {}";
        assert_eq!(detect_language(code), LanguageTag::Python);
    }

    #[test]
    fn test_detect_unknown() {
        assert_eq!(detect_language(""), LanguageTag::Unknown);
        assert_eq!(detect_language("SELECT * FROM t;"), LanguageTag::Unknown);
        assert_eq!(detect_language("   "), LanguageTag::Unknown);
    }

    #[test]
    fn test_tag_names() {
        assert_eq!(LanguageTag::JavaScript.to_string(), "javascript");
        assert_eq!("JS".parse::<LanguageTag>().unwrap(), LanguageTag::JavaScript);
        assert_eq!("cobol".parse::<LanguageTag>().unwrap(), LanguageTag::Unknown);
        assert_eq!(
            serde_json::to_string(&LanguageTag::Python).unwrap(),
            "\"python\""
        );
        assert!(!LanguageTag::Unknown.is_known());
    }
}
