//! C-ABI Foreign Function Interface for codeclean.
//!
//! Exposes the pipeline to C, C++, C# and any other language with C FFI
//! support.
//!
//! # Memory Management
//!
//! All strings returned by this library must be freed using
//! `codeclean_free_string`, except those documented as static.
//!
//! # Input Handling
//!
//! A null `input` pointer, or input that is not valid UTF-8, is treated as
//! empty text rather than an error, matching the library's behaviour for
//! non-string input.
//!
//! # Example (C)
//!
//! ```c
//! #include <stdio.h>
//! #include "codeclean.h"
//!
//! int main() {
//!     char* code = codeclean_sanitize(model_output);
//!     char* reason = NULL;
//!     if (codeclean_validate(code, &reason) == 1) {
//!         printf("[%s]\n%s\n", codeclean_detect_language(code), code);
//!     } else {
//!         fprintf(stderr, "%s\n", reason);
//!     }
//!     codeclean_free_string(reason);
//!     codeclean_free_string(code);
//!     return 0;
//! }
//! ```

use std::cell::RefCell;
use std::ffi::{c_char, c_int, CStr, CString};
use std::panic::catch_unwind;
use std::ptr;

use crate::detect::LanguageTag;

// Thread-local storage for the last error message.
thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

/// Set the last error message.
fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

/// Clear the last error message.
fn clear_last_error() {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = None;
    });
}

/// JSON format options.
pub const CODECLEAN_JSON_PRETTY: c_int = 0;
pub const CODECLEAN_JSON_COMPACT: c_int = 1;

/// Return values of `codeclean_validate`.
pub const CODECLEAN_VALID: c_int = 1;
pub const CODECLEAN_INVALID: c_int = 0;
pub const CODECLEAN_ERROR: c_int = -1;

/// Borrow C input as text; null or non-UTF-8 becomes "".
unsafe fn input_text<'a>(input: *const c_char) -> &'a str {
    if input.is_null() {
        return "";
    }
    crate::coerce_text(CStr::from_ptr(input).to_bytes())
}

/// Hand a Rust string to C, recording an error on failure.
fn into_c_string(s: String) -> *mut c_char {
    match CString::new(s) {
        Ok(s) => s.into_raw(),
        Err(_) => {
            set_last_error("output contains null byte");
            ptr::null_mut()
        }
    }
}

/// Static, NUL-terminated name of a language tag.
fn language_c_name(tag: LanguageTag) -> *const c_char {
    let name: &'static [u8] = match tag {
        LanguageTag::Python => b"python\0",
        LanguageTag::JavaScript => b"javascript\0",
        LanguageTag::Java => b"java\0",
        LanguageTag::Unknown => b"unknown\0",
    };
    name.as_ptr() as *const c_char
}

/// Get the version of the library.
///
/// # Safety
///
/// Returns a static string that must not be freed.
#[no_mangle]
pub extern "C" fn codeclean_version() -> *const c_char {
    concat!(env!("CARGO_PKG_VERSION"), "\0").as_ptr() as *const c_char
}

/// Get the last error message.
///
/// # Safety
///
/// Returns a pointer to a thread-local error string. The pointer is valid until
/// the next call to any codeclean function on the same thread.
#[no_mangle]
pub extern "C" fn codeclean_last_error() -> *const c_char {
    LAST_ERROR.with(|e| {
        e.borrow()
            .as_ref()
            .map(|s| s.as_ptr())
            .unwrap_or(ptr::null())
    })
}

/// Sanitize model output with default options.
///
/// # Safety
///
/// - `input` must be null or a valid null-terminated string.
/// - Returns null only on internal failure. Use `codeclean_last_error` to get the error message.
/// - The returned string must be freed with `codeclean_free_string`.
#[no_mangle]
pub unsafe extern "C" fn codeclean_sanitize(input: *const c_char) -> *mut c_char {
    clear_last_error();

    let result = catch_unwind(|| crate::sanitize(input_text(input)));

    match result {
        Ok(cleaned) => into_c_string(cleaned),
        Err(_) => {
            set_last_error("panic occurred during sanitization");
            ptr::null_mut()
        }
    }
}

/// Detect the language of a snippet.
///
/// # Safety
///
/// - `input` must be null or a valid null-terminated string.
/// - Returns a static string (`python`, `javascript`, `java`, `unknown`) that must not be freed.
#[no_mangle]
pub unsafe extern "C" fn codeclean_detect_language(input: *const c_char) -> *const c_char {
    clear_last_error();

    match catch_unwind(|| crate::detect_code_language(input_text(input))) {
        Ok(tag) => language_c_name(tag),
        Err(_) => {
            set_last_error("panic occurred during detection");
            language_c_name(LanguageTag::Unknown)
        }
    }
}

/// Validate a snippet.
///
/// # Safety
///
/// - `input` must be null or a valid null-terminated string.
/// - `out_reason` may be null. Otherwise it receives a string that must be
///   freed with `codeclean_free_string`.
/// - Returns `CODECLEAN_VALID`, `CODECLEAN_INVALID`, or `CODECLEAN_ERROR`.
#[no_mangle]
pub unsafe extern "C" fn codeclean_validate(
    input: *const c_char,
    out_reason: *mut *mut c_char,
) -> c_int {
    clear_last_error();

    let verdict = match catch_unwind(|| crate::validate_code(input_text(input))) {
        Ok(verdict) => verdict,
        Err(_) => {
            set_last_error("panic occurred during validation");
            return CODECLEAN_ERROR;
        }
    };

    if !out_reason.is_null() {
        *out_reason = into_c_string(verdict.reason);
    }

    if verdict.is_valid {
        CODECLEAN_VALID
    } else {
        CODECLEAN_INVALID
    }
}

/// Run the whole pipeline and return the report as JSON.
///
/// # Safety
///
/// - `input` must be null or a valid null-terminated string.
/// - `format` is one of `CODECLEAN_JSON_PRETTY` or `CODECLEAN_JSON_COMPACT`.
/// - Returns null on error. Use `codeclean_last_error` to get the error message.
/// - The returned string must be freed with `codeclean_free_string`.
#[no_mangle]
pub unsafe extern "C" fn codeclean_process_json(
    input: *const c_char,
    format: c_int,
) -> *mut c_char {
    clear_last_error();

    let result = catch_unwind(|| {
        let report = crate::process(input_text(input));
        if format == CODECLEAN_JSON_COMPACT {
            serde_json::to_string(&report).map_err(|e| e.to_string())
        } else {
            serde_json::to_string_pretty(&report).map_err(|e| e.to_string())
        }
    });

    match result {
        Ok(Ok(json)) => into_c_string(json),
        Ok(Err(e)) => {
            set_last_error(&e);
            ptr::null_mut()
        }
        Err(_) => {
            set_last_error("panic occurred during processing");
            ptr::null_mut()
        }
    }
}

/// Free a string returned by this library.
///
/// # Safety
///
/// - `s` must be null or a pointer returned by a codeclean function documented
///   as returning an owned string.
#[no_mangle]
pub unsafe extern "C" fn codeclean_free_string(s: *mut c_char) {
    if !s.is_null() {
        let _ = CString::from_raw(s);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn take_string(s: *mut c_char) -> String {
        assert!(!s.is_null());
        let owned = unsafe { CStr::from_ptr(s) }.to_str().unwrap().to_string();
        unsafe { codeclean_free_string(s) };
        owned
    }

    #[test]
    fn test_version() {
        let version = codeclean_version();
        assert!(!version.is_null());
        let version_str = unsafe { CStr::from_ptr(version) }.to_str().unwrap();
        assert_eq!(version_str, env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn test_sanitize() {
        let input = CString::new("```python\nprint(1)\n```\n建议加注释").unwrap();
        let out = unsafe { codeclean_sanitize(input.as_ptr()) };
        assert_eq!(take_string(out), "print(1)");
        assert!(codeclean_last_error().is_null());
    }

    #[test]
    fn test_null_input_is_empty() {
        let out = unsafe { codeclean_sanitize(ptr::null()) };
        assert_eq!(take_string(out), "");

        let lang = unsafe { codeclean_detect_language(ptr::null()) };
        assert_eq!(unsafe { CStr::from_ptr(lang) }.to_str().unwrap(), "unknown");
    }

    #[test]
    fn test_invalid_utf8_is_empty() {
        let bytes: &[u8] = &[0x61, 0xFF, 0x62, 0x00];
        let out = unsafe { codeclean_sanitize(bytes.as_ptr() as *const c_char) };
        assert_eq!(take_string(out), "");
    }

    #[test]
    fn test_detect_language() {
        let input = CString::new("const a = 1;").unwrap();
        let lang = unsafe { codeclean_detect_language(input.as_ptr()) };
        assert_eq!(
            unsafe { CStr::from_ptr(lang) }.to_str().unwrap(),
            "javascript"
        );
    }

    #[test]
    fn test_validate() {
        let mut reason: *mut c_char = ptr::null_mut();
        let empty = CString::new("   ").unwrap();
        let status = unsafe { codeclean_validate(empty.as_ptr(), &mut reason) };
        assert_eq!(status, CODECLEAN_INVALID);
        assert_eq!(take_string(reason), crate::validate::REASON_EMPTY);

        let code = CString::new("print(1)").unwrap();
        let status = unsafe { codeclean_validate(code.as_ptr(), ptr::null_mut()) };
        assert_eq!(status, CODECLEAN_VALID);
    }

    #[test]
    fn test_process_json() {
        let input = CString::new("def f():\n    return 1").unwrap();
        let json = take_string(unsafe {
            codeclean_process_json(input.as_ptr(), CODECLEAN_JSON_COMPACT)
        });
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["language"], "python");
        assert_eq!(value["verdict"]["isValid"], true);
    }

    #[test]
    fn test_free_null() {
        unsafe {
            codeclean_free_string(ptr::null_mut());
        }
    }
}
