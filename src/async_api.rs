//! Async API for non-blocking sanitization of files and streams.
//!
//! Enable the `async` feature to use these APIs:
//!
//! ```toml
//! [dependencies]
//! codeclean = { version = "0.1", features = ["async"] }
//! ```

use crate::error::{Error, Result};
use crate::options::{SanitizeOptions, ValidatorOptions};
use crate::SanitizeReport;
use std::path::Path;
use tokio::fs;
use tokio::io::{AsyncRead, AsyncReadExt};

/// Asynchronously sanitizes a file with default options.
///
/// # Example
///
/// ```no_run
/// # async fn example() -> codeclean::Result<()> {
/// let code = codeclean::async_api::sanitize_file("response.txt").await?;
/// println!("{}", code);
/// # Ok(())
/// # }
/// ```
pub async fn sanitize_file(path: impl AsRef<Path>) -> Result<String> {
    sanitize_file_with_options(path, &SanitizeOptions::default()).await
}

/// Asynchronously sanitizes a file with custom options.
pub async fn sanitize_file_with_options(
    path: impl AsRef<Path>,
    options: &SanitizeOptions,
) -> Result<String> {
    let data = fs::read(path).await?;
    sanitize_bytes(data, options.clone()).await
}

/// Asynchronously sanitizes everything read from `reader`.
pub async fn sanitize_reader<R: AsyncRead + Unpin>(
    mut reader: R,
    options: &SanitizeOptions,
) -> Result<String> {
    let mut data = Vec::new();
    reader.read_to_end(&mut data).await?;
    sanitize_bytes(data, options.clone()).await
}

/// Asynchronously runs the whole pipeline on a file.
///
/// # Example
///
/// ```no_run
/// # async fn example() -> codeclean::Result<()> {
/// let report = codeclean::async_api::process_file("response.txt").await?;
/// if !report.verdict.is_valid {
///     eprintln!("{}", report.verdict.reason);
/// }
/// # Ok(())
/// # }
/// ```
pub async fn process_file(path: impl AsRef<Path>) -> Result<SanitizeReport> {
    let data = fs::read(path).await?;

    // The pipeline is CPU-bound, so it runs in a blocking task
    tokio::task::spawn_blocking(move || {
        crate::process_with_options(
            crate::coerce_text(&data),
            &SanitizeOptions::default(),
            &ValidatorOptions::default(),
        )
    })
    .await
    .map_err(|e| Error::Task(e.to_string()))
}

async fn sanitize_bytes(data: Vec<u8>, options: SanitizeOptions) -> Result<String> {
    tokio::task::spawn_blocking(move || {
        crate::cleanup::sanitize(crate::coerce_text(&data), &options)
    })
    .await
    .map_err(|e| Error::Task(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LanguageTag;

    #[tokio::test]
    async fn test_sanitize_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("response.txt");
        std::fs::write(&path, "```python\nprint(1)\n```\n\n提示: 运行即可\n").unwrap();

        let code = sanitize_file(&path).await.unwrap();
        assert_eq!(code, "print(1)");
    }

    #[tokio::test]
    async fn test_process_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("response.txt");
        std::fs::write(&path, "const x = 1;\nconsole.log(x);").unwrap();

        let report = process_file(&path).await.unwrap();
        assert_eq!(report.language, LanguageTag::JavaScript);
        assert!(report.verdict.is_valid);
    }

    #[tokio::test]
    async fn test_missing_file() {
        let result = sanitize_file("/definitely/not/here.txt").await;
        assert!(matches!(result, Err(Error::Io(_))));
    }

    #[tokio::test]
    async fn test_sanitize_reader() {
        let input: &[u8] = b"```\nlet a = 1;\n```";
        let code = sanitize_reader(input, &SanitizeOptions::default())
            .await
            .unwrap();
        assert_eq!(code, "let a = 1;");
    }

    #[tokio::test]
    async fn test_invalid_utf8_is_empty() {
        let input: &[u8] = &[0xFF, 0xFE, 0x00];
        let code = sanitize_reader(input, &SanitizeOptions::default())
            .await
            .unwrap();
        assert_eq!(code, "");
    }
}
