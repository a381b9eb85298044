//! codeclean CLI - model output sanitization tool
//!
//! A command-line tool for turning raw model responses into clean source code.

use clap::{Args, Parser, Subcommand};
use codeclean::{
    check_cjk_ratio, cleanup, detect_language, process_batch, process_with_options, LineDecision,
    LineReport, MarkerSet, SanitizeOptions, ValidatorOptions, DEFAULT_MAX_CJK_RATIO,
    PROSE_TEXT_RATIO,
};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::ffi::OsStr;
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Exit status for a negative `validate` / `check` verdict.
const EXIT_REJECTED: i32 = 2;

/// Sanitize, classify and validate model-generated code
#[derive(Parser)]
#[command(
    name = "codeclean",
    author = "iyulab",
    version,
    about = "Sanitize model-generated source code",
    long_about = "codeclean - Deterministic cleanup for model-generated code.\n\n\
                  Removes invisible characters, markdown fences and Chinese commentary\n\
                  lines, then detects the language and validates the result.\n\n\
                  Usage:\n  \
                  codeclean sanitize <file>     Print sanitized code\n  \
                  codeclean process <file>      Print a JSON report\n  \
                  cat reply.txt | codeclean sanitize"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging (overrides CODECLEAN_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Sanitize model output and print the cleaned code
    Sanitize {
        /// Input file path (default: stdin)
        input: Option<PathBuf>,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        classifier: ClassifierArgs,
    },

    /// Detect the language of a snippet
    Detect {
        /// Input file path (default: stdin)
        input: Option<PathBuf>,

        /// Sanitize before detecting
        #[arg(long)]
        sanitize: bool,
    },

    /// Check whether a snippet looks like code (exit status 2 if not)
    Validate {
        /// Input file path (default: stdin)
        input: Option<PathBuf>,

        /// Maximum share of CJK ideographs in the trimmed text
        #[arg(long, default_value_t = PROSE_TEXT_RATIO)]
        max_cjk_ratio: f64,

        /// Print the verdict as JSON
        #[arg(long)]
        json: bool,
    },

    /// Gate on the CJK share of the whole text (exit status 2 if above)
    Check {
        /// Input file path (default: stdin)
        input: Option<PathBuf>,

        /// Maximum share of CJK ideographs
        #[arg(long, default_value_t = DEFAULT_MAX_CJK_RATIO)]
        max_ratio: f64,
    },

    /// Run the whole pipeline and print a JSON report
    Process {
        /// Input file path (default: stdin)
        input: Option<PathBuf>,

        /// Output compact JSON (no indentation)
        #[arg(long)]
        compact: bool,

        #[command(flatten)]
        classifier: ClassifierArgs,
    },

    /// Show the line classifier's decision for every line
    Explain {
        /// Input file path (default: stdin)
        input: Option<PathBuf>,

        /// Print decisions as JSON
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        classifier: ClassifierArgs,
    },

    /// Sanitize many files in parallel
    Batch {
        /// Input files
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Output directory for sanitized files
        #[arg(short, long)]
        output: PathBuf,

        #[command(flatten)]
        classifier: ClassifierArgs,
    },

    /// Show version information
    Version,
}

/// Line classifier configuration shared by several commands
#[derive(Args, Clone, Default)]
struct ClassifierArgs {
    /// JSON file with suggestion markers (replaces the built-in set)
    #[arg(long, value_name = "JSON")]
    markers: Option<PathBuf>,

    /// CJK ratio above which a line counts as prose
    #[arg(long)]
    prose_ratio: Option<f64>,

    /// Only filter characters and strip fences
    #[arg(long)]
    minimal: bool,
}

impl ClassifierArgs {
    fn to_options(&self) -> Result<SanitizeOptions, Box<dyn std::error::Error>> {
        let mut options = if self.minimal {
            SanitizeOptions::minimal()
        } else {
            SanitizeOptions::default()
        };

        if let Some(ref path) = self.markers {
            options = options.with_markers(MarkerSet::from_path(path)?);
        }
        if let Some(ratio) = self.prose_ratio {
            options = options.with_prose_ratio(ratio);
        }

        options.validate()?;
        Ok(options)
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        "codeclean=debug".to_string()
    } else {
        std::env::var("CODECLEAN_LOG").unwrap_or_else(|_| "codeclean=warn".into())
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(filter))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(0) => {}
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("{}: {}", "Error".red().bold(), e);
            std::process::exit(1);
        }
    }
}

/// Runs a command and returns the process exit status.
fn run(cli: Cli) -> Result<i32, Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Sanitize {
            input,
            output,
            classifier,
        } => {
            let options = classifier.to_options()?;
            let raw = read_input(input.as_deref())?;

            let cleaned = cleanup::sanitize(&raw, &options);
            write_output(output.as_deref(), &cleaned)?;

            if let Some(path) = output {
                println!(
                    "{} Sanitized to: {}",
                    "✓".green().bold(),
                    path.display()
                );
            }
        }

        Commands::Detect { input, sanitize } => {
            let raw = read_input(input.as_deref())?;
            let text = if sanitize {
                codeclean::sanitize(&raw)
            } else {
                raw
            };
            println!("{}", detect_language(&text));
        }

        Commands::Validate {
            input,
            max_cjk_ratio,
            json,
        } => {
            let validator = ValidatorOptions::default().with_max_cjk_ratio(max_cjk_ratio);
            validator.validate()?;

            let raw = read_input(input.as_deref())?;
            let verdict = codeclean::validate::validate_with_options(&raw, &validator);

            if json {
                println!("{}", serde_json::to_string_pretty(&verdict)?);
            } else if verdict.is_valid {
                println!("{} {}", "✓".green().bold(), verdict.reason);
            } else {
                println!("{} {}", "✗".red().bold(), verdict.reason);
            }

            if !verdict.is_valid {
                return Ok(EXIT_REJECTED);
            }
        }

        Commands::Check { input, max_ratio } => {
            ValidatorOptions::default()
                .with_max_cjk_ratio(max_ratio)
                .validate()?;

            let raw = read_input(input.as_deref())?;
            let check = check_cjk_ratio(&raw, max_ratio);

            let mark = if check.passed {
                "✓".green().bold()
            } else {
                "✗".red().bold()
            };
            println!(
                "{} CJK ratio {:.1}% (limit {:.1}%)",
                mark,
                check.ratio * 100.0,
                max_ratio * 100.0
            );

            if !check.passed {
                return Ok(EXIT_REJECTED);
            }
        }

        Commands::Process {
            input,
            compact,
            classifier,
        } => {
            let options = classifier.to_options()?;
            let raw = read_input(input.as_deref())?;

            let report = process_with_options(&raw, &options, &ValidatorOptions::default());
            let json = if compact {
                serde_json::to_string(&report)?
            } else {
                serde_json::to_string_pretty(&report)?
            };
            println!("{}", json);
        }

        Commands::Explain {
            input,
            json,
            classifier,
        } => {
            let options = classifier.to_options()?;
            let raw = read_input(input.as_deref())?;

            let Some(reports) = explain(&raw, &options) else {
                eprintln!(
                    "{} line classifier is disabled, no lines would be dropped",
                    "!".yellow().bold()
                );
                if json {
                    println!("[]");
                }
                return Ok(0);
            };

            if json {
                println!("{}", serde_json::to_string_pretty(&reports)?);
                return Ok(0);
            }

            let dropped = reports.iter().filter(|r| !r.decision.is_retained()).count();
            for report in &reports {
                let number = format!("{:>4}", report.line_number).dimmed();
                match &report.decision {
                    LineDecision::Blank => println!("{} {}", number, "·".dimmed()),
                    LineDecision::Keep => println!("{} {} {}", number, "+".green(), report.text),
                    LineDecision::Drop(reason) => println!(
                        "{} {} {}  {}",
                        number,
                        "-".red(),
                        report.text.red(),
                        format!("[{}]", reason).yellow()
                    ),
                }
            }

            println!("\n{}", "Summary".cyan().bold());
            println!("{}", "─".repeat(40));
            println!("{}: {}", "Lines".bold(), reports.len());
            println!("{}: {}", "Dropped".bold(), dropped);
        }

        Commands::Batch {
            inputs,
            output,
            classifier,
        } => {
            run_batch(&inputs, &output, &classifier.to_options()?)?;
        }

        Commands::Version => {
            print_version();
        }
    }

    Ok(0)
}

/// Classifier decisions for the text Stage 3 would see, or `None` when the
/// classifier is turned off.
fn explain(raw: &str, options: &SanitizeOptions) -> Option<Vec<LineReport>> {
    if !options.classify_lines {
        return None;
    }
    let staged = cleanup::prepare_lines(raw, options);
    Some(cleanup::explain_lines(&staged, options))
}

/// Output file names for `inputs`; fails if two inputs share a name.
fn output_names(inputs: &[PathBuf]) -> Result<Vec<&OsStr>, Box<dyn std::error::Error>> {
    let mut seen: HashMap<&OsStr, &Path> = HashMap::new();
    let mut names = Vec::with_capacity(inputs.len());

    for path in inputs {
        let name = path
            .file_name()
            .ok_or_else(|| format!("not a file: {}", path.display()))?;
        if let Some(first) = seen.insert(name, path) {
            return Err(format!(
                "{} and {} would both be written to {}",
                first.display(),
                path.display(),
                Path::new(name).display()
            )
            .into());
        }
        names.push(name);
    }

    Ok(names)
}

/// Sanitize every input in parallel and write results into `output_dir`.
fn run_batch(
    inputs: &[PathBuf],
    output_dir: &Path,
    options: &SanitizeOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let names = output_names(inputs)?;

    let pb = create_spinner("Reading inputs...");

    let texts = inputs
        .iter()
        .map(|path| read_input(Some(path.as_path())))
        .collect::<Result<Vec<_>, _>>()?;

    pb.set_message("Sanitizing...");
    let reports = process_batch(&texts, options, &ValidatorOptions::default());

    fs::create_dir_all(output_dir)?;

    pb.set_message("Writing outputs...");
    let mut invalid = Vec::new();
    for ((path, name), report) in inputs.iter().zip(&names).zip(&reports) {
        fs::write(output_dir.join(name), &report.cleaned)?;

        debug!(file = %path.display(), language = %report.language, "wrote sanitized file");
        if !report.verdict.is_valid {
            invalid.push((path, report.verdict.reason.clone()));
        }
    }

    pb.finish_and_clear();

    println!("{}", "Batch Complete".green().bold());
    println!("{}", "─".repeat(40));
    println!("{}: {}", "Output".bold(), output_dir.display());
    println!("{}: {}", "Files".bold(), reports.len());
    println!("{}: {}", "Valid".bold(), reports.len() - invalid.len());

    for (path, reason) in &invalid {
        println!("  {} {}: {}", "!".yellow().bold(), path.display(), reason);
    }

    Ok(())
}

fn print_version() {
    println!("{} {}", "codeclean".green().bold(), env!("CARGO_PKG_VERSION"));
    println!("Deterministic cleanup for model-generated source code");
    println!();
    println!("Languages: Python, JavaScript, Java");
    println!("Repository: https://github.com/iyulab/codeclean");
}

fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner()
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
        .template("{spinner:.blue} {msg}")
    {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

/// Read a file, or stdin when no path is given.
///
/// Input that is not valid UTF-8 reads as empty text.
fn read_input(path: Option<&Path>) -> io::Result<String> {
    let data = match path {
        Some(p) => fs::read(p)?,
        None => {
            let mut buf = Vec::new();
            io::stdin().lock().read_to_end(&mut buf)?;
            buf
        }
    };
    Ok(codeclean::coerce_text(&data).to_string())
}

fn write_output(path: Option<&Path>, content: &str) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            writeln!(handle, "{}", content)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_classifier_flags() {
        let cli = Cli::parse_from(["codeclean", "sanitize", "--minimal", "--prose-ratio", "0.5"]);
        let Commands::Sanitize { classifier, .. } = cli.command else {
            panic!("expected sanitize");
        };

        let options = classifier.to_options().unwrap();
        assert!(!options.classify_lines);
        assert_eq!(options.prose_cjk_ratio, 0.5);
    }

    #[test]
    fn test_invalid_prose_ratio() {
        let args = ClassifierArgs {
            prose_ratio: Some(1.5),
            ..Default::default()
        };
        assert!(args.to_options().is_err());
    }

    #[test]
    fn test_markers_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("markers.json");
        fs::write(
            &path,
            r#"{"markers":[{"pattern":"TODO","kind":"prefix","reason":"todo note"}]}"#,
        )
        .unwrap();

        let args = ClassifierArgs {
            markers: Some(path),
            ..Default::default()
        };
        let options = args.to_options().unwrap();
        assert_eq!(cleanup::sanitize("x = 1\nTODO fix", &options), "x = 1");
    }

    #[test]
    fn test_read_input_invalid_utf8() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.txt");
        fs::write(&path, [0x66, 0xFF, 0x6F]).unwrap();
        assert_eq!(read_input(Some(path.as_path())).unwrap(), "");
    }

    #[test]
    fn test_batch_writes_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.py");
        let b = dir.path().join("b.txt");
        fs::write(&a, "```python\nprint(1)\n```").unwrap();
        fs::write(&b, "这是一段说明").unwrap();

        let out = dir.path().join("out");
        run_batch(&[a, b], &out, &SanitizeOptions::default()).unwrap();

        assert_eq!(fs::read_to_string(out.join("a.py")).unwrap(), "print(1)");
        assert_eq!(fs::read_to_string(out.join("b.txt")).unwrap(), "");
    }

    #[test]
    fn test_batch_rejects_duplicate_names() {
        let dir = tempfile::tempdir().unwrap();
        for sub in ["a", "b"] {
            fs::create_dir(dir.path().join(sub)).unwrap();
            fs::write(dir.path().join(sub).join("x.py"), format!("print('{}')", sub)).unwrap();
        }

        let out = dir.path().join("out");
        let inputs = [dir.path().join("a/x.py"), dir.path().join("b/x.py")];
        let err = run_batch(&inputs, &out, &SanitizeOptions::default()).unwrap_err();

        assert!(err.to_string().contains("x.py"));
        assert!(!out.exists());
    }

    #[test]
    fn test_explain_follows_stage_toggles() {
        let raw = "```python\nx = 1\n```\n这是解释";

        let reports = explain(raw, &SanitizeOptions::default()).unwrap();
        assert_eq!(reports[0].text, "x = 1");
        assert!(!reports[1].decision.is_retained());

        assert!(explain(raw, &SanitizeOptions::minimal()).is_none());

        let mut unfenced = SanitizeOptions::default();
        unfenced.strip_fences = false;
        let reports = explain(raw, &unfenced).unwrap();
        assert_eq!(reports[0].text, "```python");
        assert_eq!(reports.len(), 4);
    }
}
