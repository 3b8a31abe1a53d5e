// crates/lfs-conformance-cli/src/main.rs
// ============================================================================
// Module: LFS Conformance CLI Entry Point
// Description: Command-line runner for the Git LFS API conformance checks.
// Purpose: Resolve inputs, run every check in order, and map outcomes to exit codes.
// Dependencies: clap, lfs-conformance-checks, lfs-conformance-config, lfs-conformance-core
// ============================================================================

//! ## Overview
//! `lfs-conformance` resolves the API endpoint (direct URL or clone URL),
//! acquires identifiers from two files or synthesizes them, and runs the
//! built-in checks sequentially, printing one status line per check.
//! Exit codes: 0 when every check passes, 1 when any check fails, 2 for
//! configuration errors and setup failure.

// ============================================================================
// SECTION: Modules
// ============================================================================


// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::ArgAction;
use clap::Parser;
use clap::ValueEnum;
use lfs_conformance_checks::BatchClient;
use lfs_conformance_checks::builtin_registry;
use lfs_conformance_cli::i18n::Locale;
use lfs_conformance_cli::i18n::set_locale;
use lfs_conformance_cli::t;
use lfs_conformance_config::AuditConfig;
use lfs_conformance_config::AuditSinkKind;
use lfs_conformance_config::ConformanceConfig;
use lfs_conformance_core::ConsoleLabels;
use lfs_conformance_core::ConsoleReporter;
use lfs_conformance_core::FileRunAuditSink;
use lfs_conformance_core::NoopRunAuditSink;
use lfs_conformance_core::RunAuditSink;
use lfs_conformance_core::RunError;
use lfs_conformance_core::RunPlan;
use lfs_conformance_core::Runner;
use lfs_conformance_core::SelectionError;
use lfs_conformance_core::StderrRunAuditSink;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Environment variable for CLI locale selection.
const LANG_ENV: &str = "LFS_CONFORMANCE_LANG";
/// Exit code when at least one registered check failed.
const EXIT_CHECKS_FAILED: u8 = 1;
/// Exit code for configuration errors and setup failure.
const EXIT_FATAL: u8 = 2;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "lfs-conformance", disable_version_flag = true)]
struct Cli {
    /// Print version information and exit.
    #[arg(long = "version", action = ArgAction::SetTrue)]
    show_version: bool,
    /// Preferred output language (overrides `LFS_CONFORMANCE_LANG`).
    #[arg(long, value_enum, value_name = "LANG")]
    lang: Option<LangArg>,
    /// LFS API base URL.
    #[arg(short = 'u', long = "url", value_name = "APIURL")]
    url: Option<String>,
    /// Repository clone URL; the LFS API URL is derived from it.
    #[arg(short = 'c', long = "clone", value_name = "CLONEURL")]
    clone: Option<String>,
    /// Path to a TOML config file (overrides `LFS_CONFORMANCE_CONFIG`).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Identifiers per list when synthesizing test data.
    #[arg(long, value_name = "N")]
    count: Option<usize>,
    /// Append JSON-lines audit events to this file.
    #[arg(long = "audit-log", value_name = "PATH")]
    audit_log: Option<PathBuf>,
    /// Files listing object ids that exist and that are missing on the server.
    #[arg(value_name = "OID_FILE")]
    files: Vec<PathBuf>,
}

/// Supported CLI language selections.
#[derive(ValueEnum, Copy, Clone, Debug)]
enum LangArg {
    /// English.
    En,
    /// Catalan.
    Ca,
}

impl From<LangArg> for Locale {
    fn from(value: LangArg) -> Self {
        match value {
            LangArg::En => Self::En,
            LangArg::Ca => Self::Ca,
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for localized fatal messages.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`] from a localized message.
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Resolves inputs and runs the conformance checks.
fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    let env_lang = std::env::var(LANG_ENV).ok();
    let locale = resolve_locale(cli.lang, env_lang.as_deref())?;
    set_locale(locale);
    if locale != Locale::En {
        write_stderr_line(&t!("i18n.disclaimer.machine_translated"))
            .map_err(|err| CliError::new(output_error("stderr", &err)))?;
    }

    if cli.show_version {
        let version = env!("CARGO_PKG_VERSION");
        write_stdout_line(&t!("main.version", version = version))
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        return Ok(ExitCode::SUCCESS);
    }

    let config = ConformanceConfig::load(cli.config.as_deref())
        .map_err(|err| CliError::new(t!("config.load_failed", error = err)))?;
    let config = apply_overrides(&cli, config)?;
    let plan = RunPlan::select(
        config.endpoint.url.as_deref(),
        config.endpoint.clone.as_deref(),
        &cli.files,
        config.identifiers.count,
    )
    .map_err(|err| CliError::new(selection_error_message(&err)))?;

    let audit = build_audit_sink(cli.audit_log.as_deref(), &config.audit)?;
    let client = BatchClient::new(config.http.timeout())
        .map_err(|err| CliError::new(t!("http.client_failed", error = err)))?;
    let registry = builtin_registry(&client);
    let runner = Runner::new(&registry, audit.as_ref());
    let mut reporter = ConsoleReporter::new(std::io::stdout())
        .with_width(config.report.name_width)
        .with_labels(console_labels());

    let summary =
        runner.run(&plan, &mut reporter).map_err(|err| CliError::new(run_error_message(&err)))?;
    if summary.all_passed() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::from(EXIT_CHECKS_FAILED))
    }
}

// ============================================================================
// SECTION: Input Resolution
// ============================================================================

/// Resolves the CLI locale from flags or environment.
fn resolve_locale(lang: Option<LangArg>, env_lang: Option<&str>) -> CliResult<Locale> {
    if let Some(lang) = lang {
        return Ok(lang.into());
    }
    if let Some(value) = env_lang {
        return Locale::parse(value).ok_or_else(|| {
            CliError::new(t!("i18n.lang.invalid_env", env = LANG_ENV, value = value))
        });
    }
    Ok(Locale::En)
}

/// Applies command-line flags over file configuration and revalidates.
///
/// Each endpoint flag overrides only its own field, so a file `url` combined
/// with a `--clone` flag still fails endpoint selection. An empty flag value
/// clears the field.
fn apply_overrides(cli: &Cli, mut config: ConformanceConfig) -> CliResult<ConformanceConfig> {
    if let Some(url) = &cli.url {
        config.endpoint.url = Some(url.clone()).filter(|url| !url.is_empty());
    }
    if let Some(clone) = &cli.clone {
        config.endpoint.clone = Some(clone.clone()).filter(|clone| !clone.is_empty());
    }
    if let Some(count) = cli.count {
        config.identifiers.count = count;
    }
    config
        .validate()
        .map_err(|err| CliError::new(t!("config.override_invalid", error = err)))?;
    Ok(config)
}

/// Builds the audit sink from the flag or config selection.
fn build_audit_sink(
    flag_path: Option<&Path>,
    config: &AuditConfig,
) -> CliResult<Box<dyn RunAuditSink>> {
    if let Some(path) = flag_path {
        return open_file_sink(path);
    }
    match (config.sink, config.path.as_deref()) {
        (AuditSinkKind::File, Some(path)) => open_file_sink(path),
        (AuditSinkKind::Stderr, _) => Ok(Box::new(StderrRunAuditSink)),
        _ => Ok(Box::new(NoopRunAuditSink)),
    }
}

/// Opens an append-only JSON-lines audit file.
fn open_file_sink(path: &Path) -> CliResult<Box<dyn RunAuditSink>> {
    let sink = FileRunAuditSink::new(path).map_err(|err| {
        CliError::new(t!("audit.open_failed", path = path.display(), error = err))
    })?;
    Ok(Box::new(sink))
}

/// Returns reporter labels in the active locale.
fn console_labels() -> ConsoleLabels {
    ConsoleLabels {
        files_banner: t!("report.banner.files"),
        synthetic_banner: t!("report.banner.synthetic"),
        running: t!("report.running"),
        ok: t!("report.ok"),
        failed: t!("report.failed"),
    }
}

// ============================================================================
// SECTION: Error Messages
// ============================================================================

/// Localizes a selection error.
fn selection_error_message(err: &SelectionError) -> String {
    match err {
        SelectionError::EndpointSelection => t!("select.endpoint"),
        SelectionError::FileArguments {
            count,
        } => t!("select.files", count = count),
    }
}

/// Localizes a fatal run error.
fn run_error_message(err: &RunError) -> String {
    match err {
        RunError::Selection(err) => selection_error_message(err),
        RunError::Endpoint(err) => t!("endpoint.invalid", error = err),
        RunError::Identifiers(err) => t!("identifiers.read_failed", error = err),
        RunError::SetupFailed(failure) => t!("run.setup_failed", error = failure),
        RunError::Output(err) => t!("run.output_failed", error = err),
    }
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats a localized output error message.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    let stream_label = match stream {
        "stdout" => t!("output.stream.stdout"),
        "stderr" => t!("output.stream.stderr"),
        _ => t!("output.stream.unknown"),
    };
    t!("output.write_failed", stream = stream_label, error = error)
}

/// Emits an error message to stderr and returns the fatal exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::from(EXIT_FATAL)
}
