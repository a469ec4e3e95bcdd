//! Command-line front end for run-completion metrics.
//!
//! Provides the `wjp` binary: render the records a run event produces, send
//! them to a Wavefront proxy, or sanitize a single name. Uses the same
//! `RunReporter` as the HTTP server, so both entry points emit identical
//! records.

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand, ValueEnum};

use wjp_core::sanitize::{
    sanitize_category, sanitize_full_category, sanitize_step_category, sanitize_test_category,
};
use wjp_core::RunEvent;
use wjp_metrics::{JobProperty, MetricsConfig, RunReporter};
use wjp_sink::{MetricSink, ProxySink, WriterSink};

/// Wavefront metrics for build runs.
#[derive(Parser)]
#[command(name = "wjp", about = "Wavefront metrics for build runs")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the records a run event produces.
    Render {
        /// Path to the run event JSON.
        #[arg(short, long)]
        event: PathBuf,

        /// Path to a metrics config JSON (default: built-in defaults).
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Path to the job's property JSON.
        #[arg(long)]
        property: Option<PathBuf>,

        /// Print proxy wire lines instead of the readable form.
        #[arg(long)]
        wire: bool,
    },

    /// Send the records of a run event to a proxy.
    Send {
        #[arg(short, long)]
        event: PathBuf,

        #[arg(short, long)]
        config: Option<PathBuf>,

        #[arg(long)]
        property: Option<PathBuf>,

        /// Proxy host (overrides the config).
        #[arg(long)]
        host: Option<String>,

        /// Proxy port (overrides the config).
        #[arg(long)]
        port: Option<u32>,
    },

    /// Print a sanitized metric name segment.
    Sanitize {
        #[arg(value_enum)]
        kind: NameKind,

        name: String,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum NameKind {
    /// Job, stage and branch names (dots replaced).
    Category,
    /// Dotted names such as prefixes.
    Full,
    /// Test names with parameterized suffixes.
    Test,
    /// Timed-step names.
    Step,
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let exit_code = match cli.command {
        Commands::Render {
            event,
            config,
            property,
            wire,
        } => run_render(&event, config.as_deref(), property.as_deref(), wire),
        Commands::Send {
            event,
            config,
            property,
            host,
            port,
        } => run_send(&event, config.as_deref(), property.as_deref(), host, port),
        Commands::Sanitize { kind, name } => {
            println!("{}", sanitize(kind, &name));
            0
        }
    };
    process::exit(exit_code);
}

/// Failure of a subcommand, carrying the process exit code.
struct Failure {
    code: i32,
    message: String,
}

impl Failure {
    fn usage(message: impl Into<String>) -> Self {
        Failure {
            code: 1,
            message: message.into(),
        }
    }

    fn io(message: impl Into<String>) -> Self {
        Failure {
            code: 3,
            message: message.into(),
        }
    }
}

/// Inputs shared by `render` and `send`.
struct Inputs {
    config: MetricsConfig,
    event: RunEvent,
    property: Option<JobProperty>,
}

fn load_inputs(
    event: &Path,
    config: Option<&Path>,
    property: Option<&Path>,
) -> Result<Inputs, Failure> {
    let config = match config {
        Some(path) => MetricsConfig::load(path)
            .map_err(|e| Failure::usage(format!("invalid config '{}': {}", path.display(), e)))?,
        None => MetricsConfig::default(),
    };
    let event: RunEvent = read_json(event)?;
    let property = property.map(read_json::<JobProperty>).transpose()?;
    Ok(Inputs {
        config,
        event,
        property,
    })
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, Failure> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| Failure::io(format!("failed to read '{}': {}", path.display(), e)))?;
    serde_json::from_str(&text)
        .map_err(|e| Failure::usage(format!("invalid JSON in '{}': {}", path.display(), e)))
}

/// Execute the render subcommand.
///
/// Returns exit code: 0 = success, 1 = bad input, 3 = I/O error.
fn run_render(event: &Path, config: Option<&Path>, property: Option<&Path>, wire: bool) -> i32 {
    let inputs = match load_inputs(event, config, property) {
        Ok(inputs) => inputs,
        Err(failure) => return report_failure(failure),
    };
    if let Err(failure) = check_source(&inputs.config, wire) {
        return report_failure(failure);
    }
    let reporter = RunReporter::new(inputs.config);

    if wire {
        let mut sink = WriterSink::new(std::io::stdout().lock());
        let report = reporter.report(&inputs.event, inputs.property.as_ref(), &mut sink);
        if let Err(e) = sink.flush() {
            return report_failure(Failure::io(format!("failed to write records: {}", e)));
        }
        for pass in &report.passes {
            if let Some(err) = &pass.error {
                eprintln!("Warning: {:?} pass stopped early: {}", pass.pass, err);
            }
        }
        return 0;
    }

    let records = reporter.records(&inputs.event, inputs.property.as_ref());
    for pass in &records.passes {
        for record in &pass.records {
            println!("{}", record);
        }
        if let Some(err) = &pass.error {
            eprintln!("Warning: {:?} pass stopped early: {}", pass.pass, err);
        }
    }
    0
}

/// `--wire` needs a non-empty source (`source` or `proxy_hostname`); the
/// readable form only warns.
fn check_source(config: &MetricsConfig, wire: bool) -> Result<(), Failure> {
    if !config.source_name().is_empty() {
        return Ok(());
    }
    if wire {
        return Err(Failure::usage(
            "wire output needs a source: set `source` or `proxy_hostname` in --config",
        ));
    }
    tracing::warn!("no source or proxy_hostname configured; records render with an empty source");
    Ok(())
}

/// Execute the send subcommand.
///
/// Returns exit code: 0 = every record sent, 1 = bad input or no proxy
/// configured, 3 = I/O error while sending.
fn run_send(
    event: &Path,
    config: Option<&Path>,
    property: Option<&Path>,
    host: Option<String>,
    port: Option<u32>,
) -> i32 {
    let mut inputs = match load_inputs(event, config, property) {
        Ok(inputs) => inputs,
        Err(failure) => return report_failure(failure),
    };
    if let Some(host) = host {
        inputs.config.proxy_hostname = host;
    }
    if let Some(port) = port {
        inputs.config.proxy_port = port;
    }
    let config = match inputs.config.normalized() {
        Ok(config) => config,
        Err(e) => return report_failure(Failure::usage(e.to_string())),
    };
    let Some(endpoint) = config.endpoint() else {
        return report_failure(Failure::usage("no proxy host configured"));
    };

    tracing::debug!(%endpoint, job = %inputs.event.run.job_full_name, "sending run metrics");
    let mut sink = ProxySink::new(endpoint.clone());
    let reporter = RunReporter::new(config);
    let report = reporter.report(&inputs.event, inputs.property.as_ref(), &mut sink);
    let close_result = sink.close();

    let totals = report.totals();
    println!(
        "Sent {} record(s) to {} ({} dropped, {} failed)",
        totals.sent, endpoint, totals.dropped, totals.failed
    );
    for pass in &report.passes {
        if let Some(err) = &pass.error {
            eprintln!("Warning: {:?} pass stopped early: {}", pass.pass, err);
        }
    }

    if let Some(e) = &report.flush_error {
        return report_failure(Failure::io(format!("failed to flush to {}: {}", endpoint, e)));
    }
    if let Err(e) = close_result {
        return report_failure(Failure::io(format!("failed to flush to {}: {}", endpoint, e)));
    }
    if totals.failed > 0 {
        return 3;
    }
    0
}

fn report_failure(failure: Failure) -> i32 {
    eprintln!("Error: {}", failure.message);
    failure.code
}

fn sanitize(kind: NameKind, name: &str) -> String {
    match kind {
        NameKind::Category => sanitize_category(name),
        NameKind::Full => sanitize_full_category(name),
        NameKind::Test => sanitize_test_category(name),
        NameKind::Step => sanitize_step_category(name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn cli_parses_subcommands() {
        let cli = Cli::try_parse_from(["wjp", "render", "--event", "run.json", "--wire"]).unwrap();
        assert!(matches!(cli.command, Commands::Render { wire: true, .. }));

        let cli = Cli::try_parse_from(["wjp", "sanitize", "test", "a.B[x]"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Sanitize {
                kind: NameKind::Test,
                ..
            }
        ));

        assert!(Cli::try_parse_from(["wjp", "sanitize", "bogus", "x"]).is_err());
    }

    #[test]
    fn sanitize_kinds_differ_on_dots() {
        assert_eq!(sanitize(NameKind::Category, "My.Job"), "my_job");
        assert_eq!(sanitize(NameKind::Full, "My.Job"), "my.job");
    }

    #[test]
    fn missing_event_file_is_an_io_error() {
        assert_eq!(
            run_render(Path::new("/nonexistent/run.json"), None, None, false),
            3
        );
    }

    #[test]
    fn bad_event_json_is_a_usage_error() {
        let event = write_temp("{\"job_full_name\": 1}");
        assert_eq!(run_render(event.path(), None, None, true), 1);
    }

    #[test]
    fn wire_render_requires_a_source() {
        let event = write_temp(
            r#"{"job_full_name": "j", "build_id": "1", "duration_ms": 5, "result": "SUCCESS"}"#,
        );
        assert_eq!(run_render(event.path(), None, None, true), 1);
        assert_eq!(run_render(event.path(), None, None, false), 0);

        let config = write_temp(r#"{"source": "ci-agent"}"#);
        assert_eq!(run_render(event.path(), Some(config.path()), None, true), 0);
    }

    #[test]
    fn send_without_proxy_is_a_usage_error() {
        let event = write_temp(
            r#"{"job_full_name": "j", "build_id": "1", "duration_ms": 5, "result": "SUCCESS"}"#,
        );
        assert_eq!(run_send(event.path(), None, None, None, None), 1);
        assert_eq!(
            run_send(event.path(), None, None, Some("localhost".into()), Some(70_000)),
            1
        );
    }
}
