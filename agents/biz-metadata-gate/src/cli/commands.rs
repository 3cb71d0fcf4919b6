//! CLI command definitions for the metadata gate
//!
//! `check` is the CI entry point; `resolve` and `rules` help authors debug a
//! dictionary without reading the full report.

use clap::{Parser, Subcommand};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;

use super::output::{render_report, render_rules, OutputFormat, ResolveOutput, RuleInfo};
use super::ExitCode;
use crate::config::GateConfig;
use crate::engine::GateEngine;
use crate::error::{GateError, Result};
use crate::loader;
use crate::report::GateReport;
use crate::telemetry::GateMetricsRegistry;

/// biz_metadata import/publish gate
///
/// Lints biz_metadata dictionaries (CSV or Markdown tables) before they are
/// imported or published, including `ref:` type reference resolution.
#[derive(Parser, Debug)]
#[command(name = "biz-metadata-lint")]
#[command(about = "biz_metadata linter (import/publish gate) with TypeRef support", long_about = None)]
#[command(version)]
pub struct GateCli {
    /// Log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress report output on stdout and all logs except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: GateCommands,
}

/// Available gate commands
#[derive(Subcommand, Debug)]
pub enum GateCommands {
    /// Gate one or more dictionary files or directories
    Check {
        /// Input files or directories (.csv/.md/.markdown, directories scanned recursively)
        #[arg(short, long, num_args = 1.., required = true)]
        input: Vec<PathBuf>,

        /// Gate mode: import or publish
        #[arg(short, long)]
        mode: Option<String>,

        /// Maximum number of ref: hops
        #[arg(long)]
        max_ref_depth: Option<usize>,

        /// TOML config file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Write the JSON report to a file
        #[arg(short = 'o', long = "report")]
        report: Option<PathBuf>,

        /// Output format on stdout
        #[arg(long, value_enum, default_value = "json")]
        format: OutputFormat,

        /// Treat WARN violations as failures
        #[arg(long)]
        fail_on_warn: bool,

        /// Write Prometheus text metrics to a file
        #[arg(long)]
        metrics_file: Option<PathBuf>,
    },

    /// Resolve a value_type expression against the loaded dictionary
    Resolve {
        /// Input files or directories
        #[arg(short, long, num_args = 1.., required = true)]
        input: Vec<PathBuf>,

        /// Tenant scope for the lookup
        #[arg(short, long)]
        tenant: String,

        /// Expression to resolve, e.g. ref:company.base.name
        #[arg(long)]
        value_type: String,

        /// Maximum number of ref: hops
        #[arg(long)]
        max_ref_depth: Option<usize>,

        /// TOML config file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// List registered rules in evaluation order
    Rules {
        /// Gate mode used to mark applicable rules
        #[arg(short, long)]
        mode: Option<String>,

        /// Output format
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
    },
}

/// Layer config sources: defaults < file < environment < flags
pub fn resolve_config<F>(
    config_path: Option<&Path>,
    mode: Option<&str>,
    max_ref_depth: Option<usize>,
    fail_on_warn: bool,
    env_lookup: F,
) -> Result<GateConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let base = match config_path {
        Some(path) => GateConfig::load(path)?,
        None => GateConfig::default(),
    };
    let mut config = base.with_env_overrides(env_lookup)?;

    if let Some(mode) = mode {
        config.mode = mode.parse()?;
    }
    if let Some(depth) = max_ref_depth {
        config.max_ref_depth = depth;
    }
    if fail_on_warn {
        config.fail_on_warn = true;
    }

    config.validate()?;
    Ok(config)
}

fn process_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

fn display_paths(paths: &[PathBuf]) -> Vec<String> {
    paths.iter().map(|p| p.display().to_string()).collect()
}

/// Options for the check command
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    pub input: Vec<PathBuf>,
    pub mode: Option<String>,
    pub max_ref_depth: Option<usize>,
    pub config: Option<PathBuf>,
    pub report: Option<PathBuf>,
    pub format: OutputFormat,
    pub fail_on_warn: bool,
    pub metrics_file: Option<PathBuf>,
    pub quiet: bool,
}

/// Execute the check command
pub fn execute_check(options: CheckOptions) -> Result<ExitCode> {
    let config = resolve_config(
        options.config.as_deref(),
        options.mode.as_deref(),
        options.max_ref_depth,
        options.fail_on_warn,
        process_env,
    )?;
    let engine = GateEngine::new(&config)?;

    let files = loader::expand_inputs(&options.input)?;
    let rows = loader::load_rows(&files)?;

    let start = Instant::now();
    let report = engine
        .evaluate(&rows)
        .with_inputs(display_paths(&options.input), display_paths(&files));
    let elapsed = start.elapsed();

    if let Some(path) = &options.report {
        write_report_file(&report, path)?;
        info!(path = %path.display(), "report written");
    }

    if !options.quiet {
        let stdout = io::stdout();
        render_report(&report, options.format, &mut stdout.lock())?;
    }

    if let Some(path) = &options.metrics_file {
        let registry = GateMetricsRegistry::new()?;
        registry.gate().record_report(&report, config.fail_on_warn);
        registry
            .gate()
            .observe_duration(config.mode.as_str(), elapsed.as_secs_f64());
        fs::write(path, registry.encode_text()?).map_err(|e| {
            GateError::file_error(format!("Failed to write metrics '{}': {}", path.display(), e))
        })?;
    }

    Ok(ExitCode::from_report(&report, config.fail_on_warn))
}

fn write_report_file(report: &GateReport, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(report)?;
    fs::write(path, json).map_err(|e| {
        GateError::file_error(format!("Failed to write report '{}': {}", path.display(), e))
    })
}

/// Execute the resolve command
pub fn execute_resolve(
    input: Vec<PathBuf>,
    tenant: String,
    value_type: String,
    max_ref_depth: Option<usize>,
    config: Option<PathBuf>,
    format: OutputFormat,
) -> Result<ExitCode> {
    let config = resolve_config(config.as_deref(), None, max_ref_depth, false, process_env)?;
    let engine = GateEngine::new(&config)?;

    let files = loader::expand_inputs(&input)?;
    let rows = loader::load_rows(&files)?;

    let result = engine.resolve(&rows, &tenant, &value_type);
    let output = ResolveOutput::new(&tenant, &value_type, &result);

    let stdout = io::stdout();
    output.render(format, &mut stdout.lock())?;

    Ok(if output.is_ok() {
        ExitCode::Success
    } else {
        ExitCode::GateFailed
    })
}

/// Execute the rules command
pub fn execute_rules(mode: Option<String>, format: OutputFormat) -> Result<ExitCode> {
    let config = resolve_config(None, mode.as_deref(), None, false, process_env)?;
    let engine = GateEngine::new(&config)?;

    let rules: Vec<RuleInfo> = engine
        .rules()
        .iter()
        .map(|rule| RuleInfo::from_rule(rule.as_ref(), rule.is_applicable(engine.mode())))
        .collect();

    let stdout = io::stdout();
    render_rules(&rules, format, &mut stdout.lock())?;
    Ok(ExitCode::Success)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GateMode;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_cli_parses_check() {
        let cli = GateCli::parse_from([
            "biz-metadata-lint",
            "-v",
            "check",
            "--input",
            "a.csv",
            "dict/",
            "--mode",
            "publish",
            "-o",
            "report.json",
            "--fail-on-warn",
        ]);
        assert_eq!(cli.verbose, 1);
        match cli.command {
            GateCommands::Check {
                input,
                mode,
                report,
                fail_on_warn,
                format,
                ..
            } => {
                assert_eq!(input.len(), 2);
                assert_eq!(mode.as_deref(), Some("publish"));
                assert_eq!(report, Some(PathBuf::from("report.json")));
                assert!(fail_on_warn);
                assert_eq!(format, OutputFormat::Json);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_config_precedence() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("gate.toml");
        fs::write(&path, "mode = \"publish\"\nmax_ref_depth = 3\n").unwrap();

        let from_file = resolve_config(Some(&path), None, None, false, env(&[])).unwrap();
        assert_eq!(from_file.mode, GateMode::Publish);
        assert_eq!(from_file.max_ref_depth, 3);

        let from_env = resolve_config(
            Some(&path),
            None,
            None,
            false,
            env(&[("BIZ_GATE_MAX_REF_DEPTH", "7")]),
        )
        .unwrap();
        assert_eq!(from_env.max_ref_depth, 7);

        let from_flags = resolve_config(
            Some(&path),
            Some("import"),
            Some(9),
            true,
            env(&[("BIZ_GATE_MAX_REF_DEPTH", "7")]),
        )
        .unwrap();
        assert_eq!(from_flags.mode, GateMode::Import);
        assert_eq!(from_flags.max_ref_depth, 9);
        assert!(from_flags.fail_on_warn);
    }

    #[test]
    fn test_invalid_flags_are_config_errors() {
        let mode = resolve_config(None, Some("release"), None, false, env(&[])).unwrap_err();
        assert!(matches!(mode, GateError::ConfigError(_)));

        let depth = resolve_config(None, None, Some(0), false, env(&[])).unwrap_err();
        assert!(matches!(depth, GateError::ConfigError(_)));
    }

    #[test]
    fn test_execute_check_writes_report_and_metrics() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("dict.csv");
        fs::write(
            &input,
            "tenant_id,version,code,name,object_type,data_class,value_type,status,source\n\
             t1,1,f.x,X,feature,identifier,decimal,active,manual\n",
        )
        .unwrap();
        let report_path = dir.path().join("out/report.json");
        let metrics_path = dir.path().join("metrics.prom");

        let code = execute_check(CheckOptions {
            input: vec![input],
            mode: Some("import".to_string()),
            report: Some(report_path.clone()),
            metrics_file: Some(metrics_path.clone()),
            quiet: true,
            ..Default::default()
        })
        .unwrap();
        assert_eq!(code, ExitCode::GateFailed);

        let report: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&report_path).unwrap()).unwrap();
        assert_eq!(report["error_count"], 2);
        assert_eq!(report["row_count"], 1);

        let metrics = fs::read_to_string(&metrics_path).unwrap();
        assert!(metrics.contains("biz_metadata_gate_runs_total"));
    }
}
