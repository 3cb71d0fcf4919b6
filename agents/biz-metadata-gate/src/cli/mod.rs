//! CLI module for the metadata gate
//!
//! Loads dictionaries, runs the gate and renders the report. Exit codes are
//! the CI contract.

pub mod commands;
pub mod output;

pub use commands::{CheckOptions, GateCli, GateCommands};
pub use output::OutputFormat;

use crate::error::GateError;
use crate::report::GateReport;

/// Exit codes for CLI operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// The gate passed
    Success = 0,
    /// Runtime or configuration error (bad input path, unsupported mode, ...)
    RuntimeError = 1,
    /// ERROR violations present, or WARNs with fail-on-warn
    GateFailed = 2,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}

impl ExitCode {
    /// Determine exit code from a gate report
    pub fn from_report(report: &GateReport, fail_on_warn: bool) -> Self {
        if report.passed(fail_on_warn) {
            ExitCode::Success
        } else {
            ExitCode::GateFailed
        }
    }
}

/// Run the CLI with the given arguments and return the exit code
pub fn run(cli: GateCli) -> Result<ExitCode, GateError> {
    let quiet = cli.quiet;
    match cli.command {
        GateCommands::Check {
            input,
            mode,
            max_ref_depth,
            config,
            report,
            format,
            fail_on_warn,
            metrics_file,
        } => commands::execute_check(CheckOptions {
            input,
            mode,
            max_ref_depth,
            config,
            report,
            format,
            fail_on_warn,
            metrics_file,
            quiet,
        }),
        GateCommands::Resolve {
            input,
            tenant,
            value_type,
            max_ref_depth,
            config,
            format,
        } => commands::execute_resolve(input, tenant, value_type, max_ref_depth, config, format),
        GateCommands::Rules { mode, format } => commands::execute_rules(mode, format),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GateMode;
    use crate::engine::rules::{RuleId, Violation};
    use crate::row::Row;

    #[test]
    fn test_exit_code_conversion() {
        assert_eq!(i32::from(ExitCode::Success), 0);
        assert_eq!(i32::from(ExitCode::RuntimeError), 1);
        assert_eq!(i32::from(ExitCode::GateFailed), 2);
    }

    #[test]
    fn test_exit_code_from_report() {
        let rows = vec![Row::default()];
        let clean = GateReport::new(GateMode::Import, &rows, Vec::new(), Vec::new());
        assert_eq!(ExitCode::from_report(&clean, true), ExitCode::Success);

        let warned = GateReport::new(
            GateMode::Import,
            &rows,
            Vec::new(),
            vec![Violation::warn(RuleId::UnitNotAllowed, "unit", &rows[0])],
        );
        assert_eq!(ExitCode::from_report(&warned, false), ExitCode::Success);
        assert_eq!(ExitCode::from_report(&warned, true), ExitCode::GateFailed);
    }
}
