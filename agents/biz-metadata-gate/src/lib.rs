//! biz_metadata Gate
//!
//! Lints biz_metadata dictionaries before they are imported or published.
//! Rows describe entities, events, relations, documents and features of a
//! tenant's business model; features carry a `value_type` that may point at
//! another feature through `ref:<code>`.
//!
//! ## Architecture
//!
//! 1. **Row model** (`row`): normalized records keyed by `(tenant_id, code)`.
//!
//! 2. **Type expressions** (`type_expr`): the `value_type` grammar.
//!
//! 3. **Resolver** (`resolver`): follows `ref:` chains within a tenant with
//!    cycle and depth detection.
//!
//! 4. **Engine** (`engine/`): an ordered battery of rules, run in import or
//!    publish mode, producing a [`GateReport`].
//!
//! 5. **Loader** (`loader`) and **CLI** (`cli/`): CSV/Markdown input, report
//!    rendering and exit codes.
//!
//! 6. **Telemetry** (`telemetry/`): Prometheus metrics for gate runs.
//!
//! ## CLI Usage
//!
//! ```bash
//! # Import gate over a dictionary directory
//! biz-metadata-lint check --input dict/ --mode import -o report.json
//!
//! # Publish gate, failing on warnings too
//! biz-metadata-lint check --input dict/ --mode publish --fail-on-warn
//!
//! # Debug a reference
//! biz-metadata-lint resolve --input dict/ --tenant t1 --value-type ref:company.base.name
//! ```
//!
//! ## Example
//!
//! ```rust
//! use biz_metadata_gate::{GateEngine, Row};
//!
//! let rows = vec![Row::from_pairs([
//!     ("tenant_id", "t1"),
//!     ("version", "1"),
//!     ("code", "f.x"),
//!     ("name", "X"),
//!     ("object_type", "feature"),
//!     ("data_class", "attribute"),
//!     ("value_type", "string"),
//!     ("status", "active"),
//!     ("source", "manual"),
//! ])];
//!
//! let engine = GateEngine::from_mode_str("import", 5).unwrap();
//! let report = engine.evaluate(&rows);
//! assert_eq!(report.violation_count, 0);
//! ```

pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod loader;
pub mod report;
pub mod resolver;
pub mod row;
pub mod telemetry;
pub mod type_expr;

pub use cli::{ExitCode, GateCli, GateCommands, OutputFormat};
pub use config::{GateConfig, GateMode};
pub use engine::rules::{Rule, RuleCategory, RuleId, Severity, Violation};
pub use engine::GateEngine;
pub use error::{GateError, Result};
pub use report::{GateReport, RuleSummary};
pub use resolver::{ResolveError, ResolveFailure, ResolvedType, RowIndex, TypeResolver};
pub use row::{RawRecord, Row};
pub use telemetry::{GateMetrics, GateMetricsRegistry, TelemetryError};
pub use type_expr::TypeExpr;

/// Crate version (from Cargo.toml)
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Tool identifier
pub const TOOL_ID: &str = "biz-metadata-gate";

/// Run the CLI application
///
/// This is the main entry point for the CLI binary.
///
/// # Example
///
/// ```rust,no_run
/// use clap::Parser;
/// use biz_metadata_gate::{GateCli, run_cli};
///
/// fn main() {
///     let cli = GateCli::parse();
///     let exit_code = run_cli(cli);
///     std::process::exit(exit_code.into());
/// }
/// ```
pub fn run_cli(cli: GateCli) -> ExitCode {
    match cli::run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            if !e.is_user_error() {
                tracing::error!(error = %e, "internal error");
            }
            ExitCode::RuntimeError
        }
    }
}
