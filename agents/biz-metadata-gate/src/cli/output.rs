//! Output formatting for the gate CLI
//!
//! JSON is the machine contract consumed by CI; YAML and the colored table
//! are for people.

use clap::ValueEnum;
use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::engine::rules::{Rule, RuleCategory, RuleId, Severity, Violation};
use crate::error::Result;
use crate::report::GateReport;
use crate::resolver::{ResolveError, ResolvedType};

/// Output format options for CLI results
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug, Default)]
pub enum OutputFormat {
    /// Pretty-printed JSON report
    #[default]
    Json,
    /// YAML report
    Yaml,
    /// Human-readable table with colors
    Table,
}

/// Write any serializable value as JSON or YAML
///
/// `Table` falls back to JSON; callers with a table view handle it first.
pub fn write_structured<T: Serialize, W: Write>(value: &T, format: OutputFormat, out: &mut W) -> Result<()> {
    match format {
        OutputFormat::Yaml => {
            let yaml = serde_yaml::to_string(value)?;
            out.write_all(yaml.as_bytes())?;
        }
        OutputFormat::Json | OutputFormat::Table => {
            serde_json::to_writer_pretty(&mut *out, value)?;
            writeln!(out)?;
        }
    }
    Ok(())
}

/// Render a gate report
pub fn render_report<W: Write>(report: &GateReport, format: OutputFormat, out: &mut W) -> Result<()> {
    match format {
        OutputFormat::Table => render_report_table(report, out),
        _ => write_structured(report, format, out),
    }
}

fn render_report_table<W: Write>(report: &GateReport, out: &mut W) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", format!("biz_metadata {} gate", report.mode).cyan().bold())?;
    writeln!(out, "{}", "=".repeat(60))?;

    let summary = format!(
        "{} rows, {} errors, {} warnings",
        report.row_count, report.error_count, report.warn_count
    );
    if report.error_count == 0 {
        writeln!(out, "{} {}", "+".green(), summary)?;
    } else {
        writeln!(out, "{} {}", "x".red(), summary)?;
    }
    writeln!(out, "  {} {}", "Digest:".dimmed(), report.batch_digest.dimmed())?;

    if !report.violations.is_empty() {
        writeln!(out)?;
        writeln!(out, "{}", "Violations:".cyan().bold())?;
        writeln!(out, "{}", "-".repeat(60))?;
        for violation in &report.violations {
            render_violation_row(violation, out)?;
        }
    }

    writeln!(out)?;
    writeln!(out, "{}", "Rules:".cyan().bold())?;
    for rule in &report.rules {
        let status = if !rule.evaluated {
            "skipped".dimmed()
        } else if rule.violation_count == 0 {
            "passed".green()
        } else {
            format!("{} violation(s)", rule.violation_count).red()
        };
        writeln!(out, "  {:<20} {:<14} {}", rule.id, rule.category.to_string(), status)?;
    }

    out.flush()?;
    Ok(())
}

fn render_violation_row<W: Write>(violation: &Violation, out: &mut W) -> Result<()> {
    let label = match violation.severity {
        Severity::Error => violation.severity.as_str().red().bold(),
        Severity::Warn => violation.severity.as_str().yellow().bold(),
    };

    writeln!(
        out,
        "{} [{}] {}",
        label,
        violation.rule_id.as_str().dimmed(),
        violation.message
    )?;
    writeln!(
        out,
        "  {} {}/{}  {} {}={}",
        "At:".dimmed(),
        violation.tenant_id.cyan(),
        violation.code.cyan(),
        "Field:".dimmed(),
        violation.field,
        violation.value
    )?;
    Ok(())
}

/// Outcome of resolving one `value_type`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolveOutput {
    pub tenant_id: String,
    pub value_type: String,
    pub resolved: Option<String>,
    pub canonical_code: Option<String>,
    #[serde(default)]
    pub chain: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule_id: Option<RuleId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ResolveOutput {
    pub fn new(
        tenant_id: &str,
        value_type: &str,
        result: &std::result::Result<Option<ResolvedType>, ResolveError>,
    ) -> Self {
        let mut output = Self {
            tenant_id: tenant_id.to_string(),
            value_type: value_type.to_string(),
            resolved: None,
            canonical_code: None,
            chain: Vec::new(),
            rule_id: None,
            error: None,
        };

        match result {
            Ok(Some(resolved)) => {
                output.resolved = Some(resolved.resolved.clone());
                output.canonical_code = resolved.canonical_code.clone();
                output.chain = resolved.chain.clone();
            }
            Ok(None) => {}
            Err(err) => {
                output.rule_id = Some(err.rule_id());
                output.error = Some(err.to_string());
            }
        }
        output
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    pub fn render<W: Write>(&self, format: OutputFormat, out: &mut W) -> Result<()> {
        if format != OutputFormat::Table {
            return write_structured(self, format, out);
        }

        writeln!(out, "{} {}", "value_type:".dimmed(), self.value_type)?;
        match (&self.error, &self.resolved) {
            (Some(error), _) => {
                let rule_id = self.rule_id.map(|r| r.as_str()).unwrap_or_default();
                writeln!(out, "{} [{}] {}", "x".red(), rule_id.dimmed(), error)?;
            }
            (None, Some(resolved)) => {
                writeln!(out, "{} {}", "+".green(), resolved.green().bold())?;
                if let Some(code) = &self.canonical_code {
                    writeln!(out, "  {} {}", "from:".dimmed(), code.cyan())?;
                }
                if !self.chain.is_empty() {
                    writeln!(out, "  {} {}", "chain:".dimmed(), self.chain.join(" -> "))?;
                }
            }
            (None, None) => writeln!(out, "{} nothing to resolve", "-".dimmed())?,
        }
        Ok(())
    }
}

/// Listing entry for a registered rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleInfo {
    pub id: String,
    pub name: String,
    pub category: RuleCategory,
    pub description: String,
    pub applicable: bool,
}

impl RuleInfo {
    pub fn from_rule(rule: &dyn Rule, applicable: bool) -> Self {
        Self {
            id: rule.id().to_string(),
            name: rule.name().to_string(),
            category: rule.category(),
            description: rule.description().to_string(),
            applicable,
        }
    }
}

/// Render the rule listing
pub fn render_rules<W: Write>(rules: &[RuleInfo], format: OutputFormat, out: &mut W) -> Result<()> {
    if format != OutputFormat::Table {
        return write_structured(&rules, format, out);
    }

    for rule in rules {
        let id = if rule.applicable {
            rule.id.green()
        } else {
            rule.id.dimmed()
        };
        writeln!(out, "{:<20} {:<14} {}", id, rule.category.to_string(), rule.description)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GateMode;
    use crate::engine::rules::test_support::feature;
    use crate::resolver::ResolveFailure;

    fn sample_report() -> GateReport {
        let rows = vec![feature("f.x", "identifier", "decimal")];
        let violations = vec![Violation::error(RuleId::IdentifierCodePattern, "bad code", &rows[0])
            .at("code", "f.x")];
        GateReport::new(GateMode::Import, &rows, Vec::new(), violations)
    }

    fn render_to_string(report: &GateReport, format: OutputFormat) -> String {
        let mut buffer = Vec::new();
        render_report(report, format, &mut buffer).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn test_output_format_default() {
        assert_eq!(OutputFormat::default(), OutputFormat::Json);
    }

    #[test]
    fn test_json_report_roundtrips() {
        let report = sample_report();
        let json = render_to_string(&report, OutputFormat::Json);
        let parsed: GateReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, report);
    }

    #[test]
    fn test_yaml_report() {
        let yaml = render_to_string(&sample_report(), OutputFormat::Yaml);
        assert!(yaml.contains("mode: import"));
        assert!(yaml.contains("rule_id: IDENTIFIER_CODE_PATTERN"));
    }

    #[test]
    fn test_table_report() {
        let table = render_to_string(&sample_report(), OutputFormat::Table);
        assert!(table.contains("IDENTIFIER_CODE_PATTERN"));
        assert!(table.contains("bad code"));
        assert!(table.contains("1 errors"));
    }

    #[test]
    fn test_resolve_output() {
        let ok = Ok(Some(ResolvedType {
            raw: "ref:a".to_string(),
            resolved: "string".to_string(),
            canonical_code: Some("a".to_string()),
            chain: vec!["a".to_string()],
        }));
        let output = ResolveOutput::new("t1", "ref:a", &ok);
        assert!(output.is_ok());
        assert_eq!(output.resolved.as_deref(), Some("string"));

        let err = Err(ResolveError {
            failure: ResolveFailure::NotFound {
                code: "b".to_string(),
            },
            value: "ref:b".to_string(),
        });
        let output = ResolveOutput::new("t1", "ref:b", &err);
        assert!(!output.is_ok());
        assert_eq!(output.rule_id, Some(RuleId::TypeRefNotFound));

        let json = serde_json::to_value(&output).unwrap();
        assert_eq!(json["rule_id"], "TYPE_REF_NOT_FOUND");
    }
}
