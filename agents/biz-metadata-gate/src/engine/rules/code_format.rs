//! Code naming rule

use super::{Rule, RuleCategory, RuleContext, RuleId, Violation};
use crate::type_expr::is_valid_code;

/// Rule for validating that codes are dot-separated snake_case paths
pub struct CodeFormatRule;

impl CodeFormatRule {
    pub const ID: &'static str = "code-format";

    pub fn new() -> Self {
        Self
    }
}

impl Default for CodeFormatRule {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for CodeFormatRule {
    fn id(&self) -> &str {
        Self::ID
    }

    fn name(&self) -> &str {
        "Code format"
    }

    fn description(&self) -> &str {
        "code must be dot-separated snake_case, e.g. company.base.name_cn"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Format
    }

    fn evaluate(&self, context: &RuleContext<'_, '_>) -> Vec<Violation> {
        context
            .rows
            .iter()
            .filter(|row| !row.code.is_empty() && !is_valid_code(&row.code))
            .map(|row| {
                Violation::error(
                    RuleId::CodeFormat,
                    "code must be dot-separated snake_case",
                    row,
                )
                .at("code", row.code.clone())
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{entity, run};
    use super::*;
    use crate::config::GateMode;

    #[test]
    fn test_code_format() {
        let rows = vec![
            entity("company.base"),
            entity("Company.Base"),
            entity("company..base"),
            entity("company-base"),
        ];
        let violations = run(&CodeFormatRule::new(), &rows, GateMode::Import);
        let codes: Vec<&str> = violations.iter().map(|v| v.code.as_str()).collect();
        assert_eq!(codes, vec!["Company.Base", "company..base", "company-base"]);
    }

    #[test]
    fn test_empty_code_left_to_required_rule() {
        let rows = vec![entity("")];
        assert!(run(&CodeFormatRule::new(), &rows, GateMode::Import).is_empty());
    }
}
