//! Unit rule: only metrics carry a unit

use super::{Rule, RuleCategory, RuleContext, RuleId, Violation};

pub struct UnitRule;

impl UnitRule {
    pub const ID: &'static str = "unit";

    pub fn new() -> Self {
        Self
    }
}

impl Default for UnitRule {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for UnitRule {
    fn id(&self) -> &str {
        Self::ID
    }

    fn name(&self) -> &str {
        "Metric unit"
    }

    fn description(&self) -> &str {
        "unit can be filled only when data_class=metric"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Unit
    }

    fn evaluate(&self, context: &RuleContext<'_, '_>) -> Vec<Violation> {
        // Non-feature rows with a unit are reported by the scope rule
        context
            .rows
            .iter()
            .filter(|row| row.is_feature() && !row.unit.is_empty() && row.data_class != "metric")
            .map(|row| {
                Violation::error(
                    RuleId::UnitNotAllowed,
                    "unit can be filled only when data_class=metric",
                    row,
                )
                .at("unit", row.unit.clone())
            })
            .collect()
    }
}
