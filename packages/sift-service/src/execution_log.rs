use uuid::Uuid;

use sift_domain::rule::CompleteRule;

/// Diagnostics sink for one rule execution. Calls are fire-and-forget.
pub trait RuleExecutionLogger
where
	Self: Send + Sync,
{
	fn debug(&self, message: &str);

	fn info(&self, message: &str);

	fn warn(&self, message: &str);

	fn error(&self, message: &str);
}

#[derive(Debug, Clone)]
pub struct TracingExecutionLogger {
	rule_id: String,
	rule_name: String,
	space_id: Option<String>,
	execution_id: Option<Uuid>,
}
impl TracingExecutionLogger {
	pub fn new(rule: &CompleteRule, space_id: Option<&str>, execution_id: Option<Uuid>) -> Self {
		Self {
			rule_id: rule.id.clone(),
			rule_name: rule.name.clone(),
			space_id: space_id.map(str::to_string),
			execution_id,
		}
	}
}

impl RuleExecutionLogger for TracingExecutionLogger {
	fn debug(&self, message: &str) {
		tracing::debug!(
			rule_id = %self.rule_id,
			rule_name = %self.rule_name,
			space_id = ?self.space_id,
			execution_id = ?self.execution_id,
			"{message}"
		);
	}

	fn info(&self, message: &str) {
		tracing::info!(
			rule_id = %self.rule_id,
			rule_name = %self.rule_name,
			space_id = ?self.space_id,
			execution_id = ?self.execution_id,
			"{message}"
		);
	}

	fn warn(&self, message: &str) {
		tracing::warn!(
			rule_id = %self.rule_id,
			rule_name = %self.rule_name,
			space_id = ?self.space_id,
			execution_id = ?self.execution_id,
			"{message}"
		);
	}

	fn error(&self, message: &str) {
		tracing::error!(
			rule_id = %self.rule_id,
			rule_name = %self.rule_name,
			space_id = ?self.space_id,
			execution_id = ?self.execution_id,
			"{message}"
		);
	}
}
