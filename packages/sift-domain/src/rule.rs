use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
	Low,
	Medium,
	High,
	Critical,
}
impl Severity {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Low => "low",
			Self::Medium => "medium",
			Self::High => "high",
			Self::Critical => "critical",
		}
	}
}

/// The detection rule currently executing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompleteRule {
	/// Stable identifier of the rule instance. Scopes alert ids and ancestry checks.
	pub id: String,
	pub name: String,
	pub params: RuleParams,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleParams {
	/// Author-facing signature id, shared by every copy of the rule.
	pub rule_id: String,
	#[serde(rename = "type")]
	pub rule_type: String,
	#[serde(default)]
	pub description: String,
	pub severity: Severity,
	pub risk_score: u8,
	#[serde(default)]
	pub tags: Vec<String>,
	#[serde(default)]
	pub index: Vec<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub query: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub language: Option<String>,
}
