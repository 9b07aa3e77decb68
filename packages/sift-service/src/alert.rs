use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use sift_domain::ancestry;

pub const TIMESTAMP: &str = "@timestamp";
pub const EVENT_KIND: &str = "event.kind";
pub const SPACE_IDS: &str = "kibana.space_ids";
pub const ALERT_UUID: &str = ancestry::ALERT_UUID_FIELD;
pub const ALERT_ANCESTORS: &str = ancestry::ANCESTORS_FIELD;
pub const ALERT_DEPTH: &str = ancestry::ALERT_DEPTH_FIELD;
pub const ALERT_REASON: &str = "kibana.alert.reason";
pub const ALERT_STATUS: &str = "kibana.alert.status";
pub const ALERT_WORKFLOW_STATUS: &str = "kibana.alert.workflow_status";
pub const ALERT_SEVERITY: &str = "kibana.alert.severity";
pub const ALERT_RISK_SCORE: &str = "kibana.alert.risk_score";
pub const ALERT_ORIGINAL_TIME: &str = "kibana.alert.original_time";
pub const ALERT_ORIGINAL_EVENT_PREFIX: &str = "kibana.alert.original_event.";
pub const ALERT_RULE_UUID: &str = ancestry::ALERT_RULE_UUID_FIELD;
pub const ALERT_RULE_NAME: &str = "kibana.alert.rule.name";
pub const ALERT_RULE_RULE_ID: &str = "kibana.alert.rule.rule_id";
pub const ALERT_RULE_TYPE: &str = "kibana.alert.rule.type";
pub const ALERT_RULE_TAGS: &str = "kibana.alert.rule.tags";
pub const ALERT_RULE_PARAMETERS: &str = "kibana.alert.rule.parameters";
pub const ALERT_RULE_INDICES: &str = "kibana.alert.rule.indices";
pub const ALERT_RULE_EXECUTION_UUID: &str = "kibana.alert.rule.execution.uuid";

/// Metadata a hit may carry from an earlier alert. Never copied forward as hit data.
pub const STALE_ALERT_NAMESPACES: [&str; 3] = ["kibana.alert", SPACE_IDS, "signal"];

/// A candidate alert document, ready for the persistence layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WrappedAlert {
	#[serde(rename = "_id")]
	pub id: String,
	/// Left empty; the writer picks the concrete alerts index.
	#[serde(rename = "_index")]
	pub index: String,
	#[serde(rename = "_source")]
	pub source: Map<String, Value>,
}
impl WrappedAlert {
	pub fn field(&self, path: &str) -> Option<&Value> {
		self.source.get(path)
	}
}
