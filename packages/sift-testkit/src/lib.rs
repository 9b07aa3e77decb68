use serde_json::{Map, Value, json};

use sift_domain::{
	hit::SearchHit,
	rule::{CompleteRule, RuleParams, Severity},
};

pub fn rule(id: &str) -> CompleteRule {
	CompleteRule {
		id: id.to_string(),
		name: format!("Suspicious login ({id})"),
		params: RuleParams {
			rule_id: format!("{id}-signature"),
			rule_type: "query".to_string(),
			description: "Flags logins from unexpected hosts.".to_string(),
			severity: Severity::High,
			risk_score: 73,
			tags: vec!["auth".to_string()],
			index: vec!["logs-*".to_string()],
			query: Some("event.category:authentication".to_string()),
			language: Some("kuery".to_string()),
		},
	}
}

pub fn hit(index: &str, id: &str, version: u64, source: Value) -> SearchHit {
	SearchHit {
		index: Some(index.to_string()),
		id: Some(id.to_string()),
		version: Some(version),
		source: Some(object(source)),
		fields: None,
	}
}

/// A hit that looks like an alert previously written by `rule_id`.
pub fn alert_hit(id: &str, ancestor_rule: &str) -> SearchHit {
	hit(
		".alerts-security.alerts-default",
		id,
		1,
		json!({
			"kibana.alert.uuid": id,
			"kibana.alert.depth": 1,
			"kibana.alert.ancestors": [
				{ "id": "doc-0", "type": "event", "index": "logs-1", "depth": 0, "rule": ancestor_rule }
			],
		}),
	)
}

pub fn object(value: Value) -> Map<String, Value> {
	match value {
		Value::Object(map) => map,
		other => panic!("Expected a JSON object, got {other}."),
	}
}
