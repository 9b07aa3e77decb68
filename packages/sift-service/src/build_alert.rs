use serde_json::{Map, Value};
use uuid::Uuid;

use sift_domain::{
	ancestry::Lineage,
	fields,
	hit::SearchHit,
	ignore::IgnoreFields,
	merge::{self, MergeStrategy},
	rule::CompleteRule,
};

use crate::{
	Error, Result,
	alert::{
		ALERT_ANCESTORS, ALERT_DEPTH, ALERT_ORIGINAL_EVENT_PREFIX, ALERT_ORIGINAL_TIME,
		ALERT_REASON, ALERT_RISK_SCORE, ALERT_RULE_EXECUTION_UUID, ALERT_RULE_INDICES,
		ALERT_RULE_NAME, ALERT_RULE_PARAMETERS, ALERT_RULE_RULE_ID, ALERT_RULE_TAGS,
		ALERT_RULE_TYPE, ALERT_RULE_UUID, ALERT_SEVERITY, ALERT_STATUS, ALERT_UUID,
		ALERT_WORKFLOW_STATUS, EVENT_KIND, SPACE_IDS, STALE_ALERT_NAMESPACES, TIMESTAMP,
	},
	reason::{BuildReasonMessage, ReasonContext},
};

pub(crate) struct BuildAlertArgs<'a> {
	pub(crate) position: usize,
	pub(crate) hit: &'a SearchHit,
	pub(crate) hit_index: &'a str,
	pub(crate) hit_id: &'a str,
	pub(crate) alert_id: &'a str,
	pub(crate) timestamp: &'a str,
	pub(crate) rule: &'a CompleteRule,
	pub(crate) rule_parameters: &'a Value,
	pub(crate) merge_strategy: MergeStrategy,
	pub(crate) ignore_fields: &'a IgnoreFields,
	pub(crate) space_id: Option<&'a str>,
	pub(crate) indices_to_query: &'a [String],
	pub(crate) execution_id: Option<Uuid>,
	pub(crate) build_reason: &'a dyn BuildReasonMessage,
}

pub(crate) struct BuiltAlert {
	pub(crate) source: Map<String, Value>,
	pub(crate) lineage: Lineage,
}

pub(crate) fn build_alert_source(args: BuildAlertArgs<'_>) -> Result<BuiltAlert> {
	let empty = Map::new();
	let source = fields::flatten(args.hit.source.as_ref().unwrap_or(&empty));
	let lineage = Lineage::of_hit(args.hit_index, args.hit_id, &source).map_err(|err| match err {
		sift_domain::Error::MalformedField { field, message } =>
			Error::MalformedHitField { position: args.position, field, message },
		other => Error::from(other),
	})?;
	let mut merged = merge::merge_hit_fields(
		&source,
		args.hit.fields.as_ref(),
		args.merge_strategy,
		args.ignore_fields,
	);

	merged.retain(|path, _| {
		!STALE_ALERT_NAMESPACES.iter().any(|namespace| fields::is_within(path, namespace))
	});

	let original_event: Vec<(String, Value)> = merged
		.iter()
		.filter_map(|(path, value)| {
			path.strip_prefix("event.")
				.map(|rest| (format!("{ALERT_ORIGINAL_EVENT_PREFIX}{rest}"), value.clone()))
		})
		.collect();

	merged.extend(original_event);

	if let Some(original_time) = merged.get(TIMESTAMP).cloned() {
		merged.insert(ALERT_ORIGINAL_TIME.to_string(), original_time);
	}

	let reason = args
		.build_reason
		.build(&ReasonContext { rule: args.rule, hit: args.hit, fields: &merged })
		.map_err(|err| Error::ReasonMessage { hit_id: args.hit_id.to_string(), source: err })?;

	let rule = args.rule;
	let alert_fields = [
		(TIMESTAMP, Value::from(args.timestamp)),
		(EVENT_KIND, Value::from("signal")),
		(ALERT_UUID, Value::from(args.alert_id)),
		(ALERT_REASON, Value::from(reason)),
		(ALERT_ANCESTORS, serde_json::to_value(&lineage.ancestors)?),
		(ALERT_DEPTH, Value::from(lineage.depth)),
		(ALERT_STATUS, Value::from("active")),
		(ALERT_WORKFLOW_STATUS, Value::from("open")),
		(ALERT_SEVERITY, Value::from(rule.params.severity.as_str())),
		(ALERT_RISK_SCORE, Value::from(rule.params.risk_score)),
		(ALERT_RULE_UUID, Value::from(rule.id.as_str())),
		(ALERT_RULE_NAME, Value::from(rule.name.as_str())),
		(ALERT_RULE_RULE_ID, Value::from(rule.params.rule_id.as_str())),
		(ALERT_RULE_TYPE, Value::from(rule.params.rule_type.as_str())),
		(ALERT_RULE_TAGS, Value::from(rule.params.tags.clone())),
		(ALERT_RULE_PARAMETERS, args.rule_parameters.clone()),
		(ALERT_RULE_INDICES, Value::from(args.indices_to_query.to_vec())),
	];

	for (path, value) in alert_fields {
		merged.insert(path.to_string(), value);
	}

	if let Some(execution_id) = args.execution_id {
		merged.insert(ALERT_RULE_EXECUTION_UUID.to_string(), Value::from(execution_id.to_string()));
	}
	if let Some(space_id) = args.space_id {
		merged.insert(SPACE_IDS.to_string(), Value::from(vec![space_id]));
	}

	Ok(BuiltAlert { source: merged, lineage })
}
