use std::sync::{Arc, Mutex};

use serde_json::{Value, json};
use time::macros::datetime;
use uuid::Uuid;

use sift_domain::hit::SearchHit;
use sift_service::{
	BoxError, Error, FieldsReasonMessage, ReasonContext, RuleExecutionLogger, WrapHits,
	WrapHitsArgs, WrappedAlert,
};

#[derive(Default)]
struct RecordingLogger {
	lines: Mutex<Vec<(&'static str, String)>>,
}
impl RecordingLogger {
	fn record(&self, level: &'static str, message: &str) {
		self.lines.lock().expect("Logger lock poisoned.").push((level, message.to_string()));
	}

	fn lines(&self, level: &str) -> Vec<String> {
		self.lines
			.lock()
			.expect("Logger lock poisoned.")
			.iter()
			.filter(|(line_level, _)| *line_level == level)
			.map(|(_, message)| message.clone())
			.collect()
	}
}
impl RuleExecutionLogger for RecordingLogger {
	fn debug(&self, message: &str) {
		self.record("debug", message);
	}

	fn info(&self, message: &str) {
		self.record("info", message);
	}

	fn warn(&self, message: &str) {
		self.record("warn", message);
	}

	fn error(&self, message: &str) {
		self.record("error", message);
	}
}

fn args(rule_id: &str, logger: Arc<RecordingLogger>) -> WrapHitsArgs {
	let rule = sift_testkit::rule(rule_id);

	WrapHitsArgs {
		indices_to_query: rule.params.index.clone(),
		rule,
		ignore_fields: Vec::new(),
		merge_strategy: "missingFields".to_string(),
		space_id: Some("default".to_string()),
		alert_timestamp_override: Some(datetime!(2024-05-01 10:00:00 UTC)),
		execution_id: None,
		logger,
	}
}

fn wrapper(rule_id: &str) -> WrapHits {
	WrapHits::new(args(rule_id, Arc::new(RecordingLogger::default())))
		.expect("Failed to build wrapper.")
}

fn event_hits() -> Vec<SearchHit> {
	vec![
		sift_testkit::hit("logs-1", "doc-1", 1, json!({ "host": { "name": "web-1" } })),
		sift_testkit::hit("logs-1", "doc-2", 1, json!({ "host": { "name": "web-2" } })),
		sift_testkit::hit("logs-2", "doc-3", 4, json!({ "host": { "name": "web-3" } })),
	]
}

fn ids(alerts: &[WrappedAlert]) -> Vec<String> {
	alerts.iter().map(|alert| alert.id.clone()).collect()
}

#[test]
fn wraps_every_event_hit_in_order() {
	let alerts = wrapper("rule-a").wrap(&event_hits(), &FieldsReasonMessage).expect("wrap failed");

	assert_eq!(alerts.len(), 3);

	let hosts: Vec<&Value> =
		alerts.iter().map(|alert| alert.field("host.name").expect("host.name missing")).collect();

	assert_eq!(hosts, vec!["web-1", "web-2", "web-3"]);

	for alert in &alerts {
		assert_eq!(alert.index, "");
		assert_eq!(alert.field("kibana.alert.uuid"), Some(&Value::from(alert.id.clone())));
		assert_eq!(alert.field("@timestamp"), Some(&json!("2024-05-01T10:00:00Z")));
		assert_eq!(alert.field("event.kind"), Some(&json!("signal")));
		assert_eq!(alert.field("kibana.alert.depth"), Some(&json!(1)));
		assert_eq!(alert.field("kibana.alert.rule.uuid"), Some(&json!("rule-a")));
		assert_eq!(alert.field("kibana.space_ids"), Some(&json!(["default"])));
		assert_eq!(alert.field("kibana.alert.rule.indices"), Some(&json!(["logs-*"])));
	}
}

#[test]
fn alert_ids_are_deterministic_and_scoped_by_rule() {
	let hits = event_hits();
	let first = wrapper("rule-a").wrap(&hits, &FieldsReasonMessage).expect("wrap failed");
	let second = wrapper("rule-a").wrap(&hits, &FieldsReasonMessage).expect("wrap failed");
	let other_rule = wrapper("rule-b").wrap(&hits, &FieldsReasonMessage).expect("wrap failed");

	assert_eq!(ids(&first), ids(&second));
	assert_ne!(ids(&first), ids(&other_rule));

	let mut unique = ids(&first);

	unique.sort();
	unique.dedup();

	assert_eq!(unique.len(), 3);
}

#[test]
fn suppresses_alerts_already_produced_by_the_rule() {
	let logger = Arc::new(RecordingLogger::default());
	let wrap_hits = WrapHits::new(args("rule-a", logger.clone())).expect("Failed to build wrapper.");
	let hits = vec![
		sift_testkit::hit("logs-1", "doc-1", 1, json!({ "message": "one" })),
		sift_testkit::alert_hit("alert-1", "rule-a"),
		sift_testkit::hit("logs-1", "doc-3", 1, json!({ "message": "three" })),
	];
	let alerts = wrap_hits.wrap(&hits, &FieldsReasonMessage).expect("wrap failed");
	let messages: Vec<&Value> =
		alerts.iter().map(|alert| alert.field("message").expect("message missing")).collect();

	assert_eq!(messages, vec!["one", "three"]);
	assert_eq!(logger.lines("info"), vec!["Suppressed 1 of 3 hits already produced by this rule."]);
}

#[test]
fn three_hit_batch_drops_only_the_rule_tagged_hit() {
	let hits = vec![
		sift_testkit::hit("logs-1", "h1", 1, json!({})),
		sift_testkit::hit(
			"logs-1",
			"h2",
			1,
			json!({ "kibana": { "alert": { "ancestors": [{ "rule": "ruleA" }] } } }),
		),
		sift_testkit::hit("logs-1", "h3", 1, json!({})),
	];
	let wrap_hits = wrapper("ruleA");
	let alerts = wrap_hits.wrap(&hits, &FieldsReasonMessage).expect("wrap failed");
	let sources: Vec<&Value> = alerts
		.iter()
		.map(|alert| {
			let ancestors = alert.field("kibana.alert.ancestors").expect("ancestors missing");

			&ancestors[0]["id"]
		})
		.collect();

	assert_eq!(alerts.len(), 2);
	assert_eq!(sources, vec!["h1", "h3"]);
}

#[test]
fn suppresses_legacy_signals_from_the_same_rule() {
	let hits = vec![
		sift_testkit::hit(
			"legacy-signals",
			"sig-1",
			1,
			json!({
				"signal": {
					"rule": { "id": "rule-a" },
					"depth": 1,
					"ancestors": [{ "id": "e", "type": "event", "index": "logs", "depth": 0 }]
				}
			}),
		),
		sift_testkit::hit("logs-1", "doc-2", 1, json!({ "message": "kept" })),
	];
	let alerts = wrapper("rule-a").wrap(&hits, &FieldsReasonMessage).expect("wrap failed");

	assert_eq!(alerts.len(), 1);
	assert_eq!(alerts[0].field("message"), Some(&json!("kept")));
	assert!(alerts[0].field("signal.rule.id").is_none());
}

#[test]
fn suppresses_hits_whose_own_rule_matches() {
	let hits = vec![sift_testkit::hit(
		".alerts-security.alerts-default",
		"alert-7",
		1,
		json!({ "kibana.alert.rule.uuid": "rule-a" }),
	)];

	assert!(wrapper("rule-a").wrap(&hits, &FieldsReasonMessage).expect("wrap failed").is_empty());
	assert_eq!(wrapper("rule-b").wrap(&hits, &FieldsReasonMessage).expect("wrap failed").len(), 1);
}

#[test]
fn oversized_depth_fails_instead_of_wrapping() {
	let hits = vec![sift_testkit::hit(
		".alerts-security.alerts-default",
		"alert-8",
		1,
		json!({ "kibana.alert.uuid": "x", "kibana.alert.depth": u32::MAX }),
	)];
	let err = wrapper("rule-a").wrap(&hits, &FieldsReasonMessage).expect_err("wrap should fail");

	assert!(matches!(err, Error::MalformedHitField { position: 0, ref field, .. } if field == "kibana.alert.depth"));
}

#[test]
fn keeps_alerts_built_on_other_rules_output() {
	let hits = vec![sift_testkit::alert_hit("alert-1", "rule-b")];
	let alerts = wrapper("rule-a").wrap(&hits, &FieldsReasonMessage).expect("wrap failed");

	assert_eq!(alerts.len(), 1);

	let alert = &alerts[0];
	let ancestors = alert.field("kibana.alert.ancestors").expect("ancestors missing");

	assert_eq!(
		ancestors,
		&json!([
			{ "id": "doc-0", "type": "event", "index": "logs-1", "depth": 0, "rule": "rule-b" },
			{ "id": "alert-1", "type": "signal", "index": ".alerts-security.alerts-default", "depth": 1 }
		])
	);
	assert_eq!(alert.field("kibana.alert.depth"), Some(&json!(2)));
	assert_eq!(alert.field("kibana.alert.rule.uuid"), Some(&json!("rule-a")));
}

#[test]
fn empty_batch_yields_no_alerts() {
	let alerts = wrapper("rule-a").wrap(&[], &FieldsReasonMessage).expect("wrap failed");

	assert!(alerts.is_empty());
}

#[test]
fn ignored_fields_never_reach_the_alert() {
	let mut args = args("rule-a", Arc::new(RecordingLogger::default()));

	args.ignore_fields = vec!["secret".to_string(), "/^token\\./".to_string()];

	let wrap_hits = WrapHits::new(args).expect("Failed to build wrapper.");
	let hits = vec![sift_testkit::hit(
		"logs-1",
		"doc-1",
		1,
		json!({ "secret": "hunter2", "token": { "value": "abc" }, "user": { "name": "bob" } }),
	)];
	let alerts = wrap_hits.wrap(&hits, &FieldsReasonMessage).expect("wrap failed");
	let alert = &alerts[0];

	assert!(alert.field("secret").is_none());
	assert!(alert.field("token.value").is_none());
	assert_eq!(alert.field("user.name"), Some(&json!("bob")));
}

#[test]
fn stale_alert_metadata_is_replaced() {
	let hits = vec![sift_testkit::alert_hit("alert-1", "rule-b")];
	let alerts = wrapper("rule-a").wrap(&hits, &FieldsReasonMessage).expect("wrap failed");
	let alert = &alerts[0];

	assert_ne!(alert.field("kibana.alert.uuid"), Some(&json!("alert-1")));
	assert_eq!(alert.field("kibana.alert.uuid"), Some(&Value::from(alert.id.clone())));
}

#[test]
fn original_event_and_time_are_preserved() {
	let hits = vec![sift_testkit::hit(
		"logs-1",
		"doc-1",
		1,
		json!({
			"@timestamp": "2024-04-30T08:00:00Z",
			"event": { "kind": "event", "category": "authentication" }
		}),
	)];
	let alerts = wrapper("rule-a").wrap(&hits, &FieldsReasonMessage).expect("wrap failed");
	let alert = &alerts[0];

	assert_eq!(alert.field("kibana.alert.original_time"), Some(&json!("2024-04-30T08:00:00Z")));
	assert_eq!(alert.field("kibana.alert.original_event.kind"), Some(&json!("event")));
	assert_eq!(
		alert.field("kibana.alert.original_event.category"),
		Some(&json!("authentication"))
	);
	assert_eq!(alert.field("event.kind"), Some(&json!("signal")));
	assert_eq!(alert.field("@timestamp"), Some(&json!("2024-05-01T10:00:00Z")));
}

#[test]
fn records_execution_id_when_given() {
	let execution_id = Uuid::new_v4();
	let mut args = args("rule-a", Arc::new(RecordingLogger::default()));

	args.execution_id = Some(execution_id);

	let wrap_hits = WrapHits::new(args).expect("Failed to build wrapper.");
	let alerts = wrap_hits.wrap(&event_hits(), &FieldsReasonMessage).expect("wrap failed");

	assert_eq!(
		alerts[0].field("kibana.alert.rule.execution.uuid"),
		Some(&Value::from(execution_id.to_string()))
	);
}

#[test]
fn missing_metadata_fails_the_batch() {
	let mut hits = event_hits();

	hits[1].version = None;

	let err = wrapper("rule-a").wrap(&hits, &FieldsReasonMessage).expect_err("wrap should fail");

	assert!(matches!(err, Error::MissingHitField { position: 1, field: "_version" }));

	let mut hits = event_hits();

	hits[2].id = Some(String::new());

	let err = wrapper("rule-a").wrap(&hits, &FieldsReasonMessage).expect_err("wrap should fail");

	assert!(matches!(err, Error::MissingHitField { position: 2, field: "_id" }));
}

#[test]
fn reason_builder_errors_propagate() {
	let failing = |context: &ReasonContext<'_>| -> Result<String, BoxError> {
		match context.field("host.name").as_deref() {
			Some("web-2") => Err("no template for web-2".into()),
			_ => Ok("ok".to_string()),
		}
	};
	let err = wrapper("rule-a").wrap(&event_hits(), &failing).expect_err("wrap should fail");

	assert!(matches!(err, Error::ReasonMessage { ref hit_id, .. } if hit_id == "doc-2"));
}

#[test]
fn custom_reason_is_written_to_the_alert() {
	let reason = |context: &ReasonContext<'_>| -> Result<String, BoxError> {
		Ok(format!("{} fired", context.rule.name))
	};
	let alerts = wrapper("rule-a").wrap(&event_hits(), &reason).expect("wrap failed");

	assert_eq!(
		alerts[0].field("kibana.alert.reason"),
		Some(&json!("Suspicious login (rule-a) fired"))
	);
}

#[test]
fn unknown_merge_strategy_is_rejected() {
	let mut args = args("rule-a", Arc::new(RecordingLogger::default()));

	args.merge_strategy = "someFields".to_string();

	let err = WrapHits::new(args).err().expect("construction should fail");

	assert!(matches!(err, Error::InvalidConfig { ref message } if message.contains("someFields")));
}

#[test]
fn malformed_ancestry_reports_position() {
	let hits = vec![
		sift_testkit::hit("logs-1", "doc-1", 1, json!({})),
		sift_testkit::hit("logs-1", "doc-2", 1, json!({ "kibana.alert.ancestors": "bogus" })),
	];
	let err = wrapper("rule-a").wrap(&hits, &FieldsReasonMessage).expect_err("wrap should fail");

	assert!(matches!(err, Error::MalformedHitField { position: 1, .. }));
}

#[test]
fn from_config_uses_rule_indices_and_configured_space() {
	let cfg = sift_config::Alerts {
		ignore_fields: vec!["secret".to_string()],
		merge_strategy: "allFields".to_string(),
		space_id: Some("ops".to_string()),
	};
	let rule = sift_testkit::rule("rule-a");
	let args =
		WrapHitsArgs::from_config(&cfg, rule, Arc::new(RecordingLogger::default()));

	assert_eq!(args.indices_to_query, vec!["logs-*".to_string()]);
	assert_eq!(args.space_id.as_deref(), Some("ops"));

	let wrap_hits = WrapHits::new(args).expect("Failed to build wrapper.");

	assert_eq!(wrap_hits.merge_strategy().as_str(), "allFields");
	assert_eq!(wrap_hits.rule().id, "rule-a");
}
