use std::sync::Arc;

use serde_json::Value;
use time::{OffsetDateTime, UtcOffset, format_description::well_known::Rfc3339};
use uuid::Uuid;

use sift_domain::{
	alert_id, hit::SearchHit, ignore::IgnoreFields, merge::MergeStrategy, rule::CompleteRule,
};

use crate::{
	Error, Result, WrappedAlert,
	build_alert::{self, BuildAlertArgs},
	execution_log::RuleExecutionLogger,
	reason::BuildReasonMessage,
};

pub struct WrapHitsArgs {
	pub rule: CompleteRule,
	pub ignore_fields: Vec<String>,
	pub merge_strategy: String,
	pub space_id: Option<String>,
	pub indices_to_query: Vec<String>,
	/// Replaces the wall clock as the alert timestamp, e.g. for backfills.
	pub alert_timestamp_override: Option<OffsetDateTime>,
	pub execution_id: Option<Uuid>,
	pub logger: Arc<dyn RuleExecutionLogger>,
}
impl WrapHitsArgs {
	/// Alert settings from config; queried indices default to the rule's own index patterns.
	pub fn from_config(
		cfg: &sift_config::Alerts,
		rule: CompleteRule,
		logger: Arc<dyn RuleExecutionLogger>,
	) -> Self {
		Self {
			ignore_fields: cfg.ignore_fields.clone(),
			merge_strategy: cfg.merge_strategy.clone(),
			space_id: cfg.space_id.clone(),
			indices_to_query: rule.params.index.clone(),
			alert_timestamp_override: None,
			execution_id: None,
			rule,
			logger,
		}
	}
}

/// Turns search hits into alert documents for one rule execution.
///
/// Configuration is fixed at construction; `wrap` holds no state between calls, so one instance
/// can serve concurrent callers.
pub struct WrapHits {
	rule: CompleteRule,
	rule_parameters: Value,
	rule_scope: String,
	ignore_fields: IgnoreFields,
	merge_strategy: MergeStrategy,
	space_id: Option<String>,
	indices_to_query: Vec<String>,
	alert_timestamp_override: Option<OffsetDateTime>,
	execution_id: Option<Uuid>,
	logger: Arc<dyn RuleExecutionLogger>,
}
impl WrapHits {
	pub fn new(args: WrapHitsArgs) -> Result<Self> {
		let merge_strategy = args.merge_strategy.parse::<MergeStrategy>()?;
		let ignore_fields = IgnoreFields::parse(&args.ignore_fields)?;
		let rule_parameters = serde_json::to_value(&args.rule.params)?;
		let rule_scope = alert_id::rule_scope(args.space_id.as_deref(), &args.rule.id);

		Ok(Self {
			rule: args.rule,
			rule_parameters,
			rule_scope,
			ignore_fields,
			merge_strategy,
			space_id: args.space_id,
			indices_to_query: args.indices_to_query,
			alert_timestamp_override: args.alert_timestamp_override,
			execution_id: args.execution_id,
			logger: args.logger,
		})
	}

	pub fn rule(&self) -> &CompleteRule {
		&self.rule
	}

	pub fn merge_strategy(&self) -> MergeStrategy {
		self.merge_strategy
	}

	/// Builds one alert per hit, then drops alerts descending from this rule's own output.
	///
	/// Survivors keep input order. Any invalid hit or reason builder failure fails the whole
	/// batch.
	pub fn wrap(
		&self,
		hits: &[SearchHit],
		build_reason: &dyn BuildReasonMessage,
	) -> Result<Vec<WrappedAlert>> {
		let timestamp = self
			.alert_timestamp_override
			.unwrap_or_else(OffsetDateTime::now_utc)
			.to_offset(UtcOffset::UTC)
			.format(&Rfc3339)?;

		self.logger.debug(&format!(
			"Wrapping {} hits with merge strategy {}.",
			hits.len(),
			self.merge_strategy
		));

		let mut candidates = Vec::with_capacity(hits.len());

		for (position, hit) in hits.iter().enumerate() {
			let (hit_index, hit_id, version) = required_metadata(position, hit)?;
			let alert_id =
				alert_id::generate_alert_id(hit_index, hit_id, &version.to_string(), &self.rule_scope);
			let built = build_alert::build_alert_source(BuildAlertArgs {
				position,
				hit,
				hit_index,
				hit_id,
				alert_id: &alert_id,
				timestamp: &timestamp,
				rule: &self.rule,
				rule_parameters: &self.rule_parameters,
				merge_strategy: self.merge_strategy,
				ignore_fields: &self.ignore_fields,
				space_id: self.space_id.as_deref(),
				indices_to_query: &self.indices_to_query,
				execution_id: self.execution_id,
				build_reason,
			})?;

			candidates.push((
				built.lineage,
				WrappedAlert { id: alert_id, index: String::new(), source: built.source },
			));
		}

		let total = candidates.len();
		let alerts: Vec<WrappedAlert> = candidates
			.into_iter()
			.filter(|(lineage, _)| !lineage.produced_by(&self.rule.id))
			.map(|(_, alert)| alert)
			.collect();
		let suppressed = total - alerts.len();

		if suppressed > 0 {
			self.logger.info(&format!(
				"Suppressed {suppressed} of {total} hits already produced by this rule."
			));
		}

		Ok(alerts)
	}
}

fn required_metadata(position: usize, hit: &SearchHit) -> Result<(&str, &str, u64)> {
	let index = hit
		.index
		.as_deref()
		.filter(|index| !index.is_empty())
		.ok_or(Error::MissingHitField { position, field: "_index" })?;
	let id = hit
		.id
		.as_deref()
		.filter(|id| !id.is_empty())
		.ok_or(Error::MissingHitField { position, field: "_id" })?;
	let version = hit.version.ok_or(Error::MissingHitField { position, field: "_version" })?;

	Ok((index, id, version))
}
