use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::{Error, Result, SearchBackend, search_response};

pub const ERROR_RATE_OPERATION: &str = "get_transaction_error_rate_chart_preview";
pub const ENVIRONMENT_ALL: &str = "ENVIRONMENT_ALL";
pub const ENVIRONMENT_NOT_DEFINED: &str = "ENVIRONMENT_NOT_DEFINED";

const SERVICE_NAME: &str = "service.name";
const SERVICE_ENVIRONMENT: &str = "service.environment";
const TRANSACTION_TYPE: &str = "transaction.type";
const TRANSACTION_NAME: &str = "transaction.name";
const EVENT_OUTCOME: &str = "event.outcome";
const OUTCOME_FAILURE: &str = "failure";
const OUTCOME_SUCCESS: &str = "success";
const DEFAULT_GROUP_BY: [&str; 3] = [SERVICE_NAME, SERVICE_ENVIRONMENT, TRANSACTION_TYPE];

#[derive(Debug, Clone, Deserialize)]
pub struct ErrorRatePreviewParams {
	#[serde(default)]
	pub service_name: Option<String>,
	#[serde(default = "default_environment")]
	pub environment: String,
	#[serde(default)]
	pub transaction_type: Option<String>,
	#[serde(default)]
	pub transaction_name: Option<String>,
	/// Fixed histogram interval, e.g. "1m".
	pub interval: String,
	/// Epoch milliseconds.
	pub start: i64,
	/// Epoch milliseconds.
	pub end: i64,
	#[serde(default)]
	pub group_by: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
	pub x: i64,
	/// Failure percentage, or `None` for a bucket without any outcome.
	pub y: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
	pub name: String,
	pub data: Vec<ChartPoint>,
}

#[derive(Deserialize)]
struct Aggregations {
	timeseries: Buckets<TimeBucket>,
}

#[derive(Deserialize)]
struct Buckets<T> {
	#[serde(default = "Vec::new")]
	buckets: Vec<T>,
}

#[derive(Deserialize)]
struct TimeBucket {
	key: i64,
	series: Buckets<SeriesBucket>,
}

#[derive(Deserialize)]
struct SeriesBucket {
	key: Vec<Value>,
	outcomes: Buckets<OutcomeBucket>,
}

#[derive(Deserialize)]
struct OutcomeBucket {
	key: Value,
	doc_count: u64,
}

/// Default grouping fields followed by the requested extras, without duplicates.
pub fn all_group_by_fields(group_by: &[String]) -> Vec<String> {
	let mut fields: Vec<String> = DEFAULT_GROUP_BY.iter().map(|field| field.to_string()).collect();

	for field in group_by {
		if !fields.contains(field) {
			fields.push(field.clone());
		}
	}

	fields
}

pub fn error_rate_query(cfg: &sift_config::Preview, params: &ErrorRatePreviewParams) -> Value {
	let mut filter = Vec::new();

	for (field, value) in [
		(SERVICE_NAME, params.service_name.as_deref()),
		(TRANSACTION_TYPE, params.transaction_type.as_deref()),
		(TRANSACTION_NAME, params.transaction_name.as_deref()),
	] {
		if let Some(value) = value.filter(|value| !value.is_empty()) {
			filter.push(term(field, Value::from(value)));
		}
	}

	filter.push(json!({
		"range": {
			"@timestamp": { "gte": params.start, "lte": params.end, "format": "epoch_millis" }
		}
	}));

	match params.environment.as_str() {
		ENVIRONMENT_ALL | "" => {},
		ENVIRONMENT_NOT_DEFINED => filter.push(json!({
			"bool": { "must_not": [{ "exists": { "field": SERVICE_ENVIRONMENT } }] }
		})),
		environment => filter.push(term(SERVICE_ENVIRONMENT, Value::from(environment))),
	}

	if cfg.use_aggregated_transactions {
		filter.push(term("processor.event", Value::from("metric")));
		filter.push(term("metricset.name", Value::from("transaction")));
	} else {
		filter.push(term("processor.event", Value::from("transaction")));
	}

	let mut outcomes = Map::new();

	outcomes.insert(EVENT_OUTCOME.to_string(), json!([OUTCOME_FAILURE, OUTCOME_SUCCESS]));
	filter.push(json!({ "terms": outcomes }));

	let group_by_terms: Vec<Value> = all_group_by_fields(&params.group_by)
		.into_iter()
		.map(|field| {
			if field == SERVICE_ENVIRONMENT {
				json!({ "field": field, "missing": ENVIRONMENT_NOT_DEFINED })
			} else {
				json!({ "field": field })
			}
		})
		.collect();

	json!({
		"track_total_hits": false,
		"size": 0,
		"query": { "bool": { "filter": filter } },
		"aggs": {
			"timeseries": {
				"date_histogram": {
					"field": "@timestamp",
					"fixed_interval": params.interval,
					"extended_bounds": { "min": params.start, "max": params.end }
				},
				"aggs": {
					"series": {
						"multi_terms": {
							"terms": group_by_terms,
							"size": cfg.max_series,
							"order": { "_count": "desc" }
						},
						"aggs": {
							"outcomes": { "terms": { "field": EVENT_OUTCOME } }
						}
					}
				}
			}
		}
	})
}

/// Reshapes the `timeseries` aggregation into one series per group, in first-seen order.
pub fn error_rate_series(aggregations: &Value) -> Result<Vec<ChartSeries>> {
	let aggregations = Aggregations::deserialize(aggregations)
		.map_err(|err| Error::InvalidResponse { message: err.to_string() })?;
	let mut series: Vec<ChartSeries> = Vec::new();
	let mut positions: HashMap<String, usize> = HashMap::new();

	for time_bucket in aggregations.timeseries.buckets {
		for series_bucket in time_bucket.series.buckets {
			let name = series_bucket.key.iter().map(key_part).collect::<Vec<_>>().join("_");
			let point =
				ChartPoint { x: time_bucket.key, y: error_rate(&series_bucket.outcomes.buckets) };

			match positions.get(&name) {
				Some(&position) => series[position].data.push(point),
				None => {
					positions.insert(name.clone(), series.len());
					series.push(ChartSeries { name, data: vec![point] });
				},
			}
		}
	}

	Ok(series)
}

pub async fn transaction_error_rate_chart_preview(
	backend: &dyn SearchBackend,
	cfg: &sift_config::Preview,
	params: &ErrorRatePreviewParams,
) -> Result<Vec<ChartSeries>> {
	validate_params(params)?;

	let body = error_rate_query(cfg, params);
	let indices =
		if cfg.use_aggregated_transactions { &cfg.metric_indices } else { &cfg.transaction_indices };
	let raw = backend.search(ERROR_RATE_OPERATION, indices, &body).await?;
	let response = search_response::parse_search_response(raw)?;

	match response.aggregations {
		Some(aggregations) => error_rate_series(&aggregations),
		None => Ok(Vec::new()),
	}
}

fn validate_params(params: &ErrorRatePreviewParams) -> Result<()> {
	if params.interval.trim().is_empty() {
		return Err(Error::InvalidRequest { message: "interval must be non-empty.".to_string() });
	}
	if params.start > params.end {
		return Err(Error::InvalidRequest {
			message: "start must not be later than end.".to_string(),
		});
	}

	Ok(())
}

fn term(field: &str, value: Value) -> Value {
	let mut term = Map::new();

	term.insert(field.to_string(), value);

	json!({ "term": term })
}

fn error_rate(outcomes: &[OutcomeBucket]) -> Option<f64> {
	let count = |outcome: &str| {
		outcomes
			.iter()
			.find(|bucket| bucket.key.as_str() == Some(outcome))
			.map(|bucket| bucket.doc_count)
			.unwrap_or(0)
	};
	let failed = count(OUTCOME_FAILURE);
	let total = failed + count(OUTCOME_SUCCESS);

	if total == 0 {
		return None;
	}

	Some(failed as f64 / total as f64 * 100.0)
}

fn key_part(value: &Value) -> String {
	match value {
		Value::Null => String::new(),
		Value::String(value) => value.clone(),
		// Integral floats render without a fractional part, e.g. `1.0` as "1".
		Value::Number(number) if number.is_f64() =>
			number.as_f64().map(|value| value.to_string()).unwrap_or_else(|| number.to_string()),
		other => other.to_string(),
	}
}

fn default_environment() -> String {
	ENVIRONMENT_ALL.to_string()
}
