use serde::Deserialize;
use serde_json::Value;

use sift_domain::hit::SearchHit;

use crate::{Error, Result};

#[derive(Debug, Clone, Default)]
pub struct SearchResponse {
	pub hits: Vec<SearchHit>,
	pub aggregations: Option<Value>,
}

#[derive(Deserialize)]
struct RawResponse {
	#[serde(default)]
	hits: Option<RawHits>,
	#[serde(default)]
	aggregations: Option<Value>,
}

#[derive(Deserialize)]
struct RawHits {
	#[serde(default)]
	hits: Vec<SearchHit>,
}

pub fn parse_search_response(response: Value) -> Result<SearchResponse> {
	if !response.is_object() {
		return Err(Error::InvalidResponse {
			message: "Search response must be a JSON object.".to_string(),
		});
	}

	let raw: RawResponse = serde_json::from_value(response)
		.map_err(|err| Error::InvalidResponse { message: err.to_string() })?;

	Ok(SearchResponse {
		hits: raw.hits.map(|hits| hits.hits).unwrap_or_default(),
		aggregations: raw.aggregations.filter(|aggregations| !aggregations.is_null()),
	})
}
