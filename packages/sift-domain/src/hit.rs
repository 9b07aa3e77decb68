use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single document returned by a search request.
///
/// The identifying metadata is optional on the wire so that a hit missing any of it can be
/// reported by field name instead of failing the whole batch decode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
	#[serde(rename = "_index", default, skip_serializing_if = "Option::is_none")]
	pub index: Option<String>,
	#[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
	pub id: Option<String>,
	#[serde(rename = "_version", default, skip_serializing_if = "Option::is_none")]
	pub version: Option<u64>,
	#[serde(rename = "_source", default, skip_serializing_if = "Option::is_none")]
	pub source: Option<Map<String, Value>>,
	/// Dotted field path to an array of values, as produced by the `fields` search option.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub fields: Option<Map<String, Value>>,
}
