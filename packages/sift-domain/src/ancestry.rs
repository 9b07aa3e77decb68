use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{Error, Result};

pub const ANCESTORS_FIELD: &str = "kibana.alert.ancestors";
pub const LEGACY_ANCESTORS_FIELD: &str = "signal.ancestors";
pub const ALERT_UUID_FIELD: &str = "kibana.alert.uuid";
pub const ALERT_DEPTH_FIELD: &str = "kibana.alert.depth";
pub const ALERT_RULE_UUID_FIELD: &str = "kibana.alert.rule.uuid";
pub const LEGACY_DEPTH_FIELD: &str = "signal.depth";
pub const LEGACY_RULE_ID_FIELD: &str = "signal.rule.id";

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AncestorKind {
	#[default]
	Event,
	Signal,
}

/// One link in the chain of documents an alert was derived from.
///
/// Recorded entries written by older producers may carry only some keys; missing ones default.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Ancestor {
	#[serde(default)]
	pub id: String,
	#[serde(rename = "type", default)]
	pub kind: AncestorKind,
	#[serde(default)]
	pub index: String,
	#[serde(default)]
	pub depth: u32,
	/// Rule that produced this ancestor. Absent for raw events.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub rule: Option<String>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Lineage {
	pub ancestors: Vec<Ancestor>,
	pub depth: u32,
}
impl Lineage {
	/// Recorded ancestry of the hit followed by the hit itself as the direct parent.
	///
	/// `source` must be the flattened `_source` of the hit.
	pub fn of_hit(hit_index: &str, hit_id: &str, source: &Map<String, Value>) -> Result<Self> {
		let mut ancestors = recorded_ancestors(source)?;
		let rule = alert_rule(source)?;
		let parent = if source.contains_key(ALERT_UUID_FIELD)
			|| rule.is_some()
			|| !ancestors.is_empty()
		{
			Ancestor {
				id: hit_id.to_string(),
				kind: AncestorKind::Signal,
				index: hit_index.to_string(),
				depth: alert_depth(source)?,
				rule,
			}
		} else {
			Ancestor {
				id: hit_id.to_string(),
				kind: AncestorKind::Event,
				index: hit_index.to_string(),
				depth: 0,
				rule: None,
			}
		};

		ancestors.push(parent);

		let depth = ancestors
			.iter()
			.map(|ancestor| ancestor.depth)
			.max()
			.unwrap_or(0)
			.checked_add(1)
			.ok_or_else(|| malformed(ALERT_DEPTH_FIELD, "depth is too large to extend."))?;

		Ok(Self { ancestors, depth })
	}

	pub fn produced_by(&self, rule_id: &str) -> bool {
		self.ancestors.iter().any(|ancestor| ancestor.rule.as_deref() == Some(rule_id))
	}
}

pub fn recorded_ancestors(source: &Map<String, Value>) -> Result<Vec<Ancestor>> {
	let (field, raw) = match source.get(ANCESTORS_FIELD) {
		Some(raw) => (ANCESTORS_FIELD, raw),
		None => match source.get(LEGACY_ANCESTORS_FIELD) {
			Some(raw) => (LEGACY_ANCESTORS_FIELD, raw),
			None => return Ok(Vec::new()),
		},
	};
	let entries = match raw {
		Value::Null => return Ok(Vec::new()),
		Value::Array(entries) => entries,
		_ => return Err(malformed(field, "expected an array of ancestors.")),
	};

	entries
		.iter()
		.enumerate()
		.map(|(idx, entry)| {
			if !entry.is_object() {
				return Err(malformed(field, &format!("entry {idx} is not an object.")));
			}

			serde_json::from_value::<Ancestor>(entry.clone())
				.map_err(|err| malformed(field, &format!("entry {idx} is invalid: {err}.")))
		})
		.collect()
}

fn alert_depth(source: &Map<String, Value>) -> Result<u32> {
	match present(source, ALERT_DEPTH_FIELD, LEGACY_DEPTH_FIELD) {
		None => Ok(1),
		Some((field, value)) => value
			.as_u64()
			.and_then(|depth| u32::try_from(depth).ok())
			.ok_or_else(|| malformed(field, "expected a non-negative integer.")),
	}
}

fn alert_rule(source: &Map<String, Value>) -> Result<Option<String>> {
	match present(source, ALERT_RULE_UUID_FIELD, LEGACY_RULE_ID_FIELD) {
		None => Ok(None),
		Some((_, Value::String(rule))) => Ok(Some(rule.clone())),
		Some((field, _)) => Err(malformed(field, "expected a string.")),
	}
}

// Current alert field first, then the legacy `signal.*` one. Nulls count as absent.
fn present<'a>(
	source: &'a Map<String, Value>,
	field: &'static str,
	legacy_field: &'static str,
) -> Option<(&'static str, &'a Value)> {
	[field, legacy_field]
		.into_iter()
		.find_map(|name| source.get(name).filter(|value| !value.is_null()).map(|value| (name, value)))
}

fn malformed(field: &str, message: &str) -> Error {
	Error::MalformedField { field: field.to_string(), message: message.to_string() }
}
