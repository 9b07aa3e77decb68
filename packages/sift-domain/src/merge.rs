use std::{fmt, str::FromStr};

use serde_json::{Map, Value};

use crate::{Error, fields, ignore::IgnoreFields};

/// How a hit's `fields` values combine with its `_source` values.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum MergeStrategy {
	/// `fields` values overwrite `_source` values.
	AllFields,
	/// `fields` values only fill paths `_source` does not have.
	#[default]
	MissingFields,
	/// Only `_source` is used.
	NoFields,
}
impl MergeStrategy {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::AllFields => "allFields",
			Self::MissingFields => "missingFields",
			Self::NoFields => "noFields",
		}
	}
}
impl FromStr for MergeStrategy {
	type Err = Error;

	fn from_str(value: &str) -> Result<Self, Self::Err> {
		match value {
			"allFields" => Ok(Self::AllFields),
			"missingFields" => Ok(Self::MissingFields),
			"noFields" => Ok(Self::NoFields),
			_ => Err(Error::UnknownMergeStrategy { value: value.to_string() }),
		}
	}
}
impl fmt::Display for MergeStrategy {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Merges a hit's flattened `_source` with its `fields`, dropping ignored paths from both.
pub fn merge_hit_fields(
	source: &Map<String, Value>,
	hit_fields: Option<&Map<String, Value>>,
	strategy: MergeStrategy,
	ignore: &IgnoreFields,
) -> Map<String, Value> {
	let mut merged: Map<String, Value> = source
		.iter()
		.filter(|(path, _)| !ignore.is_ignored(path))
		.map(|(path, value)| (path.clone(), value.clone()))
		.collect();
	let Some(hit_fields) = hit_fields else {
		return merged;
	};

	if strategy == MergeStrategy::NoFields {
		return merged;
	}

	for (path, value) in hit_fields {
		if ignore.is_ignored(path) || is_multi_field(source, path) {
			continue;
		}

		let existing = source.get(path);

		if existing.is_some() && strategy == MergeStrategy::MissingFields {
			continue;
		}

		merged.insert(path.clone(), unwrap_single(value, existing));
	}

	merged
}

// `host.name.keyword` next to a `host.name` leaf is an index-time multi-field, not data.
fn is_multi_field(source: &Map<String, Value>, path: &str) -> bool {
	fields::proper_prefixes(path).any(|prefix| source.contains_key(prefix))
}

fn unwrap_single(value: &Value, existing: Option<&Value>) -> Value {
	match value {
		Value::Array(items) if items.len() == 1 && !matches!(existing, Some(Value::Array(_))) =>
			items[0].clone(),
		_ => value.clone(),
	}
}
