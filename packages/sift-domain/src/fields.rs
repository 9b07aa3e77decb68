use serde_json::{Map, Value};

/// Flattens nested objects into dotted field paths.
///
/// Arrays and scalars are leaves. An empty object is kept as a leaf so the path is not lost.
pub fn flatten(source: &Map<String, Value>) -> Map<String, Value> {
	let mut flat = Map::new();

	flatten_into(&mut flat, None, source);

	flat
}

/// Whether `path` is `parent` itself or a field nested below it.
pub fn is_within(path: &str, parent: &str) -> bool {
	match path.strip_prefix(parent) {
		Some(rest) => rest.is_empty() || rest.starts_with('.'),
		None => false,
	}
}

/// Every proper dotted prefix of `path`, shortest first.
pub fn proper_prefixes(path: &str) -> impl Iterator<Item = &str> {
	path.match_indices('.').map(move |(idx, _)| &path[..idx])
}

/// Renders a field value for human-readable text. Arrays are joined with ", ".
pub fn display_value(value: &Value) -> Option<String> {
	match value {
		Value::Null => None,
		Value::String(text) => Some(text.clone()),
		Value::Bool(flag) => Some(flag.to_string()),
		Value::Number(number) => Some(number.to_string()),
		Value::Array(items) => {
			let rendered: Vec<String> = items.iter().filter_map(display_value).collect();

			if rendered.is_empty() { None } else { Some(rendered.join(", ")) }
		},
		Value::Object(_) => Some(value.to_string()),
	}
}

fn flatten_into(flat: &mut Map<String, Value>, prefix: Option<&str>, object: &Map<String, Value>) {
	for (key, value) in object {
		let path = match prefix {
			Some(prefix) => format!("{prefix}.{key}"),
			None => key.clone(),
		};

		match value {
			Value::Object(inner) if !inner.is_empty() => flatten_into(flat, Some(&path), inner),
			_ => {
				flat.insert(path, value.clone());
			},
		}
	}
}
