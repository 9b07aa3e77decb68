/// Derives the alert id for a source document.
///
/// Every part is length-prefixed before hashing, so `("ab", "c")` and `("a", "bc")` never
/// share an input. The result is 64 lowercase hex characters.
pub fn generate_alert_id(index: &str, id: &str, version: &str, rule_scope: &str) -> String {
	let mut hasher = blake3::Hasher::new();

	for part in [index, id, version, rule_scope] {
		hasher.update(&(part.len() as u64).to_le_bytes());
		hasher.update(part.as_bytes());
	}

	hasher.finalize().to_hex().to_string()
}

/// `"{space}:{rule}"`. A missing space hashes as the empty string.
pub fn rule_scope(space_id: Option<&str>, rule_id: &str) -> String {
	format!("{}:{rule_id}", space_id.unwrap_or_default())
}
