use regex::Regex;

use crate::{Error, Result, fields};

/// Field paths that must never be copied from a hit into an alert.
#[derive(Debug, Clone, Default)]
pub struct IgnoreFields {
	exact: Vec<String>,
	patterns: Vec<Regex>,
}
impl IgnoreFields {
	/// Entries wrapped in slashes (`/^cloud\./`) are regular expressions; anything else names a
	/// field path together with everything nested below it.
	pub fn parse<S>(entries: &[S]) -> Result<Self>
	where
		S: AsRef<str>,
	{
		let mut ignore = Self::default();

		for entry in entries {
			let entry = entry.as_ref().trim();

			if entry.is_empty() {
				continue;
			}

			if let Some(pattern) = entry.strip_prefix('/').and_then(|rest| rest.strip_suffix('/'))
				&& !pattern.is_empty()
			{
				let regex = Regex::new(pattern).map_err(|err| Error::InvalidIgnorePattern {
					pattern: entry.to_string(),
					source: err,
				})?;

				ignore.patterns.push(regex);
			} else {
				ignore.exact.push(entry.to_string());
			}
		}

		Ok(ignore)
	}

	pub fn is_ignored(&self, path: &str) -> bool {
		self.exact.iter().any(|field| fields::is_within(path, field))
			|| self.patterns.iter().any(|pattern| pattern.is_match(path))
	}
}
