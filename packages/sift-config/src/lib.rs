mod error;
mod types;

pub use error::{Error, Result};
pub use types::{Alerts, Config, Preview, Search, Service};

use std::{fs, path::Path};

pub const MERGE_STRATEGIES: [&str; 3] = ["allFields", "missingFields", "noFields"];

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.log_level.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.log_level must be non-empty.".to_string(),
		});
	}
	if !MERGE_STRATEGIES.contains(&cfg.alerts.merge_strategy.as_str()) {
		return Err(Error::Validation {
			message: format!(
				"alerts.merge_strategy must be one of allFields, missingFields, or noFields; got {:?}.",
				cfg.alerts.merge_strategy
			),
		});
	}

	for (idx, field) in cfg.alerts.ignore_fields.iter().enumerate() {
		if field.trim().is_empty() {
			return Err(Error::Validation {
				message: format!("alerts.ignore_fields[{idx}] must be non-empty."),
			});
		}
		if field.starts_with('/') && (field.len() < 3 || !field.ends_with('/')) {
			return Err(Error::Validation {
				message: format!(
					"alerts.ignore_fields[{idx}] must be wrapped in slashes when used as a pattern."
				),
			});
		}
	}

	if cfg.search.api_base.trim().is_empty() {
		return Err(Error::Validation {
			message: "search.api_base must be non-empty.".to_string(),
		});
	}
	if cfg.search.timeout_ms == 0 {
		return Err(Error::Validation {
			message: "search.timeout_ms must be greater than zero.".to_string(),
		});
	}
	if cfg.search.default_headers.values().any(|value| !value.is_string()) {
		return Err(Error::Validation {
			message: "search.default_headers values must be strings.".to_string(),
		});
	}
	if cfg.preview.max_series == 0 {
		return Err(Error::Validation {
			message: "preview.max_series must be greater than zero.".to_string(),
		});
	}

	for (label, indices) in [
		("preview.transaction_indices", &cfg.preview.transaction_indices),
		("preview.metric_indices", &cfg.preview.metric_indices),
	] {
		if indices.is_empty() || indices.iter().any(|index| index.trim().is_empty()) {
			return Err(Error::Validation {
				message: format!("{label} must contain only non-empty index names."),
			});
		}
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	if cfg.search.api_key.as_deref().map(|key| key.trim().is_empty()).unwrap_or(false) {
		cfg.search.api_key = None;
	}
	if cfg.alerts.space_id.as_deref().map(|space| space.trim().is_empty()).unwrap_or(false) {
		cfg.alerts.space_id = None;
	}

	cfg.search.api_base = cfg.search.api_base.trim_end_matches('/').to_string();
}
