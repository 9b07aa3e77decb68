use std::time::Duration;

use reqwest::Client;
use serde_json::Value;

use crate::{Error, Result};

pub async fn search(cfg: &sift_config::Search, indices: &[String], body: &Value) -> Result<Value> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = search_url(&cfg.api_base, indices)?;
	let res = client
		.post(url)
		.headers(crate::auth_headers(cfg.api_key.as_deref(), &cfg.default_headers)?)
		.json(body)
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;

	check_search_response(json)
}

pub fn search_url(api_base: &str, indices: &[String]) -> Result<String> {
	if indices.is_empty() {
		return Err(Error::InvalidConfig {
			message: "At least one index is required to search.".to_string(),
		});
	}
	if let Some(index) = indices.iter().find(|index| index.trim().is_empty() || index.contains('/'))
	{
		return Err(Error::InvalidConfig { message: format!("Invalid index name {index:?}.") });
	}

	Ok(format!(
		"{}/{}/_search?ignore_unavailable=true",
		api_base.trim_end_matches('/'),
		indices.join(",")
	))
}

// The backend reports shard-level failures with a 200 status and an `error` object.
fn check_search_response(json: Value) -> Result<Value> {
	if !json.is_object() {
		return Err(Error::InvalidResponse {
			message: "Search response must be a JSON object.".to_string(),
		});
	}
	if let Some(error) = json.get("error") {
		let reason = error
			.get("reason")
			.and_then(Value::as_str)
			.map(str::to_string)
			.unwrap_or_else(|| error.to_string());

		return Err(Error::InvalidResponse { message: format!("Search failed: {reason}") });
	}

	Ok(json)
}
