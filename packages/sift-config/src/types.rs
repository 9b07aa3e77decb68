use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Clone, Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub alerts: Alerts,
	pub search: Search,
	#[serde(default)]
	pub preview: Preview,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Service {
	pub log_level: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Alerts {
	/// Exact dotted field paths, or `/regex/` patterns, removed from hit data before it is
	/// copied into an alert.
	#[serde(default)]
	pub ignore_fields: Vec<String>,
	/// One of "allFields", "missingFields", or "noFields".
	#[serde(default = "default_merge_strategy")]
	pub merge_strategy: String,
	/// Optional. Used when the caller does not name a space explicitly.
	pub space_id: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Search {
	pub api_base: String,
	pub api_key: Option<String>,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Preview {
	pub max_series: u32,
	pub use_aggregated_transactions: bool,
	pub transaction_indices: Vec<String>,
	pub metric_indices: Vec<String>,
}
impl Default for Preview {
	fn default() -> Self {
		Self {
			max_series: 3,
			use_aggregated_transactions: false,
			transaction_indices: vec!["traces-apm*".to_string()],
			metric_indices: vec!["metrics-apm*".to_string()],
		}
	}
}

fn default_merge_strategy() -> String {
	"missingFields".to_string()
}
