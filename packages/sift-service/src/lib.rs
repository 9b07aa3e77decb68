pub mod alert;
pub mod execution_log;
pub mod preview;
pub mod reason;
pub mod search_response;
pub mod wrap_hits;

mod build_alert;
mod error;

use std::{future::Future, pin::Pin};

use serde_json::Value;

pub use alert::WrappedAlert;
pub use error::{Error, Result};
pub use execution_log::{RuleExecutionLogger, TracingExecutionLogger};
pub use preview::{ChartPoint, ChartSeries, ErrorRatePreviewParams};
pub use reason::{BoxError, BuildReasonMessage, FieldsReasonMessage, ReasonContext};
pub use search_response::{SearchResponse, parse_search_response};
pub use wrap_hits::{WrapHits, WrapHitsArgs};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait SearchBackend
where
	Self: Send + Sync,
{
	/// Runs one search request. `operation` names the caller for diagnostics.
	fn search<'a>(
		&'a self,
		operation: &'a str,
		indices: &'a [String],
		body: &'a Value,
	) -> BoxFuture<'a, Result<Value>>;
}

pub struct HttpSearchBackend {
	cfg: sift_config::Search,
}
impl HttpSearchBackend {
	pub fn new(cfg: sift_config::Search) -> Self {
		Self { cfg }
	}
}

impl SearchBackend for HttpSearchBackend {
	fn search<'a>(
		&'a self,
		operation: &'a str,
		indices: &'a [String],
		body: &'a Value,
	) -> BoxFuture<'a, Result<Value>> {
		Box::pin(async move {
			tracing::debug!(operation, indices = ?indices, "Sending search request.");

			let response = sift_providers::search::search(&self.cfg, indices, body).await;

			if let Err(err) = &response {
				tracing::warn!(operation, error = %err, "Search request failed.");
			}

			Ok(response?)
		})
	}
}
