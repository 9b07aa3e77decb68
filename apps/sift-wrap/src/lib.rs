use std::{
	fs,
	path::{Path, PathBuf},
	sync::Arc,
};

use clap::{Parser, Subcommand};
use color_eyre::eyre::WrapErr;
use serde::de::DeserializeOwned;
use serde_json::Value;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use sift_config::Config;
use sift_domain::{hit::SearchHit, rule::CompleteRule};
use sift_service::{
	FieldsReasonMessage, HttpSearchBackend, TracingExecutionLogger, WrapHits, WrapHitsArgs,
	preview::{self, ErrorRatePreviewParams},
};

#[derive(Debug, Parser)]
#[command(
	version = sift_cli::VERSION,
	rename_all = "kebab",
	styles = sift_cli::styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
	#[command(subcommand)]
	pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
	/// Wrap search hits into alerts for one rule and print them as JSON.
	Hits(HitsArgs),
	/// Run the transaction error-rate chart preview against the search backend.
	Preview(PreviewArgs),
}

#[derive(Debug, clap::Args)]
pub struct HitsArgs {
	#[arg(long, value_name = "FILE")]
	pub rule: PathBuf,
	/// A raw search response, or a JSON array of hits.
	#[arg(long, value_name = "FILE")]
	pub hits: PathBuf,
	#[arg(long, value_name = "ID")]
	pub space_id: Option<String>,
	/// Defaults to the rule's index patterns.
	#[arg(long = "index", value_name = "NAME")]
	pub indices: Vec<String>,
	#[arg(long, value_name = "RFC3339", value_parser = parse_timestamp)]
	pub timestamp_override: Option<OffsetDateTime>,
	#[arg(long, value_name = "UUID")]
	pub execution_id: Option<Uuid>,
}

#[derive(Debug, clap::Args)]
pub struct PreviewArgs {
	#[arg(long, value_name = "FILE")]
	pub params: PathBuf,
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = sift_config::load(&args.config)?;
	let filter =
		EnvFilter::try_new(&config.service.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

	tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

	let output = match args.command {
		Command::Hits(hits) => wrap_hits(&config, hits)?,
		Command::Preview(params) => run_preview(&config, params).await?,
	};

	println!("{}", serde_json::to_string_pretty(&output)?);

	Ok(())
}

pub fn wrap_hits(config: &Config, args: HitsArgs) -> color_eyre::Result<Value> {
	let rule: CompleteRule = read_json(&args.rule)?;
	let hits = load_hits(read_json(&args.hits)?)?;
	let space_id = args.space_id.or_else(|| config.alerts.space_id.clone());
	let execution_id = args.execution_id.unwrap_or_else(Uuid::new_v4);
	let logger =
		Arc::new(TracingExecutionLogger::new(&rule, space_id.as_deref(), Some(execution_id)));
	let mut wrap_args = WrapHitsArgs::from_config(&config.alerts, rule, logger);

	wrap_args.space_id = space_id;
	wrap_args.alert_timestamp_override = args.timestamp_override;
	wrap_args.execution_id = Some(execution_id);

	if !args.indices.is_empty() {
		wrap_args.indices_to_query = args.indices;
	}

	let alerts = WrapHits::new(wrap_args)?.wrap(&hits, &FieldsReasonMessage)?;

	tracing::info!(hits = hits.len(), alerts = alerts.len(), %execution_id, "Wrapped hits.");

	Ok(serde_json::to_value(alerts)?)
}

pub async fn run_preview(config: &Config, args: PreviewArgs) -> color_eyre::Result<Value> {
	let params: ErrorRatePreviewParams = read_json(&args.params)?;
	let backend = HttpSearchBackend::new(config.search.clone());
	let series =
		preview::transaction_error_rate_chart_preview(&backend, &config.preview, &params).await?;

	tracing::info!(series = series.len(), "Built error rate preview.");

	Ok(serde_json::to_value(series)?)
}

/// Accepts either a JSON array of hits or a whole search response.
pub fn load_hits(value: Value) -> color_eyre::Result<Vec<SearchHit>> {
	match value {
		Value::Array(_) => Ok(serde_json::from_value(value)?),
		other => Ok(sift_service::parse_search_response(other)?.hits),
	}
}

fn read_json<T>(path: &Path) -> color_eyre::Result<T>
where
	T: DeserializeOwned,
{
	let raw = fs::read_to_string(path)
		.wrap_err_with(|| format!("Failed to read {}.", path.display()))?;

	serde_json::from_str(&raw).wrap_err_with(|| format!("Failed to parse {}.", path.display()))
}

fn parse_timestamp(raw: &str) -> Result<OffsetDateTime, time::error::Parse> {
	OffsetDateTime::parse(raw, &Rfc3339)
}
