use serde_json::{Map, Value};

use sift_domain::{fields, hit::SearchHit, rule::CompleteRule};

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// What a reason builder sees for one hit.
pub struct ReasonContext<'a> {
	pub rule: &'a CompleteRule,
	pub hit: &'a SearchHit,
	/// Hit data after merging and ignore-field removal, keyed by dotted path.
	pub fields: &'a Map<String, Value>,
}
impl ReasonContext<'_> {
	pub fn field(&self, path: &str) -> Option<String> {
		self.fields.get(path).and_then(fields::display_value)
	}
}

/// Produces the human-readable `kibana.alert.reason` text.
pub trait BuildReasonMessage {
	fn build(&self, context: &ReasonContext<'_>) -> Result<String, BoxError>;
}
impl<F> BuildReasonMessage for F
where
	F: Fn(&ReasonContext<'_>) -> Result<String, BoxError>,
{
	fn build(&self, context: &ReasonContext<'_>) -> Result<String, BoxError> {
		self(context)
	}
}

/// Describes the event from its well-known fields, e.g.
/// "authentication event with process sshd, source 10.0.0.5:22, by bob on web-1 created high
/// alert Suspicious login."
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldsReasonMessage;
impl BuildReasonMessage for FieldsReasonMessage {
	fn build(&self, context: &ReasonContext<'_>) -> Result<String, BoxError> {
		let mut description = match context.field("event.category") {
			Some(category) => format!("{category} event"),
			None => "Event".to_string(),
		};
		let mut details = Vec::new();

		if let Some(process) = context.field("process.name") {
			details.push(format!("process {process}"));
		}
		if let Some(parent) = context.field("process.parent.name") {
			details.push(format!("parent process {parent}"));
		}
		if let Some(file) = context.field("file.name") {
			details.push(format!("file {file}"));
		}
		if let Some(source) = endpoint(context, "source") {
			details.push(format!("source {source}"));
		}
		if let Some(destination) = endpoint(context, "destination") {
			details.push(format!("destination {destination}"));
		}

		if !details.is_empty() {
			description.push_str(" with ");
			description.push_str(&details.join(", "));
		}
		if let Some(user) = context.field("user.name") {
			if !details.is_empty() {
				description.push(',');
			}

			description.push_str(&format!(" by {user}"));
		}
		if let Some(host) = context.field("host.name") {
			description.push_str(&format!(" on {host}"));
		}

		Ok(format!(
			"{description} created {} alert {}.",
			context.rule.params.severity.as_str(),
			context.rule.name
		))
	}
}

fn endpoint(context: &ReasonContext<'_>, prefix: &str) -> Option<String> {
	let ip = context.field(&format!("{prefix}.ip"))?;

	match context.field(&format!("{prefix}.port")) {
		Some(port) => Some(format!("{ip}:{port}")),
		None => Some(ip),
	}
}
