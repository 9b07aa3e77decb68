use crate::reason::BoxError;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Hit at position {position} is missing required field {field}.")]
	MissingHitField { position: usize, field: &'static str },
	#[error("Hit at position {position} has malformed field {field}: {message}")]
	MalformedHitField { position: usize, field: String, message: String },
	#[error("Invalid config: {message}")]
	InvalidConfig { message: String },
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("Reason message builder failed for hit {hit_id}.")]
	ReasonMessage { hit_id: String, source: BoxError },
	#[error("Search error: {message}")]
	Search { message: String },
	#[error("Invalid search response: {message}")]
	InvalidResponse { message: String },
	#[error("Failed to format alert timestamp.")]
	Timestamp(#[from] time::error::Format),
	#[error(transparent)]
	SerdeJson(#[from] serde_json::Error),
}
impl From<sift_providers::Error> for Error {
	fn from(err: sift_providers::Error) -> Self {
		match err {
			sift_providers::Error::InvalidConfig { message } => Self::InvalidConfig { message },
			sift_providers::Error::InvalidResponse { message } => Self::InvalidResponse { message },
			other => Self::Search { message: other.to_string() },
		}
	}
}

impl From<sift_domain::Error> for Error {
	fn from(err: sift_domain::Error) -> Self {
		match err {
			sift_domain::Error::MalformedField { field, message } =>
				Self::InvalidRequest { message: format!("{field} is malformed: {message}") },
			other => Self::InvalidConfig { message: other.to_string() },
		}
	}
}
