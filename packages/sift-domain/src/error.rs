pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Unknown merge strategy {value:?}; expected allFields, missingFields, or noFields.")]
	UnknownMergeStrategy { value: String },
	#[error("Invalid ignore field pattern {pattern:?}.")]
	InvalidIgnorePattern { pattern: String, source: regex::Error },
	#[error("Field {field} is malformed: {message}")]
	MalformedField { field: String, message: String },
}
