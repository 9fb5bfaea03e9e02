#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid argument: {0}")]
	InvalidArgument(String),
	#[error("Embedding dimension mismatch: expected {expected}, got {actual}.")]
	DimensionMismatch { expected: usize, actual: usize },
	#[error("Malformed catalog payload on point {point}: {message}")]
	MalformedPayload { point: String, message: String },
	#[error(transparent)]
	Qdrant(#[from] Box<qdrant_client::QdrantError>),
}
impl From<qdrant_client::QdrantError> for Error {
	fn from(err: qdrant_client::QdrantError) -> Self {
		Self::Qdrant(Box::new(err))
	}
}
