pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid argument: {message}")]
	InvalidArgument { message: String },
	#[error("Embedding dimension mismatch: expected {expected}, got {actual}.")]
	DimensionMismatch { expected: usize, actual: usize },
	#[error("Vector store unavailable: {message}")]
	StoreUnavailable { message: String },
	#[error("Embedding provider unavailable: {message}")]
	EmbeddingUnavailable { message: String },
	#[error("Judgment provider unavailable: {message}")]
	JudgmentUnavailable { message: String },
	#[error(
		"Incomplete scoring: missing {missing:?}, duplicate {duplicate:?}, foreign {foreign:?}."
	)]
	IncompleteScoring { missing: Vec<usize>, duplicate: Vec<usize>, foreign: Vec<i64> },
	#[error("Candidate retrieval failed: {source}")]
	RetrievalFailed { source: Box<Error> },
}
impl Error {
	pub(crate) fn invalid_argument(message: impl Into<String>) -> Self {
		Self::InvalidArgument { message: message.into() }
	}

	pub(crate) fn judgment_unavailable(message: impl Into<String>) -> Self {
		Self::JudgmentUnavailable { message: message.into() }
	}

	/// Transient collaborator failures; everything else fails the same way on a second try.
	pub fn is_retryable(&self) -> bool {
		matches!(
			self,
			Self::StoreUnavailable { .. }
				| Self::EmbeddingUnavailable { .. }
				| Self::JudgmentUnavailable { .. }
		)
	}
}

impl From<lca_storage::Error> for Error {
	fn from(err: lca_storage::Error) -> Self {
		match err {
			lca_storage::Error::InvalidArgument(message) => Self::InvalidArgument { message },
			lca_storage::Error::DimensionMismatch { expected, actual } => {
				Self::DimensionMismatch { expected, actual }
			},
			err @ lca_storage::Error::MalformedPayload { .. } => {
				Self::StoreUnavailable { message: err.to_string() }
			},
			lca_storage::Error::Qdrant(inner) => Self::StoreUnavailable { message: inner.to_string() },
		}
	}
}
