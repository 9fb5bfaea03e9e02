pub mod memory;
pub mod qdrant;

mod error;

pub use error::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Rejects embeddings whose length disagrees with the index, or that contain non-finite values.
pub fn check_embedding(expected: usize, embedding: &[f32]) -> Result<()> {
	if embedding.len() != expected {
		return Err(Error::DimensionMismatch { expected, actual: embedding.len() });
	}
	if embedding.iter().any(|value| !value.is_finite()) {
		return Err(Error::InvalidArgument("Embedding contains a non-finite value.".to_string()));
	}

	Ok(())
}

pub(crate) fn check_k(k: usize) -> Result<()> {
	if k == 0 {
		return Err(Error::InvalidArgument("k must be at least 1.".to_string()));
	}

	Ok(())
}
