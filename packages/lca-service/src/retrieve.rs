use crate::{Error, LcaService, Result};
use lca_domain::ReferenceProduct;

/// Candidates in retrieval order. A candidate's position is its local index, the only handle
/// the judgment provider ever sees.
#[derive(Clone, Debug, PartialEq)]
pub struct CandidateSet<C> {
	candidates: Vec<C>,
}
impl<C> CandidateSet<C> {
	pub fn new(candidates: Vec<C>) -> Self {
		Self { candidates }
	}

	pub fn len(&self) -> usize {
		self.candidates.len()
	}

	pub fn is_empty(&self) -> bool {
		self.candidates.is_empty()
	}

	pub fn get(&self, index: usize) -> Option<&C> {
		self.candidates.get(index)
	}

	pub fn iter(&self) -> impl Iterator<Item = &C> {
		self.candidates.iter()
	}

	/// Pairs each candidate with its local index.
	pub fn iter_indexed(&self) -> impl Iterator<Item = (usize, &C)> {
		self.candidates.iter().enumerate()
	}

	pub fn into_vec(self) -> Vec<C> {
		self.candidates
	}
}

impl<C> From<Vec<C>> for CandidateSet<C> {
	fn from(candidates: Vec<C>) -> Self {
		Self::new(candidates)
	}
}

impl LcaService {
	/// Nearest catalog records for an already-normalized description, closest first.
	///
	/// Every failure is reported as [`Error::RetrievalFailed`] carrying the underlying cause.
	pub async fn retrieve(
		&self,
		description: &str,
		k: usize,
	) -> Result<CandidateSet<ReferenceProduct>> {
		self.retrieve_inner(description, k)
			.await
			.map_err(|err| Error::RetrievalFailed { source: Box::new(err) })
	}

	async fn retrieve_inner(
		&self,
		description: &str,
		k: usize,
	) -> Result<CandidateSet<ReferenceProduct>> {
		if k == 0 {
			return Err(Error::invalid_argument("k must be at least 1."));
		}

		let texts = [description.to_string()];
		let vectors = self.embed_texts(&texts).await?;
		let Some(embedding) = vectors.first() else {
			return Err(Error::EmbeddingUnavailable {
				message: "Embedding provider returned no vectors.".to_string(),
			});
		};
		let records = self.query_index(embedding, k).await?;

		tracing::info!(description, k, candidates = records.len(), "Retrieved candidates.");

		Ok(CandidateSet::new(records))
	}
}
