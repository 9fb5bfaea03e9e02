pub mod ingest;
pub mod paraphrase;
pub mod pipeline;
pub mod rank;
pub mod retrieve;
pub mod retry;

mod error;

pub use error::{Error, Result};
pub use ingest::IngestReport;
pub use pipeline::{MatchResponse, RankedReferenceProduct, Recommendation};
pub use rank::{
	IMPACT_FACTOR_CONTRACT, REFERENCE_PRODUCT_CONTRACT, RankCandidate, ScoreContract, Scored,
};
pub use retrieve::CandidateSet;

use std::{future::Future, pin::Pin, sync::Arc};

use serde_json::Value;

use lca_config::{Config, EmbeddingProviderConfig, LlmProviderConfig};
use lca_domain::ReferenceProduct;
use lca_providers::{JudgmentRequest, embedding, judgment};
use lca_storage::{memory::MemoryIndex, qdrant::QdrantStore};
use rank::cache::JudgmentCache;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait EmbeddingProvider
where
	Self: Send + Sync,
{
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, Result<Vec<Vec<f32>>>>;
}

/// The generative model used for paraphrasing and relevance scoring.
pub trait JudgmentProvider
where
	Self: Send + Sync,
{
	fn judge<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		request: &'a JudgmentRequest,
	) -> BoxFuture<'a, Result<Value>>;
}

/// Nearest-neighbor store over catalog records, keyed by catalog id.
pub trait VectorIndex
where
	Self: Send + Sync,
{
	fn upsert<'a>(
		&'a self,
		record: &'a ReferenceProduct,
		embedding: &'a [f32],
	) -> BoxFuture<'a, Result<()>>;

	fn query<'a>(
		&'a self,
		embedding: &'a [f32],
		k: usize,
	) -> BoxFuture<'a, Result<Vec<ReferenceProduct>>>;
}

#[derive(Clone)]
pub struct Providers {
	pub embedding: Arc<dyn EmbeddingProvider>,
	pub judgment: Arc<dyn JudgmentProvider>,
}
impl Providers {
	pub fn new(embedding: Arc<dyn EmbeddingProvider>, judgment: Arc<dyn JudgmentProvider>) -> Self {
		Self { embedding, judgment }
	}
}

impl Default for Providers {
	fn default() -> Self {
		let provider = Arc::new(DefaultProviders);

		Self { embedding: provider.clone(), judgment: provider }
	}
}

pub struct LcaService {
	pub cfg: Config,
	pub index: Arc<dyn VectorIndex>,
	pub providers: Providers,
	cache: Option<JudgmentCache>,
}
impl LcaService {
	pub fn new(cfg: Config, index: Arc<dyn VectorIndex>) -> Self {
		Self::with_providers(cfg, index, Providers::default())
	}

	pub fn with_providers(cfg: Config, index: Arc<dyn VectorIndex>, providers: Providers) -> Self {
		let cache = cfg
			.ranking
			.cache
			.enabled
			.then(|| JudgmentCache::new(cfg.ranking.cache.max_entries as usize));

		Self { cfg, index, providers, cache }
	}

	/// Embeds `texts` and checks that every vector has the configured dimensionality.
	pub(crate) async fn embed_texts(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
		let cfg = &self.cfg.providers.embedding;
		let provider = &self.providers.embedding;
		let vectors = retry::with_retry(&self.cfg.retry, "embed", move || async move {
			retry::with_timeout(
				cfg.timeout_ms,
				|message| Error::EmbeddingUnavailable { message },
				provider.embed(cfg, texts),
			)
			.await
		})
		.await?;

		if vectors.len() != texts.len() {
			return Err(Error::EmbeddingUnavailable {
				message: format!(
					"Embedding provider returned {} vectors for {} inputs.",
					vectors.len(),
					texts.len()
				),
			});
		}

		let expected = cfg.dimensions as usize;

		for vector in &vectors {
			if vector.len() != expected {
				return Err(Error::DimensionMismatch { expected, actual: vector.len() });
			}
		}

		Ok(vectors)
	}

	pub(crate) async fn query_index(
		&self,
		embedding: &[f32],
		k: usize,
	) -> Result<Vec<ReferenceProduct>> {
		let index = &self.index;
		let timeout_ms = self.cfg.storage.qdrant.timeout_ms;

		retry::with_retry(&self.cfg.retry, "index_query", move || async move {
			retry::with_timeout(
				timeout_ms,
				|message| Error::StoreUnavailable { message },
				index.query(embedding, k),
			)
			.await
		})
		.await
	}

	pub(crate) async fn upsert_index(&self, record: &ReferenceProduct, embedding: &[f32]) -> Result<()> {
		let index = &self.index;
		let timeout_ms = self.cfg.storage.qdrant.timeout_ms;

		retry::with_retry(&self.cfg.retry, "index_upsert", move || async move {
			retry::with_timeout(
				timeout_ms,
				|message| Error::StoreUnavailable { message },
				index.upsert(record, embedding),
			)
			.await
		})
		.await
	}

	/// One judgment call bounded by the provider timeout. Callers own the retry loop so that
	/// response validation is retried together with the call.
	pub(crate) async fn call_judgment(&self, request: &JudgmentRequest) -> Result<Value> {
		let cfg = &self.cfg.providers.judgment;

		retry::with_timeout(
			cfg.timeout_ms,
			|message| Error::JudgmentUnavailable { message },
			self.providers.judgment.judge(cfg, request),
		)
		.await
	}

	pub(crate) fn cache(&self) -> Option<&JudgmentCache> {
		self.cache.as_ref()
	}
}

struct DefaultProviders;
impl EmbeddingProvider for DefaultProviders {
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, Result<Vec<Vec<f32>>>> {
		Box::pin(async move {
			embedding::embed(cfg, texts)
				.await
				.map_err(|err| Error::EmbeddingUnavailable { message: err.to_string() })
		})
	}
}
impl JudgmentProvider for DefaultProviders {
	fn judge<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		request: &'a JudgmentRequest,
	) -> BoxFuture<'a, Result<Value>> {
		Box::pin(async move {
			judgment::judge(cfg, request)
				.await
				.map_err(|err| Error::judgment_unavailable(err.to_string()))
		})
	}
}

impl VectorIndex for QdrantStore {
	fn upsert<'a>(
		&'a self,
		record: &'a ReferenceProduct,
		embedding: &'a [f32],
	) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move { Ok(self.upsert_record(record, embedding).await?) })
	}

	fn query<'a>(
		&'a self,
		embedding: &'a [f32],
		k: usize,
	) -> BoxFuture<'a, Result<Vec<ReferenceProduct>>> {
		Box::pin(async move { Ok(self.query_nearest(embedding, k).await?) })
	}
}

impl VectorIndex for MemoryIndex {
	fn upsert<'a>(
		&'a self,
		record: &'a ReferenceProduct,
		embedding: &'a [f32],
	) -> BoxFuture<'a, Result<()>> {
		let result = self.upsert_record(record, embedding).map_err(Error::from);

		Box::pin(async move { result })
	}

	fn query<'a>(
		&'a self,
		embedding: &'a [f32],
		k: usize,
	) -> BoxFuture<'a, Result<Vec<ReferenceProduct>>> {
		let result = self.query_nearest(embedding, k).map_err(Error::from);

		Box::pin(async move { result })
	}
}

/// Opens the configured storage backend. Qdrant collections are created on first use.
pub async fn open_index(cfg: &Config) -> Result<Arc<dyn VectorIndex>> {
	match cfg.storage.backend.as_str() {
		"memory" => Ok(Arc::new(MemoryIndex::with_dimensions(cfg.storage.qdrant.vector_dim as usize))),
		"qdrant" => {
			let store = QdrantStore::new(&cfg.storage.qdrant)?;

			retry::with_timeout(
				cfg.storage.qdrant.timeout_ms,
				|message| Error::StoreUnavailable { message },
				async { Ok(store.ensure_collection().await?) },
			)
			.await?;

			Ok(Arc::new(store))
		},
		other => Err(Error::invalid_argument(format!("Unsupported storage backend {other:?}."))),
	}
}
