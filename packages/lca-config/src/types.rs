use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Clone, Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	pub providers: Providers,
	#[serde(default)]
	pub retrieval: Retrieval,
	#[serde(default)]
	pub ranking: Ranking,
	#[serde(default)]
	pub paraphrase: Paraphrase,
	#[serde(default)]
	pub retry: Retry,
	#[serde(default)]
	pub catalog: Catalog,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Service {
	pub log_level: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Storage {
	/// Either "qdrant" or "memory". The memory backend does not persist across processes.
	#[serde(default = "default_storage_backend")]
	pub backend: String,
	pub qdrant: Qdrant,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Qdrant {
	pub url: String,
	pub collection: String,
	pub vector_dim: u32,
	#[serde(default = "default_store_timeout_ms")]
	pub timeout_ms: u64,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Providers {
	pub embedding: EmbeddingProviderConfig,
	pub judgment: LlmProviderConfig,
}

#[derive(Clone, Debug, Deserialize)]
pub struct EmbeddingProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub dimensions: u32,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct LlmProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub temperature: f32,
	/// Fixed together with `temperature` so that repeated judgments are reproducible.
	#[serde(default = "default_seed")]
	pub seed: u64,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Retrieval {
	pub candidate_k: u32,
}
impl Default for Retrieval {
	fn default() -> Self {
		Self { candidate_k: 10 }
	}
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Ranking {
	pub reference_product_top_n: u32,
	pub impact_factor_top_n: u32,
	pub cache: RankingCache,
}
impl Default for Ranking {
	fn default() -> Self {
		Self { reference_product_top_n: 5, impact_factor_top_n: 2, cache: RankingCache::default() }
	}
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct RankingCache {
	pub enabled: bool,
	pub max_entries: u32,
}
impl Default for RankingCache {
	fn default() -> Self {
		Self { enabled: false, max_entries: 1_024 }
	}
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Paraphrase {
	pub enabled: bool,
	/// Return already-plain descriptions unchanged without asking the judgment provider.
	pub skip_plain_input: bool,
}
impl Default for Paraphrase {
	fn default() -> Self {
		Self { enabled: true, skip_plain_input: true }
	}
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Retry {
	pub max_attempts: u32,
	pub initial_backoff_ms: u64,
	pub max_backoff_ms: u64,
}
impl Default for Retry {
	fn default() -> Self {
		Self { max_attempts: 3, initial_backoff_ms: 200, max_backoff_ms: 2_000 }
	}
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Catalog {
	pub embed_batch_size: u32,
}
impl Default for Catalog {
	fn default() -> Self {
		Self { embed_batch_size: 32 }
	}
}

fn default_storage_backend() -> String {
	"qdrant".to_string()
}

fn default_store_timeout_ms() -> u64 {
	10_000
}

fn default_seed() -> u64 {
	5
}
