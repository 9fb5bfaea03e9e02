use std::env;

use serde_json::{Map, Value};
use uuid::Uuid;

use lca_config::{
	Catalog, Config, EmbeddingProviderConfig, LlmProviderConfig, Paraphrase, Providers, Qdrant,
	Ranking, RankingCache, Retrieval, Retry, Service, Storage,
};
use lca_domain::ReferenceProduct;
use lca_providers::JudgmentRequest;

pub fn env_qdrant_url() -> Option<String> {
	env::var("LCA_QDRANT_URL").ok()
}

/// A collection name that does not collide with other test runs.
pub fn collection_name(prefix: &str) -> String {
	format!("{prefix}_{}", Uuid::new_v4().simple())
}

/// A complete config on the memory backend with fast retries and short timeouts.
pub fn test_config(vector_dim: u32) -> Config {
	Config {
		service: Service { log_level: "info".to_string() },
		storage: Storage {
			backend: "memory".to_string(),
			qdrant: Qdrant {
				url: "http://127.0.0.1:6334".to_string(),
				collection: "lca_test".to_string(),
				vector_dim,
				timeout_ms: 1_000,
			},
		},
		providers: Providers {
			embedding: dummy_embedding_provider(vector_dim),
			judgment: dummy_judgment_provider(),
		},
		retrieval: Retrieval { candidate_k: 10 },
		ranking: Ranking {
			reference_product_top_n: 5,
			impact_factor_top_n: 2,
			cache: RankingCache { enabled: false, max_entries: 16 },
		},
		paraphrase: Paraphrase { enabled: true, skip_plain_input: true },
		retry: Retry { max_attempts: 3, initial_backoff_ms: 1, max_backoff_ms: 4 },
		catalog: Catalog { embed_batch_size: 2 },
	}
}

pub fn dummy_embedding_provider(dimensions: u32) -> EmbeddingProviderConfig {
	EmbeddingProviderConfig {
		provider_id: "test".to_string(),
		api_base: "http://127.0.0.1:1".to_string(),
		api_key: "test-key".to_string(),
		path: "/".to_string(),
		model: "test".to_string(),
		dimensions,
		timeout_ms: 1_000,
		default_headers: Map::new(),
	}
}

pub fn dummy_judgment_provider() -> LlmProviderConfig {
	LlmProviderConfig {
		provider_id: "test".to_string(),
		api_base: "http://127.0.0.1:1".to_string(),
		api_key: "test-key".to_string(),
		path: "/".to_string(),
		model: "test".to_string(),
		temperature: 0.1,
		seed: 5,
		timeout_ms: 1_000,
		default_headers: Map::new(),
	}
}

/// Deterministic bag-of-words embedding: every lowercase token adds a signed unit to a
/// blake3-chosen dimension. Texts sharing tokens land close together in cosine space.
pub fn hash_embedding(text: &str, dim: usize) -> Vec<f32> {
	let dim = dim.max(1);
	let mut vec = vec![0.0; dim];

	for token in text.split(|c: char| !c.is_alphanumeric()).filter(|token| !token.is_empty()) {
		let hash = blake3::hash(token.to_lowercase().as_bytes());
		let bytes = hash.as_bytes();
		let slot = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as usize % dim;
		let sign = if bytes[4] & 1 == 0 { 1.0 } else { -1.0 };

		vec[slot] += sign;
	}

	if vec.iter().all(|value| *value == 0.0) {
		vec[0] = 1.0;
	}

	vec
}

/// The three-record catalog behind the popcorn scenario.
pub fn popcorn_catalog() -> Vec<ReferenceProduct> {
	vec![
		ReferenceProduct::new("0", "sweet corn").with_impact_factor(
			"market for sweet corn",
			"The product 'sweet corn' is a vegetable. It is an annual crop.",
		),
		ReferenceProduct::new("1", "maize grain").with_impact_factor(
			"market for maize grain",
			"The product 'maize grain' is a cereal. It is an annual crop.",
		),
		ReferenceProduct::new("2", "maize grain, organic").with_impact_factor(
			"maize grain production, organic",
			"The product 'maize grain, organic' is a cereal grown under organic practice.",
		),
	]
}

/// Candidate descriptors sent in a scoring request, in local-index order.
pub fn request_candidates(request: &JudgmentRequest) -> Vec<Value> {
	request
		.contents
		.iter()
		.skip(1)
		.find_map(|content| content.split_once(": "))
		.and_then(|(_, raw)| serde_json::from_str::<Vec<Value>>(raw).ok())
		.unwrap_or_default()
}

/// A scoring response built from `(index, score, justification)` triples.
pub fn scores_response(
	score_field: &str,
	justification_field: &str,
	items: &[(i64, f32, &str)],
) -> Value {
	let items: Vec<Value> = items
		.iter()
		.map(|(index, score, justification)| {
			let mut item = Map::new();

			item.insert("index".to_string(), Value::from(*index));
			item.insert(score_field.to_string(), Value::from(*score as f64));
			item.insert(justification_field.to_string(), Value::from(*justification));

			Value::Object(item)
		})
		.collect();

	serde_json::json!({ "items": items })
}

/// Scores every candidate in `request` by looking up `key` in `scores`; unknown names get 0.0.
pub fn score_by_name(
	request: &JudgmentRequest,
	key: &str,
	score_field: &str,
	justification_field: &str,
	scores: &[(&str, f32)],
) -> Value {
	let items: Vec<(i64, f32, &str)> = request_candidates(request)
		.iter()
		.filter_map(|candidate| {
			let index = candidate.get("index")?.as_i64()?;
			let name = candidate.get(key).and_then(Value::as_str).unwrap_or_default();
			let score = scores
				.iter()
				.find(|(candidate_name, _)| *candidate_name == name)
				.map(|(_, score)| *score)
				.unwrap_or(0.0);

			Some((index, score, "scored by name"))
		})
		.collect();

	scores_response(score_field, justification_field, &items)
}

/// One JSON Lines document with a record per line.
pub fn catalog_jsonl(records: &[ReferenceProduct]) -> String {
	records
		.iter()
		.filter_map(|record| serde_json::to_string(record).ok())
		.map(|line| format!("{line}\n"))
		.collect()
}
