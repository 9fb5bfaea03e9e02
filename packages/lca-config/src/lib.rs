mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Catalog, Config, EmbeddingProviderConfig, LlmProviderConfig, Paraphrase, Providers, Qdrant,
	Ranking, RankingCache, Retrieval, Retry, Service, Storage,
};

use std::{fs, path::Path};

pub const STORAGE_BACKENDS: [&str; 2] = ["qdrant", "memory"];

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.log_level.trim().is_empty() {
		return Err(Error::validation("service.log_level", "must be non-empty."));
	}
	if !STORAGE_BACKENDS.contains(&cfg.storage.backend.as_str()) {
		return Err(Error::validation("storage.backend", "must be one of qdrant or memory."));
	}
	if cfg.storage.backend == "qdrant" {
		if cfg.storage.qdrant.url.trim().is_empty() {
			return Err(Error::validation("storage.qdrant.url", "must be non-empty."));
		}
		if cfg.storage.qdrant.collection.trim().is_empty() {
			return Err(Error::validation("storage.qdrant.collection", "must be non-empty."));
		}
	}
	if cfg.storage.qdrant.timeout_ms == 0 {
		return Err(Error::validation("storage.qdrant.timeout_ms", "must be greater than zero."));
	}
	if cfg.providers.embedding.dimensions == 0 {
		return Err(Error::validation(
			"providers.embedding.dimensions",
			"must be greater than zero.",
		));
	}
	if cfg.providers.embedding.dimensions != cfg.storage.qdrant.vector_dim {
		return Err(Error::validation(
			"providers.embedding.dimensions",
			"must match storage.qdrant.vector_dim.",
		));
	}

	let temperature = cfg.providers.judgment.temperature;

	if !temperature.is_finite() {
		return Err(Error::validation("providers.judgment.temperature", "must be a finite number."));
	}
	if !(0.0..=2.0).contains(&temperature) {
		return Err(Error::validation(
			"providers.judgment.temperature",
			"must be in the range 0.0-2.0.",
		));
	}

	for (key, timeout_ms) in [
		("providers.embedding.timeout_ms", cfg.providers.embedding.timeout_ms),
		("providers.judgment.timeout_ms", cfg.providers.judgment.timeout_ms),
	] {
		if timeout_ms == 0 {
			return Err(Error::validation(key, "must be greater than zero."));
		}
	}
	for (key, api_key) in [
		("providers.embedding.api_key", &cfg.providers.embedding.api_key),
		("providers.judgment.api_key", &cfg.providers.judgment.api_key),
	] {
		if api_key.trim().is_empty() {
			return Err(Error::validation(key, "must be non-empty."));
		}
	}

	if cfg.ranking.impact_factor_top_n == 0 {
		return Err(Error::validation("ranking.impact_factor_top_n", "must be greater than zero."));
	}
	if cfg.ranking.reference_product_top_n < cfg.ranking.impact_factor_top_n {
		return Err(Error::validation(
			"ranking.reference_product_top_n",
			"must be greater than or equal to ranking.impact_factor_top_n.",
		));
	}
	if cfg.retrieval.candidate_k < cfg.ranking.reference_product_top_n {
		return Err(Error::validation(
			"retrieval.candidate_k",
			"must be greater than or equal to ranking.reference_product_top_n.",
		));
	}
	if cfg.ranking.cache.enabled && cfg.ranking.cache.max_entries == 0 {
		return Err(Error::validation(
			"ranking.cache.max_entries",
			"must be greater than zero when the cache is enabled.",
		));
	}
	if cfg.retry.max_attempts == 0 {
		return Err(Error::validation("retry.max_attempts", "must be greater than zero."));
	}
	if cfg.retry.initial_backoff_ms > cfg.retry.max_backoff_ms {
		return Err(Error::validation(
			"retry.initial_backoff_ms",
			"must be less than or equal to retry.max_backoff_ms.",
		));
	}
	if cfg.catalog.embed_batch_size == 0 {
		return Err(Error::validation("catalog.embed_batch_size", "must be greater than zero."));
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	cfg.storage.backend = cfg.storage.backend.trim().to_ascii_lowercase();

	for api_base in
		[&mut cfg.providers.embedding.api_base, &mut cfg.providers.judgment.api_base]
	{
		let trimmed = api_base.trim().trim_end_matches('/').to_string();

		*api_base = trimmed;
	}
}
