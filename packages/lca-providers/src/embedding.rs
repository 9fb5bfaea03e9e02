use std::time::Duration;

use reqwest::Client;
use serde_json::Value;

use crate::{Error, Result};

/// Embeds `texts` in one request against an OpenAI-compatible embeddings endpoint.
///
/// Vectors come back in input order regardless of the order the provider lists them in.
pub async fn embed(
	cfg: &lca_config::EmbeddingProviderConfig,
	texts: &[String],
) -> Result<Vec<Vec<f32>>> {
	if texts.is_empty() {
		return Ok(Vec::new());
	}

	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let body = serde_json::json!({
		"model": cfg.model,
		"input": texts,
		"dimensions": cfg.dimensions,
	});
	let res = client
		.post(url)
		.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
		.json(&body)
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;
	let vectors = parse_embedding_response(json)?;

	if vectors.len() != texts.len() {
		return Err(Error::invalid_response(format!(
			"Embedding provider returned {} vectors for {} inputs.",
			vectors.len(),
			texts.len()
		)));
	}

	Ok(vectors)
}

fn parse_embedding_response(json: Value) -> Result<Vec<Vec<f32>>> {
	let data = json
		.get("data")
		.and_then(|v| v.as_array())
		.ok_or_else(|| Error::invalid_response("Embedding response is missing data array."))?;

	let mut indexed: Vec<(usize, Vec<f32>)> = Vec::with_capacity(data.len());
	for (fallback_index, item) in data.iter().enumerate() {
		let index = item
			.get("index")
			.and_then(|v| v.as_u64())
			.map(|v| v as usize)
			.unwrap_or(fallback_index);
		let embedding = item
			.get("embedding")
			.and_then(|v| v.as_array())
			.ok_or_else(|| Error::invalid_response("Embedding item missing embedding array."))?;
		let mut vec = Vec::with_capacity(embedding.len());
		for value in embedding {
			let number = value
				.as_f64()
				.ok_or_else(|| Error::invalid_response("Embedding value must be numeric."))?;
			vec.push(number as f32);
		}
		indexed.push((index, vec));
	}

	indexed.sort_by_key(|(index, _)| *index);

	Ok(indexed.into_iter().map(|(_, vec)| vec).collect())
}
