use serde_json::Value;

use crate::{Error, LcaService, Result, retry};
use lca_domain::description;
use lca_providers::JudgmentRequest;

const PARAPHRASE_SCHEMA_NAME: &str = "paraphrased_description";
const PARAPHRASE_INSTRUCTIONS: &str = "\
You are a Life Cycle Assessment expert preparing purchased items for a process-based assessment.
Rewrite the item description as a short plain-language phrase.
- Technical, abbreviated, or code-like descriptions become a clear descriptive phrase.
- A description that is already plain language is returned exactly as given.
- Keep every distinguishing noun and qualifier: \"date sugar\" stays \"date sugar\", never \"sugar\".
- Expand material codes into their common names, e.g. \"aPET\" becomes \"amorphous PET plastic\".
Respond with a JSON object whose \"text\" field holds the phrase.";

impl LcaService {
	/// Turns a raw description into the plain-language form used for retrieval and scoring.
	///
	/// Already-plain descriptions come back unchanged.
	pub async fn paraphrase(&self, raw: &str) -> Result<String> {
		let normalized = description::normalize_whitespace(raw);

		if normalized.is_empty() {
			return Err(Error::invalid_argument("Item description must not be empty."));
		}

		let cfg = &self.cfg.paraphrase;

		if !cfg.enabled {
			return Ok(normalized);
		}
		if cfg.skip_plain_input && description::is_plain_description(&normalized) {
			tracing::debug!(description = %normalized, "Description is already plain.");

			return Ok(normalized);
		}

		let request = &paraphrase_request(&normalized);
		let text = retry::with_retry(&self.cfg.retry, "paraphrase", move || async move {
			parse_paraphrase(self.call_judgment(request).await?)
		})
		.await?;

		tracing::info!(input = %normalized, description = %text, "Paraphrased item description.");

		Ok(text)
	}
}

fn paraphrase_request(description: &str) -> JudgmentRequest {
	JudgmentRequest {
		instructions: PARAPHRASE_INSTRUCTIONS.to_string(),
		contents: vec![format!("item description: {description}")],
		schema_name: PARAPHRASE_SCHEMA_NAME.to_string(),
		schema: serde_json::json!({
			"type": "object",
			"properties": { "text": { "type": "string" } },
			"required": ["text"],
			"additionalProperties": false,
		}),
	}
}

fn parse_paraphrase(value: Value) -> Result<String> {
	let text = value
		.get("text")
		.and_then(Value::as_str)
		.map(description::normalize_whitespace)
		.unwrap_or_default();

	if text.is_empty() {
		return Err(Error::judgment_unavailable(
			"Paraphrase response is missing a non-empty text field.",
		));
	}

	Ok(text)
}
