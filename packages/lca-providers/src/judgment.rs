use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

use crate::{Error, Result};

/// A structured-output request to the judgment model.
#[derive(Clone, Debug, Serialize)]
pub struct JudgmentRequest {
	/// Task instructions, sent as the system message.
	pub instructions: String,
	/// User message parts, joined by blank lines.
	pub contents: Vec<String>,
	/// Name under which `schema` is registered with the provider.
	pub schema_name: String,
	/// JSON schema the response must conform to exactly.
	pub schema: Value,
}
impl JudgmentRequest {
	pub fn messages(&self) -> Vec<Value> {
		vec![
			serde_json::json!({ "role": "system", "content": self.instructions }),
			serde_json::json!({ "role": "user", "content": self.contents.join("\n\n") }),
		]
	}
}

/// Sends one chat-completions request with a strict JSON schema and returns the parsed
/// message content.
pub async fn judge(cfg: &lca_config::LlmProviderConfig, request: &JudgmentRequest) -> Result<Value> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let body = serde_json::json!({
		"model": cfg.model,
		"temperature": cfg.temperature,
		"seed": cfg.seed,
		"messages": request.messages(),
		"response_format": {
			"type": "json_schema",
			"json_schema": {
				"name": request.schema_name,
				"strict": true,
				"schema": request.schema,
			},
		},
	});
	let res = client
		.post(&url)
		.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
		.json(&body)
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;

	parse_judgment_json(json)
}

fn parse_judgment_json(json: Value) -> Result<Value> {
	let message = json
		.get("choices")
		.and_then(|v| v.as_array())
		.and_then(|arr| arr.first())
		.and_then(|choice| choice.get("message"))
		.ok_or_else(|| Error::invalid_response("Judgment response is missing a message."))?;

	if let Some(refusal) = message.get("refusal").and_then(|r| r.as_str()) {
		return Err(Error::invalid_response(format!("Judgment model refused: {refusal}")));
	}

	let content = message
		.get("content")
		.and_then(|c| c.as_str())
		.ok_or_else(|| Error::invalid_response("Judgment message is missing content."))?;

	serde_json::from_str(content)
		.map_err(|_| Error::invalid_response("Judgment content is not valid JSON."))
}
