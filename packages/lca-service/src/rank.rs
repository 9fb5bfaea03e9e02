pub(crate) mod cache;

use std::cmp::Ordering;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::{CandidateSet, Error, LcaService, Result, retry};
use lca_domain::{ReferenceProduct, impact_factor};
use lca_providers::JudgmentRequest;

/// Item-to-reference-product scoring.
pub const REFERENCE_PRODUCT_CONTRACT: ScoreContract = ScoreContract {
	name: "reference_product_relevance",
	schema_version: 1,
	score_field: "score",
	justification_field: "justification",
	candidates_label: "Reference products",
	instructions: REFERENCE_PRODUCT_INSTRUCTIONS,
	check_market_preference: false,
};
/// Reference-product-to-impact-factor scoring.
pub const IMPACT_FACTOR_CONTRACT: ScoreContract = ScoreContract {
	name: "impact_factor_relevance",
	schema_version: 1,
	score_field: "impact_factor_score",
	justification_field: "impact_factor_justification",
	candidates_label: "Impact factors",
	instructions: IMPACT_FACTOR_INSTRUCTIONS,
	check_market_preference: true,
};

const REFERENCE_PRODUCT_INSTRUCTIONS: &str = "\
You are a Life Cycle Assessment expert conducting a process-based assessment.
Score how well each reference product matches the item description, from 0.0 to 1.0.
- 1.0: the reference product is the item, or covers its entire main component.
- Strictly between 0.0 and 1.0: the reference product is one component of the item, weighted by its share of the item.
- 0.0: the reference product is only similar and does not make up any part of the item.
For each candidate name the component it matches, whether that component is dominant or minor, or why it does not match.
Return exactly one entry per candidate index, and no other indices.";
const IMPACT_FACTOR_INSTRUCTIONS: &str = "\
You are a Life Cycle Assessment expert conducting a process-based assessment.
Score how well each impact factor represents the item description, from 0.0 to 1.0.
- 1.0: the impact factor covers every component and process step of the item.
- Strictly between 0.0 and 1.0: the impact factor covers only some components; say what is captured and what is missing.
- 0.0: the impact factor is for a similar but different item, or lacks a required process step.
When both \"market for X\" and \"X production\" are candidates, always score \"market for X\" at least as high as \"X production\".
Return exactly one entry per candidate index, and no other indices.";

/// Names one scoring pass: the response field names, the label the candidates are sent
/// under, and the instructions given to the judgment provider.
#[derive(Clone, Copy, Debug)]
pub struct ScoreContract {
	pub name: &'static str,
	/// Bumped whenever the request shape changes, which also invalidates cached judgments.
	pub schema_version: u32,
	pub score_field: &'static str,
	pub justification_field: &'static str,
	pub candidates_label: &'static str,
	pub instructions: &'static str,
	/// Log "market for X" entries scored below "X production".
	pub check_market_preference: bool,
}

/// A candidate that can be described to the judgment provider.
pub trait RankCandidate {
	/// The JSON object sent for this candidate; `index` is its local index.
	fn descriptor(&self, index: usize) -> Value;

	fn impact_factor_name(&self) -> Option<&str> {
		None
	}
}

impl RankCandidate for ReferenceProduct {
	fn descriptor(&self, index: usize) -> Value {
		serde_json::json!({ "index": index, "reference_product": self.reference_product })
	}

	fn impact_factor_name(&self) -> Option<&str> {
		self.impact_factor_name.as_deref()
	}
}

/// A candidate with its validated score. The local index is not kept.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Scored<C> {
	#[serde(flatten)]
	pub candidate: C,
	pub score: f32,
	pub justification: String,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Judgment {
	pub(crate) score: f32,
	pub(crate) justification: String,
}

#[derive(Debug)]
struct ItemScore {
	index: i64,
	judgment: Judgment,
}

impl LcaService {
	/// Scores every candidate in one judgment call, then returns the best `output_size` in
	/// descending score order.
	///
	/// Equal scores keep their order in `candidates`. The response must score each local index
	/// exactly once or the call fails with [`Error::IncompleteScoring`].
	pub async fn rank<C>(
		&self,
		description: &str,
		candidates: CandidateSet<C>,
		contract: &ScoreContract,
		output_size: usize,
	) -> Result<Vec<Scored<C>>>
	where
		C: RankCandidate + Send + Sync,
	{
		if output_size == 0 {
			return Err(Error::invalid_argument("Output size must be at least 1."));
		}
		if candidates.is_empty() {
			return Ok(Vec::new());
		}

		let descriptors: Vec<Value> = candidates
			.iter_indexed()
			.map(|(index, candidate)| candidate.descriptor(index))
			.collect();
		let judgments = self.judge_candidates(description, &descriptors, contract).await?;

		if contract.check_market_preference {
			warn_market_preference(&candidates, &judgments, contract);
		}

		let mut scored: Vec<Scored<C>> = candidates
			.into_vec()
			.into_iter()
			.zip(judgments)
			.map(|(candidate, judgment)| Scored {
				candidate,
				score: judgment.score,
				justification: judgment.justification,
			})
			.collect();

		scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
		scored.truncate(output_size);

		tracing::info!(
			contract = contract.name,
			candidates = descriptors.len(),
			kept = scored.len(),
			top_score = scored.first().map(|entry| entry.score),
			"Ranked candidates."
		);

		Ok(scored)
	}

	/// Judgments aligned to candidate order, from the cache or the judgment provider.
	async fn judge_candidates(
		&self,
		description: &str,
		descriptors: &[Value],
		contract: &ScoreContract,
	) -> Result<Vec<Judgment>> {
		let cache_key = match self.cache() {
			Some(_) => Some(cache::build_cache_key(
				contract,
				description,
				descriptors,
				&self.cfg.providers.judgment,
			)?),
			None => None,
		};

		if let (Some(cache), Some(key)) = (self.cache(), cache_key.as_deref())
			&& let Some(judgments) = cache.get(key)
		{
			tracing::debug!(
				contract = contract.name,
				cache_key_prefix = cache::cache_key_prefix(key),
				"Judgment cache hit."
			);

			return Ok(judgments);
		}

		let request = &score_request(description, descriptors, contract)?;
		let items = retry::with_retry(&self.cfg.retry, contract.name, move || async move {
			parse_items(self.call_judgment(request).await?, contract)
		})
		.await?;
		let judgments = align_judgments(items, descriptors.len())?;

		if let (Some(cache), Some(key)) = (self.cache(), cache_key) {
			cache.insert(key, judgments.clone());
		}

		Ok(judgments)
	}
}

fn score_request(
	description: &str,
	descriptors: &[Value],
	contract: &ScoreContract,
) -> Result<JudgmentRequest> {
	let candidates = serde_json::to_string(descriptors)
		.map_err(|err| Error::invalid_argument(format!("Failed to encode candidates: {err}")))?;

	Ok(JudgmentRequest {
		instructions: contract.instructions.to_string(),
		contents: vec![
			format!("item description: {description}"),
			format!("{}: {candidates}", contract.candidates_label),
		],
		schema_name: contract.name.to_string(),
		schema: score_schema(contract),
	})
}

/// `{"items": [{"index", <score_field>, <justification_field>}]}` with every field required.
fn score_schema(contract: &ScoreContract) -> Value {
	let mut properties = Map::new();

	properties.insert("index".to_string(), serde_json::json!({ "type": "integer" }));
	properties.insert(contract.score_field.to_string(), serde_json::json!({ "type": "number" }));
	properties
		.insert(contract.justification_field.to_string(), serde_json::json!({ "type": "string" }));

	serde_json::json!({
		"type": "object",
		"properties": {
			"items": {
				"type": "array",
				"items": {
					"type": "object",
					"properties": properties,
					"required": ["index", contract.score_field, contract.justification_field],
					"additionalProperties": false,
				},
			},
		},
		"required": ["items"],
		"additionalProperties": false,
	})
}

fn parse_items(value: Value, contract: &ScoreContract) -> Result<Vec<ItemScore>> {
	let Some(items) = value.get("items").and_then(Value::as_array) else {
		return Err(Error::judgment_unavailable(format!(
			"{} response is missing an items array.",
			contract.name
		)));
	};
	let mut out = Vec::with_capacity(items.len());

	for (position, item) in items.iter().enumerate() {
		let Some(index) = item.get("index").and_then(Value::as_i64) else {
			return Err(Error::judgment_unavailable(format!(
				"{} item {position} has no integer index.",
				contract.name
			)));
		};
		let score = item
			.get(contract.score_field)
			.and_then(Value::as_f64)
			.filter(|score| score.is_finite() && (0.0..=1.0).contains(score))
			.map(|score| score as f32);
		let Some(score) = score else {
			return Err(Error::judgment_unavailable(format!(
				"{} item {position} has no {} in [0, 1].",
				contract.name, contract.score_field
			)));
		};
		let Some(justification) = item.get(contract.justification_field).and_then(Value::as_str)
		else {
			return Err(Error::judgment_unavailable(format!(
				"{} item {position} has no {} string.",
				contract.name, contract.justification_field
			)));
		};

		out.push(ItemScore {
			index,
			judgment: Judgment { score, justification: justification.to_string() },
		});
	}

	Ok(out)
}

/// Places each judgment at its local index. Every index in `0..len` must be scored exactly once.
fn align_judgments(items: Vec<ItemScore>, len: usize) -> Result<Vec<Judgment>> {
	let mut slots: Vec<Option<Judgment>> = vec![None; len];
	let mut duplicate = Vec::new();
	let mut foreign = Vec::new();

	for item in items {
		let slot = usize::try_from(item.index).ok().and_then(|index| slots.get_mut(index));
		let Some(slot) = slot else {
			foreign.push(item.index);

			continue;
		};

		if slot.is_some() {
			duplicate.push(item.index as usize);
		} else {
			*slot = Some(item.judgment);
		}
	}

	let missing: Vec<usize> =
		slots.iter().enumerate().filter(|(_, slot)| slot.is_none()).map(|(index, _)| index).collect();

	duplicate.sort_unstable();
	duplicate.dedup();
	foreign.sort_unstable();
	foreign.dedup();

	if !missing.is_empty() || !duplicate.is_empty() || !foreign.is_empty() {
		return Err(Error::IncompleteScoring { missing, duplicate, foreign });
	}

	Ok(slots.into_iter().flatten().collect())
}

fn warn_market_preference<C>(
	candidates: &CandidateSet<C>,
	judgments: &[Judgment],
	contract: &ScoreContract,
) where
	C: RankCandidate,
{
	let named: Vec<(usize, &str)> = candidates
		.iter_indexed()
		.filter_map(|(index, candidate)| candidate.impact_factor_name().map(|name| (index, name)))
		.collect();
	let pairs: Vec<(&str, f32)> =
		named.iter().map(|(index, name)| (*name, judgments[*index].score)).collect();

	for violation in impact_factor::market_preference_violations(&pairs) {
		let (market_index, market_name) = named[violation.market];
		let (production_index, production_name) = named[violation.production];

		tracing::warn!(
			contract = contract.name,
			market_index,
			market = market_name,
			market_score = judgments[market_index].score,
			production_index,
			production = production_name,
			production_score = judgments[production_index].score,
			"Market impact factor scored below the matching production impact factor."
		);
	}
}
