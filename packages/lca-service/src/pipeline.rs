use serde::Serialize;
use serde_json::Value;

use crate::{
	CandidateSet, IMPACT_FACTOR_CONTRACT, LcaService, REFERENCE_PRODUCT_CONTRACT, RankCandidate,
	Result, Scored,
};
use lca_domain::ReferenceProduct;

/// A catalog record scored against the item description.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RankedReferenceProduct {
	#[serde(flatten)]
	pub record: ReferenceProduct,
	pub score: f32,
	pub justification: String,
}
impl From<Scored<ReferenceProduct>> for RankedReferenceProduct {
	fn from(scored: Scored<ReferenceProduct>) -> Self {
		Self { record: scored.candidate, score: scored.score, justification: scored.justification }
	}
}

impl RankCandidate for RankedReferenceProduct {
	fn descriptor(&self, index: usize) -> Value {
		serde_json::json!({
			"index": index,
			"impact_factor_name": self.record.impact_factor_name,
			"reference_product": self.record.reference_product,
			"product_info": self.record.product_info,
		})
	}

	fn impact_factor_name(&self) -> Option<&str> {
		self.record.impact_factor_name.as_deref()
	}
}

/// A reference product together with the score of its impact factor.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Recommendation {
	#[serde(flatten)]
	pub reference_product: RankedReferenceProduct,
	pub impact_factor_score: f32,
	pub impact_factor_justification: String,
}
impl From<Scored<RankedReferenceProduct>> for Recommendation {
	fn from(scored: Scored<RankedReferenceProduct>) -> Self {
		Self {
			reference_product: scored.candidate,
			impact_factor_score: scored.score,
			impact_factor_justification: scored.justification,
		}
	}
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MatchResponse {
	/// The description as submitted.
	pub input: String,
	/// The plain-language description used for retrieval and scoring.
	pub description: String,
	pub reference_products: Vec<RankedReferenceProduct>,
	pub recommendations: Vec<Recommendation>,
}

impl LcaService {
	/// Paraphrases, retrieves, and runs both scoring passes. The first failing stage aborts the
	/// request with its own error.
	pub async fn process(&self, raw: &str) -> Result<MatchResponse> {
		let description = self.paraphrase(raw).await?;
		let candidates =
			self.retrieve(&description, self.cfg.retrieval.candidate_k as usize).await?;

		if candidates.is_empty() {
			tracing::warn!(description = %description, "Catalog returned no candidates.");

			return Ok(MatchResponse {
				input: raw.to_string(),
				description,
				reference_products: Vec::new(),
				recommendations: Vec::new(),
			});
		}

		let reference_products: Vec<RankedReferenceProduct> = self
			.rank(
				&description,
				candidates,
				&REFERENCE_PRODUCT_CONTRACT,
				self.cfg.ranking.reference_product_top_n as usize,
			)
			.await?
			.into_iter()
			.map(RankedReferenceProduct::from)
			.collect();
		let recommendations: Vec<Recommendation> = self
			.rank(
				&description,
				CandidateSet::new(reference_products.clone()),
				&IMPACT_FACTOR_CONTRACT,
				self.cfg.ranking.impact_factor_top_n as usize,
			)
			.await?
			.into_iter()
			.map(Recommendation::from)
			.collect();

		tracing::info!(
			description = %description,
			reference_products = reference_products.len(),
			recommendations = recommendations.len(),
			"Matched item description."
		);

		Ok(MatchResponse { input: raw.to_string(), description, reference_products, recommendations })
	}
}
