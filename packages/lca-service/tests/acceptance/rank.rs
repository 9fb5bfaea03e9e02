use std::sync::Arc;

use super::{HashEmbedding, ScriptedJudgment, build_service, object_keys, test_config};
use lca_domain::ReferenceProduct;
use lca_service::{
	CandidateSet, Error, IMPACT_FACTOR_CONTRACT, LcaService, REFERENCE_PRODUCT_CONTRACT,
	RankedReferenceProduct,
};

fn records(names: &[&str]) -> Vec<ReferenceProduct> {
	names.iter().enumerate().map(|(i, name)| ReferenceProduct::new(i.to_string(), *name)).collect()
}

fn reference_scores(items: &[(i64, f32, &str)]) -> serde_json::Value {
	lca_testkit::scores_response(
		REFERENCE_PRODUCT_CONTRACT.score_field,
		REFERENCE_PRODUCT_CONTRACT.justification_field,
		items,
	)
}

fn service_with(judgment: Arc<ScriptedJudgment>) -> LcaService {
	build_service(test_config(), Arc::new(HashEmbedding::default()), judgment).0
}

#[tokio::test]
async fn truncates_ten_candidates_to_the_five_best() {
	let scores = [0.3, 0.9, 0.1, 0.5, 0.7, 0.2, 0.8, 0.0, 0.6, 0.4];
	let items: Vec<(i64, f32, &str)> =
		scores.iter().enumerate().map(|(i, score)| (i as i64, *score, "component match")).collect();
	let judgment = Arc::new(ScriptedJudgment::queued(vec![Ok(reference_scores(&items))]));
	let service = service_with(judgment.clone());
	let names: Vec<String> = (0..10).map(|i| format!("item {i}")).collect();
	let names: Vec<&str> = names.iter().map(String::as_str).collect();
	let ranked = service
		.rank("assorted goods", CandidateSet::new(records(&names)), &REFERENCE_PRODUCT_CONTRACT, 5)
		.await
		.expect("Rank failed.");
	let kept: Vec<f32> = ranked.iter().map(|entry| entry.score).collect();
	let kept_names: Vec<&str> =
		ranked.iter().map(|entry| entry.candidate.reference_product.as_str()).collect();

	assert_eq!(kept, vec![0.9, 0.8, 0.7, 0.6, 0.5]);
	assert_eq!(kept_names, vec!["item 1", "item 6", "item 4", "item 8", "item 3"]);

	let lowest_kept = kept.iter().copied().fold(f32::INFINITY, f32::min);
	let mut discarded: Vec<f32> = scores.to_vec();

	discarded.retain(|score| !kept.contains(score));

	assert!(discarded.iter().all(|score| *score <= lowest_kept));
	assert_eq!(judgment.calls(), 1);
}

#[tokio::test]
async fn equal_scores_keep_retrieval_order() {
	let judgment = Arc::new(ScriptedJudgment::queued(vec![Ok(reference_scores(&[
		(3, 0.5, "d"),
		(1, 0.9, "b"),
		(2, 0.5, "c"),
		(0, 0.5, "a"),
	]))]));
	let service = service_with(judgment);
	let ranked = service
		.rank(
			"maize",
			CandidateSet::new(records(&["a", "b", "c", "d"])),
			&REFERENCE_PRODUCT_CONTRACT,
			4,
		)
		.await
		.expect("Rank failed.");
	let order: Vec<&str> =
		ranked.iter().map(|entry| entry.candidate.reference_product.as_str()).collect();

	assert_eq!(order, vec!["b", "a", "c", "d"]);
	assert_eq!(ranked[1].justification, "a");
}

#[tokio::test]
async fn duplicate_names_stay_distinct_records() {
	let candidates = vec![
		ReferenceProduct::new("7", "maize grain").with_impact_factor("market for maize grain", "A"),
		ReferenceProduct::new("8", "maize grain").with_impact_factor("maize grain production", "B"),
	];
	let judgment = Arc::new(ScriptedJudgment::queued(vec![Ok(reference_scores(&[
		(0, 1.0, "exact"),
		(1, 1.0, "exact"),
	]))]));
	let service = service_with(judgment);
	let ranked = service
		.rank("maize grain", CandidateSet::new(candidates), &REFERENCE_PRODUCT_CONTRACT, 5)
		.await
		.expect("Rank failed.");
	let ids: Vec<&str> = ranked.iter().map(|entry| entry.candidate.id.as_str()).collect();

	assert_eq!(ids, vec!["7", "8"]);
}

#[tokio::test]
async fn missing_index_fails_without_retry() {
	let judgment = Arc::new(ScriptedJudgment::queued(vec![Ok(reference_scores(&[
		(0, 0.5, "partial"),
		(1, 0.4, "partial"),
	]))]));
	let service = service_with(judgment.clone());
	let err = service
		.rank("wine", CandidateSet::new(records(&["a", "b", "c"])), &REFERENCE_PRODUCT_CONTRACT, 2)
		.await
		.expect_err("Incomplete scoring must fail.");

	let Error::IncompleteScoring { missing, duplicate, foreign } = err else {
		panic!("Expected an incomplete scoring error.");
	};

	assert_eq!(missing, vec![2]);
	assert!(duplicate.is_empty());
	assert!(foreign.is_empty());
	assert_eq!(judgment.calls(), 1);
}

#[tokio::test]
async fn duplicate_and_foreign_indices_are_reported() {
	let judgment = Arc::new(ScriptedJudgment::queued(vec![Ok(reference_scores(&[
		(0, 0.5, "partial"),
		(0, 0.6, "again"),
		(1, 0.4, "partial"),
		(9, 1.0, "invented"),
	]))]));
	let service = service_with(judgment);
	let err = service
		.rank("wine", CandidateSet::new(records(&["a", "b"])), &REFERENCE_PRODUCT_CONTRACT, 2)
		.await
		.expect_err("Incomplete scoring must fail.");

	let Error::IncompleteScoring { missing, duplicate, foreign } = err else {
		panic!("Expected an incomplete scoring error.");
	};

	assert!(missing.is_empty());
	assert_eq!(duplicate, vec![0]);
	assert_eq!(foreign, vec![9]);
}

#[tokio::test]
async fn empty_candidates_skip_the_judgment_call() {
	let judgment = Arc::new(ScriptedJudgment::queued(Vec::new()));
	let service = service_with(judgment.clone());
	let ranked = service
		.rank("wine", CandidateSet::<ReferenceProduct>::new(Vec::new()), &REFERENCE_PRODUCT_CONTRACT, 5)
		.await
		.expect("Rank failed.");

	assert!(ranked.is_empty());
	assert_eq!(judgment.calls(), 0);
}

#[tokio::test]
async fn zero_output_size_is_rejected() {
	let judgment = Arc::new(ScriptedJudgment::queued(Vec::new()));
	let service = service_with(judgment.clone());
	let err = service
		.rank("wine", CandidateSet::new(records(&["a"])), &REFERENCE_PRODUCT_CONTRACT, 0)
		.await
		.expect_err("Output size 0 must fail.");

	assert!(matches!(err, Error::InvalidArgument { .. }));
	assert_eq!(judgment.calls(), 0);
}

#[tokio::test]
async fn request_sends_local_indices_and_ranked_output_drops_them() {
	let judgment = Arc::new(ScriptedJudgment::queued(vec![Ok(reference_scores(&[
		(0, 0.0, "not the variety used for popping"),
		(1, 1.0, "exact base ingredient"),
	]))]));
	let service = service_with(judgment.clone());
	let ranked = service
		.rank(
			"popped popcorn",
			CandidateSet::new(records(&["sweet corn", "maize grain"])),
			&REFERENCE_PRODUCT_CONTRACT,
			5,
		)
		.await
		.expect("Rank failed.");
	let request = &judgment.requests()[0];

	assert_eq!(
		lca_testkit::request_candidates(request),
		vec![
			serde_json::json!({ "index": 0, "reference_product": "sweet corn" }),
			serde_json::json!({ "index": 1, "reference_product": "maize grain" }),
		]
	);
	assert_eq!(request.contents[0], "item description: popped popcorn");

	let json = serde_json::to_value(&ranked).expect("Failed to serialize ranking.");
	let keys = object_keys(&json);

	assert!(!keys.iter().any(|key| key == "index"));
	assert!(keys.iter().any(|key| key == "score"));
	assert_eq!(json[0]["reference_product"], "maize grain");
}

#[tokio::test]
async fn impact_factor_pass_describes_full_records_and_keeps_scores() {
	let candidates: Vec<RankedReferenceProduct> = vec![
		ReferenceProduct::new("1", "tomato, fresh grade").with_impact_factor(
			"market for tomato, fresh grade",
			"The product 'tomato, fresh grade' is a fruit.",
		),
		ReferenceProduct::new("2", "tomato, fresh grade").with_impact_factor(
			"tomato production, fresh grade, open field",
			"The product 'tomato, fresh grade' is a fruit.",
		),
	]
	.into_iter()
	.map(|record| RankedReferenceProduct { record, score: 1.0, justification: "exact".to_string() })
	.collect();
	// The market entry scored below production breaks the market-preference rule; it is logged,
	// never rewritten.
	let judgment = Arc::new(ScriptedJudgment::queued(vec![Ok(lca_testkit::scores_response(
		IMPACT_FACTOR_CONTRACT.score_field,
		IMPACT_FACTOR_CONTRACT.justification_field,
		&[(0, 0.8, "market mix"), (1, 0.9, "single producer")],
	))]));
	let service = service_with(judgment.clone());
	let ranked = service
		.rank("tomato", CandidateSet::new(candidates), &IMPACT_FACTOR_CONTRACT, 2)
		.await
		.expect("Rank failed.");
	let descriptors = lca_testkit::request_candidates(&judgment.requests()[0]);

	assert_eq!(
		descriptors[0],
		serde_json::json!({
			"index": 0,
			"impact_factor_name": "market for tomato, fresh grade",
			"reference_product": "tomato, fresh grade",
			"product_info": "The product 'tomato, fresh grade' is a fruit.",
		})
	);
	assert_eq!(ranked[0].candidate.record.id, "2");
	assert_eq!(ranked[0].score, 0.9);
	assert_eq!(ranked[1].score, 0.8);
}

#[tokio::test]
async fn market_entries_win_when_scored_per_policy() {
	let candidates: Vec<RankedReferenceProduct> = vec![
		ReferenceProduct::new("1", "maize grain")
			.with_impact_factor("maize grain production", "A cereal."),
		ReferenceProduct::new("2", "maize grain")
			.with_impact_factor("market for maize grain", "A cereal."),
	]
	.into_iter()
	.map(|record| RankedReferenceProduct { record, score: 1.0, justification: "exact".to_string() })
	.collect();
	let judgment = Arc::new(ScriptedJudgment::queued(vec![Ok(lca_testkit::scores_response(
		IMPACT_FACTOR_CONTRACT.score_field,
		IMPACT_FACTOR_CONTRACT.justification_field,
		&[(0, 0.9, "second best"), (1, 1.0, "market mix preferred")],
	))]));
	let service = service_with(judgment);
	let ranked = service
		.rank("popped popcorn", CandidateSet::new(candidates), &IMPACT_FACTOR_CONTRACT, 1)
		.await
		.expect("Rank failed.");

	assert_eq!(ranked.len(), 1);
	assert_eq!(
		ranked[0].candidate.record.impact_factor_name.as_deref(),
		Some("market for maize grain")
	);
}

#[tokio::test]
async fn cached_judgments_skip_the_provider() {
	let mut cfg = test_config();

	cfg.ranking.cache.enabled = true;

	let judgment = Arc::new(ScriptedJudgment::responding(|request| {
		Ok(lca_testkit::score_by_name(
			request,
			"reference_product",
			REFERENCE_PRODUCT_CONTRACT.score_field,
			REFERENCE_PRODUCT_CONTRACT.justification_field,
			&[("maize grain", 1.0)],
		))
	}));
	let (service, _) = build_service(cfg, Arc::new(HashEmbedding::default()), judgment.clone());
	let candidates = records(&["sweet corn", "maize grain"]);
	let first = service
		.rank("popcorn", CandidateSet::new(candidates.clone()), &REFERENCE_PRODUCT_CONTRACT, 2)
		.await
		.expect("Rank failed.");
	let second = service
		.rank("popcorn", CandidateSet::new(candidates.clone()), &REFERENCE_PRODUCT_CONTRACT, 2)
		.await
		.expect("Rank failed.");

	assert_eq!(first, second);
	assert_eq!(judgment.calls(), 1);

	service
		.rank("corn", CandidateSet::new(candidates), &REFERENCE_PRODUCT_CONTRACT, 2)
		.await
		.expect("Rank failed.");

	assert_eq!(judgment.calls(), 2);
}
