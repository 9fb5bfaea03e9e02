use std::sync::Arc;

use super::{FixedDimEmbedding, HashEmbedding, ScriptedJudgment, build_service, test_config};
use lca_domain::{ReferenceProduct, catalog};
use lca_service::{Error, IngestReport};

fn grains(count: usize) -> Vec<ReferenceProduct> {
	(0..count).map(|i| ReferenceProduct::new(i.to_string(), format!("grain {i}"))).collect()
}

#[tokio::test]
async fn embeds_in_batches_and_upserts_every_record() {
	let embedding = Arc::new(HashEmbedding::default());
	let (service, index) = build_service(
		test_config(),
		embedding.clone(),
		Arc::new(ScriptedJudgment::queued(Vec::new())),
	);
	let report = service.ingest_catalog(&grains(5)).await.expect("Ingest failed.");

	assert_eq!(report, IngestReport { upserted_count: 5, batch_count: 3 });
	assert_eq!(embedding.count(), 3);
	assert_eq!(index.len(), 5);
}

#[tokio::test]
async fn reingesting_overwrites_by_id() {
	let (service, index) = build_service(
		test_config(),
		Arc::new(HashEmbedding::default()),
		Arc::new(ScriptedJudgment::queued(Vec::new())),
	);

	service.ingest_catalog(&grains(4)).await.expect("Ingest failed.");
	service
		.ingest_catalog(&[ReferenceProduct::new("0", "maize grain")])
		.await
		.expect("Ingest failed.");

	assert_eq!(index.len(), 4);

	let hits = service.retrieve("maize grain", 1).await.expect("Retrieve failed.");

	assert_eq!(hits.get(0).map(|record| record.id.as_str()), Some("0"));
	assert_eq!(hits.get(0).map(|record| record.reference_product.as_str()), Some("maize grain"));
}

#[tokio::test]
async fn parsed_jsonl_catalog_round_trips_through_the_index() {
	let text = lca_testkit::catalog_jsonl(&lca_testkit::popcorn_catalog());
	let records = catalog::parse_jsonl(&text).expect("Catalog parse failed.");
	let (service, index) = build_service(
		test_config(),
		Arc::new(HashEmbedding::default()),
		Arc::new(ScriptedJudgment::queued(Vec::new())),
	);
	let report = service.ingest_catalog(&records).await.expect("Ingest failed.");

	assert_eq!(report.upserted_count, 3);
	assert_eq!(index.len(), 3);

	let hits = service.retrieve("maize grain, organic", 1).await.expect("Retrieve failed.");

	assert_eq!(hits.into_vec(), vec![lca_testkit::popcorn_catalog()[2].clone()]);
}

#[tokio::test]
async fn wrong_dimension_fails_before_any_write() {
	let (service, index) = build_service(
		test_config(),
		Arc::new(FixedDimEmbedding { dim: 8 }),
		Arc::new(ScriptedJudgment::queued(Vec::new())),
	);
	let err = service.ingest_catalog(&grains(3)).await.expect_err("Ingest must fail.");

	assert!(matches!(err, Error::DimensionMismatch { expected: 64, actual: 8 }));
	assert!(index.is_empty());
}
