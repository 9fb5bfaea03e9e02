use std::sync::Arc;

use super::{HashEmbedding, ScriptedJudgment, build_service, test_config};
use lca_service::Error;

#[tokio::test]
async fn plain_input_is_returned_unchanged_without_a_call() {
	let judgment = Arc::new(ScriptedJudgment::queued(Vec::new()));
	let (service, _) =
		build_service(test_config(), Arc::new(HashEmbedding::default()), judgment.clone());

	for (raw, expected) in
		[("date sugar", "date sugar"), ("  date   sugar ", "date sugar"), ("wine", "wine")]
	{
		let description = service.paraphrase(raw).await.expect("Paraphrase failed.");

		assert_eq!(description, expected);
	}

	assert_eq!(judgment.calls(), 0);
}

#[tokio::test]
async fn paraphrasing_is_idempotent_on_its_own_output() {
	let judgment = Arc::new(ScriptedJudgment::queued(vec![Ok(
		serde_json::json!({ "text": "a color laserjet printer used in an office" }),
	)]));
	let (service, _) =
		build_service(test_config(), Arc::new(HashEmbedding::default()), judgment.clone());
	let once = service.paraphrase("PRT.CLR.MFP.LRG").await.expect("Paraphrase failed.");
	let twice = service.paraphrase(&once).await.expect("Paraphrase failed.");

	assert_eq!(once, "a color laserjet printer used in an office");
	assert_eq!(twice, once);
	assert_eq!(judgment.calls(), 1);
}

#[tokio::test]
async fn technical_input_is_rewritten_by_the_model() {
	let judgment = Arc::new(ScriptedJudgment::queued(vec![Ok(serde_json::json!({
		"text": "a shrink sleeve made of amorphous PET plastic"
	}))]));
	let (service, _) =
		build_service(test_config(), Arc::new(HashEmbedding::default()), judgment.clone());
	let raw = "component_type : shrink sleeve ,  component_material_family: plastic , component_material :aPET";
	let description = service.paraphrase(raw).await.expect("Paraphrase failed.");

	assert_eq!(description, "a shrink sleeve made of amorphous PET plastic");

	let requests = judgment.requests();

	assert_eq!(requests.len(), 1);
	assert_eq!(requests[0].schema_name, "paraphrased_description");
	assert_eq!(requests[0].schema["required"], serde_json::json!(["text"]));
	assert!(requests[0].contents[0].contains(
		"component_type : shrink sleeve , component_material_family: plastic , component_material :aPET"
	));
}

#[tokio::test]
async fn empty_input_is_rejected() {
	let judgment = Arc::new(ScriptedJudgment::queued(Vec::new()));
	let (service, _) =
		build_service(test_config(), Arc::new(HashEmbedding::default()), judgment.clone());

	for raw in ["", "   \t\n"] {
		let err = service.paraphrase(raw).await.expect_err("Empty input must fail.");

		assert!(matches!(err, Error::InvalidArgument { .. }));
	}

	assert_eq!(judgment.calls(), 0);
}

#[tokio::test]
async fn disabled_paraphrasing_passes_input_through() {
	let mut cfg = test_config();

	cfg.paraphrase.enabled = false;

	let judgment = Arc::new(ScriptedJudgment::queued(Vec::new()));
	let (service, _) = build_service(cfg, Arc::new(HashEmbedding::default()), judgment.clone());
	let description =
		service.paraphrase(" component_material :  aPET ").await.expect("Paraphrase failed.");

	assert_eq!(description, "component_material : aPET");
	assert_eq!(judgment.calls(), 0);
}

#[tokio::test]
async fn plain_input_reaches_the_model_when_the_shortcut_is_off() {
	let mut cfg = test_config();

	cfg.paraphrase.skip_plain_input = false;

	let judgment =
		Arc::new(ScriptedJudgment::queued(vec![Ok(serde_json::json!({ "text": "date sugar" }))]));
	let (service, _) = build_service(cfg, Arc::new(HashEmbedding::default()), judgment.clone());
	let description = service.paraphrase("date sugar").await.expect("Paraphrase failed.");

	assert_eq!(description, "date sugar");
	assert!(description.contains("date"));
	assert_eq!(judgment.calls(), 1);
}

#[tokio::test]
async fn responses_without_text_fail_after_retries() {
	let judgment = Arc::new(ScriptedJudgment::queued(vec![
		Ok(serde_json::json!({ "text": "" })),
		Ok(serde_json::json!({ "description": "shrink sleeve" })),
		Ok(serde_json::json!({ "text": null })),
	]));
	let (service, _) =
		build_service(test_config(), Arc::new(HashEmbedding::default()), judgment.clone());
	let err = service.paraphrase("FAC.WRC.OAL0508IN9").await.expect_err("Paraphrase must fail.");

	assert!(matches!(err, Error::JudgmentUnavailable { .. }));
	assert_eq!(judgment.calls(), 3);
}
