use std::{collections::HashMap, time::Duration};

use qdrant_client::{
	Payload, Qdrant,
	qdrant::{
		CreateCollectionBuilder, Distance, PointStruct, Query, QueryPointsBuilder, ScoredPoint,
		UpsertPointsBuilder, Value, VectorParamsBuilder, point_id::PointIdOptions, value::Kind,
	},
};
use serde_json::{Map, Value as JsonValue};
use uuid::Uuid;

use crate::{Error, Result};
use lca_domain::ReferenceProduct;

/// Namespace for deriving point ids from catalog ids.
pub const POINT_ID_NAMESPACE: Uuid = Uuid::from_u128(0x6c63_615f_7265_665f_7072_6f64_7563_7473);

pub struct QdrantStore {
	pub client: Qdrant,
	pub collection: String,
	pub vector_dim: u32,
}
impl QdrantStore {
	pub fn new(cfg: &lca_config::Qdrant) -> Result<Self> {
		let client = Qdrant::from_url(&cfg.url)
			.timeout(Duration::from_millis(cfg.timeout_ms))
			.skip_compatibility_check()
			.build()?;

		Ok(Self { client, collection: cfg.collection.clone(), vector_dim: cfg.vector_dim })
	}

	/// Creates the collection in cosine space when it does not exist yet.
	///
	/// The distance metric is fixed here and nowhere else, so every point in a collection is
	/// compared with the same metric.
	pub async fn ensure_collection(&self) -> Result<()> {
		if self.client.collection_exists(self.collection.as_str()).await? {
			return Ok(());
		}

		tracing::info!(collection = %self.collection, vector_dim = self.vector_dim, "Creating Qdrant collection.");

		self.client
			.create_collection(
				CreateCollectionBuilder::new(self.collection.clone()).vectors_config(
					VectorParamsBuilder::new(self.vector_dim.into(), Distance::Cosine),
				),
			)
			.await?;

		Ok(())
	}

	/// Writes the record and its embedding as one point; a re-upsert with the same catalog id
	/// replaces both.
	pub async fn upsert_record(&self, record: &ReferenceProduct, embedding: &[f32]) -> Result<()> {
		crate::check_embedding(self.vector_dim as usize, embedding)?;

		let point =
			PointStruct::new(point_id(&record.id).to_string(), embedding.to_vec(), record_payload(record)?);

		self.client
			.upsert_points(
				UpsertPointsBuilder::new(self.collection.clone(), vec![point]).wait(true),
			)
			.await?;

		Ok(())
	}

	/// Returns up to `k` records, nearest first.
	pub async fn query_nearest(&self, embedding: &[f32], k: usize) -> Result<Vec<ReferenceProduct>> {
		crate::check_k(k)?;
		crate::check_embedding(self.vector_dim as usize, embedding)?;

		let search = QueryPointsBuilder::new(self.collection.clone())
			.query(Query::new_nearest(embedding.to_vec()))
			.limit(k as u64)
			.with_payload(true);
		let response = self.client.query(search).await?;

		collect_records(&response.result)
	}
}

pub fn point_id(catalog_id: &str) -> Uuid {
	Uuid::new_v5(&POINT_ID_NAMESPACE, catalog_id.as_bytes())
}

fn record_payload(record: &ReferenceProduct) -> Result<Payload> {
	let JsonValue::Object(fields) = serde_json::to_value(record)
		.map_err(|err| Error::InvalidArgument(format!("Record is not serializable: {err}")))?
	else {
		return Err(Error::InvalidArgument("Record must serialize to an object.".to_string()));
	};
	let mut payload = Payload::new();

	for (key, value) in fields {
		payload.insert(key, value);
	}

	Ok(payload)
}

/// Decodes every hit; one undecodable payload fails the whole query.
fn collect_records(points: &[ScoredPoint]) -> Result<Vec<ReferenceProduct>> {
	points
		.iter()
		.map(|point| {
			serde_json::from_value(JsonValue::Object(payload_to_json(&point.payload))).map_err(
				|err| Error::MalformedPayload { point: describe_point_id(point), message: err.to_string() },
			)
		})
		.collect()
}

fn describe_point_id(point: &ScoredPoint) -> String {
	match point.id.as_ref().and_then(|id| id.point_id_options.as_ref()) {
		Some(PointIdOptions::Uuid(uuid)) => uuid.clone(),
		Some(PointIdOptions::Num(num)) => num.to_string(),
		None => "<unknown>".to_string(),
	}
}

fn payload_to_json(payload: &HashMap<String, Value>) -> Map<String, JsonValue> {
	payload.iter().map(|(key, value)| (key.clone(), value_to_json(value))).collect()
}

fn value_to_json(value: &Value) -> JsonValue {
	match &value.kind {
		None | Some(Kind::NullValue(_)) => JsonValue::Null,
		Some(Kind::BoolValue(flag)) => JsonValue::Bool(*flag),
		Some(Kind::IntegerValue(number)) => JsonValue::from(*number),
		Some(Kind::DoubleValue(number)) => JsonValue::from(*number),
		Some(Kind::StringValue(text)) => JsonValue::String(text.clone()),
		Some(Kind::ListValue(list)) => {
			JsonValue::Array(list.values.iter().map(value_to_json).collect())
		},
		Some(Kind::StructValue(object)) => JsonValue::Object(payload_to_json(&object.fields)),
	}
}
