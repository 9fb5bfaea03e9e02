use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{Error, Result};

/// One row of the impact-factor catalog.
///
/// Records are keyed by `id`; two rows may share a `reference_product` name and still be
/// distinct. Columns other than the named ones are carried through unchanged in `metadata`,
/// a nested object; no catalog column reaches the top level of a serialized record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReferenceProduct {
	pub id: String,
	pub reference_product: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub impact_factor_name: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub product_info: Option<String>,
	#[serde(default, skip_serializing_if = "Map::is_empty")]
	pub metadata: Map<String, Value>,
}
impl ReferenceProduct {
	pub fn new(id: impl Into<String>, reference_product: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			reference_product: reference_product.into(),
			impact_factor_name: None,
			product_info: None,
			metadata: Map::new(),
		}
	}

	pub fn with_impact_factor(
		mut self,
		impact_factor_name: impl Into<String>,
		product_info: impl Into<String>,
	) -> Self {
		self.impact_factor_name = Some(impact_factor_name.into());
		self.product_info = Some(product_info.into());

		self
	}

	/// Text embedded for nearest-neighbor retrieval.
	pub fn embedding_text(&self) -> &str {
		self.reference_product.as_str()
	}
}

/// Parses a JSON Lines catalog.
///
/// Blank lines are skipped. A record without an `id` takes the zero-based ordinal of its
/// non-blank line, so re-ingesting the same file overwrites the same points.
pub fn parse_jsonl(text: &str) -> Result<Vec<ReferenceProduct>> {
	let mut records = Vec::new();

	for (line_index, line) in text.lines().enumerate() {
		let line_number = line_index + 1;
		let trimmed = line.trim();

		if trimmed.is_empty() {
			continue;
		}

		let value: Value = serde_json::from_str(trimmed)
			.map_err(|source| Error::CatalogJson { line: line_number, source })?;
		let record = parse_record(value, records.len(), line_number)?;

		records.push(record);
	}

	Ok(records)
}

fn parse_record(value: Value, ordinal: usize, line: usize) -> Result<ReferenceProduct> {
	let Value::Object(mut object) = value else {
		return Err(Error::CatalogRecord {
			line,
			message: "Record must be a JSON object.".to_string(),
		});
	};
	let id = match object.remove("id") {
		None | Some(Value::Null) => ordinal.to_string(),
		Some(Value::String(id)) if !id.trim().is_empty() => id.trim().to_string(),
		Some(Value::Number(id)) => id.to_string(),
		Some(_) => {
			return Err(Error::CatalogRecord {
				line,
				message: "Record id must be a non-empty string or a number.".to_string(),
			});
		},
	};
	let reference_product = match object.remove("reference_product") {
		Some(Value::String(name)) if !name.trim().is_empty() => name,
		_ => {
			return Err(Error::CatalogRecord {
				line,
				message: "Record must have a non-empty reference_product string.".to_string(),
			});
		},
	};
	let impact_factor_name = optional_text(&mut object, "impact_factor_name", line)?;
	let product_info = optional_text(&mut object, "product_info", line)?;

	// A serialized record carries its extra columns nested already.
	if let Some(Value::Object(nested)) = object.get("metadata").cloned() {
		object.remove("metadata");

		for (key, value) in nested {
			object.entry(key).or_insert(value);
		}
	}

	Ok(ReferenceProduct { id, reference_product, impact_factor_name, product_info, metadata: object })
}

fn optional_text(object: &mut Map<String, Value>, key: &str, line: usize) -> Result<Option<String>> {
	match object.remove(key) {
		None | Some(Value::Null) => Ok(None),
		Some(Value::String(text)) => Ok(Some(text)),
		Some(_) => Err(Error::CatalogRecord {
			line,
			message: format!("Record field {key} must be a string or null."),
		}),
	}
}
