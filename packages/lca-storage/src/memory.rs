use std::{
	collections::BTreeMap,
	sync::{RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use crate::Result;
use lca_domain::ReferenceProduct;

/// Exact cosine-similarity index held in process memory.
///
/// Readers share the lock; an upsert replaces a record and its embedding under one write lock,
/// so a concurrent query never sees one without the other.
#[derive(Debug, Default)]
pub struct MemoryIndex {
	state: RwLock<MemoryState>,
}

#[derive(Debug, Default)]
struct MemoryState {
	dimensions: Option<usize>,
	entries: BTreeMap<String, MemoryEntry>,
}

#[derive(Debug)]
struct MemoryEntry {
	record: ReferenceProduct,
	unit: Vec<f32>,
}

impl MemoryIndex {
	/// An index whose dimensionality is fixed by the first upsert.
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_dimensions(dimensions: usize) -> Self {
		Self { state: RwLock::new(MemoryState { dimensions: Some(dimensions), ..Default::default() }) }
	}

	pub fn dimensions(&self) -> Option<usize> {
		self.read().dimensions
	}

	pub fn len(&self) -> usize {
		self.read().entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	pub fn upsert_record(&self, record: &ReferenceProduct, embedding: &[f32]) -> Result<()> {
		let mut state = self.write();
		let expected = state.dimensions.unwrap_or(embedding.len());

		crate::check_embedding(expected, embedding)?;

		state.dimensions = Some(expected);
		state
			.entries
			.insert(record.id.clone(), MemoryEntry { record: record.clone(), unit: unit_vector(embedding) });

		Ok(())
	}

	/// Returns up to `k` records by ascending cosine distance; equal distances keep catalog id
	/// order.
	pub fn query_nearest(&self, embedding: &[f32], k: usize) -> Result<Vec<ReferenceProduct>> {
		crate::check_k(k)?;

		let state = self.read();
		let Some(expected) = state.dimensions else {
			return Ok(Vec::new());
		};

		crate::check_embedding(expected, embedding)?;

		let query = unit_vector(embedding);
		let mut scored: Vec<(f32, &ReferenceProduct)> = state
			.entries
			.values()
			.map(|entry| (cosine_distance(&query, &entry.unit), &entry.record))
			.collect();

		scored.sort_by(|a, b| a.0.total_cmp(&b.0));

		Ok(scored.into_iter().take(k).map(|(_, record)| record.clone()).collect())
	}

	fn read(&self) -> RwLockReadGuard<'_, MemoryState> {
		self.state.read().unwrap_or_else(|err| err.into_inner())
	}

	fn write(&self) -> RwLockWriteGuard<'_, MemoryState> {
		self.state.write().unwrap_or_else(|err| err.into_inner())
	}
}

fn unit_vector(vec: &[f32]) -> Vec<f32> {
	let norm = vec.iter().map(|value| value * value).sum::<f32>().sqrt();

	if norm == 0.0 {
		return vec![0.0; vec.len()];
	}

	vec.iter().map(|value| value / norm).collect()
}

fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
	let similarity: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();

	1.0 - similarity
}
