use std::{
	collections::{HashMap, VecDeque},
	sync::{Mutex, MutexGuard},
};

use serde_json::Value;

use crate::{Error, Result, ScoreContract, rank::Judgment};
use lca_config::LlmProviderConfig;

/// In-process store of validated judgments, evicting the oldest entry once full.
#[derive(Debug)]
pub(crate) struct JudgmentCache {
	max_entries: usize,
	state: Mutex<CacheState>,
}

#[derive(Debug, Default)]
struct CacheState {
	entries: HashMap<String, Vec<Judgment>>,
	order: VecDeque<String>,
}

impl JudgmentCache {
	pub(crate) fn new(max_entries: usize) -> Self {
		Self { max_entries: max_entries.max(1), state: Mutex::new(CacheState::default()) }
	}

	pub(crate) fn get(&self, key: &str) -> Option<Vec<Judgment>> {
		self.lock().entries.get(key).cloned()
	}

	pub(crate) fn insert(&self, key: String, judgments: Vec<Judgment>) {
		let mut state = self.lock();

		if state.entries.insert(key.clone(), judgments).is_some() {
			return;
		}

		state.order.push_back(key);

		while state.order.len() > self.max_entries {
			if let Some(oldest) = state.order.pop_front() {
				state.entries.remove(&oldest);
			}
		}
	}

	#[cfg(test)]
	fn len(&self) -> usize {
		self.lock().entries.len()
	}

	fn lock(&self) -> MutexGuard<'_, CacheState> {
		self.state.lock().unwrap_or_else(|err| err.into_inner())
	}
}

pub(crate) fn build_cache_key(
	contract: &ScoreContract,
	description: &str,
	descriptors: &[Value],
	cfg: &LlmProviderConfig,
) -> Result<String> {
	let payload = serde_json::json!({
		"kind": contract.name,
		"schema_version": contract.schema_version,
		"description": description,
		"candidates": descriptors,
		"provider_id": cfg.provider_id,
		"model": cfg.model,
		"temperature": cfg.temperature,
		"seed": cfg.seed,
	});
	let raw = serde_json::to_vec(&payload).map_err(|err| {
		Error::invalid_argument(format!("Failed to encode cache key payload: {err}"))
	})?;

	Ok(blake3::hash(&raw).to_hex().to_string())
}

pub(crate) fn cache_key_prefix(key: &str) -> &str {
	let len = key.len().min(12);

	&key[..len]
}
