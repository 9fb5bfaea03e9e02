use serde::Serialize;

use crate::{LcaService, Result};
use lca_domain::ReferenceProduct;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
	pub upserted_count: usize,
	pub batch_count: usize,
}

impl LcaService {
	/// Embeds catalog records in batches and upserts them by id. Stops at the first failure;
	/// records from earlier batches stay written.
	pub async fn ingest_catalog(&self, records: &[ReferenceProduct]) -> Result<IngestReport> {
		let batch_size = (self.cfg.catalog.embed_batch_size as usize).max(1);
		let mut report = IngestReport::default();

		for batch in records.chunks(batch_size) {
			let texts: Vec<String> =
				batch.iter().map(|record| record.embedding_text().to_string()).collect();
			let vectors = self.embed_texts(&texts).await?;

			for (record, embedding) in batch.iter().zip(&vectors) {
				self.upsert_index(record, embedding).await?;

				report.upserted_count += 1;
			}

			report.batch_count += 1;

			tracing::debug!(
				batch = report.batch_count,
				size = batch.len(),
				upserted = report.upserted_count,
				"Ingested catalog batch."
			);
		}

		tracing::info!(
			upserted_count = report.upserted_count,
			batch_count = report.batch_count,
			"Catalog ingested."
		);

		Ok(report)
	}
}
