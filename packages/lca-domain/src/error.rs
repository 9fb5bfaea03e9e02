pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Catalog line {line} is not valid JSON: {source}")]
	CatalogJson { line: usize, source: serde_json::Error },
	#[error("Catalog line {line}: {message}")]
	CatalogRecord { line: usize, message: String },
}
