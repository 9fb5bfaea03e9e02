use std::{
	fs,
	path::{Path, PathBuf},
};

use clap::{Parser, Subcommand};
use color_eyre::eyre;
use tracing_subscriber::EnvFilter;

use lca_config::Config;
use lca_domain::{ReferenceProduct, catalog};
use lca_service::LcaService;

#[derive(Debug, Parser)]
#[command(
	version = lca_cli::VERSION,
	rename_all = "kebab",
	styles = lca_cli::styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
	/// Indent the JSON output.
	#[arg(long)]
	pub pretty: bool,
	#[command(subcommand)]
	pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
	/// Embed a JSON Lines catalog and upsert it into the vector index.
	Ingest {
		#[arg(long, value_name = "FILE")]
		catalog: PathBuf,
	},
	/// Match one item description against the catalog.
	Match {
		/// Ingest this catalog first; required with the memory backend.
		#[arg(long, value_name = "FILE")]
		catalog: Option<PathBuf>,
		description: String,
	},
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = lca_config::load(&args.config)?;

	init_tracing(&config);

	let index = lca_service::open_index(&config).await?;
	let service = LcaService::new(config, index);
	let output = match args.command {
		Command::Ingest { catalog } => {
			let report = service.ingest_catalog(&read_catalog(&catalog)?).await?;

			lca_cli::render_json(&report, args.pretty)?
		},
		Command::Match { catalog, description } => {
			if let Some(path) = catalog {
				service.ingest_catalog(&read_catalog(&path)?).await?;
			} else if service.cfg.storage.backend == "memory" {
				return Err(eyre::eyre!("The memory backend starts empty; pass --catalog FILE."));
			}

			let response = service.process(&description).await?;

			lca_cli::render_json(&response, args.pretty)?
		},
	};

	println!("{output}");

	Ok(())
}

fn read_catalog(path: &Path) -> color_eyre::Result<Vec<ReferenceProduct>> {
	let text = fs::read_to_string(path)
		.map_err(|err| eyre::eyre!("Failed to read catalog {}: {err}", path.display()))?;
	let records = catalog::parse_jsonl(&text)?;

	tracing::info!(path = %path.display(), records = records.len(), "Loaded catalog.");

	Ok(records)
}

fn init_tracing(config: &Config) {
	let filter =
		EnvFilter::try_new(&config.service.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

	tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}
