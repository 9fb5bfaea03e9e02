use clap::Parser;

use lca_match::Args;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = Args::parse();

	lca_match::run(args).await
}
