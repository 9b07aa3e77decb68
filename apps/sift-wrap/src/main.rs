use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = sift_wrap::Args::parse();

	sift_wrap::run(args).await
}
