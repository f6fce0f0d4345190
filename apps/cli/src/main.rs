use std::{num::NonZeroU32, path::PathBuf, sync::Arc};

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use pf_flickr_api::{FlickrApi, ReqwestExecutor, SizeSet};
use pf_gallery::{ResolvedPhoto, SearchSession, SizeResolver};
use serde_json::json;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod config;
mod monitor;

use config::Config;
use monitor::NetworkMonitor;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
	Human,
	Json,
}

#[derive(Parser, Debug)]
#[command(name = "photofeed", about = "Browse Flickr photos by tag")]
struct Cli {
	/// Path to photofeed data directory
	#[arg(long)]
	data_dir: Option<PathBuf>,

	/// Flickr API key
	#[arg(long, env = "FLICKR_API_KEY", hide_env_values = true)]
	api_key: Option<String>,

	/// Output format
	#[arg(long, value_enum, default_value = "human")]
	format: OutputFormat,

	/// Log filter used when RUST_LOG is not set
	#[arg(long)]
	log_level: Option<String>,

	#[command(subcommand)]
	command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
	/// Search photos by tag
	Search {
		tag: String,
		/// Number of pages to load
		#[arg(long, default_value = "1")]
		pages: NonZeroU32,
		/// Keep loading until the last page
		#[arg(long, conflicts_with = "pages")]
		all: bool,
	},
	/// List the available sizes of a photo
	Sizes { photo_id: String },
}

#[tokio::main]
async fn main() -> Result<()> {
	let cli = Cli::parse();

	let data_dir = match cli.data_dir {
		Some(dir) => dir,
		None => Config::default_data_dir()?,
	};
	let config = Config::load(&data_dir)
		.with_context(|| format!("Failed to load config from {}", data_dir.display()))?;

	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
		EnvFilter::new(cli.log_level.as_deref().unwrap_or(&config.log_level))
	});
	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.init();

	let api_key = cli
		.api_key
		.or_else(|| config.api_key.clone())
		.ok_or_else(|| {
			anyhow!(
				"No API key, pass --api-key, set FLICKR_API_KEY or add it to {}",
				Config::config_path(&data_dir).display()
			)
		})?;

	let api = Arc::new(FlickrApi::new(
		ReqwestExecutor::default(),
		config.api_config(api_key),
	));

	match cli.command {
		Commands::Search { tag, pages, all } => {
			let limit = if all { None } else { Some(pages.get()) };
			search(&config, api, &tag, limit, cli.format).await
		}
		Commands::Sizes { photo_id } => {
			let sizes = api.get_sizes(&photo_id).await?;
			print_sizes(&sizes, cli.format)
		}
	}
}

async fn search(
	config: &Config,
	api: Arc<FlickrApi<ReqwestExecutor>>,
	tag: &str,
	max_pages: Option<u32>,
	format: OutputFormat,
) -> Result<()> {
	let monitor =
		NetworkMonitor::start(config.reachability_host.clone(), config.reachability_interval())
			.await;

	let mut resolver = SizeResolver::new(Arc::clone(&api));
	if let Some(limit) = config.max_parallel_lookups {
		resolver = resolver.with_concurrency_limit(limit);
	}
	let session = SearchSession::with_resolver(api, resolver, monitor);

	let pages = async {
		let mut loaded_pages = 0_u32;
		let mut page = session.search(tag).await;

		loop {
			match page {
				Ok(photos) if photos.is_empty() && loaded_pages > 0 => {
					warn!("Remote returned an empty page, stopping;");
					break;
				}
				Ok(photos) => {
					loaded_pages += 1;
					for photo in &photos {
						print_photo(photo, format)?;
					}
				}
				Err(e) if e.is_precondition() => {
					warn!(%e, "Stopped loading pages;");
					break;
				}
				Err(e) => return Err(anyhow::Error::from(e)),
			}

			if max_pages.is_some_and(|max| loaded_pages >= max) || !session.has_more() {
				break;
			}

			page = session.next_page().await;
		}

		Ok::<_, anyhow::Error>(())
	};

	tokio::select! {
		res = pages => res?,
		_ = tokio::signal::ctrl_c() => {
			info!("Interrupted, stopping the search;");
			session.stop();
		}
	}

	eprintln!(
		"{} of {} photos for \"{tag}\"{}",
		session.loaded(),
		session.total(),
		if session.has_more() { ", more available" } else { "" }
	);

	Ok(())
}

fn print_photo(photo: &ResolvedPhoto, format: OutputFormat) -> Result<()> {
	match format {
		OutputFormat::Human => {
			let url = photo
				.large_url
				.as_ref()
				.or(photo.large_square_url.as_ref())
				.map_or("-", url::Url::as_str);
			println!("{}\t{}\t{url}", photo.id, photo.title);
		}
		OutputFormat::Json => println!("{}", serde_json::to_string(photo)?),
	}

	Ok(())
}

fn print_sizes(sizes: &SizeSet, format: OutputFormat) -> Result<()> {
	match format {
		OutputFormat::Human => {
			for (label, source) in sizes.iter() {
				println!("{label}\t{source}");
			}
		}
		OutputFormat::Json => {
			let map = sizes
				.iter()
				.map(|(label, source)| (label.to_string(), json!(source)))
				.collect::<serde_json::Map<_, _>>();
			println!("{}", serde_json::to_string_pretty(&map)?);
		}
	}

	Ok(())
}
