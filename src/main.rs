use clap::{Parser, Subcommand};
use std::path::Path;
use std::sync::Arc;
use tracing::warn;

use spaces_scraper::config::Config;
use spaces_scraper::hub::HubClient;
use spaces_scraper::logging;
use spaces_scraper::pipeline::HarvestPipeline;
use spaces_scraper::ports::Publisher;
use spaces_scraper::publish::DatasetPublisher;
use spaces_scraper::sink::ParquetSink;

#[derive(Parser)]
#[command(name = "spaces_scraper")]
#[command(about = "Hugging Face Spaces metadata harvester")]
#[command(version)]
struct Cli {
    /// Path to the TOML config file
    #[arg(long, default_value = "config.toml")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Harvest space metadata and write the parquet output
    Harvest {
        /// Maximum number of spaces to process this run
        #[arg(long)]
        max_items: Option<usize>,
        /// Output parquet path
        #[arg(long)]
        output: Option<String>,
        /// Skip spaces whose detail lookup fails instead of aborting
        #[arg(long)]
        skip_failed: bool,
    },
    /// Upload a previously produced parquet file to the hub dataset
    Publish {
        /// Path to the parquet file
        path: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    logging::init_logging();

    let cli = Cli::parse();
    let mut config = Config::load_or_default(&cli.config)?;

    match cli.command {
        Commands::Harvest {
            max_items,
            output,
            skip_failed,
        } => {
            if let Some(max_items) = max_items {
                config.max_items = max_items;
            }
            if let Some(output) = output {
                config.output_path = output;
            }
            if skip_failed {
                config.skip_failed_lookups = true;
            }

            let hub = Arc::new(HubClient::new(
                &config.api_base_url,
                config.page_size,
                config.timeout_seconds,
            )?);
            let publisher = config.publish.enabled.then(|| {
                Box::new(DatasetPublisher::new(&config.publish.dataset_id)) as Box<dyn Publisher>
            });
            let pipeline =
                HarvestPipeline::new(hub.clone(), hub, Box::new(ParquetSink), publisher, config);

            let summary = pipeline.run().await?;

            println!("\n📊 Harvest results:");
            println!("   Spaces listed:   {}", summary.listed);
            println!("   Rows written:    {}", summary.harvested);
            println!("   Skipped lookups: {}", summary.skipped);
            println!("   Output file:     {}", summary.output_file);
            if !summary.errors.is_empty() {
                warn!("{} lookups failed during the run", summary.errors.len());
                println!("\n⚠️  Failed lookups:");
                for error in &summary.errors {
                    println!("   - {}", error);
                }
            }
        }
        Commands::Publish { path } => {
            let publisher = DatasetPublisher::new(&config.publish.dataset_id);
            publisher.publish(Path::new(&path)).await?;
        }
    }

    Ok(())
}
