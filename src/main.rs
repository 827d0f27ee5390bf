use std::path::Path;

use clap::{Parser, Subcommand};
use tracing::info;

use pubworks_scraper::apis::mapbox::MapboxGeocoder;
use pubworks_scraper::apis::usaspending::UsaSpendingClient;
use pubworks_scraper::apis::{Geocoder, SpendingApi};
use pubworks_scraper::config::Config;
use pubworks_scraper::logging;
use pubworks_scraper::pipeline::filter::is_public_interest;
use pubworks_scraper::pipeline::orchestrator::Collector;
use pubworks_scraper::pipeline::output::{print_summary, save_to_json};
use pubworks_scraper::types::AwardGroup;

#[derive(Parser)]
#[command(name = "pubworks_scraper")]
#[command(about = "USASpending public infrastructure project collector")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline: search, detail fetch, geocode, save
    Collect {
        /// Comma-separated keywords overriding the configured list
        #[arg(long)]
        keywords: Option<String>,
        /// Projects to collect per keyword
        #[arg(long)]
        limit: Option<usize>,
        /// Output file path
        #[arg(long)]
        output: Option<String>,
        /// Apply the relevance filter before fetching award details
        #[arg(long)]
        apply_relevance_filter: bool,
    },
    /// Run one award search and print what matched
    Search {
        #[arg(long)]
        keyword: String,
        /// Award group: contracts, grants or other
        #[arg(long, default_value = "contracts")]
        group: String,
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
    /// Probe the geocoder with a single location
    Geocode {
        #[arg(long)]
        city: String,
        #[arg(long)]
        state: String,
        #[arg(long)]
        address: Option<String>,
        #[arg(long)]
        zip: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    dotenv::dotenv().ok();
    logging::init_logging();

    let mut config = Config::load()?;

    match cli.command {
        Commands::Collect {
            keywords,
            limit,
            output,
            apply_relevance_filter,
        } => {
            if let Some(keywords) = keywords {
                config.collector.keywords = keywords
                    .split(',')
                    .map(|k| k.trim().to_string())
                    .filter(|k| !k.is_empty())
                    .collect();
            }
            if let Some(limit) = limit {
                config.collector.projects_per_keyword = limit;
            }
            if let Some(output) = output {
                config.collector.output_file = output;
            }
            if apply_relevance_filter {
                config.collector.apply_relevance_filter = true;
            }

            let token = Config::mapbox_token()?;
            let spending = UsaSpendingClient::new(&config.usaspending)?;
            let geocoder = MapboxGeocoder::new(&config.geocoder, token)?;

            info!(
                keywords = ?config.collector.keywords,
                per_keyword = config.collector.projects_per_keyword,
                "starting collection"
            );

            let collector = Collector::new(&spending, &geocoder, config.collector.clone());
            let result = collector.collect().await?;

            save_to_json(&result.projects, Path::new(&config.collector.output_file))?;
            print_summary(&result.projects);

            println!("\n📊 Collection results:");
            println!("   Keywords processed: {}", result.stats.keywords_processed);
            println!("   Awards processed: {}", result.stats.awards_processed);
            println!("   Details missing: {}", result.stats.details_missing);
            println!("   Geocode failures: {}", result.stats.geocode_failures);
            println!("   Output file: {}", config.collector.output_file);
            println!("✅ Data ready for database");
        }
        Commands::Search {
            keyword,
            group,
            limit,
        } => {
            let Some(group) = AwardGroup::parse(&group) else {
                anyhow::bail!("unknown award group '{group}', expected contracts, grants or other");
            };

            let spending = UsaSpendingClient::new(&config.usaspending)?;
            let awards = spending.search_awards(&keyword, group, limit).await?;
            let relevant = awards.iter().filter(|a| is_public_interest(a)).count();

            println!(
                "Found {} awards for '{}' ({} classified public-interest)",
                awards.len(),
                keyword,
                relevant
            );
            if let Some(first) = awards.first() {
                println!("Description: {}", first.description.as_deref().unwrap_or("-"));
                println!(
                    "Recipient: {}",
                    first.recipient_name.as_deref().unwrap_or("-")
                );
            }
        }
        Commands::Geocode {
            city,
            state,
            address,
            zip,
        } => {
            let token = Config::mapbox_token()?;
            let geocoder = MapboxGeocoder::new(&config.geocoder, token)?;

            match geocoder
                .geocode(address.as_deref(), Some(&city), Some(&state), zip.as_deref())
                .await
            {
                Some(coordinate) => {
                    println!("({}, {})", coordinate.latitude, coordinate.longitude)
                }
                None => println!("No coordinate found"),
            }
        }
    }

    Ok(())
}
