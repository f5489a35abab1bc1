use anyhow::{anyhow, bail, Context};
use clap::{Parser, Subcommand};
use navassist::{
    sdk::controller::{ControllerSettings, SearchController},
    sdk::geo::Coordinate,
    sdk::location::FixedLocationProvider,
    sdk::routing::RemoteTomTomProvider,
    sdk::session::{RecentSearches, Resolution, RECENT_SEARCHES_KEY},
    sdk::store::{FileStore, KeyValueStore},
    sdk::util::{log::init_logging, rate_limit::provider_limiter},
    sdk::zone::EmissionZone,
    NavConfig,
};
use serde_json::json;
use std::{path::PathBuf, sync::Arc};

/// Search a destination and route to it from the command line
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// File holding persisted recent searches
    #[arg(long, env = "NAVASSIST_STORE", default_value = "navassist_store.json")]
    store: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List place suggestions for free text
    Suggest { query: String },

    /// Find a destination and compute the route to it
    Route {
        query: String,

        /// Current position as LAT,LON (e.g., 48.8566,2.3522)
        #[arg(long, env = "NAVASSIST_ORIGIN")]
        from: Option<Coordinate>,

        /// [Optional] Index of the suggestion to pick instead of the best match
        #[arg(long)]
        pick: Option<usize>,
    },

    /// Show recent searches, newest first
    Recent,

    /// Check whether a position lies in the emission zone
    Zone { position: Coordinate },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    init_logging("info");
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let store = FileStore::load_from_file(&cli.store)
        .with_context(|| format!("Failed to open store {}", cli.store.display()))?;

    match cli.command {
        Command::Suggest { query } => {
            ensure_query(&query)?;
            let controller = build_controller(None, store)?;
            let resolution = controller.on_query_changed(&query).await;
            finish(&controller, resolution)?;

            let suggestions = controller.snapshot().suggestions;
            log::info!("{} suggestions for \"{}\"", suggestions.len(), query);
            println!("{}", serde_json::to_string_pretty(&suggestions)?);
        }
        Command::Route { query, from, pick } => {
            ensure_query(&query)?;
            let controller = build_controller(from, store)?;
            if controller.locate().await.is_err() {
                return Err(notices_as_error(&controller));
            }

            let resolution = controller.on_query_changed(&query).await;
            finish(&controller, resolution)?;
            let resolution = match pick {
                Some(index) => {
                    let candidate = controller
                        .snapshot()
                        .suggestions
                        .get(index)
                        .cloned()
                        .ok_or_else(|| anyhow!("No suggestion at index {} for \"{}\"", index, query))?;
                    log::info!("Picked suggestion: {}", candidate.display_address);
                    controller.select(&candidate).await
                }
                None => controller.submit().await,
            };
            finish(&controller, resolution)?;

            let state = controller.snapshot();
            let zone = EmissionZone::paris_default();
            let report = zone.report(state.destination, state.route.as_ref());
            if report.route_crosses {
                log::warn!("Route crosses the {}", zone.name());
            }
            let output = json!({
                "destination": state.destination,
                "route": state.route,
                "recentSearches": state.recent_searches,
                "emissionZone": report,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Command::Recent => {
            let recent = match store.get(RECENT_SEARCHES_KEY)? {
                Some(data) => RecentSearches::from_json(&data, usize::MAX)?,
                None => RecentSearches::new(1),
            };
            for entry in recent.iter() {
                println!("{}", entry.display_address);
            }
        }
        Command::Zone { position } => {
            let zone = EmissionZone::paris_default();
            let inside = zone.contains(position);
            let side = if inside { "inside" } else { "outside" };
            log::info!("{} is {} the {}", position, side, zone.name());
            println!("{}", json!({ "position": position, "inside": inside }));
        }
    }

    Ok(())
}

fn build_controller(origin: Option<Coordinate>, store: FileStore) -> anyhow::Result<SearchController> {
    let config = NavConfig::from_env()?;
    let limiter = provider_limiter(config.requests_per_second);
    let provider = Arc::new(RemoteTomTomProvider::new(&config, limiter)?);
    let settings = ControllerSettings {
        suggestion_limit: config.suggestion_limit,
        recent_capacity: config.recent_capacity,
    };

    Ok(SearchController::new(
        Arc::new(FixedLocationProvider::from(origin)),
        provider.clone(),
        provider,
        settings,
    )
    .with_store(Box::new(store)))
}

fn finish(controller: &SearchController, resolution: Resolution) -> anyhow::Result<()> {
    match resolution {
        Resolution::Failed(_) => Err(notices_as_error(controller)),
        Resolution::Installed | Resolution::Discarded => Ok(()),
    }
}

fn notices_as_error(controller: &SearchController) -> anyhow::Error {
    let messages: Vec<String> = controller
        .drain_notices()
        .into_iter()
        .map(|n| n.message)
        .collect();
    if messages.is_empty() {
        return anyhow!("Request failed");
    }
    anyhow!(messages.join("; "))
}

fn ensure_query(query: &str) -> anyhow::Result<()> {
    if query.trim().is_empty() {
        bail!("Query must not be empty");
    }
    Ok(())
}
