// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Chalo contributors

mod display;
mod edit;

use anyhow::{anyhow, Context, Result};
use chalo_core::provider::{HttpSpotProvider, MockSpotProvider};
use chalo_core::search::{CustomTripQuery, ItineraryQuery, PriceLevel, Preset, TripCategory};
use chalo_core::settings::Settings;
use chalo_core::storage::LAST_SEARCH_KEY;
use chalo_core::{
    ChaloError, FavoritesStore, FileStore, Itinerary, ItineraryEditor, KeyValueStore,
    ProviderError, SpotProvider, Stop, TripStore,
};
use clap::{ArgAction, Parser, Subcommand};
use serde::{Deserialize, Serialize};
use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};
use std::io;
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Recommendation backend base URL
    #[arg(long, env = "CHALO_API_URL")]
    api_url: Option<String>,

    /// Use the built-in offline provider instead of the backend
    #[arg(long)]
    offline: bool,

    /// Directory holding favorites and the active trip
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// More log output (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Find itineraries for a location
    Search {
        location: String,
        /// nature, art, food, history, shopping or a full preset name
        #[arg(short, long)]
        preset: Option<String>,
        /// 10-20, 20-50 or 50+
        #[arg(long)]
        price: Option<String>,
        /// Maximum walking radius in miles
        #[arg(short, long)]
        distance: Option<f64>,
    },
    /// Build itineraries from chosen categories
    Custom {
        location: String,
        /// cafe, restaurant, park, museum, art_gallery, tourist_attraction
        #[arg(short, long = "category", required = true)]
        categories: Vec<String>,
        #[arg(short, long)]
        distance: Option<f64>,
    },
    /// Show the results of the last search
    Results,
    /// Start itinerary N from the last search as the active trip
    Start { index: usize },
    /// Show the active trip
    Trip,
    /// End the active trip
    End,
    /// Edit itinerary N from the last search, or the active trip
    Edit { index: Option<usize> },
    #[command(subcommand)]
    Favorites(FavoritesCommand),
    /// Check that the backend is reachable
    Health,
}

#[derive(Subcommand)]
enum FavoritesCommand {
    List,
    /// Favorite a stop from the active trip or the last search
    Add { stop_id: String },
    Remove { stop_id: String },
}

/// Results kept between invocations so `start` and `edit` can refer to them.
#[derive(Debug, Serialize, Deserialize)]
struct LastSearch {
    location: String,
    itineraries: Vec<Itinerary>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut settings = Settings::load().context("Failed to load settings")?;
    if let Some(url) = &cli.api_url {
        settings.api_base_url = url.clone();
    }
    if let Some(dir) = &cli.data_dir {
        settings.data_dir = Some(dir.clone());
    }

    let provider: Box<dyn SpotProvider> = if cli.offline {
        Box::new(MockSpotProvider::new())
    } else {
        Box::new(HttpSpotProvider::from_settings(&settings).map_err(provider_error)?)
    };
    let store = FileStore::new(settings.data_dir());
    log::debug!(
        "Starting — api={} offline={} data_dir={}",
        settings.api_base_url,
        cli.offline,
        store.dir().display()
    );

    match cli.command {
        Commands::Search {
            location,
            preset,
            price,
            distance,
        } => {
            let mut query = ItineraryQuery::new(&location)
                .max_distance(distance.unwrap_or(settings.default_max_distance_miles));
            if let Some(p) = preset {
                query = query.preset(p.parse::<Preset>().map_err(|e| anyhow!(e))?);
            }
            if let Some(p) = price {
                query = query.price(p.parse::<PriceLevel>().map_err(|e| anyhow!(e))?);
            }
            let request = query.validate().map_err(|e| anyhow!(e))?;
            let response = provider.itineraries(&request).map_err(provider_error)?;
            save_results(store.clone(), &request.location, response.itineraries)?;
            print_results(&store)?;
            for source in &response.sources {
                println!("Source: {} ({})", source.web.title, source.web.uri);
            }
        }
        Commands::Custom {
            location,
            categories,
            distance,
        } => {
            let categories = categories
                .iter()
                .map(|c| c.parse::<TripCategory>())
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(|e| anyhow!(e))?;
            let request = CustomTripQuery::new(&location, categories)
                .max_distance(distance.unwrap_or(settings.default_max_distance_miles))
                .validate()
                .map_err(|e| anyhow!(e))?;
            let response = provider.custom_trips(&request).map_err(provider_error)?;
            save_results(store.clone(), &request.location, response.itineraries)?;
            print_results(&store)?;
        }
        Commands::Results => print_results(&store)?,
        Commands::Start { index } => {
            let search = load_results(&store)?;
            let itinerary = pick_itinerary(&search, index)?;
            let mut trips = TripStore::load(store.clone());
            let trip = trips.start(itinerary, &search.location);
            println!(
                "Started '{}' in {} ({} stops).",
                trip.itinerary.title,
                trip.location,
                trip.itinerary.stops.len()
            );
        }
        Commands::Trip => {
            let trips = TripStore::load(store.clone());
            let favorites = FavoritesStore::load(store.clone());
            match trips.current() {
                Some(trip) => {
                    println!(
                        "Active trip in {} since {}",
                        trip.location,
                        trip.started_at.format("%Y-%m-%d %H:%M UTC")
                    );
                    display::write_itinerary(&mut io::stdout(), &trip.itinerary, |id| {
                        favorites.is_favorite(id)
                    })?;
                }
                None => println!("No active trip."),
            }
        }
        Commands::End => {
            let mut trips = TripStore::load(store.clone());
            match trips.end() {
                Some(trip) => println!("Ended '{}'.", trip.itinerary.title),
                None => println!("No active trip."),
            }
        }
        Commands::Edit { index } => {
            let mut trips = TripStore::load(store.clone());
            let (itinerary, location) = match index {
                Some(n) => {
                    let search = load_results(&store)?;
                    (pick_itinerary(&search, n)?, search.location)
                }
                None => {
                    let trip = trips.current().ok_or_else(|| {
                        anyhow!("No active trip. Pass an itinerary number from the last search.")
                    })?;
                    (trip.itinerary.clone(), trip.location.clone())
                }
            };
            let editor = ItineraryEditor::open(itinerary, &location)
                .with_max_distance(settings.default_max_distance_miles);
            let stdin = io::stdin();
            edit::run_session(
                editor,
                provider.as_ref(),
                &mut trips,
                stdin.lock(),
                io::stdout(),
            )?;
        }
        Commands::Favorites(command) => {
            let mut favorites = FavoritesStore::load(store.clone());
            match command {
                FavoritesCommand::List => {
                    if favorites.is_empty() {
                        println!("No favorites yet.");
                    } else {
                        display::write_stops(&mut io::stdout(), favorites.favorites(), |_| true)?;
                    }
                }
                FavoritesCommand::Add { stop_id } => {
                    let stop = find_known_stop(&store, &stop_id).ok_or_else(|| {
                        anyhow!("No stop '{}' in the active trip or last search.", stop_id)
                    })?;
                    let name = stop.name.clone();
                    if favorites.add(stop) {
                        println!("Added '{}' to favorites.", name);
                    } else {
                        println!("'{}' is already a favorite.", name);
                    }
                }
                FavoritesCommand::Remove { stop_id } => {
                    if favorites.remove(&stop_id) {
                        println!("Removed '{}' from favorites.", stop_id);
                    } else {
                        println!("'{}' is not a favorite.", stop_id);
                    }
                }
            }
        }
        Commands::Health => {
            if provider.health() {
                println!(
                    "Backend is healthy ({}).",
                    describe_backend(cli.offline, &settings)
                );
                match provider.maps_config() {
                    Ok(config) if !config.maps_api_key.is_empty() => {
                        println!("Maps key configured.")
                    }
                    Ok(_) => println!("Maps key not configured."),
                    Err(e) => log::warn!("Maps config unavailable — error={}", e),
                }
            } else {
                return Err(anyhow!(
                    "Backend unreachable at {}.",
                    describe_backend(cli.offline, &settings)
                ));
            }
        }
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    let _ = TermLogger::init(
        level,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    );
}

fn describe_backend(offline: bool, settings: &Settings) -> String {
    if offline {
        "offline".to_string()
    } else {
        settings.api_base_url.clone()
    }
}

fn provider_error(e: ProviderError) -> anyhow::Error {
    anyhow!(ChaloError::from(e).user_message())
}

fn save_results(mut store: FileStore, location: &str, itineraries: Vec<Itinerary>) -> Result<()> {
    let search = LastSearch {
        location: location.to_string(),
        itineraries,
    };
    let content = serde_json::to_string(&search).context("Failed to serialize search results")?;
    store
        .set(LAST_SEARCH_KEY, &content)
        .map_err(|e| anyhow!(e.user_message()))
}

fn load_results(store: &FileStore) -> Result<LastSearch> {
    let content = store
        .get(LAST_SEARCH_KEY)
        .map_err(|e| anyhow!(e.user_message()))?
        .ok_or_else(|| anyhow!("No saved search. Run `chalo search <location>` first."))?;
    serde_json::from_str(&content).context("Saved search results are unreadable; search again")
}

fn print_results(store: &FileStore) -> Result<()> {
    let search = load_results(store)?;
    let favorites = FavoritesStore::load(store.clone());
    if search.itineraries.is_empty() {
        println!("No itineraries found for {}.", search.location);
        return Ok(());
    }
    println!("Itineraries for {}:", search.location);
    let mut out = io::stdout();
    for (i, itinerary) in search.itineraries.iter().enumerate() {
        print!("\n[{}] ", i + 1);
        display::write_itinerary(&mut out, itinerary, |id| favorites.is_favorite(id))?;
    }
    Ok(())
}

/// `index` is 1-based, as printed.
fn pick_itinerary(search: &LastSearch, index: usize) -> Result<Itinerary> {
    index
        .checked_sub(1)
        .and_then(|i| search.itineraries.get(i))
        .cloned()
        .ok_or_else(|| {
            anyhow!(
                "No itinerary {}; the last search has {}.",
                index,
                search.itineraries.len()
            )
        })
}

fn find_known_stop(store: &FileStore, stop_id: &str) -> Option<Stop> {
    let trips = TripStore::load(store.clone());
    let in_trip = trips
        .current()
        .and_then(|t| t.itinerary.stop(stop_id).cloned());
    in_trip.or_else(|| {
        load_results(store).ok().and_then(|search| {
            search
                .itineraries
                .iter()
                .find_map(|i| i.stop(stop_id).cloned())
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chalo_core::provider::{ItineraryRequest, MockSpotProvider};

    #[test]
    fn test_cli_parses() {
        let cli = Cli::try_parse_from([
            "chalo", "--offline", "-vv", "custom", "Soho", "-c", "cafe", "-c", "park",
        ])
        .unwrap();
        assert!(cli.offline);
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Custom { categories, .. } => assert_eq!(categories, vec!["cafe", "park"]),
            _ => panic!("expected custom"),
        }
        assert!(Cli::try_parse_from(["chalo", "custom", "Soho"]).is_err());
    }

    #[test]
    fn test_results_round_trip_through_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        let response = MockSpotProvider::seeded(1)
            .itineraries(&ItineraryRequest {
                location: "Soho".into(),
                preset: None,
                max_price_level: None,
                max_distance_miles: None,
            })
            .unwrap();
        let stop_id = response.itineraries[1].stops[0].id.clone();
        save_results(store.clone(), "Soho", response.itineraries).unwrap();

        let search = load_results(&store).unwrap();
        assert_eq!(pick_itinerary(&search, 2).unwrap().stops[0].id, stop_id);
        assert!(pick_itinerary(&search, 0).is_err());
        assert!(pick_itinerary(&search, 4).is_err());
        assert_eq!(find_known_stop(&store, &stop_id).unwrap().id, stop_id);
        assert!(find_known_stop(&store, "nope").is_none());
    }
}
