//! Shipline CLI entry point.

use shipline_cache::{CacheConfig, Freshness, ShipmentTracker};
use shipline_client::api_client::ApiClient;
use clap::Parser;
use shipline_client::cli::{self, Cli, Command};
use shipline_client::config::ClientConfig;
use shipline_client::error::CliError;
use shipline_client::geocoding::Geocoder;
use shipline_client::rating::pending_ratings;
use shipline_core::{format_tracking_number, is_valid_tracking_number, parse_tracking_number};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() {
    init_tracing();

    if let Err(err) = run().await {
        eprintln!("error: {}", err);
        if let CliError::Api(api_err) = &err {
            if api_err.is_session_expired() {
                eprintln!("Your session has expired. Please log in again.");
            }
        }
        std::process::exit(1);
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("shipline_client=info,shipline_cache=info,warn"));

    // Ignore a subscriber that is already installed
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

async fn run() -> Result<(), CliError> {
    let Cli { config, command } = Cli::parse();

    if command.is_offline() {
        match &command {
            Command::Validate { number } => {
                let valid = is_valid_tracking_number(number);
                println!("{}", if valid { "valid" } else { "invalid" });
            }
            Command::Format { number } => println!("{}", format_tracking_number(number)),
            _ => {}
        }
        return Ok(());
    }

    let config = ClientConfig::load(config.as_deref())?;
    let api = ApiClient::new(&config)?;
    tracing::debug!(base_url = api.base_url(), "client configured");

    let tracker = ShipmentTracker::new(
        api.clone(),
        CacheConfig::new().with_ttl(config.cache.ttl()),
    );

    match command {
        Command::Track { number } => {
            let number = parse_tracking_number(&number)?;
            let read = tracker.track_by_number(&number, Freshness::Cached).await?;
            print!("{}", cli::render_shipment(read.value()));
        }
        Command::Show { id } => {
            let read = tracker.get_by_id(id, Freshness::Cached).await?;
            print!("{}", cli::render_shipment(read.value()));
        }
        Command::Drivers => {
            let drivers = api.driver_availability().await?;
            print!("{}", cli::render_drivers(&drivers));
        }
        Command::Analytics => {
            let analytics = api.analytics().await?;
            print!("{}", cli::render_analytics(&analytics));
        }
        Command::Activity { page } => {
            let logs = api.my_activity(Some(page), None).await?;
            print!("{}", cli::render_activity(&logs));
        }
        Command::Ratings => {
            let me = api.current_user().await?;
            let shipments = api.list_shipments().await?;
            let pending = pending_ratings(&api, &shipments, me.id).await;
            print!("{}", cli::render_pending_ratings(&pending));
        }
        Command::Geocode { address } => {
            let client = reqwest::Client::builder()
                .timeout(config.request_timeout())
                .build()
                .map_err(shipline_client::ApiClientError::from)?;
            let geocoder = Geocoder::new(client, config.geocoding.clone());
            for result in geocoder.smart_geocode(&address.join(" ")).await? {
                println!("{:.6}, {:.6}  {}", result.lat, result.lng, result.address);
            }
        }
        Command::Validate { .. } | Command::Format { .. } => {}
    }

    Ok(())
}
