use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use meteo_core::{
    Config, Coordinates, ForecastRequest, ForecastScope, Geocoder, Location, Place,
    provider::provider_from_config,
};

use crate::{
    configure,
    render::{self, Renderer, Section},
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "meteo", version, about = "Weather lookup powered by Open-Meteo")]
pub struct Cli {
    /// Increase log verbosity (-v, -vv, -vvv). `RUST_LOG` takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Interactively set locale, clock format and default location.
    Configure,

    /// Show weather for a place, coordinates or the default location.
    Show(ShowArgs),

    /// Search for places by name.
    Search {
        /// City or place name.
        name: String,
    },

    /// List WMO weather codes with their descriptions.
    Codes,
}

#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Place name to look up; the first match is used unless --pick is given.
    #[arg(conflicts_with_all = ["lat", "lon"])]
    pub place: Option<String>,

    /// Latitude in decimal degrees.
    #[arg(long, requires = "lon", allow_negative_numbers = true)]
    pub lat: Option<f64>,

    /// Longitude in decimal degrees; wrapped into -180..180.
    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    pub lon: Option<f64>,

    /// Show current, hourly and daily forecasts instead of the summary card.
    #[arg(long)]
    pub details: bool,

    /// Which part of the detailed view to print.
    #[arg(long, value_enum, requires = "details")]
    pub section: Option<Section>,

    /// Choose among search matches interactively.
    #[arg(long)]
    pub pick: bool,

    /// Remember the resolved location as the default.
    #[arg(long)]
    pub save: bool,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let mut config = Config::load()?;

        match self.command {
            Command::Configure => configure::run(&mut config).await?,
            Command::Show(args) => show(&mut config, args).await?,
            Command::Search { name } => {
                let geocoder = Geocoder::new(&config.api)?;
                let places = geocoder.search(&name).await?;
                print!("{}", render::search_results(&places));
            }
            Command::Codes => print!("{}", render::code_table()),
        }

        Ok(())
    }
}

async fn show(config: &mut Config, args: ShowArgs) -> anyhow::Result<()> {
    let geocoder = Geocoder::new(&config.api)?;
    let location = resolve_location(config, &geocoder, &args).await?;
    tracing::info!(name = ?location.name, coordinates = %location.coordinates, "location resolved");

    if args.save {
        config.set_default_location(&location);
        config.save()?;
    }

    let scope = if args.details { ForecastScope::Detailed } else { ForecastScope::Summary };
    let provider = provider_from_config(config)?;
    let forecast = provider
        .forecast(&ForecastRequest { coordinates: location.coordinates, scope })
        .await
        .context("Failed to fetch weather data")?;

    let renderer = Renderer::new(config.formatter(), config.hour12);
    let output = if args.details {
        renderer.details(&location, &forecast, args.section.unwrap_or_default())?
    } else {
        renderer.summary(&location, &forecast)
    };

    print!("{output}");
    Ok(())
}

/// Coordinates first, then a place name, then the configured default.
async fn resolve_location(
    config: &Config,
    geocoder: &Geocoder,
    args: &ShowArgs,
) -> anyhow::Result<Location> {
    if let (Some(lat), Some(lon)) = (args.lat, args.lon) {
        let coordinates = Coordinates::new(lat, lon)?;
        let name = geocoder.reverse(coordinates).await;
        return Ok(Location { name, coordinates });
    }

    if let Some(name) = args.place.as_deref() {
        let places = geocoder
            .search(name)
            .await
            .with_context(|| format!("Failed to search for '{name}'"))?;
        let place = choose_place(name, places, args.pick)?;
        return Ok(place.to_location()?);
    }

    config.default_location()
}

fn choose_place(name: &str, mut places: Vec<Place>, interactive: bool) -> anyhow::Result<Place> {
    if places.is_empty() {
        bail!("No cities found matching '{name}'.");
    }

    if interactive && places.len() > 1 {
        return Ok(inquire::Select::new("Select a place:", places).prompt()?);
    }

    Ok(places.swap_remove(0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn place(name: &str) -> Place {
        Place {
            name: name.into(),
            latitude: 0.0,
            longitude: 0.0,
            country: None,
            country_code: None,
            admin1: None,
            timezone: None,
        }
    }

    #[test]
    fn parses_show_with_negative_coordinates() {
        let cli = Cli::try_parse_from(["meteo", "show", "--lat", "-33.87", "--lon", "-151.21", "--details"])
            .expect("parses");

        let Command::Show(args) = cli.command else {
            panic!("expected show");
        };
        assert_eq!(args.lat, Some(-33.87));
        assert_eq!(args.lon, Some(-151.21));
        assert!(args.details);
        assert_eq!(args.section, None);
    }

    #[test]
    fn latitude_requires_longitude() {
        assert!(Cli::try_parse_from(["meteo", "show", "--lat", "10"]).is_err());
    }

    #[test]
    fn place_conflicts_with_coordinates() {
        assert!(Cli::try_parse_from(["meteo", "show", "Paris", "--lat", "1", "--lon", "2"]).is_err());
    }

    #[test]
    fn section_needs_details() {
        assert!(Cli::try_parse_from(["meteo", "show", "Paris", "--section", "hourly"]).is_err());
        assert!(Cli::try_parse_from(["meteo", "show", "Paris", "--details", "--section", "hourly"]).is_ok());
    }

    #[test]
    fn verbosity_is_counted() {
        let cli = Cli::try_parse_from(["meteo", "-vv", "codes"]).expect("parses");
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn choose_place_takes_first_match() {
        let chosen = choose_place("x", vec![place("First"), place("Second")], false).expect("chosen");
        assert_eq!(chosen.name, "First");
    }

    #[test]
    fn choose_place_without_matches_errors() {
        let err = choose_place("Atlantis", Vec::new(), false).unwrap_err();
        assert_eq!(err.to_string(), "No cities found matching 'Atlantis'.");
    }
}
