//! Interactive `meteo configure`.

use anyhow::Result;
use inquire::{Confirm, CustomUserError, Select, Text, validator::Validation};
use meteo_core::{Config, Geocoder, format::parse_locale};

const CLOCK_12: &str = "12-hour (5:07 PM)";
const CLOCK_24: &str = "24-hour (17:07)";

pub async fn run(config: &mut Config) -> Result<()> {
    let current_locale = config.locale.clone().unwrap_or_default();
    let locale = Text::new("Locale (e.g. en_US, de_DE; empty uses the system locale):")
        .with_initial_value(&current_locale)
        .with_validator(|input: &str| -> Result<Validation, CustomUserError> {
            if input.trim().is_empty() || parse_locale(input.trim()).is_some() {
                Ok(Validation::Valid)
            } else {
                Ok(Validation::Invalid("Unknown locale".into()))
            }
        })
        .prompt()?;
    config.locale = Some(locale.trim().to_string()).filter(|l| !l.is_empty());

    let clock = Select::new("Clock format:", vec![CLOCK_12, CLOCK_24])
        .with_starting_cursor(if config.hour12 { 0 } else { 1 })
        .prompt()?;
    config.hour12 = clock == CLOCK_12;

    let prompt = match &config.default_location {
        Some(saved) => format!("Change the default location (currently {})?", saved.name),
        None => "Set a default location?".to_string(),
    };
    if Confirm::new(&prompt).with_default(config.default_location.is_none()).prompt()? {
        pick_default_location(config).await?;
    }

    config.save()?;
    println!("Configuration saved to {}", Config::config_file_path()?.display());
    Ok(())
}

async fn pick_default_location(config: &mut Config) -> Result<()> {
    let geocoder = Geocoder::new(&config.api)?;

    loop {
        let name = Text::new("City name:").prompt()?;
        let places = geocoder.search(&name).await?;

        if places.is_empty() {
            println!("No cities found.");
            if Confirm::new("Try another name?").with_default(true).prompt()? {
                continue;
            }
            return Ok(());
        }

        let place = Select::new("Select a place:", places).prompt()?;
        config.set_default_location(&place.to_location()?);
        println!("Default location: {}", place.label());
        return Ok(());
    }
}
