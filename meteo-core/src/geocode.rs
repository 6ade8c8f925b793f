//! Place lookup.
//!
//! Forward search goes to the Open-Meteo geocoding API. Naming a bare
//! coordinate pair uses Nominatim (OpenStreetMap) and is best-effort: any
//! failure yields `None` and the caller shows coordinates instead.

use reqwest::Client;
use serde::Deserialize;
use tracing::instrument;

use crate::{
    config::ApiConfig,
    error::WeatherError,
    http::{self, Reply},
    model::{Coordinates, Place},
};

const SEARCH_SERVICE: &str = "Open-Meteo geocoding";
const REVERSE_SERVICE: &str = "Nominatim";

/// Maximum number of matches requested per search.
pub const SEARCH_LIMIT: usize = 5;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<Place>,
}

#[derive(Debug, Deserialize)]
struct NominatimResponse {
    address: Option<NominatimAddress>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct NominatimAddress {
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    municipality: Option<String>,
    county: Option<String>,
    state: Option<String>,
    country: Option<String>,
}

impl NominatimAddress {
    /// `"<place>, <state>, <country>"`, skipping parts equal to the place.
    fn display_name(self) -> Option<String> {
        let state = self.state.clone();
        let country = self.country.clone();

        let place = [self.city, self.town, self.village, self.municipality, self.county, self.state, self.country]
            .into_iter()
            .flatten()
            .find(|p| !p.is_empty())?;

        let mut parts = vec![place.clone()];
        parts.extend(
            [state, country]
                .into_iter()
                .flatten()
                .filter(|s| !s.is_empty() && *s != place),
        );
        Some(parts.join(", "))
    }
}

/// Client for both lookup directions.
#[derive(Debug, Clone)]
pub struct Geocoder {
    search_base_url: String,
    reverse_base_url: String,
    http: Client,
}

impl Geocoder {
    pub fn new(config: &ApiConfig) -> Result<Self, WeatherError> {
        Ok(Self {
            search_base_url: config.geocoding_base_url.clone(),
            reverse_base_url: config.reverse_geocoding_base_url.clone(),
            http: http::build_client(config)?,
        })
    }

    /// Up to [`SEARCH_LIMIT`] places matching `name`. A blank name matches
    /// nothing and sends no request.
    #[instrument(skip(self))]
    pub async fn search(&self, name: &str) -> Result<Vec<Place>, WeatherError> {
        let name = name.trim();
        if name.is_empty() {
            return Ok(Vec::new());
        }

        let url = http::endpoint(&self.search_base_url, "search");
        let limit = SEARCH_LIMIT.to_string();
        let res = self
            .http
            .get(&url)
            .query(&[("name", name), ("count", limit.as_str()), ("language", "en"), ("format", "json")])
            .send()
            .await;
        let reply = Reply::read(SEARCH_SERVICE, res).await?;

        if !reply.status.is_success() {
            return Err(WeatherError::Api(format!(
                "Geocoding error! Status: {}",
                reply.status.as_u16()
            )));
        }

        let parsed: SearchResponse = reply.json(SEARCH_SERVICE)?;
        tracing::debug!(matches = parsed.results.len(), "geocoding search finished");
        Ok(parsed.results)
    }

    /// Human-readable name for `coordinates`, if the service knows one.
    #[instrument(skip(self))]
    pub async fn reverse(&self, coordinates: Coordinates) -> Option<String> {
        match self.try_reverse(coordinates).await {
            Ok(name) => name,
            Err(err) => {
                tracing::debug!(error = %err, "reverse geocoding failed");
                None
            }
        }
    }

    async fn try_reverse(&self, coordinates: Coordinates) -> Result<Option<String>, WeatherError> {
        let url = http::endpoint(&self.reverse_base_url, "reverse");
        let res = self
            .http
            .get(&url)
            .query(&[
                ("lat", coordinates.latitude.to_string()),
                ("lon", coordinates.longitude.to_string()),
                ("format", "json".to_string()),
                ("addressdetails", "1".to_string()),
                ("zoom", "10".to_string()),
            ])
            .send()
            .await;
        let reply = Reply::read(REVERSE_SERVICE, res).await?;

        if !reply.status.is_success() {
            return Err(WeatherError::Api(format!(
                "Reverse geocoding error! Status: {}",
                reply.status.as_u16()
            )));
        }

        let parsed: NominatimResponse = reply.json(REVERSE_SERVICE)?;
        let name = parsed.address.and_then(NominatimAddress::display_name);
        if let Some(name) = &name {
            tracing::info!(%name, "reverse geocoded");
        }
        Ok(name)
    }
}
