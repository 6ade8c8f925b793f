use async_trait::async_trait;
use reqwest::Client;
use tracing::instrument;

use crate::{
    config::ApiConfig,
    error::WeatherError,
    http::{self, ApiErrorBody, Reply},
    model::Forecast,
};

use super::{ForecastRequest, ForecastScope, WeatherProvider};

const SERVICE: &str = "Open-Meteo forecast";

const SUMMARY_CURRENT: &str = "temperature_2m,relative_humidity_2m,apparent_temperature,is_day,\
precipitation,rain,showers,snowfall,weather_code,cloud_cover,wind_speed_10m,wind_direction_10m,\
wind_gusts_10m";

const SUMMARY_DAILY: &str = "weather_code,temperature_2m_max,temperature_2m_min,sunrise,sunset,\
uv_index_max,precipitation_sum,rain_sum,showers_sum,snowfall_sum,precipitation_hours,\
precipitation_probability_max";

const DETAILED_CURRENT: &str = "temperature_2m,relative_humidity_2m,apparent_temperature,is_day,\
precipitation,rain,showers,snowfall,weather_code,cloud_cover,pressure_msl,surface_pressure,\
wind_speed_10m,wind_direction_10m,wind_gusts_10m";

const DETAILED_HOURLY: &str = "temperature_2m,relative_humidity_2m,dew_point_2m,\
apparent_temperature,precipitation_probability,precipitation,weather_code,pressure_msl,\
surface_pressure,cloud_cover,visibility,wind_speed_10m,wind_direction_10m,wind_gusts_10m,\
uv_index,is_day";

const DETAILED_DAILY: &str = "weather_code,temperature_2m_max,temperature_2m_min,sunrise,sunset,\
uv_index_max,precipitation_sum,rain_sum,showers_sum,snowfall_sum,precipitation_hours,\
precipitation_probability_max,wind_speed_10m_max,wind_gusts_10m_max,wind_direction_10m_dominant,\
shortwave_radiation_sum,et0_fao_evapotranspiration";

/// Client for `GET /v1/forecast`.
#[derive(Debug, Clone)]
pub struct OpenMeteoProvider {
    base_url: String,
    http: Client,
}

impl OpenMeteoProvider {
    pub fn new(config: &ApiConfig) -> Result<Self, WeatherError> {
        Ok(Self { base_url: config.forecast_base_url.clone(), http: http::build_client(config)? })
    }

    fn query(request: &ForecastRequest) -> Vec<(&'static str, String)> {
        let mut query = vec![
            ("latitude", request.coordinates.latitude.to_string()),
            ("longitude", request.coordinates.longitude.to_string()),
        ];

        match request.scope {
            ForecastScope::Summary => {
                query.push(("current", SUMMARY_CURRENT.to_string()));
                query.push(("daily", SUMMARY_DAILY.to_string()));
            }
            ForecastScope::Detailed => {
                query.push(("current", DETAILED_CURRENT.to_string()));
                query.push(("hourly", DETAILED_HOURLY.to_string()));
                query.push(("daily", DETAILED_DAILY.to_string()));
            }
        }

        query.push(("timezone", "auto".to_string()));
        query
    }
}

#[async_trait]
impl WeatherProvider for OpenMeteoProvider {
    #[instrument(skip(self), fields(lat = request.coordinates.latitude, lon = request.coordinates.longitude))]
    async fn forecast(&self, request: &ForecastRequest) -> Result<Forecast, WeatherError> {
        let url = http::endpoint(&self.base_url, "forecast");
        tracing::debug!(%url, scope = ?request.scope, "requesting forecast");

        let res = self.http.get(&url).query(&Self::query(request)).send().await;
        let reply = Reply::read(SERVICE, res).await?;

        if !reply.status.is_success() {
            let message = http::api_reason(&reply.body)
                .unwrap_or_else(|| format!("API Error: {}", reply.status.as_u16()));
            tracing::warn!(status = %reply.status, %message, "forecast request failed");
            return Err(WeatherError::Api(message));
        }

        // A 200 can still carry `{"error": true, "reason": ...}` or `{"error": "..."}`.
        let error: ApiErrorBody = reply.json(SERVICE)?;
        if error.is_flagged() {
            let message = error.message().unwrap_or_else(|| "API Error: unknown reason".to_string());
            return Err(WeatherError::Api(message));
        }

        reply.json(SERVICE)
    }
}
