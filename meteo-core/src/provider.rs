use crate::{
    Config,
    error::WeatherError,
    model::{Coordinates, Forecast},
    provider::openmeteo::OpenMeteoProvider,
};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod openmeteo;

/// Which variables to request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ForecastScope {
    /// Current conditions plus today's sunrise/sunset.
    #[default]
    Summary,
    /// Current conditions, hourly and daily series.
    Detailed,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastRequest {
    pub coordinates: Coordinates,
    pub scope: ForecastScope,
}

#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn forecast(&self, request: &ForecastRequest) -> Result<Forecast, WeatherError>;
}

/// Construct the forecast provider described by `config`.
pub fn provider_from_config(config: &Config) -> Result<Box<dyn WeatherProvider>, WeatherError> {
    Ok(Box::new(OpenMeteoProvider::new(&config.api)?))
}
