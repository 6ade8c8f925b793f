use thiserror::Error;

/// Failures talking to the forecast and geocoding services.
#[derive(Debug, Error)]
pub enum WeatherError {
    /// The HTTP client could not be built.
    #[error("Failed to initialize HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// The request never produced a response body.
    #[error("Failed to reach {service}: {source}")]
    Request {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// The service answered with an error; the message is shown to the user as-is.
    #[error("{0}")]
    Api(String),

    #[error("Failed to parse {service} response: {source}")]
    Parse {
        service: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error(
        "Invalid coordinates ({latitude}, {longitude}): latitude must be within -90..90 and both values finite"
    )]
    InvalidCoordinates { latitude: f64, longitude: f64 },
}
