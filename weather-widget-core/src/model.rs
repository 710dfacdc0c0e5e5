use serde::{Deserialize, Serialize};

use crate::error::LookupError;

/// A validated lookup: the city is trimmed and never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupRequest {
    city: String,
}

impl LookupRequest {
    /// Trim the raw field value and reject it if nothing is left.
    pub fn parse(raw: &str) -> Result<Self, LookupError> {
        let city = raw.trim();
        if city.is_empty() {
            return Err(LookupError::EmptyCity);
        }

        Ok(Self { city: city.to_string() })
    }

    pub fn city(&self) -> &str {
        &self.city
    }
}

/// One entry of the `weather` array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub description: String,
    pub icon: String,
}

/// Weather data returned by the endpoint on success.
///
/// Deserialization goes through the wire shape and rejects an empty
/// `weather` array, so a constructed payload always has a condition.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "WirePayload")]
pub struct WeatherPayload {
    pub location_name: String,
    pub country: String,
    pub temperature_c: f64,
    pub humidity_pct: f64,
    pub wind_speed_mps: f64,
    pub condition: Condition,
}

#[derive(Debug, Deserialize)]
struct WireSys {
    country: String,
}

#[derive(Debug, Deserialize)]
struct WireMain {
    temp: f64,
    humidity: f64,
}

#[derive(Debug, Deserialize)]
struct WireWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct WirePayload {
    name: String,
    sys: WireSys,
    main: WireMain,
    wind: WireWind,
    weather: Vec<Condition>,
}

impl TryFrom<WirePayload> for WeatherPayload {
    type Error = String;

    fn try_from(wire: WirePayload) -> Result<Self, Self::Error> {
        let condition = wire
            .weather
            .into_iter()
            .next()
            .ok_or_else(|| "weather response contained no conditions".to_string())?;

        Ok(Self {
            location_name: wire.name,
            country: wire.sys.country,
            temperature_c: wire.main.temp,
            humidity_pct: wire.main.humidity,
            wind_speed_mps: wire.wind.speed,
            condition,
        })
    }
}
