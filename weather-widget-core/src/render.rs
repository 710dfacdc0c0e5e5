//! Projection of a weather payload into display content.

use std::fmt;

use html_escape::{encode_double_quoted_attribute, encode_text};
use serde::Serialize;

use crate::WeatherPayload;

/// Image host for condition icons; `{icon}` is replaced by the icon code.
pub const ICON_URL_TEMPLATE: &str = "https://openweathermap.org/img/wn/{icon}@2x.png";

/// Everything the result region shows for one successful lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayContent {
    pub title: String,
    pub icon_url: String,
    pub icon_alt: String,
    pub temperature: String,
    pub description: String,
    pub humidity: String,
    pub wind: String,
}

/// Render a validated payload. Pure: the same payload always yields the same content.
pub fn render(payload: &WeatherPayload) -> DisplayContent {
    let condition = &payload.condition;

    DisplayContent {
        title: format!("{}, {}", payload.location_name, payload.country),
        icon_url: icon_url(&condition.icon),
        icon_alt: condition.description.clone(),
        temperature: format!("{}°C", round_temperature(payload.temperature_c)),
        description: format!("weather condition: {}", condition.description),
        humidity: format!("humidity: {}%", payload.humidity_pct),
        wind: format!("wind speed: {} m/s", payload.wind_speed_mps),
    }
}

pub fn icon_url(icon: &str) -> String {
    ICON_URL_TEMPLATE.replace("{icon}", icon)
}

/// Nearest integer, ties away from zero (21.5 -> 22, -21.5 -> -22).
pub fn round_temperature(celsius: f64) -> i64 {
    // `as` saturates and maps -0.0 to 0, so "-0°C" never shows up.
    celsius.round() as i64
}

impl DisplayContent {
    /// Markup for a web result region.
    pub fn to_html(&self) -> String {
        format!(
            concat!(
                "<h2>{title}</h2>\n",
                "<div class=\"weather-main\">\n",
                "    <img src=\"{src}\" alt=\"{alt}\">\n",
                "    <p class=\"temperature\">{temperature}</p>\n",
                "</div>\n",
                "<p class=\"description\">{description}</p>\n",
                "<p>{humidity}</p>\n",
                "<p>{wind}</p>\n",
            ),
            title = encode_text(&self.title),
            src = encode_double_quoted_attribute(&self.icon_url),
            alt = encode_double_quoted_attribute(&self.icon_alt),
            temperature = encode_text(&self.temperature),
            description = encode_text(&self.description),
            humidity = encode_text(&self.humidity),
            wind = encode_text(&self.wind),
        )
    }
}

impl fmt::Display for DisplayContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        writeln!(f, "{}  [{}]", self.temperature, self.icon_url)?;
        writeln!(f, "{}", self.description)?;
        writeln!(f, "{}", self.humidity)?;
        write!(f, "{}", self.wind)
    }
}
