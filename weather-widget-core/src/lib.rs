//! Core library for the weather widget.
//!
//! This crate defines:
//! - The lookup controller and the view state it publishes
//! - The weather endpoint abstraction and its HTTP implementation
//! - The renderer turning a payload into display content
//! - Configuration handling
//!
//! It is used by `weather-widget-cli`, but any other display surface can drive
//! a [`LookupController`] and subscribe to its [`ViewState`].

pub mod config;
pub mod controller;
pub mod endpoint;
pub mod error;
pub mod model;
pub mod render;

pub use config::{Config, EndpointConfig};
pub use controller::{LookupController, LookupOutcome, ViewState};
pub use endpoint::{HttpWeatherEndpoint, WeatherEndpoint, endpoint_from_config};
pub use error::LookupError;
pub use model::{Condition, LookupRequest, WeatherPayload};
pub use render::{DisplayContent, render};
