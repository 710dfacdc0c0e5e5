use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use inquire::{CustomType, InquireError, Text};
use weather_widget_core::{
    Config, HttpWeatherEndpoint, LookupController, LookupOutcome, endpoint_from_config,
};

use crate::present::{self, OutputFormat};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-widget", version, about = "Current weather for a city, via the widget's proxy")]
pub struct Cli {
    /// Base URL of the weather proxy; overrides the config file and WEATHER_WIDGET_ENDPOINT.
    #[arg(long, global = true)]
    pub endpoint: Option<String>,

    /// Log lookup details to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Look up the current weather for a city once.
    Lookup {
        /// City name; several words are joined with spaces.
        #[arg(num_args = 0..)]
        city: Vec<String>,

        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },

    /// Prompt for cities until cancelled (Esc / Ctrl-C).
    Interactive {
        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },

    /// Set the proxy base URL and request timeout.
    Configure,

    /// Print the location of the config file.
    ConfigPath,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<ExitCode> {
        match self.command {
            Command::Lookup { city, format } => {
                let controller = build_controller(self.endpoint.as_deref())?;
                controller.set_city(city.join(" "));

                let outcome = controller.perform_lookup().await;
                present::show(&controller.state(), format)?;

                Ok(match outcome {
                    LookupOutcome::Rendered => ExitCode::SUCCESS,
                    _ => ExitCode::FAILURE,
                })
            }
            Command::Interactive { format } => {
                let controller = build_controller(self.endpoint.as_deref())?;
                interactive(&controller, format).await?;
                Ok(ExitCode::SUCCESS)
            }
            Command::Configure => {
                configure()?;
                Ok(ExitCode::SUCCESS)
            }
            Command::ConfigPath => {
                println!("{}", Config::config_file_path()?.display());
                Ok(ExitCode::SUCCESS)
            }
        }
    }
}

fn resolve_config(endpoint: Option<&str>) -> anyhow::Result<Config> {
    let mut config = Config::load()?;
    if let Some(url) = endpoint {
        config.set_base_url(url)?;
    }

    Ok(config)
}

fn build_controller(endpoint: Option<&str>) -> anyhow::Result<LookupController<HttpWeatherEndpoint>> {
    let config = resolve_config(endpoint)?;
    tracing::debug!(base_url = config.base_url(), timeout = ?config.timeout(), "using weather endpoint");

    Ok(LookupController::new(endpoint_from_config(&config)?))
}

async fn interactive(
    controller: &LookupController<HttpWeatherEndpoint>,
    format: OutputFormat,
) -> anyhow::Result<()> {
    println!("Weather proxy: {}", controller.endpoint().base_url());

    loop {
        let prompt = tokio::task::spawn_blocking(|| Text::new("City:").prompt())
            .await
            .context("City prompt task failed")?;

        let city = match prompt {
            Ok(city) => city,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(e) => return Err(anyhow::Error::new(e).context("Failed to read city")),
        };

        controller.set_city(city);

        let rx = controller.subscribe();
        let (_, shown) = tokio::join!(controller.perform_lookup(), present::follow(rx, format));
        shown?;
    }

    Ok(())
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let base_url = Text::new("Weather proxy base URL:")
        .with_default(config.base_url())
        .with_help_message("Requests go to <base URL>/api/weather")
        .prompt()
        .context("Failed to read base URL")?;
    config.set_base_url(&base_url)?;

    let timeout_secs = CustomType::<u64>::new("Request timeout (seconds):")
        .with_default(config.endpoint.timeout_secs)
        .with_error_message("Please enter a whole number of seconds")
        .prompt()
        .context("Failed to read timeout")?;
    config.set_timeout_secs(timeout_secs)?;

    let path = config.save()?;
    println!("Saved configuration to {}", path.display());

    Ok(())
}
