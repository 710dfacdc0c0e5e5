use clap::ValueEnum;
use tokio::sync::watch;
use weather_widget_core::{DisplayContent, ViewState};

/// How a rendered card is written to stdout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Html,
    Json,
}

impl OutputFormat {
    pub fn format(self, content: &DisplayContent) -> anyhow::Result<String> {
        Ok(match self {
            Self::Text => content.to_string(),
            Self::Html => content.to_html(),
            Self::Json => serde_json::to_string_pretty(content)?,
        })
    }
}

/// Write one view state to the terminal: results to stdout, errors to stderr.
pub fn show(state: &ViewState, format: OutputFormat) -> anyhow::Result<()> {
    match state {
        ViewState::Idle => {}
        ViewState::Success(content) => println!("{}", format.format(content)?),
        ViewState::Error(_) => {
            if let Some(err) = state.error_text() {
                eprintln!("{err}");
            }
        }
        ViewState::Loading | ViewState::Invalid(_) => {
            if let Some(text) = state.result_text() {
                println!("{text}");
            }
        }
    }

    Ok(())
}

/// Follow the view state until the current lookup settles.
pub async fn follow(mut rx: watch::Receiver<ViewState>, format: OutputFormat) -> anyhow::Result<()> {
    while rx.changed().await.is_ok() {
        let state = rx.borrow_and_update().clone();
        show(&state, format)?;

        if !state.is_loading() {
            break;
        }
    }

    Ok(())
}
