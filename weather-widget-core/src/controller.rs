//! Drives one lookup cycle and publishes the resulting view state.
//!
//! The controller owns the city field and the view state. Display surfaces
//! never touch either directly: they write the field with [`LookupController::set_city`]
//! and observe the state through [`LookupController::subscribe`].

use std::{
    fmt,
    sync::atomic::{AtomicU64, Ordering},
};

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::{
    LookupError, LookupRequest, WeatherEndpoint,
    render::{DisplayContent, render},
};

/// Placeholder shown while a request is in flight.
pub const QUERYING_MESSAGE: &str = "querying...";

/// Prefix of every message shown in the error region.
pub const FAILURE_PREFIX: &str = "query failed: ";

/// What the display surface should currently show.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ViewState {
    #[default]
    Idle,
    Loading,
    /// The city field was blank; the message replaces the placeholder.
    Invalid(String),
    Success(DisplayContent),
    /// Reason for the failure, without the `query failed: ` prefix.
    Error(String),
}

impl ViewState {
    /// Text of the result region, or `None` when it is empty.
    pub fn result_text(&self) -> Option<String> {
        match self {
            Self::Idle | Self::Error(_) => None,
            Self::Loading => Some(QUERYING_MESSAGE.to_string()),
            Self::Invalid(msg) => Some(msg.clone()),
            Self::Success(content) => Some(content.to_string()),
        }
    }

    /// Text of the error region, or `None` when it is hidden.
    pub fn error_text(&self) -> Option<String> {
        match self {
            Self::Error(reason) => Some(format!("{FAILURE_PREFIX}{reason}")),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }
}

impl fmt::Display for ViewState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.result_text(), self.error_text()) {
            (_, Some(err)) => f.write_str(&err),
            (Some(result), None) => f.write_str(&result),
            (None, None) => Ok(()),
        }
    }
}

/// How a call to [`LookupController::perform_lookup`] ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupOutcome {
    Rendered,
    Invalid,
    Failed,
    /// A newer lookup started while this one was in flight; its result was dropped.
    Superseded,
}

#[derive(Debug)]
pub struct LookupController<E> {
    endpoint: E,
    city: watch::Sender<String>,
    state: watch::Sender<ViewState>,
    generation: AtomicU64,
}

impl<E: WeatherEndpoint> LookupController<E> {
    pub fn new(endpoint: E) -> Self {
        let (city, _) = watch::channel(String::new());
        let (state, _) = watch::channel(ViewState::Idle);

        Self {
            endpoint,
            city,
            state,
            generation: AtomicU64::new(0),
        }
    }

    pub fn endpoint(&self) -> &E {
        &self.endpoint
    }

    /// Replace the contents of the city field.
    pub fn set_city(&self, city: impl Into<String>) {
        self.city.send_replace(city.into());
    }

    pub fn city(&self) -> String {
        self.city.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> ViewState {
        self.state.borrow().clone()
    }

    /// Run one lookup cycle against the current city field.
    ///
    /// `Loading` is published before anything else. Every exit path other than
    /// [`LookupOutcome::Superseded`] replaces it, and a superseded cycle leaves the
    /// state to the newer lookup.
    pub async fn perform_lookup(&self) -> LookupOutcome {
        let token = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.publish(ViewState::Loading);

        let raw = self.city();
        let request = match LookupRequest::parse(&raw) {
            Ok(request) => request,
            Err(err) => {
                debug!(lookup = token, "blank city, skipping request");
                self.publish(ViewState::Invalid(err.to_string()));
                return LookupOutcome::Invalid;
            }
        };

        let result = self.endpoint.fetch(&request).await;

        let latest = self.generation.load(Ordering::SeqCst);
        if latest != token {
            debug!(lookup = token, latest, city = request.city(), "discarding stale response");
            return LookupOutcome::Superseded;
        }

        match result {
            Ok(payload) => {
                info!(lookup = token, city = request.city(), "weather lookup succeeded");
                self.publish(ViewState::Success(render(&payload)));
                LookupOutcome::Rendered
            }
            Err(err) => {
                log_failure(token, &request, &err);
                self.publish(ViewState::Error(err.to_string()));
                LookupOutcome::Failed
            }
        }
    }

    fn publish(&self, state: ViewState) {
        self.state.send_replace(state);
    }
}

fn log_failure(token: u64, request: &LookupRequest, err: &LookupError) {
    match err.status() {
        Some(status) => warn!(lookup = token, city = request.city(), %status, error = %err, "weather lookup failed"),
        None => warn!(lookup = token, city = request.city(), error = ?err, "weather lookup failed"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{WeatherPayload, model::Condition};
    use async_trait::async_trait;
    use reqwest::StatusCode;
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };
    use tokio::sync::Notify;

    /// Answers from the city name: "Nowhere" is rejected, "Slow" waits for `release`.
    #[derive(Debug, Default)]
    struct ScriptedEndpoint {
        calls: AtomicUsize,
        called: Notify,
        release: Notify,
    }

    fn payload_for(city: &str) -> WeatherPayload {
        WeatherPayload {
            location_name: city.to_string(),
            country: "TW".to_string(),
            temperature_c: 28.3,
            humidity_pct: 70.0,
            wind_speed_mps: 3.2,
            condition: Condition {
                description: "clear sky".to_string(),
                icon: "01d".to_string(),
            },
        }
    }

    #[async_trait]
    impl WeatherEndpoint for Arc<ScriptedEndpoint> {
        async fn fetch(&self, request: &LookupRequest) -> Result<WeatherPayload, LookupError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.called.notify_one();

            match request.city() {
                "Nowhere" => Err(LookupError::Rejected {
                    status: StatusCode::NOT_FOUND,
                    reason: "city not found".to_string(),
                }),
                "Slow" => {
                    self.release.notified().await;
                    Ok(payload_for("Slow"))
                }
                city => Ok(payload_for(city)),
            }
        }
    }

    fn controller() -> (Arc<LookupController<Arc<ScriptedEndpoint>>>, Arc<ScriptedEndpoint>) {
        let endpoint = Arc::new(ScriptedEndpoint::default());
        (Arc::new(LookupController::new(endpoint.clone())), endpoint)
    }

    #[tokio::test]
    async fn starts_idle_with_empty_regions() {
        let (ctl, _) = controller();
        let state = ctl.state();

        assert_eq!(state, ViewState::Idle);
        assert!(state.result_text().is_none());
        assert!(state.error_text().is_none());
    }

    #[tokio::test]
    async fn blank_city_makes_no_request() {
        let (ctl, endpoint) = controller();

        for raw in ["", "   ", "\t\n"] {
            ctl.set_city(raw);
            assert_eq!(ctl.perform_lookup().await, LookupOutcome::Invalid);
        }

        assert_eq!(endpoint.calls.load(Ordering::SeqCst), 0);
        let state = ctl.state();
        assert_eq!(state.result_text().as_deref(), Some("please enter a valid city name"));
        assert!(state.error_text().is_none());
    }

    #[tokio::test]
    async fn success_renders_trimmed_city() {
        let (ctl, endpoint) = controller();
        ctl.set_city("  Taipei  ");

        assert_eq!(ctl.perform_lookup().await, LookupOutcome::Rendered);
        assert_eq!(endpoint.calls.load(Ordering::SeqCst), 1);

        match ctl.state() {
            ViewState::Success(content) => {
                assert_eq!(content.title, "Taipei, TW");
                assert_eq!(content.temperature, "28°C");
            }
            other => panic!("unexpected state: {other:?}"),
        }
    }

    #[tokio::test]
    async fn failure_clears_result_and_shows_reason() {
        let (ctl, _) = controller();

        ctl.set_city("Taipei");
        ctl.perform_lookup().await;
        assert!(ctl.state().result_text().is_some());

        ctl.set_city("Nowhere");
        assert_eq!(ctl.perform_lookup().await, LookupOutcome::Failed);

        let state = ctl.state();
        assert!(state.result_text().is_none());
        assert_eq!(state.error_text().as_deref(), Some("query failed: city not found"));
        assert_eq!(state.to_string(), "query failed: city not found");
    }

    #[tokio::test]
    async fn loading_is_published_before_the_request_returns() {
        let (ctl, endpoint) = controller();
        let mut rx = ctl.subscribe();
        ctl.set_city("Slow");

        let task = tokio::spawn({
            let ctl = ctl.clone();
            async move { ctl.perform_lookup().await }
        });

        endpoint.called.notified().await;
        assert!(ctl.state().is_loading());
        assert_eq!(ctl.state().result_text().as_deref(), Some(QUERYING_MESSAGE));
        assert!(rx.has_changed().unwrap());

        endpoint.release.notify_one();
        assert_eq!(task.await.unwrap(), LookupOutcome::Rendered);

        rx.changed().await.unwrap();
        assert!(matches!(*rx.borrow_and_update(), ViewState::Success(_)));
    }

    #[tokio::test]
    async fn stale_response_is_discarded() {
        let (ctl, endpoint) = controller();
        ctl.set_city("Slow");

        let slow = tokio::spawn({
            let ctl = ctl.clone();
            async move { ctl.perform_lookup().await }
        });
        endpoint.called.notified().await;

        ctl.set_city("Taipei");
        assert_eq!(ctl.perform_lookup().await, LookupOutcome::Rendered);

        endpoint.release.notify_one();
        assert_eq!(slow.await.unwrap(), LookupOutcome::Superseded);

        match ctl.state() {
            ViewState::Success(content) => assert_eq!(content.title, "Taipei, TW"),
            other => panic!("unexpected state: {other:?}"),
        }
        assert_eq!(endpoint.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn blank_lookup_supersedes_in_flight_request() {
        let (ctl, endpoint) = controller();
        ctl.set_city("Slow");

        let slow = tokio::spawn({
            let ctl = ctl.clone();
            async move { ctl.perform_lookup().await }
        });
        endpoint.called.notified().await;

        ctl.set_city(" ");
        assert_eq!(ctl.perform_lookup().await, LookupOutcome::Invalid);

        endpoint.release.notify_one();
        assert_eq!(slow.await.unwrap(), LookupOutcome::Superseded);
        assert!(matches!(ctl.state(), ViewState::Invalid(_)));
    }
}
