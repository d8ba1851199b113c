use serde_json::Value;

use crate::shared::types::{ResourceState, ResourceStatus};

pub const DEFAULT_ERROR_MESSAGE: &str = "Failed to load data.";

/// What a card should render for one resource.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewState<'a> {
    /// Nothing received yet and no failure recorded.
    Loading,
    /// Nothing received yet and the latest fetch failed.
    Error { message: &'a str },
    /// Last-known-good data. `refresh_error` is set when the latest
    /// refresh failed and the data shown is stale.
    Ready {
        data: &'a Value,
        refresh_error: Option<&'a str>,
    },
}

pub fn select(state: &ResourceState) -> ViewState<'_> {
    match (&state.data, state.status) {
        (Some(data), _) => ViewState::Ready {
            data,
            refresh_error: refresh_error(state),
        },
        (None, ResourceStatus::Error) => ViewState::Error {
            message: error_message(state),
        },
        (None, ResourceStatus::Idle | ResourceStatus::Loading | ResourceStatus::Ok) => {
            ViewState::Loading
        }
    }
}

/// Banner text for "showing old data, latest refresh failed".
pub fn refresh_error(state: &ResourceState) -> Option<&str> {
    if state.status == ResourceStatus::Error && state.data.is_some() {
        Some(error_message(state))
    } else {
        None
    }
}

fn error_message(state: &ResourceState) -> &str {
    match state.error.as_deref() {
        Some(msg) if !msg.trim().is_empty() => msg,
        _ => DEFAULT_ERROR_MESSAGE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn idle_and_loading_without_data_are_loading() {
        let mut state = ResourceState::default();
        assert_eq!(select(&state), ViewState::Loading);
        state.begin_loading();
        assert_eq!(select(&state), ViewState::Loading);
    }

    #[test]
    fn first_failure_is_error() {
        let mut state = ResourceState::default();
        state.begin_loading();
        state.fail("Request failed: 500 Internal Server Error - rate limited");
        assert_eq!(
            select(&state),
            ViewState::Error {
                message: "Request failed: 500 Internal Server Error - rate limited"
            }
        );
        assert_eq!(refresh_error(&state), None);
    }

    #[test]
    fn empty_error_message_falls_back() {
        let mut state = ResourceState::default();
        state.fail("");
        assert_eq!(
            select(&state),
            ViewState::Error {
                message: DEFAULT_ERROR_MESSAGE
            }
        );
    }

    #[test]
    fn stale_data_stays_ready_with_banner() {
        let mut state = ResourceState::default();
        state.succeed(json!({"percentRemaining": 40}));
        state.begin_loading();
        state.fail("network down");

        let data = json!({"percentRemaining": 40});
        assert_eq!(
            select(&state),
            ViewState::Ready {
                data: &data,
                refresh_error: Some("network down"),
            }
        );
        assert_eq!(refresh_error(&state), Some("network down"));
    }

    #[test]
    fn refresh_in_flight_keeps_showing_data() {
        let mut state = ResourceState::default();
        state.succeed(json!([1, 2]));
        state.begin_loading();
        match select(&state) {
            ViewState::Ready {
                data,
                refresh_error,
            } => {
                assert_eq!(data, &json!([1, 2]));
                assert!(refresh_error.is_none());
            }
            other => panic!("expected ready, got {other:?}"),
        }
    }
}
