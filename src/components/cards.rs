use dioxus::prelude::*;

use crate::shared::schema::ResourceData;
use crate::shared::types::ResourceState;
use crate::shared::view::{select, ViewState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    Error,
    Warning,
}

impl AlertKind {
    fn class(self) -> &'static str {
        match self {
            AlertKind::Error => "alert alert-error",
            AlertKind::Warning => "alert alert-warning",
        }
    }
}

#[allow(non_snake_case)]
#[component]
pub fn SectionAlert(kind: AlertKind, message: String) -> Element {
    let class = kind.class();
    rsx! {
        div { class: "{class}", role: "alert",
            span { class: "alert-indicator", "!" }
            span { "{message}" }
        }
    }
}

#[allow(non_snake_case)]
#[component]
pub fn LoadingCard(label: String) -> Element {
    rsx! {
        div { class: "card",
            div { class: "card-body card-loading",
                div { class: "spinner" }
                span { class: "muted", "Loading {label}..." }
            }
        }
    }
}

#[allow(non_snake_case)]
#[component]
pub fn ErrorCard(label: String, error: String) -> Element {
    rsx! {
        div { class: "card",
            div { class: "card-body",
                p { class: "card-label", "{label}" }
                SectionAlert { kind: AlertKind::Error, message: error }
            }
        }
    }
}

/// Colored KPI tile.
#[allow(non_snake_case)]
#[component]
pub fn StatTile(
    label: String,
    value: String,
    tone: &'static str,
    help: Option<String>,
) -> Element {
    rsx! {
        div { class: "stat stat-{tone}",
            div { class: "stat-label", "{label}" }
            div { class: "stat-value", "{value}" }
            if let Some(help) = help {
                div { class: "stat-help", "{help}" }
            }
        }
    }
}

/// Renders the card for one resource: a loading card until data arrives,
/// an error card if the first fetch failed, else `ready` with the decoded
/// last-known-good data.
pub fn resource_card<T: ResourceData>(
    state: &ResourceState,
    loading_label: &str,
    title: &str,
    ready: impl FnOnce(T) -> Element,
) -> Element {
    match select(state) {
        ViewState::Loading => rsx! {
            LoadingCard { label: loading_label.to_string() }
        },
        ViewState::Error { message } => rsx! {
            ErrorCard { label: title.to_string(), error: message.to_string() }
        },
        ViewState::Ready { data, .. } => match T::decode(data) {
            Ok(decoded) => ready(decoded),
            Err(e) => rsx! {
                ErrorCard { label: title.to_string(), error: format!("Unexpected response shape: {e}") }
            },
        },
    }
}
