use dioxus::prelude::*;

#[cfg(feature = "web")]
use dioxus::logger::tracing::info;

use crate::api::{dashboard_snapshot, refresh_dashboard};
use crate::components::cards::{AlertKind, SectionAlert};
use crate::components::codex::CodexLimitsCard;
use crate::components::copilot::{CopilotPremiumCard, CopilotSummaryCard};
use crate::components::header::DashboardHeader;
use crate::components::openrouter::{OpenRouterBudgetCard, OpenRouterSummaryCard, OpenRouterUsageCard};
use crate::shared::schema::{low_budget_warning, LOW_BUDGET_PERCENT};
use crate::shared::types::{RESOURCE_CODEX, RESOURCE_COPILOT, RESOURCE_OPENROUTER};
use crate::shared::view::refresh_error;

/// Poll cadence while the server is mid-refresh.
#[cfg(feature = "web")]
const BUSY_POLL_MS: u32 = 1_000;
/// Poll cadence when the server has no refresh scheduled.
#[cfg(feature = "web")]
const IDLE_POLL_MS: u32 = 5_000;
/// Slack after the server's next refresh before re-reading the snapshot.
#[cfg(feature = "web")]
const SETTLE_MS: u32 = 1_500;

const LABELS: [(&str, &str); 3] = [
    (RESOURCE_OPENROUTER, "OpenRouter"),
    (RESOURCE_COPILOT, "Copilot"),
    (RESOURCE_CODEX, "Codex"),
];

#[allow(non_snake_case)]
#[component]
pub fn Dashboard() -> Element {
    let mut snapshot = use_resource(|| async move { dashboard_snapshot().await.ok() });
    let mut requesting = use_signal(|| false);

    #[cfg(feature = "web")]
    {
        use gloo_timers::callback::Timeout;
        use js_sys::Date;
        use wasm_bindgen::JsValue;

        // Keep the handle so it can be cancelled on re-runs/unmount
        let timer_handle: Signal<Option<Timeout>> = use_signal(|| None);

        // teardown on unmount
        use_drop({
            let mut timer_handle = timer_handle.clone();
            move || {
                if let Some(h) = timer_handle.write().take() {
                    h.cancel();
                }
            }
        });

        // re-read right after the server's next refresh, or poll
        use_effect({
            let mut snapshot = snapshot.clone();
            let mut timer_handle = timer_handle.clone();

            move || {
                // Read resource *inside* the effect so it re-runs after restart()
                let (next_iso, busy) = snapshot
                    .read()
                    .as_ref()
                    .and_then(|s| s.as_ref())
                    .map(|s| (s.next_refresh_at.clone(), s.is_refreshing))
                    .unwrap_or((None, false));

                if let Some(prev) = timer_handle.write().take() {
                    prev.cancel();
                }

                let delay_ms = if busy {
                    BUSY_POLL_MS
                } else if let Some(next_str) = next_iso {
                    let target_ms = Date::new(&JsValue::from_str(&next_str)).get_time();
                    let now_ms = Date::now();
                    if target_ms.is_finite() && target_ms > now_ms {
                        (target_ms - now_ms) as u32 + SETTLE_MS
                    } else {
                        IDLE_POLL_MS
                    }
                } else {
                    IDLE_POLL_MS
                };

                info!("[dashboard] scheduling next snapshot in {} ms", delay_ms);

                let handle = Timeout::new(delay_ms, move || {
                    snapshot.restart();
                });
                timer_handle.set(Some(handle));
            }
        });
    }

    let current = (*snapshot.read_unchecked()).clone();
    // Some(None): the server function itself failed
    let server_unreachable = matches!(current, Some(None));
    let snap = current.flatten().unwrap_or_default();

    let openrouter = snap.resource(RESOURCE_OPENROUTER);
    let copilot = snap.resource(RESOURCE_COPILOT);
    let codex = snap.resource(RESOURCE_CODEX);

    let low_budget = low_budget_warning(&openrouter);
    let stale: Vec<(String, String)> = LABELS
        .iter()
        .filter_map(|(name, label)| {
            let state = snap.resources.get(*name)?;
            refresh_error(state).map(|msg| {
                (
                    label.to_string(),
                    format!("{label} refresh failed; showing last known data. {msg}"),
                )
            })
        })
        .collect();

    // manual refresh is disabled while any cycle is in flight
    let is_refreshing = snap.is_refreshing || requesting();

    rsx! {
        div { class: "page",
            DashboardHeader {
                is_refreshing,
                last_refresh_at: snap.last_refresh_at.clone(),
                on_refresh: move |_| {
                    spawn(async move {
                        requesting.set(true);
                        match refresh_dashboard().await {
                            Ok(summary) if summary.skipped => {
                                tracing::debug!("refresh skipped: one is already running");
                            }
                            Ok(summary) => {
                                for (name, err) in summary.failed.iter() {
                                    tracing::warn!("{name} refresh failed: {err}");
                                }
                            }
                            Err(e) => tracing::warn!("refresh request failed: {e}"),
                        }
                        requesting.set(false);
                        snapshot.restart();
                    });
                },
            }
            main { class: "content stack",
                if server_unreachable {
                    SectionAlert {
                        kind: AlertKind::Error,
                        message: "Could not reach the dashboard server.".to_string(),
                    }
                }
                if low_budget {
                    SectionAlert {
                        kind: AlertKind::Warning,
                        message: format!("Warning: you have less than {LOW_BUDGET_PERCENT}% of your OpenRouter budget left."),
                    }
                }
                for (label, message) in stale {
                    SectionAlert { key: "{label}", kind: AlertKind::Warning, message }
                }
                section { class: "grid grid-3",
                    OpenRouterBudgetCard { state: openrouter.clone() }
                    CopilotPremiumCard { state: copilot.clone() }
                    CodexLimitsCard { state: codex }
                }
                section { class: "grid grid-3",
                    OpenRouterSummaryCard { state: openrouter.clone() }
                    OpenRouterUsageCard { state: openrouter }
                    CopilotSummaryCard { state: copilot }
                }
            }
        }
    }
}
