use dioxus::prelude::*;

use crate::components::cards::resource_card;
use crate::components::donut::{Donut, DonutSlice};
use crate::shared::schema::{LimitWindow, RateLimitData};
use crate::shared::types::ResourceState;
use crate::utils::format::{format_local_opt, format_percent};

const COLORS: [&str; 2] = ["#2b6cb0", "#48bb78"];

#[allow(non_snake_case)]
#[component]
fn WindowDonut(label: String, #[props(!optional)] window: Option<LimitWindow>) -> Element {
    let Some(window) = window else {
        return rsx! {
            div { class: "panel",
                p { class: "card-label", "{label}" }
                p { class: "muted small", "Not available for this plan." }
            }
        };
    };
    let used = window.used_percent();
    let remaining = window.remaining_percent();
    let slices = vec![
        DonutSlice::new("Used", used, COLORS[0], format_percent(used, 1)),
        DonutSlice::new("Remaining", remaining, COLORS[1], format_percent(remaining, 1)),
    ];
    rsx! {
        div { class: "panel",
            p { class: "card-label", "{label}" }
            Donut { slices, size: 150, inner_radius: 45, outer_radius: 70,
                div { class: "donut-value", "{format_percent(remaining, 1)}" }
                div { class: "muted small", "Remaining" }
            }
            p { class: "muted small center",
                "Resets: {format_local_opt(window.reset_at_iso.as_deref())}"
            }
        }
    }
}

#[allow(non_snake_case)]
#[component]
pub fn CodexLimitsCard(state: ResourceState) -> Element {
    resource_card(
        &state,
        "Codex chart",
        "ChatGPT Codex Allowance",
        |data: RateLimitData| {
            let plan = data.plan_label();
            rsx! {
                div { class: "card",
                    div { class: "card-body",
                        h2 { class: "card-title", "ChatGPT Codex Allowance" }
                        p { class: "muted small", "Plan: {plan}" }
                        p { class: "muted small",
                            "Last updated: {format_local_opt(data.fetched_at.as_deref())}"
                        }
                        hr {}
                        div { class: "grid grid-2",
                            WindowDonut { label: "5-Hour Limit".to_string(), window: data.limits.primary.clone() }
                            WindowDonut { label: "7-Day Limit".to_string(), window: data.limits.secondary.clone() }
                        }
                    }
                }
            }
        },
    )
}
