use dioxus::prelude::*;

use crate::components::cards::{resource_card, StatTile};
use crate::components::donut::{Donut, DonutSlice};
use crate::shared::schema::{clamp_percent, BalanceData};
use crate::shared::types::ResourceState;
use crate::utils::format::{format_local_opt, format_percent, format_usd};

const COLORS: [&str; 2] = ["#3182ce", "#38a169"];

#[allow(non_snake_case)]
#[component]
pub fn OpenRouterSummaryCard(state: ResourceState) -> Element {
    resource_card(
        &state,
        "OpenRouter summary",
        "OpenRouter Summary",
        |data: BalanceData| {
            let percent = data.percent_remaining;
            let bar_width = format!("width:{:.1}%", clamp_percent(percent));
            let tone = data.budget_tone();
            rsx! {
                div { class: "card",
                    div { class: "card-body stack",
                        h2 { class: "card-title", "Budget Summary" }
                        StatTile {
                            label: "Total Limit".to_string(),
                            value: format_usd(data.total_limit),
                            tone: "blue",
                            help: format!("Reset: {}", data.reset_label()),
                        }
                        StatTile {
                            label: "Remaining Credit".to_string(),
                            value: format_usd(data.remaining),
                            tone: "green",
                            help: format!("Budget remaining: {}", format_percent(percent, 1)),
                        }
                        div {
                            p { class: "card-label", "Budget Progress" }
                            div { class: "progress-track",
                                div { class: "progress-range progress-{tone}", style: "{bar_width}" }
                            }
                        }
                        p { class: "muted small center",
                            "Last updated: {format_local_opt(data.fetched_at.as_deref())}"
                        }
                    }
                }
            }
        },
    )
}

#[allow(non_snake_case)]
#[component]
pub fn OpenRouterBudgetCard(state: ResourceState) -> Element {
    resource_card(
        &state,
        "OpenRouter chart",
        "OpenRouter Budget Visualization",
        |data: BalanceData| {
            let slices = vec![
                DonutSlice::new("Used", data.usage, COLORS[0], format_usd(data.usage)),
                DonutSlice::new("Remaining", data.remaining, COLORS[1], format_usd(data.remaining)),
            ];
            let percent = format_percent(data.percent_remaining, 1);
            rsx! {
                div { class: "card",
                    div { class: "card-body",
                        h2 { class: "card-title", "OpenRouter Budget Visualization" }
                        Donut { slices, size: 200, inner_radius: 65, outer_radius: 95,
                            div { class: "donut-value", "{percent}" }
                            div { class: "muted small", "Remaining" }
                        }
                    }
                }
            }
        },
    )
}

#[allow(non_snake_case)]
#[component]
pub fn OpenRouterUsageCard(state: ResourceState) -> Element {
    resource_card(
        &state,
        "OpenRouter usage",
        "OpenRouter Usage Breakdown",
        |data: BalanceData| {
            rsx! {
                div { class: "card",
                    div { class: "card-body",
                        h2 { class: "card-title", "Usage Breakdown" }
                        hr {}
                        div { class: "grid grid-3",
                            StatTile { label: "Daily".to_string(), value: format_usd(data.usage_daily), tone: "orange" }
                            StatTile { label: "Weekly".to_string(), value: format_usd(data.usage_weekly), tone: "cyan" }
                            StatTile { label: "Monthly".to_string(), value: format_usd(data.usage_monthly), tone: "pink" }
                        }
                    }
                }
            }
        },
    )
}
