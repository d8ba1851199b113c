use dioxus::prelude::*;

use crate::components::cards::{resource_card, StatTile};
use crate::components::donut::{Donut, DonutSlice};
use crate::shared::schema::PremiumUsageData;
use crate::shared::types::ResourceState;
use crate::utils::format::{
    format_local_opt, format_month_year, format_percent, format_request_count, format_usd,
};

const COLORS: [&str; 2] = ["#3182ce", "#38a169"];

#[allow(non_snake_case)]
#[component]
pub fn CopilotSummaryCard(state: ResourceState) -> Element {
    resource_card(
        &state,
        "Copilot summary",
        "Copilot Premium Usage",
        |data: PremiumUsageData| {
            let totals = &data.totals;
            let tiles = [
                ("Included Used", format_request_count(totals.included_used), "blue"),
                ("Included Remaining", format_request_count(totals.included_remaining), "green"),
                ("Plan Included Limit", format_request_count(data.monthly_limit()), "teal"),
                ("Gross Premium Requests", format_request_count(totals.gross_used), "purple"),
                ("Billed Overage", format_request_count(totals.net_overage), "orange"),
                ("Billed Amount", format_usd(data.billed_amount()), "red"),
            ];
            let period = format_month_year(data.time_period.as_ref());
            rsx! {
                div { class: "card",
                    div { class: "card-body stack",
                        h2 { class: "card-title", "Copilot Premium Usage Breakdown" }
                        p { class: "muted small", "Period: " code { "{period}" } }
                        div { class: "grid grid-2",
                            for (label, value, tone) in tiles {
                                StatTile { key: "{label}", label: label.to_string(), value, tone }
                            }
                        }
                        p { class: "muted small center",
                            "Last updated: "
                            code { "{format_local_opt(data.fetched_at.as_deref())}" }
                        }
                    }
                }
            }
        },
    )
}

#[allow(non_snake_case)]
#[component]
pub fn CopilotPremiumCard(state: ResourceState) -> Element {
    resource_card(
        &state,
        "Copilot chart",
        "Copilot Included Pool Visualization",
        |data: PremiumUsageData| {
            let used = data.totals.included_used;
            let remaining = data.totals.included_remaining;
            let slices = vec![
                DonutSlice::new("Included Requests Used", used, COLORS[0], format_request_count(used)),
                DonutSlice::new(
                    "Included Requests Remaining",
                    remaining,
                    COLORS[1],
                    format_request_count(remaining),
                ),
            ];
            let percent = format_percent(data.percent_included_remaining(), 1);
            rsx! {
                div { class: "card",
                    div { class: "card-body",
                        h2 { class: "card-title", "GitHub Copilot Budget Visualization" }
                        p { class: "muted small", "Reset: monthly" }
                        p { class: "muted small",
                            "Last updated: "
                            code { "{format_local_opt(data.fetched_at.as_deref())}" }
                        }
                        Donut { slices, size: 200, inner_radius: 65, outer_radius: 95,
                            div { class: "donut-value", "{percent}" }
                            div { class: "muted small", "Included left" }
                        }
                        div { class: "grid grid-2",
                            StatTile {
                                label: "Billed Overage".to_string(),
                                value: format_request_count(data.totals.net_overage),
                                tone: "orange",
                            }
                            StatTile {
                                label: "Billed Amount".to_string(),
                                value: format_usd(data.billed_amount()),
                                tone: "red",
                            }
                        }
                    }
                }
            }
        },
    )
}
