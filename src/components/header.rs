use dioxus::prelude::*;

use crate::utils::format::format_local_opt;

#[allow(non_snake_case)]
#[component]
pub fn DashboardHeader(
    is_refreshing: bool,
    #[props(!optional)] last_refresh_at: Option<String>,
    on_refresh: EventHandler<MouseEvent>,
) -> Element {
    let label = if is_refreshing { "Refreshing..." } else { "Refresh" };
    rsx! {
        header { class: "banner",
            div { class: "banner-inner",
                div {
                    h1 { class: "banner-title", "Usage Dashboard" }
                    p { class: "banner-sub", "Last refresh: {format_local_opt(last_refresh_at.as_deref())}" }
                }
                button {
                    class: "btn",
                    disabled: is_refreshing,
                    "aria-label": "Refresh all resources",
                    onclick: move |evt| on_refresh.call(evt),
                    "{label}"
                }
            }
        }
    }
}
