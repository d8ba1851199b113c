use dioxus::prelude::*;

use crate::components::Dashboard;
use crate::MAIN_CSS;

#[allow(non_snake_case)]
#[component]
pub fn App() -> Element {
    rsx! {
        document::Stylesheet { href: MAIN_CSS }
        document::Title { "Usage Dashboard" }
        document::Meta { name: "theme-color", content: "#2b6cb0" }
        Dashboard {}
    }
}
